//! Streaming CIM-XML parser (DSP0201)
//!
//! A push-down walker over `quick-xml` events, dispatching on element
//! names. Unknown elements fail with a [`CimXmlError::CimXmlParse`] that
//! names the element and byte offset; unknown attributes on known
//! elements are ignored and logged. The parser holds no state across
//! calls.

use crate::envelope::{
    CimErrorDetail, CimResponse, CimXmlItem, IMethodResult, MethodReturn, ResponseBody,
};
use crate::error::{CimXmlError, CodecResult};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use rwbem_types::{
    CimClass, CimClassName, CimInstance, CimInstanceName, CimMethod, CimParameter, CimProperty,
    CimQualifier, CimQualifierDeclaration, CimScopes, CimType, CimValue, NameMap,
};
use tracing::warn;

/// Parse a complete operation response envelope
pub fn parse_response(bytes: &[u8]) -> CodecResult<CimResponse> {
    let text = std::str::from_utf8(bytes).map_err(|e| CimXmlError::XmlParse {
        message: format!("response is not valid UTF-8: {e}"),
        offset: e.valid_up_to(),
    })?;
    Parser::new(text).response()
}

/// Parse a standalone CIM element fragment (CLASS, INSTANCE,
/// INSTANCENAME, QUALIFIER.DECLARATION, VALUE...)
pub fn parse_element(text: &str) -> CodecResult<CimXmlItem> {
    let mut parser = Parser::new(text);
    let (name, start, is_empty) = parser.expect_any_start()?;
    parser.return_item(&name, &start, is_empty)
}

struct Parser<'a> {
    reader: Reader<&'a [u8]>,
}

type Attrs = Vec<(String, String)>;

impl<'a> Parser<'a> {
    fn new(text: &'a str) -> Self {
        Self {
            reader: Reader::from_str(text),
        }
    }

    fn offset(&self) -> usize {
        self.reader.buffer_position()
    }

    fn elem_err(&self, element: &str, reason: impl Into<String>) -> CimXmlError {
        CimXmlError::CimXmlParse {
            element: element.to_string(),
            offset: self.offset(),
            reason: reason.into(),
        }
    }

    fn xml_err(&self, err: quick_xml::Error) -> CimXmlError {
        CimXmlError::XmlParse {
            message: err.to_string(),
            offset: self.offset(),
        }
    }

    fn raw_next(&mut self) -> CodecResult<Event<'a>> {
        self.reader.read_event().map_err(|e| self.xml_err(e))
    }

    /// Next structural event: skips comments, declarations, processing
    /// instructions, and whitespace-only text
    fn next(&mut self) -> CodecResult<Event<'a>> {
        loop {
            match self.raw_next()? {
                Event::Comment(_) | Event::Decl(_) | Event::PI(_) | Event::DocType(_) => continue,
                Event::Text(t) => {
                    let text = t.unescape().map_err(|e| self.xml_err(e))?;
                    if text.trim().is_empty() {
                        continue;
                    }
                    return Err(self.elem_err("#text", "unexpected character data"));
                }
                event => return Ok(event),
            }
        }
    }

    fn expect_any_start(&mut self) -> CodecResult<(String, BytesStart<'a>, bool)> {
        match self.next()? {
            Event::Start(e) => Ok((name_of(&e), e, false)),
            Event::Empty(e) => Ok((name_of(&e), e, true)),
            Event::Eof => Err(self.elem_err("#document", "unexpected end of document")),
            _ => Err(self.elem_err("#document", "expected an element")),
        }
    }

    fn expect_start(&mut self, expected: &str) -> CodecResult<BytesStart<'a>> {
        let (name, start, is_empty) = self.expect_any_start()?;
        if name != expected {
            return Err(self.elem_err(&name, format!("expected {expected}")));
        }
        if is_empty {
            return Err(self.elem_err(&name, "element must not be empty"));
        }
        Ok(start)
    }

    fn expect_end(&mut self, expected: &str) -> CodecResult<()> {
        match self.next()? {
            Event::End(e) if name_bytes(e.name().as_ref()) == expected => Ok(()),
            Event::End(e) => {
                let name = name_bytes(e.name().as_ref());
                Err(self.elem_err(&name, format!("expected </{expected}>")))
            }
            _ => Err(self.elem_err(expected, "expected closing tag")),
        }
    }

    /// Skip the rest of an already-opened element, children included
    fn skip_to_end(&mut self, element: &str) -> CodecResult<()> {
        let mut depth = 0usize;
        loop {
            match self.raw_next()? {
                Event::Start(_) => depth += 1,
                Event::End(e) => {
                    if depth == 0 {
                        if name_bytes(e.name().as_ref()) == element {
                            return Ok(());
                        }
                        return Err(self.elem_err(element, "mismatched closing tag"));
                    }
                    depth -= 1;
                }
                Event::Eof => {
                    return Err(self.elem_err(element, "unexpected end of document"))
                }
                _ => {}
            }
        }
    }

    fn attrs(&self, start: &BytesStart<'a>) -> CodecResult<Attrs> {
        let mut out = Vec::new();
        for attr in start.attributes() {
            let attr = attr.map_err(|e| CimXmlError::XmlParse {
                message: e.to_string(),
                offset: self.offset(),
            })?;
            let key = name_bytes(attr.key.as_ref());
            let value = attr
                .unescape_value()
                .map_err(|e| self.xml_err(e))?
                .into_owned();
            out.push((key, value));
        }
        Ok(out)
    }

    /// Collect the character data of the just-opened element, applying
    /// XML unescaping and rejecting NUL
    fn element_text(&mut self, element: &str) -> CodecResult<String> {
        let mut out = String::new();
        loop {
            match self.raw_next()? {
                Event::Text(t) => out.push_str(&t.unescape().map_err(|e| self.xml_err(e))?),
                Event::CData(c) => {
                    let inner = c.into_inner();
                    out.push_str(std::str::from_utf8(&inner).map_err(|e| {
                        CimXmlError::XmlParse {
                            message: format!("CDATA is not valid UTF-8: {e}"),
                            offset: self.offset(),
                        }
                    })?)
                }
                Event::Comment(_) => continue,
                Event::End(e) if name_bytes(e.name().as_ref()) == element => break,
                Event::Eof => {
                    return Err(self.elem_err(element, "unexpected end of document"))
                }
                _ => return Err(self.elem_err(element, "unexpected child element")),
            }
        }
        if out.contains('\0') {
            return Err(self.elem_err(element, "NUL character in string value"));
        }
        Ok(out)
    }

    // ---- envelope -------------------------------------------------------

    fn response(&mut self) -> CodecResult<CimResponse> {
        let (name, cim, _) = self.expect_any_start()?;
        if name != "CIM" {
            return Err(self.elem_err(&name, "expected CIM root element"));
        }
        let attrs = self.attrs(&cim)?;
        let cim_version = require_attr(&attrs, "CIMVERSION")
            .ok_or_else(|| self.elem_err("CIM", "missing CIMVERSION"))?;
        if !cim_version.starts_with("2.") {
            return Err(CimXmlError::CimVersion(cim_version.to_string()));
        }
        let dtd_version = require_attr(&attrs, "DTDVERSION")
            .ok_or_else(|| self.elem_err("CIM", "missing DTDVERSION"))?;
        if !dtd_version.starts_with("2.") {
            return Err(CimXmlError::DtdVersion(dtd_version.to_string()));
        }

        let message = self.expect_start("MESSAGE")?;
        let attrs = self.attrs(&message)?;
        let message_id: u64 = require_attr(&attrs, "ID")
            .ok_or_else(|| self.elem_err("MESSAGE", "missing ID"))?
            .parse()
            .map_err(|_| self.elem_err("MESSAGE", "ID is not an unsigned integer"))?;
        let protocol = require_attr(&attrs, "PROTOCOLVERSION")
            .ok_or_else(|| self.elem_err("MESSAGE", "missing PROTOCOLVERSION"))?;
        if !protocol.starts_with("1.") {
            return Err(CimXmlError::ProtocolVersion(protocol.to_string()));
        }

        let (name, _, _) = self.expect_any_start()?;
        if name != "SIMPLERSP" {
            return Err(self.elem_err(&name, "expected SIMPLERSP"));
        }

        let (name, start, is_empty) = self.expect_any_start()?;
        let response = match name.as_str() {
            "IMETHODRESPONSE" => {
                let attrs = self.attrs(&start)?;
                let method_name = require_attr(&attrs, "NAME")
                    .ok_or_else(|| self.elem_err("IMETHODRESPONSE", "missing NAME"))?
                    .to_string();
                let body = if is_empty {
                    Ok(IMethodResult::default())
                } else {
                    self.imethod_body()?
                };
                CimResponse {
                    message_id,
                    method_name,
                    body: ResponseBody::IMethod(body),
                }
            }
            "METHODRESPONSE" => {
                let attrs = self.attrs(&start)?;
                let method_name = require_attr(&attrs, "NAME")
                    .ok_or_else(|| self.elem_err("METHODRESPONSE", "missing NAME"))?
                    .to_string();
                let body = if is_empty {
                    Ok(MethodReturn::default())
                } else {
                    self.method_body()?
                };
                CimResponse {
                    message_id,
                    method_name,
                    body: ResponseBody::Method(body),
                }
            }
            other => return Err(self.elem_err(other, "expected IMETHODRESPONSE or METHODRESPONSE")),
        };

        self.expect_end("SIMPLERSP")?;
        self.expect_end("MESSAGE")?;
        self.expect_end("CIM")?;
        Ok(response)
    }

    /// Children of IMETHODRESPONSE: ERROR, or IRETURNVALUE? + PARAMVALUE*
    fn imethod_body(&mut self) -> CodecResult<Result<IMethodResult, CimErrorDetail>> {
        let mut result = IMethodResult::default();
        loop {
            match self.next()? {
                Event::End(e) if name_bytes(e.name().as_ref()) == "IMETHODRESPONSE" => {
                    return Ok(Ok(result))
                }
                Event::Start(e) => match name_of(&e).as_str() {
                    "ERROR" => {
                        let error = self.error_detail(&e)?;
                        self.skip_to_end("ERROR")?;
                        self.expect_end("IMETHODRESPONSE")?;
                        return Ok(Err(error));
                    }
                    "IRETURNVALUE" => result.return_items = self.return_items()?,
                    "PARAMVALUE" => result.out_params.push(self.param_value(&e, false)?),
                    other => return Err(self.elem_err(other, "unexpected in IMETHODRESPONSE")),
                },
                Event::Empty(e) => match name_of(&e).as_str() {
                    "ERROR" => {
                        let error = self.error_detail(&e)?;
                        self.expect_end("IMETHODRESPONSE")?;
                        return Ok(Err(error));
                    }
                    "IRETURNVALUE" => {}
                    "PARAMVALUE" => result.out_params.push(self.param_value(&e, true)?),
                    other => return Err(self.elem_err(other, "unexpected in IMETHODRESPONSE")),
                },
                _ => return Err(self.elem_err("IMETHODRESPONSE", "unexpected content")),
            }
        }
    }

    /// Children of METHODRESPONSE: ERROR, or RETURNVALUE? + PARAMVALUE*
    fn method_body(&mut self) -> CodecResult<Result<MethodReturn, CimErrorDetail>> {
        let mut result = MethodReturn::default();
        loop {
            match self.next()? {
                Event::End(e) if name_bytes(e.name().as_ref()) == "METHODRESPONSE" => {
                    return Ok(Ok(result))
                }
                Event::Start(e) => match name_of(&e).as_str() {
                    "ERROR" => {
                        let error = self.error_detail(&e)?;
                        self.skip_to_end("ERROR")?;
                        self.expect_end("METHODRESPONSE")?;
                        return Ok(Err(error));
                    }
                    "RETURNVALUE" => {
                        let attrs = self.attrs(&e)?;
                        let cim_type = attr_type(&attrs, "PARAMTYPE")?;
                        result.return_value = self.return_value_content(cim_type)?;
                    }
                    "PARAMVALUE" => result.out_params.push(self.param_value(&e, false)?),
                    other => return Err(self.elem_err(other, "unexpected in METHODRESPONSE")),
                },
                Event::Empty(e) => match name_of(&e).as_str() {
                    "ERROR" => {
                        let error = self.error_detail(&e)?;
                        self.expect_end("METHODRESPONSE")?;
                        return Ok(Err(error));
                    }
                    "RETURNVALUE" => {}
                    "PARAMVALUE" => result.out_params.push(self.param_value(&e, true)?),
                    other => return Err(self.elem_err(other, "unexpected in METHODRESPONSE")),
                },
                _ => return Err(self.elem_err("METHODRESPONSE", "unexpected content")),
            }
        }
    }

    fn error_detail(&mut self, start: &BytesStart<'a>) -> CodecResult<CimErrorDetail> {
        let attrs = self.attrs(start)?;
        let code: u32 = require_attr(&attrs, "CODE")
            .ok_or_else(|| self.elem_err("ERROR", "missing CODE"))?
            .parse()
            .map_err(|_| self.elem_err("ERROR", "CODE is not an unsigned integer"))?;
        let description = require_attr(&attrs, "DESCRIPTION").map(str::to_string);
        Ok(CimErrorDetail { code, description })
    }

    /// Content of RETURNVALUE: VALUE or VALUE.REFERENCE
    fn return_value_content(&mut self, cim_type: Option<CimType>) -> CodecResult<Option<CimValue>> {
        let mut value = None;
        loop {
            match self.next()? {
                Event::End(e) if name_bytes(e.name().as_ref()) == "RETURNVALUE" => {
                    return Ok(value)
                }
                Event::Start(e) => match name_of(&e).as_str() {
                    "VALUE" => {
                        let text = self.element_text("VALUE")?;
                        value = Some(typed_value(cim_type, &text));
                    }
                    "VALUE.REFERENCE" => {
                        value = Some(CimValue::Reference(Box::new(self.value_reference()?)));
                    }
                    other => return Err(self.elem_err(other, "unexpected in RETURNVALUE")),
                },
                Event::Empty(e) if name_of(&e) == "VALUE" => {
                    value = Some(typed_value(cim_type, ""));
                }
                _ => return Err(self.elem_err("RETURNVALUE", "unexpected content")),
            }
        }
    }

    /// A PARAMVALUE: (name, optional typed value)
    fn param_value(
        &mut self,
        start: &BytesStart<'a>,
        is_empty: bool,
    ) -> CodecResult<(String, Option<CimValue>)> {
        let attrs = self.attrs(start)?;
        let name = require_attr(&attrs, "NAME")
            .ok_or_else(|| self.elem_err("PARAMVALUE", "missing NAME"))?
            .to_string();
        let cim_type = match attr_type(&attrs, "PARAMTYPE")? {
            Some(ty) => Some(ty),
            None => attr_type(&attrs, "TYPE")?,
        };
        if is_empty {
            return Ok((name, None));
        }
        let mut value = None;
        loop {
            match self.next()? {
                Event::End(e) if name_bytes(e.name().as_ref()) == "PARAMVALUE" => {
                    return Ok((name, value))
                }
                Event::Start(e) => match name_of(&e).as_str() {
                    "VALUE" => {
                        let text = self.element_text("VALUE")?;
                        value = Some(typed_value(cim_type, &text));
                    }
                    "VALUE.ARRAY" => value = Some(self.value_array(cim_type)?),
                    "VALUE.REFERENCE" => {
                        value = Some(CimValue::Reference(Box::new(self.value_reference()?)))
                    }
                    other => return Err(self.elem_err(other, "unexpected in PARAMVALUE")),
                },
                Event::Empty(e) if name_of(&e) == "VALUE" => {
                    value = Some(typed_value(cim_type, ""));
                }
                Event::Empty(e) if name_of(&e) == "VALUE.ARRAY" => {
                    value = Some(empty_array(cim_type));
                }
                _ => return Err(self.elem_err("PARAMVALUE", "unexpected content")),
            }
        }
    }

    // ---- return value payloads -----------------------------------------

    fn return_items(&mut self) -> CodecResult<Vec<CimXmlItem>> {
        let mut items = Vec::new();
        loop {
            match self.next()? {
                Event::End(e) if name_bytes(e.name().as_ref()) == "IRETURNVALUE" => {
                    return Ok(items)
                }
                Event::Start(e) => {
                    let name = name_of(&e);
                    items.push(self.return_item(&name, &e, false)?);
                }
                Event::Empty(e) => {
                    let name = name_of(&e);
                    items.push(self.return_item(&name, &e, true)?);
                }
                _ => return Err(self.elem_err("IRETURNVALUE", "unexpected content")),
            }
        }
    }

    fn return_item(
        &mut self,
        name: &str,
        start: &BytesStart<'a>,
        is_empty: bool,
    ) -> CodecResult<CimXmlItem> {
        if is_empty
            && matches!(
                name,
                "VALUE.NAMEDINSTANCE"
                    | "VALUE.INSTANCEWITHPATH"
                    | "VALUE.OBJECTWITHPATH"
                    | "VALUE.OBJECTWITHLOCALPATH"
                    | "LOCALINSTANCEPATH"
                    | "INSTANCEPATH"
                    | "OBJECTPATH"
                    | "LOCALCLASSPATH"
                    | "CLASSPATH"
            )
        {
            return Err(self.elem_err(name, "element must not be empty"));
        }
        match name {
            "CLASS" => Ok(CimXmlItem::Class(self.class(start, is_empty)?)),
            "INSTANCE" => Ok(CimXmlItem::Instance(self.instance(start, is_empty)?)),
            "VALUE.NAMEDINSTANCE" => {
                let path_start = self.expect_start("INSTANCENAME")?;
                let path = self.instance_name(&path_start, false)?;
                let (iname, istart, iempty) = self.expect_any_start()?;
                if iname != "INSTANCE" {
                    return Err(self.elem_err(&iname, "expected INSTANCE"));
                }
                let instance = self.instance(&istart, iempty)?;
                self.expect_end("VALUE.NAMEDINSTANCE")?;
                Ok(CimXmlItem::Instance(instance.with_path(path)))
            }
            "VALUE.INSTANCEWITHPATH" => {
                let path = {
                    let p = self.expect_start("INSTANCEPATH")?;
                    self.instance_path(&p)?
                };
                let (iname, istart, iempty) = self.expect_any_start()?;
                if iname != "INSTANCE" {
                    return Err(self.elem_err(&iname, "expected INSTANCE"));
                }
                let instance = self.instance(&istart, iempty)?;
                self.expect_end("VALUE.INSTANCEWITHPATH")?;
                Ok(CimXmlItem::Instance(instance.with_path(path)))
            }
            "VALUE.OBJECTWITHPATH" | "VALUE.OBJECTWITHLOCALPATH" => {
                let item = self.object_with_path(name)?;
                Ok(item)
            }
            "INSTANCENAME" => Ok(CimXmlItem::InstanceName(
                self.instance_name(start, is_empty)?,
            )),
            "LOCALINSTANCEPATH" => Ok(CimXmlItem::InstanceName(self.local_instance_path()?)),
            "INSTANCEPATH" => Ok(CimXmlItem::InstanceName(self.instance_path(start)?)),
            "OBJECTPATH" => {
                let (inner, istart, iempty) = self.expect_any_start()?;
                if iempty {
                    return Err(self.elem_err(&inner, "element must not be empty"));
                }
                let item = match inner.as_str() {
                    "INSTANCEPATH" => CimXmlItem::InstanceName(self.instance_path(&istart)?),
                    "CLASSPATH" => CimXmlItem::ClassName(self.class_path()?),
                    other => return Err(self.elem_err(other, "unexpected in OBJECTPATH")),
                };
                self.expect_end("OBJECTPATH")?;
                Ok(item)
            }
            "CLASSNAME" => {
                let attrs = self.attrs(start)?;
                let class = require_attr(&attrs, "NAME")
                    .ok_or_else(|| self.elem_err("CLASSNAME", "missing NAME"))?;
                let result = CimClassName::new(class);
                if !is_empty {
                    self.skip_to_end("CLASSNAME")?;
                }
                Ok(CimXmlItem::ClassName(result))
            }
            "LOCALCLASSPATH" => Ok(CimXmlItem::ClassName(self.local_class_path()?)),
            "CLASSPATH" => Ok(CimXmlItem::ClassName(self.class_path()?)),
            "QUALIFIER.DECLARATION" => Ok(CimXmlItem::QualifierDeclaration(
                self.qualifier_declaration(start, is_empty)?,
            )),
            "VALUE" => {
                let text = if is_empty {
                    String::new()
                } else {
                    self.element_text("VALUE")?
                };
                Ok(CimXmlItem::Value(CimValue::String(text)))
            }
            "VALUE.ARRAY" => {
                if is_empty {
                    Ok(CimXmlItem::Value(empty_array(None)))
                } else {
                    Ok(CimXmlItem::Value(self.value_array(None)?))
                }
            }
            other => Err(self.elem_err(other, "unknown element")),
        }
    }

    /// VALUE.OBJECTWITHPATH / VALUE.OBJECTWITHLOCALPATH content
    fn object_with_path(&mut self, element: &str) -> CodecResult<CimXmlItem> {
        let (name, start, is_empty) = self.expect_any_start()?;
        if is_empty {
            return Err(self.elem_err(&name, "element must not be empty"));
        }
        let item = match name.as_str() {
            "INSTANCEPATH" | "LOCALINSTANCEPATH" => {
                let path = if name == "INSTANCEPATH" {
                    self.instance_path(&start)?
                } else {
                    self.local_instance_path()?
                };
                let (iname, istart, iempty) = self.expect_any_start()?;
                if iname != "INSTANCE" {
                    return Err(self.elem_err(&iname, "expected INSTANCE"));
                }
                CimXmlItem::Instance(self.instance(&istart, iempty)?.with_path(path))
            }
            "CLASSPATH" | "LOCALCLASSPATH" => {
                let path = if name == "CLASSPATH" {
                    self.class_path()?
                } else {
                    self.local_class_path()?
                };
                let (cname, cstart, cempty) = self.expect_any_start()?;
                if cname != "CLASS" {
                    return Err(self.elem_err(&cname, "expected CLASS"));
                }
                let mut class = self.class(&cstart, cempty)?;
                class.path = Some(path);
                CimXmlItem::Class(class)
            }
            other => return Err(self.elem_err(other, "unexpected object path")),
        };
        let _ = is_empty;
        self.expect_end(element)?;
        Ok(item)
    }

    // ---- paths ----------------------------------------------------------

    /// LOCALNAMESPACEPATH content; empty NAMESPACE NAME attributes are
    /// rejected (strict parse, lenient emit)
    fn local_namespace_path(&mut self) -> CodecResult<String> {
        let mut segments: Vec<String> = Vec::new();
        loop {
            match self.next()? {
                Event::End(e) if name_bytes(e.name().as_ref()) == "LOCALNAMESPACEPATH" => {
                    return Ok(segments.join("/"))
                }
                Event::Empty(e) | Event::Start(e) if name_of(&e) == "NAMESPACE" => {
                    let attrs = self.attrs(&e)?;
                    let segment = require_attr(&attrs, "NAME")
                        .ok_or_else(|| self.elem_err("NAMESPACE", "missing NAME"))?;
                    if segment.is_empty() {
                        return Err(self.elem_err("NAMESPACE", "empty NAME"));
                    }
                    segments.push(segment.to_string());
                }
                Event::End(_) => continue, // </NAMESPACE> of a non-empty form
                _ => return Err(self.elem_err("LOCALNAMESPACEPATH", "unexpected content")),
            }
        }
    }

    /// LOCALINSTANCEPATH: LOCALNAMESPACEPATH + INSTANCENAME (already
    /// past the opening tag)
    fn local_instance_path(&mut self) -> CodecResult<CimInstanceName> {
        self.expect_start("LOCALNAMESPACEPATH")?;
        let namespace = self.local_namespace_path()?;
        let (name, start, is_empty) = self.expect_any_start()?;
        if name != "INSTANCENAME" {
            return Err(self.elem_err(&name, "expected INSTANCENAME"));
        }
        let path = self.instance_name(&start, is_empty)?;
        self.expect_end("LOCALINSTANCEPATH")?;
        Ok(path.with_namespace(namespace))
    }

    /// INSTANCEPATH: NAMESPACEPATH + INSTANCENAME
    fn instance_path(&mut self, _start: &BytesStart<'a>) -> CodecResult<CimInstanceName> {
        let (host, namespace) = self.namespace_path()?;
        let (name, start, is_empty) = self.expect_any_start()?;
        if name != "INSTANCENAME" {
            return Err(self.elem_err(&name, "expected INSTANCENAME"));
        }
        let path = self.instance_name(&start, is_empty)?;
        self.expect_end("INSTANCEPATH")?;
        Ok(path.with_namespace(namespace).with_host(host))
    }

    fn namespace_path(&mut self) -> CodecResult<(String, String)> {
        self.expect_start("NAMESPACEPATH")?;
        self.expect_start("HOST")?;
        let host = self.element_text("HOST")?;
        self.expect_start("LOCALNAMESPACEPATH")?;
        let namespace = self.local_namespace_path()?;
        self.expect_end("NAMESPACEPATH")?;
        Ok((host, namespace))
    }

    fn local_class_path(&mut self) -> CodecResult<CimClassName> {
        self.expect_start("LOCALNAMESPACEPATH")?;
        let namespace = self.local_namespace_path()?;
        let (name, start, is_empty) = self.expect_any_start()?;
        if name != "CLASSNAME" {
            return Err(self.elem_err(&name, "expected CLASSNAME"));
        }
        let attrs = self.attrs(&start)?;
        let class = require_attr(&attrs, "NAME")
            .ok_or_else(|| self.elem_err("CLASSNAME", "missing NAME"))?
            .to_string();
        if !is_empty {
            self.skip_to_end("CLASSNAME")?;
        }
        self.expect_end("LOCALCLASSPATH")?;
        Ok(CimClassName::new(class).with_namespace(namespace))
    }

    fn class_path(&mut self) -> CodecResult<CimClassName> {
        let (host, namespace) = self.namespace_path()?;
        let (name, start, is_empty) = self.expect_any_start()?;
        if name != "CLASSNAME" {
            return Err(self.elem_err(&name, "expected CLASSNAME"));
        }
        let attrs = self.attrs(&start)?;
        let class = require_attr(&attrs, "NAME")
            .ok_or_else(|| self.elem_err("CLASSNAME", "missing NAME"))?
            .to_string();
        if !is_empty {
            self.skip_to_end("CLASSNAME")?;
        }
        self.expect_end("CLASSPATH")?;
        Ok(CimClassName::new(class)
            .with_namespace(namespace)
            .with_host(host))
    }

    // ---- values ---------------------------------------------------------

    /// VALUE.ARRAY content (already past the opening tag)
    fn value_array(&mut self, cim_type: Option<CimType>) -> CodecResult<CimValue> {
        let mut elements: Vec<Option<CimValue>> = Vec::new();
        loop {
            match self.next()? {
                Event::End(e) if name_bytes(e.name().as_ref()) == "VALUE.ARRAY" => break,
                Event::Start(e) if name_of(&e) == "VALUE" => {
                    let text = self.element_text("VALUE")?;
                    elements.push(Some(typed_value(cim_type, &text)));
                }
                Event::Empty(e) if name_of(&e) == "VALUE" => {
                    elements.push(Some(typed_value(cim_type, "")));
                }
                Event::Empty(e) if name_of(&e) == "VALUE.NULL" => elements.push(None),
                Event::Start(e) => {
                    let name = name_of(&e);
                    return Err(self.elem_err(&name, "unexpected in VALUE.ARRAY"));
                }
                _ => return Err(self.elem_err("VALUE.ARRAY", "unexpected content")),
            }
        }
        let element_type = cim_type.unwrap_or(CimType::String);
        Ok(CimValue::Array(
            rwbem_types::CimArray::new(element_type, elements).map_err(CimXmlError::Model)?,
        ))
    }

    /// VALUE.REFERENCE content (already past the opening tag).
    ///
    /// Class-valued references are not representable in the value model
    /// and are rejected, matching the keybinding restrictions.
    fn value_reference(&mut self) -> CodecResult<CimInstanceName> {
        let (name, start, is_empty) = self.expect_any_start()?;
        let path = match name.as_str() {
            "INSTANCENAME" => self.instance_name(&start, is_empty)?,
            "LOCALINSTANCEPATH" => self.local_instance_path()?,
            "INSTANCEPATH" => self.instance_path(&start)?,
            "CLASSNAME" | "LOCALCLASSPATH" | "CLASSPATH" => {
                return Err(self.elem_err(&name, "class-valued references are not supported"))
            }
            other => return Err(self.elem_err(other, "unexpected in VALUE.REFERENCE")),
        };
        self.expect_end("VALUE.REFERENCE")?;
        Ok(path)
    }

    fn instance_name(
        &mut self,
        start: &BytesStart<'a>,
        is_empty: bool,
    ) -> CodecResult<CimInstanceName> {
        let attrs = self.attrs(start)?;
        let class = require_attr(&attrs, "CLASSNAME")
            .ok_or_else(|| self.elem_err("INSTANCENAME", "missing CLASSNAME"))?;
        let mut path = CimInstanceName::new(class);
        if is_empty {
            return Ok(path);
        }
        loop {
            match self.next()? {
                Event::End(e) if name_bytes(e.name().as_ref()) == "INSTANCENAME" => {
                    return Ok(path)
                }
                Event::Start(e) => match name_of(&e).as_str() {
                    "KEYBINDING" => {
                        let attrs = self.attrs(&e)?;
                        let key = require_attr(&attrs, "NAME")
                            .ok_or_else(|| self.elem_err("KEYBINDING", "missing NAME"))?
                            .to_string();
                        let value = self.keybinding_value()?;
                        path.bind(key, value).map_err(CimXmlError::Model)?;
                        self.expect_end("KEYBINDING")?;
                    }
                    // singleton key forms without a KEYBINDING wrapper
                    "KEYVALUE" => {
                        let value = self.key_value(&e, false)?;
                        path.bind("", value).map_err(CimXmlError::Model)?;
                    }
                    "VALUE.REFERENCE" => {
                        let value = CimValue::Reference(Box::new(self.value_reference()?));
                        path.bind("", value).map_err(CimXmlError::Model)?;
                    }
                    other => return Err(self.elem_err(other, "unexpected in INSTANCENAME")),
                },
                Event::Empty(e) if name_of(&e) == "KEYVALUE" => {
                    let value = self.key_value(&e, true)?;
                    path.bind("", value).map_err(CimXmlError::Model)?;
                }
                _ => return Err(self.elem_err("INSTANCENAME", "unexpected content")),
            }
        }
    }

    fn keybinding_value(&mut self) -> CodecResult<CimValue> {
        match self.next()? {
            Event::Start(e) if name_of(&e) == "KEYVALUE" => self.key_value(&e, false),
            Event::Empty(e) if name_of(&e) == "KEYVALUE" => self.key_value(&e, true),
            Event::Start(e) if name_of(&e) == "VALUE.REFERENCE" => {
                Ok(CimValue::Reference(Box::new(self.value_reference()?)))
            }
            Event::Start(e) | Event::Empty(e) => {
                let name = name_of(&e);
                Err(self.elem_err(&name, "unexpected in KEYBINDING"))
            }
            _ => Err(self.elem_err("KEYBINDING", "unexpected content")),
        }
    }

    fn key_value(&mut self, start: &BytesStart<'a>, is_empty: bool) -> CodecResult<CimValue> {
        let attrs = self.attrs(start)?;
        let cim_type = attr_type(&attrs, "TYPE")?;
        let value_type = require_attr(&attrs, "VALUETYPE").unwrap_or("string").to_string();
        let text = if is_empty {
            String::new()
        } else {
            self.element_text("KEYVALUE")?
        };
        if let Some(ty) = cim_type {
            return CimValue::from_cim_str(ty, &text).map_err(CimXmlError::Model);
        }
        match value_type.as_str() {
            "boolean" => {
                CimValue::from_cim_str(CimType::Boolean, &text).map_err(CimXmlError::Model)
            }
            "numeric" => {
                if let Ok(n) = text.trim().parse::<i128>() {
                    if n >= 0 && n <= i128::from(u64::MAX) {
                        Ok(CimValue::Uint64(n as u64))
                    } else {
                        CimValue::integer(CimType::Sint64, n).map_err(CimXmlError::Model)
                    }
                } else {
                    CimValue::from_cim_str(CimType::Real64, &text).map_err(CimXmlError::Model)
                }
            }
            _ => Ok(CimValue::String(text)),
        }
    }

    // ---- schema elements ------------------------------------------------

    fn class(&mut self, start: &BytesStart<'a>, is_empty: bool) -> CodecResult<CimClass> {
        let attrs = self.attrs(start)?;
        warn_unknown("CLASS", &attrs, &["NAME", "SUPERCLASS"]);
        let name = require_attr(&attrs, "NAME")
            .ok_or_else(|| self.elem_err("CLASS", "missing NAME"))?;
        let mut class = CimClass::new(name);
        if let Some(superclass) = require_attr(&attrs, "SUPERCLASS") {
            class = class.with_superclass(superclass);
        }
        if is_empty {
            return Ok(class);
        }
        loop {
            match self.next()? {
                Event::End(e) if name_bytes(e.name().as_ref()) == "CLASS" => return Ok(class),
                Event::Start(e) => {
                    let name = name_of(&e);
                    match name.as_str() {
                        "QUALIFIER" => {
                            let q = self.qualifier(&e, false)?;
                            class.qualifiers.insert(q.name.clone(), q);
                        }
                        "PROPERTY" | "PROPERTY.ARRAY" | "PROPERTY.REFERENCE" => {
                            let p = self.property(&name, &e, false)?;
                            class.properties.insert(p.name.clone(), p);
                        }
                        "METHOD" => {
                            let m = self.method(&e, false)?;
                            class.methods.insert(m.name.clone(), m);
                        }
                        other => return Err(self.elem_err(other, "unexpected in CLASS")),
                    }
                }
                Event::Empty(e) => {
                    let name = name_of(&e);
                    match name.as_str() {
                        "QUALIFIER" => {
                            let q = self.qualifier(&e, true)?;
                            class.qualifiers.insert(q.name.clone(), q);
                        }
                        "PROPERTY" | "PROPERTY.ARRAY" | "PROPERTY.REFERENCE" => {
                            let p = self.property(&name, &e, true)?;
                            class.properties.insert(p.name.clone(), p);
                        }
                        "METHOD" => {
                            let m = self.method(&e, true)?;
                            class.methods.insert(m.name.clone(), m);
                        }
                        other => return Err(self.elem_err(other, "unexpected in CLASS")),
                    }
                }
                _ => return Err(self.elem_err("CLASS", "unexpected content")),
            }
        }
    }

    fn instance(&mut self, start: &BytesStart<'a>, is_empty: bool) -> CodecResult<CimInstance> {
        let attrs = self.attrs(start)?;
        warn_unknown("INSTANCE", &attrs, &["CLASSNAME"]);
        let class = require_attr(&attrs, "CLASSNAME")
            .ok_or_else(|| self.elem_err("INSTANCE", "missing CLASSNAME"))?;
        let mut instance = CimInstance::new(class);
        if is_empty {
            return Ok(instance);
        }
        loop {
            match self.next()? {
                Event::End(e) if name_bytes(e.name().as_ref()) == "INSTANCE" => {
                    return Ok(instance)
                }
                Event::Start(e) => {
                    let name = name_of(&e);
                    match name.as_str() {
                        "QUALIFIER" => {
                            let q = self.qualifier(&e, false)?;
                            instance.qualifiers.insert(q.name.clone(), q);
                        }
                        "PROPERTY" | "PROPERTY.ARRAY" | "PROPERTY.REFERENCE" => {
                            let p = self.property(&name, &e, false)?;
                            instance.properties.insert(p.name.clone(), p);
                        }
                        other => return Err(self.elem_err(other, "unexpected in INSTANCE")),
                    }
                }
                Event::Empty(e) => {
                    let name = name_of(&e);
                    match name.as_str() {
                        "QUALIFIER" => {
                            let q = self.qualifier(&e, true)?;
                            instance.qualifiers.insert(q.name.clone(), q);
                        }
                        "PROPERTY" | "PROPERTY.ARRAY" | "PROPERTY.REFERENCE" => {
                            let p = self.property(&name, &e, true)?;
                            instance.properties.insert(p.name.clone(), p);
                        }
                        other => return Err(self.elem_err(other, "unexpected in INSTANCE")),
                    }
                }
                _ => return Err(self.elem_err("INSTANCE", "unexpected content")),
            }
        }
    }

    fn property(
        &mut self,
        element: &str,
        start: &BytesStart<'a>,
        is_empty: bool,
    ) -> CodecResult<CimProperty> {
        let attrs = self.attrs(start)?;
        warn_unknown(
            element,
            &attrs,
            &[
                "NAME",
                "TYPE",
                "ARRAYSIZE",
                "REFERENCECLASS",
                "CLASSORIGIN",
                "PROPAGATED",
            ],
        );
        let name = require_attr(&attrs, "NAME")
            .ok_or_else(|| self.elem_err(element, "missing NAME"))?
            .to_string();
        let is_array = element == "PROPERTY.ARRAY";
        let is_reference = element == "PROPERTY.REFERENCE";
        let cim_type = if is_reference {
            CimType::Reference
        } else {
            attr_type(&attrs, "TYPE")?
                .ok_or_else(|| self.elem_err(element, "missing TYPE"))?
        };

        let mut qualifiers: NameMap<CimQualifier> = NameMap::new();
        let mut value: Option<CimValue> = None;
        if !is_empty {
            loop {
                match self.next()? {
                    Event::End(e) if name_bytes(e.name().as_ref()) == element => break,
                    Event::Start(e) => match name_of(&e).as_str() {
                        "QUALIFIER" => {
                            let q = self.qualifier(&e, false)?;
                            qualifiers.insert(q.name.clone(), q);
                        }
                        "VALUE" => {
                            let text = self.element_text("VALUE")?;
                            value = Some(
                                CimValue::from_cim_str(cim_type, &text)
                                    .map_err(CimXmlError::Model)?,
                            );
                        }
                        "VALUE.ARRAY" => value = Some(self.value_array(Some(cim_type))?),
                        "VALUE.REFERENCE" => {
                            value =
                                Some(CimValue::Reference(Box::new(self.value_reference()?)))
                        }
                        other => return Err(self.elem_err(other, "unexpected in property")),
                    },
                    Event::Empty(e) => match name_of(&e).as_str() {
                        "QUALIFIER" => {
                            let q = self.qualifier(&e, true)?;
                            qualifiers.insert(q.name.clone(), q);
                        }
                        "VALUE" => {
                            value = Some(
                                CimValue::from_cim_str(cim_type, "")
                                    .map_err(CimXmlError::Model)?,
                            );
                        }
                        "VALUE.ARRAY" => value = Some(empty_array(Some(cim_type))),
                        other => return Err(self.elem_err(other, "unexpected in property")),
                    },
                    _ => return Err(self.elem_err(element, "unexpected content")),
                }
            }
        }

        let mut property = if is_reference {
            let reference_class = require_attr(&attrs, "REFERENCECLASS").unwrap_or_default();
            CimProperty::reference(name, reference_class, value).map_err(CimXmlError::Model)?
        } else {
            CimProperty::new(name, cim_type, is_array, value).map_err(CimXmlError::Model)?
        };
        if let Some(size) = require_attr(&attrs, "ARRAYSIZE") {
            property.array_size = size
                .parse()
                .map_err(|_| self.elem_err(element, "ARRAYSIZE is not an unsigned integer"))
                .map(Some)?;
        }
        if let Some(origin) = require_attr(&attrs, "CLASSORIGIN") {
            property.class_origin = Some(origin.into());
        }
        property.propagated = attr_bool(&attrs, "PROPAGATED").unwrap_or(false);
        property.qualifiers = qualifiers;
        Ok(property)
    }

    fn method(&mut self, start: &BytesStart<'a>, is_empty: bool) -> CodecResult<CimMethod> {
        let attrs = self.attrs(start)?;
        warn_unknown("METHOD", &attrs, &["NAME", "TYPE", "CLASSORIGIN", "PROPAGATED"]);
        let name = require_attr(&attrs, "NAME")
            .ok_or_else(|| self.elem_err("METHOD", "missing NAME"))?;
        let return_type = attr_type(&attrs, "TYPE")?
            .ok_or_else(|| self.elem_err("METHOD", "missing TYPE"))?;
        let mut method = CimMethod::new(name, return_type);
        if let Some(origin) = require_attr(&attrs, "CLASSORIGIN") {
            method.class_origin = Some(origin.into());
        }
        method.propagated = attr_bool(&attrs, "PROPAGATED").unwrap_or(false);
        if is_empty {
            return Ok(method);
        }
        loop {
            match self.next()? {
                Event::End(e) if name_bytes(e.name().as_ref()) == "METHOD" => return Ok(method),
                Event::Start(e) => {
                    let name = name_of(&e);
                    match name.as_str() {
                        "QUALIFIER" => {
                            let q = self.qualifier(&e, false)?;
                            method.qualifiers.insert(q.name.clone(), q);
                        }
                        "PARAMETER" | "PARAMETER.REFERENCE" | "PARAMETER.ARRAY"
                        | "PARAMETER.REFARRAY" => {
                            let p = self.parameter(&name, &e, false)?;
                            method.parameters.insert(p.name.clone(), p);
                        }
                        other => return Err(self.elem_err(other, "unexpected in METHOD")),
                    }
                }
                Event::Empty(e) => {
                    let name = name_of(&e);
                    match name.as_str() {
                        "QUALIFIER" => {
                            let q = self.qualifier(&e, true)?;
                            method.qualifiers.insert(q.name.clone(), q);
                        }
                        "PARAMETER" | "PARAMETER.REFERENCE" | "PARAMETER.ARRAY"
                        | "PARAMETER.REFARRAY" => {
                            let p = self.parameter(&name, &e, true)?;
                            method.parameters.insert(p.name.clone(), p);
                        }
                        other => return Err(self.elem_err(other, "unexpected in METHOD")),
                    }
                }
                _ => return Err(self.elem_err("METHOD", "unexpected content")),
            }
        }
    }

    fn parameter(
        &mut self,
        element: &str,
        start: &BytesStart<'a>,
        is_empty: bool,
    ) -> CodecResult<CimParameter> {
        let attrs = self.attrs(start)?;
        warn_unknown(
            element,
            &attrs,
            &["NAME", "TYPE", "ARRAYSIZE", "REFERENCECLASS"],
        );
        let name = require_attr(&attrs, "NAME")
            .ok_or_else(|| self.elem_err(element, "missing NAME"))?
            .to_string();
        let is_array = matches!(element, "PARAMETER.ARRAY" | "PARAMETER.REFARRAY");
        let mut parameter = if matches!(element, "PARAMETER.REFERENCE" | "PARAMETER.REFARRAY") {
            let reference_class = require_attr(&attrs, "REFERENCECLASS").unwrap_or_default();
            CimParameter::reference(name, reference_class, is_array)
        } else {
            let cim_type = attr_type(&attrs, "TYPE")?
                .ok_or_else(|| self.elem_err(element, "missing TYPE"))?;
            CimParameter::new(name, cim_type, is_array)
        };
        if let Some(size) = require_attr(&attrs, "ARRAYSIZE") {
            parameter.array_size = size
                .parse()
                .map_err(|_| self.elem_err(element, "ARRAYSIZE is not an unsigned integer"))
                .map(Some)?;
        }
        if is_empty {
            return Ok(parameter);
        }
        loop {
            match self.next()? {
                Event::End(e) if name_bytes(e.name().as_ref()) == element => {
                    return Ok(parameter)
                }
                Event::Start(e) if name_of(&e) == "QUALIFIER" => {
                    let q = self.qualifier(&e, false)?;
                    parameter.qualifiers.insert(q.name.clone(), q);
                }
                Event::Empty(e) if name_of(&e) == "QUALIFIER" => {
                    let q = self.qualifier(&e, true)?;
                    parameter.qualifiers.insert(q.name.clone(), q);
                }
                Event::Start(e) | Event::Empty(e) => {
                    let name = name_of(&e);
                    return Err(self.elem_err(&name, "unexpected in parameter"));
                }
                _ => return Err(self.elem_err(element, "unexpected content")),
            }
        }
    }

    fn qualifier(&mut self, start: &BytesStart<'a>, is_empty: bool) -> CodecResult<CimQualifier> {
        let attrs = self.attrs(start)?;
        warn_unknown(
            "QUALIFIER",
            &attrs,
            &[
                "NAME",
                "TYPE",
                "PROPAGATED",
                "OVERRIDABLE",
                "TOSUBCLASS",
                "TOINSTANCE",
                "TRANSLATABLE",
            ],
        );
        let name = require_attr(&attrs, "NAME")
            .ok_or_else(|| self.elem_err("QUALIFIER", "missing NAME"))?
            .to_string();
        let cim_type = attr_type(&attrs, "TYPE")?
            .ok_or_else(|| self.elem_err("QUALIFIER", "missing TYPE"))?;

        let mut value: Option<CimValue> = None;
        if !is_empty {
            loop {
                match self.next()? {
                    Event::End(e) if name_bytes(e.name().as_ref()) == "QUALIFIER" => break,
                    Event::Start(e) if name_of(&e) == "VALUE" => {
                        let text = self.element_text("VALUE")?;
                        value = Some(
                            CimValue::from_cim_str(cim_type, &text).map_err(CimXmlError::Model)?,
                        );
                    }
                    Event::Empty(e) if name_of(&e) == "VALUE" => {
                        value = Some(
                            CimValue::from_cim_str(cim_type, "").map_err(CimXmlError::Model)?,
                        );
                    }
                    Event::Start(e) if name_of(&e) == "VALUE.ARRAY" => {
                        value = Some(self.value_array(Some(cim_type))?);
                    }
                    Event::Empty(e) if name_of(&e) == "VALUE.ARRAY" => {
                        value = Some(empty_array(Some(cim_type)));
                    }
                    Event::Start(e) | Event::Empty(e) => {
                        let name = name_of(&e);
                        return Err(self.elem_err(&name, "unexpected in QUALIFIER"));
                    }
                    _ => return Err(self.elem_err("QUALIFIER", "unexpected content")),
                }
            }
        }

        let mut qualifier =
            CimQualifier::new(name, cim_type, value).map_err(CimXmlError::Model)?;
        qualifier.propagated = attr_bool(&attrs, "PROPAGATED").unwrap_or(false);
        qualifier.overridable = attr_bool(&attrs, "OVERRIDABLE");
        qualifier.tosubclass = attr_bool(&attrs, "TOSUBCLASS");
        qualifier.toinstance = attr_bool(&attrs, "TOINSTANCE");
        qualifier.translatable = attr_bool(&attrs, "TRANSLATABLE");
        Ok(qualifier)
    }

    fn qualifier_declaration(
        &mut self,
        start: &BytesStart<'a>,
        is_empty: bool,
    ) -> CodecResult<CimQualifierDeclaration> {
        let attrs = self.attrs(start)?;
        warn_unknown(
            "QUALIFIER.DECLARATION",
            &attrs,
            &[
                "NAME",
                "TYPE",
                "ISARRAY",
                "ARRAYSIZE",
                "OVERRIDABLE",
                "TOSUBCLASS",
                "TOINSTANCE",
                "TRANSLATABLE",
            ],
        );
        let name = require_attr(&attrs, "NAME")
            .ok_or_else(|| self.elem_err("QUALIFIER.DECLARATION", "missing NAME"))?
            .to_string();
        let cim_type = attr_type(&attrs, "TYPE")?
            .ok_or_else(|| self.elem_err("QUALIFIER.DECLARATION", "missing TYPE"))?;
        let is_array = attr_bool(&attrs, "ISARRAY").unwrap_or(false);

        let mut scopes = CimScopes::default();
        let mut default_value: Option<CimValue> = None;
        if !is_empty {
            loop {
                match self.next()? {
                    Event::End(e)
                        if name_bytes(e.name().as_ref()) == "QUALIFIER.DECLARATION" =>
                    {
                        break
                    }
                    Event::Start(e) | Event::Empty(e) if name_of(&e) == "SCOPE" => {
                        let scope_attrs = self.attrs(&e)?;
                        for (key, value) in &scope_attrs {
                            if value.eq_ignore_ascii_case("true")
                                && scopes.set(&key.to_ascii_lowercase()).is_err()
                            {
                                warn!(attribute = %key, "ignoring unknown SCOPE attribute");
                            }
                        }
                    }
                    Event::Start(e) if name_of(&e) == "VALUE" => {
                        let text = self.element_text("VALUE")?;
                        default_value = Some(
                            CimValue::from_cim_str(cim_type, &text).map_err(CimXmlError::Model)?,
                        );
                    }
                    Event::Empty(e) if name_of(&e) == "VALUE" => {
                        default_value = Some(
                            CimValue::from_cim_str(cim_type, "").map_err(CimXmlError::Model)?,
                        );
                    }
                    Event::Start(e) if name_of(&e) == "VALUE.ARRAY" => {
                        default_value = Some(self.value_array(Some(cim_type))?);
                    }
                    Event::Empty(e) if name_of(&e) == "VALUE.ARRAY" => {
                        default_value = Some(empty_array(Some(cim_type)));
                    }
                    Event::Start(e) | Event::Empty(e) => {
                        let name = name_of(&e);
                        return Err(self.elem_err(&name, "unexpected in QUALIFIER.DECLARATION"));
                    }
                    _ => {
                        return Err(
                            self.elem_err("QUALIFIER.DECLARATION", "unexpected content")
                        )
                    }
                }
            }
        }

        let mut declaration =
            CimQualifierDeclaration::new(name, cim_type, is_array, default_value, scopes)
                .map_err(CimXmlError::Model)?;
        if let Some(size) = require_attr(&attrs, "ARRAYSIZE") {
            declaration.array_size = size
                .parse()
                .map_err(|_| {
                    self.elem_err("QUALIFIER.DECLARATION", "ARRAYSIZE is not an unsigned integer")
                })
                .map(Some)?;
        }
        declaration.overridable = attr_bool(&attrs, "OVERRIDABLE");
        declaration.tosubclass = attr_bool(&attrs, "TOSUBCLASS");
        declaration.toinstance = attr_bool(&attrs, "TOINSTANCE");
        declaration.translatable = attr_bool(&attrs, "TRANSLATABLE");
        Ok(declaration)
    }
}

// a VALUE with no declared type decodes as a string
fn typed_value(cim_type: Option<CimType>, text: &str) -> CimValue {
    match cim_type {
        Some(ty) => {
            CimValue::from_cim_str(ty, text).unwrap_or_else(|_| CimValue::String(text.to_string()))
        }
        None => CimValue::String(text.to_string()),
    }
}

fn empty_array(cim_type: Option<CimType>) -> CimValue {
    let element_type = cim_type.unwrap_or(CimType::String);
    // an empty element list cannot violate uniformity
    CimValue::Array(
        rwbem_types::CimArray::new(element_type, Vec::new())
            .unwrap_or_else(|_| unreachable!()),
    )
}

fn name_of(e: &BytesStart<'_>) -> String {
    name_bytes(e.name().as_ref())
}

fn name_bytes(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes).into_owned()
}

fn require_attr<'v>(attrs: &'v [(String, String)], name: &str) -> Option<&'v str> {
    attrs
        .iter()
        .find(|(k, _)| k.eq_ignore_ascii_case(name))
        .map(|(_, v)| v.as_str())
}

fn attr_type(attrs: &[(String, String)], name: &str) -> CodecResult<Option<CimType>> {
    match require_attr(attrs, name) {
        Some(text) => text
            .parse::<CimType>()
            .map(Some)
            .map_err(CimXmlError::Model),
        None => Ok(None),
    }
}

fn attr_bool(attrs: &[(String, String)], name: &str) -> Option<bool> {
    require_attr(attrs, name).map(|v| v.eq_ignore_ascii_case("true"))
}

fn warn_unknown(element: &str, attrs: &[(String, String)], known: &[&str]) {
    for (key, _) in attrs {
        if !known.iter().any(|k| key.eq_ignore_ascii_case(k)) {
            warn!(element, attribute = %key, "ignoring unknown attribute");
        }
    }
}
