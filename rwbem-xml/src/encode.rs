//! CIM-XML encoder (DSP0201)
//!
//! The encoder is stateless: every entry point builds its output from
//! scratch with a deterministic attribute order (NAME first, then type
//! attributes, then flags) and omits attributes whose value equals the
//! DSP0201 default. Output is UTF-8 without BOM; request envelopes open
//! with the literal declaration `<?xml version="1.0" encoding="utf-8" ?>`.

use crate::envelope::{IMethodCall, MethodCall, OpParam};
use crate::error::{CimXmlError, CodecResult};
use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use rwbem_types::{
    CimClass, CimClassName, CimInstance, CimInstanceName, CimMethod, CimParameter, CimProperty,
    CimQualifier, CimQualifierDeclaration, CimType, CimValue, ModelError, ObjectName,
};

const XML_DECL: &[u8] = b"<?xml version=\"1.0\" encoding=\"utf-8\" ?>";

/// Streaming CIM-XML element writer
pub struct XmlEncoder {
    writer: Writer<Vec<u8>>,
}

impl Default for XmlEncoder {
    fn default() -> Self {
        Self::new()
    }
}

impl XmlEncoder {
    pub fn new() -> Self {
        Self {
            writer: Writer::new(Vec::new()),
        }
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.writer.into_inner()
    }

    fn start(&mut self, name: &str, attrs: &[(&str, &str)]) -> CodecResult<()> {
        let mut elem = BytesStart::new(name);
        for (k, v) in attrs {
            elem.push_attribute((*k, *v));
        }
        self.writer.write_event(Event::Start(elem))?;
        Ok(())
    }

    fn empty(&mut self, name: &str, attrs: &[(&str, &str)]) -> CodecResult<()> {
        let mut elem = BytesStart::new(name);
        for (k, v) in attrs {
            elem.push_attribute((*k, *v));
        }
        self.writer.write_event(Event::Empty(elem))?;
        Ok(())
    }

    fn end(&mut self, name: &str) -> CodecResult<()> {
        self.writer.write_event(Event::End(BytesEnd::new(name)))?;
        Ok(())
    }

    fn text(&mut self, content: &str) -> CodecResult<()> {
        self.writer.write_event(Event::Text(BytesText::new(content)))?;
        Ok(())
    }

    /// `VALUE`, `VALUE.ARRAY`, or `VALUE.REFERENCE`, per the value shape
    pub fn value(&mut self, value: &CimValue) -> CodecResult<()> {
        match value {
            CimValue::Array(array) => {
                self.start("VALUE.ARRAY", &[])?;
                for element in array.elements() {
                    match element {
                        Some(v) => self.scalar_value(v)?,
                        None => self.empty("VALUE.NULL", &[])?,
                    }
                }
                self.end("VALUE.ARRAY")
            }
            CimValue::Reference(path) => self.value_reference(path),
            scalar => self.scalar_value(scalar),
        }
    }

    fn scalar_value(&mut self, value: &CimValue) -> CodecResult<()> {
        if let CimValue::Reference(path) = value {
            return self.value_reference(path);
        }
        self.start("VALUE", &[])?;
        self.text(&value.to_cim_str())?;
        self.end("VALUE")
    }

    /// `VALUE.REFERENCE` wrapping the most local path form available
    pub fn value_reference(&mut self, path: &CimInstanceName) -> CodecResult<()> {
        self.start("VALUE.REFERENCE", &[])?;
        match (&path.host, &path.namespace) {
            (Some(_), Some(_)) => self.instance_path(path)?,
            (None, Some(_)) => self.local_instance_path(path)?,
            _ => self.instance_name(path)?,
        }
        self.end("VALUE.REFERENCE")
    }

    pub fn instance_name(&mut self, path: &CimInstanceName) -> CodecResult<()> {
        self.start("INSTANCENAME", &[("CLASSNAME", path.class_name.as_str())])?;
        for (name, value) in path.keybindings().iter() {
            self.start("KEYBINDING", &[("NAME", name.as_str())])?;
            match value {
                CimValue::Reference(target) => self.value_reference(target)?,
                scalar => {
                    let value_type = match scalar.cim_type() {
                        CimType::Boolean => "boolean",
                        t if t.is_integer() || t.is_real() => "numeric",
                        _ => "string",
                    };
                    self.start(
                        "KEYVALUE",
                        &[
                            ("VALUETYPE", value_type),
                            ("TYPE", scalar.cim_type().as_str()),
                        ],
                    )?;
                    self.text(&scalar.to_cim_str())?;
                    self.end("KEYVALUE")?;
                }
            }
            self.end("KEYBINDING")?;
        }
        self.end("INSTANCENAME")
    }

    /// `LOCALNAMESPACEPATH` from a namespace string; empty segments have
    /// already been normalized away
    pub fn local_namespace_path(&mut self, namespace: &str) -> CodecResult<()> {
        self.start("LOCALNAMESPACEPATH", &[])?;
        for segment in rwbem_types::normalize_namespace(namespace).split('/') {
            if !segment.is_empty() {
                self.empty("NAMESPACE", &[("NAME", segment)])?;
            }
        }
        self.end("LOCALNAMESPACEPATH")
    }

    fn namespace_path(&mut self, host: &str, namespace: &str) -> CodecResult<()> {
        self.start("NAMESPACEPATH", &[])?;
        self.start("HOST", &[])?;
        self.text(host)?;
        self.end("HOST")?;
        self.local_namespace_path(namespace)?;
        self.end("NAMESPACEPATH")
    }

    pub fn local_instance_path(&mut self, path: &CimInstanceName) -> CodecResult<()> {
        let namespace = path.namespace.as_deref().unwrap_or_default();
        self.start("LOCALINSTANCEPATH", &[])?;
        self.local_namespace_path(namespace)?;
        self.instance_name(path)?;
        self.end("LOCALINSTANCEPATH")
    }

    fn instance_path(&mut self, path: &CimInstanceName) -> CodecResult<()> {
        self.start("INSTANCEPATH", &[])?;
        self.namespace_path(
            path.host.as_deref().unwrap_or_default(),
            path.namespace.as_deref().unwrap_or_default(),
        )?;
        self.instance_name(path)?;
        self.end("INSTANCEPATH")
    }

    pub fn local_class_path(&mut self, path: &CimClassName) -> CodecResult<()> {
        let namespace = path.namespace.as_deref().unwrap_or_default();
        self.start("LOCALCLASSPATH", &[])?;
        self.local_namespace_path(namespace)?;
        self.empty("CLASSNAME", &[("NAME", path.class_name.as_str())])?;
        self.end("LOCALCLASSPATH")
    }

    pub fn qualifier(&mut self, qualifier: &CimQualifier) -> CodecResult<()> {
        let mut attrs: Vec<(&str, String)> = vec![
            ("NAME", qualifier.name.to_string()),
            ("TYPE", qualifier.cim_type.as_str().to_string()),
        ];
        push_flag(&mut attrs, "PROPAGATED", Some(qualifier.propagated), false);
        push_flag(&mut attrs, "OVERRIDABLE", qualifier.overridable, true);
        push_flag(&mut attrs, "TOSUBCLASS", qualifier.tosubclass, true);
        push_flag(&mut attrs, "TOINSTANCE", qualifier.toinstance, false);
        push_flag(&mut attrs, "TRANSLATABLE", qualifier.translatable, false);
        let borrowed = borrow_attrs(&attrs);
        match &qualifier.value {
            Some(value) => {
                self.start("QUALIFIER", &borrowed)?;
                self.value(value)?;
                self.end("QUALIFIER")
            }
            None => self.empty("QUALIFIER", &borrowed),
        }
    }

    pub fn qualifier_declaration(
        &mut self,
        declaration: &CimQualifierDeclaration,
    ) -> CodecResult<()> {
        let mut attrs: Vec<(&str, String)> = vec![
            ("NAME", declaration.name.to_string()),
            ("TYPE", declaration.cim_type.as_str().to_string()),
        ];
        if declaration.is_array {
            attrs.push(("ISARRAY", "true".to_string()));
        }
        if let Some(size) = declaration.array_size {
            attrs.push(("ARRAYSIZE", size.to_string()));
        }
        push_flag(&mut attrs, "OVERRIDABLE", declaration.overridable, true);
        push_flag(&mut attrs, "TOSUBCLASS", declaration.tosubclass, true);
        push_flag(&mut attrs, "TOINSTANCE", declaration.toinstance, false);
        push_flag(&mut attrs, "TRANSLATABLE", declaration.translatable, false);
        self.start("QUALIFIER.DECLARATION", &borrow_attrs(&attrs))?;

        let scope_names = declaration.scopes.names();
        if !scope_names.is_empty() {
            let mut scope_attrs: Vec<(&str, String)> = Vec::new();
            let all = declaration.scopes.any;
            for (attr, set) in [
                ("CLASS", declaration.scopes.class),
                ("ASSOCIATION", declaration.scopes.association),
                ("REFERENCE", declaration.scopes.reference),
                ("PROPERTY", declaration.scopes.property),
                ("METHOD", declaration.scopes.method),
                ("PARAMETER", declaration.scopes.parameter),
                ("INDICATION", declaration.scopes.indication),
            ] {
                if all || set {
                    scope_attrs.push((attr, "true".to_string()));
                }
            }
            self.empty("SCOPE", &borrow_attrs(&scope_attrs))?;
        }
        if let Some(default) = &declaration.default_value {
            self.value(default)?;
        }
        self.end("QUALIFIER.DECLARATION")
    }

    pub fn property(&mut self, property: &CimProperty) -> CodecResult<()> {
        let mut attrs: Vec<(&str, String)> =
            vec![("NAME", property.name.to_string())];
        let element = if property.cim_type == CimType::Reference {
            if let Some(class) = &property.reference_class {
                attrs.push(("REFERENCECLASS", class.to_string()));
            }
            "PROPERTY.REFERENCE"
        } else if property.is_array {
            attrs.push(("TYPE", property.cim_type.as_str().to_string()));
            if let Some(size) = property.array_size {
                attrs.push(("ARRAYSIZE", size.to_string()));
            }
            "PROPERTY.ARRAY"
        } else {
            attrs.push(("TYPE", property.cim_type.as_str().to_string()));
            "PROPERTY"
        };
        if let Some(origin) = &property.class_origin {
            attrs.push(("CLASSORIGIN", origin.to_string()));
        }
        push_flag(&mut attrs, "PROPAGATED", Some(property.propagated), false);

        self.start(element, &borrow_attrs(&attrs))?;
        for qualifier in property.qualifiers.values() {
            self.qualifier(qualifier)?;
        }
        if let Some(value) = &property.value {
            self.value(value)?;
        }
        self.end(element)
    }

    pub fn parameter(&mut self, parameter: &CimParameter) -> CodecResult<()> {
        let mut attrs: Vec<(&str, String)> = vec![("NAME", parameter.name.to_string())];
        let element = match (parameter.cim_type, parameter.is_array) {
            (CimType::Reference, false) => {
                if let Some(class) = &parameter.reference_class {
                    attrs.push(("REFERENCECLASS", class.to_string()));
                }
                "PARAMETER.REFERENCE"
            }
            (CimType::Reference, true) => {
                if let Some(class) = &parameter.reference_class {
                    attrs.push(("REFERENCECLASS", class.to_string()));
                }
                if let Some(size) = parameter.array_size {
                    attrs.push(("ARRAYSIZE", size.to_string()));
                }
                "PARAMETER.REFARRAY"
            }
            (ty, true) => {
                attrs.push(("TYPE", ty.as_str().to_string()));
                if let Some(size) = parameter.array_size {
                    attrs.push(("ARRAYSIZE", size.to_string()));
                }
                "PARAMETER.ARRAY"
            }
            (ty, false) => {
                attrs.push(("TYPE", ty.as_str().to_string()));
                "PARAMETER"
            }
        };
        if parameter.qualifiers.is_empty() {
            self.empty(element, &borrow_attrs(&attrs))
        } else {
            self.start(element, &borrow_attrs(&attrs))?;
            for qualifier in parameter.qualifiers.values() {
                self.qualifier(qualifier)?;
            }
            self.end(element)
        }
    }

    pub fn method(&mut self, method: &CimMethod) -> CodecResult<()> {
        let mut attrs: Vec<(&str, String)> = vec![
            ("NAME", method.name.to_string()),
            ("TYPE", method.return_type.as_str().to_string()),
        ];
        if let Some(origin) = &method.class_origin {
            attrs.push(("CLASSORIGIN", origin.to_string()));
        }
        push_flag(&mut attrs, "PROPAGATED", Some(method.propagated), false);
        self.start("METHOD", &borrow_attrs(&attrs))?;
        for qualifier in method.qualifiers.values() {
            self.qualifier(qualifier)?;
        }
        for parameter in method.parameters.values() {
            self.parameter(parameter)?;
        }
        self.end("METHOD")
    }

    pub fn class(&mut self, class: &CimClass) -> CodecResult<()> {
        let mut attrs: Vec<(&str, String)> = vec![("NAME", class.class_name.to_string())];
        if let Some(superclass) = &class.superclass {
            attrs.push(("SUPERCLASS", superclass.to_string()));
        }
        self.start("CLASS", &borrow_attrs(&attrs))?;
        for qualifier in class.qualifiers.values() {
            self.qualifier(qualifier)?;
        }
        for property in class.properties.values() {
            self.property(property)?;
        }
        for method in class.methods.values() {
            self.method(method)?;
        }
        self.end("CLASS")
    }

    pub fn instance(&mut self, instance: &CimInstance) -> CodecResult<()> {
        self.start("INSTANCE", &[("CLASSNAME", instance.class_name.as_str())])?;
        for qualifier in instance.qualifiers.values() {
            self.qualifier(qualifier)?;
        }
        for property in instance.properties.values() {
            self.property(property)?;
        }
        self.end("INSTANCE")
    }

    /// `VALUE.NAMEDINSTANCE`: the instance's path followed by the instance
    pub fn named_instance(&mut self, instance: &CimInstance) -> CodecResult<()> {
        let path = instance.path.as_ref().ok_or_else(|| {
            CimXmlError::Model(ModelError::Usage(
                "VALUE.NAMEDINSTANCE requires an instance path".to_string(),
            ))
        })?;
        self.start("VALUE.NAMEDINSTANCE", &[])?;
        self.instance_name(path)?;
        self.instance(instance)?;
        self.end("VALUE.NAMEDINSTANCE")
    }
}

// DSP0201 boolean attributes are omitted when they equal their default
fn push_flag<'a>(
    attrs: &mut Vec<(&'a str, String)>,
    name: &'a str,
    value: Option<bool>,
    default: bool,
) {
    if let Some(v) = value {
        if v != default {
            attrs.push((name, v.to_string()));
        }
    }
}

fn borrow_attrs<'a>(attrs: &'a [(&'a str, String)]) -> Vec<(&'a str, &'a str)> {
    attrs.iter().map(|(k, v)| (*k, v.as_str())).collect()
}

fn envelope_open(encoder: &mut XmlEncoder, message_id: u64) -> CodecResult<()> {
    encoder.start("CIM", &[("CIMVERSION", "2.0"), ("DTDVERSION", "2.0")])?;
    encoder.start(
        "MESSAGE",
        &[
            ("ID", message_id.to_string().as_str()),
            ("PROTOCOLVERSION", "1.0"),
        ],
    )?;
    encoder.start("SIMPLEREQ", &[])
}

fn envelope_close(encoder: &mut XmlEncoder) -> CodecResult<()> {
    encoder.end("SIMPLEREQ")?;
    encoder.end("MESSAGE")?;
    encoder.end("CIM")
}

/// Encode an intrinsic operation request to its on-the-wire bytes
pub fn encode_imethodcall(call: &IMethodCall) -> CodecResult<Vec<u8>> {
    let mut encoder = XmlEncoder::new();
    envelope_open(&mut encoder, call.message_id)?;
    encoder.start("IMETHODCALL", &[("NAME", &call.name)])?;
    encoder.local_namespace_path(&call.namespace)?;
    for (name, param) in &call.params {
        encoder.start("IPARAMVALUE", &[("NAME", name)])?;
        match param {
            OpParam::Value(value) => encoder.value(value)?,
            OpParam::ClassName(class) => {
                encoder.empty("CLASSNAME", &[("NAME", class.class_name.as_str())])?
            }
            OpParam::InstanceName(path) => encoder.instance_name(path)?,
            OpParam::Instance(instance) => encoder.instance(instance)?,
            OpParam::NamedInstance(instance) => encoder.named_instance(instance)?,
            OpParam::Class(class) => encoder.class(class)?,
            OpParam::QualifierDeclaration(declaration) => {
                encoder.qualifier_declaration(declaration)?
            }
            OpParam::ObjectName(ObjectName::Class(class)) => {
                encoder.empty("CLASSNAME", &[("NAME", class.class_name.as_str())])?
            }
            OpParam::ObjectName(ObjectName::Instance(path)) => encoder.instance_name(path)?,
        }
        encoder.end("IPARAMVALUE")?;
    }
    encoder.end("IMETHODCALL")?;
    envelope_close(&mut encoder)?;
    Ok(finish(encoder))
}

/// Encode an extrinsic method invocation request
pub fn encode_methodcall(call: &MethodCall) -> CodecResult<Vec<u8>> {
    let mut encoder = XmlEncoder::new();
    envelope_open(&mut encoder, call.message_id)?;
    encoder.start("METHODCALL", &[("NAME", &call.name)])?;
    match &call.target {
        ObjectName::Class(class) => encoder.local_class_path(class)?,
        ObjectName::Instance(path) => encoder.local_instance_path(path)?,
    }
    for (name, value) in &call.params {
        match value {
            Some(v) => {
                let attrs = [("NAME", name.as_str()), ("PARAMTYPE", v.cim_type().as_str())];
                encoder.start("PARAMVALUE", &attrs)?;
                encoder.value(v)?;
                encoder.end("PARAMVALUE")?;
            }
            None => encoder.empty("PARAMVALUE", &[("NAME", name.as_str())])?,
        }
    }
    encoder.end("METHODCALL")?;
    envelope_close(&mut encoder)?;
    Ok(finish(encoder))
}

fn finish(encoder: XmlEncoder) -> Vec<u8> {
    let mut out = Vec::with_capacity(XML_DECL.len() + 256);
    out.extend_from_slice(XML_DECL);
    out.extend_from_slice(&encoder.into_bytes());
    out
}

/// Render a CIM element as a standalone CIM-XML fragment
pub trait ToCimXml {
    fn to_cim_xml(&self) -> String;
}

fn fragment<F>(build: F) -> String
where
    F: FnOnce(&mut XmlEncoder) -> CodecResult<()>,
{
    let mut encoder = XmlEncoder::new();
    // writing into a Vec cannot fail; shape errors are a caller bug
    // surfaced as an empty fragment rather than a panic
    if build(&mut encoder).is_err() {
        return String::new();
    }
    String::from_utf8(encoder.into_bytes()).unwrap_or_default()
}

impl ToCimXml for CimClass {
    fn to_cim_xml(&self) -> String {
        fragment(|e| e.class(self))
    }
}

impl ToCimXml for CimInstance {
    fn to_cim_xml(&self) -> String {
        fragment(|e| e.instance(self))
    }
}

impl ToCimXml for CimInstanceName {
    fn to_cim_xml(&self) -> String {
        fragment(|e| e.instance_name(self))
    }
}

impl ToCimXml for CimQualifier {
    fn to_cim_xml(&self) -> String {
        fragment(|e| e.qualifier(self))
    }
}

impl ToCimXml for CimQualifierDeclaration {
    fn to_cim_xml(&self) -> String {
        fragment(|e| e.qualifier_declaration(self))
    }
}

impl ToCimXml for CimValue {
    fn to_cim_xml(&self) -> String {
        fragment(|e| e.value(self))
    }
}

impl ToCimXml for CimProperty {
    fn to_cim_xml(&self) -> String {
        fragment(|e| e.property(self))
    }
}

impl ToCimXml for CimMethod {
    fn to_cim_xml(&self) -> String {
        fragment(|e| e.method(self))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uint8_value_encodes_to_value_element() {
        assert_eq!(CimValue::Uint8(255).to_cim_xml(), "<VALUE>255</VALUE>");
    }

    #[test]
    fn array_value_encodes_nulls() {
        let array = CimValue::Array(
            rwbem_types::CimArray::new(
                CimType::Uint8,
                vec![Some(CimValue::Uint8(1)), None, Some(CimValue::Uint8(3))],
            )
            .unwrap(),
        );
        assert_eq!(
            array.to_cim_xml(),
            "<VALUE.ARRAY><VALUE>1</VALUE><VALUE.NULL/><VALUE>3</VALUE></VALUE.ARRAY>"
        );
    }

    #[test]
    fn special_characters_are_escaped() {
        assert_eq!(
            CimValue::from("a<b&c").to_cim_xml(),
            "<VALUE>a&lt;b&amp;c</VALUE>"
        );
    }

    #[test]
    fn instance_name_carries_typed_keybindings() {
        let mut path = CimInstanceName::new("CIM_Foo");
        path.bind("Name", CimValue::from("n1")).unwrap();
        path.bind("Index", CimValue::Uint32(2)).unwrap();
        assert_eq!(
            path.to_cim_xml(),
            "<INSTANCENAME CLASSNAME=\"CIM_Foo\">\
             <KEYBINDING NAME=\"Name\"><KEYVALUE VALUETYPE=\"string\" TYPE=\"string\">n1</KEYVALUE></KEYBINDING>\
             <KEYBINDING NAME=\"Index\"><KEYVALUE VALUETYPE=\"numeric\" TYPE=\"uint32\">2</KEYVALUE></KEYBINDING>\
             </INSTANCENAME>"
        );
    }

    #[test]
    fn defaulted_flags_are_omitted() {
        let mut q = CimQualifier::boolean("Key", true);
        q.overridable = Some(true); // DSP0201 default, must not appear
        q.toinstance = Some(true); // non-default, must appear
        let xml = q.to_cim_xml();
        assert_eq!(
            xml,
            "<QUALIFIER NAME=\"Key\" TYPE=\"boolean\" TOINSTANCE=\"true\"><VALUE>true</VALUE></QUALIFIER>"
        );
    }

    #[test]
    fn imethodcall_envelope_matches_canonical_shape() {
        let call = IMethodCall {
            message_id: 1001,
            name: "DeleteQualifier".to_string(),
            namespace: "root/cimv2".to_string(),
            params: vec![(
                "QualifierName".to_string(),
                OpParam::Value(CimValue::from("FooQualDecl")),
            )],
        };
        let body = String::from_utf8(encode_imethodcall(&call).unwrap()).unwrap();
        assert_eq!(
            body,
            "<?xml version=\"1.0\" encoding=\"utf-8\" ?>\
             <CIM CIMVERSION=\"2.0\" DTDVERSION=\"2.0\">\
             <MESSAGE ID=\"1001\" PROTOCOLVERSION=\"1.0\">\
             <SIMPLEREQ>\
             <IMETHODCALL NAME=\"DeleteQualifier\">\
             <LOCALNAMESPACEPATH><NAMESPACE NAME=\"root\"/><NAMESPACE NAME=\"cimv2\"/></LOCALNAMESPACEPATH>\
             <IPARAMVALUE NAME=\"QualifierName\"><VALUE>FooQualDecl</VALUE></IPARAMVALUE>\
             </IMETHODCALL>\
             </SIMPLEREQ>\
             </MESSAGE>\
             </CIM>"
        );
    }

    #[test]
    fn sloppy_namespace_is_normalized_on_the_wire() {
        let call = IMethodCall {
            message_id: 1001,
            name: "EnumerateClassNames".to_string(),
            namespace: "//root/mycim//".to_string(),
            params: vec![],
        };
        let body = String::from_utf8(encode_imethodcall(&call).unwrap()).unwrap();
        assert!(body.contains(
            "<LOCALNAMESPACEPATH><NAMESPACE NAME=\"root\"/><NAMESPACE NAME=\"mycim\"/></LOCALNAMESPACEPATH>"
        ));
    }

    #[test]
    fn methodcall_targets_local_instance_path() {
        let mut path = CimInstanceName::new("ACME_Service").with_namespace("root/cimv2");
        path.bind("Name", CimValue::from("svc")).unwrap();
        let call = MethodCall {
            message_id: 1002,
            name: "RestartService".to_string(),
            target: ObjectName::Instance(path),
            params: vec![("Force".to_string(), Some(CimValue::Boolean(true)))],
        };
        let body = String::from_utf8(encode_methodcall(&call).unwrap()).unwrap();
        assert!(body.contains("<METHODCALL NAME=\"RestartService\"><LOCALINSTANCEPATH>"));
        assert!(body.contains(
            "<PARAMVALUE NAME=\"Force\" PARAMTYPE=\"boolean\"><VALUE>true</VALUE></PARAMVALUE>"
        ));
    }
}
