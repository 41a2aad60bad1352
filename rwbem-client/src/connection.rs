//! The WBEM operation client (DSP0200 intrinsic + extrinsic operations)
//!
//! A `WbemConnection` owns one HTTP transport and a per-connection
//! message-id counter (starting at 1001). It is `Send` but deliberately
//! not `Sync`: one caller at a time per connection, multiple connections
//! across threads.

use crate::config::ConnectionConfig;
use crate::error::{CimError, ClientError, ClientResult};
use crate::http::HttpTransport;
use crate::recorder::{notify_all, OperationRecord, OperationRecorder};
use crate::retry::RetryPolicy;
use crate::status::CimStatusCode;
use rwbem_types::{
    normalize_namespace, CimClass, CimClassName, CimInstance, CimInstanceName,
    CimQualifierDeclaration, CimValue, CimType, ObjectName,
};
use rwbem_xml::{
    encode_imethodcall, encode_methodcall, parse_response, CimResponse, CimXmlError, CimXmlItem,
    IMethodCall, IMethodResult, MethodCall, MethodReturn, OpParam, ResponseBody,
};
use std::cell::{Cell, RefCell};
use tracing::{debug, info, warn};

/// Options for `GetClass` (defaults per DSP0200)
#[derive(Debug, Clone)]
pub struct ClassOptions {
    pub local_only: bool,
    pub include_qualifiers: bool,
    pub include_class_origin: bool,
    pub property_list: Option<Vec<String>>,
}

impl Default for ClassOptions {
    fn default() -> Self {
        Self {
            local_only: true,
            include_qualifiers: true,
            include_class_origin: false,
            property_list: None,
        }
    }
}

/// Options for `EnumerateClasses`/`EnumerateClassNames`
#[derive(Debug, Clone)]
pub struct EnumClassOptions {
    pub deep_inheritance: bool,
    pub local_only: bool,
    pub include_qualifiers: bool,
    pub include_class_origin: bool,
}

impl Default for EnumClassOptions {
    fn default() -> Self {
        Self {
            deep_inheritance: false,
            local_only: true,
            include_qualifiers: true,
            include_class_origin: false,
        }
    }
}

/// Options for instance retrieval operations
#[derive(Debug, Clone)]
pub struct InstanceOptions {
    pub local_only: bool,
    pub deep_inheritance: bool,
    pub include_qualifiers: bool,
    pub include_class_origin: bool,
    pub property_list: Option<Vec<String>>,
}

impl Default for InstanceOptions {
    fn default() -> Self {
        Self {
            local_only: true,
            deep_inheritance: true,
            include_qualifiers: false,
            include_class_origin: false,
            property_list: None,
        }
    }
}

/// Options for association/reference traversal
#[derive(Debug, Clone, Default)]
pub struct AssocOptions {
    pub assoc_class: Option<String>,
    pub result_class: Option<String>,
    pub role: Option<String>,
    pub result_role: Option<String>,
    pub include_qualifiers: bool,
    pub include_class_origin: bool,
    pub property_list: Option<Vec<String>>,
}

/// A synchronous connection to one WBEM server
pub struct WbemConnection {
    config: ConnectionConfig,
    transport: HttpTransport,
    retry: RetryPolicy,
    message_id: Cell<u64>,
    pub(crate) pull_supported: Cell<Option<bool>>,
    recorders: RefCell<Vec<Box<dyn OperationRecorder>>>,
}

impl WbemConnection {
    pub fn new(config: ConnectionConfig) -> ClientResult<Self> {
        let transport = HttpTransport::new(&config)?;
        let retry = RetryPolicy::with_max_retries(config.max_retries);
        info!(url = %config.url, namespace = %config.default_namespace, "WBEM connection created");
        Ok(Self {
            config,
            transport,
            retry,
            // message IDs are 1001, 1002, ... per connection
            message_id: Cell::new(1000),
            pull_supported: Cell::new(None),
            recorders: RefCell::new(Vec::new()),
        })
    }

    /// Connect with default options
    pub fn connect(url: &str) -> ClientResult<Self> {
        Self::new(ConnectionConfig::new(url))
    }

    pub fn config(&self) -> &ConnectionConfig {
        &self.config
    }

    /// Attach an operation recorder hook
    pub fn add_recorder(&self, recorder: Box<dyn OperationRecorder>) {
        self.recorders.borrow_mut().push(recorder);
    }

    fn next_message_id(&self) -> u64 {
        let id = self.message_id.get() + 1;
        self.message_id.set(id);
        id
    }

    fn namespace_or_default(&self, namespace: Option<&str>) -> String {
        normalize_namespace(namespace.unwrap_or(&self.config.default_namespace))
    }

    fn notify(&self, operation: &str, request: &[u8], response: &[u8], error: Option<&ClientError>) {
        let recorders = self.recorders.borrow();
        if recorders.is_empty() {
            return;
        }
        let record = OperationRecord {
            operation,
            request,
            response,
            outcome: match error {
                None => Ok(()),
                Some(e) => Err(e),
            },
        };
        notify_all(&recorders, &record);
    }

    fn exchange(
        &self,
        operation: &str,
        cim_object: &str,
        request: &[u8],
        idempotent: bool,
    ) -> ClientResult<(Vec<u8>, CimResponse)> {
        self.retry
            .execute(self.config.timeout(), idempotent, |remaining| {
                let bytes = self.transport.post(operation, cim_object, request, remaining)?;
                let response = parse_response(&bytes)?;
                Ok((bytes, response))
            })
    }

    fn check_envelope(
        &self,
        operation: &str,
        expected_id: u64,
        response: &CimResponse,
    ) -> ClientResult<()> {
        if response.message_id != expected_id {
            return Err(ClientError::Xml(CimXmlError::CimXmlParse {
                element: "MESSAGE".to_string(),
                offset: 0,
                reason: format!(
                    "response ID {} does not match request ID {expected_id}",
                    response.message_id
                ),
            }));
        }
        if !response.method_name.eq_ignore_ascii_case(operation) {
            warn!(
                expected = operation,
                got = %response.method_name,
                "response method name mismatch"
            );
        }
        Ok(())
    }

    /// Issue one intrinsic operation and decode its result
    pub(crate) fn imethod(
        &self,
        operation: &str,
        namespace: &str,
        params: Vec<(String, OpParam)>,
        idempotent: bool,
    ) -> ClientResult<IMethodResult> {
        let message_id = self.next_message_id();
        let call = IMethodCall {
            message_id,
            name: operation.to_string(),
            namespace: namespace.to_string(),
            params,
        };
        let request = encode_imethodcall(&call)?;
        debug!(operation, namespace, message_id, "intrinsic operation");

        let (response_bytes, outcome) = match self.exchange(operation, namespace, &request, idempotent)
        {
            Ok((bytes, response)) => {
                let checked = self
                    .check_envelope(operation, message_id, &response)
                    .and_then(|()| match response.body {
                        ResponseBody::IMethod(Ok(result)) => Ok(result),
                        ResponseBody::IMethod(Err(detail)) => {
                            Err(ClientError::Cim(CimError::new(
                                CimStatusCode::from_code(detail.code),
                                detail.description,
                            )))
                        }
                        ResponseBody::Method(_) => Err(ClientError::Xml(CimXmlError::CimXmlParse {
                            element: "METHODRESPONSE".to_string(),
                            offset: 0,
                            reason: format!("{operation} expects an IMETHODRESPONSE"),
                        })),
                    });
                (bytes, checked)
            }
            Err(e) => (Vec::new(), Err(e)),
        };

        self.notify(operation, &request, &response_bytes, outcome.as_ref().err());
        outcome
    }

    /// Invoke an extrinsic (model-defined) method on a class or instance
    pub fn invoke_method(
        &self,
        method: &str,
        target: &ObjectName,
        params: Vec<(String, Option<CimValue>)>,
    ) -> ClientResult<MethodReturn> {
        let target = self.localize(target.clone());
        let namespace = target
            .namespace()
            .map(str::to_string)
            .unwrap_or_else(|| self.config.default_namespace.clone());
        let message_id = self.next_message_id();
        let call = MethodCall {
            message_id,
            name: method.to_string(),
            target,
            params,
        };
        let request = encode_methodcall(&call)?;
        debug!(method, namespace, message_id, "extrinsic method invocation");

        // extrinsic invocations are never retried
        let (response_bytes, outcome) = match self.exchange(method, &namespace, &request, false) {
            Ok((bytes, response)) => {
                let checked = self
                    .check_envelope(method, message_id, &response)
                    .and_then(|()| match response.body {
                        ResponseBody::Method(Ok(result)) => Ok(result),
                        ResponseBody::Method(Err(detail)) => Err(ClientError::Cim(CimError::new(
                            CimStatusCode::from_code(detail.code),
                            detail.description,
                        ))),
                        ResponseBody::IMethod(_) => {
                            Err(ClientError::Xml(CimXmlError::CimXmlParse {
                                element: "IMETHODRESPONSE".to_string(),
                                offset: 0,
                                reason: format!("{method} expects a METHODRESPONSE"),
                            }))
                        }
                    });
                (bytes, checked)
            }
            Err(e) => (Vec::new(), Err(e)),
        };

        self.notify(method, &request, &response_bytes, outcome.as_ref().err());
        outcome
    }

    fn localize(&self, target: ObjectName) -> ObjectName {
        match target {
            ObjectName::Class(mut c) => {
                if c.namespace.is_none() {
                    c.namespace = Some(self.config.default_namespace.clone());
                }
                ObjectName::Class(c)
            }
            ObjectName::Instance(i) => {
                if i.namespace.is_none() {
                    let ns = self.config.default_namespace.clone();
                    ObjectName::Instance(i.with_namespace(ns))
                } else {
                    ObjectName::Instance(i)
                }
            }
        }
    }

    // ---- class operations -----------------------------------------------

    pub fn get_class(
        &self,
        class_name: &str,
        namespace: Option<&str>,
        options: &ClassOptions,
    ) -> ClientResult<CimClass> {
        let ns = self.namespace_or_default(namespace);
        let mut params = vec![class_param("ClassName", class_name)];
        params.push(bool_param("LocalOnly", options.local_only));
        params.push(bool_param("IncludeQualifiers", options.include_qualifiers));
        params.push(bool_param(
            "IncludeClassOrigin",
            options.include_class_origin,
        ));
        if let Some(list) = &options.property_list {
            params.push(string_array_param("PropertyList", list)?);
        }
        let result = self.imethod("GetClass", &ns, params, true)?;
        first_class(result, "GetClass")
    }

    pub fn enumerate_classes(
        &self,
        class_name: Option<&str>,
        namespace: Option<&str>,
        options: &EnumClassOptions,
    ) -> ClientResult<Vec<CimClass>> {
        let ns = self.namespace_or_default(namespace);
        let mut params = Vec::new();
        if let Some(name) = class_name {
            params.push(class_param("ClassName", name));
        }
        params.push(bool_param("DeepInheritance", options.deep_inheritance));
        params.push(bool_param("LocalOnly", options.local_only));
        params.push(bool_param("IncludeQualifiers", options.include_qualifiers));
        params.push(bool_param(
            "IncludeClassOrigin",
            options.include_class_origin,
        ));
        let result = self.imethod("EnumerateClasses", &ns, params, true)?;
        collect(result, |item| match item {
            CimXmlItem::Class(c) => Some(c),
            _ => None,
        })
    }

    pub fn enumerate_class_names(
        &self,
        class_name: Option<&str>,
        namespace: Option<&str>,
        deep_inheritance: bool,
    ) -> ClientResult<Vec<CimClassName>> {
        let ns = self.namespace_or_default(namespace);
        let mut params = Vec::new();
        if let Some(name) = class_name {
            params.push(class_param("ClassName", name));
        }
        params.push(bool_param("DeepInheritance", deep_inheritance));
        let result = self.imethod("EnumerateClassNames", &ns, params, true)?;
        let names = collect(result, |item| match item {
            CimXmlItem::ClassName(c) => Some(c),
            _ => None,
        })?;
        Ok(names
            .into_iter()
            .map(|mut c| {
                if c.namespace.is_none() {
                    c.namespace = Some(ns.clone());
                }
                c
            })
            .collect())
    }

    pub fn create_class(&self, class: &CimClass, namespace: Option<&str>) -> ClientResult<()> {
        let ns = self.namespace_or_default(namespace);
        let params = vec![("NewClass".to_string(), OpParam::Class(class.clone()))];
        self.imethod("CreateClass", &ns, params, false)?;
        Ok(())
    }

    pub fn modify_class(&self, class: &CimClass, namespace: Option<&str>) -> ClientResult<()> {
        let ns = self.namespace_or_default(namespace);
        let params = vec![("ModifiedClass".to_string(), OpParam::Class(class.clone()))];
        self.imethod("ModifyClass", &ns, params, false)?;
        Ok(())
    }

    pub fn delete_class(&self, class_name: &str, namespace: Option<&str>) -> ClientResult<()> {
        let ns = self.namespace_or_default(namespace);
        let params = vec![class_param("ClassName", class_name)];
        self.imethod("DeleteClass", &ns, params, false)?;
        Ok(())
    }

    // ---- instance operations --------------------------------------------

    pub fn get_instance(
        &self,
        path: &CimInstanceName,
        options: &InstanceOptions,
    ) -> ClientResult<CimInstance> {
        let ns = self.namespace_or_default(path.namespace.as_deref());
        let mut params = vec![(
            "InstanceName".to_string(),
            OpParam::InstanceName(path.clone()),
        )];
        params.push(bool_param("LocalOnly", options.local_only));
        params.push(bool_param("IncludeQualifiers", options.include_qualifiers));
        params.push(bool_param(
            "IncludeClassOrigin",
            options.include_class_origin,
        ));
        if let Some(list) = &options.property_list {
            params.push(string_array_param("PropertyList", list)?);
        }
        let result = self.imethod("GetInstance", &ns, params, true)?;
        let mut instance = first_instance(result, "GetInstance")?;
        // the response INSTANCE has no path; identity comes from the call
        if instance.path.is_none() {
            instance.path = Some(path.clone().with_namespace(ns));
        }
        Ok(instance)
    }

    pub fn enumerate_instances(
        &self,
        class_name: &str,
        namespace: Option<&str>,
        options: &InstanceOptions,
    ) -> ClientResult<Vec<CimInstance>> {
        let ns = self.namespace_or_default(namespace);
        let mut params = vec![class_param("ClassName", class_name)];
        params.push(bool_param("LocalOnly", options.local_only));
        params.push(bool_param("DeepInheritance", options.deep_inheritance));
        params.push(bool_param("IncludeQualifiers", options.include_qualifiers));
        params.push(bool_param(
            "IncludeClassOrigin",
            options.include_class_origin,
        ));
        if let Some(list) = &options.property_list {
            params.push(string_array_param("PropertyList", list)?);
        }
        let result = self.imethod("EnumerateInstances", &ns, params, true)?;
        let instances = collect(result, |item| match item {
            CimXmlItem::Instance(i) => Some(i),
            _ => None,
        })?;
        Ok(with_namespace(instances, &ns))
    }

    pub fn enumerate_instance_names(
        &self,
        class_name: &str,
        namespace: Option<&str>,
    ) -> ClientResult<Vec<CimInstanceName>> {
        let ns = self.namespace_or_default(namespace);
        let params = vec![class_param("ClassName", class_name)];
        let result = self.imethod("EnumerateInstanceNames", &ns, params, true)?;
        let names = collect(result, |item| match item {
            CimXmlItem::InstanceName(n) => Some(n),
            _ => None,
        })?;
        Ok(names
            .into_iter()
            .map(|n| {
                if n.namespace.is_none() {
                    n.with_namespace(ns.clone())
                } else {
                    n
                }
            })
            .collect())
    }

    pub fn create_instance(
        &self,
        instance: &CimInstance,
        namespace: Option<&str>,
    ) -> ClientResult<CimInstanceName> {
        let ns = self.namespace_or_default(
            namespace.or_else(|| {
                instance
                    .path
                    .as_ref()
                    .and_then(|p| p.namespace.as_deref())
            }),
        );
        let params = vec![(
            "NewInstance".to_string(),
            OpParam::Instance(instance.clone()),
        )];
        let result = self.imethod("CreateInstance", &ns, params, false)?;
        let path = collect(result, |item| match item {
            CimXmlItem::InstanceName(n) => Some(n),
            _ => None,
        })?
        .into_iter()
        .next()
        .ok_or_else(|| {
            ClientError::Xml(CimXmlError::CimXmlParse {
                element: "IRETURNVALUE".to_string(),
                offset: 0,
                reason: "CreateInstance returned no instance name".to_string(),
            })
        })?;
        Ok(if path.namespace.is_none() {
            path.with_namespace(ns)
        } else {
            path
        })
    }

    /// Modify an existing instance; the instance must carry its path
    pub fn modify_instance(
        &self,
        instance: &CimInstance,
        include_qualifiers: bool,
        property_list: Option<&[String]>,
    ) -> ClientResult<()> {
        let path = instance.path.as_ref().ok_or_else(|| {
            ClientError::Usage("ModifyInstance requires an instance with a path".to_string())
        })?;
        let ns = self.namespace_or_default(path.namespace.as_deref());
        let mut params = vec![(
            "ModifiedInstance".to_string(),
            OpParam::NamedInstance(instance.clone()),
        )];
        params.push(bool_param("IncludeQualifiers", include_qualifiers));
        if let Some(list) = property_list {
            params.push(string_array_param("PropertyList", list)?);
        }
        self.imethod("ModifyInstance", &ns, params, false)?;
        Ok(())
    }

    pub fn delete_instance(&self, path: &CimInstanceName) -> ClientResult<()> {
        let ns = self.namespace_or_default(path.namespace.as_deref());
        let params = vec![(
            "InstanceName".to_string(),
            OpParam::InstanceName(path.clone()),
        )];
        self.imethod("DeleteInstance", &ns, params, false)?;
        Ok(())
    }

    // ---- association traversal ------------------------------------------

    /// `Associators`: objects associated with `object` (instances with
    /// paths for instance sources, classes for class sources)
    pub fn associators(
        &self,
        object: &ObjectName,
        options: &AssocOptions,
    ) -> ClientResult<Vec<CimXmlItem>> {
        self.assoc_operation("Associators", object, options, true)
    }

    pub fn associator_names(
        &self,
        object: &ObjectName,
        options: &AssocOptions,
    ) -> ClientResult<Vec<ObjectName>> {
        let items = self.assoc_operation("AssociatorNames", object, options, false)?;
        Ok(items.into_iter().filter_map(object_name_of).collect())
    }

    pub fn references(
        &self,
        object: &ObjectName,
        options: &AssocOptions,
    ) -> ClientResult<Vec<CimXmlItem>> {
        self.assoc_operation("References", object, options, true)
    }

    pub fn reference_names(
        &self,
        object: &ObjectName,
        options: &AssocOptions,
    ) -> ClientResult<Vec<ObjectName>> {
        let items = self.assoc_operation("ReferenceNames", object, options, false)?;
        Ok(items.into_iter().filter_map(object_name_of).collect())
    }

    fn assoc_operation(
        &self,
        operation: &str,
        object: &ObjectName,
        options: &AssocOptions,
        with_flags: bool,
    ) -> ClientResult<Vec<CimXmlItem>> {
        let ns = self.namespace_or_default(object.namespace());
        let mut params = vec![(
            "ObjectName".to_string(),
            OpParam::ObjectName(object.clone()),
        )];
        let is_reference_op = operation.starts_with("Reference");
        if !is_reference_op {
            if let Some(assoc_class) = &options.assoc_class {
                params.push(class_param("AssocClass", assoc_class));
            }
        }
        if let Some(result_class) = &options.result_class {
            params.push(class_param("ResultClass", result_class));
        }
        if let Some(role) = &options.role {
            params.push(string_param("Role", role));
        }
        if !is_reference_op {
            if let Some(result_role) = &options.result_role {
                params.push(string_param("ResultRole", result_role));
            }
        }
        if with_flags {
            params.push(bool_param("IncludeQualifiers", options.include_qualifiers));
            params.push(bool_param(
                "IncludeClassOrigin",
                options.include_class_origin,
            ));
            if let Some(list) = &options.property_list {
                params.push(string_array_param("PropertyList", list)?);
            }
        }
        let result = self.imethod(operation, &ns, params, true)?;
        Ok(result.return_items)
    }

    // ---- qualifier operations -------------------------------------------

    pub fn get_qualifier(
        &self,
        name: &str,
        namespace: Option<&str>,
    ) -> ClientResult<CimQualifierDeclaration> {
        let ns = self.namespace_or_default(namespace);
        let params = vec![string_param("QualifierName", name)];
        let result = self.imethod("GetQualifier", &ns, params, true)?;
        collect(result, |item| match item {
            CimXmlItem::QualifierDeclaration(d) => Some(d),
            _ => None,
        })?
        .into_iter()
        .next()
        .ok_or_else(|| {
            ClientError::Xml(CimXmlError::CimXmlParse {
                element: "IRETURNVALUE".to_string(),
                offset: 0,
                reason: "GetQualifier returned no declaration".to_string(),
            })
        })
    }

    pub fn enumerate_qualifiers(
        &self,
        namespace: Option<&str>,
    ) -> ClientResult<Vec<CimQualifierDeclaration>> {
        let ns = self.namespace_or_default(namespace);
        let result = self.imethod("EnumerateQualifiers", &ns, Vec::new(), true)?;
        collect(result, |item| match item {
            CimXmlItem::QualifierDeclaration(d) => Some(d),
            _ => None,
        })
    }

    pub fn set_qualifier(
        &self,
        declaration: &CimQualifierDeclaration,
        namespace: Option<&str>,
    ) -> ClientResult<()> {
        let ns = self.namespace_or_default(namespace);
        let params = vec![(
            "QualifierDeclaration".to_string(),
            OpParam::QualifierDeclaration(declaration.clone()),
        )];
        self.imethod("SetQualifier", &ns, params, false)?;
        Ok(())
    }

    pub fn delete_qualifier(&self, name: &str, namespace: Option<&str>) -> ClientResult<()> {
        let ns = self.namespace_or_default(namespace);
        let params = vec![string_param("QualifierName", name)];
        self.imethod("DeleteQualifier", &ns, params, false)?;
        Ok(())
    }

    // ---- query ----------------------------------------------------------

    /// `ExecQuery`; treated as non-idempotent for retry purposes
    pub fn exec_query(
        &self,
        query_language: &str,
        query: &str,
        namespace: Option<&str>,
    ) -> ClientResult<Vec<CimInstance>> {
        let ns = self.namespace_or_default(namespace);
        let params = vec![
            string_param("QueryLanguage", query_language),
            string_param("Query", query),
        ];
        let result = self.imethod("ExecQuery", &ns, params, false)?;
        let instances = collect(result, |item| match item {
            CimXmlItem::Instance(i) => Some(i),
            _ => None,
        })?;
        Ok(with_namespace(instances, &ns))
    }
}

// ---- parameter constructors ----------------------------------------------

pub(crate) fn bool_param(name: &str, value: bool) -> (String, OpParam) {
    (name.to_string(), OpParam::Value(CimValue::Boolean(value)))
}

pub(crate) fn string_param(name: &str, value: &str) -> (String, OpParam) {
    (
        name.to_string(),
        OpParam::Value(CimValue::String(value.to_string())),
    )
}

pub(crate) fn uint32_param(name: &str, value: u32) -> (String, OpParam) {
    (name.to_string(), OpParam::Value(CimValue::Uint32(value)))
}

pub(crate) fn class_param(name: &str, class_name: &str) -> (String, OpParam) {
    (
        name.to_string(),
        OpParam::ClassName(CimClassName::new(class_name)),
    )
}

pub(crate) fn string_array_param(name: &str, values: &[String]) -> ClientResult<(String, OpParam)> {
    let array = CimValue::array(
        CimType::String,
        values
            .iter()
            .map(|v| CimValue::String(v.clone()))
            .collect(),
    )?;
    Ok((name.to_string(), OpParam::Value(array)))
}

// ---- result extraction ----------------------------------------------------

fn collect<T>(
    result: IMethodResult,
    mut pick: impl FnMut(CimXmlItem) -> Option<T>,
) -> ClientResult<Vec<T>> {
    let mut out = Vec::with_capacity(result.return_items.len());
    for item in result.return_items {
        match pick(item) {
            Some(value) => out.push(value),
            None => {
                return Err(ClientError::Xml(CimXmlError::CimXmlParse {
                    element: "IRETURNVALUE".to_string(),
                    offset: 0,
                    reason: "unexpected object kind in result".to_string(),
                }))
            }
        }
    }
    Ok(out)
}

fn first_class(result: IMethodResult, operation: &str) -> ClientResult<CimClass> {
    collect(result, |item| match item {
        CimXmlItem::Class(c) => Some(c),
        _ => None,
    })?
    .into_iter()
    .next()
    .ok_or_else(|| {
        ClientError::Xml(CimXmlError::CimXmlParse {
            element: "IRETURNVALUE".to_string(),
            offset: 0,
            reason: format!("{operation} returned no class"),
        })
    })
}

fn first_instance(result: IMethodResult, operation: &str) -> ClientResult<CimInstance> {
    collect(result, |item| match item {
        CimXmlItem::Instance(i) => Some(i),
        _ => None,
    })?
    .into_iter()
    .next()
    .ok_or_else(|| {
        ClientError::Xml(CimXmlError::CimXmlParse {
            element: "IRETURNVALUE".to_string(),
            offset: 0,
            reason: format!("{operation} returned no instance"),
        })
    })
}

/// Fill missing namespaces on returned instance paths from the request
/// namespace
pub(crate) fn with_namespace(instances: Vec<CimInstance>, namespace: &str) -> Vec<CimInstance> {
    instances
        .into_iter()
        .map(|mut instance| {
            if let Some(path) = instance.path.take() {
                instance.path = Some(if path.namespace.is_none() {
                    path.with_namespace(namespace.to_string())
                } else {
                    path
                });
            }
            instance
        })
        .collect()
}

fn object_name_of(item: CimXmlItem) -> Option<ObjectName> {
    match item {
        CimXmlItem::InstanceName(n) => Some(ObjectName::Instance(n)),
        CimXmlItem::ClassName(c) => Some(ObjectName::Class(c)),
        _ => None,
    }
}
