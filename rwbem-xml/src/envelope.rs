//! Operation envelope model
//!
//! The request side describes an intrinsic (`IMETHODCALL`) or extrinsic
//! (`METHODCALL`) invocation; the response side carries the decoded
//! `IMETHODRESPONSE`/`METHODRESPONSE` with either a result payload or a
//! server-reported CIM error.

use rwbem_types::{
    CimClass, CimClassName, CimInstance, CimInstanceName, CimQualifierDeclaration, CimValue,
    ObjectName,
};

/// One parameter of an intrinsic operation (`IPARAMVALUE` body)
#[derive(Debug, Clone, PartialEq)]
pub enum OpParam {
    /// `VALUE` or `VALUE.ARRAY`
    Value(CimValue),
    /// `CLASSNAME` element
    ClassName(CimClassName),
    /// `INSTANCENAME` element
    InstanceName(CimInstanceName),
    /// `INSTANCE` element
    Instance(CimInstance),
    /// `VALUE.NAMEDINSTANCE` (instance with its `INSTANCENAME`)
    NamedInstance(CimInstance),
    /// `CLASS` element
    Class(CimClass),
    /// `QUALIFIER.DECLARATION` element
    QualifierDeclaration(CimQualifierDeclaration),
    /// `CLASSNAME` or `INSTANCENAME`, per the runtime kind
    ObjectName(ObjectName),
}

/// An intrinsic operation request
#[derive(Debug, Clone, PartialEq)]
pub struct IMethodCall {
    pub message_id: u64,
    pub name: String,
    /// Normalized namespace path ("root/cimv2")
    pub namespace: String,
    pub params: Vec<(String, OpParam)>,
}

/// An extrinsic method invocation request
#[derive(Debug, Clone, PartialEq)]
pub struct MethodCall {
    pub message_id: u64,
    pub name: String,
    /// Local class or instance path the method is invoked on
    pub target: ObjectName,
    /// `PARAMVALUE` parameters; `None` encodes a NULL parameter
    pub params: Vec<(String, Option<CimValue>)>,
}

/// A server-reported CIM error (`ERROR` element)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CimErrorDetail {
    pub code: u32,
    pub description: Option<String>,
}

/// One object in an `IRETURNVALUE` payload
#[derive(Debug, Clone, PartialEq)]
pub enum CimXmlItem {
    Class(CimClass),
    /// Instance, with its path populated when the response carried one
    Instance(CimInstance),
    InstanceName(CimInstanceName),
    ClassName(CimClassName),
    QualifierDeclaration(CimQualifierDeclaration),
    Value(CimValue),
}

/// Decoded result of an intrinsic operation
#[derive(Debug, Clone, PartialEq, Default)]
pub struct IMethodResult {
    /// Contents of `IRETURNVALUE`, in document order
    pub return_items: Vec<CimXmlItem>,
    /// Output parameters (`PARAMVALUE` siblings of `IRETURNVALUE`),
    /// e.g. `EnumerationContext` and `EndOfSequence` on pull operations
    pub out_params: Vec<(String, Option<CimValue>)>,
}

impl IMethodResult {
    /// Look up an output parameter by case-insensitive name
    pub fn out_param(&self, name: &str) -> Option<&Option<CimValue>> {
        self.out_params
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v)
    }
}

/// Decoded result of an extrinsic method invocation
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MethodReturn {
    /// `RETURNVALUE` content, absent for void-returning methods
    pub return_value: Option<CimValue>,
    pub out_params: Vec<(String, Option<CimValue>)>,
}

/// A decoded operation response
#[derive(Debug, Clone, PartialEq)]
pub struct CimResponse {
    pub message_id: u64,
    /// Method name echoed in the response
    pub method_name: String,
    pub body: ResponseBody,
}

/// The payload of a decoded response
#[derive(Debug, Clone, PartialEq)]
pub enum ResponseBody {
    IMethod(Result<IMethodResult, CimErrorDetail>),
    Method(Result<MethodReturn, CimErrorDetail>),
}

impl CimResponse {
    /// The server error carried by this response, if any
    pub fn error(&self) -> Option<&CimErrorDetail> {
        match &self.body {
            ResponseBody::IMethod(Err(e)) | ResponseBody::Method(Err(e)) => Some(e),
            _ => None,
        }
    }
}
