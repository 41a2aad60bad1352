//! CIM-XML codec for the RWBEM client (DSP0201)
//!
//! Deterministic encoding and streaming parsing of CIM objects and
//! operation envelopes. The encoder produces UTF-8 without BOM and omits
//! attributes at their DSP0201 defaults; the parser is a push-down
//! walker over `quick-xml` events that rejects unknown elements with the
//! element name and byte offset.

pub mod encode;
pub mod envelope;
pub mod error;
pub mod parse;

pub use encode::{encode_imethodcall, encode_methodcall, ToCimXml, XmlEncoder};
pub use envelope::{
    CimErrorDetail, CimResponse, CimXmlItem, IMethodCall, IMethodResult, MethodCall, MethodReturn,
    OpParam, ResponseBody,
};
pub use error::{CimXmlError, CodecResult};
pub use parse::{parse_element, parse_response};
