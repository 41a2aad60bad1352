//! Error types for the CIM-XML codec

use thiserror::Error;

/// Result type for codec operations
pub type CodecResult<T> = Result<T, CimXmlError>;

/// Failures while encoding or parsing CIM-XML
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CimXmlError {
    /// The payload is not well-formed XML
    #[error("XML parse error at byte {offset}: {message}")]
    XmlParse { message: String, offset: usize },

    /// Well-formed XML that violates the DSP0201 element structure
    #[error("CIM-XML error in element {element:?} at byte {offset}: {reason}")]
    CimXmlParse {
        element: String,
        offset: usize,
        reason: String,
    },

    /// Unsupported CIMVERSION on the root CIM element
    #[error("unsupported CIMVERSION {0:?}")]
    CimVersion(String),

    /// Unsupported DTDVERSION on the root CIM element
    #[error("unsupported DTDVERSION {0:?}")]
    DtdVersion(String),

    /// Unsupported PROTOCOLVERSION on the MESSAGE element
    #[error("unsupported PROTOCOLVERSION {0:?}")]
    ProtocolVersion(String),

    /// A value inside the XML violates the CIM type model
    #[error("CIM value error: {0}")]
    Model(#[from] rwbem_types::ModelError),

    /// Failure writing encoded output
    #[error("XML write error: {0}")]
    Write(String),
}

impl From<std::io::Error> for CimXmlError {
    fn from(err: std::io::Error) -> Self {
        Self::Write(err.to_string())
    }
}

impl From<quick_xml::Error> for CimXmlError {
    fn from(err: quick_xml::Error) -> Self {
        Self::Write(err.to_string())
    }
}
