//! Error types for the CIM object model

use crate::types::CimType;
use thiserror::Error;

/// Result type for model operations
pub type ModelResult<T> = Result<T, ModelError>;

/// Locally detected violations of the CIM type and object model
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ModelError {
    /// Integer outside the declared width's range
    #[error("value {value} out of range for {cim_type}")]
    OutOfRange { cim_type: CimType, value: i128 },

    /// A scalar string form that does not parse as the declared type
    #[error("invalid {cim_type} value {text:?}: {reason}")]
    InvalidValue {
        cim_type: CimType,
        text: String,
        reason: String,
    },

    /// Datetime string deviating from the 25-character CIM format
    #[error("datetime {text:?}: {reason} at position {position}")]
    DateTime {
        text: String,
        position: usize,
        reason: String,
    },

    /// A type name that is not one of the closed CIM type set
    #[error("unknown CIM type name {0:?}")]
    UnknownType(String),

    /// Array element whose runtime type differs from the array's element type
    #[error("array element {index} is not of element type {expected}")]
    ArrayElementType { index: usize, expected: CimType },

    /// A value used where its shape is not permitted (e.g. array in a key)
    #[error("model usage error: {0}")]
    Usage(String),
}
