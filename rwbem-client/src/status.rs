//! CIM status codes (DSP0200 §5.2)

use std::fmt;

/// A DSP0200 status code, as carried by an `ERROR` element.
///
/// Codes outside the defined 1..=28 range are preserved in `Other`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CimStatusCode {
    Failed,
    AccessDenied,
    InvalidNamespace,
    InvalidParameter,
    InvalidClass,
    NotFound,
    NotSupported,
    ClassHasChildren,
    ClassHasInstances,
    InvalidSuperclass,
    AlreadyExists,
    NoSuchProperty,
    TypeMismatch,
    QueryLanguageNotSupported,
    InvalidQuery,
    MethodNotAvailable,
    MethodNotFound,
    NamespaceNotEmpty,
    InvalidEnumerationContext,
    InvalidOperationTimeout,
    PullHasBeenAbandoned,
    PullCannotBeAbandoned,
    FilteredEnumerationNotSupported,
    ContinuationOnErrorNotSupported,
    ServerLimitsExceeded,
    ServerIsShuttingDown,
    Other(u32),
}

impl CimStatusCode {
    pub fn from_code(code: u32) -> Self {
        match code {
            1 => Self::Failed,
            2 => Self::AccessDenied,
            3 => Self::InvalidNamespace,
            4 => Self::InvalidParameter,
            5 => Self::InvalidClass,
            6 => Self::NotFound,
            7 => Self::NotSupported,
            8 => Self::ClassHasChildren,
            9 => Self::ClassHasInstances,
            10 => Self::InvalidSuperclass,
            11 => Self::AlreadyExists,
            12 => Self::NoSuchProperty,
            13 => Self::TypeMismatch,
            14 => Self::QueryLanguageNotSupported,
            15 => Self::InvalidQuery,
            16 => Self::MethodNotAvailable,
            17 => Self::MethodNotFound,
            20 => Self::NamespaceNotEmpty,
            21 => Self::InvalidEnumerationContext,
            22 => Self::InvalidOperationTimeout,
            23 => Self::PullHasBeenAbandoned,
            24 => Self::PullCannotBeAbandoned,
            25 => Self::FilteredEnumerationNotSupported,
            26 => Self::ContinuationOnErrorNotSupported,
            27 => Self::ServerLimitsExceeded,
            28 => Self::ServerIsShuttingDown,
            other => Self::Other(other),
        }
    }

    pub fn code(&self) -> u32 {
        match self {
            Self::Failed => 1,
            Self::AccessDenied => 2,
            Self::InvalidNamespace => 3,
            Self::InvalidParameter => 4,
            Self::InvalidClass => 5,
            Self::NotFound => 6,
            Self::NotSupported => 7,
            Self::ClassHasChildren => 8,
            Self::ClassHasInstances => 9,
            Self::InvalidSuperclass => 10,
            Self::AlreadyExists => 11,
            Self::NoSuchProperty => 12,
            Self::TypeMismatch => 13,
            Self::QueryLanguageNotSupported => 14,
            Self::InvalidQuery => 15,
            Self::MethodNotAvailable => 16,
            Self::MethodNotFound => 17,
            Self::NamespaceNotEmpty => 20,
            Self::InvalidEnumerationContext => 21,
            Self::InvalidOperationTimeout => 22,
            Self::PullHasBeenAbandoned => 23,
            Self::PullCannotBeAbandoned => 24,
            Self::FilteredEnumerationNotSupported => 25,
            Self::ContinuationOnErrorNotSupported => 26,
            Self::ServerLimitsExceeded => 27,
            Self::ServerIsShuttingDown => 28,
            Self::Other(code) => *code,
        }
    }

    /// The `CIM_ERR_*` symbolic name
    pub fn name(&self) -> &'static str {
        match self {
            Self::Failed => "CIM_ERR_FAILED",
            Self::AccessDenied => "CIM_ERR_ACCESS_DENIED",
            Self::InvalidNamespace => "CIM_ERR_INVALID_NAMESPACE",
            Self::InvalidParameter => "CIM_ERR_INVALID_PARAMETER",
            Self::InvalidClass => "CIM_ERR_INVALID_CLASS",
            Self::NotFound => "CIM_ERR_NOT_FOUND",
            Self::NotSupported => "CIM_ERR_NOT_SUPPORTED",
            Self::ClassHasChildren => "CIM_ERR_CLASS_HAS_CHILDREN",
            Self::ClassHasInstances => "CIM_ERR_CLASS_HAS_INSTANCES",
            Self::InvalidSuperclass => "CIM_ERR_INVALID_SUPERCLASS",
            Self::AlreadyExists => "CIM_ERR_ALREADY_EXISTS",
            Self::NoSuchProperty => "CIM_ERR_NO_SUCH_PROPERTY",
            Self::TypeMismatch => "CIM_ERR_TYPE_MISMATCH",
            Self::QueryLanguageNotSupported => "CIM_ERR_QUERY_LANGUAGE_NOT_SUPPORTED",
            Self::InvalidQuery => "CIM_ERR_INVALID_QUERY",
            Self::MethodNotAvailable => "CIM_ERR_METHOD_NOT_AVAILABLE",
            Self::MethodNotFound => "CIM_ERR_METHOD_NOT_FOUND",
            Self::NamespaceNotEmpty => "CIM_ERR_NAMESPACE_NOT_EMPTY",
            Self::InvalidEnumerationContext => "CIM_ERR_INVALID_ENUMERATION_CONTEXT",
            Self::InvalidOperationTimeout => "CIM_ERR_INVALID_OPERATION_TIMEOUT",
            Self::PullHasBeenAbandoned => "CIM_ERR_PULL_HAS_BEEN_ABANDONED",
            Self::PullCannotBeAbandoned => "CIM_ERR_PULL_CANNOT_BE_ABANDONED",
            Self::FilteredEnumerationNotSupported => {
                "CIM_ERR_FILTERED_ENUMERATION_NOT_SUPPORTED"
            }
            Self::ContinuationOnErrorNotSupported => {
                "CIM_ERR_CONTINUATION_ON_ERROR_NOT_SUPPORTED"
            }
            Self::ServerLimitsExceeded => "CIM_ERR_SERVER_LIMITS_EXCEEDED",
            Self::ServerIsShuttingDown => "CIM_ERR_SERVER_IS_SHUTTING_DOWN",
            Self::Other(_) => "CIM_ERR_UNKNOWN",
        }
    }
}

impl fmt::Display for CimStatusCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name(), self.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case(1, CimStatusCode::Failed; "failed")]
    #[test_case(6, CimStatusCode::NotFound; "not found")]
    #[test_case(7, CimStatusCode::NotSupported; "not supported")]
    #[test_case(21, CimStatusCode::InvalidEnumerationContext; "stale context")]
    #[test_case(28, CimStatusCode::ServerIsShuttingDown; "shutting down")]
    fn codes_round_trip(code: u32, expected: CimStatusCode) {
        let status = CimStatusCode::from_code(code);
        assert_eq!(status, expected);
        assert_eq!(status.code(), code);
    }

    #[test]
    fn unknown_codes_are_preserved()  {
        let status = CimStatusCode::from_code(99);
        assert_eq!(status, CimStatusCode::Other(99));
        assert_eq!(status.code(), 99);
        assert_eq!(status.name(), "CIM_ERR_UNKNOWN");
    }

    #[test]
    fn names_follow_dsp0200() {
        assert_eq!(CimStatusCode::Failed.name(), "CIM_ERR_FAILED");
        assert_eq!(
            CimStatusCode::InvalidEnumerationContext.name(),
            "CIM_ERR_INVALID_ENUMERATION_CONTEXT"
        );
    }
}
