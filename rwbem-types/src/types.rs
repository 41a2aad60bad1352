//! The closed set of CIM data types

use crate::error::{ModelError, ModelResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A CIM data type tag (DSP0004 §5.2).
///
/// `Reference` covers REF-typed properties and parameters; the referenced
/// class name lives on the declaring element, not on the type tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CimType {
    Boolean,
    String,
    Char16,
    Uint8,
    Sint8,
    Uint16,
    Sint16,
    Uint32,
    Sint32,
    Uint64,
    Sint64,
    Real32,
    Real64,
    DateTime,
    Reference,
}

impl CimType {
    /// The DSP0201 TYPE attribute spelling (`uint8`, `datetime`, ...)
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Boolean => "boolean",
            Self::String => "string",
            Self::Char16 => "char16",
            Self::Uint8 => "uint8",
            Self::Sint8 => "sint8",
            Self::Uint16 => "uint16",
            Self::Sint16 => "sint16",
            Self::Uint32 => "uint32",
            Self::Sint32 => "sint32",
            Self::Uint64 => "uint64",
            Self::Sint64 => "sint64",
            Self::Real32 => "real32",
            Self::Real64 => "real64",
            Self::DateTime => "datetime",
            Self::Reference => "reference",
        }
    }

    pub fn is_integer(&self) -> bool {
        matches!(
            self,
            Self::Uint8
                | Self::Sint8
                | Self::Uint16
                | Self::Sint16
                | Self::Uint32
                | Self::Sint32
                | Self::Uint64
                | Self::Sint64
        )
    }

    pub fn is_signed(&self) -> bool {
        matches!(self, Self::Sint8 | Self::Sint16 | Self::Sint32 | Self::Sint64)
    }

    pub fn is_real(&self) -> bool {
        matches!(self, Self::Real32 | Self::Real64)
    }

    /// Bit width of integer and real types
    pub fn width_bits(&self) -> Option<u32> {
        match self {
            Self::Uint8 | Self::Sint8 => Some(8),
            Self::Uint16 | Self::Sint16 => Some(16),
            Self::Uint32 | Self::Sint32 => Some(32),
            Self::Uint64 | Self::Sint64 => Some(64),
            Self::Real32 => Some(32),
            Self::Real64 => Some(64),
            _ => None,
        }
    }

    /// Inclusive integer range for integer types
    pub fn integer_range(&self) -> Option<(i128, i128)> {
        if !self.is_integer() {
            return None;
        }
        let n = self.width_bits()?;
        Some(if self.is_signed() {
            (-(1i128 << (n - 1)), (1i128 << (n - 1)) - 1)
        } else {
            (0, (1i128 << n) - 1)
        })
    }

    /// Check an integer against this type's range
    pub fn check_range(&self, value: i128) -> ModelResult<()> {
        match self.integer_range() {
            Some((min, max)) if value < min || value > max => Err(ModelError::OutOfRange {
                cim_type: *self,
                value,
            }),
            Some(_) => Ok(()),
            None => Err(ModelError::Usage(format!(
                "{self} is not an integer type"
            ))),
        }
    }
}

impl fmt::Display for CimType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CimType {
    type Err = ModelError;

    /// Parse a DSP0201 TYPE attribute value, case-insensitively
    fn from_str(s: &str) -> ModelResult<Self> {
        match s.to_ascii_lowercase().as_str() {
            "boolean" => Ok(Self::Boolean),
            "string" => Ok(Self::String),
            "char16" => Ok(Self::Char16),
            "uint8" => Ok(Self::Uint8),
            "sint8" => Ok(Self::Sint8),
            "uint16" => Ok(Self::Uint16),
            "sint16" => Ok(Self::Sint16),
            "uint32" => Ok(Self::Uint32),
            "sint32" => Ok(Self::Sint32),
            "uint64" => Ok(Self::Uint64),
            "sint64" => Ok(Self::Sint64),
            "real32" => Ok(Self::Real32),
            "real64" => Ok(Self::Real64),
            "datetime" => Ok(Self::DateTime),
            "reference" => Ok(Self::Reference),
            other => Err(ModelError::UnknownType(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case(CimType::Uint8, 0, 255; "uint8")]
    #[test_case(CimType::Sint8, -128, 127; "sint8")]
    #[test_case(CimType::Uint16, 0, 65_535; "uint16")]
    #[test_case(CimType::Sint16, -32_768, 32_767; "sint16")]
    #[test_case(CimType::Uint32, 0, 4_294_967_295; "uint32")]
    #[test_case(CimType::Sint32, -2_147_483_648, 2_147_483_647; "sint32")]
    #[test_case(CimType::Uint64, 0, 18_446_744_073_709_551_615; "uint64")]
    #[test_case(
        CimType::Sint64,
        -9_223_372_036_854_775_808,
        9_223_372_036_854_775_807;
        "sint64"
    )]
    fn integer_ranges(ty: CimType, min: i128, max: i128) {
        assert_eq!(ty.integer_range(), Some((min, max)));
        assert!(ty.check_range(min).is_ok());
        assert!(ty.check_range(max).is_ok());
        assert!(ty.check_range(min - 1).is_err());
        assert!(ty.check_range(max + 1).is_err());
    }

    #[test]
    fn type_names_round_trip() {
        for ty in [
            CimType::Boolean,
            CimType::String,
            CimType::Char16,
            CimType::Uint8,
            CimType::Sint64,
            CimType::Real32,
            CimType::DateTime,
            CimType::Reference,
        ] {
            assert_eq!(ty.as_str().parse::<CimType>().unwrap(), ty);
        }
        assert_eq!("UINT8".parse::<CimType>().unwrap(), CimType::Uint8);
        assert!("uint128".parse::<CimType>().is_err());
    }
}
