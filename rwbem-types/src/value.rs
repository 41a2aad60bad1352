//! Typed CIM values

use crate::datetime::CimDateTime;
use crate::error::{ModelError, ModelResult};
use crate::path::CimInstanceName;
use crate::types::CimType;
use std::cmp::Ordering;
use std::hash::{Hash, Hasher};
use std::mem;

/// A typed CIM value.
///
/// Every variant carries its declared width in the Rust type, so a value
/// that exists is in range by construction. Checked construction from
/// arbitrary numbers goes through [`CimValue::integer`] and
/// [`CimValue::real`], which fail with a range error instead of wrapping.
#[derive(Debug, Clone, PartialEq)]
pub enum CimValue {
    Boolean(bool),
    String(String),
    Char16(char),
    Uint8(u8),
    Sint8(i8),
    Uint16(u16),
    Sint16(i16),
    Uint32(u32),
    Sint32(i32),
    Uint64(u64),
    Sint64(i64),
    Real32(f32),
    Real64(f64),
    DateTime(CimDateTime),
    Reference(Box<CimInstanceName>),
    Array(CimArray),
}

/// A one-dimensional array of CIM values, uniform in element type.
///
/// Elements may be null (`None`); whether null elements are permitted for
/// a given use is decided by the declaring element (keybindings never
/// allow them, properties and parameters follow DSP0201 VALUE.NULL).
#[derive(Debug, Clone, PartialEq)]
pub struct CimArray {
    element_type: CimType,
    elements: Vec<Option<CimValue>>,
}

impl CimArray {
    /// Build an array, checking element-type uniformity
    pub fn new(element_type: CimType, elements: Vec<Option<CimValue>>) -> ModelResult<Self> {
        for (index, element) in elements.iter().enumerate() {
            if let Some(value) = element {
                if value.is_array() || value.cim_type() != element_type {
                    return Err(ModelError::ArrayElementType {
                        index,
                        expected: element_type,
                    });
                }
            }
        }
        Ok(Self {
            element_type,
            elements,
        })
    }

    pub fn element_type(&self) -> CimType {
        self.element_type
    }

    pub fn elements(&self) -> &[Option<CimValue>] {
        &self.elements
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn contains_null(&self) -> bool {
        self.elements.iter().any(Option::is_none)
    }
}

impl CimValue {
    /// The declared type tag of this value (the element type for arrays)
    pub fn cim_type(&self) -> CimType {
        match self {
            Self::Boolean(_) => CimType::Boolean,
            Self::String(_) => CimType::String,
            Self::Char16(_) => CimType::Char16,
            Self::Uint8(_) => CimType::Uint8,
            Self::Sint8(_) => CimType::Sint8,
            Self::Uint16(_) => CimType::Uint16,
            Self::Sint16(_) => CimType::Sint16,
            Self::Uint32(_) => CimType::Uint32,
            Self::Sint32(_) => CimType::Sint32,
            Self::Uint64(_) => CimType::Uint64,
            Self::Sint64(_) => CimType::Sint64,
            Self::Real32(_) => CimType::Real32,
            Self::Real64(_) => CimType::Real64,
            Self::DateTime(_) => CimType::DateTime,
            Self::Reference(_) => CimType::Reference,
            Self::Array(a) => a.element_type(),
        }
    }

    pub fn is_array(&self) -> bool {
        matches!(self, Self::Array(_))
    }

    /// Checked construction of an integer value of the given width.
    ///
    /// Fails with a range error when `value` is outside the type's range,
    /// and with a usage error when `cim_type` is not an integer type.
    pub fn integer(cim_type: CimType, value: i128) -> ModelResult<Self> {
        cim_type.check_range(value)?;
        Ok(match cim_type {
            CimType::Uint8 => Self::Uint8(value as u8),
            CimType::Sint8 => Self::Sint8(value as i8),
            CimType::Uint16 => Self::Uint16(value as u16),
            CimType::Sint16 => Self::Sint16(value as i16),
            CimType::Uint32 => Self::Uint32(value as u32),
            CimType::Sint32 => Self::Sint32(value as i32),
            CimType::Uint64 => Self::Uint64(value as u64),
            CimType::Sint64 => Self::Sint64(value as i64),
            // check_range already rejected non-integer types
            _ => unreachable!(),
        })
    }

    /// Checked construction of a real value of the given width
    pub fn real(cim_type: CimType, value: f64) -> ModelResult<Self> {
        match cim_type {
            CimType::Real32 => Ok(Self::Real32(value as f32)),
            CimType::Real64 => Ok(Self::Real64(value)),
            other => Err(ModelError::Usage(format!("{other} is not a real type"))),
        }
    }

    /// Build an array value from non-null elements of a uniform type
    pub fn array(element_type: CimType, elements: Vec<CimValue>) -> ModelResult<Self> {
        Ok(Self::Array(CimArray::new(
            element_type,
            elements.into_iter().map(Some).collect(),
        )?))
    }

    /// Parse the canonical CIM string form of a scalar value.
    ///
    /// This is the decoding applied to `VALUE` and `KEYVALUE` character
    /// data; references arrive as structured elements and are rejected
    /// here.
    pub fn from_cim_str(cim_type: CimType, text: &str) -> ModelResult<Self> {
        let invalid = |reason: &str| ModelError::InvalidValue {
            cim_type,
            text: text.to_string(),
            reason: reason.to_string(),
        };
        match cim_type {
            CimType::Boolean => match text.to_ascii_lowercase().as_str() {
                "true" => Ok(Self::Boolean(true)),
                "false" => Ok(Self::Boolean(false)),
                _ => Err(invalid("expected 'true' or 'false'")),
            },
            CimType::String => Ok(Self::String(text.to_string())),
            CimType::Char16 => {
                let mut chars = text.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => Ok(Self::Char16(c)),
                    _ => Err(invalid("expected a single character")),
                }
            }
            t if t.is_integer() => {
                let value: i128 = text
                    .trim()
                    .parse()
                    .map_err(|_| invalid("expected a decimal integer"))?;
                Self::integer(t, value)
            }
            CimType::Real32 => text
                .trim()
                .parse::<f32>()
                .map(Self::Real32)
                .map_err(|_| invalid("expected a real number")),
            CimType::Real64 => text
                .trim()
                .parse::<f64>()
                .map(Self::Real64)
                .map_err(|_| invalid("expected a real number")),
            CimType::DateTime => text.parse::<CimDateTime>().map(Self::DateTime),
            CimType::Reference => Err(invalid(
                "references are structured values, not character data",
            )),
            // the guards above are exhaustive over the integer types
            _ => unreachable!(),
        }
    }

    /// The canonical CIM string form of this value
    pub fn to_cim_str(&self) -> String {
        match self {
            Self::Boolean(b) => b.to_string(),
            Self::String(s) => s.clone(),
            Self::Char16(c) => c.to_string(),
            Self::Uint8(v) => v.to_string(),
            Self::Sint8(v) => v.to_string(),
            Self::Uint16(v) => v.to_string(),
            Self::Sint16(v) => v.to_string(),
            Self::Uint32(v) => v.to_string(),
            Self::Sint32(v) => v.to_string(),
            Self::Uint64(v) => v.to_string(),
            Self::Sint64(v) => v.to_string(),
            Self::Real32(v) => v.to_string(),
            Self::Real64(v) => v.to_string(),
            Self::DateTime(dt) => dt.to_string(),
            Self::Reference(path) => path.to_wbem_uri(),
            Self::Array(a) => a
                .elements()
                .iter()
                .map(|e| match e {
                    Some(v) => v.to_cim_str(),
                    None => "NULL".to_string(),
                })
                .collect::<Vec<_>>()
                .join(","),
        }
    }

    /// Check this value against a declared type and array flag.
    ///
    /// Used by properties, parameters, and qualifiers, which all declare
    /// `(type, is_array)` and must only hold matching values.
    pub fn check_declared(&self, cim_type: CimType, is_array: bool) -> ModelResult<()> {
        if self.is_array() != is_array {
            return Err(ModelError::Usage(format!(
                "expected {} value, got {}",
                if is_array { "array" } else { "scalar" },
                if self.is_array() { "array" } else { "scalar" },
            )));
        }
        if self.cim_type() != cim_type {
            return Err(ModelError::Usage(format!(
                "expected {} value, got {}",
                cim_type,
                self.cim_type(),
            )));
        }
        Ok(())
    }

    /// Integer value widened to i128, when this is an integer variant
    pub fn as_integer(&self) -> Option<i128> {
        match self {
            Self::Uint8(v) => Some(i128::from(*v)),
            Self::Sint8(v) => Some(i128::from(*v)),
            Self::Uint16(v) => Some(i128::from(*v)),
            Self::Sint16(v) => Some(i128::from(*v)),
            Self::Uint32(v) => Some(i128::from(*v)),
            Self::Sint32(v) => Some(i128::from(*v)),
            Self::Uint64(v) => Some(i128::from(*v)),
            Self::Sint64(v) => Some(i128::from(*v)),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }
}

impl Hash for CimValue {
    /// Hand-written so that values equal under `PartialEq` hash equal
    /// (reals hash by bit pattern)
    fn hash<H: Hasher>(&self, state: &mut H) {
        mem::discriminant(self).hash(state);
        match self {
            Self::Boolean(b) => b.hash(state),
            Self::String(s) => s.hash(state),
            Self::Char16(c) => c.hash(state),
            Self::Uint8(v) => v.hash(state),
            Self::Sint8(v) => v.hash(state),
            Self::Uint16(v) => v.hash(state),
            Self::Sint16(v) => v.hash(state),
            Self::Uint32(v) => v.hash(state),
            Self::Sint32(v) => v.hash(state),
            Self::Uint64(v) => v.hash(state),
            Self::Sint64(v) => v.hash(state),
            Self::Real32(v) => v.to_bits().hash(state),
            Self::Real64(v) => v.to_bits().hash(state),
            Self::DateTime(dt) => dt.hash(state),
            Self::Reference(path) => path.hash(state),
            Self::Array(a) => {
                a.element_type().hash(state);
                a.elements().hash(state);
            }
        }
    }
}

impl PartialOrd for CimValue {
    /// Ordering within one scalar type; values of different types or
    /// array values are unordered
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        match (self, other) {
            (Self::Boolean(a), Self::Boolean(b)) => a.partial_cmp(b),
            (Self::String(a), Self::String(b)) => a.partial_cmp(b),
            (Self::Char16(a), Self::Char16(b)) => a.partial_cmp(b),
            (Self::Uint8(a), Self::Uint8(b)) => a.partial_cmp(b),
            (Self::Sint8(a), Self::Sint8(b)) => a.partial_cmp(b),
            (Self::Uint16(a), Self::Uint16(b)) => a.partial_cmp(b),
            (Self::Sint16(a), Self::Sint16(b)) => a.partial_cmp(b),
            (Self::Uint32(a), Self::Uint32(b)) => a.partial_cmp(b),
            (Self::Sint32(a), Self::Sint32(b)) => a.partial_cmp(b),
            (Self::Uint64(a), Self::Uint64(b)) => a.partial_cmp(b),
            (Self::Sint64(a), Self::Sint64(b)) => a.partial_cmp(b),
            (Self::Real32(a), Self::Real32(b)) => a.partial_cmp(b),
            (Self::Real64(a), Self::Real64(b)) => a.partial_cmp(b),
            (Self::DateTime(_), Self::DateTime(_)) => None,
            _ => None,
        }
    }
}

impl From<bool> for CimValue {
    fn from(v: bool) -> Self {
        Self::Boolean(v)
    }
}

impl From<&str> for CimValue {
    fn from(v: &str) -> Self {
        Self::String(v.to_string())
    }
}

impl From<String> for CimValue {
    fn from(v: String) -> Self {
        Self::String(v)
    }
}

impl From<u8> for CimValue {
    fn from(v: u8) -> Self {
        Self::Uint8(v)
    }
}

impl From<u16> for CimValue {
    fn from(v: u16) -> Self {
        Self::Uint16(v)
    }
}

impl From<u32> for CimValue {
    fn from(v: u32) -> Self {
        Self::Uint32(v)
    }
}

impl From<u64> for CimValue {
    fn from(v: u64) -> Self {
        Self::Uint64(v)
    }
}

impl From<i8> for CimValue {
    fn from(v: i8) -> Self {
        Self::Sint8(v)
    }
}

impl From<i16> for CimValue {
    fn from(v: i16) -> Self {
        Self::Sint16(v)
    }
}

impl From<i32> for CimValue {
    fn from(v: i32) -> Self {
        Self::Sint32(v)
    }
}

impl From<i64> for CimValue {
    fn from(v: i64) -> Self {
        Self::Sint64(v)
    }
}

impl From<CimDateTime> for CimValue {
    fn from(v: CimDateTime) -> Self {
        Self::DateTime(v)
    }
}

impl From<CimInstanceName> for CimValue {
    fn from(v: CimInstanceName) -> Self {
        Self::Reference(Box::new(v))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::collections::hash_map::DefaultHasher;

    fn hash_of(v: &CimValue) -> u64 {
        let mut h = DefaultHasher::new();
        v.hash(&mut h);
        h.finish()
    }

    #[test]
    fn integer_construction_checks_range() {
        assert_eq!(
            CimValue::integer(CimType::Uint8, 255).unwrap(),
            CimValue::Uint8(255)
        );
        let err = CimValue::integer(CimType::Uint8, 256).unwrap_err();
        assert!(matches!(
            err,
            ModelError::OutOfRange {
                cim_type: CimType::Uint8,
                value: 256
            }
        ));
        assert!(CimValue::integer(CimType::Sint8, -129).is_err());
        assert!(CimValue::integer(CimType::String, 1).is_err());
    }

    #[test]
    fn array_elements_must_be_uniform() {
        let err = CimArray::new(
            CimType::Uint8,
            vec![Some(CimValue::Uint8(1)), Some(CimValue::String("x".into()))],
        )
        .unwrap_err();
        assert!(matches!(
            err,
            ModelError::ArrayElementType { index: 1, .. }
        ));

        let a = CimArray::new(
            CimType::Uint8,
            vec![Some(CimValue::Uint8(1)), None, Some(CimValue::Uint8(3))],
        )
        .unwrap();
        assert!(a.contains_null());
        assert_eq!(a.len(), 3);
    }

    #[test]
    fn cim_string_forms_round_trip() {
        for (ty, text) in [
            (CimType::Boolean, "true"),
            (CimType::Uint32, "4096"),
            (CimType::Sint16, "-17"),
            (CimType::String, "hello"),
            (CimType::Char16, "x"),
            (CimType::DateTime, "20240101123045.123456+060"),
        ] {
            let value = CimValue::from_cim_str(ty, text).unwrap();
            assert_eq!(value.to_cim_str(), text);
            assert_eq!(value.cim_type(), ty);
        }
    }

    #[test]
    fn boolean_parse_is_case_insensitive() {
        assert_eq!(
            CimValue::from_cim_str(CimType::Boolean, "TRUE").unwrap(),
            CimValue::Boolean(true)
        );
        assert_eq!(
            CimValue::from_cim_str(CimType::Boolean, "False").unwrap(),
            CimValue::Boolean(false)
        );
        assert!(CimValue::from_cim_str(CimType::Boolean, "yes").is_err());
    }

    #[test]
    fn equal_reals_hash_equal() {
        let a = CimValue::Real64(1.5);
        let b = CimValue::Real64(1.5);
        assert_eq!(a, b);
        assert_eq!(hash_of(&a), hash_of(&b));
    }

    #[test]
    fn ordering_is_per_type() {
        assert!(CimValue::Uint8(1) < CimValue::Uint8(2));
        assert_eq!(
            CimValue::Uint8(1).partial_cmp(&CimValue::Uint16(2)),
            None
        );
    }

    proptest! {
        #[test]
        fn uint8_constructs_iff_in_range(x in -1000i128..2000) {
            let result = CimValue::integer(CimType::Uint8, x);
            prop_assert_eq!(result.is_ok(), (0..=255).contains(&x));
        }

        #[test]
        fn sint16_constructs_iff_in_range(x in -100_000i128..100_000) {
            let result = CimValue::integer(CimType::Sint16, x);
            prop_assert_eq!(result.is_ok(), (-32_768..=32_767).contains(&x));
        }

        #[test]
        fn integer_string_form_round_trips(x in 0u64..u64::MAX) {
            let value = CimValue::from_cim_str(CimType::Uint64, &x.to_string()).unwrap();
            prop_assert_eq!(value.to_cim_str(), x.to_string());
        }
    }
}
