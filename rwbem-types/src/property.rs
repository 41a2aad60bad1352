//! CIM property declarations and instance property values

use crate::error::{ModelError, ModelResult};
use crate::map::NameMap;
use crate::name::CimName;
use crate::qualifier::CimQualifier;
use crate::types::CimType;
use crate::value::CimValue;

/// A property of a class or instance.
///
/// The same shape serves both roles: on a class it is the declaration
/// (value = default), on an instance it carries the instance's value.
/// `class_origin` and `propagated` describe inheritance provenance.
#[derive(Debug, Clone, PartialEq)]
pub struct CimProperty {
    pub name: CimName,
    pub value: Option<CimValue>,
    pub cim_type: CimType,
    pub is_array: bool,
    pub array_size: Option<u32>,
    /// Referenced class, for REF-typed properties only
    pub reference_class: Option<CimName>,
    pub class_origin: Option<CimName>,
    pub propagated: bool,
    pub qualifiers: NameMap<CimQualifier>,
}

impl CimProperty {
    /// Declare a property with an explicit type; the value may be absent
    /// (NULL)
    pub fn new<N: Into<CimName>>(
        name: N,
        cim_type: CimType,
        is_array: bool,
        value: Option<CimValue>,
    ) -> ModelResult<Self> {
        if let Some(v) = &value {
            v.check_declared(cim_type, is_array)?;
        }
        Ok(Self {
            name: name.into(),
            value,
            cim_type,
            is_array,
            array_size: None,
            reference_class: None,
            class_origin: None,
            propagated: false,
            qualifiers: NameMap::new(),
        })
    }

    /// Declare a property, inferring type and arrayness from the value
    pub fn from_value<N: Into<CimName>>(name: N, value: CimValue) -> Self {
        Self {
            name: name.into(),
            cim_type: value.cim_type(),
            is_array: value.is_array(),
            value: Some(value),
            array_size: None,
            reference_class: None,
            class_origin: None,
            propagated: false,
            qualifiers: NameMap::new(),
        }
    }

    /// Declare a REF-typed property
    pub fn reference<N: Into<CimName>, R: Into<CimName>>(
        name: N,
        reference_class: R,
        value: Option<CimValue>,
    ) -> ModelResult<Self> {
        if let Some(v) = &value {
            v.check_declared(CimType::Reference, false)?;
        }
        Ok(Self {
            name: name.into(),
            value,
            cim_type: CimType::Reference,
            is_array: false,
            array_size: None,
            reference_class: Some(reference_class.into()),
            class_origin: None,
            propagated: false,
            qualifiers: NameMap::new(),
        })
    }

    pub fn with_qualifier(mut self, qualifier: CimQualifier) -> Self {
        self.qualifiers.insert(qualifier.name.clone(), qualifier);
        self
    }

    pub fn with_class_origin<N: Into<CimName>>(mut self, origin: N) -> Self {
        self.class_origin = Some(origin.into());
        self
    }

    /// Replace the value, re-checking it against the declared type
    pub fn set_value(&mut self, value: Option<CimValue>) -> ModelResult<()> {
        if let Some(v) = &value {
            v.check_declared(self.cim_type, self.is_array)?;
        }
        self.value = value;
        Ok(())
    }

    /// Whether this property carries the `Key` qualifier
    pub fn is_key(&self) -> bool {
        self.qualifiers
            .get("Key")
            .is_some_and(CimQualifier::is_effectively_true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn value_must_match_declared_type() {
        assert!(CimProperty::new("P", CimType::Uint8, false, Some(CimValue::Uint8(5))).is_ok());
        assert!(
            CimProperty::new("P", CimType::Uint8, false, Some(CimValue::Uint16(5))).is_err()
        );
        assert!(CimProperty::new("P", CimType::Uint8, true, Some(CimValue::Uint8(5))).is_err());
        assert!(CimProperty::new("P", CimType::Uint8, false, None).is_ok());
    }

    #[test]
    fn set_value_rechecks() {
        let mut p = CimProperty::new("P", CimType::String, false, None).unwrap();
        assert!(p.set_value(Some(CimValue::from("ok"))).is_ok());
        assert!(p.set_value(Some(CimValue::Uint8(1))).is_err());
        assert_eq!(p.value, Some(CimValue::from("ok")));
    }

    #[test]
    fn key_flag_reads_the_qualifier() {
        let p = CimProperty::new("Id", CimType::String, false, None)
            .unwrap()
            .with_qualifier(CimQualifier::boolean("Key", true));
        assert!(p.is_key());
        let q = CimProperty::new("Other", CimType::String, false, None).unwrap();
        assert!(!q.is_key());
    }

    #[test]
    fn reference_properties_carry_their_class() {
        let p = CimProperty::reference("Antecedent", "CIM_System", None).unwrap();
        assert_eq!(p.cim_type, CimType::Reference);
        assert_eq!(p.reference_class.as_ref().unwrap(), "cim_system");
    }
}
