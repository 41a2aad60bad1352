//! CIM class declarations

use crate::map::NameMap;
use crate::method::CimMethod;
use crate::name::CimName;
use crate::path::CimClassName;
use crate::property::CimProperty;
use crate::qualifier::CimQualifier;

/// A CIM class: named properties, methods, and qualifiers, optionally
/// derived from a superclass.
///
/// Property and method maps preserve declaration order for output and
/// are case-insensitive for lookup.
#[derive(Debug, Clone, PartialEq)]
pub struct CimClass {
    pub class_name: CimName,
    pub superclass: Option<CimName>,
    pub properties: NameMap<CimProperty>,
    pub methods: NameMap<CimMethod>,
    pub qualifiers: NameMap<CimQualifier>,
    /// Populated from responses that carry a class path
    pub path: Option<CimClassName>,
}

impl CimClass {
    pub fn new<N: Into<CimName>>(class_name: N) -> Self {
        Self {
            class_name: class_name.into(),
            superclass: None,
            properties: NameMap::new(),
            methods: NameMap::new(),
            qualifiers: NameMap::new(),
            path: None,
        }
    }

    pub fn with_superclass<N: Into<CimName>>(mut self, superclass: N) -> Self {
        self.superclass = Some(superclass.into());
        self
    }

    pub fn with_property(mut self, property: CimProperty) -> Self {
        self.properties.insert(property.name.clone(), property);
        self
    }

    pub fn with_method(mut self, method: CimMethod) -> Self {
        self.methods.insert(method.name.clone(), method);
        self
    }

    pub fn with_qualifier(mut self, qualifier: CimQualifier) -> Self {
        self.qualifiers.insert(qualifier.name.clone(), qualifier);
        self
    }

    /// Names of the properties carrying the `Key` qualifier
    pub fn key_property_names(&self) -> Vec<&CimName> {
        self.properties
            .iter()
            .filter(|(_, p)| p.is_key())
            .map(|(name, _)| name)
            .collect()
    }

    /// Whether this class declares or inherits any key property
    pub fn is_keyed(&self) -> bool {
        self.properties.values().any(CimProperty::is_key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::CimType;

    #[test]
    fn key_properties_are_discoverable() {
        let class = CimClass::new("CIM_Disk")
            .with_superclass("CIM_StorageExtent")
            .with_property(
                CimProperty::new("DeviceID", CimType::String, false, None)
                    .unwrap()
                    .with_qualifier(CimQualifier::boolean("Key", true)),
            )
            .with_property(CimProperty::new("BlockSize", CimType::Uint64, false, None).unwrap());

        assert!(class.is_keyed());
        let keys: Vec<_> = class
            .key_property_names()
            .into_iter()
            .map(|n| n.as_str())
            .collect();
        assert_eq!(keys, ["DeviceID"]);
    }

    #[test]
    fn class_equality_ignores_member_order() {
        let a = CimClass::new("Foo")
            .with_property(CimProperty::new("A", CimType::Uint8, false, None).unwrap())
            .with_property(CimProperty::new("B", CimType::Uint8, false, None).unwrap());
        let b = CimClass::new("FOO")
            .with_property(CimProperty::new("B", CimType::Uint8, false, None).unwrap())
            .with_property(CimProperty::new("A", CimType::Uint8, false, None).unwrap());
        assert_eq!(a, b);
    }
}
