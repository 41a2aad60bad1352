//! CIM instances

use crate::error::{ModelError, ModelResult};
use crate::map::NameMap;
use crate::name::CimName;
use crate::path::CimInstanceName;
use crate::property::CimProperty;
use crate::qualifier::CimQualifier;
use crate::value::CimValue;

/// A CIM instance: a class name, an optional instance path, and property
/// values in declaration order.
///
/// Equality uses the path when both sides carry one (the path *is* the
/// instance's identity); otherwise it falls back to structural comparison
/// of class name and property map.
#[derive(Debug, Clone)]
pub struct CimInstance {
    pub class_name: CimName,
    pub path: Option<CimInstanceName>,
    pub properties: NameMap<CimProperty>,
    pub qualifiers: NameMap<CimQualifier>,
}

impl CimInstance {
    pub fn new<N: Into<CimName>>(class_name: N) -> Self {
        Self {
            class_name: class_name.into(),
            path: None,
            properties: NameMap::new(),
            qualifiers: NameMap::new(),
        }
    }

    pub fn with_path(mut self, path: CimInstanceName) -> Self {
        self.path = Some(path);
        self
    }

    pub fn with_property(mut self, property: CimProperty) -> Self {
        self.properties.insert(property.name.clone(), property);
        self
    }

    pub fn with_qualifier(mut self, qualifier: CimQualifier) -> Self {
        self.qualifiers.insert(qualifier.name.clone(), qualifier);
        self
    }

    /// Set a property value, declaring the property from the value when
    /// it does not exist yet
    pub fn set_property<N: Into<CimName>>(
        &mut self,
        name: N,
        value: Option<CimValue>,
    ) -> ModelResult<()> {
        let name = name.into();
        match self.properties.get_mut(name.as_str()) {
            Some(existing) => existing.set_value(value),
            None => {
                let property = match value {
                    Some(v) => CimProperty::from_value(name.clone(), v),
                    None => {
                        return Err(ModelError::Usage(format!(
                            "cannot declare property {name} from a NULL value"
                        )))
                    }
                };
                self.properties.insert(name, property);
                Ok(())
            }
        }
    }

    pub fn property_value(&self, name: &str) -> Option<&CimValue> {
        self.properties.get(name).and_then(|p| p.value.as_ref())
    }

    /// Derive the instance name from the properties carrying the `Key`
    /// qualifier.
    ///
    /// Fails when no key property has a value: instance names of keyed
    /// classes must never have empty keybindings.
    pub fn build_path(&self, namespace: Option<&str>) -> ModelResult<CimInstanceName> {
        let mut path = CimInstanceName::new(self.class_name.clone());
        if let Some(ns) = namespace {
            path = path.with_namespace(ns);
        }
        for (name, property) in self.properties.iter() {
            if property.is_key() {
                match &property.value {
                    Some(value) => path.bind(name.clone(), value.clone())?,
                    None => {
                        return Err(ModelError::Usage(format!(
                            "key property {name} has no value"
                        )))
                    }
                }
            }
        }
        if path.keybindings().is_empty() {
            return Err(ModelError::Usage(format!(
                "instance of {} has no key property values",
                self.class_name
            )));
        }
        Ok(path)
    }
}

impl PartialEq for CimInstance {
    fn eq(&self, other: &Self) -> bool {
        match (&self.path, &other.path) {
            (Some(a), Some(b)) => a == b,
            _ => self.class_name == other.class_name && self.properties == other.properties,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::CimType;

    fn keyed_instance() -> CimInstance {
        CimInstance::new("CIM_Fan")
            .with_property(
                CimProperty::new(
                    "DeviceID",
                    CimType::String,
                    false,
                    Some(CimValue::from("fan0")),
                )
                .unwrap()
                .with_qualifier(CimQualifier::boolean("Key", true)),
            )
            .with_property(
                CimProperty::new(
                    "ActiveCooling",
                    CimType::Boolean,
                    false,
                    Some(CimValue::Boolean(true)),
                )
                .unwrap(),
            )
    }

    #[test]
    fn build_path_collects_key_values() {
        let path = keyed_instance().build_path(Some("root/cimv2")).unwrap();
        assert_eq!(path.to_wbem_uri(), "root/cimv2:CIM_Fan.DeviceID=\"fan0\"");
    }

    #[test]
    fn build_path_requires_key_values() {
        let mut inst = keyed_instance();
        inst.properties
            .get_mut("DeviceID")
            .unwrap()
            .set_value(None)
            .unwrap();
        assert!(inst.build_path(None).is_err());
    }

    #[test]
    fn equality_prefers_paths() {
        let mut a = keyed_instance();
        let mut b = keyed_instance();
        b.set_property("ActiveCooling", Some(CimValue::Boolean(false)))
            .unwrap();
        // structurally different
        assert_ne!(a, b);
        // but identical under the same path
        let path = a.build_path(None).unwrap();
        a = a.with_path(path.clone());
        b = b.with_path(path);
        assert_eq!(a, b);
    }

    #[test]
    fn set_property_declares_from_value() {
        let mut inst = CimInstance::new("Foo");
        inst.set_property("Count", Some(CimValue::Uint32(3))).unwrap();
        assert_eq!(inst.property_value("count"), Some(&CimValue::Uint32(3)));
        assert!(inst.set_property("Null", None).is_err());
    }
}
