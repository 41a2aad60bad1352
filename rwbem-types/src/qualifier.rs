//! CIM qualifiers and qualifier declarations

use crate::error::{ModelError, ModelResult};
use crate::name::CimName;
use crate::types::CimType;
use crate::value::CimValue;
use serde::{Deserialize, Serialize};

/// A qualifier applied to a class, property, method, or parameter.
///
/// The four flavor fields are tri-state: `None` means the flavor was not
/// stated on this application and the declaration's default applies.
#[derive(Debug, Clone, PartialEq)]
pub struct CimQualifier {
    pub name: CimName,
    pub value: Option<CimValue>,
    pub cim_type: CimType,
    pub propagated: bool,
    pub overridable: Option<bool>,
    pub tosubclass: Option<bool>,
    pub toinstance: Option<bool>,
    pub translatable: Option<bool>,
}

impl CimQualifier {
    pub fn new<N: Into<CimName>>(
        name: N,
        cim_type: CimType,
        value: Option<CimValue>,
    ) -> ModelResult<Self> {
        if let Some(v) = &value {
            // qualifier values may be scalar or array of the declared type
            if v.cim_type() != cim_type {
                return Err(ModelError::Usage(format!(
                    "qualifier value type {} does not match declared {}",
                    v.cim_type(),
                    cim_type
                )));
            }
        }
        Ok(Self {
            name: name.into(),
            value,
            cim_type,
            propagated: false,
            overridable: None,
            tosubclass: None,
            toinstance: None,
            translatable: None,
        })
    }

    /// Shorthand for the common `Name(true)` boolean qualifier
    pub fn boolean<N: Into<CimName>>(name: N, value: bool) -> Self {
        Self {
            name: name.into(),
            value: Some(CimValue::Boolean(value)),
            cim_type: CimType::Boolean,
            propagated: false,
            overridable: None,
            tosubclass: None,
            toinstance: None,
            translatable: None,
        }
    }

    /// Effective boolean value, for flag-style qualifiers like `Key`
    pub fn is_effectively_true(&self) -> bool {
        matches!(self.value, Some(CimValue::Boolean(true)))
    }
}

/// The element kinds a qualifier declaration applies to (DSP0004 scopes)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CimScopes {
    pub class: bool,
    pub association: bool,
    pub indication: bool,
    pub property: bool,
    pub reference: bool,
    pub method: bool,
    pub parameter: bool,
    pub any: bool,
}

impl CimScopes {
    pub fn any() -> Self {
        Self {
            any: true,
            ..Self::default()
        }
    }

    /// Scope names that are set, in DSP0004 declaration order
    pub fn names(&self) -> Vec<&'static str> {
        let mut names = Vec::new();
        if self.any {
            names.push("any");
            return names;
        }
        if self.class {
            names.push("class");
        }
        if self.association {
            names.push("association");
        }
        if self.indication {
            names.push("indication");
        }
        if self.property {
            names.push("property");
        }
        if self.reference {
            names.push("reference");
        }
        if self.method {
            names.push("method");
        }
        if self.parameter {
            names.push("parameter");
        }
        names
    }

    pub fn set(&mut self, name: &str) -> ModelResult<()> {
        match name.to_ascii_lowercase().as_str() {
            "class" => self.class = true,
            "association" => self.association = true,
            "indication" => self.indication = true,
            "property" => self.property = true,
            "reference" => self.reference = true,
            "method" => self.method = true,
            "parameter" => self.parameter = true,
            "any" => self.any = true,
            other => {
                return Err(ModelError::Usage(format!(
                    "unknown qualifier scope {other:?}"
                )))
            }
        }
        Ok(())
    }
}

/// A qualifier type declaration: the scopes, default value, and default
/// flavors that govern every application of the named qualifier
#[derive(Debug, Clone, PartialEq)]
pub struct CimQualifierDeclaration {
    pub name: CimName,
    pub cim_type: CimType,
    pub is_array: bool,
    pub array_size: Option<u32>,
    pub default_value: Option<CimValue>,
    pub scopes: CimScopes,
    pub overridable: Option<bool>,
    pub tosubclass: Option<bool>,
    pub toinstance: Option<bool>,
    pub translatable: Option<bool>,
}

impl CimQualifierDeclaration {
    pub fn new<N: Into<CimName>>(
        name: N,
        cim_type: CimType,
        is_array: bool,
        default_value: Option<CimValue>,
        scopes: CimScopes,
    ) -> ModelResult<Self> {
        if let Some(v) = &default_value {
            v.check_declared(cim_type, is_array)?;
        }
        Ok(Self {
            name: name.into(),
            cim_type,
            is_array,
            array_size: None,
            default_value,
            scopes,
            overridable: None,
            tosubclass: None,
            toinstance: None,
            translatable: None,
        })
    }

    /// Effective overridable flavor (DSP0004 default: true)
    pub fn effective_overridable(&self) -> bool {
        self.overridable.unwrap_or(true)
    }

    /// Effective tosubclass flavor (DSP0004 default: true)
    pub fn effective_tosubclass(&self) -> bool {
        self.tosubclass.unwrap_or(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn qualifier_value_type_is_checked() {
        assert!(CimQualifier::new(
            "Description",
            CimType::String,
            Some(CimValue::from("hi"))
        )
        .is_ok());
        assert!(CimQualifier::new(
            "Description",
            CimType::String,
            Some(CimValue::Boolean(true))
        )
        .is_err());
    }

    #[test]
    fn declaration_checks_default_value_shape() {
        let decl = CimQualifierDeclaration::new(
            "ValueMap",
            CimType::String,
            true,
            Some(CimValue::array(CimType::String, vec![CimValue::from("0")]).unwrap()),
            CimScopes::any(),
        );
        assert!(decl.is_ok());

        let bad = CimQualifierDeclaration::new(
            "ValueMap",
            CimType::String,
            true,
            Some(CimValue::from("scalar")),
            CimScopes::any(),
        );
        assert!(bad.is_err());
    }

    #[test]
    fn scope_names_follow_declaration_order() {
        let mut scopes = CimScopes::default();
        scopes.set("property").unwrap();
        scopes.set("CLASS").unwrap();
        assert_eq!(scopes.names(), ["class", "property"]);
        assert!(scopes.set("bogus").is_err());
    }

    #[test]
    fn flavor_defaults_follow_dsp0004() {
        let decl = CimQualifierDeclaration::new(
            "Version",
            CimType::String,
            false,
            None,
            CimScopes::any(),
        )
        .unwrap();
        assert!(decl.effective_overridable());
        assert!(decl.effective_tosubclass());
    }
}
