//! MOF rendering of CIM elements (DSP0004)
//!
//! Every CIM object renders to MOF text that the MOF compiler accepts
//! back, yielding a semantically equal object. Whitespace and comments
//! are not round-tripped; qualifier order follows the stored order.

use crate::class::CimClass;
use crate::instance::CimInstance;
use crate::method::{CimMethod, CimParameter};
use crate::property::CimProperty;
use crate::qualifier::{CimQualifier, CimQualifierDeclaration};
use crate::types::CimType;
use crate::value::CimValue;

const INDENT: &str = "   ";

/// Escape a string for a MOF double-quoted literal
pub fn escape_mof_string(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '\x08' => out.push_str("\\b"),
            '\x0c' => out.push_str("\\f"),
            other => out.push(other),
        }
    }
    out
}

/// Render a value as a MOF initializer
pub fn value_to_mof(value: &CimValue) -> String {
    match value {
        CimValue::String(s) => format!("\"{}\"", escape_mof_string(s)),
        CimValue::DateTime(dt) => format!("\"{dt}\""),
        CimValue::Reference(path) => format!("\"{}\"", escape_mof_string(&path.to_wbem_uri())),
        CimValue::Char16(c) => {
            if *c == '\'' || *c == '\\' {
                format!("'\\{c}'")
            } else {
                format!("'{c}'")
            }
        }
        CimValue::Real32(r) => real_literal(&r.to_string()),
        CimValue::Real64(r) => real_literal(&r.to_string()),
        CimValue::Array(array) => {
            let elements: Vec<String> = array
                .elements()
                .iter()
                .map(|e| match e {
                    Some(v) => value_to_mof(v),
                    None => "NULL".to_string(),
                })
                .collect();
            if elements.is_empty() {
                "{}".to_string()
            } else {
                format!("{{ {} }}", elements.join(", "))
            }
        }
        other => other.to_cim_str(),
    }
}

// MOF real literals need a decimal point to stay distinct from integers
fn real_literal(s: &str) -> String {
    if s.contains('.') || s.contains('e') || s.contains('E') {
        s.to_string()
    } else {
        format!("{s}.0")
    }
}

fn qualifier_to_mof(q: &CimQualifier) -> String {
    match &q.value {
        None => q.name.to_string(),
        Some(v @ CimValue::Array(_)) => format!("{} {}", q.name, value_to_mof(v)),
        Some(v) => format!("{} ( {} )", q.name, value_to_mof(v)),
    }
}

fn qualifiers_line<'a>(
    qualifiers: impl Iterator<Item = &'a CimQualifier>,
    indent: &str,
) -> String {
    let rendered: Vec<String> = qualifiers.map(qualifier_to_mof).collect();
    if rendered.is_empty() {
        String::new()
    } else {
        format!("{indent}[{}]\n", rendered.join(", "))
    }
}

fn type_and_name(
    cim_type: CimType,
    reference_class: Option<&crate::name::CimName>,
    name: &crate::name::CimName,
    is_array: bool,
    array_size: Option<u32>,
) -> String {
    let type_part = match (cim_type, reference_class) {
        (CimType::Reference, Some(class)) => format!("{class} REF"),
        (CimType::Reference, None) => "REF".to_string(),
        (ty, _) => ty.as_str().to_string(),
    };
    let suffix = if is_array {
        match array_size {
            Some(n) => format!("[{n}]"),
            None => "[]".to_string(),
        }
    } else {
        String::new()
    };
    format!("{type_part} {name}{suffix}")
}

impl CimProperty {
    /// MOF form of this property as a class member
    pub fn to_mof(&self) -> String {
        let mut out = qualifiers_line(self.qualifiers.values(), INDENT);
        out.push_str(INDENT);
        out.push_str(&type_and_name(
            self.cim_type,
            self.reference_class.as_ref(),
            &self.name,
            self.is_array,
            self.array_size,
        ));
        if let Some(value) = &self.value {
            out.push_str(" = ");
            out.push_str(&value_to_mof(value));
        }
        out.push_str(";\n");
        out
    }
}

impl CimParameter {
    pub fn to_mof(&self) -> String {
        let mut out = qualifiers_line(self.qualifiers.values(), &format!("{INDENT}{INDENT}"));
        out.push_str(INDENT);
        out.push_str(INDENT);
        out.push_str(&type_and_name(
            self.cim_type,
            self.reference_class.as_ref(),
            &self.name,
            self.is_array,
            self.array_size,
        ));
        out
    }
}

impl CimMethod {
    pub fn to_mof(&self) -> String {
        let mut out = qualifiers_line(self.qualifiers.values(), INDENT);
        out.push_str(INDENT);
        out.push_str(&format!("{} {}(", self.return_type, self.name));
        let params: Vec<String> = self.parameters.values().map(CimParameter::to_mof).collect();
        if params.is_empty() {
            out.push_str(");\n");
        } else {
            out.push('\n');
            out.push_str(&params.join(",\n"));
            out.push_str(");\n");
        }
        out
    }
}

impl CimClass {
    /// MOF form of this class declaration
    pub fn to_mof(&self) -> String {
        let mut out = qualifiers_line(self.qualifiers.values(), "");
        out.push_str(&format!("class {}", self.class_name));
        if let Some(superclass) = &self.superclass {
            out.push_str(&format!(" : {superclass}"));
        }
        out.push_str(" {\n\n");
        for property in self.properties.values() {
            out.push_str(&property.to_mof());
            out.push('\n');
        }
        for method in self.methods.values() {
            out.push_str(&method.to_mof());
            out.push('\n');
        }
        out.push_str("};\n");
        out
    }
}

impl CimInstance {
    /// MOF form of this instance
    pub fn to_mof(&self) -> String {
        let mut out = qualifiers_line(self.qualifiers.values(), "");
        out.push_str(&format!("instance of {} {{\n", self.class_name));
        for (name, property) in self.properties.iter() {
            match &property.value {
                Some(value) => {
                    out.push_str(&format!("{INDENT}{name} = {};\n", value_to_mof(value)))
                }
                None => out.push_str(&format!("{INDENT}{name} = NULL;\n")),
            }
        }
        out.push_str("};\n");
        out
    }
}

impl CimQualifierDeclaration {
    /// MOF form of this qualifier type declaration
    pub fn to_mof(&self) -> String {
        let mut out = format!("Qualifier {} : {}", self.name, self.cim_type);
        if self.is_array {
            match self.array_size {
                Some(n) => out.push_str(&format!("[{n}]")),
                None => out.push_str("[]"),
            }
        }
        if let Some(default) = &self.default_value {
            out.push_str(&format!(" = {}", value_to_mof(default)));
        }
        let scopes = self.scopes.names();
        if scopes.is_empty() {
            out.push_str(",\n    Scope(any)");
        } else {
            out.push_str(&format!(",\n    Scope({})", scopes.join(", ")));
        }
        let mut flavors = Vec::new();
        match self.overridable {
            Some(true) => flavors.push("EnableOverride"),
            Some(false) => flavors.push("DisableOverride"),
            None => {}
        }
        match self.tosubclass {
            Some(true) => flavors.push("ToSubclass"),
            Some(false) => flavors.push("Restricted"),
            None => {}
        }
        if self.translatable == Some(true) {
            flavors.push("Translatable");
        }
        if self.toinstance == Some(true) {
            flavors.push("ToInstance");
        }
        if !flavors.is_empty() {
            out.push_str(&format!(",\n    Flavor({})", flavors.join(", ")));
        }
        out.push_str(";\n");
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::qualifier::CimScopes;

    #[test]
    fn property_mof_includes_qualifiers_and_default() {
        let p = CimProperty::new("Level", CimType::Uint8, false, Some(CimValue::Uint8(5)))
            .unwrap()
            .with_qualifier(CimQualifier::boolean("Key", true));
        assert_eq!(p.to_mof(), "   [Key ( true )]\n   uint8 Level = 5;\n");
    }

    #[test]
    fn array_property_mof() {
        let p = CimProperty::new(
            "Codes",
            CimType::Uint16,
            true,
            Some(CimValue::array(CimType::Uint16, vec![CimValue::Uint16(1), CimValue::Uint16(2)]).unwrap()),
        )
        .unwrap();
        assert_eq!(p.to_mof(), "   uint16 Codes[] = { 1, 2 };\n");
    }

    #[test]
    fn class_mof_shape() {
        let class = CimClass::new("Foo")
            .with_superclass("Base")
            .with_property(CimProperty::new("P", CimType::Uint8, false, None).unwrap());
        let mof = class.to_mof();
        assert!(mof.starts_with("class Foo : Base {\n"));
        assert!(mof.contains("   uint8 P;\n"));
        assert!(mof.ends_with("};\n"));
    }

    #[test]
    fn reference_property_uses_ref_syntax() {
        let p = CimProperty::reference("Antecedent", "CIM_System", None).unwrap();
        assert_eq!(p.to_mof(), "   CIM_System REF Antecedent;\n");
    }

    #[test]
    fn strings_are_escaped() {
        assert_eq!(
            value_to_mof(&CimValue::from("a\"b\\c\nd")),
            "\"a\\\"b\\\\c\\nd\""
        );
    }

    #[test]
    fn reals_keep_a_decimal_point() {
        assert_eq!(value_to_mof(&CimValue::Real64(1.0)), "1.0");
        assert_eq!(value_to_mof(&CimValue::Real32(2.5)), "2.5");
    }

    #[test]
    fn qualifier_declaration_mof() {
        let mut scopes = CimScopes::default();
        scopes.set("class").unwrap();
        scopes.set("property").unwrap();
        let mut decl = CimQualifierDeclaration::new(
            "Description",
            CimType::String,
            false,
            None,
            scopes,
        )
        .unwrap();
        decl.overridable = Some(true);
        decl.tosubclass = Some(true);
        decl.translatable = Some(true);
        assert_eq!(
            decl.to_mof(),
            "Qualifier Description : string,\n    Scope(class, property),\n    Flavor(EnableOverride, ToSubclass, Translatable);\n"
        );
    }

    #[test]
    fn instance_mof_lists_property_values() {
        let inst = CimInstance::new("Foo")
            .with_property(
                CimProperty::new("A", CimType::String, false, Some(CimValue::from("x"))).unwrap(),
            )
            .with_property(CimProperty::new("B", CimType::Uint8, false, None).unwrap());
        assert_eq!(
            inst.to_mof(),
            "instance of Foo {\n   A = \"x\";\n   B = NULL;\n};\n"
        );
    }
}
