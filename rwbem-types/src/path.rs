//! CIM object paths: class names and instance names
//!
//! An instance name identifies an instance by class name and keybindings,
//! optionally qualified by namespace and host. The canonical string form
//! follows the DSP0207 WBEM URI (`//host/namespace:Class.Key="v"`).

use crate::error::{ModelError, ModelResult};
use crate::map::NameMap;
use crate::name::{fold_namespace, normalize_namespace, CimName};
use crate::value::CimValue;
use std::fmt;
use std::hash::{Hash, Hasher};

/// A class path: class name with optional namespace and host
#[derive(Debug, Clone)]
pub struct CimClassName {
    pub class_name: CimName,
    pub namespace: Option<String>,
    pub host: Option<String>,
}

impl CimClassName {
    pub fn new<N: Into<CimName>>(class_name: N) -> Self {
        Self {
            class_name: class_name.into(),
            namespace: None,
            host: None,
        }
    }

    pub fn with_namespace<S: Into<String>>(mut self, namespace: S) -> Self {
        self.namespace = Some(normalize_namespace(&namespace.into()));
        self
    }

    pub fn with_host<S: Into<String>>(mut self, host: S) -> Self {
        self.host = Some(host.into());
        self
    }

    /// The DSP0207 URI form of this class path
    pub fn to_wbem_uri(&self) -> String {
        let mut uri = String::new();
        if let Some(host) = &self.host {
            uri.push_str("//");
            uri.push_str(host);
            uri.push('/');
        }
        if let Some(ns) = &self.namespace {
            uri.push_str(&normalize_namespace(ns));
            uri.push(':');
        }
        uri.push_str(self.class_name.as_str());
        uri
    }
}

impl PartialEq for CimClassName {
    fn eq(&self, other: &Self) -> bool {
        self.class_name == other.class_name
            && folded_namespace(&self.namespace) == folded_namespace(&other.namespace)
            && folded_host(&self.host) == folded_host(&other.host)
    }
}

impl Eq for CimClassName {}

impl Hash for CimClassName {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.class_name.hash(state);
        folded_namespace(&self.namespace).hash(state);
        folded_host(&self.host).hash(state);
    }
}

impl fmt::Display for CimClassName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_wbem_uri())
    }
}

/// An instance name: class name, optional namespace/host, keybindings.
///
/// Keybindings map key property names to non-null, non-array values of
/// the key-capable types (string, char16, integer, boolean, datetime,
/// reference); construction rejects anything else, so an instance name
/// that exists satisfies the keybinding invariants. Equality and hashing
/// are case-insensitive over the class name, namespace, host, and key
/// names.
#[derive(Debug, Clone)]
pub struct CimInstanceName {
    pub class_name: CimName,
    pub namespace: Option<String>,
    pub host: Option<String>,
    keybindings: NameMap<CimValue>,
}

impl CimInstanceName {
    pub fn new<N: Into<CimName>>(class_name: N) -> Self {
        Self {
            class_name: class_name.into(),
            namespace: None,
            host: None,
            keybindings: NameMap::new(),
        }
    }

    /// Build with keybindings in one step
    pub fn with_keybindings<N, I>(class_name: N, bindings: I) -> ModelResult<Self>
    where
        N: Into<CimName>,
        I: IntoIterator<Item = (CimName, CimValue)>,
    {
        let mut path = Self::new(class_name);
        for (name, value) in bindings {
            path.bind(name, value)?;
        }
        Ok(path)
    }

    pub fn with_namespace<S: Into<String>>(mut self, namespace: S) -> Self {
        self.namespace = Some(normalize_namespace(&namespace.into()));
        self
    }

    pub fn with_host<S: Into<String>>(mut self, host: S) -> Self {
        self.host = Some(host.into());
        self
    }

    /// Add or replace one keybinding.
    ///
    /// Arrays and reals are not key-capable; both fail with a usage error.
    pub fn bind<N: Into<CimName>>(&mut self, name: N, value: CimValue) -> ModelResult<()> {
        let name = name.into();
        if value.is_array() {
            return Err(ModelError::Usage(format!(
                "keybinding {name} cannot hold an array value"
            )));
        }
        if value.cim_type().is_real() {
            return Err(ModelError::Usage(format!(
                "keybinding {name} cannot hold a real value"
            )));
        }
        self.keybindings.insert(name, value);
        Ok(())
    }

    pub fn keybindings(&self) -> &NameMap<CimValue> {
        &self.keybindings
    }

    pub fn keybinding(&self, name: &str) -> Option<&CimValue> {
        self.keybindings.get(name)
    }

    /// The DSP0207 URI form, keybindings in insertion order
    pub fn to_wbem_uri(&self) -> String {
        let mut uri = String::new();
        if let Some(host) = &self.host {
            uri.push_str("//");
            uri.push_str(host);
            uri.push('/');
        }
        if let Some(ns) = &self.namespace {
            uri.push_str(&normalize_namespace(ns));
            uri.push(':');
        }
        uri.push_str(self.class_name.as_str());
        for (i, (name, value)) in self.keybindings.iter().enumerate() {
            uri.push(if i == 0 { '.' } else { ',' });
            uri.push_str(name.as_str());
            uri.push('=');
            push_key_value(&mut uri, value);
        }
        uri
    }

    /// A folded, key-sorted form suitable as a storage key.
    ///
    /// Host and namespace are excluded: repositories bucket instances by
    /// namespace already, and the host never participates in identity
    /// within a repository.
    pub fn canonical_key(&self) -> String {
        let mut pairs: Vec<(String, String)> = self
            .keybindings
            .iter()
            .map(|(name, value)| (name.folded(), key_value_string(value)))
            .collect();
        pairs.sort();
        let mut key = self.class_name.folded();
        for (i, (name, value)) in pairs.iter().enumerate() {
            key.push(if i == 0 { '.' } else { ',' });
            key.push_str(name);
            key.push('=');
            key.push_str(value);
        }
        key
    }
}

impl PartialEq for CimInstanceName {
    fn eq(&self, other: &Self) -> bool {
        self.class_name == other.class_name
            && folded_namespace(&self.namespace) == folded_namespace(&other.namespace)
            && folded_host(&self.host) == folded_host(&other.host)
            && self.keybindings == other.keybindings
    }
}

impl Eq for CimInstanceName {}

impl Hash for CimInstanceName {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.class_name.hash(state);
        folded_namespace(&self.namespace).hash(state);
        folded_host(&self.host).hash(state);
        // order-insensitive equality needs an order-normalized hash
        let mut entries: Vec<(String, &CimValue)> = self
            .keybindings
            .iter()
            .map(|(name, value)| (name.folded(), value))
            .collect();
        entries.sort_by(|a, b| a.0.cmp(&b.0));
        for (name, value) in entries {
            name.hash(state);
            value.hash(state);
        }
    }
}

impl fmt::Display for CimInstanceName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_wbem_uri())
    }
}

/// Either a class path or an instance path, at operation boundaries that
/// accept both (association and reference traversal)
#[derive(Debug, Clone, PartialEq)]
pub enum ObjectName {
    Class(CimClassName),
    Instance(CimInstanceName),
}

impl ObjectName {
    pub fn class_name(&self) -> &CimName {
        match self {
            Self::Class(c) => &c.class_name,
            Self::Instance(i) => &i.class_name,
        }
    }

    pub fn namespace(&self) -> Option<&str> {
        match self {
            Self::Class(c) => c.namespace.as_deref(),
            Self::Instance(i) => i.namespace.as_deref(),
        }
    }
}

impl From<CimClassName> for ObjectName {
    fn from(c: CimClassName) -> Self {
        Self::Class(c)
    }
}

impl From<CimInstanceName> for ObjectName {
    fn from(i: CimInstanceName) -> Self {
        Self::Instance(i)
    }
}

fn folded_namespace(ns: &Option<String>) -> Option<String> {
    ns.as_deref().map(fold_namespace)
}

fn folded_host(host: &Option<String>) -> Option<String> {
    host.as_deref().map(str::to_ascii_lowercase)
}

fn push_key_value(out: &mut String, value: &CimValue) {
    match value {
        CimValue::String(_) | CimValue::Char16(_) | CimValue::DateTime(_) => {
            out.push('"');
            for c in value.to_cim_str().chars() {
                if c == '"' || c == '\\' {
                    out.push('\\');
                }
                out.push(c);
            }
            out.push('"');
        }
        CimValue::Reference(path) => {
            out.push('"');
            for c in path.to_wbem_uri().chars() {
                if c == '"' || c == '\\' {
                    out.push('\\');
                }
                out.push(c);
            }
            out.push('"');
        }
        other => out.push_str(&other.to_cim_str()),
    }
}

fn key_value_string(value: &CimValue) -> String {
    let mut s = String::new();
    push_key_value(&mut s, value);
    s
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::hash_map::DefaultHasher;

    fn path() -> CimInstanceName {
        let mut p = CimInstanceName::new("CIM_Foo").with_namespace("root/cimv2");
        p.bind("Name", CimValue::from("node1")).unwrap();
        p.bind("Index", CimValue::Uint32(7)).unwrap();
        p
    }

    fn hash_of(p: &CimInstanceName) -> u64 {
        let mut h = DefaultHasher::new();
        p.hash(&mut h);
        h.finish()
    }

    #[test]
    fn uri_form_lists_keybindings_in_order() {
        assert_eq!(
            path().to_wbem_uri(),
            "root/cimv2:CIM_Foo.Name=\"node1\",Index=7"
        );
    }

    #[test]
    fn uri_includes_host_authority() {
        let p = path().with_host("acme.com:5989");
        assert_eq!(
            p.to_wbem_uri(),
            "//acme.com:5989/root/cimv2:CIM_Foo.Name=\"node1\",Index=7"
        );
    }

    #[test]
    fn equality_folds_case_and_ignores_binding_order() {
        let mut a = CimInstanceName::new("CIM_Foo").with_namespace("ROOT/CIMV2");
        a.bind("INDEX", CimValue::Uint32(7)).unwrap();
        a.bind("name", CimValue::from("node1")).unwrap();
        assert_eq!(a, path());
        assert_eq!(hash_of(&a), hash_of(&path()));
    }

    #[test]
    fn string_key_values_stay_case_sensitive() {
        let mut a = CimInstanceName::new("CIM_Foo");
        a.bind("Name", CimValue::from("Node1")).unwrap();
        let mut b = CimInstanceName::new("CIM_Foo");
        b.bind("Name", CimValue::from("node1")).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn arrays_and_reals_are_rejected_as_keys() {
        let mut p = CimInstanceName::new("CIM_Foo");
        assert!(p
            .bind(
                "K",
                CimValue::array(crate::types::CimType::Uint8, vec![CimValue::Uint8(1)]).unwrap()
            )
            .is_err());
        assert!(p.bind("K", CimValue::Real32(1.5)).is_err());
    }

    #[test]
    fn canonical_key_sorts_and_folds() {
        let mut a = CimInstanceName::new("cim_foo");
        a.bind("b", CimValue::Uint8(2)).unwrap();
        a.bind("A", CimValue::Uint8(1)).unwrap();
        assert_eq!(a.canonical_key(), "cim_foo.a=1,b=2");
    }

    #[test]
    fn quotes_in_string_keys_are_escaped() {
        let mut p = CimInstanceName::new("C");
        p.bind("K", CimValue::from("a\"b\\c")).unwrap();
        assert_eq!(p.to_wbem_uri(), "C.K=\"a\\\"b\\\\c\"");
    }
}
