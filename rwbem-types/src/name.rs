//! Case-preserving, case-insensitive CIM element names

use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::{Hash, Hasher};

/// A CIM element name (class, property, method, parameter, or qualifier
/// identifier).
///
/// Comparison and hashing fold ASCII case (CIM identifiers are ASCII per
/// DSP0004); the original spelling is preserved and used for output.
///
/// ```
/// use rwbem_types::CimName;
///
/// let a = CimName::new("CIM_ManagedElement");
/// let b = CimName::new("cim_managedelement");
/// assert_eq!(a, b);
/// assert_eq!(a.as_str(), "CIM_ManagedElement");
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CimName(String);

impl CimName {
    /// Create a name, preserving the given spelling
    pub fn new<S: Into<String>>(name: S) -> Self {
        Self(name.into())
    }

    /// The preserved original spelling
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consume the name, returning the original spelling
    pub fn into_string(self) -> String {
        self.0
    }

    /// The ASCII-folded form used for comparison and storage keys
    pub fn folded(&self) -> String {
        self.0.to_ascii_lowercase()
    }
}

impl PartialEq for CimName {
    fn eq(&self, other: &Self) -> bool {
        self.0.eq_ignore_ascii_case(&other.0)
    }
}

impl Eq for CimName {}

impl PartialEq<str> for CimName {
    fn eq(&self, other: &str) -> bool {
        self.0.eq_ignore_ascii_case(other)
    }
}

impl PartialEq<&str> for CimName {
    fn eq(&self, other: &&str) -> bool {
        self.0.eq_ignore_ascii_case(other)
    }
}

impl Hash for CimName {
    fn hash<H: Hasher>(&self, state: &mut H) {
        for b in self.0.bytes() {
            state.write_u8(b.to_ascii_lowercase());
        }
        state.write_u8(0xff);
    }
}

impl PartialOrd for CimName {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for CimName {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.0
            .bytes()
            .map(|b| b.to_ascii_lowercase())
            .cmp(other.0.bytes().map(|b| b.to_ascii_lowercase()))
    }
}

impl fmt::Display for CimName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for CimName {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for CimName {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl AsRef<str> for CimName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Normalize a namespace path string.
///
/// Namespaces are "/"-separated; leading, trailing, and doubled slashes
/// are tolerated on input and stripped here, so `//root/mycim//` becomes
/// `root/mycim`.
pub fn normalize_namespace(namespace: &str) -> String {
    namespace
        .split('/')
        .filter(|seg| !seg.is_empty())
        .collect::<Vec<_>>()
        .join("/")
}

/// The ASCII-folded form of a normalized namespace, used as a storage key
pub fn fold_namespace(namespace: &str) -> String {
    normalize_namespace(namespace).to_ascii_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::hash_map::DefaultHasher;

    fn hash_of(name: &CimName) -> u64 {
        let mut h = DefaultHasher::new();
        name.hash(&mut h);
        h.finish()
    }

    #[test]
    fn equality_folds_case_and_preserves_spelling() {
        let a = CimName::new("FooBar");
        let b = CimName::new("FOOBAR");
        assert_eq!(a, b);
        assert_eq!(a.as_str(), "FooBar");
        assert_eq!(b.as_str(), "FOOBAR");
    }

    #[test]
    fn hash_is_consistent_with_equality() {
        let a = CimName::new("CIM_System");
        let b = CimName::new("cim_SYSTEM");
        assert_eq!(hash_of(&a), hash_of(&b));
    }

    #[test]
    fn compares_against_str() {
        let name = CimName::new("Description");
        assert_eq!(name, "description");
        assert_ne!(name, "descriptions");
    }

    #[test]
    fn namespace_normalization_strips_slashes() {
        assert_eq!(normalize_namespace("//root/mycim//"), "root/mycim");
        assert_eq!(normalize_namespace("root/cimv2"), "root/cimv2");
        assert_eq!(normalize_namespace("/root//interop/"), "root/interop");
        assert_eq!(normalize_namespace(""), "");
    }
}
