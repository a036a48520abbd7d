//! Interned strings for units and symbol components.
//!
//! A document repeats the same handful of short labels over and over:
//! the currency unit on every trade and mark, and the class/ticker parts
//! of every symbol. Interning keeps one allocation per unique label and
//! makes clones and equality checks cheap.

use std::collections::HashSet;
use std::sync::Arc;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// A cheaply cloneable, shared string label.
///
/// Wraps `Arc<str>`; two labels with identical content compare equal even
/// when they do not share an allocation, but labels produced by the same
/// [`StringInterner`] do share one.
#[derive(Debug, Clone, Eq)]
pub struct InternedStr(Arc<str>);

impl InternedStr {
    /// Create a label without going through an interner.
    pub fn new(s: impl Into<Arc<str>>) -> Self {
        Self(s.into())
    }

    /// View the label as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl PartialEq for InternedStr {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0) || self.0 == other.0
    }
}

impl std::hash::Hash for InternedStr {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.0.hash(state);
    }
}

impl PartialOrd for InternedStr {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for InternedStr {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.0.cmp(&other.0)
    }
}

impl std::fmt::Display for InternedStr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for InternedStr {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::borrow::Borrow<str> for InternedStr {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl std::ops::Deref for InternedStr {
    type Target = str;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl From<&str> for InternedStr {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for InternedStr {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl PartialEq<str> for InternedStr {
    fn eq(&self, other: &str) -> bool {
        self.as_str() == other
    }
}

impl PartialEq<&str> for InternedStr {
    fn eq(&self, other: &&str) -> bool {
        self.as_str() == *other
    }
}

impl Default for InternedStr {
    fn default() -> Self {
        Self::new("")
    }
}

impl Serialize for InternedStr {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.0.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for InternedStr {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(Self::new(s))
    }
}

/// Deduplicating store for [`InternedStr`] labels.
#[derive(Debug, Default)]
pub struct StringInterner {
    labels: HashSet<Arc<str>>,
}

impl StringInterner {
    /// Create an empty interner.
    pub fn new() -> Self {
        Self::default()
    }

    /// Intern a label, reusing the existing allocation when present.
    pub fn intern(&mut self, s: &str) -> InternedStr {
        if let Some(existing) = self.labels.get(s) {
            InternedStr(existing.clone())
        } else {
            let arc: Arc<str> = s.into();
            self.labels.insert(arc.clone());
            InternedStr(arc)
        }
    }

    /// Number of distinct labels stored.
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    /// Whether the interner holds no labels.
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interner_deduplicates() {
        let mut interner = StringInterner::new();
        let a = interner.intern("CNY");
        let b = interner.intern("CNY");
        let c = interner.intern("USD");

        assert!(Arc::ptr_eq(&a.0, &b.0));
        assert!(!Arc::ptr_eq(&a.0, &c.0));
        assert_eq!(interner.len(), 2);
    }

    #[test]
    fn equality_ignores_allocation() {
        let a = InternedStr::new("ETF");
        let b = InternedStr::new("ETF");
        assert_eq!(a, b);
        assert_eq!(a, "ETF");
    }

    #[test]
    fn ordering_is_lexicographic() {
        let a = InternedStr::new("AAA");
        let b = InternedStr::new("BBB");
        assert!(a < b);
    }
}
