use std::fmt;
use std::slice;

use serde::{Deserialize, Serialize};

/// One attribute of an element start event.
///
/// Carries the full attribute tuple: namespace uri, local name, qualified
/// name, declared type, and value. Producers that do not track DTDs use
/// `CDATA` as the type, which is what [`Attribute::cdata`] fills in.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Attribute {
    pub uri: String,
    pub local: String,
    pub qname: String,
    pub ty: String,
    pub value: String,
}

impl Attribute {
    pub fn new(
        uri: impl Into<String>,
        local: impl Into<String>,
        qname: impl Into<String>,
        ty: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        Self {
            uri: uri.into(),
            local: local.into(),
            qname: qname.into(),
            ty: ty.into(),
            value: value.into(),
        }
    }

    /// An attribute of type `CDATA`, the common case.
    pub fn cdata(
        uri: impl Into<String>,
        local: impl Into<String>,
        qname: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        Self::new(uri, local, qname, "CDATA", value)
    }
}

impl fmt::Display for Attribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}=\"{}\"", self.qname, self.value)
    }
}

/// Ordered attribute list attached to an element start event.
///
/// Order is the producer's order and is preserved through recording and
/// replay. No uniqueness is enforced; a producer that pushes the same name
/// twice gets it back twice.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attributes(Vec<Attribute>);

impl Attributes {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self(Vec::with_capacity(capacity))
    }

    pub fn push(&mut self, attribute: Attribute) {
        self.0.push(attribute);
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Attribute> {
        self.0.get(index)
    }

    /// First attribute whose qualified name matches, if any.
    pub fn by_qname(&self, qname: &str) -> Option<&Attribute> {
        self.0.iter().find(|a| a.qname == qname)
    }

    pub fn iter(&self) -> slice::Iter<'_, Attribute> {
        self.0.iter()
    }
}

impl FromIterator<Attribute> for Attributes {
    fn from_iter<I: IntoIterator<Item = Attribute>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a Attributes {
    type Item = &'a Attribute;
    type IntoIter = slice::Iter<'a, Attribute>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn order_is_preserved() {
        let mut attrs = Attributes::new();
        attrs.push(Attribute::cdata("", "b", "b", "2"));
        attrs.push(Attribute::cdata("", "a", "a", "1"));
        attrs.push(Attribute::cdata("", "c", "c", "3"));
        let names: Vec<&str> = attrs.iter().map(|a| a.local.as_str()).collect();
        assert_eq!(names, ["b", "a", "c"]);
    }

    #[test]
    fn duplicates_are_kept() {
        let mut attrs = Attributes::new();
        attrs.push(Attribute::cdata("", "id", "id", "first"));
        attrs.push(Attribute::cdata("", "id", "id", "second"));
        assert_eq!(attrs.len(), 2);
        assert_eq!(attrs.by_qname("id").unwrap().value, "first");
    }

    #[test]
    fn by_qname_misses_cleanly() {
        let attrs = Attributes::new();
        assert!(attrs.by_qname("missing").is_none());
        assert!(attrs.is_empty());
    }

    #[test]
    fn cdata_fills_the_type() {
        let attr = Attribute::cdata("urn:x", "n", "p:n", "v");
        assert_eq!(attr.ty, "CDATA");
        assert_eq!(attr.to_string(), "p:n=\"v\"");
    }

    #[test]
    fn collects_from_iterator() {
        let attrs: Attributes = (0..3)
            .map(|i| Attribute::cdata("", format!("a{i}"), format!("a{i}"), i.to_string()))
            .collect();
        assert_eq!(attrs.len(), 3);
        assert_eq!(attrs.get(2).unwrap().value, "2");
    }
}
