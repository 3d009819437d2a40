use std::fmt;

/// Borrowed element name triple passed to [`crate::XmlReceiver`] element
/// hooks: namespace uri, local name, and qualified (prefixed) name. All
/// three may be empty for non-namespaced documents.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Name<'a> {
    pub uri: &'a str,
    pub local: &'a str,
    pub qname: &'a str,
}

impl<'a> Name<'a> {
    pub fn new(uri: &'a str, local: &'a str, qname: &'a str) -> Self {
        Self { uri, local, qname }
    }

    /// A name with no namespace, qname equal to the local name.
    pub fn local(local: &'a str) -> Self {
        Self {
            uri: "",
            local,
            qname: local,
        }
    }

    /// Clark notation: `{uri}local`, or just `local` when there is no
    /// namespace.
    pub fn clark(&self) -> String {
        if self.uri.is_empty() {
            self.local.to_string()
        } else {
            format!("{{{}}}{}", self.uri, self.local)
        }
    }
}

impl fmt::Display for Name<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.qname.is_empty() {
            f.write_str(self.local)
        } else {
            f.write_str(self.qname)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clark_with_namespace() {
        let name = Name::new("http://example.org/ns", "item", "x:item");
        assert_eq!(name.clark(), "{http://example.org/ns}item");
    }

    #[test]
    fn clark_without_namespace() {
        assert_eq!(Name::local("root").clark(), "root");
    }

    #[test]
    fn display_prefers_qname() {
        let name = Name::new("urn:x", "item", "x:item");
        assert_eq!(name.to_string(), "x:item");
        assert_eq!(Name::local("plain").to_string(), "plain");
    }
}
