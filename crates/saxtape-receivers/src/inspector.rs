use saxtape_types::{
    Attributes, Name, ReceiveError, SourceLocation, XmlReceiver,
};

const XML_NS: &str = "http://www.w3.org/XML/1998/namespace";

/// Validates stream well-formedness in front of a downstream receiver.
///
/// Checks document boundaries, element balance and name matching, name
/// syntax, and namespace declarations, then forwards each event to the
/// wrapped receiver. The first violation raises
/// [`ReceiveError::Malformed`] with the last pushed source position and
/// the failing event never reaches the downstream receiver.
///
/// Only structural events and character data are checked, so a stream
/// that passes is safe to record and replay; comments, processing
/// instructions, and whitespace are forwarded as-is.
#[derive(Debug)]
pub struct Inspector<R> {
    inner: R,
    document_started: bool,
    document_ended: bool,
    open_elements: Vec<OpenElement>,
    namespaces: NamespaceScopes,
    position: SourceLocation,
}

#[derive(Debug, PartialEq, Eq)]
struct OpenElement {
    uri: String,
    local: String,
    qname: String,
}

/// Prefix bindings by element scope. Declarations buffer in `pending`
/// until the element start that owns them commits the scope.
#[derive(Debug, Default)]
struct NamespaceScopes {
    pending: Vec<(String, String)>,
    scopes: Vec<Vec<(String, String)>>,
}

impl NamespaceScopes {
    fn declare(&mut self, prefix: &str, uri: &str) {
        self.pending.push((prefix.to_owned(), uri.to_owned()));
    }

    fn enter_element(&mut self) {
        self.scopes.push(std::mem::take(&mut self.pending));
    }

    fn leave_element(&mut self) {
        self.scopes.pop();
    }

    fn lookup(&self, prefix: &str) -> Option<&str> {
        if prefix == "xml" {
            return Some(XML_NS);
        }
        self.scopes
            .iter()
            .rev()
            .flat_map(|scope| scope.iter().rev())
            .find(|(p, _)| p == prefix)
            .map(|(_, uri)| uri.as_str())
    }
}

impl<R: XmlReceiver> Inspector<R> {
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            document_started: false,
            document_ended: false,
            open_elements: Vec::new(),
            namespaces: NamespaceScopes::default(),
            position: SourceLocation::unknown(),
        }
    }

    /// Recover the downstream receiver.
    pub fn into_inner(self) -> R {
        self.inner
    }

    pub fn inner(&self) -> &R {
        &self.inner
    }

    fn reject(&self, reason: String) -> ReceiveError {
        ReceiveError::malformed(reason, self.position.line, self.position.column)
    }

    fn check_in_document(&self) -> Option<&'static str> {
        if !self.document_started {
            Some("event received before document start")
        } else if self.document_ended {
            Some("event received after document end")
        } else {
            None
        }
    }

    fn check_in_element(&self) -> Option<&'static str> {
        self.check_in_document().or_else(|| {
            if self.open_elements.is_empty() {
                Some("event received after close of root element")
            } else {
                None
            }
        })
    }

    fn check_name(&self, name: Name<'_>) -> Result<(), ReceiveError> {
        let Name { uri, local, qname } = name;
        if local.is_empty() {
            return Err(self.reject(format!("empty local name (qname '{qname}')")));
        }
        if qname.is_empty() {
            return Err(self.reject(format!("empty qualified name (local name '{local}')")));
        }
        let colon = qname.find(':');
        if uri.is_empty() {
            if local != qname {
                return Err(self.reject(format!(
                    "local name and qualified name must be equal outside a namespace \
                     (local '{local}', qname '{qname}')"
                )));
            }
            if colon.is_some() {
                return Err(self.reject(format!(
                    "qualified name has a prefix but no namespace: '{qname}'"
                )));
            }
            return Ok(());
        }
        match colon {
            None => {
                // Unprefixed name in a namespace: must match the default
                // namespace in scope.
                if self.namespaces.lookup("") != Some(uri) {
                    return Err(self.reject(format!(
                        "namespace does not match the default namespace \
                         (namespace '{uri}', qname '{qname}')"
                    )));
                }
            }
            Some(at) if at == 0 || at == qname.len() - 1 => {
                return Err(self.reject(format!("misplaced colon in qualified name '{qname}'")));
            }
            Some(at) => {
                if local != &qname[at + 1..] {
                    return Err(self.reject(format!(
                        "local name does not match qualified name suffix \
                         (local '{local}', qname '{qname}')"
                    )));
                }
                let prefix = &qname[..at];
                match self.namespaces.lookup(prefix) {
                    None => {
                        return Err(
                            self.reject(format!("qualified name prefix not in scope: '{qname}'"))
                        )
                    }
                    Some(bound) if bound != uri => {
                        return Err(self.reject(format!(
                            "prefix '{prefix}' is bound to '{bound}', not '{uri}'"
                        )));
                    }
                    Some(_) => {}
                }
            }
        }
        Ok(())
    }

    fn check_attribute_name(&self, name: Name<'_>) -> Result<(), ReceiveError> {
        // Attributes never pick up the default namespace.
        if !name.uri.is_empty() && !name.qname.contains(':') {
            return Err(self.reject(format!(
                "non-prefixed attribute cannot be in a namespace \
                 (uri '{}', qname '{}')",
                name.uri, name.qname
            )));
        }
        self.check_name(name)
    }
}

impl<R: XmlReceiver> XmlReceiver for Inspector<R> {
    fn document_locator(&mut self, public_id: Option<&str>) -> Result<(), ReceiveError> {
        self.inner.document_locator(public_id)
    }

    fn location(&mut self, location: &SourceLocation) -> Result<(), ReceiveError> {
        self.position = location.clone();
        self.inner.location(location)
    }

    fn start_document(&mut self) -> Result<(), ReceiveError> {
        if self.document_started {
            return Err(self.reject("start_document called twice".into()));
        }
        self.document_started = true;
        self.inner.start_document()
    }

    fn end_document(&mut self) -> Result<(), ReceiveError> {
        if !self.open_elements.is_empty() {
            return Err(self.reject(format!(
                "document ended with {} open element(s)",
                self.open_elements.len()
            )));
        }
        if self.document_ended {
            return Err(self.reject("end_document called twice".into()));
        }
        self.document_ended = true;
        self.inner.end_document()
    }

    fn start_prefix_mapping(&mut self, prefix: &str, uri: &str) -> Result<(), ReceiveError> {
        self.namespaces.declare(prefix, uri);
        self.inner.start_prefix_mapping(prefix, uri)
    }

    fn end_prefix_mapping(&mut self, prefix: &str) -> Result<(), ReceiveError> {
        self.inner.end_prefix_mapping(prefix)
    }

    fn start_element(&mut self, name: Name<'_>, attributes: &Attributes) -> Result<(), ReceiveError> {
        self.namespaces.enter_element();
        if let Some(error) = self.check_in_document() {
            return Err(self.reject(format!("{error}: element '{}'", name.qname)));
        }
        self.open_elements.push(OpenElement {
            uri: name.uri.to_owned(),
            local: name.local.to_owned(),
            qname: name.qname.to_owned(),
        });
        self.check_name(name)?;
        for attribute in attributes {
            self.check_attribute_name(Name::new(
                &attribute.uri,
                &attribute.local,
                &attribute.qname,
            ))?;
        }
        self.inner.start_element(name, attributes)
    }

    fn end_element(&mut self, name: Name<'_>) -> Result<(), ReceiveError> {
        if let Some(error) = self.check_in_element() {
            return Err(self.reject(format!("{error}: element '{}'", name.qname)));
        }
        let started = match self.open_elements.pop() {
            Some(open) => open,
            None => {
                return Err(self.reject(format!(
                    "end_element without start_element: '{}'",
                    name.qname
                )))
            }
        };
        if started.uri != name.uri || started.local != name.local || started.qname != name.qname {
            return Err(self.reject(format!(
                "end_element does not match start_element: started '{}', ended '{}'",
                started.qname, name.qname
            )));
        }
        self.check_name(name)?;
        self.namespaces.leave_element();
        self.inner.end_element(name)
    }

    fn characters(&mut self, text: &str) -> Result<(), ReceiveError> {
        if let Some(error) = self.check_in_element() {
            return Err(self.reject(format!("{error}: '{text}'")));
        }
        self.inner.characters(text)
    }

    fn ignorable_whitespace(&mut self, text: &str) -> Result<(), ReceiveError> {
        self.inner.ignorable_whitespace(text)
    }

    fn processing_instruction(&mut self, target: &str, data: &str) -> Result<(), ReceiveError> {
        self.inner.processing_instruction(target, data)
    }

    fn skipped_entity(&mut self, name: &str) -> Result<(), ReceiveError> {
        self.inner.skipped_entity(name)
    }

    fn comment(&mut self, text: &str) -> Result<(), ReceiveError> {
        self.inner.comment(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::null::NullReceiver;
    use saxtape_types::Attribute;

    fn well_formed(inspector: &mut Inspector<NullReceiver>) -> Result<(), ReceiveError> {
        inspector.start_document()?;
        inspector.start_element(Name::local("root"), &Attributes::new())?;
        inspector.characters("text")?;
        inspector.end_element(Name::local("root"))?;
        inspector.end_document()
    }

    #[test]
    fn accepts_a_well_formed_stream() {
        let mut inspector = Inspector::new(NullReceiver);
        well_formed(&mut inspector).unwrap();
    }

    #[test]
    fn rejects_double_document_start() {
        let mut inspector = Inspector::new(NullReceiver);
        inspector.start_document().unwrap();
        let err = inspector.start_document().unwrap_err();
        assert!(err.to_string().contains("start_document called twice"));
    }

    #[test]
    fn rejects_end_with_open_elements() {
        let mut inspector = Inspector::new(NullReceiver);
        inspector.start_document().unwrap();
        inspector
            .start_element(Name::local("root"), &Attributes::new())
            .unwrap();
        let err = inspector.end_document().unwrap_err();
        assert!(err.to_string().contains("open element"));
    }

    #[test]
    fn rejects_mismatched_end_element() {
        let mut inspector = Inspector::new(NullReceiver);
        inspector.start_document().unwrap();
        inspector
            .start_element(Name::local("a"), &Attributes::new())
            .unwrap();
        let err = inspector.end_element(Name::local("b")).unwrap_err();
        assert!(err.to_string().contains("does not match"));
    }

    #[test]
    fn rejects_text_outside_the_root_element() {
        let mut inspector = Inspector::new(NullReceiver);
        inspector.start_document().unwrap();
        inspector
            .start_element(Name::local("root"), &Attributes::new())
            .unwrap();
        inspector.end_element(Name::local("root")).unwrap();
        let err = inspector.characters("stray").unwrap_err();
        assert!(err.to_string().contains("after close of root element"));
    }

    #[test]
    fn rejects_events_before_document_start() {
        let mut inspector = Inspector::new(NullReceiver);
        let err = inspector
            .start_element(Name::local("root"), &Attributes::new())
            .unwrap_err();
        assert!(err.to_string().contains("before document start"));
    }

    #[test]
    fn accepts_prefixed_names_with_matching_binding() {
        let mut inspector = Inspector::new(NullReceiver);
        inspector.start_document().unwrap();
        inspector.start_prefix_mapping("x", "urn:x").unwrap();
        inspector
            .start_element(Name::new("urn:x", "e", "x:e"), &Attributes::new())
            .unwrap();
        inspector.end_element(Name::new("urn:x", "e", "x:e")).unwrap();
        inspector.end_document().unwrap();
    }

    #[test]
    fn rejects_unbound_prefix() {
        let mut inspector = Inspector::new(NullReceiver);
        inspector.start_document().unwrap();
        let err = inspector
            .start_element(Name::new("urn:x", "e", "x:e"), &Attributes::new())
            .unwrap_err();
        assert!(err.to_string().contains("not in scope"));
    }

    #[test]
    fn rejects_prefix_bound_to_another_uri() {
        let mut inspector = Inspector::new(NullReceiver);
        inspector.start_document().unwrap();
        inspector.start_prefix_mapping("x", "urn:other").unwrap();
        let err = inspector
            .start_element(Name::new("urn:x", "e", "x:e"), &Attributes::new())
            .unwrap_err();
        assert!(err.to_string().contains("is bound to"));
    }

    #[test]
    fn accepts_default_namespace_elements() {
        let mut inspector = Inspector::new(NullReceiver);
        inspector.start_document().unwrap();
        inspector.start_prefix_mapping("", "urn:default").unwrap();
        inspector
            .start_element(Name::new("urn:default", "e", "e"), &Attributes::new())
            .unwrap();
        inspector
            .end_element(Name::new("urn:default", "e", "e"))
            .unwrap();
        inspector.end_document().unwrap();
    }

    #[test]
    fn rejects_non_prefixed_attribute_in_a_namespace() {
        let mut inspector = Inspector::new(NullReceiver);
        inspector.start_document().unwrap();
        inspector.start_prefix_mapping("", "urn:default").unwrap();
        let mut attrs = Attributes::new();
        attrs.push(Attribute::cdata("urn:default", "a", "a", "v"));
        let err = inspector
            .start_element(Name::new("urn:default", "e", "e"), &attrs)
            .unwrap_err();
        assert!(err.to_string().contains("non-prefixed attribute"));
    }

    #[test]
    fn xml_prefix_is_implicitly_bound() {
        let mut inspector = Inspector::new(NullReceiver);
        inspector.start_document().unwrap();
        let mut attrs = Attributes::new();
        attrs.push(Attribute::cdata(XML_NS, "lang", "xml:lang", "en"));
        inspector
            .start_element(Name::local("root"), &attrs)
            .unwrap();
        inspector.end_element(Name::local("root")).unwrap();
        inspector.end_document().unwrap();
    }

    #[test]
    fn inner_bindings_shadow_outer_ones() {
        let mut inspector = Inspector::new(NullReceiver);
        inspector.start_document().unwrap();
        inspector.start_prefix_mapping("x", "urn:outer").unwrap();
        inspector
            .start_element(Name::new("urn:outer", "a", "x:a"), &Attributes::new())
            .unwrap();
        inspector.start_prefix_mapping("x", "urn:inner").unwrap();
        inspector
            .start_element(Name::new("urn:inner", "b", "x:b"), &Attributes::new())
            .unwrap();
        inspector
            .end_element(Name::new("urn:inner", "b", "x:b"))
            .unwrap();
        // Back outside the inner scope the old binding applies again.
        inspector
            .end_element(Name::new("urn:outer", "a", "x:a"))
            .unwrap();
        inspector.end_document().unwrap();
    }

    #[test]
    fn error_carries_the_last_pushed_position() {
        let mut inspector = Inspector::new(NullReceiver);
        inspector
            .location(&SourceLocation::new(7, 3, None))
            .unwrap();
        let err = inspector.characters("early").unwrap_err();
        match err {
            ReceiveError::Malformed { line, column, .. } => {
                assert_eq!((line, column), (7, 3));
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
