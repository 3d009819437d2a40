use saxtape_types::{Attributes, Name, ReceiveError, SourceLocation, XmlReceiver};

/// Drives two receivers from one event stream.
///
/// Every event goes to the first receiver, then to the second. An error
/// from the first short-circuits: the second never sees the failing event.
/// Recording with simultaneous forwarding is the canonical composition,
/// with the recorder in first position so the log is complete up to the
/// point of a downstream failure:
///
/// ```
/// use saxtape_receivers::{NullReceiver, Tee, Collector};
/// use saxtape_types::XmlReceiver;
///
/// let mut collector = Collector::new();
/// let mut tee = Tee::new(&mut collector, NullReceiver);
/// tee.start_document().unwrap();
/// tee.end_document().unwrap();
/// assert_eq!(collector.len(), 2);
/// ```
#[derive(Debug)]
pub struct Tee<A, B> {
    first: A,
    second: B,
}

impl<A: XmlReceiver, B: XmlReceiver> Tee<A, B> {
    pub fn new(first: A, second: B) -> Self {
        Self { first, second }
    }

    /// Recover both receivers.
    pub fn into_inner(self) -> (A, B) {
        (self.first, self.second)
    }

    pub fn first(&self) -> &A {
        &self.first
    }

    pub fn second(&self) -> &B {
        &self.second
    }
}

impl<A: XmlReceiver, B: XmlReceiver> XmlReceiver for Tee<A, B> {
    fn document_locator(&mut self, public_id: Option<&str>) -> Result<(), ReceiveError> {
        self.first.document_locator(public_id)?;
        self.second.document_locator(public_id)
    }

    fn location(&mut self, location: &SourceLocation) -> Result<(), ReceiveError> {
        self.first.location(location)?;
        self.second.location(location)
    }

    fn start_document(&mut self) -> Result<(), ReceiveError> {
        self.first.start_document()?;
        self.second.start_document()
    }

    fn end_document(&mut self) -> Result<(), ReceiveError> {
        self.first.end_document()?;
        self.second.end_document()
    }

    fn start_prefix_mapping(&mut self, prefix: &str, uri: &str) -> Result<(), ReceiveError> {
        self.first.start_prefix_mapping(prefix, uri)?;
        self.second.start_prefix_mapping(prefix, uri)
    }

    fn end_prefix_mapping(&mut self, prefix: &str) -> Result<(), ReceiveError> {
        self.first.end_prefix_mapping(prefix)?;
        self.second.end_prefix_mapping(prefix)
    }

    fn start_element(&mut self, name: Name<'_>, attributes: &Attributes) -> Result<(), ReceiveError> {
        self.first.start_element(name, attributes)?;
        self.second.start_element(name, attributes)
    }

    fn end_element(&mut self, name: Name<'_>) -> Result<(), ReceiveError> {
        self.first.end_element(name)?;
        self.second.end_element(name)
    }

    fn characters(&mut self, text: &str) -> Result<(), ReceiveError> {
        self.first.characters(text)?;
        self.second.characters(text)
    }

    fn ignorable_whitespace(&mut self, text: &str) -> Result<(), ReceiveError> {
        self.first.ignorable_whitespace(text)?;
        self.second.ignorable_whitespace(text)
    }

    fn processing_instruction(&mut self, target: &str, data: &str) -> Result<(), ReceiveError> {
        self.first.processing_instruction(target, data)?;
        self.second.processing_instruction(target, data)
    }

    fn skipped_entity(&mut self, name: &str) -> Result<(), ReceiveError> {
        self.first.skipped_entity(name)?;
        self.second.skipped_entity(name)
    }

    fn comment(&mut self, text: &str) -> Result<(), ReceiveError> {
        self.first.comment(text)?;
        self.second.comment(text)
    }
}
