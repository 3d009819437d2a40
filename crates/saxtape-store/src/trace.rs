use saxtape_types::{Attributes, Name, ReceiveError, SourceLocation, XmlReceiver};
use tracing::debug;

/// A receiver that emits one debug log record per event.
///
/// The sink behind [`crate::Tape::log_contents`]. Element nesting is shown
/// through a depth field rather than indentation so the records stay
/// machine-filterable.
#[derive(Debug, Default)]
pub struct TraceReceiver {
    depth: usize,
    events: usize,
    position: Option<SourceLocation>,
}

impl TraceReceiver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of events logged so far.
    pub fn events_seen(&self) -> usize {
        self.events
    }

    fn position(&self) -> String {
        match &self.position {
            Some(location) => location.to_string(),
            None => "-".to_string(),
        }
    }
}

impl XmlReceiver for TraceReceiver {
    fn document_locator(&mut self, public_id: Option<&str>) -> Result<(), ReceiveError> {
        debug!(public_id, "document locator");
        Ok(())
    }

    fn location(&mut self, location: &SourceLocation) -> Result<(), ReceiveError> {
        self.position = Some(location.clone());
        Ok(())
    }

    fn start_document(&mut self) -> Result<(), ReceiveError> {
        self.events += 1;
        debug!(at = %self.position(), "start document");
        Ok(())
    }

    fn end_document(&mut self) -> Result<(), ReceiveError> {
        self.events += 1;
        debug!(at = %self.position(), "end document");
        Ok(())
    }

    fn start_prefix_mapping(&mut self, prefix: &str, uri: &str) -> Result<(), ReceiveError> {
        self.events += 1;
        debug!(depth = self.depth, prefix, uri, "start prefix mapping");
        Ok(())
    }

    fn end_prefix_mapping(&mut self, prefix: &str) -> Result<(), ReceiveError> {
        self.events += 1;
        debug!(depth = self.depth, prefix, "end prefix mapping");
        Ok(())
    }

    fn start_element(&mut self, name: Name<'_>, attributes: &Attributes) -> Result<(), ReceiveError> {
        self.events += 1;
        debug!(
            depth = self.depth,
            name = %name,
            attributes = attributes.len(),
            at = %self.position(),
            "start element"
        );
        self.depth += 1;
        Ok(())
    }

    fn end_element(&mut self, name: Name<'_>) -> Result<(), ReceiveError> {
        self.events += 1;
        self.depth = self.depth.saturating_sub(1);
        debug!(depth = self.depth, name = %name, at = %self.position(), "end element");
        Ok(())
    }

    fn characters(&mut self, text: &str) -> Result<(), ReceiveError> {
        self.events += 1;
        debug!(depth = self.depth, length = text.len(), text, "characters");
        Ok(())
    }

    fn ignorable_whitespace(&mut self, text: &str) -> Result<(), ReceiveError> {
        self.events += 1;
        debug!(depth = self.depth, length = text.len(), "ignorable whitespace");
        Ok(())
    }

    fn processing_instruction(&mut self, target: &str, data: &str) -> Result<(), ReceiveError> {
        self.events += 1;
        debug!(depth = self.depth, target, data, "processing instruction");
        Ok(())
    }

    fn skipped_entity(&mut self, name: &str) -> Result<(), ReceiveError> {
        self.events += 1;
        debug!(depth = self.depth, name, "skipped entity");
        Ok(())
    }

    fn comment(&mut self, text: &str) -> Result<(), ReceiveError> {
        self.events += 1;
        debug!(depth = self.depth, text, "comment");
        Ok(())
    }
}
