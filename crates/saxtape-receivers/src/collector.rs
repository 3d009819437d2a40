use saxtape_types::{
    Attributes, Event, Name, ReceiveError, SourceLocation, XmlReceiver,
};

/// Materializes an event stream as owned [`Event`] values.
///
/// The workhorse of stream comparison: drive two streams into two
/// collectors and compare the results. Each event's position is captured
/// alongside it when the producer pushed one; prefix mapping events carry
/// no position by contract and always record `None`.
#[derive(Debug, Default)]
pub struct Collector {
    events: Vec<Event>,
    locations: Vec<Option<SourceLocation>>,
    pending: Option<SourceLocation>,
    saw_locator: bool,
    public_id: Option<String>,
}

impl Collector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn into_events(self) -> Vec<Event> {
        self.events
    }

    /// Position recorded for each event, parallel to [`events`](Self::events).
    pub fn locations(&self) -> &[Option<SourceLocation>] {
        &self.locations
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Whether the producer announced it would report positions.
    pub fn saw_locator(&self) -> bool {
        self.saw_locator
    }

    pub fn public_id(&self) -> Option<&str> {
        self.public_id.as_deref()
    }

    fn record(&mut self, event: Event) {
        self.locations.push(self.pending.take());
        self.events.push(event);
    }

    fn record_unlocated(&mut self, event: Event) {
        self.locations.push(None);
        self.events.push(event);
    }
}

impl XmlReceiver for Collector {
    fn document_locator(&mut self, public_id: Option<&str>) -> Result<(), ReceiveError> {
        self.saw_locator = true;
        if self.public_id.is_none() {
            self.public_id = public_id.map(str::to_owned);
        }
        Ok(())
    }

    fn location(&mut self, location: &SourceLocation) -> Result<(), ReceiveError> {
        self.pending = Some(location.clone());
        Ok(())
    }

    fn start_document(&mut self) -> Result<(), ReceiveError> {
        self.record(Event::StartDocument);
        Ok(())
    }

    fn end_document(&mut self) -> Result<(), ReceiveError> {
        self.record(Event::EndDocument);
        Ok(())
    }

    fn start_prefix_mapping(&mut self, prefix: &str, uri: &str) -> Result<(), ReceiveError> {
        self.record_unlocated(Event::StartPrefixMapping {
            prefix: prefix.to_owned(),
            uri: uri.to_owned(),
        });
        Ok(())
    }

    fn end_prefix_mapping(&mut self, prefix: &str) -> Result<(), ReceiveError> {
        self.record_unlocated(Event::EndPrefixMapping {
            prefix: prefix.to_owned(),
        });
        Ok(())
    }

    fn start_element(&mut self, name: Name<'_>, attributes: &Attributes) -> Result<(), ReceiveError> {
        self.record(Event::StartElement {
            uri: name.uri.to_owned(),
            local: name.local.to_owned(),
            qname: name.qname.to_owned(),
            attributes: attributes.clone(),
        });
        Ok(())
    }

    fn end_element(&mut self, name: Name<'_>) -> Result<(), ReceiveError> {
        self.record(Event::EndElement {
            uri: name.uri.to_owned(),
            local: name.local.to_owned(),
            qname: name.qname.to_owned(),
        });
        Ok(())
    }

    fn characters(&mut self, text: &str) -> Result<(), ReceiveError> {
        self.record(Event::Characters(text.to_owned()));
        Ok(())
    }

    fn ignorable_whitespace(&mut self, text: &str) -> Result<(), ReceiveError> {
        self.record(Event::IgnorableWhitespace(text.to_owned()));
        Ok(())
    }

    fn processing_instruction(&mut self, target: &str, data: &str) -> Result<(), ReceiveError> {
        self.record(Event::ProcessingInstruction {
            target: target.to_owned(),
            data: data.to_owned(),
        });
        Ok(())
    }

    fn skipped_entity(&mut self, name: &str) -> Result<(), ReceiveError> {
        self.record(Event::SkippedEntity(name.to_owned()));
        Ok(())
    }

    fn comment(&mut self, text: &str) -> Result<(), ReceiveError> {
        self.record(Event::Comment(text.to_owned()));
        Ok(())
    }
}
