use std::fmt;
use std::path::Path;
use std::sync::Arc;

use saxtape_types::{
    Attribute, Attributes, EventKind, Name, ReceiveError, SourceLocation, XmlReceiver,
};
use tracing::debug;

use crate::codec;
use crate::column::Column;
use crate::config::TapeOptions;
use crate::error::{TapeError, TapeResult};
use crate::mark::{next_stamp, Cursors, Mark};
use crate::trace::TraceReceiver;

/// A compact, replayable recording of a document event stream.
///
/// `Tape` implements [`XmlReceiver`]: drive it like any other consumer and
/// it appends each event to a set of columnar buffers (one byte per event
/// kind, shared payload columns for text, names, positions, and attribute
/// counts). Recording is strictly append-only; the only way back is
/// [`clear`](Tape::clear).
///
/// A finished tape replays any number of times, in whole
/// ([`replay`](Tape::replay)) or from a [`Mark`]
/// ([`replay_from`](Tape::replay_from)). Replay borrows the tape immutably,
/// with all replay state in per-call cursors, so concurrent replays of one
/// completed tape are safe.
///
/// The tape records events exactly as pushed and never validates them.
/// Replaying a log recorded from an unbalanced producer reproduces that
/// unbalanced stream; subtree replay of such a log is not meaningful beyond
/// the guarantee that it stops at the end of the log.
///
/// To forward events to a live consumer while recording, compose the tape
/// with `Tee` from `saxtape-receivers` rather than looking for a forwarding
/// switch here.
pub struct Tape {
    pub(crate) options: TapeOptions,
    pub(crate) stamp: u64,
    pub(crate) events: Column<u8>,
    pub(crate) text: Column<u8>,
    pub(crate) scalars: Column<i32>,
    pub(crate) lines: Column<i32>,
    pub(crate) system_ids: Column<Option<Arc<str>>>,
    pub(crate) attribute_counts: Column<i32>,
    pub(crate) strings: Column<String>,
    pub(crate) attribute_total: u64,
    pub(crate) has_location: bool,
    pub(crate) public_id: Option<String>,
    pub(crate) marks: Vec<Mark>,
    /// Most recently pushed position. Transient recording state, never
    /// serialized.
    pub(crate) pending: Option<SourceLocation>,
}

impl Tape {
    pub fn new() -> Self {
        Self::with_options(TapeOptions::default())
    }

    pub fn with_options(options: TapeOptions) -> Self {
        let initial = options.initial_events;
        Self {
            stamp: next_stamp(),
            events: Column::with_capacity(initial),
            text: Column::with_capacity(initial * 4),
            scalars: Column::with_capacity(initial),
            lines: Column::with_capacity(initial),
            system_ids: Column::with_capacity(initial),
            attribute_counts: Column::with_capacity(initial),
            strings: Column::with_capacity(initial),
            attribute_total: 0,
            has_location: false,
            public_id: None,
            marks: Vec::new(),
            pending: None,
            options,
        }
    }

    /// Number of recorded events.
    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn options(&self) -> &TapeOptions {
        &self.options
    }

    /// Whether the producer registered a locator, i.e. whether replays will
    /// carry position information.
    pub fn has_location(&self) -> bool {
        self.has_location
    }

    /// The document's public identifier, captured from the first locator
    /// registration that carried one.
    pub fn public_id(&self) -> Option<&str> {
        self.public_id.as_deref()
    }

    /// Total attribute count across all recorded element starts.
    pub fn attribute_count(&self) -> u64 {
        self.attribute_total
    }

    /// Rough in-memory footprint in bytes.
    ///
    /// Payload bytes are summed directly; entries in the name and
    /// system-id columns are skipped when they equal their predecessor,
    /// since those are typically shared. A diagnostic figure, not an
    /// accounting one.
    pub fn approximate_size(&self) -> u64 {
        let mut size = self.events.len() as u64;
        size += self.text.len() as u64;
        size += self.scalars.len() as u64 * 4;
        size += self.lines.len() as u64 * 4;
        size += self.attribute_counts.len() as u64 * 4;

        let mut previous: Option<&Arc<str>> = None;
        for entry in self.system_ids.iter() {
            if let Some(current) = entry {
                if !previous.is_some_and(|p| Arc::ptr_eq(p, current)) {
                    size += current.len() as u64;
                }
            }
            previous = entry.as_ref();
        }

        let mut previous: Option<&String> = None;
        for current in self.strings.iter() {
            if previous != Some(current) {
                size += current.len() as u64;
            }
            previous = Some(current);
        }

        size
    }

    /// Capture the current recording position.
    ///
    /// Call before recording the event the mark should replay from; a mark
    /// captured just before an element start replays exactly that subtree.
    /// The tape remembers every mark it hands out and serializes them with
    /// the rest of its state.
    pub fn mark(&mut self, id: Option<&str>) -> Mark {
        let mark = Mark::new(id.map(str::to_owned), self.stamp, self.cursors());
        self.marks.push(mark.clone());
        mark
    }

    /// All marks captured on this tape, in capture order.
    pub fn marks(&self) -> &[Mark] {
        &self.marks
    }

    /// Reset to empty for reuse. Discards all events, marks, and captured
    /// locator state; previously captured marks no longer replay.
    pub fn clear(&mut self) {
        let discarded = self.events.len();
        *self = Tape::with_options(self.options.clone());
        debug!(discarded_events = discarded, "tape cleared");
    }

    /// Replay the whole log into `receiver`.
    pub fn replay<R: XmlReceiver>(&self, receiver: &mut R) -> TapeResult<()> {
        self.replay_walk(receiver, Cursors::default(), false)
    }

    /// Replay from `mark`. If the mark sits just before an element start,
    /// exactly that element's subtree is replayed; otherwise replay runs to
    /// the end of the log.
    pub fn replay_from<R: XmlReceiver>(&self, mark: &Mark, receiver: &mut R) -> TapeResult<()> {
        if mark.stamp != self.stamp {
            return Err(TapeError::ForeignMark {
                mark: mark.stamp,
                tape: self.stamp,
            });
        }
        let subtree = self
            .events
            .get_copied(mark.cursors.event)
            .and_then(EventKind::from_tag)
            == Some(EventKind::StartElement);
        self.replay_walk(receiver, mark.cursors, subtree)
    }

    /// Replay into a [`TraceReceiver`], emitting one debug log record per
    /// event. Debug tooling.
    pub fn log_contents(&self) -> TapeResult<()> {
        let mut trace = TraceReceiver::new();
        self.replay(&mut trace)
    }

    /// Serialize to the tape's binary form.
    pub fn to_bytes(&self) -> Vec<u8> {
        codec::encode(self)
    }

    /// Rebuild a tape from [`to_bytes`](Tape::to_bytes) output. The result
    /// replays identically to the original; its marks are the deserialized
    /// ones, freshly stamped for the new instance.
    pub fn from_bytes(data: &[u8]) -> TapeResult<Self> {
        codec::decode(data)
    }

    pub fn save_to(&self, path: &Path) -> TapeResult<()> {
        std::fs::write(path, self.to_bytes())?;
        Ok(())
    }

    pub fn load_from(path: &Path) -> TapeResult<Self> {
        Self::from_bytes(&std::fs::read(path)?)
    }

    fn cursors(&self) -> Cursors {
        Cursors {
            event: self.events.len(),
            text: self.text.len(),
            scalar: self.scalars.len(),
            line: self.lines.len(),
            system_id: self.system_ids.len(),
            attribute_count: self.attribute_counts.len(),
            string: self.strings.len(),
        }
    }

    fn append_event(&mut self, kind: EventKind) {
        self.events.push(kind.tag());
    }

    /// Record the position columns for a located event. When tracking is on
    /// but the producer pushed nothing, the unknown sentinel is recorded so
    /// the location columns never fall out of step with the event column.
    fn append_location(&mut self) {
        if !self.has_location {
            return;
        }
        let location = self
            .pending
            .clone()
            .unwrap_or_else(SourceLocation::unknown);
        self.lines.push(location.line);
        self.lines.push(location.column);
        self.push_system_id(location.system_id);
    }

    /// Adjacent equal system ids share one allocation, which
    /// [`approximate_size`](Tape::approximate_size) relies on.
    fn push_system_id(&mut self, id: Option<Arc<str>>) {
        let entry = match (&id, self.system_ids.last()) {
            (Some(new), Some(Some(previous))) if **new == **previous => Some(previous.clone()),
            _ => id,
        };
        self.system_ids.push(entry);
    }

    fn push_name(&mut self, name: Name<'_>) {
        self.strings.push(name.uri.to_owned());
        self.strings.push(name.local.to_owned());
        self.strings.push(name.qname.to_owned());
    }

    fn append_text(&mut self, kind: EventKind, text: &str) {
        self.append_event(kind);
        self.text.extend_from_slice(text.as_bytes());
        self.scalars.push(text.len() as i32);
        self.append_location();
    }

    fn replay_walk<R: XmlReceiver>(
        &self,
        receiver: &mut R,
        mut cursors: Cursors,
        subtree: bool,
    ) -> TapeResult<()> {
        if self.has_location {
            receiver.document_locator(self.public_id.as_deref())?;
        }

        let mut depth: i64 = 0;
        while cursors.event < self.events.len() {
            let event = cursors.event;
            let tag = self.events.as_slice()[event];
            let kind = EventKind::from_tag(tag).ok_or_else(|| TapeError::Corrupt {
                offset: event,
                reason: format!("unknown event tag {tag:#04x}"),
            })?;

            let located = self.has_location && kind.is_located();
            if located {
                let location = self.location_at(cursors.line, cursors.system_id);
                receiver.location(&location)?;
            }

            match kind {
                EventKind::StartDocument => receiver.start_document()?,
                EventKind::EndDocument => receiver.end_document()?,
                EventKind::StartElement => {
                    let uri = self.read_string(&mut cursors, event)?;
                    let local = self.read_string(&mut cursors, event)?;
                    let qname = self.read_string(&mut cursors, event)?;
                    let count = self
                        .attribute_counts
                        .get_copied(cursors.attribute_count)
                        .ok_or(TapeError::Truncated {
                            column: "attribute count",
                            event,
                        })?;
                    cursors.attribute_count += 1;
                    let count = usize::try_from(count).map_err(|_| TapeError::Corrupt {
                        offset: event,
                        reason: format!("negative attribute count {count}"),
                    })?;
                    let mut attributes = Attributes::with_capacity(count);
                    for _ in 0..count {
                        attributes.push(Attribute::new(
                            self.read_string(&mut cursors, event)?,
                            self.read_string(&mut cursors, event)?,
                            self.read_string(&mut cursors, event)?,
                            self.read_string(&mut cursors, event)?,
                            self.read_string(&mut cursors, event)?,
                        ));
                    }
                    receiver.start_element(Name::new(uri, local, qname), &attributes)?;
                    depth += 1;
                }
                EventKind::EndElement => {
                    let uri = self.read_string(&mut cursors, event)?;
                    let local = self.read_string(&mut cursors, event)?;
                    let qname = self.read_string(&mut cursors, event)?;
                    depth -= 1;
                    receiver.end_element(Name::new(uri, local, qname))?;
                    if subtree && depth == 0 {
                        return Ok(());
                    }
                }
                EventKind::Characters => {
                    let text = self.read_text(&mut cursors, event)?;
                    receiver.characters(text)?;
                }
                EventKind::IgnorableWhitespace => {
                    let text = self.read_text(&mut cursors, event)?;
                    receiver.ignorable_whitespace(text)?;
                }
                EventKind::Comment => {
                    let text = self.read_text(&mut cursors, event)?;
                    receiver.comment(text)?;
                }
                EventKind::ProcessingInstruction => {
                    let target = self.read_string(&mut cursors, event)?;
                    let data = self.read_string(&mut cursors, event)?;
                    receiver.processing_instruction(target, data)?;
                }
                EventKind::SkippedEntity => {
                    let name = self.read_string(&mut cursors, event)?;
                    receiver.skipped_entity(name)?;
                }
                EventKind::StartPrefixMapping => {
                    let prefix = self.read_string(&mut cursors, event)?;
                    let uri = self.read_string(&mut cursors, event)?;
                    receiver.start_prefix_mapping(prefix, uri)?;
                }
                EventKind::EndPrefixMapping => {
                    let prefix = self.read_string(&mut cursors, event)?;
                    receiver.end_prefix_mapping(prefix)?;
                }
            }

            cursors.event += 1;
            if located {
                cursors.line += 2;
                cursors.system_id += 1;
            }
        }
        Ok(())
    }

    /// Position recorded for the located event at the given cursor
    /// positions. Each component degrades to its unknown sentinel
    /// independently when the columns run short.
    fn location_at(&self, line: usize, system_id: usize) -> SourceLocation {
        SourceLocation {
            line: self.lines.get_copied(line).unwrap_or(-1),
            column: self.lines.get_copied(line + 1).unwrap_or(-1),
            system_id: self.system_ids.get(system_id).and_then(|entry| entry.clone()),
        }
    }

    fn read_string(&self, cursors: &mut Cursors, event: usize) -> TapeResult<&str> {
        let value = self.strings.get(cursors.string).ok_or(TapeError::Truncated {
            column: "string",
            event,
        })?;
        cursors.string += 1;
        Ok(value.as_str())
    }

    fn read_text(&self, cursors: &mut Cursors, event: usize) -> TapeResult<&str> {
        let raw = self
            .scalars
            .get_copied(cursors.scalar)
            .ok_or(TapeError::Truncated {
                column: "scalar",
                event,
            })?;
        cursors.scalar += 1;
        let length = usize::try_from(raw).map_err(|_| TapeError::Corrupt {
            offset: cursors.text,
            reason: format!("negative text length {raw}"),
        })?;
        let start = cursors.text;
        let end = start.checked_add(length).ok_or_else(|| TapeError::Corrupt {
            offset: start,
            reason: "text length overflow".into(),
        })?;
        let bytes = self
            .text
            .as_slice()
            .get(start..end)
            .ok_or(TapeError::Truncated {
                column: "text",
                event,
            })?;
        cursors.text = end;
        std::str::from_utf8(bytes).map_err(|_| TapeError::Corrupt {
            offset: start,
            reason: "text is not valid UTF-8".into(),
        })
    }
}

impl Default for Tape {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Tape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Tape")
            .field("events", &self.events.len())
            .field("marks", &self.marks.len())
            .field("has_location", &self.has_location)
            .field("approximate_size", &self.approximate_size())
            .finish()
    }
}

impl XmlReceiver for Tape {
    fn document_locator(&mut self, public_id: Option<&str>) -> Result<(), ReceiveError> {
        if self.options.record_location {
            self.has_location = true;
            if self.public_id.is_none() {
                self.public_id = public_id.map(str::to_owned);
            }
        }
        Ok(())
    }

    fn location(&mut self, location: &SourceLocation) -> Result<(), ReceiveError> {
        if self.has_location {
            self.pending = Some(location.clone());
        }
        Ok(())
    }

    fn start_document(&mut self) -> Result<(), ReceiveError> {
        self.append_event(EventKind::StartDocument);
        self.append_location();
        Ok(())
    }

    fn end_document(&mut self) -> Result<(), ReceiveError> {
        self.append_event(EventKind::EndDocument);
        self.append_location();
        // A finished tape keeps no reference to the producer's position.
        self.pending = None;
        Ok(())
    }

    fn start_prefix_mapping(&mut self, prefix: &str, uri: &str) -> Result<(), ReceiveError> {
        self.append_event(EventKind::StartPrefixMapping);
        self.strings.push(prefix.to_owned());
        self.strings.push(uri.to_owned());
        Ok(())
    }

    fn end_prefix_mapping(&mut self, prefix: &str) -> Result<(), ReceiveError> {
        self.append_event(EventKind::EndPrefixMapping);
        self.strings.push(prefix.to_owned());
        Ok(())
    }

    fn start_element(&mut self, name: Name<'_>, attributes: &Attributes) -> Result<(), ReceiveError> {
        self.append_event(EventKind::StartElement);
        self.append_location();
        self.push_name(name);
        self.attribute_counts.push(attributes.len() as i32);
        self.attribute_total += attributes.len() as u64;
        for attribute in attributes {
            self.strings.push(attribute.uri.clone());
            self.strings.push(attribute.local.clone());
            self.strings.push(attribute.qname.clone());
            self.strings.push(attribute.ty.clone());
            self.strings.push(attribute.value.clone());
        }
        Ok(())
    }

    fn end_element(&mut self, name: Name<'_>) -> Result<(), ReceiveError> {
        self.append_event(EventKind::EndElement);
        self.append_location();
        self.push_name(name);
        Ok(())
    }

    fn characters(&mut self, text: &str) -> Result<(), ReceiveError> {
        self.append_text(EventKind::Characters, text);
        Ok(())
    }

    fn ignorable_whitespace(&mut self, text: &str) -> Result<(), ReceiveError> {
        self.append_text(EventKind::IgnorableWhitespace, text);
        Ok(())
    }

    fn processing_instruction(&mut self, target: &str, data: &str) -> Result<(), ReceiveError> {
        self.append_event(EventKind::ProcessingInstruction);
        self.append_location();
        self.strings.push(target.to_owned());
        self.strings.push(data.to_owned());
        Ok(())
    }

    fn skipped_entity(&mut self, name: &str) -> Result<(), ReceiveError> {
        self.append_event(EventKind::SkippedEntity);
        self.append_location();
        self.strings.push(name.to_owned());
        Ok(())
    }

    fn comment(&mut self, text: &str) -> Result<(), ReceiveError> {
        self.append_text(EventKind::Comment, text);
        Ok(())
    }
}
