use std::fmt;

use serde::{Deserialize, Serialize};

use crate::attribute::Attributes;

/// Tag identifying one kind of document event.
///
/// The set is closed: a recorded stream contains nothing but these eleven
/// kinds. The discriminant doubles as the on-disk event tag, so the variants
/// are numbered explicitly and never reordered.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum EventKind {
    StartDocument = 0,
    EndDocument = 1,
    StartElement = 2,
    EndElement = 3,
    Characters = 4,
    IgnorableWhitespace = 5,
    ProcessingInstruction = 6,
    SkippedEntity = 7,
    StartPrefixMapping = 8,
    EndPrefixMapping = 9,
    Comment = 10,
}

impl EventKind {
    /// Decode a raw tag byte. Returns `None` for bytes outside the set.
    pub fn from_tag(tag: u8) -> Option<Self> {
        Some(match tag {
            0 => Self::StartDocument,
            1 => Self::EndDocument,
            2 => Self::StartElement,
            3 => Self::EndElement,
            4 => Self::Characters,
            5 => Self::IgnorableWhitespace,
            6 => Self::ProcessingInstruction,
            7 => Self::SkippedEntity,
            8 => Self::StartPrefixMapping,
            9 => Self::EndPrefixMapping,
            10 => Self::Comment,
            _ => return None,
        })
    }

    /// The raw tag byte.
    pub fn tag(self) -> u8 {
        self as u8
    }

    /// Whether a source position is recorded for this kind. Prefix mapping
    /// events carry no position.
    pub fn is_located(self) -> bool {
        !matches!(self, Self::StartPrefixMapping | Self::EndPrefixMapping)
    }

    /// Short lowercase name, used in logs and dumps.
    pub fn name(self) -> &'static str {
        match self {
            Self::StartDocument => "start-document",
            Self::EndDocument => "end-document",
            Self::StartElement => "start-element",
            Self::EndElement => "end-element",
            Self::Characters => "characters",
            Self::IgnorableWhitespace => "ignorable-whitespace",
            Self::ProcessingInstruction => "processing-instruction",
            Self::SkippedEntity => "skipped-entity",
            Self::StartPrefixMapping => "start-prefix-mapping",
            Self::EndPrefixMapping => "end-prefix-mapping",
            Self::Comment => "comment",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One document event as an owned value.
///
/// The push contract ([`crate::XmlReceiver`]) passes borrowed data; `Event`
/// is the owned form used where a stream must be materialized, compared, or
/// printed (collectors, dumps, tests).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Event {
    StartDocument,
    EndDocument,
    StartElement {
        uri: String,
        local: String,
        qname: String,
        attributes: Attributes,
    },
    EndElement {
        uri: String,
        local: String,
        qname: String,
    },
    Characters(String),
    IgnorableWhitespace(String),
    ProcessingInstruction {
        target: String,
        data: String,
    },
    SkippedEntity(String),
    StartPrefixMapping {
        prefix: String,
        uri: String,
    },
    EndPrefixMapping {
        prefix: String,
    },
    Comment(String),
}

impl Event {
    /// The kind tag for this event.
    pub fn kind(&self) -> EventKind {
        match self {
            Self::StartDocument => EventKind::StartDocument,
            Self::EndDocument => EventKind::EndDocument,
            Self::StartElement { .. } => EventKind::StartElement,
            Self::EndElement { .. } => EventKind::EndElement,
            Self::Characters(_) => EventKind::Characters,
            Self::IgnorableWhitespace(_) => EventKind::IgnorableWhitespace,
            Self::ProcessingInstruction { .. } => EventKind::ProcessingInstruction,
            Self::SkippedEntity(_) => EventKind::SkippedEntity,
            Self::StartPrefixMapping { .. } => EventKind::StartPrefixMapping,
            Self::EndPrefixMapping { .. } => EventKind::EndPrefixMapping,
            Self::Comment(_) => EventKind::Comment,
        }
    }
}
