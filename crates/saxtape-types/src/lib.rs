//! Foundation types for saxtape.
//!
//! This crate defines the event vocabulary of an XML document stream and the
//! push contract ([`XmlReceiver`]) through which producers drive consumers.
//! Every other saxtape crate depends on `saxtape-types`.
//!
//! # Key Types
//!
//! - [`XmlReceiver`] — The consumer contract: one method per document event
//! - [`EventKind`] — Closed tag set identifying each event kind
//! - [`Event`] — Owned event value, for collecting and inspecting streams
//! - [`Attributes`] — Ordered attribute list attached to an element start
//! - [`Name`] — Borrowed element name triple (namespace uri, local, qname)
//! - [`SourceLocation`] — Line/column/system-id position, with an explicit
//!   unknown sentinel

pub mod attribute;
pub mod error;
pub mod event;
pub mod location;
pub mod name;
pub mod receiver;

pub use attribute::{Attribute, Attributes};
pub use error::ReceiveError;
pub use event::{Event, EventKind};
pub use location::SourceLocation;
pub use name::Name;
pub use receiver::XmlReceiver;
