//! Composable receivers for document event streams.
//!
//! Everything here implements [`saxtape_types::XmlReceiver`] and wraps or
//! terminates a stream:
//!
//! - [`NullReceiver`] — Absorbs every event
//! - [`Tee`] — Drives two receivers from one stream, in order
//! - [`Collector`] — Materializes the stream as owned [`saxtape_types::Event`]s
//! - [`Inspector`] — Validates stream well-formedness in front of a
//!   downstream receiver
//!
//! Producers stay oblivious: they push into one `XmlReceiver` and the
//! composition decides where events go.

pub mod collector;
pub mod inspector;
pub mod null;
pub mod tee;

pub use collector::Collector;
pub use inspector::Inspector;
pub use null::NullReceiver;
pub use tee::Tee;
