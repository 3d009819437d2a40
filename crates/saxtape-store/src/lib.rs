//! Compact, replayable store for document event streams.
//!
//! A [`Tape`] records the events pushed into it through the
//! [`saxtape_types::XmlReceiver`] contract into columnar buffers and plays
//! them back, in whole or from a [`Mark`], to any other receiver. A finished
//! tape can be serialized to an opaque binary blob and reconstructed later
//! ([`Tape::to_bytes`] / [`Tape::from_bytes`]).
//!
//! Recording takes `&mut Tape`; replay takes `&Tape` and keeps all of its
//! state in per-call cursors, so one completed tape can feed any number of
//! concurrent replays.

mod codec;
mod column;
pub mod config;
pub mod error;
pub mod mark;
pub mod tape;
pub mod trace;

pub use config::TapeOptions;
pub use error::{TapeError, TapeResult};
pub use mark::Mark;
pub use tape::Tape;
pub use trace::TraceReceiver;
