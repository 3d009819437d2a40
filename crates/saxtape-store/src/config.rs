use serde::{Deserialize, Serialize};

/// Configuration for a [`crate::Tape`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TapeOptions {
    /// Initial capacity of the event column. The text column starts at four
    /// times this, the remaining columns at this value.
    pub initial_events: usize,
    /// Whether source positions are recorded when the producer offers them.
    /// When `false` the tape ignores locator registration entirely and
    /// replays carry no position information.
    pub record_location: bool,
}

impl Default for TapeOptions {
    fn default() -> Self {
        Self {
            initial_events: 10,
            record_location: true,
        }
    }
}
