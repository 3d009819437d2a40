use saxtape_types::ReceiveError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TapeError {
    /// The mark was created by a different tape, or by this tape before it
    /// was cleared or reloaded.
    #[error("mark stamped {mark} does not belong to this tape (stamped {tape})")]
    ForeignMark { mark: u64, tape: u64 },

    /// A payload column ran out before the event column did. The recorded
    /// log is structurally inconsistent and replay cannot continue.
    #[error("event log truncated: {column} column exhausted at event {event}")]
    Truncated {
        column: &'static str,
        event: usize,
    },

    #[error("invalid tape magic: expected {expected}, got {actual}")]
    InvalidMagic { expected: String, actual: String },

    #[error("unsupported tape version: {0}")]
    UnsupportedVersion(u32),

    #[error("tape checksum mismatch: stored {stored:08x}, computed {computed:08x}")]
    ChecksumMismatch { stored: u32, computed: u32 },

    #[error("corrupt tape data at offset {offset}: {reason}")]
    Corrupt { offset: usize, reason: String },

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    /// Raised by the receiver a replay is feeding, not by the tape.
    #[error(transparent)]
    Receiver(#[from] ReceiveError),
}

pub type TapeResult<T> = Result<T, TapeError>;
