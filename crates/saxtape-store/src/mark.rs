use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// Stamp source for tape generations. Every tape construction, clear, and
/// decode takes a fresh stamp, so a mark can always be matched to the exact
/// tape state that produced it.
static NEXT_STAMP: AtomicU64 = AtomicU64::new(1);

pub(crate) fn next_stamp() -> u64 {
    NEXT_STAMP.fetch_add(1, Ordering::Relaxed)
}

/// Position of every column cursor at one instant of recording.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) struct Cursors {
    pub event: usize,
    pub text: usize,
    pub scalar: usize,
    pub line: usize,
    pub system_id: usize,
    pub attribute_count: usize,
    pub string: usize,
}

/// A replayable position in a tape.
///
/// Captured with [`crate::Tape::mark`] before the event of interest is
/// recorded. A mark taken just before an element start replays exactly that
/// element's subtree; any other mark replays to the end of the log.
///
/// Marks are value types stamped with the generation of the tape state that
/// produced them. Replaying a mark against any other tape, or against the
/// same tape after [`crate::Tape::clear`], fails with
/// [`crate::TapeError::ForeignMark`] rather than producing garbage.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Mark {
    pub(crate) id: Option<String>,
    pub(crate) stamp: u64,
    pub(crate) cursors: Cursors,
}

impl Mark {
    pub(crate) fn new(id: Option<String>, stamp: u64, cursors: Cursors) -> Self {
        Self { id, stamp, cursors }
    }

    /// Caller-supplied identifier, if one was given at capture time.
    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    /// Index of the first event this mark replays.
    pub fn event_index(&self) -> usize {
        self.cursors.event
    }
}

impl fmt::Display for Mark {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.id {
            Some(id) => write!(f, "{}@{}", id, self.cursors.event),
            None => write!(f, "@{}", self.cursors.event),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stamps_are_unique() {
        let a = next_stamp();
        let b = next_stamp();
        assert_ne!(a, b);
    }

    #[test]
    fn display_includes_id_when_present() {
        let mark = Mark::new(Some("child2".into()), 1, Cursors::default());
        assert_eq!(mark.to_string(), "child2@0");
        let anonymous = Mark::new(None, 1, Cursors::default());
        assert_eq!(anonymous.to_string(), "@0");
    }
}
