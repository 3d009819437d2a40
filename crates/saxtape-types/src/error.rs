use thiserror::Error;

/// Errors a receiver may raise while consuming an event stream.
#[derive(Debug, Error)]
pub enum ReceiveError {
    /// The stream violates document well-formedness. Raised by validating
    /// receivers, never by the recording or replay machinery itself.
    #[error("malformed event stream: {reason} (line {line}, column {column})")]
    Malformed {
        reason: String,
        line: i32,
        column: i32,
    },

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Message(String),
}

impl ReceiveError {
    /// Build a [`ReceiveError::Malformed`] with position context. Pass `-1`
    /// for an unknown line or column.
    pub fn malformed(reason: impl Into<String>, line: i32, column: i32) -> Self {
        Self::Malformed {
            reason: reason.into(),
            line,
            column,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn malformed_formats_with_position() {
        let err = ReceiveError::malformed("unbalanced end", 3, 17);
        assert_eq!(
            err.to_string(),
            "malformed event stream: unbalanced end (line 3, column 17)"
        );
    }

    #[test]
    fn io_error_converts() {
        let io = std::io::Error::new(std::io::ErrorKind::Other, "sink closed");
        let err: ReceiveError = io.into();
        assert!(err.to_string().contains("sink closed"));
    }
}
