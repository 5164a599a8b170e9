/// Boxed error produced by message marshal and unmarshal routines.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors raised while turning a message into frame bytes.
#[derive(Debug, thiserror::Error)]
pub enum EncodeError {
    /// The message is larger than a length prefix can describe.
    #[error("payload too large ({size} bytes, max {max})")]
    PayloadTooLarge { size: usize, max: usize },

    /// The message library failed to marshal the message.
    #[error("marshal failed: {0}")]
    Marshal(#[source] BoxError),

    /// Marshaled bytes disagree with the size the message reported.
    #[error("marshaled length {actual} does not match reported size {declared}")]
    SizeMismatch { declared: usize, actual: usize },
}

/// Errors that can occur during frame encoding/decoding.
#[derive(Debug, thiserror::Error)]
pub enum FrameError {
    /// The stream ended partway through a length prefix.
    #[error("stream ended inside a length prefix ({received} prefix bytes read)")]
    TruncatedPrefix { received: usize },

    /// The stream ended before the declared payload was fully read.
    #[error("truncated frame (declared {declared} bytes, received {received})")]
    TruncatedPayload { declared: usize, received: usize },

    /// The varint length prefix did not terminate or overflowed 32 bits.
    #[error("invalid varint32 length prefix ({consumed} bytes consumed)")]
    InvalidVarint { consumed: usize },

    /// A message could not be encoded.
    #[error("encoding failed: {0}")]
    Encoding(#[from] EncodeError),

    /// The unmarshal callback rejected a frame payload.
    #[error("decoding frame {index} failed: {source}")]
    Decoding {
        index: usize,
        #[source]
        source: BoxError,
    },

    /// An I/O error occurred while reading or writing frames.
    #[error("frame I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl FrameError {
    /// True for both flavours of truncated frame.
    pub fn is_truncated(&self) -> bool {
        matches!(
            self,
            FrameError::TruncatedPrefix { .. } | FrameError::TruncatedPayload { .. }
        )
    }
}

/// A collection write that stopped early.
///
/// `written` counts the bytes the stream accepted before the failure, which
/// may end in the middle of a frame.
#[derive(Debug, thiserror::Error)]
#[error("{source} (after {written} bytes written)")]
pub struct WriteError {
    pub written: usize,
    #[source]
    pub source: FrameError,
}

impl WriteError {
    pub(crate) fn new(written: usize, source: FrameError) -> Self {
        Self { written, source }
    }
}

pub type Result<T> = std::result::Result<T, FrameError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncated_variants_are_flagged() {
        assert!(FrameError::TruncatedPrefix { received: 2 }.is_truncated());
        assert!(FrameError::TruncatedPayload {
            declared: 10,
            received: 3
        }
        .is_truncated());
        assert!(!FrameError::InvalidVarint { consumed: 5 }.is_truncated());
    }

    #[test]
    fn write_error_reports_partial_count() {
        let err = WriteError::new(
            12,
            FrameError::Io(std::io::Error::from(std::io::ErrorKind::BrokenPipe)),
        );
        let text = err.to_string();
        assert!(text.contains("after 12 bytes"));
        assert!(std::error::Error::source(&err).is_some());
    }
}
