// Error taxonomy for the record parser
//
// Two failure classes reach the caller: out-of-memory and malformed input.
// "Unfinished" is not an error and lives in ParseOutcome instead.

use thiserror::Error;

/// Allocation failure or configured limit hit while growing a buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("No memory: cannot reserve {requested} more bytes")]
pub struct OutOfMemory {
    /// Number of additional bytes that could not be reserved
    pub requested: usize,
}

/// Coarse classification of a [`ParseError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    OutOfMemory,
    Malformed,
}

/// Failure reported by `parse`/`finish`. Fatal for the current record:
/// the parser stays in the error state until `clear`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error(transparent)]
    OutOfMemory(#[from] OutOfMemory),
    /// `offset` is relative to the first byte of the record.
    #[error("Bad format: unexpected byte {byte:#04x} at offset {offset}")]
    UnexpectedByte { offset: usize, byte: u8 },
    #[error("Bad format: unterminated quoted field at offset {offset}")]
    UnterminatedQuote { offset: usize },
}

impl ParseError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ParseError::OutOfMemory(_) => ErrorKind::OutOfMemory,
            ParseError::UnexpectedByte { .. } | ParseError::UnterminatedQuote { .. } => {
                ErrorKind::Malformed
            }
        }
    }

    pub fn is_malformed(&self) -> bool {
        self.kind() == ErrorKind::Malformed
    }
}

/// Rejected dialect or limits in a [`ParserConfig`](crate::ParserConfig).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("{first} and {second} must differ (both are {byte:#04x})")]
    Conflict {
        first: &'static str,
        second: &'static str,
        byte: u8,
    },
    #[error("crlf line endings require a \\n terminator, got {0:#04x}")]
    CrlfTerminator(u8),
    #[error("{0} cannot be \\r while crlf line endings are enabled")]
    CarriageReturn(&'static str),
    #[error("max_buffer_size must be greater than zero")]
    ZeroBufferLimit,
}
