// spp - Incremental delimited-record parser
//
// Bytes are fed in whatever chunks they arrive in; parse() either completes
// one record (handing each field to a sink), reports that more input is
// needed, or fails with a malformed-input / out-of-memory error that sticks
// until clear().
//
// Layers:
// core::buffer  - growable byte store with lazy compaction
// core::scanner - per-byte state machine (fields, quotes, escapes)
// core::field   - decoded fields of the record in progress
// parser        - public RecordParser lifecycle: feed/parse/finish/clear
//
// Default dialect: `,` delimiter, `"` quote, `\` escape, `\n` terminator.
// ParserConfig changes any of them, enables CRLF line endings, or switches
// to doubled-quote escaping.

pub mod config;
pub mod core;
pub mod error;
pub mod parser;
pub mod sink;

pub use config::{ParserConfig, DEFAULT_MAX_BUFFER};
pub use error::{ConfigError, ErrorKind, OutOfMemory, ParseError};
pub use parser::{ParseOutcome, ParserState, RecordParser};
pub use sink::{Discard, FieldSink};
