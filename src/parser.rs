// Record parser: buffer + scanner + error state
//
// Stateful parser for records arriving in arbitrary chunks (e.g. one
// connection's reads). Feed bytes as they come, call parse() until it
// reports Unfinished.
//
// Key design:
// - feed() only appends; all classification happens in parse()
// - Fields are delivered to the sink only once their record is terminated,
//   so an Unfinished parse never produces partial output
// - A failed parse is sticky until clear()
//
// A parser is meant for one caller at a time. It holds no locks; callers
// sharing one across threads must serialize access themselves.

use crate::config::ParserConfig;
use crate::core::{ByteBuffer, Scan, Scanner};
use crate::error::{ConfigError, OutOfMemory, ParseError};
use crate::sink::FieldSink;

/// Lifecycle state of a [`RecordParser`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParserState {
    /// No record in progress
    Ready,
    /// Part of a record has been classified; waiting for more input
    Scanning,
    /// Last parse failed; only `clear` leaves this state
    Error,
}

/// Successful result of [`RecordParser::parse`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseOutcome {
    /// A record was consumed and `fields` fields were handed to the sink
    Complete { fields: usize },
    /// Input so far is a valid prefix; feed more and parse again
    Unfinished,
}

impl ParseOutcome {
    pub fn is_complete(&self) -> bool {
        matches!(self, ParseOutcome::Complete { .. })
    }
}

pub struct RecordParser {
    buffer: ByteBuffer,
    scanner: Scanner,
    /// Pending bytes already classified by the scanner
    cursor: usize,
    state: ParserState,
    last_error: Option<ParseError>,
    /// Pending length when the error was raised; clear() drops this much
    error_horizon: usize,
    config: ParserConfig,
}

impl RecordParser {
    /// Create a parser with the default dialect (`,` `"` `\` `\n`).
    pub fn new() -> Self {
        Self::from_valid_config(ParserConfig::default())
    }

    /// Create a parser with a custom dialect and limits.
    pub fn with_config(config: ParserConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::from_valid_config(config))
    }

    fn from_valid_config(config: ParserConfig) -> Self {
        RecordParser {
            buffer: ByteBuffer::new(config.max_buffer_size),
            scanner: Scanner::new(&config),
            cursor: 0,
            state: ParserState::Ready,
            last_error: None,
            error_horizon: 0,
            config,
        }
    }

    /// Append input. Never scans; allowed in any state, including Error,
    /// where the bytes wait for the next clear().
    ///
    /// On failure the parser is left exactly as it was.
    pub fn feed(&mut self, bytes: &[u8]) -> Result<(), OutOfMemory> {
        self.buffer.append(bytes).map_err(|err| {
            tracing::debug!(
                requested = err.requested,
                buffered = self.buffer.len(),
                "feed rejected"
            );
            err
        })
    }

    /// Try to complete one record, handing its fields to `sink`.
    ///
    /// Returns `Unfinished` (sink untouched) when the buffered input ends
    /// before a terminator. Errors are sticky: once a parse fails, every
    /// later parse returns the same error without rescanning.
    pub fn parse<S: FieldSink + ?Sized>(
        &mut self,
        sink: &mut S,
    ) -> Result<ParseOutcome, ParseError> {
        if let Some(err) = self.last_error {
            return Err(err);
        }

        let pending = self.buffer.pending();
        let pending_len = pending.len();
        let scan = self.scanner.scan(pending, self.cursor);
        match scan {
            Ok(Scan::Complete { consumed }) => Ok(self.deliver(consumed, sink)),
            Ok(Scan::Exhausted) => {
                self.cursor = pending_len;
                if self.cursor > 0 || self.scanner.in_record() {
                    self.state = ParserState::Scanning;
                }
                Ok(ParseOutcome::Unfinished)
            }
            Ok(Scan::Malformed { offset, byte }) => {
                self.cursor = offset;
                Err(self.fail(ParseError::UnexpectedByte { offset, byte }))
            }
            Err(oom) => Err(self.fail(oom.into())),
        }
    }

    /// Like [`parse`](Self::parse), but treats the end of the buffered input
    /// as the end of the stream: a trailing record without terminator is
    /// completed, and an open quoted field is an error.
    ///
    /// Returns `Unfinished` only when nothing is pending.
    pub fn finish<S: FieldSink + ?Sized>(
        &mut self,
        sink: &mut S,
    ) -> Result<ParseOutcome, ParseError> {
        if let ParseOutcome::Complete { fields } = self.parse(sink)? {
            return Ok(ParseOutcome::Complete { fields });
        }
        let pending = self.buffer.len();
        if pending == 0 {
            return Ok(ParseOutcome::Unfinished);
        }

        if let Err(err) = self.scanner.finish(pending) {
            return Err(self.fail(err));
        }
        Ok(self.deliver(pending, sink))
    }

    /// Parse one record into owned fields: `Some` on Complete, `None` on
    /// Unfinished.
    pub fn parse_record(&mut self) -> Result<Option<Vec<Vec<u8>>>, ParseError> {
        let mut fields: Vec<Vec<u8>> = Vec::new();
        let outcome = self.parse(&mut fields)?;
        Ok(outcome.is_complete().then_some(fields))
    }

    /// Take up to `max` complete records.
    pub fn take_records(&mut self, max: usize) -> Result<Vec<Vec<Vec<u8>>>, ParseError> {
        let mut records = Vec::new();
        while records.len() < max {
            match self.parse_record()? {
                Some(fields) => records.push(fields),
                None => break,
            }
        }
        Ok(records)
    }

    /// Reset to Ready, discarding the unfinished record in progress (every
    /// pending byte), or after an error every byte pending when it was
    /// raised. Bytes fed after an error are kept, and so are records still
    /// queued after a Complete.
    pub fn clear(&mut self) {
        let discard = match self.state {
            ParserState::Error => self.error_horizon,
            ParserState::Scanning => self.buffer.len(),
            ParserState::Ready => 0,
        };
        let discard = discard.min(self.buffer.len());
        if discard > 0 || self.state != ParserState::Ready {
            tracing::debug!(discarded = discard, state = ?self.state, "clearing parser");
        }

        self.buffer.consume(discard);
        self.scanner.reset();
        self.cursor = 0;
        self.state = ParserState::Ready;
        self.last_error = None;
        self.error_horizon = 0;
    }

    pub fn state(&self) -> ParserState {
        self.state
    }

    /// The error returned by the last failed parse, until clear()
    pub fn last_error(&self) -> Option<ParseError> {
        self.last_error
    }

    /// Fields recognised so far in the record in progress
    pub fn field_count(&self) -> usize {
        self.scanner.field_count()
    }

    /// Number of fed bytes not yet consumed by a completed record
    pub fn buffer_size(&self) -> usize {
        self.buffer.len()
    }

    /// Whether any fed bytes are not yet consumed
    pub fn has_partial(&self) -> bool {
        !self.buffer.is_empty()
    }

    pub fn config(&self) -> &ParserConfig {
        &self.config
    }

    fn deliver<S: FieldSink + ?Sized>(&mut self, consumed: usize, sink: &mut S) -> ParseOutcome {
        let fields = self.scanner.record_mut().emit(sink);
        self.buffer.consume(consumed);
        self.cursor = 0;
        self.state = ParserState::Ready;
        tracing::trace!(fields, consumed, "record complete");
        ParseOutcome::Complete { fields }
    }

    fn fail(&mut self, err: ParseError) -> ParseError {
        tracing::debug!(error = %err, kind = ?err.kind(), "parse failed");
        self.state = ParserState::Error;
        self.last_error = Some(err);
        self.error_horizon = self.buffer.len();
        err
    }
}

impl Default for RecordParser {
    fn default() -> Self {
        Self::new()
    }
}
