// Byte-level state machine for one record
//
// The scanner walks pending input from a resume position, copying field
// content into a RecordBuf and stopping at the first of: record terminator,
// grammar violation, or end of input. Its state survives between calls so a
// record split across feeds resumes exactly where the previous scan stopped.
//
// Runs of ordinary bytes are skipped with memchr instead of byte-by-byte.

use memchr::{memchr, memchr2, memchr3};

use super::field::RecordBuf;
use crate::config::ParserConfig;
use crate::error::{OutOfMemory, ParseError};

/// Where the scanner is within the current record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanState {
    /// At the start of a field
    AwaitingField,
    /// Inside an unquoted field
    InField,
    /// Inside a quoted field
    InQuotedField,
    /// Escape byte seen inside a quoted field; next byte is literal
    AfterEscape,
    /// Quote closed; only a delimiter or terminator may follow
    AwaitingTerminator,
    /// `\r` seen after a closing quote in crlf mode; `\n` must follow
    AwaitingLineFeed,
}

/// Result of one scan call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scan {
    /// Terminator found; `consumed` bytes (terminator included) form the record
    Complete { consumed: usize },
    /// All input classified, record not yet terminated
    Exhausted,
    /// Grammar violation at `offset`; nothing past it was examined
    Malformed { offset: usize, byte: u8 },
}

/// Byte classes copied out of the config for the hot loop
#[derive(Debug, Clone, Copy)]
struct Dialect {
    delimiter: u8,
    quote: u8,
    escape: u8,
    terminator: u8,
    crlf: bool,
    doubled_quotes: bool,
}

pub struct Scanner {
    state: ScanState,
    dialect: Dialect,
    record: RecordBuf,
}

impl Scanner {
    pub fn new(config: &ParserConfig) -> Self {
        Scanner {
            state: ScanState::AwaitingField,
            dialect: Dialect {
                delimiter: config.delimiter,
                quote: config.quote,
                escape: config.escape,
                terminator: config.terminator,
                crlf: config.crlf,
                doubled_quotes: config.doubled_quotes(),
            },
            record: RecordBuf::new(config.max_field_size),
        }
    }

    #[inline]
    pub fn state(&self) -> ScanState {
        self.state
    }

    /// Fields completed so far in the current record
    #[inline]
    pub fn field_count(&self) -> usize {
        self.record.field_count()
    }

    /// Whether any part of a record has been seen
    pub fn in_record(&self) -> bool {
        self.state != ScanState::AwaitingField || self.record.field_count() > 0
    }

    pub fn record_mut(&mut self) -> &mut RecordBuf {
        &mut self.record
    }

    /// Back to the start of a record, dropping accumulated fields.
    pub fn reset(&mut self) {
        self.state = ScanState::AwaitingField;
        self.record.clear();
    }

    /// Classify `input[from..]`. Positions in the result are indices into
    /// `input`.
    pub fn scan(&mut self, input: &[u8], from: usize) -> Result<Scan, OutOfMemory> {
        let d = self.dialect;
        let mut pos = from;

        while pos < input.len() {
            let byte = input[pos];

            match self.state {
                ScanState::AwaitingField => {
                    if byte == d.delimiter {
                        self.record.end_field()?;
                        pos += 1;
                    } else if byte == d.terminator {
                        return self.complete(pos);
                    } else if byte == d.quote {
                        self.state = ScanState::InQuotedField;
                        pos += 1;
                    } else {
                        // Let InField take the whole run, this byte included
                        self.state = ScanState::InField;
                    }
                }
                ScanState::InField => {
                    let rest = &input[pos..];
                    match memchr3(d.delimiter, d.terminator, d.quote, rest) {
                        Some(i) => {
                            self.record.push_slice(&rest[..i])?;
                            pos += i;
                            let stop = input[pos];
                            if stop == d.delimiter {
                                self.record.end_field()?;
                                self.state = ScanState::AwaitingField;
                                pos += 1;
                            } else if stop == d.terminator {
                                if d.crlf {
                                    self.record.strip_trailing(b'\r');
                                }
                                return self.complete(pos);
                            } else {
                                // Quote inside an unquoted field
                                return Ok(Scan::Malformed {
                                    offset: pos,
                                    byte: stop,
                                });
                            }
                        }
                        None => {
                            self.record.push_slice(rest)?;
                            pos = input.len();
                        }
                    }
                }
                ScanState::InQuotedField => {
                    let rest = &input[pos..];
                    let hit = if d.doubled_quotes {
                        memchr(d.quote, rest)
                    } else {
                        memchr2(d.quote, d.escape, rest)
                    };
                    match hit {
                        Some(i) => {
                            self.record.push_slice(&rest[..i])?;
                            pos += i;
                            self.state = if input[pos] == d.quote {
                                ScanState::AwaitingTerminator
                            } else {
                                ScanState::AfterEscape
                            };
                            pos += 1;
                        }
                        None => {
                            self.record.push_slice(rest)?;
                            pos = input.len();
                        }
                    }
                }
                ScanState::AfterEscape => {
                    self.record.push_byte(byte)?;
                    self.state = ScanState::InQuotedField;
                    pos += 1;
                }
                ScanState::AwaitingTerminator => {
                    if byte == d.delimiter {
                        self.record.end_field()?;
                        self.state = ScanState::AwaitingField;
                        pos += 1;
                    } else if byte == d.terminator {
                        return self.complete(pos);
                    } else if d.doubled_quotes && byte == d.quote {
                        // "" inside a quoted field
                        self.record.push_byte(byte)?;
                        self.state = ScanState::InQuotedField;
                        pos += 1;
                    } else if d.crlf && byte == b'\r' {
                        self.state = ScanState::AwaitingLineFeed;
                        pos += 1;
                    } else {
                        return Ok(Scan::Malformed { offset: pos, byte });
                    }
                }
                ScanState::AwaitingLineFeed => {
                    if byte == d.terminator {
                        return self.complete(pos);
                    }
                    return Ok(Scan::Malformed { offset: pos, byte });
                }
            }
        }

        Ok(Scan::Exhausted)
    }

    /// Treat end of input as a terminator. `len` is the number of bytes the
    /// record spans, used to locate an unterminated quote.
    pub fn finish(&mut self, len: usize) -> Result<(), ParseError> {
        match self.state {
            ScanState::InQuotedField | ScanState::AfterEscape => {
                Err(ParseError::UnterminatedQuote { offset: len })
            }
            ScanState::InField => {
                if self.dialect.crlf {
                    self.record.strip_trailing(b'\r');
                }
                self.close_record()?;
                Ok(())
            }
            ScanState::AwaitingField
            | ScanState::AwaitingTerminator
            | ScanState::AwaitingLineFeed => {
                self.close_record()?;
                Ok(())
            }
        }
    }

    fn complete(&mut self, terminator_pos: usize) -> Result<Scan, OutOfMemory> {
        self.close_record()?;
        Ok(Scan::Complete {
            consumed: terminator_pos + 1,
        })
    }

    fn close_record(&mut self) -> Result<(), OutOfMemory> {
        self.record.end_field()?;
        self.state = ScanState::AwaitingField;
        Ok(())
    }
}
