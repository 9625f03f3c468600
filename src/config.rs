// Parser dialect and resource limits

use crate::error::ConfigError;

/// Default maximum buffer size for a parser (256 MB).
pub const DEFAULT_MAX_BUFFER: usize = 256 * 1024 * 1024;

/// Byte classes and limits used by a [`RecordParser`](crate::RecordParser).
///
/// The default dialect is `,` delimiter, `"` quote, `\` escape and `\n`
/// terminator. Setting `escape` equal to `quote` switches quoted fields to
/// RFC 4180 style, where a doubled quote stands for one literal quote.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParserConfig {
    /// Field separator
    pub delimiter: u8,
    /// Opens and closes a quoted field
    pub quote: u8,
    /// Inside a quoted field, makes the next byte literal
    pub escape: u8,
    /// Ends a record
    pub terminator: u8,
    /// Treat `\r\n` as the terminator instead of bare `\n`
    pub crlf: bool,
    /// Maximum number of pending bytes held by the parser
    pub max_buffer_size: usize,
    /// Maximum size of a single decoded field, if any
    pub max_field_size: Option<usize>,
}

impl Default for ParserConfig {
    fn default() -> Self {
        ParserConfig {
            delimiter: b',',
            quote: b'"',
            escape: b'\\',
            terminator: b'\n',
            crlf: false,
            max_buffer_size: DEFAULT_MAX_BUFFER,
            max_field_size: None,
        }
    }
}

impl ParserConfig {
    /// RFC 4180 flavour: doubled quotes inside quoted fields, CRLF tolerated.
    pub fn rfc4180() -> Self {
        ParserConfig {
            escape: b'"',
            crlf: true,
            ..Self::default()
        }
    }

    pub fn delimiter(mut self, byte: u8) -> Self {
        self.delimiter = byte;
        self
    }

    pub fn quote(mut self, byte: u8) -> Self {
        self.quote = byte;
        self
    }

    pub fn escape(mut self, byte: u8) -> Self {
        self.escape = byte;
        self
    }

    pub fn terminator(mut self, byte: u8) -> Self {
        self.terminator = byte;
        self
    }

    pub fn crlf(mut self, enabled: bool) -> Self {
        self.crlf = enabled;
        self
    }

    pub fn max_buffer_size(mut self, max: usize) -> Self {
        self.max_buffer_size = max;
        self
    }

    pub fn max_field_size(mut self, max: usize) -> Self {
        self.max_field_size = Some(max);
        self
    }

    /// Check that every byte class is unambiguous.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let distinct = [
            ("delimiter", self.delimiter, "quote", self.quote),
            ("delimiter", self.delimiter, "terminator", self.terminator),
            ("quote", self.quote, "terminator", self.terminator),
            ("escape", self.escape, "delimiter", self.delimiter),
            ("escape", self.escape, "terminator", self.terminator),
        ];
        for (first, a, second, b) in distinct {
            if a == b {
                return Err(ConfigError::Conflict {
                    first,
                    second,
                    byte: a,
                });
            }
        }

        if self.crlf {
            if self.terminator != b'\n' {
                return Err(ConfigError::CrlfTerminator(self.terminator));
            }
            for (name, byte) in [
                ("delimiter", self.delimiter),
                ("quote", self.quote),
                ("escape", self.escape),
            ] {
                if byte == b'\r' {
                    return Err(ConfigError::CarriageReturn(name));
                }
            }
        }

        if self.max_buffer_size == 0 {
            return Err(ConfigError::ZeroBufferLimit);
        }
        Ok(())
    }

    /// Whether quoted fields use doubled quotes instead of a separate escape.
    #[inline]
    pub fn doubled_quotes(&self) -> bool {
        self.escape == self.quote
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        assert_eq!(ParserConfig::default().validate(), Ok(()));
        assert_eq!(ParserConfig::rfc4180().validate(), Ok(()));
        assert!(ParserConfig::rfc4180().doubled_quotes());
        assert!(!ParserConfig::default().doubled_quotes());
    }

    #[test]
    fn test_conflicting_bytes_rejected() {
        let err = ParserConfig::default().delimiter(b'\n').validate();
        assert_eq!(
            err,
            Err(ConfigError::Conflict {
                first: "delimiter",
                second: "terminator",
                byte: b'\n',
            })
        );

        let err = ParserConfig::default().escape(b',').validate();
        assert!(matches!(err, Err(ConfigError::Conflict { first: "escape", .. })));
    }

    #[test]
    fn test_crlf_constraints() {
        let err = ParserConfig::default().terminator(b';').crlf(true).validate();
        assert_eq!(err, Err(ConfigError::CrlfTerminator(b';')));

        let err = ParserConfig::default().delimiter(b'\r').crlf(true).validate();
        assert_eq!(err, Err(ConfigError::CarriageReturn("delimiter")));

        // Without crlf a bare \r is an ordinary byte class choice
        assert_eq!(ParserConfig::default().delimiter(b'\r').validate(), Ok(()));
    }

    #[test]
    fn test_zero_buffer_limit_rejected() {
        let err = ParserConfig::default().max_buffer_size(0).validate();
        assert_eq!(err, Err(ConfigError::ZeroBufferLimit));
    }
}
