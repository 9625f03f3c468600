// Decoded fields of the record in progress
//
// Field bytes are copied out of the input buffer as they are classified,
// with quotes stripped and escapes resolved. All fields of one record share
// a single scratch vector; `ends` marks where each completed field stops.

use crate::error::OutOfMemory;
use crate::sink::FieldSink;

pub struct RecordBuf {
    scratch: Vec<u8>,
    ends: Vec<usize>,
    max_field_size: Option<usize>,
}

impl RecordBuf {
    pub fn new(max_field_size: Option<usize>) -> Self {
        RecordBuf {
            scratch: Vec::new(),
            ends: Vec::new(),
            max_field_size,
        }
    }

    /// Start offset of the field currently being accumulated
    #[inline]
    fn field_start(&self) -> usize {
        self.ends.last().copied().unwrap_or(0)
    }

    /// Length of the field currently being accumulated
    #[inline]
    pub fn current_len(&self) -> usize {
        self.scratch.len() - self.field_start()
    }

    /// Number of completed fields
    #[inline]
    pub fn field_count(&self) -> usize {
        self.ends.len()
    }

    /// Append decoded bytes to the current field.
    pub fn push_slice(&mut self, bytes: &[u8]) -> Result<(), OutOfMemory> {
        if bytes.is_empty() {
            return Ok(());
        }
        let oom = OutOfMemory {
            requested: bytes.len(),
        };
        if let Some(max) = self.max_field_size {
            if self.current_len() + bytes.len() > max {
                return Err(oom);
            }
        }
        self.scratch.try_reserve(bytes.len()).map_err(|_| oom)?;
        self.scratch.extend_from_slice(bytes);
        Ok(())
    }

    #[inline]
    pub fn push_byte(&mut self, byte: u8) -> Result<(), OutOfMemory> {
        self.push_slice(&[byte])
    }

    /// Drop a trailing byte of the current field if it equals `byte`.
    pub fn strip_trailing(&mut self, byte: u8) {
        if self.current_len() > 0 && self.scratch.last() == Some(&byte) {
            self.scratch.pop();
        }
    }

    /// Close the current field.
    pub fn end_field(&mut self) -> Result<(), OutOfMemory> {
        self.ends
            .try_reserve(1)
            .map_err(|_| OutOfMemory {
                requested: std::mem::size_of::<usize>(),
            })?;
        self.ends.push(self.scratch.len());
        Ok(())
    }

    /// Hand every completed field to `sink` in index order, then reset.
    /// Returns the number of fields delivered.
    pub fn emit<S: FieldSink + ?Sized>(&mut self, sink: &mut S) -> usize {
        let mut start = 0;
        for (index, &end) in self.ends.iter().enumerate() {
            sink.on_field(index, &self.scratch[start..end]);
            start = end;
        }
        let count = self.ends.len();
        self.clear();
        count
    }

    /// Forget all accumulated fields, keeping allocations.
    pub fn clear(&mut self) {
        self.scratch.clear();
        self.ends.clear();
    }
}
