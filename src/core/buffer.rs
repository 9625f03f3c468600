// Growable byte store for fed-but-unconsumed input
//
// Key design:
// - Owns data (Vec<u8>) because fed chunks are temporary
// - `head` separates consumed bytes from pending ones
// - Consumed prefix is dropped lazily, either when it dominates the buffer
//   or when an append would otherwise reallocate

use crate::error::OutOfMemory;

pub struct ByteBuffer {
    data: Vec<u8>,
    /// Start of the pending region within `data`
    head: usize,
    /// Upper bound on pending bytes
    max_size: usize,
}

impl ByteBuffer {
    pub fn new(max_size: usize) -> Self {
        ByteBuffer {
            data: Vec::new(),
            head: 0,
            max_size,
        }
    }

    /// Append bytes to the pending region.
    ///
    /// On failure nothing is written and the buffer keeps its prior contents.
    pub fn append(&mut self, bytes: &[u8]) -> Result<(), OutOfMemory> {
        if bytes.is_empty() {
            return Ok(());
        }
        let oom = OutOfMemory {
            requested: bytes.len(),
        };
        if self.len() + bytes.len() > self.max_size {
            return Err(oom);
        }

        // Reuse the consumed prefix before asking the allocator for more
        if self.head > 0 && self.data.capacity() - self.data.len() < bytes.len() {
            self.compact();
        }
        self.data.try_reserve(bytes.len()).map_err(|_| oom)?;
        self.data.extend_from_slice(bytes);
        Ok(())
    }

    /// Bytes not yet consumed.
    #[inline]
    pub fn pending(&self) -> &[u8] {
        &self.data[self.head..]
    }

    /// Number of pending bytes.
    #[inline]
    pub fn len(&self) -> usize {
        self.data.len() - self.head
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Mark the first `n` pending bytes as consumed. `n` is clamped to the
    /// pending length.
    pub fn consume(&mut self, n: usize) {
        debug_assert!(n <= self.len(), "consume past end of buffer");
        self.head += n.min(self.len());

        if self.head == self.data.len() {
            // Nothing pending: reset in place, keep the allocation
            self.data.clear();
            self.head = 0;
        } else if self.head >= self.data.len() / 2 {
            self.compact();
        }
    }

    /// Drop the consumed prefix, moving pending bytes to the front.
    fn compact(&mut self) {
        if self.head > 0 {
            tracing::trace!(dropped = self.head, kept = self.len(), "compacting buffer");
            self.data.drain(..self.head);
            self.head = 0;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_append_and_consume() {
        let mut buf = ByteBuffer::new(1024);
        buf.append(b"hello ").unwrap();
        buf.append(b"world").unwrap();
        assert_eq!(buf.pending(), b"hello world");

        buf.consume(6);
        assert_eq!(buf.pending(), b"world");
        assert_eq!(buf.len(), 5);

        buf.consume(5);
        assert!(buf.is_empty());
        assert_eq!(buf.pending(), b"");
    }

    #[test]
    fn test_empty_append_is_noop() {
        let mut buf = ByteBuffer::new(1);
        buf.append(b"").unwrap();
        assert!(buf.is_empty());
    }

    #[test]
    fn test_limit_leaves_contents_untouched() {
        let mut buf = ByteBuffer::new(8);
        buf.append(b"abcdef").unwrap();
        assert_eq!(buf.append(b"xyz"), Err(OutOfMemory { requested: 3 }));
        assert_eq!(buf.pending(), b"abcdef");

        // Consumed bytes no longer count against the limit
        buf.consume(4);
        buf.append(b"xyz").unwrap();
        assert_eq!(buf.pending(), b"efxyz");
    }

    #[test]
    fn test_compaction_preserves_pending_order() {
        // Small consumes keep the prefix around; large ones compact it.
        // Either way the pending view must be identical.
        let mut lazy = ByteBuffer::new(1024);
        let mut eager = ByteBuffer::new(1024);
        lazy.append(b"0123456789").unwrap();
        eager.append(b"0123456789").unwrap();

        lazy.consume(1);
        lazy.consume(1);
        lazy.consume(1);
        eager.consume(3);
        assert_eq!(lazy.pending(), eager.pending());

        lazy.append(b"abc").unwrap();
        eager.append(b"abc").unwrap();
        assert_eq!(lazy.pending(), b"3456789abc");
        assert_eq!(lazy.pending(), eager.pending());

        lazy.consume(6);
        eager.consume(6);
        assert_eq!(lazy.pending(), b"9abc");
        assert_eq!(lazy.pending(), eager.pending());
    }
}
