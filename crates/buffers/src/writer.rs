//! Binary buffer writer with auto-growing capacity and a bounded cursor.

use thiserror::Error;

/// Largest payload a signed 32-bit size register can describe.
pub const I32_REGISTER_LIMIT: usize = i32::MAX as usize;

/// Returned when a write would push the payload past the register limit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("payload of {requested} bytes exceeds the {limit}-byte size register")]
pub struct CapacityExceeded {
    /// Payload length the write would have produced.
    pub requested: usize,
    /// Register limit of the writer.
    pub limit: usize,
}

/// A binary buffer writer that grows automatically as needed.
///
/// The length of the payload written since the last flush is held against
/// `limit`, the way a fixed-width length register would hold it. Writes that
/// would exceed it fail before touching the buffer.
///
/// # Example
///
/// ```
/// use sizeguard_buffers::Writer;
///
/// let mut writer = Writer::with_limit(16, 4);
/// writer.buf(b"null").unwrap();
/// assert!(writer.u8(b',').is_err());
/// assert_eq!(writer.flush(), b"null");
/// ```
pub struct Writer {
    /// The underlying byte buffer.
    pub uint8: Vec<u8>,
    /// Position where last flush happened.
    pub x0: usize,
    /// Current cursor position.
    pub x: usize,
    /// Allocation size when buffer needs to grow.
    alloc_size: usize,
    /// Largest payload (bytes between `x0` and `x`) the writer accepts.
    limit: usize,
}

impl Default for Writer {
    fn default() -> Self {
        Self::new()
    }
}

impl Writer {
    /// Creates a new writer with default allocation size (64KB) and a 32-bit register.
    pub fn new() -> Self {
        Self::with_alloc_size(64 * 1024)
    }

    /// Creates a new writer with custom allocation size and a 32-bit register.
    pub fn with_alloc_size(alloc_size: usize) -> Self {
        Self::with_limit(alloc_size, I32_REGISTER_LIMIT)
    }

    /// Creates a new writer with custom allocation size and register limit.
    pub fn with_limit(alloc_size: usize, limit: usize) -> Self {
        // Never preallocate past what the register can describe.
        let initial = alloc_size.min(limit);
        Self {
            uint8: vec![0u8; initial],
            x0: 0,
            x: 0,
            alloc_size: initial.max(1),
            limit,
        }
    }

    /// Register limit of this writer.
    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Length of the payload written since the last flush.
    pub fn len(&self) -> usize {
        self.x - self.x0
    }

    /// Returns `true` when nothing was written since the last flush.
    pub fn is_empty(&self) -> bool {
        self.x == self.x0
    }

    /// Ensures the buffer has at least `capacity` bytes available.
    pub fn ensure_capacity(&mut self, capacity: usize) -> Result<(), CapacityExceeded> {
        let requested = self.len().checked_add(capacity).ok_or(CapacityExceeded {
            requested: usize::MAX,
            limit: self.limit,
        })?;
        if requested > self.limit {
            return Err(CapacityExceeded {
                requested,
                limit: self.limit,
            });
        }
        let remaining = self.uint8.len() - self.x;
        if remaining < capacity {
            let new_size = if requested <= self.alloc_size {
                self.alloc_size
            } else {
                requested.saturating_mul(2).min(self.limit)
            };
            self.grow(new_size);
        }
        Ok(())
    }

    fn grow(&mut self, new_size: usize) {
        let x0 = self.x0;
        let x = self.x;
        let mut new_buf = vec![0u8; new_size];
        new_buf[..x - x0].copy_from_slice(&self.uint8[x0..x]);
        self.uint8 = new_buf;
        self.x = x - x0;
        self.x0 = 0;
    }

    /// Discards everything written since the last flush.
    pub fn reset(&mut self) {
        self.x = self.x0;
    }

    /// Returns the written data and advances the flush position.
    pub fn flush(&mut self) -> Vec<u8> {
        let result = self.uint8[self.x0..self.x].to_vec();
        self.x0 = self.x;
        result
    }

    /// Writes a single byte.
    #[inline]
    pub fn u8(&mut self, val: u8) -> Result<(), CapacityExceeded> {
        self.ensure_capacity(1)?;
        self.uint8[self.x] = val;
        self.x += 1;
        Ok(())
    }

    /// Writes raw bytes.
    pub fn buf(&mut self, buf: &[u8]) -> Result<(), CapacityExceeded> {
        let len = buf.len();
        self.ensure_capacity(len)?;
        self.uint8[self.x..self.x + len].copy_from_slice(buf);
        self.x += len;
        Ok(())
    }

    /// Writes an ASCII string.
    pub fn ascii(&mut self, s: &str) -> Result<(), CapacityExceeded> {
        self.buf(s.as_bytes())
    }

    /// Writes `count` copies of `byte`.
    pub fn fill(&mut self, byte: u8, count: usize) -> Result<(), CapacityExceeded> {
        self.ensure_capacity(count)?;
        self.uint8[self.x..self.x + count].fill(byte);
        self.x += count;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_u8() {
        let mut writer = Writer::new();
        writer.u8(0x01).unwrap();
        writer.u8(0x02).unwrap();
        assert_eq!(writer.flush(), [0x01, 0x02]);
    }

    #[test]
    fn test_ascii() {
        let mut writer = Writer::new();
        writer.ascii("hello").unwrap();
        assert_eq!(writer.flush(), b"hello");
    }

    #[test]
    fn test_flush_multiple() {
        let mut writer = Writer::new();
        writer.u8(0x01).unwrap();
        assert_eq!(writer.flush(), [0x01]);
        writer.u8(0x02).unwrap();
        assert_eq!(writer.flush(), [0x02]);
    }

    #[test]
    fn test_grows_past_alloc_size() {
        let mut writer = Writer::with_alloc_size(4);
        writer.buf(b"0123456789").unwrap();
        writer.fill(b'x', 3).unwrap();
        assert_eq!(writer.flush(), b"0123456789xxx");
    }

    #[test]
    fn test_limit_is_inclusive() {
        let mut writer = Writer::with_limit(2, 5);
        writer.buf(b"abcde").unwrap();
        assert_eq!(writer.len(), 5);
        let err = writer.u8(b'f').unwrap_err();
        assert_eq!(
            err,
            CapacityExceeded {
                requested: 6,
                limit: 5
            }
        );
        // Failed write leaves the payload untouched.
        assert_eq!(writer.flush(), b"abcde");
    }

    #[test]
    fn test_limit_applies_per_payload() {
        let mut writer = Writer::with_limit(8, 3);
        writer.ascii("abc").unwrap();
        assert_eq!(writer.flush(), b"abc");
        writer.ascii("def").unwrap();
        assert_eq!(writer.flush(), b"def");
    }

    #[test]
    fn test_reset_discards_unflushed() {
        let mut writer = Writer::new();
        writer.ascii("keep").unwrap();
        writer.flush();
        writer.ascii("drop").unwrap();
        writer.reset();
        assert!(writer.is_empty());
        assert_eq!(writer.flush(), b"");
    }

    #[test]
    fn test_default_register_is_i32() {
        assert_eq!(Writer::new().limit(), 2_147_483_647);
    }
}
