use crate::error::LogError;

/// Initial storage size of a freshly created buffer.
pub const BUFFER_DEFAULT_SIZE: usize = 8 * 1024 * 1024;
/// Linear growth step used once an append is at or above the threshold.
pub const BUFFER_INCREMENT_SIZE: usize = 1024 * 1024;
/// Appends below this length grow the storage by doubling, everything else
/// grows linearly so a single huge append cannot trigger runaway doubling.
pub const BUFFER_THRESHOLD_SIZE: usize = 8 * 1024 * 1024;

/// A growable byte arena with independent read and write cursors.
///
/// The buffer is the unit of exchange between producers and the delivery
/// worker: producers `push` formatted records at the write cursor, the
/// worker takes the whole readable span in one `peek`, and `swap` hands a
/// full buffer to the consumer while giving the producer an empty one back
/// without copying a byte.
///
/// Invariant: `read_pos <= write_pos <= storage.len()`.
///
/// # Examples
///
/// ```
/// use rolling_logger::Buffer;
///
/// let mut buf = Buffer::new();
/// buf.push(b"hello");
/// assert_eq!(buf.peek(), b"hello");
/// buf.pop(5).unwrap();
/// assert!(buf.is_empty());
/// ```
pub struct Buffer {
    storage: Vec<u8>,
    read_pos: usize,
    write_pos: usize,
}

impl Buffer {
    /// Creates an empty buffer with the default storage size.
    pub fn new() -> Self {
        Self::with_capacity(BUFFER_DEFAULT_SIZE)
    }

    /// Creates an empty buffer with the given storage size. Smaller sizes
    /// are useful in tests that want to exercise growth and backpressure.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            storage: vec![0; capacity],
            read_pos: 0,
            write_pos: 0,
        }
    }

    /// True when every written byte has been consumed.
    pub fn is_empty(&self) -> bool {
        self.read_pos == self.write_pos
    }

    /// Bytes written but not yet consumed.
    pub fn readable_size(&self) -> usize {
        self.write_pos - self.read_pos
    }

    /// Bytes that can be appended without growing the storage.
    pub fn writable_size(&self) -> usize {
        self.storage.len() - self.write_pos
    }

    /// Current storage size in bytes.
    pub fn capacity(&self) -> usize {
        self.storage.len()
    }

    /// Appends `data` at the write cursor, growing the storage if needed.
    /// Always succeeds; growth never shrinks the storage.
    pub fn push(&mut self, data: &[u8]) {
        self.ensure_space(data.len());
        self.storage[self.write_pos..self.write_pos + data.len()].copy_from_slice(data);
        self.write_pos += data.len();
    }

    /// Returns the readable span without moving either cursor.
    pub fn peek(&self) -> &[u8] {
        &self.storage[self.read_pos..self.write_pos]
    }

    /// Advances the read cursor by `len` bytes.
    ///
    /// Fails with [`LogError::OutOfRange`] if `len` exceeds the readable
    /// size; the cursors are untouched on failure.
    pub fn pop(&mut self, len: usize) -> Result<(), LogError> {
        if len > self.readable_size() {
            return Err(LogError::OutOfRange {
                requested: len,
                readable: self.readable_size(),
            });
        }
        self.read_pos += len;
        Ok(())
    }

    /// Rewinds both cursors to zero. The storage is kept, so capacity won
    /// through earlier growth is reused by future appends.
    pub fn reset(&mut self) {
        self.read_pos = 0;
        self.write_pos = 0;
    }

    /// Exchanges storage and both cursors with `other` in O(1).
    pub fn swap(&mut self, other: &mut Buffer) {
        std::mem::swap(&mut self.storage, &mut other.storage);
        std::mem::swap(&mut self.read_pos, &mut other.read_pos);
        std::mem::swap(&mut self.write_pos, &mut other.write_pos);
    }

    fn ensure_space(&mut self, len: usize) {
        while len > self.writable_size() {
            if self.storage.is_empty() {
                self.storage.resize(len, 0);
            } else if len < BUFFER_THRESHOLD_SIZE {
                self.storage.resize(self.storage.len() * 2, 0);
            } else {
                self.storage.resize(self.storage.len() + BUFFER_INCREMENT_SIZE, 0);
            }
        }
    }
}

impl Default for Buffer {
    fn default() -> Self {
        Self::new()
    }
}
