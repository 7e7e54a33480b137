use crate::error::{StreamError, StreamResult};
use std::ops::Deref;
use std::sync::{Arc, RwLock, RwLockReadGuard};

//----------------------------------------------------------------------------//
// Growable buffer.
//----------------------------------------------------------------------------//

/// A growable byte buffer holding the content of a stream.
///
/// The buffer keeps one extra zero byte past its logical length so that
/// its content is always NUL-terminated for text oriented consumers.
/// The terminator is not counted in [`len()`](struct.StreamBuffer.html#method.len).
pub struct StreamBuffer {
    data: Vec<u8>,
    len: usize,
}

impl StreamBuffer {
    /// `StreamBuffer` constructor.
    /// Creates an empty buffer of logical length 0, terminator included.
    pub fn new() -> Self {
        StreamBuffer {
            data: vec![0u8],
            len: 0,
        }
    }

    /// Get the logical length of the buffer in bytes,
    /// not counting the terminator byte.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Get the buffer content as a byte slice of
    /// [`len()`](struct.StreamBuffer.html#method.len) bytes.
    pub fn as_slice(&self) -> &[u8] {
        &self.data[..self.len]
    }

    /// Get the buffer content followed by its terminator byte.
    pub fn as_terminated_slice(&self) -> &[u8] {
        &self.data
    }

    /// Ensure the buffer can represent `new_size` logical bytes plus the
    /// terminator byte.
    ///
    /// If `new_size` does not exceed the current length, this is a no-op:
    /// the buffer never shrinks. Otherwise the allocation is extended to
    /// `new_size + 1` bytes and every newly exposed byte is filled with 0.
    /// On allocation failure, an
    /// [`Allocation`](../enum.StreamError.html#variant.Allocation) error is
    /// returned and both the buffer and its length are left unchanged.
    pub fn grow(&mut self, new_size: usize) -> StreamResult<()> {
        if new_size <= self.len {
            return Ok(());
        }

        let total = new_size + 1;
        self.data
            .try_reserve(total - self.data.len())
            .map_err(StreamError::Allocation)?;
        self.data.resize(total, 0u8);
        log::trace!("buffer grown from {} to {} bytes", self.len, new_size);
        self.len = new_size;
        Ok(())
    }

    /// Get mutable access to the logical bytes of the buffer.
    /// The terminator byte is not exposed.
    pub(crate) fn bytes_mut(&mut self) -> &mut [u8] {
        let len = self.len;
        &mut self.data[..len]
    }
}

impl Default for StreamBuffer {
    fn default() -> Self {
        Self::new()
    }
}

//----------------------------------------------------------------------------//
// Caller-side view of the buffer.
//----------------------------------------------------------------------------//

pub(crate) type SharedBuffer = Arc<RwLock<StreamBuffer>>;

/// Caller-owned view of the buffer behind a growable stream.
///
/// A `BufferHandle` is handed out when a stream is opened and stands for
/// the buffer pointer and length output slots of the stream: the stream
/// writes the buffer content through its own reference while the caller
/// observes it through this one. With the memory backend the handle tracks
/// the buffer live as the stream is written; with the filesystem backend
/// the handle stays empty until
/// [`close()`](../trait.GrowableStream.html#tymethod.close) materializes
/// the buffer. The handle remains valid after the stream is closed and
/// owns the buffer from that point on.
pub struct BufferHandle {
    buf: SharedBuffer,
}

impl BufferHandle {
    pub(crate) fn new() -> Self {
        BufferHandle {
            buf: Arc::new(RwLock::new(StreamBuffer::new())),
        }
    }

    /// Create a reference to the same buffer to be moved into a stream
    /// or a registry record.
    pub(crate) fn share(&self) -> SharedBuffer {
        Arc::clone(&self.buf)
    }

    /// Gain read-only access to the buffer.
    ///
    /// The returned RAII guard dereferences into the
    /// [`StreamBuffer`](struct.StreamBuffer.html). The buffer is locked
    /// for the guard lifetime: holding the guard while writing to the
    /// stream that owns the buffer will block or panic.
    pub fn read(&self) -> BufferGuard<'_> {
        match self.buf.read() {
            Ok(guard) => BufferGuard { guard },
            Err(_) => panic!("Cannot borrow poisoned stream buffer."),
        }
    }

    /// Get the current logical length of the buffer.
    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    /// Copy the current buffer content into an owned vector.
    pub fn to_vec(&self) -> Vec<u8> {
        self.read().as_slice().to_vec()
    }
}

/// RAII read guard over the buffer of an open or closed stream.
/// See [`BufferHandle::read()`](struct.BufferHandle.html#method.read).
pub struct BufferGuard<'a> {
    guard: RwLockReadGuard<'a, StreamBuffer>,
}

impl<'a> Deref for BufferGuard<'a> {
    type Target = StreamBuffer;
    fn deref(&self) -> &Self::Target {
        &self.guard
    }
}

//----------------------------------------------------------------------------//
// Tests
//----------------------------------------------------------------------------//
