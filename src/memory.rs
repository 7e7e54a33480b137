use crate::buffer::{BufferHandle, SharedBuffer};
use crate::error::{StreamError, StreamResult};
use crate::{GrowableStream, StreamFactory};
use std::io::{Read, Result, Seek, SeekFrom, Write};

/// A [`GrowableStream`](trait.GrowableStream.html) backed directly by an
/// in-memory [`StreamBuffer`](buffer/struct.StreamBuffer.html).
///
/// Writes grow the buffer to cover the write extent, zero-filling any gap
/// left by a seek past the end, so the caller-side
/// [`BufferHandle`](buffer/struct.BufferHandle.html) always reflects the
/// bytes written so far. Reads never grow the buffer: reading at or past
/// the current length returns 0 bytes, as with [`std::io::Cursor`].
/// [`close()`](trait.GrowableStream.html#tymethod.close) is trivial since
/// the buffer is already current.
pub struct MemoryStream {
    buf: SharedBuffer,
    pos: u64,
}

impl MemoryStream {
    /// Open a new stream over an empty buffer, returning the stream and
    /// the caller-side view of its buffer.
    pub fn open() -> (Self, BufferHandle) {
        let handle = BufferHandle::new();
        let stream = MemoryStream {
            buf: handle.share(),
            pos: 0u64,
        };
        (stream, handle)
    }
}

impl Read for MemoryStream {
    fn read(&mut self, buf: &mut [u8]) -> Result<usize> {
        let inner = match self.buf.read() {
            Ok(guard) => guard,
            Err(_) => panic!("Cannot borrow poisoned stream buffer."),
        };
        let pos = self.pos as usize;
        let inner_len = inner.len();

        let len = if pos >= inner_len {
            return Ok(0);
        } else if (inner_len - pos) < buf.len() {
            inner_len - pos
        } else {
            buf.len()
        };

        buf[..len].copy_from_slice(&inner.as_slice()[pos..(pos + len)]);
        drop(inner);
        self.pos += len as u64;
        Ok(len)
    }
}

impl Write for MemoryStream {
    fn write(&mut self, buf: &[u8]) -> Result<usize> {
        let mut inner = match self.buf.write() {
            Ok(guard) => guard,
            Err(_) => panic!("Cannot borrow poisoned stream buffer."),
        };
        let pos = self.pos as usize;
        let end = pos + buf.len();

        if end > inner.len() {
            inner.grow(end)?;
        }
        inner.bytes_mut()[pos..end].copy_from_slice(buf);
        drop(inner);
        self.pos = end as u64;
        Ok(buf.len())
    }

    fn flush(&mut self) -> Result<()> {
        Ok(())
    }
}

impl Seek for MemoryStream {
    /// Move the stream cursor. The cursor may be moved past the current
    /// buffer length: a subsequent write grows the buffer to meet it.
    /// Seeking to a negative offset is rejected with an error and leaves
    /// the cursor unchanged.
    fn seek(&mut self, pos: SeekFrom) -> Result<u64> {
        let (base, offset) = match pos {
            SeekFrom::Start(p) => {
                self.pos = p;
                return Ok(p);
            }
            SeekFrom::Current(d) => (self.pos, d),
            SeekFrom::End(d) => {
                let len = match self.buf.read() {
                    Ok(guard) => guard.len(),
                    Err(_) => {
                        panic!("Cannot borrow poisoned stream buffer.")
                    }
                };
                (len as u64, d)
            }
        };

        match base.checked_add_signed(offset) {
            Some(p) => {
                self.pos = p;
                Ok(p)
            }
            None => Err(StreamError::InvalidSeek.into()),
        }
    }
}

impl GrowableStream for MemoryStream {
    /// Release the stream. The buffer was kept current on every write and
    /// stays owned by the [`BufferHandle`](buffer/struct.BufferHandle.html).
    fn close(&mut self) -> StreamResult<()> {
        Ok(())
    }
}

/// A [`StreamFactory`](trait.StreamFactory.html) yielding
/// [`MemoryStream`](struct.MemoryStream.html) streams.
#[derive(Clone, Default)]
pub struct MemoryStreamFactory {}

impl StreamFactory for MemoryStreamFactory {
    type Stream = MemoryStream;
    fn open(&mut self) -> StreamResult<(Self::Stream, BufferHandle)> {
        Ok(MemoryStream::open())
    }
}
