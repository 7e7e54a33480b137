mod registry;
pub use registry::ScratchRegistry;
use registry::HandleId;

use crate::buffer::BufferHandle;
use crate::error::StreamResult;
use crate::{GrowableStream, StreamFactory};
use std::fs::File;
use std::io::{Read, Result, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

/// A [`GrowableStream`](trait.GrowableStream.html) backed by a scratch
/// file instead of a live memory buffer.
///
/// This backend is for setups where streams must be materialized through
/// the filesystem: read, write and seek go straight to a uniquely named
/// file in a per-process scratch directory, and the in-memory buffer is
/// produced once, at [`close()`](trait.GrowableStream.html#tymethod.close),
/// when the final size is known. Until then the
/// [`BufferHandle`](buffer/struct.BufferHandle.html) observes an empty
/// buffer.
///
/// The scratch file never outlives the stream: dropping an unclosed
/// stream deletes it without populating the handle.
pub struct ScratchStream {
    handle: HandleId,
    file: File,
    path: PathBuf,
    registry: ScratchRegistry,
    closed: bool,
}

impl ScratchStream {
    pub(crate) fn new(
        handle: HandleId,
        file: File,
        path: PathBuf,
        registry: ScratchRegistry,
    ) -> Self {
        ScratchStream {
            handle,
            file,
            path,
            registry,
            closed: false,
        }
    }

    /// Path of the scratch file backing this stream.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Read for ScratchStream {
    fn read(&mut self, buf: &mut [u8]) -> Result<usize> {
        self.file.read(buf)
    }
}

impl Write for ScratchStream {
    fn write(&mut self, buf: &[u8]) -> Result<usize> {
        self.file.write(buf)
    }

    fn flush(&mut self) -> Result<()> {
        self.file.flush()
    }
}

impl Seek for ScratchStream {
    fn seek(&mut self, pos: SeekFrom) -> Result<u64> {
        self.file.seek(pos)
    }
}

impl GrowableStream for ScratchStream {
    /// Read the whole scratch file back into a freshly grown buffer,
    /// populate the [`BufferHandle`](buffer/struct.BufferHandle.html),
    /// then delete the file and unregister the stream. Closing a stream
    /// twice returns an
    /// [`UnknownHandle`](enum.StreamError.html#variant.UnknownHandle)
    /// error.
    fn close(&mut self) -> StreamResult<()> {
        self.registry
            .finalize(self.handle, &mut self.file, &self.path)?;
        self.closed = true;
        Ok(())
    }
}

impl Drop for ScratchStream {
    /// Delete the scratch file of a stream dropped without a close.
    /// The buffer handle is left empty in this path.
    fn drop(&mut self) {
        if !self.closed {
            self.registry.discard(self.handle, &self.path);
        }
    }
}

/// A [`StreamFactory`](trait.StreamFactory.html) yielding
/// [`ScratchStream`](struct.ScratchStream.html) streams registered in a
/// shared [`ScratchRegistry`](struct.ScratchRegistry.html).
#[derive(Clone)]
pub struct ScratchStreamFactory {
    registry: ScratchRegistry,
}

impl ScratchStreamFactory {
    /// Build a factory opening its streams through `registry`.
    pub fn new(registry: ScratchRegistry) -> Self {
        ScratchStreamFactory { registry }
    }

    /// Registry shared by the streams of this factory.
    pub fn registry(&self) -> &ScratchRegistry {
        &self.registry
    }
}

impl Default for ScratchStreamFactory {
    /// Build a factory over a registry rooted in the system temporary
    /// directory.
    fn default() -> Self {
        Self::new(ScratchRegistry::default())
    }
}

impl StreamFactory for ScratchStreamFactory {
    type Stream = ScratchStream;
    fn open(&mut self) -> StreamResult<(Self::Stream, BufferHandle)> {
        let handle = BufferHandle::new();
        let stream = self.registry.open(handle.share())?;
        Ok((stream, handle))
    }
}
