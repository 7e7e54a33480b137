use std::io::{Read, Seek, Write};

/// Stream interface over a dynamically growable byte buffer.
///
/// `GrowableStream` is the contract shared by every backend of this
/// library: a caller opens a stream through a
/// [`StreamFactory`](trait.StreamFactory.html) and receives, along with
/// the stream, a [`BufferHandle`](buffer/struct.BufferHandle.html) to the
/// buffer the stream materializes. Bytes are then moved with the ordinary
/// [`std::io::Read`], [`std::io::Write`] and [`std::io::Seek`] traits;
/// backing storage grows automatically to cover writes and seeks past the
/// current length, with zero-filled gaps.
///
/// The stream owns its backing resources for its whole lifetime. Once a
/// stream is closed, the handle owns the final buffer and the backend has
/// released everything else; dropping a stream without closing it
/// releases the backing resources without guaranteeing the handle
/// content.
pub trait GrowableStream: Read + Write + Seek {
    /// Finalize the buffer observed by the stream's
    /// [`BufferHandle`](buffer/struct.BufferHandle.html) and release the
    /// backend's per-stream resources. The stream must not be used for
    /// I/O afterwards.
    fn close(&mut self) -> StreamResult<()>;
}

impl GrowableStream for Box<dyn GrowableStream> {
    fn close(&mut self) -> StreamResult<()> {
        (**self).close()
    }
}

/// Facility to open growable streams on one backend.
pub trait StreamFactory {
    type Stream: GrowableStream;

    /// Open a new empty stream, returning it together with the handle on
    /// the buffer it will materialize.
    fn open(&mut self) -> StreamResult<(Self::Stream, BufferHandle)>;
}

/// Object safe counterpart of [`StreamFactory`](trait.StreamFactory.html),
/// for backends picked at run time, e.g from a
/// [`StreamConfig`](config/struct.StreamConfig.html).
pub trait DynStreamFactory {
    /// Same contract as
    /// [`StreamFactory::open()`](trait.StreamFactory.html#tymethod.open)
    /// with the stream boxed behind the
    /// [`GrowableStream`](trait.GrowableStream.html) trait.
    fn open_dyn(
        &mut self,
    ) -> StreamResult<(Box<dyn GrowableStream>, BufferHandle)>;
}

impl<F> DynStreamFactory for F
where
    F: StreamFactory,
    F::Stream: 'static,
{
    fn open_dyn(
        &mut self,
    ) -> StreamResult<(Box<dyn GrowableStream>, BufferHandle)> {
        let (stream, handle) = self.open()?;
        Ok((Box::new(stream), handle))
    }
}

/// Growable byte buffer of a stream and the caller-side handle on it.
pub mod buffer;
pub use buffer::{BufferGuard, BufferHandle, StreamBuffer};

mod error;
pub use error::{StreamError, StreamResult};

/// [`GrowableStream`](trait.GrowableStream.html) backed by a live
/// in-memory buffer.
mod memory;
pub use memory::{MemoryStream, MemoryStreamFactory};

/// [`GrowableStream`](trait.GrowableStream.html) backed by per-process
/// scratch files, materializing the buffer at close time.
mod scratch;
pub use scratch::{ScratchRegistry, ScratchStream, ScratchStreamFactory};

/// Instantiating stream backends from a configuration.
#[cfg(feature = "config")]
pub mod config;
