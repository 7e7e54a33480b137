use crate::buffer::{SharedBuffer, StreamBuffer};
use crate::error::{StreamError, StreamResult};
use crate::scratch::ScratchStream;
use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};
use tempfile::TempDir;

/// Opaque identity of an open scratch stream inside its registry.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct HandleId(u64);

/// Bookkeeping for one open scratch stream: the number its file is named
/// after and the buffer to be populated when the stream closes.
struct ScratchRecord {
    stream_number: u32,
    handle: HandleId,
    slot: SharedBuffer,
}

struct RegistryInner {
    dir: PathBuf,
    /// Records of open streams, kept sorted by ascending `stream_number`.
    records: Vec<ScratchRecord>,
    next_handle: u64,
    // Held so a temporary root outlives the registry.
    _tempdir: Option<TempDir>,
}

impl RegistryInner {
    /// Insert `record` at the first position whose stream number is not
    /// less than the new one, preserving the sorted order that makes
    /// smallest-free-number allocation a single scan.
    fn insert(&mut self, record: ScratchRecord) {
        let i = self
            .records
            .iter()
            .position(|r| r.stream_number >= record.stream_number)
            .unwrap_or(self.records.len());
        self.records.insert(i, record);
    }

    fn find_by_handle(&self, handle: HandleId) -> Option<usize> {
        self.records.iter().position(|r| r.handle == handle)
    }

    /// Get the smallest positive stream number not currently in use.
    /// Numbers freed by a close are reused by the next open.
    fn next_free_number(&self) -> u32 {
        let mut number = 1u32;
        for record in self.records.iter() {
            if record.stream_number > number {
                break;
            }
            if record.stream_number == number {
                number += 1;
            }
        }
        number
    }

    fn file_path(&self, stream_number: u32) -> PathBuf {
        self.dir.join(format!("o_stream_{}", stream_number))
    }
}

/// Registry of the scratch streams opened through one
/// [`ScratchStreamFactory`](struct.ScratchStreamFactory.html).
///
/// The registry owns the scratch directory where one file per open stream
/// lives. The directory is created when the first stream opens and removed
/// when the last one closes; its name is derived from the process
/// identifier so concurrent processes sharing a root never collide.
/// Clones are shallow copies over the same registry, and every operation
/// takes the registry lock as a single critical section so streams may be
/// opened and closed from multiple threads.
///
/// Distinct registries are fully independent as long as their roots
/// differ, which is what
/// [`new_in_temp()`](struct.ScratchRegistry.html#method.new_in_temp)
/// provides for tests.
pub struct ScratchRegistry {
    inner: Arc<Mutex<RegistryInner>>,
}

impl ScratchRegistry {
    /// `ScratchRegistry` constructor.
    /// The scratch directory is created under `root` on first open.
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self::with_tempdir(root.as_ref().to_path_buf(), None)
    }

    /// Build a registry rooted in a fresh temporary directory removed
    /// when the registry is dropped. Intended for tests and short lived
    /// tools that must not collide with other users of the default root.
    pub fn new_in_temp() -> StreamResult<Self> {
        let tempdir = TempDir::new().map_err(StreamError::Create)?;
        let root = tempdir.path().to_path_buf();
        Ok(Self::with_tempdir(root, Some(tempdir)))
    }

    fn with_tempdir(root: PathBuf, tempdir: Option<TempDir>) -> Self {
        let dir = root.join(format!("memstream_{}", std::process::id()));
        ScratchRegistry {
            inner: Arc::new(Mutex::new(RegistryInner {
                dir,
                records: Vec::new(),
                next_handle: 0u64,
                _tempdir: tempdir,
            })),
        }
    }

    /// Path of the per-process scratch directory.
    /// The directory exists if and only if at least one stream is open.
    pub fn scratch_dir(&self) -> PathBuf {
        self.lock().dir.clone()
    }

    /// Number of currently open scratch streams.
    pub fn open_streams(&self) -> usize {
        self.lock().records.len()
    }

    fn lock(&self) -> MutexGuard<'_, RegistryInner> {
        match self.inner.lock() {
            Ok(guard) => guard,
            Err(_) => panic!("Cannot lock poisoned stream registry."),
        }
    }

    /// Materialize a scratch file and register a record for it.
    /// Called with the buffer shared with the caller's
    /// [`BufferHandle`](../buffer/struct.BufferHandle.html).
    pub(crate) fn open(&self, slot: SharedBuffer) -> StreamResult<ScratchStream> {
        let mut inner = self.lock();

        if inner.records.is_empty() {
            std::fs::create_dir_all(&inner.dir)
                .map_err(StreamError::Create)?;
        }

        let stream_number = inner.next_free_number();
        let path = inner.file_path(stream_number);
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create_new(true)
            .open(&path)
            .map_err(StreamError::Create)?;

        let handle = HandleId(inner.next_handle);
        inner.next_handle += 1;
        inner.insert(ScratchRecord {
            stream_number,
            handle,
            slot,
        });
        log::trace!("opened scratch stream {} at {:?}", stream_number, path);

        Ok(ScratchStream::new(handle, file, path, self.clone()))
    }

    /// Materialize the buffer of the stream identified by `handle` from
    /// its scratch file, then release the file and the record.
    ///
    /// The record is removed only once the buffer has been read back, so
    /// a failed flush, seek or read leaves the stream registered and the
    /// registry consistent. The scratch directory is removed together
    /// with the last record.
    pub(crate) fn finalize(
        &self,
        handle: HandleId,
        file: &mut File,
        path: &Path,
    ) -> StreamResult<()> {
        let mut inner = self.lock();
        let i = inner
            .find_by_handle(handle)
            .ok_or(StreamError::UnknownHandle)?;

        file.flush().map_err(StreamError::Flush)?;
        let end = file
            .seek(SeekFrom::End(0))
            .map_err(StreamError::Seek)?;

        let mut buffer = StreamBuffer::new();
        buffer.grow(end as usize)?;
        file.seek(SeekFrom::Start(0)).map_err(StreamError::Seek)?;
        file.read_exact(buffer.bytes_mut())
            .map_err(StreamError::Read)?;

        let record = inner.records.remove(i);
        match record.slot.write() {
            Ok(mut slot) => *slot = buffer,
            Err(_) => panic!("Cannot borrow poisoned stream buffer."),
        }
        log::trace!(
            "closed scratch stream {} with {} bytes",
            record.stream_number,
            end
        );

        std::fs::remove_file(path).map_err(StreamError::Remove)?;
        if inner.records.is_empty() {
            std::fs::remove_dir(&inner.dir).map_err(StreamError::Remove)?;
        }
        Ok(())
    }

    /// Drop the record of a stream that goes out of scope without being
    /// closed. The scratch file is deleted without materializing the
    /// buffer. Errors are ignored: the file might already be cleaned up
    /// by the OS.
    pub(crate) fn discard(&self, handle: HandleId, path: &Path) {
        let mut inner = self.lock();
        if let Some(i) = inner.find_by_handle(handle) {
            inner.records.remove(i);
            let _ = std::fs::remove_file(path);
            if inner.records.is_empty() {
                let _ = std::fs::remove_dir(&inner.dir);
            }
        }
    }
}

impl Clone for ScratchRegistry {
    /// Create a shallow copy pointing to the same registry.
    fn clone(&self) -> Self {
        ScratchRegistry {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl Default for ScratchRegistry {
    /// Build a registry rooted in the system temporary directory.
    fn default() -> Self {
        Self::new(std::env::temp_dir())
    }
}
