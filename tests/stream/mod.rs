use memstream::{GrowableStream, StreamFactory};
use rand::random;
use std::io::{Read, Seek, SeekFrom, Write};

/// Closing after a plain sequential write yields exactly the written
/// bytes, with the written length.
fn test_sequential_write<F: StreamFactory>(factory: &mut F) {
    let bytes: Vec<u8> = (0..64).map(|_| random::<u8>()).collect();

    let (mut stream, handle) = factory.open().unwrap();
    stream.write_all(bytes.as_slice()).unwrap();
    stream.close().unwrap();

    assert_eq!(handle.len(), bytes.len());
    assert_eq!(handle.to_vec(), bytes);
}

/// Writes at increasing offsets separated by gaps read back as the
/// written chunks interleaved with zero-filled gaps, and the buffer
/// length never decreases along the way.
fn test_sparse_writes<F: StreamFactory>(factory: &mut F) {
    let (mut stream, handle) = factory.open().unwrap();
    let mut expected: Vec<u8> = Vec::new();
    let mut offset = 0usize;
    let mut max_len = 0usize;

    for _ in 0..16 {
        let gap = random::<usize>() % 8;
        let chunk: Vec<u8> =
            (0..1 + random::<usize>() % 8).map(|_| random::<u8>()).collect();

        offset += gap;
        expected.resize(offset, 0u8);
        expected.extend_from_slice(chunk.as_slice());

        stream.seek(SeekFrom::Start(offset as u64)).unwrap();
        stream.write_all(chunk.as_slice()).unwrap();
        offset += chunk.len();

        assert!(handle.len() >= max_len);
        max_len = handle.len();
    }

    // Read everything back through the stream itself.
    stream.seek(SeekFrom::Start(0)).unwrap();
    let mut out = Vec::new();
    stream.read_to_end(&mut out).unwrap();
    assert_eq!(out, expected);

    stream.close().unwrap();
    assert_eq!(handle.to_vec(), expected);
}

/// Write "hello", seek to offset 10, write "X": the final buffer is 11
/// bytes with a zero-filled gap in the middle.
fn test_seek_gap<F: StreamFactory>(factory: &mut F) {
    let (mut stream, handle) = factory.open().unwrap();
    stream.write_all(b"hello").unwrap();
    stream.seek(SeekFrom::Start(10)).unwrap();
    stream.write_all(b"X").unwrap();
    stream.close().unwrap();

    assert_eq!(handle.len(), 11);
    assert_eq!(handle.to_vec(), b"hello\0\0\0\0\0X");
}

/// Seeking back and overwriting in place does not change the length.
fn test_overwrite<F: StreamFactory>(factory: &mut F) {
    let (mut stream, handle) = factory.open().unwrap();
    stream.write_all(&[1u8, 2, 3, 4, 5]).unwrap();
    stream.seek(SeekFrom::Start(2)).unwrap();
    stream.write_all(&[9u8, 9]).unwrap();
    stream.close().unwrap();

    assert_eq!(handle.len(), 5);
    assert_eq!(handle.to_vec(), vec![1u8, 2, 9, 9, 5]);
}

/// Reading at or past the end of the written extent copies 0 bytes and
/// does not extend the stream.
fn test_read_past_end<F: StreamFactory>(factory: &mut F) {
    let (mut stream, handle) = factory.open().unwrap();
    stream.write_all(&[1u8, 2, 3]).unwrap();

    let mut buf = [0u8; 16];
    assert_eq!(stream.read(&mut buf).unwrap(), 0);
    stream.seek(SeekFrom::Start(100)).unwrap();
    assert_eq!(stream.read(&mut buf).unwrap(), 0);

    stream.close().unwrap();
    assert_eq!(handle.len(), 3);
    assert_eq!(handle.to_vec(), vec![1u8, 2, 3]);
}

/// Behavior shared by every stream backend.
pub fn test_stream<F: StreamFactory>(factory: &mut F) {
    test_sequential_write(factory);
    test_sparse_writes(factory);
    test_seek_gap(factory);
    test_overwrite(factory);
    test_read_past_end(factory);
}
