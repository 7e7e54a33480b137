mod stream;
use memstream::{
    GrowableStream, ScratchRegistry, ScratchStreamFactory, StreamError,
    StreamFactory,
};
use std::io::Write;

fn file_name(stream: &memstream::ScratchStream) -> String {
    stream.path().file_name().unwrap().to_string_lossy().into_owned()
}

#[test]
fn scratch_stream_test() {
    let registry = ScratchRegistry::new_in_temp().unwrap();
    stream::test_stream(&mut ScratchStreamFactory::new(registry));
}

#[test]
fn scratch_handle_empty_until_close_test() {
    let registry = ScratchRegistry::new_in_temp().unwrap();
    let mut factory = ScratchStreamFactory::new(registry);
    let (mut stream, handle) = factory.open().unwrap();

    stream.write_all(b"deferred").unwrap();
    assert_eq!(handle.len(), 0);

    stream.close().unwrap();
    assert_eq!(handle.to_vec(), b"deferred");
}

#[test]
fn scratch_directory_lifecycle_test() {
    let registry = ScratchRegistry::new_in_temp().unwrap();
    let dir = registry.scratch_dir();
    let mut factory = ScratchStreamFactory::new(registry.clone());

    assert!(!dir.exists());
    let (mut first, _h1) = factory.open().unwrap();
    assert!(dir.exists());
    let (mut second, _h2) = factory.open().unwrap();
    assert_eq!(registry.open_streams(), 2);

    first.close().unwrap();
    assert!(dir.exists());
    second.close().unwrap();
    assert_eq!(registry.open_streams(), 0);
    assert!(!dir.exists());
}

#[test]
fn scratch_number_reuse_test() {
    let registry = ScratchRegistry::new_in_temp().unwrap();
    let mut factory = ScratchStreamFactory::new(registry);

    let (mut s1, _h1) = factory.open().unwrap();
    let (mut s2, _h2) = factory.open().unwrap();
    let (mut s3, _h3) = factory.open().unwrap();
    assert_eq!(file_name(&s1), "o_stream_1");
    assert_eq!(file_name(&s2), "o_stream_2");
    assert_eq!(file_name(&s3), "o_stream_3");

    // Closing out of order frees the smallest number for the next open.
    s2.close().unwrap();
    let (mut s4, _h4) = factory.open().unwrap();
    assert_eq!(file_name(&s4), "o_stream_2");

    s1.close().unwrap();
    s4.close().unwrap();
    let (mut s5, _h5) = factory.open().unwrap();
    assert_eq!(file_name(&s5), "o_stream_1");

    s3.close().unwrap();
    s5.close().unwrap();
}

#[test]
fn scratch_double_close_test() {
    let registry = ScratchRegistry::new_in_temp().unwrap();
    let mut factory = ScratchStreamFactory::new(registry);
    let (mut stream, _handle) = factory.open().unwrap();

    stream.write_all(b"once").unwrap();
    stream.close().unwrap();
    match stream.close() {
        Err(StreamError::UnknownHandle) => (),
        _ => panic!("Closing a stream twice must report an unknown handle."),
    }
}

#[test]
fn scratch_drop_discards_test() {
    let registry = ScratchRegistry::new_in_temp().unwrap();
    let dir = registry.scratch_dir();
    let mut factory = ScratchStreamFactory::new(registry.clone());

    let handle = {
        let (mut stream, handle) = factory.open().unwrap();
        stream.write_all(b"lost").unwrap();
        handle
    };

    // The stream was dropped without a close: its scratch file is gone
    // and the handle was never populated.
    assert_eq!(registry.open_streams(), 0);
    assert!(!dir.exists());
    assert_eq!(handle.len(), 0);
}

#[test]
fn scratch_independent_registries_test() {
    let mut first =
        ScratchStreamFactory::new(ScratchRegistry::new_in_temp().unwrap());
    let mut second =
        ScratchStreamFactory::new(ScratchRegistry::new_in_temp().unwrap());

    let (mut s1, h1) = first.open().unwrap();
    let (mut s2, h2) = second.open().unwrap();
    assert_eq!(file_name(&s1), "o_stream_1");
    assert_eq!(file_name(&s2), "o_stream_1");
    assert_ne!(s1.path(), s2.path());

    s1.write_all(b"first").unwrap();
    s2.write_all(b"second").unwrap();
    s1.close().unwrap();
    s2.close().unwrap();
    assert_eq!(h1.to_vec(), b"first");
    assert_eq!(h2.to_vec(), b"second");
}
