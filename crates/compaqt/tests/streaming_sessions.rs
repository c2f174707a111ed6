//! End-to-end streaming behavior and interop with the one-shot codec.

use compaqt::{
    decode_file, encode_with, validate_with, ContainerKind, DecoderOptions, EncodeOptions,
    EncoderOptions, StreamDecoder, StreamEncoder, ValidateInput, ValidateOptions, Value,
};
use tempfile::TempDir;

fn ints(values: std::ops::Range<i64>) -> Value {
    Value::List(values.map(Value::Int).collect())
}

#[test]
fn streamed_file_has_the_documented_prefix() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("prefix.cpqt");

    let mut encoder =
        StreamEncoder::open(&path, ContainerKind::List, &EncoderOptions::default()).unwrap();
    encoder.write(&ints(1..2)).unwrap();
    encoder.write(&ints(2..3)).unwrap();
    encoder.finalize();

    let contents = std::fs::read(&path).unwrap();
    // Mode-3/8 masked ARRAY tag, 8-byte little-endian count, two frames.
    assert_eq!(contents[0], 0xF8);
    assert_eq!(u64::from_le_bytes(contents[1..9].try_into().unwrap()), 2);
    assert_eq!(&contents[9..], &[0x0C, 0x01, 0x0C, 0x02]);

    let decoder = StreamDecoder::open(&path, &DecoderOptions::default()).unwrap();
    assert_eq!(decoder.items_remaining(), 2);
}

#[test]
fn file_is_consistent_between_every_write() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("consistent.cpqt");

    let mut encoder =
        StreamEncoder::open(&path, ContainerKind::List, &EncoderOptions::default()).unwrap();

    for round in 0..5 {
        encoder.write(&ints(round * 10..round * 10 + 10)).unwrap();

        // At every boundary the file is a valid regular encoding whose
        // count matches the items ingested so far.
        assert!(matches!(
            validate_with(
                ValidateInput::File(&path),
                &ValidateOptions::default()
            ),
            Ok(true)
        ));
        let decoded = decode_file(&path).unwrap();
        let items = decoded.as_list().unwrap();
        assert_eq!(items.len(), ((round + 1) * 10) as usize);
    }
}

#[test]
fn regular_decoder_reads_a_finished_stream() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("interop.cpqt");

    let mut encoder =
        StreamEncoder::open(&path, ContainerKind::List, &EncoderOptions::default()).unwrap();
    encoder.write(&ints(0..500)).unwrap();
    encoder.finalize();

    assert_eq!(decode_file(&path).unwrap(), ints(0..500));
}

#[test]
fn stream_compatible_encode_can_be_resumed() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("resumable.cpqt");

    // A one-shot encode with the wide outer header...
    let opts = EncodeOptions {
        file_name: Some(path.clone()),
        stream_compatible: true,
        ..EncodeOptions::default()
    };
    encode_with(&ints(0..3), &opts).unwrap();

    // ...is a valid starting point for a streaming session.
    let resume = EncoderOptions {
        resume_stream: true,
        ..EncoderOptions::default()
    };
    let mut encoder = StreamEncoder::open(&path, ContainerKind::List, &resume).unwrap();
    encoder.write(&ints(3..6)).unwrap();
    encoder.finalize();

    assert_eq!(decode_file(&path).unwrap(), ints(0..6));
}

#[test]
fn stream_compatible_file_opens_in_the_stream_decoder() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("openable.cpqt");

    let opts = EncodeOptions {
        file_name: Some(path.clone()),
        stream_compatible: true,
        ..EncodeOptions::default()
    };
    encode_with(&ints(0..40), &opts).unwrap();

    let mut decoder = StreamDecoder::open(&path, &DecoderOptions::default()).unwrap();
    assert_eq!(decoder.items_remaining(), 40);
    assert_eq!(decoder.read_with(Some(10), false, None).unwrap(), ints(0..10));
    assert_eq!(decoder.read().unwrap(), ints(10..40));
}

#[test]
fn offsets_track_the_file_positions() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("offsets.cpqt");

    let mut encoder =
        StreamEncoder::open(&path, ContainerKind::List, &EncoderOptions::default()).unwrap();
    assert_eq!(encoder.start_offset(), 0);
    assert_eq!(encoder.curr_offset(), 9);
    encoder.write(&ints(0..1)).unwrap();
    assert_eq!(encoder.curr_offset(), 11);
    encoder.finalize();

    let mut decoder = StreamDecoder::open(&path, &DecoderOptions::default()).unwrap();
    assert_eq!(decoder.curr_offset(), 9);
    decoder.read().unwrap();
    assert_eq!(decoder.curr_offset(), 11);
}

#[test]
fn nested_containers_keep_minimal_headers() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("nested.cpqt");

    let mut encoder =
        StreamEncoder::open(&path, ContainerKind::List, &EncoderOptions::default()).unwrap();
    encoder
        .write(&Value::List(vec![Value::List(vec![Value::Int(1)])]))
        .unwrap();
    encoder.finalize();

    let contents = std::fs::read(&path).unwrap();
    // One streamed item: a nested one-element list with a Mode 1 head.
    assert_eq!(&contents[9..], &[0x10, 0x0C, 0x01]);
}

#[test]
fn chunked_writes_and_reads_round_trip_large_data() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("large.cpqt");

    let enc_opts = EncoderOptions {
        chunk_size: 256,
        ..EncoderOptions::default()
    };
    let mut encoder = StreamEncoder::open(&path, ContainerKind::List, &enc_opts).unwrap();
    let chunk: Vec<Value> = (0..100)
        .map(|i| Value::from(format!("payload number {i}")))
        .collect();
    for _ in 0..20 {
        encoder.write(&Value::List(chunk.clone())).unwrap();
    }
    encoder.finalize();

    let dec_opts = DecoderOptions {
        chunk_size: 128,
        ..DecoderOptions::default()
    };
    let mut decoder = StreamDecoder::open(&path, &dec_opts).unwrap();
    assert_eq!(decoder.items_remaining(), 2000);

    let mut total = 0usize;
    while decoder.items_remaining() > 0 {
        let slice = decoder.read_with(Some(300), true, None).unwrap();
        total += slice.as_list().unwrap().len();
    }
    assert_eq!(total, 2000);
}
