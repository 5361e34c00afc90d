use proptest::prelude::*;
use spritearc::{png::*, ErrorKind, FrameSet};

#[test]
fn test_RawPngChunkIter_no_panics() {
  // iter ALL files in the test folder, even non-png files shouldn't panic it.
  for (path, v) in super::test_files() {
    println!("{}", path.display());
    for _ in RawPngChunkIter::new(&v) {
      //
    }
  }
  // even totally random data should never panic the iterator!
  for _ in 0..10 {
    let v = super::rand_bytes(1024);
    for _ in RawPngChunkIter::new(&v) {
      //
    }
  }
}

#[test]
fn test_decode_png_no_panics() {
  // random bytes behind a real signature get past the first check
  for _ in 0..50 {
    let mut v = PNG_SIGNATURE.to_vec();
    v.extend(super::rand_bytes(256));
    assert!(decode_png(&v).is_err());
  }
}

#[test]
fn test_random_chunk_data_is_corrupt_or_unsupported() {
  // well formed chunks with matching CRCs but junk contents
  for _ in 0..50 {
    let mut v = PNG_SIGNATURE.to_vec();
    write_chunk(&mut v, PngChunkType::IHDR, &super::rand_bytes(13)).unwrap();
    write_chunk(&mut v, PngChunkType::IDAT, &super::rand_bytes(64)).unwrap();
    write_chunk(&mut v, PngChunkType::IEND, &[]).unwrap();
    let err = decode_png(&v).unwrap_err();
    assert_ne!(err.kind(), ErrorKind::FormatMismatch, "{err}");
  }
}

proptest! {
  #[test]
  fn prop_single_frame_round_trips(frame in super::arb_frame(), filter in 0_u8..5) {
    let filter = PngFilter::try_from(filter).unwrap();
    let set = FrameSet::from_frames(vec![frame]);
    let png = PngEncoder::new().with_filter(filter).encode(&set).unwrap();
    let back = decode_png(&png).unwrap();
    prop_assert_eq!(back.frames(), set.frames());
  }

  #[test]
  fn prop_strip_round_trips(frames in proptest::collection::vec(super::arb_frame(), 1..6)) {
    let set = FrameSet::from_frames(frames);
    let png = PngEncoder::new().encode(&set).unwrap();
    let back = decode_png(&png).unwrap();
    prop_assert_eq!(back.frames(), set.frames());
  }
}
