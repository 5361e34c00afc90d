use proptest::prelude::*;
use spritearc::{
  archive::{read_frame, read_frameset, write_frame, write_frameset, ARCHIVE_SIGNATURE},
  ArchiveVersion, FrameSet, UUID_TAG,
};

#[test]
fn test_read_frameset_no_panics() {
  for (path, v) in super::test_files() {
    println!("{}", path.display());
    let _ = read_frameset(&v);
  }
  for _ in 0..50 {
    let mut v = ARCHIVE_SIGNATURE.to_vec();
    v.extend(super::rand_bytes(512));
    assert!(read_frameset(&v).is_err());
    let _ = read_frame(&super::rand_bytes(64));
  }
}

proptest! {
  #[test]
  fn prop_solid_round_trip_keeps_tags(
    frames in proptest::collection::vec(super::arb_frame(), 1..8),
    tags in proptest::collection::btree_map("[a-z]{1,12}", "[ -~]{1,40}", 0..10),
  ) {
    let mut set = FrameSet::from_frames(frames);
    for (k, v) in &tags {
      set.set_tag(k.as_str(), v.as_str());
    }
    let bytes = write_frameset(&set, ArchiveVersion::Solid).unwrap();
    let back = read_frameset(&bytes).unwrap();
    prop_assert_eq!(back.frames(), set.frames());
    for (k, v) in &tags {
      prop_assert_eq!(back.tag(k), v.as_str());
    }
    prop_assert_eq!(back.tag(UUID_TAG), set.tag(UUID_TAG));
  }

  #[test]
  fn prop_unpacked_round_trip(frames in proptest::collection::vec(super::arb_frame(), 1..8)) {
    let set = FrameSet::from_frames(frames);
    let bytes = write_frameset(&set, ArchiveVersion::Unpacked).unwrap();
    let back = read_frameset(&bytes).unwrap();
    prop_assert_eq!(back.frames(), set.frames());
  }

  #[test]
  fn prop_frame_record_round_trip(frame in super::arb_frame()) {
    let bytes = write_frame(&frame).unwrap();
    let (back, rest) = read_frame(&bytes).unwrap();
    prop_assert_eq!(back, frame);
    prop_assert!(rest.is_empty());
  }
}
