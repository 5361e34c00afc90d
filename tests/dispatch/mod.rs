use spritearc::*;

#[test]
fn test_decode_no_panics() {
  for (path, v) in super::test_files() {
    let sniffed = ImageFormat::sniff(&v);
    match decode_with_format(&v) {
      Ok((_, format)) => assert_eq!(Some(format), sniffed, "{}", path.display()),
      Err(e) => println!("{}: {e}", path.display()),
    }
  }
  for _ in 0..50 {
    let _ = decode(&super::rand_bytes(700));
  }
}

#[test]
fn test_junk_is_format_mismatch() {
  for junk in [&b""[..], b"x", b"hello there, this is text", b"\x89PNG"] {
    assert_eq!(ImageFormat::sniff(junk), None);
    assert_eq!(decode(junk).unwrap_err(), ArchiveError::FormatMismatch);
  }
}

#[test]
fn test_every_export_format_decodes() {
  let mut set = FrameSet::new();
  set.set_name("hero");
  set.add(Frame::from_pixels(2, 2, vec![1, 2, 3, 4]).unwrap());
  set.add(Frame::from_pixels(3, 1, vec![0xFF00_0000; 3]).unwrap());
  let mut formats = vec![
    ExportFormat::Archive(ArchiveVersion::Solid),
    ExportFormat::Archive(ArchiveVersion::Unpacked),
  ];
  #[cfg(feature = "png")]
  formats.push(ExportFormat::Png);
  for format in formats {
    let bytes = encode(&set, format).unwrap();
    let back = decode(&bytes).unwrap();
    assert_eq!(back.frames(), set.frames(), "{format:?}");
  }
}

#[test]
fn test_solid_archive_keeps_uuid() {
  let set = FrameSet::from_frames(vec![Frame::new(4, 4).unwrap()]);
  let bytes = encode(&set, ExportFormat::default()).unwrap();
  let back = decode(&bytes).unwrap();
  assert!(!back.tag(UUID_TAG).is_empty());
  assert_eq!(back.tag(UUID_TAG), set.tag(UUID_TAG));
}

#[test]
fn test_empty_set_cannot_be_encoded() {
  let err = encode(&FrameSet::new(), ExportFormat::default()).unwrap_err();
  assert_eq!(err.kind(), ErrorKind::InvalidFrame);
}
