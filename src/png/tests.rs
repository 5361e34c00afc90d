use super::*;
use crate::ErrorKind;

/// Builds a PNG out of already filtered scanlines.
fn build_png(ihdr: [u8; 13], extra: &[(PngChunkType, &[u8])], filtered: &[u8]) -> Vec<u8> {
  let mut out = PNG_SIGNATURE.to_vec();
  write_chunk(&mut out, PngChunkType::IHDR, &ihdr).unwrap();
  for (ty, data) in extra {
    write_chunk(&mut out, *ty, data).unwrap();
  }
  write_chunk(&mut out, PngChunkType::IDAT, &deflate_zlib(filtered, 6)).unwrap();
  write_chunk(&mut out, PngChunkType::IEND, &[]).unwrap();
  out
}

fn ihdr(width: u32, height: u32, depth: u8, color: u8) -> [u8; 13] {
  let mut out = IHDR::rgba8_bytes(width, height);
  out[8] = depth;
  out[9] = color;
  out
}

/// Pixels that differ everywhere, so misplaced data shows up.
fn noisy_frame(width: u32, height: u32, seed: u32) -> Frame {
  let mut state = seed | 1;
  let pixels = (0..width * height)
    .map(|_| {
      state ^= state << 13;
      state ^= state >> 17;
      state ^= state << 5;
      state
    })
    .collect();
  Frame::from_pixels(width, height, pixels).unwrap()
}

#[test]
fn test_oblt_strip_cuts_frames() {
  // 48x16 RGB, each 16 pixel wide slice a different color
  let colors = [[255_u8, 0, 0], [0, 255, 0], [0, 0, 255]];
  let mut filtered = Vec::new();
  for _ in 0..16 {
    filtered.push(0);
    for c in colors {
      for _ in 0..16 {
        filtered.extend_from_slice(&c);
      }
    }
  }
  let layout = SpriteLayout::Strip(vec![(16, 16); 3]).to_bytes();
  let png = build_png(ihdr(48, 16, 8, 2), &[(PngChunkType::obLT, &layout)], &filtered);
  let set = decode_png(&png).unwrap();
  assert_eq!(set.len(), 3);
  for (frame, c) in set.iter().zip(colors) {
    assert_eq!((frame.width(), frame.height()), (16, 16));
    let expected = RGB888 { r: c[0], g: c[1], b: c[2] }.with_alpha(255).to_pixel();
    assert!(frame.pixels().iter().all(|&p| p == expected));
  }
}

#[test]
fn test_every_filter_gives_the_same_pixel() {
  let frame = Frame::from_pixels(1, 1, vec![0x80C0_4020]).unwrap();
  let set = FrameSet::from_frames(vec![frame.clone()]);
  for filter in PngFilter::ALL {
    let png = PngEncoder::new().with_filter(filter).encode(&set).unwrap();
    let back = decode_png(&png).unwrap();
    assert_eq!(back[0], frame, "{filter:?}");
  }
}

#[test]
fn test_every_filter_round_trips_noise() {
  let set = FrameSet::from_frames(vec![noisy_frame(13, 7, 99)]);
  for filter in PngFilter::ALL {
    let png = PngEncoder::new().with_filter(filter).encode(&set).unwrap();
    assert_eq!(decode_png(&png).unwrap().frames(), set.frames(), "{filter:?}");
  }
}

#[test]
fn test_bit_flips_are_corrupt() {
  let set = FrameSet::from_frames(vec![noisy_frame(3, 2, 7)]);
  let png = PngEncoder::new().encode(&set).unwrap();
  let mut pos = PNG_SIGNATURE.len();
  while pos < png.len() {
    let len = u32::from_be_bytes(png[pos..pos + 4].try_into().unwrap()) as usize;
    for i in pos + 8..pos + 8 + len {
      let mut bad = png.clone();
      bad[i] ^= 1 << (i % 8);
      assert_eq!(decode_png(&bad).unwrap_err().kind(), ErrorKind::CorruptStream, "byte {i}");
    }
    pos += 12 + len;
  }
}

#[test]
fn test_frames_of_mixed_sizes_round_trip() {
  let mut set = FrameSet::new();
  set.add(noisy_frame(5, 3, 1));
  set.add(noisy_frame(2, 9, 2));
  set.add(noisy_frame(11, 1, 3));
  let png = PngEncoder::new().encode(&set).unwrap();
  let back = decode_png(&png).unwrap();
  assert_eq!(back.frames(), set.frames());
}

#[test]
fn test_large_image_uses_several_idat_chunks() {
  let set = FrameSet::from_frames(vec![noisy_frame(200, 100, 5)]);
  let png = PngEncoder::new().with_compression_level(1).encode(&set).unwrap();
  let idat_count =
    RawPngChunkIter::new(&png).filter(|c| c.chunk_type() == PngChunkType::IDAT).count();
  assert!(idat_count > 1);
  assert!(RawPngChunkIter::new(&png).all(|c| c.data().len() <= IDAT_CHUNK_LIMIT));
  assert_eq!(decode_png(&png).unwrap().frames(), set.frames());
}

#[test]
fn test_chunk_order() {
  let set = FrameSet::from_frames(vec![Frame::new(2, 2).unwrap()]);
  let png = PngEncoder::new().encode(&set).unwrap();
  let types: Vec<_> = RawPngChunkIter::new(&png).map(|c| c.chunk_type()).collect();
  assert_eq!(
    types,
    [PngChunkType::IHDR, PngChunkType::IDAT, PngChunkType::obLT, PngChunkType::IEND]
  );
  assert!(RawPngChunkIter::new(&png).all(|c| c.crc_matches()));
}

#[test]
fn test_without_layout_is_one_padded_frame() {
  let filtered = [0, 1, 2, 3, 0, 4, 5, 6];
  let png = build_png(ihdr(1, 2, 8, 2), &[], &filtered);
  let set = decode_png(&png).unwrap();
  assert_eq!(set.len(), 1);
  let f = &set[0];
  assert_eq!((f.width(), f.height()), (8, 8));
  assert_eq!(f.get(0, 0), Some(0xFF03_0201));
  assert_eq!(f.get(0, 1), Some(0xFF06_0504));
  assert_eq!(f.get(1, 0), Some(0));
  assert_eq!(f.get(0, 2), Some(0));
}

#[test]
fn test_4bit_indexed_with_transparency() {
  // indexes 1, 2, 0, and 9 which is past the end of the palette
  let filtered = [0, 0x12, 0x09];
  let plte = [10, 20, 30, 40, 50, 60, 70, 80, 90];
  let trns = [0];
  let png = build_png(
    ihdr(4, 1, 4, 3),
    &[(PngChunkType::PLTE, &plte), (PngChunkType::tRNS, &trns)],
    &filtered,
  );
  let set = decode_png(&png).unwrap();
  let f = &set[0];
  assert_eq!(f.get(0, 0), Some(0xFF3C_3228));
  assert_eq!(f.get(1, 0), Some(0xFF5A_5046));
  assert_eq!(f.get(2, 0), Some(0x001E_140A));
  assert_eq!(f.get(3, 0), Some(OPAQUE_BLACK));
  assert_eq!(f.get(4, 0), Some(0));
}

#[test]
fn test_8bit_indexed_needs_plte() {
  let png = build_png(ihdr(1, 1, 8, 3), &[], &[0, 0]);
  assert_eq!(decode_png(&png).unwrap_err().kind(), ErrorKind::CorruptStream);
}

#[test]
fn test_oversized_is_resource_limit() {
  let png = build_png(ihdr(5000, 1, 8, 6), &[], &[]);
  assert_eq!(decode_png(&png).unwrap_err().kind(), ErrorKind::ResourceLimit);

  let set = FrameSet::from_frames(vec![Frame::new(4000, 1).unwrap(), Frame::new(100, 1).unwrap()]);
  assert_eq!(PngEncoder::new().encode(&set).unwrap_err().kind(), ErrorKind::ResourceLimit);
}

#[test]
fn test_encode_rejects_empty() {
  let err = PngEncoder::new().encode(&FrameSet::new()).unwrap_err();
  assert_eq!(err.kind(), ErrorKind::InvalidFrame);
  let set = FrameSet::from_frames(vec![Frame::default()]);
  assert_eq!(PngEncoder::new().encode(&set).unwrap_err().kind(), ErrorKind::InvalidFrame);
}

#[test]
fn test_structure_errors() {
  let png = PngEncoder::new().encode(&FrameSet::from_frames(vec![noisy_frame(2, 2, 3)])).unwrap();
  // drop IEND
  let no_end = &png[..png.len() - 12];
  assert_eq!(decode_png(no_end).unwrap_err().kind(), ErrorKind::CorruptStream);
  // cut in the middle of a chunk
  assert_eq!(decode_png(&png[..40]).unwrap_err().kind(), ErrorKind::CorruptStream);
  // not a PNG at all
  assert_eq!(decode_png(b"GIF89a....").unwrap_err(), ArchiveError::FormatMismatch);

  let mut no_idat = PNG_SIGNATURE.to_vec();
  write_chunk(&mut no_idat, PngChunkType::IHDR, &ihdr(1, 1, 8, 6)).unwrap();
  write_chunk(&mut no_idat, PngChunkType::IEND, &[]).unwrap();
  assert_eq!(decode_png(&no_idat).unwrap_err().kind(), ErrorKind::CorruptStream);
}

#[test]
fn test_unknown_chunks() {
  let filtered = [0, 1, 2, 3, 4];
  let png = build_png(ihdr(1, 1, 8, 6), &[(PngChunkType(*b"tEXt"), b"hi\0there")], &filtered);
  assert_eq!(decode_png(&png).unwrap()[0].get(0, 0), Some(0x0403_0201));
  let png = build_png(ihdr(1, 1, 8, 6), &[(PngChunkType(*b"ABCD"), &[])], &filtered);
  assert_eq!(decode_png(&png).unwrap_err().kind(), ErrorKind::UnsupportedFeature);
}

#[test]
fn test_bad_filter_byte_is_unsupported() {
  let png = build_png(ihdr(1, 1, 8, 6), &[], &[7, 1, 2, 3, 4]);
  assert_eq!(decode_png(&png).unwrap_err().kind(), ErrorKind::UnsupportedFeature);
}

#[test]
fn test_placed_layout_outside_image_is_corrupt() {
  let layout =
    SpriteLayout::Placed(vec![PlacedUnit { x: 4, y: 4, width: 8, height: 8 }]).to_bytes();
  let png = build_png(ihdr(1, 1, 8, 6), &[(PngChunkType::obLT, &layout)], &[0, 1, 2, 3, 4]);
  assert_eq!(decode_png(&png).unwrap_err().kind(), ErrorKind::CorruptStream);
}

#[test]
fn test_raw_chunk_iter_never_panics_on_short_input() {
  for n in 0..20 {
    let bytes = vec![0xAB_u8; n];
    let _ = RawPngChunkIter::new(&bytes).count();
  }
  assert_eq!(format!("{:?}", PngChunkType::obLT), "obLT");
}
