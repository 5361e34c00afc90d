use super::*;

use alloc::format;

use crate::{
  compression::inflate_zlib_exact, frame::check_dimensions, parser_helpers::*, ArchiveError,
  FrameSet, MAX_FRAMES, MAX_TILE_SIZE,
};

/// Every OBL4 file starts with this.
pub const OBL4_SIGNATURE: [u8; 4] = *b"OBL4";

/// Storage mode where each tile is a `u32` length plus a zlib stream.
pub const OBL4_MODE_ZLIB: i32 = -1;

/// Imports an OBL4 tile sheet.
///
/// Layout: signature, `count: i32`, `mode: i32`, then per tile `len: i32`,
/// `hei: i32`, `mapped: i32` and the tile's indexes. In [`OBL4_MODE_ZLIB`]
/// the indexes are a `u32` byte count and a zlib stream, in any other mode
/// they're `len * hei` raw bytes.
#[must_use]
pub fn import_obl4(bytes: &[u8], palette: &Palette, offset: IndexOffset) -> ImportOutcome {
  if !bytes.starts_with(&OBL4_SIGNATURE) {
    return ImportOutcome::NotThisFormat;
  }
  outcome("OBL4", parse_obl4(&bytes[4..], palette, offset))
}

fn parse_obl4(bytes: &[u8], palette: &Palette, offset: IndexOffset) -> ArchiveResult<FrameSet> {
  let (count, rest) = try_pull_i32_le(bytes)?;
  if count <= 0 || count as usize > MAX_FRAMES {
    return Err(ArchiveError::corrupt(format!("invalid frame count {count}")));
  }
  let (mode, mut rest) = try_pull_i32_le(rest)?;
  log::debug!("OBL4: {count} tiles, mode {mode}");

  let mut set = FrameSet::new();
  for n in 0..count {
    let (len, tail) = try_pull_i32_le(rest)?;
    let (hei, tail) = try_pull_i32_le(tail)?;
    let (_mapped, tail) = try_pull_i32_le(tail)?;
    if len <= 0 || hei <= 0 {
      return Err(ArchiveError::corrupt(format!("frame {n}: invalid size {len}x{hei}")));
    }
    let (width, height) = (len as u32, hei as u32);
    check_dimensions(width, height, MAX_TILE_SIZE).map_err(|e| e.context(&format!("frame {n}")))?;
    let byte_len = (width * height) as usize;
    let tail = if mode == OBL4_MODE_ZLIB {
      let (src_len, tail) = try_pull_u32_le(tail)?;
      if src_len == 0 {
        return Err(ArchiveError::corrupt(format!("frame {n}: empty compressed data")));
      }
      let (src, tail) = try_pull_slice(tail, src_len as usize)?;
      let indexes = inflate_zlib_exact(src, byte_len).map_err(|e| e.context(&format!("frame {n}")))?;
      set.add(indexed_frame(width, height, &indexes, palette, offset)?);
      tail
    } else {
      let (indexes, tail) = try_pull_slice(tail, byte_len)?;
      set.add(indexed_frame(width, height, indexes, palette, offset)?);
      tail
    };
    rest = tail;
  }
  if !rest.is_empty() {
    log::warn!("Extra data after OBL4 frames; possible format mismatch");
  }
  Ok(set)
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::{
    compression::{deflate_zlib, DEFAULT_COMPRESSION_LEVEL},
    ErrorKind,
  };

  fn obl4_bytes(mode: i32, tiles: &[(i32, i32, &[u8])]) -> Vec<u8> {
    let mut out = OBL4_SIGNATURE.to_vec();
    out.extend_from_slice(&(tiles.len() as i32).to_le_bytes());
    out.extend_from_slice(&mode.to_le_bytes());
    for (len, hei, data) in tiles {
      out.extend_from_slice(&len.to_le_bytes());
      out.extend_from_slice(&hei.to_le_bytes());
      out.extend_from_slice(&0_i32.to_le_bytes());
      if mode == OBL4_MODE_ZLIB {
        let z = deflate_zlib(data, DEFAULT_COMPRESSION_LEVEL);
        out.extend_from_slice(&(z.len() as u32).to_le_bytes());
        out.extend_from_slice(&z);
      } else {
        out.extend_from_slice(data);
      }
    }
    out
  }

  fn matched(bytes: &[u8]) -> FrameSet {
    match import_obl4(bytes, &DOS_PALETTE, IndexOffset::TILES) {
      ImportOutcome::Matched(set) => set,
      other => panic!("{other:?}"),
    }
  }

  #[test]
  fn test_raw_tiles() {
    let bytes = obl4_bytes(0, &[(2, 1, &[0, 17]), (1, 3, &[16, 17, 18])]);
    let set = matched(&bytes);
    assert_eq!(set.len(), 2);
    assert_eq!(set[0].pixels(), &[0, DOS_PALETTE[1]]);
    assert_eq!((set[1].width(), set[1].height()), (1, 3));
    assert_eq!(set[1].pixels(), &[DOS_PALETTE[0], DOS_PALETTE[1], DOS_PALETTE[2]]);
  }

  #[test]
  fn test_zlib_tiles() {
    let data = [20_u8; 32 * 16];
    let set = matched(&obl4_bytes(OBL4_MODE_ZLIB, &[(32, 16, &data)]));
    assert_eq!((set[0].width(), set[0].height()), (32, 16));
    assert!(set[0].pixels().iter().all(|&p| p == DOS_PALETTE[4]));
  }

  #[test]
  fn test_zlib_size_mismatch_is_malformed() {
    let mut bytes = obl4_bytes(OBL4_MODE_ZLIB, &[(4, 4, &[1; 16])]);
    // claim 4x5 instead
    bytes[16] = 5;
    match import_obl4(&bytes, &DOS_PALETTE, IndexOffset::TILES) {
      ImportOutcome::Malformed(e) => assert_eq!(e.kind(), ErrorKind::CorruptStream),
      other => panic!("{other:?}"),
    }
  }

  #[test]
  fn test_bad_sizes_are_malformed() {
    for (len, hei, kind) in
      [(0, 4, ErrorKind::CorruptStream), (-3, 4, ErrorKind::CorruptStream), (257, 1, ErrorKind::ResourceLimit)]
    {
      let bytes = obl4_bytes(0, &[(len, hei, &[])]);
      match import_obl4(&bytes, &DOS_PALETTE, IndexOffset::TILES) {
        ImportOutcome::Malformed(e) => assert_eq!(e.kind(), kind),
        other => panic!("{other:?}"),
      }
    }
  }
}
