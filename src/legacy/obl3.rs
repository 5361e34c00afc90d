use super::*;

use alloc::format;
use bytemuck::{Pod, Zeroable};
use pack1::{U16LE, U32LE};

use crate::{
  frame::check_dimensions, parser_helpers::*, ArchiveError, FrameSet, MAX_FRAMES, MAX_TILE_SIZE,
};

/// Every OBL3 file starts with this.
pub const OBL3_SIGNATURE: [u8; 4] = *b"OBL3";

/// OBL3 stores tile sizes in units of this many pixels.
const OBL3_GRANULARITY: u32 = 8;

/// The 1600-byte OBL3 header.
///
/// Most of the fields are game attributes for the object the tiles belong to,
/// which are of no use to an image loader but get carried along.
#[derive(Debug, Clone, Copy, Zeroable, Pod)]
#[repr(C)]
pub struct Obl3Header {
  pub id: [u8; 4],
  pub last_viewed: U32LE,
  pub image_count: U32LE,
  pub default_image: U32LE,
  pub info_flags: [u8; 4],
  pub attributes: [U16LE; 14],
  pub cell_width: U32LE,
  pub cell_height: U32LE,
  pub options: [u8; 4],
  pub filler: U32LE,
  pub filename: [u8; 256],
  pub name: [u8; 256],
  pub copyrights: [u8; 1024],
}

/// The 24 bytes ahead of each OBL3 tile bitmap.
#[derive(Debug, Clone, Copy, Zeroable, Pod)]
#[repr(C)]
pub struct Obl3TileHeader {
  pub ptr_prev: U32LE,
  pub ptr_next: U32LE,
  pub ptr_bits: U32LE,
  pub ptr_map: U32LE,
  pub filler: U32LE,
  pub extra_info: [u8; 4],
}

/// Imports an OBL3 tile sheet.
///
/// The header's name field becomes the frame set name.
#[must_use]
pub fn import_obl3(bytes: &[u8], palette: &Palette, offset: IndexOffset) -> ImportOutcome {
  if !bytes.starts_with(&OBL3_SIGNATURE) {
    return ImportOutcome::NotThisFormat;
  }
  outcome("OBL3", parse_obl3(bytes, palette, offset))
}

fn parse_obl3(bytes: &[u8], palette: &Palette, offset: IndexOffset) -> ArchiveResult<FrameSet> {
  let (header, rest) = try_pull_pod::<Obl3Header>(bytes)?;
  let count = header.image_count.get() as usize;
  if count == 0 || count > MAX_FRAMES {
    return Err(ArchiveError::corrupt(format!("invalid image count {count}")));
  }
  let width = header.cell_width.get().saturating_mul(OBL3_GRANULARITY);
  let height = header.cell_height.get().saturating_mul(OBL3_GRANULARITY);
  if width == 0 || height == 0 {
    return Err(ArchiveError::corrupt(format!("invalid tile size {width}x{height}")));
  }
  check_dimensions(width, height, MAX_TILE_SIZE)?;
  let bitmap_len = (width * height) as usize;
  let needed = count * (core::mem::size_of::<Obl3TileHeader>() + bitmap_len);
  if rest.len() < needed {
    return Err(ArchiveError::corrupt(format!(
      "file too small for declared content ({needed} bytes needed, {} present)",
      rest.len()
    )));
  }
  log::debug!("OBL3: {count} tiles of {width}x{height}");

  let mut set = FrameSet::new();
  set.set_name(c_string(&header.name));
  let mut rest = rest;
  for _ in 0..count {
    let (_tile, tail) = try_pull_pod::<Obl3TileHeader>(rest)?;
    let (bitmap, tail) = try_pull_slice(tail, bitmap_len)?;
    set.add(indexed_frame(width, height, bitmap, palette, offset)?);
    rest = tail;
  }
  if !rest.is_empty() {
    log::warn!("Extra data after OBL3 frames; possible format mismatch");
  }
  Ok(set)
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::ErrorKind;

  fn obl3_bytes(cells: (u32, u32), tiles: &[&[u8]]) -> Vec<u8> {
    let mut out = vec![0_u8; 1600];
    out[..4].copy_from_slice(&OBL3_SIGNATURE);
    out[8..12].copy_from_slice(&(tiles.len() as u32).to_le_bytes());
    out[48..52].copy_from_slice(&cells.0.to_le_bytes());
    out[52..56].copy_from_slice(&cells.1.to_le_bytes());
    out[320..325].copy_from_slice(b"stone");
    for tile in tiles {
      out.extend_from_slice(&[0; 24]);
      out.extend_from_slice(tile);
    }
    out
  }

  #[test]
  fn test_header_sizes() {
    assert_eq!(core::mem::size_of::<Obl3Header>(), 1600);
    assert_eq!(core::mem::size_of::<Obl3TileHeader>(), 24);
  }

  #[test]
  fn test_import_two_tiles() {
    let a = vec![17_u8; 64];
    let mut b = vec![0_u8; 64];
    b[63] = 18;
    let bytes = obl3_bytes((1, 1), &[&a, &b]);
    let set = match import_obl3(&bytes, &DOS_PALETTE, IndexOffset::TILES) {
      ImportOutcome::Matched(set) => set,
      other => panic!("{other:?}"),
    };
    assert_eq!(set.len(), 2);
    assert_eq!(set.name(), "stone");
    assert_eq!((set[0].width(), set[0].height()), (8, 8));
    assert!(set[0].pixels().iter().all(|&p| p == DOS_PALETTE[1]));
    assert_eq!(set[1].get(7, 7), Some(DOS_PALETTE[2]));
    assert_eq!(set[1].get(0, 0), Some(0));
  }

  #[test]
  fn test_truncated_is_malformed() {
    let mut bytes = obl3_bytes((1, 1), &[&[1; 64], &[1; 64]]);
    bytes.truncate(bytes.len() - 1);
    match import_obl3(&bytes, &DOS_PALETTE, IndexOffset::TILES) {
      ImportOutcome::Malformed(e) => assert_eq!(e.kind(), ErrorKind::CorruptStream),
      other => panic!("{other:?}"),
    }
  }

  #[test]
  fn test_oversized_tiles_hit_the_tile_limit() {
    let mut bytes = obl3_bytes((33, 1), &[]);
    bytes[8] = 1;
    match import_obl3(&bytes, &DOS_PALETTE, IndexOffset::TILES) {
      ImportOutcome::Malformed(e) => assert_eq!(e.kind(), ErrorKind::ResourceLimit),
      other => panic!("{other:?}"),
    }
  }

  #[test]
  fn test_other_signature_is_not_this_format() {
    let r = import_obl3(b"OBL4\0\0\0\0", &DOS_PALETTE, IndexOffset::TILES);
    assert!(matches!(r, ImportOutcome::NotThisFormat));
  }
}
