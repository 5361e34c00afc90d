use super::*;

use alloc::format;
use bytemuck::{Pod, Zeroable};
use pack1::{I32LE, U16LE, U32LE};

use crate::{parser_helpers::*, ArchiveError, FrameSet, MAX_FRAMES};

/// Every GE96 file starts with this.
pub const GE96_SIGNATURE: [u8; 4] = *b"GE96";

/// GE96 tiles are always this many pixels on a side.
pub const GE96_TILE_SIZE: u32 = 32;

/// The 1044-byte GE96 header.
///
/// The stored palette is ignored; tiles index the fixed palette like every
/// other legacy format.
#[derive(Debug, Clone, Copy, Zeroable, Pod)]
#[repr(C)]
pub struct Ge96Header {
  pub id: [u8; 4],
  pub class: U16LE,
  pub name: [u8; 256],
  pub padding: [u8; 2],
  pub image_count: I32LE,
  pub last_viewed: I32LE,
  pub palette: [u8; 768],
  pub ptr_first: U32LE,
}

/// One 1064-byte GE96 tile record.
#[derive(Debug, Clone, Copy, Zeroable, Pod)]
#[repr(C)]
pub struct Ge96Tile {
  pub ptr_prev: U32LE,
  pub ptr_next: U32LE,
  pub name: [u8; 30],
  pub class: U16LE,
  pub image: [u8; 1024],
}

/// Imports a GE96 tile sheet.
#[must_use]
pub fn import_ge96(bytes: &[u8], palette: &Palette, offset: IndexOffset) -> ImportOutcome {
  if !bytes.starts_with(&GE96_SIGNATURE) {
    return ImportOutcome::NotThisFormat;
  }
  outcome("GE96", parse_ge96(bytes, palette, offset))
}

fn parse_ge96(bytes: &[u8], palette: &Palette, offset: IndexOffset) -> ArchiveResult<FrameSet> {
  let (header, mut rest) = try_pull_pod::<Ge96Header>(bytes)?;
  let count = header.image_count.get();
  if count <= 0 || count as usize > MAX_FRAMES {
    return Err(ArchiveError::corrupt(format!("image count {count} is invalid")));
  }
  log::debug!("GE96: {count} tiles");
  let mut set = FrameSet::new();
  set.set_name(c_string(&header.name));
  for n in 0..count {
    let (tile, tail) =
      try_pull_pod::<Ge96Tile>(rest).map_err(|e| e.context(&format!("tile {n}")))?;
    set.add(indexed_frame(GE96_TILE_SIZE, GE96_TILE_SIZE, &tile.image, palette, offset)?);
    rest = tail;
  }
  if !rest.is_empty() {
    log::warn!("Extra data after GE96 frames; possible format mismatch");
  }
  Ok(set)
}
