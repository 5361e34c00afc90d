#![forbid(unsafe_code)]

//! Importers for the older tile and sprite sheet formats.
//!
//! These are all import only. Every format stores 8-bit palette indexes, and
//! they all share the one fixed 256-color palette ([`DOS_PALETTE`]) rather than
//! any palette stored in the file. The formats differ in which index the first
//! usable color sits at, which is what [`IndexOffset`] corrects for.
//!
//! * **OBL3**: fixed-size tiles behind a 1600-byte header.
//! * **OBL4**: variable-size tiles, raw or zlib compressed.
//! * **GE96**: 32x32 tiles behind a 1044-byte header.
//! * **IMC1**: one image stored as run-length coded 8x8 cells.
//! * **IMA**: one image stored as raw 8x8 cells, with no signature at all.
//!
//! Index `0` is always the transparent pixel, whatever the offset.

use alloc::{string::String, vec, vec::Vec};

use crate::{
  dispatch::{outcome, ImportOutcome},
  ArchiveResult, Frame,
};

mod ge96;
mod ima;
mod imc1;
mod obl3;
mod obl4;

pub use ge96::*;
pub use ima::*;
pub use imc1::*;
pub use obl3::*;
pub use obl4::*;

/// A full table of packed `0xAABBGGRR` colors.
pub type Palette = [u32; 256];

/// Side length of the cells that IMA and IMC1 images are built from.
pub const CELL_SIZE: usize = 8;

/// How far to shift an index before looking it up in the palette.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct IndexOffset(pub i32);
impl IndexOffset {
  /// Used by IMA and IMC1 images.
  pub const NONE: Self = Self(0);
  /// Used by OBL3, OBL4 and GE96 tiles.
  pub const TILES: Self = Self(-16);

  /// Palette slot for a non-zero index.
  #[inline]
  #[must_use]
  pub const fn apply(self, index: u8) -> usize {
    ((index as i32 + self.0) & 0xFF) as usize
  }
}

/// Converts palette indexes into packed pixels.
///
/// Index `0` is transparent; anything else is looked up after the offset.
#[inline]
#[must_use]
pub fn indexes_to_pixels(indexes: &[u8], palette: &Palette, offset: IndexOffset) -> Vec<u32> {
  indexes.iter().map(|&i| if i == 0 { 0 } else { palette[offset.apply(i)] }).collect()
}

/// Makes a frame from `width * height` palette indexes.
///
/// Callers check the dimensions against their own cap first.
pub(crate) fn indexed_frame(
  width: u32, height: u32, indexes: &[u8], palette: &Palette, offset: IndexOffset,
) -> ArchiveResult<Frame> {
  Frame::from_pixels(width, height, indexes_to_pixels(indexes, palette, offset))
}

/// Rearranges `len x hei` cells of 8x8 bytes into a linear bitmap.
///
/// Cells are stored one after another, row of cells by row of cells, and each
/// cell is itself stored row by row. The output is `len*8` bytes wide.
/// `cells` must hold exactly `len * hei * 64` bytes.
#[must_use]
pub fn cells_to_linear(cells: &[u8], len: usize, hei: usize) -> Vec<u8> {
  let stride = len * CELL_SIZE;
  let mut out = vec![0_u8; cells.len()];
  for (n, cell) in cells.chunks_exact(CELL_SIZE * CELL_SIZE).enumerate() {
    let (cx, cy) = (n % len, n / len);
    if cy >= hei {
      break;
    }
    for (row, line) in cell.chunks_exact(CELL_SIZE).enumerate() {
      let start = (cy * CELL_SIZE + row) * stride + cx * CELL_SIZE;
      out[start..start + CELL_SIZE].copy_from_slice(line);
    }
  }
  out
}

/// Reads a NUL-terminated name field.
pub(crate) fn c_string(bytes: &[u8]) -> String {
  let end = bytes.iter().position(|&b| b == 0).unwrap_or(bytes.len());
  String::from_utf8_lossy(&bytes[..end]).into_owned()
}

/// The fixed palette every legacy format indexes into.
#[rustfmt::skip]
pub const DOS_PALETTE: Palette = [
  0xff000000, 0xffab0303, 0xff03ab03, 0xffabab03, 0xff0303ab, 0xffab03ab, 0xff0357ab, 0xffababab,
  0xff575757, 0xffff5757, 0xff57ff57, 0xffffff57, 0xff5757ff, 0xffff57ff, 0xff57ffff, 0xffffffff,
  0xff000000, 0xff171717, 0xff232323, 0xff2f2f2f, 0xff3b3b3b, 0xff474747, 0xff535353, 0xff636363,
  0xff737373, 0xff838383, 0xff939393, 0xffa3a3a3, 0xffb7b7b7, 0xffcbcbcb, 0xffe3e3e3, 0xffffffff,
  0xffff0303, 0xffff0343, 0xffff037f, 0xffff03bf, 0xffff03ff, 0xffbf03ff, 0xff7f03ff, 0xff4303ff,
  0xff0303ff, 0xff0343ff, 0xff037fff, 0xff03bfff, 0xff03ffff, 0xff03ffbf, 0xff03ff7f, 0xff03ff43,
  0xff03ff03, 0xff43ff03, 0xff7fff03, 0xffbfff03, 0xffffff03, 0xffffbf03, 0xffff7f03, 0xffff4303,
  0xffff7f7f, 0xffff7f9f, 0xffff7fbf, 0xffff7fdf, 0xffff7fff, 0xffdf7fff, 0xffbf7fff, 0xff9f7fff,
  0xff7f7fff, 0xff7f9fff, 0xff7fbfff, 0xff7fdfff, 0xff7fffff, 0xff7fffdf, 0xff7fffbf, 0xff7fff9f,
  0xff7fff7f, 0xff9fff7f, 0xffbfff7f, 0xffdfff7f, 0xffffff7f, 0xffffdf7f, 0xffffbf7f, 0xffff9f7f,
  0xffffb7b7, 0xffffb7c7, 0xffffb7db, 0xffffb7eb, 0xffffb7ff, 0xffebb7ff, 0xffdbb7ff, 0xffc7b7ff,
  0xffb7b7ff, 0xffb7c7ff, 0xffb7dbff, 0xffb7ebff, 0xffb7ffff, 0xffb7ffeb, 0xffb7ffdb, 0xffb7ffc7,
  0xffb7ffb7, 0xffc7ffb7, 0xffdbffb7, 0xffebffb7, 0xffffffb7, 0xffffebb7, 0xffffdbb7, 0xffffc7b7,
  0xff730303, 0xff73031f, 0xff73033b, 0xff730357, 0xff730373, 0xff570373, 0xff3b0373, 0xff1f0373,
  0xff030373, 0xff031f73, 0xff033b73, 0xff035773, 0xff037373, 0xff037357, 0xff03733b, 0xff03731f,
  0xff037303, 0xff1f7303, 0xff3b7303, 0xff577303, 0xff737303, 0xff735703, 0xff733b03, 0xff731f03,
  0xff733b3b, 0xff733b47, 0xff733b57, 0xff733b63, 0xff733b73, 0xff633b73, 0xff573b73, 0xff473b73,
  0xff3b3b73, 0xff3b4773, 0xff3b5773, 0xff3b6373, 0xff3b7373, 0xff3b7363, 0xff3b7357, 0xff3b7347,
  0xff3b733b, 0xff47733b, 0xff57733b, 0xff63733b, 0xff73733b, 0xff73633b, 0xff73573b, 0xff73473b,
  0xff735353, 0xff73535b, 0xff735363, 0xff73536b, 0xff735373, 0xff6b5373, 0xff635373, 0xff5b5373,
  0xff535373, 0xff535b73, 0xff536373, 0xff536b73, 0xff537373, 0xff53736b, 0xff537363, 0xff53735b,
  0xff537353, 0xff5b7353, 0xff637353, 0xff6b7353, 0xff737353, 0xff736b53, 0xff736353, 0xff735b53,
  0xff430303, 0xff430313, 0xff430323, 0xff430333, 0xff430343, 0xff330343, 0xff230343, 0xff130343,
  0xff030343, 0xff031343, 0xff032343, 0xff033343, 0xff034343, 0xff034333, 0xff034323, 0xff034313,
  0xff034303, 0xff134303, 0xff234303, 0xff334303, 0xff434303, 0xff433303, 0xff432303, 0xff431303,
  0xff432323, 0xff43232b, 0xff432333, 0xff43233b, 0xff432343, 0xff3b2343, 0xff332343, 0xff2b2343,
  0xff232343, 0xff232b43, 0xff233343, 0xff233b43, 0xff234343, 0xff23433b, 0xff234333, 0xff23432b,
  0xff234323, 0xff2b4323, 0xff334323, 0xff3b4323, 0xff434323, 0xff433b23, 0xff433323, 0xff432b23,
  0xff432f2f, 0xff432f33, 0xff432f37, 0xff432f3f, 0xff432f43, 0xff3f2f43, 0xff372f43, 0xff332f43,
  0xff2f2f43, 0xff2f3343, 0xff2f3743, 0xff2f3f43, 0xff2f4343, 0xff2f433f, 0xff2f4337, 0xff2f4333,
  0xff2f432f, 0xff33432f, 0xff37432f, 0xff3f432f, 0xff43432f, 0xff433f2f, 0xff43372f, 0xff43332f,
  0xff000000, 0xff000000, 0xff000000, 0xff000000, 0xff000000, 0xff000000, 0xff000000, 0xff000000,
];

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_index_zero_is_transparent() {
    let px = indexes_to_pixels(&[0, 1, 17, 16], &DOS_PALETTE, IndexOffset::TILES);
    assert_eq!(px, [0, DOS_PALETTE[241], DOS_PALETTE[1], DOS_PALETTE[0]]);
    let px = indexes_to_pixels(&[0, 1, 255], &DOS_PALETTE, IndexOffset::NONE);
    assert_eq!(px, [0, DOS_PALETTE[1], DOS_PALETTE[255]]);
  }

  #[test]
  fn test_palette_entries_are_opaque() {
    assert!(DOS_PALETTE.iter().all(|p| p >> 24 == 0xFF));
    // blue is the second DOS color
    assert_eq!(DOS_PALETTE[1] & 0x00FF_FFFF, 0x00AB_0303);
  }

  #[test]
  fn test_cells_to_linear() {
    // two cells side by side, each filled with its own number
    let mut cells = vec![1_u8; 64];
    cells.extend_from_slice(&[2; 64]);
    let out = cells_to_linear(&cells, 2, 1);
    for row in out.chunks_exact(16) {
      assert_eq!(&row[..8], &[1; 8]);
      assert_eq!(&row[8..], &[2; 8]);
    }
    // a 1x2 stack is already linear
    let mut stacked: Vec<u8> = (0..64).collect();
    stacked.extend(64..128);
    assert_eq!(cells_to_linear(&stacked, 1, 2), stacked);
  }

  #[test]
  fn test_cells_to_linear_positions() {
    let cells: Vec<u8> = (0..=255).collect();
    let out = cells_to_linear(&cells, 2, 2);
    // second cell, row 1, column 3
    assert_eq!(out[8 + 3 + 16], 64 + 8 + 3);
    // fourth cell, row 7, column 7
    assert_eq!(out[8 + 7 + (8 + 7) * 16], 192 + 63);
  }

  #[test]
  fn test_c_string() {
    assert_eq!(c_string(b"tiles\0junk"), "tiles");
    assert_eq!(c_string(b"full"), "full");
  }
}
