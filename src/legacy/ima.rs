use super::*;

use crate::FrameSet;

/// Checks the IMA size rule.
///
/// IMA has no signature: the two leading bytes are the size in 8x8 cells, and
/// the file is a match only when the remaining size is exactly that many cells.
#[inline]
#[must_use]
pub fn is_ima(bytes: &[u8]) -> bool {
  match bytes {
    [len, hei, rest @ ..] => {
      *len != 0 && *hei != 0 && rest.len() == usize::from(*len) * usize::from(*hei) * 64
    }
    _ => false,
  }
}

/// Imports an IMA image.
#[must_use]
pub fn import_ima(bytes: &[u8], palette: &Palette, offset: IndexOffset) -> ImportOutcome {
  if !is_ima(bytes) {
    return ImportOutcome::NotThisFormat;
  }
  let (len, hei) = (usize::from(bytes[0]), usize::from(bytes[1]));
  let linear = cells_to_linear(&bytes[2..], len, hei);
  let (width, height) = ((len * CELL_SIZE) as u32, (hei * CELL_SIZE) as u32);
  log::debug!("IMA: {len}x{hei} cells");
  outcome(
    "IMA",
    indexed_frame(width, height, &linear, palette, offset).map(|f| FrameSet::from_frames(alloc::vec![f])),
  )
}
