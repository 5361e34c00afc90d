use super::*;

use alloc::format;

use crate::{parser_helpers::*, ArchiveError, FrameSet};

/// Every IMC1 file starts with this.
pub const IMC1_SIGNATURE: [u8; 4] = *b"IMC1";

/// Largest run-length payload an IMC1 file may declare.
pub const IMC1_MAX_DATA: i32 = 65536;

/// Marks a run: `0xFF, value, count_lo, count_hi`.
const RUN_MARKER: u8 = 0xFF;

/// Imports an IMC1 image.
///
/// Layout: signature, `len: u8`, `hei: u8` (both in 8x8 cells), `size: i32`,
/// then `size` bytes of run-length data that expand to the cells.
#[must_use]
pub fn import_imc1(bytes: &[u8], palette: &Palette, offset: IndexOffset) -> ImportOutcome {
  if !bytes.starts_with(&IMC1_SIGNATURE) {
    return ImportOutcome::NotThisFormat;
  }
  outcome("IMC1", parse_imc1(&bytes[4..], palette, offset))
}

fn parse_imc1(bytes: &[u8], palette: &Palette, offset: IndexOffset) -> ArchiveResult<FrameSet> {
  let (len, rest) = try_pull_u8(bytes)?;
  let (hei, rest) = try_pull_u8(rest)?;
  let (len, hei) = (usize::from(len), usize::from(hei));
  if len == 0 || hei == 0 {
    return Err(ArchiveError::corrupt("image size cannot be zero"));
  }
  let (size, rest) = try_pull_i32_le(rest)?;
  if size <= 0 || size > IMC1_MAX_DATA {
    return Err(ArchiveError::corrupt(format!("invalid data size {size}")));
  }
  let (rle, rest) = try_pull_slice(rest, size as usize)?;
  let cells = expand_runs(rle, len * hei * CELL_SIZE * CELL_SIZE)?;
  let linear = cells_to_linear(&cells, len, hei);
  let (width, height) = ((len * CELL_SIZE) as u32, (hei * CELL_SIZE) as u32);
  if !rest.is_empty() {
    log::warn!("Extra data after IMC1 frame; possible format mismatch");
  }
  let mut set = FrameSet::new();
  set.add(indexed_frame(width, height, &linear, palette, offset)?);
  Ok(set)
}

/// Expands IMC1 run-length data into exactly `out_len` bytes.
///
/// Output that the runs don't reach stays zero. The final input byte is never
/// read as a literal, matching the files in the wild.
pub fn expand_runs(rle: &[u8], out_len: usize) -> ArchiveResult<Vec<u8>> {
  let mut out = Vec::with_capacity(out_len);
  let end = rle.len().saturating_sub(1);
  let mut i = 0;
  while i < end {
    if rle[i] == RUN_MARKER {
      let run = rle
        .get(i + 1..i + 4)
        .ok_or_else(|| ArchiveError::corrupt("run marker at the end of the data"))?;
      let count = usize::from(u16::from_le_bytes([run[1], run[2]]));
      if out.len() + count > out_len {
        return Err(ArchiveError::corrupt("decoding went outside of range"));
      }
      out.resize(out.len() + count, run[0]);
      i += 4;
    } else {
      if out.len() == out_len {
        return Err(ArchiveError::corrupt("decoding went outside of range"));
      }
      out.push(rle[i]);
      i += 1;
    }
  }
  out.resize(out_len, 0);
  Ok(out)
}
