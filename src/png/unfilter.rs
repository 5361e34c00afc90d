//! Scanline filtering.
//!
//! From the PNG spec:
//!
//! > Filters are applied to **bytes**, not to pixels, regardless of the bit
//! > depth or color type of the image.
//!
//! In all of these, `a` is the byte one pixel to the left, `b` is the byte
//! above, and `c` is the byte above and to the left. Any of them that would be
//! outside the image counts as 0.

use super::*;

/// The five adaptive filter types.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum PngFilter {
  #[default]
  None = 0,
  Sub = 1,
  Up = 2,
  Average = 3,
  Paeth = 4,
}
impl PngFilter {
  pub const ALL: [Self; 5] = [Self::None, Self::Sub, Self::Up, Self::Average, Self::Paeth];
}
impl TryFrom<u8> for PngFilter {
  type Error = ArchiveError;
  #[inline]
  fn try_from(value: u8) -> Result<Self, Self::Error> {
    Ok(match value {
      0 => Self::None,
      1 => Self::Sub,
      2 => Self::Up,
      3 => Self::Average,
      4 => Self::Paeth,
      other => return Err(ArchiveError::unsupported(format!("filter type {other}"))),
    })
  }
}

/// Holds the previous and current scanline while unfiltering.
///
/// The previous line starts as all zeroes, which is exactly what filtering
/// the top scanline expects.
#[derive(Debug, Clone)]
pub(crate) struct ScanlineArena {
  prev: Vec<u8>,
  cur: Vec<u8>,
  filter_chunk_size: usize,
}
impl ScanlineArena {
  #[inline]
  #[must_use]
  pub fn new(bytes_per_scanline: usize, filter_chunk_size: usize) -> Self {
    Self {
      prev: vec![0; bytes_per_scanline],
      cur: vec![0; bytes_per_scanline],
      filter_chunk_size,
    }
  }

  /// Unfilters one scanline (filter byte first) and returns the raw bytes.
  ///
  /// The returned line becomes the previous line for the next call.
  pub fn next_line(&mut self, filtered: &[u8]) -> ArchiveResult<&[u8]> {
    let (&filter_byte, data) =
      filtered.split_first().ok_or_else(|| ArchiveError::corrupt("empty scanline"))?;
    if data.len() != self.cur.len() {
      return Err(ArchiveError::corrupt("scanline length mismatch"));
    }
    core::mem::swap(&mut self.prev, &mut self.cur);
    self.cur.copy_from_slice(data);
    unfilter_scanline(PngFilter::try_from(filter_byte)?, &mut self.cur, &self.prev, self.filter_chunk_size);
    Ok(&self.cur)
  }
}

/// Reverses `filter` on `line` in place, given the already reconstructed
/// previous line.
pub fn unfilter_scanline(filter: PngFilter, line: &mut [u8], prev: &[u8], filter_chunk_size: usize) {
  let bpp = filter_chunk_size;
  match filter {
    PngFilter::None => (),
    PngFilter::Sub => {
      for i in bpp..line.len() {
        line[i] = reconstruct_sub(line[i], line[i - bpp]);
      }
    }
    PngFilter::Up => {
      for (x, b) in line.iter_mut().zip(prev) {
        *x = reconstruct_up(*x, *b);
      }
    }
    PngFilter::Average => {
      for i in 0..line.len() {
        let a = if i >= bpp { line[i - bpp] } else { 0 };
        line[i] = reconstruct_average(line[i], a, prev[i]);
      }
    }
    PngFilter::Paeth => {
      for i in 0..line.len() {
        let (a, c) = if i >= bpp { (line[i - bpp], prev[i - bpp]) } else { (0, 0) };
        line[i] = reconstruct_paeth(line[i], a, prev[i], c);
      }
    }
  }
}

/// Applies `filter` to the raw `line`, pushing the filter byte and then the
/// filtered bytes onto `out`.
pub fn filter_scanline(
  filter: PngFilter, line: &[u8], prev: &[u8], filter_chunk_size: usize, out: &mut Vec<u8>,
) {
  let bpp = filter_chunk_size;
  out.push(filter as u8);
  out.extend(line.iter().enumerate().map(|(i, &x)| {
    let a = if i >= bpp { line[i - bpp] } else { 0 };
    let b = prev[i];
    let c = if i >= bpp { prev[i - bpp] } else { 0 };
    match filter {
      PngFilter::None => x,
      PngFilter::Sub => x.wrapping_sub(a),
      PngFilter::Up => x.wrapping_sub(b),
      PngFilter::Average => x.wrapping_sub(average(a, b)),
      PngFilter::Paeth => x.wrapping_sub(paeth_predictor(a, b, c)),
    }
  }));
}

/// Reconstruct Filter Type 1
#[inline]
const fn reconstruct_sub(fx: u8, ra: u8) -> u8 {
  fx.wrapping_add(ra)
}

/// Reconstruct Filter Type 2
#[inline]
const fn reconstruct_up(fx: u8, rb: u8) -> u8 {
  fx.wrapping_add(rb)
}

/// Reconstruct Filter Type 3
#[inline]
const fn reconstruct_average(fx: u8, ra: u8, rb: u8) -> u8 {
  fx.wrapping_add(average(ra, rb))
}

/// Reconstruct Filter Type 4
#[inline]
const fn reconstruct_paeth(fx: u8, ra: u8, rb: u8, rc: u8) -> u8 {
  fx.wrapping_add(paeth_predictor(ra, rb, rc))
}

/// Truncating mean, computed without overflow.
#[inline]
const fn average(a: u8, b: u8) -> u8 {
  ((a as u16 + b as u16) / 2) as u8
}

/// The Paeth filter function computes a simple linear function of the three
/// neighboring pixels (left `a`, above `b`, upper left `c`).
///
/// The output is the "predictor" of the neighboring pixel closest to the
/// computed value.
const fn paeth_predictor(a: u8, b: u8, c: u8) -> u8 {
  // i32 is wide enough that no u8 inputs can overflow.
  let a_ = a as i32;
  let b_ = b as i32;
  let c_ = c as i32;
  let p = a_ + b_ - c_;
  let pa = (p - a_).abs();
  let pb = (p - b_).abs();
  let pc = (p - c_).abs();
  // Note: ties go to a, then b, then c. Don't reorder these tests.
  if pa <= pb && pa <= pc {
    a
  } else if pb <= pc {
    b
  } else {
    c
  }
}
