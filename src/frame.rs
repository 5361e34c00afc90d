#![forbid(unsafe_code)]

//! The owned RGBA pixel buffer that every format decodes into.

use alloc::{format, vec, vec::Vec};

use crate::{pixel_formats::TRANSPARENT, ArchiveError, ArchiveResult};

/// Largest width or height any frame may have.
pub const MAX_FRAME_SIZE: u32 = 4096;

/// Largest width or height of a tile in the OBL3 and OBL4 tile sheets.
pub const MAX_TILE_SIZE: u32 = 256;

/// Converts an `(x,y)` position within a given `width` 2D space into a linear
/// index.
#[inline]
#[must_use]
pub const fn xy_width_to_index(x: u32, y: u32, width: u32) -> usize {
  (y as usize) * (width as usize) + (x as usize)
}

/// Checks dimensions against a size cap before anything gets allocated.
#[inline]
pub(crate) fn check_dimensions(width: u32, height: u32, cap: u32) -> ArchiveResult<()> {
  if width > cap || height > cap {
    Err(ArchiveError::limit(format!("{width}x{height} is larger than the {cap}x{cap} limit")))
  } else {
    Ok(())
  }
}

/// One sprite image.
///
/// Pixels are stored top-down, row-major, as packed `0xAABBGGRR` values (see
/// [`pixel_formats`](crate::pixel_formats)). The pixel vector always holds
/// exactly `width * height` entries.
///
/// A zero-area frame is allowed to exist (it's what `Default` gives you), but
/// it can't be written into an archive.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Frame {
  width: u32,
  height: u32,
  pixels: Vec<u32>,
}

impl Frame {
  /// Makes a fully transparent frame.
  ///
  /// ## Failure
  /// * `ResourceLimit` if either dimension is above [`MAX_FRAME_SIZE`].
  #[inline]
  pub fn new(width: u32, height: u32) -> ArchiveResult<Self> {
    check_dimensions(width, height, MAX_FRAME_SIZE)?;
    Ok(Self::new_unchecked(width, height))
  }

  #[inline]
  pub(crate) fn new_unchecked(width: u32, height: u32) -> Self {
    let pixels = vec![TRANSPARENT; xy_width_to_index(0, height, width)];
    Self { width, height, pixels }
  }

  /// Wraps an existing pixel vector.
  ///
  /// ## Failure
  /// * `ResourceLimit` if either dimension is above [`MAX_FRAME_SIZE`].
  /// * `InvalidFrame` if `pixels.len()` isn't `width * height`.
  pub fn from_pixels(width: u32, height: u32, pixels: Vec<u32>) -> ArchiveResult<Self> {
    check_dimensions(width, height, MAX_FRAME_SIZE)?;
    let expected = xy_width_to_index(0, height, width);
    if pixels.len() != expected {
      return Err(ArchiveError::invalid_frame(format!(
        "{width}x{height} needs {expected} pixels, got {}",
        pixels.len()
      )));
    }
    Ok(Self { width, height, pixels })
  }

  /// Builds a frame from raw `R, G, B, A` bytes.
  ///
  /// ## Failure
  /// * As [`from_pixels`](Self::from_pixels), with the byte count checked
  ///   against `width * height * 4`.
  pub fn from_rgba_bytes(width: u32, height: u32, bytes: &[u8]) -> ArchiveResult<Self> {
    check_dimensions(width, height, MAX_FRAME_SIZE)?;
    let expected = xy_width_to_index(0, height, width) * 4;
    if bytes.len() != expected {
      return Err(ArchiveError::invalid_frame(format!(
        "{width}x{height} needs {expected} bytes of RGBA, got {}",
        bytes.len()
      )));
    }
    let pixels = bytes
      .chunks_exact(4)
      .map(|c| u32::from_le_bytes([c[0], c[1], c[2], c[3]]))
      .collect();
    Ok(Self { width, height, pixels })
  }

  /// The raw `R, G, B, A` bytes of every pixel, row by row.
  #[must_use]
  pub fn to_rgba_bytes(&self) -> Vec<u8> {
    let mut out = Vec::with_capacity(self.pixels.len() * 4);
    for p in &self.pixels {
      out.extend_from_slice(&p.to_le_bytes());
    }
    out
  }

  /// Width in pixels.
  #[inline]
  #[must_use]
  pub const fn width(&self) -> u32 {
    self.width
  }

  /// Height in pixels.
  #[inline]
  #[must_use]
  pub const fn height(&self) -> u32 {
    self.height
  }

  /// All pixels, top row first.
  #[inline]
  #[must_use]
  pub fn pixels(&self) -> &[u32] {
    &self.pixels
  }

  /// All pixels, mutably. The length can't be changed through this.
  #[inline]
  #[must_use]
  pub fn pixels_mut(&mut self) -> &mut [u32] {
    &mut self.pixels
  }

  /// Takes the pixel vector out.
  #[inline]
  #[must_use]
  pub fn into_pixels(self) -> Vec<u32> {
    self.pixels
  }

  /// If the frame has zero area.
  #[inline]
  #[must_use]
  pub fn is_empty(&self) -> bool {
    self.pixels.is_empty()
  }

  /// Gets the pixel at the position, or `None` if the position is out of
  /// bounds.
  #[inline]
  #[must_use]
  pub fn get(&self, x: u32, y: u32) -> Option<u32> {
    if x < self.width && y < self.height {
      Some(self.pixels[xy_width_to_index(x, y, self.width)])
    } else {
      None
    }
  }

  /// Like [`get`](Self::get), but gives a mutable reference to the pixel.
  #[inline]
  #[must_use]
  pub fn get_mut(&mut self, x: u32, y: u32) -> Option<&mut u32> {
    if x < self.width && y < self.height {
      let i = xy_width_to_index(x, y, self.width);
      Some(&mut self.pixels[i])
    } else {
      None
    }
  }

  /// Sets the pixel at the position. Out of bounds positions are ignored and
  /// give `false`.
  #[inline]
  pub fn set(&mut self, x: u32, y: u32, pixel: u32) -> bool {
    match self.get_mut(x, y) {
      Some(p) => {
        *p = pixel;
        true
      }
      None => false,
    }
  }

  /// Sets every pixel to one value.
  #[inline]
  pub fn fill(&mut self, pixel: u32) {
    self.pixels.fill(pixel);
  }

  /// If any pixel isn't fully opaque.
  #[inline]
  #[must_use]
  pub fn has_transparency(&self) -> bool {
    self.pixels.iter().any(|p| p >> 24 != 0xFF)
  }

  /// Copies a `width x height` region out into a new frame.
  ///
  /// Gives `None` when the region doesn't fit inside this frame.
  #[must_use]
  pub fn clip(&self, x: u32, y: u32, width: u32, height: u32) -> Option<Frame> {
    let right = x.checked_add(width)?;
    let bottom = y.checked_add(height)?;
    if right > self.width || bottom > self.height {
      return None;
    }
    let mut pixels = Vec::with_capacity(xy_width_to_index(0, height, width));
    for row in y..bottom {
      let start = xy_width_to_index(x, row, self.width);
      pixels.extend_from_slice(&self.pixels[start..start + width as usize]);
    }
    Some(Frame { width, height, pixels })
  }

  /// Copies all of `src` into this frame with its top-left at `(x, y)`.
  ///
  /// Whatever part of `src` falls outside this frame is dropped.
  pub fn blit(&mut self, src: &Frame, x: u32, y: u32) {
    if x >= self.width || y >= self.height {
      return;
    }
    let w = src.width.min(self.width - x) as usize;
    let h = src.height.min(self.height - y);
    for row in 0..h {
      let s = xy_width_to_index(0, row, src.width);
      let d = xy_width_to_index(x, y + row, self.width);
      self.pixels[d..d + w].copy_from_slice(&src.pixels[s..s + w]);
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::ErrorKind;

  fn counting(width: u32, height: u32) -> Frame {
    Frame::from_pixels(width, height, (0..width * height).collect()).unwrap()
  }

  #[test]
  fn test_new_is_transparent() {
    let f = Frame::new(3, 2).unwrap();
    assert_eq!(f.pixels(), &[0; 6]);
    assert!(f.has_transparency());
    assert!(Frame::default().is_empty());
  }

  #[test]
  fn test_new_rejects_oversized() {
    let err = Frame::new(MAX_FRAME_SIZE + 1, 1).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ResourceLimit);
  }

  #[test]
  fn test_from_pixels_checks_length() {
    let err = Frame::from_pixels(2, 2, vec![0; 3]).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidFrame);
  }

  #[test]
  fn test_get_and_get_mut() {
    let mut f = counting(4, 3);
    assert_eq!(f.get(1, 2), Some(9));
    assert_eq!(f.get(4, 0), None);
    *f.get_mut(3, 0).unwrap() = 0xFFFF_FFFF;
    assert_eq!(f.pixels()[3], 0xFFFF_FFFF);
  }

  #[test]
  fn test_rgba_bytes() {
    let f = Frame::from_pixels(1, 1, vec![0x4433_2211]).unwrap();
    assert_eq!(f.to_rgba_bytes(), [0x11, 0x22, 0x33, 0x44]);
    assert_eq!(Frame::from_rgba_bytes(1, 1, &[0x11, 0x22, 0x33, 0x44]).unwrap(), f);
    assert!(Frame::from_rgba_bytes(1, 1, &[0; 3]).is_err());
  }

  #[test]
  fn test_clip() {
    let f = counting(4, 4);
    let c = f.clip(1, 2, 2, 2).unwrap();
    assert_eq!(c.pixels(), &[9, 10, 13, 14]);
    assert!(f.clip(3, 0, 2, 1).is_none());
    assert!(f.clip(u32::MAX, 0, 2, 1).is_none());
  }

  #[test]
  fn test_blit_clips_to_destination() {
    let mut dst = Frame::new(3, 3).unwrap();
    dst.blit(&counting(2, 2), 2, 1);
    assert_eq!(dst.pixels(), &[0, 0, 0, 0, 0, 0, 0, 0, 2]);
  }
}
