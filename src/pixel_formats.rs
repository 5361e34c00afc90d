//! Module for pixel formats.
//!
//! Frames store each pixel as a packed `u32` whose little-endian bytes are
//! red, green, blue, alpha (so the value reads `0xAABBGGRR`). Alpha is
//! straight, not premultiplied. A value of `0` is the fully transparent pixel
//! that padding and blank frames are filled with.
//!
//! The byte structs here are the views that file formats actually store, and
//! they convert to and from the packed form.

use bytemuck::{Pod, Zeroable};

/// The fully transparent pixel.
pub const TRANSPARENT: u32 = 0;

/// An opaque black pixel.
pub const OPAQUE_BLACK: u32 = 0xFF00_0000;

/// An RGB value, 8-bits per channel.
///
/// This is the layout of palette entries in PNG `PLTE` chunks.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[derive(Zeroable, Pod)]
#[repr(C)]
#[allow(missing_docs)]
pub struct RGB888 {
  pub r: u8,
  pub g: u8,
  pub b: u8,
}
impl RGB888 {
  /// Packs this color with the alpha given.
  #[inline]
  #[must_use]
  pub const fn with_alpha(self, a: u8) -> RGBA8888 {
    RGBA8888 { r: self.r, g: self.g, b: self.b, a }
  }
}

/// An RGBA value, 8-bits per channel.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[derive(Zeroable, Pod)]
#[repr(C)]
#[allow(missing_docs)]
pub struct RGBA8888 {
  pub r: u8,
  pub g: u8,
  pub b: u8,
  pub a: u8,
}
impl RGBA8888 {
  /// Converts to the packed pixel form used by frames.
  #[inline]
  #[must_use]
  pub const fn to_pixel(self) -> u32 {
    u32::from_le_bytes([self.r, self.g, self.b, self.a])
  }

  /// Unpacks a frame pixel.
  #[inline]
  #[must_use]
  pub const fn from_pixel(pixel: u32) -> Self {
    let [r, g, b, a] = pixel.to_le_bytes();
    Self { r, g, b, a }
  }
}
impl From<RGB888> for RGBA8888 {
  #[inline]
  #[must_use]
  fn from(RGB888 { r, g, b }: RGB888) -> Self {
    Self { r, g, b, a: 0xFF }
  }
}
impl From<u32> for RGBA8888 {
  #[inline]
  #[must_use]
  fn from(pixel: u32) -> Self {
    Self::from_pixel(pixel)
  }
}
impl From<RGBA8888> for u32 {
  #[inline]
  #[must_use]
  fn from(rgba: RGBA8888) -> Self {
    rgba.to_pixel()
  }
}

#[test]
fn test_pixel_packing_is_abgr() {
  let c = RGBA8888 { r: 0x11, g: 0x22, b: 0x33, a: 0x44 };
  assert_eq!(c.to_pixel(), 0x4433_2211);
  assert_eq!(RGBA8888::from_pixel(0x4433_2211), c);
  assert_eq!(RGBA8888::from(RGB888 { r: 1, g: 2, b: 3 }).to_pixel(), 0xFF03_0201);
}
