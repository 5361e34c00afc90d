use bytemuck::cast_slice;

use super::*;

/// The pixel layouts this decoder understands.
///
/// 4-bit indexed pixels are packed two per byte, with the left pixel in the
/// high bits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PngPixelFormat {
  I4,
  I8,
  RGB8,
  RGBA8,
}
impl PngPixelFormat {
  /// Bits in a single pixel.
  #[inline]
  #[must_use]
  pub const fn bits_per_pixel(self) -> usize {
    match self {
      Self::I4 => 4,
      Self::I8 => 8,
      Self::RGB8 => 24,
      Self::RGBA8 => 32,
    }
  }

  /// Distance between corresponding bytes of neighboring pixels, for
  /// filtering. Never less than 1.
  #[inline]
  #[must_use]
  pub const fn filter_chunk_size(self) -> usize {
    let bytes = self.bits_per_pixel() / 8;
    if bytes == 0 {
      1
    } else {
      bytes
    }
  }

  /// Bytes of pixel data in a scanline, not counting the filter byte.
  #[inline]
  #[must_use]
  pub const fn bytes_per_scanline(self, width: u32) -> usize {
    (width as usize * self.bits_per_pixel() + 7) / 8
  }

  #[inline]
  #[must_use]
  pub const fn is_indexed(self) -> bool {
    matches!(self, Self::I4 | Self::I8)
  }
}

/// `IHDR`: Image header
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct IHDR {
  pub width: u32,
  pub height: u32,
  pub pixel_format: PngPixelFormat,
}
impl IHDR {
  /// Parses the 13 header bytes.
  ///
  /// ## Failure
  /// * `CorruptStream`: wrong data length, or a zero dimension.
  /// * `UnsupportedFeature`: grayscale, 16-bit, 1 and 2 bit, 4-bit direct
  ///   color, interlacing, or an unknown compression or filter method.
  /// * `ResourceLimit`: a side longer than [`MAX_FRAME_SIZE`].
  pub fn parse(data: &[u8]) -> ArchiveResult<Self> {
    let [w0, w1, w2, w3, h0, h1, h2, h3, bit_depth, color_type, compression, filter, interlace] =
      *data
    else {
      return Err(ArchiveError::corrupt(format!("IHDR has {} bytes, expected 13", data.len())));
    };
    let width = u32::from_be_bytes([w0, w1, w2, w3]);
    let height = u32::from_be_bytes([h0, h1, h2, h3]);
    if width == 0 || height == 0 {
      return Err(ArchiveError::corrupt(format!("image size {width}x{height}")));
    }
    let pixel_format = match (bit_depth, color_type) {
      (4, 3) => PngPixelFormat::I4,
      (8, 3) => PngPixelFormat::I8,
      (8, 2) => PngPixelFormat::RGB8,
      (8, 6) => PngPixelFormat::RGBA8,
      (_, 0 | 4) => return Err(ArchiveError::unsupported("grayscale images")),
      (4, _) => return Err(ArchiveError::unsupported("4-bit direct color")),
      (d, 2 | 3 | 6) => return Err(ArchiveError::unsupported(format!("bit depth {d}"))),
      (_, c) => return Err(ArchiveError::unsupported(format!("color type {c}"))),
    };
    if compression != 0 {
      return Err(ArchiveError::unsupported(format!("compression method {compression}")));
    }
    if filter != 0 {
      return Err(ArchiveError::unsupported(format!("filter method {filter}")));
    }
    if interlace != 0 {
      return Err(ArchiveError::unsupported("interlaced images"));
    }
    check_dimensions(width, height, MAX_FRAME_SIZE)?;
    Ok(Self { width, height, pixel_format })
  }

  /// Size of the inflated image data: every scanline plus its filter byte.
  #[inline]
  #[must_use]
  pub const fn zlib_output_len(&self) -> usize {
    self.height as usize * (1 + self.pixel_format.bytes_per_scanline(self.width))
  }

  /// The 13 data bytes of an `IHDR` for an 8-bit RGBA image.
  #[inline]
  #[must_use]
  pub fn rgba8_bytes(width: u32, height: u32) -> [u8; 13] {
    let mut out = [0_u8; 13];
    out[0..4].copy_from_slice(&width.to_be_bytes());
    out[4..8].copy_from_slice(&height.to_be_bytes());
    out[8] = 8;
    out[9] = 6;
    out
  }
}

/// `PLTE`: Palette
///
/// If you want to have a paletted image with transparency then the transparency
/// info goes in a separate `tRNS` chunk.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct PLTE<'b>(&'b [RGB888]);
impl<'b> PLTE<'b> {
  /// ## Failure
  /// * `CorruptStream` if the data isn't 1 to 256 whole entries.
  pub fn parse(data: &'b [u8]) -> ArchiveResult<Self> {
    if data.is_empty() || data.len() % 3 != 0 || data.len() > 256 * 3 {
      return Err(ArchiveError::corrupt(format!("PLTE of {} bytes", data.len())));
    }
    Ok(Self(cast_slice(data)))
  }

  #[inline]
  #[must_use]
  pub const fn entries(&self) -> &'b [RGB888] {
    self.0
  }

  /// Combines the palette with `tRNS` alpha values into packed pixels.
  ///
  /// Entries without an alpha value are opaque.
  #[must_use]
  pub fn to_pixels(&self, trns: Option<&[u8]>) -> Vec<u32> {
    let alphas = trns.unwrap_or(&[]);
    self
      .0
      .iter()
      .enumerate()
      .map(|(i, rgb)| rgb.with_alpha(alphas.get(i).copied().unwrap_or(u8::MAX)).to_pixel())
      .collect()
  }
}
impl Debug for PLTE<'_> {
  #[inline]
  fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
    // currently prints no more than 4 palette entries
    f.debug_tuple("PLTE").field(&&self.0[..self.0.len().min(4)]).field(&self.0.len()).finish()
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::ErrorKind;

  fn ihdr(width: u32, height: u32, depth: u8, color: u8) -> [u8; 13] {
    let mut out = IHDR::rgba8_bytes(width, height);
    out[8] = depth;
    out[9] = color;
    out
  }

  #[test]
  fn test_ihdr_formats() {
    let h = IHDR::parse(&ihdr(3, 2, 4, 3)).unwrap();
    assert_eq!(h.pixel_format, PngPixelFormat::I4);
    assert_eq!(h.zlib_output_len(), 2 * (1 + 2));
    let h = IHDR::parse(&ihdr(3, 2, 8, 2)).unwrap();
    assert_eq!(h.zlib_output_len(), 2 * (1 + 9));
    assert_eq!(h.pixel_format.filter_chunk_size(), 3);
    assert_eq!(PngPixelFormat::I4.filter_chunk_size(), 1);
  }

  #[test]
  fn test_ihdr_rejections() {
    for (bytes, kind) in [
      (ihdr(1, 1, 8, 0), ErrorKind::UnsupportedFeature),
      (ihdr(1, 1, 8, 4), ErrorKind::UnsupportedFeature),
      (ihdr(1, 1, 4, 2), ErrorKind::UnsupportedFeature),
      (ihdr(1, 1, 4, 6), ErrorKind::UnsupportedFeature),
      (ihdr(1, 1, 16, 6), ErrorKind::UnsupportedFeature),
      (ihdr(1, 1, 2, 3), ErrorKind::UnsupportedFeature),
      (ihdr(0, 1, 8, 6), ErrorKind::CorruptStream),
      (ihdr(4097, 1, 8, 6), ErrorKind::ResourceLimit),
    ] {
      assert_eq!(IHDR::parse(&bytes).unwrap_err().kind(), kind, "{bytes:?}");
    }
    let mut interlaced = ihdr(1, 1, 8, 6);
    interlaced[12] = 1;
    assert_eq!(IHDR::parse(&interlaced).unwrap_err().kind(), ErrorKind::UnsupportedFeature);
    assert_eq!(IHDR::parse(&[0; 12]).unwrap_err().kind(), ErrorKind::CorruptStream);
  }

  #[test]
  fn test_plte_with_trns() {
    let plte = PLTE::parse(&[1, 2, 3, 4, 5, 6]).unwrap();
    assert_eq!(plte.entries().len(), 2);
    assert_eq!(plte.to_pixels(Some(&[0x80])), [0x8003_0201, 0xFF06_0504]);
    assert!(PLTE::parse(&[1, 2]).is_err());
    assert!(PLTE::parse(&[0; 771]).is_err());
  }
}
