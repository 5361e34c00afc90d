use super::*;

/// A four byte PNG chunk type.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct PngChunkType(pub [u8; 4]);
#[allow(nonstandard_style)]
impl PngChunkType {
  pub const IHDR: Self = Self(*b"IHDR");
  pub const PLTE: Self = Self(*b"PLTE");
  pub const IDAT: Self = Self(*b"IDAT");
  pub const IEND: Self = Self(*b"IEND");
  pub const tRNS: Self = Self(*b"tRNS");
  /// The private sprite layout chunk.
  pub const obLT: Self = Self(*b"obLT");

  /// Critical chunks have an uppercase first letter.
  #[inline]
  #[must_use]
  pub const fn is_critical(self) -> bool {
    self.0[0].is_ascii_uppercase()
  }
}
impl Debug for PngChunkType {
  fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
    for b in self.0 {
      f.write_char(b as char)?;
    }
    Ok(())
  }
}

/// An unparsed chunk from a PNG.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RawPngChunk<'b> {
  pub(crate) type_: PngChunkType,
  pub(crate) data: &'b [u8],
  pub(crate) declared_crc: u32,
}
impl Debug for RawPngChunk<'_> {
  #[inline]
  fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
    f.debug_struct("RawPngChunk")
      .field("type_", &self.type_)
      .field("data", &(&self.data[..self.data.len().min(12)], self.data.len()))
      .field("declared_crc", &self.declared_crc)
      .finish()
  }
}
impl<'b> RawPngChunk<'b> {
  /// The chunk's type.
  #[inline]
  #[must_use]
  pub const fn chunk_type(&self) -> PngChunkType {
    self.type_
  }

  /// The chunk's data bytes.
  #[inline]
  #[must_use]
  pub const fn data(&self) -> &'b [u8] {
    self.data
  }

  /// The CRC the stream claims for this chunk.
  #[inline]
  #[must_use]
  pub const fn declared_crc(&self) -> u32 {
    self.declared_crc
  }

  /// The CRC of the type and data bytes as they actually are.
  #[inline]
  #[must_use]
  pub fn actual_crc(&self) -> u32 {
    Crc32::new().update(&self.type_.0).update(self.data).finish()
  }

  /// If the declared CRC is correct.
  #[inline]
  #[must_use]
  pub fn crc_matches(&self) -> bool {
    self.actual_crc() == self.declared_crc
  }
}

/// An iterator that produces successive raw chunks from PNG bytes.
///
/// This never panics, whatever the input. Iteration just stops at the first
/// chunk that doesn't fit in the remaining bytes; check
/// [`remaining`](Self::remaining) afterwards to spot truncation.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct RawPngChunkIter<'b>(&'b [u8]);
impl<'b> RawPngChunkIter<'b> {
  /// Pass the full PNG bytes, it will remove the PNG signature automatically.
  ///
  /// The signature isn't checked, see [`is_png_header_correct`].
  #[inline]
  pub const fn new(bytes: &'b [u8]) -> Self {
    match bytes {
      [_, _, _, _, _, _, _, _, rest @ ..] => Self(rest),
      _ => Self(&[]),
    }
  }

  /// Bytes that haven't been consumed as chunks yet.
  #[inline]
  #[must_use]
  pub const fn remaining(&self) -> &'b [u8] {
    self.0
  }
}
impl<'b> Iterator for RawPngChunkIter<'b> {
  type Item = RawPngChunk<'b>;
  #[inline]
  fn next(&mut self) -> Option<Self::Item> {
    let (chunk_len, rest) = try_pull_u32_be(self.0).ok()?;
    let (type_bytes, rest) = try_pull_byte_array::<4>(rest).ok()?;
    let (data, rest) = try_pull_slice(rest, chunk_len as usize).ok()?;
    let (declared_crc, rest) = try_pull_u32_be(rest).ok()?;
    self.0 = rest;
    Some(RawPngChunk { type_: PngChunkType(type_bytes), data, declared_crc })
  }
}

/// Appends one complete chunk (length, type, data, CRC) to `out`.
///
/// ## Failure
/// * `ResourceLimit` if the data is longer than PNG allows (`2^31 - 1`).
pub fn write_chunk(out: &mut Vec<u8>, type_: PngChunkType, data: &[u8]) -> ArchiveResult<()> {
  let len = u32::try_from(data.len())
    .ok()
    .filter(|&l| l <= i32::MAX as u32)
    .ok_or_else(|| ArchiveError::limit(format!("{type_:?} chunk of {} bytes", data.len())))?;
  out.extend_from_slice(&len.to_be_bytes());
  out.extend_from_slice(&type_.0);
  out.extend_from_slice(data);
  let crc = Crc32::new().update(&type_.0).update(data).finish();
  out.extend_from_slice(&crc.to_be_bytes());
  Ok(())
}
