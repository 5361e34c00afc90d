use super::*;

/// Writes a [`FrameSet`] as an 8-bit RGBA PNG sprite sheet.
///
/// All frames are placed left to right along the top of the image, and an
/// `obLT` chunk records where each one is. Frames shorter than the tallest
/// frame leave transparent space below them.
///
/// ```
/// # use spritearc::{Frame, FrameSet, png::*};
/// let set = FrameSet::from_frames(vec![Frame::new(3, 2).unwrap()]);
/// let png = PngEncoder::new().with_filter(PngFilter::Paeth).encode(&set).unwrap();
/// assert!(is_png_header_correct(&png));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PngEncoder {
  filter: PngFilter,
  compression_level: u8,
}
impl Default for PngEncoder {
  #[inline]
  fn default() -> Self {
    Self::new()
  }
}
impl PngEncoder {
  /// No filtering, zlib level 6.
  #[inline]
  #[must_use]
  pub const fn new() -> Self {
    Self { filter: PngFilter::None, compression_level: DEFAULT_COMPRESSION_LEVEL }
  }

  /// Sets the filter applied to every scanline.
  #[inline]
  #[must_use]
  pub const fn with_filter(self, filter: PngFilter) -> Self {
    Self { filter, ..self }
  }

  /// Sets the zlib level, `0..=10`. Higher values are clamped.
  #[inline]
  #[must_use]
  pub const fn with_compression_level(self, level: u8) -> Self {
    Self { compression_level: if level > 10 { 10 } else { level }, ..self }
  }

  #[inline]
  #[must_use]
  pub const fn filter(&self) -> PngFilter {
    self.filter
  }

  #[inline]
  #[must_use]
  pub const fn compression_level(&self) -> u8 {
    self.compression_level
  }

  /// ## Failure
  /// * `InvalidFrame` for an empty set, or a frame with zero area.
  /// * `ResourceLimit` if the combined image is wider or taller than
  ///   [`MAX_FRAME_SIZE`].
  pub fn encode(&self, set: &FrameSet) -> ArchiveResult<Vec<u8>> {
    let sheet = build_sheet(set.frames())?;
    let layout = SpriteLayout::strip_of(set.frames())?;
    log::debug!("PNG: writing {}x{} sheet of {} frames", sheet.width(), sheet.height(), set.len());

    let raw = sheet.to_rgba_bytes();
    let stride = sheet.width() as usize * 4;
    let mut filtered = Vec::with_capacity(raw.len() + sheet.height() as usize);
    let zeroes = vec![0_u8; stride];
    let mut prev: &[u8] = &zeroes;
    for line in raw.chunks_exact(stride) {
      filter_scanline(self.filter, line, prev, 4, &mut filtered);
      prev = line;
    }
    let compressed = deflate_zlib(&filtered, self.compression_level);

    let mut out = Vec::with_capacity(compressed.len() + 128);
    out.extend_from_slice(&PNG_SIGNATURE);
    write_chunk(&mut out, PngChunkType::IHDR, &IHDR::rgba8_bytes(sheet.width(), sheet.height()))?;
    for idat in compressed.chunks(IDAT_CHUNK_LIMIT) {
      write_chunk(&mut out, PngChunkType::IDAT, idat)?;
    }
    write_chunk(&mut out, PngChunkType::obLT, &layout.to_bytes())?;
    write_chunk(&mut out, PngChunkType::IEND, &[])?;
    Ok(out)
  }
}

/// Lays the frames out left to right on one transparent frame.
fn build_sheet(frames: &[Frame]) -> ArchiveResult<Frame> {
  if frames.is_empty() {
    return Err(ArchiveError::invalid_frame("no frames to write"));
  }
  if let Some(n) = frames.iter().position(Frame::is_empty) {
    return Err(ArchiveError::invalid_frame(format!("frame {n} has zero area")));
  }
  let total_width: u64 = frames.iter().map(|f| u64::from(f.width())).sum();
  let max_height = frames.iter().map(Frame::height).max().unwrap_or(0);
  if total_width > u64::from(MAX_FRAME_SIZE) || max_height > MAX_FRAME_SIZE {
    return Err(ArchiveError::limit(format!(
      "sprite sheet would be {total_width}x{max_height}, the limit is {MAX_FRAME_SIZE}"
    )));
  }
  let mut sheet = Frame::new(total_width as u32, max_height)?;
  let mut x = 0;
  for f in frames {
    sheet.blit(f, x, 0);
    x += f.width();
  }
  Ok(sheet)
}
