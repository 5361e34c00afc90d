use super::*;

/// Everything the decoder keeps from the chunk walk.
#[derive(Debug, Default)]
struct PngParts<'b> {
  ihdr: Option<IHDR>,
  plte: Option<PLTE<'b>>,
  trns: Option<&'b [u8]>,
  idat: Vec<u8>,
  layout: Option<SpriteLayout>,
}

/// Decodes PNG bytes into a [`FrameSet`].
///
/// With an `obLT` chunk present the image is cut into that chunk's frames,
/// otherwise the whole (padded) image is the only frame.
///
/// ## Failure
/// * `FormatMismatch` if the PNG signature is wrong.
/// * `CorruptStream` for a CRC mismatch, truncation, a missing `IHDR`,
///   `IDAT`, `IEND` (or `PLTE` for indexed color), or a bad layout unit.
/// * `UnsupportedFeature` for pixel formats this crate doesn't handle.
/// * `ResourceLimit` for images larger than [`MAX_FRAME_SIZE`].
pub fn decode_png(png: &[u8]) -> ArchiveResult<FrameSet> {
  if !is_png_header_correct(png) {
    return Err(ArchiveError::FormatMismatch);
  }
  let parts = walk_chunks(png)?;
  let ihdr = parts.ihdr.ok_or_else(|| ArchiveError::corrupt("missing IHDR"))?;
  if parts.idat.is_empty() {
    return Err(ArchiveError::corrupt("missing IDAT"));
  }
  let palette = match (ihdr.pixel_format.is_indexed(), parts.plte) {
    (true, None) => return Err(ArchiveError::corrupt("indexed image without PLTE")),
    (true, Some(plte)) => plte.to_pixels(parts.trns),
    (false, _) => Vec::new(),
  };
  let filtered = inflate_zlib_exact(&parts.idat, ihdr.zlib_output_len())?;
  let sheet = unfilter_to_frame(ihdr, &filtered, &palette)?;

  let frames = match parts.layout {
    Some(layout) if !layout.is_empty() => layout.explode(&sheet)?,
    _ => alloc::vec![sheet],
  };
  log::debug!("PNG: {}x{} image, {} frames", ihdr.width, ihdr.height, frames.len());
  Ok(FrameSet::from_frames(frames))
}

fn walk_chunks(png: &[u8]) -> ArchiveResult<PngParts<'_>> {
  let mut parts = PngParts::default();
  let mut it = RawPngChunkIter::new(png);
  for chunk in it.by_ref() {
    if !chunk.crc_matches() {
      return Err(ArchiveError::corrupt(format!(
        "{:?} chunk CRC is {:08X}, expected {:08X}",
        chunk.chunk_type(),
        chunk.declared_crc(),
        chunk.actual_crc()
      )));
    }
    match chunk.chunk_type() {
      PngChunkType::IHDR => {
        if parts.ihdr.is_some() {
          return Err(ArchiveError::corrupt("more than one IHDR"));
        }
        parts.ihdr = Some(IHDR::parse(chunk.data())?);
      }
      PngChunkType::PLTE => parts.plte = Some(PLTE::parse(chunk.data())?),
      PngChunkType::tRNS => parts.trns = Some(chunk.data()),
      PngChunkType::IDAT => {
        if parts.ihdr.is_none() {
          return Err(ArchiveError::corrupt("IDAT before IHDR"));
        }
        parts.idat.extend_from_slice(chunk.data());
      }
      PngChunkType::obLT => parts.layout = Some(SpriteLayout::parse(chunk.data())?),
      PngChunkType::IEND => {
        if !it.remaining().is_empty() {
          log::warn!("Extra data after IEND; ignoring {} bytes", it.remaining().len());
        }
        return Ok(parts);
      }
      other if other.is_critical() => {
        return Err(ArchiveError::unsupported(format!("critical chunk {other:?}")));
      }
      other => log::debug!("skipping {other:?} chunk"),
    }
  }
  if it.remaining().is_empty() {
    Err(ArchiveError::corrupt("missing IEND"))
  } else {
    Err(ArchiveError::corrupt("truncated chunk"))
  }
}

/// Unfilters the inflated scanlines straight into a padded frame.
fn unfilter_to_frame(ihdr: IHDR, filtered: &[u8], palette: &[u32]) -> ArchiveResult<Frame> {
  let (width, height) = (ihdr.width, ihdr.height);
  let mut sheet = Frame::new(pad_to_cell(width), pad_to_cell(height))?;
  let sheet_width = sheet.width() as usize;
  let format = ihdr.pixel_format;
  let stride = format.bytes_per_scanline(width);
  let lookup = |index: u8| palette.get(usize::from(index)).copied().unwrap_or(OPAQUE_BLACK);

  let mut arena = ScanlineArena::new(stride, format.filter_chunk_size());
  for (y, filtered_line) in filtered.chunks_exact(1 + stride).enumerate() {
    let line = arena.next_line(filtered_line)?;
    let row = &mut sheet.pixels_mut()[y * sheet_width..][..width as usize];
    match format {
      PngPixelFormat::I8 => {
        row.iter_mut().zip(line).for_each(|(p, &i)| *p = lookup(i));
      }
      PngPixelFormat::I4 => {
        let indexes = line.iter().flat_map(|&byte| [byte >> 4, byte & 0xF]);
        row.iter_mut().zip(indexes).for_each(|(p, i)| *p = lookup(i));
      }
      PngPixelFormat::RGB8 => {
        let rgb: &[RGB888] = bytemuck::cast_slice(line);
        row.iter_mut().zip(rgb).for_each(|(p, c)| *p = c.with_alpha(u8::MAX).to_pixel());
      }
      PngPixelFormat::RGBA8 => {
        let rgba: &[RGBA8888] = bytemuck::cast_slice(line);
        row.iter_mut().zip(rgba).for_each(|(p, c)| *p = c.to_pixel());
      }
    }
  }
  Ok(sheet)
}

/// Rounds up to a multiple of 8.
#[inline]
#[must_use]
const fn pad_to_cell(n: u32) -> u32 {
  (n + 7) & !7
}
