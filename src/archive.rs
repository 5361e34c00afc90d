#![forbid(unsafe_code)]

//! The native `OBL5` frame set archive.
//!
//! Every integer is little-endian. The file opens with an [`ArchiveHeader`]
//! (`"OBL5"`, frame count, version) and the version picks the body layout:
//!
//! * [`ArchiveVersion::Unpacked`] (`0x500`): one record per frame, each an
//!   [`FrameRecordHeader`] followed by that frame's own zlib stream. No tags.
//! * [`ArchiveVersion::Solid`] (`0x501`): the size of one shared zlib blob,
//!   then every frame's `(width, height)` as a pair of `u16`, then the blob
//!   (all frames' RGBA bytes back to back), then the tag table.
//!
//! Tag table strings use a stepped length prefix: a `u8` when the length is
//! below `0xFF`, otherwise `0xFF` then a `u16` when below `0xFFFF`, otherwise
//! `0xFF`, `0xFFFF`, then a `u32`.

use alloc::{
  format,
  string::{String, ToString},
  vec::Vec,
};

use bytemuck::{Pod, Zeroable};
use pack1::{U16LE, U32LE};

use crate::{
  compression::{deflate_zlib, inflate_zlib_exact, DEFAULT_COMPRESSION_LEVEL},
  frame::check_dimensions,
  parser_helpers::*,
  ArchiveError, ArchiveResult, Frame, FrameSet, MAX_FRAME_SIZE, UUID_TAG,
};

/// The four bytes every archive starts with.
pub const ARCHIVE_SIGNATURE: [u8; 4] = *b"OBL5";

/// Most frames an archive (or any importer) will accept.
pub const MAX_FRAMES: usize = 8192;

/// Most tags an archive may carry.
pub const MAX_TAGS: usize = 100;

/// Longest tag key, in bytes.
pub const TAG_KEY_MAX: usize = 255;

/// Longest tag value, in bytes.
pub const TAG_VAL_MAX: usize = 4096;

/// Largest total of inflated pixel bytes in one archive.
const MAX_TOTAL_BYTES: u64 = i32::MAX as u64;

/// The two archive body layouts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u32)]
pub enum ArchiveVersion {
  /// Each frame compressed on its own, no tags.
  Unpacked = 0x500,
  /// All frames in one compressed blob, with tags.
  Solid = 0x501,
}
impl Default for ArchiveVersion {
  #[inline]
  fn default() -> Self {
    Self::Solid
  }
}
impl ArchiveVersion {
  /// The version number stored in the header.
  #[inline]
  #[must_use]
  pub const fn to_u32(self) -> u32 {
    self as u32
  }
}
impl TryFrom<u32> for ArchiveVersion {
  type Error = ArchiveError;
  #[inline]
  fn try_from(value: u32) -> Result<Self, Self::Error> {
    match value {
      0x500 => Ok(Self::Unpacked),
      0x501 => Ok(Self::Solid),
      other => Err(ArchiveError::unsupported(format!("archive version {other:#x}"))),
    }
  }
}

/// The fixed 12-byte start of an archive.
#[derive(Debug, Clone, Copy, Zeroable, Pod)]
#[repr(C)]
pub struct ArchiveHeader {
  /// Always `"OBL5"`.
  pub signature: [u8; 4],
  /// Number of frames in the body.
  pub frame_count: U32LE,
  /// One of the [`ArchiveVersion`] values.
  pub version: U32LE,
}

/// The 12 bytes ahead of each frame in an unpacked archive.
#[derive(Debug, Clone, Copy, Zeroable, Pod)]
#[repr(C)]
pub struct FrameRecordHeader {
  /// Frame width in pixels.
  pub width: U16LE,
  /// Frame height in pixels.
  pub height: U16LE,
  /// Always zero.
  pub filler: U32LE,
  /// Bytes of zlib data that follow.
  pub compressed_size: U32LE,
}

/// One frame of an unpacked archive, still compressed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameRecord {
  /// Frame width in pixels.
  pub width: u16,
  /// Frame height in pixels.
  pub height: u16,
  /// zlib stream of the frame's RGBA bytes.
  pub compressed: Vec<u8>,
}

impl FrameRecord {
  /// Compresses a frame into a record.
  ///
  /// ## Failure
  /// * `InvalidFrame` if the frame has zero area.
  /// * `ResourceLimit` if it's bigger than [`MAX_FRAME_SIZE`].
  pub fn from_frame(frame: &Frame) -> ArchiveResult<Self> {
    let (width, height) = storable_dimensions(frame)?;
    let compressed = deflate_zlib(&frame.to_rgba_bytes(), DEFAULT_COMPRESSION_LEVEL);
    Ok(Self { width, height, compressed })
  }

  /// Inflates the record back into a frame.
  pub fn to_frame(&self) -> ArchiveResult<Frame> {
    let expected = frame_byte_len(self.width, self.height)?;
    let rgba = inflate_zlib_exact(&self.compressed, expected)?;
    Frame::from_rgba_bytes(u32::from(self.width), u32::from(self.height), &rgba)
  }

  /// Appends the header and compressed bytes.
  pub fn write_to(&self, out: &mut Vec<u8>) -> ArchiveResult<()> {
    let compressed_size = u32::try_from(self.compressed.len())
      .map_err(|_| ArchiveError::limit("compressed frame is over 4GiB"))?;
    out.extend_from_slice(&self.width.to_le_bytes());
    out.extend_from_slice(&self.height.to_le_bytes());
    out.extend_from_slice(&0_u32.to_le_bytes());
    out.extend_from_slice(&compressed_size.to_le_bytes());
    out.extend_from_slice(&self.compressed);
    Ok(())
  }

  /// Parses one record off the front of `bytes`, giving back the rest.
  pub fn parse(bytes: &[u8]) -> ArchiveResult<(Self, &[u8])> {
    let (header, rest) = try_pull_pod::<FrameRecordHeader>(bytes)?;
    let width = header.width.get();
    let height = header.height.get();
    if header.filler.get() != 0 {
      return Err(ArchiveError::corrupt(format!("invalid filler {:#x}", header.filler.get())));
    }
    // validates the dimensions before the data is touched
    frame_byte_len(width, height)?;
    let (data, rest) = try_pull_slice(rest, header.compressed_size.get() as usize)?;
    Ok((Self { width, height, compressed: data.to_vec() }, rest))
  }
}

/// The body of an archive, one variant per [`ArchiveVersion`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArchiveBody {
  /// Per-frame compressed records.
  Unpacked {
    /// The records, in frame order.
    frames: Vec<FrameRecord>,
  },
  /// One zlib stream over every frame's RGBA bytes.
  Solid {
    /// The compressed blob.
    blob: Vec<u8>,
    /// `(width, height)` of each frame, in order.
    sizes: Vec<(u16, u16)>,
  },
}

impl ArchiveBody {
  /// Compresses frames into the chosen layout.
  pub fn from_frames(frames: &[Frame], version: ArchiveVersion) -> ArchiveResult<Self> {
    check_frame_count(frames.len())?;
    match version {
      ArchiveVersion::Unpacked => Ok(Self::Unpacked {
        frames: frames.iter().map(FrameRecord::from_frame).collect::<ArchiveResult<_>>()?,
      }),
      ArchiveVersion::Solid => {
        let mut sizes = Vec::with_capacity(frames.len());
        let mut total = 0_u64;
        for frame in frames {
          let (w, h) = storable_dimensions(frame)?;
          total += frame_byte_len(w, h)? as u64;
          sizes.push((w, h));
        }
        if total > MAX_TOTAL_BYTES {
          return Err(ArchiveError::limit(format!("{total} bytes of pixels in one archive")));
        }
        let mut raw = Vec::with_capacity(total as usize);
        for frame in frames {
          raw.extend_from_slice(&frame.to_rgba_bytes());
        }
        Ok(Self::Solid { blob: deflate_zlib(&raw, DEFAULT_COMPRESSION_LEVEL), sizes })
      }
    }
  }

  /// Which version this body is written as.
  #[inline]
  #[must_use]
  pub const fn version(&self) -> ArchiveVersion {
    match self {
      Self::Unpacked { .. } => ArchiveVersion::Unpacked,
      Self::Solid { .. } => ArchiveVersion::Solid,
    }
  }

  /// Number of frames described.
  #[inline]
  #[must_use]
  pub fn frame_count(&self) -> usize {
    match self {
      Self::Unpacked { frames } => frames.len(),
      Self::Solid { sizes, .. } => sizes.len(),
    }
  }

  /// Inflates every frame.
  ///
  /// For a solid body the inflated blob has to be exactly the sum of the
  /// frame sizes, anything else is a `CorruptStream`.
  pub fn into_frames(self) -> ArchiveResult<Vec<Frame>> {
    match self {
      Self::Unpacked { frames } => frames.iter().map(FrameRecord::to_frame).collect(),
      Self::Solid { blob, sizes } => {
        let mut total = 0_u64;
        for &(w, h) in &sizes {
          total += frame_byte_len(w, h)? as u64;
        }
        if total > MAX_TOTAL_BYTES {
          return Err(ArchiveError::limit(format!("{total} bytes of pixels in one archive")));
        }
        let raw = inflate_zlib_exact(&blob, total as usize)?;
        let mut rest = raw.as_slice();
        let mut out = Vec::with_capacity(sizes.len());
        for (n, &(w, h)) in sizes.iter().enumerate() {
          let len = frame_byte_len(w, h)?;
          let (head, tail) = try_pull_slice(rest, len)
            .map_err(|_| ArchiveError::corrupt(format!("inflated data truncated at frame {n}")))?;
          out.push(Frame::from_rgba_bytes(u32::from(w), u32::from(h), head)?);
          rest = tail;
        }
        Ok(out)
      }
    }
  }

  fn write_to(&self, out: &mut Vec<u8>) -> ArchiveResult<()> {
    match self {
      Self::Unpacked { frames } => {
        for record in frames {
          record.write_to(out)?;
        }
      }
      Self::Solid { blob, sizes } => {
        let blob_size =
          u32::try_from(blob.len()).map_err(|_| ArchiveError::limit("compressed blob is over 4GiB"))?;
        out.extend_from_slice(&blob_size.to_le_bytes());
        for (w, h) in sizes {
          out.extend_from_slice(&w.to_le_bytes());
          out.extend_from_slice(&h.to_le_bytes());
        }
        out.extend_from_slice(blob);
      }
    }
    Ok(())
  }
}

/// A fully parsed archive that hasn't been inflated yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Archive {
  /// The frame data.
  pub body: ArchiveBody,
  /// Tags, in stored order. Always empty for unpacked archives.
  pub tags: Vec<(String, String)>,
}

impl Archive {
  /// Parses the archive structure, giving back any trailing bytes.
  ///
  /// Nothing is inflated here, but every size is checked.
  pub fn parse(bytes: &[u8]) -> ArchiveResult<(Self, &[u8])> {
    let (header, rest) = try_pull_pod::<ArchiveHeader>(bytes)?;
    if header.signature != ARCHIVE_SIGNATURE {
      return Err(ArchiveError::FormatMismatch);
    }
    let count = header.frame_count.get() as usize;
    if count == 0 {
      return Err(ArchiveError::corrupt("archive declares no frames"));
    }
    check_frame_count(count)?;
    let version = ArchiveVersion::try_from(header.version.get())?;
    log::debug!("OBL5 archive: {count} frames, {version:?}");
    match version {
      ArchiveVersion::Unpacked => {
        let mut frames = Vec::with_capacity(count);
        let mut rest = rest;
        let mut total = 0_u64;
        for n in 0..count {
          let (record, tail) =
            FrameRecord::parse(rest).map_err(|e| e.context(&format!("frame {n}")))?;
          total += frame_byte_len(record.width, record.height)? as u64;
          if total > MAX_TOTAL_BYTES {
            return Err(ArchiveError::limit(format!(
              "over {MAX_TOTAL_BYTES} bytes of pixels by frame {n}"
            )));
          }
          frames.push(record);
          rest = tail;
        }
        Ok((Self { body: ArchiveBody::Unpacked { frames }, tags: Vec::new() }, rest))
      }
      ArchiveVersion::Solid => {
        let (blob_size, rest) = try_pull_u32_le(rest)?;
        if blob_size == 0 {
          return Err(ArchiveError::corrupt("empty compressed blob"));
        }
        let mut sizes = Vec::with_capacity(count);
        let mut rest = rest;
        for n in 0..count {
          let (w, tail) = try_pull_u16_le(rest)?;
          let (h, tail) = try_pull_u16_le(tail)?;
          frame_byte_len(w, h).map_err(|e| e.context(&format!("frame {n}")))?;
          sizes.push((w, h));
          rest = tail;
        }
        let (blob, rest) = try_pull_slice(rest, blob_size as usize)?;
        let (tags, rest) = parse_tags(rest)?;
        Ok((Self { body: ArchiveBody::Solid { blob: blob.to_vec(), sizes }, tags }, rest))
      }
    }
  }

  /// Serializes the archive.
  pub fn to_bytes(&self) -> ArchiveResult<Vec<u8>> {
    let count = self.body.frame_count();
    check_frame_count(count)?;
    let mut out = Vec::new();
    out.extend_from_slice(&ARCHIVE_SIGNATURE);
    out.extend_from_slice(&(count as u32).to_le_bytes());
    out.extend_from_slice(&self.body.version().to_u32().to_le_bytes());
    self.body.write_to(&mut out)?;
    if let ArchiveBody::Solid { .. } = self.body {
      write_tags(&self.tags, &mut out);
    }
    Ok(out)
  }
}

/// Writes a single frame as an unpacked-archive record.
pub fn write_frame(frame: &Frame) -> ArchiveResult<Vec<u8>> {
  let mut out = Vec::new();
  FrameRecord::from_frame(frame)?.write_to(&mut out)?;
  Ok(out)
}

/// Reads a single unpacked-archive record, giving back the rest of the bytes.
///
/// The frame is discarded if the inflated size doesn't match its dimensions.
pub fn read_frame(bytes: &[u8]) -> ArchiveResult<(Frame, &[u8])> {
  let (record, rest) = FrameRecord::parse(bytes)?;
  Ok((record.to_frame()?, rest))
}

/// Writes a whole frame set as an archive of the given version.
///
/// Unpacked archives have nowhere to store tags, so they're dropped.
pub fn write_frameset(set: &FrameSet, version: ArchiveVersion) -> ArchiveResult<Vec<u8>> {
  let body = ArchiveBody::from_frames(set.frames(), version)?;
  let tags = set.tags().map(|(k, v)| (k.to_string(), v.to_string())).collect();
  Archive { body, tags }.to_bytes()
}

/// Reads an archive into a frame set.
///
/// Trailing bytes after a complete archive are tolerated with a warning.
pub fn read_frameset(bytes: &[u8]) -> ArchiveResult<FrameSet> {
  let (archive, rest) = Archive::parse(bytes)?;
  if !rest.is_empty() {
    log::warn!("Extra data after OBL5 archive: {} bytes", rest.len());
  }
  let mut set = FrameSet::from_frames(archive.body.into_frames()?);
  for (k, v) in archive.tags {
    set.set_tag(k, v);
  }
  set.ensure_uuid();
  Ok(set)
}

#[inline]
fn check_frame_count(count: usize) -> ArchiveResult<()> {
  if count == 0 {
    Err(ArchiveError::invalid_frame("an archive needs at least one frame"))
  } else if count > MAX_FRAMES {
    Err(ArchiveError::limit(format!("{count} frames, the limit is {MAX_FRAMES}")))
  } else {
    Ok(())
  }
}

fn storable_dimensions(frame: &Frame) -> ArchiveResult<(u16, u16)> {
  let (w, h) = (frame.width(), frame.height());
  if w == 0 || h == 0 {
    return Err(ArchiveError::invalid_frame(format!("{w}x{h} frame has no area")));
  }
  check_dimensions(w, h, MAX_FRAME_SIZE)?;
  // the cap is far below u16::MAX
  Ok((w as u16, h as u16))
}

/// Bytes of RGBA for a stored frame, after checking its dimensions.
fn frame_byte_len(width: u16, height: u16) -> ArchiveResult<usize> {
  if width == 0 || height == 0 {
    return Err(ArchiveError::corrupt(format!("{width}x{height} frame has no area")));
  }
  check_dimensions(u32::from(width), u32::from(height), MAX_FRAME_SIZE)?;
  Ok(usize::from(width) * usize::from(height) * 4)
}

fn write_string(s: &str, out: &mut Vec<u8>) {
  let len = s.len();
  if len < 0xFF {
    out.push(len as u8);
  } else {
    out.push(0xFF);
    if len < 0xFFFF {
      out.extend_from_slice(&(len as u16).to_le_bytes());
    } else {
      out.extend_from_slice(&0xFFFF_u16.to_le_bytes());
      out.extend_from_slice(&(len as u32).to_le_bytes());
    }
  }
  out.extend_from_slice(s.as_bytes());
}

fn parse_string(bytes: &[u8], max: usize) -> ArchiveResult<(String, &[u8])> {
  let (short, mut rest) = try_pull_u8(bytes)?;
  let mut len = usize::from(short);
  if short == 0xFF {
    let (mid, tail) = try_pull_u16_le(rest)?;
    len = usize::from(mid);
    rest = tail;
    if mid == 0xFFFF {
      let (long, tail) = try_pull_u32_le(rest)?;
      len = long as usize;
      rest = tail;
    }
  }
  if len > max {
    return Err(ArchiveError::limit(format!("{len} byte tag string, the limit is {max}")));
  }
  let (data, rest) = try_pull_slice(rest, len)?;
  let s = core::str::from_utf8(data)
    .map_err(|_| ArchiveError::corrupt("tag string isn't valid UTF-8"))?;
  Ok((s.to_string(), rest))
}

fn parse_tags(bytes: &[u8]) -> ArchiveResult<(Vec<(String, String)>, &[u8])> {
  let (count, mut rest) = try_pull_u32_le(bytes)?;
  if count as usize > MAX_TAGS {
    return Err(ArchiveError::limit(format!("{count} tags, the limit is {MAX_TAGS}")));
  }
  let mut tags = Vec::with_capacity(count as usize);
  for _ in 0..count {
    let (key, tail) = parse_string(rest, TAG_KEY_MAX)?;
    let (val, tail) = parse_string(tail, TAG_VAL_MAX)?;
    tags.push((key, val));
    rest = tail;
  }
  Ok((tags, rest))
}

/// Writes the tag table, identity first, dropping whatever doesn't fit.
fn write_tags(tags: &[(String, String)], out: &mut Vec<u8>) {
  let mut keep: Vec<&(String, String)> = tags
    .iter()
    .filter(|(k, v)| {
      if v.is_empty() {
        log::warn!("skipping tag {k:?} with an empty value");
        false
      } else if k.len() > TAG_KEY_MAX || v.len() > TAG_VAL_MAX {
        log::warn!("skipping oversized tag {:?}", k.get(..32).unwrap_or(k.as_str()));
        false
      } else {
        true
      }
    })
    .collect();
  keep.sort_by_key(|(k, _)| k != UUID_TAG);
  if keep.len() > MAX_TAGS {
    log::warn!("{} tags to write, only the first {MAX_TAGS} are kept", keep.len());
    keep.truncate(MAX_TAGS);
  }
  out.extend_from_slice(&(keep.len() as u32).to_le_bytes());
  for (k, v) in keep {
    write_string(k, out);
    write_string(v, out);
  }
}
