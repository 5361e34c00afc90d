use super::*;

/// One frame's place inside a sprite sheet image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SpriteUnit {
  /// Cut this rectangle out of the image.
  Clip { x: u32, y: u32, width: u32, height: u32 },
  /// A fully transparent frame that isn't stored in the image at all.
  Blank { width: u32, height: u32 },
}
impl SpriteUnit {
  /// Produces this unit's frame from the decoded sheet.
  ///
  /// ## Failure
  /// * `CorruptStream` if the unit has zero area or leaves the image.
  /// * `ResourceLimit` for a blank frame bigger than [`MAX_FRAME_SIZE`].
  pub fn to_frame(self, sheet: &Frame) -> ArchiveResult<Frame> {
    match self {
      Self::Clip { x, y, width, height } => {
        if width == 0 || height == 0 {
          return Err(ArchiveError::corrupt(format!("sprite unit of {width}x{height}")));
        }
        sheet.clip(x, y, width, height).ok_or_else(|| {
          ArchiveError::corrupt(format!(
            "sprite unit {width}x{height} at ({x},{y}) is outside the {}x{} image",
            sheet.width(),
            sheet.height()
          ))
        })
      }
      Self::Blank { width, height } => {
        if width == 0 || height == 0 {
          return Err(ArchiveError::corrupt(format!("blank sprite unit of {width}x{height}")));
        }
        Frame::new(width, height)
      }
    }
  }
}

/// A placed rectangle in a version 2 layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PlacedUnit {
  pub x: u16,
  pub y: u16,
  pub width: u16,
  pub height: u16,
}

/// `obLT`: how a sprite sheet image is cut into frames.
///
/// The chunk data is `reserved: u32 = 0`, `version: u32`, `count: u32`, then
/// the version's payload, all little-endian.
///
/// * **Version 0** ([`Strip`](Self::Strip)): `count` widths then `count`
///   heights, as `u16`. Frames sit left to right along the top of the image.
/// * **Version 2** ([`Placed`](Self::Placed)): `count` rectangles of `x, y,
///   width, height`, as `u16`. An `x` or `y` of [`BLANK_COORD`](Self::BLANK_COORD)
///   means a transparent frame that isn't in the image.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SpriteLayout {
  Strip(Vec<(u16, u16)>),
  Placed(Vec<PlacedUnit>),
}
impl SpriteLayout {
  pub const BLANK_COORD: u16 = 0xFFFF;

  /// Layout of `frames` placed left to right.
  ///
  /// ## Failure
  /// * `ResourceLimit` if a frame side doesn't fit in a `u16`.
  pub fn strip_of(frames: &[Frame]) -> ArchiveResult<Self> {
    frames
      .iter()
      .map(|f| match (u16::try_from(f.width()), u16::try_from(f.height())) {
        (Ok(w), Ok(h)) => Ok((w, h)),
        _ => Err(ArchiveError::limit(format!("frame {}x{}", f.width(), f.height()))),
      })
      .collect::<ArchiveResult<Vec<_>>>()
      .map(Self::Strip)
  }

  #[inline]
  #[must_use]
  pub const fn version(&self) -> u32 {
    match self {
      Self::Strip(_) => 0,
      Self::Placed(_) => 2,
    }
  }

  #[inline]
  #[must_use]
  pub fn len(&self) -> usize {
    match self {
      Self::Strip(sizes) => sizes.len(),
      Self::Placed(units) => units.len(),
    }
  }

  #[inline]
  #[must_use]
  pub fn is_empty(&self) -> bool {
    self.len() == 0
  }

  /// Parses the chunk data.
  ///
  /// ## Failure
  /// * `CorruptStream`: a non-zero reserved field, or a short payload.
  /// * `UnsupportedFeature`: any version other than 0 or 2.
  /// * `ResourceLimit`: more units than [`MAX_FRAMES`].
  pub fn parse(data: &[u8]) -> ArchiveResult<Self> {
    let (reserved, rest) = try_pull_u32_le(data)?;
    if reserved != 0 {
      return Err(ArchiveError::corrupt(format!("obLT reserved field is {reserved}")));
    }
    let (version, rest) = try_pull_u32_le(rest)?;
    let (count, rest) = try_pull_u32_le(rest)?;
    if count as usize > MAX_FRAMES {
      return Err(ArchiveError::limit(format!("obLT lists {count} frames")));
    }
    let count = count as usize;
    log::debug!("obLT: version {version}, {count} units");
    match version {
      0 => {
        let (widths, rest) = try_pull_slice(rest, count * 2)?;
        let (heights, _) = try_pull_slice(rest, count * 2)?;
        let sizes = widths
          .chunks_exact(2)
          .zip(heights.chunks_exact(2))
          .map(|(w, h)| (u16::from_le_bytes([w[0], w[1]]), u16::from_le_bytes([h[0], h[1]])))
          .collect();
        Ok(Self::Strip(sizes))
      }
      2 => {
        let (payload, _) = try_pull_slice(rest, count * 8)?;
        let units = payload
          .chunks_exact(8)
          .map(|u| PlacedUnit {
            x: u16::from_le_bytes([u[0], u[1]]),
            y: u16::from_le_bytes([u[2], u[3]]),
            width: u16::from_le_bytes([u[4], u[5]]),
            height: u16::from_le_bytes([u[6], u[7]]),
          })
          .collect();
        Ok(Self::Placed(units))
      }
      other => Err(ArchiveError::unsupported(format!("obLT version {other}"))),
    }
  }

  /// The chunk data bytes.
  #[must_use]
  pub fn to_bytes(&self) -> Vec<u8> {
    let mut out = Vec::with_capacity(12 + self.len() * 8);
    out.extend_from_slice(&0_u32.to_le_bytes());
    out.extend_from_slice(&self.version().to_le_bytes());
    out.extend_from_slice(&(self.len() as u32).to_le_bytes());
    match self {
      Self::Strip(sizes) => {
        sizes.iter().for_each(|(w, _)| out.extend_from_slice(&w.to_le_bytes()));
        sizes.iter().for_each(|(_, h)| out.extend_from_slice(&h.to_le_bytes()));
      }
      Self::Placed(units) => {
        for u in units {
          for v in [u.x, u.y, u.width, u.height] {
            out.extend_from_slice(&v.to_le_bytes());
          }
        }
      }
    }
    out
  }

  /// Where each frame comes from, in frame order.
  #[must_use]
  pub fn units(&self) -> Vec<SpriteUnit> {
    match self {
      Self::Strip(sizes) => {
        let mut x = 0_u32;
        sizes
          .iter()
          .map(|&(w, h)| {
            let unit = SpriteUnit::Clip { x, y: 0, width: u32::from(w), height: u32::from(h) };
            x += u32::from(w);
            unit
          })
          .collect()
      }
      Self::Placed(units) => units
        .iter()
        .map(|u| {
          let (width, height) = (u32::from(u.width), u32::from(u.height));
          if u.x == Self::BLANK_COORD || u.y == Self::BLANK_COORD {
            SpriteUnit::Blank { width, height }
          } else {
            SpriteUnit::Clip { x: u32::from(u.x), y: u32::from(u.y), width, height }
          }
        })
        .collect(),
    }
  }

  /// Cuts the sheet into frames.
  pub fn explode(&self, sheet: &Frame) -> ArchiveResult<Vec<Frame>> {
    self
      .units()
      .into_iter()
      .enumerate()
      .map(|(n, unit)| unit.to_frame(sheet).map_err(|e| e.context(&format!("obLT unit {n}"))))
      .collect()
  }
}
