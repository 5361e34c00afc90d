#![forbid(unsafe_code)]

//! Picking the right codec for a byte buffer.
//!
//! Decoding tries each known format in a fixed order. A format is only tried
//! when its signature matches, and once an importer accepts the signature its
//! verdict is final: a malformed file is an error, not a cue to try the next
//! format.
//!
//! The order is OBL3, OBL4, OBL5, GE96, IMC1, PNG, and last of all IMA, which
//! has no signature and is recognized by its size alone.

use alloc::vec::Vec;
use core::fmt;

use crate::{
  archive::{read_frameset, write_frameset, ArchiveVersion, ARCHIVE_SIGNATURE},
  ArchiveError, ArchiveResult, DecodeError, EncodeError, FrameSet,
};

#[cfg(feature = "legacy")]
use crate::legacy::*;

#[cfg(feature = "png")]
use crate::png::{decode_png, is_png_header_correct, PngEncoder};

/// The result of offering bytes to one importer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImportOutcome {
  /// The bytes were this format, and they decoded.
  Matched(FrameSet),
  /// The bytes aren't this format. Try another.
  NotThisFormat,
  /// The bytes claim to be this format but are broken.
  Malformed(ArchiveError),
}
impl ImportOutcome {
  #[inline]
  #[must_use]
  pub const fn is_matched(&self) -> bool {
    matches!(self, Self::Matched(_))
  }
}

/// Tags a parse result with the format name, for an importer whose signature
/// already matched.
pub(crate) fn outcome(format: &str, result: ArchiveResult<FrameSet>) -> ImportOutcome {
  match result {
    Ok(set) => ImportOutcome::Matched(set),
    Err(e) => ImportOutcome::Malformed(e.context(format)),
  }
}

/// Every format this crate can read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ImageFormat {
  Obl3,
  Obl4,
  Obl5,
  Ge96,
  Imc1,
  Png,
  Ima,
}
impl ImageFormat {
  #[inline]
  #[must_use]
  pub const fn name(self) -> &'static str {
    match self {
      Self::Obl3 => "OBL3",
      Self::Obl4 => "OBL4",
      Self::Obl5 => "OBL5",
      Self::Ge96 => "GE96",
      Self::Imc1 => "IMC1",
      Self::Png => "PNG",
      Self::Ima => "IMA",
    }
  }

  /// The format [`decode`] would pick for these bytes, if any.
  ///
  /// This only looks at signatures (and the IMA size rule), so the bytes can
  /// still turn out to be malformed.
  #[must_use]
  pub fn sniff(bytes: &[u8]) -> Option<Self> {
    importers().into_iter().find(|i| (i.matches)(bytes)).map(|i| i.format)
  }
}
impl fmt::Display for ImageFormat {
  #[inline]
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.name())
  }
}

/// Every format this crate can write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExportFormat {
  /// The native archive, in the given layout.
  Archive(ArchiveVersion),
  /// A PNG sprite sheet with an `obLT` layout chunk.
  #[cfg(feature = "png")]
  Png,
}
impl Default for ExportFormat {
  #[inline]
  fn default() -> Self {
    Self::Archive(ArchiveVersion::default())
  }
}

/// One entry of the dispatch list.
#[derive(Clone, Copy)]
struct Importer {
  format: ImageFormat,
  matches: fn(&[u8]) -> bool,
  import: fn(&[u8]) -> ImportOutcome,
}

/// The dispatch list, in the order formats are tried.
fn importers() -> Vec<Importer> {
  let mut list = Vec::with_capacity(7);
  #[cfg(feature = "legacy")]
  list.push(Importer {
    format: ImageFormat::Obl3,
    matches: |b| b.starts_with(&OBL3_SIGNATURE),
    import: |b| import_obl3(b, &DOS_PALETTE, IndexOffset::TILES),
  });
  #[cfg(feature = "legacy")]
  list.push(Importer {
    format: ImageFormat::Obl4,
    matches: |b| b.starts_with(&OBL4_SIGNATURE),
    import: |b| import_obl4(b, &DOS_PALETTE, IndexOffset::TILES),
  });
  list.push(Importer {
    format: ImageFormat::Obl5,
    matches: |b| b.starts_with(&ARCHIVE_SIGNATURE),
    import: import_obl5,
  });
  #[cfg(feature = "legacy")]
  list.push(Importer {
    format: ImageFormat::Ge96,
    matches: |b| b.starts_with(&GE96_SIGNATURE),
    import: |b| import_ge96(b, &DOS_PALETTE, IndexOffset::TILES),
  });
  #[cfg(feature = "legacy")]
  list.push(Importer {
    format: ImageFormat::Imc1,
    matches: |b| b.starts_with(&IMC1_SIGNATURE),
    import: |b| import_imc1(b, &DOS_PALETTE, IndexOffset::NONE),
  });
  #[cfg(feature = "png")]
  list.push(Importer { format: ImageFormat::Png, matches: is_png_header_correct, import: import_png });
  #[cfg(feature = "legacy")]
  list.push(Importer {
    format: ImageFormat::Ima,
    matches: is_ima,
    import: |b| import_ima(b, &DOS_PALETTE, IndexOffset::NONE),
  });
  list
}

/// Imports a native OBL5 archive.
#[must_use]
pub fn import_obl5(bytes: &[u8]) -> ImportOutcome {
  if !bytes.starts_with(&ARCHIVE_SIGNATURE) {
    return ImportOutcome::NotThisFormat;
  }
  outcome("OBL5", read_frameset(bytes))
}

/// Imports a PNG, cut into frames by its `obLT` chunk.
#[cfg(feature = "png")]
#[must_use]
pub fn import_png(bytes: &[u8]) -> ImportOutcome {
  if !is_png_header_correct(bytes) {
    return ImportOutcome::NotThisFormat;
  }
  outcome("PNG", decode_png(bytes))
}

/// Decodes any supported format.
///
/// ## Failure
/// * `FormatMismatch` if no format recognizes the bytes.
/// * Otherwise, whatever error the matching format's importer gives.
#[inline]
pub fn decode(bytes: &[u8]) -> Result<FrameSet, DecodeError> {
  decode_with_format(bytes).map(|(set, _)| set)
}

/// Like [`decode`], but also says which format the bytes were.
pub fn decode_with_format(bytes: &[u8]) -> Result<(FrameSet, ImageFormat), DecodeError> {
  for importer in importers() {
    if !(importer.matches)(bytes) {
      continue;
    }
    match (importer.import)(bytes) {
      ImportOutcome::Matched(set) => {
        log::debug!("decoded {} frames as {}", set.len(), importer.format);
        return Ok((set, importer.format));
      }
      ImportOutcome::NotThisFormat => continue,
      ImportOutcome::Malformed(e) => {
        log::warn!("{} signature matched but the data is malformed: {e}", importer.format);
        return Err(e);
      }
    }
  }
  Err(ArchiveError::FormatMismatch)
}

/// Encodes a frame set in the chosen format.
pub fn encode(set: &FrameSet, format: ExportFormat) -> Result<Vec<u8>, EncodeError> {
  match format {
    ExportFormat::Archive(version) => write_frameset(set, version),
    #[cfg(feature = "png")]
    ExportFormat::Png => PngEncoder::new().encode(set),
  }
}
