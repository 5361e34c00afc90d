use alloc::{
  format,
  string::{String, ToString},
};

use miniz_oxide::inflate::{DecompressError, TINFLStatus};

/// An error from the `spritearc` crate.
///
/// Every decoder and encoder in the crate reports through this one type.
/// Importers never hand back a partially filled [`FrameSet`](crate::FrameSet)
/// alongside an error.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ArchiveError {
  /// No importer recognized the data.
  #[error("the data doesn't match any known sprite format")]
  FormatMismatch,

  /// The stream is truncated, has a bad checksum, or is otherwise malformed.
  #[error("corrupt stream: {0}")]
  CorruptStream(String),

  /// The stream is well formed but uses something this crate won't decode.
  #[error("unsupported feature: {0}")]
  UnsupportedFeature(String),

  /// A declared size is larger than the crate's limits.
  ///
  /// This is always raised before the matching allocation happens.
  #[error("resource limit exceeded: {0}")]
  ResourceLimit(String),

  /// A frame can't be written, usually because it has zero area.
  #[error("invalid frame: {0}")]
  InvalidFrame(String),

  /// The zlib layer failed.
  #[error("compression error {code}: {reason}")]
  Compression {
    /// The status code reported by the inflater.
    code: i32,
    /// A short description.
    reason: String,
  },
}

/// Errors from decoding.
pub type DecodeError = ArchiveError;

/// Errors from encoding.
pub type EncodeError = ArchiveError;

/// Result alias used across the crate.
pub type ArchiveResult<T> = Result<T, ArchiveError>;

/// The category of an [`ArchiveError`], without the message payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[allow(missing_docs)]
pub enum ErrorKind {
  FormatMismatch,
  CorruptStream,
  UnsupportedFeature,
  ResourceLimit,
  InvalidFrame,
  Compression,
}

impl ArchiveError {
  /// Gets the category of this error.
  #[inline]
  #[must_use]
  pub const fn kind(&self) -> ErrorKind {
    match self {
      Self::FormatMismatch => ErrorKind::FormatMismatch,
      Self::CorruptStream(_) => ErrorKind::CorruptStream,
      Self::UnsupportedFeature(_) => ErrorKind::UnsupportedFeature,
      Self::ResourceLimit(_) => ErrorKind::ResourceLimit,
      Self::InvalidFrame(_) => ErrorKind::InvalidFrame,
      Self::Compression { .. } => ErrorKind::Compression,
    }
  }

  /// Prefixes the message with where the problem happened.
  ///
  /// `FormatMismatch` and `Compression` are left as they are.
  #[must_use]
  pub fn context(self, at: &str) -> Self {
    match self {
      Self::CorruptStream(m) => Self::CorruptStream(format!("{at}: {m}")),
      Self::UnsupportedFeature(m) => Self::UnsupportedFeature(format!("{at}: {m}")),
      Self::ResourceLimit(m) => Self::ResourceLimit(format!("{at}: {m}")),
      Self::InvalidFrame(m) => Self::InvalidFrame(format!("{at}: {m}")),
      other => other,
    }
  }

  #[inline]
  pub(crate) fn corrupt(msg: impl Into<String>) -> Self {
    Self::CorruptStream(msg.into())
  }

  #[inline]
  pub(crate) fn unsupported(msg: impl Into<String>) -> Self {
    Self::UnsupportedFeature(msg.into())
  }

  #[inline]
  pub(crate) fn limit(msg: impl Into<String>) -> Self {
    Self::ResourceLimit(msg.into())
  }

  #[inline]
  pub(crate) fn invalid_frame(msg: impl Into<String>) -> Self {
    Self::InvalidFrame(msg.into())
  }
}

impl From<DecompressError> for ArchiveError {
  #[inline]
  fn from(err: DecompressError) -> Self {
    let reason = match err.status {
      TINFLStatus::HasMoreOutput => "inflated data is larger than expected",
      TINFLStatus::NeedsMoreInput | TINFLStatus::FailedCannotMakeProgress => {
        "compressed data is truncated"
      }
      TINFLStatus::Adler32Mismatch => "adler32 checksum mismatch",
      TINFLStatus::BadParam => "bad parameter",
      _ => "invalid compressed data",
    };
    Self::Compression { code: err.status as i32, reason: reason.to_string() }
  }
}
