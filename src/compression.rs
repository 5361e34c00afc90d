//! zlib-format DEFLATE glue over `miniz_oxide`.

use alloc::{format, vec::Vec};

use miniz_oxide::inflate::{decompress_to_vec_zlib_with_limit, TINFLStatus};

use crate::{ArchiveError, ArchiveResult};

/// Compression level used for archives and PNG output.
pub const DEFAULT_COMPRESSION_LEVEL: u8 = 6;

/// Compresses bytes into a zlib stream.
#[inline]
#[must_use]
pub fn deflate_zlib(data: &[u8], level: u8) -> Vec<u8> {
  miniz_oxide::deflate::compress_to_vec_zlib(data, level.min(10))
}

/// Inflates a zlib stream that must produce exactly `expected_len` bytes.
///
/// The output is never allowed to grow past `expected_len + 1`, so a hostile
/// stream can't balloon memory use. Getting any other length back is a
/// `CorruptStream`. Failures inside the inflater itself are `Compression`.
pub fn inflate_zlib_exact(data: &[u8], expected_len: usize) -> ArchiveResult<Vec<u8>> {
  let limit = expected_len.saturating_add(1);
  let out = match decompress_to_vec_zlib_with_limit(data, limit) {
    Ok(out) => out,
    Err(e) if e.status == TINFLStatus::HasMoreOutput => {
      return Err(ArchiveError::corrupt(format!(
        "length mismatch: inflated data exceeds the expected {expected_len} bytes"
      )));
    }
    Err(e) => return Err(e.into()),
  };
  if out.len() != expected_len {
    return Err(ArchiveError::corrupt(format!(
      "length mismatch: inflated {} bytes, expected {expected_len}",
      out.len()
    )));
  }
  Ok(out)
}
