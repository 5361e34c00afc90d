#![forbid(unsafe_code)]

//! PNG reading and writing, with the `obLT` sprite layout chunk.
//!
//! * [Portable Network Graphics Specification (Second Edition)][png-spec]
//!
//! [png-spec]: https://www.w3.org/TR/2003/REC-PNG-20031110/
//!
//! Only the parts of PNG that sprite sheets actually use are supported:
//!
//! * 8-bit indexed, RGB, and RGBA images, plus 4-bit indexed.
//! * No interlacing.
//! * Palette transparency through `tRNS`.
//!
//! Anything else in the critical path is an
//! [`UnsupportedFeature`](crate::ArchiveError::UnsupportedFeature) error.
//! Unknown ancillary chunks are skipped.
//!
//! ## Sprite Layout
//!
//! A PNG written by this crate carries a private `obLT` chunk that says how to
//! cut the image back into frames. Without that chunk the whole image becomes
//! a single frame. Decoded images are padded up to a multiple of 8 pixels on
//! each side, with the image in the top left and transparent padding.
//!
//! ## Integrity
//!
//! Unlike a viewer, this decoder is strict: every chunk's CRC must match, and
//! the `IHDR`, `IDAT`, and `IEND` chunks must all be present.

use alloc::{format, vec, vec::Vec};
use core::fmt::{Debug, Write};

use crate::{
  compression::{deflate_zlib, inflate_zlib_exact, DEFAULT_COMPRESSION_LEVEL},
  crc32::Crc32,
  frame::check_dimensions,
  parser_helpers::*,
  pixel_formats::{RGB888, RGBA8888, OPAQUE_BLACK},
  ArchiveError, ArchiveResult, Frame, FrameSet, MAX_FRAMES, MAX_FRAME_SIZE,
};

mod chunks;
pub use chunks::*;

mod decode;
pub use decode::*;

mod encode;
pub use encode::*;

mod raw_chunk;
pub use raw_chunk::*;

mod sprite_chunk;
pub use sprite_chunk::*;

mod unfilter;
pub use unfilter::*;

#[cfg(test)]
mod tests;

/// The first eight bytes of a PNG datastream should match these bytes.
pub const PNG_SIGNATURE: [u8; 8] = [137, 80, 78, 71, 13, 10, 26, 10];

/// Compressed image data is split into `IDAT` chunks of at most this many
/// bytes when writing.
pub const IDAT_CHUNK_LIMIT: usize = 32767;

/// Checks if the PNG's initial 8 bytes are correct.
#[inline]
#[must_use]
pub fn is_png_header_correct(png: &[u8]) -> bool {
  png.starts_with(&PNG_SIGNATURE)
}
