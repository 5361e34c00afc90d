#![cfg_attr(not(test), no_std)]
#![cfg_attr(docs_rs, feature(doc_cfg))]
#![forbid(unsafe_code)]

//! A crate for sprite frame sets and the files they're stored in.
//!
//! A [`FrameSet`] is an ordered list of RGBA [`Frame`]s plus a small tag
//! dictionary. Frame sets are read from and written to:
//!
//! * The native [`archive`] format, `OBL5`.
//! * PNG sprite sheets with a private layout chunk ([`png`], `png` feature).
//! * Several older tile sheet formats, import only ([`legacy`], `legacy`
//!   feature).
//!
//! Most of the time you just want [`decode`] and [`encode`]:
//!
//! ```
//! use spritearc::*;
//! let mut set = FrameSet::new();
//! set.add(Frame::new(16, 16).unwrap());
//! set.set_tag("author", "me");
//! let bytes = encode(&set, ExportFormat::Archive(ArchiveVersion::Solid)).unwrap();
//! let back = decode(&bytes).unwrap();
//! assert_eq!(back.frame(0).width(), 16);
//! assert_eq!(back.tag("author"), "me");
//! ```
//!
//! ## Pixels
//!
//! Every pixel is a `u32` holding straight-alpha RGBA, with red in the low
//! byte (`0xAABBGGRR`). Read as little-endian bytes that's just `R, G, B, A`.
//!
//! ## Limits
//!
//! Decoders refuse oversized data with
//! [`ResourceLimit`](ArchiveError::ResourceLimit) before allocating for it:
//! frames are at most [`MAX_FRAME_SIZE`] on a side (tiles from the legacy
//! formats at most [`MAX_TILE_SIZE`]), and a set has at most [`MAX_FRAMES`]
//! frames.
//!
//! ## Logging
//!
//! The crate logs through the [`log`] facade: `debug` for the structure of
//! what's being decoded, `warn` for things that were tolerated, such as
//! trailing bytes or tags that couldn't be written. It never installs a
//! logger itself.

extern crate alloc;

#[cfg(target_pointer_width = "16")]
compile_error!("this crate assumes 32-bit or bigger pointers!");

mod error;
pub use error::*;

mod parser_helpers;

pub mod pixel_formats;

pub mod crc32;

pub mod compression;

mod frame;
pub use frame::*;

mod uuid;
pub use uuid::new_uuid;

mod frameset;
pub use frameset::*;

pub mod archive;
pub use archive::{ArchiveVersion, MAX_FRAMES, MAX_TAGS, TAG_KEY_MAX, TAG_VAL_MAX};

#[cfg(feature = "legacy")]
#[cfg_attr(docs_rs, doc(cfg(feature = "legacy")))]
pub mod legacy;

#[cfg(feature = "png")]
#[cfg_attr(docs_rs, doc(cfg(feature = "png")))]
pub mod png;

mod dispatch;
pub use dispatch::*;
