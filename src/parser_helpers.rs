#![forbid(unsafe_code)]

//! Shorthands for pulling little-endian values off the front of a byte slice.
//!
//! Every `try_pull_*` function gives back `(value, rest)` so that parsers can
//! walk a buffer front to back without tracking offsets by hand.

use bytemuck::{pod_read_unaligned, Pod};
use core::mem::size_of;

use crate::{ArchiveError, ArchiveResult};

#[inline]
fn truncated(wanted: usize, have: usize) -> ArchiveError {
  ArchiveError::corrupt(alloc::format!(
    "unexpected end of data (wanted {wanted} bytes, {have} left)"
  ))
}

#[inline]
pub(crate) fn try_pull_slice(bytes: &[u8], count: usize) -> ArchiveResult<(&[u8], &[u8])> {
  if bytes.len() >= count {
    Ok(bytes.split_at(count))
  } else {
    Err(truncated(count, bytes.len()))
  }
}

#[inline]
pub(crate) fn try_pull_byte_array<const N: usize>(
  bytes: &[u8],
) -> ArchiveResult<([u8; N], &[u8])> {
  match bytes.split_first_chunk::<N>() {
    Some((head, tail)) => Ok((*head, tail)),
    None => Err(truncated(N, bytes.len())),
  }
}

#[inline]
pub(crate) fn try_pull_pod<T: Pod>(bytes: &[u8]) -> ArchiveResult<(T, &[u8])> {
  let (head, tail) = try_pull_slice(bytes, size_of::<T>())?;
  Ok((pod_read_unaligned(head), tail))
}

#[inline]
pub(crate) fn try_pull_u8(bytes: &[u8]) -> ArchiveResult<(u8, &[u8])> {
  let ([b], rest) = try_pull_byte_array::<1>(bytes)?;
  Ok((b, rest))
}

#[inline]
pub(crate) fn try_pull_u16_le(bytes: &[u8]) -> ArchiveResult<(u16, &[u8])> {
  let (a, rest) = try_pull_byte_array(bytes)?;
  Ok((u16::from_le_bytes(a), rest))
}

#[inline]
pub(crate) fn try_pull_u32_le(bytes: &[u8]) -> ArchiveResult<(u32, &[u8])> {
  let (a, rest) = try_pull_byte_array(bytes)?;
  Ok((u32::from_le_bytes(a), rest))
}

#[inline]
pub(crate) fn try_pull_i32_le(bytes: &[u8]) -> ArchiveResult<(i32, &[u8])> {
  let (a, rest) = try_pull_byte_array(bytes)?;
  Ok((i32::from_le_bytes(a), rest))
}

#[inline]
pub(crate) fn try_pull_u32_be(bytes: &[u8]) -> ArchiveResult<(u32, &[u8])> {
  let (a, rest) = try_pull_byte_array(bytes)?;
  Ok((u32::from_be_bytes(a), rest))
}

#[test]
fn test_pull_helpers_walk_the_buffer() {
  let bytes = [1_u8, 0x34, 0x12, 0x78, 0x56, 0x34, 0x12, 9];
  let (a, rest) = try_pull_u8(&bytes).unwrap();
  let (b, rest) = try_pull_u16_le(rest).unwrap();
  let (c, rest) = try_pull_u32_le(rest).unwrap();
  assert_eq!((a, b, c), (1, 0x1234, 0x1234_5678));
  assert_eq!(rest, &[9]);
  assert!(try_pull_u32_le(rest).is_err());
}
