//! Identity tags for frame sets.

use alloc::{format, string::String};
use core::sync::atomic::{AtomicU32, Ordering};

static FALLBACK_COUNTER: AtomicU32 = AtomicU32::new(0x5EED_0001);

/// A fresh random identity string, formatted like a version 4 UUID.
///
/// If the OS random source is unavailable the value comes from a process-wide
/// counter instead, which is unique within the process but not across runs.
#[must_use]
pub fn new_uuid() -> String {
  let mut b = [0_u8; 16];
  if let Err(e) = getrandom::getrandom(&mut b) {
    log::warn!("no OS randomness for a new UUID ({e}), using a counter");
    let n = FALLBACK_COUNTER.fetch_add(1, Ordering::Relaxed);
    // xorshift the counter out across all 16 bytes
    let mut x = n.wrapping_mul(0x9E37_79B9) | 1;
    for byte in b.iter_mut() {
      x ^= x << 13;
      x ^= x >> 17;
      x ^= x << 5;
      *byte = x as u8;
    }
    b[..4].copy_from_slice(&n.to_be_bytes());
  }
  b[6] = (b[6] & 0x0F) | 0x40;
  b[8] = (b[8] & 0x3F) | 0x80;
  format!(
    "{:02x}{:02x}{:02x}{:02x}-{:02x}{:02x}-{:02x}{:02x}-{:02x}{:02x}-{:02x}{:02x}{:02x}{:02x}{:02x}{:02x}",
    b[0], b[1], b[2], b[3], b[4], b[5], b[6], b[7], b[8], b[9], b[10], b[11], b[12], b[13],
    b[14], b[15]
  )
}

#[test]
fn test_new_uuid_shape() {
  let a = new_uuid();
  let b = new_uuid();
  assert_eq!(a.len(), 36);
  assert_ne!(a, b);
  let dashes: alloc::vec::Vec<usize> =
    a.char_indices().filter(|(_, c)| *c == '-').map(|(i, _)| i).collect();
  assert_eq!(dashes, [8, 13, 18, 23]);
  assert_eq!(&a[14..15], "4");
}
