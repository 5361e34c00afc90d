//! CRC-32 with the reflected `0xEDB88320` polynomial, as PNG chunks use it.

const CRC_TABLE: [u32; 256] = make_crc_table();

const fn make_crc_table() -> [u32; 256] {
  let mut out = [0; 256];
  let mut n = 0;
  while n < 256 {
    let mut c = n as u32;
    let mut k = 0;
    while k < 8 {
      if (c & 1) != 0 {
        c = 0xEDB8_8320_u32 ^ (c >> 1);
      } else {
        c >>= 1;
      }
      k += 1;
    }
    out[n] = c;
    n += 1;
  }
  out
}

#[inline]
fn update_crc(mut crc: u32, bytes: &[u8]) -> u32 {
  for &byte in bytes {
    let i = (crc ^ u32::from(byte)) as u8 as usize;
    crc = CRC_TABLE[i] ^ (crc >> 8);
  }
  crc
}

/// Running CRC-32 state.
///
/// A chunk's checksum covers its type and then its data, which live in
/// different places, so this lets them be fed in separately.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Crc32(u32);
impl Default for Crc32 {
  #[inline]
  fn default() -> Self {
    Self::new()
  }
}
impl Crc32 {
  /// A fresh checksum.
  #[inline]
  #[must_use]
  pub const fn new() -> Self {
    Self(u32::MAX)
  }

  /// Feeds more bytes in.
  #[inline]
  pub fn update(&mut self, bytes: &[u8]) -> &mut Self {
    self.0 = update_crc(self.0, bytes);
    self
  }

  /// The checksum of everything fed in so far.
  #[inline]
  #[must_use]
  pub const fn finish(&self) -> u32 {
    self.0 ^ u32::MAX
  }
}

/// The CRC-32 of a single byte slice.
#[inline]
#[must_use]
pub fn png_crc(bytes: &[u8]) -> u32 {
  update_crc(u32::MAX, bytes) ^ u32::MAX
}

#[test]
fn test_png_crc_known_values() {
  assert_eq!(png_crc(b""), 0);
  assert_eq!(png_crc(b"123456789"), 0xCBF4_3926);
  // the chunk type alone, as an empty IEND chunk has it
  assert_eq!(png_crc(b"IEND"), 0xAE42_6082);
  let mut split = Crc32::new();
  split.update(b"1234").update(b"56789");
  assert_eq!(split.finish(), png_crc(b"123456789"));
}
