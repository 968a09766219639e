//! The rolling checksum guarding FT-X EEPROM image integrity.
//!
//! The algorithm is: XOR each 16-bit little-endian word into the
//! accumulator, then rotate-left-1. Starting seed is 0xAAAA. Two word
//! ranges are covered; the user memory alias (words 0x12-0x3F) is
//! excluded, and word 0x7F holds the checksum itself.

use super::{layout, Image};
use crate::error::{Error, Result};

/// Word ranges included in the checksum: 0x00-0x11 and 0x40-0x7E.
const COVERED_WORDS: [std::ops::Range<usize>; 2] = [0x00..0x12, 0x40..0x7F];

/// Compute the checksum over an image.
pub fn compute(image: &Image) -> u16 {
    let mut csum: u16 = 0xAAAA;
    for words in COVERED_WORDS {
        for i in words {
            let value = (image[i * 2] as u16) | ((image[i * 2 + 1] as u16) << 8);
            csum ^= value;
            csum = csum.rotate_left(1);
        }
    }
    csum
}

/// Verify that the checksum stored in the final two bytes matches the
/// computed one. A mismatch means the image must not be trusted.
pub fn verify(image: &Image) -> Result<u16> {
    let computed = compute(image);
    let stored = (image[layout::CHECKSUM] as u16) | ((image[layout::CHECKSUM + 1] as u16) << 8);
    if computed != stored {
        return Err(Error::ChecksumMismatch { computed, stored });
    }
    Ok(computed)
}

/// Compute the checksum and write it into the final two bytes,
/// little-endian. Used after encoding, never during decoding.
pub fn stamp(image: &mut Image) -> u16 {
    let csum = compute(image);
    image[layout::CHECKSUM] = csum as u8;
    image[layout::CHECKSUM + 1] = (csum >> 8) as u8;
    csum
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::FTX_EEPROM_SIZE;

    #[test]
    fn compute_is_deterministic() {
        let mut image = [0u8; FTX_EEPROM_SIZE];
        image[0x02] = 0x03;
        image[0x03] = 0x04;
        assert_eq!(compute(&image), compute(&image));
    }

    #[test]
    fn stamp_then_verify() {
        let mut image = [0u8; FTX_EEPROM_SIZE];
        image[0x00] = 0x5A;
        image[0x81] = 0xC3;
        let csum = stamp(&mut image);
        assert_eq!(verify(&image).unwrap(), csum);
        assert_eq!(image[0xFE], csum as u8);
        assert_eq!(image[0xFF], (csum >> 8) as u8);
    }

    #[test]
    fn verify_rejects_corruption() {
        let mut image = [0u8; FTX_EEPROM_SIZE];
        stamp(&mut image);
        image[0x04] ^= 0x01;
        match verify(&image) {
            Err(Error::ChecksumMismatch { computed, stored }) => {
                assert_ne!(computed, stored);
            }
            other => panic!("expected checksum mismatch, got {other:?}"),
        }
    }

    #[test]
    fn single_bit_flips_in_covered_ranges_change_the_checksum() {
        let image = [0u8; FTX_EEPROM_SIZE];
        let baseline = compute(&image);
        for byte in (0x00..0x24).chain(0x80..0xFE) {
            for bit in 0..8 {
                let mut flipped = image;
                flipped[byte] ^= 1 << bit;
                assert_ne!(
                    compute(&flipped),
                    baseline,
                    "flip at byte {byte:#04x} bit {bit} not detected"
                );
            }
        }
    }

    #[test]
    fn excluded_ranges_do_not_affect_the_checksum() {
        let image = [0u8; FTX_EEPROM_SIZE];
        let baseline = compute(&image);
        for byte in (0x24..0x80).chain(0xFE..0x100) {
            let mut changed = image;
            changed[byte] = 0xFF;
            assert_eq!(compute(&changed), baseline, "byte {byte:#04x} is covered");
        }
    }
}
