//! The shared variable-length string table.
//!
//! The manufacturer, product and serial number strings live in a shared
//! region starting at 0xA0, located through (offset, length) descriptor
//! pairs in the fixed header. Two encodings exist: the wide form written
//! by FTDI's FT_Prog tool (a USB string descriptor: length byte, type
//! byte 3, then one zero high byte per character) and a plain narrow
//! byte-per-character form.

use super::{Image, STRING_BUDGET};
#[cfg(test)]
use super::layout;
use crate::constants::FTX_EEPROM_SIZE;
use crate::error::{Error, Result};

/// How descriptor strings are laid out in the string area.
///
/// Chosen once per run and threaded through every codec call; there is no
/// ambient mode flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StringMode {
    /// FT_Prog compatible: `2 + 2 * len` bytes per string, with a
    /// length/type header and a zero high byte per character.
    #[default]
    Wide,
    /// One byte per character, no header.
    Narrow,
}

/// Check that the three strings fit the shared string area.
///
/// The budget is counted in natural character lengths, independent of the
/// encode mode. Must pass before any encoding mutates an image.
pub fn check_budget(manufacturer: &str, product: &str, serial: &str) -> Result<()> {
    let used = manufacturer.len() + product.len() + serial.len();
    if used > STRING_BUDGET {
        return Err(Error::StringTableOverflow {
            used,
            budget: STRING_BUDGET,
        });
    }
    Ok(())
}

/// Encode one string into the string area at `*cursor` and fill in its
/// (offset, length) descriptor at `desc`. Advances the cursor by the
/// number of bytes emitted.
///
/// Writes wrap modulo the image size, mirroring the 8-bit cursor
/// arithmetic of the on-chip layout.
pub(super) fn encode_string(
    image: &mut Image,
    mode: StringMode,
    desc: usize,
    text: &str,
    cursor: &mut usize,
) {
    let mask = FTX_EEPROM_SIZE - 1;
    let start = *cursor;
    let length = match mode {
        StringMode::Narrow => {
            for (i, ch) in text.bytes().enumerate() {
                image[(start + i) & mask] = ch;
            }
            text.len()
        }
        StringMode::Wide => {
            let length = text.len() * 2 + 2;
            image[start & mask] = length as u8;
            image[(start + 1) & mask] = 0x03; // USB string descriptor type
            for (i, ch) in text.bytes().enumerate() {
                image[(start + 2 + 2 * i) & mask] = ch;
                image[(start + 3 + 2 * i) & mask] = 0x00;
            }
            length
        }
    };

    image[desc] = start as u8;
    image[desc + 1] = length as u8;
    *cursor = start + length;
}

/// Decode one string through its (offset, length) descriptor at `desc`.
pub(super) fn decode_string(image: &Image, mode: StringMode, desc: usize) -> String {
    let mask = FTX_EEPROM_SIZE - 1;
    let start = image[desc] as usize;
    let length = image[desc + 1] as usize;

    match mode {
        StringMode::Narrow => (0..length)
            .map(|i| image[(start + i) & mask] as char)
            .collect(),
        StringMode::Wide => {
            // Skip the length/type header, keep the low byte of each
            // 16-bit character slot.
            let chars = length.saturating_sub(2) / 2;
            (0..chars)
                .map(|i| image[(start + 2 + 2 * i) & mask] as char)
                .collect()
        }
    }
}
