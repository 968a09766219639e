//! Raw image save and restore.
//!
//! Images are written byte-for-byte, no transformation. Restoring
//! re-verifies the checksum so a truncated or corrupted file is rejected
//! before it can reach a chip.

use std::fs;
use std::path::Path;

use log::info;

use crate::constants::FTX_EEPROM_SIZE;
use crate::eeprom::{checksum, Image};
use crate::error::{Error, Result};

/// Save a raw image to a file.
pub fn save_image(path: &Path, image: &Image) -> Result<()> {
    fs::write(path, image)?;
    info!("{}: wrote {} bytes", path.display(), image.len());
    Ok(())
}

/// Load a raw image from a file, rejecting wrong sizes and bad checksums.
pub fn restore_image(path: &Path) -> Result<Image> {
    let data = fs::read(path)?;
    if data.len() != FTX_EEPROM_SIZE {
        return Err(Error::ImageFileSize {
            read: data.len(),
            expected: FTX_EEPROM_SIZE,
        });
    }
    let mut image = [0u8; FTX_EEPROM_SIZE];
    image.copy_from_slice(&data);
    checksum::verify(&image)?;
    info!("{}: read {} bytes", path.display(), data.len());
    Ok(image)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn save_then_restore() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("eeprom.bin");

        let mut image = [0u8; FTX_EEPROM_SIZE];
        image[0x02] = 0x03;
        image[0x03] = 0x04;
        checksum::stamp(&mut image);

        save_image(&path, &image).unwrap();
        assert_eq!(restore_image(&path).unwrap(), image);
    }

    #[test]
    fn wrong_size_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("short.bin");
        fs::write(&path, [0u8; 100]).unwrap();

        assert!(matches!(
            restore_image(&path),
            Err(Error::ImageFileSize {
                read: 100,
                expected: FTX_EEPROM_SIZE,
            })
        ));
    }

    #[test]
    fn bad_checksum_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("corrupt.bin");
        fs::write(&path, [0u8; FTX_EEPROM_SIZE]).unwrap();

        assert!(matches!(
            restore_image(&path),
            Err(Error::ChecksumMismatch { .. })
        ));
    }
}
