//! The read-modify-write protocol for reprogramming a physical chip.
//!
//! The sequence is: read the full image word-by-word, verify its checksum,
//! decode it, apply the caller's field changes in memory, re-encode, and
//! compare. An unchanged candidate ends the run without touching the
//! device. A changed one is written word-by-word after the pre-write
//! priming sequence, read back, and verified against the checksum that was
//! written. No step is retried; every failure aborts the whole operation,
//! because a partial EEPROM write is unsafe to paper over.

use log::{debug, info};

use crate::constants::{EEPROM_WRITE_LATENCY_MS, FTX_EEPROM_SIZE};
use crate::eeprom::{build, checksum, decode, FtxEeprom, Image, StringMode};
use crate::error::{Error, Result};

/// Word-granularity access to a device's EEPROM, plus the control
/// operations the write sequence needs.
///
/// Implemented by [`FtxDevice`](crate::FtxDevice); tests substitute an
/// in-memory implementation.
pub trait EepromAccess {
    /// Read the 16-bit word at the given word index.
    fn read_word(&mut self, index: u16) -> Result<u16>;
    /// Write the 16-bit word at the given word index.
    fn write_word(&mut self, index: u16, value: u16) -> Result<()>;
    /// Reset the device.
    fn reset(&mut self) -> Result<()>;
    /// Poll the modem status lines.
    fn poll_status(&mut self) -> Result<()>;
    /// Set the latency timer.
    fn set_latency_timer(&mut self, latency_ms: u8) -> Result<()>;
}

/// How a reprogramming run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The candidate image equals the existing contents; nothing was written.
    Unchanged,
    /// The device was rewritten and the readback verified.
    Rewritten,
}

/// Read the full 256-byte image from the device, word by word.
pub fn read_image<D: EepromAccess>(dev: &mut D) -> Result<Image> {
    let mut image = [0u8; FTX_EEPROM_SIZE];
    for i in 0..(FTX_EEPROM_SIZE / 2) {
        let word = dev.read_word(i as u16)?;
        image[i * 2] = word as u8;
        image[i * 2 + 1] = (word >> 8) as u8;
    }
    Ok(image)
}

/// Read the full image and verify its checksum.
///
/// Returns the image and its (verified) checksum. A mismatch is fatal;
/// the image must not be decoded.
pub fn read_and_verify<D: EepromAccess>(dev: &mut D) -> Result<(Image, u16)> {
    let image = read_image(dev)?;
    let crc = checksum::verify(&image)?;
    debug!("EEPROM checksum okay (0x{crc:04x})");
    Ok((image, crc))
}

/// The pre-write priming sequence the chip requires before accepting
/// EEPROM writes: reset, poll modem status, set the latency timer. Traced
/// from FTDI's MProg tool.
fn prepare_write<D: EepromAccess>(dev: &mut D) -> Result<()> {
    dev.reset()?;
    dev.poll_status()?;
    dev.set_latency_timer(EEPROM_WRITE_LATENCY_MS)
}

/// Write a full image to the device, word by word.
pub fn write_image<D: EepromAccess>(dev: &mut D, image: &Image) -> Result<()> {
    prepare_write(dev)?;
    for i in 0..(FTX_EEPROM_SIZE / 2) {
        let value = (image[i * 2] as u16) | ((image[i * 2 + 1] as u16) << 8);
        dev.write_word(i as u16, value)?;
    }
    Ok(())
}

/// If `candidate` differs from `original`, rewrite and verify the device.
///
/// This is the back half of the protocol, split out so the caller can
/// inspect, dump, or save both images first. The candidate comes from
/// [`build::build`], so it already carries a stamped checksum. On a
/// rewrite the device is reset afterwards so it loads the new settings.
pub fn commit<D: EepromAccess>(
    dev: &mut D,
    original: &Image,
    candidate: &Image,
) -> Result<Outcome> {
    if candidate == original {
        info!("no change from existing EEPROM contents");
        return Ok(Outcome::Unchanged);
    }

    let expected = checksum::compute(candidate);
    info!("rewriting EEPROM with new contents (checksum 0x{expected:04x})");
    write_image(dev, candidate)?;

    // Read back and verify against what was just written. A mismatch is
    // reported, not retried; the chip may be in an inconsistent state.
    let (_readback, actual) = read_and_verify(dev)?;
    if actual != expected {
        return Err(Error::ReadbackMismatch { expected, actual });
    }

    // Reset so the chip reloads the new settings.
    dev.reset()?;
    Ok(Outcome::Rewritten)
}

/// Run the whole protocol: read, verify, decode, mutate, re-encode, and
/// conditionally rewrite.
pub fn reprogram<D, F>(dev: &mut D, mode: StringMode, mutate: F) -> Result<Outcome>
where
    D: EepromAccess,
    F: FnOnce(&mut FtxEeprom),
{
    let (original, _) = read_and_verify(dev)?;
    let mut ee = decode::decode(&original, mode);
    mutate(&mut ee);
    let candidate = build::build(&ee, mode)?;
    commit(dev, &original, &candidate)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// An in-memory EEPROM standing in for a physical device.
    struct FakeChip {
        words: [u16; FTX_EEPROM_SIZE / 2],
        writes: usize,
        resets: usize,
        latency: Option<u8>,
        fail_reads: bool,
        corrupt_writes: bool,
    }

    impl FakeChip {
        fn from_image(image: &Image) -> Self {
            let mut words = [0u16; FTX_EEPROM_SIZE / 2];
            for (i, w) in words.iter_mut().enumerate() {
                *w = (image[i * 2] as u16) | ((image[i * 2 + 1] as u16) << 8);
            }
            Self {
                words,
                writes: 0,
                resets: 0,
                latency: None,
                fail_reads: false,
                corrupt_writes: false,
            }
        }

        fn blank_programmed() -> Self {
            let mut image = [0u8; FTX_EEPROM_SIZE];
            image[0x08] = 0x80;
            checksum::stamp(&mut image);
            Self::from_image(&image)
        }
    }

    impl EepromAccess for FakeChip {
        fn read_word(&mut self, index: u16) -> Result<u16> {
            if self.fail_reads {
                return Err(Error::DeviceUnavailable);
            }
            Ok(self.words[index as usize])
        }

        fn write_word(&mut self, index: u16, value: u16) -> Result<()> {
            self.writes += 1;
            self.words[index as usize] = if self.corrupt_writes { !value } else { value };
            Ok(())
        }

        fn reset(&mut self) -> Result<()> {
            self.resets += 1;
            Ok(())
        }

        fn poll_status(&mut self) -> Result<()> {
            Ok(())
        }

        fn set_latency_timer(&mut self, latency_ms: u8) -> Result<()> {
            self.latency = Some(latency_ms);
            Ok(())
        }
    }

    #[test]
    fn unchanged_image_short_circuits_without_writes() {
        let mut chip = FakeChip::blank_programmed();
        let outcome = reprogram(&mut chip, StringMode::Wide, |_| {}).unwrap();
        assert_eq!(outcome, Outcome::Unchanged);
        assert_eq!(chip.writes, 0);
        assert_eq!(chip.resets, 0);
    }

    #[test]
    fn changed_image_is_rewritten_and_verified() {
        let mut chip = FakeChip::blank_programmed();
        let outcome = reprogram(&mut chip, StringMode::Wide, |ee| {
            ee.vendor_id = 0x0403;
            ee.product_id = 0x6015;
            ee.serial = "DN42".into();
        })
        .unwrap();
        assert_eq!(outcome, Outcome::Rewritten);
        assert_eq!(chip.writes, FTX_EEPROM_SIZE / 2);
        // One reset priming the write, one reloading the new settings.
        assert_eq!(chip.resets, 2);
        assert_eq!(chip.latency, Some(0x77));

        // The new contents decode to the mutated record.
        let (image, _) = read_and_verify(&mut chip).unwrap();
        let ee = decode::decode(&image, StringMode::Wide);
        assert_eq!(ee.product_id, 0x6015);
        assert_eq!(ee.serial, "DN42");
    }

    #[test]
    fn rewritten_chip_contents_equal_the_candidate_image() {
        let mut chip = FakeChip::blank_programmed();
        let (original, _) = read_and_verify(&mut chip).unwrap();

        // The caller builds the candidate itself, so it can inspect or
        // dump the exact bytes that end up on the chip.
        let mut ee = decode::decode(&original, StringMode::Wide);
        ee.manufacturer = "ACME".into();
        let candidate = build::build(&ee, StringMode::Wide).unwrap();

        let outcome = commit(&mut chip, &original, &candidate).unwrap();
        assert_eq!(outcome, Outcome::Rewritten);
        assert_eq!(read_image(&mut chip).unwrap(), candidate);
    }

    #[test]
    fn checksum_mismatch_aborts_before_decoding() {
        let mut chip = FakeChip::blank_programmed();
        chip.words[0x01] ^= 0x0001; // corrupt a covered word
        let err = reprogram(&mut chip, StringMode::Wide, |_| {}).unwrap_err();
        assert!(matches!(err, Error::ChecksumMismatch { .. }));
        assert_eq!(chip.writes, 0);
    }

    #[test]
    fn read_failure_is_fatal() {
        let mut chip = FakeChip::blank_programmed();
        chip.fail_reads = true;
        assert!(read_and_verify(&mut chip).is_err());
    }

    #[test]
    fn botched_write_reports_readback_failure() {
        let mut chip = FakeChip::blank_programmed();
        chip.corrupt_writes = true;
        let err = reprogram(&mut chip, StringMode::Wide, |ee| {
            ee.vendor_id = 0x0403;
        })
        .unwrap_err();
        // The corrupted readback fails its own checksum verification
        // before the comparison with the written value is reached.
        assert!(matches!(
            err,
            Error::ChecksumMismatch { .. } | Error::ReadbackMismatch { .. }
        ));
    }

    #[test]
    fn string_overflow_fails_before_any_write() {
        let mut chip = FakeChip::blank_programmed();
        let err = reprogram(&mut chip, StringMode::Narrow, |ee| {
            ee.manufacturer = "A".repeat(60);
            ee.product = "B".repeat(60);
        })
        .unwrap_err();
        assert!(matches!(err, Error::StringTableOverflow { .. }));
        assert_eq!(chip.writes, 0);
    }
}
