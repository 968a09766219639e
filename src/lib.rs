//! Pure Rust EEPROM programmer for FTDI FT-X series USB serial chips.
//!
//! The FT-X family (FT230X, FT231X, FT234XD, ...) stores its configuration
//! in a 256-byte EEPROM image: USB identity, power settings, CBUS pin
//! modes, electrical drive controls, descriptor strings, and a rolling
//! checksum in the final two bytes. This crate provides:
//!
//! - **The codec** ([`eeprom`]): bidirectional mapping between the raw
//!   image and a structured [`FtxEeprom`] record, including the checksum
//!   engine and the shared string table.
//! - **The protocol** ([`program`]): the read-verify-decode-mutate-encode-
//!   compare-write-readback sequence that makes field updates safe on a
//!   physical chip.
//! - **Device access** ([`FtxDevice`]): vendor control transfers over
//!   [nusb](https://crates.io/crates/nusb) — no C dependencies or `libusb`
//!   required.
//! - **Image files** ([`file`]): raw save/restore with checksum
//!   re-verification.
//!
//! # Example
//!
//! ```no_run
//! use ftx_prog::{program, FtxDevice, StringMode};
//!
//! let mut dev = FtxDevice::open(0x0403, 0x6015, None)?;
//! let outcome = program::reprogram(&mut dev, StringMode::Wide, |ee| {
//!     ee.serial = "DN42".into();
//!     ee.serial_number_avail = true;
//! })?;
//! println!("{outcome:?}");
//! # Ok::<(), ftx_prog::Error>(())
//! ```

pub mod constants;
pub mod context;
pub mod device_info;
pub mod eeprom;
pub mod error;
pub mod file;
pub mod program;

// ---- Convenience re-exports ----

pub use constants::{FTDI_VID, FTX_EEPROM_SIZE, FTX_PID};
pub use context::FtxDevice;
pub use eeprom::{CbusMode, FtxEeprom, Image, Rs232Line, StringMode};
pub use error::{Error, Result};
pub use program::Outcome;
