//! FT-X EEPROM codec: encoding, decoding, checksum, and string table.
//!
//! The 2048-bit configuration EEPROM on FT-X chips stores device
//! identification, USB descriptor strings, CBUS pin assignments, and
//! electrical settings as a flat 256-byte image. This module provides:
//!
//! - [`FtxEeprom`] - The decoded configuration record.
//! - [`build`] - Encode the record into a binary image.
//! - [`decode`] - Decode a binary image into the record.
//! - [`checksum`] - The rolling checksum guarding image integrity.
//! - [`strings`] - The shared variable-length string table.
//!
//! The codec itself performs no I/O; see [`program`](crate::program) for
//! the read-modify-write protocol against a physical chip.

pub mod build;
pub mod checksum;
pub mod decode;
pub mod strings;
mod types;

pub use strings::StringMode;
pub use types::{CbusMode, FtxEeprom, Rs232Line};

use crate::constants::FTX_EEPROM_SIZE;

/// A raw 256-byte EEPROM image.
pub type Image = [u8; FTX_EEPROM_SIZE];

/// Number of configurable CBUS pins on FT-X parts.
pub const CBUS_COUNT: usize = 7;

/// Size of the opaque user memory area (0x24-0x7F).
pub const USER_MEMORY_SIZE: usize = 92;

/// Size of the opaque factory configuration area (0x80-0x9F).
pub const FACTORY_CONFIG_SIZE: usize = 32;

/// Combined character budget for the three descriptor strings.
pub const STRING_BUDGET: usize = 96;

/// Byte offsets and bit masks of the FT-X image layout.
///
/// Every offset the codec touches lives here, so encode and decode cannot
/// drift apart. Layout quirks to be aware of: the USB release number is
/// stored major-at-0x07, minor-at-0x06, and bit 7 of the power config byte
/// is reserved and always written as 1.
pub(crate) mod layout {
    // ---- Byte offsets ----

    /// Misc config flag byte.
    pub const MISC_CONFIG: usize = 0x00;
    /// USB vendor ID, little-endian u16.
    pub const VENDOR_ID: usize = 0x02;
    /// USB product ID, little-endian u16.
    pub const PRODUCT_ID: usize = 0x04;
    /// USB release number minor byte.
    pub const RELEASE_MINOR: usize = 0x06;
    /// USB release number major byte.
    pub const RELEASE_MAJOR: usize = 0x07;
    /// Power config flag byte.
    pub const POWER_CONFIG: usize = 0x08;
    /// Max bus power in units of 2 mA.
    pub const MAX_POWER: usize = 0x09;
    /// Device and peripheral control flag byte.
    pub const PERIPHERAL_CONFIG: usize = 0x0A;
    /// RS232 line inversion flag byte.
    pub const INVERT: usize = 0x0B;
    /// DBUS/CBUS drive strength, slew and schmitt byte. 0x0D is unused.
    pub const DRIVE_CONFIG: usize = 0x0C;
    /// Manufacturer string descriptor (offset, length) pair.
    pub const MANUFACTURER_DESC: usize = 0x0E;
    /// Product string descriptor (offset, length) pair.
    pub const PRODUCT_DESC: usize = 0x10;
    /// Serial number string descriptor (offset, length) pair.
    pub const SERIAL_DESC: usize = 0x12;
    /// I2C slave address, little-endian u16.
    pub const I2C_SLAVE_ADDR: usize = 0x14;
    /// I2C device ID, little-endian 24-bit.
    pub const I2C_DEVICE_ID: usize = 0x16;
    /// Seven CBUS mode bytes, one per pin.
    pub const CBUS: usize = 0x1A;
    /// Opaque user memory area.
    pub const USER_MEMORY: usize = 0x24;
    /// Opaque factory configuration area.
    pub const FACTORY_CONFIG: usize = 0x80;
    /// Start of the shared string table.
    pub const STRING_AREA: usize = 0xA0;
    /// Stored checksum, little-endian u16 in the final two bytes.
    pub const CHECKSUM: usize = 0xFE;

    // ---- Misc config bits (byte 0x00) ----

    pub const BCD_ENABLE: u8 = 0x01;
    pub const FORCE_POWER_ENABLE: u8 = 0x02;
    pub const DEACTIVATE_SLEEP: u8 = 0x04;
    pub const RS485_ECHO_SUPPRESS: u8 = 0x08;
    pub const EXT_OSC: u8 = 0x10;
    pub const EXT_OSC_FEEDBACK: u8 = 0x20;
    pub const VBUS_SENSE_ALLOC: u8 = 0x40;
    pub const LOAD_VCP: u8 = 0x80;

    // ---- Power config bits (byte 0x08) ----

    pub const REMOTE_WAKEUP: u8 = 0x10;
    pub const SELF_POWERED: u8 = 0x20;
    /// Reserved bit, always written as 1.
    pub const POWER_RESERVED: u8 = 0x80;

    // ---- Peripheral config bits (byte 0x0A) ----

    pub const SUSPEND_PULL_DOWN: u8 = 0x04;
    pub const SERIAL_NUMBER_AVAIL: u8 = 0x08;
    pub const FT1248_CPOL: u8 = 0x10;
    pub const FT1248_BORD: u8 = 0x20;
    pub const FT1248_FLOW_CONTROL: u8 = 0x40;
    pub const DISABLE_I2C_SCHMITT: u8 = 0x80;

    // ---- Line inversion bits (byte 0x0B) ----

    pub const INVERT_TXD: u8 = 0x01;
    pub const INVERT_RXD: u8 = 0x02;
    pub const INVERT_RTS: u8 = 0x04;
    pub const INVERT_CTS: u8 = 0x08;
    pub const INVERT_DTR: u8 = 0x10;
    pub const INVERT_DSR: u8 = 0x20;
    pub const INVERT_DCD: u8 = 0x40;
    pub const INVERT_RI: u8 = 0x80;

    // ---- Drive config fields (byte 0x0C) ----

    /// DBUS drive strength, 2 bits.
    pub const DBUS_DRIVE_MASK: u8 = 0x03;
    pub const DBUS_SLOW_SLEW: u8 = 0x04;
    pub const DBUS_SCHMITT: u8 = 0x08;
    /// CBUS drive strength, 2 bits at bits 4-5.
    pub const CBUS_DRIVE_SHIFT: u8 = 4;
    pub const CBUS_SLOW_SLEW: u8 = 0x40;
    pub const CBUS_SCHMITT: u8 = 0x80;
}
