//! Protocol constants for FT-X chip communication.
//!
//! These constants define the USB vendor request codes and EEPROM geometry
//! used on the wire. Most users should not need them directly.

// ---- FTDI Vendor ID and the FT-X Product ID ----

/// Default FTDI vendor ID.
pub const FTDI_VID: u16 = 0x0403;

/// Default FT230X / FT-X series product ID.
pub const FTX_PID: u16 = 0x6015;

// ---- SIO vendor request codes ----

/// Reset the port.
pub(crate) const SIO_RESET_REQUEST: u8 = 0x00;
/// Poll modem status.
pub(crate) const SIO_POLL_MODEM_STATUS_REQUEST: u8 = 0x05;
/// Set latency timer.
pub(crate) const SIO_SET_LATENCY_TIMER_REQUEST: u8 = 0x09;
/// Read EEPROM.
pub(crate) const SIO_READ_EEPROM_REQUEST: u8 = 0x90;
/// Write EEPROM.
pub(crate) const SIO_WRITE_EEPROM_REQUEST: u8 = 0x91;

// ---- Reset sub-commands ----

/// SIO reset (device reset).
pub(crate) const SIO_RESET_SIO: u16 = 0;

// ---- EEPROM constants ----

/// The FT-X configuration EEPROM image size in bytes.
pub const FTX_EEPROM_SIZE: usize = 256;

/// Latency timer value set before EEPROM writes, traced from MProg.
pub(crate) const EEPROM_WRITE_LATENCY_MS: u8 = 0x77;
