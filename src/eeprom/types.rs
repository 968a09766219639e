//! EEPROM data types and structures.

use super::{CBUS_COUNT, FACTORY_CONFIG_SIZE, USER_MEMORY_SIZE};
use crate::constants::{FTDI_VID, FTX_PID};

/// Decoded FT-X EEPROM contents.
///
/// This structure mirrors the logical fields stored in the FT-X chip's
/// 256-byte configuration EEPROM. Fields are populated by
/// [`decode`](super::decode) and consumed by [`build`](super::build).
/// It owns no I/O; a record is created empty, filled from a freshly read
/// image, mutated in place, and encoded exactly once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FtxEeprom {
    // ---- Misc config ----
    /// Battery charge detect (BCD) enabled.
    pub bcd_enable: bool,
    /// Force the power enable signal on CBUS.
    pub force_power_enable: bool,
    /// Deactivate sleep in battery charge mode.
    pub deactivate_sleep: bool,
    /// RS485 echo suppression enabled.
    pub rs485_echo_suppress: bool,
    /// External oscillator enabled.
    pub external_oscillator: bool,
    /// External oscillator feedback resistor enabled.
    pub external_oscillator_feedback: bool,
    /// A CBUS pin is allocated to VBUS sense mode.
    pub vbus_sense_alloc: bool,
    /// Load the virtual COM port (VCP) drivers.
    pub load_vcp: bool,

    // ---- USB identity ----
    /// USB Vendor ID.
    pub vendor_id: u16,
    /// USB Product ID.
    pub product_id: u16,
    /// USB release number, major part.
    pub release_major: u8,
    /// USB release number, minor part.
    pub release_minor: u8,

    // ---- Power ----
    /// Device supports USB remote wakeup.
    pub remote_wakeup: bool,
    /// Device is self-powered (vs bus-powered).
    pub self_powered: bool,
    /// Maximum bus power in units of 2 mA.
    pub max_power: u8,

    // ---- Device and peripheral control ----
    /// Pull pins down during USB suspend.
    pub suspend_pull_down: bool,
    /// Indicate that a USB serial number is available.
    pub serial_number_avail: bool,
    /// FT1248 clock polarity (true = active high).
    pub ft1248_cpol: bool,
    /// FT1248 bit order (true = LSB first).
    pub ft1248_bord: bool,
    /// FT1248 flow control enabled.
    pub ft1248_flow_control: bool,
    /// Schmitt triggers on the I2C interface disabled.
    pub disable_i2c_schmitt: bool,

    // ---- RS232 line inversion ----
    /// Invert TXD.
    pub invert_txd: bool,
    /// Invert RXD.
    pub invert_rxd: bool,
    /// Invert RTS.
    pub invert_rts: bool,
    /// Invert CTS.
    pub invert_cts: bool,
    /// Invert DTR.
    pub invert_dtr: bool,
    /// Invert DSR.
    pub invert_dsr: bool,
    /// Invert DCD.
    pub invert_dcd: bool,
    /// Invert RI.
    pub invert_ri: bool,

    // ---- DBUS and CBUS electrical control ----
    /// DBUS drive strength (0-3, meaning 4/8/12/16 mA).
    pub dbus_drive: u8,
    /// DBUS slow slew rate.
    pub dbus_slow_slew: bool,
    /// DBUS schmitt trigger inputs.
    pub dbus_schmitt: bool,
    /// CBUS drive strength (0-3, meaning 4/8/12/16 mA).
    pub cbus_drive: u8,
    /// CBUS slow slew rate.
    pub cbus_slow_slew: bool,
    /// CBUS schmitt trigger inputs.
    pub cbus_schmitt: bool,

    // ---- String descriptors ----
    /// Manufacturer name.
    pub manufacturer: String,
    /// Product description.
    pub product: String,
    /// Serial number.
    pub serial: String,

    // ---- I2C ----
    /// I2C slave address.
    pub i2c_slave_addr: u16,
    /// I2C device ID (24-bit).
    pub i2c_device_id: u32,

    // ---- CBUS pin modes ----
    /// CBUS pin mode bytes, one per pin.
    ///
    /// Stored raw: values a [`CbusMode`] does not name are preserved on
    /// decode rather than rejected. The CLI boundary restricts input to
    /// the named modes.
    pub cbus: [u8; CBUS_COUNT],

    // ---- Opaque areas, copied through unmodified ----
    /// User memory area (0x24-0x7F).
    pub user_memory: [u8; USER_MEMORY_SIZE],
    /// Factory configuration area (0x80-0x9F).
    pub factory_config: [u8; FACTORY_CONFIG_SIZE],

    // ---- Device selection; never encoded into the image ----
    /// Vendor ID of the device to reprogram.
    pub old_vid: u16,
    /// Product ID of the device to reprogram.
    pub old_pid: u16,
    /// Serial number of the device to reprogram, if it must be matched.
    pub old_serial: Option<String>,
}

impl Default for FtxEeprom {
    fn default() -> Self {
        Self {
            bcd_enable: false,
            force_power_enable: false,
            deactivate_sleep: false,
            rs485_echo_suppress: false,
            external_oscillator: false,
            external_oscillator_feedback: false,
            vbus_sense_alloc: false,
            load_vcp: false,
            vendor_id: 0,
            product_id: 0,
            release_major: 0,
            release_minor: 0,
            remote_wakeup: false,
            self_powered: false,
            max_power: 0,
            suspend_pull_down: false,
            serial_number_avail: false,
            ft1248_cpol: false,
            ft1248_bord: false,
            ft1248_flow_control: false,
            disable_i2c_schmitt: false,
            invert_txd: false,
            invert_rxd: false,
            invert_rts: false,
            invert_cts: false,
            invert_dtr: false,
            invert_dsr: false,
            invert_dcd: false,
            invert_ri: false,
            dbus_drive: 0,
            dbus_slow_slew: false,
            dbus_schmitt: false,
            cbus_drive: 0,
            cbus_slow_slew: false,
            cbus_schmitt: false,
            manufacturer: String::new(),
            product: String::new(),
            serial: String::new(),
            i2c_slave_addr: 0,
            i2c_device_id: 0,
            cbus: [0; CBUS_COUNT],
            user_memory: [0; USER_MEMORY_SIZE],
            factory_config: [0; FACTORY_CONFIG_SIZE],
            old_vid: FTDI_VID,
            old_pid: FTX_PID,
            old_serial: None,
        }
    }
}

impl FtxEeprom {
    /// Get the descriptor strings as a (manufacturer, product, serial) tuple.
    pub fn strings(&self) -> (&str, &str, &str) {
        (&self.manufacturer, &self.product, &self.serial)
    }

    /// Set an RS232 line inversion flag by line.
    pub fn toggle_invert(&mut self, line: Rs232Line) {
        let flag = match line {
            Rs232Line::Txd => &mut self.invert_txd,
            Rs232Line::Rxd => &mut self.invert_rxd,
            Rs232Line::Rts => &mut self.invert_rts,
            Rs232Line::Cts => &mut self.invert_cts,
            Rs232Line::Dtr => &mut self.invert_dtr,
            Rs232Line::Dsr => &mut self.invert_dsr,
            Rs232Line::Dcd => &mut self.invert_dcd,
            Rs232Line::Ri => &mut self.invert_ri,
        };
        *flag = !*flag;
    }
}

/// An RS232 signal line whose polarity can be inverted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rs232Line {
    Txd,
    Rxd,
    Rts,
    Cts,
    Dtr,
    Dsr,
    Dcd,
    Ri,
}

impl Rs232Line {
    /// All lines, in EEPROM bit order.
    pub const ALL: [Rs232Line; 8] = [
        Rs232Line::Txd,
        Rs232Line::Rxd,
        Rs232Line::Rts,
        Rs232Line::Cts,
        Rs232Line::Dtr,
        Rs232Line::Dsr,
        Rs232Line::Dcd,
        Rs232Line::Ri,
    ];

    /// Canonical lower-case spelling.
    pub fn name(self) -> &'static str {
        match self {
            Rs232Line::Txd => "txd",
            Rs232Line::Rxd => "rxd",
            Rs232Line::Rts => "rts",
            Rs232Line::Cts => "cts",
            Rs232Line::Dtr => "dtr",
            Rs232Line::Dsr => "dsr",
            Rs232Line::Dcd => "dcd",
            Rs232Line::Ri => "ri",
        }
    }

    /// Parse a line name, case-insensitively.
    pub fn from_name(name: &str) -> Option<Rs232Line> {
        Rs232Line::ALL
            .into_iter()
            .find(|l| l.name().eq_ignore_ascii_case(name))
    }
}

/// One of the 22 functions a CBUS pin can be assigned.
///
/// The discriminants are the raw byte values stored in the image. The
/// canonical spellings (accepted case-insensitively on the command line)
/// follow FTDI's documentation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum CbusMode {
    Tristate = 0,
    RxLed = 1,
    TxLed = 2,
    TxRxLed = 3,
    PwrEn = 4,
    Sleep = 5,
    Drive0 = 6,
    Drive1 = 7,
    Gpio = 8,
    TxdEn = 9,
    Clk24MHz = 10,
    Clk12MHz = 11,
    Clk6MHz = 12,
    BcdCharger = 13,
    BcdChargerN = 14,
    I2cTxe = 15,
    I2cRxf = 16,
    VbusSense = 17,
    BitBangWr = 18,
    BitBangRd = 19,
    TimeStamp = 20,
    KeepAwake = 21,
}

impl CbusMode {
    /// All modes, in raw value order.
    pub const ALL: [CbusMode; 22] = [
        CbusMode::Tristate,
        CbusMode::RxLed,
        CbusMode::TxLed,
        CbusMode::TxRxLed,
        CbusMode::PwrEn,
        CbusMode::Sleep,
        CbusMode::Drive0,
        CbusMode::Drive1,
        CbusMode::Gpio,
        CbusMode::TxdEn,
        CbusMode::Clk24MHz,
        CbusMode::Clk12MHz,
        CbusMode::Clk6MHz,
        CbusMode::BcdCharger,
        CbusMode::BcdChargerN,
        CbusMode::I2cTxe,
        CbusMode::I2cRxf,
        CbusMode::VbusSense,
        CbusMode::BitBangWr,
        CbusMode::BitBangRd,
        CbusMode::TimeStamp,
        CbusMode::KeepAwake,
    ];

    /// The raw byte value stored in the image.
    pub fn raw(self) -> u8 {
        self as u8
    }

    /// Look up a mode from its raw byte value.
    pub fn from_raw(value: u8) -> Option<CbusMode> {
        CbusMode::ALL.get(value as usize).copied()
    }

    /// Canonical external spelling.
    pub fn name(self) -> &'static str {
        match self {
            CbusMode::Tristate => "Tristate",
            CbusMode::RxLed => "RxLED",
            CbusMode::TxLed => "TxLED",
            CbusMode::TxRxLed => "TxRxLED",
            CbusMode::PwrEn => "PWREN",
            CbusMode::Sleep => "SLEEP",
            CbusMode::Drive0 => "Drive_0",
            CbusMode::Drive1 => "Drive_1",
            CbusMode::Gpio => "GPIO",
            CbusMode::TxdEn => "TXDEN",
            CbusMode::Clk24MHz => "CLK24MHz",
            CbusMode::Clk12MHz => "CLK12MHz",
            CbusMode::Clk6MHz => "CLK6MHz",
            CbusMode::BcdCharger => "BCD_Charger",
            CbusMode::BcdChargerN => "BCD_Charger#",
            CbusMode::I2cTxe => "I2C_TXE",
            CbusMode::I2cRxf => "I2C_RXF",
            CbusMode::VbusSense => "VBUS_Sense",
            CbusMode::BitBangWr => "BitBang_WR",
            CbusMode::BitBangRd => "BitBang_RD",
            CbusMode::TimeStamp => "Time_Stamp",
            CbusMode::KeepAwake => "Keep_Awake",
        }
    }

    /// Parse a mode from its canonical spelling, case-insensitively.
    pub fn from_name(name: &str) -> Option<CbusMode> {
        CbusMode::ALL
            .into_iter()
            .find(|m| m.name().eq_ignore_ascii_case(name))
    }
}

impl std::fmt::Display for CbusMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cbus_mode_raw_round_trip() {
        for mode in CbusMode::ALL {
            assert_eq!(CbusMode::from_raw(mode.raw()), Some(mode));
        }
        assert_eq!(CbusMode::from_raw(22), None);
        assert_eq!(CbusMode::from_raw(0xFF), None);
    }

    #[test]
    fn cbus_mode_name_round_trip() {
        for mode in CbusMode::ALL {
            assert_eq!(CbusMode::from_name(mode.name()), Some(mode));
        }
        assert_eq!(CbusMode::from_name("keep_awake"), Some(CbusMode::KeepAwake));
        assert_eq!(CbusMode::from_name("bogus"), None);
    }

    #[test]
    fn rs232_line_names() {
        for line in Rs232Line::ALL {
            assert_eq!(Rs232Line::from_name(line.name()), Some(line));
        }
        assert_eq!(Rs232Line::from_name("TXD"), Some(Rs232Line::Txd));
        assert_eq!(Rs232Line::from_name("gnd"), None);
    }

    #[test]
    fn strings_accessor_returns_all_three() {
        let mut ee = FtxEeprom::default();
        ee.manufacturer = "FTDI".into();
        ee.product = "FT230X".into();
        ee.serial = "DN001".into();
        assert_eq!(ee.strings(), ("FTDI", "FT230X", "DN001"));
    }

    #[test]
    fn default_record_is_empty_with_ftx_identity() {
        let ee = FtxEeprom::default();
        assert_eq!(ee.vendor_id, 0);
        assert_eq!(ee.old_vid, 0x0403);
        assert_eq!(ee.old_pid, 0x6015);
        assert!(ee.manufacturer.is_empty());
        assert_eq!(ee.cbus, [0; CBUS_COUNT]);
    }
}
