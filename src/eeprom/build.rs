//! EEPROM encoding: convert a decoded [`FtxEeprom`] record into the binary
//! image format.

use super::{checksum, layout, strings, Image, StringMode};
use super::{FtxEeprom, CBUS_COUNT};
use crate::constants::FTX_EEPROM_SIZE;
use crate::error::Result;

/// Build the binary EEPROM image from a decoded record.
///
/// Fails with [`StringTableOverflow`](crate::Error::StringTableOverflow)
/// before any field is written if the three descriptor strings exceed
/// their shared area. On success the returned image carries a freshly
/// stamped checksum in its final two bytes.
pub fn build(ee: &FtxEeprom, mode: StringMode) -> Result<Image> {
    let (manufacturer, product, serial) = ee.strings();
    strings::check_budget(manufacturer, product, serial)?;

    let mut image = [0u8; FTX_EEPROM_SIZE];

    // Misc config
    let mut misc = 0u8;
    if ee.bcd_enable {
        misc |= layout::BCD_ENABLE;
    }
    if ee.force_power_enable {
        misc |= layout::FORCE_POWER_ENABLE;
    }
    if ee.deactivate_sleep {
        misc |= layout::DEACTIVATE_SLEEP;
    }
    if ee.rs485_echo_suppress {
        misc |= layout::RS485_ECHO_SUPPRESS;
    }
    if ee.external_oscillator {
        misc |= layout::EXT_OSC;
    }
    if ee.external_oscillator_feedback {
        misc |= layout::EXT_OSC_FEEDBACK;
    }
    if ee.vbus_sense_alloc {
        misc |= layout::VBUS_SENSE_ALLOC;
    }
    if ee.load_vcp {
        misc |= layout::LOAD_VCP;
    }
    image[layout::MISC_CONFIG] = misc;

    // USB VID/PID
    image[layout::VENDOR_ID] = ee.vendor_id as u8;
    image[layout::VENDOR_ID + 1] = (ee.vendor_id >> 8) as u8;
    image[layout::PRODUCT_ID] = ee.product_id as u8;
    image[layout::PRODUCT_ID + 1] = (ee.product_id >> 8) as u8;

    // USB release number. Major sits above minor; this mirrors the
    // physical layout and is not a little-endian u16.
    image[layout::RELEASE_MAJOR] = ee.release_major;
    image[layout::RELEASE_MINOR] = ee.release_minor;

    // Power config
    let mut power = layout::POWER_RESERVED; // reserved bit, always set
    if ee.remote_wakeup {
        power |= layout::REMOTE_WAKEUP;
    }
    if ee.self_powered {
        power |= layout::SELF_POWERED;
    }
    image[layout::POWER_CONFIG] = power;
    image[layout::MAX_POWER] = ee.max_power; // units of 2 mA

    // Device and peripheral control
    let mut periph = 0u8;
    if ee.suspend_pull_down {
        periph |= layout::SUSPEND_PULL_DOWN;
    }
    if ee.serial_number_avail {
        periph |= layout::SERIAL_NUMBER_AVAIL;
    }
    if ee.ft1248_cpol {
        periph |= layout::FT1248_CPOL;
    }
    if ee.ft1248_bord {
        periph |= layout::FT1248_BORD;
    }
    if ee.ft1248_flow_control {
        periph |= layout::FT1248_FLOW_CONTROL;
    }
    if ee.disable_i2c_schmitt {
        periph |= layout::DISABLE_I2C_SCHMITT;
    }
    image[layout::PERIPHERAL_CONFIG] = periph;

    // RS232 line inversion
    let mut invert = 0u8;
    if ee.invert_txd {
        invert |= layout::INVERT_TXD;
    }
    if ee.invert_rxd {
        invert |= layout::INVERT_RXD;
    }
    if ee.invert_rts {
        invert |= layout::INVERT_RTS;
    }
    if ee.invert_cts {
        invert |= layout::INVERT_CTS;
    }
    if ee.invert_dtr {
        invert |= layout::INVERT_DTR;
    }
    if ee.invert_dsr {
        invert |= layout::INVERT_DSR;
    }
    if ee.invert_dcd {
        invert |= layout::INVERT_DCD;
    }
    if ee.invert_ri {
        invert |= layout::INVERT_RI;
    }
    image[layout::INVERT] = invert;

    // DBUS and CBUS drive control
    let mut drive = ee.dbus_drive & layout::DBUS_DRIVE_MASK;
    if ee.dbus_slow_slew {
        drive |= layout::DBUS_SLOW_SLEW;
    }
    if ee.dbus_schmitt {
        drive |= layout::DBUS_SCHMITT;
    }
    drive |= (ee.cbus_drive & layout::DBUS_DRIVE_MASK) << layout::CBUS_DRIVE_SHIFT;
    if ee.cbus_slow_slew {
        drive |= layout::CBUS_SLOW_SLEW;
    }
    if ee.cbus_schmitt {
        drive |= layout::CBUS_SCHMITT;
    }
    image[layout::DRIVE_CONFIG] = drive;

    // String table, manufacturer -> product -> serial with a shared
    // cursor. Empty strings emit nothing and leave their descriptor
    // zeroed, so an image without strings re-encodes unchanged.
    let mut cursor = layout::STRING_AREA;
    let table = [
        (layout::MANUFACTURER_DESC, &ee.manufacturer),
        (layout::PRODUCT_DESC, &ee.product),
        (layout::SERIAL_DESC, &ee.serial),
    ];
    for (desc, text) in table {
        if !text.is_empty() {
            strings::encode_string(&mut image, mode, desc, text, &mut cursor);
        }
    }

    // I2C
    image[layout::I2C_SLAVE_ADDR] = ee.i2c_slave_addr as u8;
    image[layout::I2C_SLAVE_ADDR + 1] = (ee.i2c_slave_addr >> 8) as u8;
    image[layout::I2C_DEVICE_ID] = ee.i2c_device_id as u8;
    image[layout::I2C_DEVICE_ID + 1] = (ee.i2c_device_id >> 8) as u8;
    image[layout::I2C_DEVICE_ID + 2] = (ee.i2c_device_id >> 16) as u8;

    // CBUS pin modes
    for c in 0..CBUS_COUNT {
        image[layout::CBUS + c] = ee.cbus[c];
    }

    // Opaque areas, copied through unmodified
    image[layout::USER_MEMORY..layout::USER_MEMORY + ee.user_memory.len()]
        .copy_from_slice(&ee.user_memory);
    image[layout::FACTORY_CONFIG..layout::FACTORY_CONFIG + ee.factory_config.len()]
        .copy_from_slice(&ee.factory_config);

    checksum::stamp(&mut image);
    Ok(image)
}
