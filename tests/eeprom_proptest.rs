//! Property-based tests for EEPROM build/decode round-trips.
//!
//! Uses `proptest` to generate random configuration records and verify
//! that build() followed by decode() preserves every field, in both
//! string encode modes.

use ftx_prog::eeprom::{build, checksum, decode, FACTORY_CONFIG_SIZE, USER_MEMORY_SIZE};
use ftx_prog::{FtxEeprom, StringMode};
use proptest::prelude::*;

/// Generate a short ASCII string suitable for the shared string area.
fn short_ascii_string() -> impl Strategy<Value = String> {
    "[A-Za-z0-9 ]{0,12}"
}

fn string_mode() -> impl Strategy<Value = StringMode> {
    prop_oneof![Just(StringMode::Wide), Just(StringMode::Narrow)]
}

prop_compose! {
    /// A record with every field drawn from its valid domain.
    fn arb_record()(
        misc in prop::array::uniform8(any::<bool>()),
        vendor_id in any::<u16>(),
        product_id in any::<u16>(),
        release_major in any::<u8>(),
        release_minor in any::<u8>(),
        remote_wakeup in any::<bool>(),
        self_powered in any::<bool>(),
        max_power in any::<u8>(),
        periph in prop::array::uniform6(any::<bool>()),
        invert in prop::array::uniform8(any::<bool>()),
        dbus_drive in 0u8..=3,
        dbus_slow_slew in any::<bool>(),
        dbus_schmitt in any::<bool>(),
        cbus_drive in 0u8..=3,
        cbus_slow_slew in any::<bool>(),
        cbus_schmitt in any::<bool>(),
        manufacturer in short_ascii_string(),
        product in short_ascii_string(),
        serial in short_ascii_string(),
        i2c_slave_addr in any::<u16>(),
        i2c_device_id in 0u32..=0xFF_FFFF,
        cbus in prop::array::uniform7(0u8..22),
        user_memory in prop::array::uniform::<_, USER_MEMORY_SIZE>(any::<u8>()),
        factory_config in prop::array::uniform::<_, FACTORY_CONFIG_SIZE>(any::<u8>()),
    ) -> FtxEeprom {
        let mut ee = FtxEeprom::default();
        [
            ee.bcd_enable,
            ee.force_power_enable,
            ee.deactivate_sleep,
            ee.rs485_echo_suppress,
            ee.external_oscillator,
            ee.external_oscillator_feedback,
            ee.vbus_sense_alloc,
            ee.load_vcp,
        ] = misc;
        ee.vendor_id = vendor_id;
        ee.product_id = product_id;
        ee.release_major = release_major;
        ee.release_minor = release_minor;
        ee.remote_wakeup = remote_wakeup;
        ee.self_powered = self_powered;
        ee.max_power = max_power;
        [
            ee.suspend_pull_down,
            ee.serial_number_avail,
            ee.ft1248_cpol,
            ee.ft1248_bord,
            ee.ft1248_flow_control,
            ee.disable_i2c_schmitt,
        ] = periph;
        [
            ee.invert_txd,
            ee.invert_rxd,
            ee.invert_rts,
            ee.invert_cts,
            ee.invert_dtr,
            ee.invert_dsr,
            ee.invert_dcd,
            ee.invert_ri,
        ] = invert;
        ee.dbus_drive = dbus_drive;
        ee.dbus_slow_slew = dbus_slow_slew;
        ee.dbus_schmitt = dbus_schmitt;
        ee.cbus_drive = cbus_drive;
        ee.cbus_slow_slew = cbus_slow_slew;
        ee.cbus_schmitt = cbus_schmitt;
        ee.manufacturer = manufacturer;
        ee.product = product;
        ee.serial = serial;
        ee.i2c_slave_addr = i2c_slave_addr;
        ee.i2c_device_id = i2c_device_id;
        ee.cbus = cbus;
        ee.user_memory = user_memory;
        ee.factory_config = factory_config;
        ee
    }
}

proptest! {
    /// Round-trip: build + decode preserves every field.
    #[test]
    fn eeprom_round_trip(ee in arb_record(), mode in string_mode()) {
        let image = build::build(&ee, mode).unwrap();
        let decoded = decode::decode(&image, mode);
        prop_assert_eq!(decoded, ee);
    }

    /// Every built image carries a valid checksum.
    #[test]
    fn built_images_verify(ee in arb_record(), mode in string_mode()) {
        let image = build::build(&ee, mode).unwrap();
        prop_assert!(checksum::verify(&image).is_ok());
    }

    /// The reserved bit at 0x08 is set for any record.
    #[test]
    fn reserved_bit_always_set(ee in arb_record(), mode in string_mode()) {
        let image = build::build(&ee, mode).unwrap();
        prop_assert_eq!(image[0x08] & 0x80, 0x80);
    }

    /// Flipping any single bit in a covered range invalidates the checksum.
    #[test]
    fn single_bit_corruption_is_detected(
        ee in arb_record(),
        byte in prop::sample::select(
            (0x00..0x24usize).chain(0x80..0xFE).collect::<Vec<_>>()
        ),
        bit in 0u8..8,
    ) {
        let mut image = build::build(&ee, StringMode::Wide).unwrap();
        image[byte] ^= 1 << bit;
        prop_assert!(checksum::verify(&image).is_err());
    }
}
