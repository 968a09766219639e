//! Device discovery.
//!
//! Finds the device to reprogram by vendor/product ID and, when several
//! are connected, by USB serial number string.

use std::time::Duration;

use nusb::{DeviceInfo, MaybeFuture};

use crate::error::{Error, Result};

/// USB string descriptor read timeout.
const STRING_TIMEOUT: Duration = Duration::from_secs(1);

/// Find a single device matching the given vendor/product IDs and, if
/// given, the serial number string.
///
/// Matching the serial requires opening each candidate temporarily to read
/// its string descriptor.
pub fn find_device(vendor: u16, product: u16, serial: Option<&str>) -> Result<DeviceInfo> {
    let candidates: Vec<DeviceInfo> = nusb::list_devices()
        .wait()?
        .filter(|d| d.vendor_id() == vendor && d.product_id() == product)
        .collect();

    for dev_info in candidates {
        if let Some(expected) = serial {
            let device = dev_info.open().wait()?;
            let desc = device.device_descriptor();
            let Some(idx) = desc.serial_number_string_index() else {
                continue;
            };
            let actual = device
                .get_string_descriptor(idx, 0x0409, STRING_TIMEOUT)
                .wait()
                .unwrap_or_default();
            if actual != expected {
                continue;
            }
        }
        return Ok(dev_info);
    }

    Err(Error::DeviceNotFound)
}
