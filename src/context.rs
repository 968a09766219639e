//! The opened FT-X device handle.
//!
//! [`FtxDevice`] owns an opened, claimed USB device and provides the
//! vendor control transfers the EEPROM protocol needs: reset, modem status
//! polling, latency timer, and word-level EEPROM reads and writes. It uses
//! [nusb](https://crates.io/crates/nusb) as the USB backend; no `libusb`
//! required. All operations block until complete.

use std::time::Duration;

use log::debug;
use nusb::transfer::{ControlIn, ControlOut, ControlType, Recipient};
use nusb::MaybeFuture;

use crate::constants::*;
use crate::device_info::find_device;
use crate::error::{Error, Result};
use crate::program::EepromAccess;

/// Control transfer timeout.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// An opened FT-X USB device.
///
/// # Opening a device
///
/// ```no_run
/// use ftx_prog::FtxDevice;
///
/// let mut dev = FtxDevice::open(0x0403, 0x6015, None)?;
/// # Ok::<(), ftx_prog::Error>(())
/// ```
pub struct FtxDevice {
    #[allow(dead_code)] // Kept to ensure the USB device stays open
    device: nusb::Device,
    interface: nusb::Interface,
    /// The USB index value used in control transfers (1 for port A).
    usb_index: u16,
    timeout: Duration,
}

impl std::fmt::Debug for FtxDevice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FtxDevice")
            .field("usb_index", &self.usb_index)
            .finish_non_exhaustive()
    }
}

impl FtxDevice {
    /// Open the first device matching the given vendor and product IDs
    /// and, if given, the USB serial number string.
    pub fn open(vendor: u16, product: u16, serial: Option<&str>) -> Result<Self> {
        let dev_info = find_device(vendor, product, serial)?;
        let device = dev_info.open().wait()?;

        // Detach kernel driver and claim the single FT-X interface
        let interface = device.detach_and_claim_interface(0).wait()?;

        debug!(
            "opened {:04x}:{:04x} at bus {} addr {}",
            vendor,
            product,
            dev_info.busnum(),
            dev_info.device_address()
        );

        Ok(Self {
            device,
            interface,
            usb_index: 1,
            timeout: DEFAULT_TIMEOUT,
        })
    }

    /// Send a vendor OUT control transfer to the device.
    fn control_out(&self, request: u8, value: u16, index: u16) -> Result<()> {
        self.interface
            .control_out(
                ControlOut {
                    control_type: ControlType::Vendor,
                    recipient: Recipient::Device,
                    request,
                    value,
                    index,
                    data: &[],
                },
                self.timeout,
            )
            .wait()?;
        Ok(())
    }

    /// Send a vendor IN control transfer to the device.
    fn control_in(&self, request: u8, value: u16, index: u16, length: u16) -> Result<Vec<u8>> {
        let data = self
            .interface
            .control_in(
                ControlIn {
                    control_type: ControlType::Vendor,
                    recipient: Recipient::Device,
                    request,
                    value,
                    index,
                    length,
                },
                self.timeout,
            )
            .wait()?;
        Ok(data)
    }

    /// Perform a USB reset on the device.
    pub fn usb_reset(&mut self) -> Result<()> {
        self.control_out(SIO_RESET_REQUEST, SIO_RESET_SIO, self.usb_index)
    }

    /// Poll the modem status lines.
    ///
    /// The EEPROM write sequence issues this as part of the priming traced
    /// from MProg; the value itself is not interpreted.
    pub fn poll_modem_status(&self) -> Result<u16> {
        let data = self.control_in(SIO_POLL_MODEM_STATUS_REQUEST, 0, self.usb_index, 2)?;
        if data.len() < 2 {
            return Err(Error::DeviceUnavailable);
        }
        Ok((data[0] as u16) | ((data[1] as u16) << 8))
    }

    /// Set the latency timer value (1-255 ms).
    pub fn set_latency_timer(&self, latency_ms: u8) -> Result<()> {
        if latency_ms < 1 {
            return Err(Error::InvalidArgument("latency must be between 1 and 255"));
        }
        self.control_out(
            SIO_SET_LATENCY_TIMER_REQUEST,
            latency_ms as u16,
            self.usb_index,
        )
    }

    /// Read a single 16-bit EEPROM word.
    pub fn read_eeprom_word(&self, index: u16) -> Result<u16> {
        let data = self.control_in(SIO_READ_EEPROM_REQUEST, 0, index, 2)?;
        if data.len() < 2 {
            return Err(Error::DeviceUnavailable);
        }
        Ok((data[0] as u16) | ((data[1] as u16) << 8))
    }

    /// Write a single 16-bit EEPROM word.
    pub fn write_eeprom_word(&self, index: u16, value: u16) -> Result<()> {
        self.control_out(SIO_WRITE_EEPROM_REQUEST, value, index)
    }
}

impl EepromAccess for FtxDevice {
    fn read_word(&mut self, index: u16) -> Result<u16> {
        self.read_eeprom_word(index)
    }

    fn write_word(&mut self, index: u16, value: u16) -> Result<()> {
        self.write_eeprom_word(index, value)
    }

    fn reset(&mut self) -> Result<()> {
        self.usb_reset()
    }

    fn poll_status(&mut self) -> Result<()> {
        self.poll_modem_status().map(|_| ())
    }

    fn set_latency_timer(&mut self, latency_ms: u8) -> Result<()> {
        FtxDevice::set_latency_timer(self, latency_ms)
    }
}
