//! Command-line EEPROM programmer for FTDI FT-X series chips.
//!
//! Reads the connected chip's EEPROM, applies the requested field changes,
//! and rewrites the image only when it actually differs, verifying the
//! write afterwards.

use std::path::PathBuf;

use anyhow::{bail, Context};
use clap::{ArgAction, Parser};

use ftx_prog::eeprom::{build, decode, CbusMode, FtxEeprom, Rs232Line, StringMode, CBUS_COUNT};
use ftx_prog::{file, program, FtxDevice, Image, Outcome, FTDI_VID, FTX_PID};

#[derive(Parser)]
#[command(name = "ftx-prog", version, about = "EEPROM programmer for FTDI FT-X series chips")]
struct Cli {
    /// Dump the decoded EEPROM configuration to stdout
    #[arg(long)]
    dump: bool,

    /// Show debug info and raw EEPROM contents
    #[arg(long)]
    verbose: bool,

    /// Save the original EEPROM contents to a file
    #[arg(long, value_name = "FILE")]
    save: Option<PathBuf>,

    /// Program the EEPROM contents from a previously saved file
    #[arg(long, value_name = "FILE")]
    restore: Option<PathBuf>,

    /// Encode strings one byte per character instead of the FT_Prog format
    #[arg(long = "8bit-strings")]
    narrow_strings: bool,

    /// Assign a CBUS pin function, e.g. `--cbus 2 TxLED`
    #[arg(long, num_args = 2, value_names = ["PIN", "MODE"], action = ArgAction::Append)]
    cbus: Vec<String>,

    /// Toggle the inversion of an RS232 line (txd, rxd, rts, cts, dtr, dsr, dcd, ri)
    #[arg(long, value_name = "LINE", action = ArgAction::Append, value_parser = parse_line)]
    invert: Vec<Rs232Line>,

    /// New USB manufacturer string
    #[arg(long, value_name = "STRING")]
    manufacturer: Option<String>,

    /// New USB product name string
    #[arg(long, value_name = "STRING")]
    product: Option<String>,

    /// New USB serial number string
    #[arg(long = "new-serial-number", value_name = "STRING")]
    new_serial_number: Option<String>,

    /// Current serial number of the device to be reprogrammed
    #[arg(long = "old-serial-number", value_name = "STRING")]
    old_serial_number: Option<String>,

    /// Max bus current in milliamperes (stored in units of 2 mA)
    #[arg(long = "max-bus-power", value_name = "MILLIAMPS", value_parser = parse_number)]
    max_bus_power: Option<u32>,

    /// Specify whether the chip is bus-powered or self-powered
    #[arg(long = "self-powered", value_name = "ON|OFF", value_parser = parse_switch)]
    self_powered: Option<bool>,

    /// Force I/O pins into logic low state on suspend
    #[arg(long = "suspend-pull-down", value_name = "ON|OFF", value_parser = parse_switch)]
    suspend_pull_down: Option<bool>,

    /// Control whether the VCP drivers are loaded
    #[arg(long = "load-vcp", value_name = "ON|OFF", value_parser = parse_switch)]
    load_vcp: Option<bool>,

    /// Allow the interface to be woken up by something other than USB
    #[arg(long = "remote-wakeup", value_name = "ON|OFF", value_parser = parse_switch)]
    remote_wakeup: Option<bool>,

    /// FT1248 clock polarity (active high or active low)
    #[arg(long = "ft1248-cpol", value_name = "HIGH|LOW", value_parser = parse_polarity)]
    ft1248_cpol: Option<bool>,

    /// FT1248 bit order (msb or lsb first)
    #[arg(long = "ft1248-bord", value_name = "MSB|LSB", value_parser = parse_bit_order)]
    ft1248_bord: Option<bool>,

    /// FT1248 flow control
    #[arg(long = "ft1248-flow-control", value_name = "ON|OFF", value_parser = parse_switch)]
    ft1248_flow_control: Option<bool>,

    /// Schmitt trigger on the I2C interface (the stored bit is disable-positive)
    #[arg(long = "i2c-schmitt", value_name = "ON|OFF", value_parser = parse_switch)]
    i2c_schmitt: Option<bool>,

    /// I2C slave address
    #[arg(long = "i2c-slave-address", value_name = "NUMBER", value_parser = parse_number)]
    i2c_slave_address: Option<u32>,

    /// I2C device ID (24-bit)
    #[arg(long = "i2c-device-id", value_name = "NUMBER", value_parser = parse_number)]
    i2c_device_id: Option<u32>,

    /// Enable echo suppression on the RS485 bus
    #[arg(long = "rs485-echo-supp", value_name = "ON|OFF", value_parser = parse_switch)]
    rs485_echo_supp: Option<bool>,

    /// Current vendor ID of the device to be reprogrammed (default 0x0403)
    #[arg(long = "old-vid", value_name = "NUMBER", value_parser = parse_u16)]
    old_vid: Option<u16>,

    /// Current product ID of the device to be reprogrammed (default 0x6015)
    #[arg(long = "old-pid", value_name = "NUMBER", value_parser = parse_u16)]
    old_pid: Option<u16>,

    /// New vendor ID to be programmed
    #[arg(long = "new-vid", value_name = "NUMBER", value_parser = parse_u16)]
    new_vid: Option<u16>,

    /// New product ID to be programmed
    #[arg(long = "new-pid", value_name = "NUMBER", value_parser = parse_u16)]
    new_pid: Option<u16>,
}

/// Accepted boolean spellings, matched case-insensitively.
fn parse_switch(s: &str) -> Result<bool, String> {
    match s.to_ascii_lowercase().as_str() {
        "on" | "true" | "yes" | "enable" | "1" => Ok(true),
        "off" | "false" | "no" | "disable" | "0" => Ok(false),
        _ => Err(format!("expected on/off, true/false, yes/no, enable/disable or 0/1, got \"{s}\"")),
    }
}

fn parse_polarity(s: &str) -> Result<bool, String> {
    match s.to_ascii_lowercase().as_str() {
        "high" => Ok(true),
        "low" => Ok(false),
        _ => Err(format!("expected high or low, got \"{s}\"")),
    }
}

fn parse_bit_order(s: &str) -> Result<bool, String> {
    match s.to_ascii_lowercase().as_str() {
        "lsb" => Ok(true),
        "msb" => Ok(false),
        _ => Err(format!("expected msb or lsb, got \"{s}\"")),
    }
}

fn parse_line(s: &str) -> Result<Rs232Line, String> {
    Rs232Line::from_name(s).ok_or_else(|| format!("unknown RS232 line \"{s}\""))
}

/// Parse a decimal or 0x-prefixed hexadecimal number.
fn parse_number(s: &str) -> Result<u32, String> {
    let t = s.trim();
    let parsed = if let Some(hex) = t.strip_prefix("0x").or_else(|| t.strip_prefix("0X")) {
        u32::from_str_radix(hex, 16)
    } else {
        t.parse()
    };
    parsed.map_err(|e| format!("{s}: {e}"))
}

fn parse_u16(s: &str) -> Result<u16, String> {
    let v = parse_number(s)?;
    u16::try_from(v).map_err(|_| format!("{s}: value out of range (max 0xffff)"))
}

impl Cli {
    /// Apply the requested field changes to the decoded record.
    ///
    /// All range and enumeration validation happens here; the codec never
    /// sees an out-of-domain value.
    fn apply(&self, ee: &mut FtxEeprom) -> anyhow::Result<()> {
        for pair in self.cbus.chunks_exact(2) {
            let pin = pair[0]
                .parse::<usize>()
                .ok()
                .filter(|p| *p < CBUS_COUNT)
                .with_context(|| format!("CBUS pin must be 0..{}, got \"{}\"", CBUS_COUNT - 1, pair[0]))?;
            let mode = CbusMode::from_name(&pair[1])
                .with_context(|| format!("unknown CBUS mode \"{}\"", pair[1]))?;
            ee.cbus[pin] = mode.raw();
        }

        for line in &self.invert {
            ee.toggle_invert(*line);
        }

        if let Some(s) = &self.manufacturer {
            ee.manufacturer = s.clone();
        }
        if let Some(s) = &self.product {
            ee.product = s.clone();
        }
        if let Some(s) = &self.new_serial_number {
            ee.serial = s.clone();
        }

        if let Some(ma) = self.max_bus_power {
            if ma > 0x1FF {
                bail!("--max-bus-power: {ma} mA out of range (max 511)");
            }
            ee.max_power = (ma / 2) as u8;
        }
        if let Some(v) = self.self_powered {
            ee.self_powered = v;
        }
        if let Some(v) = self.suspend_pull_down {
            ee.suspend_pull_down = v;
        }
        if let Some(v) = self.load_vcp {
            ee.load_vcp = v;
        }
        if let Some(v) = self.remote_wakeup {
            ee.remote_wakeup = v;
        }
        if let Some(v) = self.ft1248_cpol {
            ee.ft1248_cpol = v;
        }
        if let Some(v) = self.ft1248_bord {
            ee.ft1248_bord = v;
        }
        if let Some(v) = self.ft1248_flow_control {
            ee.ft1248_flow_control = v;
        }
        if let Some(v) = self.i2c_schmitt {
            // The flag is enable-positive on the command line but
            // disable-positive in the EEPROM.
            ee.disable_i2c_schmitt = !v;
        }
        if let Some(v) = self.i2c_slave_address {
            if v > 0xFFFF {
                bail!("--i2c-slave-address: 0x{v:x} out of range (max 0xffff)");
            }
            ee.i2c_slave_addr = v as u16;
        }
        if let Some(v) = self.i2c_device_id {
            if v > 0xFF_FFFF {
                bail!("--i2c-device-id: 0x{v:x} out of range (max 0xffffff)");
            }
            ee.i2c_device_id = v;
        }
        if let Some(v) = self.rs485_echo_supp {
            ee.rs485_echo_suppress = v;
        }
        if let Some(v) = self.new_vid {
            ee.vendor_id = v;
        }
        if let Some(v) = self.new_pid {
            ee.product_id = v;
        }
        Ok(())
    }
}

/// Print a hex+ASCII dump of an image, 16 bytes per row.
fn hexdump(msg: &str, image: &Image) {
    println!("{msg}:");
    for (row, chunk) in image.chunks(16).enumerate() {
        print!("{:04x}:", row * 16);
        for b in chunk {
            print!(" {b:02x}");
        }
        print!("  ");
        for b in chunk {
            let c = *b as char;
            print!("{}", if c.is_ascii_graphic() || c == ' ' { c } else { '.' });
        }
        println!();
    }
}

fn yes_no(v: bool) -> &'static str {
    if v {
        "True"
    } else {
        "False"
    }
}

/// Print the decoded configuration in human-readable form.
fn print_config(ee: &FtxEeprom) {
    println!("\tBattery Charge Detect (BCD) Enabled = {}", yes_no(ee.bcd_enable));
    println!("\tForce Power Enable Signal on CBUS = {}", yes_no(ee.force_power_enable));
    println!("\tDeactivate Sleep in Battery Charge Mode = {}", yes_no(ee.deactivate_sleep));
    println!("\tExternal Oscillator Enabled = {}", yes_no(ee.external_oscillator));
    println!(
        "\tExternal Oscillator Feedback Resistor Enabled = {}",
        yes_no(ee.external_oscillator_feedback)
    );
    println!("\tCBUS pin allocated to VBUS Sense Mode = {}", yes_no(ee.vbus_sense_alloc));
    println!("\tLoad Virtual COM Port (VCP) Drivers = {}", yes_no(ee.load_vcp));
    println!("\tVendor ID (VID) = 0x{:04x}", ee.vendor_id);
    println!("\tProduct ID (PID) = 0x{:04x}", ee.product_id);
    println!("\tUSB Version = USB{}.{}", ee.release_major, ee.release_minor);
    println!(
        "\tRemote Wakeup by something other than USB = {}",
        yes_no(ee.remote_wakeup)
    );
    println!("\tSelf Powered = {}", yes_no(ee.self_powered));
    println!(
        "\tMaximum Current Supported from USB = {}mA",
        2 * ee.max_power as u16
    );
    println!("\tPins Pulled Down on USB Suspend = {}", yes_no(ee.suspend_pull_down));
    println!(
        "\tIndicate USB Serial Number Available = {}",
        yes_no(ee.serial_number_avail)
    );

    println!(" FT1248");
    println!("-------");
    println!(
        "\tFT1248 Clock Polarity = {}",
        if ee.ft1248_cpol { "Active High" } else { "Active Low" }
    );
    println!(
        "\tFT1248 Bit Order = {}",
        if ee.ft1248_bord { "LSB to MSB" } else { "MSB to LSB" }
    );
    println!("\tFT1248 Flow Control Enabled = {}", yes_no(ee.ft1248_flow_control));

    println!(" RS232");
    println!("-------");
    println!("\tInvert TXD = {}", yes_no(ee.invert_txd));
    println!("\tInvert RXD = {}", yes_no(ee.invert_rxd));
    println!("\tInvert RTS = {}", yes_no(ee.invert_rts));
    println!("\tInvert CTS = {}", yes_no(ee.invert_cts));
    println!("\tInvert DTR = {}", yes_no(ee.invert_dtr));
    println!("\tInvert DSR = {}", yes_no(ee.invert_dsr));
    println!("\tInvert DCD = {}", yes_no(ee.invert_dcd));
    println!("\tInvert RI = {}", yes_no(ee.invert_ri));

    println!(" RS485");
    println!("-------");
    println!("\tRS485 Echo Suppression Enabled = {}", yes_no(ee.rs485_echo_suppress));

    println!("\tDBUS Drive Strength = {}mA", 4 * (ee.dbus_drive as u16 + 1));
    println!("\tDBUS Slow Slew Mode = {}", yes_no(ee.dbus_slow_slew));
    println!("\tDBUS Schmitt Trigger = {}", yes_no(ee.dbus_schmitt));
    println!("\tCBUS Drive Strength = {}mA", 4 * (ee.cbus_drive as u16 + 1));
    println!("\tCBUS Slow Slew Mode = {}", yes_no(ee.cbus_slow_slew));
    println!("\tCBUS Schmitt Trigger = {}", yes_no(ee.cbus_schmitt));

    println!("\tManufacturer = {}", ee.manufacturer);
    println!("\tProduct = {}", ee.product);
    println!("\tSerial Number = {}", ee.serial);

    println!("  I2C");
    println!("-------");
    println!("\tI2C Slave Address = {}", ee.i2c_slave_addr);
    println!("\tI2C Device ID = {}", ee.i2c_device_id);
    println!(
        "\tI2C Schmitt Triggers Disabled = {}",
        yes_no(ee.disable_i2c_schmitt)
    );

    println!("  CBUS");
    println!("-------");
    for (pin, raw) in ee.cbus.iter().enumerate() {
        match CbusMode::from_raw(*raw) {
            Some(mode) => println!("\tCBUS{pin} = {mode}"),
            None => println!("\tCBUS{pin} = unknown (0x{raw:02x})"),
        }
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(
        if cli.verbose { "debug" } else { "info" },
    ))
    .init();

    let mode = if cli.narrow_strings {
        StringMode::Narrow
    } else {
        StringMode::Wide
    };
    let old_vid = cli.old_vid.unwrap_or(FTDI_VID);
    let old_pid = cli.old_pid.unwrap_or(FTX_PID);

    let mut dev = FtxDevice::open(old_vid, old_pid, cli.old_serial_number.as_deref())
        .with_context(|| format!("opening device {old_vid:04x}:{old_pid:04x}"))?;

    // Read the existing image first; its checksum must verify before
    // anything else happens.
    let (existing, _) = program::read_and_verify(&mut dev)?;
    if cli.verbose {
        hexdump("existing eeprom", &existing);
    }

    if let Some(path) = &cli.save {
        file::save_image(path, &existing).with_context(|| format!("saving {}", path.display()))?;
    }

    // With --restore, the saved file (not the chip) is the decode source;
    // requested changes apply on top of it.
    let source = match &cli.restore {
        Some(path) => {
            let image =
                file::restore_image(path).with_context(|| format!("restoring {}", path.display()))?;
            if cli.verbose {
                hexdump(&path.display().to_string(), &image);
            }
            image
        }
        None => existing,
    };

    let mut ee = decode::decode(&source, mode);
    ee.old_vid = old_vid;
    ee.old_pid = old_pid;
    ee.old_serial = cli.old_serial_number.clone();
    cli.apply(&mut ee)?;

    if cli.dump {
        print_config(&ee);
    }

    let candidate = build::build(&ee, mode)?;
    if cli.verbose && candidate != existing {
        hexdump("new eeprom", &candidate);
    }

    match program::commit(&mut dev, &existing, &candidate)? {
        Outcome::Unchanged => println!("No change from existing EEPROM contents."),
        Outcome::Rewritten => println!("EEPROM rewritten; readback verified."),
    }

    Ok(())
}
