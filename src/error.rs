//! Error types for the ftx-prog crate.

/// The error type for FT-X EEPROM operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// An error from the nusb USB layer.
    #[error("USB error: {0}")]
    Usb(#[from] nusb::Error),

    /// A USB transfer error.
    #[error("USB transfer error: {0}")]
    Transfer(#[from] nusb::transfer::TransferError),

    /// No matching device was found.
    #[error("device not found")]
    DeviceNotFound,

    /// The USB device is unavailable (not opened or disconnected).
    #[error("USB device unavailable")]
    DeviceUnavailable,

    /// Invalid argument(s) were provided.
    #[error("invalid argument: {0}")]
    InvalidArgument(&'static str),

    /// The stored EEPROM checksum does not match the computed one.
    ///
    /// The image must not be trusted; the caller aborts rather than decode.
    #[error("bad checksum: computed 0x{computed:04x}, stored 0x{stored:04x}")]
    ChecksumMismatch {
        /// Checksum computed over the image contents.
        computed: u16,
        /// Checksum found in the last two bytes of the image.
        stored: u16,
    },

    /// The combined manufacturer/product/serial strings exceed the shared
    /// string area. Recoverable by shortening the strings.
    #[error("strings too long to fit in string memory area: {used} > {budget} bytes")]
    StringTableOverflow {
        /// Combined character length of the three strings.
        used: usize,
        /// Capacity of the shared string area.
        budget: usize,
    },

    /// The image read back after a write does not carry the checksum that
    /// was written. The physical EEPROM may be in an inconsistent state.
    #[error("readback test failed: wrote 0x{expected:04x}, read back 0x{actual:04x}")]
    ReadbackMismatch {
        /// Checksum of the candidate image that was written.
        expected: u16,
        /// Checksum computed over the image read back.
        actual: u16,
    },

    /// A saved image file has the wrong size.
    #[error("image file has wrong size: {read} bytes, expected {expected}")]
    ImageFileSize {
        /// Number of bytes in the file.
        read: usize,
        /// Required image size.
        expected: usize,
    },

    /// A file I/O failure during save or restore.
    #[error("file I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// A specialized `Result` type for FT-X EEPROM operations.
pub type Result<T> = std::result::Result<T, Error>;
