//! CRT-571 protocol error types.

use thiserror::Error;

/// Errors that can occur while exchanging frames with a CRT-571.
#[derive(Error, Debug)]
pub enum Crt571Error {
    /// IO error on the underlying transport.
    #[error("Transport error: {0}")]
    Transport(#[from] std::io::Error),

    /// Failed to open or configure the serial port.
    #[error("Serial port error: {0}")]
    Serial(#[from] serialport::Error),

    /// The device did not acknowledge the request frame.
    #[error("ACK is absent (received {})", fmt_received(.received))]
    NoAck { received: Option<u8> },

    /// Reply BCC does not match the recomputed parity.
    #[error("BCC mismatch: frame carries {actual:#04X}, computed {expected:#04X}")]
    ChecksumMismatch { expected: u8, actual: u8 },

    /// Reply discriminator is neither the positive nor a negative marker.
    #[error("Unknown response type {0:#04X}")]
    UnknownResponseType(u8),

    /// Reply is shorter than its shape or length field requires.
    #[error("Truncated frame: need {expected} bytes, got {actual}")]
    TruncatedFrame { expected: usize, actual: usize },

    /// Declared length is smaller than the fixed fields of the reply shape.
    #[error("Bad length field {length}, reply needs at least {minimum}")]
    BadLength { length: usize, minimum: usize },

    /// Frame exceeds the device buffer size.
    #[error("Frame of {size} bytes exceeds the {max}-byte limit")]
    FrameTooLarge { size: usize, max: usize },

    /// Well-formed negative reply from the device.
    #[error("CRT-571 error response: {message}({code}), data:{data:02X?}")]
    Device { code: String, message: String, data: Vec<u8> },

    /// The serialized front end is no longer running.
    #[error("Device worker stopped")]
    WorkerStopped,
}

fn fmt_received(received: &Option<u8>) -> String {
    match received {
        Some(byte) => format!("{byte:#04X}"),
        None => "nothing".to_string(),
    }
}

impl Crt571Error {
    /// True for negative replies reported by the device itself.
    pub fn is_device_error(&self) -> bool {
        matches!(self, Self::Device { .. })
    }

    /// Two-character device error code, if this is a negative reply.
    pub fn device_code(&self) -> Option<&str> {
        match self {
            Self::Device { code, .. } => Some(code),
            _ => None,
        }
    }
}

/// Result type for CRT-571 operations.
pub type Result<T> = std::result::Result<T, Crt571Error>;
