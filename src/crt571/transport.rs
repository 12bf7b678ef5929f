//! Byte transport to the device and the read-until-idle primitive.

use std::io::{self, Read, Write};
use std::time::Duration;

use serialport::{DataBits, FlowControl, Parity, SerialPort, StopBits};
use tracing::{debug, error, info};

use super::error::{Crt571Error, Result};

/// Half-duplex byte stream to a CRT-571.
///
/// `read` returns `Ok(0)` once nothing more arrives within the configured
/// timeout instead of blocking forever.
pub trait Transport: Send {
    /// Write bytes, returning how many were accepted.
    fn write(&mut self, bytes: &[u8]) -> io::Result<usize>;

    /// Read available bytes; `Ok(0)` means end of stream.
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize>;

    /// Set the idle timeout that ends a read.
    fn configure(&mut self, timeout: Duration) -> io::Result<()>;
}

impl<T: Transport + ?Sized> Transport for Box<T> {
    fn write(&mut self, bytes: &[u8]) -> io::Result<usize> {
        (**self).write(bytes)
    }

    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        (**self).read(buf)
    }

    fn configure(&mut self, timeout: Duration) -> io::Result<()> {
        (**self).configure(timeout)
    }
}

/// Serial line transport (8N1, no flow control).
pub struct SerialTransport {
    port: Box<dyn SerialPort>,
}

impl SerialTransport {
    /// Open a serial port.
    ///
    /// # Errors
    /// Returns `Crt571Error::Serial` when the port cannot be opened.
    pub fn open(path: &str, baud_rate: u32) -> Result<Self> {
        info!("Opening serial port {path} at {baud_rate} baud");
        let port = serialport::new(path, baud_rate)
            .data_bits(DataBits::Eight)
            .parity(Parity::None)
            .stop_bits(StopBits::One)
            .flow_control(FlowControl::None)
            .open()
            .map_err(|e| {
                error!("Error opening port {path}: {e}");
                e
            })?;
        Ok(Self { port })
    }
}

impl Transport for SerialTransport {
    fn write(&mut self, bytes: &[u8]) -> io::Result<usize> {
        Write::write_all(&mut self.port, bytes)?;
        Write::flush(&mut self.port)?;
        Ok(bytes.len())
    }

    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match Read::read(&mut self.port, buf) {
            Err(e) if e.kind() == io::ErrorKind::TimedOut => Ok(0),
            other => other,
        }
    }

    fn configure(&mut self, timeout: Duration) -> io::Result<()> {
        self.port.set_timeout(timeout)?;
        Ok(())
    }
}

/// Accumulate reads until the transport reports end of stream.
///
/// Fails with `FrameTooLarge` instead of truncating when more than `limit`
/// bytes arrive.
pub(crate) fn read_until_idle<T: Transport + ?Sized>(transport: &mut T, limit: usize) -> Result<Vec<u8>> {
    let mut buf = vec![0u8; limit + 1];
    let mut filled = 0;

    loop {
        let n = transport.read(&mut buf[filled..])?;
        if n == 0 {
            debug!("RX EOF after {filled} bytes");
            break;
        }
        debug!("RX chunk ({n} bytes): {:02X?}", &buf[filled..filled + n]);
        filled += n;
        if filled > limit {
            return Err(Crt571Error::FrameTooLarge {
                size: filled,
                max: limit,
            });
        }
    }

    buf.truncate(filled);
    Ok(buf)
}

/// Write the whole buffer or fail.
pub(crate) fn write_all<T: Transport + ?Sized>(transport: &mut T, bytes: &[u8]) -> Result<()> {
    debug!("TX ({} bytes): {bytes:02X?}", bytes.len());
    let written = transport.write(bytes)?;
    if written != bytes.len() {
        return Err(Crt571Error::Transport(io::Error::new(
            io::ErrorKind::WriteZero,
            format!("short write: {written} of {} bytes", bytes.len()),
        )));
    }
    Ok(())
}
