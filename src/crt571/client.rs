//! CRT-571 device session.

use std::time::Duration;

use tracing::{error, info};

use super::error::Result;
use super::exchange::{ChecksumPolicy, exchange};
use super::protocol::build_frame;
use super::response::{Reply, decode_response};
use super::tables::{command_name, parameter_name};
use super::transport::{SerialTransport, Transport, write_all};
use super::types::*;

/// Session settings applied once at construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionOptions {
    /// Device protocol address (ADDR byte).
    pub address: u8,
    /// Idle timeout that ends each read.
    pub read_timeout: Duration,
    pub checksum: ChecksumPolicy,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            address: 0,
            read_timeout: Duration::from_millis(200),
            checksum: ChecksumPolicy::Strict,
        }
    }
}

/// Session with one CRT-571.
///
/// Owns its transport exclusively; every call blocks until the exchange
/// completes, times out, or fails. Share it between callers through
/// [`DeviceHandle`](super::DeviceHandle).
pub struct Crt571Client<T: Transport = SerialTransport> {
    transport: T,
    options: SessionOptions,
}

impl Crt571Client<SerialTransport> {
    /// Open a serial port and start a session on it.
    ///
    /// # Errors
    /// Returns `Crt571Error::Serial` if the port cannot be opened.
    pub fn open(path: &str, baud_rate: u32, options: SessionOptions) -> Result<Self> {
        let transport = SerialTransport::open(path, baud_rate)?;
        Self::new(transport, options)
    }
}

impl<T: Transport> Crt571Client<T> {
    /// Start a session on an already opened transport.
    pub fn new(mut transport: T, options: SessionOptions) -> Result<Self> {
        transport.configure(options.read_timeout)?;
        info!(
            "CRT-571 session: address={:#04X}, read timeout={:?}, checksum={:?}",
            options.address, options.read_timeout, options.checksum
        );
        Ok(Self { transport, options })
    }

    /// Session settings.
    pub fn options(&self) -> &SessionOptions {
        &self.options
    }

    /// Release the transport.
    pub fn into_inner(self) -> T {
        self.transport
    }

    /// Send any command/parameter pair with a payload.
    ///
    /// A negative reply comes back as `Crt571Error::Device`.
    pub fn command(&mut self, cm: u8, pm: u8, data: &[u8]) -> Result<Reply> {
        let command = command_name(cm).unwrap_or("Unknown command");
        let parameter = parameter_name(cm, pm).unwrap_or("");
        info!("Command:[{command}] PM:[{pm:#04X}] {parameter} data:{data:02X?}");

        let result = self.request(cm, pm, data);
        match &result {
            Ok(reply) => info!("Command:[{command}] PM:[{pm:#04X}] card status:{} data:{:02X?}", reply.status, reply.data),
            Err(e) => error!("Command:[{command}] PM:[{pm:#04X}] error: {e}"),
        }
        result
    }

    fn request(&mut self, cm: u8, pm: u8, data: &[u8]) -> Result<Reply> {
        let frame = build_frame(self.options.address, cm, pm, data)?;
        let raw = exchange(&mut self.transport, &frame, self.options.checksum)?;
        decode_response(&raw)?.into_result()
    }

    /// Send EOT to clear the line.
    pub fn clear_line(&mut self) -> Result<()> {
        info!("Clearing line");
        write_all(&mut self.transport, &[EOT])
    }

    pub fn initialize(&mut self, mode: InitMode) -> Result<Reply> {
        self.command(CM_INITIALIZE, mode.pm(), &[])
    }

    /// Device or sensor status.
    pub fn status(&mut self, kind: StatusKind) -> Result<Reply> {
        self.command(CM_STATUS_REQUEST, kind.pm(), &[])
    }

    pub fn move_card(&mut self, position: MovePosition) -> Result<Reply> {
        self.command(CM_CARD_MOVE, position.pm(), &[])
    }

    /// Allow or refuse cards inserted at the output gate.
    pub fn card_entry(&mut self, entry: CardEntry) -> Result<Reply> {
        self.command(CM_CARD_ENTRY, entry.pm(), &[])
    }

    pub fn card_type(&mut self, check: CardTypeCheck) -> Result<Reply> {
        self.command(CM_CARD_TYPE, check.pm(), &[])
    }

    /// CPU card operation; `data` carries the APDU for the exchange variants.
    pub fn cpu_card(&mut self, op: CpuCardOp, data: &[u8]) -> Result<Reply> {
        self.command(CM_CPU_CARD, op.pm(), data)
    }

    pub fn sam_card(&mut self, op: SamCardOp, data: &[u8]) -> Result<Reply> {
        self.command(CM_SAM_CARD, op.pm(), data)
    }

    pub fn sle_card(&mut self, op: SleCardOp, data: &[u8]) -> Result<Reply> {
        self.command(CM_SLE_CARD, op.pm(), data)
    }

    /// 24Cxx memory card operation.
    pub fn iic_card(&mut self, op: IicCardOp, data: &[u8]) -> Result<Reply> {
        self.command(CM_IIC_CARD, op.pm(), data)
    }

    pub fn rf_card(&mut self, op: RfCardOp, data: &[u8]) -> Result<Reply> {
        self.command(CM_RF_CARD, op.pm(), data)
    }

    pub fn read_serial_number(&mut self) -> Result<Reply> {
        self.command(CM_CARD_SERIAL_NUMBER, PM_READ, &[])
    }

    pub fn read_config(&mut self) -> Result<Reply> {
        self.command(CM_READ_CONFIG, PM_READ, &[])
    }

    /// Firmware version string in the reply data.
    pub fn read_version(&mut self) -> Result<Reply> {
        self.command(CM_READ_VERSION, PM_READ, &[])
    }

    /// Read or reset the error card bin counter.
    pub fn recycle_bin_counter(&mut self, op: BinCounterOp) -> Result<Reply> {
        self.command(CM_RECYCLE_BIN_COUNTER, op.pm(), &[])
    }
}
