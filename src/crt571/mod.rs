//! CRT-571 card dispenser serial protocol.
//!
//! Request frames are `STX ADDR LEN CMT CM PM DATA ETX BCC`; the device ACKs
//! each frame, then answers with a positive (`PMT`) or negative (`EMT`) reply
//! that the host ACKs in turn.
//!
//! # Example
//!
//! ```ignore
//! use crt571_driver::crt571::{Crt571Client, MovePosition, SessionOptions, StatusKind};
//!
//! let mut client = Crt571Client::open("/dev/ttyUSB0", 9600, SessionOptions::default())?;
//! let reply = client.status(StatusKind::Device)?;
//! println!("{}", reply.status);
//! client.move_card(MovePosition::Gate)?;
//! ```

mod client;
mod error;
mod exchange;
mod protocol;
mod response;
mod tables;
mod transport;
mod types;
mod worker;


pub use client::{Crt571Client, SessionOptions};
pub use error::{Crt571Error, Result};
pub use exchange::{ChecksumPolicy, exchange};
pub use protocol::{bcc, build_frame, declared_length, verify_bcc};
pub use response::{CardStatus, Frame, NegativeFrame, PositiveFrame, Reply, decode_response};
pub use tables::{command_name, error_message, parameter_name, st0_name, st1_name, st2_name};
pub use transport::{SerialTransport, Transport};
pub use types::*;
pub use worker::DeviceHandle;
