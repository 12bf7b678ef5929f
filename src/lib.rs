pub mod config;
pub mod crt571;

pub use crt571::{Crt571Client, Crt571Error, DeviceHandle, Reply, Result, SessionOptions};
