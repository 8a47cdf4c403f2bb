mod config;
mod constants;
mod error;
pub mod mock;
mod numeric;
mod packet;
mod serial;
mod session;
mod stream;
mod time;
mod transport;
mod version;

pub use crate::config::DriverConfig;
pub use crate::constants::{
    DEFAULT_BAUD_RATE, DEFAULT_COMMAND_TIMEOUT_MS, DEFAULT_SCAN_TIMEOUT_MS,
    DEFAULT_WRITE_TIMEOUT_MS, MOTOR_SPEED_RANGE, SAMPLE_RATES,
};
pub use crate::error::{ErrorKind, Result, SweepError};
pub use crate::serial::SerialTransport;
pub use crate::session::{DeviceSession, SessionState};
pub use crate::stream::{ScanSource, ScanStream};
pub use crate::transport::Transport;
pub use crate::version::{get_version, is_abi_compatible, VERSION_MAJOR, VERSION_MINOR};
pub use sweep_data::{DeviceInfo, Sample, Scan};
