use crate::constants::{DEFAULT_BAUD_RATE, DEFAULT_COMMAND_TIMEOUT_MS, DEFAULT_WRITE_TIMEOUT_MS};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Settings used to open and drive one device.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct DriverConfig {
    /// Serial port name such as `/dev/ttyUSB0`.
    pub port_name: String,
    pub baud_rate: u32,
    /// How long a command waits for the device to answer.
    pub command_timeout_ms: u64,
    pub write_timeout_ms: u64,
}

impl DriverConfig {
    pub fn new(port_name: impl Into<String>) -> DriverConfig {
        DriverConfig {
            port_name: port_name.into(),
            ..DriverConfig::default()
        }
    }

    pub fn with_baud_rate(mut self, baud_rate: u32) -> DriverConfig {
        self.baud_rate = baud_rate;
        self
    }

    pub fn with_command_timeout_ms(mut self, timeout_ms: u64) -> DriverConfig {
        self.command_timeout_ms = timeout_ms;
        self
    }

    pub fn with_write_timeout_ms(mut self, timeout_ms: u64) -> DriverConfig {
        self.write_timeout_ms = timeout_ms;
        self
    }
}

impl Default for DriverConfig {
    fn default() -> DriverConfig {
        DriverConfig {
            port_name: "/dev/ttyUSB0".to_string(),
            baud_rate: DEFAULT_BAUD_RATE,
            command_timeout_ms: DEFAULT_COMMAND_TIMEOUT_MS,
            write_timeout_ms: DEFAULT_WRITE_TIMEOUT_MS,
        }
    }
}
