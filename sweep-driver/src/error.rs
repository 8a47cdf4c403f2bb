use std::io;
use thiserror::Error;

/// Coarse classification of a [`SweepError`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The transport is unavailable or the session is no longer usable.
    Connection,
    /// Driver and device protocol revisions do not match.
    Compatibility,
    /// The device did not answer in time.
    Timeout,
    /// A malformed or unexpected frame, or a command issued in the wrong state.
    Protocol,
    /// A caller-supplied value is out of range.
    Validation,
    /// The device reported an internal fault.
    Hardware,
}

#[derive(Debug, Error)]
pub enum SweepError {
    #[error("Failed to open \"{0}\": {1}")]
    OpenFailed(String, String),
    #[error("The session has been destroyed and must be constructed again.")]
    SessionClosed,
    #[error("Transport link closed.")]
    LinkClosed,
    #[error(transparent)]
    SerialError(#[from] serialport::Error),
    #[error(transparent)]
    IoError(#[from] io::Error),

    #[error("Driver version {driver:#010x} is not ABI compatible with protocol major version {protocol}.")]
    IncompatibleAbi { driver: u32, protocol: u32 },

    #[error("Operation timed out after {0} ms.")]
    TimeoutError(u64),

    #[error("Response header must be always seven bytes. Actually {0} bytes.")]
    InvalidHeaderLength(usize),
    #[error("Header sign must start with 0xA5 0x5A. Observed = {0}.")]
    InvalidMagicNumber(String),
    #[error("Expected response length of {0} bytes but found {1} bytes.")]
    InvalidResponseLength(usize, usize),
    #[error("Expected type code {0} but obtained {1}.")]
    InvalidTypeCode(usize, usize),
    #[error("Checksum mismatched. Calculated = {1:04X}, expected = {0:04X}.")]
    ChecksumMismatch(u16, u16),
    #[error("Sample angle {0} is outside of 0..36000 centi-degrees.")]
    InvalidAngle(u16),
    #[error("Command {command:#04x} rejected by the device with status {status:#04x}.")]
    CommandRejected { command: u8, status: u8 },
    #[error("Cannot {operation} while the device is {state}.")]
    InvalidState {
        operation: &'static str,
        state: &'static str,
    },

    #[error("{name} must be {expected}. Given {value}.")]
    OutOfRange {
        name: &'static str,
        expected: String,
        value: i32,
    },

    #[error("Device health error. Error code = {0:#010b}. See the development manual for details.")]
    DeviceHealthError(usize),
    #[error("Device reported fault code {0:#04x}.")]
    DeviceFault(u8),
}

impl SweepError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            SweepError::OpenFailed(..)
            | SweepError::SessionClosed
            | SweepError::LinkClosed
            | SweepError::SerialError(_)
            | SweepError::IoError(_) => ErrorKind::Connection,
            SweepError::IncompatibleAbi { .. } => ErrorKind::Compatibility,
            SweepError::TimeoutError(_) => ErrorKind::Timeout,
            SweepError::InvalidHeaderLength(_)
            | SweepError::InvalidMagicNumber(_)
            | SweepError::InvalidResponseLength(..)
            | SweepError::InvalidTypeCode(..)
            | SweepError::ChecksumMismatch(..)
            | SweepError::InvalidAngle(_)
            | SweepError::CommandRejected { .. }
            | SweepError::InvalidState { .. } => ErrorKind::Protocol,
            SweepError::OutOfRange { .. } => ErrorKind::Validation,
            SweepError::DeviceHealthError(_) | SweepError::DeviceFault(_) => ErrorKind::Hardware,
        }
    }

    /// Human-readable description, identical to the `Display` output.
    pub fn message(&self) -> String {
        self.to_string()
    }
}

pub type Result<T> = std::result::Result<T, SweepError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind() {
        assert_eq!(SweepError::SessionClosed.kind(), ErrorKind::Connection);
        assert_eq!(
            SweepError::IoError(io::Error::from(io::ErrorKind::BrokenPipe)).kind(),
            ErrorKind::Connection
        );
        assert_eq!(
            SweepError::IncompatibleAbi { driver: 0x0002_0000, protocol: 1 }.kind(),
            ErrorKind::Compatibility
        );
        assert_eq!(SweepError::TimeoutError(10).kind(), ErrorKind::Timeout);
        assert_eq!(SweepError::ChecksumMismatch(1, 2).kind(), ErrorKind::Protocol);
        assert_eq!(
            SweepError::InvalidState { operation: "stop scanning", state: "constructed" }.kind(),
            ErrorKind::Protocol
        );
        assert_eq!(
            SweepError::OutOfRange { name: "Motor speed", expected: "0..=10".into(), value: 11 }
                .kind(),
            ErrorKind::Validation
        );
        assert_eq!(SweepError::DeviceFault(0x02).kind(), ErrorKind::Hardware);
    }

    #[test]
    fn test_message() {
        assert_eq!(
            SweepError::TimeoutError(2000).message(),
            "Operation timed out after 2000 ms."
        );
        assert_eq!(
            SweepError::CommandRejected { command: 0x65, status: 0x01 }.message(),
            "Command 0x65 rejected by the device with status 0x01."
        );
        assert_eq!(
            SweepError::OutOfRange { name: "Motor speed", expected: "within 0..=10 Hz".into(), value: -1 }
                .message(),
            "Motor speed must be within 0..=10 Hz. Given -1."
        );
    }
}
