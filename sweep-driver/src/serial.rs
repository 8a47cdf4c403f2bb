use crate::config::DriverConfig;
use crate::error::{Result, SweepError};
use crate::transport::Transport;
use serialport::{ClearBuffer, SerialPort};
use std::io::{ErrorKind, Read, Write};
use std::time::Duration;

/// Transport over a serial port (USB-UART bridge on the real device).
pub struct SerialTransport {
    port: Box<dyn SerialPort>,
}

impl SerialTransport {
    /// Opens `config.port_name` and drops whatever the device sent before.
    pub fn open(config: &DriverConfig) -> Result<SerialTransport> {
        let port = serialport::new(&config.port_name, config.baud_rate)
            .timeout(Duration::from_millis(config.write_timeout_ms))
            .open()
            .map_err(|e| SweepError::OpenFailed(config.port_name.clone(), e.to_string()))?;
        port.clear(ClearBuffer::Input)?;
        log::info!(
            "Opened serial port {} at {} baud",
            config.port_name,
            config.baud_rate
        );
        Ok(SerialTransport { port })
    }

    pub fn from_port(port: Box<dyn SerialPort>) -> SerialTransport {
        SerialTransport { port }
    }
}

impl Transport for SerialTransport {
    fn write(&mut self, data: &[u8], timeout: Duration) -> Result<()> {
        self.port.set_timeout(timeout)?;
        match self.port.write_all(data) {
            Ok(()) => (),
            Err(e) if e.kind() == ErrorKind::TimedOut => {
                return Err(SweepError::TimeoutError(timeout.as_millis() as u64))
            }
            Err(e) => return Err(SweepError::IoError(e)),
        }
        self.port.flush()?;
        Ok(())
    }

    fn read(&mut self, max_bytes: usize, timeout: Duration) -> Result<Vec<u8>> {
        if timeout.is_zero() {
            return Ok(Vec::new());
        }
        self.port.set_timeout(timeout)?;
        let mut packet: Vec<u8> = vec![0; max_bytes];
        match self.port.read(packet.as_mut_slice()) {
            Ok(n) => {
                packet.truncate(n);
                Ok(packet)
            }
            Err(e) if e.kind() == ErrorKind::TimedOut => Ok(Vec::new()),
            Err(e) => Err(SweepError::IoError(e)),
        }
    }

    fn close(&mut self) {
        if let Err(e) = self.port.clear(ClearBuffer::All) {
            log::warn!("Failed to clear serial buffers on close: {e}");
        }
        log::info!("Closed serial port {}", self.port.name().unwrap_or_default());
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use crate::time::sleep_ms;
    use serialport::TTYPort;

    #[test]
    fn test_read_written_bytes() {
        let (mut master, slave) = TTYPort::pair().expect("Unable to create ptty pair");
        let mut transport = SerialTransport::from_port(Box::new(slave));

        master.write_all(&[0xA5, 0x5A, 0x01]).unwrap();
        sleep_ms(10);

        let data = transport.read(16, Duration::from_millis(100)).unwrap();
        assert_eq!(data, vec![0xA5, 0x5A, 0x01]);
    }

    #[test]
    fn test_read_timeout_is_empty() {
        let (_master, slave) = TTYPort::pair().expect("Unable to create ptty pair");
        let mut transport = SerialTransport::from_port(Box::new(slave));
        let data = transport.read(16, Duration::from_millis(20)).unwrap();
        assert!(data.is_empty());
    }

    #[test]
    fn test_write() {
        let (mut master, slave) = TTYPort::pair().expect("Unable to create ptty pair");
        let mut transport = SerialTransport::from_port(Box::new(slave));
        transport
            .write(&[0xA5, 0x65], Duration::from_millis(100))
            .unwrap();

        sleep_ms(10);

        let mut buf = [0u8; 2];
        master.read_exact(&mut buf).unwrap();
        assert_eq!(buf, [0xA5, 0x65]);
    }
}
