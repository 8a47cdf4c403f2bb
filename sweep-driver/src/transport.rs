//! Byte-level link to the device.

use crate::error::Result;
use std::time::Duration;

/// Ordered byte stream to one device.
///
/// Implementations block for at most the given timeout and must not busy-poll.
pub trait Transport: Send {
    /// Writes all of `data`, failing if the link cannot accept it within `timeout`.
    fn write(&mut self, data: &[u8], timeout: Duration) -> Result<()>;

    /// Reads up to `max_bytes`. Returns an empty vector when nothing arrives
    /// within `timeout`.
    fn read(&mut self, max_bytes: usize, timeout: Duration) -> Result<Vec<u8>>;

    /// Releases the link. Called exactly once by the owning session.
    fn close(&mut self);
}

impl<T: Transport + ?Sized> Transport for Box<T> {
    fn write(&mut self, data: &[u8], timeout: Duration) -> Result<()> {
        (**self).write(data, timeout)
    }

    fn read(&mut self, max_bytes: usize, timeout: Duration) -> Result<Vec<u8>> {
        (**self).read(max_bytes, timeout)
    }

    fn close(&mut self) {
        (**self).close()
    }
}
