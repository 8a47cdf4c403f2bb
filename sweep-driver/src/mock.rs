//! In-memory transport for running the driver without hardware.
//!
//! [`pair`] returns the host end, handed to a `DeviceSession`, and the device
//! end, used by tests or simulators to answer commands and stream frames.

use crate::constants::LIDAR_ANS_TYPE_STATUS;
use crate::error::{Result, SweepError};
use crate::packet::{encode_response, encode_scan_frame};
use crate::transport::Transport;
use crossbeam_channel::{unbounded, Receiver, RecvTimeoutError, Sender};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use sweep_data::Sample;

/// Host end of a mock link.
pub struct MockTransport {
    from_device: Receiver<Vec<u8>>,
    to_device: Sender<Vec<u8>>,
    pending: VecDeque<u8>,
    close_count: Arc<AtomicUsize>,
}

/// Device end of a mock link.
#[derive(Clone)]
pub struct MockDevice {
    to_host: Sender<Vec<u8>>,
    from_host: Receiver<Vec<u8>>,
    close_count: Arc<AtomicUsize>,
}

pub fn pair() -> (MockTransport, MockDevice) {
    let (to_host, from_device) = unbounded();
    let (to_device, from_host) = unbounded();
    let close_count = Arc::new(AtomicUsize::new(0));
    let transport = MockTransport {
        from_device,
        to_device,
        pending: VecDeque::new(),
        close_count: Arc::clone(&close_count),
    };
    let device = MockDevice {
        to_host,
        from_host,
        close_count,
    };
    (transport, device)
}

impl Transport for MockTransport {
    fn write(&mut self, data: &[u8], _timeout: Duration) -> Result<()> {
        self.to_device
            .send(data.to_vec())
            .map_err(|_| SweepError::LinkClosed)
    }

    fn read(&mut self, max_bytes: usize, timeout: Duration) -> Result<Vec<u8>> {
        if self.pending.is_empty() {
            match self.from_device.recv_timeout(timeout) {
                Ok(data) => self.pending.extend(data),
                Err(RecvTimeoutError::Timeout) => return Ok(Vec::new()),
                Err(RecvTimeoutError::Disconnected) => return Err(SweepError::LinkClosed),
            }
        }
        // Coalesce whatever else is already queued
        while let Ok(data) = self.from_device.try_recv() {
            self.pending.extend(data);
        }
        let n = max_bytes.min(self.pending.len());
        Ok(self.pending.drain(..n).collect())
    }

    fn close(&mut self) {
        self.close_count.fetch_add(1, Ordering::SeqCst);
    }
}

impl MockDevice {
    /// Queues raw bytes for the host to read.
    pub fn send(&self, data: &[u8]) {
        // The host end may already be gone; the bytes are then simply lost.
        let _ = self.to_host.send(data.to_vec());
    }

    /// Queues a response header of `type_code` followed by `payload`.
    pub fn send_response(&self, type_code: u8, payload: &[u8]) {
        self.send(&encode_response(type_code, payload));
    }

    /// Queues a one-byte status acknowledgement.
    pub fn send_status(&self, status: u8) {
        self.send_response(LIDAR_ANS_TYPE_STATUS, &[status]);
    }

    /// Queues one scan-data frame.
    pub fn send_scan_frame(&self, samples: &[Sample], complete: bool) {
        self.send(&encode_scan_frame(complete, 0, samples));
    }

    /// Queues one scan-data frame carrying a device fault code.
    pub fn send_fault_frame(&self, fault: u8) {
        self.send(&encode_scan_frame(false, fault, &[]));
    }

    /// Waits for the next write issued by the host.
    pub fn recv_command(&self, timeout: Duration) -> Option<Vec<u8>> {
        self.from_host.recv_timeout(timeout).ok()
    }

    /// All bytes written by the host so far and not yet received.
    pub fn written(&self) -> Vec<u8> {
        self.from_host.try_iter().flatten().collect()
    }

    /// Number of times the host end has been closed.
    pub fn close_count(&self) -> usize {
        self.close_count.load(Ordering::SeqCst)
    }
}
