use crate::error::Result;
use std::iter::FusedIterator;
use sweep_data::Scan;

/// Anything that can block for one full scan.
pub trait ScanSource {
    fn get_scan(&self, timeout_ms: u64) -> Result<Scan>;
}

/// Unbounded, lazy sequence of scans pulled from a [`ScanSource`].
///
/// Every call to `next` performs exactly one `get_scan`. Stopping iteration
/// needs no signal to the device. The first error is yielded and ends the
/// sequence.
pub struct ScanStream<'a, S: ScanSource + ?Sized> {
    source: &'a S,
    timeout_ms: u64,
    failed: bool,
}

impl<'a, S: ScanSource + ?Sized> ScanStream<'a, S> {
    pub fn new(source: &'a S, timeout_ms: u64) -> ScanStream<'a, S> {
        ScanStream {
            source,
            timeout_ms,
            failed: false,
        }
    }

    pub fn timeout_ms(&self) -> u64 {
        self.timeout_ms
    }
}

impl<S: ScanSource + ?Sized> Iterator for ScanStream<'_, S> {
    type Item = Result<Scan>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        let scan = self.source.get_scan(self.timeout_ms);
        if scan.is_err() {
            self.failed = true;
        }
        Some(scan)
    }
}

impl<S: ScanSource + ?Sized> FusedIterator for ScanStream<'_, S> {}
