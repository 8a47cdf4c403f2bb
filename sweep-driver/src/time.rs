use std::time::{Duration, Instant};

#[cfg(test)]
pub(crate) fn sleep_ms(duration: u64) {
    std::thread::sleep(Duration::from_millis(duration));
}

/// Point in time after which a blocking call gives up.
#[derive(Clone, Copy, Debug)]
pub(crate) struct Deadline {
    at: Instant,
    timeout_ms: u64,
}

impl Deadline {
    pub(crate) fn after_ms(timeout_ms: u64) -> Deadline {
        Deadline {
            at: Instant::now() + Duration::from_millis(timeout_ms),
            timeout_ms,
        }
    }

    pub(crate) fn remaining(&self) -> Duration {
        self.at.saturating_duration_since(Instant::now())
    }

    pub(crate) fn expired(&self) -> bool {
        self.remaining().is_zero()
    }

    pub(crate) fn timeout_ms(&self) -> u64 {
        self.timeout_ms
    }
}
