use std::time::Duration;

use embedded_hal::blocking::delay::DelayMs;

/// Delay provider which blocks the current thread.
#[derive(Debug, Default, Clone, Copy)]
pub struct StdDelay;

impl DelayMs<u32> for StdDelay {
    fn delay_ms(&mut self, ms: u32) {
        std::thread::sleep(Duration::from_millis(ms.into()));
    }
}
