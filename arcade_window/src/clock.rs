//! Fixed-rate pacing for the foreground loop.

use std::thread;
use std::time::{Duration, Instant};

/// Sleeps out the remainder of each frame period.
///
/// A frame that overruns its budget does not cause catch-up bursts; the
/// schedule restarts from now.
pub struct FrameClock {
    period:  Duration,
    next:    Instant,
    overruns: u64,
}

impl FrameClock {
    pub fn new(fps: u32) -> Self {
        let period = Duration::from_secs(1) / fps.max(1);
        FrameClock { period, next: Instant::now() + period, overruns: 0 }
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    pub fn overruns(&self) -> u64 {
        self.overruns
    }

    /// Block until the current frame's deadline.
    pub fn wait(&mut self) {
        let now = Instant::now();
        if now < self.next {
            thread::sleep(self.next - now);
            self.next += self.period;
        } else {
            self.overruns += 1;
            log::trace!("frame overran by {:?}", now - self.next);
            self.next = now + self.period;
        }
    }
}
