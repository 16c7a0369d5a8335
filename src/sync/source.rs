// ABOUTME: Time sources for client and server
// ABOUTME: Wall clock in Unix milliseconds, plus a settable clock for tests and simulations

use crate::protocol::Millis;
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

/// Source of "now" in milliseconds
pub trait Clock: Send + Sync {
    /// Current time in milliseconds
    fn now_millis(&self) -> Millis;
}

/// Wall clock, milliseconds since the Unix epoch
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    #[inline]
    fn now_millis(&self) -> Millis {
        // A clock set before 1970 reads as negative rather than failing
        match SystemTime::now().duration_since(UNIX_EPOCH) {
            Ok(d) => d.as_secs_f64() * 1000.0,
            Err(e) => -(e.duration().as_secs_f64() * 1000.0),
        }
    }
}

/// Manually driven clock
///
/// Clones share the same reading, so a test can keep one handle and give
/// another to an [`Estimator`](crate::Estimator) or [`Responder`](crate::Responder).
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    now: Arc<Mutex<Millis>>,
}

impl ManualClock {
    /// Create a clock reading `now`
    pub fn new(now: Millis) -> Self {
        Self {
            now: Arc::new(Mutex::new(now)),
        }
    }

    /// Jump to `now`
    pub fn set(&self, now: Millis) {
        *self.now.lock() = now;
    }

    /// Move forward by `delta` milliseconds
    pub fn advance(&self, delta: Millis) {
        *self.now.lock() += delta;
    }
}

impl Clock for ManualClock {
    fn now_millis(&self) -> Millis {
        *self.now.lock()
    }
}

impl<C: Clock + ?Sized> Clock for Arc<C> {
    fn now_millis(&self) -> Millis {
        (**self).now_millis()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread::sleep;
    use std::time::Duration;

    #[test]
    fn test_system_clock_advances() {
        let clock = SystemClock;
        let t1 = clock.now_millis();
        sleep(Duration::from_millis(10));
        let t2 = clock.now_millis();

        assert!(t2 > t1, "Clock should move forward");
        assert!(t2 - t1 >= 10.0, "At least 10ms should have passed");
    }

    #[test]
    fn test_manual_clock_shared_between_clones() {
        let clock = ManualClock::new(1000.0);
        let other = clock.clone();

        clock.advance(50.0);
        assert_eq!(other.now_millis(), 1050.0);

        other.set(7.0);
        assert_eq!(clock.now_millis(), 7.0);
    }
}
