// ABOUTME: Periodic sample scheduler
// ABOUTME: Fires clock sync requests on a tokio interval, honoring an external suppression flag

use crate::error::Error;
use crate::protocol::Request;
use crate::sync::Clock;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};

/// Longest accepted sampling period
pub const MAX_PERIOD: Duration = Duration::from_secs(24 * 60 * 60);

/// Reject periods the interval timer cannot run on
pub(crate) fn check_period(period: Duration) -> Result<(), Error> {
    if period.is_zero() {
        return Err(Error::InvalidConfig(
            "updatePeriod must be greater than zero".to_string(),
        ));
    }
    if period > MAX_PERIOD {
        return Err(Error::InvalidConfig(format!(
            "updatePeriod must be at most {:?}, got {:?}",
            MAX_PERIOD, period
        )));
    }
    Ok(())
}

/// Outbound half of whatever carries requests to the server
///
/// Implemented for any `Fn(Request) + Send + Sync` closure. Delivery failures
/// belong to the transport; nothing is reported back to the estimator.
pub trait Transport: Send + Sync {
    /// Hand a request over for delivery
    fn send_request(&self, req: Request);
}

impl<F> Transport for F
where
    F: Fn(Request) + Send + Sync,
{
    fn send_request(&self, req: Request) {
        self(req)
    }
}

/// Transport that drops every request
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopTransport;

impl Transport for NoopTransport {
    fn send_request(&self, _req: Request) {}
}

/// Shared "skip automatic samples" flag
///
/// Clones share the flag, so whatever watches the host environment (window
/// visibility, app backgrounding, ...) can hold its own handle.
#[derive(Debug, Clone, Default)]
pub struct Suppression {
    flag: Arc<AtomicBool>,
}

impl Suppression {
    /// Create a flag with an initial value
    pub fn new(suppressed: bool) -> Self {
        Self {
            flag: Arc::new(AtomicBool::new(suppressed)),
        }
    }

    /// Set or clear suppression
    pub fn set(&self, suppressed: bool) {
        self.flag.store(suppressed, Ordering::Relaxed);
    }

    /// Whether automatic samples are currently skipped
    pub fn is_suppressed(&self) -> bool {
        self.flag.load(Ordering::Relaxed)
    }
}

/// Everything a firing needs, shared with the interval task
struct Firing {
    clock: Arc<dyn Clock>,
    transport: Arc<dyn Transport>,
    suppression: Suppression,
}

impl Firing {
    /// Send one request unless suppressed; `force` overrides suppression
    fn fire(&self, force: bool) -> bool {
        if !force && self.suppression.is_suppressed() {
            log::trace!("Automatic sample suppressed");
            return false;
        }

        let req = Request::new(self.clock.now_millis());
        log::debug!("Sending clock sync request: tTx={}", req.t_tx);
        self.transport.send_request(req);
        true
    }
}

/// Periodic sampler
///
/// Idle until [`start`](Sampler::start), running until [`stop`](Sampler::stop)
/// or drop. Stopping cancels the timer only; requests already handed to the
/// transport are not recalled.
pub struct Sampler {
    firing: Arc<Firing>,
    period: Duration,
    task: Option<Ticker>,
}

/// A running interval task
///
/// `armed` is held across each periodic firing, so once `disarm` returns no
/// further request goes out, whatever thread the task runs on.
struct Ticker {
    armed: Arc<Mutex<bool>>,
    handle: JoinHandle<()>,
}

impl Ticker {
    fn disarm(self) {
        *self.armed.lock() = false;
        self.handle.abort();
    }
}

impl Sampler {
    /// Create an idle sampler
    ///
    /// `period` must be non-zero and at most [`MAX_PERIOD`].
    pub fn new(
        clock: Arc<dyn Clock>,
        transport: Arc<dyn Transport>,
        suppression: Suppression,
        period: Duration,
    ) -> Result<Self, Error> {
        check_period(period)?;

        Ok(Self {
            firing: Arc::new(Firing {
                clock,
                transport,
                suppression,
            }),
            period,
            task: None,
        })
    }

    /// Fire one sample now, then every period until stopped
    ///
    /// The immediate sample ignores suppression. A running sampler is restarted.
    /// Outside a tokio runtime the immediate sample is still sent but the
    /// periodic trigger cannot be armed and [`Error::NoRuntime`] is returned.
    pub fn start(&mut self) -> Result<(), Error> {
        self.stop();

        let period = self.period;
        let first_tick = Instant::now().checked_add(period).ok_or_else(|| {
            Error::InvalidConfig(format!("updatePeriod {:?} overflows the timer", period))
        })?;

        self.firing.fire(true);

        let handle = Handle::try_current().map_err(|_| Error::NoRuntime)?;
        let firing = Arc::clone(&self.firing);
        let armed = Arc::new(Mutex::new(true));
        let task_armed = Arc::clone(&armed);

        let handle = handle.spawn(async move {
            let mut ticker = interval_at(first_tick, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                let armed = task_armed.lock();
                if !*armed {
                    break;
                }
                firing.fire(false);
            }
        });
        self.task = Some(Ticker { armed, handle });

        log::info!("Periodic clock sync started (every {:?})", period);
        Ok(())
    }

    /// Cancel the periodic trigger; no-op when idle
    ///
    /// Waits out a periodic firing already in progress, so nothing is sent
    /// by the trigger after this returns.
    pub fn stop(&mut self) {
        if let Some(task) = self.task.take() {
            task.disarm();
            log::info!("Periodic clock sync stopped");
        }
    }

    /// Fire an automatic sample now, subject to suppression
    pub fn fire_auto(&self) -> bool {
        self.firing.fire(false)
    }

    /// Fire a sample now regardless of suppression
    pub fn fire_now(&self) {
        self.firing.fire(true);
    }

    /// Whether the periodic trigger is armed
    pub fn is_running(&self) -> bool {
        self.task.is_some()
    }

    /// Sampling period
    pub fn period(&self) -> Duration {
        self.period
    }

    /// Suppression flag consulted by automatic firings
    pub fn suppression(&self) -> &Suppression {
        &self.firing.suppression
    }
}

impl Drop for Sampler {
    fn drop(&mut self) {
        self.stop();
    }
}

impl std::fmt::Debug for Sampler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Sampler")
            .field("period", &self.period)
            .field("running", &self.is_running())
            .field("suppression", &self.firing.suppression)
            .finish()
    }
}
