// ABOUTME: Client side of the clock sync exchange
// ABOUTME: Creates requests, folds responses into the smoothed offset, drives periodic sampling

use crate::client::config::EstimatorConfig;
use crate::error::Error;
use crate::protocol::messages::{read_millis, T_SERVER, T_TX};
use crate::protocol::{Millis, Request, Response};
use crate::scheduler::{Sampler, Suppression, Transport};
use crate::sync::{Clock, ClockSync, Sample, SyncQuality, SystemClock};
use serde_json::Value;
use std::sync::Arc;

/// Client-side clock offset estimator
///
/// Feed every response from the server to [`process_response`](Estimator::process_response)
/// as soon as it arrives. The returned offset is the estimated server time minus
/// local time, in milliseconds.
///
/// Requests and responses are not matched up: each response carries back its
/// own `tTx`, so overlapping exchanges are fine. Replaying the same response
/// folds it in twice.
pub struct Estimator {
    config: EstimatorConfig,
    clock: Arc<dyn Clock>,
    sync: ClockSync,
    sampler: Sampler,
}

impl Estimator {
    /// Create an estimator on the wall clock
    pub fn new(config: EstimatorConfig, transport: impl Transport + 'static) -> Result<Self, Error> {
        Self::with_clock(config, transport, SystemClock)
    }

    /// Create an estimator reading `clock`
    pub fn with_clock(
        config: EstimatorConfig,
        transport: impl Transport + 'static,
        clock: impl Clock + 'static,
    ) -> Result<Self, Error> {
        config.validate()?;

        let clock: Arc<dyn Clock> = Arc::new(clock);
        let sampler = Sampler::new(
            Arc::clone(&clock),
            Arc::new(transport),
            Suppression::default(),
            config.update_period,
        )?;

        Ok(Self {
            config,
            clock,
            sync: ClockSync::new(config.alpha),
            sampler,
        })
    }

    /// Build a request stamped with the current local time
    pub fn create_request(&self) -> Request {
        Request::new(self.clock.now_millis())
    }

    /// Fold a response in and return the new smoothed offset
    pub fn process_response(&mut self, rsp: &Response) -> Millis {
        self.fold(rsp.t_tx(), rsp.t_server)
    }

    /// Fold an untyped response in and return the new smoothed offset
    ///
    /// Missing or non-numeric `tTx`/`tServer` read as NaN and poison the
    /// estimate; validate payloads first if that matters.
    pub fn process_value(&mut self, rsp: &Value) -> Millis {
        self.fold(read_millis(rsp, T_TX), read_millis(rsp, T_SERVER))
    }

    fn fold(&mut self, t_tx: Millis, t_server: Millis) -> Millis {
        let sample = Sample::measure(t_tx, t_server, self.clock.now_millis());
        let t_delta = self.sync.update(&sample);

        log::debug!(
            "Clock sync sample: rtt={:.1}ms raw={:.1}ms smoothed={:.1}ms",
            sample.rtt,
            sample.t_delta_raw,
            t_delta
        );
        t_delta
    }

    /// Smoothed server-minus-local offset, `None` before the first response
    pub fn delta(&self) -> Option<Millis> {
        self.sync.delta()
    }

    /// RTT of the last exchange, `None` before the first response
    pub fn rtt(&self) -> Option<Millis> {
        self.sync.rtt()
    }

    /// Sync quality based on the last RTT
    pub fn quality(&self) -> SyncQuality {
        self.sync.quality()
    }

    /// Estimated current server time
    pub fn server_now(&self) -> Option<Millis> {
        self.delta().map(|d| self.clock.now_millis() + d)
    }

    /// Map a server timestamp onto the local clock
    pub fn to_local_time(&self, server_millis: Millis) -> Option<Millis> {
        self.delta().map(|d| server_millis - d)
    }

    /// Send one request through the transport right away, ignoring suppression
    pub fn sample_now(&self) {
        self.sampler.fire_now();
    }

    /// Send one request now, then one every update period
    ///
    /// Restarts if already running. See [`Sampler::start`] for the
    /// no-runtime case.
    pub fn start(&mut self) -> Result<(), Error> {
        self.sampler.start()
    }

    /// Stop periodic sampling; safe to call any number of times
    pub fn stop(&mut self) {
        self.sampler.stop();
    }

    /// Whether periodic sampling is running
    pub fn is_running(&self) -> bool {
        self.sampler.is_running()
    }

    /// Skip (or resume) automatic samples
    pub fn set_suppressed(&self, suppressed: bool) {
        self.sampler.suppression().set(suppressed);
    }

    /// Whether automatic samples are currently skipped
    pub fn is_suppressed(&self) -> bool {
        self.sampler.suppression().is_suppressed()
    }

    /// Shareable handle to the suppression flag
    pub fn suppression(&self) -> Suppression {
        self.sampler.suppression().clone()
    }

    /// Configuration this estimator was built with
    pub fn config(&self) -> &EstimatorConfig {
        &self.config
    }
}

impl std::fmt::Debug for Estimator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Estimator")
            .field("config", &self.config)
            .field("sync", &self.sync)
            .field("sampler", &self.sampler)
            .finish()
    }
}
