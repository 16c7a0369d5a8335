// ABOUTME: Clock offset estimation from request/response timing
// ABOUTME: Midpoint offset per round trip, exponentially smoothed across round trips

use crate::protocol::Millis;

/// Clock synchronization quality
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncQuality {
    /// Good synchronization (RTT < 50ms)
    Good,
    /// Degraded synchronization (RTT 50-100ms)
    Degraded,
    /// Lost synchronization (RTT >= 100ms or no sync)
    Lost,
}

/// One round trip worth of timing
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sample {
    /// Client receive time
    pub t_rx: Millis,
    /// Round trip time
    pub rtt: Millis,
    /// Offset estimated from this round trip alone
    pub t_delta_raw: Millis,
}

impl Sample {
    /// Compute a sample from the three timestamps of one exchange
    /// t_tx = client transmitted (client clock)
    /// t_server = server processed (server clock)
    /// t_rx = client received (client clock)
    pub fn measure(t_tx: Millis, t_server: Millis, t_rx: Millis) -> Self {
        let rtt = t_rx - t_tx;

        // Server read its clock halfway through the round trip
        let t_delta_raw = t_server - rtt / 2.0 - t_tx;

        Self {
            t_rx,
            rtt,
            t_delta_raw,
        }
    }
}

/// Smoothed offset state
///
/// Cold until the first sample, warm afterwards. Memory is O(1): no sample
/// history is kept.
#[derive(Debug, Clone)]
pub struct ClockSync {
    /// Weight of the newest sample, in (0, 1]
    alpha: f64,

    /// Smoothed server-minus-local offset
    t_delta: Option<Millis>,

    /// RTT of the most recent exchange
    rtt: Option<Millis>,
}

impl ClockSync {
    /// Create a cold state with smoothing factor `alpha`
    pub fn new(alpha: f64) -> Self {
        Self {
            alpha,
            t_delta: None,
            rtt: None,
        }
    }

    /// Fold a sample in and return the new smoothed offset
    pub fn update(&mut self, sample: &Sample) -> Millis {
        let t_delta = match self.t_delta {
            Some(prev) => self.alpha * sample.t_delta_raw + (1.0 - self.alpha) * prev,
            None => sample.t_delta_raw,
        };

        self.t_delta = Some(t_delta);
        self.rtt = Some(sample.rtt);
        t_delta
    }

    /// Smoothed offset, if any sample has been folded in
    pub fn delta(&self) -> Option<Millis> {
        self.t_delta
    }

    /// Last RTT
    pub fn rtt(&self) -> Option<Millis> {
        self.rtt
    }

    /// True once at least one sample has been folded in
    pub fn is_warm(&self) -> bool {
        self.t_delta.is_some()
    }

    /// Get sync quality based on RTT
    pub fn quality(&self) -> SyncQuality {
        match self.rtt {
            Some(rtt) if rtt < 50.0 => SyncQuality::Good,
            Some(rtt) if rtt < 100.0 => SyncQuality::Degraded,
            _ => SyncQuality::Lost,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_midpoint_offset() {
        // Server is ahead by 500ms, 50ms each way
        let sample = Sample::measure(1000.0, 1550.0, 1100.0);
        assert_eq!(sample.rtt, 100.0);
        assert_eq!(sample.t_delta_raw, 500.0);
    }

    #[test]
    fn test_first_sample_not_smoothed() {
        let mut sync = ClockSync::new(0.2);
        assert!(!sync.is_warm());

        let delta = sync.update(&Sample::measure(0.0, 300.0, 0.0));
        assert_eq!(delta, 300.0);
        assert!(sync.is_warm());
    }

    #[test]
    fn test_alpha_one_tracks_latest() {
        let mut sync = ClockSync::new(1.0);
        sync.update(&Sample::measure(0.0, 10.0, 0.0));
        assert_eq!(sync.update(&Sample::measure(0.0, -4.0, 0.0)), -4.0);
    }

    #[test]
    fn test_quality_thresholds() {
        let mut sync = ClockSync::new(0.2);
        assert_eq!(sync.quality(), SyncQuality::Lost);

        sync.update(&Sample::measure(0.0, 0.0, 20.0));
        assert_eq!(sync.quality(), SyncQuality::Good);

        sync.update(&Sample::measure(0.0, 0.0, 75.0));
        assert_eq!(sync.quality(), SyncQuality::Degraded);

        sync.update(&Sample::measure(0.0, 0.0, 250.0));
        assert_eq!(sync.quality(), SyncQuality::Lost);
    }

    #[test]
    fn test_nan_propagates() {
        let mut sync = ClockSync::new(0.2);
        sync.update(&Sample::measure(0.0, 10.0, 0.0));
        let delta = sync.update(&Sample::measure(f64::NAN, 10.0, 0.0));
        assert!(delta.is_nan());
    }
}
