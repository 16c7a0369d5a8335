// ABOUTME: Clock synchronization for clocksy
// ABOUTME: NTP-style offset estimation and the time sources it reads

/// Offset estimation and smoothing
pub mod clock;
/// Time sources
pub mod source;

pub use clock::{ClockSync, Sample, SyncQuality};
pub use source::{Clock, ManualClock, SystemClock};
