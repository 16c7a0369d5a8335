// ABOUTME: Sample scheduler for periodic clock sync
// ABOUTME: Cancellable interval task plus the transport and suppression seams it drives

/// Periodic sampler implementation
pub mod sampler;

pub use sampler::{NoopTransport, Sampler, Suppression, Transport, MAX_PERIOD};
