// ABOUTME: Client-side clock sync
// ABOUTME: Offset estimator and its configuration

/// Estimator configuration
pub mod config;
/// Offset estimator
pub mod estimator;

pub use config::EstimatorConfig;
pub use estimator::Estimator;
