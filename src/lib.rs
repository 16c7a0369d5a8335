// ABOUTME: Main library entry point for clocksy
// ABOUTME: Exports the client-side offset estimator and the server-side responder

//! # clocksy
//!
//! Transport-agnostic client/server clock synchronization.
//!
//! The server answers each request with [`Responder::process_request`], the client
//! folds each answer into a smoothed offset with [`Estimator::process_response`].
//! How requests and responses travel between the two is entirely up to the caller.

#![warn(missing_docs)]

/// Request/response payloads exchanged between client and server
pub mod protocol;
/// Clock sources and offset estimation
pub mod sync;
/// Periodic sampling and transport callback
pub mod scheduler;
/// Server-side request stamping
pub mod server;
/// Client-side estimator facade
pub mod client;

pub use client::{Estimator, EstimatorConfig};
pub use protocol::messages::{Millis, Request, Response};
pub use scheduler::{NoopTransport, Suppression, Transport};
pub use server::Responder;
pub use sync::{Clock, ManualClock, SyncQuality, SystemClock};

/// Result type for clocksy operations
pub type Result<T> = std::result::Result<T, error::Error>;

/// Error types for clocksy
pub mod error {
    use thiserror::Error;

    /// Error types for clocksy operations
    #[derive(Error, Debug)]
    pub enum Error {
        /// Estimator configuration out of range
        #[error("Invalid configuration: {0}")]
        InvalidConfig(String),

        /// Periodic sampling needs a tokio runtime to run on
        #[error("No tokio runtime available to schedule periodic sampling")]
        NoRuntime,

        /// Payload encoding or decoding error
        #[error("Protocol error: {0}")]
        Protocol(String),
    }
}
