// ABOUTME: Server-side clock sync
// ABOUTME: Stateless responder that timestamps requests

/// Request stamping
pub mod responder;

pub use responder::Responder;
