//! Model invocation.
//!
//! Builds completion requests, sends them through a [`Transport`], and runs the
//! bounded retry session that turns a prompt into response text.

mod client;
pub mod request;
pub mod transport;

#[cfg(test)]
mod tests;

pub use client::{
    API_ERROR_BACKOFF, AttemptCause, AttemptOutcome, Completion, GenerationAttempt, ModelClient,
    ModelError, TRANSPORT_BACKOFF_STEP, classify,
};
pub use request::{GenerationParams, GenerationRequest};
pub use transport::{HttpTransport, RawResponse, Transport, TransportFailure};
