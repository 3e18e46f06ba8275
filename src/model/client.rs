//! Completion client with bounded retry.
//!
//! One call to [`ModelClient::complete`] is a generation session: up to
//! `max_attempts` round trips, ending at the first non-empty completion.
//!
//! | Attempt result                         | Class     | Backoff before next attempt |
//! |----------------------------------------|-----------|-----------------------------|
//! | no HTTP response / unparseable body    | retryable | `attempt * 2` seconds       |
//! | `error` payload                        | retryable | 3 seconds                   |
//! | no candidate text                      | retryable | none                        |
//! | request cannot be built                | fatal     | session ends                |
//! | non-empty text                         | success   | session ends                |
//!
//! No backoff is slept after the final attempt.

use super::request::{CompletionResponse, GenerationRequest};
use super::transport::{RawResponse, Transport, TransportFailure};
use crate::log::RunLog;
use std::time::{Duration, Instant};
use thiserror::Error;

/// Base of the linear transport backoff.
pub const TRANSPORT_BACKOFF_STEP: Duration = Duration::from_secs(2);

/// Fixed backoff after an API error payload.
pub const API_ERROR_BACKOFF: Duration = Duration::from_secs(3);

/// Why a retryable attempt failed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AttemptCause {
    #[error("transport error: {0}")]
    Transport(String),

    #[error("API error: {0}")]
    Api(String),

    #[error("empty response: {0}")]
    EmptyResponse(String),
}

impl AttemptCause {
    /// Delay before the attempt following attempt number `attempt` (1-based).
    pub fn backoff(&self, attempt: u32) -> Duration {
        match self {
            AttemptCause::Transport(_) => TRANSPORT_BACKOFF_STEP * attempt,
            AttemptCause::Api(_) => API_ERROR_BACKOFF,
            AttemptCause::EmptyResponse(_) => Duration::ZERO,
        }
    }
}

/// Result of one round trip.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttemptOutcome {
    Success(String),
    Retryable(AttemptCause),
    Fatal(String),
}

/// One round trip of a session.
#[derive(Debug, Clone)]
pub struct GenerationAttempt {
    /// 1-based.
    pub index: u32,
    pub outcome: AttemptOutcome,
    pub elapsed: Duration,
}

/// A successful session.
#[derive(Debug, Clone)]
pub struct Completion {
    pub text: String,
    pub attempts: Vec<GenerationAttempt>,
}

/// Terminal session failure.
#[derive(Debug, Clone, Error)]
pub enum ModelError {
    #[error("generation exhausted after {attempts} attempt(s); last cause: {last}")]
    Exhausted {
        attempts: u32,
        last: AttemptCause,
        history: Vec<GenerationAttempt>,
    },

    #[error("generation request rejected on attempt {attempt}: {cause}")]
    Fatal { attempt: u32, cause: String },
}

/// Completion client over a [`Transport`].
pub struct ModelClient<T: Transport> {
    transport: T,
    sleeper: Box<dyn Fn(Duration)>,
}

impl<T: Transport> ModelClient<T> {
    pub fn new(transport: T) -> Self {
        Self {
            transport,
            sleeper: Box::new(std::thread::sleep),
        }
    }

    /// Replace the backoff sleep (tests record delays instead of sleeping).
    pub fn with_sleeper(mut self, sleeper: impl Fn(Duration) + 'static) -> Self {
        self.sleeper = Box::new(sleeper);
        self
    }

    /// Run a generation session.
    ///
    /// Every failed attempt is logged at WARNING with its index and cause.
    pub fn complete(
        &self,
        request: &GenerationRequest,
        max_attempts: u32,
        attempt_timeout: Duration,
        log: &RunLog,
    ) -> Result<Completion, ModelError> {
        if max_attempts == 0 {
            return Err(ModelError::Fatal {
                attempt: 0,
                cause: "max_attempts must be at least 1".to_string(),
            });
        }

        let mut history = Vec::with_capacity(max_attempts as usize);
        let mut attempt = 1;

        loop {
            log.info(format!(
                "generation attempt {}/{} (model {}, timeout {}s)",
                attempt,
                max_attempts,
                request.model,
                attempt_timeout.as_secs()
            ));

            let started = Instant::now();
            let body = request.to_body();
            let outcome = classify(self.transport.send(&body, attempt_timeout));
            let elapsed = started.elapsed();

            history.push(GenerationAttempt {
                index: attempt,
                outcome: outcome.clone(),
                elapsed,
            });

            match outcome {
                AttemptOutcome::Success(text) => {
                    log.info(format!(
                        "attempt {}/{} succeeded in {:.1}s ({} chars)",
                        attempt,
                        max_attempts,
                        elapsed.as_secs_f64(),
                        text.len()
                    ));
                    return Ok(Completion {
                        text,
                        attempts: history,
                    });
                }
                AttemptOutcome::Fatal(cause) => {
                    log.error(format!(
                        "attempt {}/{} cannot be sent: {}",
                        attempt, max_attempts, cause
                    ));
                    return Err(ModelError::Fatal { attempt, cause });
                }
                AttemptOutcome::Retryable(cause) => {
                    log.warn(format!(
                        "attempt {}/{} failed after {:.1}s: {}",
                        attempt,
                        max_attempts,
                        elapsed.as_secs_f64(),
                        cause
                    ));

                    if attempt == max_attempts {
                        return Err(ModelError::Exhausted {
                            attempts: attempt,
                            last: cause,
                            history,
                        });
                    }

                    let delay = cause.backoff(attempt);
                    if !delay.is_zero() {
                        log.info(format!("retrying in {}s", delay.as_secs()));
                        (self.sleeper)(delay);
                    }
                }
            }

            attempt += 1;
        }
    }
}

/// Classify the result of one round trip.
pub fn classify(result: std::result::Result<RawResponse, TransportFailure>) -> AttemptOutcome {
    let raw = match result {
        Ok(raw) => raw,
        Err(TransportFailure::Connection(msg)) => {
            return AttemptOutcome::Retryable(AttemptCause::Transport(msg));
        }
        Err(TransportFailure::InvalidRequest(msg)) => return AttemptOutcome::Fatal(msg),
    };

    let response: CompletionResponse = match serde_json::from_str(&raw.body) {
        Ok(response) => response,
        Err(e) => {
            return AttemptOutcome::Retryable(AttemptCause::Transport(format!(
                "HTTP {} with unparseable body: {}",
                raw.status, e
            )));
        }
    };

    if let Some(error) = &response.error {
        return AttemptOutcome::Retryable(AttemptCause::Api(error.describe()));
    }

    if !(200..300).contains(&raw.status) {
        return AttemptOutcome::Retryable(AttemptCause::Api(format!(
            "HTTP {} without error payload",
            raw.status
        )));
    }

    match response.text() {
        Some(text) if !text.trim().is_empty() => AttemptOutcome::Success(text),
        _ => {
            let reason = match response.finish_reason() {
                Some(reason) => format!("no completion text (finish reason {})", reason),
                None => "no completion text".to_string(),
            };
            AttemptOutcome::Retryable(AttemptCause::EmptyResponse(reason))
        }
    }
}
