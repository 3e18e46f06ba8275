//! Network seam of the model client.
//!
//! [`Transport`] performs exactly one round trip; classification of the result
//! and every retry decision belong to the client.

use super::request::CompletionBody;
use crate::config::Config;
use std::time::Duration;

/// Raw HTTP result of one completion request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    pub status: u16,
    pub body: String,
}

/// A request that produced no HTTP response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportFailure {
    /// Connection, TLS, timeout or body read failure.
    Connection(String),
    /// The request could not be built; retrying cannot help.
    InvalidRequest(String),
}

/// One completion round trip with a hard timeout.
pub trait Transport {
    fn send(
        &self,
        body: &CompletionBody,
        timeout: Duration,
    ) -> std::result::Result<RawResponse, TransportFailure>;
}

/// Blocking HTTP transport for the `generateContent` endpoint.
pub struct HttpTransport {
    client: reqwest::blocking::Client,
    url: String,
    api_key_env: String,
    api_key: Option<String>,
}

impl HttpTransport {
    /// Build a transport for the configured endpoint and model.
    ///
    /// The API key is looked up in the environment variable named by
    /// `config.api_key_env`; a missing key surfaces on the first request.
    pub fn from_config(config: &Config) -> Self {
        let api_key = std::env::var(&config.api_key_env)
            .ok()
            .filter(|k| !k.trim().is_empty());
        Self {
            client: reqwest::blocking::Client::new(),
            url: endpoint_url(&config.endpoint, &config.model),
            api_key_env: config.api_key_env.clone(),
            api_key,
        }
    }
}

/// `{endpoint}/models/{model}:generateContent`
pub fn endpoint_url(endpoint: &str, model: &str) -> String {
    format!(
        "{}/models/{}:generateContent",
        endpoint.trim_end_matches('/'),
        model
    )
}

impl Transport for HttpTransport {
    fn send(
        &self,
        body: &CompletionBody,
        timeout: Duration,
    ) -> std::result::Result<RawResponse, TransportFailure> {
        let Some(api_key) = &self.api_key else {
            return Err(TransportFailure::InvalidRequest(format!(
                "environment variable {} is not set\nFix: export {}=<your API key>",
                self.api_key_env, self.api_key_env
            )));
        };

        let response = self
            .client
            .post(&self.url)
            .header("x-goog-api-key", api_key)
            .json(body)
            .timeout(timeout)
            .send()
            .map_err(|e| classify_reqwest_error(e, timeout))?;

        let status = response.status().as_u16();
        let body = response
            .text()
            .map_err(|e| TransportFailure::Connection(format!("failed to read response body: {}", e)))?;

        Ok(RawResponse { status, body })
    }
}

fn classify_reqwest_error(err: reqwest::Error, timeout: Duration) -> TransportFailure {
    if err.is_builder() {
        TransportFailure::InvalidRequest(format!("invalid request: {}", err))
    } else if err.is_timeout() {
        TransportFailure::Connection(format!("request timed out after {:?}", timeout))
    } else {
        TransportFailure::Connection(err.to_string())
    }
}
