use std::time::Duration;

/// Retrieves a remote prompt. Errors are human-readable causes.
pub trait Fetcher {
    fn fetch(&self, url: &str) -> std::result::Result<String, String>;
}

/// Blocking HTTP GET with a hard timeout. Non-2xx status is a failure.
pub struct HttpFetcher {
    client: reqwest::blocking::Client,
    timeout: Duration,
}

impl HttpFetcher {
    pub fn new(timeout: Duration) -> Self {
        Self {
            client: reqwest::blocking::Client::new(),
            timeout,
        }
    }
}

impl Fetcher for HttpFetcher {
    fn fetch(&self, url: &str) -> std::result::Result<String, String> {
        let response = self
            .client
            .get(url)
            .timeout(self.timeout)
            .send()
            .map_err(|e| {
                if e.is_timeout() {
                    format!("timed out after {}s", self.timeout.as_secs())
                } else {
                    e.to_string()
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(format!("HTTP {}", status));
        }

        response
            .text()
            .map_err(|e| format!("failed to read body: {}", e))
    }
}
