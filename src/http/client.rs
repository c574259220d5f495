use crate::errors::{Error, Result};
use crate::http::Fetcher;
use rand::Rng;
use reqwest::blocking::Client;
use std::time::Duration;
use tracing::{debug, warn};

/// Blocking HTTP client for the published sheets
///
/// The sheets answer a plain GET with the CSV export, so there is nothing
/// more to it than checking the status and reading the body.
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    /// Create a new client giving up on requests after `timeout`
    pub fn new(timeout: Duration) -> Result<Self> {
        Ok(HttpFetcher {
            client: Client::builder().timeout(timeout).build()?,
        })
    }
}

impl Fetcher for HttpFetcher {
    fn fetch_text(&self, url: &str) -> Result<String> {
        debug!(url, "GET");
        let response = self.client.get(url).send()?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        Ok(response.text()?)
    }
}

/// Retry a fetcher a fixed number of times before giving up
///
/// Waits `base_delay * attempt` plus up to half of `base_delay` of random
/// jitter between attempts.
pub struct Retrying<F> {
    inner: F,
    retries: u32,
    base_delay: Duration,
}

impl<F: Fetcher> Retrying<F> {
    pub fn new(inner: F, retries: u32, base_delay: Duration) -> Self {
        Retrying {
            inner,
            retries,
            base_delay,
        }
    }

    fn backoff(&self, attempt: u32) -> Duration {
        let jitter_ms = self.base_delay.as_millis() as u64 / 2;
        let jitter = rand::thread_rng().gen_range(0..=jitter_ms);
        self.base_delay * attempt + Duration::from_millis(jitter)
    }
}

impl<F: Fetcher> Fetcher for Retrying<F> {
    fn fetch_text(&self, url: &str) -> Result<String> {
        let mut attempt = 0;
        loop {
            match self.inner.fetch_text(url) {
                Ok(body) => return Ok(body),
                Err(err) if attempt < self.retries => {
                    attempt += 1;
                    warn!(url, attempt, %err, "Fetch failed, retrying");
                    std::thread::sleep(self.backoff(attempt));
                }
                Err(err) => return Err(err),
            }
        }
    }
}
