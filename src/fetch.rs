use std::{thread, time::Duration};

use reqwest::{
    blocking::Client,
    header::{HeaderMap, RETRY_AFTER},
    StatusCode
};
use thiserror::Error;

use crate::{
    config::HarvestConfig,
    error::Result
};

/// Outcome of a single GET that did not produce a body.
#[derive(Debug, Error)]
pub enum FetchError {
    /// HTTP 503, with the server's `retry-after` when it sent a usable one.
    #[error("rate limited (retry after {retry_after:?})")]
    RateLimited { retry_after: Option<Duration> },

    #[error("HTTP {0}")]
    Status(u16),

    #[error(transparent)]
    Transport(#[from] reqwest::Error),
}

pub trait Fetch {
    fn get(&self, url: &str) -> std::result::Result<String, FetchError>;
}

impl<T: Fetch + ?Sized> Fetch for &T {
    fn get(&self, url: &str) -> std::result::Result<String, FetchError> {
        (**self).get(url)
    }
}

pub trait Sleep {
    fn sleep(&self, duration: Duration);
}

impl<T: Sleep + ?Sized> Sleep for &T {
    fn sleep(&self, duration: Duration) {
        (**self).sleep(duration)
    }
}

/// Blocks the calling thread.
#[derive(Debug, Default, Clone, Copy)]
pub struct ThreadSleep;

impl Sleep for ThreadSleep {
    fn sleep(&self, duration: Duration) {
        thread::sleep(duration);
    }
}

#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client
}

impl HttpFetcher {
    pub fn new(config: &HarvestConfig) -> Result<Self> {
        // `None` leaves the client without any timeout.
        let client = Client::builder()
            .user_agent(config.user_agent.as_str())
            .timeout(config.request_timeout)
            .build()?;
        Ok(HttpFetcher { client })
    }
}

impl Fetch for HttpFetcher {
    fn get(&self, url: &str) -> std::result::Result<String, FetchError> {
        let response = self.client.get(url).send()?;
        let status = response.status();
        if status == StatusCode::SERVICE_UNAVAILABLE {
            return Err(FetchError::RateLimited {
                retry_after: parse_retry_after(response.headers())
            });
        }
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }
        Ok(response.text()?)
    }
}

/// `retry-after` in delay-seconds form. HTTP-date values and garbage are
/// treated as absent so the configured default applies.
pub fn parse_retry_after(headers: &HeaderMap) -> Option<Duration> {
    headers.get(RETRY_AFTER)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.trim().parse::<u64>().ok())
        .map(Duration::from_secs)
}
