use chrono::NaiveDate;
use tracing::{info, warn};

use crate::{
    config::HarvestConfig,
    error::{HarvestError, Result},
    fetch::{Fetch, FetchError, HttpFetcher, Sleep, ThreadSleep},
    model::ResultTable,
    parser::{self, ResumptionToken},
    request::HarvestRequest
};

/// Drives `ListRecords` page by page until the server stops handing out
/// resumption tokens. Pages are fetched strictly in sequence on the calling
/// thread; any fatal error discards everything collected so far.
#[derive(Debug)]
pub struct Harvester<F = HttpFetcher, S = ThreadSleep> {
    config: HarvestConfig,
    fetcher: F,
    sleeper: S
}

impl Harvester {
    pub fn from_config(config: HarvestConfig) -> Result<Self> {
        let fetcher = HttpFetcher::new(&config)?;
        Self::with_parts(config, fetcher, ThreadSleep)
    }
}

impl<F: Fetch, S: Sleep> Harvester<F, S> {
    pub fn with_parts(config: HarvestConfig, fetcher: F, sleeper: S) -> Result<Self> {
        config.validate()?;
        Ok(Harvester {
            config,
            fetcher,
            sleeper
        })
    }

    pub fn config(&self) -> &HarvestConfig {
        &self.config
    }

    /// Harvest the configured subject set between `from` and `until`, inclusive.
    pub fn harvest(&self, from: NaiveDate, until: NaiveDate) -> Result<ResultTable> {
        self.harvest_set(&self.config.subject_set, from, until)
    }

    pub fn harvest_set(&self, subject_set: &str, from: NaiveDate, until: NaiveDate) -> Result<ResultTable> {
        if from > until {
            return Err(HarvestError::Config(format!(
                "harvest range is inverted: {} is after {}", from, until
            )));
        }

        let mut table = ResultTable::new();
        let mut request = HarvestRequest::initial(subject_set, from, until);
        let mut page_number = 0;
        loop {
            let url = request.to_url(&self.config)?;
            let body = self.fetch_with_retry(&url)?;
            let page = parser::parse_page(&body, &self.config.namespaces, &self.config.date_format)?;

            page_number += 1;
            let page_len = page.records.len();
            table.extend(page.records);
            info!(page = page_number, records = page_len, total = table.len(), "page harvested");

            match page.resumption_token {
                Some(token) => {
                    log_progress(&token);
                    request = HarvestRequest::resume(token.value);
                }
                None => break,
            }
        }

        info!(set = subject_set, %from, %until, records = table.len(), "harvest complete");
        Ok(table)
    }

    // reissues the same url while the server answers 503.
    fn fetch_with_retry(&self, url: &str) -> Result<String> {
        let mut attempts: u32 = 0;
        loop {
            info!("fetching {}", url);
            attempts += 1;
            match self.fetcher.get(url) {
                Ok(body) => return Ok(body),
                Err(FetchError::RateLimited { retry_after }) => {
                    if let Some(max_retries) = self.config.max_retries {
                        if attempts > max_retries {
                            return Err(HarvestError::RetryExhausted {
                                attempts,
                                url: url.to_string()
                            });
                        }
                    }
                    let wait = retry_after.unwrap_or(self.config.default_retry_after);
                    warn!("Got 503. Retrying after {} seconds.", wait.as_secs());
                    self.sleeper.sleep(wait);
                }
                Err(FetchError::Status(status)) => {
                    return Err(HarvestError::HttpStatus {
                        status,
                        url: url.to_string()
                    });
                }
                Err(FetchError::Transport(e)) => return Err(HarvestError::Transport(e)),
            }
        }
    }
}

fn log_progress(token: &ResumptionToken) {
    if let (Some(cursor), Some(size)) = (token.cursor, token.complete_list_size) {
        info!(cursor, complete_list_size = size, "more records pending");
    }
}
