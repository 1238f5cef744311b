use std::{env, io, path::Path, str::FromStr, time::Duration};

use chrono::format::{Item, StrftimeItems};
use dotenvy;

use crate::error::{HarvestError, Result};

const ENV_FILE: &str = "harvester.env";

pub const DEFAULT_BASE_URL: &str = "http://export.arxiv.org/oai2";
pub const DEFAULT_SUBJECT_SET: &str = "physics:quant-ph";
pub const DEFAULT_METADATA_PREFIX: &str = "arXiv";
pub const DEFAULT_DATE_FORMAT: &str = "%Y-%m-%d";
pub const DEFAULT_RETRY_AFTER_SECS: u64 = 30;
pub const DEFAULT_MAX_RETRIES: u32 = 5;

pub const OAI_NAMESPACE: &str = "http://www.openarchives.org/OAI/2.0/";
pub const ARXIV_NAMESPACE: &str = "http://arxiv.org/OAI/arXiv/";

/// Namespace URIs the page parser resolves element names against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Namespaces {
    /// OAI-PMH envelope: `ListRecords`, `record`, `header`, `resumptionToken`.
    pub oai: String,
    /// Metadata block for the `arXiv` metadata prefix.
    pub arxiv: String,
}

impl Default for Namespaces {
    fn default() -> Self {
        Namespaces {
            oai: String::from(OAI_NAMESPACE),
            arxiv: String::from(ARXIV_NAMESPACE),
        }
    }
}

/// Everything a `Harvester` needs besides the date range.
///
/// `request_timeout` defaults to `None`: requests may block indefinitely and
/// only the server-directed backoff between attempts is time bounded. Set it
/// explicitly when a hung connection should fail the harvest instead.
///
/// `max_retries` caps how many times a rate-limited (503) request is reissued.
/// `None` retries forever and has to be opted into.
#[derive(Debug, Clone)]
pub struct HarvestConfig {
    pub base_url: String,
    pub subject_set: String,
    pub metadata_prefix: String,
    pub date_format: String,
    pub namespaces: Namespaces,
    pub max_retries: Option<u32>,
    pub default_retry_after: Duration,
    pub request_timeout: Option<Duration>,
    pub user_agent: String,
}

impl Default for HarvestConfig {
    fn default() -> Self {
        HarvestConfig {
            base_url: String::from(DEFAULT_BASE_URL),
            subject_set: String::from(DEFAULT_SUBJECT_SET),
            metadata_prefix: String::from(DEFAULT_METADATA_PREFIX),
            date_format: String::from(DEFAULT_DATE_FORMAT),
            namespaces: Namespaces::default(),
            max_retries: Some(DEFAULT_MAX_RETRIES),
            default_retry_after: Duration::from_secs(DEFAULT_RETRY_AFTER_SECS),
            request_timeout: None,
            user_agent: format!("arxivharvest/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl HarvestConfig {
    pub fn with_subject_set(mut self, subject_set: &str) -> Self {
        self.subject_set = subject_set.to_string();
        self
    }

    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.to_string();
        self
    }

    pub fn with_max_retries(mut self, max_retries: Option<u32>) -> Self {
        self.max_retries = max_retries;
        self
    }

    pub fn with_request_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Defaults overridden by whatever is set in the process environment,
    /// after loading `harvester.env` if one exists.
    pub fn from_env() -> Result<Self> {
        load_env_file(ENV_FILE)?;

        let mut config = Self::default();
        if let Some(base_url) = get_string_from_env("OAI_BASE_URL") {
            config.base_url = base_url;
        }
        if let Some(subject_set) = get_string_from_env("SUBJECT_SET") {
            config.subject_set = subject_set;
        }
        if let Some(prefix) = get_string_from_env("METADATA_PREFIX") {
            config.metadata_prefix = prefix;
        }
        if let Some(user_agent) = get_string_from_env("USER_AGENT") {
            config.user_agent = user_agent;
        }
        // 0 lifts the cap entirely.
        if let Some(max_retries) = get_parsed_from_env::<u32>("MAX_RETRIES")? {
            config.max_retries = (max_retries > 0).then_some(max_retries);
        }
        if let Some(secs) = get_parsed_from_env::<u64>("RETRY_AFTER_SECS")? {
            config.default_retry_after = Duration::from_secs(secs);
        }
        if let Some(secs) = get_parsed_from_env::<u64>("REQUEST_TIMEOUT_SECS")? {
            config.request_timeout = Some(Duration::from_secs(secs));
        }
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.subject_set.trim().is_empty() {
            return Err(HarvestError::Config("subject set must not be empty".into()));
        }
        if self.metadata_prefix.trim().is_empty() {
            return Err(HarvestError::Config("metadata prefix must not be empty".into()));
        }
        let bad_format = StrftimeItems::new(&self.date_format)
            .any(|item| matches!(item, Item::Error));
        if bad_format {
            return Err(HarvestError::Config(format!(
                "invalid date format `{}`", self.date_format
            )));
        }
        Ok(())
    }
}

// the env file is optional, but one that exists has to parse.
fn load_env_file<P: AsRef<Path>>(path: P) -> Result<()> {
    match dotenvy::from_filename(path.as_ref()) {
        Ok(_) => Ok(()),
        Err(dotenvy::Error::Io(e)) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(HarvestError::Config(format!(
            "failed to load {}: {}", path.as_ref().display(), e
        ))),
    }
}

fn get_string_from_env(key: &str) -> Option<String> {
    env::var(key).ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn get_parsed_from_env<T: FromStr>(key: &str) -> Result<Option<T>> {
    match get_string_from_env(key) {
        None => Ok(None),
        Some(raw) => raw.parse::<T>()
            .map(Some)
            .map_err(|_| HarvestError::Config(format!("failed to parse {} from `{}`", key, raw))),
    }
}
