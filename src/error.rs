use thiserror::Error;

pub type Result<T> = std::result::Result<T, HarvestError>;

// every variant is fatal for the harvest in progress. rate limiting is
// handled inside the page loop and only escapes as `RetryExhausted`.
#[derive(Debug, Error)]
pub enum HarvestError {
    #[error("transport failure: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("request to {url} failed with HTTP {status}")]
    HttpStatus { status: u16, url: String },

    #[error("still rate limited after {attempts} attempts at {url}")]
    RetryExhausted { attempts: u32, url: String },

    #[error("malformed record: {0}")]
    MalformedRecord(String),

    #[error("malformed xml document: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("OAI-PMH error `{code}`: {message}")]
    Protocol { code: String, message: String },

    #[error("invalid configuration: {0}")]
    Config(String),
}

impl HarvestError {
    pub fn malformed(message: impl Into<String>) -> Self {
        HarvestError::MalformedRecord(message.into())
    }
}
