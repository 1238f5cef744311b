use chrono::NaiveDate;
use reqwest::Url;

use crate::{
    config::HarvestConfig,
    error::{HarvestError, Result}
};

const VERB: &str = "ListRecords";
// OAI-PMH day granularity, independent of how `created` is parsed.
const QUERY_DATE_FORMAT: &str = "%Y-%m-%d";

/// One `ListRecords` request. The two modes are mutually exclusive: once the
/// server hands out a resumption token, the range and set are no longer sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HarvestRequest {
    Initial {
        subject_set: String,
        from: NaiveDate,
        until: NaiveDate
    },
    Resume {
        token: String
    }
}

impl HarvestRequest {
    pub fn initial(subject_set: &str, from: NaiveDate, until: NaiveDate) -> Self {
        HarvestRequest::Initial {
            subject_set: subject_set.to_string(),
            from,
            until
        }
    }

    pub fn resume(token: String) -> Self {
        HarvestRequest::Resume { token }
    }

    fn query_pairs(&self, config: &HarvestConfig) -> Vec<(&'static str, String)> {
        match self {
            HarvestRequest::Initial { subject_set, from, until } => vec![
                ("verb", VERB.to_string()),
                ("from", from.format(QUERY_DATE_FORMAT).to_string()),
                ("until", until.format(QUERY_DATE_FORMAT).to_string()),
                ("metadataPrefix", config.metadata_prefix.clone()),
                ("set", subject_set.clone()),
            ],
            HarvestRequest::Resume { token } => vec![
                ("verb", VERB.to_string()),
                ("resumptionToken", token.clone()),
            ],
        }
    }

    pub fn to_url(&self, config: &HarvestConfig) -> Result<String> {
        let url = Url::parse_with_params(&config.base_url, self.query_pairs(config))
            .map_err(|e| HarvestError::Config(format!("invalid base url `{}`: {}", config.base_url, e)))?;
        Ok(url.to_string())
    }
}
