pub mod config;
pub mod error;
pub mod fetch;
pub mod format;
pub mod harvester;
pub mod logger;
pub mod model;
pub mod parser;
pub mod request;

#[cfg(test)]
mod fixtures;

pub use config::{HarvestConfig, Namespaces};
pub use error::{HarvestError, Result};
pub use harvester::Harvester;
pub use model::{PaperRecord, ResultTable};
