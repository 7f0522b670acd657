use crate::domain::model::{Batch, DomainMatch};
use crate::utils::error::Result;
use async_trait::async_trait;
use std::time::Duration;

/// What to do with a batch whose response cannot be parsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ParseErrorPolicy {
    #[default]
    Abort,
    Skip,
}

pub trait ConfigProvider: Send + Sync {
    fn endpoint(&self) -> &str;
    fn max_per_query(&self) -> usize;
    fn sleep(&self) -> Result<Duration>;
    fn on_parse_error(&self) -> ParseErrorPolicy;
    fn include_sequence(&self) -> bool;
}

/// Remote source of precalculated matches for one batch.
#[async_trait]
pub trait MatchLookup: Send + Sync {
    async fn lookup(&self, batch: &Batch) -> Result<Vec<DomainMatch>>;
}

/// Destination for produced matches. Returns how many were written.
pub trait MatchSink {
    fn write_matches(&mut self, matches: &[DomainMatch]) -> Result<usize>;
}
