pub mod dispatcher;
pub mod etl;

pub use crate::domain::model::{Batch, DomainMatch, RunSummary, SequenceRecord};
pub use crate::domain::ports::{ConfigProvider, MatchLookup, MatchSink, ParseErrorPolicy};
pub use crate::utils::error::Result;
