pub mod adapters;
pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

pub use crate::adapters::interpro::{InterproClient, PollSettings};
pub use crate::config::{CliConfig, Settings};
pub use crate::core::etl::{DispatchOptions, EtlEngine};
pub use crate::domain::model::{DomainMatch, RunSummary, SequenceRecord};
pub use crate::utils::error::{LookupError, Result};
