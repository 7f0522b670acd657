use crate::core::dispatcher::batches;
use crate::domain::model::{RunSummary, SequenceRecord};
use crate::domain::ports::{ConfigProvider, MatchLookup, MatchSink, ParseErrorPolicy};
use crate::utils::error::{LookupError, Result};
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DispatchOptions {
    pub max_per_query: usize,
    pub sleep: Duration,
    pub on_parse_error: ParseErrorPolicy,
}

impl DispatchOptions {
    pub fn from_config<C: ConfigProvider>(config: &C) -> Result<Self> {
        Ok(Self {
            max_per_query: config.max_per_query(),
            sleep: config.sleep()?,
            on_parse_error: config.on_parse_error(),
        })
    }
}

/// Runs batches one after another: submit, wait for the result, write it,
/// then pause before the next submission.
pub struct EtlEngine<L: MatchLookup, S: MatchSink> {
    lookup: L,
    sink: S,
    options: DispatchOptions,
}

impl<L: MatchLookup, S: MatchSink> EtlEngine<L, S> {
    pub fn new(lookup: L, sink: S, options: DispatchOptions) -> Self {
        Self {
            lookup,
            sink,
            options,
        }
    }

    pub fn into_sink(self) -> S {
        self.sink
    }

    pub async fn run(&mut self, records: Vec<SequenceRecord>) -> Result<RunSummary> {
        let mut summary = RunSummary {
            sequences: records.len(),
            ..RunSummary::default()
        };

        let batches = batches(records, self.options.max_per_query);
        summary.batches = batches.len();
        tracing::info!(
            "Querying {} sequences in {} batches of up to {}",
            summary.sequences,
            summary.batches,
            self.options.max_per_query
        );

        for (position, batch) in batches.iter().enumerate() {
            if position > 0 && !self.options.sleep.is_zero() {
                tracing::debug!("Sleeping {:?} before batch {}", self.options.sleep, batch.index);
                tokio::time::sleep(self.options.sleep).await;
            }

            let matches = match self.lookup.lookup(batch).await {
                Ok(matches) => matches,
                Err(LookupError::ParseError { message })
                    if self.options.on_parse_error == ParseErrorPolicy::Skip =>
                {
                    tracing::warn!(
                        "Skipping batch {} ({} sequences): {}",
                        batch.index,
                        batch.len(),
                        message
                    );
                    summary.skipped_batches += 1;
                    continue;
                }
                Err(e) => {
                    tracing::error!("Batch {} failed: {}", batch.index, e);
                    return Err(e);
                }
            };

            let written = self.sink.write_matches(&matches)?;
            summary.matches_written += written;
            tracing::info!(
                "Batch {}/{}: {} matches for {} sequences",
                batch.index,
                summary.batches,
                written,
                batch.len()
            );
        }

        Ok(summary)
    }
}
