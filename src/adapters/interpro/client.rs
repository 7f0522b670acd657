use super::response::{parse_lookup_response, MatchGroup};
use crate::domain::model::{Batch, DomainMatch, SequenceRecord};
use crate::domain::ports::MatchLookup;
use crate::utils::error::{LookupError, Result};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use std::collections::HashMap;
use std::time::Duration;

pub const DEFAULT_ENDPOINT: &str = "https://www.ebi.ac.uk/interpro/match-lookup/matches/";

/// How long to keep asking before giving up on a batch.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PollSettings {
    pub max_attempts: u32,
    /// Base delay; attempt `n` waits `interval * 2^(n-1)`.
    pub interval: Duration,
    pub request_timeout: Duration,
}

impl Default for PollSettings {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            interval: Duration::from_millis(100),
            request_timeout: Duration::from_secs(60),
        }
    }
}

impl PollSettings {
    fn backoff(&self, attempt: u32) -> Duration {
        self.interval
            .saturating_mul(2u32.saturating_pow(attempt.saturating_sub(1)))
    }
}

enum PollOutcome {
    Ready(String),
    Pending(LookupError),
}

pub struct InterproClient {
    client: Client,
    endpoint: String,
    poll: PollSettings,
    include_sequence: bool,
}

impl InterproClient {
    pub fn new(endpoint: impl Into<String>, poll: PollSettings) -> Result<Self> {
        let client = Client::builder()
            .timeout(poll.request_timeout)
            .user_agent(concat!("interpro-precalc/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            endpoint: endpoint.into(),
            poll,
            include_sequence: false,
        })
    }

    pub fn with_sequences(mut self, include_sequence: bool) -> Self {
        self.include_sequence = include_sequence;
        self
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Submit the batch and keep polling until the service reports a ready
    /// result or a terminal failure.
    async fn fetch_ready(&self, batch_index: usize, md5s: &[String]) -> Result<String> {
        let form: Vec<(&str, &str)> = md5s.iter().map(|m| ("md5", m.as_str())).collect();
        let mut last_error = None;

        for attempt in 1..=self.poll.max_attempts {
            tracing::debug!(
                "Batch {}: request attempt {}/{} to {}",
                batch_index,
                attempt,
                self.poll.max_attempts,
                self.endpoint
            );

            match self.poll_once(&form).await? {
                PollOutcome::Ready(body) => return Ok(body),
                PollOutcome::Pending(e) => {
                    if attempt < self.poll.max_attempts {
                        let delay = self.poll.backoff(attempt);
                        tracing::warn!(
                            "Batch {}: result not ready ({}); retrying in {:?}",
                            batch_index,
                            e,
                            delay
                        );
                        tokio::time::sleep(delay).await;
                    }
                    last_error = Some(e);
                }
            }
        }

        Err(last_error.unwrap_or_else(|| LookupError::RemoteError {
            status: 0,
            message: "no request attempts were made".to_string(),
        }))
    }

    async fn poll_once(&self, form: &[(&str, &str)]) -> Result<PollOutcome> {
        let response = match self.client.post(&self.endpoint).form(form).send().await {
            Ok(response) => response,
            Err(e) if e.is_connect() || e.is_timeout() => {
                return Ok(PollOutcome::Pending(LookupError::NetworkError(e)))
            }
            Err(e) => return Err(e.into()),
        };

        let status = response.status();
        tracing::debug!("Lookup response status: {}", status);

        if status == StatusCode::OK {
            return Ok(PollOutcome::Ready(response.text().await?));
        }

        let body = response.text().await.unwrap_or_default();
        let error = LookupError::RemoteError {
            status: status.as_u16(),
            message: summarize_body(&body),
        };

        if is_not_ready(status) {
            Ok(PollOutcome::Pending(error))
        } else {
            Err(error)
        }
    }

    fn to_domain_matches(
        &self,
        batch: &Batch,
        keys: &[(String, &SequenceRecord)],
        groups: Vec<MatchGroup>,
    ) -> Result<Vec<DomainMatch>> {
        let position: HashMap<&str, usize> = keys
            .iter()
            .enumerate()
            .map(|(i, (md5, _))| (md5.as_str(), i))
            .collect();

        let mut ordered: Vec<(usize, MatchGroup)> = Vec::with_capacity(groups.len());
        for group in groups {
            let index = *position.get(group.protein_md5.as_str()).ok_or_else(|| {
                LookupError::parse(format!(
                    "batch {}: response contains proteinMD5 {} that was not requested",
                    batch.index, group.protein_md5
                ))
            })?;
            ordered.push((index, group));
        }
        ordered.sort_by_key(|(index, _)| *index);

        let mut matches = Vec::new();
        for (index, group) in ordered {
            let record = keys[index].1;
            for hit in group.hits {
                matches.push(DomainMatch {
                    protein_id: record.id.clone(),
                    protein_md5: group.protein_md5.clone(),
                    signature_accession: hit.signature_accession,
                    model_accession: hit.model_accession,
                    database: hit.database,
                    database_release: hit.database_release,
                    start: hit.start,
                    end: hit.end,
                    score: hit.score,
                    evalue: hit.evalue,
                    sequence: self.include_sequence.then(|| record.sequence.clone()),
                });
            }
        }

        Ok(matches)
    }
}

#[async_trait]
impl MatchLookup for InterproClient {
    async fn lookup(&self, batch: &Batch) -> Result<Vec<DomainMatch>> {
        let keys = batch.distinct_md5s();
        if keys.is_empty() {
            return Ok(Vec::new());
        }
        let md5s: Vec<String> = keys.iter().map(|(md5, _)| md5.clone()).collect();

        let body = self.fetch_ready(batch.index, &md5s).await?;
        let groups = parse_lookup_response(&body)?;

        tracing::debug!(
            "Batch {}: {} of {} sequences have precalculated matches",
            batch.index,
            groups.len(),
            md5s.len()
        );

        self.to_domain_matches(batch, &keys, groups)
    }
}

fn is_not_ready(status: StatusCode) -> bool {
    // 202: accepted but still computing; 5xx: transient gateway trouble.
    matches!(status.as_u16(), 202 | 500 | 502 | 503 | 504)
}

fn summarize_body(body: &str) -> String {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return "empty response body".to_string();
    }
    trimmed.chars().take(200).collect()
}
