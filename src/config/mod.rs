pub mod toml_config;

use crate::adapters::interpro::{PollSettings, DEFAULT_ENDPOINT};
use crate::core::{ConfigProvider, ParseErrorPolicy};
use crate::utils::error::{LookupError, Result};
use crate::utils::validation::{
    duration_from_seconds, validate_path, validate_positive_number, validate_seconds,
    validate_url, Validate,
};
use clap::Parser;
use std::time::Duration;
use toml_config::TomlConfig;

pub const DEFAULT_MAX_PER_QUERY: usize = 10;
pub const DEFAULT_SLEEP_SECONDS: f64 = 0.0;
pub const DEFAULT_TIMEOUT_SECONDS: f64 = 60.0;
pub const DEFAULT_MAX_ATTEMPTS: u32 = 5;
pub const DEFAULT_POLL_INTERVAL_SECONDS: f64 = 0.1;

/// Accepted input formats. Only FASTA is read; the flag exists so command
/// lines written for the older script keep working.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum SequenceFormat {
    #[default]
    Fasta,
}

#[derive(Debug, Clone, Parser)]
#[command(name = "interpro-precalc")]
#[command(
    about = "Look up precalculated InterPro domain matches for UniProt sequences",
    long_about = "Reads a FASTA file, queries the InterPro match lookup service in batches \
                  and prints one JSON object per domain match to stdout. Sequences without \
                  a precalculated entry produce no output."
)]
pub struct CliConfig {
    /// FASTA file with the query proteins
    pub input: String,

    /// Maximum number of sequences per request [default: 10]
    #[arg(long = "max_per_query", visible_alias = "max-per-query")]
    pub max_per_query: Option<usize>,

    /// Seconds to wait between batch submissions [default: 0]
    #[arg(long)]
    pub sleep: Option<f64>,

    /// Match lookup endpoint
    #[arg(long)]
    pub endpoint: Option<String>,

    /// Input format
    #[arg(long, value_enum, default_value_t = SequenceFormat::Fasta)]
    pub format: SequenceFormat,

    /// Add the query sequence to every output record
    #[arg(long, overrides_with = "no_include_sequence")]
    pub include_sequence: bool,

    /// Leave the query sequence out, even if the settings file asks for it
    #[arg(long, overrides_with = "include_sequence")]
    pub no_include_sequence: bool,

    /// Write NDJSON here instead of stdout
    #[arg(short, long)]
    pub output: Option<String>,

    /// What to do with a batch whose response cannot be parsed [default: abort]
    #[arg(long, value_enum)]
    pub on_parse_error: Option<ParseErrorPolicy>,

    /// Per-request timeout in seconds [default: 60]
    #[arg(long)]
    pub timeout: Option<f64>,

    /// Requests per batch before giving up on a busy service [default: 5]
    #[arg(long)]
    pub max_attempts: Option<u32>,

    /// Base delay in seconds between polls, doubled on each retry [default: 0.1]
    #[arg(long)]
    pub poll_interval: Option<f64>,

    /// Optional TOML settings file; command-line flags take precedence
    #[arg(short, long)]
    pub config: Option<String>,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,

    /// Emit logs as JSON lines on stderr
    #[arg(long)]
    pub log_json: bool,
}

/// Effective settings after merging flags, the settings file and defaults.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub input: String,
    pub output: Option<String>,
    pub endpoint: String,
    pub max_per_query: usize,
    pub sleep_seconds: f64,
    pub on_parse_error: ParseErrorPolicy,
    pub include_sequence: bool,
    pub timeout_seconds: f64,
    pub max_attempts: u32,
    pub poll_interval_seconds: f64,
}

impl CliConfig {
    /// Load the settings file named by `--config`, if any, and merge.
    pub fn resolve(&self) -> Result<Settings> {
        let file = match &self.config {
            Some(path) => {
                tracing::debug!("Loading settings from {}", path);
                TomlConfig::from_file(path)?
            }
            None => TomlConfig::default(),
        };
        Ok(self.merge(&file))
    }

    fn include_sequence_flag(&self) -> Option<bool> {
        match (self.include_sequence, self.no_include_sequence) {
            (true, _) => Some(true),
            (_, true) => Some(false),
            _ => None,
        }
    }

    pub fn merge(&self, file: &TomlConfig) -> Settings {
        let lookup = &file.lookup;
        let dispatch = &file.dispatch;

        Settings {
            input: self.input.clone(),
            output: self.output.clone(),
            endpoint: self
                .endpoint
                .clone()
                .or_else(|| lookup.endpoint.clone())
                .unwrap_or_else(|| DEFAULT_ENDPOINT.to_string()),
            max_per_query: self
                .max_per_query
                .or(dispatch.max_per_query)
                .unwrap_or(DEFAULT_MAX_PER_QUERY),
            sleep_seconds: self
                .sleep
                .or(dispatch.sleep_seconds)
                .unwrap_or(DEFAULT_SLEEP_SECONDS),
            on_parse_error: self
                .on_parse_error
                .or(dispatch.on_parse_error)
                .unwrap_or_default(),
            include_sequence: self
                .include_sequence_flag()
                .or(dispatch.include_sequence)
                .unwrap_or(false),
            timeout_seconds: self
                .timeout
                .or(lookup.timeout_seconds)
                .unwrap_or(DEFAULT_TIMEOUT_SECONDS),
            max_attempts: self
                .max_attempts
                .or(lookup.max_attempts)
                .unwrap_or(DEFAULT_MAX_ATTEMPTS),
            poll_interval_seconds: self
                .poll_interval
                .or(lookup.poll_interval_seconds)
                .unwrap_or(DEFAULT_POLL_INTERVAL_SECONDS),
        }
    }
}

impl Settings {
    pub fn poll_settings(&self) -> Result<PollSettings> {
        Ok(PollSettings {
            max_attempts: self.max_attempts,
            interval: duration_from_seconds("poll_interval", self.poll_interval_seconds)?,
            request_timeout: duration_from_seconds("timeout", self.timeout_seconds)?,
        })
    }
}

impl Validate for Settings {
    fn validate(&self) -> Result<()> {
        validate_path("input", &self.input)?;
        if let Some(output) = &self.output {
            validate_path("output", output)?;
        }
        validate_url("endpoint", &self.endpoint)?;
        validate_positive_number("max_per_query", self.max_per_query, 1)?;
        validate_positive_number("max_attempts", self.max_attempts as usize, 1)?;
        validate_seconds("sleep", self.sleep_seconds)?;
        validate_seconds("poll_interval", self.poll_interval_seconds)?;
        validate_seconds("timeout", self.timeout_seconds)?;
        if self.timeout_seconds == 0.0 {
            return Err(LookupError::config(
                "timeout",
                "timeout must be greater than zero",
            ));
        }
        Ok(())
    }
}

impl ConfigProvider for Settings {
    fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn max_per_query(&self) -> usize {
        self.max_per_query
    }

    fn sleep(&self) -> Result<Duration> {
        duration_from_seconds("sleep", self.sleep_seconds)
    }

    fn on_parse_error(&self) -> ParseErrorPolicy {
        self.on_parse_error
    }

    fn include_sequence(&self) -> bool {
        self.include_sequence
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn parse(args: &[&str]) -> CliConfig {
        let mut argv = vec!["interpro-precalc"];
        argv.extend_from_slice(args);
        CliConfig::try_parse_from(argv).unwrap()
    }

    #[test]
    fn test_defaults() {
        let settings = parse(&["proteins.fasta"]).merge(&TomlConfig::default());

        assert_eq!(settings.input, "proteins.fasta");
        assert_eq!(settings.endpoint, DEFAULT_ENDPOINT);
        assert_eq!(settings.max_per_query, 10);
        assert_eq!(settings.sleep().unwrap(), Duration::ZERO);
        assert_eq!(settings.on_parse_error, ParseErrorPolicy::Abort);
        assert!(!settings.include_sequence);
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_original_flag_spelling() {
        let cli = parse(&["--max_per_query", "3", "--sleep", "1.5", "in.fa"]);
        assert_eq!(cli.max_per_query, Some(3));
        assert_eq!(cli.sleep, Some(1.5));

        let cli = parse(&["in.fa", "--max-per-query", "4", "--on-parse-error", "skip"]);
        assert_eq!(cli.max_per_query, Some(4));
        assert_eq!(cli.on_parse_error, Some(ParseErrorPolicy::Skip));
    }

    #[test]
    fn test_flags_override_file() {
        let file = TomlConfig::from_toml_str(
            "[dispatch]\nmax_per_query = 50\nsleep_seconds = 2.0\n[lookup]\nmax_attempts = 9\n",
        )
        .unwrap();
        let settings = parse(&["in.fa", "--max_per_query", "5"]).merge(&file);

        assert_eq!(settings.max_per_query, 5);
        assert_eq!(settings.sleep().unwrap(), Duration::from_secs(2));
        assert_eq!(settings.poll_settings().unwrap().max_attempts, 9);
    }

    #[test]
    fn test_validation_rejects_bad_values() {
        let base = parse(&["in.fa"]).merge(&TomlConfig::default());

        let zero_batch = Settings {
            max_per_query: 0,
            ..base.clone()
        };
        assert!(zero_batch.validate().is_err());

        let negative_sleep = Settings {
            sleep_seconds: -1.0,
            ..base.clone()
        };
        assert!(negative_sleep.validate().is_err());

        let bad_endpoint = Settings {
            endpoint: "not a url".to_string(),
            ..base.clone()
        };
        assert!(bad_endpoint.validate().is_err());

        let no_timeout = Settings {
            timeout_seconds: 0.0,
            ..base.clone()
        };
        assert!(no_timeout.validate().is_err());

        for huge in [
            Settings {
                sleep_seconds: 1e20,
                ..base.clone()
            },
            Settings {
                timeout_seconds: 1e20,
                ..base.clone()
            },
            Settings {
                poll_interval_seconds: 1e20,
                ..base.clone()
            },
        ] {
            assert!(matches!(
                huge.validate(),
                Err(LookupError::ConfigError { .. })
            ));
        }

        let huge_sleep = parse(&["in.fa", "--sleep", "1e20"]).merge(&TomlConfig::default());
        assert!(huge_sleep.sleep().is_err());
        let huge_timeout = parse(&["in.fa", "--timeout", "1e20"]).merge(&TomlConfig::default());
        assert!(huge_timeout.poll_settings().is_err());
    }

    #[test]
    fn test_resolve_reads_config_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "[dispatch]\nmax_per_query = 7\ninclude_sequence = true\n[lookup]\ntimeout_seconds = 5.0"
        )
        .unwrap();
        let path = file.path().to_str().unwrap();

        let settings = parse(&["in.fa", "--config", path]).resolve().unwrap();
        assert_eq!(settings.max_per_query, 7);
        assert_eq!(settings.timeout_seconds, 5.0);
        assert!(settings.include_sequence);

        let settings = parse(&["in.fa", "--config", path, "--no-include-sequence"])
            .resolve()
            .unwrap();
        assert!(!settings.include_sequence);
        assert_eq!(settings.max_per_query, 7);

        let settings = parse(&["in.fa", "--no-include-sequence", "--include-sequence"])
            .resolve()
            .unwrap();
        assert!(settings.include_sequence);
    }

    #[test]
    fn test_resolve_missing_config_file_fails() {
        let dir = tempfile::TempDir::new().unwrap();
        let missing = dir.path().join("absent.toml");
        let result = parse(&["in.fa", "--config", missing.to_str().unwrap()]).resolve();
        assert!(result.is_err());
    }

    #[test]
    fn test_format_flag_accepts_only_fasta() {
        assert_eq!(parse(&["in.fa"]).format, SequenceFormat::Fasta);
        assert_eq!(
            parse(&["in.fa", "--format", "fasta"]).format,
            SequenceFormat::Fasta
        );
        assert!(
            CliConfig::try_parse_from(["interpro-precalc", "in.fa", "--format", "genbank"])
                .is_err()
        );
    }
}
