use crate::domain::ports::ParseErrorPolicy;
use crate::utils::error::{LookupError, Result};
use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::OnceLock;

/// Optional settings file. Every key may be omitted.
///
/// ```toml
/// [lookup]
/// endpoint = "${INTERPRO_LOOKUP_URL}"
/// timeout_seconds = 120
/// max_attempts = 8
/// poll_interval_seconds = 0.5
///
/// [dispatch]
/// max_per_query = 25
/// sleep_seconds = 1.0
/// on_parse_error = "skip"
/// include_sequence = true
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TomlConfig {
    #[serde(default)]
    pub lookup: LookupSection,
    #[serde(default)]
    pub dispatch: DispatchSection,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LookupSection {
    pub endpoint: Option<String>,
    pub timeout_seconds: Option<f64>,
    pub max_attempts: Option<u32>,
    pub poll_interval_seconds: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DispatchSection {
    pub max_per_query: Option<usize>,
    pub sleep_seconds: Option<f64>,
    pub on_parse_error: Option<ParseErrorPolicy>,
    pub include_sequence: Option<bool>,
}

impl TomlConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed = substitute_env_vars(content);

        toml::from_str(&processed)
            .map_err(|e| LookupError::config("config", format!("TOML parsing error: {}", e)))
    }
}

/// Replace `${VAR}` with the variable's value; unknown variables are left as-is.
fn substitute_env_vars(content: &str) -> String {
    static ENV_VAR: OnceLock<Regex> = OnceLock::new();
    let re = ENV_VAR.get_or_init(|| Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)\}").unwrap());

    re.replace_all(content, |caps: &Captures| {
        let name = &caps[1];
        std::env::var(name).unwrap_or_else(|_| caps[0].to_string())
    })
    .into_owned()
}
