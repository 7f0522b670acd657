use thiserror::Error;

#[derive(Error, Debug)]
pub enum LookupError {
    #[error("Malformed input at line {line}: {message}")]
    FormatError { line: usize, message: String },

    #[error("Lookup service unreachable: {0}")]
    NetworkError(#[from] reqwest::Error),

    #[error("Lookup service returned {status}: {message}")]
    RemoteError { status: u16, message: String },

    #[error("Unexpected lookup response: {message}")]
    ParseError { message: String },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error in '{field}': {message}")]
    ConfigError { field: String, message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Input,
    Network,
    Remote,
    Response,
    System,
    Configuration,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Medium,
    High,
    Critical,
}

impl LookupError {
    pub fn format(line: usize, message: impl Into<String>) -> Self {
        Self::FormatError {
            line,
            message: message.into(),
        }
    }

    pub fn parse(message: impl Into<String>) -> Self {
        Self::ParseError {
            message: message.into(),
        }
    }

    pub fn config(field: &str, message: impl Into<String>) -> Self {
        Self::ConfigError {
            field: field.to_string(),
            message: message.into(),
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::FormatError { .. } => ErrorCategory::Input,
            Self::NetworkError(_) => ErrorCategory::Network,
            Self::RemoteError { .. } => ErrorCategory::Remote,
            Self::ParseError { .. } => ErrorCategory::Response,
            Self::IoError(_) | Self::SerializationError(_) => ErrorCategory::System,
            Self::ConfigError { .. } => ErrorCategory::Configuration,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Remote => ErrorSeverity::Medium,
            ErrorCategory::Input | ErrorCategory::Response | ErrorCategory::Configuration => {
                ErrorSeverity::High
            }
            ErrorCategory::Network | ErrorCategory::System => ErrorSeverity::Critical,
        }
    }

    /// Process exit code for a run that ended with this error.
    pub fn exit_code(&self) -> i32 {
        match self.severity() {
            ErrorSeverity::Medium => 2,
            ErrorSeverity::High => 1,
            ErrorSeverity::Critical => 3,
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            Self::FormatError { .. } => {
                "Check that every record has a '>' header with an identifier and a non-empty sequence"
            }
            Self::NetworkError(_) => {
                "Check network connectivity and the --endpoint URL, or raise --timeout"
            }
            Self::RemoteError { .. } => {
                "The service may be overloaded; retry later with a larger --sleep or smaller --max_per_query"
            }
            Self::ParseError { .. } => {
                "The lookup response format may have changed; rerun with --on-parse-error skip to keep going"
            }
            Self::IoError(_) => "Check that the input file exists and the output location is writable",
            Self::SerializationError(_) => "Report this as a bug",
            Self::ConfigError { .. } => "Fix the flagged option on the command line or in the config file",
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            Self::FormatError { line, message } => {
                format!("Input file is not valid FASTA (line {}): {}", line, message)
            }
            Self::NetworkError(e) => format!("Could not reach the InterPro lookup service: {}", e),
            Self::RemoteError { status, .. } => {
                format!("The InterPro lookup service rejected the request (HTTP {})", status)
            }
            Self::ParseError { message } => {
                format!("Could not understand the InterPro response: {}", message)
            }
            other => other.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, LookupError>;
