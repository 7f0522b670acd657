use crate::utils::error::{LookupError, Result};
use std::time::Duration;
use url::Url;

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

pub fn validate_url(field_name: &str, url_str: &str) -> Result<()> {
    if url_str.is_empty() {
        return Err(LookupError::config(field_name, "URL cannot be empty"));
    }

    match Url::parse(url_str) {
        Ok(url) => match url.scheme() {
            "http" | "https" => Ok(()),
            scheme => Err(LookupError::config(
                field_name,
                format!("Unsupported URL scheme: {}", scheme),
            )),
        },
        Err(e) => Err(LookupError::config(
            field_name,
            format!("Invalid URL format '{}': {}", url_str, e),
        )),
    }
}

pub fn validate_path(field_name: &str, path: &str) -> Result<()> {
    if path.trim().is_empty() {
        return Err(LookupError::config(field_name, "Path cannot be empty"));
    }

    if path.contains('\0') {
        return Err(LookupError::config(field_name, "Path contains null bytes"));
    }

    Ok(())
}

pub fn validate_positive_number(field_name: &str, value: usize, min_value: usize) -> Result<()> {
    if value < min_value {
        return Err(LookupError::config(
            field_name,
            format!("Value {} must be at least {}", value, min_value),
        ));
    }
    Ok(())
}

pub fn validate_seconds(field_name: &str, value: f64) -> Result<()> {
    duration_from_seconds(field_name, value).map(|_| ())
}

/// Convert a seconds value to a `Duration`, rejecting anything that is not a
/// representable non-negative span.
pub fn duration_from_seconds(field_name: &str, value: f64) -> Result<Duration> {
    if !value.is_finite() || value < 0.0 {
        return Err(LookupError::config(
            field_name,
            format!("{} is not a non-negative number of seconds", value),
        ));
    }
    Duration::try_from_secs_f64(value).map_err(|e| {
        LookupError::config(field_name, format!("{} seconds is out of range: {}", value, e))
    })
}
