use crate::utils::error::{LoadTestError, Result};
use url::Url;

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

fn invalid(field: &str, value: &str, reason: impl Into<String>) -> LoadTestError {
    LoadTestError::InvalidConfigValueError {
        field: field.to_string(),
        value: value.to_string(),
        reason: reason.into(),
    }
}

fn parse_http_url(field: &str, value: &str) -> Result<Url> {
    let url = Url::parse(value).map_err(|e| invalid(field, value, format!("not a URL: {}", e)))?;
    if !matches!(url.scheme(), "http" | "https") {
        let reason = format!("scheme must be http or https, got {}", url.scheme());
        return Err(invalid(field, value, reason));
    }
    if url.host_str().is_none() {
        return Err(invalid(field, value, "URL has no host"));
    }
    Ok(url)
}

/// The API base that `/devices/merchant/...` is appended to. A path prefix is
/// kept, but a query or fragment would end up in the middle of every request URL.
pub fn validate_api_host(field: &str, value: &str) -> Result<()> {
    let url = parse_http_url(field, value)?;
    if url.query().is_some() {
        return Err(invalid(field, value, "API host cannot carry a query string"));
    }
    if url.fragment().is_some() {
        return Err(invalid(field, value, "API host cannot carry a fragment"));
    }
    Ok(())
}

/// Sent verbatim as `postbackUrl` in every create payload.
pub fn validate_postback_url(field: &str, value: &str) -> Result<()> {
    parse_http_url(field, value).map(|_| ())
}

/// The key travels as the `x-api-key` header, so it must be visible ASCII.
pub fn validate_api_key(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(invalid(field, "", "API key cannot be empty"));
    }
    if !value.bytes().all(|b| b.is_ascii_graphic()) {
        // never echo the key itself
        let reason = "API key must be printable ASCII without spaces";
        return Err(invalid(field, "<redacted>", reason));
    }
    Ok(())
}

pub fn validate_csv_path(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(invalid(field, value, "file path cannot be empty"));
    }
    if value.ends_with('/') || value.ends_with(std::path::MAIN_SEPARATOR) {
        return Err(invalid(field, value, "expected a file, got a directory"));
    }
    Ok(())
}

/// A phase with no attempts would never call the API at all.
pub fn validate_attempts(field: &str, attempts: u32) -> Result<()> {
    if attempts == 0 {
        return Err(invalid(field, "0", "must be at least 1"));
    }
    Ok(())
}

pub fn validate_required_field<T>(field_name: &str, value: Option<T>) -> Result<T> {
    value.ok_or_else(|| LoadTestError::MissingConfigError {
        field: field_name.to_string(),
    })
}
