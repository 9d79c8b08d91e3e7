//! Local validation of tokens, ids, conversion types and URLs.
//!
//! Only shape checks are done here. Option values are never validated
//! locally; the server is the authority on what a conversion accepts.

use std::sync::LazyLock;

use regex::Regex;
use url::Url;

use crate::error::ApiError;

/// Prefix every conversion type identifier starts with.
pub const CONVERSION_TYPE_PREFIX: &str = "convert.";

/// File and task ids are 32-character hexadecimal strings.
static HEX_ID_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    #[allow(clippy::expect_used)]
    Regex::new(r"(?i)^[a-f0-9]{32}$").expect("hex id regex is valid")
});

/// Validates that the API token is non-empty.
///
/// # Errors
///
/// Returns [`ApiError::Validation`] for an empty or whitespace-only token.
pub fn validate_api_token(token: &str) -> Result<(), ApiError> {
    if token.trim().is_empty() {
        return Err(ApiError::validation("API token cannot be empty"));
    }
    Ok(())
}

/// Validates a conversion type of the form `convert.source_to_target`.
///
/// # Errors
///
/// Returns [`ApiError::Validation`] when the type is empty or lacks the
/// `convert.` prefix.
pub fn validate_conversion_type(conversion_type: &str) -> Result<(), ApiError> {
    if conversion_type.is_empty() {
        return Err(ApiError::validation("Conversion type is required"));
    }
    if !conversion_type.starts_with(CONVERSION_TYPE_PREFIX) {
        return Err(ApiError::validation(format!(
            "Invalid conversion type format: \"{conversion_type}\". Expected format: \"convert.source_to_target\""
        )));
    }
    Ok(())
}

/// Validates a file id.
///
/// # Errors
///
/// Returns [`ApiError::Validation`] unless the id is 32 hex characters.
pub fn validate_file_id(file_id: &str) -> Result<(), ApiError> {
    validate_hex_id("file", file_id)
}

/// Validates a task id.
///
/// # Errors
///
/// Returns [`ApiError::Validation`] unless the id is 32 hex characters.
pub fn validate_task_id(task_id: &str) -> Result<(), ApiError> {
    validate_hex_id("task", task_id)
}

fn validate_hex_id(kind: &str, id: &str) -> Result<(), ApiError> {
    if id.is_empty() {
        return Err(ApiError::validation(format!("{kind} ID is required")));
    }
    if !HEX_ID_PATTERN.is_match(id) {
        return Err(ApiError::validation(format!(
            "Invalid {kind} ID format: \"{id}\". Expected 32-character hexadecimal string"
        )));
    }
    Ok(())
}

/// Validates that `url` parses as an absolute URL.
///
/// # Errors
///
/// Returns [`ApiError::Validation`] for malformed URLs.
pub fn validate_url(url: &str) -> Result<(), ApiError> {
    Url::parse(url)
        .map(|_| ())
        .map_err(|_| ApiError::validation(format!("Invalid URL: {url}")))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    const VALID_ID: &str = "0123456789abcdef0123456789ABCDEF";

    #[test]
    fn test_validate_api_token() {
        assert!(validate_api_token("abc").is_ok());
        assert!(matches!(
            validate_api_token(""),
            Err(ApiError::Validation { .. })
        ));
        assert!(validate_api_token(" \t").is_err());
    }

    #[test]
    fn test_validate_conversion_type_accepts_prefixed() {
        assert!(validate_conversion_type("convert.xml_to_csv").is_ok());
        assert!(validate_conversion_type("convert.something_new").is_ok());
    }

    #[test]
    fn test_validate_conversion_type_rejects_bad_values() {
        assert!(validate_conversion_type("").is_err());
        assert!(validate_conversion_type("xml_to_csv").is_err());
        assert!(validate_conversion_type("Convert.xml_to_csv").is_err());
    }

    #[test]
    fn test_validate_ids_accept_32_hex() {
        assert!(validate_file_id(VALID_ID).is_ok());
        assert!(validate_task_id(VALID_ID).is_ok());
    }

    #[test]
    fn test_validate_ids_reject_bad_shapes() {
        assert!(validate_file_id("").is_err());
        assert!(validate_file_id("xyz").is_err());
        assert!(validate_task_id(&format!("{VALID_ID}0")).is_err());
        let error = validate_task_id("0123456789abcdef0123456789abcdeg").unwrap_err();
        assert!(error.message().contains("task ID"), "{error}");
    }

    #[test]
    fn test_validate_url() {
        assert!(validate_url("https://example.com/doc.pdf").is_ok());
        assert!(validate_url("not a url").is_err());
        assert!(validate_url("example.com/no-scheme").is_err());
    }
}
