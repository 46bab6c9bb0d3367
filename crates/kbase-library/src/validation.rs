//! Input validation helpers shared by the request handlers.

use std::sync::LazyLock;

use regex::Regex;
use url::Url;
use uuid::Uuid;

use crate::error::{ApiError, Result};

static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid email pattern"));

/// Checks the loose `local@domain.tld` shape. Deliverability is the
/// identity provider's problem.
pub fn validate_email(email: &str) -> bool {
    EMAIL_RE.is_match(email)
}

/// Checks for a hyphenated UUID, any version, any case.
pub fn validate_uuid(value: &str) -> bool {
    value.len() == 36 && Uuid::try_parse(value).is_ok()
}

/// Checks the filename's extension against `allowed` (case-insensitive).
/// A name without an extension is rejected.
pub fn validate_file_type(filename: &str, allowed: &[&str]) -> bool {
    let Some((_, extension)) = filename.rsplit_once('.') else {
        return false;
    };
    if extension.is_empty() {
        return false;
    }
    allowed.iter().any(|a| a.eq_ignore_ascii_case(extension))
}

pub fn validate_file_size(file_size: u64, max_size: u64) -> bool {
    file_size <= max_size
}

/// Requires every named field to be present and not blank.
///
/// The error lists every missing field; `field` names the first.
pub fn validate_required(fields: &[(&str, Option<&str>)]) -> Result<()> {
    let missing: Vec<&str> = fields
        .iter()
        .filter(|(_, value)| value.is_none_or(|v| v.trim().is_empty()))
        .map(|(name, _)| *name)
        .collect();

    match missing.first() {
        None => Ok(()),
        Some(first) => Err(ApiError::invalid_field(
            *first,
            format!("Missing required fields: {}", missing.join(", ")),
        )),
    }
}

/// Trims and strips angle brackets.
pub fn sanitize_input(input: &str) -> String {
    input.trim().replace(['<', '>'], "")
}

/// Parses an absolute URL, as required for entries in the tools directory.
pub fn validate_url(value: &str) -> Result<Url> {
    Url::parse(value).map_err(|_| ApiError::invalid_field("url", "Invalid URL format"))
}

/// Treats a blank optional string as absent.
pub(crate) fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .filter(|v| !v.trim().is_empty())
        .map(str::to_string)
}
