//! Download planning.

use std::sync::LazyLock;
use std::time::Duration;

use kbase_config::StorageConfig;
use kbase_types::Document;
use regex::Regex;

use crate::error::{ApiError, Result};

static TIMESTAMP_PREFIX_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d+-(.+)$").expect("valid timestamp prefix pattern"));

/// Everything needed to sign a GET for one document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadPlan {
    pub bucket: String,
    pub key: String,
    pub filename: String,
    pub content_disposition: String,
    pub expires_in: Duration,
}

/// Strips a leading `{bucket}/` left by rows written through the storage
/// provider's own uploader.
pub fn normalize_storage_key<'a>(key: &'a str, bucket: &str) -> &'a str {
    key.strip_prefix(bucket)
        .and_then(|rest| rest.strip_prefix('/'))
        .unwrap_or(key)
}

/// Name offered to the browser: the key's last segment without its
/// `{timestamp}-` prefix, falling back to the title, then `"document"`.
pub fn download_filename(key: &str, title: &str) -> String {
    let last = key.rsplit('/').next().unwrap_or(key);
    let original = TIMESTAMP_PREFIX_RE
        .captures(last)
        .and_then(|c| c.get(1))
        .map_or(last, |m| m.as_str());

    if !original.is_empty() {
        original.to_string()
    } else if !title.trim().is_empty() {
        title.to_string()
    } else {
        "document".to_string()
    }
}

fn content_disposition(filename: &str) -> String {
    let quoted: String = filename
        .chars()
        .map(|c| if c == '"' || c == '\\' || c.is_control() { '_' } else { c })
        .collect();
    format!("attachment; filename=\"{quoted}\"")
}

/// Builds the download plan for a document. Visibility is checked by the
/// caller before this runs.
pub fn plan_download(document: &Document, storage: &StorageConfig) -> Result<DownloadPlan> {
    let bucket = storage
        .bucket
        .clone()
        .ok_or_else(|| ApiError::Configuration("S3 bucket not configured".to_string()))?;

    let key = normalize_storage_key(&document.storage_key, &bucket).to_string();
    let filename = download_filename(&key, &document.title);

    Ok(DownloadPlan {
        content_disposition: content_disposition(&filename),
        bucket,
        key,
        filename,
        expires_in: Duration::from_secs(storage.download_url_ttl_secs),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use test_case::test_case;

    #[test_case("documents/uploads/u1/1-a.pdf", "uploads/u1/1-a.pdf"; "bucket prefix")]
    #[test_case("uploads/u1/1-a.pdf", "uploads/u1/1-a.pdf"; "no prefix")]
    #[test_case("documents-old/a.pdf", "documents-old/a.pdf"; "similar prefix")]
    fn test_normalize_storage_key(key: &str, expected: &str) {
        assert_eq!(normalize_storage_key(key, "documents"), expected);
    }

    #[test_case("uploads/u1/1700000000123-handbook.pdf", "Title", "handbook.pdf"; "timestamped")]
    #[test_case("uploads/u1/handbook.pdf", "Title", "handbook.pdf"; "plain")]
    #[test_case("uploads/u1/12-", "Title", "12-"; "prefix without name")]
    #[test_case("uploads/u1/", "Title", "Title"; "empty segment")]
    #[test_case("uploads/u1/", " ", "document"; "no title")]
    fn test_download_filename(key: &str, title: &str, expected: &str) {
        assert_eq!(download_filename(key, title), expected);
    }

    #[test]
    fn test_plan_download() {
        let created = chrono::Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
        let doc = Document::new(
            "d1",
            "Handbook",
            "documents/uploads/u1/1700000000123-hand\"book.pdf",
            "u1",
            created,
        );
        let storage = StorageConfig {
            bucket: Some("documents".to_string()),
            ..Default::default()
        };

        let plan = plan_download(&doc, &storage).unwrap();
        assert_eq!(plan.key, "uploads/u1/1700000000123-hand\"book.pdf");
        assert_eq!(plan.filename, "hand\"book.pdf");
        assert_eq!(plan.content_disposition, "attachment; filename=\"hand_book.pdf\"");
        assert_eq!(plan.expires_in, Duration::from_secs(3600));
    }

    #[test]
    fn test_plan_download_requires_bucket() {
        let created = chrono::Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
        let doc = Document::new("d1", "Handbook", "k", "u1", created);
        let err = plan_download(&doc, &StorageConfig::default()).unwrap_err();
        assert_eq!(err.status_code(), 500);
    }
}
