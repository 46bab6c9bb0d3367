//! Upload planning and new-document metadata.
//!
//! Content goes straight from the browser to the object store through a
//! short-lived signed URL. This module decides the key and checks the
//! request; signing is done by the caller's object-store client.

use std::time::Duration;

use kbase_config::{StorageConfig, UploadsConfig};
use kbase_rbac::Visibility;
use kbase_types::{Document, DocumentId, Timestamp, UserId};
use serde::{Deserialize, Serialize};

use crate::error::{ApiError, Result};
use crate::validation::{non_blank, validate_file_size, validate_required};

/// Client request for a signed upload URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadRequest {
    #[serde(default)]
    pub filename: String,
    #[serde(default)]
    pub mime_type: String,
    #[serde(default)]
    pub file_size: Option<u64>,
}

/// Everything needed to sign a PUT for one upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadPlan {
    pub bucket: String,
    pub key: String,
    pub content_type: String,
    pub expires_in: Duration,
}

/// Replaces every character outside `[A-Za-z0-9.-]` with `_`.
pub fn sanitize_filename(filename: &str) -> String {
    filename
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '.' || c == '-' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

/// Object key for an upload: `uploads/{owner}/{timestamp_ms}-{sanitized name}`.
pub fn storage_key(owner: &UserId, uploaded_at: Timestamp, filename: &str) -> String {
    format!(
        "uploads/{owner}/{}-{}",
        uploaded_at.timestamp_millis(),
        sanitize_filename(filename)
    )
}

/// Checks an upload request and derives its storage key.
///
/// **Checks, in order:**
/// 1. Filename and MIME type are present
/// 2. Declared size (when non-zero) is within the limit
/// 3. MIME type is on the allow-list
/// 4. A bucket is configured
pub fn plan_upload(
    request: &UploadRequest,
    owner: &UserId,
    uploads: &UploadsConfig,
    storage: &StorageConfig,
    now: Timestamp,
) -> Result<UploadPlan> {
    if request.filename.trim().is_empty() || request.mime_type.trim().is_empty() {
        return Err(ApiError::validation("Filename and mimeType are required"));
    }

    if let Some(size) = request.file_size.filter(|s| *s > 0) {
        if !validate_file_size(size, uploads.max_file_size_bytes) {
            return Err(ApiError::invalid_field(
                "fileSize",
                format!(
                    "File size exceeds maximum of {}MB",
                    uploads.max_file_size_bytes / 1024 / 1024
                ),
            ));
        }
    }

    if !uploads.allows_mime_type(&request.mime_type) {
        return Err(ApiError::invalid_field("mimeType", "File type not allowed"));
    }

    let bucket = storage
        .bucket
        .clone()
        .ok_or_else(|| ApiError::Configuration("S3 bucket not configured".to_string()))?;

    Ok(UploadPlan {
        bucket,
        key: storage_key(owner, now, &request.filename),
        content_type: request.mime_type.clone(),
        expires_in: Duration::from_secs(storage.upload_url_ttl_secs),
    })
}

/// Metadata saved after the content reached the object store.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewDocument {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default, rename = "s3Key")]
    pub storage_key: String,
    #[serde(default)]
    pub content_text: Option<String>,
    /// `None` means public.
    #[serde(default)]
    pub is_public: Option<bool>,
}

impl NewDocument {
    pub fn validate(&self) -> Result<()> {
        validate_required(&[
            ("title", Some(self.title.as_str())),
            ("s3Key", Some(self.storage_key.as_str())),
        ])
    }

    /// Builds the stored row. Visibility is written in canonical form.
    pub fn into_document(
        self,
        id: impl Into<DocumentId>,
        created_by: UserId,
        created_at: Timestamp,
    ) -> Document {
        let visibility = Visibility::for_new_document(self.is_public);
        Document {
            id: id.into(),
            title: self.title,
            description: non_blank(self.description.as_deref()),
            storage_key: self.storage_key,
            content_text: non_blank(self.content_text.as_deref()),
            created_by,
            created_at,
            is_public: visibility.stored_value(),
        }
    }
}

/// Title and description change on an existing document.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DocumentEdit {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
}

impl DocumentEdit {
    pub fn validate(&self) -> Result<()> {
        if self.title.trim().is_empty() {
            return Err(ApiError::invalid_field("title", "Title is required"));
        }
        Ok(())
    }

    pub fn apply(self, document: &mut Document) {
        document.title = self.title;
        document.description = non_blank(self.description.as_deref());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use proptest::prelude::*;
    use serde_json::json;

    fn now() -> Timestamp {
        chrono::Utc.timestamp_millis_opt(1_700_000_000_123).unwrap()
    }

    fn storage() -> StorageConfig {
        StorageConfig {
            bucket: Some("documents".to_string()),
            ..Default::default()
        }
    }

    fn request(filename: &str, mime_type: &str, file_size: Option<u64>) -> UploadRequest {
        UploadRequest {
            filename: filename.to_string(),
            mime_type: mime_type.to_string(),
            file_size,
        }
    }

    #[test]
    fn test_storage_key_layout() {
        let key = storage_key(&UserId::new("u1"), now(), "Q3 report (final).pdf");
        assert_eq!(key, "uploads/u1/1700000000123-Q3_report__final_.pdf");
    }

    #[test]
    fn test_plan_upload() {
        let plan = plan_upload(
            &request("handbook.pdf", "application/pdf", Some(1024)),
            &UserId::new("u1"),
            &UploadsConfig::default(),
            &storage(),
            now(),
        )
        .unwrap();

        assert_eq!(plan.bucket, "documents");
        assert_eq!(plan.key, "uploads/u1/1700000000123-handbook.pdf");
        assert_eq!(plan.content_type, "application/pdf");
        assert_eq!(plan.expires_in, Duration::from_secs(300));
    }

    #[test]
    fn test_plan_upload_requires_fields() {
        let err = plan_upload(
            &request("", "application/pdf", None),
            &UserId::new("u1"),
            &UploadsConfig::default(),
            &storage(),
            now(),
        )
        .unwrap_err();
        assert_eq!(err.status_code(), 400);
    }

    #[test]
    fn test_plan_upload_rejects_oversized() {
        let err = plan_upload(
            &request("big.zip", "application/zip", Some(50 * 1024 * 1024 + 1)),
            &UserId::new("u1"),
            &UploadsConfig::default(),
            &storage(),
            now(),
        )
        .unwrap_err();
        assert_eq!(err.to_string(), "File size exceeds maximum of 50MB");
    }

    #[test]
    fn test_plan_upload_zero_size_is_not_checked() {
        let uploads = UploadsConfig {
            max_file_size_bytes: 1,
            ..Default::default()
        };
        assert!(
            plan_upload(
                &request("a.txt", "text/plain", Some(0)),
                &UserId::new("u1"),
                &uploads,
                &storage(),
                now(),
            )
            .is_ok()
        );
    }

    #[test]
    fn test_plan_upload_rejects_mime_type() {
        let err = plan_upload(
            &request("setup.exe", "application/x-msdownload", None),
            &UserId::new("u1"),
            &UploadsConfig::default(),
            &storage(),
            now(),
        )
        .unwrap_err();
        assert_eq!(err.to_string(), "File type not allowed");
    }

    #[test]
    fn test_plan_upload_requires_bucket() {
        let err = plan_upload(
            &request("a.pdf", "application/pdf", None),
            &UserId::new("u1"),
            &UploadsConfig::default(),
            &StorageConfig::default(),
            now(),
        )
        .unwrap_err();
        assert_eq!(err.status_code(), 500);
    }

    #[test]
    fn test_new_document_defaults_public() {
        let new = NewDocument {
            title: "Handbook".to_string(),
            description: Some(String::new()),
            storage_key: "uploads/u1/1-handbook.pdf".to_string(),
            ..Default::default()
        };
        assert!(new.validate().is_ok());

        let doc = new.into_document("d1", UserId::new("u1"), now());
        assert_eq!(doc.is_public, Some(json!(true)));
        assert_eq!(doc.description, None);
    }

    #[test]
    fn test_new_document_private() {
        let new = NewDocument {
            title: "Salaries".to_string(),
            storage_key: "k".to_string(),
            is_public: Some(false),
            ..Default::default()
        };
        let doc = new.into_document("d2", UserId::new("u1"), now());
        assert_eq!(doc.is_public, Some(json!(false)));
    }

    #[test]
    fn test_new_document_requires_title_and_key() {
        let err = NewDocument::default().validate().unwrap_err();
        assert_eq!(err.to_string(), "Missing required fields: title, s3Key");
    }

    #[test]
    fn test_new_document_wire_names() {
        let new: NewDocument = serde_json::from_value(json!({
            "title": "Handbook",
            "s3Key": "uploads/u1/1-a.pdf",
            "contentText": "hello",
            "isPublic": false,
        }))
        .unwrap();
        assert_eq!(new.storage_key, "uploads/u1/1-a.pdf");
        assert_eq!(new.content_text.as_deref(), Some("hello"));
        assert_eq!(new.is_public, Some(false));
    }

    #[test]
    fn test_document_edit() {
        let mut doc = NewDocument {
            title: "Old".to_string(),
            storage_key: "k".to_string(),
            ..Default::default()
        }
        .into_document("d1", UserId::new("u1"), now());

        let edit = DocumentEdit {
            title: "New".to_string(),
            description: Some("Updated".to_string()),
        };
        assert!(edit.validate().is_ok());
        edit.apply(&mut doc);
        assert_eq!(doc.title, "New");
        assert_eq!(doc.description.as_deref(), Some("Updated"));

        assert!(DocumentEdit::default().validate().is_err());
    }

    proptest! {
        #[test]
        fn sanitized_filenames_use_safe_alphabet(name in ".{0,64}") {
            let sanitized = sanitize_filename(&name);
            prop_assert_eq!(sanitized.chars().count(), name.chars().count());
            prop_assert!(sanitized
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '.' || c == '-' || c == '_'));
        }
    }
}
