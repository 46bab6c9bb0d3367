//! Document version history.

use std::cmp::Reverse;

use kbase_types::{DocumentVersion, Timestamp, UserId};
use serde::{Deserialize, Serialize};

/// Version columns of the live document row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrentVersion {
    pub id: String,
    /// Rows that predate versioning have no number.
    #[serde(default)]
    pub version_number: Option<u32>,
    #[serde(default)]
    pub filename: Option<String>,
    #[serde(default)]
    pub mime_type: Option<String>,
    #[serde(default)]
    pub file_size: Option<u64>,
    #[serde(rename = "s3_key")]
    pub storage_key: String,
    #[serde(rename = "s3_bucket", default)]
    pub bucket: Option<String>,
    #[serde(default)]
    pub uploaded_by: Option<UserId>,
    pub created_at: Timestamp,
    #[serde(default)]
    pub updated_at: Option<Timestamp>,
}

impl CurrentVersion {
    fn into_entry(self) -> VersionEntry {
        VersionEntry {
            version: DocumentVersion {
                id: self.id,
                version_number: self.version_number.unwrap_or(1),
                filename: self.filename,
                mime_type: self.mime_type,
                file_size: self.file_size,
                storage_key: self.storage_key,
                bucket: self.bucket,
                uploaded_by: self.uploaded_by,
                created_at: self.updated_at.unwrap_or(self.created_at),
            },
            is_current: true,
        }
    }
}

/// One row of the history view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionEntry {
    #[serde(flatten)]
    pub version: DocumentVersion,
    pub is_current: bool,
}

/// Lists the live version alongside archived ones, highest number first.
pub fn version_history(
    current: CurrentVersion,
    archived: Vec<DocumentVersion>,
) -> Vec<VersionEntry> {
    let mut entries = Vec::with_capacity(archived.len() + 1);
    entries.push(current.into_entry());
    entries.extend(archived.into_iter().map(|version| VersionEntry {
        version,
        is_current: false,
    }));
    entries.sort_by_key(|e| Reverse(e.version.version_number));
    entries
}
