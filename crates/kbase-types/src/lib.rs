//! # kbase-types: Core types for `kbase`
//!
//! This crate contains the records shared across the `kbase` system:
//! - Entity IDs ([`UserId`], [`DocumentId`], [`ToolId`], [`TemplateId`], [`NoteId`])
//! - Temporal types ([`Timestamp`])
//! - User profiles ([`Profile`])
//! - Stored content ([`Document`], [`DocumentVersion`], [`Tool`], [`EmailTemplate`], [`Note`])
//!
//! Records mirror the rows returned by the relational query layer. Fields are
//! kept as stored; in particular [`Document::is_public`] is the raw,
//! loosely-typed visibility value and is only interpreted by `kbase-rbac`.

use std::fmt::{Debug, Display};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Wall-clock instant as stored by the relational layer.
pub type Timestamp = DateTime<Utc>;

// ============================================================================
// Entity IDs - opaque strings issued by external collaborators
// ============================================================================

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_string())
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self(value)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

string_id!(
    /// Identifier of an authenticated user, issued by the identity provider.
    UserId
);
string_id!(
    /// Identifier of a document row.
    DocumentId
);
string_id!(
    /// Identifier of an entry in the shared tools directory.
    ToolId
);
string_id!(
    /// Identifier of a shared email template.
    TemplateId
);
string_id!(
    /// Identifier of a personal note.
    NoteId
);

// ============================================================================
// Profiles
// ============================================================================

/// User profile as returned by the identity provider and `profiles` table.
///
/// `role` is the raw stored label. It may be missing (profile row absent or
/// column empty) or hold a value outside the known role set; interpretation
/// belongs to the access-control layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    pub id: UserId,
    #[serde(default)]
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
}

impl Profile {
    pub fn new(id: impl Into<UserId>, email: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            email: email.into(),
            full_name: None,
            role: None,
        }
    }

    pub fn with_full_name(mut self, name: impl Into<String>) -> Self {
        self.full_name = Some(name.into());
        self
    }

    pub fn with_role(mut self, role: impl Into<String>) -> Self {
        self.role = Some(role.into());
        self
    }

    /// Name shown in listings: the full name when set, otherwise the email.
    pub fn display_name(&self) -> &str {
        match self.full_name.as_deref() {
            Some(name) if !name.trim().is_empty() => name,
            _ => &self.email,
        }
    }
}

// ============================================================================
// Documents
// ============================================================================

/// A document row.
///
/// **Visibility encoding**: `is_public` is stored loosely. Rows created before
/// visibility existed have no value at all, and some writers stored strings
/// instead of booleans. The raw value is preserved here untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub id: DocumentId,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Object-store key of the content.
    #[serde(rename = "s3_key")]
    pub storage_key: String,
    /// Text extracted from the content, used by search.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_text: Option<String>,
    pub created_by: UserId,
    pub created_at: Timestamp,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_public: Option<serde_json::Value>,
}

impl Document {
    pub fn new(
        id: impl Into<DocumentId>,
        title: impl Into<String>,
        storage_key: impl Into<String>,
        created_by: impl Into<UserId>,
        created_at: Timestamp,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            description: None,
            storage_key: storage_key.into(),
            content_text: None,
            created_by: created_by.into(),
            created_at,
            is_public: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_content_text(mut self, text: impl Into<String>) -> Self {
        self.content_text = Some(text.into());
        self
    }

    /// Sets the raw stored visibility value.
    pub fn with_raw_visibility(mut self, raw: serde_json::Value) -> Self {
        self.is_public = Some(raw);
        self
    }
}

/// One entry of a document's version history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentVersion {
    pub id: String,
    pub version_number: u32,
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
}

// ============================================================================
// Shared resources and notes
// ============================================================================

/// Entry in the shared tools directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tool {
    pub id: ToolId,
    pub name: String,
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub created_by: UserId,
    pub created_at: Timestamp,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<Timestamp>,
}

/// Shared email template.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmailTemplate {
    pub id: TemplateId,
    pub name: String,
    pub subject: String,
    pub body: String,
    pub created_by: UserId,
    pub created_at: Timestamp,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<Timestamp>,
}

/// Personal note. Only ever visible to its owner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    pub id: NoteId,
    pub title: String,
    pub content: String,
    pub user_id: UserId,
    pub created_at: Timestamp,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<Timestamp>,
}
