//! # kbase-library: Request-layer operations
//!
//! The pieces between the HTTP handlers and the access-control core:
//! - [`KnowledgeBase`]: one method per handler, checks in handler order
//! - [`ApiError`]: status codes and response bodies
//! - Upload and download planning for signed object-store URLs
//! - Substring search fallback with relevance merging
//! - Version history, shared tools, email templates, personal notes
//! - Password reset and change checks, dashboard totals
//!
//! Nothing here talks to the database, the identity provider, or the
//! object store. Handlers fetch rows, pass them in, and persist or sign
//! what comes back.
//!
//! ## Examples
//!
//! ```
//! use kbase_config::KbaseConfig;
//! use kbase_library::{KnowledgeBase, UploadRequest};
//! use kbase_rbac::Viewer;
//!
//! let kb = KnowledgeBase::new(KbaseConfig::development());
//! let now = "2025-01-01T00:00:00Z".parse().unwrap();
//! let request = UploadRequest {
//!     filename: "handbook.pdf".to_string(),
//!     mime_type: "application/pdf".to_string(),
//!     file_size: Some(2048),
//! };
//!
//! let plan = kb.plan_upload(&Viewer::editor("u1"), &request, now).unwrap();
//! assert_eq!(plan.key, "uploads/u1/1735689600000-handbook.pdf");
//!
//! let denied = kb.plan_upload(&Viewer::viewer("u2"), &request, now).unwrap_err();
//! assert_eq!(denied.status_code(), 403);
//! ```

pub mod accounts;
pub mod download;
pub mod error;
pub mod knowledge_base;
pub mod resources;
pub mod search;
pub mod upload;
pub mod validation;
pub mod versions;

pub use accounts::{Analytics, MIN_PASSWORD_LENGTH, PasswordChange, PasswordReset};
pub use download::DownloadPlan;
pub use error::{ApiError, Result};
pub use knowledge_base::KnowledgeBase;
pub use resources::{NoteInput, TemplateInput, ToolInput};
pub use search::{MatchField, SearchHit};
pub use upload::{DocumentEdit, NewDocument, UploadPlan, UploadRequest};
pub use versions::{CurrentVersion, VersionEntry};
