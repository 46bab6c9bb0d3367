//! # kbase-rbac: Role and Visibility Based Access Control
//!
//! Decides who may see and change what in the knowledge repository:
//! - **Role policy** (3 roles: Admin, Editor, Viewer) mapped to a capability set
//! - **Visibility resolution** of the loosely-stored per-document flag
//! - **Permission guard** run before every mutation
//! - **Document access service** filtering result sets and authorizing edits
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │  Request handler                             │
//! │  (Viewer + candidate rows from the database) │
//! └─────────────────┬───────────────────────────┘
//!                   │
//!                   ▼
//! ┌─────────────────────────────────────────────┐
//! │  DocumentAccessService                       │
//! │  ├─ Visibility post-filter (list_visible)    │
//! │  ├─ Capability checks (require_capability)   │
//! │  └─ Ownership-or-admin checks                │
//! └─────────────────┬───────────────────────────┘
//!                   │
//!                   ▼
//! ┌─────────────────────────────────────────────┐
//! │  Decision                                    │
//! │  - Visible rows, original order              │
//! │  - Ok(()) or AccessError                     │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! ## Roles
//!
//! | Role   | Read | Upload | Edit | Delete | Manage users |
//! |--------|------|--------|------|--------|--------------|
//! | Viewer | ✓    | ✗      | ✗    | ✗      | ✗            |
//! | Editor | ✓    | ✓      | ✓    | ✗      | ✗            |
//! | Admin  | ✓    | ✓      | ✓    | ✓      | ✓            |
//!
//! A user whose stored role is not recognized holds no capabilities.
//!
//! ## Visibility
//!
//! Stored `true`, `"true"`, `null`, or no value at all mean public; `false`
//! or `"false"` mean private; anything else is unknown and hidden from
//! everyone, admins included. The database's row policy admits every row, so
//! the post-filter is the enforcement point.
//!
//! ## Examples
//!
//! ```
//! use kbase_rbac::{DocumentAccessService, Viewer};
//! use kbase_types::Document;
//! use serde_json::json;
//!
//! let created = "2025-01-01T00:00:00Z".parse().unwrap();
//! let public = Document::new("d1", "Handbook", "uploads/u2/1-a.pdf", "u2", created);
//! let private = Document::new("d3", "Salaries", "uploads/u2/2-b.pdf", "u2", created)
//!     .with_raw_visibility(json!(false));
//!
//! let service = DocumentAccessService::new();
//! let visible = service.list_visible([&public, &private], &Viewer::viewer("u1"));
//! assert_eq!(visible.len(), 1);
//!
//! assert!(service.authorize_delete(&public, &Viewer::editor("u2")).is_err());
//! ```

pub mod access;
pub mod capabilities;
pub mod guard;
pub mod principal;
pub mod roles;
pub mod visibility;

// Re-export commonly used types
pub use access::{DocumentAccessService, Guarded, Owned, SHARED_RESOURCE_CAPABILITY};
pub use capabilities::{Capability, CapabilitySet, resolve_capabilities};
pub use guard::{
    AccessError, ResourceKind, has_capability, has_role, require_capability, require_role,
};
pub use principal::Viewer;
pub use roles::Role;
pub use visibility::{Visibility, is_visible};


// Kani proofs for bounded model checking
#[cfg(kani)]
mod kani_proofs;
