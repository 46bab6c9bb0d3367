#![allow(clippy::match_same_arms)]
//! Role definitions for RBAC.
//!
//! Defines 3 roles with escalating privileges:
//! - Viewer: Read documents, notes, tools, and templates
//! - Editor: Viewer + upload and edit documents, manage own shared resources
//! - Admin: Full access, including deletes and user management

use std::fmt::{self, Display};

use serde::{Deserialize, Serialize};

use crate::capabilities::{CapabilitySet, resolve_capabilities};

/// Role in the access control system.
///
/// Roles are ordered from least to most privileged:
/// Viewer < Editor < Admin
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Read-only member.
    ///
    /// **Permissions:**
    /// - Read public documents and own private documents
    /// - Cannot upload, edit, or delete
    ///
    /// Assigned to every new account and to profiles with no stored role.
    Viewer,

    /// Content contributor.
    ///
    /// **Permissions:**
    /// - Upload and edit documents
    /// - Create tools and email templates, change the ones they created
    /// - Cannot delete documents
    /// - Cannot manage users
    Editor,

    /// Administrator with full access.
    ///
    /// **Permissions:**
    /// - Everything an editor can do
    /// - Delete documents
    /// - See and edit every private document
    /// - Change other users' roles
    Admin,
}

impl Role {
    /// All roles, least privileged first.
    pub const ALL: [Role; 3] = [Role::Viewer, Role::Editor, Role::Admin];

    /// Parses a stored role label.
    ///
    /// Only the exact lowercase labels are recognized. Anything else yields
    /// `None`, which resolves to an empty capability set.
    ///
    /// # Examples
    ///
    /// ```
    /// use kbase_rbac::roles::Role;
    ///
    /// assert_eq!(Role::parse("editor"), Some(Role::Editor));
    /// assert_eq!(Role::parse("Editor"), None);
    /// assert_eq!(Role::parse("superuser"), None);
    /// ```
    pub fn parse(label: &str) -> Option<Role> {
        match label {
            "admin" => Some(Role::Admin),
            "editor" => Some(Role::Editor),
            "viewer" => Some(Role::Viewer),
            _ => None,
        }
    }

    /// Returns the stored label for this role.
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Editor => "editor",
            Role::Viewer => "viewer",
        }
    }

    /// Returns the capabilities granted to this role.
    pub fn capabilities(self) -> CapabilitySet {
        resolve_capabilities(Some(self))
    }

    /// Returns whether this role sees and edits every document regardless
    /// of ownership.
    pub fn bypasses_ownership(&self) -> bool {
        match self {
            Role::Admin => true,
            Role::Editor => false,
            Role::Viewer => false,
        }
    }
}

impl Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
