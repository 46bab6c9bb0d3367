#![allow(clippy::match_same_arms)]
//! Capability types for access control.
//!
//! A capability is a single named permission. The set of capabilities a user
//! holds is derived from their role on every check and never stored.

use std::fmt::{self, Display};

use serde::{Deserialize, Serialize};

use crate::roles::Role;

/// Capability that can be required by an operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Capability {
    /// Upload new documents.
    ///
    /// Also gates mutation of shared tools and email templates, see
    /// [`SHARED_RESOURCE_CAPABILITY`](crate::access::SHARED_RESOURCE_CAPABILITY).
    #[serde(rename = "canUpload")]
    Upload,

    /// Edit document metadata (title, description).
    #[serde(rename = "canEdit")]
    Edit,

    /// Delete documents and their stored content.
    #[serde(rename = "canDelete")]
    Delete,

    /// List users and change their roles.
    ///
    /// **Security Impact:**
    /// - High-risk capability (can escalate privileges)
    /// - Restricted to the Admin role
    #[serde(rename = "canManageUsers")]
    ManageUsers,

    /// Read documents and shared resources.
    #[serde(rename = "canRead")]
    Read,
}

impl Capability {
    /// All capabilities, in table order.
    pub const ALL: [Capability; 5] = [
        Capability::Upload,
        Capability::Edit,
        Capability::Delete,
        Capability::ManageUsers,
        Capability::Read,
    ];

    /// Returns the capability's wire name, as used in error messages and in
    /// the serialized [`CapabilitySet`].
    pub fn name(&self) -> &'static str {
        match self {
            Capability::Upload => "canUpload",
            Capability::Edit => "canEdit",
            Capability::Delete => "canDelete",
            Capability::ManageUsers => "canManageUsers",
            Capability::Read => "canRead",
        }
    }

    /// Returns whether this capability is high-risk.
    ///
    /// High-risk denials are logged at `warn` even when auditing of routine
    /// checks is disabled.
    pub fn is_high_risk(&self) -> bool {
        matches!(self, Capability::Delete | Capability::ManageUsers)
    }
}

impl Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Capabilities held by a user, derived from their role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CapabilitySet {
    pub can_upload: bool,
    pub can_edit: bool,
    pub can_delete: bool,
    pub can_manage_users: bool,
    pub can_read: bool,
}

impl CapabilitySet {
    /// The empty set, granted to users with no recognized role.
    pub const NONE: CapabilitySet = CapabilitySet {
        can_upload: false,
        can_edit: false,
        can_delete: false,
        can_manage_users: false,
        can_read: false,
    };

    /// Returns whether this set grants the given capability.
    pub fn allows(&self, capability: Capability) -> bool {
        match capability {
            Capability::Upload => self.can_upload,
            Capability::Edit => self.can_edit,
            Capability::Delete => self.can_delete,
            Capability::ManageUsers => self.can_manage_users,
            Capability::Read => self.can_read,
        }
    }

    /// Returns the granted capabilities in table order.
    pub fn granted(&self) -> impl Iterator<Item = Capability> + '_ {
        Capability::ALL.into_iter().filter(|c| self.allows(*c))
    }

    /// Returns whether any granted capability is high-risk.
    pub fn has_high_risk_capability(&self) -> bool {
        self.granted().any(|c| c.is_high_risk())
    }
}

/// Resolves the capability set for a role.
///
/// Total over every input: an absent or unrecognized role yields
/// [`CapabilitySet::NONE`].
///
/// | role   | upload | edit | delete | manage users | read |
/// |--------|--------|------|--------|--------------|------|
/// | admin  | ✓      | ✓    | ✓      | ✓            | ✓    |
/// | editor | ✓      | ✓    | ✗      | ✗            | ✓    |
/// | viewer | ✗      | ✗    | ✗      | ✗            | ✓    |
/// | none   | ✗      | ✗    | ✗      | ✗            | ✗    |
pub fn resolve_capabilities(role: Option<Role>) -> CapabilitySet {
    match role {
        Some(Role::Admin) => CapabilitySet {
            can_upload: true,
            can_edit: true,
            can_delete: true,
            can_manage_users: true,
            can_read: true,
        },
        Some(Role::Editor) => CapabilitySet {
            can_upload: true,
            can_edit: true,
            can_delete: false,
            can_manage_users: false,
            can_read: true,
        },
        Some(Role::Viewer) => CapabilitySet {
            can_upload: false,
            can_edit: false,
            can_delete: false,
            can_manage_users: false,
            can_read: true,
        },
        None => CapabilitySet::NONE,
    }
}
