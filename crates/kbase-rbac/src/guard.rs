//! Permission guard.
//!
//! Checks that run synchronously before any mutating action. A denial is
//! returned as an [`AccessError`]; translating it into a rejection response
//! is left to the caller.

use thiserror::Error;

use crate::capabilities::{Capability, resolve_capabilities};
use crate::principal::Viewer;
use crate::roles::Role;

/// Kind of resource an ownership check was made against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    Document,
    Tool,
    EmailTemplate,
    Note,
}

impl std::fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            ResourceKind::Document => "document",
            ResourceKind::Tool => "tool",
            ResourceKind::EmailTemplate => "email template",
            ResourceKind::Note => "note",
        })
    }
}

/// Error type for access checks.
///
/// Every variant is caller-recoverable and final: none of them become
/// retryable by waiting.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AccessError {
    /// The caller's role does not grant the capability.
    #[error("Permission denied: {capability} required")]
    AuthorizationDenied { capability: Capability },

    /// The caller holds the capability but neither owns the resource nor is
    /// an admin.
    #[error("Permission denied: {capability} on this {resource} requires ownership")]
    NotOwner {
        capability: Capability,
        resource: ResourceKind,
    },

    /// The resource is not visible to the caller.
    #[error("Permission denied: {resource} is not visible")]
    NotVisible {
        capability: Capability,
        resource: ResourceKind,
    },

    /// The caller's role is not one of the accepted roles.
    #[error("Role required: {}", join_roles(.roles))]
    RoleRequired { roles: Vec<Role> },

    /// An admin tried to give themselves a non-admin role.
    #[error("Cannot change your own role from admin")]
    SelfDemotion,
}

impl AccessError {
    /// Returns the capability the failed check required, if any.
    pub fn capability(&self) -> Option<Capability> {
        match self {
            AccessError::AuthorizationDenied { capability }
            | AccessError::NotOwner { capability, .. }
            | AccessError::NotVisible { capability, .. } => Some(*capability),
            AccessError::RoleRequired { .. } => None,
            AccessError::SelfDemotion => Some(Capability::ManageUsers),
        }
    }
}

fn join_roles(roles: &[Role]) -> String {
    roles
        .iter()
        .map(Role::as_str)
        .collect::<Vec<_>>()
        .join(" or ")
}

/// Result type for access checks.
pub type Result<T> = std::result::Result<T, AccessError>;

/// Returns whether `user` holds `capability`. An absent user holds nothing.
pub fn has_capability(user: Option<&Viewer>, capability: Capability) -> bool {
    resolve_capabilities(user.and_then(|u| u.role)).allows(capability)
}

/// Requires `user` to hold `capability`.
///
/// # Examples
///
/// ```
/// use kbase_rbac::{AccessError, Capability, Viewer, guard::require_capability};
///
/// let editor = Viewer::editor("u1");
/// assert_eq!(
///     require_capability(Some(&editor), Capability::Delete),
///     Err(AccessError::AuthorizationDenied { capability: Capability::Delete }),
/// );
/// assert!(require_capability(Some(&Viewer::admin("u2")), Capability::Delete).is_ok());
/// ```
pub fn require_capability(user: Option<&Viewer>, capability: Capability) -> Result<()> {
    if has_capability(user, capability) {
        Ok(())
    } else {
        Err(AccessError::AuthorizationDenied { capability })
    }
}

/// Returns whether `user` has one of `roles`.
pub fn has_role(user: Option<&Viewer>, roles: &[Role]) -> bool {
    user.and_then(|u| u.role).is_some_and(|r| roles.contains(&r))
}

/// Requires `user` to have one of `roles`.
pub fn require_role(user: Option<&Viewer>, roles: &[Role]) -> Result<()> {
    if has_role(user, roles) {
        Ok(())
    } else {
        Err(AccessError::RoleRequired {
            roles: roles.to_vec(),
        })
    }
}
