//! The authenticated caller every check is evaluated against.

use kbase_types::{Profile, UserId};
use serde::{Deserialize, Serialize};

use crate::capabilities::{CapabilitySet, resolve_capabilities};
use crate::roles::Role;

/// Authenticated user as seen by the access-control layer.
///
/// Always passed explicitly; nothing in this crate reads a "current user"
/// from ambient request state.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Viewer {
    pub id: UserId,
    /// `None` when the stored role label is not recognized.
    pub role: Option<Role>,
}

impl Viewer {
    pub fn new(id: impl Into<UserId>, role: Option<Role>) -> Self {
        Self {
            id: id.into(),
            role,
        }
    }

    pub fn admin(id: impl Into<UserId>) -> Self {
        Self::new(id, Some(Role::Admin))
    }

    pub fn editor(id: impl Into<UserId>) -> Self {
        Self::new(id, Some(Role::Editor))
    }

    pub fn viewer(id: impl Into<UserId>) -> Self {
        Self::new(id, Some(Role::Viewer))
    }

    /// Builds a viewer from a stored profile, normalizing the role label.
    ///
    /// A missing or blank label falls back to `default_role`; a label that
    /// is present but unrecognized yields no role at all.
    pub fn from_profile(profile: &Profile, default_role: Role) -> Self {
        let role = match profile.role.as_deref() {
            None => Some(default_role),
            Some(label) if label.is_empty() => Some(default_role),
            Some(label) => Role::parse(label),
        };
        Self::new(profile.id.clone(), role)
    }

    pub fn capabilities(&self) -> CapabilitySet {
        resolve_capabilities(self.role)
    }

    pub fn is_admin(&self) -> bool {
        self.role.is_some_and(|r| r.bypasses_ownership())
    }

    /// Returns whether this viewer owns a resource created by `owner`, or is
    /// an admin.
    pub fn owns_or_admin(&self, owner: &UserId) -> bool {
        self.is_admin() || self.id == *owner
    }
}

impl From<&Profile> for Viewer {
    fn from(profile: &Profile) -> Self {
        Self::from_profile(profile, Role::Viewer)
    }
}
