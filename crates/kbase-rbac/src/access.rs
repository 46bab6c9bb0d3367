//! Document access service.
//!
//! Composes the visibility resolver and the permission guard to filter
//! result sets and authorize mutations. Every check is a stateless predicate
//! over the viewer and resource passed in.

use kbase_types::{Document, EmailTemplate, Note, Tool, UserId};
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::capabilities::Capability;
use crate::guard::{AccessError, ResourceKind, Result, require_capability};
use crate::principal::Viewer;
use crate::roles::Role;
use crate::visibility::Visibility;

/// Capability gating mutation of shared tools and email templates.
///
/// Shared resources reuse the upload capability instead of a dedicated one.
pub const SHARED_RESOURCE_CAPABILITY: Capability = Capability::Upload;

/// A resource created by a user.
pub trait Owned {
    fn owner_id(&self) -> &UserId;
}

/// A resource whose visibility is controlled by a stored flag.
pub trait Guarded: Owned {
    /// Raw stored visibility value, `None` when absent.
    fn raw_visibility(&self) -> Option<&Value>;

    fn visibility(&self) -> Visibility {
        Visibility::normalize(self.raw_visibility())
    }
}

impl<T: Owned + ?Sized> Owned for &T {
    fn owner_id(&self) -> &UserId {
        (**self).owner_id()
    }
}

impl<T: Guarded + ?Sized> Guarded for &T {
    fn raw_visibility(&self) -> Option<&Value> {
        (**self).raw_visibility()
    }
}

impl Owned for Document {
    fn owner_id(&self) -> &UserId {
        &self.created_by
    }
}

impl Guarded for Document {
    fn raw_visibility(&self) -> Option<&Value> {
        self.is_public.as_ref()
    }
}

impl Owned for Tool {
    fn owner_id(&self) -> &UserId {
        &self.created_by
    }
}

impl Owned for EmailTemplate {
    fn owner_id(&self) -> &UserId {
        &self.created_by
    }
}

impl Owned for Note {
    fn owner_id(&self) -> &UserId {
        &self.user_id
    }
}

/// Access decisions for documents, shared resources, notes, and users.
///
/// Holds no authorization state. The only setting is whether decisions are
/// logged.
#[derive(Debug, Clone)]
pub struct DocumentAccessService {
    audit_enabled: bool,
}

impl DocumentAccessService {
    /// Creates a new service with audit logging enabled.
    pub fn new() -> Self {
        Self {
            audit_enabled: true,
        }
    }

    /// Disables audit logging (for testing).
    pub fn without_audit(mut self) -> Self {
        self.audit_enabled = false;
        self
    }

    /// Sets whether decisions are logged.
    pub fn with_audit(mut self, enabled: bool) -> Self {
        self.audit_enabled = enabled;
        self
    }

    /// Returns the items visible to `viewer`, in their original order.
    ///
    /// Applied after every listing or search, whatever the query layer
    /// already filtered: the storage policy admits every row.
    pub fn list_visible<I>(&self, items: I, viewer: &Viewer) -> Vec<I::Item>
    where
        I: IntoIterator,
        I::Item: Guarded,
    {
        let mut hidden = 0usize;
        let mut unknown = 0usize;

        let visible: Vec<I::Item> = items
            .into_iter()
            .filter(|item| {
                let visibility = item.visibility();
                let allowed = visibility.permits(item.owner_id(), viewer);
                if !allowed {
                    hidden += 1;
                    if visibility == Visibility::Unknown {
                        unknown += 1;
                    }
                }
                allowed
            })
            .collect();

        if self.audit_enabled && hidden > 0 {
            debug!(
                viewer = %viewer.id,
                role = ?viewer.role,
                hidden,
                unknown,
                returned = visible.len(),
                "Items filtered by visibility"
            );
        }

        visible
    }

    /// Returns whether a single item is visible to `viewer`.
    pub fn can_view<T: Guarded + ?Sized>(&self, item: &T, viewer: &Viewer) -> bool {
        item.visibility().permits(item.owner_id(), viewer)
    }

    /// Requires `viewer` to see `document`, e.g. before issuing a download URL.
    pub fn authorize_view(&self, document: &Document, viewer: &Viewer) -> Result<()> {
        let result = if self.can_view(document, viewer) {
            Ok(())
        } else {
            Err(AccessError::NotVisible {
                capability: Capability::Read,
                resource: ResourceKind::Document,
            })
        };
        self.audit("view", &document.id, viewer, &result);
        result
    }

    /// Requires `viewer` to be able to upload new documents.
    pub fn authorize_upload(&self, viewer: &Viewer) -> Result<()> {
        let result = require_capability(Some(viewer), Capability::Upload);
        self.audit("upload", "new", viewer, &result);
        result
    }

    /// Requires `viewer` to be able to edit `document`.
    ///
    /// **Rules:**
    /// 1. The role must grant [`Capability::Edit`]
    /// 2. Private documents additionally require ownership or the admin role
    /// 3. Documents with unknown visibility are not editable by anyone
    pub fn authorize_edit(&self, document: &Document, viewer: &Viewer) -> Result<()> {
        let result = require_capability(Some(viewer), Capability::Edit).and_then(|()| {
            match document.visibility() {
                Visibility::Public => Ok(()),
                Visibility::Private if viewer.owns_or_admin(&document.created_by) => Ok(()),
                Visibility::Private => Err(AccessError::NotOwner {
                    capability: Capability::Edit,
                    resource: ResourceKind::Document,
                }),
                Visibility::Unknown => Err(AccessError::NotVisible {
                    capability: Capability::Edit,
                    resource: ResourceKind::Document,
                }),
            }
        });
        self.audit("edit", &document.id, viewer, &result);
        result
    }

    /// Requires `viewer` to be able to delete `document`.
    ///
    /// Role-gated only: there is no ownership carve-out.
    pub fn authorize_delete(&self, document: &Document, viewer: &Viewer) -> Result<()> {
        let result = require_capability(Some(viewer), Capability::Delete);
        self.audit("delete", &document.id, viewer, &result);
        result
    }

    /// Requires `viewer` to be able to create a tool or email template.
    pub fn authorize_shared_resource_create(&self, viewer: &Viewer) -> Result<()> {
        let result = require_capability(Some(viewer), SHARED_RESOURCE_CAPABILITY);
        self.audit("create_shared_resource", "new", viewer, &result);
        result
    }

    /// Requires `viewer` to be able to update or delete `tool`.
    pub fn authorize_tool_mutation(&self, tool: &Tool, viewer: &Viewer) -> Result<()> {
        let result = self.require_owner_with(tool, viewer, ResourceKind::Tool);
        self.audit("mutate_tool", &tool.id, viewer, &result);
        result
    }

    /// Requires `viewer` to be able to update or delete `template`.
    pub fn authorize_template_mutation(
        &self,
        template: &EmailTemplate,
        viewer: &Viewer,
    ) -> Result<()> {
        let result = self.require_owner_with(template, viewer, ResourceKind::EmailTemplate);
        self.audit("mutate_template", &template.id, viewer, &result);
        result
    }

    /// Requires `viewer` to own `note`. Personal notes have no admin override.
    pub fn authorize_note_access(&self, note: &Note, viewer: &Viewer) -> Result<()> {
        let result = if note.user_id == viewer.id {
            Ok(())
        } else {
            Err(AccessError::NotOwner {
                capability: Capability::Read,
                resource: ResourceKind::Note,
            })
        };
        self.audit("note", &note.id, viewer, &result);
        result
    }

    /// Requires `viewer` to be able to list users.
    pub fn authorize_user_listing(&self, viewer: &Viewer) -> Result<()> {
        let result = require_capability(Some(viewer), Capability::ManageUsers);
        self.audit("list_users", "users", viewer, &result);
        result
    }

    /// Requires `viewer` to be able to set `target`'s password.
    pub fn authorize_password_reset(&self, viewer: &Viewer, target: &UserId) -> Result<()> {
        let result = require_capability(Some(viewer), Capability::ManageUsers);
        self.audit("reset_password", target, viewer, &result);
        result
    }

    /// Requires `viewer` to be able to give `target` the role `new_role`.
    ///
    /// An admin may not move themselves off the admin role, so the system
    /// cannot lose its last administrator through the UI.
    pub fn authorize_role_change(
        &self,
        viewer: &Viewer,
        target: &UserId,
        new_role: Role,
    ) -> Result<()> {
        let result = require_capability(Some(viewer), Capability::ManageUsers).and_then(|()| {
            if *target == viewer.id && new_role != Role::Admin {
                Err(AccessError::SelfDemotion)
            } else {
                Ok(())
            }
        });
        self.audit("change_role", target, viewer, &result);
        result
    }

    fn require_owner_with<T: Owned>(
        &self,
        resource: &T,
        viewer: &Viewer,
        kind: ResourceKind,
    ) -> Result<()> {
        require_capability(Some(viewer), SHARED_RESOURCE_CAPABILITY)?;
        if viewer.owns_or_admin(resource.owner_id()) {
            Ok(())
        } else {
            Err(AccessError::NotOwner {
                capability: SHARED_RESOURCE_CAPABILITY,
                resource: kind,
            })
        }
    }

    fn audit(
        &self,
        operation: &str,
        target: impl std::fmt::Display,
        viewer: &Viewer,
        result: &Result<()>,
    ) {
        match result {
            Ok(()) if self.audit_enabled => info!(
                operation,
                target = %target,
                viewer = %viewer.id,
                role = ?viewer.role,
                "Access granted"
            ),
            Ok(()) => {}
            Err(err)
                if self.audit_enabled || err.capability().is_some_and(|c| c.is_high_risk()) =>
            {
                warn!(
                    operation,
                    target = %target,
                    viewer = %viewer.id,
                    role = ?viewer.role,
                    capability = ?err.capability(),
                    error = %err,
                    "Access denied"
                );
            }
            Err(_) => {}
        }
    }
}

impl Default for DocumentAccessService {
    fn default() -> Self {
        Self::new()
    }
}
