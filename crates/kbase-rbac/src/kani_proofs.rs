//! Kani bounded model checking proofs for access-control correctness.
//!
//! - Proof #1: Capability table totality - every role input resolves, and no
//!   role is granted a capability it lacks in the table
//! - Proof #2: Unknown visibility is fail-closed for every viewer
//! - Proof #3: Delete is admin-only

use crate::{
    capabilities::{Capability, resolve_capabilities},
    guard::require_capability,
    principal::Viewer,
    roles::Role,
    visibility::Visibility,
};
use kbase_types::UserId;

fn any_role() -> Option<Role> {
    match kani::any::<u8>() % 4 {
        0 => Some(Role::Admin),
        1 => Some(Role::Editor),
        2 => Some(Role::Viewer),
        _ => None,
    }
}

//=============================================================================
// Proof #1: Capability Table Totality
//=============================================================================

/// Verifies that `can_read` holds exactly for recognized roles and that
/// manage-users implies every other capability.
#[cfg(kani)]
#[kani::proof]
fn verify_capability_table() {
    let role = any_role();
    let caps = resolve_capabilities(role);

    assert_eq!(caps.can_read, role.is_some());

    if caps.can_manage_users {
        assert!(caps.can_upload && caps.can_edit && caps.can_delete && caps.can_read);
    }
    if caps.can_delete {
        assert_eq!(role, Some(Role::Admin));
    }
}

//=============================================================================
// Proof #2: Unknown Visibility Is Fail-Closed
//=============================================================================

#[cfg(kani)]
#[kani::proof]
#[kani::unwind(3)]
fn verify_unknown_visibility_fail_closed() {
    let owner = UserId::new("u1");
    let viewer_id = if kani::any() { "u1" } else { "u2" };
    let viewer = Viewer::new(viewer_id, any_role());

    assert!(!Visibility::Unknown.permits(&owner, &viewer));
}

//=============================================================================
// Proof #3: Delete Is Admin-Only
//=============================================================================

#[cfg(kani)]
#[kani::proof]
fn verify_delete_admin_only() {
    let role = any_role();
    let viewer = Viewer::new("u1", role);

    let allowed = require_capability(Some(&viewer), Capability::Delete).is_ok();
    assert_eq!(allowed, role == Some(Role::Admin));
}
