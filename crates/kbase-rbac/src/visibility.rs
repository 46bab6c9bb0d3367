//! Document visibility resolution.
//!
//! The stored `is_public` column is loosely typed: older rows have no value,
//! and some writers stored strings. The raw value is normalized exactly once
//! into [`Visibility`]; everything downstream works on the enum.
//!
//! | stored value                          | visibility |
//! |---------------------------------------|------------|
//! | `true`, `"true"`, `null`, absent      | Public     |
//! | `false`, `"false"`                    | Private    |
//! | anything else                         | Unknown    |
//!
//! Unknown is fail-closed: nobody sees it, admins included.

use kbase_types::UserId;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::principal::Viewer;

/// Normalized document visibility.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    /// Visible to every authenticated caller.
    Public,
    /// Visible to the owner and to admins.
    Private,
    /// Unrecognized stored value. Visible to nobody.
    Unknown,
}

impl Visibility {
    /// Normalizes a raw stored visibility value.
    ///
    /// # Examples
    ///
    /// ```
    /// use kbase_rbac::visibility::Visibility;
    /// use serde_json::json;
    ///
    /// assert_eq!(Visibility::normalize(None), Visibility::Public);
    /// assert_eq!(Visibility::normalize(Some(&json!("false"))), Visibility::Private);
    /// assert_eq!(Visibility::normalize(Some(&json!("archived"))), Visibility::Unknown);
    /// ```
    pub fn normalize(raw: Option<&Value>) -> Visibility {
        match raw {
            None | Some(Value::Null) | Some(Value::Bool(true)) => Visibility::Public,
            Some(Value::Bool(false)) => Visibility::Private,
            Some(Value::String(s)) if s == "true" => Visibility::Public,
            Some(Value::String(s)) if s == "false" => Visibility::Private,
            Some(_) => Visibility::Unknown,
        }
    }

    /// Visibility recorded for a new document: public unless the uploader
    /// explicitly asked for private.
    pub fn for_new_document(is_public: Option<bool>) -> Visibility {
        match is_public {
            Some(false) => Visibility::Private,
            _ => Visibility::Public,
        }
    }

    /// Returns whether a document with this visibility, created by `owner`,
    /// is visible to `viewer`.
    pub fn permits(self, owner: &UserId, viewer: &Viewer) -> bool {
        match self {
            Visibility::Public => true,
            Visibility::Private => viewer.owns_or_admin(owner),
            Visibility::Unknown => false,
        }
    }

    /// Canonical stored value. `None` for [`Visibility::Unknown`], which is
    /// never written.
    pub fn stored_value(self) -> Option<Value> {
        match self {
            Visibility::Public => Some(Value::Bool(true)),
            Visibility::Private => Some(Value::Bool(false)),
            Visibility::Unknown => None,
        }
    }
}

/// Decides whether a document is visible to `viewer`, starting from the raw
/// stored visibility value.
pub fn is_visible(raw: Option<&Value>, owner: &UserId, viewer: &Viewer) -> bool {
    Visibility::normalize(raw).permits(owner, viewer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use test_case::test_case;

    #[test_case(None; "absent")]
    #[test_case(Some(json!(null)); "null")]
    #[test_case(Some(json!(true)); "boolean true")]
    #[test_case(Some(json!("true")); "string true")]
    fn test_public_encodings(raw: Option<Value>) {
        assert_eq!(Visibility::normalize(raw.as_ref()), Visibility::Public);
    }

    #[test_case(json!(false); "boolean false")]
    #[test_case(json!("false"); "string false")]
    fn test_private_encodings(raw: Value) {
        assert_eq!(Visibility::normalize(Some(&raw)), Visibility::Private);
    }

    #[test_case(json!("archived"); "unknown string")]
    #[test_case(json!("TRUE"); "uppercase string")]
    #[test_case(json!(""); "empty string")]
    #[test_case(json!(0); "zero")]
    #[test_case(json!(1); "one")]
    #[test_case(json!([]); "empty array")]
    #[test_case(json!({}); "empty object")]
    fn test_unknown_encodings(raw: Value) {
        assert_eq!(Visibility::normalize(Some(&raw)), Visibility::Unknown);
    }

    #[test]
    fn test_unknown_is_visible_to_nobody() {
        let owner = UserId::new("u1");
        let viewers = [
            Viewer::admin("u1"),
            Viewer::admin("u9"),
            Viewer::editor("u1"),
            Viewer::viewer("u1"),
            Viewer::new("u1", None),
        ];
        for viewer in &viewers {
            assert!(!Visibility::Unknown.permits(&owner, viewer));
            assert!(!is_visible(Some(&json!("maybe")), &owner, viewer));
        }
    }

    #[test]
    fn test_private_visible_to_admin_regardless_of_owner() {
        let owner = UserId::new("u1");
        assert!(Visibility::Private.permits(&owner, &Viewer::admin("u9")));
    }

    #[test]
    fn test_private_visible_to_owner_only() {
        let owner = UserId::new("u1");
        assert!(Visibility::Private.permits(&owner, &Viewer::viewer("u1")));
        assert!(!Visibility::Private.permits(&owner, &Viewer::viewer("u2")));
        assert!(!Visibility::Private.permits(&owner, &Viewer::editor("u2")));
    }

    #[test]
    fn test_public_visible_to_every_authenticated_caller() {
        let owner = UserId::new("u1");
        assert!(Visibility::Public.permits(&owner, &Viewer::viewer("u2")));
        assert!(Visibility::Public.permits(&owner, &Viewer::new("u3", None)));
    }

    #[test]
    fn test_new_documents_default_to_public() {
        assert_eq!(Visibility::for_new_document(None), Visibility::Public);
        assert_eq!(Visibility::for_new_document(Some(true)), Visibility::Public);
        assert_eq!(Visibility::for_new_document(Some(false)), Visibility::Private);
    }

    #[test]
    fn test_stored_value_normalizes_back() {
        for visibility in [Visibility::Public, Visibility::Private] {
            let stored = visibility.stored_value();
            assert_eq!(Visibility::normalize(stored.as_ref()), visibility);
        }
        assert_eq!(Visibility::Unknown.stored_value(), None);
    }
}
