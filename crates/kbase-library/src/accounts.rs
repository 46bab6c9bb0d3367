//! Account maintenance input and dashboard counts.
//!
//! Password storage and verification belong to the identity provider;
//! these checks run before a request is forwarded to it.

use serde::{Deserialize, Serialize};

use crate::error::{ApiError, Result};

/// Shortest password the identity provider accepts.
pub const MIN_PASSWORD_LENGTH: usize = 6;

fn present(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}

fn long_enough(password: &str) -> bool {
    password.chars().count() >= MIN_PASSWORD_LENGTH
}

/// An administrator setting another user's password.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PasswordReset {
    #[serde(default)]
    pub new_password: Option<String>,
}

impl PasswordReset {
    pub fn validate(&self) -> Result<()> {
        let Some(password) = present(self.new_password.as_deref()) else {
            return Err(ApiError::invalid_field("newPassword", "New password is required"));
        };
        if !long_enough(password) {
            return Err(ApiError::invalid_field(
                "newPassword",
                format!("Password must be at least {MIN_PASSWORD_LENGTH} characters"),
            ));
        }
        Ok(())
    }
}

/// A user changing their own password.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PasswordChange {
    #[serde(default)]
    pub current_password: Option<String>,
    #[serde(default)]
    pub new_password: Option<String>,
}

impl PasswordChange {
    /// Checks shape only. Whether `current_password` is correct is for the
    /// identity provider to say.
    pub fn validate(&self) -> Result<()> {
        let current = present(self.current_password.as_deref());
        let new = present(self.new_password.as_deref());
        let (Some(_), Some(new)) = (current, new) else {
            return Err(ApiError::validation("Current password and new password are required"));
        };
        if !long_enough(new) {
            return Err(ApiError::invalid_field(
                "newPassword",
                format!("New password must be at least {MIN_PASSWORD_LENGTH} characters"),
            ));
        }
        Ok(())
    }
}

/// Dashboard totals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Analytics {
    pub users: u64,
    pub documents: u64,
    pub email_templates: u64,
}

impl Analytics {
    /// Builds the totals from count queries; a failed count reads as zero.
    pub fn from_counts(
        users: Option<u64>,
        documents: Option<u64>,
        email_templates: Option<u64>,
    ) -> Self {
        Self {
            users: users.unwrap_or(0),
            documents: documents.unwrap_or(0),
            email_templates: email_templates.unwrap_or(0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use test_case::test_case;

    #[test_case(None, Some("New password is required"); "missing")]
    #[test_case(Some(""), Some("New password is required"); "empty")]
    #[test_case(Some("12345"), Some("Password must be at least 6 characters"); "too short")]
    #[test_case(Some("123456"), None; "minimum length")]
    #[test_case(Some("pässwö"), None; "counts characters not bytes")]
    fn test_password_reset(password: Option<&str>, error: Option<&str>) {
        let reset = PasswordReset {
            new_password: password.map(str::to_string),
        };
        assert_eq!(
            reset.validate().err().map(|e| e.to_string()),
            error.map(str::to_string)
        );
    }

    const BOTH_REQUIRED: &str = "Current password and new password are required";
    const TOO_SHORT: &str = "New password must be at least 6 characters";

    #[test_case(None, Some("hunter22"), Some(BOTH_REQUIRED); "missing current")]
    #[test_case(Some("old"), None, Some(BOTH_REQUIRED); "missing new")]
    #[test_case(Some("old"), Some(""), Some(BOTH_REQUIRED); "empty new")]
    #[test_case(Some("old"), Some("abc"), Some(TOO_SHORT); "short new")]
    #[test_case(Some("old"), Some("hunter22"), None; "valid")]
    fn test_password_change(current: Option<&str>, new: Option<&str>, error: Option<&str>) {
        let change = PasswordChange {
            current_password: current.map(str::to_string),
            new_password: new.map(str::to_string),
        };
        assert_eq!(
            change.validate().err().map(|e| e.to_string()),
            error.map(str::to_string)
        );
    }

    #[test]
    fn test_password_change_wire_names() {
        let change: PasswordChange = serde_json::from_value(json!({
            "currentPassword": "old-secret",
            "newPassword": "hunter22",
        }))
        .unwrap();
        assert!(change.validate().is_ok());
    }

    #[test]
    fn test_analytics_serializes_camel_case() {
        let analytics = Analytics::from_counts(Some(4), None, Some(2));
        assert_eq!(
            serde_json::to_value(analytics).unwrap(),
            json!({ "users": 4, "documents": 0, "emailTemplates": 2 })
        );
    }
}
