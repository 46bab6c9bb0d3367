//! Input for tools, email templates, and notes.
//!
//! Each input validates itself and either builds a new row or applies to an
//! existing one. Authorization is the caller's job.

use kbase_types::{EmailTemplate, Note, NoteId, TemplateId, Timestamp, Tool, ToolId, UserId};
use serde::{Deserialize, Serialize};

use crate::error::{ApiError, Result};
use crate::validation::{non_blank, validate_url};

fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}

// ============================================================================
// Tools
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ToolInput {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub description: Option<String>,
}

impl ToolInput {
    /// Name and URL are required; the URL must be absolute.
    pub fn validate(&self) -> Result<()> {
        if is_blank(&self.name) || is_blank(&self.url) {
            return Err(ApiError::validation("Name and URL are required"));
        }
        validate_url(&self.url)?;
        Ok(())
    }

    pub fn into_tool(self, id: impl Into<ToolId>, created_by: UserId, now: Timestamp) -> Tool {
        Tool {
            id: id.into(),
            name: self.name,
            url: self.url,
            description: non_blank(self.description.as_deref()),
            created_by,
            created_at: now,
            updated_at: None,
        }
    }

    pub fn apply(self, tool: &mut Tool, now: Timestamp) {
        tool.name = self.name;
        tool.url = self.url;
        tool.description = non_blank(self.description.as_deref());
        tool.updated_at = Some(now);
    }
}

// ============================================================================
// Email templates
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TemplateInput {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub subject: String,
    #[serde(default)]
    pub body: String,
}

impl TemplateInput {
    pub fn validate(&self) -> Result<()> {
        if is_blank(&self.name) || is_blank(&self.subject) || is_blank(&self.body) {
            return Err(ApiError::validation("Name, subject, and body are required"));
        }
        Ok(())
    }

    pub fn into_template(
        self,
        id: impl Into<TemplateId>,
        created_by: UserId,
        now: Timestamp,
    ) -> EmailTemplate {
        EmailTemplate {
            id: id.into(),
            name: self.name,
            subject: self.subject,
            body: self.body,
            created_by,
            created_at: now,
            updated_at: None,
        }
    }

    pub fn apply(self, template: &mut EmailTemplate, now: Timestamp) {
        template.name = self.name;
        template.subject = self.subject;
        template.body = self.body;
        template.updated_at = Some(now);
    }
}

// ============================================================================
// Notes
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct NoteInput {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub content: String,
}

impl NoteInput {
    pub fn validate(&self) -> Result<()> {
        if is_blank(&self.title) || is_blank(&self.content) {
            return Err(ApiError::validation("Title and content are required"));
        }
        Ok(())
    }

    pub fn into_note(self, id: impl Into<NoteId>, owner: UserId, now: Timestamp) -> Note {
        Note {
            id: id.into(),
            title: self.title,
            content: self.content,
            user_id: owner,
            created_at: now,
            updated_at: None,
        }
    }

    pub fn apply(self, note: &mut Note, now: Timestamp) {
        note.title = self.title;
        note.content = self.content;
        note.updated_at = Some(now);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use test_case::test_case;

    fn now() -> Timestamp {
        chrono::Utc.with_ymd_and_hms(2025, 2, 1, 9, 0, 0).unwrap()
    }

    fn tool(name: &str, url: &str) -> ToolInput {
        ToolInput {
            name: name.to_string(),
            url: url.to_string(),
            description: None,
        }
    }

    #[test_case("", "https://a.example", "Name and URL are required"; "missing name")]
    #[test_case("Status", " ", "Name and URL are required"; "blank url")]
    #[test_case("Status", "status page", "Invalid URL format"; "relative url")]
    fn test_tool_input_rejected(name: &str, url: &str, message: &str) {
        let err = tool(name, url).validate().unwrap_err();
        assert_eq!(err.status_code(), 400);
        assert_eq!(err.to_string(), message);
    }

    #[test]
    fn test_tool_create_and_update() {
        let input = ToolInput {
            description: Some(String::new()),
            ..tool("Status", "https://status.example.com")
        };
        assert!(input.validate().is_ok());

        let mut created = input.into_tool("t1", UserId::new("u1"), now());
        assert_eq!(created.description, None);
        assert_eq!(created.updated_at, None);

        let later = now() + chrono::Duration::hours(1);
        tool("Status page", "https://status.example.com/v2").apply(&mut created, later);
        assert_eq!(created.name, "Status page");
        assert_eq!(created.created_at, now());
        assert_eq!(created.updated_at, Some(later));
    }

    #[test]
    fn test_template_input() {
        let missing_body = TemplateInput {
            name: "Welcome".to_string(),
            subject: "Hello".to_string(),
            body: String::new(),
        };
        assert_eq!(
            missing_body.validate().unwrap_err().to_string(),
            "Name, subject, and body are required"
        );

        let input = TemplateInput {
            body: "Hi {{name}}".to_string(),
            ..missing_body
        };
        assert!(input.validate().is_ok());
        let template = input.into_template("e1", UserId::new("u2"), now());
        assert_eq!(template.created_by.as_str(), "u2");
    }

    #[test]
    fn test_note_input() {
        assert!(NoteInput::default().validate().is_err());

        let input = NoteInput {
            title: "Todo".to_string(),
            content: "Renew licence".to_string(),
        };
        assert!(input.validate().is_ok());
        let note = input.into_note("n1", UserId::new("u1"), now());
        assert_eq!(note.user_id.as_str(), "u1");
    }
}
