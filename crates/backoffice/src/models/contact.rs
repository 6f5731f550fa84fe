//! Contact messages sent through the public contact form.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{ListStatus, ParseEnumError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContactStatus {
    New,
    Read,
    InReview,
    Replied,
    Resolved,
    Closed,
    Archived,
}

impl ContactStatus {
    pub const ALL: [ContactStatus; 7] = [
        ContactStatus::New,
        ContactStatus::Read,
        ContactStatus::InReview,
        ContactStatus::Replied,
        ContactStatus::Resolved,
        ContactStatus::Closed,
        ContactStatus::Archived,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ContactStatus::New => "new",
            ContactStatus::Read => "read",
            ContactStatus::InReview => "in_review",
            ContactStatus::Replied => "replied",
            ContactStatus::Resolved => "resolved",
            ContactStatus::Closed => "closed",
            ContactStatus::Archived => "archived",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ContactStatus::New => "New",
            ContactStatus::Read => "Read",
            ContactStatus::InReview => "In Review",
            ContactStatus::Replied => "Replied",
            ContactStatus::Resolved => "Resolved",
            ContactStatus::Closed => "Closed",
            ContactStatus::Archived => "Archived",
        }
    }

    /// Still needs attention.
    pub fn is_open(&self) -> bool {
        !matches!(
            self,
            ContactStatus::Resolved | ContactStatus::Closed | ContactStatus::Archived
        )
    }

    /// Any state may move to any other state.
    pub fn can_transition_to(&self, target: ContactStatus) -> bool {
        *self != target
    }
}

impl FromStr for ContactStatus {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|st| st.as_str() == s)
            .ok_or_else(|| ParseEnumError::new("contact status", s))
    }
}

impl fmt::Display for ContactStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl ListStatus for ContactStatus {
    const KEY: &'static str = "status";

    fn all() -> &'static [Self] {
        &Self::ALL
    }

    fn as_str(&self) -> &'static str {
        ContactStatus::as_str(self)
    }

    fn label(&self) -> &'static str {
        ContactStatus::label(self)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactReply {
    pub id: String,
    pub subject: String,
    pub body: String,
    pub sent_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactMessage {
    pub id: String,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub company: Option<String>,
    pub subject: String,
    pub message: String,
    pub status: ContactStatus,
    /// Oldest first.
    #[serde(default)]
    pub replies: Vec<ContactReply>,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl ContactMessage {
    pub fn last_reply(&self) -> Option<&ContactReply> {
        self.replies.last()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewContactMessage {
    pub name: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,
    pub subject: String,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplyPayload {
    pub subject: String,
    pub body: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_open_states() {
        assert!(ContactStatus::New.is_open());
        assert!(ContactStatus::Replied.is_open());
        assert!(!ContactStatus::Archived.is_open());
        assert!(!ContactStatus::Resolved.is_open());
    }

    #[test]
    fn test_any_transition_but_self() {
        assert!(ContactStatus::Archived.can_transition_to(ContactStatus::New));
        assert!(!ContactStatus::Read.can_transition_to(ContactStatus::Read));
    }

    #[test]
    fn test_message_keeps_reply_order() {
        let msg: ContactMessage = serde_json::from_value(json!({
            "id": "c-1",
            "name": "Ada",
            "email": "ada@example.com",
            "subject": "Partnership",
            "message": "Hello there, let's talk.",
            "status": "replied",
            "createdAt": "2024-03-01T08:00:00Z",
            "replies": [
                {"id": "r-1", "subject": "Re: Partnership", "body": "first", "sentAt": "2024-03-01T09:00:00Z"},
                {"id": "r-2", "subject": "Re: Partnership", "body": "second", "sentAt": "2024-03-02T09:00:00Z"}
            ]
        }))
        .unwrap();
        assert_eq!(msg.status, ContactStatus::Replied);
        assert_eq!(msg.last_reply().map(|r| r.body.as_str()), Some("second"));
        assert!(msg.phone.is_none());
    }

    #[test]
    fn test_new_message_skips_missing_optionals() {
        let body = serde_json::to_value(NewContactMessage {
            name: "Ada".into(),
            email: "ada@example.com".into(),
            phone: None,
            company: Some("Analytical Engines".into()),
            subject: "Hi".into(),
            message: "Long enough message".into(),
        })
        .unwrap();
        assert!(body.get("phone").is_none());
        assert_eq!(body["company"], "Analytical Engines");
    }
}
