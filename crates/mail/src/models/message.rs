//! Cached message list entries

use super::FolderId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Unique identifier for a message within its folder (server UID)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MessageId(pub String);

impl MessageId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for MessageId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// An email address with optional display name
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmailAddress {
    pub name: Option<String>,
    pub email: String,
}

impl EmailAddress {
    pub fn new(email: impl Into<String>) -> Self {
        Self {
            name: None,
            email: email.into(),
        }
    }

    pub fn with_name(name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            email: email.into(),
        }
    }

    /// Parse an address header value like "Ada Lovelace <ada@example.com>"
    pub fn parse(s: &str) -> Self {
        let s = s.trim();
        match (s.rfind('<'), s.rfind('>')) {
            (Some(open), Some(close)) if open < close => {
                let name = s[..open].trim().trim_matches('"');
                Self {
                    name: (!name.is_empty()).then(|| name.to_string()),
                    email: s[open + 1..close].trim().to_string(),
                }
            }
            _ => Self::new(s),
        }
    }
}

impl std::fmt::Display for EmailAddress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.name {
            Some(name) => write!(f, "{} <{}>", name, self.email),
            None => f.write_str(&self.email),
        }
    }
}

/// One row of a folder's cached message list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageSummary {
    pub id: MessageId,
    /// Folder the message was listed from
    pub folder_id: FolderId,
    pub from: EmailAddress,
    pub subject: String,
    pub received_at: DateTime<Utc>,
    /// Whether the message has been read
    pub seen: bool,
}

impl MessageSummary {
    pub fn new(id: impl Into<MessageId>, folder_id: FolderId, from: EmailAddress) -> Self {
        Self {
            id: id.into(),
            folder_id,
            from,
            subject: String::new(),
            received_at: Utc::now(),
            seen: false,
        }
    }

    pub fn subject(mut self, subject: impl Into<String>) -> Self {
        self.subject = subject.into();
        self
    }

    pub fn received_at(mut self, received_at: DateTime<Utc>) -> Self {
        self.received_at = received_at;
        self
    }

    pub fn seen(mut self, seen: bool) -> Self {
        self.seen = seen;
        self
    }
}
