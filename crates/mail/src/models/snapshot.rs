//! Read-only view of the shared application state

use serde::{Deserialize, Serialize};

use super::{FolderId, Record, User};

/// Point-in-time copy of the application state consumed by the view
/// selector and the sync loop.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationSnapshot {
    /// Window/document title
    pub title: String,
    /// Active folder, `None` until one is chosen
    pub selected_folder_id: Option<FolderId>,
    /// Draft being composed
    pub new_message_draft: Option<Record>,
    /// Message being viewed
    pub selected_message: Option<Record>,
    /// Delay between sync cycles, always > 0
    pub poll_interval_ms: u64,
    /// Set while a send is in flight
    pub outbox: Option<Record>,
    /// Number of requests currently running against the server
    pub active_requests: u32,
    /// Signed-in user
    pub user: Option<User>,
}

impl ApplicationSnapshot {
    pub fn new(title: impl Into<String>, poll_interval_ms: u64) -> Self {
        Self {
            title: title.into(),
            selected_folder_id: None,
            new_message_draft: None,
            selected_message: None,
            poll_interval_ms,
            outbox: None,
            active_requests: 0,
            user: None,
        }
    }

    pub fn with_selected_folder(mut self, id: impl Into<FolderId>) -> Self {
        self.selected_folder_id = Some(id.into());
        self
    }

    pub fn with_draft(mut self, draft: Record) -> Self {
        self.new_message_draft = Some(draft);
        self
    }

    pub fn with_selected_message(mut self, message: Record) -> Self {
        self.selected_message = Some(message);
        self
    }

    pub fn with_outbox(mut self, outbox: Record) -> Self {
        self.outbox = Some(outbox);
        self
    }

    pub fn with_user(mut self, user: User) -> Self {
        self.user = Some(user);
        self
    }
}
