//! Top-level view mode selection
//!
//! Pure function of a snapshot, called once per render pass.

use crate::models::{ApplicationSnapshot, Record};

/// The single active top-level view
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ViewMode {
    /// Message editor
    Composing,
    /// Message viewer
    ViewingMessage,
    /// Message list of the selected folder
    ListingMessages,
}

/// Result of a view selection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ViewSelection {
    pub mode: ViewMode,
    /// Offer the "compose" button. Only ever true while listing messages.
    pub compose_affordance_visible: bool,
}

/// Pick the active view for a snapshot.
///
/// First match wins: a populated draft beats a populated selected message,
/// which beats the message list.
pub fn select_view(snapshot: &ApplicationSnapshot) -> ViewSelection {
    if Record::is_populated(snapshot.new_message_draft.as_ref()) {
        ViewSelection {
            mode: ViewMode::Composing,
            compose_affordance_visible: false,
        }
    } else if Record::is_populated(snapshot.selected_message.as_ref()) {
        ViewSelection {
            mode: ViewMode::ViewingMessage,
            compose_affordance_visible: false,
        }
    } else {
        ViewSelection {
            mode: ViewMode::ListingMessages,
            compose_affordance_visible: snapshot.outbox.is_none(),
        }
    }
}
