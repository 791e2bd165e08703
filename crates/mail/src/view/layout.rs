//! Host-local layout state of the main mailbox window

use crate::models::ApplicationSnapshot;

/// Layout state owned by the host, not by the shared store
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MainLayout {
    sidebar_collapsed: bool,
}

impl MainLayout {
    /// Sidebar starts expanded
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sidebar_collapsed(&self) -> bool {
        self.sidebar_collapsed
    }

    /// Flip the sidebar between collapsed and expanded, returning the new state
    pub fn toggle_sidebar(&mut self) -> bool {
        self.sidebar_collapsed = !self.sidebar_collapsed;
        self.sidebar_collapsed
    }
}

/// Show the activity spinner while any request is in flight
pub fn spinner_visible(snapshot: &ApplicationSnapshot) -> bool {
    snapshot.active_requests > 0
}

/// Title the host applies to its window on mount
pub fn document_title(snapshot: &ApplicationSnapshot) -> &str {
    &snapshot.title
}
