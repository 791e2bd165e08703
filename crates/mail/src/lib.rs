//! Mail crate - Mailbox state and background synchronization
//!
//! This crate provides the platform-independent core of the mailbox client:
//! - Domain models (Folder, FolderDirectory, ApplicationSnapshot, Record)
//! - View mode selection for the main window
//! - The background sync loop and its refresh error taxonomy
//! - A thread-safe in-memory application state store
//! - Logout handling on authentication failure
//!
//! This crate has zero UI dependencies; hosts drive the sync loop through
//! its start/notify/dispose lifecycle.

pub mod config;
pub mod models;
pub mod session;
pub mod store;
pub mod sync;
pub mod view;

pub use crate::config::PollSettings;
pub use models::{
    ApplicationSnapshot, Credentials, EmailAddress, Folder, FolderDirectory, FolderId, MessageId,
    MessageSummary, Record, User,
};
pub use session::{LOGIN_ROUTE, Navigator, logout_handler};
pub use store::{InMemoryAppStore, StateSource};
pub use sync::{
    AuthFailureHandler, AuthenticationError, CycleOutcome, LoopExit, Refresher, SyncLoop,
    is_auth_failure, is_ready,
};
pub use view::{MainLayout, ViewMode, ViewSelection, select_view, spinner_visible};
