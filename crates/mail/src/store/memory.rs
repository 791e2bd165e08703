//! In-memory application state store
//!
//! Holds the shared state behind RwLocks and bumps a watch channel on every
//! mutation so hosts can re-run their lifecycle checkpoint.

use anyhow::{Result, bail};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tokio::sync::watch;

use super::StateSource;
use crate::config::PollSettings;
use crate::models::{
    ApplicationSnapshot, Folder, FolderDirectory, FolderId, MessageSummary, Record, User,
};

/// Thread-safe in-memory implementation of [`StateSource`]
pub struct InMemoryAppStore {
    state: RwLock<ApplicationSnapshot>,
    /// Folder tree as delivered by the server
    folders: RwLock<Vec<Folder>>,
    /// Flattened view of `folders`, rebuilt on every folder update
    directory: RwLock<FolderDirectory>,
    /// Cached message list per folder
    messages: RwLock<HashMap<FolderId, Vec<MessageSummary>>>,
    /// Change counter, incremented on every mutation
    changes: watch::Sender<u64>,
}

fn read<T>(lock: &RwLock<T>) -> RwLockReadGuard<'_, T> {
    lock.read().unwrap_or_else(PoisonError::into_inner)
}

fn write<T>(lock: &RwLock<T>) -> RwLockWriteGuard<'_, T> {
    lock.write().unwrap_or_else(PoisonError::into_inner)
}

impl InMemoryAppStore {
    /// Create an empty store from poll settings
    pub fn new(settings: &PollSettings) -> Self {
        Self::from_snapshot(ApplicationSnapshot::new(
            settings.title.clone(),
            settings.poll_interval_ms,
        ))
    }

    /// Create a store seeded with a snapshot and no folders
    pub fn from_snapshot(snapshot: ApplicationSnapshot) -> Self {
        let (changes, _) = watch::channel(0);
        Self {
            state: RwLock::new(snapshot),
            folders: RwLock::new(Vec::new()),
            directory: RwLock::new(FolderDirectory::new()),
            messages: RwLock::new(HashMap::new()),
            changes,
        }
    }

    /// Subscribe to change notifications
    ///
    /// The value is a monotonically increasing revision number.
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.changes.subscribe()
    }

    /// Current revision number
    pub fn revision(&self) -> u64 {
        *self.changes.borrow()
    }

    fn changed(&self) {
        self.changes.send_modify(|revision| *revision += 1);
    }

    fn update(&self, f: impl FnOnce(&mut ApplicationSnapshot)) {
        f(&mut write(&self.state));
        self.changed();
    }

    // === Folders ===

    /// Replace the folder tree and rebuild the directory
    pub fn set_folders(&self, folders: Vec<Folder>) {
        *write(&self.directory) = FolderDirectory::from_tree(&folders);
        *write(&self.folders) = folders;
        self.changed();
    }

    /// Folder tree as last delivered
    pub fn folders(&self) -> Vec<Folder> {
        read(&self.folders).clone()
    }

    pub fn select_folder(&self, id: Option<FolderId>) {
        self.update(|state| state.selected_folder_id = id);
    }

    // === Message cache ===

    /// Reset the cached message list of a folder
    pub fn replace_folder_messages(&self, folder_id: &FolderId, messages: Vec<MessageSummary>) {
        write(&self.messages).insert(folder_id.clone(), messages);
        self.changed();
    }

    /// Cached message list of a folder, empty if never loaded
    pub fn folder_messages(&self, folder_id: &FolderId) -> Vec<MessageSummary> {
        read(&self.messages)
            .get(folder_id)
            .cloned()
            .unwrap_or_default()
    }

    // === Editor and viewer ===

    /// Open the editor on a blank draft
    pub fn edit_new_message(&self) {
        let draft = Record::new()
            .with("to", Value::Array(Vec::new()))
            .with("cc", Value::Array(Vec::new()))
            .with("bcc", Value::Array(Vec::new()))
            .with("subject", "")
            .with("content", "");
        self.update(|state| state.new_message_draft = Some(draft));
    }

    /// Close the editor
    pub fn discard_draft(&self) {
        self.update(|state| state.new_message_draft = None);
    }

    pub fn select_message(&self, message: Record) {
        self.update(|state| state.selected_message = Some(message));
    }

    pub fn close_message(&self) {
        self.update(|state| state.selected_message = None);
    }

    /// Track a send in flight, `None` once it completed
    pub fn set_outbox(&self, outbox: Option<Record>) {
        self.update(|state| state.outbox = outbox);
    }

    // === Settings and session ===

    /// Change the poll interval; picked up when the next cycle is scheduled
    pub fn set_poll_interval(&self, poll_interval_ms: u64) -> Result<()> {
        if poll_interval_ms == 0 {
            bail!("Poll interval must be greater than zero");
        }
        self.update(|state| state.poll_interval_ms = poll_interval_ms);
        Ok(())
    }

    pub fn sign_in(&self, user: User) {
        self.update(|state| state.user = Some(user));
    }

    /// Forget the stored credentials of the signed-in user
    pub fn clear_user_credentials(&self) {
        self.update(|state| {
            if let Some(user) = state.user.as_mut() {
                user.credentials = None;
            }
        });
    }

    // === Request tracking ===

    pub fn begin_request(&self) {
        self.update(|state| state.active_requests += 1);
    }

    pub fn end_request(&self) {
        self.update(|state| state.active_requests = state.active_requests.saturating_sub(1));
    }
}

impl Default for InMemoryAppStore {
    fn default() -> Self {
        Self::new(&PollSettings::default())
    }
}

impl StateSource for InMemoryAppStore {
    fn snapshot(&self) -> ApplicationSnapshot {
        read(&self.state).clone()
    }

    fn directory(&self) -> FolderDirectory {
        read(&self.directory).clone()
    }
}
