//! Folder model and the flattened folder directory

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Unique identifier for a folder (server-side folder ID)
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FolderId(pub String);

impl FolderId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    // Well-known folder IDs
    pub const INBOX: &'static str = "INBOX";
    pub const SENT: &'static str = "Sent";
    pub const DRAFTS: &'static str = "Drafts";
    pub const TRASH: &'static str = "Trash";
}

impl From<String> for FolderId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for FolderId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl std::fmt::Display for FolderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// A mail folder descriptor
///
/// `Folder::default()` is the empty descriptor used when the selected folder
/// cannot be resolved.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Folder {
    /// Folder ID (e.g., "INBOX", "Archive/2024")
    pub id: FolderId,
    /// Display name
    pub name: String,
    /// Number of messages in the folder
    pub message_count: u32,
    /// Number of unread messages
    pub unread_count: u32,
    /// Nested sub-folders
    #[serde(default)]
    pub children: Vec<Folder>,
}

impl Folder {
    /// Create a new folder
    pub fn new(id: impl Into<FolderId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            ..Default::default()
        }
    }

    /// Builder method to set message count
    pub fn with_message_count(mut self, count: u32) -> Self {
        self.message_count = count;
        self
    }

    /// Builder method to set unread count
    pub fn with_unread_count(mut self, count: u32) -> Self {
        self.unread_count = count;
        self
    }

    /// Builder method to append a sub-folder
    pub fn with_child(mut self, child: Folder) -> Self {
        self.children.push(child);
        self
    }

    /// True for the empty descriptor
    pub fn is_empty(&self) -> bool {
        self.id.0.is_empty()
    }
}

/// Flattened folder tree, keyed by folder ID
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FolderDirectory {
    folders: HashMap<FolderId, Folder>,
}

impl FolderDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Flatten a folder tree so every nested folder is addressable by ID.
    ///
    /// Entries keep their `children` so a resolved folder still describes
    /// its sub-tree.
    pub fn from_tree(roots: &[Folder]) -> Self {
        let mut directory = Self::new();
        let mut pending: Vec<&Folder> = roots.iter().collect();
        while let Some(folder) = pending.pop() {
            pending.extend(folder.children.iter());
            directory.insert(folder.clone());
        }
        directory
    }

    /// Insert or replace a folder
    pub fn insert(&mut self, folder: Folder) {
        self.folders.insert(folder.id.clone(), folder);
    }

    pub fn get(&self, id: &FolderId) -> Option<&Folder> {
        self.folders.get(id)
    }

    /// Resolve the selected folder, falling back to the empty descriptor
    /// when nothing is selected or the ID is unknown.
    pub fn resolve(&self, id: Option<&FolderId>) -> Folder {
        id.and_then(|id| self.folders.get(id))
            .cloned()
            .unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.folders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.folders.is_empty()
    }
}

impl FromIterator<Folder> for FolderDirectory {
    fn from_iter<I: IntoIterator<Item = Folder>>(iter: I) -> Self {
        let mut directory = Self::new();
        for folder in iter {
            directory.insert(folder);
        }
        directory
    }
}
