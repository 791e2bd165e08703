//! Start gate and scheduling helpers
//!
//! Pure functions that can be tested without a runtime.

use std::time::Duration;

use crate::models::{ApplicationSnapshot, Folder, FolderDirectory};

/// Check whether the sync loop may start.
///
/// The first refresh needs a folder context, so both a selected folder ID
/// and a populated folder directory are required.
pub fn is_ready(snapshot: &ApplicationSnapshot, directory: &FolderDirectory) -> bool {
    snapshot.selected_folder_id.is_some() && !directory.is_empty()
}

/// Resolve the folder a cycle refreshes messages for.
///
/// Returns the empty descriptor when the selection is unset or unknown.
pub fn selected_folder(snapshot: &ApplicationSnapshot, directory: &FolderDirectory) -> Folder {
    directory.resolve(snapshot.selected_folder_id.as_ref())
}

/// Delay before the next cycle, read from the latest snapshot
pub fn next_delay(snapshot: &ApplicationSnapshot) -> Duration {
    Duration::from_millis(snapshot.poll_interval_ms)
}
