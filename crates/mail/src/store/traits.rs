//! Source-of-truth trait consumed by the sync loop

use crate::models::{ApplicationSnapshot, FolderDirectory};

/// Read access to the shared application state
///
/// The sync loop reads a fresh snapshot at the start of every cycle and
/// again when scheduling the next one, so implementations must return the
/// latest state on each call.
pub trait StateSource: Send + Sync {
    /// Current application state
    fn snapshot(&self) -> ApplicationSnapshot;

    /// Current flattened folder tree
    fn directory(&self) -> FolderDirectory;
}
