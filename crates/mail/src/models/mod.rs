//! Domain models for mailbox state

mod folder;
mod message;
mod record;
mod snapshot;
mod user;

pub use folder::{Folder, FolderDirectory, FolderId};
pub use message::{EmailAddress, MessageId, MessageSummary};
pub use record::Record;
pub use snapshot::ApplicationSnapshot;
pub use user::{Credentials, User};
