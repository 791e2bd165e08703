//! Background synchronization of the folder list and the selected folder
//!
//! Keeps both remote-backed caches fresh on a fixed interval while the host
//! is mounted, and hands off to a logout handler on authentication failure.

mod error;
mod outcome;
mod poll;
mod readiness;
mod refresher;

pub use error::{AuthenticationError, is_auth_failure};
pub use outcome::CycleOutcome;
pub use poll::{LoopExit, SyncLoop};
pub use readiness::{is_ready, next_delay, selected_folder};
pub use refresher::{AuthFailureHandler, Refresher};
