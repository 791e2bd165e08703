//! Remote refresh operations driven by the sync loop

use anyhow::Result;
use std::future::Future;
use std::sync::Arc;

use crate::models::{Credentials, Folder, User};

/// The two remote-backed refreshes performed every cycle.
///
/// Implementations update the shared store as a side effect; the loop only
/// looks at whether they failed. Return an
/// [`AuthenticationError`](super::AuthenticationError) to end the loop.
pub trait Refresher: Send + Sync {
    /// Reload the folder tree
    fn refresh_folders(
        &self,
        credentials: Option<&Credentials>,
    ) -> impl Future<Output = Result<()>> + Send;

    /// Reset the cached message list of `folder`.
    ///
    /// `folder` may be the empty descriptor when the selection could not be
    /// resolved.
    fn refresh_messages(
        &self,
        user: Option<&User>,
        folder: &Folder,
    ) -> impl Future<Output = Result<()>> + Send;
}

/// Called once when a cycle ends in an authentication failure
pub type AuthFailureHandler = Arc<dyn Fn() + Send + Sync>;
