//! Classification of a joined refresh cycle

use anyhow::Result;

use super::error::is_auth_failure;

/// What a settled cycle means for the loop
#[derive(Debug)]
pub enum CycleOutcome {
    /// Both refreshes succeeded
    Refreshed,
    /// At least one refresh was rejected for bad credentials; stops the loop
    AuthFailure(anyhow::Error),
    /// Some other failure; logged, and the next cycle retries both refreshes
    TransientFailure(anyhow::Error),
}

impl CycleOutcome {
    /// Classify the results of the folder and message refreshes.
    ///
    /// An authentication failure on either side wins. Otherwise the first
    /// error (folders before messages) is kept and the other dropped.
    pub fn classify(folders: Result<()>, messages: Result<()>) -> Self {
        match (folders, messages) {
            (Ok(()), Ok(())) => Self::Refreshed,
            (Err(e), _) | (_, Err(e)) if is_auth_failure(&e) => Self::AuthFailure(e),
            (Err(e), _) | (_, Err(e)) => Self::TransientFailure(e),
        }
    }

    pub fn is_auth_failure(&self) -> bool {
        matches!(self, Self::AuthFailure(_))
    }
}
