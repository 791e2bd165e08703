//! Refresh error taxonomy

/// Error indicating the server rejected the stored credentials.
///
/// Refresh implementations return this inside an `anyhow::Error`; it is the
/// only error that stops the sync loop.
#[derive(Debug, thiserror::Error)]
#[error("Authentication failed: {reason}")]
pub struct AuthenticationError {
    pub reason: String,
}

impl AuthenticationError {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

/// Check whether an error is (or wraps) an [`AuthenticationError`]
pub fn is_auth_failure(error: &anyhow::Error) -> bool {
    error.downcast_ref::<AuthenticationError>().is_some()
}
