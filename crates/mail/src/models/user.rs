//! Signed-in user and stored credentials

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Opaque credentials handed to the folder refresh
#[derive(Clone, PartialEq, Serialize, Deserialize)]
pub struct Credentials {
    /// Server login (usually the email address)
    pub login: String,
    /// Encrypted or token form of the secret, never logged
    pub token: String,
}

impl Credentials {
    pub fn new(login: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            login: login.into(),
            token: token.into(),
        }
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("login", &self.login)
            .field("token", &"<redacted>")
            .finish()
    }
}

/// The signed-in user, passed to the message refresh
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    /// Email address
    pub email: String,
    /// Display name
    pub display_name: Option<String>,
    /// When the user signed in
    pub signed_in_at: DateTime<Utc>,
    /// Stored credentials, cleared on logout
    pub credentials: Option<Credentials>,
}

impl User {
    /// Create a user that signed in just now
    pub fn new(email: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            display_name: None,
            signed_in_at: Utc::now(),
            credentials: None,
        }
    }

    /// Builder method to set the display name
    pub fn with_display_name(mut self, name: impl Into<String>) -> Self {
        self.display_name = Some(name.into());
        self
    }

    /// Builder method to attach credentials
    pub fn with_credentials(mut self, credentials: Credentials) -> Self {
        self.credentials = Some(credentials);
        self
    }

    /// Get display name or fall back to email
    pub fn display_name_or_email(&self) -> &str {
        self.display_name.as_deref().unwrap_or(&self.email)
    }
}
