//! Simulated mail server used by the headless host
//!
//! Writes folder and message refresh results straight into the store, with
//! configurable latency and failure injection.

use anyhow::{Context, Result, anyhow};
use chrono::{Duration as ChronoDuration, Utc};
use log::debug;
use mail::models::{Credentials, EmailAddress, Folder, FolderId, MessageSummary, User};
use mail::{AuthenticationError, InMemoryAppStore, Refresher};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

/// Env var: reject credentials once this many folder refreshes succeeded
const AUTH_FAILURE_AFTER_ENV: &str = "MAILBOX_SIMULATE_AUTH_FAILURE_AFTER";
/// Env var: fail every Nth folder refresh with a network error
const TRANSIENT_EVERY_ENV: &str = "MAILBOX_SIMULATE_TRANSIENT_EVERY";
/// Env var: artificial latency of each refresh in milliseconds
const LATENCY_ENV: &str = "MAILBOX_SIMULATE_LATENCY_MS";

const DEFAULT_LATENCY_MS: u64 = 250;

/// Failure injection and latency for [`SimulatedBackend`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Simulation {
    pub latency: Duration,
    pub auth_failure_after: Option<u64>,
    pub transient_every: Option<u64>,
}

impl Default for Simulation {
    fn default() -> Self {
        Self {
            latency: Duration::from_millis(DEFAULT_LATENCY_MS),
            auth_failure_after: None,
            transient_every: None,
        }
    }
}

impl Simulation {
    /// Read the simulation knobs from the environment
    pub fn from_env() -> Result<Self> {
        let latency_ms = parse_env(LATENCY_ENV)?.unwrap_or(DEFAULT_LATENCY_MS);
        Ok(Self {
            latency: Duration::from_millis(latency_ms),
            auth_failure_after: parse_env(AUTH_FAILURE_AFTER_ENV)?,
            transient_every: parse_env(TRANSIENT_EVERY_ENV)?.filter(|n| *n > 0),
        })
    }
}

fn parse_env(name: &str) -> Result<Option<u64>> {
    match std::env::var(name) {
        Ok(value) => value
            .trim()
            .parse()
            .map(Some)
            .with_context(|| format!("{} is not a number: {:?}", name, value)),
        Err(_) => Ok(None),
    }
}

/// In-process stand-in for the remote mail server
pub struct SimulatedBackend {
    store: Arc<InMemoryAppStore>,
    simulation: Simulation,
    folder_refreshes: AtomicU64,
    message_refreshes: AtomicU64,
}

impl SimulatedBackend {
    pub fn new(store: Arc<InMemoryAppStore>, simulation: Simulation) -> Self {
        Self {
            store,
            simulation,
            folder_refreshes: AtomicU64::new(0),
            message_refreshes: AtomicU64::new(0),
        }
    }

    fn folder_tree(refresh: u64) -> Vec<Folder> {
        let unread = (refresh % 5) as u32;
        vec![
            Folder::new(FolderId::INBOX, "Inbox")
                .with_message_count(40 + refresh as u32)
                .with_unread_count(unread)
                .with_child(Folder::new("INBOX/Receipts", "Receipts").with_message_count(12)),
            Folder::new(FolderId::DRAFTS, "Drafts").with_message_count(2),
            Folder::new(FolderId::SENT, "Sent").with_message_count(118),
            Folder::new(FolderId::TRASH, "Trash"),
        ]
    }

    async fn latency(&self) {
        if !self.simulation.latency.is_zero() {
            tokio::time::sleep(self.simulation.latency).await;
        }
    }
}

impl Refresher for SimulatedBackend {
    async fn refresh_folders(&self, credentials: Option<&Credentials>) -> Result<()> {
        self.store.begin_request();
        self.latency().await;
        self.store.end_request();

        let credentials = credentials.ok_or_else(|| AuthenticationError::new("not signed in"))?;
        let done = self.folder_refreshes.load(Ordering::SeqCst);
        if self
            .simulation
            .auth_failure_after
            .is_some_and(|limit| done >= limit)
        {
            return Err(AuthenticationError::new(format!(
                "credentials for {} were revoked",
                credentials.login
            ))
            .into());
        }
        if self
            .simulation
            .transient_every
            .is_some_and(|every| (done + 1) % every == 0)
        {
            self.folder_refreshes.fetch_add(1, Ordering::SeqCst);
            return Err(anyhow!("simulated network timeout"));
        }

        let refresh = self.folder_refreshes.fetch_add(1, Ordering::SeqCst) + 1;
        debug!("Folder refresh {} for {}", refresh, credentials.login);
        self.store.set_folders(Self::folder_tree(refresh));
        Ok(())
    }

    async fn refresh_messages(&self, user: Option<&User>, folder: &Folder) -> Result<()> {
        if user.is_none() {
            return Err(AuthenticationError::new("not signed in").into());
        }
        if folder.is_empty() {
            debug!("No folder resolved, skipping message refresh");
            return Ok(());
        }

        self.store.begin_request();
        self.latency().await;
        self.store.end_request();

        let refresh = self.message_refreshes.fetch_add(1, Ordering::SeqCst) + 1;
        let now = Utc::now();
        let messages = (0..folder.message_count.min(25))
            .map(|i| {
                MessageSummary::new(
                    format!("{}-{}", folder.id, i).as_str(),
                    folder.id.clone(),
                    EmailAddress::parse("Simulated Sender <sender@example.com>"),
                )
                .subject(format!("Message {} (refresh {})", i, refresh))
                .received_at(now - ChronoDuration::minutes(i64::from(i) * 7))
                .seen(i >= folder.unread_count)
            })
            .collect();
        self.store.replace_folder_messages(&folder.id, messages);
        Ok(())
    }
}
