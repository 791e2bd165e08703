//! Headless mailbox host
//!
//! Runs the mailbox state and background sync loop against a simulated
//! server, logging view changes instead of drawing them.

use log::{error, info, warn};
use mail::models::{Credentials, User};
use mail::{InMemoryAppStore, PollSettings};
use std::sync::Arc;

mod backend;
mod host;

use backend::{SimulatedBackend, Simulation};
use host::Host;

/// Env var naming the simulated account
const USER_ENV: &str = "MAILBOX_USER";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .init();

    // Bootstrap config directory
    if let Err(e) = config::init() {
        error!("Failed to initialize config directory: {}", e);
    }

    let settings = match PollSettings::load() {
        Ok(settings) => settings,
        Err(e) => {
            warn!("Failed to load settings, using defaults: {:#}", e);
            if let Some(path) = PollSettings::default_settings_path() {
                warn!("Settings are read from: {}", path.display());
            }
            PollSettings::default()
        }
    };
    if !PollSettings::exists() {
        match PollSettings::default().save() {
            Ok(()) => info!("Wrote default settings"),
            Err(e) => warn!("Failed to write default settings: {:#}", e),
        }
    }
    info!("Polling every {} ms", settings.poll_interval_ms);

    let login = std::env::var(USER_ENV).unwrap_or_else(|_| "demo@example.com".to_string());
    let store = Arc::new(InMemoryAppStore::new(&settings));
    store.sign_in(
        User::new(login.clone()).with_credentials(Credentials::new(login, "simulated-token")),
    );

    let backend = Arc::new(SimulatedBackend::new(store.clone(), Simulation::from_env()?));
    Host::new(store, backend).run().await
}
