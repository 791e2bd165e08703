//! Headless host lifecycle
//!
//! Plays the part of the mailbox window: mounts the sync loop, re-runs the
//! lifecycle checkpoint on every store change, "renders" the active view to
//! the log, and disposes the loop on shutdown or logout.

use anyhow::Result;
use log::{debug, info, warn};
use mail::models::FolderId;
use mail::view::document_title;
use mail::{
    InMemoryAppStore, MainLayout, Navigator, Refresher, StateSource, SyncLoop, ViewMode,
    ViewSelection, logout_handler, select_view, spinner_visible,
};
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::Notify;

/// Navigator that records the route and wakes the host
#[derive(Default)]
pub struct HostNavigator {
    route: Mutex<Option<String>>,
    navigated: Notify,
}

impl HostNavigator {
    pub fn route(&self) -> Option<String> {
        self.route
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl Navigator for HostNavigator {
    fn navigate(&self, route: &str) {
        info!("Navigating to {}", route);
        *self.route.lock().unwrap_or_else(PoisonError::into_inner) = Some(route.to_string());
        self.navigated.notify_one();
    }
}

/// Mounted mailbox window
pub struct Host<R> {
    store: Arc<InMemoryAppStore>,
    backend: Arc<R>,
    navigator: Arc<HostNavigator>,
    sync: SyncLoop<InMemoryAppStore, R>,
    layout: MainLayout,
    rendered: Option<ViewSelection>,
}

impl<R> Host<R>
where
    R: Refresher + 'static,
{
    /// Mount the host; the sync loop is created but not started
    pub fn new(store: Arc<InMemoryAppStore>, backend: Arc<R>) -> Self {
        let navigator = Arc::new(HostNavigator::default());
        let sync = SyncLoop::new(
            store.clone(),
            backend.clone(),
            logout_handler(store.clone(), navigator.clone()),
        );
        Self {
            store,
            backend,
            navigator,
            sync,
            layout: MainLayout::new(),
            rendered: None,
        }
    }

    /// Run until Ctrl-C or logout
    pub async fn run(mut self) -> Result<()> {
        let snapshot = self.store.snapshot();
        info!("Mounted \"{}\"", document_title(&snapshot));
        self.render();
        self.load_folders();
        self.sync.start();

        let mut changes = self.store.subscribe();
        let shutdown = tokio::signal::ctrl_c();
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                changed = changes.changed() => {
                    if changed.is_err() {
                        break;
                    }
                    let snapshot = self.store.snapshot();
                    self.sync.notify(&snapshot, &self.store.directory());
                    self.render();
                }
                result = &mut shutdown => {
                    if let Err(e) = result {
                        warn!("Failed to listen for Ctrl-C: {}", e);
                    }
                    info!("Shutting down");
                    break;
                }
                _ = self.navigator.navigated.notified() => {
                    info!("Left the mailbox for {}", self.navigator.route().unwrap_or_default());
                    break;
                }
            }
        }

        self.sync.dispose();
        if let Some(exit) = self.sync.wait().await {
            debug!("Sync loop ended: {:?}", exit);
        }
        Ok(())
    }

    /// Initial folder load done by the sidebar, independent of the loop
    fn load_folders(&self) {
        let backend = self.backend.clone();
        let store = self.store.clone();
        tokio::spawn(async move {
            let credentials = store.snapshot().user.and_then(|u| u.credentials);
            match backend.refresh_folders(credentials.as_ref()).await {
                Ok(()) => {
                    if store.snapshot().selected_folder_id.is_none() {
                        store.select_folder(Some(FolderId::new(FolderId::INBOX)));
                    }
                }
                Err(e) => warn!("Failed to load folders: {:#}", e),
            }
        });
    }

    /// Log the active view when it changes
    fn render(&mut self) {
        let snapshot = self.store.snapshot();
        let selection = select_view(&snapshot);
        if self.rendered == Some(selection) {
            return;
        }
        self.rendered = Some(selection);

        match selection.mode {
            ViewMode::Composing => info!("View: message editor"),
            ViewMode::ViewingMessage => info!("View: message viewer"),
            ViewMode::ListingMessages => {
                let messages = snapshot
                    .selected_folder_id
                    .as_ref()
                    .map(|id| self.store.folder_messages(id).len())
                    .unwrap_or_default();
                info!(
                    "View: message list ({} messages, compose {})",
                    messages,
                    if selection.compose_affordance_visible {
                        "available"
                    } else {
                        "hidden"
                    }
                );
            }
        }
        debug!(
            "Spinner {}, sidebar {}",
            if spinner_visible(&snapshot) { "on" } else { "off" },
            if self.layout.sidebar_collapsed() {
                "collapsed"
            } else {
                "expanded"
            }
        );
    }
}
