//! Background sync loop
//!
//! One loop per mounted host. The host calls [`SyncLoop::notify`] on every
//! state change and [`SyncLoop::dispose`] once on teardown. The loop starts
//! the first time the state is ready, then runs one cycle at a time: both
//! refreshes joined, then either a delay and the next cycle, or termination
//! on an authentication failure.

use log::{debug, error, info, warn};
use std::sync::Arc;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use super::outcome::CycleOutcome;
use super::readiness::{is_ready, next_delay, selected_folder};
use super::refresher::{AuthFailureHandler, Refresher};
use crate::models::{ApplicationSnapshot, FolderDirectory};
use crate::store::StateSource;

/// Why a loop task ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopExit {
    /// Disposed by the host
    Stopped,
    /// A cycle was rejected for bad credentials; the logout handler ran
    AuthFailure,
}

/// Per-mount bookkeeping
#[derive(Debug, Default)]
struct LoopHandle {
    /// Set on the first successful start, never reset
    started: bool,
    /// Cancels the pending delay and marks results of an in-flight cycle stale
    cancel: CancellationToken,
    task: Option<JoinHandle<LoopExit>>,
}

/// Lifecycle object owning one recurring refresh cycle
pub struct SyncLoop<S, R> {
    source: Arc<S>,
    refresher: Arc<R>,
    on_auth_failure: AuthFailureHandler,
    handle: LoopHandle,
}

impl<S, R> SyncLoop<S, R>
where
    S: StateSource + 'static,
    R: Refresher + 'static,
{
    /// Mount a new loop. Nothing runs until the state is ready.
    pub fn new(source: Arc<S>, refresher: Arc<R>, on_auth_failure: AuthFailureHandler) -> Self {
        Self {
            source,
            refresher,
            on_auth_failure,
            handle: LoopHandle::default(),
        }
    }

    /// Mount checkpoint: check readiness against the current source state
    pub fn start(&mut self) -> bool {
        let snapshot = self.source.snapshot();
        let directory = self.source.directory();
        self.notify(&snapshot, &directory)
    }

    /// Lifecycle checkpoint, safe to call on every state change.
    ///
    /// Starts the loop at most once per handle. Returns `true` only for the
    /// call that started it. Must be called from within a Tokio runtime;
    /// outside one the start is refused and may be retried later.
    pub fn notify(&mut self, snapshot: &ApplicationSnapshot, directory: &FolderDirectory) -> bool {
        if self.handle.started || self.handle.cancel.is_cancelled() {
            return false;
        }
        if !is_ready(snapshot, directory) {
            debug!(
                "Sync loop waiting: folder selected = {}, {} folders known",
                snapshot.selected_folder_id.is_some(),
                directory.len()
            );
            return false;
        }

        let runtime = match Handle::try_current() {
            Ok(runtime) => runtime,
            Err(e) => {
                error!("Cannot start sync loop outside a Tokio runtime: {}", e);
                return false;
            }
        };

        self.handle.started = true;
        info!(
            "Starting sync loop for folder {} every {} ms",
            snapshot
                .selected_folder_id
                .as_ref()
                .map(|id| id.as_str())
                .unwrap_or_default(),
            snapshot.poll_interval_ms
        );

        let task = runtime.spawn(run(
            self.source.clone(),
            self.refresher.clone(),
            self.on_auth_failure.clone(),
            self.handle.cancel.clone(),
        ));
        self.handle.task = Some(task);
        true
    }

    /// Wait for the loop task to end.
    ///
    /// Returns `None` if the loop never started or was already waited on.
    pub async fn wait(&mut self) -> Option<LoopExit> {
        let task = self.handle.task.take()?;
        match task.await {
            Ok(exit) => Some(exit),
            Err(e) => {
                error!("Sync loop task failed: {}", e);
                None
            }
        }
    }
}

impl<S, R> SyncLoop<S, R> {
    /// Teardown: cancel any pending cycle. Idempotent.
    ///
    /// An in-flight cycle is left to settle; its results are discarded.
    pub fn dispose(&mut self) {
        if !self.handle.cancel.is_cancelled() {
            debug!("Disposing sync loop");
            self.handle.cancel.cancel();
        }
    }

    pub fn is_started(&self) -> bool {
        self.handle.started
    }

    pub fn is_disposed(&self) -> bool {
        self.handle.cancel.is_cancelled()
    }

    /// Whether the loop task has ended (false once [`SyncLoop::wait`] took it)
    pub fn is_finished(&self) -> bool {
        self.handle.task.as_ref().is_some_and(|task| task.is_finished())
    }
}

impl<S, R> Drop for SyncLoop<S, R> {
    fn drop(&mut self) {
        self.handle.cancel.cancel();
    }
}

async fn run<S, R>(
    source: Arc<S>,
    refresher: Arc<R>,
    on_auth_failure: AuthFailureHandler,
    cancel: CancellationToken,
) -> LoopExit
where
    S: StateSource,
    R: Refresher,
{
    let mut cycle: u64 = 0;
    loop {
        cycle += 1;
        let outcome = run_cycle(source.as_ref(), refresher.as_ref()).await;

        // The host may have torn down while the refreshes were running
        if cancel.is_cancelled() {
            debug!("Sync loop stopped during cycle {}, discarding results", cycle);
            return LoopExit::Stopped;
        }

        match outcome {
            CycleOutcome::Refreshed => debug!("Sync cycle {} complete", cycle),
            CycleOutcome::TransientFailure(e) => warn!("Error in refresh poll: {:#}", e),
            CycleOutcome::AuthFailure(e) => {
                warn!("Error in refresh poll: {:#}; stopping sync loop", e);
                on_auth_failure();
                return LoopExit::AuthFailure;
            }
        }

        let delay = next_delay(&source.snapshot());
        tokio::select! {
            _ = cancel.cancelled() => {
                debug!("Sync loop stopped after cycle {}", cycle);
                return LoopExit::Stopped;
            }
            _ = tokio::time::sleep(delay) => {}
        }
    }
}

/// One cycle: refresh folders and the selected folder's messages together
async fn run_cycle<S, R>(source: &S, refresher: &R) -> CycleOutcome
where
    S: StateSource,
    R: Refresher,
{
    let snapshot = source.snapshot();
    let folder = selected_folder(&snapshot, &source.directory());
    let user = snapshot.user.as_ref();
    let credentials = user.and_then(|u| u.credentials.as_ref());

    let (folders, messages) = tokio::join!(
        refresher.refresh_folders(credentials),
        refresher.refresh_messages(user, &folder),
    );
    CycleOutcome::classify(folders, messages)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Credentials, Folder, FolderId, User};
    use crate::store::InMemoryAppStore;
    use crate::sync::AuthenticationError;
    use anyhow::Result;
    use std::collections::VecDeque;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::time::Duration;
    use tokio::time::sleep;

    /// Refresher double with scripted results and overlap detection
    #[derive(Default)]
    struct FakeRefresher {
        folder_calls: AtomicUsize,
        message_calls: AtomicUsize,
        started: AtomicUsize,
        settled: AtomicUsize,
        overlapped: AtomicBool,
        folder_delay: Duration,
        message_delay: Duration,
        folder_results: Mutex<VecDeque<Result<()>>>,
        message_results: Mutex<VecDeque<Result<()>>>,
        folders_seen: Mutex<Vec<Folder>>,
    }

    impl FakeRefresher {
        fn with_folder_results(self, results: Vec<Result<()>>) -> Self {
            *self.folder_results.lock().unwrap() = results.into();
            self
        }

        fn with_message_results(self, results: Vec<Result<()>>) -> Self {
            *self.message_results.lock().unwrap() = results.into();
            self
        }

        fn with_delays(mut self, folders: u64, messages: u64) -> Self {
            self.folder_delay = Duration::from_millis(folders);
            self.message_delay = Duration::from_millis(messages);
            self
        }

        fn enter(&self) {
            // Two calls per cycle: call n belongs to cycle n / 2, which may
            // only begin once every call of the earlier cycles settled.
            let index = self.started.fetch_add(1, Ordering::SeqCst);
            if self.settled.load(Ordering::SeqCst) < (index / 2) * 2 {
                self.overlapped.store(true, Ordering::SeqCst);
            }
        }

        fn leave(&self) {
            self.settled.fetch_add(1, Ordering::SeqCst);
        }

        fn calls(&self) -> (usize, usize) {
            (
                self.folder_calls.load(Ordering::SeqCst),
                self.message_calls.load(Ordering::SeqCst),
            )
        }
    }

    impl Refresher for FakeRefresher {
        async fn refresh_folders(&self, _credentials: Option<&Credentials>) -> Result<()> {
            self.folder_calls.fetch_add(1, Ordering::SeqCst);
            self.enter();
            if !self.folder_delay.is_zero() {
                sleep(self.folder_delay).await;
            }
            self.leave();
            self.folder_results
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or(Ok(()))
        }

        async fn refresh_messages(&self, _user: Option<&User>, folder: &Folder) -> Result<()> {
            self.message_calls.fetch_add(1, Ordering::SeqCst);
            self.folders_seen.lock().unwrap().push(folder.clone());
            self.enter();
            if !self.message_delay.is_zero() {
                sleep(self.message_delay).await;
            }
            self.leave();
            self.message_results
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or(Ok(()))
        }
    }

    fn counting_handler() -> (AuthFailureHandler, Arc<AtomicUsize>) {
        let count = Arc::new(AtomicUsize::new(0));
        let counter = count.clone();
        let handler: AuthFailureHandler = Arc::new(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        (handler, count)
    }

    fn ready_store(poll_interval_ms: u64) -> Arc<InMemoryAppStore> {
        let store = Arc::new(InMemoryAppStore::default());
        store.set_poll_interval(poll_interval_ms).unwrap();
        store.set_folders(vec![Folder::new(FolderId::INBOX, "Inbox")]);
        store.select_folder(Some(FolderId::new(FolderId::INBOX)));
        store
    }

    fn auth_error() -> Result<()> {
        Err(AuthenticationError::new("session expired").into())
    }

    #[tokio::test(start_paused = true)]
    async fn test_start_gate_idempotence() {
        let store = Arc::new(InMemoryAppStore::default());
        let refresher = Arc::new(FakeRefresher::default());
        let (handler, _) = counting_handler();
        let mut sync = SyncLoop::new(store.clone(), refresher.clone(), handler);

        assert!(!sync.start());
        store.select_folder(Some(FolderId::new(FolderId::INBOX)));
        assert!(!sync.notify(&store.snapshot(), &store.directory()));
        assert!(!sync.is_started());

        store.set_folders(vec![Folder::new(FolderId::INBOX, "Inbox")]);
        assert!(sync.notify(&store.snapshot(), &store.directory()));
        for _ in 0..5 {
            assert!(!sync.notify(&store.snapshot(), &store.directory()));
        }
        assert!(!sync.start());

        sleep(Duration::from_millis(10)).await;
        assert_eq!(refresher.calls(), (1, 1));
        sync.dispose();
    }

    #[tokio::test(start_paused = true)]
    async fn test_transient_failure_reschedules() {
        let store = ready_store(1000);
        let refresher = Arc::new(
            FakeRefresher::default()
                .with_folder_results(vec![Err(anyhow::anyhow!("connection reset"))]),
        );
        let (handler, auth_failures) = counting_handler();
        let mut sync = SyncLoop::new(store, refresher.clone(), handler);

        assert!(sync.start());
        sleep(Duration::from_millis(500)).await;
        assert_eq!(refresher.calls(), (1, 1));

        sleep(Duration::from_millis(1000)).await;
        assert_eq!(refresher.calls(), (2, 2));
        assert_eq!(auth_failures.load(Ordering::SeqCst), 0);
        assert!(!sync.is_finished());
        sync.dispose();
    }

    #[tokio::test(start_paused = true)]
    async fn test_both_refreshes_failing_still_reschedules() {
        let store = ready_store(1000);
        let refresher = Arc::new(
            FakeRefresher::default()
                .with_folder_results(vec![Err(anyhow::anyhow!("folders down"))])
                .with_message_results(vec![Err(anyhow::anyhow!("messages down"))]),
        );
        let (handler, auth_failures) = counting_handler();
        let mut sync = SyncLoop::new(store, refresher.clone(), handler);

        assert!(sync.start());
        sleep(Duration::from_millis(1500)).await;
        assert_eq!(refresher.calls(), (2, 2));
        assert_eq!(auth_failures.load(Ordering::SeqCst), 0);
        sync.dispose();
    }

    #[tokio::test(start_paused = true)]
    async fn test_auth_failure_terminates_loop() {
        let store = ready_store(1000);
        let refresher =
            Arc::new(FakeRefresher::default().with_message_results(vec![auth_error()]));
        let (handler, auth_failures) = counting_handler();
        let mut sync = SyncLoop::new(store, refresher.clone(), handler);

        assert!(sync.start());
        assert_eq!(sync.wait().await, Some(LoopExit::AuthFailure));
        assert_eq!(auth_failures.load(Ordering::SeqCst), 1);

        sleep(Duration::from_millis(10_000)).await;
        assert_eq!(refresher.calls(), (1, 1));
        assert_eq!(auth_failures.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_auth_failure_after_transient_cycles() {
        let store = ready_store(1000);
        let refresher = Arc::new(FakeRefresher::default().with_folder_results(vec![
            Ok(()),
            Err(anyhow::anyhow!("timeout")),
            auth_error(),
        ]));
        let (handler, auth_failures) = counting_handler();
        let mut sync = SyncLoop::new(store, refresher.clone(), handler);

        assert!(sync.start());
        assert_eq!(sync.wait().await, Some(LoopExit::AuthFailure));
        assert_eq!(refresher.calls(), (3, 3));
        assert_eq!(auth_failures.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_dispose_cancels_pending_cycle() {
        let store = ready_store(1000);
        let refresher = Arc::new(FakeRefresher::default());
        let (handler, _) = counting_handler();
        let mut sync = SyncLoop::new(store, refresher.clone(), handler);

        assert!(sync.start());
        sleep(Duration::from_millis(100)).await;
        assert_eq!(refresher.calls(), (1, 1));

        sync.dispose();
        sync.dispose();
        assert!(sync.is_disposed());

        sleep(Duration::from_millis(5000)).await;
        assert_eq!(refresher.calls(), (1, 1));
        assert_eq!(sync.wait().await, Some(LoopExit::Stopped));
    }

    #[tokio::test(start_paused = true)]
    async fn test_dispose_during_cycle_discards_results() {
        let store = ready_store(1000);
        let refresher = Arc::new(
            FakeRefresher::default()
                .with_delays(500, 500)
                .with_folder_results(vec![auth_error()]),
        );
        let (handler, auth_failures) = counting_handler();
        let mut sync = SyncLoop::new(store, refresher.clone(), handler);

        assert!(sync.start());
        sleep(Duration::from_millis(100)).await;
        sync.dispose();

        assert_eq!(sync.wait().await, Some(LoopExit::Stopped));
        assert_eq!(auth_failures.load(Ordering::SeqCst), 0);
        assert_eq!(refresher.calls(), (1, 1));
    }

    #[tokio::test(start_paused = true)]
    async fn test_disposed_loop_never_starts() {
        let store = ready_store(1000);
        let refresher = Arc::new(FakeRefresher::default());
        let (handler, _) = counting_handler();
        let mut sync = SyncLoop::new(store, refresher.clone(), handler);

        sync.dispose();
        assert!(!sync.start());
        sleep(Duration::from_millis(10)).await;
        assert_eq!(refresher.calls(), (0, 0));
        assert_eq!(sync.wait().await, None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_interval_change_applies_to_next_schedule() {
        let store = ready_store(1000);
        let refresher = Arc::new(FakeRefresher::default());
        let (handler, _) = counting_handler();
        let mut sync = SyncLoop::new(store.clone(), refresher.clone(), handler);

        // Cycle 1 at t=0 schedules cycle 2 at t=1000 with the old interval
        assert!(sync.start());
        sleep(Duration::from_millis(10)).await;
        store.set_poll_interval(5000).unwrap();

        sleep(Duration::from_millis(1490)).await;
        assert_eq!(refresher.calls(), (2, 2));

        // Cycle 2 read the new interval: cycle 3 at t=6000
        sleep(Duration::from_millis(4000)).await;
        assert_eq!(refresher.calls(), (2, 2));
        sleep(Duration::from_millis(1000)).await;
        assert_eq!(refresher.calls(), (3, 3));
        sync.dispose();
    }

    #[tokio::test(start_paused = true)]
    async fn test_cycles_never_overlap() {
        let store = ready_store(100);
        let refresher = Arc::new(FakeRefresher::default().with_delays(300, 700));
        let (handler, _) = counting_handler();
        let mut sync = SyncLoop::new(store, refresher.clone(), handler);

        assert!(sync.start());
        sleep(Duration::from_millis(5000)).await;
        sync.dispose();

        let (folder_calls, message_calls) = refresher.calls();
        assert_eq!(folder_calls, message_calls);
        // Each cycle takes 700 ms of refresh plus 100 ms of delay
        assert_eq!(folder_calls, 7);
        assert!(!refresher.overlapped.load(Ordering::SeqCst));
    }

    #[tokio::test(start_paused = true)]
    async fn test_unknown_folder_resolves_to_empty_descriptor() {
        let store = ready_store(1000);
        store.select_folder(Some(FolderId::new("Archive")));
        let refresher = Arc::new(FakeRefresher::default());
        let (handler, _) = counting_handler();
        let mut sync = SyncLoop::new(store, refresher.clone(), handler);

        assert!(sync.start());
        sleep(Duration::from_millis(10)).await;

        let seen = refresher.folders_seen.lock().unwrap().clone();
        assert_eq!(seen.len(), 1);
        assert!(seen[0].is_empty());
        sync.dispose();
    }

    #[tokio::test(start_paused = true)]
    async fn test_cleared_selection_keeps_polling_with_empty_folder() {
        // Readiness is only checked at start; later cycles degrade instead
        let store = ready_store(1000);
        let refresher = Arc::new(FakeRefresher::default());
        let (handler, _) = counting_handler();
        let mut sync = SyncLoop::new(store.clone(), refresher.clone(), handler);

        assert!(sync.start());
        sleep(Duration::from_millis(10)).await;
        store.select_folder(None);
        sleep(Duration::from_millis(1000)).await;

        let seen = refresher.folders_seen.lock().unwrap().clone();
        assert_eq!(seen.len(), 2);
        assert_eq!(seen[0].id.as_str(), FolderId::INBOX);
        assert!(seen[1].is_empty());
        sync.dispose();
    }

    #[test]
    fn test_start_outside_runtime_is_refused() {
        let store = ready_store(1000);
        let refresher = Arc::new(FakeRefresher::default());
        let (handler, _) = counting_handler();
        let mut sync = SyncLoop::new(store, refresher, handler);

        assert!(!sync.start());
        assert!(!sync.is_started());
        assert!(!sync.is_finished());
    }
}
