use super::merge::{DedupKey, merge};
use super::remote::{PostAck, RemoteSource};
use crate::error::{QuoteError, SyncError};
use crate::quote::Quote;
use crate::session::Session;
use crate::store::KeyValueStore;
use log::{debug, info, warn};
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

pub const DEFAULT_SYNC_LIMIT: usize = 5;
pub const DEFAULT_SYNC_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncState {
    Idle,
    Fetching,
    Merging,
    Persisted,
}

/// Result of one successful sync run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyncReport {
    pub fetched: usize,
    pub before: usize,
    pub after: usize,
}

impl SyncReport {
    /// A notification is only warranted when the collection size moved.
    pub fn changed(&self) -> bool {
        self.before != self.after
    }

    pub fn notice(&self) -> Option<String> {
        if !self.changed() {
            return None;
        }
        let added = self.after.saturating_sub(self.before);
        Some(format!(
            "Quotes synced with server ({added} new, {} total).",
            self.after
        ))
    }
}

pub struct SyncEngine {
    source: Box<dyn RemoteSource>,
    limit: usize,
    timeout: Duration,
    key: DedupKey,
    busy: AtomicBool,
    state: Mutex<SyncState>,
}

/// Holds the busy flag for the duration of a run and returns the engine to
/// `Idle` however the run ends.
struct RunGuard<'a> {
    engine: &'a SyncEngine,
}

impl<'a> RunGuard<'a> {
    fn acquire(engine: &'a SyncEngine) -> Option<Self> {
        engine
            .busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self { engine })
    }
}

impl Drop for RunGuard<'_> {
    fn drop(&mut self) {
        self.engine.set_state(SyncState::Idle);
        self.engine.busy.store(false, Ordering::Release);
    }
}

impl SyncEngine {
    pub fn new(source: Box<dyn RemoteSource>) -> Self {
        Self {
            source,
            limit: DEFAULT_SYNC_LIMIT,
            timeout: DEFAULT_SYNC_TIMEOUT,
            key: DedupKey::default(),
            busy: AtomicBool::new(false),
            state: Mutex::new(SyncState::Idle),
        }
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_key(mut self, key: DedupKey) -> Self {
        self.key = key;
        self
    }

    pub fn state(&self) -> SyncState {
        *self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }

    fn set_state(&self, next: SyncState) {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        debug!("event=sync_state from={:?} to={next:?}", *state);
        *state = next;
    }

    /// Fetch and map remote items without touching any local state.
    pub async fn fetch(&self) -> Result<Vec<Quote>, SyncError> {
        let items = tokio::time::timeout(
            self.timeout,
            self.source.fetch_recent(self.limit),
        )
        .await
        .map_err(|_| SyncError::Timeout(self.timeout))??;
        Ok(items
            .iter()
            .take(self.limit)
            .filter_map(|item| item.to_quote())
            .collect())
    }

    /// One full run: fetch, reload, merge, persist. The collection is re-read
    /// from the store before merging so records written by other processes
    /// are kept. Nothing is applied unless the fetch succeeds; overlapping
    /// runs are rejected as busy.
    pub async fn sync<S: KeyValueStore>(
        &self,
        session: &mut Session<S>,
    ) -> Result<SyncReport, SyncError> {
        let _guard = RunGuard::acquire(self).ok_or(SyncError::Busy)?;

        self.set_state(SyncState::Fetching);
        let incoming = self.fetch().await.inspect_err(|e| {
            warn!(
                "event=sync status=failed source={} error={e}",
                self.source.describe()
            );
        })?;

        self.set_state(SyncState::Merging);
        match session.reload() {
            Ok(()) => {}
            Err(QuoteError::Storage(e)) => return Err(SyncError::Storage(e)),
            Err(QuoteError::Validation(m)) => return Err(SyncError::Payload(m)),
        }
        let before = session.quotes().len();
        let merged = merge(session.quotes(), &incoming, self.key);
        let report =
            SyncReport { fetched: incoming.len(), before, after: merged.len() };

        match session.replace_all(merged) {
            Ok(()) => {}
            Err(QuoteError::Storage(e)) => return Err(SyncError::Storage(e)),
            Err(QuoteError::Validation(m)) => return Err(SyncError::Payload(m)),
        }
        self.set_state(SyncState::Persisted);
        info!(
            "event=sync status=ok fetched={} before={} after={}",
            report.fetched, report.before, report.after
        );
        Ok(report)
    }

    /// Send a locally added quote to the remote source.
    pub async fn push(&self, quote: &Quote) -> Result<PostAck, SyncError> {
        tokio::time::timeout(self.timeout, self.source.post_new(quote))
            .await
            .map_err(|_| SyncError::Timeout(self.timeout))?
    }
}
