//! Periodic sync driver. Ticks come from an injectable `Ticker` so tests can
//! advance the schedule by hand; a handle allows on-demand runs and shutdown.

use super::engine::{SyncEngine, SyncReport};
use crate::error::SyncError;
use crate::session::Session;
use crate::store::KeyValueStore;
use async_trait::async_trait;
use log::{debug, warn};
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tokio::time::{Interval, MissedTickBehavior};

pub const DEFAULT_SYNC_INTERVAL: Duration = Duration::from_secs(10);

#[async_trait]
pub trait Ticker: Send {
    /// Wait for the next tick. `false` means the ticker is exhausted.
    async fn tick(&mut self) -> bool;
}

/// Wall-clock ticker. The first tick fires immediately.
pub struct IntervalTicker {
    interval: Interval,
}

impl IntervalTicker {
    pub fn every(period: Duration) -> Self {
        let mut interval = tokio::time::interval(period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        Self { interval }
    }
}

#[async_trait]
impl Ticker for IntervalTicker {
    async fn tick(&mut self) -> bool {
        self.interval.tick().await;
        true
    }
}

/// Ticks whenever the paired sender is used; exhausted once it is dropped.
pub struct ManualTicker {
    rx: mpsc::UnboundedReceiver<()>,
}

impl ManualTicker {
    pub fn new() -> (mpsc::UnboundedSender<()>, Self) {
        let (tx, rx) = mpsc::unbounded_channel();
        (tx, Self { rx })
    }
}

#[async_trait]
impl Ticker for ManualTicker {
    async fn tick(&mut self) -> bool {
        self.rx.recv().await.is_some()
    }
}

pub struct SchedulerHandle {
    trigger: mpsc::UnboundedSender<()>,
    shutdown: watch::Sender<bool>,
}

impl SchedulerHandle {
    /// Request an immediate run. Returns `false` once the scheduler is gone.
    pub fn sync_now(&self) -> bool {
        self.trigger.send(()).is_ok()
    }

    pub fn shutdown(&self) {
        let _ = self.shutdown.send(true);
    }
}

pub struct SyncScheduler<T: Ticker> {
    ticker: T,
    triggers: mpsc::UnboundedReceiver<()>,
    shutdown: watch::Receiver<bool>,
    max_runs: Option<usize>,
}

impl<T: Ticker> SyncScheduler<T> {
    pub fn new(ticker: T) -> (Self, SchedulerHandle) {
        let (trigger, triggers) = mpsc::unbounded_channel();
        let (shutdown_tx, shutdown) = watch::channel(false);
        (
            Self { ticker, triggers, shutdown, max_runs: None },
            SchedulerHandle { trigger, shutdown: shutdown_tx },
        )
    }

    /// Stop on its own after `runs` sync attempts.
    pub fn with_max_runs(mut self, runs: usize) -> Self {
        self.max_runs = Some(runs);
        self
    }

    /// Run until shutdown, ticker exhaustion or the run limit. Each tick or
    /// trigger performs one sync; failures are reported and the loop goes on.
    /// Returns the number of attempts made.
    pub async fn run<S, F>(
        mut self,
        engine: &SyncEngine,
        session: &mut Session<S>,
        mut on_result: F,
    ) -> usize
    where
        S: KeyValueStore,
        F: FnMut(&Result<SyncReport, SyncError>),
    {
        let mut runs = 0;
        loop {
            if self.max_runs.is_some_and(|max| runs >= max) || *self.shutdown.borrow() {
                break;
            }
            tokio::select! {
                biased;
                _ = self.shutdown.changed() => break,
                Some(()) = self.triggers.recv() => debug!("event=sync_trigger kind=manual"),
                more = self.ticker.tick() => {
                    if !more {
                        break;
                    }
                    debug!("event=sync_trigger kind=tick");
                }
            }
            let result = engine.sync(session).await;
            if let Err(e) = &result {
                warn!("event=sync_run status=failed run={} error={e}", runs + 1);
            }
            on_result(&result);
            runs += 1;
        }
        runs
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use crate::sync::remote::{RemoteItem, RemoteSource};
    use serde_json::json;

    struct OneTitle;

    #[async_trait]
    impl RemoteSource for OneTitle {
        async fn fetch_recent(&self, _limit: usize) -> Result<Vec<RemoteItem>, SyncError> {
            Ok(vec![serde_json::from_value(json!({"title": "remote"})).unwrap()])
        }

        fn describe(&self) -> String {
            "one".to_string()
        }
    }

    #[tokio::test]
    async fn test_manual_ticks_drive_runs_until_exhausted() {
        let engine = SyncEngine::new(Box::new(OneTitle));
        let mut session = Session::open(MemoryStore::new());
        let (tick, ticker) = ManualTicker::new();
        let (scheduler, _handle) = SyncScheduler::new(ticker);

        tick.send(()).unwrap();
        tick.send(()).unwrap();
        drop(tick);

        let mut changed = Vec::new();
        let runs = scheduler
            .run(&engine, &mut session, |r| {
                changed.push(r.as_ref().map(|rep| rep.changed()).unwrap_or(false))
            })
            .await;
        assert_eq!(runs, 2);
        assert_eq!(changed, vec![true, false]);
        assert_eq!(session.quotes().len(), 4);
    }

    #[tokio::test]
    async fn test_shutdown_stops_before_running() {
        let engine = SyncEngine::new(Box::new(OneTitle));
        let mut session = Session::open(MemoryStore::new());
        let (_tick, ticker) = ManualTicker::new();
        let (scheduler, handle) = SyncScheduler::new(ticker);
        handle.shutdown();
        let runs = scheduler.run(&engine, &mut session, |_| {}).await;
        assert_eq!(runs, 0);
        assert_eq!(session.quotes().len(), 3);
    }

    #[tokio::test]
    async fn test_on_demand_trigger_and_max_runs() {
        let engine = SyncEngine::new(Box::new(OneTitle));
        let mut session = Session::open(MemoryStore::new());
        let (_tick, ticker) = ManualTicker::new();
        let (scheduler, handle) = SyncScheduler::new(ticker);
        let scheduler = scheduler.with_max_runs(1);
        assert!(handle.sync_now());
        let runs = scheduler.run(&engine, &mut session, |_| {}).await;
        assert_eq!(runs, 1);
        assert_eq!(session.quotes().len(), 4);
    }

    #[tokio::test]
    async fn test_interval_ticker_fires_first_tick_immediately() {
        let mut ticker = IntervalTicker::every(Duration::from_secs(3600));
        assert!(ticker.tick().await);
    }
}
