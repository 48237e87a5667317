//! Local-first synchronization with a remote quote source.

pub mod engine;
pub mod merge;
pub mod remote;
pub mod scheduler;

pub use engine::{SyncEngine, SyncReport, SyncState};
pub use merge::{DedupKey, merge};
pub use remote::{FileSource, HttpSource, PostAck, RemoteItem, RemoteSource, source_for};
pub use scheduler::{IntervalTicker, ManualTicker, SchedulerHandle, SyncScheduler, Ticker};
