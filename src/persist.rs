//! Persistence adapter between the quote collection and a `KeyValueStore`.
//!
//! Loading never fails: absent or corrupt data is replaced by the default set,
//! which is written back immediately. An unreadable store gets the defaults in
//! memory only. Saving reports failures to the caller so
//! it can tell the user while keeping the in-memory state.

use crate::categories::CategoryFilter;
use crate::error::StorageError;
use crate::quote::{Quote, default_quotes, sanitize_values};
use crate::store::{FILTER_KEY, KeyValueStore, LAST_VIEWED_KEY, QUOTES_KEY, Scope};
use log::{debug, error, warn};
use serde_json::Value;

/// Load the collection, self-healing to the defaults when needed. A store
/// that cannot be read yields the defaults in memory only; nothing is written
/// so the stored collection survives a transient read failure.
pub fn load_quotes<S: KeyValueStore + ?Sized>(store: &mut S) -> Vec<Quote> {
    try_load_quotes(store).unwrap_or_else(|e| {
        error!("event=quotes_load status=unreadable error={e} action=defaults_in_memory");
        default_quotes()
    })
}

/// Like `load_quotes`, but a read failure is returned instead of papered over.
/// Missing, corrupt and empty data still self-heal.
pub fn try_load_quotes<S: KeyValueStore + ?Sized>(
    store: &mut S,
) -> Result<Vec<Quote>, StorageError> {
    match read_stored(store) {
        Ok(Some(quotes)) if !quotes.is_empty() => {
            debug!("event=quotes_loaded count={}", quotes.len());
            Ok(quotes)
        }
        Ok(Some(_)) => {
            warn!("event=quotes_load status=empty action=seed_defaults");
            Ok(seed_defaults(store))
        }
        Ok(None) => {
            debug!("event=quotes_load status=missing action=seed_defaults");
            Ok(seed_defaults(store))
        }
        Err(LoadError::Corrupt(reason)) => {
            warn!("event=quotes_load status=corrupt reason={reason} action=seed_defaults");
            Ok(seed_defaults(store))
        }
        Err(LoadError::Unreadable(e)) => Err(e),
    }
}

enum LoadError {
    Unreadable(StorageError),
    Corrupt(String),
}

fn read_stored<S: KeyValueStore + ?Sized>(
    store: &S,
) -> Result<Option<Vec<Quote>>, LoadError> {
    let Some(raw) = store.get(Scope::Local, QUOTES_KEY).map_err(LoadError::Unreadable)?
    else {
        return Ok(None);
    };
    let parsed: Value =
        serde_json::from_str(&raw).map_err(|e| LoadError::Corrupt(e.to_string()))?;
    match parsed {
        Value::Array(items) => Ok(Some(sanitize_values(&items))),
        _ => Err(LoadError::Corrupt("stored data is not an array".to_string())),
    }
}

fn seed_defaults<S: KeyValueStore + ?Sized>(store: &mut S) -> Vec<Quote> {
    let defaults = default_quotes();
    if let Err(e) = save_quotes(store, &defaults) {
        error!("event=quotes_seed status=failed error={e}");
    }
    defaults
}

pub fn save_quotes<S: KeyValueStore + ?Sized>(
    store: &mut S,
    quotes: &[Quote],
) -> Result<(), StorageError> {
    let raw = serde_json::to_string(quotes)?;
    store.set(Scope::Local, QUOTES_KEY, &raw)
}

/// Remove the stored collection entirely.
pub fn clear_quotes<S: KeyValueStore + ?Sized>(
    store: &mut S,
) -> Result<(), StorageError> {
    store.remove(Scope::Local, QUOTES_KEY)
}

pub fn load_last_viewed<S: KeyValueStore + ?Sized>(store: &S) -> Option<usize> {
    store
        .get(Scope::Session, LAST_VIEWED_KEY)
        .ok()
        .flatten()
        .and_then(|raw| raw.trim().parse::<usize>().ok())
}

pub fn save_last_viewed<S: KeyValueStore + ?Sized>(
    store: &mut S,
    index: Option<usize>,
) -> Result<(), StorageError> {
    match index {
        Some(idx) => store.set(Scope::Session, LAST_VIEWED_KEY, &idx.to_string()),
        None => store.remove(Scope::Session, LAST_VIEWED_KEY),
    }
}

pub fn load_filter<S: KeyValueStore + ?Sized>(store: &S) -> CategoryFilter {
    store
        .get(Scope::Local, FILTER_KEY)
        .ok()
        .flatten()
        .and_then(|raw| serde_json::from_str::<String>(&raw).ok())
        .map(|s| CategoryFilter::parse(&s))
        .unwrap_or_default()
}

pub fn save_filter<S: KeyValueStore + ?Sized>(
    store: &mut S,
    filter: &CategoryFilter,
) -> Result<(), StorageError> {
    let raw = serde_json::to_string(filter.as_str())?;
    store.set(Scope::Local, FILTER_KEY, &raw)
}
