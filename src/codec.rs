//! JSON export and lenient import of quote collections.

use crate::error::{ImportError, QuoteError};
use crate::quote::{Quote, sanitize_values};
use crate::session::Session;
use crate::store::KeyValueStore;
use chrono::NaiveDate;
use log::info;
use serde_json::Value;

/// How an accepted import is applied to the current collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportMode {
    Append,
    Replace,
}

#[derive(Debug, PartialEq, Eq)]
pub enum ImportOutcome {
    Applied { mode: ImportMode, count: usize },
    Rejected(ImportError),
}

/// Pretty-printed JSON array with two-space indentation.
pub fn export_json(quotes: &[Quote]) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(quotes)
}

pub fn export_file_name(date: NaiveDate) -> String {
    format!("quotes-{}.json", date.format("%Y-%m-%d"))
}

/// Parse an uploaded file into sanitized quotes.
pub fn parse_import(contents: &str) -> Result<Vec<Quote>, ImportError> {
    let parsed: Value = serde_json::from_str(contents)
        .map_err(|e| ImportError::InvalidJson(e.to_string()))?;
    let Value::Array(items) = parsed else {
        return Err(ImportError::NotAnArray);
    };
    let quotes = sanitize_values(&items);
    if quotes.is_empty() {
        return Err(ImportError::NoValidQuotes);
    }
    Ok(quotes)
}

/// Parse and apply an import. A rejected import leaves the session as it was;
/// a storage failure after applying is returned as an error.
pub fn apply_import<S: KeyValueStore>(
    session: &mut Session<S>,
    contents: &str,
    mode: ImportMode,
) -> Result<ImportOutcome, QuoteError> {
    let quotes = match parse_import(contents) {
        Ok(q) => q,
        Err(e) => return Ok(ImportOutcome::Rejected(e)),
    };
    let count = quotes.len();
    match mode {
        ImportMode::Append => session.append_all(quotes)?,
        ImportMode::Replace => session.replace_all(quotes)?,
    }
    info!("event=quotes_imported mode={mode:?} count={count}");
    Ok(ImportOutcome::Applied { mode, count })
}
