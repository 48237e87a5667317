use crate::sync::DedupKey;
use crate::sync::engine::{DEFAULT_SYNC_LIMIT, DEFAULT_SYNC_TIMEOUT};
use crate::sync::scheduler::DEFAULT_SYNC_INTERVAL;
use log::warn;
use std::env;
use std::io;
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_SYNC_URL: &str = "https://jsonplaceholder.typicode.com/posts";
pub const DEFAULT_LOG_LEVEL: &str = "warn";

/// Settings read once from the environment at startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub data_dir: PathBuf,
    pub sync_url: String,
    pub sync_limit: usize,
    pub sync_interval: Duration,
    pub sync_timeout: Duration,
    pub dedup_key: DedupKey,
    pub log_level: String,
    pub use_color: bool,
}

impl Config {
    pub fn from_env() -> io::Result<Self> {
        Ok(Self {
            data_dir: data_dir()?,
            sync_url: env::var("QUOTE_KEEPER_SYNC_URL")
                .unwrap_or_else(|_| DEFAULT_SYNC_URL.to_string()),
            sync_limit: env_parse("QUOTE_KEEPER_SYNC_LIMIT")
                .unwrap_or(DEFAULT_SYNC_LIMIT),
            sync_interval: env_parse("QUOTE_KEEPER_SYNC_INTERVAL_SECS")
                .map(Duration::from_secs)
                .unwrap_or(DEFAULT_SYNC_INTERVAL),
            sync_timeout: env_parse("QUOTE_KEEPER_SYNC_TIMEOUT_SECS")
                .map(Duration::from_secs)
                .unwrap_or(DEFAULT_SYNC_TIMEOUT),
            dedup_key: dedup_key_from(env::var("QUOTE_KEEPER_DEDUP_KEY").ok()),
            log_level: log_level(),
            use_color: env::var("NO_COLOR").is_err(),
        })
    }
}

/// Log level from `QUOTE_KEEPER_LOG`. Read on its own so logging can start
/// before the rest of the configuration is parsed.
pub fn log_level() -> String {
    env::var("QUOTE_KEEPER_LOG").unwrap_or_else(|_| DEFAULT_LOG_LEVEL.to_string())
}

fn dedup_key_from(raw: Option<String>) -> DedupKey {
    let Some(raw) = raw else {
        return DedupKey::default();
    };
    DedupKey::parse(&raw).unwrap_or_else(|| {
        let fallback = DedupKey::default();
        warn!(
            "event=config key=QUOTE_KEEPER_DEDUP_KEY status=invalid value={raw} \
             fallback={fallback:?}"
        );
        fallback
    })
}

pub fn data_dir() -> io::Result<PathBuf> {
    if let Ok(dir) = env::var("QUOTE_KEEPER_DIR") {
        return Ok(PathBuf::from(dir));
    }
    let home = env::var("HOME").map_err(|_| {
        io::Error::other("HOME not set; set QUOTE_KEEPER_DIR explicitly")
    })?;
    Ok(PathBuf::from(home).join(".quote_keeper"))
}

fn env_parse<T: std::str::FromStr>(name: &str) -> Option<T> {
    env::var(name).ok().and_then(|v| v.trim().parse().ok())
}
