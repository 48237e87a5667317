//! Logging bootstrap. Diagnostics go to stderr so they never mix with command
//! output; initialization happens at most once and never aborts the CLI.

use flexi_logger::{Logger, LoggerHandle};
use log::debug;
use std::sync::OnceLock;

static LOGGER: OnceLock<LoggerHandle> = OnceLock::new();

/// Start the stderr logger at `level` (a `log` spec such as `warn` or
/// `quote_keeper=debug`). Returns an error string when the spec is invalid
/// or the backend refuses to start; later calls are no-ops.
pub fn init_logging(level: &str) -> Result<(), String> {
    if LOGGER.get().is_some() {
        return Ok(());
    }
    let handle = Logger::try_with_str(level)
        .map_err(|err| format!("invalid log level `{level}`: {err}"))?
        .log_to_stderr()
        .start()
        .map_err(|err| format!("failed to start logger: {err}"))?;
    let _ = LOGGER.set(handle);
    debug!(
        "event=app_start version={} level={level}",
        env!("CARGO_PKG_VERSION")
    );
    Ok(())
}
