//! Diagnostic log file setup.

use std::sync::Mutex;

use camino::{Utf8Path, Utf8PathBuf};
use tracing_subscriber::EnvFilter;

use crate::CliError;

/// File name of the diagnostic log inside the output directory.
pub(crate) const LOG_FILE_NAME: &str = "logging.log";

const DEFAULT_FILTER: &str = "info";

/// Truncate `{output_dir}/logging.log` and route every `log` record into it.
///
/// The level defaults to `info` and can be overridden through `RUST_LOG`.
pub(crate) fn install_log_file(output_dir: &Utf8Path) -> Result<Utf8PathBuf, CliError> {
    let path = output_dir.join(LOG_FILE_NAME);
    let file = itinerari_fs::create_truncated(&path).map_err(|err| CliError::LogSetup {
        path: path.clone(),
        reason: err.to_string(),
    })?;
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file.into_std()))
        .with_ansi(false)
        .try_init()
        .map_err(|err| CliError::LogSetup {
            path: path.clone(),
            reason: err.to_string(),
        })?;
    Ok(path)
}
