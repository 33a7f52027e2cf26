//! Error types emitted by the `itinerari` CLI.
//!
//! Keep this error type reasonably small, as many CLI helpers return
//! `Result<_, CliError>` and the workspace enables `clippy::result_large_err`.

use std::sync::Arc;

use camino::Utf8PathBuf;
use itinerari_core::{ReconcileError, ReportError};
use thiserror::Error;

/// Errors emitted by the `itinerari` CLI.
#[derive(Debug, Error)]
pub enum CliError {
    /// Provided arguments failed Clap validation.
    #[error(transparent)]
    ArgumentParsing(#[from] clap::Error),
    /// Configuration layering failed (files, env, CLI).
    #[error("failed to load configuration: {0}")]
    Configuration(#[from] Arc<ortho_config::OrthoError>),
    /// A required option is missing after configuration merging.
    #[error("missing {field} (set --{field} or {env})")]
    MissingArgument {
        /// Long flag of the missing option.
        field: &'static str,
        /// Environment variable that can supply it.
        env: &'static str,
    },
    /// The interactive prompt was answered with an empty line.
    #[error("no {field} selected")]
    SelectionCancelled {
        /// Long flag of the option being prompted for.
        field: &'static str,
    },
    /// The interactive prompt could not be read or written.
    #[error("failed to prompt for {field}: {source}")]
    Prompt {
        /// Long flag of the option being prompted for.
        field: &'static str,
        /// Underlying I/O failure.
        #[source]
        source: std::io::Error,
    },
    /// A referenced input path does not exist on disk.
    #[error("{field} path {path:?} does not exist")]
    MissingSourceFile {
        /// Long flag of the offending option.
        field: &'static str,
        /// Offending path.
        path: Utf8PathBuf,
    },
    /// A referenced input path exists but is not a file.
    #[error("{field} path {path:?} exists but is not a file")]
    SourcePathNotFile {
        /// Long flag of the offending option.
        field: &'static str,
        /// Offending path.
        path: Utf8PathBuf,
    },
    /// A referenced path could not be inspected due to an IO error.
    #[error("failed to inspect {field} path {path:?}: {source}")]
    InspectPath {
        /// Long flag of the offending option.
        field: &'static str,
        /// Offending path.
        path: Utf8PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: std::io::Error,
    },
    /// The output directory exists but is not a directory.
    #[error("output directory {path:?} is not a directory")]
    OutputDirectoryNotDirectory {
        /// Offending path.
        path: Utf8PathBuf,
    },
    /// The diagnostic log file could not be installed.
    #[error("failed to set up log file {path:?}: {reason}")]
    LogSetup {
        /// Log file path.
        path: Utf8PathBuf,
        /// Description of the failure.
        reason: String,
    },
    /// The report could not be created or written.
    #[error(transparent)]
    Report(#[from] ReportError),
    /// Reconciliation did not run or failed part way.
    #[error("comparison not performed: {0}")]
    Reconcile(#[source] ReconcileError),
    /// Writing the completion message failed.
    #[error("failed to write command output: {0}")]
    WriteOutput(#[source] std::io::Error),
}
