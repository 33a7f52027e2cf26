//! `compare` command: audit the XML export against the database.

use std::io::Write;

use camino::{Utf8Path, Utf8PathBuf};
use clap::Parser;
use itinerari_core::{
    CircuitPolicy, DEFAULT_EXPECTED_ROUTES, DiagnosticLog, LogFacade, ReconcileError,
    ReconcileSettings, RouteRecord, RunSummary, Side, reconcile,
};
use itinerari_data::{DEFAULT_PLANT_ID, DbExtractor, ReportFile, XmlExtractor};
use itinerari_fs::PathKind;
use ortho_config::{OrthoConfig, SubcmdConfigMerge};
use serde::{Deserialize, Serialize};

use crate::logging::install_log_file;
use crate::picker::{PathPicker, PromptPicker};
use crate::{
    ARG_DATABASE, ARG_OUTPUT_DIR, ARG_XML, CliError, ENV_OUTPUT_DIR, ENV_XML,
};

/// Database used when none is configured.
pub(crate) const DEFAULT_DATABASE: &str = "itinerari.db";

pub(crate) const COMPLETION_MESSAGE: &str =
    "Tutte le operazioni sono state completate... Controllare Report e log per i dettagli.";

/// CLI arguments for the `compare` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(
    long_about = "Compare the routes of one plant in the XML export against \
                 the routes stored in the database. Report.txt and \
                 logging.log are written to the output directory. Paths can \
                 come from CLI flags, configuration files, or environment \
                 variables.",
    about = "Compare XML routes against the database"
)]
#[ortho_config(prefix = "ITINERARI")]
pub(crate) struct CompareArgs {
    /// Path to the XML export (e.g. `ITINERARI.xml`).
    #[arg(long = ARG_XML, value_name = "path")]
    #[serde(default)]
    pub(crate) xml: Option<Utf8PathBuf>,
    /// Path to the `SQLite` database (defaults to `itinerari.db`).
    #[arg(long = ARG_DATABASE, value_name = "path")]
    #[serde(default)]
    pub(crate) database: Option<Utf8PathBuf>,
    /// Directory receiving `Report.txt` and `logging.log`.
    #[arg(long = ARG_OUTPUT_DIR, value_name = "dir")]
    #[serde(default)]
    pub(crate) output_dir: Option<Utf8PathBuf>,
    /// Plant whose XML items are audited (defaults to 164).
    #[arg(long = "plant-id", value_name = "id")]
    #[serde(default)]
    pub(crate) plant_id: Option<String>,
    /// Number of routes the database should hold (defaults to 8).
    #[arg(long = "expected-routes", value_name = "count")]
    #[serde(default)]
    pub(crate) expected_routes: Option<usize>,
    /// Circuit comparison policy: `set` or `positional`.
    #[arg(long = "circuit-policy", value_name = "policy")]
    #[serde(default)]
    pub(crate) circuit_policy: Option<CircuitPolicy>,
    /// Prompt on stdin for the XML file and output directory when unset.
    #[arg(long)]
    #[serde(default)]
    pub(crate) interactive: bool,
}

impl CompareArgs {
    pub(crate) fn merged(self) -> Result<Self, CliError> {
        self.load_and_merge().map_err(CliError::Configuration)
    }

    /// Ask for the output directory and XML file when they are unset.
    pub(crate) fn fill_with(
        mut self,
        picker: &mut dyn PathPicker,
        initial: &Utf8Path,
    ) -> Result<Self, CliError> {
        if self.output_dir.is_none() {
            self.output_dir = Some(pick(ARG_OUTPUT_DIR, picker.pick_output_dir(initial))?);
        }
        if self.xml.is_none() {
            self.xml = Some(pick(ARG_XML, picker.pick_xml_file(initial))?);
        }
        Ok(self)
    }
}

fn pick(
    field: &'static str,
    answer: std::io::Result<Option<Utf8PathBuf>>,
) -> Result<Utf8PathBuf, CliError> {
    answer
        .map_err(|source| CliError::Prompt { field, source })?
        .ok_or(CliError::SelectionCancelled { field })
}

/// Resolved `compare` command configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct CompareConfig {
    /// XML export to audit.
    pub(crate) xml: Utf8PathBuf,
    /// Database to audit against.
    pub(crate) database: Utf8PathBuf,
    /// Directory receiving the report and log.
    pub(crate) output_dir: Utf8PathBuf,
    /// Plant whose XML items are kept.
    pub(crate) plant_id: String,
    /// Route count the completeness check expects.
    pub(crate) expected_routes: usize,
    /// Circuit comparison policy.
    pub(crate) circuit_policy: CircuitPolicy,
}

impl CompareConfig {
    /// The database is not checked here: an unreadable database is reported
    /// through the log and skips the comparison.
    pub(crate) fn validate_sources(&self) -> Result<(), CliError> {
        Self::require_existing(&self.xml, ARG_XML)?;
        match itinerari_fs::path_kind(&self.output_dir) {
            Ok(PathKind::Missing | PathKind::Directory) => Ok(()),
            Ok(PathKind::File | PathKind::Other) => Err(CliError::OutputDirectoryNotDirectory {
                path: self.output_dir.clone(),
            }),
            Err(source) => Err(CliError::InspectPath {
                field: ARG_OUTPUT_DIR,
                path: self.output_dir.clone(),
                source,
            }),
        }
    }

    fn require_existing(path: &Utf8Path, field: &'static str) -> Result<(), CliError> {
        match itinerari_fs::path_kind(path) {
            Ok(PathKind::File) => Ok(()),
            Ok(PathKind::Missing) => Err(CliError::MissingSourceFile {
                field,
                path: path.to_path_buf(),
            }),
            Ok(PathKind::Directory | PathKind::Other) => Err(CliError::SourcePathNotFile {
                field,
                path: path.to_path_buf(),
            }),
            Err(source) => Err(CliError::InspectPath {
                field,
                path: path.to_path_buf(),
                source,
            }),
        }
    }

    pub(crate) const fn settings(&self) -> ReconcileSettings {
        ReconcileSettings {
            policy: self.circuit_policy,
            expected_routes: self.expected_routes,
        }
    }
}

impl TryFrom<CompareArgs> for CompareConfig {
    type Error = CliError;

    fn try_from(args: CompareArgs) -> Result<Self, Self::Error> {
        let output_dir = args.output_dir.ok_or(CliError::MissingArgument {
            field: ARG_OUTPUT_DIR,
            env: ENV_OUTPUT_DIR,
        })?;
        let xml = args.xml.ok_or(CliError::MissingArgument {
            field: ARG_XML,
            env: ENV_XML,
        })?;
        Ok(Self {
            xml,
            database: args
                .database
                .unwrap_or_else(|| Utf8PathBuf::from(DEFAULT_DATABASE)),
            output_dir,
            plant_id: args
                .plant_id
                .unwrap_or_else(|| DEFAULT_PLANT_ID.to_owned()),
            expected_routes: args.expected_routes.unwrap_or(DEFAULT_EXPECTED_ROUTES),
            circuit_policy: args.circuit_policy.unwrap_or_default(),
        })
    }
}

/// Supplies the route lists of both sources.
pub(crate) trait RouteSources {
    /// Routes of the configured plant from the XML export.
    fn xml_routes(&self, config: &CompareConfig, log: &dyn DiagnosticLog) -> Vec<RouteRecord>;
    /// Routes stored in the database.
    fn db_routes(&self, config: &CompareConfig, log: &dyn DiagnosticLog) -> Vec<RouteRecord>;
}

/// Reads the XML export from disk and the database through `SQLite`.
///
/// Extraction failures are logged and yield an empty list.
pub(crate) struct FileSources;

impl RouteSources for FileSources {
    fn xml_routes(&self, config: &CompareConfig, log: &dyn DiagnosticLog) -> Vec<RouteRecord> {
        XmlExtractor::new(config.plant_id.as_str())
            .extract_file(&config.xml, log)
            .unwrap_or_else(|err| {
                log.error(&format!(
                    "Errore durante il caricamento del file XML: {err}"
                ));
                Vec::new()
            })
    }

    fn db_routes(&self, config: &CompareConfig, log: &dyn DiagnosticLog) -> Vec<RouteRecord> {
        DbExtractor::new(config.database.clone())
            .extract(log)
            .unwrap_or_else(|err| {
                log.error(&format!("Errore durante l'accesso al database: {err}"));
                Vec::new()
            })
    }
}

/// Outcome of a completed comparison.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct CompareOutcome {
    /// Counters of the run.
    pub(crate) summary: RunSummary,
    /// Location of the written report.
    pub(crate) report: Utf8PathBuf,
}

pub(super) fn run_compare(args: CompareArgs) -> Result<(), CliError> {
    let merged = args.merged()?;
    let filled = if merged.interactive {
        let initial = std::env::current_dir()
            .ok()
            .and_then(|dir| Utf8PathBuf::from_path_buf(dir).ok())
            .unwrap_or_else(|| Utf8PathBuf::from("."));
        let stdin = std::io::stdin().lock();
        let mut picker = PromptPicker::new(stdin, std::io::stdout());
        merged.fill_with(&mut picker, &initial)?
    } else {
        merged
    };
    let config = CompareConfig::try_from(filled)?;
    config.validate_sources()?;
    let log_path = install_log_file(&config.output_dir)?;
    log::debug!("logging to {log_path}; configuration: {config:?}");

    let mut stdout = std::io::stdout().lock();
    run_compare_with(&config, &FileSources, &LogFacade, &mut stdout).map(|_| ())
}

/// Run the comparison and print the completion message.
///
/// The completion message is printed even when the comparison could not run.
pub(super) fn run_compare_with(
    config: &CompareConfig,
    sources: &dyn RouteSources,
    log: &dyn DiagnosticLog,
    writer: &mut dyn Write,
) -> Result<CompareOutcome, CliError> {
    let outcome = execute_compare(config, sources, log);
    writeln!(writer, "{COMPLETION_MESSAGE}").map_err(CliError::WriteOutput)?;
    log.info(COMPLETION_MESSAGE);
    outcome
}

fn execute_compare(
    config: &CompareConfig,
    sources: &dyn RouteSources,
    log: &dyn DiagnosticLog,
) -> Result<CompareOutcome, CliError> {
    let mut report = ReportFile::create(&config.output_dir).inspect_err(|err| {
        log.error(&format!(
            "Errore durante la creazione del file Report.txt: {err}"
        ));
    })?;
    log.info(&format!(
        "File Report.txt creato con successo in: {}",
        report.path()
    ));

    let xml_routes = sources.xml_routes(config, log);
    log.info(&format!(
        "Trovati {} itinerari con plantId '{}' nel file XML.",
        xml_routes.len(),
        config.plant_id
    ));
    let db_routes = sources.db_routes(config, log);
    log.info(&format!("Trovati {} itinerari nel database.", db_routes.len()));

    match reconcile(&xml_routes, &db_routes, config.settings(), &mut report, log) {
        Ok(summary) => Ok(CompareOutcome {
            summary,
            report: report.path().to_path_buf(),
        }),
        Err(err) => {
            if let ReconcileError::UpstreamUnavailable { side } = &err {
                log.error(unavailable_message(*side));
            }
            Err(CliError::Reconcile(err))
        }
    }
}

const fn unavailable_message(side: Side) -> &'static str {
    match side {
        Side::Db => {
            "Il confronto non è stato eseguito a causa di errori di connessione al database."
        }
        Side::Xml => "Il confronto non è stato eseguito: nessun itinerario trovato nel file XML.",
    }
}

#[cfg(test)]
pub(crate) fn config_from_layers_for_test(
    layers: Vec<ortho_config::MergeLayer<'static>>,
) -> Result<CompareConfig, CliError> {
    let merged = CompareArgs::merge_from_layers(layers).map_err(CliError::from)?;
    CompareConfig::try_from(merged)
}
