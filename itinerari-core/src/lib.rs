//! Reconciliation engine for railway interlocking routes ("itinerari").
//!
//! Responsibilities:
//! - Normalise route records read from the plant XML export and the
//!   database into comparable values.
//! - Match routes by name and classify their differences.
//! - Emit the per-route report, the summary and the completeness checks.
//!
//! Boundaries:
//! - No I/O: report lines go to a [`ReportSink`] and diagnostics to a
//!   [`DiagnosticLog`]; both are supplied by the caller.
//! - Extraction from XML and databases lives in `itinerari-data`.
//!
//! Invariants:
//! - Every distinct XML route yields exactly one report block.
//! - `ok + different + missing` equals the number of distinct XML names.

#![forbid(unsafe_code)]

mod completeness;
mod diagnostics;
mod difference;
mod matcher;
mod normalise;
mod report;
mod route;

pub use completeness::check_completeness;
pub use diagnostics::{
    DEFAULT_TARGET, DiagnosticLog, ERROR_TARGET, LogFacade, LogLevel, RecordingLog,
};
pub use difference::{CircuitPolicy, Difference, ParseCircuitPolicyError, classify};
pub use matcher::RouteIndex;
pub use normalise::{
    Side, SwitchField, SwitchTriple, circuit_name, circuit_names, normalise_field, switch_triple,
};
pub use report::{
    ComparisonOutcome, ComparisonRun, MemorySink, ReportError, ReportSink, RouteStatus,
    RunSummary, compare_data, compare_routes, write_summary,
};
pub use route::{
    CircuitEntry, FieldValue, RouteId, RouteRecord, SWITCH_MOTOR_ID, SWITCH_MOTOR_NAME,
    SWITCH_MOTOR_STATE, SwitchContainer,
};

use thiserror::Error;

/// Number of routes the database is expected to hold for one plant.
pub const DEFAULT_EXPECTED_ROUTES: usize = 8;

/// Tunables for [`reconcile`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReconcileSettings {
    /// How circuit lists are compared.
    pub policy: CircuitPolicy,
    /// Route count the completeness check expects in the database.
    pub expected_routes: usize,
}

impl Default for ReconcileSettings {
    fn default() -> Self {
        Self {
            policy: CircuitPolicy::default(),
            expected_routes: DEFAULT_EXPECTED_ROUTES,
        }
    }
}

/// Errors returned by [`reconcile`].
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ReconcileError {
    /// One source produced no routes, so no comparison was attempted.
    #[error("no routes available from the {side} source")]
    UpstreamUnavailable {
        /// The empty source.
        side: Side,
    },
    /// The report sink failed.
    #[error(transparent)]
    Report(#[from] ReportError),
}

/// Run the full reconciliation: comparison, summary and completeness check.
///
/// The report receives, in order, the `CONFRONTO ITINERARI` section with one
/// block per XML route, the `RIEPILOGO ITINERARI` counters and the
/// `VERIFICHE AGGIUNTIVE` section.
///
/// # Errors
/// Returns [`ReconcileError::UpstreamUnavailable`] before writing anything
/// when either list is empty, and [`ReconcileError::Report`] when the sink
/// fails.
///
/// # Examples
///
/// ```
/// use itinerari_core::{
///     MemorySink, ReconcileError, ReconcileSettings, RecordingLog, RouteId, RouteRecord, Side,
///     reconcile,
/// };
///
/// let xml = vec![RouteRecord::new("R1", RouteId::Text("164".into()))];
/// let mut sink = MemorySink::default();
///
/// let result = reconcile(&xml, &[], ReconcileSettings::default(), &mut sink, &RecordingLog::default());
/// assert!(matches!(result, Err(ReconcileError::UpstreamUnavailable { side: Side::Db })));
/// assert!(sink.lines().is_empty());
/// ```
pub fn reconcile(
    xml_routes: &[RouteRecord],
    db_routes: &[RouteRecord],
    settings: ReconcileSettings,
    sink: &mut dyn ReportSink,
    log: &dyn DiagnosticLog,
) -> Result<RunSummary, ReconcileError> {
    if db_routes.is_empty() {
        return Err(ReconcileError::UpstreamUnavailable { side: Side::Db });
    }
    if xml_routes.is_empty() {
        return Err(ReconcileError::UpstreamUnavailable { side: Side::Xml });
    }

    log.info("Inizio confronto tra XML e database...");
    sink.append("")?;
    sink.append("=== CONFRONTO ITINERARI ===")?;
    let run = compare_routes(xml_routes, db_routes, settings.policy, sink, log)?;

    sink.append("")?;
    sink.append("=== RIEPILOGO ITINERARI ===")?;
    write_summary(run.summary.ok_count, run.summary.different_count, sink)?;

    sink.append("")?;
    sink.append("=== VERIFICHE AGGIUNTIVE ===")?;
    check_completeness(xml_routes, db_routes, settings.expected_routes, sink, log)?;
    log.info("Confronto completato con successo.");
    Ok(run.summary)
}
