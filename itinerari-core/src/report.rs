//! Per-route comparison report.
//!
//! Every XML route yields exactly one report block:
//!
//! ```text
//! • Itinerario {name}
//!     Stato: OK | MANCANTE (...) | DIFFERENZE
//!     Dettagli:
//!       - {difference}
//!
//! ```
//!
//! The `Dettagli` lines only appear for routes with differences.

use std::io;

use thiserror::Error;

use crate::RouteRecord;
use crate::diagnostics::DiagnosticLog;
use crate::difference::{CircuitPolicy, Difference, classify};
use crate::matcher::RouteIndex;
use crate::normalise::Side;

pub(crate) const STATUS_OK: &str = "    Stato: OK";
pub(crate) const STATUS_MISSING: &str = "    Stato: MANCANTE (presente in XML ma assente nel DB)";
pub(crate) const STATUS_DIFFERENT: &str = "    Stato: DIFFERENZE";
pub(crate) const DETAILS: &str = "    Dettagli:";

/// Errors raised while appending to the report.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ReportError {
    /// The report destination could not be created.
    #[error("failed to create report at {path}: {source}")]
    Create {
        /// Destination path.
        path: String,
        /// Underlying I/O failure.
        #[source]
        source: io::Error,
    },
    /// Appending a line failed.
    #[error("failed to append to the report: {source}")]
    Write {
        /// Underlying I/O failure.
        #[source]
        source: io::Error,
    },
}

/// Append-only destination for report lines.
///
/// Lines are written in call order; implementations must not reorder or
/// batch them.
pub trait ReportSink {
    /// Append one line (without its terminator).
    fn append(&mut self, line: &str) -> Result<(), ReportError>;
}

impl<S: ReportSink + ?Sized> ReportSink for &mut S {
    fn append(&mut self, line: &str) -> Result<(), ReportError> {
        (**self).append(line)
    }
}

/// In-memory [`ReportSink`] collecting lines.
///
/// # Examples
///
/// ```
/// use itinerari_core::{MemorySink, ReportSink, write_summary};
///
/// let mut sink = MemorySink::default();
/// write_summary(3, 1, &mut sink)?;
/// assert_eq!(sink.lines(), [" - OK: 3", " - Con differenze: 1"]);
/// # Ok::<(), itinerari_core::ReportError>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    lines: Vec<String>,
}

impl MemorySink {
    /// Lines appended so far.
    #[must_use]
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// Consume the sink, returning its lines.
    #[must_use]
    pub fn into_lines(self) -> Vec<String> {
        self.lines
    }
}

impl ReportSink for MemorySink {
    fn append(&mut self, line: &str) -> Result<(), ReportError> {
        self.lines.push(line.to_owned());
        Ok(())
    }
}

/// Classification of one XML route.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteStatus {
    /// Matched and equivalent.
    Ok,
    /// Present in XML, absent from the database.
    Missing,
    /// Matched with one or more differences.
    Different,
}

/// Result of comparing one XML route.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComparisonOutcome {
    /// Name of the XML route.
    pub route_name: String,
    /// Classification.
    pub status: RouteStatus,
    /// Differences in report order; empty unless `status` is `Different`.
    pub differences: Vec<Difference>,
}

/// Counters accumulated over one run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RunSummary {
    /// Matched routes without differences.
    pub ok_count: usize,
    /// Matched routes with at least one difference.
    pub different_count: usize,
    /// XML routes absent from the database.
    pub missing_count: usize,
}

impl RunSummary {
    /// Number of XML routes classified.
    #[must_use]
    pub const fn total(&self) -> usize {
        self.ok_count + self.different_count + self.missing_count
    }

    const fn record(&mut self, status: RouteStatus) {
        match status {
            RouteStatus::Ok => self.ok_count += 1,
            RouteStatus::Missing => self.missing_count += 1,
            RouteStatus::Different => self.different_count += 1,
        }
    }
}

/// Outcomes and counters of a comparison pass.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ComparisonRun {
    /// One outcome per distinct XML route, in XML order.
    pub outcomes: Vec<ComparisonOutcome>,
    /// Aggregated counters.
    pub summary: RunSummary,
}

/// Compare every XML route against the database routes and report each one.
///
/// Routes absent from the database are reported as missing and logged as
/// warnings. Each difference is logged at error level. Repeated names in
/// either list collapse to their last record; every collapse is logged as a
/// warning.
///
/// # Errors
/// Returns [`ReportError`] when the sink rejects a line. Lines appended
/// before the failure stay in the sink.
pub fn compare_routes(
    xml_routes: &[RouteRecord],
    db_routes: &[RouteRecord],
    policy: CircuitPolicy,
    sink: &mut dyn ReportSink,
    log: &dyn DiagnosticLog,
) -> Result<ComparisonRun, ReportError> {
    let xml_index = RouteIndex::build(xml_routes);
    let db_index = RouteIndex::build(db_routes);
    log_duplicates(&xml_index, Side::Xml, log);
    log_duplicates(&db_index, Side::Db, log);

    let mut run = ComparisonRun::default();
    for xml_route in xml_index.iter() {
        let outcome = match db_index.get(&xml_route.name) {
            Some(db_route) => {
                let differences = classify(xml_route, db_route, policy);
                let status = if differences.is_empty() {
                    RouteStatus::Ok
                } else {
                    RouteStatus::Different
                };
                ComparisonOutcome {
                    route_name: xml_route.name.clone(),
                    status,
                    differences,
                }
            }
            None => ComparisonOutcome {
                route_name: xml_route.name.clone(),
                status: RouteStatus::Missing,
                differences: Vec::new(),
            },
        };
        write_outcome(&outcome, sink, log)?;
        run.summary.record(outcome.status);
        run.outcomes.push(outcome);
    }
    Ok(run)
}

/// Compare and report, returning `(ok_count, different_count)`.
///
/// Missing routes increment neither counter.
///
/// # Errors
/// Returns [`ReportError`] when the sink rejects a line.
///
/// # Examples
///
/// ```
/// use itinerari_core::{
///     CircuitPolicy, MemorySink, RecordingLog, RouteId, RouteRecord, compare_data,
/// };
///
/// let xml = vec![RouteRecord::new("R1", RouteId::Text("164".into())).with_circuits(["A", "B"])];
/// let db = vec![RouteRecord::new("R1", RouteId::Integer(1)).with_circuits(["A", "B"])];
/// let mut sink = MemorySink::default();
///
/// let counts = compare_data(&xml, &db, CircuitPolicy::Set, &mut sink, &RecordingLog::default())?;
/// assert_eq!(counts, (1, 0));
/// assert_eq!(sink.lines(), ["• Itinerario R1", "    Stato: OK", ""]);
/// # Ok::<(), itinerari_core::ReportError>(())
/// ```
pub fn compare_data(
    xml_routes: &[RouteRecord],
    db_routes: &[RouteRecord],
    policy: CircuitPolicy,
    sink: &mut dyn ReportSink,
    log: &dyn DiagnosticLog,
) -> Result<(usize, usize), ReportError> {
    let run = compare_routes(xml_routes, db_routes, policy, sink, log)?;
    Ok((run.summary.ok_count, run.summary.different_count))
}

/// Write the summary counters.
///
/// # Errors
/// Returns [`ReportError`] when the sink rejects a line.
pub fn write_summary(
    ok_count: usize,
    different_count: usize,
    sink: &mut dyn ReportSink,
) -> Result<(), ReportError> {
    sink.append(&format!(" - OK: {ok_count}"))?;
    sink.append(&format!(" - Con differenze: {different_count}"))
}

fn write_outcome(
    outcome: &ComparisonOutcome,
    sink: &mut dyn ReportSink,
    log: &dyn DiagnosticLog,
) -> Result<(), ReportError> {
    let name = outcome.route_name.as_str();
    sink.append(&format!("• Itinerario {name}"))?;
    match outcome.status {
        RouteStatus::Ok => sink.append(STATUS_OK)?,
        RouteStatus::Missing => {
            sink.append(STATUS_MISSING)?;
            log.warning(&format!(
                "Itinerario '{name}' presente in XML ma assente nel DB."
            ));
        }
        RouteStatus::Different => {
            sink.append(STATUS_DIFFERENT)?;
            sink.append(DETAILS)?;
            for difference in &outcome.differences {
                sink.append(&format!("      - {difference}"))?;
                log.error(&format!("DIFF. Itinerario '{name}': {difference}"));
            }
        }
    }
    sink.append("")
}

fn log_duplicates(index: &RouteIndex<'_>, side: Side, log: &dyn DiagnosticLog) {
    for name in index.duplicates() {
        log.warning(&format!(
            "Itinerario '{name}' duplicato nel {side}: viene mantenuta l'ultima occorrenza."
        ));
    }
}
