//! Cross-source completeness checks run after the per-route comparison.

use crate::RouteRecord;
use crate::diagnostics::DiagnosticLog;
use crate::matcher::RouteIndex;
use crate::report::{ReportError, ReportSink};

/// Report database routes missing from XML and count anomalies.
///
/// Writes a blank separator line, then one `[MANCANTE]` line per database
/// route absent from XML (in database order), then the count comparisons
/// between the two sources and against `expected_routes`. Counts are the raw
/// list lengths, so duplicated names still count.
///
/// # Errors
/// Returns [`ReportError`] when the sink rejects a line.
///
/// # Examples
///
/// ```
/// use itinerari_core::{MemorySink, RecordingLog, RouteId, RouteRecord, check_completeness};
///
/// let xml = vec![RouteRecord::new("R1", RouteId::Text("164".into()))];
/// let db = vec![
///     RouteRecord::new("R1", RouteId::Integer(1)),
///     RouteRecord::new("R2", RouteId::Integer(2)),
/// ];
/// let mut sink = MemorySink::default();
///
/// check_completeness(&xml, &db, 2, &mut sink, &RecordingLog::default())?;
/// assert_eq!(
///     sink.lines(),
///     [
///         "",
///         "  - [MANCANTE] Itinerario R2: presente nel DB ma assente nel XML.",
///         "  - [WARNING] Il DB ha più itinerari (2) del XML (1)!",
///     ]
/// );
/// # Ok::<(), itinerari_core::ReportError>(())
/// ```
pub fn check_completeness(
    xml_routes: &[RouteRecord],
    db_routes: &[RouteRecord],
    expected_routes: usize,
    sink: &mut dyn ReportSink,
    log: &dyn DiagnosticLog,
) -> Result<(), ReportError> {
    let xml_index = RouteIndex::build(xml_routes);
    let db_index = RouteIndex::build(db_routes);

    sink.append("")?;
    for db_route in db_index.iter() {
        let name = db_route.name.as_str();
        if xml_index.contains(name) {
            continue;
        }
        sink.append(&format!(
            "  - [MANCANTE] Itinerario {name}: presente nel DB ma assente nel XML."
        ))?;
        log.warning(&format!(
            "Itinerario '{name}' presente nel DB ma assente nell'XML."
        ));
    }

    let xml_count = xml_routes.len();
    let db_count = db_routes.len();
    if db_count > xml_count {
        sink.append(&format!(
            "  - [WARNING] Il DB ha più itinerari ({db_count}) del XML ({xml_count})!"
        ))?;
    } else if xml_count > db_count {
        sink.append(&format!(
            "  - [ERRORE] XML ha più itinerari ({xml_count}) del DB ({db_count})!"
        ))?;
    }
    if db_count != expected_routes {
        sink.append(&format!(
            "  - [ANOMALIA] Numero itinerari trovati nel DB: {db_count}, aspettati: {expected_routes}"
        ))?;
    }
    Ok(())
}
