//! Behavioural tests for `reconcile`.

use std::cell::RefCell;
use std::fs;
use std::path::PathBuf;

use itinerari_core::{
    LogLevel, MemorySink, ReconcileError, ReconcileSettings, RecordingLog, RouteId, RouteRecord,
    RunSummary, Side, reconcile,
};
use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};

#[derive(Default)]
struct ReconcileWorld {
    xml: RefCell<Vec<RouteRecord>>,
    db: RefCell<Vec<RouteRecord>>,
    sink: RefCell<MemorySink>,
    log: RecordingLog,
    result: RefCell<Option<Result<RunSummary, ReconcileError>>>,
}

impl ReconcileWorld {
    fn lines(&self) -> Vec<String> {
        self.sink.borrow().lines().to_vec()
    }

    fn summary(&self) -> RunSummary {
        match self.result.borrow().as_ref() {
            Some(Ok(summary)) => *summary,
            Some(Err(err)) => panic!("reconciliation should succeed, got {err}"),
            None => panic!("reconciliation was not attempted"),
        }
    }
}

#[fixture]
fn world() -> ReconcileWorld {
    ReconcileWorld::default()
}

fn xml_route(name: &str, circuits: &[&str]) -> RouteRecord {
    RouteRecord::new(name, RouteId::Text("164".into())).with_circuits(circuits.iter().copied())
}

fn db_route(name: &str, id: i64, circuits: &[&str]) -> RouteRecord {
    RouteRecord::new(name, RouteId::Integer(id)).with_circuits(circuits.iter().copied())
}

#[given("XML and database routes that agree")]
fn matching_routes(world: &ReconcileWorld) {
    world
        .xml
        .replace(vec![xml_route("IT_1", &["TC_A", "TC_B"]), xml_route("IT_2", &["TC_C"])]);
    world
        .db
        .replace(vec![db_route("IT_2", 2, &["TC_C"]), db_route("IT_1", 1, &["TC_B", "TC_A"])]);
}

#[given("an XML route whose circuit is renamed in the database")]
fn renamed_circuit(world: &ReconcileWorld) {
    world
        .xml
        .replace(vec![xml_route("IT_OK", &["TC_A"]), xml_route("IT_DIFF", &["TC_B"])]);
    world
        .db
        .replace(vec![db_route("IT_OK", 1, &["TC_A"]), db_route("IT_DIFF", 2, &["TC_B2"])]);
}

#[given("a database route that is missing from XML")]
fn database_only_route(world: &ReconcileWorld) {
    world.xml.replace(vec![xml_route("IT_1", &["TC_A"])]);
    world
        .db
        .replace(vec![db_route("IT_1", 1, &["TC_A"]), db_route("IT_9", 9, &["TC_Z"])]);
}

#[given("XML routes and an empty database")]
fn empty_database(world: &ReconcileWorld) {
    world.xml.replace(vec![xml_route("IT_1", &["TC_A"])]);
    world.db.replace(Vec::new());
}

#[when("the routes are reconciled")]
fn run_reconcile(world: &ReconcileWorld) {
    let settings = ReconcileSettings {
        expected_routes: 2,
        ..ReconcileSettings::default()
    };
    let outcome = {
        let xml = world.xml.borrow();
        let db = world.db.borrow();
        let mut sink = world.sink.borrow_mut();
        reconcile(&xml, &db, settings, &mut *sink, &world.log)
    };
    world.result.replace(Some(outcome));
}

#[then("the summary counts {ok} OK and {different} different routes")]
fn summary_counts(world: &ReconcileWorld, ok: usize, different: usize) {
    let summary = world.summary();
    assert_eq!(summary.ok_count, ok);
    assert_eq!(summary.different_count, different);
    assert_eq!(summary.missing_count, 0);
}

#[then("the report contains no completeness findings")]
fn no_findings(world: &ReconcileWorld) {
    let lines = world.lines();
    let tail = lines
        .iter()
        .skip_while(|line| line.as_str() != "=== VERIFICHE AGGIUNTIVE ===")
        .skip(1)
        .collect::<Vec<_>>();
    assert_eq!(tail, vec![""], "unexpected findings: {tail:?}");
}

#[then("the report details the renamed circuit")]
fn renamed_circuit_details(world: &ReconcileWorld) {
    let lines = world.lines();
    let start = lines
        .iter()
        .position(|line| line == "• Itinerario IT_DIFF")
        .unwrap_or_else(|| panic!("missing block for IT_DIFF in {lines:?}"));
    let block: Vec<&str> = lines.iter().skip(start).take(6).map(String::as_str).collect();
    assert_eq!(
        block,
        vec![
            "• Itinerario IT_DIFF",
            "    Stato: DIFFERENZE",
            "    Dettagli:",
            "      - TrackCircuit TC_B non trovato nel DB.",
            "      - TrackCircuit TC_B2 non trovato nell'XML.",
            "",
        ]
    );
}

#[then("each difference is logged as an error")]
fn differences_logged(world: &ReconcileWorld) {
    assert_eq!(
        world.log.messages(LogLevel::Error),
        vec![
            "DIFF. Itinerario 'IT_DIFF': TrackCircuit TC_B non trovato nel DB.",
            "DIFF. Itinerario 'IT_DIFF': TrackCircuit TC_B2 non trovato nell'XML.",
        ]
    );
}

#[then("the report flags the database-only route")]
fn database_only_flagged(world: &ReconcileWorld) {
    let lines = world.lines();
    let expected = "  - [MANCANTE] Itinerario IT_9: presente nel DB ma assente nel XML.";
    assert!(
        lines.iter().any(|line| line == expected),
        "missing completeness line in {lines:?}"
    );
    assert_eq!(
        world.log.messages(LogLevel::Warning),
        vec!["Itinerario 'IT_9' presente nel DB ma assente nell'XML."]
    );
}

#[then("the report warns that the database has more routes")]
fn database_has_more(world: &ReconcileWorld) {
    let lines = world.lines();
    assert!(
        lines
            .iter()
            .any(|line| line == "  - [WARNING] Il DB ha più itinerari (2) del XML (1)!"),
        "missing count warning in {lines:?}"
    );
}

#[then("reconciliation fails because the database is unavailable")]
fn database_unavailable(world: &ReconcileWorld) {
    let borrowed = world.result.borrow();
    match borrowed.as_ref() {
        Some(Err(ReconcileError::UpstreamUnavailable { side })) => assert_eq!(*side, Side::Db),
        Some(Err(other)) => panic!("expected an unavailable source, got {other:?}"),
        Some(Ok(summary)) => panic!("expected a failure, got {summary:?}"),
        None => panic!("reconciliation was not attempted"),
    }
}

#[then("the report is empty")]
fn report_empty(world: &ReconcileWorld) {
    assert!(world.lines().is_empty());
}

#[test]
fn scenario_indices_follow_feature_order() {
    let feature =
        PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/features/reconcile.feature");
    let contents = fs::read_to_string(&feature).unwrap_or_else(|err| {
        panic!("failed to read feature file {feature:?}: {err}");
    });
    let titles: Vec<&str> = contents
        .lines()
        .filter_map(|line| line.trim().strip_prefix("Scenario: "))
        .collect();
    assert_eq!(
        titles,
        vec![
            "every route matches",
            "a route differs in one circuit",
            "the database holds routes absent from XML",
            "the database returned no routes",
        ]
    );
}

#[scenario(path = "tests/features/reconcile.feature", index = 0)]
fn every_route_matches(world: ReconcileWorld) {
    let _ = world;
}

#[scenario(path = "tests/features/reconcile.feature", index = 1)]
fn route_with_renamed_circuit(world: ReconcileWorld) {
    let _ = world;
}

#[scenario(path = "tests/features/reconcile.feature", index = 2)]
fn database_only_routes(world: ReconcileWorld) {
    let _ = world;
}

#[scenario(path = "tests/features/reconcile.feature", index = 3)]
fn unavailable_database(world: ReconcileWorld) {
    let _ = world;
}
