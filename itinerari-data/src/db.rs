//! Route extraction from the interlocking database.
//!
//! Three read-only queries load the routes, their blocking rows and the
//! switch positions along each route. The rows are merged into one
//! [`RouteRecord`] per route name.

use std::collections::{HashMap, HashSet};

use camino::{Utf8Path, Utf8PathBuf};
use itinerari_core::{
    CircuitEntry, DiagnosticLog, FieldValue, RouteId, RouteRecord, SwitchContainer,
};
use rusqlite::{Connection, OpenFlags, Row};
use thiserror::Error;

const ROUTES_QUERY: &str = "SELECT id_itine, nome FROM itinerari WHERE id_itine IS NOT NULL";
const BLOCKS_QUERY: &str = "SELECT id_itine, cdb, ente, id_ente FROM tc_bloccamenti_dv_itine";
const SWITCHES_QUERY: &str =
    "SELECT id_itine, id_cassa, nome, statocassa FROM tc_it_lib_dev_percorso";

/// Errors raised while extracting routes from the database.
#[derive(Debug, Error)]
pub enum DbExtractError {
    /// The database could not be opened.
    #[error("failed to open database at {path}: {source}")]
    Open {
        /// Database path.
        path: Utf8PathBuf,
        /// Underlying `SQLite` error.
        #[source]
        source: rusqlite::Error,
    },
    /// A query failed.
    #[error("database query failed ({operation}): {source}")]
    Query {
        /// Step that failed.
        operation: &'static str,
        /// Underlying `SQLite` error.
        #[source]
        source: rusqlite::Error,
    },
}

/// Map a `statocassa` symbol to its numeric state code.
///
/// `R` maps to 2 and `N` to 1; anything else has no state.
///
/// # Examples
///
/// ```
/// use itinerari_data::state_code;
///
/// assert_eq!(state_code(Some("R")), Some(2));
/// assert_eq!(state_code(Some(" N ")), Some(1));
/// assert_eq!(state_code(Some("X")), None);
/// ```
#[must_use]
pub fn state_code(symbol: Option<&str>) -> Option<i64> {
    match symbol.map(str::trim) {
        Some("R") => Some(2),
        Some("N") => Some(1),
        _ => None,
    }
}

/// Reads routes from a `SQLite` database file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DbExtractor {
    path: Utf8PathBuf,
}

impl DbExtractor {
    /// Extractor for the database at `path`.
    pub fn new(path: impl Into<Utf8PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Database location.
    #[must_use]
    pub fn path(&self) -> &Utf8Path {
        &self.path
    }

    /// Open the database read-only and extract every route.
    ///
    /// # Errors
    /// Returns [`DbExtractError::Open`] when the file cannot be opened and
    /// [`DbExtractError::Query`] when a query fails.
    pub fn extract(&self, log: &dyn DiagnosticLog) -> Result<Vec<RouteRecord>, DbExtractError> {
        log.info("Connessione al database in corso...");
        let connection = Connection::open_with_flags(
            self.path.as_std_path(),
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )
        .map_err(|source| DbExtractError::Open {
            path: self.path.clone(),
            source,
        })?;
        log.info("Connessione al database avvenuta con successo.");
        let routes = extract_routes(&connection, log);
        drop(connection);
        log.info("Connessione al database chiusa.");
        routes
    }
}

/// Extract every route through an open connection.
///
/// # Errors
/// Returns [`DbExtractError::Query`] when a query fails.
pub fn extract_routes(
    connection: &Connection,
    log: &dyn DiagnosticLog,
) -> Result<Vec<RouteRecord>, DbExtractError> {
    log.info("Recupero degli itinerari dal database...");
    let mut routes = load_routes(connection)?;
    log.info(&format!(
        "Operazione completata con successo. Sono stati caricati: {} itinerari.",
        routes.len()
    ));

    let blocks = load_blocks(connection)?;
    let switches = load_switches(connection)?;
    for route in &mut routes {
        merge_route(route, &blocks, &switches);
    }
    log.info("Recupero e merge dei dati completato con successo.");
    Ok(routes.into_iter().map(|route| route.record).collect())
}

struct DbRoute {
    id: i64,
    record: RouteRecord,
}

struct Block {
    cdb: String,
    ente: String,
    id_ente: Option<i64>,
}

struct SwitchRow {
    name: Option<String>,
    state: Option<i64>,
}

fn query_rows<T>(
    connection: &Connection,
    sql: &str,
    operation: &'static str,
    map: impl FnMut(&Row<'_>) -> rusqlite::Result<T>,
) -> Result<Vec<T>, DbExtractError> {
    let wrap = |source| DbExtractError::Query { operation, source };
    let mut statement = connection.prepare(sql).map_err(wrap)?;
    let rows = statement.query_map([], map).map_err(wrap)?;
    let collected = rows.collect::<Result<Vec<_>, _>>().map_err(wrap)?;
    log::debug!("{operation}: {} rows", collected.len());
    Ok(collected)
}

fn trimmed(value: Option<String>) -> String {
    value.as_deref().map(str::trim).unwrap_or_default().to_owned()
}

fn load_routes(connection: &Connection) -> Result<Vec<DbRoute>, DbExtractError> {
    let rows = query_rows(connection, ROUTES_QUERY, "load routes", |row| {
        Ok((row.get::<_, i64>(0)?, row.get::<_, Option<String>>(1)?))
    })?;

    let mut routes: Vec<DbRoute> = Vec::with_capacity(rows.len());
    let mut positions: HashMap<String, usize> = HashMap::with_capacity(rows.len());
    for (id, raw_name) in rows {
        let name = trimmed(raw_name);
        let route = DbRoute {
            id,
            record: RouteRecord::new(name.clone(), RouteId::Integer(id)),
        };
        match positions.get(&name).and_then(|position| routes.get_mut(*position)) {
            Some(slot) => *slot = route,
            None => {
                positions.insert(name, routes.len());
                routes.push(route);
            }
        }
    }
    Ok(routes)
}

fn load_blocks(connection: &Connection) -> Result<HashMap<i64, Vec<Block>>, DbExtractError> {
    let rows = query_rows(connection, BLOCKS_QUERY, "load blocking rows", |row| {
        Ok((
            row.get::<_, Option<i64>>(0)?,
            Block {
                cdb: trimmed(row.get(1)?),
                ente: trimmed(row.get(2)?),
                id_ente: row.get(3)?,
            },
        ))
    })?;

    // Rows without a route id can never be merged.
    let mut blocks: HashMap<i64, Vec<Block>> = HashMap::new();
    for (maybe_route, block) in rows {
        if let Some(route_id) = maybe_route {
            blocks.entry(route_id).or_default().push(block);
        }
    }
    Ok(blocks)
}

fn load_switches(
    connection: &Connection,
) -> Result<HashMap<(i64, Option<i64>), SwitchRow>, DbExtractError> {
    let rows = query_rows(connection, SWITCHES_QUERY, "load switch positions", |row| {
        let name: Option<String> = row.get(2)?;
        let symbol: Option<String> = row.get(3)?;
        Ok((
            (row.get::<_, Option<i64>>(0)?, row.get::<_, Option<i64>>(1)?),
            SwitchRow {
                name: name
                    .as_deref()
                    .map(str::trim)
                    .filter(|value| !value.is_empty())
                    .map(str::to_owned),
                state: state_code(symbol.as_deref()),
            },
        ))
    })?;
    Ok(rows
        .into_iter()
        .filter_map(|((maybe_route, switch_id), switch)| {
            maybe_route.map(|route_id| ((route_id, switch_id), switch))
        })
        .collect())
}

fn merge_route(
    route: &mut DbRoute,
    blocks: &HashMap<i64, Vec<Block>>,
    switches: &HashMap<(i64, Option<i64>), SwitchRow>,
) {
    let mut seen = HashSet::new();
    for block in blocks.get(&route.id).map(Vec::as_slice).unwrap_or_default() {
        if !block.cdb.is_empty() && seen.insert(block.cdb.as_str()) {
            route
                .record
                .circuits
                .push(CircuitEntry::Name(block.cdb.clone()));
        }
        if block.cdb == block.ente {
            continue;
        }
        if let Some(switch) = switches.get(&(route.id, block.id_ente)) {
            route.record.switch = Some(SwitchContainer::motor(
                block.id_ente.map(FieldValue::Integer),
                switch.name.clone().map(FieldValue::Text),
                switch.state.map(FieldValue::Integer),
            ));
        }
    }
}
