//! Route extraction from the plant-configuration XML export.
//!
//! The export is walked as a stream of events. Only `IXLItem` elements that
//! are direct children of `<root>/IXLItemList` and whose `plantId` matches
//! the configured plant are turned into [`RouteRecord`]s.

use std::collections::BTreeMap;
use std::io::Read;

use camino::{Utf8Path, Utf8PathBuf};
use itinerari_core::{
    CircuitEntry, DiagnosticLog, FieldValue, RouteId, RouteRecord, SwitchContainer,
};
use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};
use thiserror::Error;

/// Plant whose routes are audited unless configured otherwise.
pub const DEFAULT_PLANT_ID: &str = "164";

const ITEM_LIST: &str = "IXLItemList";
const ITEM: &str = "IXLItem";
const CIRCUIT_LIST: &str = "TrackCircuitList";
const CIRCUIT: &str = "TrackCircuit";
const POINT_LIST: &str = "PointList";
const POINT: &str = "Point";
const SWITCH: &str = "Switch";

// Depth of the open-element stack when an element of each level starts.
const ITEM_DEPTH: usize = 2;
const ITEM_CHILD_DEPTH: usize = 3;
const ITEM_GRANDCHILD_DEPTH: usize = 4;
const ITEM_GREAT_GRANDCHILD_DEPTH: usize = 5;

/// Errors raised while extracting routes from XML.
#[derive(Debug, Error)]
pub enum XmlExtractError {
    /// The export could not be opened or read.
    #[error("failed to read XML export at {path}: {source}")]
    Open {
        /// Path of the export.
        path: Utf8PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: std::io::Error,
    },
    /// The export is not well-formed.
    #[error("malformed XML near byte {position}: {source}")]
    Parse {
        /// Byte offset reported by the reader.
        position: u64,
        /// Underlying parser failure.
        #[source]
        source: quick_xml::Error,
    },
}

/// Reads the routes of one plant from an XML export.
///
/// # Examples
///
/// ```
/// use itinerari_core::RecordingLog;
/// use itinerari_data::XmlExtractor;
///
/// let xml = r#"<root><IXLItemList>
///   <IXLItem plantId="164" name="IT_1">
///     <TrackCircuitList><TrackCircuit name="TC_A"/></TrackCircuitList>
///   </IXLItem>
///   <IXLItem plantId="200" name="IT_OTHER"/>
/// </IXLItemList></root>"#;
///
/// let routes = XmlExtractor::default().extract_str(xml, &RecordingLog::default())?;
/// assert_eq!(routes.len(), 1);
/// assert_eq!(routes[0].name, "IT_1");
/// # Ok::<(), itinerari_data::XmlExtractError>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmlExtractor {
    plant_id: String,
}

impl Default for XmlExtractor {
    fn default() -> Self {
        Self::new(DEFAULT_PLANT_ID)
    }
}

impl XmlExtractor {
    /// Extractor keeping the items of `plant_id`.
    pub fn new(plant_id: impl Into<String>) -> Self {
        Self {
            plant_id: plant_id.into(),
        }
    }

    /// Read and extract the export at `path`.
    ///
    /// # Errors
    /// Returns [`XmlExtractError::Open`] when the file cannot be read and
    /// [`XmlExtractError::Parse`] when it is malformed.
    pub fn extract_file(
        &self,
        path: &Utf8Path,
        log: &dyn DiagnosticLog,
    ) -> Result<Vec<RouteRecord>, XmlExtractError> {
        log.info(&format!("Parsing file: {path}"));
        let mut contents = String::new();
        itinerari_fs::open_utf8_file(path)
            .and_then(|mut file| file.read_to_string(&mut contents))
            .map_err(|source| XmlExtractError::Open {
                path: path.to_path_buf(),
                source,
            })?;
        self.extract_str(&contents, log)
    }

    /// Extract routes from an in-memory document.
    ///
    /// # Errors
    /// Returns [`XmlExtractError::Parse`] when the document is malformed.
    pub fn extract_str(
        &self,
        xml: &str,
        log: &dyn DiagnosticLog,
    ) -> Result<Vec<RouteRecord>, XmlExtractError> {
        log.info(&format!(
            "Inizio parsing degli itinerari con plantId '{}'",
            self.plant_id
        ));
        let mut reader = Reader::from_str(xml);
        reader.config_mut().trim_text(true);

        let mut walk = Walk::new(&self.plant_id);
        loop {
            let event = reader.read_event().map_err(|source| XmlExtractError::Parse {
                position: reader.error_position(),
                source,
            })?;
            let handled = match event {
                Event::Start(element) => walk.open(&element, true, log),
                Event::Empty(element) => walk.open(&element, false, log),
                Event::End(_) => {
                    walk.close(log);
                    Ok(())
                }
                Event::Eof => break,
                _ => Ok(()),
            };
            handled.map_err(|source| XmlExtractError::Parse {
                position: reader.buffer_position(),
                source,
            })?;
        }
        Ok(walk.routes)
    }
}

/// Route being assembled from the events of one `IXLItem`.
struct PendingRoute {
    record: RouteRecord,
    circuit_list_seen: bool,
    in_circuit_list: bool,
    point_list_seen: bool,
    in_point_list: bool,
    point_seen: bool,
    in_first_point: bool,
    switch: Option<SwitchContainer>,
}

impl PendingRoute {
    fn new(name: String, plant_id: &str) -> Self {
        Self {
            record: RouteRecord::new(name, RouteId::Text(plant_id.to_owned())),
            circuit_list_seen: false,
            in_circuit_list: false,
            point_list_seen: false,
            in_point_list: false,
            point_seen: false,
            in_first_point: false,
            switch: None,
        }
    }

    fn finish(self) -> RouteRecord {
        let switch = self
            .switch
            .unwrap_or_else(|| SwitchContainer::motor(None, None, None));
        self.record.with_switch(switch)
    }
}

struct Walk<'a> {
    plant_id: &'a str,
    stack: Vec<String>,
    pending: Option<PendingRoute>,
    routes: Vec<RouteRecord>,
}

impl<'a> Walk<'a> {
    const fn new(plant_id: &'a str) -> Self {
        Self {
            plant_id,
            stack: Vec::new(),
            pending: None,
            routes: Vec::new(),
        }
    }

    fn open(
        &mut self,
        element: &BytesStart<'_>,
        has_children: bool,
        log: &dyn DiagnosticLog,
    ) -> Result<(), quick_xml::Error> {
        let name = String::from_utf8_lossy(element.local_name().as_ref()).into_owned();
        let depth = self.stack.len();

        if depth == ITEM_DEPTH && name == ITEM && self.parent_is(ITEM_LIST) {
            let attributes = attributes(element)?;
            if attributes.get("plantId").map(String::as_str) == Some(self.plant_id) {
                let route_name = attributes.get("name").cloned().unwrap_or_default();
                self.pending = Some(PendingRoute::new(route_name, self.plant_id));
            } else {
                log::debug!("skipping IXLItem outside plant {}", self.plant_id);
            }
        } else if let Some(pending) = self.pending.as_mut() {
            match (depth, name.as_str()) {
                (ITEM_CHILD_DEPTH, CIRCUIT_LIST) if !pending.circuit_list_seen => {
                    pending.circuit_list_seen = true;
                    pending.in_circuit_list = has_children;
                }
                (ITEM_GRANDCHILD_DEPTH, CIRCUIT) if pending.in_circuit_list => {
                    pending
                        .record
                        .circuits
                        .push(CircuitEntry::Keyed(attributes(element)?));
                }
                (ITEM_CHILD_DEPTH, POINT_LIST) if !pending.point_list_seen => {
                    pending.point_list_seen = true;
                    pending.in_point_list = has_children;
                }
                (ITEM_GRANDCHILD_DEPTH, POINT) if pending.in_point_list && !pending.point_seen => {
                    pending.point_seen = true;
                    pending.in_first_point = has_children;
                }
                (ITEM_GREAT_GRANDCHILD_DEPTH, SWITCH)
                    if pending.in_first_point && pending.switch.is_none() =>
                {
                    pending.switch = Some(switch_from(&attributes(element)?));
                }
                _ => {}
            }
        }

        if has_children {
            self.stack.push(name);
        } else if depth == ITEM_DEPTH && name == ITEM {
            self.finish_pending(log);
        }
        Ok(())
    }

    fn close(&mut self, log: &dyn DiagnosticLog) {
        let Some(name) = self.stack.pop() else {
            return;
        };
        let depth = self.stack.len();
        if depth == ITEM_DEPTH && name == ITEM {
            self.finish_pending(log);
            return;
        }
        let Some(pending) = self.pending.as_mut() else {
            return;
        };
        match (depth, name.as_str()) {
            (ITEM_CHILD_DEPTH, CIRCUIT_LIST) => pending.in_circuit_list = false,
            (ITEM_CHILD_DEPTH, POINT_LIST) => pending.in_point_list = false,
            (ITEM_GRANDCHILD_DEPTH, POINT) => pending.in_first_point = false,
            _ => {}
        }
    }

    fn finish_pending(&mut self, log: &dyn DiagnosticLog) {
        if let Some(pending) = self.pending.take() {
            let route = pending.finish();
            log.info(&format!(
                "Parsing itinerario: {} completato con successo.",
                route.name
            ));
            self.routes.push(route);
        }
    }

    fn parent_is(&self, expected: &str) -> bool {
        self.stack.last().is_some_and(|parent| parent == expected)
    }
}

fn attributes(element: &BytesStart<'_>) -> Result<BTreeMap<String, String>, quick_xml::Error> {
    let mut fields = BTreeMap::new();
    for entry in element.attributes() {
        let attribute = entry.map_err(quick_xml::Error::from)?;
        let key = String::from_utf8_lossy(attribute.key.local_name().as_ref()).into_owned();
        let value = attribute.unescape_value()?.into_owned();
        fields.insert(key, value);
    }
    Ok(fields)
}

fn switch_from(fields: &BTreeMap<String, String>) -> SwitchContainer {
    let field = |key: &str| fields.get(key).map(|value| FieldValue::from(value.as_str()));
    SwitchContainer::motor(
        field("switchMotorId"),
        field("switchMotorName"),
        field("switchMotorState"),
    )
}
