//! Route records as produced by the XML and database extractors.
//!
//! Records keep the raw shapes of each source. Normalisation into comparable
//! values happens in [`crate::normalise`].

use std::collections::BTreeMap;
use std::fmt;

/// Opaque identifier attached to a route by its source.
///
/// The identifier is informational and never takes part in comparisons.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteId {
    /// Textual identifier, e.g. the XML `plantId` attribute.
    Text(String),
    /// Integer identifier, e.g. the database `id_itine` column.
    Integer(i64),
}

impl fmt::Display for RouteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(value) => f.write_str(value),
            Self::Integer(value) => write!(f, "{value}"),
        }
    }
}

/// A raw switch field value as read from either source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    /// Text value, possibly padded with whitespace.
    Text(String),
    /// Integer value, e.g. a database key or mapped state code.
    Integer(i64),
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(value) => f.write_str(value),
            Self::Integer(value) => write!(f, "{value}"),
        }
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_owned())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

/// One entry of a route's track circuit list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CircuitEntry {
    /// A bare circuit name.
    Name(String),
    /// A keyed record; the name lives under a source-specific key.
    Keyed(BTreeMap<String, String>),
}

impl CircuitEntry {
    /// Build a keyed entry from `(key, value)` pairs.
    pub fn keyed<I, K, V>(fields: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self::Keyed(
            fields
                .into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        )
    }
}

impl From<&str> for CircuitEntry {
    fn from(value: &str) -> Self {
        Self::Name(value.to_owned())
    }
}

impl From<String> for CircuitEntry {
    fn from(value: String) -> Self {
        Self::Name(value)
    }
}

/// Key used by the long switch shape for the motor identifier.
pub const SWITCH_MOTOR_ID: &str = "SwitchMotorId";
/// Key used by the long switch shape for the motor name.
pub const SWITCH_MOTOR_NAME: &str = "SwitchMotorName";
/// Key used by the long switch shape for the motor state.
pub const SWITCH_MOTOR_STATE: &str = "SwitchMotorState";

/// Raw switch container keyed by field name.
///
/// Two key sets occur in practice: `SwitchMotorId`/`SwitchMotorName`/
/// `SwitchMotorState` and the compact `id`/`name`/`state`. A key may be
/// present with no value.
///
/// # Examples
///
/// ```
/// use itinerari_core::{FieldValue, SwitchContainer};
///
/// let switch = SwitchContainer::motor(Some(101_i64.into()), Some("SW_A".into()), None);
/// assert_eq!(switch.get("SwitchMotorId"), Some(&FieldValue::Integer(101)));
/// assert!(switch.contains_key("SwitchMotorState"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SwitchContainer {
    fields: BTreeMap<String, Option<FieldValue>>,
}

impl SwitchContainer {
    /// Container using the `SwitchMotor*` key set.
    #[must_use]
    pub fn motor(
        id: Option<FieldValue>,
        name: Option<FieldValue>,
        state: Option<FieldValue>,
    ) -> Self {
        Self::default()
            .with_field(SWITCH_MOTOR_ID, id)
            .with_field(SWITCH_MOTOR_NAME, name)
            .with_field(SWITCH_MOTOR_STATE, state)
    }

    /// Container using the compact `id`/`name`/`state` key set.
    #[must_use]
    pub fn compact(
        id: Option<FieldValue>,
        name: Option<FieldValue>,
        state: Option<FieldValue>,
    ) -> Self {
        Self::default()
            .with_field("id", id)
            .with_field("name", name)
            .with_field("state", state)
    }

    /// Insert or replace a field.
    #[must_use]
    pub fn with_field(mut self, key: impl Into<String>, value: Option<FieldValue>) -> Self {
        self.fields.insert(key.into(), value);
        self
    }

    /// Whether `key` is present, regardless of its value.
    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.fields.contains_key(key)
    }

    /// Value stored under `key`, if the key is present and holds a value.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&FieldValue> {
        self.fields.get(key).and_then(Option::as_ref)
    }
}

/// A single route definition from one source.
///
/// # Examples
///
/// ```
/// use itinerari_core::{RouteId, RouteRecord};
///
/// let route = RouteRecord::new("R1", RouteId::Integer(7)).with_circuits(["A", "B"]);
/// assert_eq!(route.name, "R1");
/// assert_eq!(route.circuits.len(), 2);
/// assert!(route.switch.is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteRecord {
    /// Route name, unique within one source's list.
    pub name: String,
    /// Source identifier; informational only.
    pub id: RouteId,
    /// Circuit entries in source order.
    pub circuits: Vec<CircuitEntry>,
    /// Raw switch container, when the source has one.
    pub switch: Option<SwitchContainer>,
}

impl RouteRecord {
    /// Create a route with no circuits and no switch.
    pub fn new(name: impl Into<String>, id: RouteId) -> Self {
        Self {
            name: name.into(),
            id,
            circuits: Vec::new(),
            switch: None,
        }
    }

    /// Replace the circuit list.
    #[must_use]
    pub fn with_circuits<I, C>(mut self, circuits: I) -> Self
    where
        I: IntoIterator<Item = C>,
        C: Into<CircuitEntry>,
    {
        self.circuits = circuits.into_iter().map(Into::into).collect();
        self
    }

    /// Attach a switch container.
    #[must_use]
    pub fn with_switch(mut self, switch: SwitchContainer) -> Self {
        self.switch = Some(switch);
        self
    }
}
