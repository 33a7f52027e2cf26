//! Make XML and database field encodings comparable.
//!
//! Circuit entries are reduced to their names and switch containers to a
//! [`SwitchTriple`] of trimmed optional strings, so integer and text
//! identifiers compare by value.

use std::fmt;

use crate::route::{
    CircuitEntry, FieldValue, RouteRecord, SWITCH_MOTOR_ID, SWITCH_MOTOR_NAME, SWITCH_MOTOR_STATE,
    SwitchContainer,
};

/// The source a record came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    /// The plant-configuration XML export.
    Xml,
    /// The relational database.
    Db,
}

impl Side {
    /// Key holding the circuit name inside keyed circuit entries.
    #[must_use]
    pub const fn circuit_name_key(self) -> &'static str {
        match self {
            Self::Xml => "name",
            Self::Db => "cdb",
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Xml => f.write_str("XML"),
            Self::Db => f.write_str("DB"),
        }
    }
}

/// One of the three compared switch fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwitchField {
    /// Motor identifier.
    MotorId,
    /// Motor display name.
    MotorName,
    /// Motor state code.
    MotorState,
}

impl SwitchField {
    /// Every field, in comparison order.
    pub const ALL: [Self; 3] = [Self::MotorId, Self::MotorName, Self::MotorState];

    /// Key of the field in the `SwitchMotor*` key set.
    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::MotorId => SWITCH_MOTOR_ID,
            Self::MotorName => SWITCH_MOTOR_NAME,
            Self::MotorState => SWITCH_MOTOR_STATE,
        }
    }

    const fn compact_key(self) -> &'static str {
        match self {
            Self::MotorId => "id",
            Self::MotorName => "name",
            Self::MotorState => "state",
        }
    }
}

impl fmt::Display for SwitchField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Normalised switch fields.
///
/// A route without a switch normalises to three `None`s.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SwitchTriple {
    /// Normalised motor identifier.
    pub motor_id: Option<String>,
    /// Normalised motor name.
    pub motor_name: Option<String>,
    /// Normalised motor state.
    pub motor_state: Option<String>,
}

impl SwitchTriple {
    /// Value of `field`.
    #[must_use]
    pub fn get(&self, field: SwitchField) -> Option<&str> {
        match field {
            SwitchField::MotorId => self.motor_id.as_deref(),
            SwitchField::MotorName => self.motor_name.as_deref(),
            SwitchField::MotorState => self.motor_state.as_deref(),
        }
    }
}

/// Normalise a raw switch field.
///
/// Values are stringified and trimmed; blank strings become `None`.
///
/// # Examples
///
/// ```
/// use itinerari_core::{FieldValue, normalise_field};
///
/// assert_eq!(normalise_field(Some(&FieldValue::Integer(101))), Some("101".to_owned()));
/// assert_eq!(normalise_field(Some(&FieldValue::from(" 101 "))), Some("101".to_owned()));
/// assert_eq!(normalise_field(Some(&FieldValue::from("   "))), None);
/// assert_eq!(normalise_field(None), None);
/// ```
#[must_use]
pub fn normalise_field(value: Option<&FieldValue>) -> Option<String> {
    let text = value?.to_string();
    let trimmed = text.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_owned())
}

/// Resolve the circuit name of one entry, if it has one.
#[must_use]
pub fn circuit_name(entry: &CircuitEntry, side: Side) -> Option<&str> {
    match entry {
        CircuitEntry::Name(name) => Some(name.as_str()),
        CircuitEntry::Keyed(fields) => fields.get(side.circuit_name_key()).map(String::as_str),
    }
}

/// Circuit names of `route` in source order; nameless entries are dropped.
#[must_use]
pub fn circuit_names(route: &RouteRecord, side: Side) -> Vec<&str> {
    route
        .circuits
        .iter()
        .filter_map(|entry| circuit_name(entry, side))
        .collect()
}

/// Normalise a switch container into a [`SwitchTriple`].
///
/// XML records always use the `SwitchMotor*` keys. Database records use them
/// when any of the three is present and fall back to `id`/`name`/`state`
/// otherwise.
///
/// # Examples
///
/// ```
/// use itinerari_core::{Side, SwitchContainer, SwitchTriple, switch_triple};
///
/// let compact = SwitchContainer::compact(Some(7_i64.into()), Some("SW".into()), Some(2_i64.into()));
/// let triple = switch_triple(Some(&compact), Side::Db);
/// assert_eq!(triple.motor_id.as_deref(), Some("7"));
/// assert_eq!(triple.motor_state.as_deref(), Some("2"));
///
/// assert_eq!(switch_triple(None, Side::Xml), SwitchTriple::default());
/// ```
#[must_use]
pub fn switch_triple(container: Option<&SwitchContainer>, side: Side) -> SwitchTriple {
    let Some(switch) = container else {
        return SwitchTriple::default();
    };
    let uses_motor_keys = match side {
        Side::Xml => true,
        Side::Db => SwitchField::ALL
            .iter()
            .any(|field| switch.contains_key(field.key())),
    };
    let read = |field: SwitchField| {
        let key = if uses_motor_keys {
            field.key()
        } else {
            field.compact_key()
        };
        normalise_field(switch.get(key))
    };
    SwitchTriple {
        motor_id: read(SwitchField::MotorId),
        motor_name: read(SwitchField::MotorName),
        motor_state: read(SwitchField::MotorState),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::route::RouteId;
    use rstest::rstest;

    #[rstest]
    #[case(Side::Xml, "name")]
    #[case(Side::Db, "cdb")]
    fn keyed_entries_use_side_specific_key(#[case] side: Side, #[case] key: &str) {
        let route = RouteRecord::new("R1", RouteId::Integer(1)).with_circuits([
            CircuitEntry::keyed([(key, "TC_1")]),
            CircuitEntry::from("TC_2"),
            CircuitEntry::keyed([("other", "ignored")]),
        ]);

        assert_eq!(circuit_names(&route, side), vec!["TC_1", "TC_2"]);
    }

    #[rstest]
    fn xml_key_is_ignored_on_database_side() {
        let route = RouteRecord::new("R1", RouteId::Integer(1))
            .with_circuits([CircuitEntry::keyed([("name", "TC_1")])]);

        assert!(circuit_names(&route, Side::Db).is_empty());
    }

    #[rstest]
    fn motor_keys_take_precedence_over_compact_keys() {
        let switch = SwitchContainer::compact(Some(1_i64.into()), Some("compact".into()), None)
            .with_field(SWITCH_MOTOR_NAME, None);

        let triple = switch_triple(Some(&switch), Side::Db);

        assert_eq!(triple, SwitchTriple::default());
    }

    #[rstest]
    fn xml_side_never_reads_compact_keys() {
        let switch =
            SwitchContainer::compact(Some(1_i64.into()), Some("SW".into()), Some(2_i64.into()));

        assert_eq!(switch_triple(Some(&switch), Side::Xml), SwitchTriple::default());
    }

    #[rstest]
    #[case(FieldValue::from("101"), FieldValue::Integer(101))]
    #[case(FieldValue::from("  SW_A\t"), FieldValue::from("SW_A"))]
    fn equivalent_encodings_normalise_alike(#[case] left: FieldValue, #[case] right: FieldValue) {
        assert_eq!(normalise_field(Some(&left)), normalise_field(Some(&right)));
    }
}
