//! Classify the differences between a matched XML/database route pair.

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use thiserror::Error;

use crate::RouteRecord;
use crate::normalise::{Side, SwitchField, circuit_names, switch_triple};

/// How circuit lists are compared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum CircuitPolicy {
    /// Compare circuit name sets and report each missing circuit.
    ///
    /// Order is not a correctness criterion: a reordered list with the same
    /// members yields no difference.
    #[default]
    Set,
    /// Compare circuit sequences element by element, including order and
    /// length, and report any mismatch as a single difference.
    Positional,
}

impl fmt::Display for CircuitPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Set => f.write_str("set"),
            Self::Positional => f.write_str("positional"),
        }
    }
}

/// Error returned when parsing an unknown [`CircuitPolicy`] name.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown circuit policy {0:?} (expected `set` or `positional`)")]
pub struct ParseCircuitPolicyError(String);

impl FromStr for CircuitPolicy {
    type Err = ParseCircuitPolicyError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "set" => Ok(Self::Set),
            "positional" => Ok(Self::Positional),
            _ => Err(ParseCircuitPolicyError(value.to_owned())),
        }
    }
}

/// A single typed difference between two matched routes.
///
/// The [`fmt::Display`] rendering is the line written to the report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Difference {
    /// A circuit listed in XML is absent from the database.
    CircuitMissingInDb(String),
    /// A circuit listed in the database is absent from XML.
    CircuitMissingInXml(String),
    /// The circuit sequences differ (positional policy only).
    CircuitSequence {
        /// Normalised XML sequence.
        xml: Vec<String>,
        /// Normalised database sequence.
        db: Vec<String>,
    },
    /// A switch field differs after normalisation.
    SwitchField {
        /// The mismatching field.
        field: SwitchField,
        /// Normalised XML value.
        xml: Option<String>,
        /// Normalised database value.
        db: Option<String>,
    },
}

impl fmt::Display for Difference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CircuitMissingInDb(name) => write!(f, "TrackCircuit {name} non trovato nel DB."),
            Self::CircuitMissingInXml(name) => {
                write!(f, "TrackCircuit {name} non trovato nell'XML.")
            }
            Self::CircuitSequence { xml, db } => write!(
                f,
                "TrackCircuits non corrispondenti. XML: {}, DB: {}",
                QuotedList(xml),
                QuotedList(db)
            ),
            Self::SwitchField { field, xml, db } => write!(
                f,
                "{field} non corrispondente. XML: {}, DB: {}",
                OptionalValue(xml.as_deref()),
                OptionalValue(db.as_deref())
            ),
        }
    }
}

struct QuotedList<'a>(&'a [String]);

impl fmt::Display for QuotedList<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[")?;
        for (position, name) in self.0.iter().enumerate() {
            if position > 0 {
                f.write_str(", ")?;
            }
            write!(f, "'{name}'")?;
        }
        f.write_str("]")
    }
}

struct OptionalValue<'a>(Option<&'a str>);

impl fmt::Display for OptionalValue<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0.unwrap_or("None"))
    }
}

/// Compare one matched route pair.
///
/// Circuit differences come first, then switch differences in
/// `SwitchMotorId`, `SwitchMotorName`, `SwitchMotorState` order. An empty
/// result means the pair is equivalent.
///
/// # Examples
///
/// ```
/// use itinerari_core::{CircuitPolicy, Difference, RouteId, RouteRecord, classify};
///
/// let xml = RouteRecord::new("R1", RouteId::Text("164".into())).with_circuits(["A", "B"]);
/// let db = RouteRecord::new("R1", RouteId::Integer(1)).with_circuits(["A"]);
///
/// let differences = classify(&xml, &db, CircuitPolicy::Set);
/// assert_eq!(differences, vec![Difference::CircuitMissingInDb("B".into())]);
/// assert_eq!(differences[0].to_string(), "TrackCircuit B non trovato nel DB.");
/// ```
#[must_use]
pub fn classify(xml: &RouteRecord, db: &RouteRecord, policy: CircuitPolicy) -> Vec<Difference> {
    let xml_circuits = circuit_names(xml, Side::Xml);
    let db_circuits = circuit_names(db, Side::Db);
    let mut differences = match policy {
        CircuitPolicy::Set => set_differences(&xml_circuits, &db_circuits),
        CircuitPolicy::Positional => positional_differences(&xml_circuits, &db_circuits),
    };
    differences.extend(switch_differences(xml, db));
    differences
}

fn set_differences(xml: &[&str], db: &[&str]) -> Vec<Difference> {
    let missing_in_db = absent_from(xml, db)
        .into_iter()
        .map(|name| Difference::CircuitMissingInDb(name.to_owned()));
    let missing_in_xml = absent_from(db, xml)
        .into_iter()
        .map(|name| Difference::CircuitMissingInXml(name.to_owned()));
    missing_in_db.chain(missing_in_xml).collect()
}

/// Distinct members of `source` absent from `other`, in first-appearance order.
fn absent_from<'a>(source: &[&'a str], other: &[&str]) -> Vec<&'a str> {
    let other: HashSet<&str> = other.iter().copied().collect();
    let mut seen = HashSet::new();
    source
        .iter()
        .copied()
        .filter(|name| !other.contains(name) && seen.insert(*name))
        .collect()
}

fn positional_differences(xml: &[&str], db: &[&str]) -> Vec<Difference> {
    if xml == db {
        return Vec::new();
    }
    vec![Difference::CircuitSequence {
        xml: xml.iter().map(|name| (*name).to_owned()).collect(),
        db: db.iter().map(|name| (*name).to_owned()).collect(),
    }]
}

fn switch_differences(xml: &RouteRecord, db: &RouteRecord) -> Vec<Difference> {
    let xml_switch = switch_triple(xml.switch.as_ref(), Side::Xml);
    let db_switch = switch_triple(db.switch.as_ref(), Side::Db);
    SwitchField::ALL
        .into_iter()
        .filter_map(|field| {
            let xml_value = xml_switch.get(field);
            let db_value = db_switch.get(field);
            (xml_value != db_value).then(|| Difference::SwitchField {
                field,
                xml: xml_value.map(str::to_owned),
                db: db_value.map(str::to_owned),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{FieldValue, RouteId, SwitchContainer};
    use rstest::{fixture, rstest};

    #[fixture]
    fn xml_route() -> RouteRecord {
        RouteRecord::new("ITIN_1", RouteId::Text("164".into()))
            .with_circuits(["TC_X", "TC_Y"])
            .with_switch(SwitchContainer::motor(
                Some("101".into()),
                Some("SW_A".into()),
                Some("1".into()),
            ))
    }

    fn db_route(circuits: &[&str], switch: Option<SwitchContainer>) -> RouteRecord {
        let route =
            RouteRecord::new("ITIN_1", RouteId::Integer(1)).with_circuits(circuits.iter().copied());
        match switch {
            Some(container) => route.with_switch(container),
            None => route,
        }
    }

    fn db_switch() -> SwitchContainer {
        SwitchContainer::motor(
            Some(FieldValue::Integer(101)),
            Some("SW_A".into()),
            Some(FieldValue::Integer(1)),
        )
    }

    #[rstest]
    #[case(CircuitPolicy::Set)]
    #[case(CircuitPolicy::Positional)]
    fn integer_and_text_fields_match(xml_route: RouteRecord, #[case] policy: CircuitPolicy) {
        let db = db_route(&["TC_X", "TC_Y"], Some(db_switch()));

        assert!(classify(&xml_route, &db, policy).is_empty());
    }

    #[rstest]
    fn set_policy_ignores_order(xml_route: RouteRecord) {
        let db = db_route(&["TC_Y", "TC_X"], Some(db_switch()));

        assert!(classify(&xml_route, &db, CircuitPolicy::Set).is_empty());
    }

    #[rstest]
    fn positional_policy_reports_reordering_once(xml_route: RouteRecord) {
        let db = db_route(&["TC_Y", "TC_X"], Some(db_switch()));

        let differences = classify(&xml_route, &db, CircuitPolicy::Positional);

        assert_eq!(differences.len(), 1);
        assert_eq!(
            differences.first().map(ToString::to_string).as_deref(),
            Some("TrackCircuits non corrispondenti. XML: ['TC_X', 'TC_Y'], DB: ['TC_Y', 'TC_X']")
        );
    }

    #[rstest]
    fn set_policy_reports_both_directions(xml_route: RouteRecord) {
        let db = db_route(&["TC_Z", "TC_X", "TC_Z"], Some(db_switch()));

        let differences = classify(&xml_route, &db, CircuitPolicy::Set);

        assert_eq!(
            differences,
            vec![
                Difference::CircuitMissingInDb("TC_Y".into()),
                Difference::CircuitMissingInXml("TC_Z".into()),
            ]
        );
    }

    #[rstest]
    fn each_switch_field_is_reported_separately(xml_route: RouteRecord) {
        let db = db_route(&["TC_X", "TC_Y"], None);

        let rendered: Vec<String> = classify(&xml_route, &db, CircuitPolicy::Set)
            .iter()
            .map(ToString::to_string)
            .collect();

        assert_eq!(
            rendered,
            vec![
                "SwitchMotorId non corrispondente. XML: 101, DB: None",
                "SwitchMotorName non corrispondente. XML: SW_A, DB: None",
                "SwitchMotorState non corrispondente. XML: 1, DB: None",
            ]
        );
    }

    #[rstest]
    fn compact_database_shape_is_normalised(xml_route: RouteRecord) {
        let compact = SwitchContainer::compact(
            Some(FieldValue::Integer(101)),
            Some(" SW_A ".into()),
            Some(FieldValue::Integer(2)),
        );
        let db = db_route(&["TC_X", "TC_Y"], Some(compact));

        let differences = classify(&xml_route, &db, CircuitPolicy::Set);

        assert_eq!(
            differences,
            vec![Difference::SwitchField {
                field: SwitchField::MotorState,
                xml: Some("1".into()),
                db: Some("2".into()),
            }]
        );
    }

    #[rstest]
    #[case("set", CircuitPolicy::Set)]
    #[case(" Positional ", CircuitPolicy::Positional)]
    fn parses_policy_names(#[case] raw: &str, #[case] expected: CircuitPolicy) {
        assert_eq!(raw.parse::<CircuitPolicy>(), Ok(expected));
    }

    #[rstest]
    fn rejects_unknown_policy() {
        assert!("ordered".parse::<CircuitPolicy>().is_err());
    }
}
