//! Name-indexed lookup over one source's route list.

use std::collections::HashMap;

use crate::RouteRecord;

/// Routes of one source keyed by exact name.
///
/// Iteration follows the position at which each name first appeared. When a
/// name repeats, the later record replaces the earlier one in place and the
/// name is remembered in [`RouteIndex::duplicates`].
///
/// # Examples
///
/// ```
/// use itinerari_core::{RouteId, RouteIndex, RouteRecord};
///
/// let routes = vec![
///     RouteRecord::new("R1", RouteId::Integer(1)),
///     RouteRecord::new("R2", RouteId::Integer(2)),
///     RouteRecord::new("R1", RouteId::Integer(3)),
/// ];
/// let index = RouteIndex::build(&routes);
///
/// assert_eq!(index.len(), 2);
/// assert_eq!(index.get("R1").map(|route| &route.id), Some(&RouteId::Integer(3)));
/// assert_eq!(index.duplicates(), ["R1"]);
/// assert!(index.get("r1").is_none());
/// ```
#[derive(Debug)]
pub struct RouteIndex<'a> {
    entries: Vec<&'a RouteRecord>,
    positions: HashMap<&'a str, usize>,
    duplicates: Vec<&'a str>,
}

impl<'a> RouteIndex<'a> {
    /// Index `routes` by name.
    #[must_use]
    pub fn build(routes: &'a [RouteRecord]) -> Self {
        let mut index = Self {
            entries: Vec::with_capacity(routes.len()),
            positions: HashMap::with_capacity(routes.len()),
            duplicates: Vec::new(),
        };
        for route in routes {
            index.insert(route);
        }
        index
    }

    fn insert(&mut self, route: &'a RouteRecord) {
        let name = route.name.as_str();
        if let Some(slot) = self
            .positions
            .get(name)
            .and_then(|position| self.entries.get_mut(*position))
        {
            *slot = route;
            self.duplicates.push(name);
            return;
        }
        self.positions.insert(name, self.entries.len());
        self.entries.push(route);
    }

    /// Route registered under `name`.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&'a RouteRecord> {
        self.positions
            .get(name)
            .and_then(|position| self.entries.get(*position))
            .copied()
    }

    /// Whether a route named `name` exists.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.positions.contains_key(name)
    }

    /// Routes in first-appearance order.
    pub fn iter(&self) -> impl Iterator<Item = &'a RouteRecord> + '_ {
        self.entries.iter().copied()
    }

    /// Number of distinct names.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the index holds no routes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Names that appeared more than once, one entry per collapsed record.
    #[must_use]
    pub fn duplicates(&self) -> &[&'a str] {
        &self.duplicates
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::RouteId;
    use rstest::rstest;

    fn route(name: &str, id: i64) -> RouteRecord {
        RouteRecord::new(name, RouteId::Integer(id))
    }

    #[rstest]
    fn keeps_first_appearance_order_with_last_record() {
        let routes = vec![route("B", 1), route("A", 2), route("B", 3), route("C", 4)];

        let index = RouteIndex::build(&routes);
        let order: Vec<(&str, &RouteId)> = index
            .iter()
            .map(|entry| (entry.name.as_str(), &entry.id))
            .collect();

        assert_eq!(
            order,
            vec![
                ("B", &RouteId::Integer(3)),
                ("A", &RouteId::Integer(2)),
                ("C", &RouteId::Integer(4)),
            ]
        );
    }

    #[rstest]
    #[case("R1 ")]
    #[case("r1")]
    fn lookup_is_exact(#[case] probe: &str) {
        let routes = vec![route("R1", 1)];

        let index = RouteIndex::build(&routes);

        assert!(!index.contains(probe));
        assert!(index.contains("R1"));
    }

    #[rstest]
    fn empty_list_builds_empty_index() {
        let index = RouteIndex::build(&[]);

        assert!(index.is_empty());
        assert!(index.duplicates().is_empty());
    }
}
