//! Read-only reference data: region membership, populations, ISO codes.
//!
//! The aggregation and derived-metrics engines depend on the [`ReferenceData`]
//! trait, not on file paths; [`ReferenceTables`] is the in-memory
//! implementation the loaders fill from CSV.

use std::collections::{BTreeMap, BTreeSet};

/// One row of the location metadata table.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct LocationRecord {
    pub location: String,
    pub iso_code: String,
    pub continent: Option<String>,
    pub income_group: Option<String>,
    #[serde(default)]
    pub eu_member: bool,
    #[serde(default)]
    pub automated: bool,
}

/// Injected read-only repository the engines consult for membership,
/// population, and attribution lookups.
pub trait ReferenceData {
    /// Real locations belonging to a named region (continent, income group,
    /// or "European Union"). Unknown region names yield the empty set.
    fn members_of(&self, region: &str) -> BTreeSet<String>;

    /// Population used for per-capita rates. Grouped territories are folded
    /// into their parent's bucket, so a parent's population includes every
    /// territory mapped to it.
    fn population_of(&self, location: &str) -> Option<f64>;

    fn iso_code_of(&self, location: &str) -> Option<String>;

    /// Whether this location's data is produced by an automated adapter.
    fn is_automated(&self, location: &str) -> bool;
}

#[derive(Debug, Clone, Default)]
pub struct ReferenceTables {
    locations: BTreeMap<String, LocationRecord>,
    population: BTreeMap<String, f64>,
    /// Territory -> parent sovereign entity for population grouping.
    grouping: BTreeMap<String, String>,
}

impl ReferenceTables {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_location(&mut self, record: LocationRecord) {
        self.locations.insert(record.location.clone(), record);
    }

    pub fn set_population(&mut self, location: impl Into<String>, population: f64) {
        self.population.insert(location.into(), population);
    }

    pub fn set_population_parent(
        &mut self,
        territory: impl Into<String>,
        parent: impl Into<String>,
    ) {
        self.grouping.insert(territory.into(), parent.into());
    }

    pub fn location_records(&self) -> impl Iterator<Item = &LocationRecord> {
        self.locations.values()
    }
}

impl ReferenceData for ReferenceTables {
    fn members_of(&self, region: &str) -> BTreeSet<String> {
        self.locations
            .values()
            .filter(|record| {
                record.continent.as_deref() == Some(region)
                    || record.income_group.as_deref() == Some(region)
                    || (region == "European Union" && record.eu_member)
            })
            .map(|record| record.location.clone())
            .collect()
    }

    fn population_of(&self, location: &str) -> Option<f64> {
        let base = self.population.get(location).copied();
        let folded: f64 = self
            .grouping
            .iter()
            .filter(|(_, parent)| parent.as_str() == location)
            .filter_map(|(territory, _)| self.population.get(territory))
            .sum();
        match base {
            Some(population) => Some(population + folded),
            None if folded > 0.0 => Some(folded),
            None => None,
        }
    }

    fn iso_code_of(&self, location: &str) -> Option<String> {
        self.locations
            .get(location)
            .map(|record| record.iso_code.clone())
    }

    fn is_automated(&self, location: &str) -> bool {
        self.locations
            .get(location)
            .is_some_and(|record| record.automated)
    }
}
