//! CSV loaders for cycle configuration and reference tables.
//!
//! Layout of the reference directory:
//!
//! - `vaccines.csv` — column `vaccine`: the accepted-vaccine vocabulary.
//! - `skips.csv` — columns `location,date,metric`: monotonic/anomaly
//!   skip-list (optional file).
//! - `locations.csv` — columns `location,iso_code,continent,income_group,
//!   eu_member,automated`.
//! - `population.csv` — columns `location,population`.
//! - `population_grouping.csv` — columns `location,parent`: territories
//!   folded into a parent population bucket (optional file).

use std::collections::BTreeMap;
use std::path::Path;

use chrono::NaiveDate;

use vax_model::{
    LocationRecord, Metric, ReferenceTables, Result, SkipList, VaccineVocabulary, VaxError,
};

#[derive(Debug, serde::Deserialize)]
struct VaccineRow {
    vaccine: String,
}

#[derive(Debug, serde::Deserialize)]
struct SkipRow {
    location: String,
    date: NaiveDate,
    metric: String,
}

#[derive(Debug, serde::Deserialize)]
struct PopulationRow {
    location: String,
    population: f64,
}

#[derive(Debug, serde::Deserialize)]
struct GroupingRow {
    location: String,
    parent: String,
}

pub fn load_vocabulary(path: &Path) -> Result<VaccineVocabulary> {
    let mut vocabulary = VaccineVocabulary::default();
    let mut reader = csv::Reader::from_path(path)?;
    for result in reader.deserialize() {
        let row: VaccineRow = result?;
        vocabulary.insert(row.vaccine.trim());
    }
    Ok(vocabulary)
}

/// Load the skip-list; a missing file is an empty skip-list.
pub fn load_skip_list(path: &Path) -> Result<SkipList> {
    let mut skips = SkipList::default();
    if !path.exists() {
        return Ok(skips);
    }
    let mut reader = csv::Reader::from_path(path)?;
    for result in reader.deserialize() {
        let row: SkipRow = result?;
        let metric = Metric::parse(&row.metric).ok_or_else(|| {
            VaxError::Schema(format!(
                "skip-list entry for {} names unknown metric `{}`",
                row.location, row.metric
            ))
        })?;
        skips.insert(row.location, row.date, metric);
    }
    Ok(skips)
}

pub fn load_locations(path: &Path) -> Result<Vec<LocationRecord>> {
    let mut records = Vec::new();
    let mut reader = csv::Reader::from_path(path)?;
    for result in reader.deserialize() {
        let record: LocationRecord = result?;
        records.push(record);
    }
    Ok(records)
}

pub fn load_population(path: &Path) -> Result<BTreeMap<String, f64>> {
    let mut population = BTreeMap::new();
    let mut reader = csv::Reader::from_path(path)?;
    for result in reader.deserialize() {
        let row: PopulationRow = result?;
        population.insert(row.location, row.population);
    }
    Ok(population)
}

/// Load the population grouping map; a missing file is an empty map.
pub fn load_population_grouping(path: &Path) -> Result<BTreeMap<String, String>> {
    let mut grouping = BTreeMap::new();
    if !path.exists() {
        return Ok(grouping);
    }
    let mut reader = csv::Reader::from_path(path)?;
    for result in reader.deserialize() {
        let row: GroupingRow = result?;
        grouping.insert(row.location, row.parent);
    }
    Ok(grouping)
}

/// Assemble the reference tables from a reference directory.
pub fn load_reference_tables(dir: &Path) -> Result<ReferenceTables> {
    let mut tables = ReferenceTables::new();
    for record in load_locations(&dir.join("locations.csv"))? {
        tables.insert_location(record);
    }
    for (location, population) in load_population(&dir.join("population.csv"))? {
        tables.set_population(location, population);
    }
    for (territory, parent) in load_population_grouping(&dir.join("population_grouping.csv"))? {
        tables.set_population_parent(territory, parent);
    }
    Ok(tables)
}
