//! Locations summary and automation-state tables.

use std::collections::{BTreeMap, BTreeSet};
use std::io::Write;

use chrono::NaiveDate;
use serde::Serialize;

use vax_model::{LocationSeries, ReferenceData, Result};

/// One row of the locations summary: last observation, attribution, and the
/// pretty-printed vaccine list.
#[derive(Debug, Clone, Serialize)]
pub struct LocationSummary {
    pub location: String,
    /// Empty when the reference tables carry no code for the location.
    pub iso_code: Option<String>,
    /// Deduplicated, alphabetically sorted, comma-joined.
    pub vaccines: String,
    pub last_observation_date: NaiveDate,
    pub source_url: String,
}

/// One row of the automation-state table.
#[derive(Debug, Clone, Serialize)]
pub struct AutomationState {
    pub location: String,
    pub automated: bool,
}

/// Summarize one location's series; an empty series has nothing to report.
pub fn summarize_location(
    series: &LocationSeries,
    reference: &impl ReferenceData,
) -> Option<LocationSummary> {
    let last = series.rows.iter().max_by_key(|row| row.date)?;
    let vaccines: BTreeSet<&str> = series
        .rows
        .iter()
        .flat_map(|row| row.vaccine.iter().map(String::as_str))
        .collect();
    Some(LocationSummary {
        location: series.location.clone(),
        iso_code: reference.iso_code_of(&series.location),
        vaccines: vaccines.into_iter().collect::<Vec<_>>().join(", "),
        last_observation_date: last.date,
        source_url: last.source_url.clone(),
    })
}

/// Automation flags for every published location, sorted by name.
pub fn automation_states(
    dataset: &BTreeMap<String, LocationSeries>,
    reference: &impl ReferenceData,
) -> Vec<AutomationState> {
    dataset
        .keys()
        .map(|location| AutomationState {
            location: location.clone(),
            automated: reference.is_automated(location),
        })
        .collect()
}

pub fn write_locations_csv<W: Write>(summaries: &[LocationSummary], writer: W) -> Result<()> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    for summary in summaries {
        csv_writer.serialize(summary)?;
    }
    csv_writer.flush()?;
    Ok(())
}

pub fn write_automation_csv<W: Write>(states: &[AutomationState], writer: W) -> Result<()> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    for state in states {
        csv_writer.serialize(state)?;
    }
    csv_writer.flush()?;
    Ok(())
}
