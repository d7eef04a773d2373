//! Denormalized per-location JSON documents.
//!
//! Null fields are omitted row by row to keep the document small; a date
//! with only a smoothed rate serializes just that rate.

use std::collections::BTreeMap;
use std::io::Write;

use chrono::NaiveDate;
use serde::Serialize;

use vax_model::{EnrichedRow, Result};

#[derive(Debug, Clone, Serialize)]
pub struct DataPoint {
    pub date: NaiveDate,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_vaccinations: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub people_vaccinated: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub people_fully_vaccinated: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_boosters: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub daily_vaccinations_raw: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub daily_vaccinations: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_vaccinations_per_hundred: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub people_vaccinated_per_hundred: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub people_fully_vaccinated_per_hundred: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_boosters_per_hundred: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub daily_vaccinations_per_million: Option<f64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct LocationDocument {
    pub location: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub iso_code: Option<String>,
    pub data: Vec<DataPoint>,
}

impl From<&EnrichedRow> for DataPoint {
    fn from(row: &EnrichedRow) -> Self {
        Self {
            date: row.date,
            total_vaccinations: row.total_vaccinations,
            people_vaccinated: row.people_vaccinated,
            people_fully_vaccinated: row.people_fully_vaccinated,
            total_boosters: row.total_boosters,
            daily_vaccinations_raw: row.daily_vaccinations_raw,
            daily_vaccinations: row.daily_vaccinations,
            total_vaccinations_per_hundred: row.total_vaccinations_per_hundred,
            people_vaccinated_per_hundred: row.people_vaccinated_per_hundred,
            people_fully_vaccinated_per_hundred: row.people_fully_vaccinated_per_hundred,
            total_boosters_per_hundred: row.total_boosters_per_hundred,
            daily_vaccinations_per_million: row.daily_vaccinations_per_million,
        }
    }
}

/// Group enriched rows into one document per location, dates ascending.
pub fn location_documents(rows: &[EnrichedRow]) -> Vec<LocationDocument> {
    let mut grouped: BTreeMap<&str, LocationDocument> = BTreeMap::new();
    for row in rows {
        let document = grouped
            .entry(row.location.as_str())
            .or_insert_with(|| LocationDocument {
                location: row.location.clone(),
                iso_code: row.iso_code.clone(),
                data: Vec::new(),
            });
        document.data.push(DataPoint::from(row));
    }
    let mut documents: Vec<LocationDocument> = grouped.into_values().collect();
    for document in &mut documents {
        document.data.sort_by_key(|point| point.date);
    }
    documents
}

pub fn write_json<W: Write>(documents: &[LocationDocument], writer: W) -> Result<()> {
    serde_json::to_writer(writer, documents)?;
    Ok(())
}
