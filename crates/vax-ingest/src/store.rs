//! Per-location CSV persistence for [`LocationSeries`].
//!
//! One file per location under a data directory; the file name is the
//! location name. Saves go through a temp file and rename so a failed write
//! never truncates a location's history.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use tracing::debug;

use vax_model::{LocationSeries, Observation, Result};

use crate::record::split_vaccines;

/// On-disk row shape. `vaccine` is the comma-joined form adapters emit.
#[derive(Debug, serde::Serialize, serde::Deserialize)]
struct SeriesRow {
    location: String,
    date: NaiveDate,
    vaccine: String,
    source_url: String,
    total_vaccinations: Option<i64>,
    people_vaccinated: Option<i64>,
    people_fully_vaccinated: Option<i64>,
    total_boosters: Option<i64>,
}

impl From<&Observation> for SeriesRow {
    fn from(obs: &Observation) -> Self {
        Self {
            location: obs.location.clone(),
            date: obs.date,
            vaccine: obs.vaccine.join(", "),
            source_url: obs.source_url.clone(),
            total_vaccinations: obs.total_vaccinations,
            people_vaccinated: obs.people_vaccinated,
            people_fully_vaccinated: obs.people_fully_vaccinated,
            total_boosters: obs.total_boosters,
        }
    }
}

impl From<SeriesRow> for Observation {
    fn from(row: SeriesRow) -> Self {
        Self {
            location: row.location,
            date: row.date,
            vaccine: split_vaccines(&row.vaccine),
            source_url: row.source_url,
            total_vaccinations: row.total_vaccinations,
            people_vaccinated: row.people_vaccinated,
            people_fully_vaccinated: row.people_fully_vaccinated,
            total_boosters: row.total_boosters,
        }
    }
}

/// Directory-backed store of per-location series files.
#[derive(Debug, Clone)]
pub struct SeriesStore {
    dir: PathBuf,
}

impl SeriesStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Locations with a persisted series, sorted by name.
    pub fn locations(&self) -> Result<Vec<String>> {
        if !self.dir.exists() {
            return Ok(Vec::new());
        }
        let mut names = Vec::new();
        for entry in fs::read_dir(&self.dir)? {
            let path = entry?.path();
            if path.extension().is_some_and(|ext| ext == "csv")
                && let Some(stem) = path.file_stem().and_then(|stem| stem.to_str())
            {
                names.push(stem.to_string());
            }
        }
        names.sort();
        Ok(names)
    }

    /// Load one location's series; a missing file yields an empty series.
    pub fn load(&self, location: &str) -> Result<LocationSeries> {
        let path = self.path_for(location);
        if !path.exists() {
            return Ok(LocationSeries::new(location));
        }
        let mut reader = csv::Reader::from_path(&path)?;
        let mut rows = Vec::new();
        for result in reader.deserialize() {
            let row: SeriesRow = result?;
            rows.push(Observation::from(row));
        }
        Ok(LocationSeries::from_rows(location, rows))
    }

    /// Load every persisted series, keyed by location.
    pub fn load_all(&self) -> Result<BTreeMap<String, LocationSeries>> {
        let mut dataset = BTreeMap::new();
        for location in self.locations()? {
            let series = self.load(&location)?;
            dataset.insert(location, series);
        }
        Ok(dataset)
    }

    /// Persist a series atomically (temp file, then rename).
    pub fn save(&self, series: &LocationSeries) -> Result<()> {
        fs::create_dir_all(&self.dir)?;
        let path = self.path_for(&series.location);
        let tmp = path.with_extension("csv.tmp");
        {
            let mut writer = csv::Writer::from_path(&tmp)?;
            for row in &series.rows {
                writer.serialize(SeriesRow::from(row))?;
            }
            writer.flush()?;
        }
        fs::rename(&tmp, &path)?;
        debug!(location = %series.location, rows = series.len(), "saved series");
        Ok(())
    }

    fn path_for(&self, location: &str) -> PathBuf {
        self.dir.join(format!("{location}.csv"))
    }
}
