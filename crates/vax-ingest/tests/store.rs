//! Round-trip tests for the per-location CSV store.

use chrono::NaiveDate;
use tempfile::TempDir;

use vax_ingest::SeriesStore;
use vax_model::{LocationSeries, Observation};

fn obs(day: &str, total: Option<i64>) -> Observation {
    Observation {
        location: "Testland".to_string(),
        date: day.parse::<NaiveDate>().unwrap(),
        vaccine: vec!["Moderna".to_string(), "Pfizer/BioNTech".to_string()],
        source_url: "https://health.test".to_string(),
        total_vaccinations: total,
        people_vaccinated: None,
        people_fully_vaccinated: total.map(|t| t / 2),
        total_boosters: None,
    }
}

#[test]
fn save_then_load_preserves_rows_and_nulls() {
    let dir = TempDir::new().unwrap();
    let store = SeriesStore::new(dir.path());

    let series = LocationSeries::from_rows(
        "Testland",
        vec![obs("2021-01-02", Some(150)), obs("2021-01-01", None)],
    );
    store.save(&series).unwrap();

    let loaded = store.load("Testland").unwrap();
    assert_eq!(loaded, series);
    assert_eq!(loaded.rows[0].total_vaccinations, None);
    assert_eq!(loaded.rows[1].people_fully_vaccinated, Some(75));
}

#[test]
fn missing_series_loads_empty() {
    let dir = TempDir::new().unwrap();
    let store = SeriesStore::new(dir.path());
    let loaded = store.load("Nowhere").unwrap();
    assert!(loaded.is_empty());
    assert_eq!(loaded.location, "Nowhere");
}

#[test]
fn locations_lists_saved_series_sorted() {
    let dir = TempDir::new().unwrap();
    let store = SeriesStore::new(dir.path());
    for name in ["Zland", "Aland"] {
        let mut series = LocationSeries::new(name);
        let mut row = obs("2021-01-01", Some(1));
        row.location = name.to_string();
        series.rows.push(row);
        store.save(&series).unwrap();
    }
    assert_eq!(store.locations().unwrap(), vec!["Aland", "Zland"]);
}
