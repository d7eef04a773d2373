//! Export contract tests.

use std::collections::BTreeMap;

use chrono::NaiveDate;

use vax_model::{
    EnrichedRow, LocationRecord, LocationSeries, Observation, ReferenceTables,
};
use vax_output::{
    automation_states, location_documents, summarize_location, write_automation_csv,
    write_json, write_locations_csv,
};

fn date(s: &str) -> NaiveDate {
    s.parse().unwrap()
}

fn enriched(location: &str, day: &str, total: Option<i64>) -> EnrichedRow {
    EnrichedRow {
        location: location.to_string(),
        iso_code: Some("TST".to_string()),
        date: date(day),
        total_vaccinations: total,
        people_vaccinated: None,
        people_fully_vaccinated: None,
        total_boosters: None,
        daily_vaccinations_raw: None,
        daily_vaccinations: total.map(|t| t / 10),
        total_vaccinations_per_hundred: None,
        people_vaccinated_per_hundred: None,
        people_fully_vaccinated_per_hundred: None,
        total_boosters_per_hundred: None,
        daily_vaccinations_per_million: None,
    }
}

fn reference() -> ReferenceTables {
    let mut tables = ReferenceTables::new();
    tables.insert_location(LocationRecord {
        location: "Testland".to_string(),
        iso_code: "TST".to_string(),
        continent: Some("Europe".to_string()),
        income_group: None,
        eu_member: false,
        automated: true,
    });
    tables
}

#[test]
fn json_documents_omit_null_fields() {
    let rows = vec![
        enriched("Testland", "2021-01-01", Some(100)),
        enriched("Testland", "2021-01-02", None),
    ];
    let documents = location_documents(&rows);
    assert_eq!(documents.len(), 1);

    let mut buffer = Vec::new();
    write_json(&documents, &mut buffer).unwrap();
    let text = String::from_utf8(buffer).unwrap();
    let value: serde_json::Value = serde_json::from_str(&text).unwrap();
    let data = value[0]["data"].as_array().unwrap();
    assert_eq!(data.len(), 2);
    assert_eq!(data[0]["total_vaccinations"], 100);
    // Second point reported nothing; only the date survives.
    assert!(data[1].get("total_vaccinations").is_none());
    assert!(data[1].get("daily_vaccinations").is_none());
    assert_eq!(data[1]["date"], "2021-01-02");
}

#[test]
fn documents_group_by_location_with_sorted_dates() {
    let rows = vec![
        enriched("Bland", "2021-01-02", Some(20)),
        enriched("Aland", "2021-01-01", Some(10)),
        enriched("Bland", "2021-01-01", Some(10)),
    ];
    let documents = location_documents(&rows);
    assert_eq!(documents[0].location, "Aland");
    assert_eq!(documents[1].location, "Bland");
    assert_eq!(documents[1].data[0].date, date("2021-01-01"));
}

#[test]
fn location_summary_pretty_prints_vaccines() {
    let series = LocationSeries::from_rows(
        "Testland",
        vec![
            Observation {
                location: "Testland".to_string(),
                date: date("2021-01-01"),
                vaccine: vec!["Pfizer/BioNTech".to_string()],
                source_url: "https://health.test/old".to_string(),
                total_vaccinations: Some(100),
                people_vaccinated: None,
                people_fully_vaccinated: None,
                total_boosters: None,
            },
            Observation {
                location: "Testland".to_string(),
                date: date("2021-01-02"),
                vaccine: vec!["Moderna".to_string(), "Pfizer/BioNTech".to_string()],
                source_url: "https://health.test/new".to_string(),
                total_vaccinations: Some(150),
                people_vaccinated: None,
                people_fully_vaccinated: None,
                total_boosters: None,
            },
        ],
    );
    let summary = summarize_location(&series, &reference()).unwrap();
    assert_eq!(summary.vaccines, "Moderna, Pfizer/BioNTech");
    assert_eq!(summary.last_observation_date, date("2021-01-02"));
    assert_eq!(summary.source_url, "https://health.test/new");
    assert_eq!(summary.iso_code.as_deref(), Some("TST"));

    let mut buffer = Vec::new();
    write_locations_csv(&[summary], &mut buffer).unwrap();
    let text = String::from_utf8(buffer).unwrap();
    assert!(text.starts_with("location,iso_code,vaccines,last_observation_date,source_url"));
}

#[test]
fn empty_series_has_no_summary() {
    let series = LocationSeries::new("Testland");
    assert!(summarize_location(&series, &reference()).is_none());
}

#[test]
fn automation_states_cover_every_location() {
    let mut dataset = BTreeMap::new();
    dataset.insert("Testland".to_string(), LocationSeries::new("Testland"));
    dataset.insert("Handland".to_string(), LocationSeries::new("Handland"));

    let states = automation_states(&dataset, &reference());
    assert_eq!(states.len(), 2);
    assert_eq!(states[0].location, "Handland");
    assert!(!states[0].automated);
    assert!(states[1].automated);

    let mut buffer = Vec::new();
    write_automation_csv(&states, &mut buffer).unwrap();
    let text = String::from_utf8(buffer).unwrap();
    assert!(text.starts_with("location,automated"));
    assert!(text.contains("Testland,true"));
}
