//! Tests for the series upsert and batch merge engine.

use chrono::NaiveDate;
use proptest::prelude::*;

use vax_ingest::{UpsertOutcome, merge_with_current_data, upsert};
use vax_model::{LocationSeries, Observation};

fn date(s: &str) -> NaiveDate {
    s.parse().unwrap()
}

fn obs(day: &str, total: Option<i64>) -> Observation {
    Observation {
        location: "Testland".to_string(),
        date: date(day),
        vaccine: vec!["Moderna".to_string()],
        source_url: "https://health.test".to_string(),
        total_vaccinations: total,
        people_vaccinated: None,
        people_fully_vaccinated: None,
        total_boosters: None,
    }
}

fn series(rows: Vec<Observation>) -> LocationSeries {
    LocationSeries::from_rows("Testland", rows)
}

#[test]
fn first_observation_creates_the_series() {
    let mut s = LocationSeries::new("Testland");
    let outcome = upsert(&mut s, obs("2021-01-01", Some(100))).unwrap();
    assert_eq!(outcome, UpsertOutcome::Appended);
    assert_eq!(s.len(), 1);
}

#[test]
fn increased_total_on_new_date_appends() {
    let mut s = series(vec![obs("2021-01-01", Some(100))]);
    let outcome = upsert(&mut s, obs("2021-01-02", Some(150))).unwrap();
    assert_eq!(outcome, UpsertOutcome::Appended);
    assert_eq!(s.len(), 2);
}

#[test]
fn regressed_total_is_discarded() {
    let mut s = series(vec![obs("2021-01-01", Some(100))]);
    let outcome = upsert(&mut s, obs("2021-01-02", Some(90))).unwrap();
    assert_eq!(outcome, UpsertOutcome::Discarded);
    assert_eq!(s.len(), 1);
}

#[test]
fn earlier_date_is_discarded_even_with_higher_total() {
    // Once 01-04 exists, an incoming 01-02 row is stale by the
    // date-before-maximum rule regardless of its value.
    let mut s = series(vec![obs("2021-01-02", Some(150)), obs("2021-01-04", Some(300))]);
    let outcome = upsert(&mut s, obs("2021-01-02", Some(140))).unwrap();
    assert_eq!(outcome, UpsertOutcome::Discarded);
    assert_eq!(s.row_at(date("2021-01-02")).unwrap().total_vaccinations, Some(150));
}

#[test]
fn same_day_rescrape_with_higher_total_overwrites() {
    let mut s = series(vec![obs("2021-01-01", Some(100)), obs("2021-01-02", Some(150))]);
    let mut corrected = obs("2021-01-02", Some(160));
    corrected.people_vaccinated = Some(120);
    let outcome = upsert(&mut s, corrected).unwrap();
    assert_eq!(outcome, UpsertOutcome::Overwritten);
    assert_eq!(s.len(), 2);
    let row = s.row_at(date("2021-01-02")).unwrap();
    assert_eq!(row.total_vaccinations, Some(160));
    assert_eq!(row.people_vaccinated, Some(120));
}

#[test]
fn same_day_rescrape_with_lower_total_is_discarded() {
    let mut s = series(vec![obs("2021-01-02", Some(150))]);
    let outcome = upsert(&mut s, obs("2021-01-02", Some(140))).unwrap();
    assert_eq!(outcome, UpsertOutcome::Discarded);
    assert_eq!(s.row_at(date("2021-01-02")).unwrap().total_vaccinations, Some(150));
}

#[test]
fn upsert_is_idempotent() {
    let mut once = series(vec![obs("2021-01-01", Some(100))]);
    upsert(&mut once, obs("2021-01-02", Some(150))).unwrap();

    let mut twice = series(vec![obs("2021-01-01", Some(100))]);
    upsert(&mut twice, obs("2021-01-02", Some(150))).unwrap();
    upsert(&mut twice, obs("2021-01-02", Some(150))).unwrap();

    assert_eq!(once, twice);
}

#[test]
fn location_mismatch_is_rejected_without_mutation() {
    let mut s = series(vec![obs("2021-01-01", Some(100))]);
    let mut other = obs("2021-01-02", Some(200));
    other.location = "Elsewhere".to_string();
    assert!(upsert(&mut s, other).is_err());
    assert_eq!(s.len(), 1);
}

#[test]
fn batch_merge_new_data_wins_on_overlap() {
    let persisted = series(vec![
        obs("2021-01-01", Some(100)),
        obs("2021-01-02", Some(150)),
        obs("2021-01-03", Some(200)),
    ]);
    let batch = series(vec![obs("2021-01-02", Some(155)), obs("2021-01-04", Some(260))]);

    let merged = merge_with_current_data(batch, &persisted).unwrap();
    assert_eq!(merged.len(), 4);
    assert_eq!(merged.row_at(date("2021-01-02")).unwrap().total_vaccinations, Some(155));
    assert_eq!(merged.row_at(date("2021-01-03")).unwrap().total_vaccinations, Some(200));
    // Re-sorted union.
    let dates: Vec<NaiveDate> = merged.rows.iter().map(|r| r.date).collect();
    let mut sorted = dates.clone();
    sorted.sort();
    assert_eq!(dates, sorted);
}

#[test]
fn batch_merge_collapses_duplicate_dates_to_the_last_row() {
    let persisted = series(vec![obs("2021-01-01", Some(100))]);
    // A re-scraped batch can repeat a date; only its last row counts.
    let batch = series(vec![
        obs("2021-01-02", Some(150)),
        obs("2021-01-02", Some(160)),
    ]);

    let merged = merge_with_current_data(batch, &persisted).unwrap();
    assert_eq!(merged.len(), 2);
    let dates: Vec<NaiveDate> = merged.rows.iter().map(|r| r.date).collect();
    let mut deduped = dates.clone();
    deduped.dedup();
    assert_eq!(dates, deduped, "duplicate dates survived: {dates:?}");
    assert_eq!(merged.row_at(date("2021-01-02")).unwrap().total_vaccinations, Some(160));
}

#[test]
fn batch_merge_keeps_non_overlapping_history() {
    let persisted = series(vec![obs("2021-01-01", Some(100))]);
    let batch = series(vec![obs("2021-02-01", Some(500))]);
    let merged = merge_with_current_data(batch, &persisted).unwrap();
    assert_eq!(merged.len(), 2);
    assert_eq!(merged.rows[0].date, date("2021-01-01"));
}

proptest! {
    /// After any sequence of upserts, `total_vaccinations` is non-decreasing
    /// by date.
    #[test]
    fn upsert_preserves_monotonic_totals(
        offsets in prop::collection::vec((0u32..60, 0i64..1_000_000), 1..40)
    ) {
        let start = date("2021-01-01");
        let mut s = LocationSeries::new("Testland");
        for (offset, total) in offsets {
            let day = start + chrono::Duration::days(i64::from(offset));
            let incoming = Observation {
                date: day,
                total_vaccinations: Some(total),
                ..obs("2021-01-01", None)
            };
            upsert(&mut s, incoming).unwrap();
        }
        let totals: Vec<i64> = s.rows.iter().filter_map(|r| r.total_vaccinations).collect();
        for pair in totals.windows(2) {
            prop_assert!(pair[0] <= pair[1]);
        }
    }

    /// At most one row per date survives any upsert sequence.
    #[test]
    fn upsert_keeps_dates_unique(
        offsets in prop::collection::vec((0u32..30, 0i64..1_000_000), 1..40)
    ) {
        let start = date("2021-01-01");
        let mut s = LocationSeries::new("Testland");
        for (offset, total) in offsets {
            let day = start + chrono::Duration::days(i64::from(offset));
            let incoming = Observation {
                date: day,
                total_vaccinations: Some(total),
                ..obs("2021-01-01", None)
            };
            upsert(&mut s, incoming).unwrap();
        }
        let mut dates: Vec<NaiveDate> = s.rows.iter().map(|r| r.date).collect();
        let before = dates.len();
        dates.dedup();
        prop_assert_eq!(before, dates.len());
    }
}
