//! Series upsert and batch merge.
//!
//! Incremental adapters feed one observation per run; batch adapters supply
//! a whole replacement series. Both paths leave the persisted series sorted
//! by date with at most one row per date, and neither lets a stale or
//! regressed scrape move history backwards.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use tracing::debug;

use vax_model::{LocationSeries, Observation, Result, VaxError};

/// What the upsert engine decided to do with an incoming observation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
    /// New date, increased (or first) count: a row was added.
    Appended,
    /// Same-day re-scrape with corrected numbers: the row was replaced.
    Overwritten,
    /// Stale or regressed scrape: the series is unchanged.
    Discarded,
}

/// Integrate one incoming observation into a location's series.
///
/// Decision order, given the persisted maximum date and the series maximum
/// `total_vaccinations`:
/// 1. incoming total ≤ series maximum, or incoming date before the maximum
///    date → discard;
/// 2. incoming date equals the maximum date → overwrite that row;
/// 3. otherwise → append.
///
/// Applying the same observation twice is idempotent: the second call lands
/// in case 1 (equal total) or case 2 (identical overwrite).
pub fn upsert(series: &mut LocationSeries, incoming: Observation) -> Result<UpsertOutcome> {
    if incoming.location != series.location {
        return Err(VaxError::Schema(format!(
            "observation for {} cannot be merged into the {} series",
            incoming.location, series.location
        )));
    }

    let Some(max_date) = series.max_date() else {
        // First successful observation creates the series.
        series.rows.push(incoming);
        series.sort_by_date();
        return Ok(UpsertOutcome::Appended);
    };

    let regressed = match (incoming.total_vaccinations, series.max_total()) {
        (Some(value), Some(max)) => value <= max,
        _ => false,
    };
    if regressed || incoming.date < max_date {
        debug!(
            location = %series.location,
            date = %incoming.date,
            total = ?incoming.total_vaccinations,
            "discarding stale or regressed observation"
        );
        return Ok(UpsertOutcome::Discarded);
    }

    if incoming.date == max_date {
        for row in &mut series.rows {
            if row.date == max_date {
                *row = incoming;
                break;
            }
        }
        series.sort_by_date();
        return Ok(UpsertOutcome::Overwritten);
    }

    series.rows.push(incoming);
    series.sort_by_date();
    Ok(UpsertOutcome::Appended)
}

/// Merge a batch-sourced replacement series with the persisted one.
///
/// Every persisted row whose date does not appear in the batch is kept;
/// dates present in the batch take the batch's values, and duplicate dates
/// within the batch collapse to the last row. The union is re-sorted, with
/// at most one row per date.
pub fn merge_with_current_data(
    batch: LocationSeries,
    persisted: &LocationSeries,
) -> Result<LocationSeries> {
    if batch.location != persisted.location {
        return Err(VaxError::Schema(format!(
            "batch for {} cannot be merged into the {} series",
            batch.location, persisted.location
        )));
    }

    let mut latest: BTreeMap<NaiveDate, Observation> = BTreeMap::new();
    for row in batch.rows {
        latest.insert(row.date, row);
    }
    let mut rows: Vec<Observation> = persisted
        .rows
        .iter()
        .filter(|row| !latest.contains_key(&row.date))
        .cloned()
        .collect();
    rows.extend(latest.into_values());

    Ok(LocationSeries::from_rows(persisted.location.clone(), rows))
}
