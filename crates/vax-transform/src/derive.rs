//! Derived metrics: daily deltas, smoothed daily rates, per-capita rates.
//!
//! The smoothed series defines the published calendar: within the date range
//! where `total_vaccinations` is known at both ends, the series is
//! re-indexed to every calendar day, totals are linearly interpolated, and
//! the first difference is run through a 7-day trailing mean. Dates outside
//! that range keep null derived values; implying zero activity before a
//! location started reporting would be misleading.

use std::collections::BTreeMap;

use chrono::{Duration, NaiveDate};
use tracing::debug;

use vax_model::{EnrichedRow, LocationSeries, Observation, ReferenceData};

/// Rolling window for the smoothed daily rate, in days.
const SMOOTHING_WINDOW: usize = 7;

/// Raw day-over-day change of `total_vaccinations`, aligned to the series'
/// date-sorted rows.
///
/// A gap wider than one day nulls the delta: a multi-day jump cannot be
/// attributed to a single day, so it is unknown rather than guessed.
pub fn daily_change(series: &LocationSeries) -> Vec<Option<i64>> {
    let mut rows: Vec<&Observation> = series.rows.iter().collect();
    rows.sort_by_key(|row| row.date);

    let mut deltas = vec![None; rows.len()];
    for index in 1..rows.len() {
        let (prev, cur) = (rows[index - 1], rows[index]);
        if (cur.date - prev.date) != Duration::days(1) {
            continue;
        }
        if let (Some(before), Some(after)) = (prev.total_vaccinations, cur.total_vaccinations) {
            deltas[index] = Some(after - before);
        }
    }
    deltas
}

/// One day of the dense, smoothed calendar.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SmoothedPoint {
    pub date: NaiveDate,
    /// 7-day trailing mean of the interpolated daily change, rounded.
    pub daily_vaccinations: Option<i64>,
}

/// Smoothed daily change over a dense daily calendar.
///
/// The calendar covers every original observation date plus every day in
/// the known-total range; only the latter carry smoothed values.
pub fn smoothed_daily_change(series: &LocationSeries) -> Vec<SmoothedPoint> {
    let mut rows: Vec<&Observation> = series.rows.iter().collect();
    rows.sort_by_key(|row| row.date);

    let known: Vec<(NaiveDate, i64)> = rows
        .iter()
        .filter_map(|row| row.total_vaccinations.map(|total| (row.date, total)))
        .collect();

    let (first, last) = match (known.first(), known.last()) {
        (Some(&(first, _)), Some(&(last, _))) => (first, last),
        // No totals anywhere: every date stays null.
        _ => {
            return rows
                .iter()
                .map(|row| SmoothedPoint {
                    date: row.date,
                    daily_vaccinations: None,
                })
                .collect();
        }
    };

    // Interpolate totals across the dense calendar.
    let span = (last - first).num_days() as usize + 1;
    let mut interpolated = Vec::with_capacity(span);
    let mut segment = 0usize;
    for offset in 0..span {
        let date = first + Duration::days(offset as i64);
        while segment + 1 < known.len() && known[segment + 1].0 < date {
            segment += 1;
        }
        let (d0, v0) = known[segment];
        let value = if date == d0 {
            v0 as f64
        } else {
            let (d1, v1) = known[segment + 1];
            let progress = (date - d0).num_days() as f64 / (d1 - d0).num_days() as f64;
            v0 as f64 + (v1 - v0) as f64 * progress
        };
        interpolated.push((date, value));
    }

    // First difference, then a trailing mean with a minimum of one sample.
    let mut diffs: Vec<Option<f64>> = vec![None; span];
    for index in 1..span {
        diffs[index] = Some(interpolated[index].1 - interpolated[index - 1].1);
    }
    let mut smoothed: Vec<SmoothedPoint> = Vec::with_capacity(span);
    for index in 0..span {
        let window_start = index.saturating_sub(SMOOTHING_WINDOW - 1);
        let window: Vec<f64> = diffs[window_start..=index].iter().flatten().copied().collect();
        let value = if window.is_empty() {
            None
        } else {
            Some((window.iter().sum::<f64>() / window.len() as f64).round() as i64)
        };
        smoothed.push(SmoothedPoint {
            date: interpolated[index].0,
            daily_vaccinations: value,
        });
    }

    // Re-attach observation dates outside the known range, left as null.
    let mut calendar: BTreeMap<NaiveDate, Option<i64>> = rows
        .iter()
        .map(|row| (row.date, None))
        .collect();
    for point in smoothed {
        calendar.insert(point.date, point.daily_vaccinations);
    }
    calendar
        .into_iter()
        .map(|(date, daily_vaccinations)| SmoothedPoint {
            date,
            daily_vaccinations,
        })
        .collect()
}

fn per_capita(value: i64, population: f64, scale: f64) -> f64 {
    round2(value as f64 * scale / population)
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Build the enriched table rows for one location (real or aggregate).
///
/// Per-capita rates divide by the grouped population; rounding happens as
/// the final step, never mid-computation. A `people_fully_vaccinated` of
/// exactly 0 means the location has not started reporting that metric, so
/// its per-capita variant is null rather than 0% coverage.
pub fn enrich_location(
    series: &LocationSeries,
    reference: &impl ReferenceData,
) -> Vec<EnrichedRow> {
    let by_date: BTreeMap<NaiveDate, &Observation> =
        series.rows.iter().map(|row| (row.date, row)).collect();

    let raw_by_date: BTreeMap<NaiveDate, Option<i64>> = {
        let mut rows: Vec<&Observation> = series.rows.iter().collect();
        rows.sort_by_key(|row| row.date);
        rows.iter()
            .map(|row| row.date)
            .zip(daily_change(series))
            .collect()
    };

    let population = reference.population_of(&series.location);
    if population.is_none() {
        debug!(location = %series.location, "no population; per-capita rates stay null");
    }
    let iso_code = reference.iso_code_of(&series.location);

    let mut enriched = Vec::new();
    for point in smoothed_daily_change(series) {
        let observed = by_date.get(&point.date);
        let metric = |get: fn(&Observation) -> Option<i64>| observed.and_then(|row| get(row));

        let total_vaccinations = metric(|row| row.total_vaccinations);
        let people_vaccinated = metric(|row| row.people_vaccinated);
        let people_fully_vaccinated = metric(|row| row.people_fully_vaccinated);
        let total_boosters = metric(|row| row.total_boosters);

        let hundred = |value: Option<i64>| {
            value.zip(population).map(|(v, pop)| per_capita(v, pop, 100.0))
        };

        enriched.push(EnrichedRow {
            location: series.location.clone(),
            iso_code: iso_code.clone(),
            date: point.date,
            total_vaccinations,
            people_vaccinated,
            people_fully_vaccinated,
            total_boosters,
            daily_vaccinations_raw: raw_by_date.get(&point.date).copied().flatten(),
            daily_vaccinations: point.daily_vaccinations,
            total_vaccinations_per_hundred: hundred(total_vaccinations),
            people_vaccinated_per_hundred: hundred(people_vaccinated),
            people_fully_vaccinated_per_hundred: hundred(
                people_fully_vaccinated.filter(|&v| v != 0),
            ),
            total_boosters_per_hundred: hundred(total_boosters),
            daily_vaccinations_per_million: point
                .daily_vaccinations
                .zip(population)
                .map(|(v, pop)| per_capita(v, pop, 1_000_000.0)),
        });
    }
    enriched
}
