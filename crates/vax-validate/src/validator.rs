//! Per-location data contract validation.
//!
//! A series must pass every fatal check before it can feed aggregation:
//!
//! - **Schema**: non-empty vaccine list and source URL on every row.
//! - **Vaccine**: every named vaccine is in the accepted vocabulary;
//!   an unknown name is a hard failure (fail-closed — a new vaccine changes
//!   per-capita and aggregate math until a human extends the vocabulary).
//! - **Date**: within `[2020-12-01, today]`, unique within the series.
//! - **Location**: exactly one distinct location value.
//! - **Cross-metric**: `total_vaccinations ≥ people_vaccinated ≥
//!   people_fully_vaccinated` row-wise, ignoring null operands.
//! - **Monotonicity**: each metric non-decreasing along the date axis,
//!   unless the (location, date, metric) key is skip-listed.
//!
//! The anomaly check is advisory: real surges exist, so suspected
//! data-entry errors warn rather than block.

use std::collections::BTreeSet;

use chrono::NaiveDate;
use serde::Serialize;
use tracing::warn;

use vax_model::{
    AnomalyPolicy, CycleConfig, LocationSeries, Metric, Observation, SkipList, VaccineVocabulary,
};

/// No observation may predate the first public vaccination campaign.
const EARLIEST_DATE: NaiveDate = match NaiveDate::from_ymd_opt(2020, 12, 1) {
    Some(date) => date,
    None => panic!("invalid earliest date"),
};

/// Issue severity. Errors exclude the location from the current publish
/// cycle; warnings are advisory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Severity {
    Error,
    Warning,
}

/// A validation issue.
#[derive(Debug, Clone, Serialize)]
pub struct Issue {
    pub severity: Severity,
    pub category: String,
    pub date: Option<NaiveDate>,
    pub metric: Option<Metric>,
    pub message: String,
}

/// Validation report for one location's series.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ValidationReport {
    pub location: String,
    pub issues: Vec<Issue>,
}

impl ValidationReport {
    pub fn new(location: &str) -> Self {
        Self {
            location: location.to_string(),
            issues: Vec::new(),
        }
    }

    pub fn has_errors(&self) -> bool {
        self.issues.iter().any(|i| i.severity == Severity::Error)
    }

    pub fn error_count(&self) -> usize {
        self.issues
            .iter()
            .filter(|i| i.severity == Severity::Error)
            .count()
    }

    pub fn warning_count(&self) -> usize {
        self.issues
            .iter()
            .filter(|i| i.severity == Severity::Warning)
            .count()
    }
}

/// Validation context: borrowed cycle configuration plus the cycle's date.
pub struct Validator<'a> {
    vocabulary: &'a VaccineVocabulary,
    skips: &'a SkipList,
    anomaly: AnomalyPolicy,
    today: NaiveDate,
}

impl<'a> Validator<'a> {
    pub fn new(config: &'a CycleConfig, today: NaiveDate) -> Self {
        Self {
            vocabulary: &config.vocabulary,
            skips: &config.skips,
            anomaly: config.anomaly,
            today,
        }
    }

    /// Override the anomaly thresholds for this validator.
    pub fn with_anomaly_policy(mut self, policy: AnomalyPolicy) -> Self {
        self.anomaly = policy;
        self
    }

    /// Run every check against a series. Pure apart from tracing events.
    pub fn validate(&self, series: &LocationSeries) -> ValidationReport {
        let mut report = ValidationReport::new(&series.location);

        // Checks run over rows in date order regardless of caller ordering.
        let mut rows: Vec<&Observation> = series.rows.iter().collect();
        rows.sort_by_key(|row| row.date);

        self.check_location(series, &rows, &mut report);
        self.check_schema(&rows, &mut report);
        self.check_vaccines(&rows, &mut report);
        self.check_dates(&rows, &mut report);
        self.check_cross_metric(&rows, &mut report);
        self.check_monotonicity(series, &rows, &mut report);
        self.check_anomalies(series, &rows, &mut report);
        report
    }

    fn check_location(
        &self,
        series: &LocationSeries,
        rows: &[&Observation],
        report: &mut ValidationReport,
    ) {
        let distinct: BTreeSet<&str> = rows.iter().map(|row| row.location.as_str()).collect();
        if distinct.len() > 1 || distinct.iter().any(|name| *name != series.location) {
            report.issues.push(Issue {
                severity: Severity::Error,
                category: "location".to_string(),
                date: None,
                metric: None,
                message: format!(
                    "series for {} contains rows for {:?}",
                    series.location, distinct
                ),
            });
        }
    }

    fn check_schema(&self, rows: &[&Observation], report: &mut ValidationReport) {
        for row in rows {
            if row.source_url.trim().is_empty() {
                report.issues.push(Issue {
                    severity: Severity::Error,
                    category: "schema".to_string(),
                    date: Some(row.date),
                    metric: None,
                    message: format!("missing source_url on {}", row.date),
                });
            }
            if row.vaccine.is_empty() {
                report.issues.push(Issue {
                    severity: Severity::Error,
                    category: "schema".to_string(),
                    date: Some(row.date),
                    metric: None,
                    message: format!("missing vaccine list on {}", row.date),
                });
            }
        }
    }

    fn check_vaccines(&self, rows: &[&Observation], report: &mut ValidationReport) {
        let mut seen: BTreeSet<&str> = BTreeSet::new();
        for row in rows {
            for name in &row.vaccine {
                if !self.vocabulary.contains(name) && seen.insert(name) {
                    report.issues.push(Issue {
                        severity: Severity::Error,
                        category: "vaccine".to_string(),
                        date: Some(row.date),
                        metric: None,
                        message: format!("unknown vaccine `{name}` (first used {})", row.date),
                    });
                }
            }
        }
    }

    fn check_dates(&self, rows: &[&Observation], report: &mut ValidationReport) {
        let mut seen: BTreeSet<NaiveDate> = BTreeSet::new();
        for row in rows {
            if row.date < EARLIEST_DATE || row.date > self.today {
                report.issues.push(Issue {
                    severity: Severity::Error,
                    category: "date".to_string(),
                    date: Some(row.date),
                    metric: None,
                    message: format!(
                        "date {} outside [{EARLIEST_DATE}, {}]",
                        row.date, self.today
                    ),
                });
            }
            if !seen.insert(row.date) {
                report.issues.push(Issue {
                    severity: Severity::Error,
                    category: "date".to_string(),
                    date: Some(row.date),
                    metric: None,
                    message: format!("duplicate date {}", row.date),
                });
            }
        }
    }

    fn check_cross_metric(&self, rows: &[&Observation], report: &mut ValidationReport) {
        for row in rows {
            let pairs = [
                (Metric::TotalVaccinations, Metric::PeopleVaccinated),
                (Metric::PeopleVaccinated, Metric::PeopleFullyVaccinated),
            ];
            for (larger, smaller) in pairs {
                if let (Some(a), Some(b)) = (row.metric(larger), row.metric(smaller))
                    && a < b
                {
                    report.issues.push(Issue {
                        severity: Severity::Error,
                        category: "cross_metric".to_string(),
                        date: Some(row.date),
                        metric: Some(smaller),
                        message: format!(
                            "{larger} ({a}) < {smaller} ({b}) on {}",
                            row.date
                        ),
                    });
                }
            }
        }
    }

    fn check_monotonicity(
        &self,
        series: &LocationSeries,
        rows: &[&Observation],
        report: &mut ValidationReport,
    ) {
        for metric in Metric::ALL {
            let mut prev: Option<(NaiveDate, i64)> = None;
            for row in rows {
                let Some(value) = row.metric(metric) else {
                    continue;
                };
                if let Some((prev_date, prev_value)) = prev
                    && value < prev_value
                    && !self.skips.contains(&series.location, row.date, metric)
                {
                    report.issues.push(Issue {
                        severity: Severity::Error,
                        category: "monotonicity".to_string(),
                        date: Some(row.date),
                        metric: Some(metric),
                        message: format!(
                            "{metric} dropped from {prev_value} ({prev_date}) to {value} ({})",
                            row.date
                        ),
                    });
                }
                prev = Some((row.date, value));
            }
        }
    }

    /// Trailing rolling mean over the previous `window` rows, shifted by one
    /// (the current row never feeds its own baseline). Values at or below
    /// the floor are never flagged; skip-listed keys are silently accepted.
    fn check_anomalies(
        &self,
        series: &LocationSeries,
        rows: &[&Observation],
        report: &mut ValidationReport,
    ) {
        for metric in Metric::ALL {
            let values: Vec<Option<i64>> = rows.iter().map(|row| row.metric(metric)).collect();
            for (index, row) in rows.iter().enumerate() {
                let Some(value) = values[index] else {
                    continue;
                };
                if value <= self.anomaly.floor {
                    continue;
                }
                let window_start = index.saturating_sub(self.anomaly.window);
                let window: Vec<f64> = values[window_start..index]
                    .iter()
                    .flatten()
                    .map(|&v| v as f64)
                    .collect();
                if window.len() < self.anomaly.min_points {
                    continue;
                }
                let mean = window.iter().sum::<f64>() / window.len() as f64;
                if mean <= 0.0 || (value as f64) / mean <= self.anomaly.ratio {
                    continue;
                }
                if self.skips.contains(&series.location, row.date, metric) {
                    continue;
                }
                warn!(
                    location = %series.location,
                    date = %row.date,
                    metric = %metric,
                    observed = value,
                    trailing_mean = mean,
                    "suspected data-entry error"
                );
                report.issues.push(Issue {
                    severity: Severity::Warning,
                    category: "anomaly".to_string(),
                    date: Some(row.date),
                    metric: Some(metric),
                    message: format!(
                        "{metric} = {value} on {} is {:.1}x its trailing mean ({mean:.0})",
                        row.date,
                        value as f64 / mean
                    ),
                });
            }
        }
    }
}
