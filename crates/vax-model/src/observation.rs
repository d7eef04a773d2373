use std::fmt;

use chrono::NaiveDate;

/// The four cumulative counters tracked per location.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    TotalVaccinations,
    PeopleVaccinated,
    PeopleFullyVaccinated,
    TotalBoosters,
}

impl Metric {
    pub const ALL: [Metric; 4] = [
        Metric::TotalVaccinations,
        Metric::PeopleVaccinated,
        Metric::PeopleFullyVaccinated,
        Metric::TotalBoosters,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Metric::TotalVaccinations => "total_vaccinations",
            Metric::PeopleVaccinated => "people_vaccinated",
            Metric::PeopleFullyVaccinated => "people_fully_vaccinated",
            Metric::TotalBoosters => "total_boosters",
        }
    }

    pub fn parse(name: &str) -> Option<Metric> {
        match name.trim() {
            "total_vaccinations" => Some(Metric::TotalVaccinations),
            "people_vaccinated" => Some(Metric::PeopleVaccinated),
            "people_fully_vaccinated" => Some(Metric::PeopleFullyVaccinated),
            "total_boosters" => Some(Metric::TotalBoosters),
            _ => None,
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One location's metrics for one day.
///
/// Metric fields are `None` when the source did not report that counter,
/// so "is this column present" is a `Some`/`None` test rather than a
/// runtime membership check.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Observation {
    pub location: String,
    pub date: NaiveDate,
    /// Vaccine brands in use on this date, deduplicated and sorted.
    pub vaccine: Vec<String>,
    pub source_url: String,
    pub total_vaccinations: Option<i64>,
    pub people_vaccinated: Option<i64>,
    pub people_fully_vaccinated: Option<i64>,
    pub total_boosters: Option<i64>,
}

impl Observation {
    pub fn metric(&self, metric: Metric) -> Option<i64> {
        match metric {
            Metric::TotalVaccinations => self.total_vaccinations,
            Metric::PeopleVaccinated => self.people_vaccinated,
            Metric::PeopleFullyVaccinated => self.people_fully_vaccinated,
            Metric::TotalBoosters => self.total_boosters,
        }
    }
}

/// Ordered-by-date collection of observations sharing one location.
///
/// Mutated only through the upsert engine; persisted as one file per
/// location. Rows are kept sorted by date after every mutation.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct LocationSeries {
    pub location: String,
    pub rows: Vec<Observation>,
}

impl LocationSeries {
    pub fn new(location: impl Into<String>) -> Self {
        Self {
            location: location.into(),
            rows: Vec::new(),
        }
    }

    /// Build a series from unordered rows, sorting by date.
    pub fn from_rows(location: impl Into<String>, mut rows: Vec<Observation>) -> Self {
        rows.sort_by_key(|row| row.date);
        Self {
            location: location.into(),
            rows,
        }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn sort_by_date(&mut self) {
        self.rows.sort_by_key(|row| row.date);
    }

    /// Latest persisted date, if any row exists.
    pub fn max_date(&self) -> Option<NaiveDate> {
        self.rows.iter().map(|row| row.date).max()
    }

    /// Largest `total_vaccinations` reported so far.
    pub fn max_total(&self) -> Option<i64> {
        self.rows
            .iter()
            .filter_map(|row| row.total_vaccinations)
            .max()
    }

    pub fn row_at(&self, date: NaiveDate) -> Option<&Observation> {
        self.rows.iter().find(|row| row.date == date)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    fn obs(day: &str, total: Option<i64>) -> Observation {
        Observation {
            location: "Testland".to_string(),
            date: date(day),
            vaccine: vec!["Pfizer/BioNTech".to_string()],
            source_url: "https://example.org".to_string(),
            total_vaccinations: total,
            people_vaccinated: None,
            people_fully_vaccinated: None,
            total_boosters: None,
        }
    }

    #[test]
    fn from_rows_sorts_by_date() {
        let series = LocationSeries::from_rows(
            "Testland",
            vec![obs("2021-01-03", Some(30)), obs("2021-01-01", Some(10))],
        );
        assert_eq!(series.rows[0].date, date("2021-01-01"));
        assert_eq!(series.max_date(), Some(date("2021-01-03")));
        assert_eq!(series.max_total(), Some(30));
    }

    #[test]
    fn max_total_skips_nulls() {
        let series = LocationSeries::from_rows(
            "Testland",
            vec![obs("2021-01-01", None), obs("2021-01-02", Some(5))],
        );
        assert_eq!(series.max_total(), Some(5));
    }

    #[test]
    fn metric_roundtrip() {
        for metric in Metric::ALL {
            assert_eq!(Metric::parse(metric.as_str()), Some(metric));
        }
        assert_eq!(Metric::parse("daily_vaccinations"), None);
    }
}
