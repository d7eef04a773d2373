//! Aggregation engine: synthesize a series for every configured region
//! from the validated per-location series.
//!
//! Different locations report on different date sets, so each region is
//! built over the union of its members' dates. Per member and metric, a
//! reporting gap forward-fills the last known cumulative value; a member
//! that never reported a metric contributes zero. The member sums are then
//! grouped by date, and the current (possibly incomplete) day is dropped.

use std::collections::{BTreeMap, BTreeSet};

use chrono::NaiveDate;
use tracing::debug;

use vax_model::{
    AggregateRegion, LocationSeries, Metric, Observation, RegionRule, Result, VaxError,
};

/// Builds aggregate series over a validated base dataset.
///
/// The dataset must contain real locations only; callers exclude other
/// aggregates so regions never double count.
pub struct Aggregator<'a> {
    dataset: &'a BTreeMap<String, LocationSeries>,
    today: NaiveDate,
}

impl<'a> Aggregator<'a> {
    pub fn new(dataset: &'a BTreeMap<String, LocationSeries>, today: NaiveDate) -> Self {
        Self { dataset, today }
    }

    /// Synthesize one region's series. A region with zero qualifying
    /// members yields an empty series, not an error.
    pub fn aggregate(&self, region: &AggregateRegion) -> Result<LocationSeries> {
        let members = self.resolve_members(region)?;
        if members.is_empty() {
            debug!(region = %region.name, "no qualifying members");
            return Ok(LocationSeries::new(region.name.clone()));
        }

        let dates: BTreeSet<NaiveDate> = members
            .iter()
            .flat_map(|member| self.dataset[member].rows.iter().map(|row| row.date))
            .collect();

        let mut sums: BTreeMap<NaiveDate, [i64; 4]> = dates
            .iter()
            .map(|&date| (date, [0i64; 4]))
            .collect();
        let mut vaccines: BTreeSet<String> = BTreeSet::new();

        for member in &members {
            let series = &self.dataset[member];
            let by_date: BTreeMap<NaiveDate, &Observation> =
                series.rows.iter().map(|row| (row.date, row)).collect();
            for row in &series.rows {
                vaccines.extend(row.vaccine.iter().cloned());
            }
            for (slot, metric) in Metric::ALL.into_iter().enumerate() {
                // Carry the last known cumulative value forward; before a
                // member's first report it contributes zero, which also
                // covers members that never report this metric.
                let mut carried = 0i64;
                for &date in &dates {
                    if let Some(row) = by_date.get(&date)
                        && let Some(value) = row.metric(metric)
                    {
                        carried = value;
                    }
                    if let Some(totals) = sums.get_mut(&date) {
                        totals[slot] += carried;
                    }
                }
            }
        }

        let vaccine: Vec<String> = vaccines.into_iter().collect();
        let rows: Vec<Observation> = sums
            .into_iter()
            .filter(|(date, _)| *date < self.today)
            .map(|(date, totals)| Observation {
                location: region.name.clone(),
                date,
                vaccine: vaccine.clone(),
                source_url: String::new(),
                total_vaccinations: Some(totals[0]),
                people_vaccinated: Some(totals[1]),
                people_fully_vaccinated: Some(totals[2]),
                total_boosters: Some(totals[3]),
            })
            .collect();

        Ok(LocationSeries::from_rows(region.name.clone(), rows))
    }

    /// Aggregate every region, skipping (and reporting) regions whose
    /// membership list names locations absent from the dataset.
    pub fn aggregate_all(
        &self,
        regions: &[AggregateRegion],
    ) -> (Vec<LocationSeries>, Vec<VaxError>) {
        let mut series = Vec::new();
        let mut failures = Vec::new();
        for region in regions {
            match self.aggregate(region) {
                Ok(aggregate) => series.push(aggregate),
                Err(error) => failures.push(error),
            }
        }
        (series, failures)
    }

    fn resolve_members(&self, region: &AggregateRegion) -> Result<BTreeSet<String>> {
        match &region.rule {
            RegionRule::Included(list) => {
                let missing: Vec<String> = list
                    .iter()
                    .filter(|member| !self.dataset.contains_key(member.as_str()))
                    .cloned()
                    .collect();
                if !missing.is_empty() {
                    return Err(VaxError::AggregateConsistency {
                        region: region.name.clone(),
                        missing,
                    });
                }
                Ok(list.iter().cloned().collect())
            }
            RegionRule::Excluded(list) => {
                let excluded: BTreeSet<&str> = list.iter().map(String::as_str).collect();
                Ok(self
                    .dataset
                    .keys()
                    .filter(|location| !excluded.contains(location.as_str()))
                    .cloned()
                    .collect())
            }
        }
    }
}
