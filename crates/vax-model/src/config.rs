//! Per-cycle configuration: vaccine vocabulary, skip-lists, anomaly policy,
//! and aggregate-region definitions.
//!
//! All of these are explicit immutable values passed into the validator and
//! aggregator at call time, never ambient state, so two cycles (or two tests)
//! can run with different configurations side by side.

use std::collections::BTreeSet;

use chrono::NaiveDate;

use crate::Metric;
use crate::reference::ReferenceData;

/// The accepted-vaccine vocabulary.
///
/// An observation naming a vaccine outside this set fails validation hard:
/// a new vaccine changes per-capita and aggregate math, so the data is
/// untrustworthy until a human extends the vocabulary.
#[derive(Debug, Clone, Default)]
pub struct VaccineVocabulary {
    names: BTreeSet<String>,
}

impl VaccineVocabulary {
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            names: names.into_iter().map(Into::into).collect(),
        }
    }

    pub fn insert(&mut self, name: impl Into<String>) {
        self.names.insert(name.into());
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.contains(name)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

/// Operator-curated exceptions to the monotonic and anomaly checks,
/// keyed by (location, date, metric).
#[derive(Debug, Clone, Default)]
pub struct SkipList {
    entries: BTreeSet<(String, NaiveDate, Metric)>,
}

impl SkipList {
    pub fn insert(&mut self, location: impl Into<String>, date: NaiveDate, metric: Metric) {
        self.entries.insert((location.into(), date, metric));
    }

    pub fn contains(&self, location: &str, date: NaiveDate, metric: Metric) -> bool {
        self.entries
            .contains(&(location.to_string(), date, metric))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Tunable thresholds for the advisory anomaly check.
#[derive(Debug, Clone, Copy)]
pub struct AnomalyPolicy {
    /// Values at or below this floor are never flagged.
    pub floor: i64,
    /// Trailing window length, in rows.
    pub window: usize,
    /// Minimum non-null points required before the window yields a mean.
    pub min_points: usize,
    /// Flag when observed / trailing mean exceeds this ratio.
    pub ratio: f64,
}

impl Default for AnomalyPolicy {
    fn default() -> Self {
        Self {
            floor: 10_000,
            window: 7,
            min_points: 2,
            ratio: 6.0,
        }
    }
}

/// Membership rule for an aggregate region.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegionRule {
    /// Exactly the listed locations (e.g. a continent's members).
    Included(Vec<String>),
    /// All real locations except the listed ones (e.g. World).
    Excluded(Vec<String>),
}

/// A named virtual location summing a set of real locations.
///
/// Never persisted; recomputed in full on every aggregation pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AggregateRegion {
    pub name: String,
    pub rule: RegionRule,
}

impl AggregateRegion {
    pub fn included<I, S>(name: impl Into<String>, members: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            rule: RegionRule::Included(members.into_iter().map(Into::into).collect()),
        }
    }

    pub fn excluded<I, S>(name: impl Into<String>, excluded: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            rule: RegionRule::Excluded(excluded.into_iter().map(Into::into).collect()),
        }
    }
}

/// Everything the consolidation core needs for one cycle, loaded once and
/// passed by reference.
#[derive(Debug, Clone, Default)]
pub struct CycleConfig {
    pub vocabulary: VaccineVocabulary,
    pub skips: SkipList,
    pub anomaly: AnomalyPolicy,
    pub regions: Vec<AggregateRegion>,
}

/// Region names with membership derived from the reference tables.
const CONTINENTS: [&str; 6] = [
    "Africa",
    "Asia",
    "Europe",
    "North America",
    "Oceania",
    "South America",
];

const INCOME_GROUPS: [&str; 4] = [
    "High-income countries",
    "Upper-middle-income countries",
    "Lower-middle-income countries",
    "Low-income countries",
];

/// The standard set of aggregate regions: World, the six continents, the
/// four income groups, and the European Union.
pub fn default_regions(reference: &impl ReferenceData) -> Vec<AggregateRegion> {
    let mut regions = vec![AggregateRegion::excluded("World", Vec::<String>::new())];
    for name in CONTINENTS
        .iter()
        .chain(INCOME_GROUPS.iter())
        .chain(["European Union"].iter())
    {
        regions.push(AggregateRegion::included(
            *name,
            reference.members_of(name),
        ));
    }
    regions
}
