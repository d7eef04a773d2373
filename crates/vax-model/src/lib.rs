pub mod config;
pub mod enriched;
pub mod error;
pub mod observation;
pub mod reference;

pub use config::{
    AggregateRegion, AnomalyPolicy, CycleConfig, RegionRule, SkipList, VaccineVocabulary,
    default_regions,
};
pub use enriched::EnrichedRow;
pub use error::{Result, VaxError};
pub use observation::{LocationSeries, Metric, Observation};
pub use reference::{LocationRecord, ReferenceData, ReferenceTables};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn skip_list_lookup() {
        let mut skips = SkipList::default();
        let date = "2021-03-01".parse().unwrap();
        skips.insert("Testland", date, Metric::TotalVaccinations);

        assert!(skips.contains("Testland", date, Metric::TotalVaccinations));
        assert!(!skips.contains("Testland", date, Metric::PeopleVaccinated));
        assert!(!skips.contains("Elsewhere", date, Metric::TotalVaccinations));
    }

    #[test]
    fn anomaly_policy_defaults() {
        let policy = AnomalyPolicy::default();
        assert_eq!(policy.floor, 10_000);
        assert_eq!(policy.window, 7);
        assert_eq!(policy.min_points, 2);
        assert!((policy.ratio - 6.0).abs() < f64::EPSILON);
    }

    #[test]
    fn error_messages_name_the_offender() {
        let error = VaxError::AggregateConsistency {
            region: "Europe".to_string(),
            missing: vec!["Atlantis".to_string()],
        };
        let text = error.to_string();
        assert!(text.contains("Europe"));
        assert!(text.contains("Atlantis"));
    }
}
