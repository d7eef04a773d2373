//! One batch cycle: load → validate → aggregate → derive → sanity → export.
//!
//! Per-location failures are isolated: a location failing validation is
//! excluded from this cycle's output (its persisted history is untouched)
//! and the cycle continues for everyone else. A sanity failure on the
//! enriched table halts the export step entirely.

use std::collections::BTreeMap;
use std::fs::{self, File};
use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use tracing::{error, info, info_span, warn};

use vax_ingest::{SeriesStore, load_reference_tables, load_skip_list, load_vocabulary};
use vax_model::{
    AggregateRegion, CycleConfig, EnrichedRow, LocationSeries, RegionRule, default_regions,
};
use vax_output::{
    automation_states, location_documents, summarize_location, write_automation_csv,
    write_json, write_locations_csv, write_vaccinations_csv,
};
use vax_transform::{Aggregator, check_sanity, enrich_location};
use vax_validate::Validator;

use crate::types::{CycleResult, LocationOutcome};

pub struct CycleOptions {
    pub data_dir: PathBuf,
    pub reference_dir: PathBuf,
    pub output_dir: PathBuf,
    pub today: NaiveDate,
    pub dry_run: bool,
}

pub fn run_cycle(options: &CycleOptions) -> Result<CycleResult> {
    let span = info_span!("cycle", as_of = %options.today);
    let _guard = span.enter();

    let reference =
        load_reference_tables(&options.reference_dir).context("load reference tables")?;
    let config = CycleConfig {
        vocabulary: load_vocabulary(&options.reference_dir.join("vaccines.csv"))
            .context("load vaccine vocabulary")?,
        skips: load_skip_list(&options.reference_dir.join("skips.csv"))
            .context("load skip-list")?,
        ..CycleConfig::default()
    };

    let store = SeriesStore::new(&options.data_dir);
    let dataset = store.load_all().context("load persisted series")?;
    info!(
        locations = dataset.len(),
        dir = %store.dir().display(),
        "loaded persisted series"
    );

    // Validate every location; exclusions do not stop the cycle.
    let validator = Validator::new(&config, options.today);
    let mut published: BTreeMap<String, LocationSeries> = BTreeMap::new();
    let mut published_outcomes = Vec::new();
    let mut excluded = Vec::new();
    for (location, series) in dataset {
        let report = validator.validate(&series);
        for issue in &report.issues {
            match issue.severity {
                vax_validate::Severity::Error => error!(
                    location = %location,
                    category = %issue.category,
                    date = ?issue.date,
                    metric = ?issue.metric,
                    "{}",
                    issue.message
                ),
                vax_validate::Severity::Warning => warn!(
                    location = %location,
                    category = %issue.category,
                    "{}",
                    issue.message
                ),
            }
        }
        let outcome = LocationOutcome {
            location: location.clone(),
            rows: series.len(),
            errors: report.error_count(),
            warnings: report.warning_count(),
        };
        if report.has_errors() {
            error!(location = %location, "excluded from this publish cycle");
            excluded.push(outcome);
        } else {
            published.insert(location, series);
            published_outcomes.push(outcome);
        }
    }

    // Membership is intersected with the published set: an excluded
    // location drops out of its regions for this cycle instead of failing
    // them. The consistency check still guards hand-written region lists.
    let regions: Vec<AggregateRegion> = default_regions(&reference)
        .into_iter()
        .map(|mut region| {
            if let RegionRule::Included(members) = &mut region.rule {
                members.retain(|member| published.contains_key(member));
            }
            region
        })
        .collect();
    let aggregator = Aggregator::new(&published, options.today);
    let (aggregates, failures) = aggregator.aggregate_all(&regions);
    let failed_regions: Vec<String> = failures
        .iter()
        .map(|failure| {
            error!("{failure}");
            failure.to_string()
        })
        .collect();
    info!(regions = aggregates.len(), "aggregation complete");

    // Derive metrics for real and aggregate locations alike.
    let mut enriched: Vec<EnrichedRow> = Vec::new();
    for series in published.values().chain(aggregates.iter()) {
        enriched.extend(enrich_location(series, &reference));
    }
    enriched.sort_by(|a, b| (&a.location, a.date).cmp(&(&b.location, b.date)));

    // Better to fail the publish than emit data we ourselves think is broken.
    check_sanity(&enriched)?;

    let result = CycleResult {
        output_dir: options.output_dir.clone(),
        published: published_outcomes,
        excluded,
        aggregates: aggregates.iter().map(|s| s.location.clone()).collect(),
        failed_regions,
        enriched_rows: enriched.len(),
        dry_run: options.dry_run,
    };
    if options.dry_run {
        info!("dry run: skipping export");
        return Ok(result);
    }

    fs::create_dir_all(&options.output_dir).context("create output directory")?;
    write_vaccinations_csv(
        &enriched,
        File::create(options.output_dir.join("vaccinations.csv"))?,
    )
    .context("write vaccinations.csv")?;

    let documents = location_documents(&enriched);
    write_json(
        &documents,
        File::create(options.output_dir.join("vaccinations.json"))?,
    )
    .context("write vaccinations.json")?;

    let summaries: Vec<_> = published
        .values()
        .chain(aggregates.iter())
        .filter_map(|series| summarize_location(series, &reference))
        .collect();
    write_locations_csv(
        &summaries,
        File::create(options.output_dir.join("locations.csv"))?,
    )
    .context("write locations.csv")?;

    let states = automation_states(&published, &reference);
    write_automation_csv(
        &states,
        File::create(options.output_dir.join("automation_state.csv"))?,
    )
    .context("write automation_state.csv")?;

    info!(rows = enriched.len(), output = %options.output_dir.display(), "cycle exported");
    Ok(result)
}
