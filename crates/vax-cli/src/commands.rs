//! Subcommand entry points.

use std::collections::{BTreeMap, BTreeSet};
use std::fs::File;

use anyhow::{Context, Result, bail};
use chrono::Utc;
use comfy_table::Table;
use tracing::{debug, info, warn};

use vax_ingest::{
    SeriesStore, UpsertOutcome, merge_with_current_data, parse_record, unknown_fields, upsert,
};
use vax_model::{LocationSeries, Observation};

use vax_cli::pipeline::{CycleOptions, run_cycle};
use vax_cli::types::{CycleResult, IngestCounters, IngestReport};

use crate::cli::{IngestArgs, LocationsArgs, RunArgs};
use crate::summary::apply_table_style;

pub fn run(args: &RunArgs) -> Result<CycleResult> {
    let options = CycleOptions {
        data_dir: args.data_dir.clone(),
        reference_dir: args.reference_dir.clone(),
        output_dir: args
            .output_dir
            .clone()
            .unwrap_or_else(|| args.data_dir.join("output")),
        today: args.as_of.unwrap_or_else(|| Utc::now().date_naive()),
        dry_run: args.dry_run,
    };
    run_cycle(&options)
}

/// Merge a file of adapter records into the persisted series.
///
/// Incremental mode feeds records through the one-at-a-time upsert rules in
/// date order; batch mode treats each location's records as a replacement
/// series whose dates win over persisted history.
pub fn run_ingest(args: &IngestArgs) -> Result<IngestReport> {
    let file = File::open(&args.records)
        .with_context(|| format!("open {}", args.records.display()))?;
    let value: serde_json::Value =
        serde_json::from_reader(file).context("parse records file")?;
    let Some(records) = value.as_array() else {
        bail!("records file must contain a JSON array");
    };

    // The whole call fails before any series is touched if one record is
    // malformed.
    let mut by_location: BTreeMap<String, Vec<Observation>> = BTreeMap::new();
    for record in records {
        let observation = parse_record(record)?;
        let extras = unknown_fields(record);
        if !extras.is_empty() {
            warn!(
                location = %observation.location,
                fields = ?extras,
                "record carries fields outside the input contract"
            );
        }
        by_location
            .entry(observation.location.clone())
            .or_default()
            .push(observation);
    }

    let store = SeriesStore::new(&args.data_dir);
    let mut report = IngestReport::default();
    for (location, mut observations) in by_location {
        let persisted = store.load(&location)?;
        let mut counters = IngestCounters::default();
        let merged = if args.batch {
            let batch = LocationSeries::from_rows(location.clone(), observations);
            // Duplicate dates inside the batch collapse during the merge,
            // so count distinct dates rather than rows.
            let dates: BTreeSet<_> = batch.rows.iter().map(|row| row.date).collect();
            let overlap = dates
                .iter()
                .filter(|date| persisted.row_at(**date).is_some())
                .count();
            counters.overwritten = overlap;
            counters.appended = dates.len() - overlap;
            merge_with_current_data(batch, &persisted)?
        } else {
            let mut series = persisted;
            observations.sort_by_key(|obs| obs.date);
            for observation in observations {
                match upsert(&mut series, observation)? {
                    UpsertOutcome::Appended => counters.appended += 1,
                    UpsertOutcome::Overwritten => counters.overwritten += 1,
                    UpsertOutcome::Discarded => counters.discarded += 1,
                }
            }
            series
        };
        store.save(&merged)?;
        debug!(
            location = %location,
            appended = counters.appended,
            overwritten = counters.overwritten,
            discarded = counters.discarded,
            "ingested"
        );
        report.locations.push((location, counters));
    }
    info!(locations = report.locations.len(), "ingest complete");
    Ok(report)
}

pub fn run_locations(args: &LocationsArgs) -> Result<()> {
    let store = SeriesStore::new(&args.data_dir);
    let mut table = Table::new();
    table.set_header(vec!["Location", "Rows", "Last observation"]);
    apply_table_style(&mut table);
    for location in store.locations()? {
        let series = store.load(&location)?;
        let last = series
            .max_date()
            .map(|date| date.to_string())
            .unwrap_or_default();
        table.add_row(vec![location, series.len().to_string(), last]);
    }
    println!("{table}");
    Ok(())
}
