use std::path::PathBuf;

/// Validation outcome for one location in a cycle.
#[derive(Debug, Clone)]
pub struct LocationOutcome {
    pub location: String,
    pub rows: usize,
    pub errors: usize,
    pub warnings: usize,
}

/// What one batch cycle did, for the summary and the exit code.
#[derive(Debug)]
pub struct CycleResult {
    pub output_dir: PathBuf,
    pub published: Vec<LocationOutcome>,
    pub excluded: Vec<LocationOutcome>,
    /// Aggregate regions produced this cycle.
    pub aggregates: Vec<String>,
    /// Regions skipped for consistency failures.
    pub failed_regions: Vec<String>,
    /// Rows in the enriched long-format table.
    pub enriched_rows: usize,
    pub dry_run: bool,
}

/// Per-location counters from an ingest call.
#[derive(Debug, Default, Clone, Copy)]
pub struct IngestCounters {
    pub appended: usize,
    pub overwritten: usize,
    pub discarded: usize,
}

/// What one ingest call did.
#[derive(Debug, Default)]
pub struct IngestReport {
    pub locations: Vec<(String, IngestCounters)>,
}
