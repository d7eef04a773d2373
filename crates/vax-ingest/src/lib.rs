//! Ingest side of the vaccination pipeline: adapter record parsing, the
//! series upsert/merge engine, per-location persistence, and the reference
//! and configuration loaders.

pub mod metadata;
pub mod record;
pub mod store;
pub mod upsert;

pub use metadata::{
    load_locations, load_population, load_population_grouping, load_reference_tables,
    load_skip_list, load_vocabulary,
};
pub use record::{parse_date, parse_record, split_vaccines, unknown_fields};
pub use store::SeriesStore;
pub use upsert::{UpsertOutcome, merge_with_current_data, upsert};
