//! Consumer-facing serializers for the enriched dataset: the long-format
//! vaccinations table, per-location JSON documents, the locations summary,
//! and the automation-state table.
//!
//! Exact byte layout for HTML/XLSX reports and database import lives with
//! external collaborators; this crate owns the CSV/JSON contract only.

pub mod json_doc;
pub mod locations;
pub mod vaccinations;

pub use json_doc::{LocationDocument, location_documents, write_json};
pub use locations::{
    AutomationState, LocationSummary, automation_states, summarize_location, write_automation_csv,
    write_locations_csv,
};
pub use vaccinations::write_vaccinations_csv;
