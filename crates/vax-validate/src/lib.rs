//! Observation validator: the per-location data contract gatekeeper
//! between the merge engine and the aggregation pass.

pub mod validator;

pub use validator::{Issue, Severity, ValidationReport, Validator};
