//! Library components of the pipeline CLI: logging setup, the cycle
//! orchestrator, and its result types.

pub mod logging;
pub mod pipeline;
pub mod types;
