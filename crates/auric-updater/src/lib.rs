//! Price-update orchestration: walks the priced catalog, reprices every
//! variant against a rate snapshot, and produces a run summary.

pub mod error;
pub mod runner;
pub mod types;

pub use error::UpdateError;
pub use runner::{UpdateOptions, UpdateRunner};
pub use types::{ProductReport, RunStatistics, RunSummary, VariantChangeRecord, VariantStatus};
