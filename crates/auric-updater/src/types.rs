//! Run accounting: per-variant outcomes, counters, and the summary document
//! written at the end of a run.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use uuid::Uuid;

/// Terminal outcome for one variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum VariantStatus {
    /// Price written to the catalog.
    Updated,
    /// Recomputed price within a hundredth of the stored one.
    NoChange,
    /// No usable metal weight at either tier.
    SkippedNoWeight,
    /// Option label resolved to no known metal.
    SkippedInvalidMetal,
    /// Would have been updated; suppressed by dry-run.
    DryRun,
    /// The price write failed.
    Failed,
}

/// One line of the per-product change log.
#[derive(Debug, Clone, Serialize)]
pub struct VariantChangeRecord {
    pub variant_id: i64,
    pub option_label: String,
    pub old_price: Decimal,
    pub new_price: Decimal,
    pub status: VariantStatus,
}

/// Counters for one run, owned by the orchestrator and returned by value.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RunStatistics {
    pub products_processed: u64,
    pub variants_updated: u64,
    pub variants_skipped: u64,
    pub variants_failed: u64,
    pub metafields_updated: u64,
    pub metafields_failed: u64,
    pub variants_stone_price_changed: u64,
    pub errors: Vec<String>,
}

impl RunStatistics {
    /// The single choke point mapping a variant outcome onto exactly one
    /// counter, so the counters always sum to the record count.
    pub(crate) fn count(&mut self, status: VariantStatus) {
        match status {
            VariantStatus::Updated | VariantStatus::DryRun => self.variants_updated += 1,
            VariantStatus::NoChange
            | VariantStatus::SkippedNoWeight
            | VariantStatus::SkippedInvalidMetal => self.variants_skipped += 1,
            VariantStatus::Failed => self.variants_failed += 1,
        }
    }

    #[must_use]
    pub fn has_failures(&self) -> bool {
        self.variants_failed > 0 || self.metafields_failed > 0 || !self.errors.is_empty()
    }
}

/// Per-product section of the summary. `error` is set when processing was
/// cut short; any variants handled before that point keep their records.
#[derive(Debug, Clone, Serialize)]
pub struct ProductReport {
    pub product_id: i64,
    pub handle: String,
    pub error: Option<String>,
    pub variants: Vec<VariantChangeRecord>,
}

/// The run artifact, serialized to JSON by the CLI.
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub run_id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub gold_rate: Decimal,
    pub silver_rate: Decimal,
    pub currency: String,
    pub dry_run: bool,
    pub statistics: RunStatistics,
    pub products: Vec<ProductReport>,
}

impl RunSummary {
    /// True when the process should exit non-zero.
    #[must_use]
    pub fn has_failures(&self) -> bool {
        self.statistics.has_failures()
    }
}
