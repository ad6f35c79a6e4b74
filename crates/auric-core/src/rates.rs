use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One snapshot of metal spot rates, fixed for the duration of a run.
///
/// Both rates are per-gram prices in `currency`: 24K for gold, 925 sterling
/// for silver. Callers must validate positivity before pricing anything —
/// see [`RateSnapshot::is_valid`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateSnapshot {
    pub gold_rate_per_gram: Decimal,
    pub silver_rate_per_gram: Decimal,
    pub currency: String,
}

impl RateSnapshot {
    /// Returns `true` when both rates are strictly positive.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.gold_rate_per_gram > Decimal::ZERO && self.silver_rate_per_gram > Decimal::ZERO
    }
}
