use rust_decimal::Decimal;
use thiserror::Error;

use auric_catalog::CatalogError;

/// Fatal run-level failures. Product- and variant-level problems are not
/// errors here; they are isolated into the run summary.
#[derive(Debug, Error)]
pub enum UpdateError {
    /// A non-positive rate would reprice the whole catalog to garbage, so the
    /// run aborts before touching it.
    #[error("invalid rates: gold={gold}, silver={silver}; both must be positive")]
    InvalidRates { gold: Decimal, silver: Decimal },

    /// Catalog listing failed; nothing was processed.
    #[error(transparent)]
    Catalog(#[from] CatalogError),
}
