//! The per-run orchestrator: rate validation, catalog walk, per-product rate
//! metafield writes, and the per-variant repricing state machine.

use chrono::Utc;
use rust_decimal::Decimal;
use uuid::Uuid;

use auric_catalog::{CatalogClient, CatalogError, CatalogProduct, CatalogVariant};
use auric_core::keys::{
    ATTR_NAMESPACE, GOLD_RATE_KEY, METAL_WEIGHT_KEY, NUMBER_DECIMAL_TYPE, RATE_NAMESPACE,
    SILVER_RATE_KEY, STONE_CARATS_KEY, STONE_PRICES_KEY, STONE_PRICE_KEY, STONE_TYPES_KEY,
};
use auric_core::RateSnapshot;
use auric_pricing::{
    calculate_price,
    metafields::{resolve_decimal, resolve_decimal_list, resolve_optional_decimal, resolve_string_list},
    PricingSettings,
};

use crate::error::UpdateError;
use crate::types::{ProductReport, RunStatistics, RunSummary, VariantChangeRecord, VariantStatus};

/// Price movements below a hundredth of a currency unit are noise, not
/// changes.
const MIN_PRICE_DELTA: Decimal = Decimal::from_parts(1, 0, 0, false, 2);

#[derive(Debug, Clone, Copy)]
pub struct UpdateOptions {
    /// Compute and report everything, write nothing.
    pub dry_run: bool,
    /// Write the fresh rates into each product's marker metafields.
    pub update_rate_metafields: bool,
}

impl Default for UpdateOptions {
    fn default() -> Self {
        Self {
            dry_run: false,
            update_rate_metafields: true,
        }
    }
}

/// Drives one complete price-update run.
pub struct UpdateRunner<'a> {
    catalog: &'a CatalogClient,
    settings: PricingSettings,
    options: UpdateOptions,
}

impl<'a> UpdateRunner<'a> {
    #[must_use]
    pub fn new(catalog: &'a CatalogClient, settings: PricingSettings, options: UpdateOptions) -> Self {
        Self {
            catalog,
            settings,
            options,
        }
    }

    /// Runs the update against `rates` and returns the summary.
    ///
    /// Product-level problems are isolated: the product is marked failed in
    /// the summary and the run continues. Only rate validation and the
    /// initial catalog listing abort the run.
    ///
    /// # Errors
    ///
    /// [`UpdateError::InvalidRates`] when either rate is non-positive
    /// (checked before any catalog call), or [`UpdateError::Catalog`] when
    /// the product listing itself fails.
    pub async fn run(&self, rates: &RateSnapshot) -> Result<RunSummary, UpdateError> {
        if !rates.is_valid() {
            return Err(UpdateError::InvalidRates {
                gold: rates.gold_rate_per_gram,
                silver: rates.silver_rate_per_gram,
            });
        }

        tracing::info!(
            gold = %rates.gold_rate_per_gram,
            silver = %rates.silver_rate_per_gram,
            currency = %rates.currency,
            dry_run = self.options.dry_run,
            "price update started"
        );

        let products = self.catalog.list_priced_products().await?;
        if products.is_empty() {
            tracing::warn!("no products carry the rate-marker metafields");
        }

        let mut stats = RunStatistics::default();
        let mut reports = Vec::with_capacity(products.len());
        for product in &products {
            reports.push(self.process_product(product, rates, &mut stats).await);
        }

        tracing::info!(
            products_processed = stats.products_processed,
            variants_updated = stats.variants_updated,
            variants_skipped = stats.variants_skipped,
            variants_failed = stats.variants_failed,
            metafields_updated = stats.metafields_updated,
            metafields_failed = stats.metafields_failed,
            errors = stats.errors.len(),
            "price update completed"
        );

        Ok(RunSummary {
            run_id: Uuid::new_v4(),
            timestamp: Utc::now(),
            gold_rate: rates.gold_rate_per_gram,
            silver_rate: rates.silver_rate_per_gram,
            currency: rates.currency.clone(),
            dry_run: self.options.dry_run,
            statistics: stats,
            products: reports,
        })
    }

    /// Processes one product, isolating its failures into the report.
    async fn process_product(
        &self,
        product: &CatalogProduct,
        rates: &RateSnapshot,
        stats: &mut RunStatistics,
    ) -> ProductReport {
        let mut report = ProductReport {
            product_id: product.id,
            handle: product.handle.clone(),
            error: None,
            variants: Vec::with_capacity(product.variants.len()),
        };

        tracing::info!(handle = %product.handle, product_id = product.id, "processing product");

        match self.process_product_inner(product, rates, stats, &mut report).await {
            Ok(()) => stats.products_processed += 1,
            Err(err) => {
                let message = format!("error processing product {}: {err}", product.id);
                tracing::error!(product_id = product.id, error = %err, "product failed");
                stats.errors.push(message.clone());
                report.error = Some(message);
            }
        }
        report
    }

    async fn process_product_inner(
        &self,
        product: &CatalogProduct,
        rates: &RateSnapshot,
        stats: &mut RunStatistics,
        report: &mut ProductReport,
    ) -> Result<(), CatalogError> {
        if self.options.update_rate_metafields && !self.options.dry_run {
            self.write_rate_metafields(product.id, rates, stats).await;
        }

        for variant in &product.variants {
            let record = self.process_variant(product, variant, rates, stats).await?;
            stats.count(record.status);
            report.variants.push(record);
        }
        Ok(())
    }

    /// Writes both rate markers. Both succeeding counts as one paired update;
    /// each failure is counted individually and variant processing continues
    /// either way.
    async fn write_rate_metafields(
        &self,
        product_id: i64,
        rates: &RateSnapshot,
        stats: &mut RunStatistics,
    ) {
        let writes = [
            (GOLD_RATE_KEY, rates.gold_rate_per_gram),
            (SILVER_RATE_KEY, rates.silver_rate_per_gram),
        ];

        let mut failures = 0u64;
        for (key, rate) in writes {
            let result = self
                .catalog
                .upsert_product_metafield(
                    product_id,
                    RATE_NAMESPACE,
                    key,
                    &rate.to_string(),
                    NUMBER_DECIMAL_TYPE,
                )
                .await;
            if let Err(err) = result {
                tracing::warn!(product_id, key, error = %err, "rate metafield write failed");
                failures += 1;
            }
        }

        if failures == 0 {
            stats.metafields_updated += 2;
        } else {
            stats.metafields_failed += failures;
        }
    }

    /// The per-variant state machine. Returns `Err` only when the variant's
    /// metafields cannot be fetched; a failed price write is a `Failed`
    /// record, not an error.
    async fn process_variant(
        &self,
        product: &CatalogProduct,
        variant: &CatalogVariant,
        rates: &RateSnapshot,
        stats: &mut RunStatistics,
    ) -> Result<VariantChangeRecord, CatalogError> {
        let option_label = variant.option1.clone().unwrap_or_default();
        let record = |new_price, status| VariantChangeRecord {
            variant_id: variant.id,
            option_label: option_label.clone(),
            old_price: variant.price,
            new_price,
            status,
        };

        let vmf = self.catalog.variant_metafields(variant.id).await?;
        let pmf = &product.metafields;

        let weight = resolve_decimal(
            &vmf,
            pmf,
            ATTR_NAMESPACE,
            METAL_WEIGHT_KEY,
            Decimal::ZERO,
            true,
        );
        if weight <= Decimal::ZERO {
            tracing::debug!(variant_id = variant.id, "skipped: no metal weight");
            return Ok(record(variant.price, VariantStatus::SkippedNoWeight));
        }

        let stone_types = resolve_string_list(&vmf, pmf, ATTR_NAMESPACE, STONE_TYPES_KEY);
        let stone_carats = resolve_decimal_list(&vmf, pmf, ATTR_NAMESPACE, STONE_CARATS_KEY);
        let stone_prices = resolve_decimal_list(&vmf, pmf, ATTR_NAMESPACE, STONE_PRICES_KEY);

        let Some(breakdown) = calculate_price(
            &self.settings,
            weight,
            &stone_types,
            &stone_carats,
            &stone_prices,
            &option_label,
            rates,
        ) else {
            tracing::warn!(
                variant_id = variant.id,
                option_label = %option_label,
                "skipped: option label is not a priceable metal"
            );
            return Ok(record(variant.price, VariantStatus::SkippedInvalidMetal));
        };

        // Stored stone cost drifting from the recomputed one is reported but
        // never gates the price decision.
        let stored_stone_price =
            resolve_optional_decimal(&vmf, pmf, ATTR_NAMESPACE, STONE_PRICE_KEY, false);
        if let Some(stored) = stored_stone_price {
            if (stored - breakdown.stone_cost).abs() >= MIN_PRICE_DELTA {
                tracing::info!(
                    variant_id = variant.id,
                    stored = %stored,
                    computed = %breakdown.stone_cost,
                    "stone cost drifted from stored value"
                );
                stats.variants_stone_price_changed += 1;
            }
        }

        let new_price = breakdown.total_price;
        tracing::info!(
            variant_id = variant.id,
            option_label = %option_label,
            metal = %breakdown.metal.display_name,
            metal_cost = %breakdown.metal_cost,
            stone_cost = %breakdown.stone_cost,
            making_charges = %breakdown.making_charges,
            markup_cost = %breakdown.markup_cost,
            gst_cost = %breakdown.gst_cost,
            old_price = %variant.price,
            new_price = %new_price,
            "computed price"
        );

        if (new_price - variant.price).abs() < MIN_PRICE_DELTA {
            return Ok(record(new_price, VariantStatus::NoChange));
        }
        if self.options.dry_run {
            return Ok(record(new_price, VariantStatus::DryRun));
        }

        match self.catalog.update_variant_price(variant.id, new_price).await {
            Ok(()) => Ok(record(new_price, VariantStatus::Updated)),
            Err(err) => {
                tracing::warn!(variant_id = variant.id, error = %err, "price write failed");
                Ok(record(new_price, VariantStatus::Failed))
            }
        }
    }
}
