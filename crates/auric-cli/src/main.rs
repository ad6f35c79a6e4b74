//! `auric` — reprices a jewelry storefront against live metal rates.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use rust_decimal::Decimal;
use tracing_subscriber::EnvFilter;

use auric_catalog::{CatalogClient, ThemeSettings};
use auric_core::{load_app_config, AppConfig, RateSnapshot};
use auric_pricing::PricingSettings;
use auric_rates::RateFeedClient;
use auric_updater::{UpdateOptions, UpdateRunner};

#[derive(Debug, Parser)]
#[command(name = "auric")]
#[command(about = "Jewelry price sync for a Shopify storefront")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Reprice every marked product against current metal rates.
    Update(UpdateArgs),
    /// Fetch and print the current rate snapshot.
    Rates,
}

#[derive(Debug, Args)]
struct UpdateArgs {
    /// Compute and report everything without writing to the store.
    #[arg(long)]
    dry_run: bool,

    /// Leave the per-product rate metafields untouched.
    #[arg(long)]
    skip_metafields: bool,

    /// Leave the theme's settings_data.json untouched.
    #[arg(long)]
    skip_theme: bool,

    /// Gold rate per gram; bypasses the rate feed when paired with
    /// --silver-rate.
    #[arg(long, requires = "silver_rate")]
    gold_rate: Option<Decimal>,

    /// Silver rate per gram; bypasses the rate feed when paired with
    /// --gold-rate.
    #[arg(long, requires = "gold_rate")]
    silver_rate: Option<Decimal>,

    /// Making charges as a percentage of the gold cost; bypasses theme
    /// settings when paired with --markup-pct.
    #[arg(long, requires = "markup_pct")]
    making_charges_pct: Option<Decimal>,

    /// Markup percentage; bypasses theme settings when paired with
    /// --making-charges-pct.
    #[arg(long, requires = "making_charges_pct")]
    markup_pct: Option<Decimal>,

    /// Where to write the run summary JSON.
    #[arg(long, default_value = "price_update_summary.json")]
    summary_out: PathBuf,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match load_app_config() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("configuration error: {err}");
            return ExitCode::FAILURE;
        }
    };

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.log_level.clone()));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let result = match cli.command {
        Commands::Update(args) => run_update(&config, &args).await,
        Commands::Rates => run_rates(&config).await,
    };

    match result {
        Ok(code) => code,
        Err(err) => {
            tracing::error!(error = %err, "run aborted");
            ExitCode::FAILURE
        }
    }
}

async fn run_update(config: &AppConfig, args: &UpdateArgs) -> anyhow::Result<ExitCode> {
    let catalog = CatalogClient::new(config)?;

    let rates = resolve_rates(config, args).await?;
    let settings = resolve_settings(config, args, &catalog).await;

    if !args.skip_theme && !args.dry_run {
        match config.theme_id.as_deref() {
            Some(theme_id) => {
                // A theme write failure is not fatal; variant prices are the
                // source of truth and still get updated.
                if let Err(err) = catalog.update_theme_settings(theme_id, &rates).await {
                    tracing::warn!(error = %err, "theme settings update failed, continuing");
                }
            }
            None => tracing::warn!("AURIC_THEME_ID not set, skipping theme settings update"),
        }
    }

    let runner = UpdateRunner::new(
        &catalog,
        settings,
        UpdateOptions {
            dry_run: args.dry_run,
            update_rate_metafields: !args.skip_metafields,
        },
    );
    let summary = runner.run(&rates).await?;

    let json = serde_json::to_string_pretty(&summary)?;
    std::fs::write(&args.summary_out, json)
        .with_context(|| format!("writing summary to {}", args.summary_out.display()))?;
    tracing::info!(path = %args.summary_out.display(), "run summary written");

    if summary.has_failures() {
        tracing::warn!("update completed with failures");
        Ok(ExitCode::FAILURE)
    } else {
        Ok(ExitCode::SUCCESS)
    }
}

async fn run_rates(config: &AppConfig) -> anyhow::Result<ExitCode> {
    let snapshot = feed_client(config)?.current_rates().await?;
    println!(
        "gold: {} {}/g\nsilver: {} {}/g",
        snapshot.currency, snapshot.gold_rate_per_gram, snapshot.currency, snapshot.silver_rate_per_gram,
    );
    Ok(ExitCode::SUCCESS)
}

/// Rates from the CLI overrides when both are given, otherwise from the feed.
async fn resolve_rates(config: &AppConfig, args: &UpdateArgs) -> anyhow::Result<RateSnapshot> {
    if let (Some(gold), Some(silver)) = (args.gold_rate, args.silver_rate) {
        tracing::info!(%gold, %silver, "using rate overrides");
        return Ok(RateSnapshot {
            gold_rate_per_gram: gold,
            silver_rate_per_gram: silver,
            currency: config.currency.clone(),
        });
    }
    Ok(feed_client(config)?.current_rates().await?)
}

/// Pricing settings from the CLI overrides when both are given, otherwise
/// from the theme; theme fetch failures degrade to the defaults.
async fn resolve_settings(
    config: &AppConfig,
    args: &UpdateArgs,
    catalog: &CatalogClient,
) -> PricingSettings {
    if let (Some(making), Some(markup)) = (args.making_charges_pct, args.markup_pct) {
        tracing::info!(%making, %markup, "using charge overrides");
        return PricingSettings::new(making, markup);
    }

    let theme = match config.theme_id.as_deref() {
        Some(theme_id) => match catalog.theme_settings(theme_id).await {
            Ok(theme) => theme,
            Err(err) => {
                tracing::warn!(error = %err, "theme settings fetch failed, using defaults");
                ThemeSettings::default()
            }
        },
        None => {
            tracing::warn!("AURIC_THEME_ID not set, using default pricing settings");
            ThemeSettings::default()
        }
    };
    PricingSettings::new(theme.making_charges_pct, theme.markup_pct).with_gst_pct(theme.gst_pct)
}

fn feed_client(config: &AppConfig) -> anyhow::Result<RateFeedClient> {
    let api_key = config
        .rate_feed_api_key
        .as_deref()
        .context("AURIC_RATE_FEED_API_KEY is required unless both --gold-rate and --silver-rate are given")?;
    Ok(RateFeedClient::new(
        api_key,
        &config.currency,
        config.request_timeout_secs,
    )?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn update_flags_parse() {
        let cli = Cli::try_parse_from([
            "auric",
            "update",
            "--dry-run",
            "--gold-rate",
            "7000",
            "--silver-rate",
            "92.5",
            "--summary-out",
            "/tmp/summary.json",
        ])
        .expect("flags should parse");
        let Commands::Update(args) = cli.command else {
            panic!("expected update subcommand");
        };
        assert!(args.dry_run);
        assert_eq!(args.gold_rate, Some(Decimal::new(7000, 0)));
        assert_eq!(args.silver_rate, Some(Decimal::new(925, 1)));
        assert_eq!(args.summary_out, PathBuf::from("/tmp/summary.json"));
    }

    #[test]
    fn rate_overrides_must_come_in_pairs() {
        assert!(Cli::try_parse_from(["auric", "update", "--gold-rate", "7000"]).is_err());
        assert!(Cli::try_parse_from(["auric", "update", "--markup-pct", "10"]).is_err());
    }
}
