//! Redshift Pricing
//!
//! Prints Amazon Redshift on-demand or reserved node prices, collected from
//! the vendor's public pricing feeds, as JSON, a table or CSV.

use clap::{Parser, ValueEnum};
use core_config::tracing::{init_tracing, install_color_eyre};
use core_config::FromEnv;
use domain_redshift_pricing::{
    InstanceType, PriceFilter, PriceReport, PricingError, PricingService, RegionCode,
    KNOWN_INSTANCE_TYPES,
};
use eyre::{Result, WrapErr};
use serde::Serialize;
use strum::IntoEnumIterator;
use tracing::info;

mod config;
mod fetcher;
mod render;

use config::Config;
use fetcher::HttpDocumentSource;
use render::{render, OutputFormat, Row};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum PriceType {
    #[value(name = "ondemand")]
    OnDemand,
    Reserved,
}

#[derive(Parser)]
#[command(name = "redshift-pricing")]
#[command(about = "Print Amazon Redshift on-demand or reserved pricing")]
struct Cli {
    /// Which prices to report
    #[arg(short = 't', long = "type", value_enum)]
    price_type: PriceType,

    /// Only report this region
    #[arg(short = 'r', long, value_parser = parse_region)]
    filter_region: Option<RegionCode>,

    /// Only report this node type
    #[arg(short = 'i', long, value_parser = KNOWN_INSTANCE_TYPES)]
    filter_type: Option<String>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Table)]
    format: OutputFormat,
}

fn parse_region(value: &str) -> Result<RegionCode, String> {
    value.parse().map_err(|_| {
        let known: Vec<&str> = RegionCode::iter().map(|code| code.as_str()).collect();
        format!("expected one of: {}", known.join(", "))
    })
}

#[tokio::main]
async fn main() -> Result<()> {
    install_color_eyre();

    let cli = Cli::parse();
    let config = Config::from_env()?;
    init_tracing(&config.environment);

    let source =
        HttpDocumentSource::new(config.http_timeout).wrap_err("Failed to build HTTP client")?;
    let service = PricingService::new(source, config.pricing);
    let filter = PriceFilter::new(cli.filter_region, cli.filter_type.map(InstanceType::from));

    info!(
        price_type = ?cli.price_type,
        region = ?filter.region,
        instance_type = ?filter.instance_type,
        currency = %service.config().currency,
        "Collecting Redshift prices"
    );

    match cli.price_type {
        PriceType::OnDemand => {
            let report = service
                .get_on_demand(&filter)
                .await
                .map_err(|e| collect_failed("on-demand", e))?;
            emit(&report, cli.format)
        }
        PriceType::Reserved => {
            let report = service
                .get_reserved(&filter)
                .await
                .map_err(|e| collect_failed("reserved", e))?;
            emit(&report, cli.format)
        }
    }
}

/// Wrap a collection failure, separating bad feed content from transport failures
fn collect_failed(price_type: &str, error: PricingError) -> eyre::Report {
    let context = if error.is_data_error() {
        format!("Failed to interpret {price_type} pricing feeds")
    } else {
        format!("Failed to download {price_type} pricing feeds")
    };
    eyre::Report::new(error).wrap_err(context)
}

fn emit<E: Row + Serialize>(report: &PriceReport<E>, format: OutputFormat) -> Result<()> {
    if report.is_empty() {
        eprintln!("filter produced no results");
    }
    let mut stdout = std::io::stdout().lock();
    render(report, format, &mut stdout).wrap_err("Failed to write report")
}
