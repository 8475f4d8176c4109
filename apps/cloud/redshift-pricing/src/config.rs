//! Configuration for the pricing report

use core_config::{env_optional, env_or_default, env_parse, ConfigError, Environment, FromEnv};
use domain_redshift_pricing::config::DEFAULT_CURRENCY;
use domain_redshift_pricing::{PricingConfig, SourceUrls};
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct Config {
    pub environment: Environment,
    pub pricing: PricingConfig,
    /// Whole-request timeout for each feed; `None` leaves reqwest's default
    pub http_timeout: Option<Duration>,
}

fn source_urls() -> SourceUrls {
    let defaults = SourceUrls::default();
    SourceUrls {
        on_demand: env_or_default("REDSHIFT_ONDEMAND_URL", &defaults.on_demand),
        on_demand_previous: env_or_default(
            "REDSHIFT_ONDEMAND_PREVIOUS_URL",
            &defaults.on_demand_previous,
        ),
        reserved: env_or_default("REDSHIFT_RESERVED_URL", &defaults.reserved),
        reserved_previous: env_or_default(
            "REDSHIFT_RESERVED_PREVIOUS_URL",
            &defaults.reserved_previous,
        ),
        heavy_one_year: env_or_default("REDSHIFT_1Y_HEAVY_URL", &defaults.heavy_one_year),
        heavy_three_year: env_or_default("REDSHIFT_3Y_HEAVY_URL", &defaults.heavy_three_year),
    }
}

impl FromEnv for Config {
    fn from_env() -> Result<Self, ConfigError> {
        let http_timeout = env_optional("PRICING_HTTP_TIMEOUT_SECS")
            .map(|_| env_parse("PRICING_HTTP_TIMEOUT_SECS", 0u64).map(Duration::from_secs))
            .transpose()?;

        Ok(Config {
            environment: Environment::from_env(),
            pricing: PricingConfig::default()
                .with_currency(env_or_default("PRICING_CURRENCY", DEFAULT_CURRENCY))
                .with_urls(source_urls()),
            http_timeout,
        })
    }
}
