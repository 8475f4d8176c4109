//! Engine configuration passed into every aggregator call

use crate::regions::RegionResolver;

pub const DEFAULT_CURRENCY: &str = "USD";

/// Unit echoed into on-demand reports
pub const ON_DEMAND_UNIT: &str = "perhr";

pub const ONDEMAND_URL: &str =
    "http://a0.awsstatic.com/pricing/1/redshift/pricing-on-demand-redshift-instances.min.js";
pub const ONDEMAND_PREVIOUS_URL: &str = "http://a0.awsstatic.com/pricing/1/redshift/previous-generation/pricing-on-demand-redshift-instances.min.js";
pub const RESERVED_URL: &str =
    "http://a0.awsstatic.com/pricing/1/redshift/pricing-reserved-redshift-instances.min.js";
pub const RESERVED_PREVIOUS_URL: &str = "http://a0.awsstatic.com/pricing/1/redshift/previous-generation/pricing-reserved-redshift-instances.min.js";
pub const HEAVY_1Y_URL: &str =
    "http://a0.awsstatic.com/pricing/1/redshift/pricing-one-year-heavy-reserved-instances.min.js";
pub const HEAVY_3Y_URL: &str =
    "http://a0.awsstatic.com/pricing/1/redshift/pricing-three-years-heavy-reserved-instances.min.js";

/// The six source documents
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceUrls {
    pub on_demand: String,
    pub on_demand_previous: String,
    pub reserved: String,
    pub reserved_previous: String,
    pub heavy_one_year: String,
    pub heavy_three_year: String,
}

impl SourceUrls {
    /// Current generation first, then previous generation
    pub fn on_demand_feeds(&self) -> [&str; 2] {
        [self.on_demand.as_str(), self.on_demand_previous.as_str()]
    }

    /// Heavy 1y, heavy 3y, current reserved, previous reserved
    pub fn reserved_feeds(&self) -> [&str; 4] {
        [
            self.heavy_one_year.as_str(),
            self.heavy_three_year.as_str(),
            self.reserved.as_str(),
            self.reserved_previous.as_str(),
        ]
    }
}

impl Default for SourceUrls {
    fn default() -> Self {
        Self {
            on_demand: ONDEMAND_URL.to_string(),
            on_demand_previous: ONDEMAND_PREVIOUS_URL.to_string(),
            reserved: RESERVED_URL.to_string(),
            reserved_previous: RESERVED_PREVIOUS_URL.to_string(),
            heavy_one_year: HEAVY_1Y_URL.to_string(),
            heavy_three_year: HEAVY_3Y_URL.to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct PricingConfig {
    /// Price key read from every value column. One currency per run.
    pub currency: String,
    pub urls: SourceUrls,
    pub regions: RegionResolver,
}

impl PricingConfig {
    pub fn with_currency(mut self, currency: impl Into<String>) -> Self {
        self.currency = currency.into();
        self
    }

    pub fn with_urls(mut self, urls: SourceUrls) -> Self {
        self.urls = urls;
        self
    }
}

impl Default for PricingConfig {
    fn default() -> Self {
        Self {
            currency: DEFAULT_CURRENCY.to_string(),
            urls: SourceUrls::default(),
            regions: RegionResolver::default(),
        }
    }
}
