use futures::future::try_join_all;
use serde_json::Value;
use std::sync::Arc;
use tracing::{info, instrument, warn};

use crate::config::PricingConfig;
use crate::error::PricingResult;
use crate::models::{OnDemandReport, PriceFilter, ReservedReport};
use crate::normalizer::{normalize, regions_of};
use crate::on_demand::OnDemandAggregator;
use crate::reserved::ReservedAggregator;
use crate::source::DocumentSource;

/// Builds on-demand and reserved pricing reports from the vendor feeds
#[derive(Clone)]
pub struct PricingService<S: DocumentSource> {
    source: Arc<S>,
    config: PricingConfig,
}

impl<S: DocumentSource> PricingService<S> {
    pub fn new(source: S, config: PricingConfig) -> Self {
        Self {
            source: Arc::new(source),
            config,
        }
    }

    pub fn config(&self) -> &PricingConfig {
        &self.config
    }

    /// On-demand hourly prices from the current and previous-generation feeds
    #[instrument(skip(self))]
    pub async fn get_on_demand(&self, filter: &PriceFilter) -> PricingResult<OnDemandReport> {
        let documents = self.load(&self.config.urls.on_demand_feeds()).await?;

        let mut aggregator = OnDemandAggregator::new(&self.config, filter);
        for (url, document) in &documents {
            aggregator.add_document(document).inspect_err(|e| {
                warn!(url = %url, error = %e, "Failed to aggregate on-demand document");
            })?;
        }

        let report = aggregator.finish();
        info!(
            regions = report.regions.len(),
            entries = report.entry_count(),
            "On-demand report built"
        );
        Ok(report)
    }

    /// Reserved prices from the heavy-utilization and purchase-option feeds,
    /// merged per region
    #[instrument(skip(self))]
    pub async fn get_reserved(&self, filter: &PriceFilter) -> PricingResult<ReservedReport> {
        let documents = self.load(&self.config.urls.reserved_feeds()).await?;

        let mut aggregator = ReservedAggregator::new(&self.config, filter);
        for (url, document) in &documents {
            aggregator.add_document(document).inspect_err(|e| {
                warn!(url = %url, error = %e, "Failed to aggregate reserved document");
            })?;
        }

        let report = aggregator.finish();
        info!(
            regions = report.regions.len(),
            entries = report.entry_count(),
            "Reserved report built"
        );
        Ok(report)
    }

    /// Fetch and normalize every feed concurrently.
    ///
    /// Results come back in `urls` order, so folding them is equivalent to
    /// processing the feeds one after another. Any failure fails the call.
    async fn load(&self, urls: &[&str]) -> PricingResult<Vec<(String, Value)>> {
        let fetches = urls.iter().map(|&url| async move {
            let raw = self.source.fetch(url).await?;
            let document = normalize(&raw).inspect_err(|e| {
                warn!(url = %url, error = %e, "Failed to normalize pricing document");
            })?;
            info!(
                url = %url,
                bytes = raw.len(),
                regions = regions_of(&document).len(),
                "Loaded pricing document"
            );
            Ok((url.to_string(), document))
        });
        try_join_all(fetches).await
    }
}
