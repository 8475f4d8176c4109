//! On-Demand Aggregator
//!
//! Folds normalized on-demand documents into a report. Each region block of
//! each document contributes its own [`RegionPriceGroup`]; blocks for the
//! same region in the current and previous-generation feeds are not merged.

use serde_json::Value;
use tracing::{debug, warn};

use crate::config::{ON_DEMAND_UNIT, PricingConfig};
use crate::error::PricingResult;
use crate::models::{
    OnDemandPriceEntry, OnDemandReport, PriceFilter, PriceReport, RegionPriceGroup,
};
use crate::normalizer::{regions_of, sequence};
use crate::prices::{column_price, sanitize_price};

pub struct OnDemandAggregator<'a> {
    config: &'a PricingConfig,
    filter: &'a PriceFilter,
    report: OnDemandReport,
}

impl<'a> OnDemandAggregator<'a> {
    pub fn new(config: &'a PricingConfig, filter: &'a PriceFilter) -> Self {
        Self {
            config,
            filter,
            report: PriceReport::new(config.currency.as_str(), Some(ON_DEMAND_UNIT)),
        }
    }

    /// Fold one normalized document into the report.
    ///
    /// An unknown region aborts the document (and with it the whole call).
    pub fn add_document(&mut self, document: &Value) -> PricingResult<()> {
        for block in regions_of(document) {
            let Some(region) = self.config.regions.resolve_block(block)? else {
                continue;
            };
            if !self.filter.matches_region(region) {
                debug!(region = %region, "Region filtered out");
                continue;
            }

            // A block without `instanceTypes` contributes no group; an empty
            // list still yields an empty one.
            if block.get("instanceTypes").is_none() {
                debug!(region = %region, "Region block has no instance types");
                continue;
            }

            let mut group = RegionPriceGroup::new(region);
            for record in sequence(block, "instanceTypes") {
                for tier in sequence(record, "tiers") {
                    if let Some(entry) = self.tier_entry(tier) {
                        group.instance_types.push(entry);
                    }
                }
            }
            self.report.regions.push(group);
        }
        Ok(())
    }

    fn tier_entry(&self, tier: &Value) -> Option<OnDemandPriceEntry> {
        let Some(size) = tier.get("size").and_then(Value::as_str) else {
            warn!(tier = %tier, "Skipping on-demand tier without size");
            return None;
        };
        if !self.filter.matches_instance_type(size) {
            return None;
        }

        // Only the first value column carries the on-demand rate.
        let price = tier
            .get("valueColumns")
            .and_then(|columns| columns.get(0))
            .and_then(|column| column_price(column, &self.config.currency))
            .and_then(sanitize_price);

        Some(OnDemandPriceEntry {
            instance_type: size.into(),
            price,
        })
    }

    pub fn finish(self) -> OnDemandReport {
        self.report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PricingError;
    use crate::models::RegionCode;
    use serde_json::json;

    fn document(regions: Value) -> Value {
        json!({"vers": 0.01, "config": {"currency": "USD", "rate": "perhr", "regions": regions}})
    }

    fn tier(size: &str, price: &str) -> Value {
        json!({"size": size, "valueColumns": [{"name": "ondemand", "prices": {"USD": price}}]})
    }

    fn aggregate(documents: &[Value], filter: &PriceFilter) -> PricingResult<OnDemandReport> {
        let config = PricingConfig::default();
        let mut aggregator = OnDemandAggregator::new(&config, filter);
        for doc in documents {
            aggregator.add_document(doc)?;
        }
        Ok(aggregator.finish())
    }

    #[test]
    fn test_single_tier_end_to_end_shape() {
        let doc = document(json!([
            {"region": "us-east", "instanceTypes": [{"tiers": [tier("dw1.xlarge", "$0.850 per Hour")]}]}
        ]));
        let report = aggregate(&[doc], &PriceFilter::default()).unwrap();
        assert_eq!(
            serde_json::to_value(&report).unwrap(),
            json!({
                "config": {"currency": "USD", "unit": "perhr"},
                "regions": [{"region": "us-east-1", "instanceTypes": [{"type": "dw1.xlarge", "price": 0.85}]}]
            })
        );
    }

    #[test]
    fn test_unparsable_price_is_null() {
        let doc = document(json!([
            {"region": "us-west-2", "instanceTypes": [{"tiers": [tier("dw2.xlarge", "N/A")]}]}
        ]));
        let report = aggregate(&[doc], &PriceFilter::default()).unwrap();
        assert_eq!(report.regions[0].instance_types[0].price, None);
    }

    #[test]
    fn test_missing_price_paths_are_null() {
        let doc = document(json!([{"region": "us-east-1", "instanceTypes": [{"tiers": [
            {"size": "a"},
            {"size": "b", "valueColumns": []},
            {"size": "c", "valueColumns": [{"prices": {"EUR": "1.0"}}]},
        ]}]}]));
        let report = aggregate(&[doc], &PriceFilter::default()).unwrap();
        let prices: Vec<_> = report.regions[0].instance_types.iter().map(|e| e.price).collect();
        assert_eq!(prices, vec![None, None, None]);
    }

    #[test]
    fn test_only_first_value_column_counts() {
        let doc = document(json!([{"region": "us-east-1", "instanceTypes": [{"tiers": [
            {"size": "dw1.xlarge", "valueColumns": [
                {"name": "linux", "prices": {"USD": "0.85"}},
                {"name": "other", "prices": {"USD": "9.99"}}
            ]}
        ]}]}]));
        let report = aggregate(&[doc], &PriceFilter::default()).unwrap();
        assert_eq!(report.regions[0].instance_types[0].price, Some(0.85));
    }

    #[test]
    fn test_each_document_contributes_its_own_groups() {
        let current = document(json!([
            {"region": "us-east", "instanceTypes": [{"tiers": [tier("dw2.xlarge", "0.25")]}]},
            {"region": "eu-ireland", "instanceTypes": [{"tiers": [tier("dw2.xlarge", "0.30")]}]}
        ]));
        let previous = document(json!([
            {"region": "us-east-1", "instanceTypes": [{"tiers": [tier("dw1.xlarge", "0.85")]}]}
        ]));
        let report = aggregate(&[current, previous], &PriceFilter::default()).unwrap();
        let regions: Vec<_> = report.regions.iter().map(|g| g.region).collect();
        assert_eq!(
            regions,
            vec![RegionCode::UsEast1, RegionCode::EuWest1, RegionCode::UsEast1]
        );
    }

    #[test]
    fn test_region_filter_keeps_only_that_region() {
        let doc = document(json!([
            {"region": "us-east", "instanceTypes": [{"tiers": [tier("dw2.xlarge", "0.25")]}]},
            {"region": "apac-tokyo", "instanceTypes": [{"tiers": [tier("dw2.xlarge", "0.31")]}]}
        ]));
        let filter = PriceFilter::new(Some(RegionCode::ApNortheast1), None);
        let report = aggregate(&[doc], &filter).unwrap();
        assert_eq!(report.regions.len(), 1);
        assert_eq!(report.regions[0].region, RegionCode::ApNortheast1);
    }

    #[test]
    fn test_instance_type_filter_keeps_empty_groups() {
        let doc = document(json!([
            {"region": "us-east", "instanceTypes": [{"tiers": [tier("dw2.xlarge", "0.25"), tier("dw2.8xlarge", "4.80")]}]},
            {"region": "sa-east-1", "instanceTypes": [{"tiers": [tier("dw2.xlarge", "0.40")]}]}
        ]));
        let filter = PriceFilter::new(None, Some("dw2.8xlarge".into()));
        let report = aggregate(&[doc], &filter).unwrap();
        assert_eq!(report.regions.len(), 2);
        assert!(report.entries().all(|(_, e)| e.instance_type == "dw2.8xlarge"));
        assert_eq!(report.entry_count(), 1);
        assert!(report.regions[1].instance_types.is_empty());
    }

    #[test]
    fn test_unknown_region_aborts() {
        let doc = document(json!([{"region": "moon-1", "instanceTypes": []}]));
        assert!(matches!(
            aggregate(&[doc], &PriceFilter::default()),
            Err(PricingError::UnknownRegion(id)) if id == "moon-1"
        ));
    }

    #[test]
    fn test_unknown_region_aborts_even_when_filtered_out() {
        let doc = document(json!([{"region": "moon-1", "instanceTypes": []}]));
        let filter = PriceFilter::new(Some(RegionCode::UsEast1), None);
        assert!(aggregate(&[doc], &filter).is_err());
    }

    #[test]
    fn test_placeholder_documents_contribute_nothing() {
        let docs = [
            json!({}),
            json!({"config": null}),
            json!({"config": {"regions": []}}),
            document(json!([{"instanceTypes": [{"tiers": [tier("dw1.xlarge", "1")]}]}])),
        ];
        let report = aggregate(&docs, &PriceFilter::default()).unwrap();
        assert!(report.regions.is_empty());
    }

    #[test]
    fn test_block_without_instance_types_adds_no_group() {
        let doc = document(json!([
            {"region": "us-east"},
            {"region": "eu-ireland", "instanceTypes": []}
        ]));
        let report = aggregate(&[doc], &PriceFilter::default()).unwrap();
        assert_eq!(report.regions.len(), 1);
        assert_eq!(report.regions[0].region, RegionCode::EuWest1);
        assert!(report.regions[0].instance_types.is_empty());
    }

    #[test]
    fn test_block_without_instance_types_still_resolves_region() {
        let doc = document(json!([{"region": "moon-1"}]));
        assert!(aggregate(&[doc], &PriceFilter::default()).is_err());
    }

    #[test]
    fn test_tiers_without_size_are_skipped() {
        let doc = document(json!([{"region": "us-east", "instanceTypes": [{"tiers": [
            {"valueColumns": [{"prices": {"USD": "1"}}]},
            tier("dw1.xlarge", "0.85")
        ]}]}]));
        let report = aggregate(&[doc], &PriceFilter::default()).unwrap();
        assert_eq!(report.entry_count(), 1);
    }
}
