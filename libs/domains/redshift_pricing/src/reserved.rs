//! Reserved Aggregator
//!
//! Two generations of reserved-pricing records exist, sometimes within one
//! document, so the generation is detected per record:
//!
//! - **tiers** (heavy utilization): `{tiers: [{size, valueColumns}]}` with
//!   value columns `yrTerm1`, `yrTerm1Hourly`, `yrTerm3`, `yrTerm3Hourly`.
//! - **terms** (purchase options): `{type, terms: [{term, purchaseOptions:
//!   [{purchaseOption, valueColumns}]}]}` with value columns `upfront` and
//!   `monthlyStar`.
//!
//! Unlike on-demand, regions are merged: every canonical region gets exactly
//! one group, in first-seen order across all documents.

use serde_json::Value;
use std::collections::HashMap;
use tracing::{debug, warn};

use crate::config::PricingConfig;
use crate::error::PricingResult;
use crate::models::{
    PriceFilter, PriceReport, RegionCode, RegionPriceGroup, ReservationTerm, ReservedOffering,
    ReservedPriceEntry, ReservedReport,
};
use crate::normalizer::{regions_of, sequence};
use crate::prices::{column_price, column_text, monthly_to_hourly, sanitize_price, strip_thousands};

pub struct ReservedAggregator<'a> {
    config: &'a PricingConfig,
    filter: &'a PriceFilter,
    report: ReservedReport,
    index: HashMap<RegionCode, usize>,
}

impl<'a> ReservedAggregator<'a> {
    pub fn new(config: &'a PricingConfig, filter: &'a PriceFilter) -> Self {
        Self {
            config,
            filter,
            report: PriceReport::new(config.currency.as_str(), None),
            index: HashMap::new(),
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

            let mut entries = Vec::new();
            for record in sequence(block, "instanceTypes") {
                if record.get("tiers").is_some() {
                    self.heavy_entries(record, &mut entries);
                }
                if record.get("type").is_some() && record.get("terms").is_some() {
                    self.flexible_entries(record, &mut entries);
                }
            }
            self.group_mut(region).instance_types.extend(entries);
        }
        Ok(())
    }

    fn group_mut(&mut self, region: RegionCode) -> &mut RegionPriceGroup<ReservedPriceEntry> {
        let regions = &mut self.report.regions;
        let slot = *self.index.entry(region).or_insert_with(|| {
            regions.push(RegionPriceGroup::new(region));
            regions.len() - 1
        });
        &mut regions[slot]
    }

    fn heavy_entries(&self, record: &Value, entries: &mut Vec<ReservedPriceEntry>) {
        for tier in sequence(record, "tiers") {
            let Some(size) = tier.get("size").and_then(Value::as_str) else {
                warn!(tier = %tier, "Skipping reserved tier without size");
                continue;
            };
            if !self.filter.matches_instance_type(size) {
                continue;
            }

            let mut term = None;
            let mut hourly = None;
            let mut upfront = None;
            for column in sequence(tier, "valueColumns") {
                let price = column_price(column, &self.config.currency).and_then(sanitize_price);
                match column.get("name").and_then(Value::as_str) {
                    Some("yrTerm1") => {
                        upfront = price;
                        term = Some(ReservationTerm::OneYear);
                    }
                    Some("yrTerm3") => {
                        upfront = price;
                        term = Some(ReservationTerm::ThreeYear);
                    }
                    Some("yrTerm1Hourly" | "yrTerm3Hourly") => hourly = price,
                    _ => {}
                }
            }

            entries.push(ReservedPriceEntry {
                instance_type: size.into(),
                offering: ReservedOffering::Heavy {
                    term,
                    hourly,
                    upfront,
                },
            });
        }
    }

    fn flexible_entries(&self, record: &Value, entries: &mut Vec<ReservedPriceEntry>) {
        let Some(instance_type) = record.get("type").and_then(Value::as_str) else {
            warn!(record = %record, "Skipping reserved record with non-string type");
            return;
        };
        if !self.filter.matches_instance_type(instance_type) {
            return;
        }

        let currency = self.config.currency.as_str();
        for term in sequence(record, "terms") {
            let term_code = term
                .get("term")
                .and_then(Value::as_str)
                .and_then(ReservationTerm::from_vendor_code);

            for option in sequence(term, "purchaseOptions") {
                let reservation_class = option
                    .get("purchaseOption")
                    .and_then(Value::as_str)
                    .unwrap_or_default()
                    .to_string();

                let mut hourly = None;
                let mut upfront = None;
                for column in sequence(option, "valueColumns") {
                    match column.get("name").and_then(Value::as_str) {
                        Some("upfront") => {
                            upfront = column_text(column, currency).map(strip_thousands);
                        }
                        Some("monthlyStar") => {
                            hourly = column_text(column, currency).and_then(monthly_to_hourly);
                        }
                        _ => {}
                    }
                }

                entries.push(ReservedPriceEntry {
                    instance_type: instance_type.into(),
                    offering: ReservedOffering::Flexible {
                        reservation_class,
                        term: term_code,
                        hourly,
                        upfront,
                    },
                });
            }
        }
    }

    pub fn finish(self) -> ReservedReport {
        self.report
    }
}
