//! Vendor region identifiers → canonical region codes.
//!
//! The vendor renamed regions over time ("us-east" vs "us-east-1",
//! "apac-tokyo" vs "ap-northeast-1"), and documents from different eras use
//! different names for the same region.

use serde_json::Value;
use std::collections::HashMap;

use crate::error::{PricingError, PricingResult};
use crate::models::RegionCode;

/// Alias table published by the vendor feeds
const VENDOR_ALIASES: &[(&str, RegionCode)] = &[
    ("us-east", RegionCode::UsEast1),
    ("us-east-1", RegionCode::UsEast1),
    ("us-west", RegionCode::UsWest1),
    ("us-west-1", RegionCode::UsWest1),
    ("us-west-2", RegionCode::UsWest2),
    ("us-gov-west-1", RegionCode::UsGovWest1),
    ("eu-ireland", RegionCode::EuWest1),
    ("eu-west-1", RegionCode::EuWest1),
    ("eu-frankfurt", RegionCode::EuCentral1),
    ("eu-central-1", RegionCode::EuCentral1),
    ("apac-sin", RegionCode::ApSoutheast1),
    ("ap-southeast-1", RegionCode::ApSoutheast1),
    ("apac-syd", RegionCode::ApSoutheast2),
    ("ap-southeast-2", RegionCode::ApSoutheast2),
    ("apac-tokyo", RegionCode::ApNortheast1),
    ("ap-northeast-1", RegionCode::ApNortheast1),
    ("ap-northeast-2", RegionCode::ApNortheast2),
    ("sa-east-1", RegionCode::SaEast1),
];

/// Resolves vendor region identifiers; fails closed on unknown ones.
#[derive(Debug, Clone)]
pub struct RegionResolver {
    aliases: HashMap<String, RegionCode>,
}

impl RegionResolver {
    /// Build a resolver over a custom alias table
    pub fn with_aliases<I, K>(aliases: I) -> Self
    where
        I: IntoIterator<Item = (K, RegionCode)>,
        K: Into<String>,
    {
        Self {
            aliases: aliases
                .into_iter()
                .map(|(alias, code)| (alias.into(), code))
                .collect(),
        }
    }

    pub fn resolve(&self, vendor_region: &str) -> PricingResult<RegionCode> {
        self.aliases
            .get(vendor_region)
            .copied()
            .ok_or_else(|| PricingError::UnknownRegion(vendor_region.to_string()))
    }

    /// Resolve the `region` field of a document's region block.
    ///
    /// Blocks without a region (absent, null or empty) yield `None` and are
    /// skipped by the aggregators.
    pub fn resolve_block(&self, block: &Value) -> PricingResult<Option<RegionCode>> {
        match block.get("region") {
            None | Some(Value::Null) => Ok(None),
            Some(Value::String(name)) if name.is_empty() => Ok(None),
            Some(Value::String(name)) => self.resolve(name).map(Some),
            Some(other) => Err(PricingError::UnknownRegion(other.to_string())),
        }
    }

    /// Every alias this resolver accepts
    pub fn aliases(&self) -> impl Iterator<Item = &str> {
        self.aliases.keys().map(String::as_str)
    }
}

impl Default for RegionResolver {
    fn default() -> Self {
        Self::with_aliases(VENDOR_ALIASES.iter().copied())
    }
}
