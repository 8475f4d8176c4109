//! Redshift Pricing Domain
//!
//! Collects Amazon Redshift node pricing from the vendor's public pricing
//! feeds and folds it into a normalized, region-grouped report.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐
//! │   Service   │  ← Fetches feeds concurrently, folds them in order
//! └──────┬──────┘
//!        │
//! ┌──────▼──────┐
//! │   Source    │  ← Document retrieval (trait + implementations)
//! └──────┬──────┘
//!        │
//! ┌──────▼──────┐
//! │ Normalizer  │  ← callback(...) script body → JSON value
//! └──────┬──────┘
//!        │
//! ┌──────▼──────┐
//! │ Aggregators │  ← On-demand / reserved, region resolution, filtering
//! └──────┬──────┘
//!        │
//! ┌──────▼──────┐
//! │   Models    │  ← Region codes, entries, reports
//! └─────────────┘
//! ```

pub mod config;
pub mod error;
pub mod models;
pub mod normalizer;
pub mod on_demand;
pub mod prices;
pub mod regions;
pub mod reserved;
pub mod service;
pub mod source;

// Re-export commonly used types
pub use config::{PricingConfig, SourceUrls};
pub use error::{PricingError, PricingResult};
pub use models::{
    InstanceType, KNOWN_INSTANCE_TYPES, OnDemandPriceEntry, OnDemandReport, PriceFilter,
    PriceReport, PriceValue, RegionCode, RegionPriceGroup, ReservationTerm, ReservedOffering,
    ReservedPriceEntry, ReservedReport,
};
pub use normalizer::normalize;
pub use regions::RegionResolver;
pub use service::PricingService;
pub use source::{DocumentSource, StaticSource};
