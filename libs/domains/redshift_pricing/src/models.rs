use serde::{Deserialize, Serialize, Serializer};
use std::fmt;
use strum::{Display, EnumIter, EnumString, IntoStaticStr};

/// Canonical region codes. Only these values ever appear in a report.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
    IntoStaticStr,
)]
pub enum RegionCode {
    #[serde(rename = "us-east-1")]
    #[strum(serialize = "us-east-1")]
    UsEast1,
    #[serde(rename = "us-west-1")]
    #[strum(serialize = "us-west-1")]
    UsWest1,
    #[serde(rename = "us-west-2")]
    #[strum(serialize = "us-west-2")]
    UsWest2,
    #[serde(rename = "us-gov-west-1")]
    #[strum(serialize = "us-gov-west-1")]
    UsGovWest1,
    #[serde(rename = "eu-west-1")]
    #[strum(serialize = "eu-west-1")]
    EuWest1,
    #[serde(rename = "eu-central-1")]
    #[strum(serialize = "eu-central-1")]
    EuCentral1,
    #[serde(rename = "ap-southeast-1")]
    #[strum(serialize = "ap-southeast-1")]
    ApSoutheast1,
    #[serde(rename = "ap-southeast-2")]
    #[strum(serialize = "ap-southeast-2")]
    ApSoutheast2,
    #[serde(rename = "ap-northeast-1")]
    #[strum(serialize = "ap-northeast-1")]
    ApNortheast1,
    #[serde(rename = "ap-northeast-2")]
    #[strum(serialize = "ap-northeast-2")]
    ApNortheast2,
    #[serde(rename = "sa-east-1")]
    #[strum(serialize = "sa-east-1")]
    SaEast1,
}

impl RegionCode {
    pub fn as_str(&self) -> &'static str {
        self.into()
    }
}

/// Instance types accepted by the command-line filter
pub const KNOWN_INSTANCE_TYPES: [&str; 4] =
    ["dw1.xlarge", "dw1.8xlarge", "dw2.xlarge", "dw2.8xlarge"];

/// Instance type code (e.g. "dw2.8xlarge"). Not validated: the vendor adds new types.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InstanceType(String);

impl InstanceType {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for InstanceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for InstanceType {
    fn from(code: &str) -> Self {
        Self(code.to_string())
    }
}

impl From<String> for InstanceType {
    fn from(code: String) -> Self {
        Self(code)
    }
}

impl PartialEq<str> for InstanceType {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for InstanceType {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

/// Reservation commitment length
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString)]
pub enum ReservationTerm {
    #[serde(rename = "1year")]
    #[strum(serialize = "1year")]
    OneYear,
    #[serde(rename = "3year")]
    #[strum(serialize = "3year")]
    ThreeYear,
}

impl ReservationTerm {
    /// Map a vendor term code (`yrTerm1`, `yrTerm3`)
    pub fn from_vendor_code(code: &str) -> Option<Self> {
        match code {
            "yrTerm1" => Some(ReservationTerm::OneYear),
            "yrTerm3" => Some(ReservationTerm::ThreeYear),
            _ => None,
        }
    }
}

/// Reservation class used for every heavy-utilization (tiers) record
pub const HEAVY_RESERVATION: &str = "heavy";

/// On-demand hourly price for one instance type
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OnDemandPriceEntry {
    #[serde(rename = "type")]
    pub instance_type: InstanceType,
    /// `None` when the published price is not numeric (e.g. "N/A")
    pub price: Option<f64>,
}

/// Reserved pricing as published by one of the two feed generations.
///
/// Heavy-utilization feeds carry parsed numbers; the purchase-option feeds
/// carry formatted strings. Both are kept as published.
#[derive(Debug, Clone, PartialEq)]
pub enum ReservedOffering {
    /// `tiers` records: class is always "heavy"
    Heavy {
        term: Option<ReservationTerm>,
        hourly: Option<f64>,
        upfront: Option<f64>,
    },
    /// `type`/`terms` records: class named by the purchase option
    Flexible {
        reservation_class: String,
        term: Option<ReservationTerm>,
        hourly: Option<String>,
        upfront: Option<String>,
    },
}

/// A price cell that is either a parsed number, a published string, or absent
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(untagged)]
pub enum PriceValue<'a> {
    Number(f64),
    Text(&'a str),
    Absent,
}

impl PriceValue<'_> {
    pub fn is_absent(&self) -> bool {
        matches!(self, PriceValue::Absent)
    }
}

impl fmt::Display for PriceValue<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PriceValue::Number(value) => write!(f, "{}", value),
            PriceValue::Text(value) => f.write_str(value),
            PriceValue::Absent => Ok(()),
        }
    }
}

impl From<Option<f64>> for PriceValue<'_> {
    fn from(value: Option<f64>) -> Self {
        value.map_or(PriceValue::Absent, PriceValue::Number)
    }
}

impl<'a> From<&'a Option<String>> for PriceValue<'a> {
    fn from(value: &'a Option<String>) -> Self {
        value
            .as_deref()
            .map_or(PriceValue::Absent, PriceValue::Text)
    }
}

/// Reserved price for one instance type, reservation class and term
#[derive(Debug, Clone, PartialEq)]
pub struct ReservedPriceEntry {
    pub instance_type: InstanceType,
    pub offering: ReservedOffering,
}

impl ReservedPriceEntry {
    pub fn reservation(&self) -> &str {
        match &self.offering {
            ReservedOffering::Heavy { .. } => HEAVY_RESERVATION,
            ReservedOffering::Flexible {
                reservation_class, ..
            } => reservation_class.as_str(),
        }
    }

    pub fn term(&self) -> Option<ReservationTerm> {
        match &self.offering {
            ReservedOffering::Heavy { term, .. } | ReservedOffering::Flexible { term, .. } => *term,
        }
    }

    pub fn hourly(&self) -> PriceValue<'_> {
        match &self.offering {
            ReservedOffering::Heavy { hourly, .. } => (*hourly).into(),
            ReservedOffering::Flexible { hourly, .. } => hourly.into(),
        }
    }

    pub fn upfront(&self) -> PriceValue<'_> {
        match &self.offering {
            ReservedOffering::Heavy { upfront, .. } => (*upfront).into(),
            ReservedOffering::Flexible { upfront, .. } => upfront.into(),
        }
    }
}

#[derive(Serialize)]
struct ReservedPrices<'a> {
    hourly: PriceValue<'a>,
    upfront: PriceValue<'a>,
    term: Option<ReservationTerm>,
}

#[derive(Serialize)]
struct ReservedEntryView<'a> {
    #[serde(rename = "type")]
    instance_type: &'a InstanceType,
    reservation: &'a str,
    prices: ReservedPrices<'a>,
}

// Both generations share the `{type, reservation, prices}` wire shape.
impl Serialize for ReservedPriceEntry {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        ReservedEntryView {
            instance_type: &self.instance_type,
            reservation: self.reservation(),
            prices: ReservedPrices {
                hourly: self.hourly(),
                upfront: self.upfront(),
                term: self.term(),
            },
        }
        .serialize(serializer)
    }
}

/// All entries for one canonical region
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RegionPriceGroup<E> {
    pub region: RegionCode,
    #[serde(rename = "instanceTypes")]
    pub instance_types: Vec<E>,
}

impl<E> RegionPriceGroup<E> {
    pub fn new(region: RegionCode) -> Self {
        Self {
            region,
            instance_types: Vec::new(),
        }
    }
}

/// Report-wide settings echoed into the output
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportConfig {
    pub currency: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
}

/// Root of the normalized output handed to renderers
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriceReport<E> {
    pub config: ReportConfig,
    pub regions: Vec<RegionPriceGroup<E>>,
}

impl<E> PriceReport<E> {
    pub fn new(currency: impl Into<String>, unit: Option<&str>) -> Self {
        Self {
            config: ReportConfig {
                currency: currency.into(),
                unit: unit.map(str::to_string),
            },
            regions: Vec::new(),
        }
    }

    /// Total number of entries across all regions
    pub fn entry_count(&self) -> usize {
        self.regions.iter().map(|g| g.instance_types.len()).sum()
    }

    /// True when no region holds any entry
    pub fn is_empty(&self) -> bool {
        self.entry_count() == 0
    }

    /// Iterate `(region, entry)` pairs in report order
    pub fn entries(&self) -> impl Iterator<Item = (RegionCode, &E)> {
        self.regions
            .iter()
            .flat_map(|g| g.instance_types.iter().map(move |e| (g.region, e)))
    }
}

pub type OnDemandReport = PriceReport<OnDemandPriceEntry>;
pub type ReservedReport = PriceReport<ReservedPriceEntry>;

/// Optional exact-match filters applied by both aggregators
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PriceFilter {
    pub region: Option<RegionCode>,
    pub instance_type: Option<InstanceType>,
}

impl PriceFilter {
    pub fn new(region: Option<RegionCode>, instance_type: Option<InstanceType>) -> Self {
        Self {
            region,
            instance_type,
        }
    }

    pub fn matches_region(&self, region: RegionCode) -> bool {
        self.region.is_none_or(|wanted| wanted == region)
    }

    pub fn matches_instance_type(&self, instance_type: &str) -> bool {
        self.instance_type
            .as_ref()
            .is_none_or(|wanted| wanted.as_str() == instance_type)
    }
}
