//! Report rendering: JSON, table and CSV

use clap::ValueEnum;
use domain_redshift_pricing::{OnDemandPriceEntry, PriceReport, RegionCode, ReservedPriceEntry};
use eyre::Result;
use serde::Serialize;
use std::io::Write;
use tabled::builder::Builder;
use tabled::settings::Style;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// The report as a single line of JSON
    Json,
    /// A grid, one row per entry
    Table,
    /// CSV with a header row
    Csv,
}

/// An entry that can be flattened into one row
pub trait Row {
    const HEADERS: &'static [&'static str];

    fn cells(&self, region: RegionCode) -> Vec<String>;
}

impl Row for OnDemandPriceEntry {
    const HEADERS: &'static [&'static str] = &["region", "type", "price"];

    fn cells(&self, region: RegionCode) -> Vec<String> {
        vec![
            region.to_string(),
            self.instance_type.to_string(),
            self.price.map(|price| price.to_string()).unwrap_or_default(),
        ]
    }
}

impl Row for ReservedPriceEntry {
    const HEADERS: &'static [&'static str] =
        &["region", "type", "reservation", "term", "price", "upfront"];

    fn cells(&self, region: RegionCode) -> Vec<String> {
        vec![
            region.to_string(),
            self.instance_type.to_string(),
            self.reservation().to_string(),
            self.term().map(|term| term.to_string()).unwrap_or_default(),
            self.hourly().to_string(),
            self.upfront().to_string(),
        ]
    }
}

pub fn render<E, W>(report: &PriceReport<E>, format: OutputFormat, out: &mut W) -> Result<()>
where
    E: Row + Serialize,
    W: Write,
{
    match format {
        OutputFormat::Json => render_json(report, out),
        OutputFormat::Table => render_table(report, out),
        OutputFormat::Csv => render_csv(report, out),
    }
}

fn render_json<E: Serialize, W: Write>(report: &PriceReport<E>, out: &mut W) -> Result<()> {
    serde_json::to_writer(&mut *out, report)?;
    writeln!(out)?;
    Ok(())
}

fn render_table<E: Row, W: Write>(report: &PriceReport<E>, out: &mut W) -> Result<()> {
    let mut builder = Builder::default();
    builder.push_record(E::HEADERS.iter().copied());
    for (region, entry) in report.entries() {
        builder.push_record(entry.cells(region));
    }

    let mut table = builder.build();
    table.with(Style::modern());
    writeln!(out, "{}", table)?;
    Ok(())
}

fn render_csv<E: Row, W: Write>(report: &PriceReport<E>, out: &mut W) -> Result<()> {
    let mut writer = csv::Writer::from_writer(&mut *out);
    writer.write_record(E::HEADERS)?;
    for (region, entry) in report.entries() {
        writer.write_record(entry.cells(region))?;
    }
    writer.flush()?;
    Ok(())
}
