//! Price field helpers shared by the aggregators.
//!
//! A price that does not parse is an explicit absence (`None`), never zero
//! and never an error.

use serde_json::Value;

/// Parse a published price such as `"$0.850 per Hour"` into `0.85`.
///
/// Every character other than ASCII digits and `.` is dropped before parsing.
pub fn sanitize_price(value: &Value) -> Option<f64> {
    match value {
        Value::Number(number) => number.as_f64(),
        Value::String(text) => {
            let digits: String = text
                .chars()
                .filter(|c| c.is_ascii_digit() || *c == '.')
                .collect();
            digits.parse::<f64>().ok()
        }
        _ => None,
    }
}

/// `"1,234.50"` → `"1234.50"`
pub fn strip_thousands(text: &str) -> String {
    text.replace(',', "")
}

/// Convert a monthly-equivalent figure into an hourly rate with 3 decimals.
///
/// `hourly = monthly * 12 / 365 / 24`
pub fn monthly_to_hourly(monthly: &str) -> Option<String> {
    let monthly = strip_thousands(monthly).trim().parse::<f64>().ok()?;
    if !monthly.is_finite() {
        return None;
    }
    Some(format!("{:.3}", monthly * 12.0 / 365.0 / 24.0))
}

/// Read `prices.<currency>` of a value column
pub fn column_price<'a>(column: &'a Value, currency: &str) -> Option<&'a Value> {
    column.get("prices")?.get(currency)
}

/// Read `prices.<currency>` of a value column as text
pub fn column_text<'a>(column: &'a Value, currency: &str) -> Option<&'a str> {
    column_price(column, currency)?.as_str()
}
