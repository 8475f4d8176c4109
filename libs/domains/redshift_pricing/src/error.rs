use thiserror::Error;

/// Result type for pricing operations
pub type PricingResult<T> = Result<T, PricingError>;

/// Errors that can occur while building a pricing report
#[derive(Debug, Error)]
pub enum PricingError {
    /// Vendor region identifier missing from the alias table
    #[error("Unknown region: {0}")]
    UnknownRegion(String),

    /// Document text is not a `callback(<literal>);` form of the literal grammar
    #[error("Malformed document at line {line}, column {column}: {reason}")]
    MalformedDocument {
        line: usize,
        column: usize,
        reason: String,
    },

    /// Document could not be fetched
    #[error("Failed to fetch {url}: {message}")]
    Source { url: String, message: String },
}

impl PricingError {
    pub fn fetch_failed(url: impl Into<String>, message: impl ToString) -> Self {
        PricingError::Source {
            url: url.into(),
            message: message.to_string(),
        }
    }

    /// Whether the error came from the document itself rather than its transport
    pub fn is_data_error(&self) -> bool {
        matches!(
            self,
            PricingError::UnknownRegion(_) | PricingError::MalformedDocument { .. }
        )
    }
}
