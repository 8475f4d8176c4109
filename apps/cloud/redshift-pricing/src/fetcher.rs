//! HTTP document source for the vendor pricing feeds

use async_trait::async_trait;
use domain_redshift_pricing::{DocumentSource, PricingError, PricingResult};
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, warn};

pub struct HttpDocumentSource {
    client: Client,
}

impl HttpDocumentSource {
    pub fn new(timeout: Option<Duration>) -> reqwest::Result<Self> {
        let mut builder = Client::builder().user_agent(concat!(
            env!("CARGO_PKG_NAME"),
            "/",
            env!("CARGO_PKG_VERSION")
        ));
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        Ok(Self {
            client: builder.build()?,
        })
    }
}

#[async_trait]
impl DocumentSource for HttpDocumentSource {
    async fn fetch(&self, url: &str) -> PricingResult<String> {
        debug!(url = %url, "Fetching pricing document");

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| PricingError::fetch_failed(url, e))?;

        let status = response.status();
        if !status.is_success() {
            warn!(url = %url, status = %status, "Pricing feed returned non-success status");
            return Err(PricingError::fetch_failed(url, format!("HTTP {}", status)));
        }

        response
            .text()
            .await
            .map_err(|e| PricingError::fetch_failed(url, e))
    }
}
