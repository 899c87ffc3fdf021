use crate::model::{ProviderError, RawComparison};
use crate::provider::traits::OfferProvider;
use reqwest::{Client, StatusCode};
use std::time::Duration;
use tracing::{debug, warn};

const USER_AGENT: &str = "Mozilla/5.0 (Linux; Android 14) OfferRanker/0.1";

/// Fetches `{base_url}/products/{id}/offers` as JSON.
pub struct HttpOfferProvider {
    client: Client,
    base_url: String,
}

impl HttpOfferProvider {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ProviderError> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn build_url(&self, product_id: u64) -> String {
        format!("{}/products/{}/offers", self.base_url, product_id)
    }
}

#[async_trait::async_trait]
impl OfferProvider for HttpOfferProvider {
    async fn fetch_offers(&self, product_id: u64) -> Result<RawComparison, ProviderError> {
        let url = self.build_url(product_id);
        debug!("GET {}", url);

        let response = self.client.get(&url).send().await?;
        let status = response.status();

        if status == StatusCode::NOT_FOUND {
            return Err(ProviderError::NotFound(product_id));
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_else(|_| "unknown".into());
            warn!("Offer API responded [{}]: {}", status, body);
            return Err(ProviderError::InvalidResponse(format!("status {}", status)));
        }

        let body = response.text().await?;
        let raw: RawComparison = serde_json::from_str(&body)?;
        Ok(raw)
    }
}
