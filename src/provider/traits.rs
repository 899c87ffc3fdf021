use crate::model::{ProviderError, RawComparison};

/// Source of raw offer records for a product.
#[async_trait::async_trait]
pub trait OfferProvider: Send + Sync {
    async fn fetch_offers(&self, product_id: u64) -> Result<RawComparison, ProviderError>;
}
