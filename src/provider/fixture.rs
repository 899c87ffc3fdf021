use crate::model::{ProviderError, RawComparison};
use crate::provider::traits::OfferProvider;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Reads `{dir}/{product_id}.json` from disk.
pub struct FixtureOfferProvider {
    dir: PathBuf,
}

impl FixtureOfferProvider {
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    fn path_for(&self, product_id: u64) -> PathBuf {
        self.dir.join(format!("{}.json", product_id))
    }
}

#[async_trait::async_trait]
impl OfferProvider for FixtureOfferProvider {
    async fn fetch_offers(&self, product_id: u64) -> Result<RawComparison, ProviderError> {
        let path = self.path_for(product_id);
        debug!("Reading offers from {}", path.display());

        let content = match tokio::fs::read_to_string(&path).await {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(ProviderError::NotFound(product_id));
            }
            Err(e) => return Err(e.into()),
        };

        let raw: RawComparison = serde_json::from_str(&content)?;
        Ok(raw)
    }
}
