use crate::analyzer::comparison::Comparison;
use crate::model::{Offer, OfferError, ProductInfo, RawComparison, RawOffer};
use tracing::{debug, warn};

pub const DEFAULT_DISTANCE: &str = "0 km";
pub const DEFAULT_DELIVERY: &str = "A calcular";
const MAX_RATING: f64 = 5.0;

/// Turns a provider payload into a comparison, skipping records that cannot
/// become an offer.
pub fn normalize_all(raw: RawComparison) -> Comparison {
    let product = ProductInfo {
        id: raw.product_id,
        name: raw.product_name.trim().to_string(),
        description: raw.product_description.trim().to_string(),
    };

    let mut offers = Vec::with_capacity(raw.offers.len());
    for record in raw.offers {
        match normalize_offer(product.id, record) {
            Ok(offer) => offers.push(offer),
            Err(e) => warn!("Skipping offer for product {}: {}", product.id, e),
        }
    }

    Comparison::new(product, offers)
}

/// Builds one offer, applying defaults and clamping out-of-range values.
pub fn normalize_offer(product_id: u64, raw: RawOffer) -> Result<Offer, OfferError> {
    if let Some(found) = raw.product_id {
        if found != product_id {
            return Err(OfferError::ForeignProduct {
                id: raw.id,
                expected: product_id,
                found,
            });
        }
    }

    let price = raw.price.ok_or(OfferError::MissingPrice { id: raw.id })?;
    if !price.is_finite() || price < 0.0 {
        return Err(OfferError::InvalidPrice { id: raw.id, price });
    }

    // A previous price below the current one carries no discount information.
    let previous_price = match raw.previous_price {
        Some(prev) if prev.is_finite() && prev >= price => Some(prev),
        Some(prev) => {
            debug!("Offer {}: ignoring previous price {} below price {}", raw.id, prev, price);
            None
        }
        None => None,
    };

    let savings_amount = raw
        .savings_amount
        .filter(|s| s.is_finite())
        .map(|s| s.max(0.0))
        .unwrap_or(0.0);

    let rating = raw
        .rating
        .filter(|r| r.is_finite())
        .map(|r| r.clamp(0.0, MAX_RATING))
        .unwrap_or(0.0);

    let stock_quantity = raw
        .stock_quantity
        .filter(|q| q.is_finite() && *q > 0.0)
        .map(|q| q.min(u32::MAX as f64) as u32)
        .unwrap_or(0);

    Ok(Offer {
        id: raw.id,
        product_id,
        seller_id: raw.seller_id,
        seller_name: raw.seller_name.trim().to_string(),
        price,
        previous_price,
        savings_amount,
        stock_quantity,
        rating,
        distance_descriptor: text_or(raw.distance_descriptor, DEFAULT_DISTANCE),
        delivery_fee_descriptor: text_or(raw.delivery_fee_descriptor, DEFAULT_DELIVERY),
        delivery_time_descriptor: text_or(raw.delivery_time_descriptor, DEFAULT_DELIVERY),
        verified: raw.verified.unwrap_or(false),
        explicit_best_price: raw.explicit_best_price.unwrap_or(false),
    })
}

fn text_or(value: Option<String>, default: &str) -> String {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| default.to_string())
}

/// Serde helpers accepting JSON numbers as well as numeric strings.
pub mod lenient {
    use crate::model::RawOffer;
    use serde::{Deserialize, Deserializer, de};
    use tracing::warn;

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum NumberOrText {
        Number(f64),
        Text(String),
    }

    impl NumberOrText {
        fn as_f64(&self) -> Option<f64> {
            match self {
                NumberOrText::Number(n) => Some(*n),
                NumberOrText::Text(text) => parse_decimal(text),
            }
        }
    }

    /// Parses `"12.90"`, `"12,90"`, `"R$ 1.234,50"` and similar.
    pub fn parse_decimal(text: &str) -> Option<f64> {
        let cleaned = text.replace("R$", "").trim().to_string();
        let normalized = if cleaned.contains(',') {
            cleaned.replace('.', "").replace(',', ".")
        } else {
            cleaned
        };
        normalized.parse::<f64>().ok().filter(|n| n.is_finite())
    }

    fn whole(n: f64) -> Option<u64> {
        (n.is_finite() && n >= 0.0 && n.fract() == 0.0 && n <= u64::MAX as f64).then_some(n as u64)
    }

    pub fn u64_value<'de, D>(deserializer: D) -> Result<u64, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = NumberOrText::deserialize(deserializer)?;
        value
            .as_f64()
            .and_then(whole)
            .ok_or_else(|| de::Error::custom("expected a non-negative integer identifier"))
    }

    pub fn opt_u64<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Option::<NumberOrText>::deserialize(deserializer)?;
        Ok(value.and_then(|v| v.as_f64()).and_then(whole))
    }

    pub fn opt_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Option::<NumberOrText>::deserialize(deserializer)?;
        Ok(value.and_then(|v| v.as_f64()))
    }

    /// Decodes each offer record on its own so one malformed record does not
    /// fail the whole payload.
    pub fn offer_records<'de, D>(deserializer: D) -> Result<Vec<RawOffer>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let values = Vec::<serde_json::Value>::deserialize(deserializer)?;
        let mut records = Vec::with_capacity(values.len());
        for (index, value) in values.into_iter().enumerate() {
            match serde_json::from_value::<RawOffer>(value) {
                Ok(record) => records.push(record),
                Err(e) => warn!("Skipping malformed offer record #{}: {}", index, e),
            }
        }
        Ok(records)
    }
}
