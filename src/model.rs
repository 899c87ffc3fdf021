// Core structs: Offer, ProductInfo, raw provider records and error types
use crate::normalizer::lenient;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// One seller's listing for a product.
///
/// Offers are built once from a [`RawOffer`] (see `normalizer`) and never
/// change afterwards: fields are only reachable through read accessors.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Offer {
    pub(crate) id: u64,
    pub(crate) product_id: u64,
    pub(crate) seller_id: u64,
    pub(crate) seller_name: String,
    pub(crate) price: f64,
    pub(crate) previous_price: Option<f64>,
    pub(crate) savings_amount: f64,
    pub(crate) stock_quantity: u32,
    pub(crate) rating: f64,
    pub(crate) distance_descriptor: String,
    pub(crate) delivery_fee_descriptor: String,
    pub(crate) delivery_time_descriptor: String,
    pub(crate) verified: bool,
    pub(crate) explicit_best_price: bool,
}

impl Offer {
    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn product_id(&self) -> u64 {
        self.product_id
    }

    pub fn seller_id(&self) -> u64 {
        self.seller_id
    }

    pub fn seller_name(&self) -> &str {
        &self.seller_name
    }

    pub fn price(&self) -> f64 {
        self.price
    }

    pub fn previous_price(&self) -> Option<f64> {
        self.previous_price
    }

    pub fn savings_amount(&self) -> f64 {
        self.savings_amount
    }

    pub fn stock_quantity(&self) -> u32 {
        self.stock_quantity
    }

    pub fn rating(&self) -> f64 {
        self.rating
    }

    /// Free text such as `"2.5 km"`.
    pub fn distance_descriptor(&self) -> &str {
        &self.distance_descriptor
    }

    /// Free text such as `"Grátis"` or `"R$ 5,00"`.
    pub fn delivery_fee_descriptor(&self) -> &str {
        &self.delivery_fee_descriptor
    }

    pub fn delivery_time_descriptor(&self) -> &str {
        &self.delivery_time_descriptor
    }
}

/// Product header shared by every offer of a comparison.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductInfo {
    pub id: u64,
    pub name: String,
    pub description: String,
}

/// Single label shown next to an offer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Badge {
    BestPrice,
    FreeDelivery,
    HighRating,
}

impl Badge {
    pub fn label(&self) -> &'static str {
        match self {
            Badge::BestPrice => "Best price",
            Badge::FreeDelivery => "Free delivery",
            Badge::HighRating => "Top rated",
        }
    }
}

impl fmt::Display for Badge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Offer record as delivered by a provider.
///
/// Canonical keys are camelCase; snake_case and a handful of synonyms are
/// accepted as aliases. Numeric fields take JSON numbers or numeric strings.
/// Optional values stay `None` here and receive their defaults when the
/// record is turned into an [`Offer`].
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawOffer {
    #[serde(deserialize_with = "lenient::u64_value")]
    pub id: u64,
    #[serde(
        alias = "seller_id",
        alias = "storeId",
        alias = "store_id",
        deserialize_with = "lenient::u64_value"
    )]
    pub seller_id: u64,
    #[serde(alias = "seller_name", alias = "seller", alias = "store")]
    pub seller_name: String,
    #[serde(default, alias = "product_id", deserialize_with = "lenient::opt_u64")]
    pub product_id: Option<u64>,
    #[serde(default, deserialize_with = "lenient::opt_f64")]
    pub rating: Option<f64>,
    #[serde(default, alias = "distance_descriptor", alias = "distance")]
    pub distance_descriptor: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_f64")]
    pub price: Option<f64>,
    #[serde(
        default,
        alias = "previous_price",
        alias = "originalPrice",
        alias = "original_price",
        alias = "oldPrice",
        alias = "old_price",
        deserialize_with = "lenient::opt_f64"
    )]
    pub previous_price: Option<f64>,
    #[serde(
        default,
        alias = "savings_amount",
        alias = "savings",
        alias = "economy",
        deserialize_with = "lenient::opt_f64"
    )]
    pub savings_amount: Option<f64>,
    #[serde(
        default,
        alias = "delivery_fee_descriptor",
        alias = "deliveryFee",
        alias = "delivery_fee",
        alias = "shipping"
    )]
    pub delivery_fee_descriptor: Option<String>,
    #[serde(
        default,
        alias = "delivery_time_descriptor",
        alias = "deliveryTime",
        alias = "delivery_time"
    )]
    pub delivery_time_descriptor: Option<String>,
    #[serde(
        default,
        alias = "stock_quantity",
        alias = "stock",
        alias = "quantity",
        deserialize_with = "lenient::opt_f64"
    )]
    pub stock_quantity: Option<f64>,
    #[serde(default, alias = "isVerified", alias = "is_verified")]
    pub verified: Option<bool>,
    #[serde(
        default,
        alias = "explicit_best_price",
        alias = "isBestPrice",
        alias = "is_best_price",
        alias = "bestPrice",
        alias = "best_price"
    )]
    pub explicit_best_price: Option<bool>,
}

/// Provider payload for one product.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawComparison {
    #[serde(alias = "product_id", alias = "id", deserialize_with = "lenient::u64_value")]
    pub product_id: u64,
    #[serde(default, alias = "product_name", alias = "name")]
    pub product_name: String,
    #[serde(default, alias = "product_description", alias = "description")]
    pub product_description: String,
    /// Records that fail to decode are dropped here with a warning; the rest
    /// of the payload is kept.
    #[serde(default, alias = "sellers", deserialize_with = "lenient::offer_records")]
    pub offers: Vec<RawOffer>,
}

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("http error: {0}")]
    HttpError(String),
    #[error("request timed out")]
    Timeout,
    #[error("invalid response: {0}")]
    InvalidResponse(String),
    #[error("no offers published for product {0}")]
    NotFound(u64),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed offer payload: {0}")]
    Decode(#[from] serde_json::Error),
}

impl From<reqwest::Error> for ProviderError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ProviderError::Timeout
        } else {
            ProviderError::HttpError(err.to_string())
        }
    }
}

/// Reasons a raw record is rejected while building a comparison.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum OfferError {
    #[error("offer {id} has no usable price")]
    MissingPrice { id: u64 },
    #[error("offer {id} has invalid price {price}")]
    InvalidPrice { id: u64, price: f64 },
    #[error("offer {id} belongs to product {found}, expected {expected}")]
    ForeignProduct { id: u64, expected: u64, found: u64 },
    #[error("duplicate offer id {0}")]
    DuplicateId(u64),
}

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("notification api error: {0}")]
    ApiError(String),
    #[error("notification endpoint unreachable")]
    Unreachable,
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum CartError {
    #[error("offer {0} is not part of the current comparison")]
    UnknownOffer(u64),
    #[error("offer {0} is out of stock")]
    OutOfStock(u64),
    #[error("invalid quantity {0}")]
    InvalidQuantity(u32),
    #[error("cart rejected the item: {0}")]
    Rejected(String),
}
