use crate::model::{Offer, ProductInfo};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use tracing::warn;

/// All offers published for one product, in arrival order.
///
/// A comparison is built once per load and then only read. Arrival order is
/// kept because it breaks ties in sorting and best-offer selection.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Comparison {
    product: ProductInfo,
    offers: Vec<Offer>,
}

/// Aggregate figures over a comparison. All zero when it has no offers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct ComparisonStats {
    pub min_price: f64,
    pub max_price: f64,
    pub avg_price: f64,
    pub price_spread: f64,
    pub max_savings: f64,
    pub total_offers: usize,
    pub free_delivery_count: usize,
    pub nearby_count: usize,
    pub high_rating_count: usize,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SortCriterion {
    Price,
    Rating,
    Distance,
    Savings,
    #[default]
    Score,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterCriterion {
    FreeDelivery,
    Nearby,
    HighRating,
    Verified,
    InStock,
}

impl Comparison {
    /// Builds a comparison, dropping offers that belong to another product or
    /// repeat an id already seen.
    pub fn new(product: ProductInfo, offers: Vec<Offer>) -> Self {
        let mut seen = HashSet::with_capacity(offers.len());
        let offers = offers
            .into_iter()
            .filter(|offer| {
                if offer.product_id() != product.id {
                    warn!(
                        "Dropping offer {} of product {} from comparison for product {}",
                        offer.id(),
                        offer.product_id(),
                        product.id
                    );
                    return false;
                }
                if !seen.insert(offer.id()) {
                    warn!("Dropping duplicate offer id {} for product {}", offer.id(), product.id);
                    return false;
                }
                true
            })
            .collect();

        Self { product, offers }
    }

    pub fn empty(product_id: u64) -> Self {
        Self {
            product: ProductInfo {
                id: product_id,
                ..ProductInfo::default()
            },
            offers: Vec::new(),
        }
    }

    pub fn product(&self) -> &ProductInfo {
        &self.product
    }

    pub fn product_id(&self) -> u64 {
        self.product.id
    }

    pub fn product_name(&self) -> &str {
        &self.product.name
    }

    pub fn product_description(&self) -> &str {
        &self.product.description
    }

    pub fn offers(&self) -> &[Offer] {
        &self.offers
    }

    pub fn is_empty(&self) -> bool {
        self.offers.is_empty()
    }

    // --- statistics ---

    pub fn min_price(&self) -> f64 {
        self.prices().reduce(f64::min).unwrap_or(0.0)
    }

    pub fn max_price(&self) -> f64 {
        self.prices().reduce(f64::max).unwrap_or(0.0)
    }

    pub fn avg_price(&self) -> f64 {
        if self.offers.is_empty() {
            return 0.0;
        }
        self.prices().sum::<f64>() / self.offers.len() as f64
    }

    pub fn price_spread(&self) -> f64 {
        self.max_price() - self.min_price()
    }

    pub fn max_savings(&self) -> f64 {
        self.offers
            .iter()
            .map(Offer::savings_amount)
            .reduce(f64::max)
            .unwrap_or(0.0)
    }

    pub fn total_offers(&self) -> usize {
        self.offers.len()
    }

    pub fn free_delivery_count(&self) -> usize {
        self.count(Offer::has_free_delivery)
    }

    pub fn nearby_count(&self) -> usize {
        self.count(Offer::is_nearby)
    }

    pub fn high_rating_count(&self) -> usize {
        self.count(Offer::has_high_rating)
    }

    pub fn stats(&self) -> ComparisonStats {
        ComparisonStats {
            min_price: self.min_price(),
            max_price: self.max_price(),
            avg_price: self.avg_price(),
            price_spread: self.price_spread(),
            max_savings: self.max_savings(),
            total_offers: self.total_offers(),
            free_delivery_count: self.free_delivery_count(),
            nearby_count: self.nearby_count(),
            high_rating_count: self.high_rating_count(),
        }
    }

    fn prices(&self) -> impl Iterator<Item = f64> + '_ {
        self.offers.iter().map(Offer::price)
    }

    fn count(&self, predicate: fn(&Offer) -> bool) -> usize {
        self.offers.iter().filter(|o| predicate(o)).count()
    }

    // --- filters ---

    pub fn with_free_delivery(&self) -> Vec<Offer> {
        self.filter(FilterCriterion::FreeDelivery)
    }

    pub fn nearby(&self) -> Vec<Offer> {
        self.filter(FilterCriterion::Nearby)
    }

    pub fn high_rating(&self) -> Vec<Offer> {
        self.filter(FilterCriterion::HighRating)
    }

    pub fn verified(&self) -> Vec<Offer> {
        self.filter(FilterCriterion::Verified)
    }

    pub fn in_stock(&self) -> Vec<Offer> {
        self.filter(FilterCriterion::InStock)
    }

    pub fn filter(&self, criterion: FilterCriterion) -> Vec<Offer> {
        filter_offers(&self.offers, criterion)
    }

    // --- sorts ---

    pub fn by_price(&self) -> Vec<Offer> {
        self.sort(SortCriterion::Price)
    }

    pub fn by_rating(&self) -> Vec<Offer> {
        self.sort(SortCriterion::Rating)
    }

    pub fn by_distance(&self) -> Vec<Offer> {
        self.sort(SortCriterion::Distance)
    }

    pub fn by_savings(&self) -> Vec<Offer> {
        self.sort(SortCriterion::Savings)
    }

    pub fn by_score(&self) -> Vec<Offer> {
        self.sort(SortCriterion::Score)
    }

    pub fn sort(&self, criterion: SortCriterion) -> Vec<Offer> {
        sort_offers(&self.offers, criterion)
    }

    // --- selection ---

    /// The first offer flagged as best price by the data source; without a
    /// flag, the cheapest offer, the earliest one winning ties.
    pub fn best_offer(&self) -> Option<&Offer> {
        self.offers.iter().find(|o| o.is_best_price()).or_else(|| {
            self.offers
                .iter()
                .reduce(|best, o| if o.price() < best.price() { o } else { best })
        })
    }

    pub fn offer_by_id(&self, id: u64) -> Option<&Offer> {
        self.offers.iter().find(|o| o.id() == id)
    }
}

impl FilterCriterion {
    pub fn matches(&self, offer: &Offer) -> bool {
        match self {
            FilterCriterion::FreeDelivery => offer.has_free_delivery(),
            FilterCriterion::Nearby => offer.is_nearby(),
            FilterCriterion::HighRating => offer.has_high_rating(),
            FilterCriterion::Verified => offer.is_verified(),
            FilterCriterion::InStock => offer.in_stock(),
        }
    }
}

impl SortCriterion {
    /// Ordering used by the stable sort for this criterion.
    pub fn compare(&self, a: &Offer, b: &Offer) -> Ordering {
        match self {
            SortCriterion::Price => a.price().total_cmp(&b.price()),
            SortCriterion::Rating => b.rating().total_cmp(&a.rating()),
            SortCriterion::Distance => a.distance_km().total_cmp(&b.distance_km()),
            SortCriterion::Savings => b.savings_amount().total_cmp(&a.savings_amount()),
            SortCriterion::Score => b.score().total_cmp(&a.score()),
        }
    }
}

/// Offers matching `criterion`, in their original order.
pub fn filter_offers(offers: &[Offer], criterion: FilterCriterion) -> Vec<Offer> {
    offers.iter().filter(|o| criterion.matches(o)).cloned().collect()
}

/// Stable sort into a new vector; equal keys keep their input order.
pub fn sort_offers(offers: &[Offer], criterion: SortCriterion) -> Vec<Offer> {
    let mut sorted = offers.to_vec();
    sorted.sort_by(|a, b| criterion.compare(a, b));
    sorted
}

/// Criterion name that matches no sort or filter.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown {kind} criterion '{name}'")]
pub struct UnknownCriterion {
    pub kind: &'static str,
    pub name: String,
}

impl FromStr for SortCriterion {
    type Err = UnknownCriterion;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "price" => Ok(Self::Price),
            "rating" => Ok(Self::Rating),
            "distance" => Ok(Self::Distance),
            "savings" => Ok(Self::Savings),
            "score" => Ok(Self::Score),
            other => Err(UnknownCriterion {
                kind: "sort",
                name: other.to_string(),
            }),
        }
    }
}

impl FromStr for FilterCriterion {
    type Err = UnknownCriterion;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "free_delivery" => Ok(Self::FreeDelivery),
            "nearby" => Ok(Self::Nearby),
            "high_rating" => Ok(Self::HighRating),
            "verified" => Ok(Self::Verified),
            "in_stock" => Ok(Self::InStock),
            other => Err(UnknownCriterion {
                kind: "filter",
                name: other.to_string(),
            }),
        }
    }
}

impl fmt::Display for SortCriterion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SortCriterion::Price => "price",
            SortCriterion::Rating => "rating",
            SortCriterion::Distance => "distance",
            SortCriterion::Savings => "savings",
            SortCriterion::Score => "score",
        };
        f.write_str(name)
    }
}

impl fmt::Display for FilterCriterion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FilterCriterion::FreeDelivery => "free_delivery",
            FilterCriterion::Nearby => "nearby",
            FilterCriterion::HighRating => "high_rating",
            FilterCriterion::Verified => "verified",
            FilterCriterion::InStock => "in_stock",
        };
        f.write_str(name)
    }
}
