//! Offer comparison and ranking for a storefront product page.
//!
//! A provider delivers raw seller offers for a product; they are normalized
//! into an immutable [`Comparison`], which answers statistics, filter and sort
//! queries. The recommendation engine scores offers and explains the pick.
//! [`ComparisonService`] ties loading and querying together.

pub mod analyzer;
pub mod config;
pub mod model;
pub mod normalizer;
pub mod notifier;
pub mod provider;
pub mod service;
pub mod utils;

pub use analyzer::{
    Analysis, Comparison, ComparisonStats, FilterCriterion, ReasonCode, Recommendation,
    SortCriterion,
};
pub use model::{Badge, Offer, ProductInfo, ProviderError, RawComparison, RawOffer};
pub use service::{ComparisonService, LoadState};
