// Offer providers: where raw offer records come from.

pub mod fetcher;
pub mod fixture;
pub mod traits;

pub use fetcher::HttpOfferProvider;
pub use fixture::FixtureOfferProvider;
pub use traits::OfferProvider;
