// Comparison service: load-state tracking and the query facade
use crate::analyzer::comparison::{
    Comparison, ComparisonStats, FilterCriterion, SortCriterion, filter_offers, sort_offers,
};
use crate::analyzer::recommendation::{self, Analysis, Recommendation};
use crate::model::{CartError, Offer, ProviderError};
use crate::normalizer::normalize_all;
use crate::notifier::{CartSink, LogNotifier, Notifier, SellerNavigator, Severity};
use crate::provider::OfferProvider;
use chrono::{DateTime, Utc};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::{info, warn};

#[derive(Debug, Clone, PartialEq)]
pub enum LoadState {
    Idle,
    Loading { product_id: u64 },
    Loaded { product_id: u64, loaded_at: DateTime<Utc> },
    Error { product_id: u64, message: String },
}

struct ServiceState {
    load: LoadState,
    comparison: Arc<Comparison>,
    has_loaded: bool,
}

/// Loads offers for a product and answers queries over the latest comparison.
///
/// The comparison is replaced wholesale after each fetch, so a query always
/// sees offers from exactly one load. Overlapping loads are not cancelled:
/// whichever resolves last wins.
pub struct ComparisonService {
    provider: Arc<dyn OfferProvider>,
    notifier: Arc<dyn Notifier>,
    state: RwLock<ServiceState>,
}

impl ComparisonService {
    pub fn new(provider: Arc<dyn OfferProvider>) -> Self {
        Self {
            provider,
            notifier: Arc::new(LogNotifier),
            state: RwLock::new(ServiceState {
                load: LoadState::Idle,
                comparison: Arc::new(Comparison::default()),
                has_loaded: false,
            }),
        }
    }

    pub fn with_notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = notifier;
        self
    }

    // The state is only ever swapped as a whole, so a poisoned lock still
    // holds a consistent value.
    fn read(&self) -> RwLockReadGuard<'_, ServiceState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, ServiceState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Fetches offers for `product_id` and replaces the current comparison.
    ///
    /// On failure the previous comparison stays queryable; if nothing was
    /// loaded before, the comparison becomes empty for `product_id`. The
    /// failure is also sent to the notifier.
    pub async fn load_comparison(&self, product_id: u64) -> Result<Arc<Comparison>, ProviderError> {
        info!("Loading offers for product {}", product_id);
        self.write().load = LoadState::Loading { product_id };

        let result = self
            .provider
            .fetch_offers(product_id)
            .await
            .and_then(|raw| {
                if raw.product_id != product_id {
                    return Err(ProviderError::InvalidResponse(format!(
                        "requested product {} but received {}",
                        product_id, raw.product_id
                    )));
                }
                Ok(Arc::new(normalize_all(raw)))
            });

        let outcome = {
            let mut state = self.write();
            match result {
                Ok(comparison) => {
                    info!(
                        "Loaded {} offers for product {}",
                        comparison.total_offers(),
                        product_id
                    );
                    state.comparison = comparison.clone();
                    state.has_loaded = true;
                    state.load = LoadState::Loaded {
                        product_id,
                        loaded_at: Utc::now(),
                    };
                    Ok(comparison)
                }
                Err(e) => {
                    warn!("Failed to load offers for product {}: {}", product_id, e);
                    if !state.has_loaded {
                        state.comparison = Arc::new(Comparison::empty(product_id));
                    }
                    state.load = LoadState::Error {
                        product_id,
                        message: e.to_string(),
                    };
                    Err(e)
                }
            }
        };

        if let Err(e) = &outcome {
            let message = format!("Could not load offers for product {}: {}", product_id, e);
            if let Err(notify_err) = self.notifier.notify(&message, Severity::Error).await {
                warn!("Load failure notification failed: {}", notify_err);
            }
        }
        outcome
    }

    pub fn load_state(&self) -> LoadState {
        self.read().load.clone()
    }

    pub fn is_loading(&self) -> bool {
        matches!(self.read().load, LoadState::Loading { .. })
    }

    pub fn error_message(&self) -> Option<String> {
        match &self.read().load {
            LoadState::Error { message, .. } => Some(message.clone()),
            _ => None,
        }
    }

    pub fn loaded_at(&self) -> Option<DateTime<Utc>> {
        match self.read().load {
            LoadState::Loaded { loaded_at, .. } => Some(loaded_at),
            _ => None,
        }
    }

    /// Snapshot of the current comparison.
    pub fn comparison(&self) -> Arc<Comparison> {
        self.read().comparison.clone()
    }

    pub fn stats(&self) -> ComparisonStats {
        self.comparison().stats()
    }

    pub fn sort(&self, criterion: SortCriterion) -> Vec<Offer> {
        self.comparison().sort(criterion)
    }

    pub fn filter(&self, criterion: FilterCriterion) -> Vec<Offer> {
        self.comparison().filter(criterion)
    }

    /// Optionally filtered, then sorted.
    pub fn listing(&self, sort: SortCriterion, filter: Option<FilterCriterion>) -> Vec<Offer> {
        let comparison = self.comparison();
        match filter {
            Some(criterion) => sort_offers(&filter_offers(comparison.offers(), criterion), sort),
            None => comparison.sort(sort),
        }
    }

    pub fn best_offer(&self) -> Option<Offer> {
        self.comparison().best_offer().cloned()
    }

    pub fn offer_by_id(&self, offer_id: u64) -> Option<Offer> {
        self.comparison().offer_by_id(offer_id).cloned()
    }

    pub fn analyze_offer(&self, offer_id: u64) -> Option<Analysis> {
        recommendation::analyze_offer(&self.comparison(), offer_id)
    }

    pub fn analyze_all(&self) -> Vec<Analysis> {
        recommendation::analyze_all(&self.comparison())
    }

    pub fn recommend(&self) -> Option<Recommendation> {
        recommendation::recommend(&self.comparison())
    }

    /// Opens the seller of `offer_id`. Returns false for unknown offers.
    pub fn select_offer(&self, offer_id: u64, navigator: &dyn SellerNavigator) -> bool {
        match self.offer_by_id(offer_id) {
            Some(offer) => {
                navigator.open_seller(offer.seller_id());
                true
            }
            None => false,
        }
    }

    /// Hands an offer to the cart and reports the outcome through the notifier.
    pub async fn add_to_cart(
        &self,
        offer_id: u64,
        quantity: u32,
        cart: &dyn CartSink,
    ) -> Result<(), CartError> {
        let comparison = self.comparison();
        let result = match check_cart_item(&comparison, offer_id, quantity) {
            Ok(()) => cart.add(comparison.product_id(), offer_id, quantity).await,
            Err(e) => Err(e),
        };

        let (message, severity) = match &result {
            Ok(()) => (
                format!("Added {} x {} to the cart", quantity, comparison.product_name()),
                Severity::Success,
            ),
            Err(e) => (format!("Could not add to the cart: {}", e), Severity::Error),
        };
        if let Err(e) = self.notifier.notify(&message, severity).await {
            warn!("Cart notification failed: {}", e);
        }

        result
    }
}

fn check_cart_item(comparison: &Comparison, offer_id: u64, quantity: u32) -> Result<(), CartError> {
    let offer = comparison
        .offer_by_id(offer_id)
        .ok_or(CartError::UnknownOffer(offer_id))?;
    if !offer.in_stock() {
        return Err(CartError::OutOfStock(offer_id));
    }
    if quantity == 0 || quantity > offer.stock_quantity() {
        return Err(CartError::InvalidQuantity(quantity));
    }
    Ok(())
}
