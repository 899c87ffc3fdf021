use offer_ranker::model::{CartError, NotifyError, RawComparison, RawOffer};
use offer_ranker::notifier::{CartSink, Notifier, SellerNavigator, Severity};
use offer_ranker::provider::OfferProvider;
use offer_ranker::{ComparisonService, LoadState, ProviderError, SortCriterion};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

fn raw_offer(id: u64, price: f64) -> RawOffer {
    RawOffer {
        id,
        seller_id: id + 1000,
        seller_name: format!("Seller {}", id),
        price: Some(price),
        stock_quantity: Some(5.0),
        ..RawOffer::default()
    }
}

fn payload(product_id: u64, offers: Vec<RawOffer>) -> RawComparison {
    RawComparison {
        product_id,
        product_name: format!("Product {}", product_id),
        product_description: String::new(),
        offers,
    }
}

/// Serves canned payloads per product, optionally after a delay.
#[derive(Default)]
struct StubProvider {
    payloads: HashMap<u64, RawComparison>,
    delays: HashMap<u64, Duration>,
    failing: AtomicBool,
}

impl StubProvider {
    fn with(mut self, raw: RawComparison) -> Self {
        self.payloads.insert(raw.product_id, raw);
        self
    }

    fn delayed(mut self, product_id: u64, delay: Duration) -> Self {
        self.delays.insert(product_id, delay);
        self
    }
}

#[async_trait::async_trait]
impl OfferProvider for StubProvider {
    async fn fetch_offers(&self, product_id: u64) -> Result<RawComparison, ProviderError> {
        if let Some(delay) = self.delays.get(&product_id) {
            tokio::time::sleep(*delay).await;
        }
        if self.failing.load(Ordering::SeqCst) {
            return Err(ProviderError::InvalidResponse("status 503 Service Unavailable".into()));
        }
        self.payloads
            .get(&product_id)
            .cloned()
            .ok_or(ProviderError::NotFound(product_id))
    }
}

#[derive(Default)]
struct RecordingNotifier {
    messages: Mutex<Vec<(String, Severity)>>,
}

#[async_trait::async_trait]
impl Notifier for RecordingNotifier {
    async fn notify(&self, message: &str, severity: Severity) -> Result<(), NotifyError> {
        self.messages
            .lock()
            .expect("notifier mutex poisoned")
            .push((message.to_string(), severity));
        Ok(())
    }
}

#[derive(Default)]
struct RecordingCart {
    items: Mutex<Vec<(u64, u64, u32)>>,
}

#[async_trait::async_trait]
impl CartSink for RecordingCart {
    async fn add(&self, product_id: u64, offer_id: u64, quantity: u32) -> Result<(), CartError> {
        self.items
            .lock()
            .expect("cart mutex poisoned")
            .push((product_id, offer_id, quantity));
        Ok(())
    }
}

#[derive(Default)]
struct RecordingNavigator {
    opened: Mutex<Vec<u64>>,
}

impl SellerNavigator for RecordingNavigator {
    fn open_seller(&self, seller_id: u64) {
        self.opened.lock().expect("navigator mutex poisoned").push(seller_id);
    }
}

#[tokio::test]
async fn starts_idle_with_empty_comparison() {
    let service = ComparisonService::new(Arc::new(StubProvider::default()));

    assert_eq!(service.load_state(), LoadState::Idle);
    assert!(!service.is_loading());
    assert!(service.comparison().is_empty());
    assert!(service.best_offer().is_none());
    assert!(service.recommend().is_none());
    assert!(service.sort(SortCriterion::Price).is_empty());
    assert_eq!(service.stats().total_offers, 0);
}

#[tokio::test]
async fn successful_load_moves_to_loaded() {
    let provider = StubProvider::default().with(payload(
        7,
        vec![
            RawOffer { explicit_best_price: Some(true), ..raw_offer(1, 12.9) },
            raw_offer(2, 14.9),
            raw_offer(3, 15.9),
            raw_offer(4, 13.9),
        ],
    ));
    let service = ComparisonService::new(Arc::new(provider));

    let comparison = service.load_comparison(7).await.expect("load succeeds");
    assert_eq!(comparison.total_offers(), 4);

    match service.load_state() {
        LoadState::Loaded { product_id, .. } => assert_eq!(product_id, 7),
        other => panic!("unexpected state {:?}", other),
    }
    assert!(service.loaded_at().is_some());
    assert!(service.error_message().is_none());
    assert_eq!(service.best_offer().map(|o| o.price()), Some(12.9));
    assert_eq!(service.recommend().map(|r| r.offer.id()), Some(1));

    let analysis = service.analyze_offer(2).expect("analysis");
    assert!(analysis.worth_it);
    assert_eq!(analysis.price_gap_to_best, 2.0);
    assert_eq!(service.analyze_all().len(), 4);
}

#[tokio::test]
async fn first_load_failure_leaves_an_empty_comparison() {
    let service = ComparisonService::new(Arc::new(StubProvider::default()));

    let result = service.load_comparison(3).await;
    assert!(matches!(result, Err(ProviderError::NotFound(3))));

    match service.load_state() {
        LoadState::Error { product_id, message } => {
            assert_eq!(product_id, 3);
            assert!(message.contains("product 3"), "{}", message);
        }
        other => panic!("unexpected state {:?}", other),
    }
    assert!(service.error_message().is_some());
    assert_eq!(service.comparison().product_id(), 3);
    assert!(service.comparison().is_empty());
    assert!(service.best_offer().is_none());
}

#[tokio::test]
async fn load_failure_is_reported_through_the_notifier() {
    let notifier = Arc::new(RecordingNotifier::default());
    let service =
        ComparisonService::new(Arc::new(StubProvider::default())).with_notifier(notifier.clone());

    assert!(service.load_comparison(3).await.is_err());

    let messages = notifier.messages.lock().expect("notifier mutex poisoned");
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0].1, Severity::Error);
    assert!(messages[0].0.contains("product 3"), "{}", messages[0].0);
}

#[tokio::test]
async fn successful_load_sends_no_notification() {
    let notifier = Arc::new(RecordingNotifier::default());
    let provider = StubProvider::default().with(payload(1, vec![raw_offer(1, 10.0)]));
    let service = ComparisonService::new(Arc::new(provider)).with_notifier(notifier.clone());

    service.load_comparison(1).await.expect("load succeeds");
    assert!(notifier.messages.lock().expect("notifier mutex poisoned").is_empty());
}

#[tokio::test]
async fn state_is_loading_while_the_fetch_is_in_flight() {
    let provider = StubProvider::default()
        .with(payload(4, vec![raw_offer(1, 10.0)]))
        .delayed(4, Duration::from_millis(30));
    let service = ComparisonService::new(Arc::new(provider));

    // join! polls the load first, so it is parked in the provider's sleep
    // when the second branch runs
    let (result, observed) = tokio::join!(service.load_comparison(4), async {
        (service.is_loading(), service.load_state())
    });

    assert_eq!(observed, (true, LoadState::Loading { product_id: 4 }));
    assert!(result.is_ok());
    assert!(!service.is_loading());
    assert!(matches!(service.load_state(), LoadState::Loaded { product_id: 4, .. }));
}

#[tokio::test]
async fn reload_failure_keeps_previous_comparison() {
    let provider = Arc::new(
        StubProvider::default().with(payload(1, vec![raw_offer(1, 10.0), raw_offer(2, 9.5)])),
    );
    let service = ComparisonService::new(provider.clone());
    service.load_comparison(1).await.expect("first load succeeds");

    provider.failing.store(true, Ordering::SeqCst);
    assert!(service.load_comparison(1).await.is_err());

    assert!(matches!(service.load_state(), LoadState::Error { .. }));
    assert_eq!(service.comparison().total_offers(), 2);
    assert_eq!(service.best_offer().map(|o| o.id()), Some(2));
}

#[tokio::test]
async fn mismatched_product_payload_is_a_load_failure() {
    let mut provider = StubProvider::default();
    provider.payloads.insert(5, payload(6, vec![raw_offer(1, 1.0)]));

    let service = ComparisonService::new(Arc::new(provider));
    let result = service.load_comparison(5).await;
    assert!(matches!(result, Err(ProviderError::InvalidResponse(_))));
    assert!(service.comparison().is_empty());
}

#[tokio::test]
async fn overlapping_loads_resolve_last_write_wins() {
    let provider = StubProvider::default()
        .with(payload(1, vec![raw_offer(10, 5.0)]))
        .with(payload(2, vec![raw_offer(20, 6.0), raw_offer(21, 7.0)]))
        .delayed(1, Duration::from_millis(60));
    let service = ComparisonService::new(Arc::new(provider));

    // product 1 starts first but resolves last
    let (slow, fast) = tokio::join!(service.load_comparison(1), service.load_comparison(2));
    assert!(slow.is_ok() && fast.is_ok());

    let current = service.comparison();
    assert_eq!(current.product_id(), 1);
    assert_eq!(current.total_offers(), 1);
    match service.load_state() {
        LoadState::Loaded { product_id, .. } => assert_eq!(product_id, 1),
        other => panic!("unexpected state {:?}", other),
    }
}

#[tokio::test]
async fn queries_do_not_alter_the_stored_comparison() {
    let provider = StubProvider::default()
        .with(payload(1, vec![raw_offer(1, 30.0), raw_offer(2, 10.0), raw_offer(3, 20.0)]));
    let service = ComparisonService::new(Arc::new(provider));
    service.load_comparison(1).await.expect("load succeeds");

    let sorted: Vec<u64> = service.sort(SortCriterion::Price).iter().map(|o| o.id()).collect();
    assert_eq!(sorted, vec![2, 3, 1]);

    let stored: Vec<u64> = service.comparison().offers().iter().map(|o| o.id()).collect();
    assert_eq!(stored, vec![1, 2, 3]);
}

#[tokio::test]
async fn select_offer_opens_the_seller() {
    let provider = StubProvider::default().with(payload(1, vec![raw_offer(4, 10.0)]));
    let service = ComparisonService::new(Arc::new(provider));
    service.load_comparison(1).await.expect("load succeeds");

    let navigator = RecordingNavigator::default();
    assert!(service.select_offer(4, &navigator));
    assert!(!service.select_offer(99, &navigator));
    assert_eq!(*navigator.opened.lock().expect("navigator mutex poisoned"), vec![1004]);
}

#[tokio::test]
async fn add_to_cart_validates_and_notifies() {
    let provider = StubProvider::default().with(payload(
        8,
        vec![
            raw_offer(1, 10.0),
            RawOffer { stock_quantity: None, ..raw_offer(2, 9.0) },
        ],
    ));
    let notifier = Arc::new(RecordingNotifier::default());
    let service = ComparisonService::new(Arc::new(provider)).with_notifier(notifier.clone());
    service.load_comparison(8).await.expect("load succeeds");

    let cart = RecordingCart::default();
    assert_eq!(service.add_to_cart(1, 2, &cart).await, Ok(()));
    assert_eq!(service.add_to_cart(2, 1, &cart).await, Err(CartError::OutOfStock(2)));
    assert_eq!(service.add_to_cart(9, 1, &cart).await, Err(CartError::UnknownOffer(9)));
    assert_eq!(service.add_to_cart(1, 0, &cart).await, Err(CartError::InvalidQuantity(0)));
    assert_eq!(service.add_to_cart(1, 6, &cart).await, Err(CartError::InvalidQuantity(6)));

    assert_eq!(*cart.items.lock().expect("cart mutex poisoned"), vec![(8, 1, 2)]);

    let messages = notifier.messages.lock().expect("notifier mutex poisoned");
    assert_eq!(messages.len(), 5);
    assert_eq!(messages[0].1, Severity::Success);
    assert_eq!(messages[0].0, "Added 2 x Product 8 to the cart");
    assert!(messages[1..].iter().all(|(_, severity)| *severity == Severity::Error));
}
