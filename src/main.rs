use futures::future::join_all;
use offer_ranker::config::{AppConfig, ProductConfig, SourceConfig, load_config};
use offer_ranker::notifier::{LogNotifier, Notifier, Severity, TelegramNotifier};
use offer_ranker::provider::{FixtureOfferProvider, HttpOfferProvider, OfferProvider};
use offer_ranker::{ComparisonService, ProviderError};
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main(flavor = "current_thread")]
async fn main() {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    // Set panic hook to log details about any panic
    std::panic::set_hook(Box::new(|panic_info| {
        eprintln!("😱 Panic occurred: {:?}", panic_info);
    }));

    let config_path = std::env::args().nth(1).unwrap_or_else(|| "config.json".to_string());
    let config: AppConfig = match load_config(&config_path) {
        Ok(cfg) => cfg,
        Err(e) => {
            error!("Config load error ({}): {}", config_path, e);
            std::process::exit(1);
        }
    };

    let provider = match build_provider(&config.source) {
        Ok(p) => p,
        Err(e) => {
            error!("Failed to initialize offer provider: {}", e);
            std::process::exit(1);
        }
    };

    let notifier: Arc<dyn Notifier> = match &config.telegram {
        Some(tg) => match TelegramNotifier::new(tg.bot_token.clone(), tg.chat_id) {
            Ok(n) => Arc::new(n),
            Err(e) => {
                warn!("Telegram unavailable, logging notifications instead: {}", e);
                Arc::new(LogNotifier)
            }
        },
        None => Arc::new(LogNotifier),
    };

    info!("Products to compare: {}", config.products.len());
    let tasks: Vec<_> = config
        .products
        .iter()
        .map(|product_cfg| process_product(product_cfg, provider.clone(), notifier.clone()))
        .collect();
    join_all(tasks).await;
    info!("Done.");
}

fn build_provider(source: &SourceConfig) -> Result<Arc<dyn OfferProvider>, ProviderError> {
    match source {
        SourceConfig::Http {
            base_url,
            timeout_seconds,
        } => Ok(Arc::new(HttpOfferProvider::new(
            base_url,
            Duration::from_secs(*timeout_seconds),
        )?)),
        SourceConfig::Fixture { dir } => Ok(Arc::new(FixtureOfferProvider::new(dir))),
    }
}

/// Loads one product, logs the ranked listing and sends the recommendation.
async fn process_product(
    product_cfg: &ProductConfig,
    provider: Arc<dyn OfferProvider>,
    notifier: Arc<dyn Notifier>,
) {
    let service = ComparisonService::new(provider).with_notifier(notifier.clone());

    let comparison = match service.load_comparison(product_cfg.product_id).await {
        Ok(c) => c,
        // the service has already logged and notified the failure
        Err(_) => return,
    };

    let stats = service.stats();
    info!(
        "{} | {} offers | min {:.2} | max {:.2} | avg {:.2} | free delivery {} | nearby {} | top rated {}",
        comparison.product_name(),
        stats.total_offers,
        stats.min_price,
        stats.max_price,
        stats.avg_price,
        stats.free_delivery_count,
        stats.nearby_count,
        stats.high_rating_count
    );

    let listing = service.listing(product_cfg.sort, product_cfg.filter);
    info!(
        "Listing by {}{}: {} offers",
        product_cfg.sort,
        product_cfg
            .filter
            .map(|f| format!(" ({})", f))
            .unwrap_or_default(),
        listing.len()
    );
    for offer in &listing {
        let verdict = service
            .analyze_offer(offer.id())
            .map(|a| a.reason_text)
            .unwrap_or_default();
        info!(
            "  #{} {} | {} | {} | {} | score {:.0}{} | {}",
            offer.id(),
            offer.seller_name(),
            offer.formatted_price(),
            offer.delivery_fee_descriptor(),
            offer.distance_descriptor(),
            offer.score(),
            offer.badge().map(|b| format!(" [{}]", b)).unwrap_or_default(),
            verdict
        );
    }

    match service.recommend() {
        Some(rec) => {
            let message = format!(
                "{}: buy from {} for {}. {}",
                comparison.product_name(),
                rec.offer.seller_name(),
                rec.offer.formatted_price(),
                rec.reason_text
            );
            if let Err(e) = notifier.notify(&message, Severity::Info).await {
                warn!("Recommendation notification failed: {}", e);
            }
        }
        None => info!("No offers for product {}", product_cfg.product_id),
    }
}
