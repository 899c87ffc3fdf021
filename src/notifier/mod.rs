pub mod telegram;
pub mod traits;

pub use telegram::TelegramNotifier;
pub use traits::{CartSink, Notifier, SellerNavigator, Severity};

use crate::model::NotifyError;
use tracing::{error, info, warn};

/// Writes notifications to the tracing log.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

#[async_trait::async_trait]
impl Notifier for LogNotifier {
    async fn notify(&self, message: &str, severity: Severity) -> Result<(), NotifyError> {
        match severity {
            Severity::Info | Severity::Success => info!("[{}] {}", severity, message),
            Severity::Warning => warn!("[{}] {}", severity, message),
            Severity::Error => error!("[{}] {}", severity, message),
        }
        Ok(())
    }
}
