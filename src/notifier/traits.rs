// Outbound collaborators invoked by the comparison service.
use crate::model::{CartError, NotifyError};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Severity {
    Info,
    Success,
    Warning,
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Severity::Info => "info",
            Severity::Success => "success",
            Severity::Warning => "warning",
            Severity::Error => "error",
        };
        f.write_str(name)
    }
}

/// Shows a short message to the user (snackbar, chat message, log line).
#[async_trait::async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, message: &str, severity: Severity) -> Result<(), NotifyError>;
}

/// Receives items the user adds to the cart.
#[async_trait::async_trait]
pub trait CartSink: Send + Sync {
    async fn add(&self, product_id: u64, offer_id: u64, quantity: u32) -> Result<(), CartError>;
}

/// Opens the seller page when the user selects an offer.
pub trait SellerNavigator {
    fn open_seller(&self, seller_id: u64);
}
