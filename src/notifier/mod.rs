pub mod email;

use crate::model::NotifyError;

pub use email::EmailNotifier;

/// Delivery channel for a finished report.
#[async_trait::async_trait]
pub trait Notifier: Send + Sync {
    async fn send_report(&self, body: &str) -> Result<(), NotifyError>;
}
