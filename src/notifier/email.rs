// notifier/email.rs

use crate::config::SmtpConfig;
use crate::model::NotifyError;
use crate::notifier::Notifier;
use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use tracing::info;

/// Sends reports over SMTP with STARTTLS and login.
///
/// The transport is built without a connection pool, so every send opens a
/// fresh session and closes it when the call returns, on success or error.
pub struct EmailNotifier {
    mailer: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
    to: Mailbox,
    subject: String,
}

impl EmailNotifier {
    pub fn new(cfg: &SmtpConfig) -> Result<Self, NotifyError> {
        let from = parse_mailbox(cfg.sender())?;
        let to = parse_mailbox(&cfg.recipient)?;

        let mailer = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&cfg.host)?
            .port(cfg.port)
            .credentials(Credentials::new(cfg.username.clone(), cfg.password.clone()))
            .build();

        Ok(Self {
            mailer,
            from,
            to,
            subject: cfg.subject.clone(),
        })
    }

    /// Plain-text UTF-8 message with the fixed sender, recipient and subject.
    pub fn compose(&self, body: &str) -> Result<Message, NotifyError> {
        let message = Message::builder()
            .from(self.from.clone())
            .to(self.to.clone())
            .subject(self.subject.clone())
            .header(ContentType::TEXT_PLAIN)
            .body(body.to_string())?;
        Ok(message)
    }
}

#[async_trait::async_trait]
impl Notifier for EmailNotifier {
    async fn send_report(&self, body: &str) -> Result<(), NotifyError> {
        let message = self.compose(body)?;
        info!("📤 Sending report to {}", self.to);
        let response = self.mailer.send(message).await?;
        info!("✅ SMTP accepted message [{}]", response.code());
        Ok(())
    }
}

fn parse_mailbox(address: &str) -> Result<Mailbox, NotifyError> {
    address.parse::<Mailbox>().map_err(|e| NotifyError::Address {
        address: address.to_string(),
        reason: e.to_string(),
    })
}
