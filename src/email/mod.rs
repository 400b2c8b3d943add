pub mod templates;

use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};

use crate::config::SmtpConfig;
use crate::reset::{NotificationDispatcher, PASSWORD_RESET_TEMPLATE, ResetNotice};

pub struct SystemMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: String,
}

impl SystemMailer {
    pub fn new(config: &SmtpConfig) -> Result<Self, String> {
        let creds = Credentials::new(config.user.clone(), config.pass.clone());

        let transport = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.host)
            .map_err(|e| format!("System SMTP error: {e}"))?
            .port(config.port)
            .credentials(creds)
            .build();

        Ok(Self {
            transport,
            from: config.from.clone(),
        })
    }

    async fn deliver(&self, to: &str, subject: &str, html_body: String) -> Result<(), String> {
        let message = Message::builder()
            .from(
                self.from
                    .parse()
                    .map_err(|e| format!("Invalid from address: {e}"))?,
            )
            .to(to.parse().map_err(|e| format!("Invalid to address: {e}"))?)
            .subject(subject)
            .header(ContentType::TEXT_HTML)
            .body(html_body)
            .map_err(|e| format!("Failed to build email: {e}"))?;

        self.transport
            .send(message)
            .await
            .map_err(|e| format!("Failed to send email: {e}"))?;

        Ok(())
    }
}

#[async_trait]
impl NotificationDispatcher for SystemMailer {
    async fn send(&self, notice: &ResetNotice) -> Result<(), String> {
        let html = templates::render(notice)?;
        self.deliver(&notice.recipient, &notice.subject, html).await
    }
}

/// Fallback used when no SMTP relay is configured: the link goes to the log.
pub struct LogDispatcher;

#[async_trait]
impl NotificationDispatcher for LogDispatcher {
    async fn send(&self, notice: &ResetNotice) -> Result<(), String> {
        if notice.template_id == PASSWORD_RESET_TEMPLATE {
            tracing::warn!(
                recipient = %notice.recipient,
                "System SMTP not configured. Password reset link: {}",
                notice.reset_link
            );
        }
        Ok(())
    }
}
