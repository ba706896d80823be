use async_trait::async_trait;
use lettre::message::{Mailbox, MultiPart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use tracing::info;

use crate::config::SmtpConfig;
use crate::digest::RenderedDigest;
use crate::types::{DigestError, Result};

/// One-shot delivery channel for a rendered digest. Watermark advancement is
/// gated strictly on this returning `Ok`.
#[async_trait]
pub trait DigestSink: Send + Sync {
    async fn deliver(&self, digest: &RenderedDigest) -> Result<()>;
}

/// Sends the digest as a multipart plain+HTML email over SMTP.
pub struct SmtpSink {
    mailer: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
    to: Mailbox,
}

impl SmtpSink {
    pub fn from_config(config: &SmtpConfig) -> Result<Self> {
        let credentials = Credentials::new(config.user.clone(), config.pass.clone());
        let mailer = AsyncSmtpTransport::<Tokio1Executor>::relay(&config.server)
            .map_err(|e| {
                DigestError::Config(format!("invalid SMTP server {}: {e}", config.server))
            })?
            .port(config.port)
            .credentials(credentials)
            .build();

        let from: Mailbox = config
            .send_from
            .parse()
            .map_err(|e| DigestError::Config(format!("invalid send_from address: {e}")))?;
        let to: Mailbox = config
            .send_to
            .parse()
            .map_err(|e| DigestError::Config(format!("invalid send_to address: {e}")))?;

        Ok(Self { mailer, from, to })
    }
}

#[async_trait]
impl DigestSink for SmtpSink {
    async fn deliver(&self, digest: &RenderedDigest) -> Result<()> {
        let message = Message::builder()
            .from(self.from.clone())
            .to(self.to.clone())
            .subject(digest.subject.clone())
            .multipart(MultiPart::alternative_plain_html(
                digest.plain.clone(),
                digest.html.clone(),
            ))
            .map_err(|e| DigestError::Delivery(format!("building message: {e}")))?;

        self.mailer
            .send(message)
            .await
            .map_err(|e| DigestError::Delivery(e.to_string()))?;

        info!(to = %self.to, "digest sent");
        Ok(())
    }
}
