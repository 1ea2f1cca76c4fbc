use std::sync::Arc;

use anyhow::Context;
use async_trait::async_trait;
use lettre::message::{header::ContentType, Mailbox, Message};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Tokio1Executor};
use tracing::{info, warn};

use crate::config::SmtpConfig;

/// Delivers password reset codes.
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send_reset_code(&self, to: &str, code: &str) -> anyhow::Result<()>;
}

/// Builds the SMTP mailer when configured, otherwise the log-only one.
pub fn from_config(cfg: &SmtpConfig) -> anyhow::Result<Arc<dyn Mailer>> {
    if !cfg.is_configured() {
        warn!("SMTP not configured; reset codes will only be logged");
        return Ok(Arc::new(LogMailer));
    }
    Ok(Arc::new(SmtpMailer::new(cfg)?))
}

pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
}

impl SmtpMailer {
    pub fn new(cfg: &SmtpConfig) -> anyhow::Result<Self> {
        let host = cfg.host.as_deref().context("SMTP_HOST missing")?;
        let user = cfg.user.clone().context("SMTP_USER missing")?;
        let password = cfg.password.clone().context("SMTP_PASSWORD missing")?;
        let from = cfg
            .from
            .as_deref()
            .filter(|f| !f.trim().is_empty())
            .unwrap_or(&user)
            .parse::<Mailbox>()
            .context("invalid SMTP_FROM address")?;

        // 465 is implicit TLS, everything else upgrades with STARTTLS.
        let builder = if cfg.port == 465 {
            AsyncSmtpTransport::<Tokio1Executor>::relay(host)
        } else {
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(host)
        }
        .context("configure SMTP transport")?;

        let transport = builder
            .port(cfg.port)
            .credentials(Credentials::new(user, password))
            .build();

        Ok(Self { transport, from })
    }
}

fn reset_email_body(code: &str) -> String {
    format!(
        "Hello!\n\n\
         You requested a password reset for your FocusUp account.\n\
         Your reset code: {code}\n\n\
         The code is valid for 1 hour.\n\
         If you did not request a reset, ignore this message.\n\n\
         The FocusUp team\n"
    )
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send_reset_code(&self, to: &str, code: &str) -> anyhow::Result<()> {
        let message = Message::builder()
            .from(self.from.clone())
            .to(to.parse::<Mailbox>().context("invalid recipient")?)
            .subject("FocusUp password reset")
            .header(ContentType::TEXT_PLAIN)
            .body(reset_email_body(code))
            .context("build reset email")?;

        self.transport
            .send(message)
            .await
            .context("send reset email")?;
        info!("reset email sent");
        Ok(())
    }
}

/// Writes the code to the log instead of sending it. Development only.
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send_reset_code(&self, to: &str, code: &str) -> anyhow::Result<()> {
        info!(to, code, "SMTP not configured; reset code not emailed");
        Ok(())
    }
}
