//! Email sending abstraction.
//!
//! Uses Resend in production, SMTP (lettre) in development. When neither is
//! configured the sender runs disabled: sends are skipped and logged, which
//! keeps admission decisions independent of the mail channel.

use anyhow::Result;
use async_trait::async_trait;
use lettre::{
    Message, SmtpTransport, Transport,
    message::{Mailbox, header::ContentType},
};
use resend_rs::types::CreateEmailBaseOptions;

use crate::models::Invoice;

const FROM_NOREPLY: &str = "no-reply@twiller.test";
const FROM_BILLING: &str = "billing@twiller.test";

/// Email sender abstraction.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EmailSender: Send + Sync {
    /// Send a one-time code email.
    async fn send_otp_code(&self, to: &str, code: &str) -> Result<()>;

    /// Send a temporary password email.
    async fn send_temp_password(&self, to: &str, password: &str) -> Result<()>;

    /// Send a subscription invoice email.
    async fn send_invoice(&self, to: &str, invoice: &Invoice) -> Result<()>;
}

/// Transport-selecting implementation of EmailSender.
pub enum EmailSenderImpl {
    /// Resend API sender (for production)
    Resend(ResendSender),
    /// SMTP-based sender using lettre (for development)
    Smtp(SmtpSender),
    /// No transport configured; sends are logged and skipped.
    Disabled,
}

impl EmailSenderImpl {
    /// Create a new email sender based on config.
    /// Prefers Resend if an api key is provided, then SMTP, then disabled.
    pub fn new(resend_api_key: Option<String>, smtp_url: Option<String>) -> Result<Self> {
        if let Some(api_key) = resend_api_key.filter(|k| !k.is_empty()) {
            Ok(Self::Resend(ResendSender::new(api_key)))
        } else if let Some(url) = smtp_url.filter(|u| !u.is_empty()) {
            Ok(Self::Smtp(SmtpSender::new(url)?))
        } else {
            tracing::warn!("no email transport configured; outbound mail is disabled");
            Ok(Self::Disabled)
        }
    }

    async fn send(&self, from: &str, to: &str, subject: &str, body: String) -> Result<()> {
        match self {
            Self::Resend(sender) => sender.send(from, to, subject, body).await,
            Self::Smtp(sender) => sender.send(from, to, subject, body),
            Self::Disabled => {
                tracing::debug!(to = %to, subject = %subject, "mail disabled, skipping send");
                Ok(())
            }
        }
    }
}

#[async_trait]
impl EmailSender for EmailSenderImpl {
    async fn send_otp_code(&self, to: &str, code: &str) -> Result<()> {
        self.send(
            FROM_NOREPLY,
            to,
            "Your OTP for Twiller",
            format!("Your OTP is {}. It expires in 5 minutes.", code),
        )
        .await
    }

    async fn send_temp_password(&self, to: &str, password: &str) -> Result<()> {
        self.send(
            FROM_NOREPLY,
            to,
            "Password reset for Twiller",
            format!("Your temporary password is: {}", password),
        )
        .await
    }

    async fn send_invoice(&self, to: &str, invoice: &Invoice) -> Result<()> {
        self.send(
            FROM_BILLING,
            to,
            "Your Twiller subscription",
            format!(
                "Thank you for subscribing. Invoice: {}",
                serde_json::to_string(invoice)?
            ),
        )
        .await
    }
}

/// SMTP sender using lettre.
pub struct SmtpSender {
    transport: SmtpTransport,
}

impl SmtpSender {
    pub fn new(smtp_url: String) -> Result<Self> {
        let transport = SmtpTransport::from_url(&smtp_url)?.build();

        Ok(Self { transport })
    }

    fn send(&self, from: &str, to: &str, subject: &str, body: String) -> Result<()> {
        let email = Message::builder()
            .from(Mailbox::new(Some("Twiller".to_owned()), from.parse()?))
            .to(Mailbox::new(None, to.parse()?))
            .subject(subject)
            .header(ContentType::TEXT_PLAIN)
            .body(body)?;

        self.transport.send(&email)?;

        Ok(())
    }
}

/// Resend API sender.
pub struct ResendSender {
    client: resend_rs::Resend,
}

impl ResendSender {
    pub fn new(api_key: String) -> Self {
        Self {
            client: resend_rs::Resend::new(&api_key),
        }
    }

    async fn send(&self, from: &str, to: &str, subject: &str, body: String) -> Result<()> {
        let email =
            CreateEmailBaseOptions::new(format!("Twiller <{from}>"), [to], subject).with_text(&body);

        self.client.emails.send(email).await?;

        Ok(())
    }
}
