//! Transactional email over SMTP via lettre.
//!
//! Two messages are sent: the email-verification link after
//! registration and the password-reset link. Bodies are short inline
//! HTML; there is no templating layer.

use lettre::{
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
    message::header::ContentType,
    transport::smtp::{Error as SmtpError, authentication::Credentials},
};
use secrecy::ExposeSecret;
use thiserror::Error;
use url::Url;

use crate::config::EmailConfig;

/// Errors that can occur when sending email.
#[derive(Debug, Error)]
pub enum EmailError {
    /// SMTP transport error.
    #[error("SMTP error: {0}")]
    Smtp(#[from] SmtpError),

    /// Failed to build email message.
    #[error("Failed to build message: {0}")]
    MessageBuild(#[from] lettre::error::Error),

    /// Invalid email address.
    #[error("Invalid email address: {0}")]
    InvalidAddress(String),
}

/// Email service for the verification and reset flows.
#[derive(Clone)]
pub struct EmailService {
    mailer: AsyncSmtpTransport<Tokio1Executor>,
    from_address: String,
    frontend_url: Url,
}

impl EmailService {
    /// Create a new email service from configuration.
    ///
    /// # Errors
    ///
    /// Returns error if the SMTP relay cannot be configured.
    pub fn new(config: &EmailConfig) -> Result<Self, SmtpError> {
        let credentials = Credentials::new(
            config.smtp_username.clone(),
            config.smtp_password.expose_secret().to_string(),
        );

        let mailer = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.smtp_host)?
            .port(config.smtp_port)
            .credentials(credentials)
            .build();

        Ok(Self {
            mailer,
            from_address: config.from_address.clone(),
            frontend_url: config.frontend_url.clone(),
        })
    }

    /// Send the address-verification link after registration.
    ///
    /// # Errors
    ///
    /// Returns error if the message cannot be built or sent.
    pub async fn send_verification_email(&self, to: &str, token: &str) -> Result<(), EmailError> {
        let mut link = self.frontend_url.clone();
        link.set_path("/auth/verify-email");
        link.set_query(Some(&format!("token={token}")));

        let body = format!(
            "<p>Hallo</p>\
             <p>Terima kasih telah mendaftar di Durian Pak Jayus. Untuk melanjutkan, \
             silakan verifikasi alamat email Anda dengan mengeklik tautan di bawah ini:</p>\
             <a href=\"{link}\">Verifikasi Email</a>\
             <p>Jika Anda tidak mendaftar, abaikan pesan ini.</p>\
             <p>Terima kasih.</p>\
             <p>Tim Durian Pak Jayus</p>"
        );

        self.send_html(to, "Verify Email", body).await
    }

    /// Send the password-reset link.
    ///
    /// # Errors
    ///
    /// Returns error if the message cannot be built or sent.
    pub async fn send_reset_password_email(&self, to: &str, token: &str) -> Result<(), EmailError> {
        let mut link = self.frontend_url.clone();
        link.set_path(&format!("/auth/reset-password/{token}"));

        let body = format!(
            "<p>Halo</p>\
             <p>Anda menerima email ini karena kami menerima permintaan untuk mereset \
             kata sandi akun Anda. Silakan klik tautan di bawah ini untuk melanjutkan \
             proses reset password:</p>\
             <a href=\"{link}\">Reset Password</a>\
             <p>Jika Anda tidak meminta reset password, abaikan pesan ini. \
             Akun Anda tetap aman.</p>\
             <p>Terima kasih.</p>\
             <p>Tim Durian Pak Jayus</p>"
        );

        self.send_html(to, "Reset Password", body).await
    }

    async fn send_html(&self, to: &str, subject: &str, body: String) -> Result<(), EmailError> {
        let email = Message::builder()
            .from(
                self.from_address
                    .parse()
                    .map_err(|_| EmailError::InvalidAddress(self.from_address.clone()))?,
            )
            .to(to
                .parse()
                .map_err(|_| EmailError::InvalidAddress(to.to_string()))?)
            .subject(subject)
            .header(ContentType::TEXT_HTML)
            .body(body)?;

        self.mailer.send(email).await?;

        tracing::info!(to = %to, subject = %subject, "Email sent successfully");
        Ok(())
    }
}
