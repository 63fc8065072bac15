use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::AsyncSmtpTransport;
use lettre::AsyncTransport;
use lettre::Message;
use lettre::Tokio1Executor;

use crate::config::MailConfig;
use crate::domain::user::ports::ConfirmationNotifier;
use crate::user::errors::NotifierError;

/// SMTP-backed delivery of confirmation emails.
pub struct SmtpConfirmationNotifier {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
    base_url: String,
}

impl SmtpConfirmationNotifier {
    /// Build a notifier from mail configuration.
    ///
    /// # Arguments
    /// * `config` - SMTP relay, credentials, sender, and public base URL
    ///
    /// # Errors
    /// * `InvalidMessage` - Relay host or sender address could not be parsed
    pub fn new(config: &MailConfig) -> Result<Self, NotifierError> {
        let transport = AsyncSmtpTransport::<Tokio1Executor>::relay(&config.smtp_host)
            .map_err(|e| NotifierError::InvalidMessage(e.to_string()))?
            .port(config.smtp_port)
            .credentials(Credentials::new(
                config.username.clone(),
                config.password.clone(),
            ))
            .build();

        let from: Mailbox = config
            .from
            .parse()
            .map_err(|e| NotifierError::InvalidMessage(format!("Invalid sender address: {}", e)))?;

        Ok(Self {
            transport,
            from,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl ConfirmationNotifier for SmtpConfirmationNotifier {
    async fn send_confirmation(
        &self,
        email: &str,
        username: &str,
        token: &str,
    ) -> Result<(), NotifierError> {
        let to: Mailbox = email
            .parse()
            .map_err(|e| NotifierError::InvalidMessage(format!("Invalid recipient: {}", e)))?;

        let link = confirmation_link(&self.base_url, token);

        let message = Message::builder()
            .from(self.from.clone())
            .to(to)
            .subject("Confirm your email")
            .header(ContentType::TEXT_PLAIN)
            .body(format!(
                "Hi {},\n\nFollow the link to confirm your email address:\n{}\n",
                username, link
            ))
            .map_err(|e| NotifierError::InvalidMessage(e.to_string()))?;

        self.transport
            .send(message)
            .await
            .map_err(|e| NotifierError::SendFailed(e.to_string()))?;

        Ok(())
    }
}

fn confirmation_link(base_url: &str, token: &str) -> String {
    format!("{}/api/auth/confirmed_email/{}", base_url, token)
}
