use anyhow::Result;
use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use tokio::time::Duration;
use tracing::{error, info};

use crate::TARGET_WEB_REQUEST;

const SMTP_TIMEOUT: Duration = Duration::from_secs(10);

/// SMTP account used to send notifications
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MailSettings {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
}

/// Builds a UTF-8 plain-text message from the SMTP user to all recipients
pub fn build_message(
    settings: &MailSettings,
    subject: &str,
    message: &str,
    to: &[String],
) -> Result<Message> {
    let mut builder = Message::builder()
        .from(settings.user.parse::<Mailbox>()?)
        .subject(subject)
        .header(ContentType::TEXT_PLAIN);
    for recipient in to {
        builder = builder.to(recipient.parse::<Mailbox>()?);
    }
    Ok(builder.body(message.to_string())?)
}

/// Sends an email over implicit TLS.
///
/// # Arguments
/// * `settings` - SMTP host, port and login
/// * `subject` - Subject line
/// * `message` - Plain-text body
/// * `to` - Recipients
///
/// # Returns
/// * `true` if the message was accepted, `false` otherwise (the error is logged)
pub async fn send_email(settings: &MailSettings, subject: &str, message: &str, to: &[String]) -> bool {
    match try_send_email(settings, subject, message, to).await {
        Ok(()) => {
            info!(target: TARGET_WEB_REQUEST, " ** Email sent to {}", to.join(", "));
            true
        }
        Err(err) => {
            error!(target: TARGET_WEB_REQUEST, " !! Error sending e-mail: {}", err);
            false
        }
    }
}

async fn try_send_email(
    settings: &MailSettings,
    subject: &str,
    message: &str,
    to: &[String],
) -> Result<()> {
    let email = build_message(settings, subject, message, to)?;

    let mailer = AsyncSmtpTransport::<Tokio1Executor>::relay(&settings.host)?
        .port(settings.port)
        .credentials(Credentials::new(
            settings.user.clone(),
            settings.password.clone(),
        ))
        .timeout(Some(SMTP_TIMEOUT))
        .build();

    mailer.send(email).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings(user: &str) -> MailSettings {
        MailSettings {
            host: "smtp.example.com".to_string(),
            port: 465,
            user: user.to_string(),
            password: "secret".to_string(),
        }
    }

    #[test]
    fn test_build_message() {
        let to = vec!["a@example.com".to_string(), "b@example.com".to_string()];
        let message = build_message(&settings("langpop@example.com"), "Tiers", "Ubiquitous: Java", &to).unwrap();

        assert_eq!(message.envelope().to().len(), 2);
        let formatted = String::from_utf8(message.formatted()).unwrap();
        assert!(formatted.contains("Subject: Tiers"));
        assert!(formatted.contains("From: langpop@example.com"));
        assert!(formatted.contains("a@example.com"));
        assert!(formatted.contains("b@example.com"));
        assert!(formatted.contains("Ubiquitous: Java"));
    }

    #[test]
    fn test_build_message_rejects_bad_addresses() {
        let to = vec!["a@example.com".to_string()];
        assert!(build_message(&settings("not an address"), "s", "m", &to).is_err());
        let bad_to = vec!["nobody".to_string()];
        assert!(build_message(&settings("langpop@example.com"), "s", "m", &bad_to).is_err());
    }

    #[tokio::test]
    async fn test_send_failure_is_reported() {
        let mut unreachable = settings("langpop@example.com");
        unreachable.host = "invalid host name".to_string();
        let to = vec!["a@example.com".to_string()];
        assert!(!send_email(&unreachable, "s", "m", &to).await);
    }
}
