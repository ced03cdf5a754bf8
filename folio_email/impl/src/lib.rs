use std::time::Duration;

use anyhow::anyhow;
use folio_email_contracts::{Email, EmailBody, EmailService};
use folio_models::email_address::EmailAddressWithName;
use folio_utils::Apply;
use lettre::{
    message::{header::ContentType, Mailbox, MultiPart},
    transport::smtp::authentication::Credentials,
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};
use tracing::debug;

#[derive(Debug, Clone)]
pub struct EmailServiceImpl {
    from: EmailAddressWithName,
    transport: AsyncSmtpTransport<Tokio1Executor>,
}

#[derive(Debug, Clone)]
pub struct SmtpCredentials {
    pub username: String,
    pub password: String,
}

impl EmailServiceImpl {
    /// Creates the smtp transport. No connection is established until the
    /// first email is sent or [`EmailService::ping`] is called.
    pub fn new(
        url: &str,
        from: EmailAddressWithName,
        credentials: Option<SmtpCredentials>,
        timeout: Duration,
    ) -> anyhow::Result<Self> {
        let transport = AsyncSmtpTransport::<Tokio1Executor>::from_url(url)?
            .apply_map(credentials, |builder, credentials| {
                builder.credentials(Credentials::new(
                    credentials.username,
                    credentials.password,
                ))
            })
            .timeout(Some(timeout))
            .build();

        Ok(Self { from, transport })
    }

    fn build_message(&self, email: Email) -> anyhow::Result<Message> {
        let builder = Message::builder()
            .from(self.from.0.clone())
            .to(email.recipient.0)
            .apply_map(email.reply_to, |builder, reply_to| {
                builder.reply_to(Mailbox::new(None, reply_to.0))
            })
            .subject(email.subject);

        let message = match email.body {
            EmailBody::Text(body) => builder.header(ContentType::TEXT_PLAIN).body(body)?,
            EmailBody::Html(body) => builder.header(ContentType::TEXT_HTML).body(body)?,
            EmailBody::Alternative { text, html } => {
                builder.multipart(MultiPart::alternative_plain_html(text, html))?
            }
        };

        Ok(message)
    }
}

impl EmailService for EmailServiceImpl {
    async fn send(&self, email: Email) -> anyhow::Result<bool> {
        let message = self.build_message(email)?;

        debug!("sending email");
        self.transport
            .send(message)
            .await
            .map(|response| response.is_positive())
            .map_err(Into::into)
    }

    async fn ping(&self) -> anyhow::Result<()> {
        self.transport
            .test_connection()
            .await?
            .then_some(())
            .ok_or_else(|| anyhow!("Failed to ping smtp server"))
    }
}
