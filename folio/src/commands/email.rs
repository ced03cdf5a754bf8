use anyhow::ensure;
use clap::Subcommand;
use folio_config::Config;
use folio_email_contracts::{Email, EmailBody, EmailService};
use folio_models::email_address::EmailAddressWithName;

use crate::email;

#[derive(Debug, Subcommand)]
pub enum EmailCommand {
    /// Send a test email through the configured smtp server
    Test { recipient: EmailAddressWithName },
}

impl EmailCommand {
    pub async fn invoke(self, config: Config) -> anyhow::Result<()> {
        match self {
            EmailCommand::Test { recipient } => test(config, recipient).await,
        }
    }
}

async fn test(config: Config, recipient: EmailAddressWithName) -> anyhow::Result<()> {
    let email_service = email::connect(&config.email)?;

    let ok = email_service
        .send(Email {
            recipient,
            subject: "Email Deliverability Test".into(),
            body: EmailBody::Text("Email deliverability seems to be working!".into()),
            reply_to: None,
        })
        .await?;

    ensure!(ok, "Failed to send email");

    Ok(())
}
