use anyhow::Context;
use folio_config::EmailConfig;
use folio_email_impl::{EmailServiceImpl, SmtpCredentials};

/// Set up the smtp transport. Credentials are only used if both username
/// and password are configured.
pub fn connect(config: &EmailConfig) -> anyhow::Result<EmailServiceImpl> {
    let credentials = config
        .username
        .clone()
        .zip(config.password.clone())
        .map(|(username, password)| SmtpCredentials { username, password });

    EmailServiceImpl::new(
        &config.smtp_url,
        config.sender()?,
        credentials,
        *config.timeout,
    )
    .context("Failed to create smtp transport")
}
