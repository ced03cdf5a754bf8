use folio_core_contact_contracts::{ContactFeatureService, ContactSendMessageError};
use folio_email_contracts::{Email, EmailBody, EmailService};
use folio_models::{
    contact::ContactSubmission,
    email_address::{EmailAddress, EmailAddressWithName},
};
use tracing::{debug, error, info};

mod render;

#[derive(Debug, Clone)]
pub struct ContactFeatureServiceImpl<Email> {
    email: Email,
    config: ContactFeatureConfig,
}

#[derive(Debug, Clone)]
pub struct ContactFeatureConfig {
    /// Inbox that receives the contact form messages.
    pub recipient: EmailAddressWithName,
}

impl<EmailS> ContactFeatureServiceImpl<EmailS> {
    pub fn new(email: EmailS, config: ContactFeatureConfig) -> Self {
        Self { email, config }
    }
}

impl<EmailS> ContactFeatureService for ContactFeatureServiceImpl<EmailS>
where
    EmailS: EmailService,
{
    async fn send_message(
        &self,
        submission: ContactSubmission,
    ) -> Result<(), ContactSendMessageError> {
        let message = submission.validate().inspect_err(|err| {
            debug!(%err, "rejected contact form submission");
        })?;

        let reply_to = message
            .email()
            .parse::<EmailAddress>()
            .inspect_err(|err| {
                error!(%err, email = message.email(), "Failed to parse reply-to address");
            })
            .map_err(|_| ContactSendMessageError::Send)?;

        let rendered = render::render(&message);
        let email = Email {
            recipient: self.config.recipient.clone(),
            subject: rendered.subject,
            body: EmailBody::Alternative {
                text: rendered.text,
                html: rendered.html,
            },
            reply_to: Some(reply_to),
        };

        match self.email.send(email).await {
            Ok(true) => {
                info!(from = message.email(), "contact message sent");
                Ok(())
            }
            Ok(false) => {
                error!("Failed to send contact message: smtp server rejected the email");
                Err(ContactSendMessageError::Send)
            }
            Err(err) => {
                error!("Failed to send contact message: {err:#}");
                Err(ContactSendMessageError::Send)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use anyhow::anyhow;
    use folio_email_contracts::MockEmailService;
    use folio_models::contact::ContactValidationError;
    use folio_utils::assert_matches;

    use super::*;

    fn config() -> ContactFeatureConfig {
        ContactFeatureConfig {
            recipient: "\"Portfolio Contact\" <me@example.com>".parse().unwrap(),
        }
    }

    fn submission() -> ContactSubmission {
        ContactSubmission {
            name: Some("Jane Doe".into()),
            email: Some("jane@example.com".into()),
            phone: Some("".into()),
            message: Some("Hello, I'd like to collaborate on a project.".into()),
        }
    }

    fn expected_email(config: &ContactFeatureConfig) -> Email {
        let message = submission().validate().unwrap();
        let rendered = render::render(&message);
        Email {
            recipient: config.recipient.clone(),
            subject: "[Portfolio] New message from Jane Doe".into(),
            body: EmailBody::Alternative {
                text: "Name:    Jane Doe\nEmail:   jane@example.com\nPhone:   Not provided\n\nMessage:\nHello, I'd like to collaborate on a project.".into(),
                html: rendered.html,
            },
            reply_to: Some("jane@example.com".parse().unwrap()),
        }
    }

    #[tokio::test]
    async fn ok() {
        // Arrange
        let config = config();
        let email = MockEmailService::new().with_send(expected_email(&config), true);
        let sut = ContactFeatureServiceImpl { email, config };

        // Act
        let result = sut.send_message(submission()).await;

        // Assert
        result.unwrap();
    }

    #[tokio::test]
    async fn invalid() {
        // Arrange
        let sut = ContactFeatureServiceImpl {
            email: MockEmailService::new(),
            config: config(),
        };

        // Act
        let result = sut
            .send_message(ContactSubmission {
                message: Some("Hi".into()),
                ..submission()
            })
            .await;

        // Assert
        assert_matches!(
            result,
            Err(ContactSendMessageError::Invalid(
                ContactValidationError::Message
            ))
        );
    }

    #[tokio::test]
    async fn rejected_by_smtp_server() {
        // Arrange
        let config = config();
        let email = MockEmailService::new().with_send(expected_email(&config), false);
        let sut = ContactFeatureServiceImpl { email, config };

        // Act
        let result = sut.send_message(submission()).await;

        // Assert
        assert_matches!(result, Err(ContactSendMessageError::Send));
    }

    #[tokio::test]
    async fn transport_error() {
        // Arrange
        let config = config();
        let email = MockEmailService::new().with_send_error(
            expected_email(&config),
            anyhow!("535 5.7.8 Username and Password not accepted"),
        );
        let sut = ContactFeatureServiceImpl { email, config };

        // Act
        let result = sut.send_message(submission()).await;

        // Assert
        let err = result.unwrap_err();
        assert_matches!(&err, ContactSendMessageError::Send);
        assert!(!err.to_string().contains("535"));
    }

    #[tokio::test]
    async fn unparseable_reply_to() {
        // Arrange
        let sut = ContactFeatureServiceImpl {
            email: MockEmailService::new(),
            config: config(),
        };

        // Act
        let result = sut
            .send_message(ContactSubmission {
                email: Some("jane(doe)@example.com".into()),
                ..submission()
            })
            .await;

        // Assert
        assert_matches!(result, Err(ContactSendMessageError::Send));
    }
}
