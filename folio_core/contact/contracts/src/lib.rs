use std::future::Future;

use folio_models::contact::{ContactSubmission, ContactValidationError};
use thiserror::Error;

#[cfg_attr(feature = "mock", mockall::automock)]
pub trait ContactFeatureService: Send + Sync + 'static {
    /// Validate a contact form submission and relay it to the site owner's
    /// inbox.
    fn send_message(
        &self,
        submission: ContactSubmission,
    ) -> impl Future<Output = Result<(), ContactSendMessageError>> + Send;
}

#[derive(Debug, Error)]
pub enum ContactSendMessageError {
    #[error(transparent)]
    Invalid(#[from] ContactValidationError),
    #[error("Failed to send message.")]
    Send,
}

#[cfg(feature = "mock")]
impl MockContactFeatureService {
    pub fn with_send_message(
        mut self,
        submission: ContactSubmission,
        result: Result<(), ContactSendMessageError>,
    ) -> Self {
        self.expect_send_message()
            .once()
            .with(mockall::predicate::eq(submission))
            .return_once(move |_| Box::pin(std::future::ready(result)));
        self
    }
}
