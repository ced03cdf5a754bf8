use std::sync::LazyLock;

use regex::Regex;
use thiserror::Error;

pub const CONTACT_NAME_MIN_LEN: usize = 2;
pub const CONTACT_NAME_MAX_LEN: usize = 100;
pub const CONTACT_EMAIL_MAX_LEN: usize = 200;
pub const CONTACT_MESSAGE_MIN_LEN: usize = 10;
pub const CONTACT_MESSAGE_MAX_LEN: usize = 2000;

pub static CONTACT_EMAIL_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").unwrap());

/// An untrusted contact form submission.
///
/// A field is `None` if it was missing or did not have the expected type.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContactSubmission {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub message: Option<String>,
}

/// A contact form submission that passed [`ContactSubmission::validate`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactMessage {
    name: String,
    email: String,
    phone: Option<String>,
    message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ContactValidationError {
    #[error("Name must be at least 2 characters.")]
    Name,
    #[error("A valid email address is required.")]
    Email,
    #[error("Message must be at least 10 characters.")]
    Message,
    #[error("Input exceeds maximum length.")]
    TooLong,
}

impl ContactSubmission {
    /// Checks the submission and returns the first violated rule.
    ///
    /// The rules are evaluated in a fixed order: name, email, message and
    /// finally the maximum lengths of all three fields. The phone number is
    /// accepted as-is.
    pub fn validate(self) -> Result<ContactMessage, ContactValidationError> {
        let Some(name) = self
            .name
            .filter(|name| text_len(trim(name)) >= CONTACT_NAME_MIN_LEN)
        else {
            return Err(ContactValidationError::Name);
        };

        let Some(email) = self
            .email
            .filter(|email| CONTACT_EMAIL_REGEX.is_match(email))
        else {
            return Err(ContactValidationError::Email);
        };

        let Some(message) = self
            .message
            .filter(|message| text_len(trim(message)) >= CONTACT_MESSAGE_MIN_LEN)
        else {
            return Err(ContactValidationError::Message);
        };

        if text_len(&name) > CONTACT_NAME_MAX_LEN
            || text_len(&email) > CONTACT_EMAIL_MAX_LEN
            || text_len(&message) > CONTACT_MESSAGE_MAX_LEN
        {
            return Err(ContactValidationError::TooLong);
        }

        Ok(ContactMessage {
            name,
            email,
            phone: self.phone,
            message,
        })
    }
}

impl ContactMessage {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The submitter's email address, exactly as submitted.
    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn phone(&self) -> Option<&str> {
        self.phone.as_deref()
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Length in UTF-16 code units, the unit browsers use for `maxlength` and
/// string lengths. Characters outside the basic multilingual plane count
/// twice.
fn text_len(value: &str) -> usize {
    value.encode_utf16().count()
}

/// Strips whitespace and byte order marks from both ends.
fn trim(value: &str) -> &str {
    value.trim_matches(|c: char| c.is_whitespace() || c == '\u{FEFF}')
}

/// Escapes `<` and `>` so the value can be embedded into an html document.
///
/// No other characters are touched.
pub fn sanitize(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            c => out.push(c),
        }
    }
    out
}
