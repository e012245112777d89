//! Contact form submissions.

use serde::{Deserialize, Serialize};
use tracing::{error, info};
use validator::{Validate, ValidationError, ValidationErrors};

/// Error returned when a contact message cannot be handled.
#[derive(Debug, thiserror::Error)]
pub enum ContactError {
    /// Submission failed validation
    #[error("invalid contact submission: {0}")]
    Invalid(#[from] ValidationErrors),

    /// No delivery key configured
    #[error("contact delivery is not configured")]
    NotConfigured,
}

/// A contact form submission.
///
/// Use [`ContactRequest::normalize`] to obtain a validated message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct ContactRequest {
    #[validate(
        length(min = 2, max = 100, message = "Name must be 2 to 100 characters"),
        custom(function = letters_and_spaces)
    )]
    pub name: String,

    #[validate(
        email(message = "Invalid email address"),
        length(max = 100, message = "Email must be less than 100 characters")
    )]
    pub email: String,

    #[validate(length(min = 10, max = 1000, message = "Message must be 10 to 1000 characters"))]
    pub message: String,
}

impl ContactRequest {
    /// Trim every field, lowercase the email, then validate.
    pub fn normalize(self) -> Result<Self, ContactError> {
        let normalized = Self {
            name: self.name.trim().to_string(),
            email: self.email.trim().to_lowercase(),
            message: self.message.trim().to_string(),
        };
        normalized.validate()?;
        Ok(normalized)
    }
}

fn letters_and_spaces(value: &str) -> Result<(), ValidationError> {
    if value
        .chars()
        .all(|c| c.is_ascii_alphabetic() || c.is_whitespace())
    {
        Ok(())
    } else {
        Err(ValidationError::new("letters_and_spaces")
            .with_message("Name can only contain letters and spaces".into()))
    }
}

/// Delivers contact messages.
///
/// Delivery is simulated: the message is logged together with a masked
/// form of the provider key.
#[derive(Clone)]
pub struct ContactMailer {
    api_key: Option<String>,
}

impl ContactMailer {
    pub fn new(api_key: Option<String>) -> Self {
        Self {
            api_key: api_key.filter(|k| !k.is_empty()),
        }
    }

    pub fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    /// Deliver an already normalized message.
    pub fn send(&self, request: &ContactRequest) -> Result<(), ContactError> {
        let Some(key) = &self.api_key else {
            error!("API_SECRET_KEY is not set, cannot deliver contact message");
            return Err(ContactError::NotConfigured);
        };

        info!(
            key = %mask_key(key),
            from = %request.name,
            email = %request.email,
            length = request.message.chars().count(),
            "delivering contact message"
        );
        Ok(())
    }
}

impl std::fmt::Debug for ContactMailer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContactMailer")
            .field("api_key", &self.api_key.as_deref().map(mask_key))
            .finish()
    }
}

/// First four characters of a secret followed by `***`.
fn mask_key(key: &str) -> String {
    let prefix: String = key.chars().take(4).collect();
    format!("{prefix}***")
}
