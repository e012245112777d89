//! Validated origin/destination search input.

use serde::Deserialize;
use validator::Validate;

/// Error returned when a search query fails validation.
#[derive(Debug, thiserror::Error)]
#[error("invalid search query: {0}")]
pub struct SearchQueryError(#[from] pub validator::ValidationErrors);

/// An origin/destination pair typed into a finder form.
///
/// Both fields are trimmed and must be 2 to 100 characters long.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Validate)]
pub struct SearchQuery {
    #[validate(length(min = 2, max = 100, message = "Origin is required"))]
    origin: String,

    #[validate(length(min = 2, max = 100, message = "Destination is required"))]
    destination: String,
}

impl SearchQuery {
    /// Build a query from raw form input.
    pub fn new(origin: &str, destination: &str) -> Result<Self, SearchQueryError> {
        let query = Self {
            origin: origin.trim().to_string(),
            destination: destination.trim().to_string(),
        };
        query.validate()?;
        Ok(query)
    }

    pub fn origin(&self) -> &str {
        &self.origin
    }

    pub fn destination(&self) -> &str {
        &self.destination
    }

    /// Lowercased origin for case-insensitive matching.
    pub(crate) fn origin_key(&self) -> String {
        self.origin.to_lowercase()
    }

    /// Lowercased destination for case-insensitive matching.
    pub(crate) fn destination_key(&self) -> String {
        self.destination.to_lowercase()
    }
}
