//! Input validation for topic text.

use std::fmt;

/// Validation error types.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Value too long.
    TooLong { field: String, max: usize, actual: usize },
    /// Empty value where one is required.
    Empty(String),
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::TooLong { field, max, actual } => {
                write!(f, "{} is too long ({} chars, max {})", field, actual, max)
            }
            ValidationError::Empty(field) => write!(f, "{} cannot be empty", field),
        }
    }
}

impl std::error::Error for ValidationError {}

/// Maximum allowed length for a topic query.
pub const MAX_QUERY_LENGTH: usize = 500;

/// Validate and trim a topic query.
pub fn validate_query(query: &str) -> Result<String, ValidationError> {
    let trimmed = query.trim();

    if trimmed.is_empty() {
        return Err(ValidationError::Empty("query".to_string()));
    }

    let len = trimmed.chars().count();
    if len > MAX_QUERY_LENGTH {
        return Err(ValidationError::TooLong {
            field: "query".to_string(),
            max: MAX_QUERY_LENGTH,
            actual: len,
        });
    }

    Ok(trimmed.to_string())
}
