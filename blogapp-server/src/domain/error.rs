use std::collections::BTreeMap;
use std::fmt;

use thiserror::Error;

/// Field name -> human-readable reasons the value was rejected.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldErrors(BTreeMap<String, Vec<String>>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, field: &str, reason: impl Into<String>) {
        self.0
            .entry(field.to_string())
            .or_default()
            .push(reason.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    pub fn get(&self, field: &str) -> Option<&[String]> {
        self.0.get(field).map(Vec::as_slice)
    }

    pub fn as_map(&self) -> &BTreeMap<String, Vec<String>> {
        &self.0
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let fields: Vec<&str> = self.0.keys().map(String::as_str).collect();
        write!(f, "invalid fields: {}", fields.join(", "))
    }
}

#[derive(Debug, Error)]
pub enum DomainError {
    #[error("User already exists")]
    UserAlreadyExists,

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Not found.")]
    PostNotFound,

    #[error("You do not have permission to perform this action.")]
    Forbidden,

    #[error("Authentication credentials were not provided.")]
    NotAuthenticated,

    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Validation failed: {0}")]
    ValidationFailed(FieldErrors),

    #[error("{0}")]
    MalformedRequest(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Internal server error: {0}")]
    InternalError(String),
}

impl DomainError {
    pub fn to_status_code(&self) -> u16 {
        match self {
            Self::PostNotFound => 404,
            Self::UserAlreadyExists => 409,
            Self::InvalidCredentials | Self::Unauthorized(_) => 401,
            Self::Forbidden | Self::NotAuthenticated => 403,
            Self::ValidationFailed(_) | Self::MalformedRequest(_) => 400,
            Self::DatabaseError(_) | Self::InternalError(_) => 500,
        }
    }
}

impl From<sqlx::Error> for DomainError {
    fn from(err: sqlx::Error) -> Self {
        Self::DatabaseError(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn field_errors_group_reasons_by_field() {
        let mut errors = FieldErrors::new();
        errors.add("title", "first");
        errors.add("title", "second");
        errors.add("content", "third");

        assert_eq!(errors.get("title").map(<[String]>::len), Some(2));
        assert!(errors.contains("content"));
        assert!(!errors.contains("author"));
        assert_eq!(errors.to_string(), "invalid fields: content, title");
    }

    #[test]
    fn status_codes_keep_denial_apart_from_missing_and_invalid() {
        assert_eq!(DomainError::PostNotFound.to_status_code(), 404);
        assert_eq!(DomainError::Forbidden.to_status_code(), 403);
        assert_eq!(DomainError::NotAuthenticated.to_status_code(), 403);
        assert_eq!(
            DomainError::ValidationFailed(FieldErrors::new()).to_status_code(),
            400
        );
        assert_eq!(
            DomainError::DatabaseError("boom".to_string()).to_status_code(),
            500
        );
    }
}
