use std::{borrow::Cow, path::PathBuf};

use thiserror::Error;

use crate::policy::Action;

/// Top-level error type returned by every Webify operation.
#[derive(Debug, Error)]
pub enum WebifyError {
    /// Referenced entity or actor does not exist.
    #[error("{collection} '{id}' not found")]
    NotFound { collection: &'static str, id: String },

    /// The role policy (or an ownership rule) rejected the actor.
    #[error("permission denied: {action:?}")]
    PermissionDenied { action: Action },

    /// Missing or out-of-range input.
    #[error("invalid argument")]
    InvalidArgument(#[from] ValidationError),

    /// Operation is not valid for the current lifecycle state of the target.
    #[error("invalid state: {message}")]
    InvalidState { message: Cow<'static, str> },

    /// Underlying document store failed.
    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

impl WebifyError {
    pub fn not_found(collection: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            collection,
            id: id.into(),
        }
    }

    pub fn denied(action: Action) -> Self {
        Self::PermissionDenied { action }
    }

    pub fn invalid_state(message: impl Into<Cow<'static, str>>) -> Self {
        Self::InvalidState {
            message: message.into(),
        }
    }

    /// Shorthand for a single-field `InvalidArgument`.
    pub fn invalid_argument(
        field: impl Into<String>,
        code: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::InvalidArgument(ValidationError::single(field, code, message))
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    pub fn is_permission_denied(&self) -> bool {
        matches!(self, Self::PermissionDenied { .. })
    }

    pub fn is_invalid_argument(&self) -> bool {
        matches!(self, Self::InvalidArgument(_))
    }

    pub fn is_invalid_state(&self) -> bool {
        matches!(self, Self::InvalidState { .. })
    }
}

/// Errors raised by a [`DocumentStore`](crate::store::DocumentStore) backend.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Underlying Redis command failed.
    #[error("redis error: {0}")]
    Redis(#[from] redis::RedisError),

    /// A document could not be encoded or decoded.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A field-level primitive targeted a document that does not exist.
    #[error("document {collection}/{id} does not exist")]
    MissingDocument { collection: String, id: String },

    #[error("{message}")]
    Other { message: Cow<'static, str> },
}

/// Errors raised while loading a [`WebifyConfig`](crate::config::WebifyConfig).
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {origin}: {source}")]
    Parse {
        origin: String,
        #[source]
        source: toml::de::Error,
    },

    #[error("environment variable {name} is not set")]
    MissingEnv { name: String },

    #[error("unterminated '${{' placeholder in '{value}'")]
    Unterminated { value: String },
}

/// Collection of validation issues encountered while preparing a mutation.
#[derive(Debug, Error)]
#[error("validation errors: {issues:?}")]
pub struct ValidationError {
    pub issues: Vec<ValidationIssue>,
}

impl ValidationError {
    pub fn new<I>(issues: I) -> Self
    where
        I: IntoIterator<Item = ValidationIssue>,
    {
        Self {
            issues: issues.into_iter().collect(),
        }
    }

    /// Convenience helper for constructing a single-field validation error.
    pub fn single(field: impl Into<String>, code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new([ValidationIssue::new(field, code, message)])
    }

    /// Returns `true` if any issue was reported against `field`.
    pub fn has_field(&self, field: &str) -> bool {
        self.issues.iter().any(|issue| issue.field == field)
    }
}

/// Detailed validation failure for a single field or logical path.
#[derive(Debug, Clone)]
pub struct ValidationIssue {
    pub field: String,
    pub code: String,
    pub message: String,
}

impl ValidationIssue {
    pub fn new(field: impl Into<String>, code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            code: code.into(),
            message: message.into(),
        }
    }
}

pub type ValidationResult<T> = Result<T, ValidationError>;

pub type WebifyResult<T> = Result<T, WebifyError>;
