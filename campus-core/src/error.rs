//! Unified error handling system
//!
//! Provides structured error types with context, recovery suggestions, and proper error chaining

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::{error, warn};

pub type CampusResult<T> = Result<T, CampusError>;

/// Error context providing additional information for debugging and recovery
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorContext {
    /// Unique error ID for tracking
    pub error_id: String,
    /// Timestamp when error occurred
    pub timestamp: DateTime<Utc>,
    /// Component where error originated
    pub component: String,
    /// Operation being performed when error occurred
    pub operation: Option<String>,
    /// Additional metadata
    pub metadata: std::collections::HashMap<String, String>,
    /// Recovery suggestions
    pub recovery_suggestions: Vec<String>,
}

impl ErrorContext {
    pub fn new(component: &str) -> Self {
        Self {
            error_id: uuid::Uuid::new_v4().to_string(),
            timestamp: Utc::now(),
            component: component.to_string(),
            operation: None,
            metadata: std::collections::HashMap::new(),
            recovery_suggestions: Vec::new(),
        }
    }

    pub fn with_operation(mut self, operation: &str) -> Self {
        self.operation = Some(operation.to_string());
        self
    }

    pub fn with_metadata(mut self, key: &str, value: &str) -> Self {
        self.metadata.insert(key.to_string(), value.to_string());
        self
    }

    pub fn with_suggestion(mut self, suggestion: &str) -> Self {
        self.recovery_suggestions.push(suggestion.to_string());
        self
    }
}

/// Per-field validation messages reported by the backend.
///
/// The payload mirrors `{ "errors": { "<field>": ["<message>", ...] } }`.
/// Nested serializers report nested objects, e.g.
/// `{ "fk_user": { "username": ["taken"] } }`, which are addressed with a
/// dotted path (`fk_user.username`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldErrors(pub serde_json::Map<String, Value>);

impl FieldErrors {
    /// Extract the `errors` object from a failure body, if any.
    pub fn from_body(body: &Value) -> Option<Self> {
        match body.get("errors") {
            Some(Value::Object(map)) => Some(Self(map.clone())),
            _ => None,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// First message recorded for `path`, where `path` may be dotted.
    pub fn first_message(&self, path: &str) -> Option<String> {
        let mut segments = path.split('.');
        let mut current = self.0.get(segments.next()?)?;
        for segment in segments {
            current = current.get(segment)?;
        }

        match current {
            Value::String(message) => Some(message.clone()),
            Value::Array(items) => items.iter().find_map(|item| match item {
                Value::String(message) => Some(message.clone()),
                _ => None,
            }),
            _ => None,
        }
    }

    /// First message for the first of `paths` that has one.
    pub fn first_of(&self, paths: &[&str]) -> Option<String> {
        paths.iter().find_map(|path| self.first_message(path))
    }
}

/// Main error type for the campus console
#[derive(Error, Debug)]
pub enum CampusError {
    #[error("Unauthorized: {message}")]
    Unauthorized {
        message: String,
        context: ErrorContext,
    },

    #[error("Resource not found: {resource}")]
    NotFound {
        resource: String,
        context: ErrorContext,
    },

    #[error("Validation failed with HTTP {status}")]
    Validation {
        status: u16,
        errors: FieldErrors,
        context: ErrorContext,
    },

    /// Any other failure: server errors, unexpected statuses and requests
    /// that never received a response.
    #[error("Network or server error: {message}")]
    Network {
        message: String,
        status: Option<u16>,
        body: Option<Value>,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
        context: ErrorContext,
    },

    #[error("Session store error: {message}")]
    Session {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
        context: ErrorContext,
    },

    #[error("Unexpected response: {message}")]
    Protocol {
        message: String,
        context: ErrorContext,
    },

    #[error("Configuration error: {message}")]
    Config {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
        context: ErrorContext,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Internal error: {message}")]
    Internal {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
        context: ErrorContext,
    },
}

impl CampusError {
    /// Get the error context
    pub fn context(&self) -> Option<&ErrorContext> {
        match self {
            CampusError::Unauthorized { context, .. } => Some(context),
            CampusError::NotFound { context, .. } => Some(context),
            CampusError::Validation { context, .. } => Some(context),
            CampusError::Network { context, .. } => Some(context),
            CampusError::Session { context, .. } => Some(context),
            CampusError::Protocol { context, .. } => Some(context),
            CampusError::Config { context, .. } => Some(context),
            CampusError::Internal { context, .. } => Some(context),
            _ => None,
        }
    }

    /// HTTP status of the failed response, when one was received.
    pub fn status(&self) -> Option<u16> {
        match self {
            CampusError::Unauthorized { .. } => Some(401),
            CampusError::NotFound { .. } => Some(404),
            CampusError::Validation { status, .. } => Some(*status),
            CampusError::Network { status, .. } => *status,
            _ => None,
        }
    }

    /// Structured per-field messages, when the backend supplied them.
    pub fn field_errors(&self) -> Option<&FieldErrors> {
        match self {
            CampusError::Validation { errors, .. } => Some(errors),
            _ => None,
        }
    }

    /// Whether the user can reasonably retry the same action.
    pub fn is_recoverable(&self) -> bool {
        match self {
            CampusError::Network { .. } => true,
            CampusError::Validation { .. } => true,
            CampusError::Unauthorized { .. } => false,
            CampusError::Config { .. } => false,
            CampusError::NotFound { .. } => false,
            _ => false,
        }
    }

    /// Log the error with appropriate level
    pub fn log(&self) {
        match self {
            CampusError::Internal { .. } => {
                error!(
                    error_id = ?self.context().map(|c| &c.error_id),
                    error = %self,
                    "Internal error occurred"
                );
            }
            CampusError::Config { .. } | CampusError::Session { .. } => {
                error!(
                    error_id = ?self.context().map(|c| &c.error_id),
                    error = %self,
                    "Configuration or session error"
                );
            }
            CampusError::Network { .. } | CampusError::Validation { .. } => {
                warn!(
                    error_id = ?self.context().map(|c| &c.error_id),
                    status = ?self.status(),
                    error = %self,
                    "Request failed (may be recoverable)"
                );
            }
            _ => {
                error!(
                    error_id = ?self.context().map(|c| &c.error_id),
                    error = %self,
                    "Error occurred"
                );
            }
        }
    }
}

/// Convenience macros for creating errors with context
#[macro_export]
macro_rules! config_error {
    ($msg:expr, $component:expr) => {
        $crate::CampusError::Config {
            message: $msg.to_string(),
            source: None,
            context: $crate::ErrorContext::new($component)
                .with_suggestion("Check your configuration file")
                .with_suggestion("Run 'campus config --init' to create default config"),
        }
    };
}

#[macro_export]
macro_rules! not_found_error {
    ($resource:expr, $component:expr) => {
        $crate::CampusError::NotFound {
            resource: $resource.to_string(),
            context: $crate::ErrorContext::new($component)
                .with_suggestion("Verify the identifier")
                .with_suggestion("Check if the record still exists on the server"),
        }
    };
}
