//! Tagged response events
//!
//! Every exchange with the backend ends in exactly one [`ResponseEvent`]. A
//! successful response becomes an [`AuthEvent`] only when the request was
//! declared as an authentication request (or when the legacy capture switch is
//! on); otherwise it is a [`DataEvent`], whatever fields the payload carries.

use crate::session::AuthCredentials;
use campus_core::{CampusError, CampusResult, ErrorContext, FieldErrors};
use serde::de::DeserializeOwned;
use serde_json::Value;

/// What the caller expects a request to produce
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RequestIntent {
    #[default]
    Data,
    Auth,
}

#[derive(Debug, Clone)]
pub struct DataEvent {
    pub status: u16,
    pub body: Value,
}

#[derive(Debug, Clone)]
pub struct AuthEvent {
    pub status: u16,
    pub credentials: AuthCredentials,
    pub body: Value,
}

#[derive(Debug)]
pub struct ErrorEvent {
    /// `None` when no response was received at all
    pub status: Option<u16>,
    pub body: Option<Value>,
    pub message: String,
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

#[derive(Debug)]
pub enum ResponseEvent {
    Auth(AuthEvent),
    Data(DataEvent),
    Error(ErrorEvent),
}

impl ResponseEvent {
    /// Classify a 2xx response
    pub fn classify_success(
        intent: RequestIntent,
        status: u16,
        body: Value,
        capture_auth_from_any_response: bool,
    ) -> CampusResult<Self> {
        let credentials = AuthCredentials::from_body(&body);

        match (intent, credentials) {
            (RequestIntent::Auth, Some(credentials)) => Ok(ResponseEvent::Auth(AuthEvent {
                status,
                credentials,
                body,
            })),
            (RequestIntent::Auth, None) => Err(CampusError::Protocol {
                message: "authentication response did not include a token".to_string(),
                context: ErrorContext::new("response_event")
                    .with_operation("classify_success")
                    .with_metadata("status", &status.to_string()),
            }),
            (RequestIntent::Data, Some(credentials)) if capture_auth_from_any_response => {
                Ok(ResponseEvent::Auth(AuthEvent {
                    status,
                    credentials,
                    body,
                }))
            }
            (RequestIntent::Data, _) => Ok(ResponseEvent::Data(DataEvent { status, body })),
        }
    }
}

impl ErrorEvent {
    /// Map the failure onto the error taxonomy
    pub fn into_error(self, path: &str) -> CampusError {
        match self.status {
            Some(401) => CampusError::Unauthorized {
                message: format!("{} rejected the stored credentials", path),
                context: ErrorContext::new("api_client")
                    .with_operation(path)
                    .with_suggestion("Log in again with 'campus login'"),
            },
            Some(404) => campus_core::not_found_error!(path, "api_client"),
            Some(status) => {
                match self.body.as_ref().and_then(FieldErrors::from_body) {
                    Some(errors) => CampusError::Validation {
                        status,
                        errors,
                        context: ErrorContext::new("api_client").with_operation(path),
                    },
                    None => CampusError::Network {
                        message: self.message,
                        status: Some(status),
                        body: self.body,
                        source: self.source,
                        context: ErrorContext::new("api_client").with_operation(path),
                    },
                }
            }
            None => CampusError::Network {
                message: self.message,
                status: None,
                body: None,
                source: self.source,
                context: ErrorContext::new("api_client")
                    .with_operation(path)
                    .with_suggestion("Check that the backend is running and reachable"),
            },
        }
    }
}

/// A successful exchange, after interception
#[derive(Debug, Clone)]
pub struct ApiResponse {
    pub status: u16,
    pub body: Value,
    /// Present when the response was handled as an authentication event
    pub credentials: Option<AuthCredentials>,
}

impl From<DataEvent> for ApiResponse {
    fn from(event: DataEvent) -> Self {
        Self {
            status: event.status,
            body: event.body,
            credentials: None,
        }
    }
}

impl From<AuthEvent> for ApiResponse {
    fn from(event: AuthEvent) -> Self {
        Self {
            status: event.status,
            body: event.body,
            credentials: Some(event.credentials),
        }
    }
}

impl ApiResponse {
    /// The `data` member of the envelope, or the whole body when the
    /// endpoint does not wrap its payload
    pub fn payload(&self) -> &Value {
        match self.body.get("data") {
            Some(data) if !data.is_null() => data,
            _ => &self.body,
        }
    }

    pub fn data<T: DeserializeOwned>(&self) -> CampusResult<T> {
        Ok(T::deserialize(self.payload())?)
    }

    /// Optional `message` member of action endpoints
    pub fn message(&self) -> Option<&str> {
        self.body.get("message").and_then(Value::as_str)
    }

    pub fn is_created(&self) -> bool {
        self.status == 201
    }
}
