//! The single HTTP access point used by every view
//!
//! Outgoing requests get `Authorization: Token <token>` when the session holds
//! a token. Incoming responses are classified into a [`ResponseEvent`]:
//! authentication events are written to the session, 401 and 404 failures
//! raise a notification, every other failure is only logged. Failures are
//! always returned to the caller after interception.

use crate::event::{ApiResponse, ErrorEvent, RequestIntent, ResponseEvent};
use crate::multipart::MultipartPayload;
use crate::notify::{Notice, Notifier, NOT_FOUND_MESSAGE, UNAUTHORIZED_MESSAGE};
use crate::session::SessionStore;
use campus_core::{ApiConfig, CampusError, CampusResult, ErrorContext};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, USER_AGENT};
use reqwest::Method;
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, error, warn};

const CLIENT_USER_AGENT: &str = concat!("campus/", env!("CARGO_PKG_VERSION"));

#[derive(Debug)]
pub enum RequestBody {
    Empty,
    Json(Value),
    Multipart(MultipartPayload),
}

/// One request, described independently of the transport
#[derive(Debug)]
pub struct ApiRequest {
    pub method: Method,
    pub path: String,
    pub query: Vec<(String, String)>,
    pub body: RequestBody,
    pub intent: RequestIntent,
}

impl ApiRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            body: RequestBody::Empty,
            intent: RequestIntent::Data,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    pub fn put(path: impl Into<String>) -> Self {
        Self::new(Method::PUT, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    pub fn json<T: Serialize + ?Sized>(mut self, body: &T) -> CampusResult<Self> {
        self.body = RequestBody::Json(serde_json::to_value(body)?);
        Ok(self)
    }

    pub fn multipart(mut self, payload: MultipartPayload) -> Self {
        self.body = RequestBody::Multipart(payload);
        self
    }

    /// Empty values are skipped
    pub fn query(mut self, key: &str, value: impl Into<String>) -> Self {
        let value = value.into();
        if !value.is_empty() {
            self.query.push((key.to_string(), value));
        }
        self
    }

    /// Declare that a successful response is an authentication event
    pub fn authenticating(mut self) -> Self {
        self.intent = RequestIntent::Auth;
        self
    }
}

/// Authenticated API client
#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    config: ApiConfig,
    session: Arc<dyn SessionStore>,
    notifier: Arc<dyn Notifier>,
}

impl ApiClient {
    pub fn new(
        config: ApiConfig,
        session: Arc<dyn SessionStore>,
        notifier: Arc<dyn Notifier>,
    ) -> CampusResult<Self> {
        let http = create_http_client(&config)?;
        debug!(base_url = %config.base_url, "Created API client");

        Ok(Self {
            http,
            config,
            session,
            notifier,
        })
    }

    pub fn config(&self) -> &ApiConfig {
        &self.config
    }

    pub fn session(&self) -> &Arc<dyn SessionStore> {
        &self.session
    }

    pub fn notifier(&self) -> &Arc<dyn Notifier> {
        &self.notifier
    }

    /// Resolve `path` against the base address the way browsers' axios does:
    /// exactly one slash between them, whatever either side carries.
    pub fn url_for(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.config.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    pub async fn send(&self, request: ApiRequest) -> CampusResult<ApiResponse> {
        let path = request.path.clone();
        let intent = request.intent;

        let builder = self.build(request)?;
        let builder = self.authorize(builder).await?;

        debug!(path = %path, ?intent, "Sending API request");
        let event = self.dispatch(builder, intent).await?;
        self.intercept(&path, event).await
    }

    pub async fn get(&self, path: &str) -> CampusResult<ApiResponse> {
        self.send(ApiRequest::get(path)).await
    }

    pub async fn post_json<T: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &T,
    ) -> CampusResult<ApiResponse> {
        self.send(ApiRequest::post(path).json(body)?).await
    }

    pub async fn put_json<T: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &T,
    ) -> CampusResult<ApiResponse> {
        self.send(ApiRequest::put(path).json(body)?).await
    }

    pub async fn delete(&self, path: &str) -> CampusResult<ApiResponse> {
        self.send(ApiRequest::delete(path)).await
    }

    /// Send credentials and record the resulting session
    pub async fn authenticate<T: Serialize + ?Sized>(
        &self,
        path: &str,
        credentials: &T,
    ) -> CampusResult<ApiResponse> {
        self.send(ApiRequest::post(path).json(credentials)?.authenticating())
            .await
    }

    fn build(&self, request: ApiRequest) -> CampusResult<reqwest::RequestBuilder> {
        let mut builder = self
            .http
            .request(request.method, self.url_for(&request.path));

        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }

        Ok(match request.body {
            RequestBody::Empty => builder,
            RequestBody::Json(value) => builder.json(&value),
            RequestBody::Multipart(payload) => builder.multipart(payload.into_form()?),
        })
    }

    /// Request interception: attach the stored token, if any. A store that
    /// cannot be read rejects the request before it is sent.
    async fn authorize(
        &self,
        builder: reqwest::RequestBuilder,
    ) -> CampusResult<reqwest::RequestBuilder> {
        match self.session.token().await? {
            Some(token) => {
                let value = HeaderValue::from_str(&format!("Token {}", token)).map_err(|e| {
                    CampusError::Session {
                        message: format!("Stored token is not a valid header value: {}", e),
                        source: Some(Box::new(e)),
                        context: ErrorContext::new("api_client")
                            .with_operation("authorize")
                            .with_suggestion("Run 'campus session clear' and log in again"),
                    }
                })?;
                Ok(builder.header(AUTHORIZATION, value))
            }
            None => Ok(builder),
        }
    }

    async fn dispatch(
        &self,
        builder: reqwest::RequestBuilder,
        intent: RequestIntent,
    ) -> CampusResult<ResponseEvent> {
        let response = match builder.send().await {
            Ok(response) => response,
            Err(e) => {
                return Ok(ResponseEvent::Error(ErrorEvent {
                    status: None,
                    body: None,
                    message: format!("No response from backend: {}", e),
                    source: Some(Box::new(e)),
                }))
            }
        };

        let status = response.status();
        let text = match response.text().await {
            Ok(text) => text,
            Err(e) => {
                return Ok(ResponseEvent::Error(ErrorEvent {
                    status: Some(status.as_u16()),
                    body: None,
                    message: format!("Failed to read response body: {}", e),
                    source: Some(Box::new(e)),
                }))
            }
        };
        let body = parse_body(&text);

        if status.is_success() {
            ResponseEvent::classify_success(
                intent,
                status.as_u16(),
                body,
                self.config.capture_auth_from_any_response,
            )
        } else {
            Ok(ResponseEvent::Error(ErrorEvent {
                status: Some(status.as_u16()),
                message: format!(
                    "HTTP {} {}",
                    status.as_u16(),
                    status.canonical_reason().unwrap_or("Unknown error")
                ),
                body: Some(body),
                source: None,
            }))
        }
    }

    /// Response interception
    async fn intercept(&self, path: &str, event: ResponseEvent) -> CampusResult<ApiResponse> {
        match event {
            ResponseEvent::Auth(event) => {
                self.session.save_auth(&event.credentials).await?;
                Ok(event.into())
            }
            ResponseEvent::Data(event) => Ok(event.into()),
            ResponseEvent::Error(event) => {
                match event.status {
                    Some(401) => {
                        warn!(path = %path, "Request rejected as unauthorized");
                        self.notifier.notify(Notice::error(UNAUTHORIZED_MESSAGE));
                    }
                    Some(404) => {
                        warn!(path = %path, "Resource not found");
                        self.notifier.notify(Notice::error(NOT_FOUND_MESSAGE));
                    }
                    status => {
                        error!(
                            path = %path,
                            status = ?status,
                            error = %event.message,
                            body = ?event.body,
                            "API error"
                        );
                    }
                }
                Err(event.into_error(path))
            }
        }
    }
}

fn parse_body(text: &str) -> Value {
    if text.trim().is_empty() {
        return Value::Null;
    }
    serde_json::from_str(text).unwrap_or_else(|_| Value::String(text.to_string()))
}

/// Helper function to create HTTP client with common configuration
fn create_http_client(config: &ApiConfig) -> CampusResult<reqwest::Client> {
    let mut headers = HeaderMap::new();
    headers.insert(USER_AGENT, HeaderValue::from_static(CLIENT_USER_AGENT));

    let mut builder = reqwest::Client::builder().default_headers(headers);
    if let Some(timeout) = config.timeout_seconds {
        builder = builder.timeout(std::time::Duration::from_secs(timeout));
    }

    builder.build().map_err(|e| CampusError::Internal {
        message: format!("Failed to create HTTP client: {}", e),
        source: Some(Box::new(e)),
        context: ErrorContext::new("http_client").with_operation("create_client"),
    })
}
