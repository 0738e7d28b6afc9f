//! Interceptor contract tests against a stub backend

mod common;

use axum::http::Method;
use campus_api::{
    endpoints, ApiClient, ApiRequest, MultipartPayload, RecordingNotifier, SessionKey,
    SessionStore, NOT_FOUND_MESSAGE, UNAUTHORIZED_MESSAGE,
};
use campus_core::{ApiConfig, CampusError, CampusResult, Role};
use common::{StubBackend, TestClient};
use serde_json::json;
use std::sync::Arc;

#[tokio::test]
async fn test_token_is_attached_when_present() {
    let backend = StubBackend::start().await;
    backend.on(Method::GET, endpoints::COURSES, 200, json!({"data": []}));

    let test = TestClient::new(backend.api_config());
    test.session.set(SessionKey::Token, "abc123").await.unwrap();

    test.client.get(endpoints::COURSES).await.unwrap();
    test.client.get("/courses/").await.unwrap();

    let requests = backend.requests_to(Method::GET, endpoints::COURSES);
    assert_eq!(requests.len(), 2);
    for request in requests {
        assert_eq!(request.authorization.as_deref(), Some("Token abc123"));
    }
}

#[tokio::test]
async fn test_no_header_without_token() {
    let backend = StubBackend::start().await;
    backend.on(Method::GET, endpoints::SUBJECTS, 200, json!({"data": []}));

    let test = TestClient::new(backend.api_config());
    test.client.get(endpoints::SUBJECTS).await.unwrap();

    assert!(backend.last_request().authorization.is_none());
}

#[tokio::test]
async fn test_login_populates_session() {
    let backend = StubBackend::start().await;
    backend.on(
        Method::POST,
        endpoints::LOGIN,
        200,
        json!({
            "data": {"detail": "welcome"},
            "token": "abc123",
            "role": "2",
            "username": "jdoe",
            "teacher_id": 7
        }),
    );

    let test = TestClient::new(backend.api_config());
    let response = test
        .client
        .authenticate(endpoints::LOGIN, &json!({"username": "jdoe", "password": "pw"}))
        .await
        .unwrap();
    assert!(response.credentials.is_some());

    let session = test.session.load().await.unwrap();
    assert_eq!(session.token.as_deref(), Some("abc123"));
    assert_eq!(session.role, Some(Role::Teacher));
    assert_eq!(session.username.as_deref(), Some("jdoe"));
    assert_eq!(session.teacher_id, Some(7));
    assert_eq!(session.student_id, None);

    // Subsequent requests carry the new token
    backend.on(Method::GET, endpoints::BATCHES, 200, json!({"data": []}));
    test.client.get(endpoints::BATCHES).await.unwrap();
    assert_eq!(
        backend.last_request().authorization.as_deref(),
        Some("Token abc123")
    );
}

#[tokio::test]
async fn test_data_response_with_token_does_not_touch_session() {
    let backend = StubBackend::start().await;
    backend.on(
        Method::GET,
        "teachers/3/",
        200,
        json!({"data": {"id": 3}, "token": "someone-elses", "role": "1"}),
    );

    let test = TestClient::new(backend.api_config());
    test.session.set(SessionKey::Token, "mine").await.unwrap();

    test.client.get(&endpoints::teacher(3)).await.unwrap();

    assert_eq!(test.session.token().await.unwrap().as_deref(), Some("mine"));
    assert_eq!(test.session.get(SessionKey::Role).await.unwrap(), None);
}

#[tokio::test]
async fn test_legacy_capture_overwrites_session_from_any_endpoint() {
    let backend = StubBackend::start().await;
    backend.on(
        Method::GET,
        endpoints::STUDENTS,
        200,
        json!({"data": [], "token": "xyz", "role": 3, "username": "kid", "student_id": "12"}),
    );

    let config = ApiConfig {
        capture_auth_from_any_response: true,
        ..backend.api_config()
    };
    let test = TestClient::new(config);
    test.client.get(endpoints::STUDENTS).await.unwrap();

    let session = test.session.load().await.unwrap();
    assert_eq!(session.token.as_deref(), Some("xyz"));
    assert_eq!(session.role, Some(Role::Student));
    assert_eq!(session.student_id, Some(12));
}

#[tokio::test]
async fn test_unauthorized_notifies_once_and_propagates() {
    let backend = StubBackend::start().await;
    backend.on(
        Method::GET,
        endpoints::COURSES,
        401,
        json!({"detail": "Invalid token."}),
    );

    let test = TestClient::new(backend.api_config());
    test.session.set(SessionKey::Token, "expired").await.unwrap();

    let result = test.client.get(endpoints::COURSES).await;

    assert!(matches!(result, Err(CampusError::Unauthorized { .. })));
    assert_eq!(test.notifier.count(UNAUTHORIZED_MESSAGE), 1);
    assert_eq!(test.notifier.notices().len(), 1);
    // The session is left as it was
    assert_eq!(
        test.session.token().await.unwrap().as_deref(),
        Some("expired")
    );
}

#[tokio::test]
async fn test_not_found_notifies_once() {
    let backend = StubBackend::start().await;
    backend.on(Method::GET, "batches/99/", 404, json!({"detail": "Not found."}));

    let test = TestClient::new(backend.api_config());
    let result = test.client.get(&endpoints::batch(99)).await;

    assert!(matches!(result, Err(CampusError::NotFound { .. })));
    assert_eq!(test.notifier.count(NOT_FOUND_MESSAGE), 1);
    assert_eq!(test.notifier.notices().len(), 1);
}

#[tokio::test]
async fn test_other_failures_are_silent_but_propagated() {
    let backend = StubBackend::start().await;
    backend.on(
        Method::POST,
        endpoints::COURSES,
        400,
        json!({"errors": {"title": ["course with this title already exists."]}}),
    );
    backend.on(Method::DELETE, "courses/1/", 500, json!("Server Error (500)"));

    let test = TestClient::new(backend.api_config());

    let validation = test
        .client
        .post_json(endpoints::COURSES, &json!({"title": "Dup"}))
        .await
        .unwrap_err();
    assert_eq!(validation.status(), Some(400));
    assert_eq!(
        validation
            .field_errors()
            .and_then(|errors| errors.first_message("title"))
            .as_deref(),
        Some("course with this title already exists.")
    );

    let server = test.client.delete(&endpoints::course(1)).await.unwrap_err();
    assert!(matches!(
        server,
        CampusError::Network {
            status: Some(500),
            ..
        }
    ));

    assert!(test.notifier.notices().is_empty());
}

#[tokio::test]
async fn test_no_response_is_network_error_without_notification() {
    // Bind and immediately drop a listener so the port refuses connections
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let test = TestClient::new(ApiConfig {
        base_url: format!("http://{}/api/", addr),
        ..ApiConfig::default()
    });

    let error = test.client.get(endpoints::COURSES).await.unwrap_err();
    assert!(matches!(error, CampusError::Network { status: None, .. }));
    assert!(test.notifier.notices().is_empty());
}

struct BrokenStore;

#[async_trait::async_trait]
impl SessionStore for BrokenStore {
    async fn get(&self, _key: SessionKey) -> CampusResult<Option<String>> {
        Err(CampusError::Session {
            message: "storage unavailable".to_string(),
            source: None,
            context: campus_core::ErrorContext::new("broken_store"),
        })
    }

    async fn set(&self, _key: SessionKey, _value: &str) -> CampusResult<()> {
        Ok(())
    }

    async fn remove(&self, _key: SessionKey) -> CampusResult<()> {
        Ok(())
    }
}

#[tokio::test]
async fn test_unreadable_session_rejects_before_sending() {
    let backend = StubBackend::start().await;
    backend.on(Method::GET, endpoints::COURSES, 200, json!({"data": []}));

    let notifier = Arc::new(RecordingNotifier::default());
    let client = ApiClient::new(backend.api_config(), Arc::new(BrokenStore), notifier.clone())
        .unwrap();

    let error = client.get(endpoints::COURSES).await.unwrap_err();
    assert!(matches!(error, CampusError::Session { .. }));
    assert!(backend.requests().is_empty());
    assert!(notifier.notices().is_empty());
}

#[tokio::test]
async fn test_query_and_multipart_bodies() {
    let backend = StubBackend::start().await;
    backend.on(Method::GET, endpoints::TEACHERS, 200, json!({"data": []}));
    backend.on(
        Method::POST,
        endpoints::TEACHER_REGISTER,
        201,
        json!({"data": {"id": 8}}),
    );

    let test = TestClient::new(backend.api_config());

    test.client
        .send(
            ApiRequest::get(endpoints::TEACHERS)
                .query("subject", "2")
                .query("gender", "")
                .query("search", "ada"),
        )
        .await
        .unwrap();
    assert_eq!(
        backend.last_request().query.as_deref(),
        Some("subject=2&search=ada")
    );

    let payload = MultipartPayload::new()
        .nested("fk_user", "username", "ada")
        .text("full_name", "Ada Lovelace")
        .repeated("subjects", [1, 2]);
    let response = test
        .client
        .send(ApiRequest::post(endpoints::TEACHER_REGISTER).multipart(payload))
        .await
        .unwrap();
    assert!(response.is_created());

    let request = backend.last_request();
    assert!(request
        .content_type.clone()
        .unwrap_or_default()
        .starts_with("multipart/form-data"));
    assert!(request.has_form_field("fk_user.username", "ada"));
    assert!(request.has_form_field("full_name", "Ada Lovelace"));
    assert_eq!(request.form_field_count("subjects"), 2);
}
