//! HTTP backend tests against an in-process fake server.
//!
//! These cover the wire contract: both response envelope shapes, error
//! message extraction, the bearer header, multipart uploads and the
//! timeout/unreachable mapping.

mod common;

use std::time::Duration;

use axum::http::Method;
use secrecy::SecretString;
use serde_json::json;

use backoffice::api::error::{TIMEOUT_MESSAGE, UNREACHABLE_MESSAGE};
use backoffice::api::{ApplicationsApi, AuthApi, DashboardApi, JobsApi};
use backoffice::models::{LoginRequest, QueryParams};
use backoffice::{ApiError, BearerToken, Credentials};

use common::{filled_application, FakeApi, JobBuilder, ADMIN_PASSWORD, ADMIN_TOKEN};

#[tokio::test]
async fn test_list_decodes_bare_page_and_sends_params() {
    let api = FakeApi::start().await;
    for id in ["j-1", "j-2", "j-3"] {
        api.add_job(JobBuilder::new(id).build());
    }
    let backend = api.backend(Credentials::new());

    let page = backend
        .list_jobs(&QueryParams::paged(2, 2).with("department", "Engineering"))
        .await
        .unwrap();

    assert_eq!(page.data.len(), 1);
    assert_eq!(page.data[0].id, "j-3");
    assert_eq!(page.total_count, 3);
    assert_eq!(page.total_pages, 2);
    assert_eq!(page.page_number, 2);

    let requests = api.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].query.get("pageNumber").map(String::as_str), Some("2"));
    assert_eq!(requests[0].query.get("pageSize").map(String::as_str), Some("2"));
    assert_eq!(
        requests[0].query.get("department").map(String::as_str),
        Some("Engineering")
    );
}

#[tokio::test]
async fn test_status_filter_is_sent_as_boolean() {
    let api = FakeApi::start().await;
    api.add_job(JobBuilder::new("j-1").active(true).build());
    api.add_job(JobBuilder::new("j-2").active(false).build());
    let backend = api.backend(Credentials::new());

    let page = backend
        .list_jobs(&QueryParams::paged(1, 10).with("isActive", false))
        .await
        .unwrap();

    assert_eq!(page.total_count, 1);
    assert_eq!(page.data[0].id, "j-2");
    assert_eq!(
        api.requests()[0].query.get("isActive").map(String::as_str),
        Some("false")
    );
}

#[tokio::test]
async fn test_detail_unwraps_status_envelope() {
    let api = FakeApi::start().await;
    api.add_job(JobBuilder::new("j-7").title("Data Engineer").build());
    let backend = api.backend(Credentials::new());

    let job = backend.get_job("j-7").await.unwrap();
    assert_eq!(job.title, "Data Engineer");
    assert!(job.is_active);
}

#[tokio::test]
async fn test_failure_envelope_on_success_status_is_an_error() {
    let api = FakeApi::start().await;
    api.respond_with(
        Method::GET,
        "/Job/j-1",
        200,
        json!({ "responseStatus": "FAILED", "responseMessage": "Job is archived" }),
    );
    let backend = api.backend(Credentials::new());

    let err = backend.get_job("j-1").await.unwrap_err();
    assert_eq!(
        err,
        ApiError::Application {
            message: "Job is archived".to_string()
        }
    );
}

#[tokio::test]
async fn test_failure_envelope_without_message_uses_fallback() {
    let api = FakeApi::start().await;
    api.respond_with(
        Method::GET,
        "/Job/j-1",
        200,
        json!({ "responseStatus": "ERROR" }),
    );
    let backend = api.backend(Credentials::new());

    let err = backend.get_job("j-1").await.unwrap_err();
    assert_eq!(err.user_message(), "Failed to load job");
}

#[tokio::test]
async fn test_http_errors_carry_server_or_status_message() {
    let api = FakeApi::start().await;
    let backend = api.backend(Credentials::new());

    let err = backend.get_job("missing").await.unwrap_err();
    assert!(err.is_not_found());
    assert_eq!(err.user_message(), "Job not found");

    api.respond_with(Method::GET, "/api/dashboard-statistics", 500, json!({}));
    let err = backend.dashboard_statistics().await.unwrap_err();
    assert_eq!(
        err,
        ApiError::Http {
            status: 500,
            message: "The server encountered an error. Please try again later.".to_string()
        }
    );
    assert!(err.is_transient());
}

#[tokio::test]
async fn test_bearer_header_follows_credentials() {
    let api = FakeApi::start().await;
    api.add_job(JobBuilder::new("j-1").build());
    let credentials = Credentials::new();
    let backend = api.backend(credentials.clone());

    backend.get_job("j-1").await.unwrap();
    credentials.set(BearerToken::parse("abc.def.ghi").unwrap());
    backend.get_job("j-1").await.unwrap();
    credentials.clear();
    backend.get_job("j-1").await.unwrap();

    let auth: Vec<Option<String>> = api.requests().into_iter().map(|r| r.authorization).collect();
    assert_eq!(
        auth,
        vec![None, Some("Bearer abc.def.ghi".to_string()), None]
    );
}

#[tokio::test]
async fn test_login_and_me() {
    let api = FakeApi::start().await;
    let credentials = Credentials::new();
    let backend = api.backend(credentials.clone());

    let bad = LoginRequest::new("admin@example.com", SecretString::from("nope"));
    let err = backend.login(&bad).await.unwrap_err();
    assert_eq!(
        err,
        ApiError::Unauthorized("Invalid email or password.".to_string())
    );

    let good = LoginRequest::new("admin@example.com", SecretString::from(ADMIN_PASSWORD));
    let response = backend.login(&good).await.unwrap();
    assert_eq!(response.token, ADMIN_TOKEN);
    assert!(response.user.is_admin());

    assert!(backend.me().await.unwrap_err().is_unauthorized());
    credentials.set(BearerToken::parse(&response.token).unwrap());
    assert_eq!(backend.me().await.unwrap().email, "admin@example.com");
}

#[tokio::test]
async fn test_application_is_sent_as_multipart() {
    let api = FakeApi::start().await;
    let backend = api.backend(Credentials::new());
    let application = filled_application("j-42").validate().unwrap();

    let created = backend.create_application(&application).await.unwrap();
    assert_eq!(created.job_id, "j-42");
    assert_eq!(created.full_name, "Jane Doe");

    let requests = api.requests();
    assert_eq!(requests.len(), 1);
    let request = &requests[0];
    assert_eq!(request.method, Method::POST);
    assert_eq!(request.path, "/applications");
    assert!(request
        .content_type
        .as_deref()
        .unwrap()
        .starts_with("multipart/form-data"));
    let body = request.body_text();
    assert!(body.contains("filename=\"jane-doe-cv.pdf\""));
    assert!(body.contains("application/pdf"));
    assert!(body.contains("name=\"linkedinUrl\""));
}

#[tokio::test]
async fn test_slow_server_times_out_with_friendly_message() {
    let api = FakeApi::start().await;
    api.add_job(JobBuilder::new("j-1").build());
    api.set_delay(Duration::from_millis(1500));
    let backend = api.backend_with_timeout(Credentials::new(), Duration::from_millis(200));

    let err = backend.get_job("j-1").await.unwrap_err();
    assert_eq!(err, ApiError::Timeout);
    assert_eq!(err.user_message(), TIMEOUT_MESSAGE);
}

#[tokio::test]
async fn test_unreachable_server() {
    // Grab a free port and release it so nothing is listening there.
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);

    let backend = backoffice::RemoteBackend::builder()
        .base_url(format!("http://127.0.0.1:{}", port))
        .timeout(Duration::from_secs(2))
        .build()
        .unwrap();

    let err = backend.get_job("j-1").await.unwrap_err();
    assert!(matches!(err, ApiError::Unreachable(_)));
    assert_eq!(err.user_message(), UNREACHABLE_MESSAGE);
    assert!(err.is_transient());
}

#[tokio::test]
async fn test_blank_id_is_rejected_before_sending() {
    let api = FakeApi::start().await;
    let backend = api.backend(Credentials::new());

    let err = backend.get_job("  ").await.unwrap_err();
    assert!(matches!(err, ApiError::InvalidRequest(_)));
    assert!(api.requests().is_empty());
}
