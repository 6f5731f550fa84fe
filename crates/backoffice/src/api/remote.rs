//! HTTP backend.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::{Method, RequestBuilder, Url};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use tracing::Instrument;

use super::error::{ApiError, Result};
use super::{
    ApplicationsApi, AuthApi, Backend, BackendKind, ContactsApi, DashboardApi, JobsApi, UsersApi,
};
use crate::auth::Credentials;
use crate::models::{
    extract_message, ApiResponse, ApplicationStatus, ContactMessage, ContactStatus,
    DashboardStatistics, JobApplication, JobPayload, JobPosting, LoginRequest, LoginResponse,
    NewApplication, NewContactMessage, PaginationEnvelope, QueryParams, ReplyPayload,
    StatusUpdate, UserAccount, UserStatusUpdate, UserUpdate,
};
use crate::sanitize::{redact_file_name, redact_url};

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15);

const JOBS_PATH: &str = "/Job";
const APPLICATIONS_PATH: &str = "/applications";
const CONTACTS_PATH: &str = "/api/contact";
const USERS_PATH: &str = "/api/users";
const DASHBOARD_PATH: &str = "/api/dashboard-statistics";
const LOGIN_PATH: &str = "/auth/login";
const ME_PATH: &str = "/auth/me";

enum Body {
    Empty,
    Json(Value),
    Multipart(Form),
}

/// Talks to the REST backend.
///
/// Every request carries the bearer header from the shared
/// [`Credentials`] at send time, so logging in or out takes effect
/// immediately without rebuilding the client.
#[derive(Clone)]
pub struct RemoteBackend {
    base_url: String,
    http: reqwest::Client,
    credentials: Credentials,
}

impl RemoteBackend {
    pub fn builder() -> RemoteBackendBuilder {
        RemoteBackendBuilder::default()
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn request<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        query: Option<&QueryParams>,
        body: Body,
        fallback: &str,
    ) -> Result<T> {
        let span = tracing::info_span!("http_request", method = %method, path = %path);
        self.send(method, path, query, body, fallback)
            .instrument(span)
            .await
    }

    async fn send<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        query: Option<&QueryParams>,
        body: Body,
        fallback: &str,
    ) -> Result<T> {
        let mut builder: RequestBuilder = self.http.request(method.clone(), self.url(path));
        if let Some(params) = query {
            builder = builder.query(&params.to_pairs());
        }
        if let Some(header) = self.credentials.header_value() {
            builder = builder.header(reqwest::header::AUTHORIZATION, header);
        }
        builder = match body {
            Body::Empty => builder,
            Body::Json(value) => builder.json(&value),
            Body::Multipart(form) => builder.multipart(form),
        };

        let started = Instant::now();
        log::debug!("Sending {} {}", method, path);

        let response = match builder.send().await {
            Ok(response) => response,
            Err(e) => {
                let err = ApiError::from(e);
                log::warn!(
                    "{} {} failed after {}ms: {}",
                    method,
                    path,
                    started.elapsed().as_millis(),
                    err
                );
                return Err(err);
            }
        };

        let status = response.status();
        let text = response.text().await.map_err(ApiError::from)?;
        log::debug!(
            "{} {} -> {} in {}ms",
            method,
            path,
            status.as_u16(),
            started.elapsed().as_millis()
        );

        let body: Value = if text.trim().is_empty() {
            Value::Null
        } else {
            match serde_json::from_str(&text) {
                Ok(value) => value,
                Err(_) if !status.is_success() => Value::String(text.clone()),
                Err(e) => return Err(ApiError::Decode(e.to_string())),
            }
        };

        if !status.is_success() {
            let message = extract_message(&body);
            log::warn!(
                "{} {} returned {}: {}",
                method,
                path,
                status.as_u16(),
                message.as_deref().unwrap_or("<no message>")
            );
            return Err(ApiError::from_status(status.as_u16(), message));
        }

        ApiResponse::<T>::from_value(body)
            .map_err(|e| ApiError::Decode(e.to_string()))?
            .into_result(fallback)
    }

    async fn list<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &QueryParams,
        fallback: &str,
    ) -> Result<PaginationEnvelope<T>> {
        let page: PaginationEnvelope<T> = self
            .request(Method::GET, path, Some(params), Body::Empty, fallback)
            .await?;
        Ok(page.normalized(params.page_number(), params.page_size()))
    }
}

fn item_path(base: &str, id: &str) -> Result<String> {
    let id = id.trim();
    if id.is_empty() {
        return Err(ApiError::InvalidRequest("Missing record id".to_string()));
    }
    let mut url = Url::parse("http://localhost/")
        .map_err(|e| ApiError::InvalidRequest(e.to_string()))?;
    url.path_segments_mut()
        .map_err(|_| ApiError::InvalidRequest(format!("Cannot build path under {}", base)))?
        .clear()
        .extend(base.split('/').filter(|s| !s.is_empty()))
        .push(id);
    Ok(url.path().to_string())
}

fn encode<T: serde::Serialize>(value: &T) -> Result<Value> {
    serde_json::to_value(value).map_err(|e| ApiError::InvalidRequest(e.to_string()))
}

fn application_form(application: &NewApplication) -> Result<Form> {
    log::debug!(
        "Attaching resume {} ({} bytes, {})",
        redact_file_name(&application.resume.file_name),
        application.resume.len(),
        application.resume.content_type
    );
    let resume = Part::bytes(application.resume.bytes.clone())
        .file_name(application.resume.file_name.clone())
        .mime_str(&application.resume.content_type)
        .map_err(|e| ApiError::InvalidRequest(e.to_string()))?;

    let mut form = Form::new()
        .text("jobId", application.job_id.clone())
        .text("fullName", application.full_name.clone())
        .text("email", application.email.clone())
        .text("phone", application.phone.clone())
        .text("country", application.country.clone());
    if let Some(url) = &application.linkedin_url {
        form = form.text("linkedinUrl", url.clone());
    }
    Ok(form.part("resume", resume))
}

#[async_trait]
impl JobsApi for RemoteBackend {
    async fn list_jobs(&self, params: &QueryParams) -> Result<PaginationEnvelope<JobPosting>> {
        self.list(JOBS_PATH, params, "Failed to load jobs").await
    }

    async fn get_job(&self, id: &str) -> Result<JobPosting> {
        let path = item_path(JOBS_PATH, id)?;
        self.request(Method::GET, &path, None, Body::Empty, "Failed to load job")
            .await
    }

    async fn create_job(&self, payload: &JobPayload) -> Result<JobPosting> {
        let body = Body::Json(encode(payload)?);
        self.request(Method::POST, JOBS_PATH, None, body, "Failed to create job")
            .await
    }

    async fn update_job(&self, id: &str, payload: &JobPayload) -> Result<JobPosting> {
        let path = item_path(JOBS_PATH, id)?;
        let body = Body::Json(encode(payload)?);
        self.request(Method::PUT, &path, None, body, "Failed to update job")
            .await
    }

    async fn delete_job(&self, id: &str) -> Result<()> {
        let path = item_path(JOBS_PATH, id)?;
        self.request(Method::DELETE, &path, None, Body::Empty, "Failed to delete job")
            .await
    }
}

#[async_trait]
impl ApplicationsApi for RemoteBackend {
    async fn list_applications(
        &self,
        params: &QueryParams,
    ) -> Result<PaginationEnvelope<JobApplication>> {
        self.list(APPLICATIONS_PATH, params, "Failed to load applications")
            .await
    }

    async fn get_application(&self, id: &str) -> Result<JobApplication> {
        let path = item_path(APPLICATIONS_PATH, id)?;
        self.request(
            Method::GET,
            &path,
            None,
            Body::Empty,
            "Failed to load application",
        )
        .await
    }

    async fn create_application(&self, application: &NewApplication) -> Result<JobApplication> {
        let form = application_form(application)?;
        self.request(
            Method::POST,
            APPLICATIONS_PATH,
            None,
            Body::Multipart(form),
            "Failed to submit application",
        )
        .await
    }

    async fn update_application_status(
        &self,
        id: &str,
        status: ApplicationStatus,
    ) -> Result<JobApplication> {
        let path = format!("{}/status", item_path(APPLICATIONS_PATH, id)?);
        let body = Body::Json(encode(&StatusUpdate { status })?);
        self.request(
            Method::PATCH,
            &path,
            None,
            body,
            "Failed to update application status",
        )
        .await
    }

    async fn delete_application(&self, id: &str) -> Result<()> {
        let path = item_path(APPLICATIONS_PATH, id)?;
        self.request(
            Method::DELETE,
            &path,
            None,
            Body::Empty,
            "Failed to delete application",
        )
        .await
    }
}

#[async_trait]
impl ContactsApi for RemoteBackend {
    async fn list_contacts(
        &self,
        params: &QueryParams,
    ) -> Result<PaginationEnvelope<ContactMessage>> {
        self.list(CONTACTS_PATH, params, "Failed to load messages")
            .await
    }

    async fn get_contact(&self, id: &str) -> Result<ContactMessage> {
        let path = item_path(CONTACTS_PATH, id)?;
        self.request(Method::GET, &path, None, Body::Empty, "Failed to load message")
            .await
    }

    async fn create_contact(&self, message: &NewContactMessage) -> Result<ContactMessage> {
        let body = Body::Json(encode(message)?);
        self.request(
            Method::POST,
            CONTACTS_PATH,
            None,
            body,
            "Failed to send message",
        )
        .await
    }

    async fn reply_to_contact(&self, id: &str, reply: &ReplyPayload) -> Result<ContactMessage> {
        let path = format!("{}/reply", item_path(CONTACTS_PATH, id)?);
        let body = Body::Json(encode(reply)?);
        self.request(Method::POST, &path, None, body, "Failed to send reply")
            .await
    }

    async fn update_contact_status(
        &self,
        id: &str,
        status: ContactStatus,
    ) -> Result<ContactMessage> {
        let path = format!("{}/status", item_path(CONTACTS_PATH, id)?);
        let body = Body::Json(encode(&StatusUpdate { status })?);
        self.request(
            Method::PATCH,
            &path,
            None,
            body,
            "Failed to update message status",
        )
        .await
    }

    async fn delete_contact(&self, id: &str) -> Result<()> {
        let path = item_path(CONTACTS_PATH, id)?;
        self.request(
            Method::DELETE,
            &path,
            None,
            Body::Empty,
            "Failed to delete message",
        )
        .await
    }
}

#[async_trait]
impl UsersApi for RemoteBackend {
    async fn list_users(&self, params: &QueryParams) -> Result<PaginationEnvelope<UserAccount>> {
        self.list(USERS_PATH, params, "Failed to load users").await
    }

    async fn get_user(&self, id: &str) -> Result<UserAccount> {
        let path = item_path(USERS_PATH, id)?;
        self.request(Method::GET, &path, None, Body::Empty, "Failed to load user")
            .await
    }

    async fn update_user(&self, id: &str, update: &UserUpdate) -> Result<UserAccount> {
        let path = item_path(USERS_PATH, id)?;
        let body = Body::Json(encode(update)?);
        self.request(Method::PUT, &path, None, body, "Failed to update user")
            .await
    }

    async fn set_user_active(&self, id: &str, is_active: bool) -> Result<UserAccount> {
        let path = format!("{}/status", item_path(USERS_PATH, id)?);
        let body = Body::Json(encode(&UserStatusUpdate { is_active })?);
        self.request(
            Method::PATCH,
            &path,
            None,
            body,
            "Failed to update user status",
        )
        .await
    }

    async fn reset_user_password(&self, id: &str) -> Result<()> {
        let path = format!("{}/reset-password", item_path(USERS_PATH, id)?);
        self.request(
            Method::POST,
            &path,
            None,
            Body::Json(json!({})),
            "Failed to reset password",
        )
        .await
    }

    async fn delete_user(&self, id: &str) -> Result<()> {
        let path = item_path(USERS_PATH, id)?;
        self.request(Method::DELETE, &path, None, Body::Empty, "Failed to delete user")
            .await
    }
}

#[async_trait]
impl DashboardApi for RemoteBackend {
    async fn dashboard_statistics(&self) -> Result<DashboardStatistics> {
        self.request(
            Method::GET,
            DASHBOARD_PATH,
            None,
            Body::Empty,
            "Failed to load dashboard statistics",
        )
        .await
    }
}

#[async_trait]
impl AuthApi for RemoteBackend {
    async fn login(&self, request: &LoginRequest) -> Result<LoginResponse> {
        let result = self
            .request::<LoginResponse>(
                Method::POST,
                LOGIN_PATH,
                None,
                Body::Json(request.to_body()),
                "Login failed",
            )
            .await;
        match result {
            Err(ApiError::Http { status: 401, message }) => Err(ApiError::Unauthorized(message)),
            other => other,
        }
    }

    async fn me(&self) -> Result<UserAccount> {
        self.request(
            Method::GET,
            ME_PATH,
            None,
            Body::Empty,
            "Failed to load current user",
        )
        .await
    }
}

impl Backend for RemoteBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::Remote
    }
}

/// Builder for [`RemoteBackend`].
#[derive(Debug, Clone)]
pub struct RemoteBackendBuilder {
    base_url: String,
    timeout: Duration,
    connect_timeout: Option<Duration>,
    credentials: Credentials,
}

impl Default for RemoteBackendBuilder {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            timeout: DEFAULT_TIMEOUT,
            connect_timeout: None,
            credentials: Credentials::new(),
        }
    }
}

impl RemoteBackendBuilder {
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Whole-request timeout. Expiry surfaces as [`ApiError::Timeout`].
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = Some(timeout);
        self
    }

    pub fn credentials(mut self, credentials: Credentials) -> Self {
        self.credentials = credentials;
        self
    }

    pub fn build(self) -> Result<RemoteBackend> {
        let base_url = self.base_url.trim().trim_end_matches('/').to_string();
        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            return Err(ApiError::InvalidRequest(format!(
                "Invalid API base URL '{}'",
                base_url
            )));
        }

        let mut builder = reqwest::Client::builder().timeout(self.timeout);
        if let Some(connect) = self.connect_timeout {
            builder = builder.connect_timeout(connect);
        }
        let http = builder
            .build()
            .map_err(|e| ApiError::InvalidRequest(e.to_string()))?;

        log::debug!(
            "Remote backend at {} (timeout {}s)",
            redact_url(&base_url),
            self.timeout.as_secs()
        );
        Ok(RemoteBackend {
            base_url,
            http,
            credentials: self.credentials,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_rejects_bad_url() {
        assert!(RemoteBackend::builder().base_url("ftp://x").build().is_err());
        assert!(RemoteBackend::builder().base_url("").build().is_err());
    }

    #[test]
    fn test_builder_trims_trailing_slash() {
        let backend = RemoteBackend::builder()
            .base_url("https://api.example.com/")
            .build()
            .unwrap();
        assert_eq!(backend.base_url(), "https://api.example.com");
        assert_eq!(backend.url(JOBS_PATH), "https://api.example.com/Job");
    }

    #[test]
    fn test_item_path_encodes_id() {
        assert_eq!(
            item_path(USERS_PATH, "a/b?c").unwrap(),
            "/api/users/a%2Fb%3Fc"
        );
        assert_eq!(item_path(JOBS_PATH, "j 1").unwrap(), "/Job/j%201");
    }

    #[test]
    fn test_item_path_requires_id() {
        assert_eq!(item_path(USERS_PATH, "u-1").unwrap(), "/api/users/u-1");
        assert!(matches!(
            item_path(USERS_PATH, "  "),
            Err(ApiError::InvalidRequest(_))
        ));
    }
}
