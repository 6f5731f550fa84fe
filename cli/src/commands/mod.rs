//! CLI commands for the back-office.
//!
//! Commands are organized by domain:
//! - `jobs`: Job postings
//! - `applications`: Job applications and the public apply flow
//! - `contacts`: Contact messages and replies
//! - `users`: Back-office user accounts
//! - `auth`: Sign-in, sign-out and the current user
//! - `dashboard`: Dashboard counters
//!
//! Every command prints one JSON response on stdout.

pub mod applications;
pub mod auth;
pub mod contacts;
pub mod dashboard;
pub mod jobs;
pub mod users;

use std::future::Future;
use std::str::FromStr;

use backoffice::controller::FetchState;
use backoffice::models::{ListStatus, PaginationEnvelope, QueryParams};
use backoffice::view::PaginationFooter;
use backoffice::{ApiError, Backoffice, BackofficeError, FieldErrors, GateDecision};
use clap::Args;
use serde::Serialize;

/// Response wrapper printed for every command.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn err(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
        }
    }
}

/// Confirmation for delete-style commands.
#[derive(Debug, Serialize)]
pub struct Deleted {
    pub id: String,
    pub deleted: bool,
}

impl Deleted {
    pub fn new(id: &str) -> Self {
        Self {
            id: id.to_string(),
            deleted: true,
        }
    }
}

/// Prints the outcome and returns whether it succeeded.
pub fn emit<T: Serialize>(result: Result<T, BackofficeError>) -> bool {
    let response = match result {
        Ok(data) => ApiResponse::ok(data),
        Err(e) => {
            log::debug!("Command failed: {:?}", e);
            ApiResponse::err(e.user_message())
        }
    };
    match serde_json::to_string_pretty(&response) {
        Ok(json) => println!("{}", json),
        Err(e) => eprintln!("Failed to render response: {}", e),
    }
    response.success
}

/// Paging, status and filter flags shared by list commands.
#[derive(Debug, Clone, Args)]
pub struct ListArgs {
    /// Page to show (1-based)
    #[arg(long = "page")]
    pub page: Option<u32>,

    /// Rows per page (defaults to `list.page_size` from config)
    #[arg(long = "page-size")]
    pub page_size: Option<u32>,

    /// Status filter, or `all`
    #[arg(long = "status")]
    pub status: Option<String>,

    /// Extra filter as key=value (repeatable)
    #[arg(long = "filter", value_name = "KEY=VALUE")]
    pub filters: Vec<String>,
}

impl ListArgs {
    /// The flags as the URL query string a list screen would carry.
    pub fn to_query_string(&self) -> String {
        let mut params = QueryParams::new();
        if let Some(page) = self.page {
            params.insert("pageNumber", page);
        }
        if let Some(size) = self.page_size {
            params.insert("pageSize", size);
        }
        if let Some(status) = &self.status {
            params.insert("status", status.as_str());
        }
        for raw in &self.filters {
            match raw.split_once('=') {
                Some((key, value)) => params.insert(key.trim(), value.trim()),
                None => log::warn!("Ignoring filter '{}' (expected KEY=VALUE)", raw),
            }
        }
        params.canonical()
    }
}

/// Loads one page through a list controller restored from `args`.
pub async fn load_list<T, S, F, Fut>(
    app: &Backoffice,
    filter_keys: &'static [&'static str],
    args: &ListArgs,
    fetch: F,
) -> Result<PaginationEnvelope<T>, BackofficeError>
where
    T: Clone,
    S: ListStatus,
    F: FnOnce(QueryParams) -> Fut,
    Fut: Future<Output = Result<PaginationEnvelope<T>, ApiError>>,
{
    let mut controller = app.list_controller::<T, S>(filter_keys, &args.to_query_string());
    if let Some(raw) = args.status.as_deref().filter(|s| *s != "all") {
        if S::parse(raw).is_none() {
            let allowed: Vec<&str> = S::all().iter().map(|s| s.as_str()).collect();
            return Err(invalid(
                "status",
                format!(
                    "Unknown status '{}'. Expected one of: all, {}",
                    raw,
                    allowed.join(", ")
                ),
            ));
        }
    }

    controller.load(fetch).await;
    match controller.state() {
        FetchState::Loaded(page) => {
            eprintln!("{}", PaginationFooter::from_envelope(page).range_label());
            Ok(page.clone())
        }
        FetchState::Failed(e) => Err(e.clone().into()),
        FetchState::Idle | FetchState::Loading => {
            Ok(PaginationEnvelope::empty(controller.page_size()))
        }
    }
}

/// Refuses admin commands unless the stored session may open `path`.
pub fn require_admin(app: &Backoffice, path: &str) -> Result<(), BackofficeError> {
    match app.gate().decide(app.session().state(), path) {
        GateDecision::Allow => Ok(()),
        GateDecision::RedirectToLogin { from } => Err(invalid(
            "session",
            format!("Sign in with `backoffice login` to open {}", from),
        )),
        GateDecision::RedirectHome => Err(invalid(
            "session",
            "This command requires an administrator account.",
        )),
        GateDecision::Pending => Err(invalid("session", "Session is still loading.")),
    }
}

/// A single-field validation failure.
pub fn invalid(field: &str, message: impl Into<String>) -> BackofficeError {
    let mut errors = FieldErrors::new();
    errors.add(field, message);
    BackofficeError::Validation(errors)
}

/// Parses a closed-set flag value, reporting failures against `field`.
pub fn parse_flag<T>(field: &str, raw: &str) -> Result<T, BackofficeError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    raw.trim().parse::<T>().map_err(|e| invalid(field, e.to_string()))
}

/// Replaces `target` when a flag was given.
pub fn set_if(target: &mut String, value: &Option<String>) {
    if let Some(value) = value {
        *target = value.clone();
    }
}
