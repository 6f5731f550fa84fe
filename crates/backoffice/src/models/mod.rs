//! Wire models shared by both backends.

pub mod application;
pub mod auth;
pub mod contact;
pub mod dashboard;
pub mod envelope;
pub mod job;
pub mod page;
pub mod params;
pub mod user;

pub use application::{
    ApplicationStatus, JobApplication, NewApplication, ResumeFile, StatusUpdate,
};
pub use auth::{LoginRequest, LoginResponse};
pub use contact::{ContactMessage, ContactReply, ContactStatus, NewContactMessage, ReplyPayload};
pub use dashboard::DashboardStatistics;
pub use envelope::{extract_message, ApiResponse, StatusEnvelope};
pub use job::{JobPayload, JobPosting, JobState, JobType, WorkArrangement};
pub use page::PaginationEnvelope;
pub use params::{clean, to_number, ParamValue, QueryParams};
pub use user::{UserAccount, UserRole, UserState, UserStatusUpdate, UserUpdate};

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Unknown {kind}: '{value}'")]
pub struct ParseEnumError {
    pub kind: &'static str,
    pub value: String,
}

impl ParseEnumError {
    pub fn new(kind: &'static str, value: &str) -> Self {
        Self {
            kind,
            value: value.to_string(),
        }
    }
}

/// A closed-set status a list can be filtered by.
///
/// The list controller treats `None` as "all" and sends nothing.
pub trait ListStatus: Copy + PartialEq + Send + Sync + 'static {
    /// Query key the filter is sent under.
    const KEY: &'static str;

    fn all() -> &'static [Self];

    fn as_str(&self) -> &'static str;

    fn label(&self) -> &'static str {
        self.as_str()
    }

    fn to_param(&self) -> ParamValue {
        ParamValue::Text(self.as_str().to_string())
    }

    fn parse(raw: &str) -> Option<Self> {
        Self::all().iter().copied().find(|s| s.as_str() == raw)
    }

    /// Matches a stored param value, used by the local backend.
    fn matches_param(value: &ParamValue, actual: Self) -> bool {
        *value == actual.to_param() || value.as_str() == Some(actual.as_str())
    }
}
