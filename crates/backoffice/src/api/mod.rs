//! Resource client.
//!
//! One async trait per resource; [`Backend`] bundles them. The HTTP
//! implementation lives in [`remote`], the storage-backed mock in [`local`].
//! Neither retries, caches, nor batches; that is the query layer's job.

pub mod error;
pub mod local;
pub mod remote;

pub use error::{ApiError, Result};
pub use local::LocalBackend;
pub use remote::RemoteBackend;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::models::{
    ApplicationStatus, ContactMessage, ContactStatus, DashboardStatistics, JobApplication,
    JobPayload, JobPosting, LoginRequest, LoginResponse, NewApplication, NewContactMessage,
    PaginationEnvelope, QueryParams, ReplyPayload, UserAccount, UserUpdate,
};

/// Which backend implementation serves requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    #[default]
    Remote,
    Local,
}

impl BackendKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            BackendKind::Remote => "remote",
            BackendKind::Local => "local",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "remote" => Some(BackendKind::Remote),
            "local" | "mock" => Some(BackendKind::Local),
            _ => None,
        }
    }
}

#[async_trait]
pub trait JobsApi: Send + Sync {
    async fn list_jobs(&self, params: &QueryParams) -> Result<PaginationEnvelope<JobPosting>>;

    async fn get_job(&self, id: &str) -> Result<JobPosting>;

    async fn create_job(&self, payload: &JobPayload) -> Result<JobPosting>;

    /// Full replacement; toggling the active flag goes through here too.
    async fn update_job(&self, id: &str, payload: &JobPayload) -> Result<JobPosting>;

    async fn delete_job(&self, id: &str) -> Result<()>;
}

#[async_trait]
pub trait ApplicationsApi: Send + Sync {
    async fn list_applications(
        &self,
        params: &QueryParams,
    ) -> Result<PaginationEnvelope<JobApplication>>;

    async fn get_application(&self, id: &str) -> Result<JobApplication>;

    async fn create_application(&self, application: &NewApplication) -> Result<JobApplication>;

    async fn update_application_status(
        &self,
        id: &str,
        status: ApplicationStatus,
    ) -> Result<JobApplication>;

    async fn delete_application(&self, id: &str) -> Result<()>;
}

#[async_trait]
pub trait ContactsApi: Send + Sync {
    async fn list_contacts(&self, params: &QueryParams)
        -> Result<PaginationEnvelope<ContactMessage>>;

    async fn get_contact(&self, id: &str) -> Result<ContactMessage>;

    async fn create_contact(&self, message: &NewContactMessage) -> Result<ContactMessage>;

    /// Posts a reply; the backend moves the message to `replied`.
    async fn reply_to_contact(&self, id: &str, reply: &ReplyPayload) -> Result<ContactMessage>;

    async fn update_contact_status(&self, id: &str, status: ContactStatus)
        -> Result<ContactMessage>;

    async fn delete_contact(&self, id: &str) -> Result<()>;
}

#[async_trait]
pub trait UsersApi: Send + Sync {
    async fn list_users(&self, params: &QueryParams) -> Result<PaginationEnvelope<UserAccount>>;

    async fn get_user(&self, id: &str) -> Result<UserAccount>;

    async fn update_user(&self, id: &str, update: &UserUpdate) -> Result<UserAccount>;

    async fn set_user_active(&self, id: &str, is_active: bool) -> Result<UserAccount>;

    async fn reset_user_password(&self, id: &str) -> Result<()>;

    async fn delete_user(&self, id: &str) -> Result<()>;
}

#[async_trait]
pub trait DashboardApi: Send + Sync {
    async fn dashboard_statistics(&self) -> Result<DashboardStatistics>;
}

#[async_trait]
pub trait AuthApi: Send + Sync {
    async fn login(&self, request: &LoginRequest) -> Result<LoginResponse>;

    /// The user the current credential belongs to.
    async fn me(&self) -> Result<UserAccount>;
}

/// Everything the back-office needs from a data source.
pub trait Backend:
    JobsApi + ApplicationsApi + ContactsApi + UsersApi + DashboardApi + AuthApi
{
    fn kind(&self) -> BackendKind;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backend_kind_parse() {
        assert_eq!(BackendKind::parse("Remote"), Some(BackendKind::Remote));
        assert_eq!(BackendKind::parse("mock"), Some(BackendKind::Local));
        assert_eq!(BackendKind::parse("grpc"), None);
        assert_eq!(BackendKind::default(), BackendKind::Remote);
    }
}
