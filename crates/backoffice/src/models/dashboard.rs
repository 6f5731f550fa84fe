//! Dashboard counters.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::application::{ApplicationStatus, JobApplication};
use super::contact::ContactMessage;
use super::job::JobPosting;
use super::user::UserAccount;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStatistics {
    #[serde(default)]
    pub total_jobs: u64,
    #[serde(default)]
    pub active_jobs: u64,
    #[serde(default)]
    pub total_applications: u64,
    #[serde(default)]
    pub applications_by_status: BTreeMap<ApplicationStatus, u64>,
    #[serde(default)]
    pub total_contact_messages: u64,
    #[serde(default)]
    pub open_contact_messages: u64,
    #[serde(default)]
    pub total_users: u64,
    #[serde(default)]
    pub active_users: u64,
}

impl DashboardStatistics {
    /// Computes the counters from full record sets.
    pub fn compute(
        jobs: &[JobPosting],
        applications: &[JobApplication],
        contacts: &[ContactMessage],
        users: &[UserAccount],
    ) -> Self {
        let mut applications_by_status: BTreeMap<ApplicationStatus, u64> =
            ApplicationStatus::ALL.iter().map(|s| (*s, 0)).collect();
        for application in applications {
            *applications_by_status.entry(application.status).or_default() += 1;
        }

        Self {
            total_jobs: jobs.len() as u64,
            active_jobs: jobs.iter().filter(|j| j.is_active).count() as u64,
            total_applications: applications.len() as u64,
            applications_by_status,
            total_contact_messages: contacts.len() as u64,
            open_contact_messages: contacts.iter().filter(|c| c.status.is_open()).count() as u64,
            total_users: users.len() as u64,
            active_users: users.iter().filter(|u| u.is_active).count() as u64,
        }
    }

    pub fn applications_with(&self, status: ApplicationStatus) -> u64 {
        self.applications_by_status
            .get(&status)
            .copied()
            .unwrap_or_default()
    }
}
