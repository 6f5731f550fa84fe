//! Job postings.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{ListStatus, ParseEnumError};
use crate::models::params::ParamValue;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum JobType {
    FullTime,
    PartTime,
    Contract,
    Freelance,
}

impl JobType {
    pub const ALL: [JobType; 4] = [
        JobType::FullTime,
        JobType::PartTime,
        JobType::Contract,
        JobType::Freelance,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            JobType::FullTime => "full-time",
            JobType::PartTime => "part-time",
            JobType::Contract => "contract",
            JobType::Freelance => "freelance",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            JobType::FullTime => "Full-time",
            JobType::PartTime => "Part-time",
            JobType::Contract => "Contract",
            JobType::Freelance => "Freelance",
        }
    }
}

impl FromStr for JobType {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| ParseEnumError::new("job type", s))
    }
}

impl fmt::Display for JobType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WorkArrangement {
    Onsite,
    Hybrid,
    Remote,
}

impl WorkArrangement {
    pub const ALL: [WorkArrangement; 3] = [
        WorkArrangement::Onsite,
        WorkArrangement::Hybrid,
        WorkArrangement::Remote,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            WorkArrangement::Onsite => "onsite",
            WorkArrangement::Hybrid => "hybrid",
            WorkArrangement::Remote => "remote",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            WorkArrangement::Onsite => "On-site",
            WorkArrangement::Hybrid => "Hybrid",
            WorkArrangement::Remote => "Remote",
        }
    }
}

impl FromStr for WorkArrangement {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|w| w.as_str() == s)
            .ok_or_else(|| ParseEnumError::new("work arrangement", s))
    }
}

impl fmt::Display for WorkArrangement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A job posting as returned by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobPosting {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub department: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub experience: String,
    pub job_type: JobType,
    pub work_arrangement: WorkArrangement,
    #[serde(default)]
    pub brief_description: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub expiry_date: Option<DateTime<Utc>>,
    /// Derived by the backend; never sent back.
    #[serde(default)]
    pub application_count: u64,
}

impl JobPosting {
    /// The full update body for this posting.
    pub fn to_payload(&self) -> JobPayload {
        JobPayload {
            title: self.title.clone(),
            department: self.department.clone(),
            location: self.location.clone(),
            experience: self.experience.clone(),
            job_type: self.job_type,
            work_arrangement: self.work_arrangement,
            brief_description: self.brief_description.clone(),
            description: self.description.clone(),
            is_active: self.is_active,
            expiry_date: self.expiry_date,
        }
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expiry_date.is_some_and(|expiry| expiry <= now)
    }

    /// Whether the posting should be listed publicly.
    pub fn is_open(&self, now: DateTime<Utc>) -> bool {
        self.is_active && !self.is_expired(now)
    }
}

/// Create/update body. Updates always send the full payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobPayload {
    pub title: String,
    pub department: String,
    pub location: String,
    pub experience: String,
    pub job_type: JobType,
    pub work_arrangement: WorkArrangement,
    pub brief_description: String,
    pub description: String,
    pub is_active: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiry_date: Option<DateTime<Utc>>,
}

impl JobPayload {
    pub fn with_active(mut self, is_active: bool) -> Self {
        self.is_active = is_active;
        self
    }
}

/// Open/closed filter for the jobs list, sent as `isActive`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum JobState {
    Open,
    Closed,
}

impl ListStatus for JobState {
    const KEY: &'static str = "isActive";

    fn all() -> &'static [Self] {
        &[JobState::Open, JobState::Closed]
    }

    fn as_str(&self) -> &'static str {
        match self {
            JobState::Open => "open",
            JobState::Closed => "closed",
        }
    }

    fn label(&self) -> &'static str {
        match self {
            JobState::Open => "Active",
            JobState::Closed => "Inactive",
        }
    }

    fn to_param(&self) -> ParamValue {
        ParamValue::Bool(matches!(self, JobState::Open))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use serde_json::json;

    fn sample() -> JobPosting {
        serde_json::from_value(json!({
            "id": "job-1",
            "title": "Backend Engineer",
            "department": "Engineering",
            "location": "Berlin",
            "experience": "3+ years",
            "jobType": "full-time",
            "workArrangement": "hybrid",
            "briefDescription": "Build APIs",
            "description": "<p>Build APIs</p>",
            "isActive": true,
            "createdAt": "2024-01-05T10:00:00Z",
            "applicationCount": 4
        }))
        .unwrap()
    }

    #[test]
    fn test_job_decodes_camel_case() {
        let job = sample();
        assert_eq!(job.job_type, JobType::FullTime);
        assert_eq!(job.work_arrangement, WorkArrangement::Hybrid);
        assert_eq!(job.application_count, 4);
        assert!(job.expiry_date.is_none());
    }

    #[test]
    fn test_payload_omits_derived_fields() {
        let payload = serde_json::to_value(sample().to_payload()).unwrap();
        assert!(payload.get("applicationCount").is_none());
        assert!(payload.get("id").is_none());
        assert_eq!(payload["jobType"], "full-time");
        assert_eq!(payload["isActive"], true);
    }

    #[test]
    fn test_with_active_flips_only_flag() {
        let payload = sample().to_payload();
        let toggled = payload.clone().with_active(false);
        assert!(!toggled.is_active);
        assert_eq!(toggled.title, payload.title);
    }

    #[test]
    fn test_expiry() {
        let mut job = sample();
        let now = Utc::now();
        assert!(job.is_open(now));
        job.expiry_date = Some(now - Duration::days(1));
        assert!(job.is_expired(now));
        assert!(!job.is_open(now));
    }

    #[test]
    fn test_enum_parsing() {
        assert_eq!("part-time".parse::<JobType>().unwrap(), JobType::PartTime);
        assert_eq!(
            "remote".parse::<WorkArrangement>().unwrap(),
            WorkArrangement::Remote
        );
        assert!("Remote".parse::<WorkArrangement>().is_err());
    }

    #[test]
    fn test_job_state_param() {
        assert_eq!(JobState::Open.to_param(), ParamValue::Bool(true));
        assert_eq!(JobState::parse("closed"), Some(JobState::Closed));
    }
}
