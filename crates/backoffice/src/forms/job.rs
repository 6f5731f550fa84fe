use chrono::{DateTime, NaiveDate, Utc};

use super::{max_chars, require, strip_html, FieldErrors};
use crate::models::{JobPayload, JobPosting, JobType, WorkArrangement};

pub const MAX_TITLE_CHARS: usize = 120;
pub const MAX_BRIEF_CHARS: usize = 300;

/// Admin job editor.
///
/// Closed-set fields hold their wire values (`full-time`, `remote`, ...).
/// `expiry_date` accepts RFC 3339 or a plain `YYYY-MM-DD` date.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JobForm {
    pub title: String,
    pub department: String,
    pub location: String,
    pub experience: String,
    pub job_type: String,
    pub work_arrangement: String,
    pub brief_description: String,
    pub description: String,
    pub is_active: bool,
    pub expiry_date: String,
}

impl JobForm {
    pub fn from_job(job: &JobPosting) -> Self {
        Self {
            title: job.title.clone(),
            department: job.department.clone(),
            location: job.location.clone(),
            experience: job.experience.clone(),
            job_type: job.job_type.as_str().to_string(),
            work_arrangement: job.work_arrangement.as_str().to_string(),
            brief_description: job.brief_description.clone(),
            description: job.description.clone(),
            is_active: job.is_active,
            expiry_date: job
                .expiry_date
                .map(|d| d.to_rfc3339())
                .unwrap_or_default(),
        }
    }

    /// Validates the form. New postings must not already be expired.
    pub fn validate(&self, now: DateTime<Utc>, is_create: bool) -> Result<JobPayload, FieldErrors> {
        let mut errors = FieldErrors::new();

        if require(&mut errors, "title", "Title", &self.title) {
            max_chars(&mut errors, "title", "Title", &self.title, MAX_TITLE_CHARS);
        }
        require(&mut errors, "department", "Department", &self.department);
        require(&mut errors, "location", "Location", &self.location);
        require(&mut errors, "experience", "Experience", &self.experience);

        let job_type = self.job_type.trim().parse::<JobType>().ok();
        if job_type.is_none() {
            errors.add("jobType", "Please select a job type.");
        }
        let work_arrangement = self.work_arrangement.trim().parse::<WorkArrangement>().ok();
        if work_arrangement.is_none() {
            errors.add("workArrangement", "Please select a work arrangement.");
        }

        if require(
            &mut errors,
            "briefDescription",
            "Brief description",
            &self.brief_description,
        ) {
            max_chars(
                &mut errors,
                "briefDescription",
                "Brief description",
                &self.brief_description,
                MAX_BRIEF_CHARS,
            );
        }
        if strip_html(&self.description).is_empty() {
            errors.add("description", "Description is required.");
        }

        let expiry_date = match parse_date(&self.expiry_date) {
            Ok(date) => date,
            Err(()) => {
                errors.add("expiryDate", "Please enter a valid date.");
                None
            }
        };
        if is_create && expiry_date.is_some_and(|d| d <= now) {
            errors.add("expiryDate", "Expiry date must be in the future.");
        }

        match (job_type, work_arrangement) {
            (Some(job_type), Some(work_arrangement)) if errors.is_empty() => Ok(JobPayload {
                title: self.title.trim().to_string(),
                department: self.department.trim().to_string(),
                location: self.location.trim().to_string(),
                experience: self.experience.trim().to_string(),
                job_type,
                work_arrangement,
                brief_description: self.brief_description.trim().to_string(),
                description: self.description.trim().to_string(),
                is_active: self.is_active,
                expiry_date,
            }),
            _ => Err(errors),
        }
    }
}

fn parse_date(raw: &str) -> Result<Option<DateTime<Utc>>, ()> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(None);
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Ok(Some(dt.with_timezone(&Utc)));
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(23, 59, 59))
        .map(|dt| Some(dt.and_utc()))
        .ok_or(())
}
