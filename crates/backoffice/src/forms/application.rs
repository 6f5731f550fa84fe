use std::sync::LazyLock;

use regex::Regex;

use super::{check_email, is_valid_phone, optional, require, FieldErrors};
use crate::models::{NewApplication, ResumeFile};

/// Upload limit for resumes, 5 MiB.
pub const MAX_RESUME_BYTES: usize = 5 * 1024 * 1024;

const RESUME_EXTENSIONS: [&str; 3] = ["pdf", "doc", "docx"];
const RESUME_CONTENT_TYPES: [&str; 3] = [
    "application/pdf",
    "application/msword",
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
];

static RE_LINKEDIN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^https?://([a-z0-9-]+\.)*linkedin\.com(/\S*)?$").unwrap()
});

/// Public "apply for this job" form.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ApplicationForm {
    pub job_id: String,
    pub full_name: String,
    pub email: String,
    pub phone: String,
    pub country: String,
    pub linkedin_url: String,
    pub resume: Option<ResumeFile>,
}

impl ApplicationForm {
    pub fn for_job(job_id: impl Into<String>) -> Self {
        Self {
            job_id: job_id.into(),
            ..Self::default()
        }
    }

    /// Empties every field except the job being applied to.
    pub fn reset(&mut self) {
        *self = Self::for_job(std::mem::take(&mut self.job_id));
    }

    pub fn validate(&self) -> Result<NewApplication, FieldErrors> {
        let mut errors = FieldErrors::new();

        require(&mut errors, "jobId", "Job", &self.job_id);
        require(&mut errors, "fullName", "Full name", &self.full_name);
        check_email(&mut errors, "email", &self.email);
        if require(&mut errors, "phone", "Phone", &self.phone) && !is_valid_phone(&self.phone) {
            errors.add("phone", "Please enter a valid phone number.");
        }
        require(&mut errors, "country", "Country", &self.country);

        let linkedin_url = optional(&self.linkedin_url);
        if let Some(url) = &linkedin_url {
            if !is_linkedin_url(url) {
                errors.add("linkedinUrl", "Please enter a valid LinkedIn profile URL.");
            }
        }

        match &self.resume {
            None => errors.add("resume", "Resume is required."),
            Some(file) => {
                if let Err(message) = check_resume(file) {
                    errors.add("resume", message);
                }
            }
        }

        let resume = match (&self.resume, errors.is_empty()) {
            (Some(file), true) => file.clone(),
            _ => return Err(errors),
        };
        Ok(NewApplication {
            job_id: self.job_id.trim().to_string(),
            full_name: self.full_name.trim().to_string(),
            email: self.email.trim().to_string(),
            phone: self.phone.trim().to_string(),
            country: self.country.trim().to_string(),
            linkedin_url,
            resume,
        })
    }
}

pub fn is_linkedin_url(url: &str) -> bool {
    RE_LINKEDIN.is_match(&url.trim().to_ascii_lowercase())
}

/// Checks type and size. Both the extension and the declared content type
/// must be one of PDF, DOC or DOCX.
pub fn check_resume(file: &ResumeFile) -> Result<(), &'static str> {
    let ext_ok = file
        .extension()
        .is_some_and(|ext| RESUME_EXTENSIONS.contains(&ext.as_str()));
    let mime_ok = RESUME_CONTENT_TYPES.contains(&file.content_type.to_ascii_lowercase().as_str());
    if !ext_ok || !mime_ok {
        return Err("Resume must be a PDF, DOC or DOCX file.");
    }
    if file.is_empty() {
        return Err("Resume file is empty.");
    }
    if file.len() > MAX_RESUME_BYTES {
        return Err("Resume must be 5 MB or smaller.");
    }
    Ok(())
}
