//! Builders for test records and configurations.

#![allow(dead_code)]

use std::path::Path;

use serde_json::{json, Value};

use backoffice::api::BackendKind;
use backoffice::forms::ApplicationForm;
use backoffice::models::ResumeFile;
use backoffice::BackofficeConfig;

/// Builder for job records as the backend serves them.
pub struct JobBuilder {
    id: String,
    title: String,
    department: String,
    is_active: bool,
    expiry_date: Option<String>,
}

impl JobBuilder {
    pub fn new(id: &str) -> Self {
        Self {
            id: id.to_string(),
            title: format!("Engineer {}", id),
            department: "Engineering".to_string(),
            is_active: true,
            expiry_date: None,
        }
    }

    pub fn title(mut self, title: &str) -> Self {
        self.title = title.to_string();
        self
    }

    pub fn department(mut self, department: &str) -> Self {
        self.department = department.to_string();
        self
    }

    pub fn active(mut self, is_active: bool) -> Self {
        self.is_active = is_active;
        self
    }

    pub fn expires(mut self, rfc3339: &str) -> Self {
        self.expiry_date = Some(rfc3339.to_string());
        self
    }

    pub fn build(self) -> Value {
        let mut job = json!({
            "id": self.id,
            "title": self.title,
            "department": self.department,
            "location": "Remote",
            "experience": "3+ years",
            "jobType": "full-time",
            "workArrangement": "remote",
            "briefDescription": "Build things.",
            "description": "<p>Build and run things.</p>",
            "isActive": self.is_active,
            "createdAt": "2024-01-15T09:00:00Z",
            "applicationCount": 0
        });
        if let Some(expiry) = self.expiry_date {
            job["expiryDate"] = json!(expiry);
        }
        job
    }
}

pub fn user_json(id: &str, email: &str, role: &str) -> Value {
    json!({
        "id": id,
        "firstName": "Test",
        "lastName": role,
        "email": email,
        "role": role,
        "isActive": true,
        "createdAt": "2024-01-01T00:00:00Z"
    })
}

/// A PDF resume of `size` bytes.
pub fn pdf_resume(size: usize) -> ResumeFile {
    let mut bytes = b"%PDF-1.4\n".to_vec();
    bytes.resize(size.max(bytes.len()), b'x');
    ResumeFile::new("jane-doe-cv.pdf", bytes)
}

/// An application form that passes validation.
pub fn filled_application(job_id: &str) -> ApplicationForm {
    let mut form = ApplicationForm::for_job(job_id);
    form.full_name = "Jane Doe".to_string();
    form.email = "jane@example.com".to_string();
    form.phone = "+1 555 010 0199".to_string();
    form.country = "Canada".to_string();
    form.linkedin_url = "https://www.linkedin.com/in/janedoe".to_string();
    form.resume = Some(pdf_resume(2048));
    form
}

/// Builder for `BackofficeConfig` instances.
pub struct ConfigBuilder {
    config: BackofficeConfig,
}

impl ConfigBuilder {
    /// Remote backend at `api_url` with a fast debounce and no retries.
    pub fn remote(api_url: &str) -> Self {
        let mut config = BackofficeConfig::default();
        config.backend.kind = BackendKind::Remote;
        config.backend.api_url = api_url.to_string();
        config.cache.retries = 0;
        config.list.debounce_ms = 20;
        Self { config }
    }

    /// Local backend with a known demo password.
    pub fn local(password: &str) -> Self {
        let mut config = BackofficeConfig::default();
        config.backend.kind = BackendKind::Local;
        config.local.demo_password = Some(password.to_string());
        config.cache.retries = 0;
        config.list.debounce_ms = 20;
        Self { config }
    }

    pub fn timeout_secs(mut self, secs: u64) -> Self {
        self.config.backend.timeout_secs = secs;
        self
    }

    pub fn page_size(mut self, page_size: u32) -> Self {
        self.config.list.page_size = page_size;
        self
    }

    pub fn seed(mut self, seed: bool) -> Self {
        self.config.local.seed_demo_data = seed;
        self
    }

    pub fn stale_secs(mut self, secs: u64) -> Self {
        self.config.cache.stale_time_secs = secs;
        self
    }

    pub fn storage(mut self, path: &Path) -> Self {
        self.config.storage.path = Some(path.to_string_lossy().into_owned());
        self
    }

    pub fn build(self) -> BackofficeConfig {
        self.config
    }
}
