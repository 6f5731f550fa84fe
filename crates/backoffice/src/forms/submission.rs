use super::{ApplicationForm, FieldErrors};
use crate::models::JobApplication;
use crate::resources::ApplicationsResource;

/// The public "apply" flow around an [`ApplicationForm`].
///
/// Holds the form, the field errors of the last attempt, the last request
/// error and whether the application went through.
#[derive(Debug, Clone, Default)]
pub struct ApplicationSubmission {
    pub form: ApplicationForm,
    field_errors: FieldErrors,
    error: Option<String>,
    submitted: bool,
    submitting: bool,
}

impl ApplicationSubmission {
    pub fn new(form: ApplicationForm) -> Self {
        Self {
            form,
            ..Self::default()
        }
    }

    pub fn field_errors(&self) -> &FieldErrors {
        &self.field_errors
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn is_submitted(&self) -> bool {
        self.submitted
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting
    }

    /// Validates and, if the form is clean, sends exactly one create request.
    ///
    /// On success the form is cleared (keeping the job id) and the created
    /// application is returned. On failure the form is left as typed.
    pub async fn submit(&mut self, applications: &ApplicationsResource) -> Option<JobApplication> {
        self.error = None;
        self.submitted = false;

        let application = match self.form.validate() {
            Ok(application) => {
                self.field_errors = FieldErrors::new();
                application
            }
            Err(errors) => {
                log::debug!("Application form rejected: {}", errors);
                self.field_errors = errors;
                return None;
            }
        };

        self.submitting = true;
        let result = applications.submit(&application).await;
        self.submitting = false;

        match result {
            Ok(created) => {
                log::info!("Application {} submitted for job {}", created.id, created.job_id);
                self.form.reset();
                self.submitted = true;
                Some(created)
            }
            Err(e) => {
                log::warn!("Application submission failed: {}", e);
                self.error = Some(e.user_message());
                None
            }
        }
    }
}
