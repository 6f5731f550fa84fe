//! Job application commands, including the public apply flow.

use std::path::PathBuf;

use backoffice::controller::APPLICATION_FILTERS;
use backoffice::forms::{ApplicationForm, ApplicationSubmission};
use backoffice::models::{ApplicationStatus, JobApplication, ResumeFile};
use backoffice::{Backoffice, BackofficeError, PaginationEnvelope};
use clap::{Args, Subcommand};

use super::{emit, invalid, load_list, parse_flag, require_admin, Deleted, ListArgs};

const APPLICATIONS_ROUTE: &str = "/admin/applications";

#[derive(Debug, Subcommand)]
pub enum ApplicationsCommand {
    /// List applications (status: new, in_review, shortlisted, rejected, hired or all)
    List(ListArgs),
    /// Show one application
    Get { id: String },
    /// Move an application to another review status
    Status { id: String, status: String },
    /// Delete an application
    Delete { id: String },
    /// Apply for a job (public)
    Apply(ApplyArgs),
}

#[derive(Debug, Clone, Args)]
pub struct ApplyArgs {
    /// Job to apply for
    #[arg(long = "job")]
    pub job_id: String,
    #[arg(long = "name")]
    pub full_name: String,
    #[arg(long)]
    pub email: String,
    #[arg(long)]
    pub phone: String,
    #[arg(long)]
    pub country: String,
    #[arg(long = "linkedin")]
    pub linkedin_url: Option<String>,
    /// PDF, DOC or DOCX file
    #[arg(long)]
    pub resume: Option<PathBuf>,
}

pub async fn run(app: &Backoffice, command: ApplicationsCommand) -> bool {
    match command {
        ApplicationsCommand::List(args) => emit(list(app, &args).await),
        ApplicationsCommand::Get { id } => emit(get(app, &id).await),
        ApplicationsCommand::Status { id, status } => emit(set_status(app, &id, &status).await),
        ApplicationsCommand::Delete { id } => emit(delete(app, &id).await),
        ApplicationsCommand::Apply(args) => emit(apply(app, &args).await),
    }
}

async fn list(
    app: &Backoffice,
    args: &ListArgs,
) -> Result<PaginationEnvelope<JobApplication>, BackofficeError> {
    require_admin(app, APPLICATIONS_ROUTE)?;
    let applications = app.resources().applications.clone();
    load_list::<_, ApplicationStatus, _, _>(app, APPLICATION_FILTERS, args, |params| async move {
        applications.list(&params).await
    })
    .await
}

async fn get(app: &Backoffice, id: &str) -> Result<JobApplication, BackofficeError> {
    require_admin(app, APPLICATIONS_ROUTE)?;
    Ok(app.resources().applications.get(id).await?)
}

async fn set_status(
    app: &Backoffice,
    id: &str,
    status: &str,
) -> Result<JobApplication, BackofficeError> {
    require_admin(app, APPLICATIONS_ROUTE)?;
    let target: ApplicationStatus = parse_flag("status", status)?;
    let application = app.resources().applications.get(id).await?;
    Ok(app
        .resources()
        .applications
        .transition(&application, target)
        .await?)
}

async fn delete(app: &Backoffice, id: &str) -> Result<Deleted, BackofficeError> {
    require_admin(app, APPLICATIONS_ROUTE)?;
    app.resources().applications.delete(id).await?;
    Ok(Deleted::new(id))
}

async fn apply(app: &Backoffice, args: &ApplyArgs) -> Result<JobApplication, BackofficeError> {
    let mut form = ApplicationForm::for_job(args.job_id.clone());
    form.full_name = args.full_name.clone();
    form.email = args.email.clone();
    form.phone = args.phone.clone();
    form.country = args.country.clone();
    form.linkedin_url = args.linkedin_url.clone().unwrap_or_default();
    form.resume = args.resume.as_deref().map(read_resume).transpose()?;

    let mut submission = ApplicationSubmission::new(form);
    match submission.submit(&app.resources().applications).await {
        Some(created) => Ok(created),
        None if !submission.field_errors().is_empty() => {
            Err(BackofficeError::Validation(submission.field_errors().clone()))
        }
        None => Err(invalid(
            "form",
            submission
                .error()
                .unwrap_or("Failed to submit application")
                .to_string(),
        )),
    }
}

fn read_resume(path: &std::path::Path) -> Result<ResumeFile, BackofficeError> {
    let bytes = std::fs::read(path)
        .map_err(|e| invalid("resume", format!("Could not read {}: {}", path.display(), e)))?;
    let file_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("resume")
        .to_string();
    Ok(ResumeFile::new(file_name, bytes))
}
