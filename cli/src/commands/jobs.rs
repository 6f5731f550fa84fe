//! Job posting commands.

use backoffice::controller::JOB_FILTERS;
use backoffice::forms::JobForm;
use backoffice::models::{JobPosting, JobState};
use backoffice::{Backoffice, BackofficeError};
use chrono::Utc;
use clap::{Args, Subcommand};

use super::{emit, load_list, require_admin, set_if, Deleted, ListArgs};

const JOBS_ROUTE: &str = "/admin/jobs";

#[derive(Debug, Subcommand)]
pub enum JobsCommand {
    /// List postings (status: open, closed or all)
    List(ListArgs),
    /// Show one posting
    Get { id: String },
    /// Create a posting
    Create(JobFields),
    /// Update a posting; omitted fields keep their value
    Update {
        id: String,
        #[command(flatten)]
        fields: JobFields,
    },
    /// Flip a posting between active and inactive
    Toggle { id: String },
    /// Delete a posting
    Delete { id: String },
}

#[derive(Debug, Clone, Args)]
pub struct JobFields {
    #[arg(long)]
    pub title: Option<String>,
    #[arg(long)]
    pub department: Option<String>,
    #[arg(long)]
    pub location: Option<String>,
    #[arg(long)]
    pub experience: Option<String>,
    /// full-time, part-time, contract or freelance
    #[arg(long = "job-type")]
    pub job_type: Option<String>,
    /// onsite, hybrid or remote
    #[arg(long = "work-arrangement")]
    pub work_arrangement: Option<String>,
    #[arg(long = "brief")]
    pub brief_description: Option<String>,
    /// HTML description
    #[arg(long)]
    pub description: Option<String>,
    /// Expiry as YYYY-MM-DD or RFC 3339
    #[arg(long = "expires")]
    pub expiry_date: Option<String>,
    /// Create or leave the posting inactive
    #[arg(long)]
    pub inactive: bool,
}

impl JobFields {
    fn apply(&self, form: &mut JobForm) {
        set_if(&mut form.title, &self.title);
        set_if(&mut form.department, &self.department);
        set_if(&mut form.location, &self.location);
        set_if(&mut form.experience, &self.experience);
        set_if(&mut form.job_type, &self.job_type);
        set_if(&mut form.work_arrangement, &self.work_arrangement);
        set_if(&mut form.brief_description, &self.brief_description);
        set_if(&mut form.description, &self.description);
        set_if(&mut form.expiry_date, &self.expiry_date);
        if self.inactive {
            form.is_active = false;
        }
    }
}

pub async fn run(app: &Backoffice, command: JobsCommand) -> bool {
    match command {
        JobsCommand::List(args) => emit(list(app, &args).await),
        JobsCommand::Get { id } => emit(get(app, &id).await),
        JobsCommand::Create(fields) => emit(create(app, &fields).await),
        JobsCommand::Update { id, fields } => emit(update(app, &id, &fields).await),
        JobsCommand::Toggle { id } => emit(toggle(app, &id).await),
        JobsCommand::Delete { id } => emit(delete(app, &id).await),
    }
}

async fn list(
    app: &Backoffice,
    args: &ListArgs,
) -> Result<backoffice::PaginationEnvelope<JobPosting>, BackofficeError> {
    require_admin(app, JOBS_ROUTE)?;
    let jobs = app.resources().jobs.clone();
    load_list::<_, JobState, _, _>(app, JOB_FILTERS, args, |params| async move {
        jobs.list(&params).await
    })
    .await
}

async fn get(app: &Backoffice, id: &str) -> Result<JobPosting, BackofficeError> {
    require_admin(app, JOBS_ROUTE)?;
    Ok(app.resources().jobs.get(id).await?)
}

async fn create(app: &Backoffice, fields: &JobFields) -> Result<JobPosting, BackofficeError> {
    require_admin(app, JOBS_ROUTE)?;
    let mut form = JobForm {
        is_active: true,
        ..JobForm::default()
    };
    fields.apply(&mut form);
    let payload = form.validate(Utc::now(), true)?;
    Ok(app.resources().jobs.create(&payload).await?)
}

async fn update(
    app: &Backoffice,
    id: &str,
    fields: &JobFields,
) -> Result<JobPosting, BackofficeError> {
    require_admin(app, JOBS_ROUTE)?;
    let current = app.resources().jobs.get(id).await?;
    let mut form = JobForm::from_job(&current);
    fields.apply(&mut form);
    let payload = form.validate(Utc::now(), false)?;
    Ok(app.resources().jobs.update(id, &payload).await?)
}

async fn toggle(app: &Backoffice, id: &str) -> Result<JobPosting, BackofficeError> {
    require_admin(app, JOBS_ROUTE)?;
    let job = app.resources().jobs.get(id).await?;
    Ok(app.resources().jobs.toggle_active(&job).await?)
}

async fn delete(app: &Backoffice, id: &str) -> Result<Deleted, BackofficeError> {
    require_admin(app, JOBS_ROUTE)?;
    app.resources().jobs.delete(id).await?;
    Ok(Deleted::new(id))
}
