//! Storage-backed mock backend.
//!
//! Records live as JSON arrays under fixed keys in a [`KeyValueStore`].
//! Filtering, sorting and pagination happen here, the way the server would
//! do them, so everything above the backend behaves the same either way.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{Duration, Utc};
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use serde::Serialize;
use uuid::Uuid;

use super::error::{ApiError, Result};
use super::{
    ApplicationsApi, AuthApi, Backend, BackendKind, ContactsApi, DashboardApi, JobsApi, UsersApi,
};
use crate::auth::Credentials;
use crate::models::{
    ApplicationStatus, ContactMessage, ContactReply, ContactStatus, DashboardStatistics,
    JobApplication, JobPayload, JobPosting, JobType, LoginRequest, LoginResponse, ListStatus,
    NewApplication, NewContactMessage, PaginationEnvelope, QueryParams, ReplyPayload,
    UserAccount, UserRole, UserUpdate, WorkArrangement,
};
use crate::storage::{read_json, write_json, KeyValueStore};

pub const JOBS_KEY: &str = "backoffice.jobs";
pub const APPLICATIONS_KEY: &str = "backoffice.applications";
pub const CONTACTS_KEY: &str = "backoffice.contacts";
pub const USERS_KEY: &str = "backoffice.users";

const TOKEN_PREFIX: &str = "local";

/// The mock backend.
pub struct LocalBackend {
    store: Arc<dyn KeyValueStore>,
    demo_password: SecretString,
    credentials: Credentials,
    write_lock: Mutex<()>,
}

impl LocalBackend {
    pub fn new(
        store: Arc<dyn KeyValueStore>,
        demo_password: SecretString,
        credentials: Credentials,
    ) -> Self {
        Self {
            store,
            demo_password,
            credentials,
            write_lock: Mutex::new(()),
        }
    }

    pub fn store(&self) -> &Arc<dyn KeyValueStore> {
        &self.store
    }

    /// Writes a demo admin and a few postings when the store is empty.
    ///
    /// Returns whether anything was written.
    pub fn seed_demo_data(&self) -> Result<bool> {
        let _guard = self.lock()?;
        let mut seeded = false;
        let now = Utc::now();

        if read_json::<Vec<UserAccount>>(self.store.as_ref(), USERS_KEY)?.is_none() {
            let users = vec![UserAccount {
                id: Uuid::new_v4().to_string(),
                first_name: "Demo".to_string(),
                last_name: "Admin".to_string(),
                email: "admin@example.com".to_string(),
                role: UserRole::Admin,
                is_active: true,
                created_at: now,
                updated_at: None,
                last_login_at: None,
            }];
            write_json(self.store.as_ref(), USERS_KEY, &users)?;
            seeded = true;
        }

        if read_json::<Vec<JobPosting>>(self.store.as_ref(), JOBS_KEY)?.is_none() {
            let jobs: Vec<JobPosting> = [
                ("Senior Backend Engineer", "Engineering", "Berlin", JobType::FullTime, WorkArrangement::Hybrid),
                ("Product Designer", "Design", "Remote", JobType::Contract, WorkArrangement::Remote),
                ("Investor Relations Associate", "Finance", "London", JobType::FullTime, WorkArrangement::Onsite),
            ]
            .into_iter()
            .enumerate()
            .map(|(i, (title, department, location, job_type, work_arrangement))| JobPosting {
                id: Uuid::new_v4().to_string(),
                title: title.to_string(),
                department: department.to_string(),
                location: location.to_string(),
                experience: "3+ years".to_string(),
                job_type,
                work_arrangement,
                brief_description: format!("Join our {} team.", department),
                description: format!("<p>We are hiring a {}.</p>", title),
                is_active: true,
                created_at: now - Duration::days(i as i64),
                updated_at: None,
                expiry_date: None,
                application_count: 0,
            })
            .collect();
            write_json(self.store.as_ref(), JOBS_KEY, &jobs)?;
            seeded = true;
        }

        if seeded {
            log::info!("Seeded local backend with demo data");
        }
        Ok(seeded)
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, ()>> {
        self.write_lock
            .lock()
            .map_err(|_| ApiError::Storage("Local store lock poisoned".to_string()))
    }

    fn load<T: DeserializeOwned>(&self, key: &str) -> Result<Vec<T>> {
        Ok(read_json(self.store.as_ref(), key)?.unwrap_or_default())
    }

    fn save<T: Serialize>(&self, key: &str, records: &[T]) -> Result<()> {
        Ok(write_json(self.store.as_ref(), key, records)?)
    }

    /// Read-modify-write of one collection under the write lock.
    fn mutate<T, R, F>(&self, key: &str, f: F) -> Result<R>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce(&mut Vec<T>) -> Result<R>,
    {
        let _guard = self.lock()?;
        let mut records = self.load::<T>(key)?;
        let result = f(&mut records)?;
        self.save(key, &records)?;
        Ok(result)
    }

    fn with_application_counts(&self, mut jobs: Vec<JobPosting>) -> Result<Vec<JobPosting>> {
        let applications = self.load::<JobApplication>(APPLICATIONS_KEY)?;
        let mut counts: HashMap<&str, u64> = HashMap::new();
        for application in &applications {
            *counts.entry(application.job_id.as_str()).or_default() += 1;
        }
        for job in &mut jobs {
            job.application_count = counts.get(job.id.as_str()).copied().unwrap_or_default();
        }
        Ok(jobs)
    }

    fn current_user_id(&self) -> Result<String> {
        let token = self
            .credentials
            .current()
            .ok_or_else(|| ApiError::Unauthorized("Not signed in".to_string()))?;
        let mut parts = token.expose().splitn(3, '.');
        match (parts.next(), parts.next()) {
            (Some(TOKEN_PREFIX), Some(id)) if !id.is_empty() => Ok(id.to_string()),
            _ => Err(ApiError::Unauthorized(
                "Session token is not valid for this backend".to_string(),
            )),
        }
    }
}

fn not_found(resource: &str, id: &str) -> ApiError {
    ApiError::NotFound {
        resource: resource.to_string(),
        id: id.to_string(),
    }
}

fn contains_ci(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

/// Free-text filter: every listed field is searched.
fn text_filter(params: &QueryParams, key: &str, fields: &[&str]) -> bool {
    match params.get_str(key).map(str::trim).filter(|s| !s.is_empty()) {
        Some(needle) => fields.iter().any(|f| contains_ci(f, needle)),
        None => true,
    }
}

fn exact_filter(params: &QueryParams, key: &str, actual: &str) -> bool {
    match params.get(key) {
        Some(value) => value.render().eq_ignore_ascii_case(actual),
        None => true,
    }
}

fn bool_filter(params: &QueryParams, key: &str, actual: bool) -> bool {
    match params.get_bool(key) {
        Some(expected) => expected == actual,
        None => true,
    }
}

fn status_filter<S: ListStatus>(params: &QueryParams, actual: S) -> bool {
    match params.get(S::KEY) {
        Some(value) => S::matches_param(value, actual),
        None => true,
    }
}

fn page<T>(records: Vec<T>, params: &QueryParams) -> PaginationEnvelope<T> {
    PaginationEnvelope::from_slice(records, params.page_number(), params.page_size())
}

#[async_trait]
impl JobsApi for LocalBackend {
    async fn list_jobs(&self, params: &QueryParams) -> Result<PaginationEnvelope<JobPosting>> {
        let mut jobs: Vec<JobPosting> = self
            .load::<JobPosting>(JOBS_KEY)?
            .into_iter()
            .filter(|j| {
                text_filter(
                    params,
                    "search",
                    &[&j.title, &j.department, &j.location, &j.brief_description],
                ) && text_filter(params, "title", &[&j.title])
                    && exact_filter(params, "department", &j.department)
                    && text_filter(params, "location", &[&j.location])
                    && exact_filter(params, "jobType", j.job_type.as_str())
                    && exact_filter(params, "workArrangement", j.work_arrangement.as_str())
                    && bool_filter(params, "isActive", j.is_active)
            })
            .collect();
        jobs.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        let jobs = self.with_application_counts(jobs)?;
        Ok(page(jobs, params))
    }

    async fn get_job(&self, id: &str) -> Result<JobPosting> {
        let job = self
            .load::<JobPosting>(JOBS_KEY)?
            .into_iter()
            .find(|j| j.id == id)
            .ok_or_else(|| not_found("Job", id))?;
        let mut jobs = self.with_application_counts(vec![job])?;
        jobs.pop().ok_or_else(|| not_found("Job", id))
    }

    async fn create_job(&self, payload: &JobPayload) -> Result<JobPosting> {
        let job = JobPosting {
            id: Uuid::new_v4().to_string(),
            title: payload.title.clone(),
            department: payload.department.clone(),
            location: payload.location.clone(),
            experience: payload.experience.clone(),
            job_type: payload.job_type,
            work_arrangement: payload.work_arrangement,
            brief_description: payload.brief_description.clone(),
            description: payload.description.clone(),
            is_active: payload.is_active,
            created_at: Utc::now(),
            updated_at: None,
            expiry_date: payload.expiry_date,
            application_count: 0,
        };
        let created = job.clone();
        self.mutate(JOBS_KEY, move |jobs: &mut Vec<JobPosting>| {
            jobs.push(job);
            Ok(())
        })?;
        log::info!("Created job {} ({})", created.id, created.title);
        Ok(created)
    }

    async fn update_job(&self, id: &str, payload: &JobPayload) -> Result<JobPosting> {
        let updated = self.mutate(JOBS_KEY, |jobs: &mut Vec<JobPosting>| {
            let job = jobs
                .iter_mut()
                .find(|j| j.id == id)
                .ok_or_else(|| not_found("Job", id))?;
            job.title = payload.title.clone();
            job.department = payload.department.clone();
            job.location = payload.location.clone();
            job.experience = payload.experience.clone();
            job.job_type = payload.job_type;
            job.work_arrangement = payload.work_arrangement;
            job.brief_description = payload.brief_description.clone();
            job.description = payload.description.clone();
            job.is_active = payload.is_active;
            job.expiry_date = payload.expiry_date;
            job.updated_at = Some(Utc::now());
            Ok(job.clone())
        })?;
        let mut jobs = self.with_application_counts(vec![updated])?;
        jobs.pop().ok_or_else(|| not_found("Job", id))
    }

    async fn delete_job(&self, id: &str) -> Result<()> {
        self.mutate(JOBS_KEY, |jobs: &mut Vec<JobPosting>| {
            let before = jobs.len();
            jobs.retain(|j| j.id != id);
            if jobs.len() == before {
                return Err(not_found("Job", id));
            }
            Ok(())
        })
    }
}

#[async_trait]
impl ApplicationsApi for LocalBackend {
    async fn list_applications(
        &self,
        params: &QueryParams,
    ) -> Result<PaginationEnvelope<JobApplication>> {
        let mut applications: Vec<JobApplication> = self
            .load::<JobApplication>(APPLICATIONS_KEY)?
            .into_iter()
            .filter(|a| {
                text_filter(params, "search", &[&a.full_name, &a.email])
                    && text_filter(params, "email", &[&a.email])
                    && text_filter(params, "fullName", &[&a.full_name])
                    && text_filter(params, "country", &[&a.country])
                    && exact_filter(params, "jobId", &a.job_id)
                    && status_filter(params, a.status)
            })
            .collect();
        applications.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(page(applications, params))
    }

    async fn get_application(&self, id: &str) -> Result<JobApplication> {
        self.load::<JobApplication>(APPLICATIONS_KEY)?
            .into_iter()
            .find(|a| a.id == id)
            .ok_or_else(|| not_found("Application", id))
    }

    async fn create_application(&self, application: &NewApplication) -> Result<JobApplication> {
        let job = self
            .load::<JobPosting>(JOBS_KEY)?
            .into_iter()
            .find(|j| j.id == application.job_id)
            .ok_or_else(|| not_found("Job", &application.job_id))?;
        if !job.is_open(Utc::now()) {
            return Err(ApiError::from_status(
                409,
                Some("This position is no longer accepting applications.".to_string()),
            ));
        }

        let id = Uuid::new_v4().to_string();
        let record = JobApplication {
            resume_url: Some(format!(
                "local://resumes/{}/{}",
                id, application.resume.file_name
            )),
            resume_file_name: Some(application.resume.file_name.clone()),
            id,
            job_id: job.id.clone(),
            job_title: Some(job.title.clone()),
            full_name: application.full_name.clone(),
            email: application.email.clone(),
            phone: application.phone.clone(),
            country: application.country.clone(),
            linkedin_url: application.linkedin_url.clone(),
            status: ApplicationStatus::New,
            created_at: Utc::now(),
            updated_at: None,
        };
        let created = record.clone();
        self.mutate(APPLICATIONS_KEY, move |apps: &mut Vec<JobApplication>| {
            apps.push(record);
            Ok(())
        })?;
        log::info!("Stored application {} for job {}", created.id, created.job_id);
        Ok(created)
    }

    async fn update_application_status(
        &self,
        id: &str,
        status: ApplicationStatus,
    ) -> Result<JobApplication> {
        self.mutate(APPLICATIONS_KEY, |apps: &mut Vec<JobApplication>| {
            let app = apps
                .iter_mut()
                .find(|a| a.id == id)
                .ok_or_else(|| not_found("Application", id))?;
            if !app.status.can_transition_to(status) {
                return Err(ApiError::from_status(
                    422,
                    Some(format!(
                        "Cannot move application from {} to {}",
                        app.status.label(),
                        status.label()
                    )),
                ));
            }
            app.status = status;
            app.updated_at = Some(Utc::now());
            Ok(app.clone())
        })
    }

    async fn delete_application(&self, id: &str) -> Result<()> {
        self.mutate(APPLICATIONS_KEY, |apps: &mut Vec<JobApplication>| {
            let before = apps.len();
            apps.retain(|a| a.id != id);
            if apps.len() == before {
                return Err(not_found("Application", id));
            }
            Ok(())
        })
    }
}

#[async_trait]
impl ContactsApi for LocalBackend {
    async fn list_contacts(
        &self,
        params: &QueryParams,
    ) -> Result<PaginationEnvelope<ContactMessage>> {
        let mut contacts: Vec<ContactMessage> = self
            .load::<ContactMessage>(CONTACTS_KEY)?
            .into_iter()
            .filter(|c| {
                text_filter(params, "search", &[&c.name, &c.email, &c.subject])
                    && text_filter(params, "email", &[&c.email])
                    && text_filter(params, "subject", &[&c.subject])
                    && status_filter(params, c.status)
            })
            .collect();
        contacts.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(page(contacts, params))
    }

    async fn get_contact(&self, id: &str) -> Result<ContactMessage> {
        self.load::<ContactMessage>(CONTACTS_KEY)?
            .into_iter()
            .find(|c| c.id == id)
            .ok_or_else(|| not_found("Message", id))
    }

    async fn create_contact(&self, message: &NewContactMessage) -> Result<ContactMessage> {
        let record = ContactMessage {
            id: Uuid::new_v4().to_string(),
            name: message.name.clone(),
            email: message.email.clone(),
            phone: message.phone.clone(),
            company: message.company.clone(),
            subject: message.subject.clone(),
            message: message.message.clone(),
            status: ContactStatus::New,
            replies: Vec::new(),
            created_at: Utc::now(),
            updated_at: None,
        };
        let created = record.clone();
        self.mutate(CONTACTS_KEY, move |contacts: &mut Vec<ContactMessage>| {
            contacts.push(record);
            Ok(())
        })?;
        Ok(created)
    }

    async fn reply_to_contact(&self, id: &str, reply: &ReplyPayload) -> Result<ContactMessage> {
        self.mutate(CONTACTS_KEY, |contacts: &mut Vec<ContactMessage>| {
            let contact = contacts
                .iter_mut()
                .find(|c| c.id == id)
                .ok_or_else(|| not_found("Message", id))?;
            let now = Utc::now();
            contact.replies.push(ContactReply {
                id: Uuid::new_v4().to_string(),
                subject: reply.subject.clone(),
                body: reply.body.clone(),
                sent_at: now,
            });
            contact.status = ContactStatus::Replied;
            contact.updated_at = Some(now);
            Ok(contact.clone())
        })
    }

    async fn update_contact_status(
        &self,
        id: &str,
        status: ContactStatus,
    ) -> Result<ContactMessage> {
        self.mutate(CONTACTS_KEY, |contacts: &mut Vec<ContactMessage>| {
            let contact = contacts
                .iter_mut()
                .find(|c| c.id == id)
                .ok_or_else(|| not_found("Message", id))?;
            contact.status = status;
            contact.updated_at = Some(Utc::now());
            Ok(contact.clone())
        })
    }

    async fn delete_contact(&self, id: &str) -> Result<()> {
        self.mutate(CONTACTS_KEY, |contacts: &mut Vec<ContactMessage>| {
            let before = contacts.len();
            contacts.retain(|c| c.id != id);
            if contacts.len() == before {
                return Err(not_found("Message", id));
            }
            Ok(())
        })
    }
}

#[async_trait]
impl UsersApi for LocalBackend {
    async fn list_users(&self, params: &QueryParams) -> Result<PaginationEnvelope<UserAccount>> {
        let mut users: Vec<UserAccount> = self
            .load::<UserAccount>(USERS_KEY)?
            .into_iter()
            .filter(|u| {
                text_filter(
                    params,
                    "search",
                    &[&u.first_name, &u.last_name, &u.email],
                ) && text_filter(params, "email", &[&u.email])
                    && exact_filter(params, "role", u.role.as_str())
                    && bool_filter(params, "isActive", u.is_active)
            })
            .collect();
        users.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(page(users, params))
    }

    async fn get_user(&self, id: &str) -> Result<UserAccount> {
        self.load::<UserAccount>(USERS_KEY)?
            .into_iter()
            .find(|u| u.id == id)
            .ok_or_else(|| not_found("User", id))
    }

    async fn update_user(&self, id: &str, update: &UserUpdate) -> Result<UserAccount> {
        self.mutate(USERS_KEY, |users: &mut Vec<UserAccount>| {
            let taken = users
                .iter()
                .any(|u| u.id != id && u.email.eq_ignore_ascii_case(&update.email));
            if taken {
                return Err(ApiError::from_status(
                    409,
                    Some("A user with this email already exists.".to_string()),
                ));
            }
            let user = users
                .iter_mut()
                .find(|u| u.id == id)
                .ok_or_else(|| not_found("User", id))?;
            user.first_name = update.first_name.clone();
            user.last_name = update.last_name.clone();
            user.email = update.email.clone();
            user.role = update.role;
            user.updated_at = Some(Utc::now());
            Ok(user.clone())
        })
    }

    async fn set_user_active(&self, id: &str, is_active: bool) -> Result<UserAccount> {
        self.mutate(USERS_KEY, |users: &mut Vec<UserAccount>| {
            let user = users
                .iter_mut()
                .find(|u| u.id == id)
                .ok_or_else(|| not_found("User", id))?;
            user.is_active = is_active;
            user.updated_at = Some(Utc::now());
            Ok(user.clone())
        })
    }

    async fn reset_user_password(&self, id: &str) -> Result<()> {
        let user = self.get_user(id).await?;
        log::info!(
            "Password reset requested for user {} ({})",
            user.id,
            crate::sanitize::redact_email(&user.email)
        );
        Ok(())
    }

    async fn delete_user(&self, id: &str) -> Result<()> {
        self.mutate(USERS_KEY, |users: &mut Vec<UserAccount>| {
            let before = users.len();
            users.retain(|u| u.id != id);
            if users.len() == before {
                return Err(not_found("User", id));
            }
            Ok(())
        })
    }
}

#[async_trait]
impl DashboardApi for LocalBackend {
    async fn dashboard_statistics(&self) -> Result<DashboardStatistics> {
        Ok(DashboardStatistics::compute(
            &self.load::<JobPosting>(JOBS_KEY)?,
            &self.load::<JobApplication>(APPLICATIONS_KEY)?,
            &self.load::<ContactMessage>(CONTACTS_KEY)?,
            &self.load::<UserAccount>(USERS_KEY)?,
        ))
    }
}

#[async_trait]
impl AuthApi for LocalBackend {
    async fn login(&self, request: &LoginRequest) -> Result<LoginResponse> {
        let invalid = || ApiError::Unauthorized("Invalid email or password.".to_string());

        if request.password.expose_secret() != self.demo_password.expose_secret() {
            return Err(invalid());
        }

        let user = self.mutate(USERS_KEY, |users: &mut Vec<UserAccount>| {
            let user = users
                .iter_mut()
                .find(|u| {
                    u.email.eq_ignore_ascii_case(request.email.trim())
                        && u.is_active
                        && u.is_admin()
                })
                .ok_or_else(invalid)?;
            user.last_login_at = Some(Utc::now());
            Ok(user.clone())
        })?;

        let token = format!("{}.{}.{}", TOKEN_PREFIX, user.id, Uuid::new_v4().simple());
        Ok(LoginResponse { user, token })
    }

    async fn me(&self) -> Result<UserAccount> {
        let id = self.current_user_id()?;
        match self.get_user(&id).await {
            Ok(user) if user.is_active => Ok(user),
            Ok(_) => Err(ApiError::Unauthorized("Account is deactivated".to_string())),
            Err(e) if e.is_not_found() => {
                Err(ApiError::Unauthorized("Account no longer exists".to_string()))
            }
            Err(e) => Err(e),
        }
    }
}

impl Backend for LocalBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::Local
    }
}
