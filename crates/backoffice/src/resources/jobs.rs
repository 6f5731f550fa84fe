use std::sync::Arc;

use crate::api::{Backend, Result};
use crate::models::{JobPayload, JobPosting, PaginationEnvelope, QueryParams};
use crate::query::{Mutation, QueryClient, QueryKey, Resource};

/// Cached job queries and job mutations.
#[derive(Clone)]
pub struct JobsResource {
    backend: Arc<dyn Backend>,
    cache: QueryClient,
}

impl JobsResource {
    pub fn new(backend: Arc<dyn Backend>, cache: QueryClient) -> Self {
        Self { backend, cache }
    }

    pub fn list_key(params: &QueryParams) -> QueryKey {
        QueryKey::list(Resource::Jobs, params.clone())
    }

    pub fn detail_key(id: &str) -> QueryKey {
        QueryKey::detail(Resource::Jobs, id)
    }

    pub async fn list(&self, params: &QueryParams) -> Result<PaginationEnvelope<JobPosting>> {
        self.cache
            .fetch(Self::list_key(params), || self.backend.list_jobs(params))
            .await
    }

    pub async fn get(&self, id: &str) -> Result<JobPosting> {
        self.cache
            .fetch(Self::detail_key(id), || self.backend.get_job(id))
            .await
    }

    pub async fn create(&self, payload: &JobPayload) -> Result<JobPosting> {
        Mutation::new(&self.cache, "Create job")
            .invalidates(Resource::Jobs)
            .invalidates(Resource::Dashboard)
            .seeds(|job: &JobPosting| Self::detail_key(&job.id))
            .run(self.backend.create_job(payload))
            .await
    }

    pub async fn update(&self, id: &str, payload: &JobPayload) -> Result<JobPosting> {
        Mutation::new(&self.cache, "Update job")
            .invalidates(Resource::Jobs)
            .invalidates(Resource::Dashboard)
            .seeds(|job: &JobPosting| Self::detail_key(&job.id))
            .run(self.backend.update_job(id, payload))
            .await
    }

    /// Flips `isActive` with one full update.
    pub async fn toggle_active(&self, job: &JobPosting) -> Result<JobPosting> {
        let payload = job.to_payload().with_active(!job.is_active);
        log::info!(
            "{} job {}",
            if payload.is_active { "Activating" } else { "Deactivating" },
            job.id
        );
        self.update(&job.id, &payload).await
    }

    pub async fn delete(&self, id: &str) -> Result<()> {
        Mutation::new(&self.cache, "Delete job")
            .invalidates(Resource::Jobs)
            .invalidates(Resource::Applications)
            .invalidates(Resource::Dashboard)
            .run(self.backend.delete_job(id))
            .await
    }
}
