use std::sync::Arc;

use crate::api::{ApiError, Backend, Result};
use crate::models::{
    ApplicationStatus, JobApplication, NewApplication, PaginationEnvelope, QueryParams,
};
use crate::query::{Mutation, QueryClient, QueryKey, Resource};

#[derive(Clone)]
pub struct ApplicationsResource {
    backend: Arc<dyn Backend>,
    cache: QueryClient,
}

/// Rejects transitions the review workflow does not allow, before any request.
pub fn check_transition(from: ApplicationStatus, to: ApplicationStatus) -> Result<()> {
    if from == to {
        return Err(ApiError::InvalidRequest(format!(
            "Application is already {}",
            to.label()
        )));
    }
    if !from.can_transition_to(to) {
        return Err(ApiError::InvalidRequest(format!(
            "Cannot move application from {} to {}",
            from.label(),
            to.label()
        )));
    }
    Ok(())
}

impl ApplicationsResource {
    pub fn new(backend: Arc<dyn Backend>, cache: QueryClient) -> Self {
        Self { backend, cache }
    }

    pub fn list_key(params: &QueryParams) -> QueryKey {
        QueryKey::list(Resource::Applications, params.clone())
    }

    pub fn detail_key(id: &str) -> QueryKey {
        QueryKey::detail(Resource::Applications, id)
    }

    pub async fn list(&self, params: &QueryParams) -> Result<PaginationEnvelope<JobApplication>> {
        self.cache
            .fetch(Self::list_key(params), || {
                self.backend.list_applications(params)
            })
            .await
    }

    pub async fn get(&self, id: &str) -> Result<JobApplication> {
        self.cache
            .fetch(Self::detail_key(id), || self.backend.get_application(id))
            .await
    }

    /// Public submission. Job lists are invalidated since counts change.
    pub async fn submit(&self, application: &NewApplication) -> Result<JobApplication> {
        Mutation::new(&self.cache, "Submit application")
            .invalidates(Resource::Applications)
            .invalidates(Resource::Jobs)
            .invalidates(Resource::Dashboard)
            .run(self.backend.create_application(application))
            .await
    }

    /// Moves `application` to `to`; one request, or none if the move is not allowed.
    pub async fn transition(
        &self,
        application: &JobApplication,
        to: ApplicationStatus,
    ) -> Result<JobApplication> {
        check_transition(application.status, to)?;
        Mutation::new(&self.cache, "Update application status")
            .invalidates(Resource::Applications)
            .invalidates(Resource::Dashboard)
            .seeds(|app: &JobApplication| Self::detail_key(&app.id))
            .run(self.backend.update_application_status(&application.id, to))
            .await
    }

    pub async fn delete(&self, id: &str) -> Result<()> {
        Mutation::new(&self.cache, "Delete application")
            .invalidates(Resource::Applications)
            .invalidates(Resource::Jobs)
            .invalidates(Resource::Dashboard)
            .run(self.backend.delete_application(id))
            .await
    }
}
