//! Per-resource facades combining the backend with the query cache.
//!
//! Reads go through the cache; writes are [`Mutation`](crate::query::Mutation)s
//! that invalidate the resource prefix (and the dashboard, whose counters
//! they change).

pub mod applications;
pub mod contacts;
pub mod dashboard;
pub mod jobs;
pub mod users;

pub use applications::ApplicationsResource;
pub use contacts::ContactsResource;
pub use dashboard::DashboardResource;
pub use jobs::JobsResource;
pub use users::UsersResource;

use std::sync::Arc;

use crate::api::Backend;
use crate::query::QueryClient;

/// All resource facades sharing one backend and one cache.
#[derive(Clone)]
pub struct Resources {
    pub jobs: JobsResource,
    pub applications: ApplicationsResource,
    pub contacts: ContactsResource,
    pub users: UsersResource,
    pub dashboard: DashboardResource,
    cache: QueryClient,
}

impl Resources {
    pub fn new(backend: Arc<dyn Backend>, cache: QueryClient) -> Self {
        Self {
            jobs: JobsResource::new(backend.clone(), cache.clone()),
            applications: ApplicationsResource::new(backend.clone(), cache.clone()),
            contacts: ContactsResource::new(backend.clone(), cache.clone()),
            users: UsersResource::new(backend.clone(), cache.clone()),
            dashboard: DashboardResource::new(backend, cache.clone()),
            cache,
        }
    }

    pub fn cache(&self) -> &QueryClient {
        &self.cache
    }
}
