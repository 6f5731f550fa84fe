use std::sync::Arc;

use crate::api::{Backend, Result};
use crate::models::DashboardStatistics;
use crate::query::{QueryClient, QueryKey, Resource};

#[derive(Clone)]
pub struct DashboardResource {
    backend: Arc<dyn Backend>,
    cache: QueryClient,
}

impl DashboardResource {
    pub fn new(backend: Arc<dyn Backend>, cache: QueryClient) -> Self {
        Self { backend, cache }
    }

    pub async fn statistics(&self) -> Result<DashboardStatistics> {
        self.cache
            .fetch(QueryKey::singleton(Resource::Dashboard), || {
                self.backend.dashboard_statistics()
            })
            .await
    }
}
