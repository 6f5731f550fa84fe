use std::sync::Arc;

use crate::api::{ApiError, Backend, Result};
use crate::models::{PaginationEnvelope, QueryParams, UserAccount, UserUpdate};
use crate::query::{Mutation, QueryClient, QueryKey, Resource};

#[derive(Clone)]
pub struct UsersResource {
    backend: Arc<dyn Backend>,
    cache: QueryClient,
}

impl UsersResource {
    pub fn new(backend: Arc<dyn Backend>, cache: QueryClient) -> Self {
        Self { backend, cache }
    }

    pub fn list_key(params: &QueryParams) -> QueryKey {
        QueryKey::list(Resource::Users, params.clone())
    }

    pub fn detail_key(id: &str) -> QueryKey {
        QueryKey::detail(Resource::Users, id)
    }

    pub async fn list(&self, params: &QueryParams) -> Result<PaginationEnvelope<UserAccount>> {
        self.cache
            .fetch(Self::list_key(params), || self.backend.list_users(params))
            .await
    }

    pub async fn get(&self, id: &str) -> Result<UserAccount> {
        self.cache
            .fetch(Self::detail_key(id), || self.backend.get_user(id))
            .await
    }

    pub async fn update(&self, id: &str, update: &UserUpdate) -> Result<UserAccount> {
        Mutation::new(&self.cache, "Update user")
            .invalidates(Resource::Users)
            .seeds(|user: &UserAccount| Self::detail_key(&user.id))
            .run(self.backend.update_user(id, update))
            .await
    }

    /// Activates or deactivates `user`. A no-op change sends nothing.
    pub async fn set_active(&self, user: &UserAccount, is_active: bool) -> Result<UserAccount> {
        if user.is_active == is_active {
            return Err(ApiError::InvalidRequest(format!(
                "User is already {}",
                if is_active { "active" } else { "inactive" }
            )));
        }
        Mutation::new(&self.cache, "Update user status")
            .invalidates(Resource::Users)
            .invalidates(Resource::Dashboard)
            .seeds(|user: &UserAccount| Self::detail_key(&user.id))
            .run(self.backend.set_user_active(&user.id, is_active))
            .await
    }

    pub async fn reset_password(&self, id: &str) -> Result<()> {
        Mutation::new(&self.cache, "Reset password")
            .run(self.backend.reset_user_password(id))
            .await
    }

    pub async fn delete(&self, id: &str) -> Result<()> {
        Mutation::new(&self.cache, "Delete user")
            .invalidates(Resource::Users)
            .invalidates(Resource::Dashboard)
            .run(self.backend.delete_user(id))
            .await
    }
}
