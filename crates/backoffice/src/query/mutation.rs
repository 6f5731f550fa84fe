//! Mutations: perform a write, then invalidate what it made stale.

use std::future::Future;

use super::cache::QueryClient;
use super::key::{QueryKey, Resource};
use crate::api::Result;

type SeedFn<T> = Box<dyn Fn(&T) -> QueryKey + Send + Sync>;

/// A single write against the backend.
///
/// On success every listed resource prefix is invalidated and, if a seed
/// function is set, the returned object is written to its detail key. On
/// failure the cache is left untouched.
pub struct Mutation<'c, T> {
    client: &'c QueryClient,
    label: &'static str,
    invalidates: Vec<Resource>,
    seed: Option<SeedFn<T>>,
}

impl<'c, T> Mutation<'c, T>
where
    T: Clone + Send + Sync + 'static,
{
    pub fn new(client: &'c QueryClient, label: &'static str) -> Self {
        Self {
            client,
            label,
            invalidates: Vec::new(),
            seed: None,
        }
    }

    pub fn invalidates(mut self, resource: Resource) -> Self {
        if !self.invalidates.contains(&resource) {
            self.invalidates.push(resource);
        }
        self
    }

    pub fn seeds<F>(mut self, key_for: F) -> Self
    where
        F: Fn(&T) -> QueryKey + Send + Sync + 'static,
    {
        self.seed = Some(Box::new(key_for));
        self
    }

    pub async fn run<Fut>(self, request: Fut) -> Result<T>
    where
        Fut: Future<Output = Result<T>>,
    {
        let value = match request.await {
            Ok(value) => value,
            Err(e) => {
                log::warn!("{} failed: {}", self.label, e);
                return Err(e);
            }
        };

        for resource in &self.invalidates {
            self.client.invalidate_resource(*resource).await;
        }
        if let Some(key_for) = &self.seed {
            self.client.set_query_data(key_for(&value), value.clone()).await;
        }
        log::info!("{} succeeded", self.label);
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::ApiError;
    use crate::models::QueryParams;

    #[tokio::test]
    async fn test_success_invalidates_and_seeds() {
        let client = QueryClient::default();
        let list = QueryKey::list(Resource::Jobs, QueryParams::paged(1, 10));
        client.set_query_data(list.clone(), vec!["old"]).await;

        let value = Mutation::new(&client, "Update job")
            .invalidates(Resource::Jobs)
            .seeds(|v: &String| QueryKey::detail(Resource::Jobs, v.clone()))
            .run(async { Ok("job-1".to_string()) })
            .await
            .unwrap();

        assert_eq!(value, "job-1");
        assert!(client.get_query_data::<Vec<&str>>(&list).await.is_none());
        assert_eq!(
            client
                .get_query_data::<String>(&QueryKey::detail(Resource::Jobs, "job-1"))
                .await
                .as_deref(),
            Some("job-1")
        );
    }

    #[tokio::test]
    async fn test_failure_leaves_cache_alone() {
        let client = QueryClient::default();
        let list = QueryKey::list(Resource::Jobs, QueryParams::paged(1, 10));
        client.set_query_data(list.clone(), 5u32).await;

        let err = Mutation::<u32>::new(&client, "Delete job")
            .invalidates(Resource::Jobs)
            .run(async { Err(ApiError::from_status(500, None)) })
            .await
            .unwrap_err();

        assert!(err.is_transient());
        assert_eq!(client.get_query_data::<u32>(&list).await, Some(5));
    }
}
