//! Client-side query cache and mutations.

pub mod cache;
pub mod key;
pub mod mutation;

pub use cache::{CacheConfig, QueryClient};
pub use key::{KeyScope, QueryKey, Resource};
pub use mutation::Mutation;
