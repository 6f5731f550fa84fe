//! Cache keys.
//!
//! A [`QueryKey`] names one cached response by its [`Resource`] and the exact
//! list parameters, record id or singleton it was fetched for.

use std::fmt;

use crate::models::QueryParams;

/// Top-level cache partition. Invalidation works on whole resources.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Resource {
    Jobs,
    Applications,
    Contacts,
    Users,
    Dashboard,
    Session,
}

impl Resource {
    pub fn as_str(&self) -> &'static str {
        match self {
            Resource::Jobs => "jobs",
            Resource::Applications => "applications",
            Resource::Contacts => "contacts",
            Resource::Users => "users",
            Resource::Dashboard => "dashboard",
            Resource::Session => "session",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum KeyScope {
    List(QueryParams),
    Detail(String),
    Singleton,
}

/// Identifies one cached response: resource plus the exact parameter tuple.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QueryKey {
    pub resource: Resource,
    pub scope: KeyScope,
}

impl QueryKey {
    pub fn list(resource: Resource, params: QueryParams) -> Self {
        Self {
            resource,
            scope: KeyScope::List(params),
        }
    }

    pub fn detail(resource: Resource, id: impl Into<String>) -> Self {
        Self {
            resource,
            scope: KeyScope::Detail(id.into()),
        }
    }

    pub fn singleton(resource: Resource) -> Self {
        Self {
            resource,
            scope: KeyScope::Singleton,
        }
    }

    /// Whether this key falls under `resource`'s prefix.
    pub fn starts_with(&self, resource: Resource) -> bool {
        self.resource == resource
    }

    pub fn params(&self) -> Option<&QueryParams> {
        match &self.scope {
            KeyScope::List(params) => Some(params),
            _ => None,
        }
    }
}

impl fmt::Display for QueryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.scope {
            KeyScope::List(params) if params.is_empty() => write!(f, "{}/list", self.resource.as_str()),
            KeyScope::List(params) => {
                write!(f, "{}/list?{}", self.resource.as_str(), params.canonical())
            }
            KeyScope::Detail(id) => write!(f, "{}/{}", self.resource.as_str(), id),
            KeyScope::Singleton => f.write_str(self.resource.as_str()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_equal_params_give_equal_keys() {
        let a = QueryKey::list(
            Resource::Jobs,
            QueryParams::paged(1, 10).with("department", "Sales"),
        );
        let b = QueryKey::list(
            Resource::Jobs,
            QueryParams::new().with("department", "Sales").with("pageSize", 10u32).with("pageNumber", 1u32),
        );
        assert_eq!(a, b);
        assert_eq!(a.to_string(), "jobs/list?department=Sales&pageNumber=1&pageSize=10");
    }

    #[test]
    fn test_prefix_match() {
        let key = QueryKey::detail(Resource::Users, "u-1");
        assert!(key.starts_with(Resource::Users));
        assert!(!key.starts_with(Resource::Jobs));
        assert_eq!(key.to_string(), "users/u-1");
        assert_eq!(QueryKey::singleton(Resource::Dashboard).to_string(), "dashboard");
    }
}
