//! Route protection for admin paths.

use super::session::SessionState;
use crate::models::QueryParams;

pub const LOGIN_PATH: &str = "/login";
pub const HOME_PATH: &str = "/";
pub const DASHBOARD_PATH: &str = "/admin/dashboard";
pub const ADMIN_PREFIX: &str = "/admin";

/// Query parameter carrying the originally requested path.
pub const FROM_PARAM: &str = "from";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateDecision {
    /// Session still booting; render nothing yet.
    Pending,
    Allow,
    RedirectToLogin { from: String },
    RedirectHome,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteGate {
    pub login_path: String,
    pub home_path: String,
    pub dashboard_path: String,
    pub protected_prefix: String,
}

impl Default for RouteGate {
    fn default() -> Self {
        Self {
            login_path: LOGIN_PATH.to_string(),
            home_path: HOME_PATH.to_string(),
            dashboard_path: DASHBOARD_PATH.to_string(),
            protected_prefix: ADMIN_PREFIX.to_string(),
        }
    }
}

impl RouteGate {
    pub fn is_protected(&self, path: &str) -> bool {
        let path = strip_query(path);
        path == self.protected_prefix
            || path
                .strip_prefix(self.protected_prefix.as_str())
                .is_some_and(|rest| rest.starts_with('/'))
    }

    pub fn decide(&self, state: &SessionState, path: &str) -> GateDecision {
        if !self.is_protected(path) {
            return GateDecision::Allow;
        }
        match state {
            SessionState::Loading => GateDecision::Pending,
            SessionState::Anonymous => GateDecision::RedirectToLogin {
                from: path.to_string(),
            },
            SessionState::Authenticated(user) if user.is_admin() => GateDecision::Allow,
            SessionState::Authenticated(_) => GateDecision::RedirectHome,
        }
    }

    /// `/login?from=<path>`.
    pub fn login_url(&self, from: &str) -> String {
        let query = QueryParams::new().with(FROM_PARAM, from).canonical();
        if query.is_empty() {
            self.login_path.clone()
        } else {
            format!("{}?{}", self.login_path, query)
        }
    }

    /// The `from` value of a login page URL or query string.
    pub fn recorded_path(&self, login_url: &str) -> Option<String> {
        let query = login_url.split_once('?').map_or(login_url, |(_, q)| q);
        QueryParams::parse_query_string(query).remove(FROM_PARAM)
    }

    /// Where to go after a successful login.
    ///
    /// Falls back to the dashboard when nothing was recorded, when the
    /// recorded path is the login page itself, or when it is not a local
    /// absolute path.
    pub fn post_login_redirect(&self, from: Option<&str>) -> String {
        match from.map(str::trim) {
            Some(path)
                if path.starts_with('/')
                    && !path.starts_with("//")
                    && strip_query(path) != self.login_path =>
            {
                path.to_string()
            }
            _ => self.dashboard_path.clone(),
        }
    }
}

fn strip_query(path: &str) -> &str {
    path.split(['?', '#']).next().unwrap_or(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{UserAccount, UserRole};
    use chrono::Utc;

    fn signed_in(role: UserRole) -> SessionState {
        SessionState::Authenticated(UserAccount {
            id: "u-1".into(),
            first_name: "A".into(),
            last_name: "B".into(),
            email: "a@b.co".into(),
            role,
            is_active: true,
            created_at: Utc::now(),
            updated_at: None,
            last_login_at: None,
        })
    }

    #[test]
    fn test_public_paths_always_allowed() {
        let gate = RouteGate::default();
        assert_eq!(gate.decide(&SessionState::Anonymous, "/careers"), GateDecision::Allow);
        assert_eq!(gate.decide(&SessionState::Loading, "/administrators"), GateDecision::Allow);
    }

    #[test]
    fn test_admin_paths() {
        let gate = RouteGate::default();
        assert_eq!(gate.decide(&SessionState::Loading, "/admin/jobs"), GateDecision::Pending);
        assert_eq!(
            gate.decide(&SessionState::Anonymous, "/admin/jobs?pageNumber=2"),
            GateDecision::RedirectToLogin {
                from: "/admin/jobs?pageNumber=2".into()
            }
        );
        assert_eq!(
            gate.decide(&signed_in(UserRole::Editor), "/admin"),
            GateDecision::RedirectHome
        );
        assert_eq!(
            gate.decide(&signed_in(UserRole::Admin), "/admin/users"),
            GateDecision::Allow
        );
    }

    #[test]
    fn test_login_url_round_trip() {
        let gate = RouteGate::default();
        let url = gate.login_url("/admin/jobs?pageNumber=2");
        assert_eq!(url, "/login?from=%2Fadmin%2Fjobs%3FpageNumber%3D2");
        assert_eq!(
            gate.recorded_path(&url).as_deref(),
            Some("/admin/jobs?pageNumber=2")
        );
    }

    #[test]
    fn test_post_login_redirect() {
        let gate = RouteGate::default();
        assert_eq!(gate.post_login_redirect(Some("/admin/jobs")), "/admin/jobs");
        assert_eq!(gate.post_login_redirect(None), DASHBOARD_PATH);
        assert_eq!(gate.post_login_redirect(Some("/login?from=x")), DASHBOARD_PATH);
        assert_eq!(gate.post_login_redirect(Some("https://evil.io")), DASHBOARD_PATH);
        assert_eq!(gate.post_login_redirect(Some("//evil.io")), DASHBOARD_PATH);
    }
}
