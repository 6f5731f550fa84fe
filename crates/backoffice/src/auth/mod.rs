//! Session, credentials and admin route gating.

pub mod gate;
pub mod session;
pub mod token;

pub use gate::{GateDecision, RouteGate, DASHBOARD_PATH, LOGIN_PATH};
pub use session::{AuthSession, SessionState, SESSION_TOKEN_KEY, SESSION_USER_KEY};
pub use token::{BearerToken, Credentials};
