//! Bearer tokens and the shared credential handle.

use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::{DateTime, TimeZone, Utc};
use secrecy::{ExposeSecret, SecretString};

/// An opaque bearer token.
///
/// JWTs are inspected for their `exp` claim only; the signature is never
/// checked client-side.
#[derive(Clone)]
pub struct BearerToken(SecretString);

impl BearerToken {
    /// Wraps a raw token. Blank input yields `None`.
    pub fn parse(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return None;
        }
        Some(Self(SecretString::from(trimmed.to_string())))
    }

    pub fn expose(&self) -> &str {
        self.0.expose_secret()
    }

    /// `Authorization` header value.
    pub fn header_value(&self) -> String {
        format!("Bearer {}", self.expose())
    }

    /// Expiry from the JWT payload, if the token is a JWT carrying `exp`.
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        let mut parts = self.expose().split('.');
        let (_header, payload, _sig) = (parts.next()?, parts.next()?, parts.next()?);
        let decoded = URL_SAFE_NO_PAD
            .decode(payload.trim_end_matches('='))
            .ok()?;
        let claims: serde_json::Value = serde_json::from_slice(&decoded).ok()?;
        let exp = claims.get("exp")?.as_i64()?;
        Utc.timestamp_opt(exp, 0).single()
    }

    /// Opaque tokens never expire client-side.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at().is_some_and(|exp| exp <= now)
    }
}

impl fmt::Debug for BearerToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("BearerToken([REDACTED])")
    }
}

/// Credential shared between the session and the HTTP backend.
///
/// Clones observe the same token.
#[derive(Clone, Default)]
pub struct Credentials {
    token: Arc<RwLock<Option<BearerToken>>>,
}

impl Credentials {
    pub fn new() -> Self {
        Self::default()
    }

    /// Poisoning is ignored; the guarded `Option` is always valid.
    pub fn set(&self, token: BearerToken) {
        *self.token.write().unwrap_or_else(PoisonError::into_inner) = Some(token);
    }

    pub fn clear(&self) {
        *self.token.write().unwrap_or_else(PoisonError::into_inner) = None;
    }

    pub fn current(&self) -> Option<BearerToken> {
        self.token
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn header_value(&self) -> Option<String> {
        self.current().map(|t| t.header_value())
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("present", &self.current().is_some())
            .finish()
    }
}

#[cfg(test)]
pub(crate) fn jwt_with_exp(exp: i64) -> String {
    let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"HS256","typ":"JWT"}"#);
    let payload = URL_SAFE_NO_PAD.encode(format!(r#"{{"sub":"u-1","exp":{}}}"#, exp));
    format!("{}.{}.signature", header, payload)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_blank_token_rejected() {
        assert!(BearerToken::parse("   ").is_none());
        assert!(BearerToken::parse("").is_none());
    }

    #[test]
    fn test_jwt_expiry() {
        let now = Utc::now();
        let expired = BearerToken::parse(&jwt_with_exp((now - Duration::hours(1)).timestamp()))
            .unwrap();
        assert!(expired.is_expired(now));

        let fresh = BearerToken::parse(&jwt_with_exp((now + Duration::hours(1)).timestamp()))
            .unwrap();
        assert!(!fresh.is_expired(now));
        assert!(fresh.expires_at().is_some());
    }

    #[test]
    fn test_opaque_token_never_expires() {
        let token = BearerToken::parse("opaque-session-token").unwrap();
        assert!(token.expires_at().is_none());
        assert!(!token.is_expired(Utc::now()));
    }

    #[test]
    fn test_debug_is_redacted() {
        let token = BearerToken::parse("super-secret").unwrap();
        assert!(!format!("{:?}", token).contains("super-secret"));
    }

    #[test]
    fn test_credentials_shared_between_clones() {
        let creds = Credentials::new();
        let other = creds.clone();
        creds.set(BearerToken::parse("abc").unwrap());
        assert_eq!(other.header_value().as_deref(), Some("Bearer abc"));
        other.clear();
        assert!(creds.current().is_none());
    }

    #[test]
    fn test_clear_after_poisoned_lock() {
        let creds = Credentials::new();
        creds.set(BearerToken::parse("abc").unwrap());
        let poisoner = creds.clone();
        let _ = std::thread::spawn(move || {
            let _guard = poisoner.token.write().unwrap();
            panic!("poison the credential lock");
        })
        .join();
        assert!(creds.token.is_poisoned());

        creds.clear();
        assert!(creds.header_value().is_none());
        creds.set(BearerToken::parse("def").unwrap());
        assert_eq!(creds.header_value().as_deref(), Some("Bearer def"));
    }
}
