use secrecy::{ExposeSecret, SecretString};

use super::{check_email, FieldErrors};
use crate::models::LoginRequest;

#[derive(Debug, Clone, Default)]
pub struct LoginForm {
    pub email: String,
    pub password: SecretString,
}

impl LoginForm {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: SecretString::from(password.into()),
        }
    }

    pub fn validate(&self) -> Result<LoginRequest, FieldErrors> {
        let mut errors = FieldErrors::new();
        check_email(&mut errors, "email", &self.email);
        if self.password.expose_secret().is_empty() {
            errors.add("password", "Password is required.");
        }
        errors.finish(|| LoginRequest::new(self.email.trim(), self.password.clone()))
    }
}
