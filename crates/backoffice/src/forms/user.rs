use super::{check_email, max_chars, require, FieldErrors};
use crate::models::{UserAccount, UserRole, UserUpdate};

const MAX_NAME_CHARS: usize = 60;

/// Admin edit form for another user's profile.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserForm {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub role: String,
}

impl UserForm {
    pub fn from_user(user: &UserAccount) -> Self {
        Self {
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            email: user.email.clone(),
            role: user.role.as_str().to_string(),
        }
    }

    pub fn validate(&self) -> Result<UserUpdate, FieldErrors> {
        let mut errors = FieldErrors::new();
        if require(&mut errors, "firstName", "First name", &self.first_name) {
            max_chars(&mut errors, "firstName", "First name", &self.first_name, MAX_NAME_CHARS);
        }
        if require(&mut errors, "lastName", "Last name", &self.last_name) {
            max_chars(&mut errors, "lastName", "Last name", &self.last_name, MAX_NAME_CHARS);
        }
        check_email(&mut errors, "email", &self.email);

        let role = match self.role.trim().parse::<UserRole>() {
            Ok(role) => role,
            Err(_) => {
                errors.add("role", "Please select a role.");
                return Err(errors);
            }
        };

        errors.finish(|| UserUpdate {
            first_name: self.first_name.trim().to_string(),
            last_name: self.last_name.trim().to_string(),
            email: self.email.trim().to_string(),
            role,
        })
    }
}
