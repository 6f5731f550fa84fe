//! Form models and synchronous validation.
//!
//! Each form validates into either its request payload or a
//! [`FieldErrors`] map keyed by field name. A form with errors never
//! produces a payload, so it can never reach the network.

pub mod application;
pub mod contact;
pub mod job;
pub mod login;
pub mod submission;
pub mod user;

pub use application::{ApplicationForm, MAX_RESUME_BYTES};
pub use contact::{ContactForm, ReplyForm};
pub use job::JobForm;
pub use login::LoginForm;
pub use submission::ApplicationSubmission;
pub use user::UserForm;

use std::collections::BTreeMap;
use std::fmt;
use std::sync::LazyLock;

use regex::Regex;

static RE_EMAIL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").unwrap());
static RE_PHONE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[0-9+\-() ]{7,20}$").unwrap());
static RE_HTML_TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]*>").unwrap());

/// Validation errors keyed by field name; the first error per field wins.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldErrors {
    errors: BTreeMap<String, String>,
}

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.errors
            .entry(field.to_string())
            .or_insert_with(|| message.into());
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.errors.get(field).map(String::as_str)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.errors.contains_key(field)
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.errors.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// All messages, one sentence each.
    pub fn summary(&self) -> String {
        self.errors
            .values()
            .cloned()
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// `Ok(value)` when no errors were recorded.
    pub fn finish<T>(self, value: impl FnOnce() -> T) -> Result<T, FieldErrors> {
        if self.is_empty() {
            Ok(value())
        } else {
            Err(self)
        }
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let fields: Vec<&str> = self.errors.keys().map(String::as_str).collect();
        write!(f, "invalid fields: {}", fields.join(", "))
    }
}

impl std::error::Error for FieldErrors {}

/// Records `"<label> is required."` when `value` is blank.
pub(crate) fn require(errors: &mut FieldErrors, field: &str, label: &str, value: &str) -> bool {
    if value.trim().is_empty() {
        errors.add(field, format!("{} is required.", label));
        false
    } else {
        true
    }
}

pub(crate) fn max_chars(errors: &mut FieldErrors, field: &str, label: &str, value: &str, max: usize) {
    if value.trim().chars().count() > max {
        errors.add(
            field,
            format!("{} must be at most {} characters.", label, max),
        );
    }
}

pub(crate) fn check_email(errors: &mut FieldErrors, field: &str, value: &str) {
    if require(errors, field, "Email", value) && !is_valid_email(value) {
        errors.add(field, "Please enter a valid email address.");
    }
}

pub fn is_valid_email(value: &str) -> bool {
    RE_EMAIL.is_match(value.trim())
}

pub fn is_valid_phone(value: &str) -> bool {
    let trimmed = value.trim();
    RE_PHONE.is_match(trimmed) && trimmed.chars().any(|c| c.is_ascii_digit())
}

/// Text content of an HTML fragment, tags removed and whitespace trimmed.
pub fn strip_html(html: &str) -> String {
    RE_HTML_TAG
        .replace_all(html, " ")
        .replace("&nbsp;", " ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// `None` for blank input, trimmed text otherwise.
pub(crate) fn optional(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}
