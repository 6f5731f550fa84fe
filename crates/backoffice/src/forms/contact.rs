use super::{check_email, is_valid_phone, max_chars, optional, require, FieldErrors};
use crate::models::{ContactMessage, NewContactMessage, ReplyPayload};

pub const MIN_MESSAGE_CHARS: usize = 10;
pub const MAX_SUBJECT_CHARS: usize = 150;

/// Public contact form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContactForm {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub company: String,
    pub subject: String,
    pub message: String,
}

impl ContactForm {
    pub fn validate(&self) -> Result<NewContactMessage, FieldErrors> {
        let mut errors = FieldErrors::new();

        require(&mut errors, "name", "Name", &self.name);
        check_email(&mut errors, "email", &self.email);
        let phone = optional(&self.phone);
        if phone.as_deref().is_some_and(|p| !is_valid_phone(p)) {
            errors.add("phone", "Please enter a valid phone number.");
        }
        if require(&mut errors, "subject", "Subject", &self.subject) {
            max_chars(&mut errors, "subject", "Subject", &self.subject, MAX_SUBJECT_CHARS);
        }
        if require(&mut errors, "message", "Message", &self.message)
            && self.message.trim().chars().count() < MIN_MESSAGE_CHARS
        {
            errors.add(
                "message",
                format!("Message must be at least {MIN_MESSAGE_CHARS} characters."),
            );
        }

        errors.finish(|| NewContactMessage {
            name: self.name.trim().to_string(),
            email: self.email.trim().to_string(),
            phone,
            company: optional(&self.company),
            subject: self.subject.trim().to_string(),
            message: self.message.trim().to_string(),
        })
    }
}

/// Admin reply to a contact message.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReplyForm {
    pub subject: String,
    pub body: String,
}

impl ReplyForm {
    /// Pre-fills the subject with `Re: <original subject>`.
    pub fn replying_to(message: &ContactMessage) -> Self {
        let subject = if message.subject.to_ascii_lowercase().starts_with("re:") {
            message.subject.clone()
        } else {
            format!("Re: {}", message.subject)
        };
        Self {
            subject,
            body: String::new(),
        }
    }

    pub fn validate(&self) -> Result<ReplyPayload, FieldErrors> {
        let mut errors = FieldErrors::new();
        if require(&mut errors, "subject", "Subject", &self.subject) {
            max_chars(&mut errors, "subject", "Subject", &self.subject, MAX_SUBJECT_CHARS);
        }
        require(&mut errors, "body", "Reply", &self.body);

        errors.finish(|| ReplyPayload {
            subject: self.subject.trim().to_string(),
            body: self.body.trim().to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filled() -> ContactForm {
        ContactForm {
            name: "Grace".into(),
            email: "grace@example.com".into(),
            phone: String::new(),
            company: "  ".into(),
            subject: "Partnership".into(),
            message: "We would like to talk.".into(),
        }
    }

    #[test]
    fn test_optional_fields_become_none() {
        let msg = filled().validate().unwrap();
        assert!(msg.phone.is_none());
        assert!(msg.company.is_none());
    }

    #[test]
    fn test_short_message_rejected() {
        let mut form = filled();
        form.message = "hi there".into();
        assert_eq!(
            form.validate().unwrap_err().get("message"),
            Some("Message must be at least 10 characters.")
        );
    }

    #[test]
    fn test_bad_optional_phone_rejected() {
        let mut form = filled();
        form.phone = "abc".into();
        assert!(form.validate().unwrap_err().contains("phone"));
    }

    #[test]
    fn test_reply_form() {
        let errors = ReplyForm::default().validate().unwrap_err();
        assert!(errors.contains("subject"));
        assert_eq!(errors.get("body"), Some("Reply is required."));

        let reply = ReplyForm {
            subject: "Re: Partnership".into(),
            body: " Thanks! ".into(),
        }
        .validate()
        .unwrap();
        assert_eq!(reply.body, "Thanks!");
    }
}
