use crate::models::{ApplicationStatus, ContactStatus, JobState, ListStatus, UserState};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Neutral,
    Info,
    Success,
    Warning,
    Danger,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Badge {
    pub label: &'static str,
    pub tone: Tone,
}

/// Statuses that render as a coloured badge.
pub trait StatusTone: ListStatus {
    fn tone(&self) -> Tone;

    fn badge(&self) -> Badge {
        Badge {
            label: self.label(),
            tone: self.tone(),
        }
    }
}

impl StatusTone for ApplicationStatus {
    fn tone(&self) -> Tone {
        match self {
            ApplicationStatus::New => Tone::Info,
            ApplicationStatus::InReview => Tone::Warning,
            ApplicationStatus::Shortlisted => Tone::Info,
            ApplicationStatus::Rejected => Tone::Danger,
            ApplicationStatus::Hired => Tone::Success,
        }
    }
}

impl StatusTone for ContactStatus {
    fn tone(&self) -> Tone {
        match self {
            ContactStatus::New => Tone::Info,
            ContactStatus::Read | ContactStatus::InReview => Tone::Warning,
            ContactStatus::Replied | ContactStatus::Resolved => Tone::Success,
            ContactStatus::Closed | ContactStatus::Archived => Tone::Neutral,
        }
    }
}

impl StatusTone for JobState {
    fn tone(&self) -> Tone {
        match self {
            JobState::Open => Tone::Success,
            JobState::Closed => Tone::Neutral,
        }
    }
}

impl StatusTone for UserState {
    fn tone(&self) -> Tone {
        match self {
            UserState::Active => Tone::Success,
            UserState::Inactive => Tone::Danger,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_badges_use_display_labels() {
        assert_eq!(
            ApplicationStatus::InReview.badge(),
            Badge {
                label: "In Review",
                tone: Tone::Warning
            }
        );
        assert_eq!(ContactStatus::Archived.badge().tone, Tone::Neutral);
        assert_eq!(UserState::Inactive.badge().tone, Tone::Danger);
    }
}
