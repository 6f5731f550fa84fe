//! Filter and pagination state for list screens.

pub mod debounce;
pub mod list;

pub use crate::models::params::{clean, to_number};
pub use debounce::{spawn_debounced, Debouncer, DEFAULT_DEBOUNCE};
pub use list::{
    FetchState, ListController, LoadOutcome, LoadTicket, APPLICATION_FILTERS, CONTACT_FILTERS,
    JOB_FILTERS, USER_FILTERS,
};

use crate::models::{
    ApplicationStatus, ContactMessage, ContactStatus, JobApplication, JobPosting, JobState,
    UserAccount, UserState,
};

pub type JobListController = ListController<JobPosting, JobState>;
pub type ApplicationListController = ListController<JobApplication, ApplicationStatus>;
pub type ContactListController = ListController<ContactMessage, ContactStatus>;
pub type UserListController = ListController<UserAccount, UserState>;
