//! Shared test utilities for backoffice integration tests.
//!
//! This module provides:
//! - `FakeApi`, an in-process HTTP backend that records requests
//! - Builders for job records, application forms and configurations

pub mod builders;
pub mod harness;

pub use builders::*;
pub use harness::{FakeApi, RecordedRequest, ADMIN_PASSWORD, ADMIN_TOKEN};
