//! Paginated list controller.
//!
//! Owns page number, page size, debounced text filters and a closed-set
//! status filter, and derives the query parameters a list load is issued
//! with. It never holds server data beyond the last load's outcome.

use std::collections::BTreeMap;
use std::future::Future;
use std::time::Duration;

use tokio::time::Instant;

use super::debounce::{Debouncer, DEFAULT_DEBOUNCE};
use crate::api::{ApiError, Result};
use crate::models::params::{to_number, DEFAULT_PAGE_NUMBER, DEFAULT_PAGE_SIZE};
use crate::models::{ListStatus, PaginationEnvelope, ParamValue, QueryParams};

/// URL key the status filter is reflected under.
pub const STATUS_PARAM: &str = "status";
/// URL value meaning "no status filter".
pub const ALL_STATUSES: &str = "all";

pub const JOB_FILTERS: &[&str] = &["search", "department", "location", "jobType", "workArrangement"];
pub const APPLICATION_FILTERS: &[&str] = &["search", "email", "fullName", "country", "jobId"];
pub const CONTACT_FILTERS: &[&str] = &["search", "email", "subject"];
pub const USER_FILTERS: &[&str] = &["search", "email", "role"];

type FilterMap = BTreeMap<String, String>;

/// Outcome of the most recent load the controller accepted.
#[derive(Debug, Clone, PartialEq)]
pub enum FetchState<T> {
    Idle,
    Loading,
    Loaded(PaginationEnvelope<T>),
    Failed(ApiError),
}

/// Parameters a load was issued with.
#[derive(Debug, Clone)]
pub struct LoadTicket {
    pub params: QueryParams,
    seq: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// The response matches the current parameters and is now shown.
    Current,
    /// Parameters moved on while the request was in flight; ignored.
    Superseded,
}

pub struct ListController<T, S: ListStatus> {
    page_number: u32,
    page_size: u32,
    filter_keys: &'static [&'static str],
    raw_filters: FilterMap,
    filters: Debouncer<FilterMap>,
    status: Option<S>,
    fixed: QueryParams,
    state: FetchState<T>,
    seq: u64,
}

impl<T, S: ListStatus> ListController<T, S> {
    pub fn new(filter_keys: &'static [&'static str]) -> Self {
        Self::with_debounce(filter_keys, DEFAULT_DEBOUNCE)
    }

    pub fn with_debounce(filter_keys: &'static [&'static str], delay: Duration) -> Self {
        Self {
            page_number: DEFAULT_PAGE_NUMBER,
            page_size: DEFAULT_PAGE_SIZE,
            filter_keys,
            raw_filters: FilterMap::new(),
            filters: Debouncer::new(FilterMap::new(), delay),
            status: None,
            fixed: QueryParams::new(),
            state: FetchState::Idle,
            seq: 0,
        }
    }

    /// Restores page, size, filters and status from a URL query string.
    ///
    /// Invalid or non-positive page values fall back to the defaults;
    /// restored filters are committed immediately.
    pub fn from_query_string(
        query: &str,
        filter_keys: &'static [&'static str],
        delay: Duration,
    ) -> Self {
        let parsed = QueryParams::parse_query_string(query);
        let mut controller = Self::with_debounce(filter_keys, delay);
        controller.page_number = to_number(
            parsed.get(crate::models::params::PAGE_NUMBER_KEY).map(String::as_str),
            DEFAULT_PAGE_NUMBER,
        );
        controller.page_size = to_number(
            parsed.get(crate::models::params::PAGE_SIZE_KEY).map(String::as_str),
            DEFAULT_PAGE_SIZE,
        );
        let filters: FilterMap = filter_keys
            .iter()
            .filter_map(|key| {
                parsed
                    .get(*key)
                    .filter(|v| !v.is_empty())
                    .map(|v| (key.to_string(), v.clone()))
            })
            .collect();
        controller.raw_filters = filters.clone();
        controller.filters = Debouncer::new(filters, delay);
        controller.status = parsed
            .get(STATUS_PARAM)
            .filter(|s| s.as_str() != ALL_STATUSES)
            .and_then(|s| S::parse(s));
        controller
    }

    /// Sets the initial page size, e.g. from configuration.
    pub fn page_size_default(mut self, page_size: u32) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    /// A parameter sent with every load, e.g. a parent record id.
    pub fn with_fixed(mut self, key: &str, value: impl Into<ParamValue>) -> Self {
        self.fixed.insert(key, value);
        self
    }

    pub fn page_number(&self) -> u32 {
        self.page_number
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    pub fn status(&self) -> Option<S> {
        self.status
    }

    /// What the user typed, before debouncing.
    pub fn raw_filter(&self, key: &str) -> Option<&str> {
        self.raw_filters.get(key).map(String::as_str)
    }

    /// Filters currently applied to loads.
    pub fn committed_filters(&self) -> &BTreeMap<String, String> {
        self.filters.committed()
    }

    pub fn set_page_number(&mut self, page_number: u32) {
        self.page_number = page_number.max(1);
    }

    /// Changes the page size and goes back to the first page.
    pub fn set_page_size(&mut self, page_size: u32) {
        self.page_size = page_size.max(1);
        self.page_number = 1;
    }

    /// Records raw filter text; it is applied once input has been quiet for
    /// the debounce delay. Unknown keys are ignored.
    pub fn update_filter(&mut self, key: &str, value: &str, now: Instant) -> bool {
        if !self.filter_keys.contains(&key) {
            log::warn!("Ignoring unknown list filter '{}'", key);
            return false;
        }
        if value.is_empty() {
            self.raw_filters.remove(key);
        } else {
            self.raw_filters.insert(key.to_string(), value.to_string());
        }
        self.filters.push(self.raw_filters.clone(), now);
        true
    }

    /// Changes the status filter (`None` is "all"); not debounced.
    pub fn set_status(&mut self, status: Option<S>) {
        if self.status != status {
            self.status = status;
            self.page_number = 1;
        }
    }

    /// Commits debounced filters that are due. Returns whether the
    /// effective filters changed, in which case the page is back to 1.
    pub fn tick(&mut self, now: Instant) -> bool {
        if self.filters.poll(now).is_some() {
            self.page_number = 1;
            log::debug!("List filters committed: {:?}", self.filters.committed());
            true
        } else {
            false
        }
    }

    /// When pending filter text will be committed.
    pub fn debounce_deadline(&self) -> Option<Instant> {
        self.filters.deadline()
    }

    /// Waits out the debounce window, then commits.
    pub async fn settle(&mut self) -> bool {
        match self.filters.deadline() {
            Some(deadline) => {
                tokio::time::sleep_until(deadline).await;
                self.tick(Instant::now())
            }
            None => false,
        }
    }

    /// Effective parameters for the next load.
    pub fn query_params(&self) -> QueryParams {
        let mut params = self.fixed.clone();
        params.insert(crate::models::params::PAGE_NUMBER_KEY, self.page_number);
        params.insert(crate::models::params::PAGE_SIZE_KEY, self.page_size);
        for (key, value) in self.filters.committed() {
            params.insert(key.as_str(), value.as_str());
        }
        if let Some(status) = self.status {
            params.insert(S::KEY, status.to_param());
        }
        params
    }

    /// Page state in URL form.
    pub fn to_query_string(&self) -> String {
        let mut params = QueryParams::paged(self.page_number, self.page_size);
        for (key, value) in self.filters.committed() {
            params.insert(key.as_str(), value.as_str());
        }
        if let Some(status) = self.status {
            params.insert(STATUS_PARAM, status.as_str());
        }
        params.canonical()
    }

    pub fn begin_load(&mut self) -> LoadTicket {
        self.seq += 1;
        self.state = FetchState::Loading;
        LoadTicket {
            params: self.query_params(),
            seq: self.seq,
        }
    }

    /// Accepts a response only if it was issued for the current parameters.
    pub fn finish_load(
        &mut self,
        ticket: LoadTicket,
        result: Result<PaginationEnvelope<T>>,
    ) -> LoadOutcome {
        if ticket.params != self.query_params() {
            log::debug!(
                "Dropping superseded list response #{} for {}",
                ticket.seq,
                ticket.params.canonical()
            );
            return LoadOutcome::Superseded;
        }
        self.state = match result {
            Ok(page) => FetchState::Loaded(page),
            Err(e) => FetchState::Failed(e),
        };
        LoadOutcome::Current
    }

    /// Issues one load for the current parameters.
    pub async fn load<F, Fut>(&mut self, fetch: F) -> LoadOutcome
    where
        F: FnOnce(QueryParams) -> Fut,
        Fut: Future<Output = Result<PaginationEnvelope<T>>>,
    {
        let ticket = self.begin_load();
        let result = fetch(ticket.params.clone()).await;
        self.finish_load(ticket, result)
    }

    pub fn state(&self) -> &FetchState<T> {
        &self.state
    }

    pub fn is_loading(&self) -> bool {
        matches!(self.state, FetchState::Loading)
    }

    pub fn error(&self) -> Option<&ApiError> {
        match &self.state {
            FetchState::Failed(e) => Some(e),
            _ => None,
        }
    }

    pub fn data(&self) -> Option<&PaginationEnvelope<T>> {
        match &self.state {
            FetchState::Loaded(page) => Some(page),
            _ => None,
        }
    }
}
