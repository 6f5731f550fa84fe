use super::pagination::PaginationFooter;
use crate::controller::{FetchState, ListController};
use crate::models::{ListStatus, PaginationEnvelope};

/// What a paginated table shows.
#[derive(Debug, Clone, PartialEq)]
pub enum ListView<R> {
    /// Placeholder rows, one per row of the requested page.
    Loading { skeleton_rows: u32 },
    Failed { message: String },
    Empty,
    Rows { rows: Vec<R>, footer: PaginationFooter },
}

impl<R> ListView<R> {
    pub fn from_page<T>(page: &PaginationEnvelope<T>, row: impl FnMut(&T) -> R) -> Self {
        if page.data.is_empty() {
            return ListView::Empty;
        }
        ListView::Rows {
            rows: page.data.iter().map(row).collect(),
            footer: PaginationFooter::from_envelope(page),
        }
    }

    /// Renders the controller's current state, mapping each item to a row.
    ///
    /// A controller that has not loaded yet shows skeleton rows.
    pub fn from_controller<T, S: ListStatus>(
        controller: &ListController<T, S>,
        row: impl FnMut(&T) -> R,
    ) -> Self {
        match controller.state() {
            FetchState::Idle | FetchState::Loading => ListView::Loading {
                skeleton_rows: controller.page_size(),
            },
            FetchState::Failed(e) => ListView::Failed {
                message: e.user_message(),
            },
            FetchState::Loaded(page) => Self::from_page(page, row),
        }
    }

    pub fn rows(&self) -> &[R] {
        match self {
            ListView::Rows { rows, .. } => rows,
            _ => &[],
        }
    }

    pub fn footer(&self) -> Option<&PaginationFooter> {
        match self {
            ListView::Rows { footer, .. } => Some(footer),
            _ => None,
        }
    }
}
