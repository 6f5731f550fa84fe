//! Presentation view-models for list screens.

pub mod badge;
pub mod list;
pub mod pagination;

pub use badge::{Badge, StatusTone, Tone};
pub use list::ListView;
pub use pagination::{page_window, PageItem, PaginationFooter};
