//! Pagination module
//!
//! The record listing endpoints are paged by number. The paginator turns
//! each response into the query parameters of the next request, or `Done`.

mod page_number;
mod types;

pub use page_number::PageNumberPaginator;
pub use types::{extract_path, NextPage, PaginationState};

#[cfg(test)]
mod tests;
