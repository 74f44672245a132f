//! Page number pagination
//!
//! Zoho pages start at 1 and report `info.more_records` on every page.

use super::types::{extract_path, NextPage, PaginationState};
use serde_json::Value;
use std::collections::HashMap;

const PAGE_PARAM: &str = "page";
const START_PAGE: u32 = 1;
const MORE_RECORDS: &str = "info.more_records";

/// Page counter for Zoho record listings
#[derive(Debug, Clone, Copy, Default)]
pub struct PageNumberPaginator;

impl PageNumberPaginator {
    /// Paginator for Zoho record listings
    pub fn zoho() -> Self {
        Self
    }

    /// Query parameters for the first request
    pub fn initial_params(&self, state: &mut PaginationState) -> HashMap<String, String> {
        if state.page == 0 {
            state.page = START_PAGE;
        }
        params_for(state.page)
    }

    /// Continue only while the page had rows and `more_records` is true
    pub fn process_response(
        &self,
        body: &Value,
        records_count: usize,
        state: &mut PaginationState,
    ) -> NextPage {
        let more = matches!(extract_path(body, MORE_RECORDS), Some(Value::Bool(true)));
        if records_count == 0 || !more {
            return NextPage::Done;
        }

        state.page += 1;
        NextPage::Continue {
            query_params: params_for(state.page),
        }
    }
}

fn params_for(page: u32) -> HashMap<String, String> {
    HashMap::from([(PAGE_PARAM.to_string(), page.to_string())])
}
