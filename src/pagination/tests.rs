//! Tests for pagination

use super::*;
use serde_json::json;
use std::collections::HashMap;

fn page(n: &str) -> NextPage {
    NextPage::Continue {
        query_params: HashMap::from([("page".to_string(), n.to_string())]),
    }
}

#[test]
fn test_zoho_paginator_starts_at_page_one() {
    let paginator = PageNumberPaginator::zoho();
    let mut state = PaginationState::default();

    let params = paginator.initial_params(&mut state);
    assert_eq!(params.get("page"), Some(&"1".to_string()));
    assert_eq!(state.page, 1);
}

#[test]
fn test_zoho_paginator_follows_more_records() {
    let paginator = PageNumberPaginator::zoho();
    let mut state = PaginationState::default();
    paginator.initial_params(&mut state);

    let body = json!({"data": [{}, {}], "info": {"more_records": true, "page": 1}});
    assert_eq!(paginator.process_response(&body, 2, &mut state), page("2"));
    assert_eq!(paginator.process_response(&body, 2, &mut state), page("3"));
    assert_eq!(state.page, 3);
}

#[test]
fn test_zoho_paginator_stops_when_flag_false_or_missing() {
    let paginator = PageNumberPaginator::zoho();

    let mut state = PaginationState { page: 3 };
    let body = json!({"data": [{}], "info": {"more_records": false}});
    assert_eq!(paginator.process_response(&body, 1, &mut state), NextPage::Done);
    assert_eq!(state.page, 3);

    let body = json!({"data": [{}], "info": {"more_records": "true"}});
    assert_eq!(paginator.process_response(&body, 1, &mut state), NextPage::Done);

    let body = json!({"data": [{}]});
    assert_eq!(paginator.process_response(&body, 1, &mut state), NextPage::Done);
}

#[test]
fn test_empty_page_stops_even_with_flag() {
    let paginator = PageNumberPaginator::zoho();
    let mut state = PaginationState { page: 1 };

    let body = json!({"data": [], "info": {"more_records": true}});
    assert_eq!(paginator.process_response(&body, 0, &mut state), NextPage::Done);
}

#[test]
fn test_extract_path() {
    let body = json!({"info": {"more_records": true, "count": 2}});

    assert_eq!(extract_path(&body, "info.more_records"), Some(&json!(true)));
    assert_eq!(extract_path(&body, "info.count"), Some(&json!(2)));
    assert_eq!(extract_path(&body, "info.missing"), None);
    assert_eq!(extract_path(&body, "info.count.deeper"), None);
}
