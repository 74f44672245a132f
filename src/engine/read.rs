//! Read pipeline
//!
//! Pages through a module listing and yields one record per row. The
//! stream ends when Zoho reports no more pages, when the limit is reached,
//! when a page comes back empty or unsuccessful, or when the session
//! disconnects. Only transport and authentication failures are surfaced
//! as errors.

use super::RecordStream;
use crate::error::Result;
use crate::pagination::{NextPage, PageNumberPaginator, PaginationState};
use crate::record::{record_from_source, Record};
use crate::schema::Schema;
use crate::session::Session;
use crate::types::{JsonObject, JsonValue};
use crate::zoho::ZohoClient;
use futures::stream;
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use tracing::{debug, error, info, info_span, Instrument, Span};

struct ReadState {
    client: Arc<ZohoClient>,
    session: Arc<Session>,
    schema: Schema,
    module: String,
    paginator: PageNumberPaginator,
    pagination: PaginationState,
    next_params: Option<HashMap<String, String>>,
    buffer: VecDeque<JsonObject>,
    limit: Option<u64>,
    emitted: u64,
    span: Span,
}

/// Stream the records of a schema's module
///
/// A `limit` of `None` reads everything.
pub fn read_records(
    client: Arc<ZohoClient>,
    session: Arc<Session>,
    schema: Schema,
    limit: Option<u64>,
    job_id: &str,
) -> RecordStream {
    let span = info_span!("read", job_id = %job_id);
    let module = schema.module_name();
    let paginator = PageNumberPaginator::zoho();
    let mut pagination = PaginationState::default();
    let next_params = Some(paginator.initial_params(&mut pagination));

    span.in_scope(|| info!("Publishing records for schema: {}", schema.name));

    let state = ReadState {
        client,
        session,
        schema,
        module,
        paginator,
        pagination,
        next_params,
        buffer: VecDeque::new(),
        limit,
        emitted: 0,
        span,
    };

    Box::pin(stream::unfold(state, |mut state| {
        let span = state.span.clone();
        async move { next_record(&mut state).await.map(|item| (item, state)) }.instrument(span)
    }))
}

async fn next_record(state: &mut ReadState) -> Option<Result<Record>> {
    loop {
        if state.limit.is_some_and(|limit| state.emitted >= limit) {
            info!("Published {} records (limit reached)", state.emitted);
            return None;
        }

        if !state.session.is_connected() {
            info!(
                "Session disconnected, stopping after {} records",
                state.emitted
            );
            return None;
        }

        if let Some(raw) = state.buffer.pop_front() {
            let data = record_from_source(&state.schema, &raw);
            state.emitted += 1;
            return Some(Ok(Record::upsert(JsonValue::Object(data).to_string())));
        }

        let Some(params) = state.next_params.take() else {
            info!("Published {} records", state.emitted);
            return None;
        };

        match state.client.records_page(&state.module, params).await {
            Ok(Some(body)) => {
                let rows: Vec<JsonObject> = body
                    .get("data")
                    .and_then(JsonValue::as_array)
                    .map(|rows| rows.iter().filter_map(|row| row.as_object().cloned()).collect())
                    .unwrap_or_default();

                debug!(
                    "Page {}: fetched {} records",
                    state.pagination.page,
                    rows.len()
                );

                if let NextPage::Continue { query_params } =
                    state
                        .paginator
                        .process_response(&body, rows.len(), &mut state.pagination)
                {
                    state.next_params = Some(query_params);
                }
                state.buffer.extend(rows);
            }
            Ok(None) => {
                info!("No records for: {}", state.schema.name);
                return None;
            }
            Err(e) => {
                error!("Failed to read {}: {e}", state.module);
                return Some(Err(e));
            }
        }
    }
}
