//! Write pipeline
//!
//! One ack per input record, in input order. Each record runs as its own
//! task raced against the commit SLA; a task that misses the deadline is
//! detached, and whatever it later does remotely is never acknowledged.

use super::{AckStream, WriteStats};
use crate::error::{Error, Result};
use crate::record::{put_object, source_is_newer, Record, RecordAck};
use crate::schema::Schema;
use crate::session::{Session, Settings, WriteSettings};
use crate::types::{JsonObject, JsonValue};
use crate::zoho::{WriteEnvelope, ZohoClient};
use futures::stream::{self, BoxStream};
use futures::StreamExt;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tracing::{debug, error, info, info_span, warn, Instrument, Span};

/// Ack error for a record that missed its commit SLA
pub const TIMED_OUT: &str = "timed out";

/// Everything a single record write needs
struct WriteContext {
    client: Arc<ZohoClient>,
    settings: Settings,
    schema: Schema,
}

struct WriteState {
    ctx: Arc<WriteContext>,
    session: Arc<Session>,
    connected: watch::Receiver<bool>,
    input: BoxStream<'static, Result<Record>>,
    commit_sla: Option<Duration>,
    stats: WriteStats,
    done: bool,
    span: Span,
}

/// Write a stream of records back to the schema's module
pub fn write_records(
    client: Arc<ZohoClient>,
    session: Arc<Session>,
    settings: Settings,
    write: WriteSettings,
    input: BoxStream<'static, Result<Record>>,
    job_id: &str,
) -> AckStream {
    let span = info_span!("write", job_id = %job_id);
    let commit_sla = write.commit_sla();

    let state = WriteState {
        ctx: Arc::new(WriteContext {
            client,
            settings,
            schema: write.schema,
        }),
        connected: session.subscribe(),
        session,
        input,
        commit_sla,
        stats: WriteStats::default(),
        done: false,
        span,
    };

    Box::pin(stream::unfold(state, |mut state| {
        let span = state.span.clone();
        async move { next_ack(&mut state).await.map(|item| (item, state)) }.instrument(span)
    }))
}

async fn next_ack(state: &mut WriteState) -> Option<Result<RecordAck>> {
    if state.done {
        return None;
    }
    if !state.session.is_write_configured().await {
        info!("Session is no longer ready for writes");
        return finish(state);
    }

    let next = tokio::select! {
        biased;
        () = disconnected(&mut state.connected) => {
            info!("Session disconnected, stopping write");
            None
        }
        next = state.input.next() => next,
    };

    let record = match next {
        Some(Ok(record)) => record,
        Some(Err(e)) => {
            error!("Failed to read inbound record: {e}");
            finish(state);
            return Some(Err(e));
        }
        None => return finish(state),
    };

    state.stats.received += 1;
    let ack = write_with_deadline(state.ctx.clone(), record, state.commit_sla).await;
    if ack.is_ok() {
        state.stats.written += 1;
    }
    Some(Ok(ack))
}

fn finish(state: &mut WriteState) -> Option<Result<RecordAck>> {
    state.done = true;
    state.stats.finished();
    None
}

/// Resolves once the connected flag is false
async fn disconnected(connected: &mut watch::Receiver<bool>) {
    while *connected.borrow_and_update() {
        if connected.changed().await.is_err() {
            return;
        }
    }
}

/// Run one record write, bounded by the commit SLA
async fn write_with_deadline(
    ctx: Arc<WriteContext>,
    record: Record,
    commit_sla: Option<Duration>,
) -> RecordAck {
    let correlation_id = record.correlation_id.clone();
    let task = tokio::spawn(async move { put_record(&ctx, &record).await }.in_current_span());

    let joined = match commit_sla {
        Some(deadline) => match tokio::time::timeout(deadline, task).await {
            Ok(joined) => joined,
            Err(_) => {
                warn!("Record {correlation_id} {TIMED_OUT} after {deadline:?}");
                return RecordAck::failed(correlation_id, TIMED_OUT);
            }
        },
        None => task.await,
    };

    match joined {
        Ok(Ok(())) => RecordAck::ok(correlation_id),
        Ok(Err(e)) => RecordAck::failed(correlation_id, e.to_string()),
        Err(e) => {
            error!("Write task for {correlation_id} failed: {e}");
            RecordAck::failed(correlation_id, e.to_string())
        }
    }
}

async fn put_record(ctx: &WriteContext, record: &Record) -> Result<()> {
    let payload: JsonObject = serde_json::from_str(&record.data_json).map_err(|e| {
        error!("Invalid record payload {}: {e}", record.data_json);
        Error::from(e)
    })?;

    let module = ctx.schema.module_name();
    let envelope = WriteEnvelope::single(
        put_object(&ctx.schema, &payload),
        ctx.settings.workflow_trigger,
    );

    let response = if ctx.settings.insert_only {
        ctx.client.insert(&module, &envelope).await
    } else {
        check_conflict(ctx, &module, &payload).await?;
        ctx.client.upsert(&module, &envelope).await
    }
    .map_err(|e| {
        error!("Write to {module} failed: {e}");
        e
    })?;

    if let Some(message) = response.first_error() {
        error!("{message}");
        return Err(Error::WriteRejected { message });
    }

    if ctx.settings.insert_only {
        info!("Created 1 record.");
    } else {
        info!("Modified 1 record.");
    }
    Ok(())
}

/// Refuse the write when Zoho holds a version at least as recent
///
/// A record that cannot be fetched has nothing to compare against.
async fn check_conflict(ctx: &WriteContext, module: &str, payload: &JsonObject) -> Result<()> {
    let Some(counter) = ctx.schema.update_counter() else {
        return Ok(());
    };
    let id = match payload.get("id") {
        Some(JsonValue::String(id)) if !id.is_empty() => id.clone(),
        Some(JsonValue::Number(id)) => id.to_string(),
        _ => return Ok(()),
    };

    let Some(source) = ctx.client.record_by_id(module, &id).await.map_err(|e| {
        error!("Failed to fetch {module}/{id} for conflict check: {e}");
        e
    })?
    else {
        debug!("No stored record {module}/{id}");
        return Ok(());
    };

    if source_is_newer(payload, &source, &counter.id).map_err(|e| {
        error!("Could not compare {}: {e}", counter.id);
        e
    })? {
        info!("Source is newer for record {module}/{id}");
        return Err(Error::Conflict);
    }
    Ok(())
}
