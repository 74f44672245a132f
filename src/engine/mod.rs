//! Record pipelines
//!
//! Streaming reads from and writes to Zoho, both gated by the shared
//! `Session`.

mod read;
mod write;

pub use read::read_records;
pub use write::{write_records, TIMED_OUT};

use crate::error::Result;
use crate::record::{Record, RecordAck};
use futures::Stream;
use std::pin::Pin;
use tracing::info;

/// Stream of records produced by a read
pub type RecordStream = Pin<Box<dyn Stream<Item = Result<Record>> + Send>>;

/// Stream of acks produced by a write
pub type AckStream = Pin<Box<dyn Stream<Item = Result<RecordAck>> + Send>>;

/// Counters for one write stream
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WriteStats {
    /// Records taken from the input
    pub received: u64,
    /// Records acknowledged without error
    pub written: u64,
}

impl WriteStats {
    /// Log the final counts
    pub fn finished(&self) {
        info!("Wrote {} of {} records", self.written, self.received);
    }
}
