//! Records and payload mapping

mod mapping;
mod types;

pub use mapping::{
    parse_timestamp, put_object, record_from_source, source_is_newer, DATA_ENVELOPE,
};
pub use types::{Record, RecordAck, RecordAction};

#[cfg(test)]
mod tests;
