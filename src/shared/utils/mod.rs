pub mod timestamp;

pub use timestamp::{format_stored_timestamp, parse_stored_timestamp, StoredTimestamp};
