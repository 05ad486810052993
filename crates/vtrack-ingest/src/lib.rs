//! Snapshot ingestion for vtrack.
//!
//! Decodes a one-day performance export, decides which rows are admitted
//! under the view threshold, and hands the admitted rows to the store.

pub mod date_range;
pub mod error;
pub mod filter;
pub mod normalize;
pub mod pipeline;
pub mod types;

pub use date_range::parse_date_range;
pub use error::IngestError;
pub use filter::{filter_admitted, is_admitted};
pub use normalize::{decode_rows, parse_percentage, MAX_COUNT};
pub use pipeline::{
    ingest_snapshot, parse_snapshot, plan_snapshot, read_snapshot_file, IngestReport,
};
pub use types::{RawSnapshot, REQUIRED_COLUMNS};
