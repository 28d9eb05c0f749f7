//! Shared ADIF record handling for qrzsync.
//!
//! Contains the record type plus the line-level reader and writer used by
//! the upload pipeline.

pub mod parser;
pub mod types;
pub mod writer;

pub use parser::{is_idle_log, is_record_line, parse_record};
pub use types::AdifRecord;
pub use writer::write_record;

/// Header line written at the top of every ADIF file this tool produces.
pub const ADIF_HEADER: &str = "ADIF Export<eoh>";

/// End-of-record marker terminating each record line.
pub const END_OF_RECORD: &str = "<eor>";
