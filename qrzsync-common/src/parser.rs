//! ADIF line reader
//!
//! Splits a record line on `<` and pulls `name` / `value` out of every
//! `name:length>value` chunk. The declared length is ignored; the value runs
//! up to the next `<`. Chunks that do not look like a field are dropped.

use tracing::debug;

use crate::types::AdifRecord;
use crate::{ADIF_HEADER, END_OF_RECORD};

/// Parse one record line into an [`AdifRecord`].
///
/// Never fails: malformed chunks are logged at debug level and skipped.
pub fn parse_record(line: &str) -> AdifRecord {
    let mut record = AdifRecord::with_raw(line);

    for chunk in line.split('<') {
        if chunk.is_empty() || is_marker_chunk(chunk) {
            continue;
        }

        match parse_field(chunk) {
            Some((name, value)) => record.set(name, value),
            None => debug!("Ignoring field: {}", chunk.trim()),
        }
    }

    record
}

/// `eor>` and `eoh>` chunks are markers, not fields.
fn is_marker_chunk(chunk: &str) -> bool {
    chunk
        .get(..4)
        .map(|head| head.eq_ignore_ascii_case("eor>") || head.eq_ignore_ascii_case("eoh>"))
        .unwrap_or(false)
}

fn parse_field(chunk: &str) -> Option<(String, String)> {
    let (tag, rest) = chunk.split_once('>')?;
    let name = tag.split(':').next().unwrap_or_default().trim();

    // the only permitted chars are [A-Za-z0-9_]
    if name.is_empty() || !name.chars().all(is_field_name_char) {
        return None;
    }

    Some((name.to_ascii_uppercase(), rest.trim().to_uppercase()))
}

fn is_field_name_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

/// Whether a line carries a record, i.e. ends in `<eor>` (any case).
pub fn is_record_line(line: &str) -> bool {
    let line = line.trim_end();
    line.len() >= END_OF_RECORD.len()
        && line
            .get(line.len() - END_OF_RECORD.len()..)
            .map(|tail| tail.eq_ignore_ascii_case(END_OF_RECORD))
            .unwrap_or(false)
}

/// A log holding nothing but the header line (or nothing at all).
pub fn is_idle_log<S: AsRef<str>>(lines: &[S]) -> bool {
    lines.iter().all(|line| {
        let line = line.as_ref().trim();
        line.is_empty() || line.ends_with(ADIF_HEADER)
    })
}
