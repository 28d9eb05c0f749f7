//! ADIF line writer

use crate::END_OF_RECORD;
use crate::types::AdifRecord;

/// Render a record back into one ADIF line.
///
/// Each field becomes `<name:len>value ` with the byte length of `value`,
/// followed by the end-of-record marker.
pub fn write_record(record: &AdifRecord) -> String {
    let mut line = String::new();

    for (name, value) in record.fields() {
        line.push_str(&format!(
            "<{}:{}>{} ",
            name.to_ascii_lowercase(),
            value.len(),
            value
        ));
    }
    line.push_str(END_OF_RECORD);

    line
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_record;

    #[test]
    fn test_write_record_format() {
        let mut record = AdifRecord::new();
        record.set("CALL", "DL1ABC");
        record.set("GRIDSQUARE", "JN58TD");

        assert_eq!(
            write_record(&record),
            "<call:6>DL1ABC <gridsquare:6>JN58TD <eor>"
        );
    }

    #[test]
    fn test_write_uses_byte_length() {
        let mut record = AdifRecord::new();
        record.set("NAME", "JÖRG");
        assert_eq!(write_record(&record), "<name:5>JÖRG <eor>");
    }

    #[test]
    fn test_reparse_keeps_fields() {
        let original = parse_record(
            "<call:5>k1abc <gridsquare:4>FN42 <band:3>20m <comment:12> hello there <eor>",
        );
        let reparsed = parse_record(&write_record(&original));

        let before: Vec<_> = original.fields().collect();
        let after: Vec<_> = reparsed.fields().collect();
        assert_eq!(before, after);
    }

    #[test]
    fn test_write_empty_record() {
        assert_eq!(write_record(&AdifRecord::new()), "<eor>");
    }
}
