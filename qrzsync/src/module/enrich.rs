///! Grid locator enrichment
///!
///! Records logged with a missing or 4-character grid square get the
///! precise locator from the lookup service, when one is configured.

use qrzsync_common::types::field;
use qrzsync_common::{parse_record, write_record};
use tracing::{debug, info};

use super::xml_lookup::LocatorLookup;
use crate::error::Result;

/// Locators this short only name a coarse square
pub const COARSE_LOCATOR_LEN: usize = 4;
/// Shortest lookup result accepted as a replacement
pub const PRECISE_LOCATOR_LEN: usize = 6;

/// Whether a record's grid square is missing or too coarse.
pub fn needs_locator(gridsquare: Option<&str>) -> bool {
    gridsquare.map_or(true, |grid| grid.len() <= COARSE_LOCATOR_LEN)
}

/// Return the ADIF text to submit for `raw`.
///
/// That is `raw` itself unless a lookup produced a precise locator, in
/// which case the record is rewritten with the new `GRIDSQUARE`.
pub async fn enrich_record(raw: &str, lookup: Option<&dyn LocatorLookup>) -> Result<String> {
    let Some(lookup) = lookup else {
        return Ok(raw.to_string());
    };

    let mut record = parse_record(raw);
    if !needs_locator(record.gridsquare()) {
        return Ok(raw.to_string());
    }

    let Some(call) = record.call().map(str::to_string) else {
        debug!("Record has no call; not enriching: {}", raw);
        return Ok(raw.to_string());
    };

    let current = record
        .gridsquare()
        .filter(|grid| !grid.is_empty())
        .unwrap_or("(not provided)")
        .to_string();
    debug!("Will try to enrich grid locator data for {}", call);
    debug!("Grid locator from source file: {}", current);

    let locator = lookup.fetch_locator(&call).await?.unwrap_or_default();
    if locator.len() < PRECISE_LOCATOR_LEN {
        info!("No precise locator data found; leaving record untouched");
        return Ok(raw.to_string());
    }

    info!("Updating {} locator from {} to {}", call, current, locator);
    record.set(field::GRIDSQUARE, locator);

    let enriched = write_record(&record);
    debug!("Old record: {}", raw);
    debug!("New record: {}", enriched);
    Ok(enriched)
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex;

    struct FixedLookup {
        grid: Option<String>,
        calls: Mutex<Vec<String>>,
    }

    impl FixedLookup {
        fn new(grid: Option<&str>) -> Self {
            Self {
                grid: grid.map(str::to_string),
                calls: Mutex::new(Vec::new()),
            }
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl LocatorLookup for FixedLookup {
        async fn fetch_locator(&self, call: &str) -> Result<Option<String>> {
            self.calls.lock().unwrap().push(call.to_string());
            Ok(self.grid.clone())
        }
    }

    #[test]
    fn test_needs_locator_threshold() {
        assert!(needs_locator(None));
        assert!(needs_locator(Some("")));
        assert!(needs_locator(Some("JN58")));
        assert!(!needs_locator(Some("JN58t")));
        assert!(!needs_locator(Some("JN58td12")));
    }

    #[tokio::test]
    async fn test_coarse_locator_is_replaced() {
        let lookup = FixedLookup::new(Some("JN58td"));
        let raw = "<call:6>dl1abc <gridsquare:4>JN58 <eor>";

        let enriched = enrich_record(raw, Some(&lookup)).await.unwrap();
        assert_eq!(enriched, "<call:6>DL1ABC <gridsquare:6>JN58td <eor>");
        assert_eq!(lookup.calls(), vec!["DL1ABC"]);
    }

    #[tokio::test]
    async fn test_precise_locator_skips_lookup() {
        let lookup = FixedLookup::new(Some("JN58td"));
        let raw = "<call:6>DL1ABC <gridsquare:8>JN58td12 <eor>";

        let enriched = enrich_record(raw, Some(&lookup)).await.unwrap();
        assert_eq!(enriched, raw);
        assert!(lookup.calls().is_empty());
    }

    #[tokio::test]
    async fn test_short_lookup_result_is_rejected() {
        let lookup = FixedLookup::new(Some("JN58t"));
        let raw = "<call:6>DL1ABC <gridsquare:4>JN58 <eor>";

        let enriched = enrich_record(raw, Some(&lookup)).await.unwrap();
        assert_eq!(enriched, raw);
        assert_eq!(lookup.calls().len(), 1);
    }

    #[tokio::test]
    async fn test_missing_locator_is_added() {
        let lookup = FixedLookup::new(Some("FN42aa"));
        let raw = "<call:5>K1ABC <mode:3>FT8 <eor>";

        let enriched = enrich_record(raw, Some(&lookup)).await.unwrap();
        assert_eq!(enriched, "<call:5>K1ABC <mode:3>FT8 <gridsquare:6>FN42aa <eor>");
    }

    #[tokio::test]
    async fn test_not_found_keeps_record() {
        let lookup = FixedLookup::new(None);
        let raw = "<call:5>K1ABC <eor>";
        assert_eq!(enrich_record(raw, Some(&lookup)).await.unwrap(), raw);
    }

    #[tokio::test]
    async fn test_without_lookup_passes_through() {
        let raw = "<call:5>K1ABC <gridsquare:4>FN42 <eor>";
        assert_eq!(enrich_record(raw, None).await.unwrap(), raw);
    }
}
