///! Record upload pipeline
///!
///! For every record line: dedup check, optional grid enrichment,
///! submission, outcome logging and bookkeeping. Records are handled one
///! after another; the first fatal error stops the run.

use qrzsync_common::{is_record_line, parse_record};
use tracing::{debug, error, info};

use super::dedup::DedupCache;
use super::enrich::enrich_record;
use super::ledger::RunLedger;
use super::logbook::{LogbookApi, SubmitOutcome, classify_response, parse_response};
use super::xml_lookup::LocatorLookup;
use crate::error::Result;

pub struct Pipeline<'a> {
    logbook: &'a dyn LogbookApi,
    lookup: Option<&'a dyn LocatorLookup>,
    cache: DedupCache,
    ledger: RunLedger,
}

impl<'a> Pipeline<'a> {
    pub fn new(
        logbook: &'a dyn LogbookApi,
        lookup: Option<&'a dyn LocatorLookup>,
        cache: DedupCache,
    ) -> Self {
        Self {
            logbook,
            lookup,
            cache,
            ledger: RunLedger::new(),
        }
    }

    /// Feed every record line of an ADIF file through the pipeline.
    pub async fn run<S: AsRef<str>>(&mut self, lines: &[S]) -> Result<()> {
        for line in lines {
            let line = line.as_ref();
            if is_record_line(line) {
                self.process_record(line.trim_end()).await?;
            }
        }
        Ok(())
    }

    /// Handle one raw record line.
    pub async fn process_record(&mut self, raw: &str) -> Result<()> {
        if self.cache.contains(raw) {
            debug!("Record already uploaded, skipping: {}", raw);
            self.ledger.record_ignored();
            return Ok(());
        }

        let adif = enrich_record(raw, self.lookup).await?;
        let outcome = self.submit(&adif).await?;

        // keyed on the line as read, so the next run recognizes it
        if outcome.is_known_to_server() {
            self.cache.insert(raw).await?;
        }
        Ok(())
    }

    /// Send `adif` to the logbook, log the outcome and count it.
    pub async fn submit(&mut self, adif: &str) -> Result<SubmitOutcome> {
        let call = parse_record(adif).call().unwrap_or_default().to_string();
        debug!("Will try to add record \"{}\"", adif);

        let body = self.logbook.insert(adif).await?;
        let outcome = classify_response(&parse_response(&body));

        match &outcome {
            SubmitOutcome::Added => info!("QSO record with {} added", call),
            SubmitOutcome::DuplicateOnServer { reason } => error!(
                "Insert of QSO with {} failed, already in the logbook. Server response was: \"{}\"",
                call, reason
            ),
            SubmitOutcome::Failed { reason } => error!(
                "Insert of QSO with {} failed. Server response was: \"{}\"",
                call, reason
            ),
        }

        self.ledger.record_outcome(&outcome, adif);
        Ok(outcome)
    }

    pub fn ledger(&self) -> &RunLedger {
        &self.ledger
    }

    pub fn cache(&self) -> &DedupCache {
        &self.cache
    }

    pub fn into_ledger(self) -> RunLedger {
        self.ledger
    }
}
