///! Logbook API response types

use std::collections::HashMap;

/// Parsed `KEY=value&KEY=value` answer of the logbook API
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ServerResponse {
    pub params: HashMap<String, String>,
}

impl ServerResponse {
    pub fn get(&self, key: &str) -> Option<&str> {
        self.params.get(key).map(String::as_str)
    }
}

/// How the logbook handled one record
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Record was inserted
    Added,
    /// Rejected because the logbook already holds the record
    DuplicateOnServer { reason: String },
    /// Rejected for any other reason
    Failed { reason: String },
}

impl SubmitOutcome {
    /// Duplicates count as failures for the exit status.
    pub fn is_failure(&self) -> bool {
        !matches!(self, SubmitOutcome::Added)
    }

    /// Whether the record should go into the dedup cache.
    pub fn is_known_to_server(&self) -> bool {
        matches!(
            self,
            SubmitOutcome::Added | SubmitOutcome::DuplicateOnServer { .. }
        )
    }
}
