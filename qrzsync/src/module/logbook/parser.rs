///! Logbook API response parser

use super::types::{ServerResponse, SubmitOutcome};

const NO_REASON: &str = "No failure reasons provided by server";
const UNRECOGNIZED: &str = "Unrecognized server response";

/// Split a `KEY=value&KEY=value` body into its pairs.
///
/// Each pair is split at its first `=`; pieces without `=` are ignored.
pub fn parse_response(body: &str) -> ServerResponse {
    let params = body
        .trim()
        .split('&')
        .filter_map(|pair| pair.split_once('='))
        .map(|(key, value)| (key.trim().to_string(), value.trim().to_string()))
        .collect();

    ServerResponse { params }
}

/// Decide what happened to a submitted record.
pub fn classify_response(response: &ServerResponse) -> SubmitOutcome {
    if let Some(result) = response.get("RESULT") {
        if result == "OK" {
            return SubmitOutcome::Added;
        }
        return rejected(failure_reason(response));
    }

    match response.get("STATUS") {
        Some("FAIL") | Some("AUTH") => rejected(failure_reason(response)),
        _ => SubmitOutcome::Failed {
            reason: UNRECOGNIZED.to_string(),
        },
    }
}

fn failure_reason(response: &ServerResponse) -> String {
    let mut reason = response.get("REASON").unwrap_or(NO_REASON).to_string();
    if let Some(extended) = response.get("EXTENDED") {
        reason.push(' ');
        reason.push_str(extended);
    }
    reason
}

fn rejected(reason: String) -> SubmitOutcome {
    if reason.to_lowercase().contains("duplicate") {
        SubmitOutcome::DuplicateOnServer { reason }
    } else {
        SubmitOutcome::Failed { reason }
    }
}
