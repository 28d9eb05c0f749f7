///! QRZ.com logbook submission
///!
///! Sends one ADIF record per request to the logbook API and classifies
///! the `KEY=value&...` answer.

pub mod client;
pub mod parser;
pub mod types;

pub use client::{LogbookApi, QrzLogbookClient};
pub use parser::{classify_response, parse_response};
pub use types::{ServerResponse, SubmitOutcome};
