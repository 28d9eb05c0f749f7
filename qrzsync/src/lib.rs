//! qrzsync uploads ADIF log records to the QRZ.com logbook, optionally
//! filling in precise grid locators from the QRZ.com XML service, and
//! remembers what it already uploaded so repeated runs are cheap.

pub mod config;
pub mod error;
pub mod logging;
pub mod module;
pub mod runner;

pub use config::{Cli, SyncConfig};
pub use error::{Result, SyncError};
