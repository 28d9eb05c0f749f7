//! Error types for qrzsync
//!
//! Every fatal condition of a run maps to one variant; `main` turns the
//! variant into the process exit code.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SyncError {
    /// A required key, username or password was not given
    #[error("{what} not specified. Please use either \"{flag}\" or set environment variable \"{env}\".")]
    MissingCredential {
        what: &'static str,
        flag: &'static str,
        env: &'static str,
    },

    #[error("The inputfile {0} does not exist")]
    InputNotFound(PathBuf),

    #[error("Configuration error: {0}")]
    Config(String),

    /// Connection-level failure talking to a remote service
    #[error("Could not connect to {url}: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("The server {url} responded with http-code {status}")]
    HttpStatus { url: String, status: u16 },

    /// The lookup service answered with something we cannot work with
    #[error("Lookup service error: {0}")]
    Lookup(String),

    #[error("Could not write session key cache file {path}: {source}")]
    SessionCache {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Could not read dedup cache {path}: {source}")]
    CacheRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Could not write dedup cache {path}: {source}")]
    CacheWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Could not write failed records into {path}: {source}")]
    FailedRecordsWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Could not empty {path}: {source}")]
    Truncate {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("File I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl SyncError {
    /// Process exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            SyncError::MissingCredential { .. } => 2,
            SyncError::InputNotFound(_) => 3,
            _ => 1,
        }
    }
}

pub type Result<T> = std::result::Result<T, SyncError>;
