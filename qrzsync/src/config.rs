use std::path::{Path, PathBuf};

use clap::Parser;
use serde::{Deserialize, Serialize};

use crate::error::{Result, SyncError};

/// Command-line arguments for qrzsync
#[derive(Parser, Debug, Clone)]
#[command(name = "qrzsync")]
#[command(about = "Upload ADIF log records into the QRZ.com logbook")]
#[command(version)]
pub struct Cli {
    /// API key for the QRZ.com logbook
    #[arg(short = 'a', long, env = "APIKEY", hide_env_values = true)]
    pub apikey: Option<String>,

    /// Look up missing or coarse grid locators over the QRZ.com XML interface
    #[arg(short = 'x', long)]
    pub xmllookups: bool,

    /// QRZ.com username for XML lookups
    #[arg(short = 'u', long, env = "QRZ_COM_USERNAME")]
    pub username: Option<String>,

    /// QRZ.com password for XML lookups
    #[arg(short = 'p', long, env = "QRZ_COM_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,

    /// Ready-made XML session key; skips the login
    #[arg(long, env = "XMLKEY", hide_env_values = true)]
    pub xmlkey: Option<String>,

    /// ADIF file to upload
    #[arg(short = 'i', long, default_value = "wsjtx_log.adi")]
    pub inputfile: PathBuf,

    /// Log file; "null" disables file logging
    #[arg(short = 'l', long, default_value = "qrzsync.log")]
    pub logfile: String,

    /// Also write the "source file is empty" message into the log file
    #[arg(short = 'e', long = "enable-idle-log")]
    pub enable_idle_log: bool,

    /// Empty the input file after the upload
    #[arg(short = 'd', long)]
    pub delete: bool,

    /// File remembering records that were already uploaded
    #[arg(short = 'c', long, default_value = ".qrzsync_cache")]
    pub cachefile: PathBuf,

    /// Directory receiving the failed records file
    #[arg(long, default_value = ".")]
    pub failed_dir: PathBuf,

    /// TOML file with service endpoints and tuning
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Enable debugging output
    #[arg(long)]
    pub debug: bool,
}

/// Service settings, optionally loaded from a TOML file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    #[serde(default = "default_api_url")]
    pub api_url: String,

    #[serde(default = "default_xml_url")]
    pub xml_url: String,

    #[serde(default = "default_session_key_file")]
    pub session_key_file: PathBuf,

    #[serde(default = "default_agent")]
    pub agent: String,

    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

fn default_api_url() -> String {
    "https://logbook.qrz.com/api".to_string()
}

fn default_xml_url() -> String {
    "http://xmldata.qrz.com/xml/current/".to_string()
}

fn default_session_key_file() -> PathBuf {
    PathBuf::from(".session_key")
}

fn default_agent() -> String {
    format!("qrzsync/{}", env!("CARGO_PKG_VERSION"))
}

fn default_request_timeout_secs() -> u64 {
    30
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            xml_url: default_xml_url(),
            session_key_file: default_session_key_file(),
            agent: default_agent(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

impl ServiceConfig {
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            SyncError::Config(format!("Failed to read config file '{}': {}", path.display(), e))
        })?;

        toml::from_str(&content)
            .map_err(|e| SyncError::Config(format!("Failed to parse config file: {}", e)))
    }
}

/// Credentials for the XML lookup service.
#[derive(Debug, Clone)]
pub struct LookupCredentials {
    pub username: String,
    pub password: String,
    /// Pre-issued session key; when set, no login happens
    pub session_key: Option<String>,
}

/// Fully resolved settings for one run.
#[derive(Debug, Clone)]
pub struct SyncConfig {
    pub api_key: String,
    /// `None` when grid lookups are disabled
    pub lookup: Option<LookupCredentials>,
    pub input_file: PathBuf,
    /// `None` when file logging is disabled
    pub log_file: Option<PathBuf>,
    pub write_idle_log: bool,
    pub delete_source: bool,
    pub cache_file: PathBuf,
    pub failed_dir: PathBuf,
    pub log_level: String,
    pub service: ServiceConfig,
}

impl SyncConfig {
    /// Validate the command line and resolve it into a run configuration.
    pub fn from_cli(cli: Cli) -> Result<Self> {
        let api_key = non_empty(cli.apikey).ok_or(SyncError::MissingCredential {
            what: "API key for qrz.com",
            flag: "-a",
            env: "APIKEY",
        })?;

        let lookup = if cli.xmllookups {
            let session_key = non_empty(cli.xmlkey);
            let username = non_empty(cli.username);
            let password = non_empty(cli.password);

            if session_key.is_none() {
                if username.is_none() {
                    return Err(SyncError::MissingCredential {
                        what: "Username for qrz.com",
                        flag: "-u",
                        env: "QRZ_COM_USERNAME",
                    });
                }
                if password.is_none() {
                    return Err(SyncError::MissingCredential {
                        what: "Password for qrz.com",
                        flag: "-p",
                        env: "QRZ_COM_PASSWORD",
                    });
                }
            }

            Some(LookupCredentials {
                username: username.unwrap_or_default(),
                password: password.unwrap_or_default(),
                session_key,
            })
        } else {
            None
        };

        let service = match &cli.config {
            Some(path) => ServiceConfig::from_file(path)?,
            None => ServiceConfig::default(),
        };

        if !cli.inputfile.is_file() {
            return Err(SyncError::InputNotFound(cli.inputfile));
        }

        let log_file = match cli.logfile.as_str() {
            "null" | "" => None,
            path => Some(PathBuf::from(path)),
        };

        Ok(Self {
            api_key,
            lookup,
            input_file: cli.inputfile,
            log_file,
            write_idle_log: cli.enable_idle_log,
            delete_source: cli.delete,
            cache_file: cli.cachefile,
            failed_dir: cli.failed_dir,
            log_level: if cli.debug { "debug" } else { "info" }.to_string(),
            service,
        })
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
