///! XML lookup client
///!
///! Session handling follows the QRZ.com flow: reuse the key cached on
///! disk when a cheap DXCC query still accepts it, otherwise log in again
///! and cache the new key.

use std::path::PathBuf;

use async_trait::async_trait;
use reqwest::Client;
use tokio::fs;
use tracing::{debug, error, info};

use super::parser::parse_xml_response;
use super::types::XmlResponse;
use crate::config::LookupCredentials;
use crate::error::{Result, SyncError};
use crate::module::http::post_form;

/// DXCC entity queried to check a cached key (291 = United States)
const VALIDATION_DXCC: &str = "291";

/// Source of precise grid locators.
#[async_trait]
pub trait LocatorLookup: Send + Sync {
    /// Grid locator of `call`, or `None` when the service has none.
    async fn fetch_locator(&self, call: &str) -> Result<Option<String>>;
}

pub struct QrzXmlClient {
    client: Client,
    url: String,
    agent: String,
    credentials: LookupCredentials,
    session_key_file: PathBuf,
    session_key: Option<String>,
}

impl QrzXmlClient {
    pub fn new(
        client: Client,
        url: impl Into<String>,
        agent: impl Into<String>,
        credentials: LookupCredentials,
        session_key_file: impl Into<PathBuf>,
    ) -> Self {
        Self {
            client,
            url: url.into(),
            agent: agent.into(),
            credentials,
            session_key_file: session_key_file.into(),
            session_key: None,
        }
    }

    /// Make sure a usable session key is held, logging in if needed.
    pub async fn get_or_refresh_session(&mut self) -> Result<String> {
        if let Some(key) = &self.session_key {
            return Ok(key.clone());
        }

        let key = match self.credentials.session_key.clone() {
            Some(key) => {
                debug!("Using the provided XML session key");
                key
            }
            None => match self.cached_session_key().await? {
                Some(key) => key,
                None => self.login().await?,
            },
        };

        self.session_key = Some(key.clone());
        Ok(key)
    }

    /// Cached key from disk, if it exists and the service still accepts it.
    async fn cached_session_key(&self) -> Result<Option<String>> {
        let key = match fs::read_to_string(&self.session_key_file).await {
            Ok(content) => content.trim().to_string(),
            Err(_) => {
                debug!("Cache file does not exist");
                return Ok(None);
            }
        };
        if key.is_empty() {
            return Ok(None);
        }
        debug!("Cache file exists, cached key {}", key);
        debug!("Validating xmlkey");

        let response = self
            .query(&[("s", key.as_str()), ("dxcc", VALIDATION_DXCC)])
            .await?;

        match response.session_error() {
            None => {
                debug!("Session key is valid");
                Ok(Some(key))
            }
            Some("Session Timeout") => {
                info!("Cached key is expired");
                Ok(None)
            }
            Some("Invalid session key") => {
                info!("Cached key is no more valid");
                Ok(None)
            }
            Some(e) => {
                error!("An error occured when validating cached key: {}", e);
                Ok(None)
            }
        }
    }

    async fn login(&self) -> Result<String> {
        debug!("Getting a new xmlkey");

        let response = self
            .query(&[
                ("username", self.credentials.username.as_str()),
                ("password", self.credentials.password.as_str()),
                ("agent", self.agent.as_str()),
            ])
            .await?;

        if let Some(e) = response.session_error() {
            return Err(SyncError::Lookup(format!("Error: {}", e)));
        }

        let key = response
            .session_key()
            .ok_or_else(|| {
                SyncError::Lookup("Could not find session key in xml-response".to_string())
            })?
            .to_string();
        info!("Successfully retrieved a new session key");

        fs::write(&self.session_key_file, &key)
            .await
            .map_err(|source| SyncError::SessionCache {
                path: self.session_key_file.clone(),
                source,
            })?;
        debug!("Written session key into {:?}", self.session_key_file);

        Ok(key)
    }

    async fn query(&self, form: &[(&str, &str)]) -> Result<XmlResponse> {
        let body = post_form(&self.client, &self.url, form).await?;
        let response = parse_xml_response(&body);

        if response.session.is_none() {
            debug!("Response body: {}", body);
            return Err(SyncError::Lookup(
                "Could not find session data in xml-response".to_string(),
            ));
        }
        Ok(response)
    }
}

#[async_trait]
impl LocatorLookup for QrzXmlClient {
    async fn fetch_locator(&self, call: &str) -> Result<Option<String>> {
        let key = self
            .session_key
            .as_deref()
            .ok_or_else(|| SyncError::Lookup("No XML session established".to_string()))?;
        let call = call.to_uppercase();

        debug!("Fetching callsign data for {}", call);
        let response = self
            .query(&[("s", key), ("callsign", call.as_str())])
            .await?;

        if let Some(e) = response.session_error() {
            if e.starts_with("Not found") {
                info!("Call {} was not found on qrz.com", call);
                return Ok(None);
            }
            return Err(SyncError::Lookup(format!("Some unhandled error occured: {}", e)));
        }

        let callsign = response.callsign.ok_or_else(|| {
            SyncError::Lookup("Could not find userdata in xml-response".to_string())
        })?;

        Ok(callsign.grid.filter(|grid| !grid.is_empty()))
    }
}
