///! Logbook API client

use async_trait::async_trait;
use reqwest::Client;

use crate::error::Result;
use crate::module::http::post_form;

/// Remote logbook accepting one ADIF record per call.
#[async_trait]
pub trait LogbookApi: Send + Sync {
    /// Submit one record and return the raw response body.
    async fn insert(&self, adif: &str) -> Result<String>;
}

/// QRZ.com logbook API (`ACTION=INSERT`)
pub struct QrzLogbookClient {
    client: Client,
    url: String,
    api_key: String,
}

impl QrzLogbookClient {
    pub fn new(client: Client, url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            client,
            url: url.into(),
            api_key: api_key.into(),
        }
    }
}

#[async_trait]
impl LogbookApi for QrzLogbookClient {
    async fn insert(&self, adif: &str) -> Result<String> {
        let form = [
            ("KEY", self.api_key.as_str()),
            ("ACTION", "INSERT"),
            ("ADIF", adif),
        ];
        post_form(&self.client, &self.url, &form[..]).await
    }
}
