///! Shared form-post helper for the QRZ.com services

use std::time::Duration;

use reqwest::Client;

use crate::error::{Result, SyncError};

/// Build the HTTP client used for every request of a run.
pub fn build_client(agent: &str, timeout_secs: u64) -> Result<Client> {
    Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .user_agent(agent)
        .build()
        .map_err(|e| SyncError::Config(format!("Failed to build HTTP client: {}", e)))
}

/// POST `form` to `url` and return the body of a 200 response.
///
/// Connection problems and any other status are errors; there is no retry.
pub async fn post_form<T>(client: &Client, url: &str, form: &T) -> Result<String>
where
    T: serde::Serialize + ?Sized,
{
    let response = client
        .post(url)
        .form(form)
        .send()
        .await
        .map_err(|source| SyncError::Transport {
            url: url.to_string(),
            source,
        })?;

    let status = response.status();
    if status != reqwest::StatusCode::OK {
        return Err(SyncError::HttpStatus {
            url: url.to_string(),
            status: status.as_u16(),
        });
    }

    response.text().await.map_err(|source| SyncError::Transport {
        url: url.to_string(),
        source,
    })
}
