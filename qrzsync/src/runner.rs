use std::path::Path;

use tokio::fs;
use tracing::debug;

use crate::config::SyncConfig;
use crate::error::{Result, SyncError};
use crate::module::dedup::DedupCache;
use crate::module::http::build_client;
use crate::module::logbook::{LogbookApi, QrzLogbookClient};
use crate::module::pipeline::Pipeline;
use crate::module::xml_lookup::{LocatorLookup, QrzXmlClient};

/// Read the input file into lines.
pub async fn read_input(path: &Path) -> Result<Vec<String>> {
    let content = fs::read_to_string(path).await.map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            SyncError::InputNotFound(path.to_path_buf())
        } else {
            SyncError::Io(e)
        }
    })?;

    Ok(content.lines().map(str::to_string).collect())
}

/// Upload `lines` with the QRZ.com services named in `config`.
///
/// Returns the exit code of a completed run.
pub async fn execute(config: &SyncConfig, lines: &[String]) -> Result<i32> {
    let service = &config.service;
    let client = build_client(&service.agent, service.request_timeout_secs)?;
    let logbook = QrzLogbookClient::new(client.clone(), &service.api_url, &config.api_key);

    let lookup = match &config.lookup {
        Some(credentials) => {
            let mut xml = QrzXmlClient::new(
                client,
                &service.xml_url,
                &service.agent,
                credentials.clone(),
                &service.session_key_file,
            );
            xml.get_or_refresh_session().await?;
            Some(xml)
        }
        None => {
            debug!("XML lookups not enabled. Will *not* try to enrich QSO grid data.");
            None
        }
    };

    run_records(
        config,
        lines,
        &logbook,
        lookup.as_ref().map(|xml| xml as &dyn LocatorLookup),
    )
    .await
}

/// Run the pipeline over `lines` against the given services, then close
/// the run (failed records file, source truncation, summary).
pub async fn run_records(
    config: &SyncConfig,
    lines: &[String],
    logbook: &dyn LogbookApi,
    lookup: Option<&dyn LocatorLookup>,
) -> Result<i32> {
    let cache = DedupCache::open(&config.cache_file, config.delete_source).await?;
    cache.log_summary();

    let mut pipeline = Pipeline::new(logbook, lookup, cache);
    pipeline.run(lines).await?;

    pipeline
        .into_ledger()
        .finalize(&config.failed_dir, &config.input_file, config.delete_source)
        .await
}
