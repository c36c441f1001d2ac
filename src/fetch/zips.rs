use reqwest::Client;
use tracing::debug;
use url::Url;

use crate::error::{MetricError, Result};

/// Download the given ZIP URL into memory. The archives are a few megabytes,
/// so the whole body is buffered rather than streamed to disk.
pub async fn download_zip(client: &Client, url_str: &str) -> Result<Vec<u8>> {
    let url = Url::parse(url_str).map_err(|e| {
        MetricError::UpstreamUnavailable(format!("bad resource URL {:?}: {}", url_str, e))
    })?;

    debug!(%url, "downloading ZIP");
    let resp = client.get(url).send().await?.error_for_status()?;
    let body = resp.bytes().await?;
    debug!(bytes = body.len(), "ZIP downloaded");

    Ok(body.to_vec())
}
