/// Catalog loading from local files and HTTP endpoints
use super::Catalog;
use crate::error::{LectureSearchError, Result};
use reqwest::Client;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info};
use url::Url;

/// Where the chapters JSON lives
#[derive(Debug, Clone, PartialEq)]
pub enum CatalogSource {
    File(PathBuf),
    Http(Url),
}

impl CatalogSource {
    /// Classify a source string: http(s) URLs are fetched, anything else is a path
    pub fn parse(source: &str) -> Result<Self> {
        let source = source.trim();
        if source.is_empty() {
            return Err(LectureSearchError::InvalidSource("empty catalog source".to_string()));
        }

        match Url::parse(source) {
            Ok(url) if url.scheme() == "http" || url.scheme() == "https" => Ok(CatalogSource::Http(url)),
            Ok(url) if url.scheme() == "file" => url
                .to_file_path()
                .map(CatalogSource::File)
                .map_err(|_| LectureSearchError::InvalidSource(source.to_string())),
            // Windows drive letters parse as a one-letter scheme
            Ok(url) if url.scheme().len() > 1 => Err(LectureSearchError::InvalidSource(format!(
                "unsupported scheme '{}' in {}",
                url.scheme(),
                source
            ))),
            _ => Ok(CatalogSource::File(PathBuf::from(source))),
        }
    }

    /// Human readable location for messages
    pub fn location(&self) -> String {
        match self {
            CatalogSource::File(path) => path.display().to_string(),
            CatalogSource::Http(url) => url.to_string(),
        }
    }

    /// Load and parse the catalog once; no retries, no partial loads
    pub async fn load(&self, timeout_seconds: u64) -> Result<Catalog> {
        let body = match self {
            CatalogSource::File(path) => read_file(path).await?,
            CatalogSource::Http(url) => fetch(url, timeout_seconds).await?,
        };

        let catalog = Catalog::from_json(&body)?;
        info!("📚 Loaded {} chapters from {}", catalog.len(), self.location());
        Ok(catalog)
    }
}

async fn read_file(path: &Path) -> Result<String> {
    debug!("Reading catalog file {}", path.display());
    tokio::fs::read_to_string(path)
        .await
        .map_err(|e| LectureSearchError::CatalogLoad {
            location: path.display().to_string(),
            reason: e.to_string(),
        })
}

async fn fetch(url: &Url, timeout_seconds: u64) -> Result<String> {
    debug!("Fetching catalog from {}", url);
    let client = Client::builder()
        .timeout(Duration::from_secs(timeout_seconds))
        .user_agent(concat!("lecture-search/", env!("CARGO_PKG_VERSION")))
        .build()?;

    let response = client.get(url.clone()).send().await?;
    let status = response.status();
    if !status.is_success() {
        return Err(LectureSearchError::CatalogLoad {
            location: url.to_string(),
            reason: format!("HTTP {}", status),
        });
    }

    Ok(response.text().await?)
}
