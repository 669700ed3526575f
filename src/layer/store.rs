//! Layer tree storage
//!
//! Resolves where a channel's tree lives, loads and validates it, and stores
//! uploaded trees. Nothing is cached; every turn reads the source again.

use super::{LayerError, LayerNode};
use crate::config::LayerConfig;
use reqwest::Client;
use std::fmt;
use std::path::{Path, PathBuf};

const SHARED_FILE_STEM: &str = "layer";

/// Where a layer tree is read from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LayerLocation {
    File(PathBuf),
    Url(String),
}

impl fmt::Display for LayerLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LayerLocation::File(path) => write!(f, "{}", path.display()),
            LayerLocation::Url(url) => f.write_str(url),
        }
    }
}

/// Loads channel layer trees from files or URLs
#[derive(Clone)]
pub struct LayerStore {
    config: LayerConfig,
    client: Client,
}

impl LayerStore {
    pub fn new(config: LayerConfig, client: Client) -> Self {
        Self { config, client }
    }

    /// Pick the source for a channel.
    ///
    /// A per-channel URL always wins. Otherwise all-in-one mode uses the
    /// shared URL or shared file, and the default is `<dir>/<channel>.json`.
    pub fn locate(&self, channel_id: i64) -> LayerLocation {
        if let Some(url) = self.config.channel_urls.get(&channel_id) {
            return LayerLocation::Url(url.clone());
        }

        if self.config.all_in_one {
            if let Some(url) = &self.config.shared_url {
                return LayerLocation::Url(url.clone());
            }
            return LayerLocation::File(self.config.dir.join(format!("{SHARED_FILE_STEM}.json")));
        }

        LayerLocation::File(self.config.dir.join(format!("{channel_id}.json")))
    }

    pub async fn load(&self, channel_id: i64) -> Result<LayerNode, LayerError> {
        let location = self.locate(channel_id);
        tracing::debug!(channel_id, location = %location, "Loading layer tree");

        let bytes = match &location {
            LayerLocation::File(path) => read_file(path).await?,
            LayerLocation::Url(url) => self.fetch(url).await?,
        };

        parse(&bytes, &location)
    }

    async fn fetch(&self, url: &str) -> Result<Vec<u8>, LayerError> {
        let fetch_error = |source| LayerError::Fetch {
            location: url.to_string(),
            source,
        };

        let response = self.client.get(url).send().await.map_err(fetch_error)?;
        let status = response.status();
        if !status.is_success() {
            tracing::warn!(url, status = status.as_u16(), "Layer URL did not return a tree");
            return Err(LayerError::ConfigNotFound {
                location: format!("{url} (HTTP {status})"),
            });
        }

        let body = response.bytes().await.map_err(fetch_error)?;
        Ok(body.to_vec())
    }

    /// Validate and store an uploaded tree, returning where it was written.
    ///
    /// In all-in-one mode the upload replaces the shared file whatever its
    /// original name; otherwise the client's file name is kept.
    pub async fn save(&self, filename: &str, bytes: &[u8]) -> Result<PathBuf, LayerError> {
        let name = Path::new(filename)
            .file_name()
            .map(PathBuf::from)
            .ok_or_else(|| LayerError::invalid(filename, "upload has no usable file name"))?;

        let name = if self.config.all_in_one {
            let extension = name
                .extension()
                .and_then(|e| e.to_str())
                .unwrap_or("json");
            PathBuf::from(format!("{SHARED_FILE_STEM}.{extension}"))
        } else {
            name
        };

        let target = self.config.dir.join(name);
        parse(bytes, &LayerLocation::File(target.clone()))?;

        let io_error = |source| LayerError::Io {
            location: target.display().to_string(),
            source,
        };
        tokio::fs::create_dir_all(&self.config.dir)
            .await
            .map_err(io_error)?;
        tokio::fs::write(&target, bytes).await.map_err(io_error)?;

        tracing::info!(path = %target.display(), size = bytes.len(), "Stored layer tree");
        Ok(target)
    }
}

async fn read_file(path: &Path) -> Result<Vec<u8>, LayerError> {
    match tokio::fs::read(path).await {
        Ok(bytes) => Ok(bytes),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(LayerError::ConfigNotFound {
            location: path.display().to_string(),
        }),
        Err(source) => Err(LayerError::Io {
            location: path.display().to_string(),
            source,
        }),
    }
}

/// Parse and validate a tree. An unparseable document is an error, never an
/// empty tree.
pub(crate) fn parse(bytes: &[u8], location: &LayerLocation) -> Result<LayerNode, LayerError> {
    let root: LayerNode =
        serde_json::from_slice(bytes).map_err(|e| LayerError::invalid(location, e.to_string()))?;
    root.validate()
        .map_err(|reason| LayerError::invalid(location, reason))?;
    Ok(root)
}
