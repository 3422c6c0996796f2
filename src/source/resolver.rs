//! Source resolution for PDF data
//!
//! Resolution only fetches bytes. Whether those bytes are a usable PDF is decided
//! by the rendering engine when the document is opened.

use crate::error::{Error, Result};
use futures_util::StreamExt;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Identity of one activation of a document source.
///
/// Every resolution mints a fresh id, so selecting the same file twice still yields
/// two distinct sources.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SourceId(uuid::Uuid);

impl SourceId {
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4())
    }
}

impl Default for SourceId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Where the active PDF came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocumentSource {
    /// The bundled resume (file path or URL)
    Default { location: String },
    /// A file the user picked
    Uploaded { path: PathBuf },
}

impl DocumentSource {
    /// Human readable name for logs and the header
    pub fn name(&self) -> String {
        match self {
            DocumentSource::Default { location } => location.clone(),
            DocumentSource::Uploaded { path } => path.display().to_string(),
        }
    }

    pub fn is_default(&self) -> bool {
        matches!(self, DocumentSource::Default { .. })
    }
}

/// Resolved PDF data
#[derive(Debug, Clone)]
pub struct ResolvedPdf {
    pub id: SourceId,
    pub source: DocumentSource,
    pub data: Arc<Vec<u8>>,
}

impl ResolvedPdf {
    fn new(source: DocumentSource, data: Vec<u8>) -> Self {
        Self {
            id: SourceId::new(),
            source,
            data: Arc::new(data),
        }
    }

    pub fn source_name(&self) -> String {
        self.source.name()
    }
}

fn read_file(path: &Path) -> Result<Vec<u8>> {
    if !path.exists() {
        return Err(Error::PdfNotFound {
            path: path.display().to_string(),
        });
    }

    std::fs::read(path).map_err(Error::Io)
}

/// Resolve a user-selected file
pub fn resolve_path<P: AsRef<Path>>(path: P) -> Result<ResolvedPdf> {
    let path = path.as_ref();
    let data = read_file(path)?;

    Ok(ResolvedPdf::new(
        DocumentSource::Uploaded {
            path: path.to_path_buf(),
        },
        data,
    ))
}

fn is_url(location: &str) -> bool {
    location.starts_with("http://") || location.starts_with("https://")
}

/// Resolve the default resume, which may be a local path or an HTTP(S) URL
pub async fn resolve_default(location: &str, max_download_bytes: u64) -> Result<ResolvedPdf> {
    let data = if is_url(location) {
        download(location, max_download_bytes).await?
    } else {
        read_file(Path::new(location))?
    };

    Ok(ResolvedPdf::new(
        DocumentSource::Default {
            location: location.to_string(),
        },
        data,
    ))
}

/// Download a URL with a size limit
async fn download(url: &str, max_download_bytes: u64) -> Result<Vec<u8>> {
    url::Url::parse(url).map_err(|e| Error::SourceResolution {
        reason: format!("Invalid URL: {}", e),
    })?;

    let response = reqwest::get(url).await?;

    if !response.status().is_success() {
        return Err(Error::SourceResolution {
            reason: format!("HTTP request failed with status: {}", response.status()),
        });
    }

    // Check Content-Length header for early rejection
    if let Some(content_length) = response.content_length() {
        if content_length > max_download_bytes {
            return Err(Error::DownloadTooLarge {
                size: content_length,
                max_size: max_download_bytes,
            });
        }
    }

    let mut data = Vec::new();
    let mut stream = response.bytes_stream();
    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(Error::HttpRequest)?;
        data.extend_from_slice(&chunk);
        if data.len() as u64 > max_download_bytes {
            return Err(Error::DownloadTooLarge {
                size: data.len() as u64,
                max_size: max_download_bytes,
            });
        }
    }

    Ok(data)
}
