//! Image and audio inputs
//!
//! Callers may reference media in several ways. Before a request is adapted
//! every image is resolved to one inline data URI and every audio reference is
//! read in full.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use std::path::PathBuf;

use crate::error::{Result, ServiceError};
use crate::utils::mime::guess_mime;

/// An image to analyze.
///
/// Plain strings are classified by [`ImageInput::from`]: `data:` URIs and
/// `http(s)://` URLs are recognized by prefix, existing file paths by a
/// filesystem check, and anything else is treated as inline base64.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageInput {
    Url(String),
    Path(PathBuf),
    /// Inline base64 payload without a `data:` prefix
    Base64(String),
    /// `data:<mime>;base64,<payload>`
    DataUri(String),
    Bytes(Vec<u8>),
}

impl From<&str> for ImageInput {
    fn from(value: &str) -> Self {
        let trimmed = value.trim();
        if trimmed.starts_with("data:") {
            ImageInput::DataUri(trimmed.to_string())
        } else if is_http_url(trimmed) {
            ImageInput::Url(trimmed.to_string())
        } else if std::path::Path::new(trimmed).is_file() {
            ImageInput::Path(PathBuf::from(trimmed))
        } else {
            ImageInput::Base64(trimmed.to_string())
        }
    }
}

impl From<String> for ImageInput {
    fn from(value: String) -> Self {
        ImageInput::from(value.as_str())
    }
}

impl From<PathBuf> for ImageInput {
    fn from(value: PathBuf) -> Self {
        ImageInput::Path(value)
    }
}

impl From<Vec<u8>> for ImageInput {
    fn from(value: Vec<u8>) -> Self {
        ImageInput::Bytes(value)
    }
}

/// Audio to transcribe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AudioInput {
    Bytes(Vec<u8>),
    Url(String),
    Path(PathBuf),
}

impl From<Vec<u8>> for AudioInput {
    fn from(value: Vec<u8>) -> Self {
        AudioInput::Bytes(value)
    }
}

impl From<PathBuf> for AudioInput {
    fn from(value: PathBuf) -> Self {
        AudioInput::Path(value)
    }
}

impl From<&str> for AudioInput {
    fn from(value: &str) -> Self {
        let trimmed = value.trim();
        if is_http_url(trimmed) {
            AudioInput::Url(trimmed.to_string())
        } else {
            AudioInput::Path(PathBuf::from(trimmed))
        }
    }
}

/// Media read in full, with its detected MIME type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadedMedia {
    pub bytes: Vec<u8>,
    pub mime: String,
}

impl LoadedMedia {
    pub fn to_data_uri(&self) -> String {
        format!("data:{};base64,{}", self.mime, STANDARD.encode(&self.bytes))
    }
}

fn is_http_url(value: &str) -> bool {
    let lower = value.get(..8).unwrap_or(value).to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}

impl ImageInput {
    /// Read, download or decode the image and enforce `max_bytes`.
    pub(crate) async fn load(&self, http: &reqwest::Client, max_bytes: usize) -> Result<LoadedMedia> {
        let (bytes, hint, declared) = match self {
            ImageInput::Url(url) => (download(http, url, max_bytes).await?, Some(url.as_str()), None),
            ImageInput::Path(path) => {
                let bytes = read_file(path, max_bytes).await?;
                (bytes, path.to_str(), None)
            }
            ImageInput::Base64(payload) => (decode_base64(payload)?, None, None),
            ImageInput::DataUri(uri) => {
                let (mime, payload) = split_data_uri(uri)?;
                (decode_base64(payload)?, None, Some(mime.to_string()))
            }
            ImageInput::Bytes(bytes) => (bytes.clone(), None, None),
        };

        check_size("image", bytes.len(), max_bytes)?;
        if bytes.is_empty() {
            return Err(ServiceError::InvalidInput("image is empty".to_string()));
        }
        let mime = declared
            .filter(|m| m.starts_with("image/"))
            .unwrap_or_else(|| guess_mime(Some(&bytes), hint, "image/jpeg"));
        Ok(LoadedMedia { bytes, mime })
    }
}

impl AudioInput {
    /// Read or download the audio in full and enforce `max_bytes`.
    pub(crate) async fn load(&self, http: &reqwest::Client, max_bytes: usize) -> Result<LoadedMedia> {
        let (bytes, hint) = match self {
            AudioInput::Bytes(bytes) => (bytes.clone(), None),
            AudioInput::Url(url) => (download(http, url, max_bytes).await?, Some(url.as_str())),
            AudioInput::Path(path) => (read_file(path, max_bytes).await?, path.to_str()),
        };

        check_size("audio", bytes.len(), max_bytes)?;
        if bytes.is_empty() {
            return Err(ServiceError::InvalidInput("audio is empty".to_string()));
        }
        let mime = guess_mime(Some(&bytes), hint, "audio/mpeg");
        Ok(LoadedMedia { bytes, mime })
    }
}

fn check_size(kind: &str, len: usize, max_bytes: usize) -> Result<()> {
    if len > max_bytes {
        return Err(ServiceError::InvalidInput(format!(
            "{kind} is {len} bytes, limit is {max_bytes}"
        )));
    }
    Ok(())
}

async fn read_file(path: &std::path::Path, max_bytes: usize) -> Result<Vec<u8>> {
    let metadata = tokio::fs::metadata(path).await.map_err(|e| {
        ServiceError::InvalidInput(format!("cannot read {}: {e}", path.display()))
    })?;
    check_size("file", metadata.len() as usize, max_bytes)?;
    tokio::fs::read(path)
        .await
        .map_err(|e| ServiceError::InvalidInput(format!("cannot read {}: {e}", path.display())))
}

async fn download(http: &reqwest::Client, url: &str, max_bytes: usize) -> Result<Vec<u8>> {
    tracing::debug!("Downloading input media from {}", url);
    let response = http
        .get(url)
        .send()
        .await
        .map_err(|e| ServiceError::InvalidInput(format!("cannot fetch {url}: {e}")))?;
    if !response.status().is_success() {
        return Err(ServiceError::InvalidInput(format!(
            "cannot fetch {url}: HTTP {}",
            response.status()
        )));
    }
    if let Some(len) = response.content_length() {
        check_size("download", len as usize, max_bytes)?;
    }
    let bytes = response
        .bytes()
        .await
        .map_err(|e| ServiceError::InvalidInput(format!("cannot fetch {url}: {e}")))?;
    Ok(bytes.to_vec())
}

fn split_data_uri(uri: &str) -> Result<(&str, &str)> {
    let rest = uri
        .strip_prefix("data:")
        .ok_or_else(|| ServiceError::InvalidInput("not a data URI".to_string()))?;
    let (meta, payload) = rest
        .split_once(',')
        .ok_or_else(|| ServiceError::InvalidInput("data URI has no payload".to_string()))?;
    let mime = meta
        .strip_suffix(";base64")
        .ok_or_else(|| ServiceError::InvalidInput("only base64 data URIs are supported".to_string()))?;
    Ok((mime, payload))
}

fn decode_base64(payload: &str) -> Result<Vec<u8>> {
    let compact: String = payload.chars().filter(|c| !c.is_ascii_whitespace()).collect();
    STANDARD
        .decode(compact.as_bytes())
        .map_err(|e| ServiceError::InvalidInput(format!("invalid base64 image: {e}")))
}
