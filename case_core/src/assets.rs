//! # Image Assets
//!
//! Decoding of source images into immutable [`ImageAsset`] handles.
//!
//! Sources are given as URL-like strings, the same way the editing layer
//! stores them on a panel:
//!
//! - `data:image/png;base64,...` - inline payload (base64 only)
//! - `file:///path/to/art.jpg` - local file URL
//! - anything else - treated as a filesystem path
//!
//! Decoding runs on tokio's blocking pool so several panels can load
//! concurrently without stalling the caller. Which result is still wanted
//! when it arrives is decided by the project state, not here (see
//! [`crate::project::DecodeTicket`]).

use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use base64::Engine;
use image::RgbaImage;
use uuid::Uuid;

use crate::errors::{CaseError, CaseResult};
use crate::transform::NaturalSize;

/// Decoded source image. Cheap to clone; the pixels are shared.
///
/// Two handles are equal when they refer to the same decode, regardless of
/// pixel content.
#[derive(Clone)]
pub struct ImageAsset {
    id: Uuid,
    pixels: Arc<RgbaImage>,
}

impl ImageAsset {
    /// Wrap decoded pixels in a new asset with a fresh identity.
    pub fn from_rgba(pixels: RgbaImage) -> Self {
        ImageAsset {
            id: Uuid::new_v4(),
            pixels: Arc::new(pixels),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    pub fn natural_size(&self) -> NaturalSize {
        NaturalSize::new(f64::from(self.width()), f64::from(self.height()))
    }

    pub fn pixels(&self) -> &RgbaImage {
        &self.pixels
    }
}

impl PartialEq for ImageAsset {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl fmt::Debug for ImageAsset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ImageAsset")
            .field("id", &self.id)
            .field("width", &self.width())
            .field("height", &self.height())
            .finish()
    }
}

/// Where the bytes of an image come from.
#[derive(Debug, Clone, PartialEq)]
pub enum ImageSource {
    /// Inline bytes already extracted from a `data:` URL
    Inline(Vec<u8>),
    /// File on the local filesystem
    File(PathBuf),
}

impl ImageSource {
    /// Parse a panel image URL.
    pub fn parse(url: &str) -> CaseResult<Self> {
        let trimmed = url.trim();
        if trimmed.is_empty() {
            return Err(CaseError::asset_load(url, "empty image URL"));
        }

        if let Some(rest) = trimmed.strip_prefix("data:") {
            let (meta, payload) = rest
                .split_once(',')
                .ok_or_else(|| CaseError::asset_load(summarize(url), "data URL has no payload"))?;
            if !meta.ends_with(";base64") {
                return Err(CaseError::asset_load(summarize(url), "only base64 data URLs are supported"));
            }
            let bytes = base64::engine::general_purpose::STANDARD
                .decode(payload.trim())
                .map_err(|e| CaseError::asset_load(summarize(url), format!("invalid base64 payload: {}", e)))?;
            return Ok(ImageSource::Inline(bytes));
        }

        if let Some(path) = trimmed.strip_prefix("file://") {
            return Ok(ImageSource::File(PathBuf::from(path)));
        }

        if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
            return Err(CaseError::asset_load(url, "remote URLs must be fetched by the caller"));
        }

        Ok(ImageSource::File(PathBuf::from(trimmed)))
    }
}

/// Shorten data URLs for error messages.
fn summarize(url: &str) -> String {
    const MAX: usize = 48;
    if url.len() <= MAX {
        return url.to_string();
    }
    let mut end = MAX;
    while !url.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...", &url[..end])
}

/// Decode encoded image bytes (PNG, JPEG, ...) into an asset.
pub fn decode_bytes(origin: &str, bytes: &[u8]) -> CaseResult<ImageAsset> {
    let decoded = image::load_from_memory(bytes)
        .map_err(|e| CaseError::asset_load(summarize(origin), e.to_string()))?;
    let rgba = decoded.to_rgba8();
    if rgba.width() == 0 || rgba.height() == 0 {
        return Err(CaseError::asset_load(summarize(origin), "image has zero size"));
    }
    Ok(ImageAsset::from_rgba(rgba))
}

/// Read and decode the image behind `url`.
///
/// Fails with [`CaseError::AssetLoad`] for unreadable sources and corrupt
/// or unsupported image data.
pub async fn load_asset(url: &str) -> CaseResult<ImageAsset> {
    let bytes = match ImageSource::parse(url)? {
        ImageSource::Inline(bytes) => bytes,
        ImageSource::File(path) => tokio::fs::read(&path)
            .await
            .map_err(|e| CaseError::asset_load(path.display().to_string(), e.to_string()))?,
    };

    let origin = summarize(url);
    tokio::task::spawn_blocking(move || decode_bytes(&origin, &bytes))
        .await
        .map_err(|e| CaseError::Internal {
            message: format!("image decode task failed: {}", e),
        })?
}
