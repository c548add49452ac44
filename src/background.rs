//! Background image ingestion and the decoded-background cache.
//!
//! Uploaded images are stored inside the state as `data:` URLs so a snapshot
//! is self-contained. Decoding for display happens later and may complete
//! after the user has already replaced the background, so the cache only
//! accepts a completion for the URL it currently wants.

use std::io::Cursor;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use image::{ImageFormat, ImageReader};

use crate::error::{PlannerError, Result};
use crate::state::MapBackground;

/// Supported image file extensions.
pub const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif", "bmp", "webp"];

/// Check if a filename has a supported image extension.
pub fn is_image_file(filename: &str) -> bool {
    std::path::Path::new(filename)
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| IMAGE_EXTENSIONS.iter().any(|e| ext.eq_ignore_ascii_case(e)))
}

impl MapBackground {
    /// Build a background from raw image file bytes.
    ///
    /// The format is guessed from the content, not the name.
    pub fn from_image_bytes(name: &str, bytes: &[u8]) -> Result<Self> {
        let (format, width, height) = sniff(bytes)?;
        let url = format!(
            "data:{};base64,{}",
            format.to_mime_type(),
            STANDARD.encode(bytes)
        );
        log::info!(
            "Loaded background '{}' ({}x{}, {})",
            name,
            width,
            height,
            format.to_mime_type()
        );
        Ok(Self {
            name: name.to_string(),
            url,
            width,
            height,
        })
    }
}

fn sniff(bytes: &[u8]) -> Result<(ImageFormat, u32, u32)> {
    let reader = ImageReader::new(Cursor::new(bytes)).with_guessed_format()?;
    let format = reader.format();
    let (width, height) = reader.into_dimensions()?;
    let format =
        format.ok_or_else(|| PlannerError::invalid_snapshot("unrecognized image format"))?;
    Ok((format, width, height))
}

/// Decode the payload of a base64 `data:` URL and read its dimensions.
pub fn decode_data_url(url: &str) -> Result<(u32, u32)> {
    let payload = url
        .strip_prefix("data:")
        .and_then(|rest| rest.split_once(";base64,"))
        .map(|(_, payload)| payload)
        .ok_or_else(|| PlannerError::invalid_snapshot("background is not a base64 data URL"))?;
    let bytes = STANDARD
        .decode(payload)
        .map_err(|e| PlannerError::invalid_snapshot(format!("background payload: {e}")))?;
    let (_, width, height) = sniff(&bytes)?;
    Ok((width, height))
}

/// A background whose image finished loading.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadedBackground {
    pub url: String,
    pub width: u32,
    pub height: u32,
}

/// Cache of the decoded background, keyed by URL.
#[derive(Debug, Default)]
pub struct BackgroundCache {
    /// URL most recently requested
    wanted: Option<String>,
    /// Completed load, only ever for `wanted`
    loaded: Option<LoadedBackground>,
    /// Last load failure for `wanted`
    failed: Option<String>,
}

impl BackgroundCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark `url` as the background to show. Returns true if a load has to
    /// be started, false if it is already loaded or pending.
    pub fn request(&mut self, url: &str) -> bool {
        if self.wanted.as_deref() == Some(url) {
            return false;
        }
        log::debug!("Background requested ({} bytes of URL)", url.len());
        self.wanted = Some(url.to_string());
        self.loaded = None;
        self.failed = None;
        true
    }

    /// Record the outcome of a load. Completions for a URL that is no longer
    /// wanted are dropped; returns whether the result was accepted.
    pub fn complete(&mut self, url: &str, result: Result<(u32, u32)>) -> bool {
        if self.wanted.as_deref() != Some(url) {
            log::debug!("Ignoring stale background load");
            return false;
        }
        match result {
            Ok((width, height)) => {
                self.loaded = Some(LoadedBackground {
                    url: url.to_string(),
                    width,
                    height,
                });
                self.failed = None;
            }
            Err(e) => {
                log::warn!("Background failed to load: {}", e);
                self.loaded = None;
                self.failed = Some(e.to_string());
            }
        }
        true
    }

    /// Request and synchronously decode a data URL.
    pub fn load_now(&mut self, url: &str) {
        if self.request(url) {
            let result = decode_data_url(url);
            self.complete(url, result);
        }
    }

    /// Bring the cache in line with the state's background, loading it
    /// synchronously if it changed.
    pub fn sync(&mut self, background: Option<&MapBackground>) {
        match background {
            Some(bg) => self.load_now(&bg.url),
            None => self.clear(),
        }
    }

    /// The loaded background, if it matches `url`.
    pub fn ready_for(&self, url: &str) -> Option<&LoadedBackground> {
        self.loaded.as_ref().filter(|bg| bg.url == url)
    }

    pub fn is_pending(&self) -> bool {
        self.wanted.is_some() && self.loaded.is_none() && self.failed.is_none()
    }

    pub fn last_error(&self) -> Option<&str> {
        self.failed.as_deref()
    }

    pub fn clear(&mut self) {
        self.wanted = None;
        self.loaded = None;
        self.failed = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn png_bytes(width: u32, height: u32) -> Vec<u8> {
        let img = image::RgbImage::from_pixel(width, height, image::Rgb([10, 20, 30]));
        let mut bytes = Vec::new();
        img.write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
            .unwrap();
        bytes
    }

    #[test]
    fn test_is_image_file() {
        assert!(is_image_file("map.PNG"));
        assert!(is_image_file("arena.jpeg"));
        assert!(!is_image_file("plan.json"));
        assert!(!is_image_file("notapng"));
        assert!(!is_image_file("png"));
        assert!(!is_image_file("map.png.json"));
    }

    #[test]
    fn test_from_image_bytes() {
        let bg = MapBackground::from_image_bytes("arena.png", &png_bytes(4, 3)).unwrap();
        assert_eq!(bg.name, "arena.png");
        assert_eq!((bg.width, bg.height), (4, 3));
        assert!(bg.url.starts_with("data:image/png;base64,"));
        assert_eq!(decode_data_url(&bg.url).unwrap(), (4, 3));
    }

    #[test]
    fn test_rejects_non_image_bytes() {
        let err = MapBackground::from_image_bytes("notes.txt", b"definitely not an image").unwrap_err();
        assert!(matches!(err, PlannerError::Image(_)));
    }

    #[test]
    fn test_decode_rejects_plain_url() {
        assert!(decode_data_url("https://example.com/map.png").is_err());
    }

    #[test]
    fn test_cache_ignores_stale_completion() {
        let mut cache = BackgroundCache::new();
        assert!(cache.request("data:a"));
        assert!(cache.request("data:b"));
        assert!(cache.is_pending());

        assert!(!cache.complete("data:a", Ok((10, 10))));
        assert!(cache.ready_for("data:a").is_none());

        assert!(cache.complete("data:b", Ok((20, 30))));
        let loaded = cache.ready_for("data:b").unwrap();
        assert_eq!((loaded.width, loaded.height), (20, 30));
    }

    #[test]
    fn test_repeated_request_does_not_restart() {
        let mut cache = BackgroundCache::new();
        assert!(cache.request("data:a"));
        cache.complete("data:a", Ok((1, 1)));
        assert!(!cache.request("data:a"));
        assert!(cache.ready_for("data:a").is_some());
    }

    #[test]
    fn test_failed_load_is_recorded() {
        let mut cache = BackgroundCache::new();
        cache.load_now("data:image/png;base64,AAAA");
        assert!(cache.ready_for("data:image/png;base64,AAAA").is_none());
        assert!(cache.last_error().is_some());
        assert!(!cache.is_pending());
    }

    #[test]
    fn test_sync_follows_state() {
        let bg = MapBackground::from_image_bytes("a.png", &png_bytes(2, 2)).unwrap();
        let mut cache = BackgroundCache::new();
        cache.sync(Some(&bg));
        assert!(cache.ready_for(&bg.url).is_some());
        cache.sync(None);
        assert!(cache.ready_for(&bg.url).is_none());
    }
}
