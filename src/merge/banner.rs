//! Banner images for the page header and footer.
//!
//! Caller-supplied bytes win; otherwise a fallback file is read from disk.
//! Anything missing or undecodable leaves the region empty.

use image::{ImageFormat, ImageReader};
use std::fmt;
use std::io::Cursor;
use std::path::{Path, PathBuf};

pub const TOP_BANNER_FILE: &str = "upper banner.png";
pub const BOTTOM_BANNER_FILE: &str = "low banner.png";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BannerEdge {
    Top,
    Bottom,
}

impl fmt::Display for BannerEdge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Top => f.write_str("top"),
            Self::Bottom => f.write_str("bottom"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageKind {
    Png,
    Jpeg,
}

impl ImageKind {
    pub fn extension(self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Jpeg => "jpeg",
        }
    }

    pub fn mime_type(self) -> &'static str {
        match self {
            Self::Png => "image/png",
            Self::Jpeg => "image/jpeg",
        }
    }
}

/// A decoded banner: original bytes plus format and pixel size.
#[derive(Clone, PartialEq, Eq)]
pub struct BannerImage {
    pub bytes: Vec<u8>,
    pub kind: ImageKind,
    pub width_px: u32,
    pub height_px: u32,
}

impl fmt::Debug for BannerImage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BannerImage")
            .field("bytes", &self.bytes.len())
            .field("kind", &self.kind)
            .field("width_px", &self.width_px)
            .field("height_px", &self.height_px)
            .finish()
    }
}

impl BannerImage {
    /// Sniff and measure `bytes`. Only PNG and JPEG are accepted.
    pub fn decode(bytes: Vec<u8>) -> Option<Self> {
        let reader = ImageReader::new(Cursor::new(bytes.as_slice()))
            .with_guessed_format()
            .ok()?;
        let kind = match reader.format()? {
            ImageFormat::Png => ImageKind::Png,
            ImageFormat::Jpeg => ImageKind::Jpeg,
            _ => return None,
        };
        let (width_px, height_px) = reader.into_dimensions().ok()?;
        if width_px == 0 || height_px == 0 {
            return None;
        }

        Some(Self {
            bytes,
            kind,
            width_px,
            height_px,
        })
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width_px, self.height_px)
    }
}

/// Banner bytes supplied with a request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BannerAssets {
    pub top: Option<Vec<u8>>,
    pub bottom: Option<Vec<u8>>,
}

impl BannerAssets {
    pub fn new(top: Option<Vec<u8>>, bottom: Option<Vec<u8>>) -> Self {
        Self { top, bottom }
    }

    /// Decode supplied bytes, reading `fallback` files for missing ones.
    pub fn resolve(self, fallback: &BannerFallback) -> BannerSet {
        BannerSet {
            top: resolve_one(BannerEdge::Top, self.top, fallback.top.as_deref()),
            bottom: resolve_one(BannerEdge::Bottom, self.bottom, fallback.bottom.as_deref()),
        }
    }
}

fn resolve_one(edge: BannerEdge, supplied: Option<Vec<u8>>, fallback: Option<&Path>) -> Option<BannerImage> {
    if let Some(bytes) = supplied {
        let decoded = BannerImage::decode(bytes);
        if decoded.is_none() {
            log::warn!("{} banner upload is not a PNG or JPEG image, leaving region empty", edge);
        }
        return decoded;
    }

    let path = fallback?;
    let bytes = match std::fs::read(path) {
        Ok(bytes) => bytes,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            log::debug!("no {} banner at {}", edge, path.display());
            return None;
        }
        Err(err) => {
            log::warn!("failed to read {} banner {}: {}", edge, path.display(), err);
            return None;
        }
    };

    let decoded = BannerImage::decode(bytes);
    if decoded.is_none() {
        log::warn!("{} banner {} is not a PNG or JPEG image", edge, path.display());
    }
    decoded
}

/// Well-known files consulted when a request carries no banner bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BannerFallback {
    pub top: Option<PathBuf>,
    pub bottom: Option<PathBuf>,
}

impl Default for BannerFallback {
    fn default() -> Self {
        Self::in_dir(".")
    }
}

impl BannerFallback {
    /// `upper banner.png` and `low banner.png` inside `dir`.
    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref();
        Self {
            top: Some(dir.join(TOP_BANNER_FILE)),
            bottom: Some(dir.join(BOTTOM_BANNER_FILE)),
        }
    }

    pub fn none() -> Self {
        Self {
            top: None,
            bottom: None,
        }
    }
}

/// Decoded banners ready for layout.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BannerSet {
    pub top: Option<BannerImage>,
    pub bottom: Option<BannerImage>,
}

impl BannerSet {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn get(&self, edge: BannerEdge) -> Option<&BannerImage> {
        match edge {
            BannerEdge::Top => self.top.as_ref(),
            BannerEdge::Bottom => self.bottom.as_ref(),
        }
    }
}
