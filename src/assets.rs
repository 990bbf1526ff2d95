//! Presenter and logo selection.
//!
//! Each role holds at most one image. Selecting a new image for an occupied
//! role replaces the old one, and every replaced or removed image gives its
//! preview back to the [`PreviewRegistry`] so long sessions do not accumulate
//! stale previews.

use crate::datauri::DataUrl;
use crate::{Error, Result};
use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, Mutex};

/// Opaque identifier of a registered preview.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PreviewId(u64);

#[derive(Default)]
struct RegistryInner {
    next_id: u64,
    live: HashMap<u64, String>,
}

/// Tracks the preview URLs handed out for selected assets.
#[derive(Clone, Default)]
pub struct PreviewRegistry {
    inner: Arc<Mutex<RegistryInner>>,
}

impl PreviewRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn register(&self, url: String) -> PreviewId {
        let mut inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        inner.next_id += 1;
        let id = inner.next_id;
        inner.live.insert(id, url);
        PreviewId(id)
    }

    fn revoke(&self, id: PreviewId) {
        let mut inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        inner.live.remove(&id.0);
    }

    /// Preview URL for a live handle.
    pub fn url(&self, id: PreviewId) -> Option<String> {
        let inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        inner.live.get(&id.0).cloned()
    }

    /// Number of previews not yet released.
    pub fn live_previews(&self) -> usize {
        let inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        inner.live.len()
    }
}

/// A user-selected image held in memory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageAsset {
    pub bytes: Vec<u8>,
    pub media_type: String,
    preview: Option<PreviewId>,
}

impl ImageAsset {
    pub fn new(bytes: Vec<u8>, media_type: impl Into<String>) -> Self {
        Self {
            bytes,
            media_type: media_type.into(),
            preview: None,
        }
    }

    /// Read an image from disk, inferring the media type from its extension.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let media_type = media_type_for(path).ok_or_else(|| {
            Error::DecodeError(format!("unsupported image type: {}", path.display()))
        })?;
        let bytes = std::fs::read(path)
            .map_err(|e| Error::DecodeError(format!("failed to read {}: {}", path.display(), e)))?;
        Ok(Self::new(bytes, media_type))
    }

    /// Transport form of the image.
    pub fn to_data_url(&self) -> DataUrl {
        DataUrl::from_bytes(&self.media_type, &self.bytes)
    }

    pub fn preview(&self) -> Option<PreviewId> {
        self.preview
    }
}

/// Map a file extension to the media type sent alongside the image.
pub fn media_type_for(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    match ext.as_str() {
        "png" => Some("image/png"),
        "jpg" | "jpeg" => Some("image/jpeg"),
        "webp" => Some("image/webp"),
        "gif" => Some("image/gif"),
        "heic" => Some("image/heic"),
        "heif" => Some("image/heif"),
        _ => None,
    }
}

/// Which logo corner an image is destined for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogoRole {
    /// Top-left
    First,
    /// Top-right
    Second,
}

/// Whether each logo slot is filled.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LogoPresence {
    pub first: bool,
    pub second: bool,
}

/// Holds the presenter photo and the two optional logos.
pub struct AssetCollector {
    registry: PreviewRegistry,
    presenter: Option<ImageAsset>,
    logo_first: Option<ImageAsset>,
    logo_second: Option<ImageAsset>,
}

impl AssetCollector {
    pub fn new(registry: PreviewRegistry) -> Self {
        Self {
            registry,
            presenter: None,
            logo_first: None,
            logo_second: None,
        }
    }

    fn attach(&self, mut asset: ImageAsset) -> ImageAsset {
        if let Some(old) = asset.preview.take() {
            self.registry.revoke(old);
        }
        asset.preview = Some(self.registry.register(asset.to_data_url().to_string()));
        asset
    }

    fn release(&self, asset: Option<ImageAsset>) {
        if let Some(id) = asset.and_then(|a| a.preview) {
            self.registry.revoke(id);
        }
    }

    /// Select the presenter image, replacing any previous one.
    pub fn set_presenter(&mut self, asset: ImageAsset) {
        let asset = self.attach(asset);
        let old = self.presenter.replace(asset);
        self.release(old);
    }

    pub fn remove_presenter(&mut self) {
        let old = self.presenter.take();
        self.release(old);
    }

    pub fn presenter(&self) -> Option<&ImageAsset> {
        self.presenter.as_ref()
    }

    /// The presenter image, or a validation error when none was selected.
    pub fn require_presenter(&self) -> Result<&ImageAsset> {
        self.presenter
            .as_ref()
            .ok_or_else(|| Error::ValidationError("Please upload a main image of the presenter.".into()))
    }

    pub fn set_logo(&mut self, role: LogoRole, asset: ImageAsset) {
        let asset = self.attach(asset);
        let old = match role {
            LogoRole::First => self.logo_first.replace(asset),
            LogoRole::Second => self.logo_second.replace(asset),
        };
        self.release(old);
    }

    pub fn remove_logo(&mut self, role: LogoRole) {
        let old = match role {
            LogoRole::First => self.logo_first.take(),
            LogoRole::Second => self.logo_second.take(),
        };
        self.release(old);
    }

    pub fn logo(&self, role: LogoRole) -> Option<&ImageAsset> {
        match role {
            LogoRole::First => self.logo_first.as_ref(),
            LogoRole::Second => self.logo_second.as_ref(),
        }
    }

    pub fn logo_presence(&self) -> LogoPresence {
        LogoPresence {
            first: self.logo_first.is_some(),
            second: self.logo_second.is_some(),
        }
    }

    /// Drop every selected image and release their previews.
    pub fn clear(&mut self) {
        self.remove_presenter();
        self.remove_logo(LogoRole::First);
        self.remove_logo(LogoRole::Second);
    }

    pub fn registry(&self) -> &PreviewRegistry {
        &self.registry
    }
}

impl Drop for AssetCollector {
    fn drop(&mut self) {
        self.clear();
    }
}
