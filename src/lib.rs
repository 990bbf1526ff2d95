//! Poster Studio
//!
//! Builds event posters by sending a presenter photo, optional logos and
//! event text to a hosted multimodal image model. All image work happens on
//! the model side; this crate composes the instruction document, makes the
//! calls, sorts the results into output slots and keeps a small gallery of
//! saved posters.
//!
//! # Features
//!
//! - **`gemini`** (default): blocking HTTP client for the Gemini
//!   `generateContent` endpoint
//! - **Pluggable model**: orchestration only depends on the [`ImageModel`] trait
//! - **Pluggable gallery storage**: [`GalleryStorage`] with JSON-file and
//!   in-memory backends
//!
//! # Example
//!
//! ```no_run
//! # #[cfg(feature = "gemini")]
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! use poster_studio::{
//!     Credentials, GeminiClient, ImageAsset, JsonFileStorage, Session, StudioConfig,
//! };
//!
//! let config = StudioConfig::from_env()?;
//! let credentials = Credentials::from_env().ok_or("no API key")?;
//! let model = GeminiClient::new(&config, credentials)?;
//! let storage = JsonFileStorage::new(&config.gallery_path);
//!
//! let mut session = Session::new(config, model, storage);
//! session.assets_mut().set_presenter(ImageAsset::from_path("presenter.jpg")?);
//! session.set_info_text("- Salsa, Dance Class\n- Date: Friday");
//! let batch = session.generate()?;
//! println!("tall poster: {} bytes", batch.tall[0].data_url.len());
//! # Ok(())
//! # }
//! # #[cfg(not(feature = "gemini"))]
//! # fn main() {}
//! ```

use std::path::PathBuf;
use std::str::FromStr;

pub mod error;
pub use error::{Error, Result};

pub mod assets;
pub mod client;
pub mod datauri;
pub mod edit;
pub mod export;
pub mod gallery;
pub mod generate;
pub mod progress;
pub mod prompt;
pub mod session;
pub mod social;
pub mod style;

pub use assets::{AssetCollector, ImageAsset, LogoPresence, LogoRole, PreviewRegistry};
#[cfg(feature = "gemini")]
pub use client::GeminiClient;
pub use client::{Credentials, ImageModel, ModelRequest, ModelResponse};
pub use gallery::{Gallery, GalleryStorage, JsonFileStorage, MemoryStorage, SavedPoster};
pub use generate::{GeneratedOutput, OutputBatch, Progress, Slot};
pub use prompt::{compose_edit_prompt, compose_generation_prompt, Branding, PosterBrief};
pub use session::{Phase, Session};
pub use social::{Platform, SocialLink};
pub use style::{BackgroundTheme, StyleConfig, StylePreset, TuningValues, PRESETS};

/// What happens to earlier batches when a new one is generated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BatchMode {
    /// Keep every batch of the session
    #[default]
    History,
    /// Keep only the latest batch
    Replace,
}

impl FromStr for BatchMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "history" => Ok(BatchMode::History),
            "replace" => Ok(BatchMode::Replace),
            other => Err(Error::ConfigError(format!("unknown batch mode: {}", other))),
        }
    }
}

/// Configuration for a studio session
///
/// Defaults target the public Gemini endpoint with the image model and keep
/// the gallery next to the working directory:
///
/// ```
/// let cfg = poster_studio::StudioConfig::default();
/// assert_eq!(cfg.model, "gemini-2.5-flash-image");
/// ```
#[derive(Debug, Clone)]
pub struct StudioConfig {
    /// Base URL of the generative language API
    pub api_base: String,
    /// Image model name
    pub model: String,
    /// Timeout for a single remote call in milliseconds
    pub timeout_ms: u64,
    /// JSON file holding the saved posters
    pub gallery_path: PathBuf,
    /// Batch retention across generations
    pub batch_mode: BatchMode,
    /// Watermark name and QR glyph
    pub branding: Branding,
    /// Interval between rotating progress messages (0 disables rotation)
    pub ticker_interval_ms: u64,
}

impl Default for StudioConfig {
    fn default() -> Self {
        Self {
            api_base: "https://generativelanguage.googleapis.com/v1beta".to_string(),
            model: "gemini-2.5-flash-image".to_string(),
            timeout_ms: 120_000,
            gallery_path: PathBuf::from("yevolatin-ai-poster-maker-saved-posters.json"),
            batch_mode: BatchMode::default(),
            branding: Branding::default(),
            ticker_interval_ms: 3000,
        }
    }
}

impl StudioConfig {
    /// Defaults overlaid with `POSTER_STUDIO_*` environment variables.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Same as [`StudioConfig::from_env`] with an injectable variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut cfg = Self::default();
        let get = |name: &str| lookup(name).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        if let Some(v) = get("POSTER_STUDIO_API_BASE") {
            cfg.api_base = v;
        }
        if let Some(v) = get("POSTER_STUDIO_MODEL") {
            cfg.model = v;
        }
        if let Some(v) = get("POSTER_STUDIO_TIMEOUT_MS") {
            cfg.timeout_ms = v
                .parse()
                .map_err(|_| Error::ConfigError(format!("POSTER_STUDIO_TIMEOUT_MS is not a number: {}", v)))?;
        }
        if let Some(v) = get("POSTER_STUDIO_GALLERY") {
            cfg.gallery_path = PathBuf::from(v);
        }
        if let Some(v) = get("POSTER_STUDIO_BATCH_MODE") {
            cfg.batch_mode = v.parse()?;
        }
        if let Some(v) = get("POSTER_STUDIO_WATERMARK") {
            cfg.branding.watermark = v;
        }
        Ok(cfg)
    }
}
