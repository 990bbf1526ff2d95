//! Writing posters to disk and handing them to a share target.

use crate::datauri::DataUrl;
use crate::generate::{GeneratedOutput, Slot};
use crate::Result;
use log::{info, warn};
use std::path::{Path, PathBuf};

/// Deterministic download name, e.g. `YevoLatin-Poster-Story-0-1.png`.
pub fn export_file_name(brand: &str, slot: Slot, batch_index: usize, index: usize) -> String {
    format!("{}-Poster-{}-{}-{}.png", brand, slot.label(), batch_index, index + 1)
}

/// Download name of a gallery entry, e.g. `saved-poster-1718000000000.png`.
pub fn saved_file_name(id: u64) -> String {
    format!("saved-poster-{}.png", id)
}

/// Decode `data_url` and write it to `dir/file_name`.
pub fn write_image(dir: &Path, file_name: &str, data_url: &str) -> Result<PathBuf> {
    let bytes = DataUrl::parse(data_url)?.decode()?;
    std::fs::create_dir_all(dir)?;
    let path = dir.join(file_name);
    std::fs::write(&path, bytes)?;
    info!("wrote {}", path.display());
    Ok(path)
}

/// Export one generated poster under its deterministic name.
pub fn export_output(
    dir: &Path,
    brand: &str,
    batch_index: usize,
    output: &GeneratedOutput,
) -> Result<PathBuf> {
    let name = export_file_name(brand, output.slot, batch_index, output.index);
    write_image(dir, &name, &output.data_url)
}

/// Why a share attempt did not go through.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShareError {
    /// The user dismissed the share sheet
    Cancelled,
    /// No share or clipboard mechanism is available
    Unsupported(String),
    Failed(String),
}

/// Platform share sheet or clipboard.
pub trait ShareTarget {
    fn share(&self, file_name: &str, mime_type: &str, bytes: &[u8]) -> std::result::Result<(), ShareError>;
}

/// What the caller should tell the user after a share attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShareOutcome {
    Shared,
    /// Nothing to report
    Cancelled,
    /// Soft suggestion to download instead
    Fallback(String),
}

/// Try to share a poster, degrading to a download suggestion on failure.
pub fn share_or_fallback<T: ShareTarget + ?Sized>(
    target: &T,
    file_name: &str,
    data_url: &str,
) -> ShareOutcome {
    let image = match DataUrl::parse(data_url).and_then(|url| url.decode().map(|b| (url, b))) {
        Ok(image) => image,
        Err(e) => {
            warn!("cannot share {}: {}", file_name, e);
            return ShareOutcome::Fallback("Could not share the poster. Please try downloading it instead.".into());
        }
    };
    let (url, bytes) = image;

    match target.share(file_name, &url.mime_type, &bytes) {
        Ok(()) => ShareOutcome::Shared,
        Err(ShareError::Cancelled) => ShareOutcome::Cancelled,
        Err(ShareError::Unsupported(reason)) => {
            warn!("sharing unsupported: {}", reason);
            ShareOutcome::Fallback("Sharing is not supported here. Please download the poster to share it.".into())
        }
        Err(ShareError::Failed(reason)) => {
            warn!("share failed: {}", reason);
            ShareOutcome::Fallback("Could not share the poster. Please try downloading it instead.".into())
        }
    }
}
