//! Saved posters.
//!
//! The gallery is an ordered, deduplicated list loaded once at startup and
//! written back in full after every mutation. Storage failures are logged
//! and never reach the caller: a failed load yields an empty gallery, a
//! failed write keeps the in-memory state.

use crate::{Error, Result};
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::HashSet;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::{SystemTime, UNIX_EPOCH};

/// A gallery entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedPoster {
    pub id: u64,
    pub image_data_url: String,
}

/// Where the gallery lives between sessions.
pub trait GalleryStorage {
    fn load(&self) -> Result<Vec<SavedPoster>>;

    /// Replace the persisted list with `posters`.
    fn store(&self, posters: &[SavedPoster]) -> Result<()>;
}

/// JSON array on disk, rewritten through a temporary file and a rename.
pub struct JsonFileStorage {
    path: PathBuf,
}

impl JsonFileStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl GalleryStorage for JsonFileStorage {
    fn load(&self) -> Result<Vec<SavedPoster>> {
        match std::fs::read_to_string(&self.path) {
            Ok(text) if text.trim().is_empty() => Ok(Vec::new()),
            Ok(text) => Ok(serde_json::from_str(&text)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Vec::new()),
            Err(e) => Err(Error::PersistenceError(format!(
                "failed to read {}: {}",
                self.path.display(),
                e
            ))),
        }
    }

    fn store(&self, posters: &[SavedPoster]) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .map_err(|e| Error::PersistenceError(format!("failed to create {}: {}", parent.display(), e)))?;
        }

        let json = serde_json::to_vec(posters)?;
        let tmp = self.path.with_extension("json.tmp");
        let write = || -> std::io::Result<()> {
            let mut file = std::fs::File::create(&tmp)?;
            file.write_all(&json)?;
            file.sync_all()?;
            std::fs::rename(&tmp, &self.path)
        };
        write().map_err(|e| Error::PersistenceError(format!("failed to write {}: {}", self.path.display(), e)))
    }
}

/// In-memory storage, shared between clones.
#[derive(Clone, Default)]
pub struct MemoryStorage {
    posters: Arc<Mutex<Vec<SavedPoster>>>,
    writes: Arc<Mutex<usize>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_posters(posters: Vec<SavedPoster>) -> Self {
        Self {
            posters: Arc::new(Mutex::new(posters)),
            writes: Arc::default(),
        }
    }

    /// Snapshot of what was last stored.
    pub fn snapshot(&self) -> Vec<SavedPoster> {
        self.posters.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    /// How many full rewrites happened.
    pub fn writes(&self) -> usize {
        *self.writes.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl GalleryStorage for MemoryStorage {
    fn load(&self) -> Result<Vec<SavedPoster>> {
        Ok(self.snapshot())
    }

    fn store(&self, posters: &[SavedPoster]) -> Result<()> {
        *self.posters.lock().unwrap_or_else(|e| e.into_inner()) = posters.to_vec();
        *self.writes.lock().unwrap_or_else(|e| e.into_inner()) += 1;
        Ok(())
    }
}

fn fingerprint(image_data_url: &str) -> String {
    hex::encode(Sha256::digest(image_data_url.as_bytes()))
}

fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or_default()
}

/// The saved-poster list and its storage backend.
pub struct Gallery<S: GalleryStorage> {
    storage: S,
    posters: Vec<SavedPoster>,
    fingerprints: HashSet<String>,
}

impl<S: GalleryStorage> Gallery<S> {
    /// Load the gallery; an unreadable store starts empty.
    pub fn open(storage: S) -> Self {
        let loaded = storage.load().unwrap_or_else(|e| {
            warn!("Failed to load saved posters: {}", e);
            Vec::new()
        });

        // Older stores may already contain duplicates; keep the first.
        let mut fingerprints = HashSet::new();
        let posters: Vec<SavedPoster> = loaded
            .into_iter()
            .filter(|p| fingerprints.insert(fingerprint(&p.image_data_url)))
            .collect();
        debug!("gallery loaded with {} poster(s)", posters.len());

        Self {
            storage,
            posters,
            fingerprints,
        }
    }

    pub fn posters(&self) -> &[SavedPoster] {
        &self.posters
    }

    pub fn len(&self) -> usize {
        self.posters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.posters.is_empty()
    }

    pub fn contains(&self, image_data_url: &str) -> bool {
        self.fingerprints.contains(&fingerprint(image_data_url))
    }

    pub fn get(&self, id: u64) -> Option<&SavedPoster> {
        self.posters.iter().find(|p| p.id == id)
    }

    /// Save a poster. Returns the new id, or `None` when identical image
    /// data is already saved or no id above the current maximum is left.
    pub fn save(&mut self, image_data_url: &str) -> Option<u64> {
        let fp = fingerprint(image_data_url);
        if self.fingerprints.contains(&fp) {
            return None;
        }

        // Time-based, but never reused or going backwards.
        let last = self.posters.iter().map(|p| p.id).max().unwrap_or(0);
        let Some(next) = last.checked_add(1) else {
            warn!("Cannot save poster: gallery ids are exhausted");
            return None;
        };
        let id = now_millis().max(next);
        self.fingerprints.insert(fp);
        self.posters.push(SavedPoster {
            id,
            image_data_url: image_data_url.to_string(),
        });
        self.persist();
        Some(id)
    }

    /// Remove the poster with `id`. Unknown ids are ignored.
    pub fn delete(&mut self, id: u64) -> bool {
        let Some(pos) = self.posters.iter().position(|p| p.id == id) else {
            return false;
        };
        let removed = self.posters.remove(pos);
        self.fingerprints.remove(&fingerprint(&removed.image_data_url));
        self.persist();
        true
    }

    fn persist(&self) {
        if let Err(e) = self.storage.store(&self.posters) {
            warn!("Failed to save posters: {}", e);
        }
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Broken;

    impl GalleryStorage for Broken {
        fn load(&self) -> Result<Vec<SavedPoster>> {
            Err(Error::PersistenceError("disk on fire".into()))
        }

        fn store(&self, _posters: &[SavedPoster]) -> Result<()> {
            Err(Error::PersistenceError("disk on fire".into()))
        }
    }

    #[test]
    fn duplicate_saves_keep_one_entry() {
        let storage = MemoryStorage::new();
        let mut gallery = Gallery::open(storage.clone());
        assert!(gallery.save("data:image/png;base64,AAA").is_some());
        assert!(gallery.save("data:image/png;base64,AAA").is_none());
        assert_eq!(gallery.len(), 1);
        assert_eq!(storage.writes(), 1);
    }

    #[test]
    fn distinct_saves_get_increasing_ids() {
        let mut gallery = Gallery::open(MemoryStorage::new());
        let ids: Vec<u64> = (0..5)
            .filter_map(|i| gallery.save(&format!("data:image/png;base64,{}", i)))
            .collect();
        assert_eq!(ids.len(), 5);
        assert!(ids.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn ids_near_the_top_of_the_range() {
        let poster = |id, data: &str| SavedPoster { id, image_data_url: data.into() };

        let mut gallery = Gallery::open(MemoryStorage::with_posters(vec![poster(u64::MAX - 1, "data:image/png;base64,QQ==")]));
        assert_eq!(gallery.save("data:image/png;base64,Qg=="), Some(u64::MAX));

        let storage = MemoryStorage::with_posters(vec![poster(u64::MAX, "data:image/png;base64,QQ==")]);
        let mut full = Gallery::open(storage.clone());
        assert_eq!(full.save("data:image/png;base64,Qg=="), None);
        assert_eq!(full.len(), 1);
        assert!(!full.contains("data:image/png;base64,Qg=="));
        assert_eq!(storage.writes(), 0);
    }

    #[test]
    fn delete_unknown_is_noop() {
        let storage = MemoryStorage::new();
        let mut gallery = Gallery::open(storage.clone());
        let id = gallery.save("data:image/png;base64,AAA").unwrap();
        assert!(!gallery.delete(id + 1000));
        assert_eq!(storage.writes(), 1);
        assert!(gallery.delete(id));
        assert!(gallery.is_empty());
        assert!(storage.snapshot().is_empty());
        assert_eq!(storage.writes(), 2);
        // re-saving after delete is allowed
        assert!(gallery.save("data:image/png;base64,AAA").is_some());
    }

    #[test]
    fn every_mutation_rewrites_the_whole_list() {
        let storage = MemoryStorage::new();
        let mut gallery = Gallery::open(storage.clone());
        gallery.save("data:image/png;base64,A");
        gallery.save("data:image/png;base64,B");
        assert_eq!(storage.snapshot(), gallery.posters().to_vec());
    }

    #[test]
    fn storage_failures_are_not_fatal() {
        let mut gallery = Gallery::open(Broken);
        assert!(gallery.is_empty());
        let id = gallery.save("data:image/png;base64,AAA");
        assert!(id.is_some());
        assert!(gallery.contains("data:image/png;base64,AAA"));
    }

    #[test]
    fn loaded_duplicates_are_collapsed() {
        let poster = |id| SavedPoster { id, image_data_url: "data:image/png;base64,X".into() };
        let gallery = Gallery::open(MemoryStorage::with_posters(vec![poster(1), poster(2)]));
        assert_eq!(gallery.len(), 1);
        assert_eq!(gallery.posters()[0].id, 1);
    }

    #[test]
    fn serializes_with_camel_case_keys() {
        let json = serde_json::to_string(&SavedPoster { id: 5, image_data_url: "u".into() }).unwrap();
        assert_eq!(json, r#"{"id":5,"imageDataUrl":"u"}"#);
    }
}
