use crate::error::SourceError;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

pub const PLAYER_CACHE_FILE: &str = "player_images.json";
pub const TEAM_CACHE_FILE: &str = "team_images.json";

/// Resolves an entity name to an image URL. `None` means no image was found.
pub trait ImageLookup {
    fn player_image(&self, player_link: &str) -> Result<Option<String>, SourceError>;
    fn team_image(&self, team_name: &str) -> Result<Option<String>, SourceError>;
}

/// Lookup that never finds anything, for offline runs.
pub struct NoImages;

impl ImageLookup for NoImages {
    fn player_image(&self, _player_link: &str) -> Result<Option<String>, SourceError> {
        Ok(None)
    }

    fn team_image(&self, _team_name: &str) -> Result<Option<String>, SourceError> {
        Ok(None)
    }
}

/// Name -> image URL mapping persisted as a JSON object between runs.
///
/// Misses are stored as `""` so a failed lookup is not retried within the
/// lifetime of the cache file.
#[derive(Debug, Default)]
pub struct ImageCache {
    path: Option<PathBuf>,
    entries: BTreeMap<String, String>,
    dirty: bool,
}

impl ImageCache {
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// Loads the cache file; a missing or unreadable file starts an empty cache.
    pub fn load(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let entries = match fs::read_to_string(&path) {
            Ok(contents) => match serde_json::from_str(&contents) {
                Ok(entries) => entries,
                Err(err) => {
                    tracing::warn!(path = %path.display(), error = %err, "ignoring corrupt image cache");
                    BTreeMap::new()
                }
            },
            Err(_) => BTreeMap::new(),
        };

        tracing::debug!(path = %path.display(), entries = entries.len(), "loaded image cache");

        Self {
            path: Some(path),
            entries,
            dirty: false,
        }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries.get(name).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns the cached path for `name`, running `fetch` on a miss and
    /// remembering its result (or `""` when it fails or finds nothing).
    pub fn resolve<F>(&mut self, name: &str, fetch: F) -> String
    where
        F: FnOnce(&str) -> Result<Option<String>, SourceError>,
    {
        if let Some(hit) = self.entries.get(name) {
            return hit.clone();
        }

        let resolved = match fetch(name) {
            Ok(Some(url)) => url,
            Ok(None) => {
                tracing::debug!(name, "no image found");
                String::new()
            }
            Err(err) => {
                tracing::warn!(name, error = %err, "image lookup failed");
                String::new()
            }
        };

        self.entries.insert(name.to_string(), resolved.clone());
        self.dirty = true;
        resolved
    }

    /// Writes the cache back if anything was added since loading.
    pub fn save(&mut self) -> Result<(), SourceError> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        if !self.dirty {
            return Ok(());
        }

        write_json(path, &self.entries)?;
        tracing::debug!(path = %path.display(), entries = self.len(), "saved image cache");
        self.dirty = false;
        Ok(())
    }
}

fn write_json(path: &Path, entries: &BTreeMap<String, String>) -> Result<(), SourceError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    let serialized = serde_json::to_vec_pretty(entries)?;
    fs::write(path, serialized)?;
    Ok(())
}

/// The player and team caches used by one run.
#[derive(Debug, Default)]
pub struct ImageStores {
    pub players: ImageCache,
    pub teams: ImageCache,
}

impl ImageStores {
    pub fn load(dir: &Path) -> Self {
        Self {
            players: ImageCache::load(dir.join(PLAYER_CACHE_FILE)),
            teams: ImageCache::load(dir.join(TEAM_CACHE_FILE)),
        }
    }

    pub fn save(&mut self) -> Result<(), SourceError> {
        self.players.save()?;
        self.teams.save()
    }
}
