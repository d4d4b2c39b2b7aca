use std::{
    collections::HashMap,
    fs, io,
    path::{Path, PathBuf},
    sync::{Mutex, PoisonError},
};

use tracing::debug;

use crate::error::Result;

/// Key the collection blob lives under in a key-value backend.
pub const COLLECTION_KEY: &str = "shelfmark.collection";

/// Where the serialized collection is kept. A backend stores one blob and
/// replaces it whole on every write.
pub trait Backend {
    /// `None` when nothing has been stored yet.
    fn read(&self) -> Result<Option<String>>;

    fn write(&self, contents: &str) -> Result<()>;

    /// Whether payloads should be pretty-printed before writing.
    fn pretty(&self) -> bool {
        false
    }
}

/// JSON file on disk, replaced through a temporary sibling file and a rename
/// so a reader never sees a half-written collection.
#[derive(Debug, Clone)]
pub struct FileBackend {
    path: PathBuf,
}

impl FileBackend {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| "collection".into());
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

impl Backend for FileBackend {
    fn read(&self) -> Result<Option<String>> {
        match fs::read_to_string(&self.path) {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn write(&self, contents: &str) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let temp = self.temp_path();
        fs::write(&temp, contents)?;
        fs::rename(&temp, &self.path)?;
        debug!(path = %self.path.display(), bytes = contents.len(), "Wrote collection file");
        Ok(())
    }

    fn pretty(&self) -> bool {
        true
    }
}

/// In-process key-value backend, the collection sits under [COLLECTION_KEY].
#[derive(Debug, Default)]
pub struct MemoryBackend {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Backend that already holds `contents` as its stored collection.
    pub fn with_contents(contents: impl Into<String>) -> Self {
        let backend = Self::default();
        backend.entries().insert(COLLECTION_KEY.to_string(), contents.into());
        backend
    }

    pub fn contents(&self) -> Option<String> {
        self.entries().get(COLLECTION_KEY).cloned()
    }

    fn entries(&self) -> std::sync::MutexGuard<'_, HashMap<String, String>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Backend for MemoryBackend {
    fn read(&self) -> Result<Option<String>> {
        Ok(self.contents())
    }

    fn write(&self, contents: &str) -> Result<()> {
        self.entries()
            .insert(COLLECTION_KEY.to_string(), contents.to_string());
        Ok(())
    }
}
