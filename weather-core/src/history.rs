//! Bounded, newest-first list of past searches and where it is kept between runs.

use std::{
    fmt::Debug,
    fs,
    path::{Path, PathBuf},
    sync::{Arc, Mutex, PoisonError},
};

use crate::{error::HistoryError, model::HistoryEntry};

pub const MAX_HISTORY_ENTRIES: usize = 10;

/// Past successful searches, newest first, never longer than [`MAX_HISTORY_ENTRIES`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchHistory {
    entries: Vec<HistoryEntry>,
}

impl SearchHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from an already ordered list, dropping anything past the cap.
    pub fn from_entries(mut entries: Vec<HistoryEntry>) -> Self {
        entries.truncate(MAX_HISTORY_ENTRIES);
        Self { entries }
    }

    /// Insert at the front. Returns the tail entry evicted to keep the cap, if any.
    pub fn push_front(&mut self, entry: HistoryEntry) -> Option<HistoryEntry> {
        self.entries.insert(0, entry);
        if self.entries.len() > MAX_HISTORY_ENTRIES { self.entries.pop() } else { None }
    }

    /// Remove the entry with `id`. Other entries keep their order.
    pub fn remove(&mut self, id: &str) -> Option<HistoryEntry> {
        let idx = self.entries.iter().position(|e| e.id == id)?;
        Some(self.entries.remove(idx))
    }

    pub fn get(&self, id: &str) -> Option<&HistoryEntry> {
        self.entries.iter().find(|e| e.id == id)
    }

    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }

    pub fn iter(&self) -> impl Iterator<Item = &HistoryEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn to_json(&self) -> Result<String, HistoryError> {
        Ok(serde_json::to_string(&self.entries)?)
    }

    pub fn from_json(raw: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str::<Vec<HistoryEntry>>(raw).map(Self::from_entries)
    }

    /// Read whatever `storage` holds. Missing, unreadable or malformed data yields an
    /// empty history; the problem is only logged.
    pub fn restore(storage: &dyn HistoryStorage) -> Self {
        let raw = match storage.load() {
            Ok(Some(raw)) => raw,
            Ok(None) => return Self::default(),
            Err(e) => {
                tracing::warn!("Error loading search history: {e}");
                return Self::default();
            }
        };

        match Self::from_json(&raw) {
            Ok(history) => {
                tracing::debug!(entries = history.len(), "search history restored");
                history
            }
            Err(e) => {
                tracing::warn!("Discarding malformed search history: {e}");
                Self::default()
            }
        }
    }

    /// Overwrite the stored list with this one.
    pub fn persist(&self, storage: &dyn HistoryStorage) -> Result<(), HistoryError> {
        storage.save(&self.to_json()?)
    }
}

/// A single-slot string store, the moral equivalent of one local-storage key.
pub trait HistoryStorage: Send + Sync + Debug {
    fn load(&self) -> Result<Option<String>, HistoryError>;
    fn save(&self, raw: &str) -> Result<(), HistoryError>;
}

/// Keeps the history as a JSON file on disk.
#[derive(Debug, Clone)]
pub struct FileHistoryStorage {
    path: PathBuf,
}

impl FileHistoryStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_error(&self, source: std::io::Error) -> HistoryError {
        HistoryError::Io { path: self.path.clone(), source }
    }
}

impl HistoryStorage for FileHistoryStorage {
    fn load(&self) -> Result<Option<String>, HistoryError> {
        match fs::read_to_string(&self.path) {
            Ok(raw) => Ok(Some(raw)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(self.io_error(e)),
        }
    }

    fn save(&self, raw: &str) -> Result<(), HistoryError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| self.io_error(e))?;
        }
        fs::write(&self.path, raw).map_err(|e| self.io_error(e))
    }
}

/// In-process storage. Clones share the same slot.
#[derive(Debug, Clone, Default)]
pub struct MemoryHistoryStorage {
    slot: Arc<Mutex<Option<String>>>,
}

impl MemoryHistoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_contents(raw: impl Into<String>) -> Self {
        Self { slot: Arc::new(Mutex::new(Some(raw.into()))) }
    }

    pub fn contents(&self) -> Option<String> {
        self.slot.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }
}

impl HistoryStorage for MemoryHistoryStorage {
    fn load(&self) -> Result<Option<String>, HistoryError> {
        Ok(self.contents())
    }

    fn save(&self, raw: &str) -> Result<(), HistoryError> {
        *self.slot.lock().unwrap_or_else(PoisonError::into_inner) = Some(raw.to_string());
        Ok(())
    }
}
