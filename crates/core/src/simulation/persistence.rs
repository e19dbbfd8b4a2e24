//! Saved runs and the stores that hold them.
//!
//! A [`SavedRun`] is the record written when the user saves a finished run:
//! the parameters, the seed fires it started from and a risk summary. Stores
//! implement [`RunStore`]; two are provided, an in-memory one for tests and
//! embedding and a JSON file one for the demos.

use crate::core_types::geo::LatLng;
use crate::core_types::weather::SimulationParameters;
use crate::simulation::replay::HistoricalRun;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, PoisonError};
use tracing::{debug, info, warn};

/// Identifier assigned by a store when a run is saved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RunId(pub u64);

impl fmt::Display for RunId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A seed fire as stored with a run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct InitialFire {
    pub lat: f64,
    pub lng: f64,
    #[serde(default = "default_intensity")]
    pub intensity: f64,
}

fn default_intensity() -> f64 {
    1.0
}

impl InitialFire {
    pub fn position(&self) -> LatLng {
        LatLng::new(self.lat, self.lng)
    }
}

/// Everything recorded when a run is saved.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedRun {
    pub timestamp: DateTime<Utc>,
    pub location: String,
    /// Ticks elapsed when the run ended
    pub duration: u64,
    /// Map centre at save time
    pub coordinates: LatLng,
    pub parameters: SimulationParameters,
    pub initial_fires: Vec<InitialFire>,
    pub fire_risk: u8,
    pub fire_detected: bool,
}

/// A saved run plus the store-side fields.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct StoredRun {
    id: RunId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    name: Option<String>,
    #[serde(flatten)]
    run: SavedRun,
}

impl StoredRun {
    fn to_historical(&self) -> Result<HistoricalRun, PersistenceError> {
        let value = serde_json::to_value(self)
            .map_err(|e| PersistenceError::SerializeFailed(e.to_string()))?;
        HistoricalRun::from_value(value).map_err(|e| PersistenceError::ParseFailed(e.to_string()))
    }
}

/// Backend for saved runs. Implementations must be callable from any thread.
pub trait RunStore: Send + Sync {
    /// Persist a run and return its new id.
    ///
    /// # Errors
    /// Returns an error if the backend rejects or cannot write the record.
    fn save(&self, run: &SavedRun) -> Result<RunId, PersistenceError>;

    /// Up to `limit` runs, newest first.
    ///
    /// # Errors
    /// Returns an error if the backend cannot be read.
    fn recent(&self, limit: usize) -> Result<Vec<HistoricalRun>, PersistenceError>;

    /// Set the display name of a run. A blank name clears it.
    ///
    /// # Errors
    /// Returns [`PersistenceError::NotFound`] for an unknown id.
    fn rename(&self, id: RunId, name: &str) -> Result<(), PersistenceError>;

    /// Remove a run.
    ///
    /// # Errors
    /// Returns [`PersistenceError::NotFound`] for an unknown id.
    fn delete(&self, id: RunId) -> Result<(), PersistenceError>;
}

fn normalize_name(name: &str) -> Option<String> {
    let trimmed = name.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

fn newest_first(mut runs: Vec<HistoricalRun>, limit: usize) -> Vec<HistoricalRun> {
    runs.sort_by(|a, b| b.timestamp.cmp(&a.timestamp).then(b.id.cmp(&a.id)));
    runs.truncate(limit);
    runs
}

/// Run store kept in process memory.
#[derive(Debug, Default)]
pub struct InMemoryRunStore {
    runs: Mutex<Vec<StoredRun>>,
    next_id: AtomicU64,
}

impl InMemoryRunStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.runs.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl RunStore for InMemoryRunStore {
    fn save(&self, run: &SavedRun) -> Result<RunId, PersistenceError> {
        let id = RunId(self.next_id.fetch_add(1, Ordering::SeqCst) + 1);
        self.runs
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(StoredRun {
                id,
                name: None,
                run: run.clone(),
            });
        debug!("Stored run {id} in memory");
        Ok(id)
    }

    fn recent(&self, limit: usize) -> Result<Vec<HistoricalRun>, PersistenceError> {
        let runs = self.runs.lock().unwrap_or_else(PoisonError::into_inner);
        let listing = runs
            .iter()
            .map(StoredRun::to_historical)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(newest_first(listing, limit))
    }

    fn rename(&self, id: RunId, name: &str) -> Result<(), PersistenceError> {
        let mut runs = self.runs.lock().unwrap_or_else(PoisonError::into_inner);
        let stored = runs
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or(PersistenceError::NotFound(id))?;
        stored.name = normalize_name(name);
        Ok(())
    }

    fn delete(&self, id: RunId) -> Result<(), PersistenceError> {
        let mut runs = self.runs.lock().unwrap_or_else(PoisonError::into_inner);
        let before = runs.len();
        runs.retain(|r| r.id != id);
        if runs.len() == before {
            return Err(PersistenceError::NotFound(id));
        }
        Ok(())
    }
}

fn entry_id(entry: &Value) -> Option<RunId> {
    entry.get("id").and_then(Value::as_u64).map(RunId)
}

/// Run store backed by a single pretty-printed JSON array on disk.
///
/// Entries are kept as raw JSON. Records with unusable parameters or seed
/// fires are still listed and rewritten untouched; they fail on replay.
#[derive(Debug)]
pub struct JsonFileRunStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl JsonFileRunStore {
    /// Use `path` as the backing file. It is created on the first save.
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        JsonFileRunStore {
            path: path.as_ref().to_path_buf(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load_all(&self) -> Result<Vec<Value>, PersistenceError> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(PersistenceError::LoadFailed(e.to_string())),
        };
        if contents.trim().is_empty() {
            return Ok(Vec::new());
        }
        serde_json::from_str(&contents).map_err(|e| PersistenceError::ParseFailed(e.to_string()))
    }

    fn save_all(&self, entries: &[Value]) -> Result<(), PersistenceError> {
        let contents = serde_json::to_string_pretty(entries)
            .map_err(|e| PersistenceError::SerializeFailed(e.to_string()))?;
        fs::write(&self.path, contents).map_err(|e| PersistenceError::SaveFailed(e.to_string()))
    }
}

impl RunStore for JsonFileRunStore {
    fn save(&self, run: &SavedRun) -> Result<RunId, PersistenceError> {
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        let mut entries = self.load_all()?;
        let last = entries.iter().filter_map(entry_id).map(|id| id.0).max();
        let id = RunId(last.unwrap_or(0) + 1);
        let stored = StoredRun {
            id,
            name: None,
            run: run.clone(),
        };
        entries.push(
            serde_json::to_value(&stored)
                .map_err(|e| PersistenceError::SerializeFailed(e.to_string()))?,
        );
        self.save_all(&entries)?;
        info!("Saved run {id} to {}", self.path.display());
        Ok(id)
    }

    fn recent(&self, limit: usize) -> Result<Vec<HistoricalRun>, PersistenceError> {
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        let listing = self
            .load_all()?
            .into_iter()
            .filter_map(|entry| match HistoricalRun::from_value(entry) {
                Ok(run) => Some(run),
                Err(err) => {
                    warn!("Skipping unlisted entry in {}: {err}", self.path.display());
                    None
                }
            })
            .collect();
        Ok(newest_first(listing, limit))
    }

    fn rename(&self, id: RunId, name: &str) -> Result<(), PersistenceError> {
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        let mut entries = self.load_all()?;
        let fields = entries
            .iter_mut()
            .filter(|entry| entry_id(entry) == Some(id))
            .find_map(Value::as_object_mut)
            .ok_or(PersistenceError::NotFound(id))?;
        match normalize_name(name) {
            Some(name) => {
                fields.insert("name".to_string(), Value::String(name));
            }
            None => {
                fields.remove("name");
            }
        }
        self.save_all(&entries)
    }

    fn delete(&self, id: RunId) -> Result<(), PersistenceError> {
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        let mut entries = self.load_all()?;
        let before = entries.len();
        entries.retain(|entry| entry_id(entry) != Some(id));
        if entries.len() == before {
            return Err(PersistenceError::NotFound(id));
        }
        self.save_all(&entries)
    }
}

/// Errors that can occur with persistence operations
#[derive(Debug)]
pub enum PersistenceError {
    /// Failed to load file
    LoadFailed(String),
    /// Failed to parse file contents
    ParseFailed(String),
    /// Failed to serialize state
    SerializeFailed(String),
    /// Failed to save file
    SaveFailed(String),
    /// No run with this id
    NotFound(RunId),
}

impl fmt::Display for PersistenceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PersistenceError::LoadFailed(msg) => write!(f, "Failed to load: {msg}"),
            PersistenceError::ParseFailed(msg) => write!(f, "Failed to parse: {msg}"),
            PersistenceError::SerializeFailed(msg) => write!(f, "Failed to serialize: {msg}"),
            PersistenceError::SaveFailed(msg) => write!(f, "Failed to save: {msg}"),
            PersistenceError::NotFound(id) => write!(f, "No saved run with id {id}"),
        }
    }
}

impl std::error::Error for PersistenceError {}
