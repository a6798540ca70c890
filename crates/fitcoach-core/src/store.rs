//! Client-local persisted plan store.
//!
//! Holds the single active [`Plan`]. The in-memory value and the persisted
//! copy are kept in step: a write reaches storage before the in-memory plan
//! changes, so a failed write leaves both untouched.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::model::Plan;
use crate::plan::decode::validate_plan;

/// Storage key holding the serialized active plan.
pub const PLAN_KEY: &str = "fitnessPlan";

/// Errors from persisting or removing the active plan.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("storage I/O failed at {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to serialize plan: {0}")]
    Serialize(#[from] serde_json::Error),
}

// ---------------------------------------------------------------------------
// Storage backends
// ---------------------------------------------------------------------------

/// Key/value backend for the plan store.
pub trait PlanStorage {
    fn read(&self, key: &str) -> Result<Option<String>, StoreError>;
    fn write(&mut self, key: &str, value: &str) -> Result<(), StoreError>;
    fn remove(&mut self, key: &str) -> Result<(), StoreError>;
}

/// One JSON file per key inside a data directory.
#[derive(Debug, Clone)]
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Default data directory: `$XDG_DATA_HOME/fitcoach` or the platform
    /// equivalent, falling back to `./.fitcoach`.
    pub fn default_dir() -> PathBuf {
        dirs::data_dir()
            .map(|d| d.join("fitcoach"))
            .unwrap_or_else(|| PathBuf::from(".fitcoach"))
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

fn io_error(path: &Path) -> impl FnOnce(std::io::Error) -> StoreError + '_ {
    move |source| StoreError::Io {
        path: path.to_path_buf(),
        source,
    }
}

impl PlanStorage for FileStorage {
    fn read(&self, key: &str) -> Result<Option<String>, StoreError> {
        let path = self.path_for(key);
        match std::fs::read_to_string(&path) {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(io_error(&path)(e)),
        }
    }

    fn write(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        std::fs::create_dir_all(&self.dir).map_err(io_error(&self.dir))?;
        let path = self.path_for(key);
        // Write-then-rename so a crash never leaves a truncated plan behind.
        let tmp = self.dir.join(format!("{key}.json.tmp"));
        std::fs::write(&tmp, value).map_err(io_error(&tmp))?;
        std::fs::rename(&tmp, &path).map_err(io_error(&path))?;
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StoreError> {
        let path = self.path_for(key);
        match std::fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(io_error(&path)(e)),
        }
    }
}

/// In-memory backend, used by tests and throwaway sessions.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    entries: HashMap<String, String>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a raw value, bypassing serialization.
    pub fn with_entry(mut self, key: &str, value: &str) -> Self {
        self.entries.insert(key.to_string(), value.to_string());
        self
    }
}

impl PlanStorage for MemoryStorage {
    fn read(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.entries.get(key).cloned())
    }

    fn write(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StoreError> {
        self.entries.remove(key);
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Store
// ---------------------------------------------------------------------------

/// The single active plan plus its persisted copy.
#[derive(Debug)]
pub struct PlanStore<S: PlanStorage> {
    storage: S,
    plan: Option<Plan>,
}

impl<S: PlanStorage> PlanStore<S> {
    /// Restore the last persisted plan.
    ///
    /// Missing, unreadable or corrupt data all yield an empty store; the
    /// latter two are logged and never surfaced to the caller. A plan that
    /// decodes but breaks the plan invariants counts as corrupt.
    pub fn load(storage: S) -> Self {
        let plan = match storage.read(PLAN_KEY) {
            Ok(Some(raw)) => match serde_json::from_str::<Plan>(&raw) {
                Ok(plan) => match validate_plan(&plan) {
                    Ok(()) => Some(plan),
                    Err(e) => {
                        tracing::warn!(error = %e, "ignoring invalid saved plan");
                        None
                    }
                },
                Err(e) => {
                    tracing::warn!(error = %e, "ignoring corrupt saved plan");
                    None
                }
            },
            Ok(None) => None,
            Err(e) => {
                tracing::warn!(error = %e, "failed to read saved plan");
                None
            }
        };
        Self { storage, plan }
    }

    /// The active plan, if any.
    pub fn get(&self) -> Option<&Plan> {
        self.plan.as_ref()
    }

    /// Replace the active plan wholesale and persist it.
    pub fn set(&mut self, plan: Plan) -> Result<(), StoreError> {
        let raw = serde_json::to_string(&plan)?;
        self.storage.write(PLAN_KEY, &raw)?;
        self.plan = Some(plan);
        Ok(())
    }

    /// Remove the active plan and its persisted copy.
    pub fn clear(&mut self) -> Result<(), StoreError> {
        self.storage.remove(PLAN_KEY)?;
        self.plan = None;
        Ok(())
    }

    /// Give back the storage backend (e.g. to simulate a restart).
    pub fn into_storage(self) -> S {
        self.storage
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Meal, Workout};

    /// Reads from an inner backend; rejects every write and remove.
    struct ReadOnlyStorage(MemoryStorage);

    impl PlanStorage for ReadOnlyStorage {
        fn read(&self, key: &str) -> Result<Option<String>, StoreError> {
            self.0.read(key)
        }

        fn write(&mut self, key: &str, _value: &str) -> Result<(), StoreError> {
            Err(read_only(key))
        }

        fn remove(&mut self, key: &str) -> Result<(), StoreError> {
            Err(read_only(key))
        }
    }

    fn read_only(key: &str) -> StoreError {
        StoreError::Io {
            path: PathBuf::from(key),
            source: std::io::Error::from(std::io::ErrorKind::PermissionDenied),
        }
    }

    fn plan(name: &str) -> Plan {
        Plan {
            name: Some(name.into()),
            summary: "Three sessions a week.".into(),
            workouts: vec![Workout {
                name: "Squat".into(),
                sets: 4,
                reps: 8,
                rest: "90s".into(),
            }],
            meals: vec![Meal {
                meal: "Lunch".into(),
                items: vec!["Rice".into(), "Chicken".into()],
            }],
        }
    }

    #[test]
    fn empty_storage_loads_empty() {
        let store = PlanStore::load(MemoryStorage::new());
        assert!(store.get().is_none());
    }

    #[test]
    fn set_then_reload_restores_equal_plan() {
        let mut store = PlanStore::load(MemoryStorage::new());
        store.set(plan("Ana")).unwrap();
        let reloaded = PlanStore::load(store.into_storage());
        assert_eq!(reloaded.get(), Some(&plan("Ana")));
    }

    #[test]
    fn set_replaces_whole_plan() {
        let mut store = PlanStore::load(MemoryStorage::new());
        store.set(plan("Ana")).unwrap();
        store.set(plan("Ben")).unwrap();
        assert_eq!(store.get().unwrap().name.as_deref(), Some("Ben"));
    }

    #[test]
    fn clear_then_reload_is_empty() {
        let mut store = PlanStore::load(MemoryStorage::new());
        store.set(plan("Ana")).unwrap();
        store.clear().unwrap();
        assert!(store.get().is_none());
        let reloaded = PlanStore::load(store.into_storage());
        assert!(reloaded.get().is_none());
    }

    #[test]
    fn clear_on_empty_store_is_ok() {
        let mut store = PlanStore::load(MemoryStorage::new());
        store.clear().unwrap();
        store.clear().unwrap();
        assert!(store.get().is_none());
    }

    #[test]
    fn corrupt_saved_plan_is_treated_as_empty() {
        let storage = MemoryStorage::new().with_entry(PLAN_KEY, "{not json");
        let store = PlanStore::load(storage);
        assert!(store.get().is_none());
    }

    #[test]
    fn saved_plan_breaking_invariants_is_treated_as_empty() {
        let raw = r#"{"summary":"s","workouts":[{"name":"","sets":0,"reps":0,"rest":""}],"meals":[{"meal":"","items":[]}]}"#;
        let store = PlanStore::load(MemoryStorage::new().with_entry(PLAN_KEY, raw));
        assert!(store.get().is_none());

        let zero_reps = r#"{"name":"Ana","summary":"s","workouts":[{"name":"Squat","sets":3,"reps":0,"rest":"60s"}],"meals":[]}"#;
        let store = PlanStore::load(MemoryStorage::new().with_entry(PLAN_KEY, zero_reps));
        assert!(store.get().is_none());

        let unlabelled_meal = r#"{"summary":"s","workouts":[],"meals":[{"meal":" ","items":["Rice"]}]}"#;
        let store = PlanStore::load(MemoryStorage::new().with_entry(PLAN_KEY, unlabelled_meal));
        assert!(store.get().is_none());
    }

    #[test]
    fn failed_write_keeps_previous_plan() {
        let mut store = PlanStore::load(MemoryStorage::new());
        store.set(plan("Ana")).unwrap();

        let mut store = PlanStore::load(ReadOnlyStorage(store.into_storage()));

        assert!(store.set(plan("Ben")).is_err());
        assert_eq!(store.get().unwrap().name.as_deref(), Some("Ana"));
        assert!(store.clear().is_err());
        assert!(store.get().is_some());
    }

    #[test]
    fn file_storage_roundtrip() {
        let tmp = tempfile::TempDir::new().unwrap();
        let dir = tmp.path().join("nested");

        let mut store = PlanStore::load(FileStorage::new(&dir));
        store.set(plan("Ana")).unwrap();
        assert!(dir.join("fitnessPlan.json").exists());
        assert!(!dir.join("fitnessPlan.json.tmp").exists());

        let reloaded = PlanStore::load(FileStorage::new(&dir));
        assert_eq!(reloaded.get(), Some(&plan("Ana")));

        let mut reloaded = reloaded;
        reloaded.clear().unwrap();
        assert!(!dir.join("fitnessPlan.json").exists());
    }
}
