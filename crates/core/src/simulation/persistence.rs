//! Saving and restoring fires across game sessions
//!
//! A save file holds named slots, each a list of flat `FireRecord`s. Only
//! fires that are still alive are written. Loading a slot replaces the whole
//! fire set of a simulation.

use super::FireSimulation;
use crate::core_types::{FireId, Rotation, Vec3};
use crate::fire::{FireInstance, FireState, FireType, FireTypeProperties};
use crate::fuel::{FuelItem, FuelStock};
use chrono::{DateTime, Utc};
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, Mutex, OnceLock, PoisonError};
use std::thread::{self, JoinHandle};

/// Save format written by this version
pub const SAVE_FORMAT_VERSION: u32 = 1;

/// Burn-seconds a recorded fuel amount may differ from its items unreported
const FUEL_TOLERANCE: f32 = 1e-3;

/// Flat, serialisable state of one fire
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FireRecord {
    pub fire_id: FireId,
    pub fire_type: FireType,
    pub state: FireState,
    pub position: Vec3,
    pub rotation: Rotation,
    pub temperature: f32,
    pub fuel_amount: f32,
    pub max_fuel_capacity: f32,
    pub burn_time_elapsed: f32,
    pub is_lit: bool,
    pub is_player_made: bool,
    #[serde(default)]
    pub fuel_items: Vec<FuelItem>,
}

impl FireRecord {
    pub fn from_fire(fire: &FireInstance) -> Self {
        Self {
            fire_id: fire.id.clone(),
            fire_type: fire.fire_type,
            state: fire.state,
            position: fire.position,
            rotation: fire.rotation,
            temperature: fire.temperature,
            fuel_amount: fire.fuel_amount,
            max_fuel_capacity: fire.max_fuel_capacity,
            burn_time_elapsed: fire.burn_time_elapsed,
            is_lit: fire.is_lit,
            is_player_made: fire.is_player_made,
            fuel_items: fire.fuel.items().to_vec(),
        }
    }

    /// Rebuild a fire at the recorded pose.
    ///
    /// Fields are taken as recorded; values that break a fire invariant are
    /// clamped and logged. The fuel amount always comes from the recorded
    /// fuel items, and the lit flag from the recorded state.
    pub fn into_fire(self, properties: &FireTypeProperties) -> FireInstance {
        let id = self.fire_id;

        let max_fuel_capacity = if self.max_fuel_capacity > 0.0 {
            self.max_fuel_capacity
        } else {
            tracing::warn!(
                "Fire {id}: capacity {} replaced with {}",
                self.max_fuel_capacity,
                properties.max_fuel_capacity
            );
            properties.max_fuel_capacity
        };

        let mut fuel = FuelStock::from_items(self.fuel_items);
        fuel.limit_to(max_fuel_capacity);
        let fuel_amount = fuel.total_burn_time();
        if (fuel_amount - self.fuel_amount).abs() > FUEL_TOLERANCE {
            tracing::warn!(
                "Fire {id}: fuel {} replaced with {fuel_amount} held by its fuel items",
                self.fuel_amount
            );
        }

        let temperature = self.temperature.max(0.0);
        if temperature != self.temperature {
            tracing::warn!("Fire {id}: temperature {} clamped to 0", self.temperature);
        }

        // The lit flag follows the recorded state
        let is_lit = self.state.is_lit();
        if is_lit != self.is_lit {
            tracing::warn!("Fire {id}: lit flag {} corrected for {} fire", self.is_lit, self.state);
        }

        FireInstance {
            id,
            fire_type: self.fire_type,
            state: self.state,
            temperature,
            fuel_amount,
            max_fuel_capacity,
            burn_time_elapsed: self.burn_time_elapsed.max(0.0),
            fuel,
            is_lit,
            is_player_made: self.is_player_made,
            position: self.position,
            rotation: self.rotation,
            extinguish_reason: None,
            base_warmth: properties.base_warmth,
            max_temperature: properties.max_temperature,
            burn_rate: properties.burn_rate,
        }
    }
}

impl FireSimulation {
    /// Records of every fire that has not gone out
    pub fn snapshot(&self) -> Vec<FireRecord> {
        self.fires
            .iter()
            .filter(|fire| !fire.is_extinguished())
            .map(FireRecord::from_fire)
            .collect()
    }

    /// Ids of the fires a save started now would write
    pub fn select_for_save(&self) -> Vec<FireId> {
        self.fires
            .iter()
            .filter(|fire| !fire.is_extinguished())
            .map(|fire| fire.id().clone())
            .collect()
    }

    /// Records for `ids`, skipping fires that have since gone out or vanished
    pub fn records_for(&self, ids: &[FireId]) -> Vec<FireRecord> {
        ids.iter()
            .filter_map(|id| match self.fire(id) {
                Some(fire) if !fire.is_extinguished() => Some(FireRecord::from_fire(fire)),
                _ => {
                    tracing::debug!("Fire {id} gone before it could be saved");
                    None
                }
            })
            .collect()
    }

    /// Replace every fire with `records`. Returns how many were restored.
    ///
    /// Extinguished records, duplicate ids and unknown fire types are skipped.
    pub fn restore(&mut self, records: Vec<FireRecord>) -> usize {
        let mut fires: Vec<FireInstance> = Vec::with_capacity(records.len());
        for record in records {
            if record.state == FireState::Extinguished {
                tracing::warn!("Skipping extinguished fire {}", record.fire_id);
                continue;
            }
            if fires.iter().any(|fire| fire.id == record.fire_id) {
                tracing::warn!("Skipping duplicate fire {}", record.fire_id);
                continue;
            }
            let properties = match self.config.fire_types.get(record.fire_type) {
                Ok(properties) => properties,
                Err(missing) => {
                    tracing::warn!("Skipping fire {}: {missing}", record.fire_id);
                    continue;
                }
            };
            fires.push(record.into_fire(properties));
        }

        tracing::info!("Restored {} fires", fires.len());
        self.fires = fires;
        self.fires.len()
    }

    /// Write the live fires to `slot` of the save file at `path`
    ///
    /// # Errors
    /// Returns error if the existing file cannot be read or the new one written
    pub fn save_slot<P: AsRef<Path>>(&self, path: P, slot: &str) -> Result<usize, PersistenceError> {
        let records = self.snapshot();
        let count = records.len();
        SaveStore::write_slot(path, slot, records)?;
        Ok(count)
    }

    /// Replace every fire with the contents of `slot`
    ///
    /// # Errors
    /// Returns error if the save file exists but cannot be read or parsed
    pub fn load_slot<P: AsRef<Path>>(&mut self, path: P, slot: &str) -> Result<usize, PersistenceError> {
        let mut store = SaveStore::load(path)?;
        let records = store.take_slot(slot);
        Ok(self.restore(records))
    }
}

/// Save file contents
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaveStore {
    pub version: u32,
    /// Last time the file was written
    pub saved_at: DateTime<Utc>,
    pub slots: BTreeMap<String, Vec<FireRecord>>,
}

impl Default for SaveStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SaveStore {
    pub fn new() -> Self {
        Self {
            version: SAVE_FORMAT_VERSION,
            saved_at: Utc::now(),
            slots: BTreeMap::new(),
        }
    }

    /// Load a save file; a missing file is an empty store
    ///
    /// # Errors
    /// Returns error if file cannot be read or parsed
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, PersistenceError> {
        let contents = match fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Self::new()),
            Err(e) => return Err(PersistenceError::LoadFailed(e.to_string())),
        };

        let store: Self = serde_json::from_str(&contents)
            .map_err(|e| PersistenceError::ParseFailed(e.to_string()))?;

        if store.version > SAVE_FORMAT_VERSION {
            return Err(PersistenceError::ParseFailed(format!(
                "save format {} is newer than {SAVE_FORMAT_VERSION}",
                store.version
            )));
        }
        Ok(store)
    }

    /// Save to file, replacing it only once the new contents are on disk
    ///
    /// # Errors
    /// Returns error if file cannot be written or state cannot be serialized
    pub fn save<P: AsRef<Path>>(&mut self, path: P) -> Result<(), PersistenceError> {
        let path = path.as_ref();
        let lock = file_lock(path);
        let _guard = lock.lock().unwrap_or_else(PoisonError::into_inner);
        self.save_locked(path)
    }

    /// `save` for a caller already holding the file lock of `path`
    fn save_locked(&mut self, path: &Path) -> Result<(), PersistenceError> {
        self.version = SAVE_FORMAT_VERSION;
        self.saved_at = Utc::now();

        let contents = serde_json::to_string_pretty(self)
            .map_err(|e| PersistenceError::SerializeFailed(e.to_string()))?;

        let staging = staging_path(path);
        fs::write(&staging, contents).map_err(|e| PersistenceError::SaveFailed(e.to_string()))?;
        if let Err(e) = fs::rename(&staging, path) {
            let _ = fs::remove_file(&staging);
            return Err(PersistenceError::SaveFailed(e.to_string()));
        }

        Ok(())
    }

    /// Records of `slot`; empty when the slot was never written
    pub fn slot(&self, slot: &str) -> &[FireRecord] {
        self.slots.get(slot).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn take_slot(&mut self, slot: &str) -> Vec<FireRecord> {
        self.slots.remove(slot).unwrap_or_default()
    }

    pub fn set_slot(&mut self, slot: impl Into<String>, records: Vec<FireRecord>) {
        self.slots.insert(slot.into(), records);
    }

    pub fn remove_slot(&mut self, slot: &str) -> bool {
        self.slots.remove(slot).is_some()
    }

    /// Load the file at `path`, replace `slot` and write it back
    ///
    /// # Errors
    /// Returns error if the file cannot be read, parsed or written
    pub fn write_slot<P: AsRef<Path>>(
        path: P,
        slot: &str,
        records: Vec<FireRecord>,
    ) -> Result<(), PersistenceError> {
        let path = path.as_ref();
        // Held from load to rename: slot writes to one file never interleave
        let lock = file_lock(path);
        let _guard = lock.lock().unwrap_or_else(PoisonError::into_inner);

        let mut store = Self::load(path)?;
        let count = records.len();
        store.set_slot(slot, records);
        store.save_locked(path)?;
        tracing::info!("Saved {count} fires to slot '{slot}' of {}", path.display());
        Ok(())
    }
}

/// Process-wide lock for the save file at `path`
fn file_lock(path: &Path) -> Arc<Mutex<()>> {
    static LOCKS: OnceLock<Mutex<FxHashMap<PathBuf, Arc<Mutex<()>>>>> = OnceLock::new();

    let key = std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf());
    let mut locks = LOCKS
        .get_or_init(Mutex::default)
        .lock()
        .unwrap_or_else(PoisonError::into_inner);
    Arc::clone(locks.entry(key).or_default())
}

/// A staging file next to `path`, unique to this write
fn staging_path(path: &Path) -> PathBuf {
    static NEXT_STAGING: AtomicU64 = AtomicU64::new(0);

    let mut name = path.file_name().map(ToOwned::to_owned).unwrap_or_default();
    name.push(format!(
        ".{}-{}.tmp",
        std::process::id(),
        NEXT_STAGING.fetch_add(1, Ordering::Relaxed)
    ));
    path.with_file_name(name)
}

/// Counts down to the next auto-save
#[derive(Debug, Clone, PartialEq)]
pub struct AutoSaveTimer {
    interval: f32,
    elapsed: f32,
}

impl AutoSaveTimer {
    /// A non-positive interval never fires
    pub fn new(interval: f32) -> Self {
        Self {
            interval,
            elapsed: 0.0,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.interval > 0.0
    }

    /// Add `dt` seconds; returns `true` once per elapsed interval
    pub fn advance(&mut self, dt: f32) -> bool {
        if !self.is_enabled() || dt <= 0.0 {
            return false;
        }
        self.elapsed += dt;
        if self.elapsed >= self.interval {
            self.elapsed %= self.interval;
            true
        } else {
            false
        }
    }

    pub fn reset(&mut self) {
        self.elapsed = 0.0;
    }
}

/// One save for the background saver to write
#[derive(Debug, Clone)]
pub struct SaveJob {
    pub path: PathBuf,
    pub slot: String,
    pub records: Vec<FireRecord>,
}

/// Result of a finished background save
#[derive(Debug)]
pub struct SaveOutcome {
    pub slot: String,
    pub fires: usize,
    pub result: Result<(), PersistenceError>,
}

/// Writes saves on a worker thread so the tick never waits on disk
#[derive(Debug)]
pub struct BackgroundSaver {
    jobs: Option<Sender<SaveJob>>,
    outcomes: Receiver<SaveOutcome>,
    worker: Option<JoinHandle<()>>,
}

impl BackgroundSaver {
    /// Start the worker thread
    ///
    /// # Errors
    /// Returns `SaveFailed` if the thread cannot be spawned
    pub fn spawn() -> Result<Self, PersistenceError> {
        let (job_tx, job_rx) = mpsc::channel::<SaveJob>();
        let (outcome_tx, outcome_rx) = mpsc::channel();

        let worker = thread::Builder::new()
            .name("fire-save".to_string())
            .spawn(move || {
                for job in job_rx {
                    let fires = job.records.len();
                    let result = SaveStore::write_slot(&job.path, &job.slot, job.records);
                    if let Err(err) = &result {
                        tracing::error!("Background save of slot '{}' failed: {err}", job.slot);
                    }
                    let outcome = SaveOutcome {
                        slot: job.slot,
                        fires,
                        result,
                    };
                    if outcome_tx.send(outcome).is_err() {
                        break;
                    }
                }
            })
            .map_err(|e| PersistenceError::SaveFailed(e.to_string()))?;

        Ok(Self {
            jobs: Some(job_tx),
            outcomes: outcome_rx,
            worker: Some(worker),
        })
    }

    /// Queue a save without waiting for it
    ///
    /// # Errors
    /// Returns `SaveFailed` if the worker has stopped
    pub fn submit(&self, job: SaveJob) -> Result<(), PersistenceError> {
        let Some(jobs) = &self.jobs else {
            return Err(PersistenceError::SaveFailed("saver is shut down".to_string()));
        };
        jobs.send(job)
            .map_err(|_| PersistenceError::SaveFailed("save worker stopped".to_string()))
    }

    /// Outcomes of saves finished since the last poll
    pub fn poll(&self) -> Vec<SaveOutcome> {
        self.outcomes.try_iter().collect()
    }

    /// Finish queued saves and stop the worker
    pub fn shutdown(mut self) -> Vec<SaveOutcome> {
        self.stop();
        self.poll()
    }

    fn stop(&mut self) {
        self.jobs.take();
        if let Some(worker) = self.worker.take() {
            if worker.join().is_err() {
                tracing::error!("Save worker panicked");
            }
        }
    }
}

impl Drop for BackgroundSaver {
    fn drop(&mut self) {
        self.stop();
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
}

impl std::fmt::Display for PersistenceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PersistenceError::LoadFailed(msg) => write!(f, "Failed to load: {msg}"),
            PersistenceError::ParseFailed(msg) => write!(f, "Failed to parse: {msg}"),
            PersistenceError::SerializeFailed(msg) => write!(f, "Failed to serialize: {msg}"),
            PersistenceError::SaveFailed(msg) => write!(f, "Failed to save: {msg}"),
        }
    }
}

impl std::error::Error for PersistenceError {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fuel::{FuelType, FuelTypeProperties};
    use approx::assert_relative_eq;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("survival_fire_{name}_{}.json", std::process::id()))
    }

    fn record(id: &str, state: FireState) -> FireRecord {
        let logs = FuelTypeProperties::new("Logs", 20.0, 600.0, 1.0);
        FireRecord {
            fire_id: FireId::new(id),
            fire_type: FireType::Campfire,
            state,
            position: Vec3::new(1.0, 2.0, 3.0),
            rotation: Rotation::identity(),
            temperature: 420.0,
            fuel_amount: 20.0,
            max_fuel_capacity: 100.0,
            burn_time_elapsed: 12.5,
            is_lit: state.is_lit(),
            is_player_made: true,
            fuel_items: vec![FuelItem::new("wood_log", FuelType::Logs, 1, &logs)],
        }
    }

    fn campfire() -> FireTypeProperties {
        FireTypeProperties::new("Campfire", 100.0, 10.0, 900.0, 1.0)
    }

    #[test]
    fn test_record_round_trips_through_fire() {
        let original = record("fire-0001", FireState::Burning);
        let fire = original.clone().into_fire(&campfire());
        assert_eq!(fire.state(), FireState::Burning);
        assert_eq!(FireRecord::from_fire(&fire), original);
    }

    #[test]
    fn test_invalid_record_values_are_clamped() {
        let logs = FuelTypeProperties::new("Logs", 20.0, 600.0, 1.0);
        let mut bad = record("fire-0002", FireState::Unlit);
        bad.fuel_items = (0..7)
            .map(|_| FuelItem::new("wood_log", FuelType::Logs, 1, &logs))
            .collect();
        bad.fuel_amount = 250.0;
        bad.temperature = -40.0;
        bad.is_lit = true;

        let fire = bad.into_fire(&campfire());
        assert_relative_eq!(fire.fuel_amount(), 100.0);
        assert_relative_eq!(fire.fuel().total_burn_time(), 100.0);
        assert_eq!(fire.fuel().items().len(), 5);
        assert_eq!(fire.temperature(), 0.0);
        assert!(!fire.is_lit());
    }

    #[test]
    fn test_lit_flag_follows_recorded_state() {
        let mut stale = record("fire-0003", FireState::Burning);
        stale.is_lit = false;
        let fire = stale.into_fire(&campfire());
        assert!(fire.is_lit());
        assert_eq!(fire.state(), FireState::Burning);
    }

    #[test]
    fn test_fuel_amount_comes_from_fuel_items() {
        let mut empty = record("fire-0004", FireState::Smoldering);
        empty.fuel_items.clear();
        let fire = empty.into_fire(&campfire());
        assert_eq!(fire.fuel_amount(), 0.0);

        let mut overstated = record("fire-0005", FireState::Smoldering);
        overstated.fuel_amount = 55.0;
        let fire = overstated.into_fire(&campfire());
        assert_relative_eq!(fire.fuel_amount(), 20.0);
    }

    #[test]
    fn test_missing_file_is_empty_store() {
        let store = SaveStore::load(temp_path("does_not_exist")).unwrap();
        assert!(store.slots.is_empty());
        assert!(store.slot("autosave").is_empty());
    }

    #[test]
    fn test_corrupt_file_is_parse_error() {
        let path = temp_path("corrupt");
        fs::write(&path, "{ \"version\": 1, \"slots\": [").unwrap();
        let err = SaveStore::load(&path).unwrap_err();
        assert!(matches!(err, PersistenceError::ParseFailed(_)));
        let _ = fs::remove_file(path);
    }

    #[test]
    fn test_slots_are_independent() {
        let path = temp_path("slots");
        let _ = fs::remove_file(&path);

        SaveStore::write_slot(&path, "a", vec![record("fire-0001", FireState::Burning)]).unwrap();
        SaveStore::write_slot(&path, "b", Vec::new()).unwrap();

        let store = SaveStore::load(&path).unwrap();
        assert_eq!(store.version, SAVE_FORMAT_VERSION);
        assert_eq!(store.slot("a").len(), 1);
        assert!(store.slot("b").is_empty());
        assert!(store.slot("c").is_empty());

        let _ = fs::remove_file(path);
    }

    #[test]
    fn test_staging_files_are_unique_and_cleaned_up() {
        let path = temp_path("staging");
        let first = staging_path(&path);
        assert_ne!(first, staging_path(&path));
        assert_eq!(first.parent(), path.parent());

        SaveStore::new().save(&path).unwrap();
        let prefix = path.file_name().unwrap().to_string_lossy().into_owned();
        let leftovers = fs::read_dir(path.parent().unwrap())
            .unwrap()
            .filter_map(Result::ok)
            .map(|entry| entry.file_name().to_string_lossy().into_owned())
            .filter(|name| name.starts_with(&prefix) && name.ends_with(".tmp"))
            .count();
        assert_eq!(leftovers, 0);
        let _ = fs::remove_file(path);
    }

    #[test]
    fn test_autosave_timer() {
        let mut timer = AutoSaveTimer::new(1.0);
        assert!(!timer.advance(0.6));
        assert!(timer.advance(0.6));
        assert!(!timer.advance(0.3));

        let mut disabled = AutoSaveTimer::new(0.0);
        assert!(!disabled.advance(1000.0));
    }

    #[test]
    fn test_background_saver_writes_slot() {
        let path = temp_path("background");
        let _ = fs::remove_file(&path);

        let saver = BackgroundSaver::spawn().unwrap();
        saver
            .submit(SaveJob {
                path: path.clone(),
                slot: "autosave".to_string(),
                records: vec![record("fire-0001", FireState::Smoldering)],
            })
            .unwrap();
        let outcomes = saver.shutdown();
        assert_eq!(outcomes.len(), 1);
        assert!(outcomes[0].result.is_ok());
        assert_eq!(outcomes[0].fires, 1);

        let store = SaveStore::load(&path).unwrap();
        assert_eq!(store.slot("autosave")[0].state, FireState::Smoldering);
        let _ = fs::remove_file(path);
    }
}
