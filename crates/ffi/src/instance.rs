use rustc_hash::FxHashMap;
use std::os::raw::c_char;
use std::ptr;
use std::sync::{Arc, Mutex, RwLock};
use survival_fire_core::{ActorId, CookingTracker, FireSimulation, NotificationLog, SimulationConfig};

use crate::error::{DefaultSurvivalFireError, SurvivalFireErrorCode};
use crate::helpers::{str_from_ptr, track_error, track_result};

/// The survival fire context of one game session.
///
/// # Thread Safety
/// `SurvivalFireInstance` can be shared across engine threads.
///
/// - The simulation sits behind an `RwLock`: queries take `.read()`, updates
///   and player actions take `.write()`
/// - Cooking trackers sit behind a `Mutex`, one tracker per actor
/// - Notifications collect in a `NotificationLog` that the host drains with
///   `survival_fire_poll_notification`
///
/// # Usage in Game Engines
///
/// ```cpp
/// SurvivalFireInstance* FireSim = nullptr;
///
/// void AFireManager::BeginPlay() {
///     if (survival_fire_new(nullptr, &FireSim) != SurvivalFireErrorCode::Ok) {
///         UE_LOG(LogTemp, Error, TEXT("%s"), UTF8_TO_TCHAR(survival_fire_get_last_error()));
///     }
/// }
///
/// void AFireManager::Tick(float DeltaTime) {
///     survival_fire_update(FireSim, DeltaTime, &Callbacks);
///     survival_fire_update_cooking(FireSim, PlayerId, DeltaTime, &Callbacks);
/// }
///
/// void AFireManager::EndPlay(const EEndPlayReason::Type Reason) {
///     survival_fire_destroy(FireSim);
///     FireSim = nullptr;
/// }
/// ```
pub struct SurvivalFireInstance {
    pub(crate) sim: RwLock<FireSimulation>,
    pub(crate) cooking: Mutex<FxHashMap<ActorId, CookingTracker>>,
    pub(crate) notifications: Arc<NotificationLog>,
}

impl SurvivalFireInstance {
    pub(crate) fn new(config: SimulationConfig, seed: Option<u64>) -> Box<Self> {
        let notifications = Arc::new(NotificationLog::new());
        let sim = match seed {
            Some(seed) => FireSimulation::with_seed(config, notifications.clone(), seed),
            None => FireSimulation::new(config, notifications.clone()),
        };
        tracing::info!("Created survival fire instance (seed: {seed:?})");
        Box::new(Self {
            sim: RwLock::new(sim),
            cooking: Mutex::new(FxHashMap::default()),
            notifications,
        })
    }

    /// Parse an optional JSON config; null means the built-in defaults.
    fn config_from_ptr(config_json: *const c_char) -> Result<SimulationConfig, DefaultSurvivalFireError> {
        if config_json.is_null() {
            return Ok(SimulationConfig::default());
        }
        let json = str_from_ptr(config_json, "config_json")?;
        Ok(SimulationConfig::from_json_str(json)?)
    }
}

fn create(
    config_json: *const c_char,
    seed: Option<u64>,
    out_instance: *mut *mut SurvivalFireInstance,
) -> SurvivalFireErrorCode {
    if out_instance.is_null() {
        return track_error(&DefaultSurvivalFireError::null_pointer("out_instance"));
    }

    let created = SurvivalFireInstance::config_from_ptr(config_json)
        .map(|config| SurvivalFireInstance::new(config, seed));
    match track_result(created) {
        Ok(instance) => {
            // SAFETY: `out_instance` checked non-null above
            unsafe {
                *out_instance = Box::into_raw(instance);
            }
            SurvivalFireErrorCode::Ok
        }
        Err(code) => {
            // SAFETY: `out_instance` checked non-null above
            unsafe {
                *out_instance = ptr::null_mut();
            }
            code
        }
    }
}

/// Create a new survival fire instance and return it via out-parameter.
///
/// Parameters
/// - `config_json`: JSON `SimulationConfig`, or null for the built-in defaults.
///   Missing fields take their default values.
/// - `out_instance`: receives the instance on success, null on failure.
///
/// Returns
/// - `Ok` on success
/// - `NullPointer` if `out_instance` is null
/// - `InvalidParameter` if `config_json` is not UTF-8
/// - `PersistenceFailed` if `config_json` does not parse
///
/// # Safety
/// - `config_json` must be null or a null-terminated string.
/// - `out_instance` must point to writable memory.
/// - The caller owns the instance and MUST call `survival_fire_destroy` exactly once.
#[no_mangle]
pub unsafe extern "C" fn survival_fire_new(
    config_json: *const c_char,
    out_instance: *mut *mut SurvivalFireInstance,
) -> SurvivalFireErrorCode {
    create(config_json, None, out_instance)
}

/// Like `survival_fire_new`, with weather rolls drawn from a seeded generator
/// so runs can be replayed.
///
/// # Safety
/// Same contract as `survival_fire_new`.
#[no_mangle]
pub unsafe extern "C" fn survival_fire_new_seeded(
    config_json: *const c_char,
    seed: u64,
    out_instance: *mut *mut SurvivalFireInstance,
) -> SurvivalFireErrorCode {
    create(config_json, Some(seed), out_instance)
}

/// Destroy an instance created by `survival_fire_new`.
///
/// Null is a no-op.
///
/// # Safety
/// - `ptr` MUST come from `survival_fire_new` or `survival_fire_new_seeded`
///   and must not have been destroyed already.
/// - The pointer must not be used after this call.
#[no_mangle]
pub unsafe extern "C" fn survival_fire_destroy(ptr: *mut SurvivalFireInstance) {
    if ptr.is_null() {
        return;
    }

    // SAFETY: created by `Box::into_raw` in `survival_fire_new` and not freed yet
    unsafe {
        drop(Box::from_raw(ptr));
    }
}
