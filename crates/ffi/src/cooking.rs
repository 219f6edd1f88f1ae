use std::os::raw::c_char;
use survival_fire_core::{ActorId, CookingOutcome, FireError, InvalidOperation};

use crate::error::{DefaultSurvivalFireError, SurvivalFireErrorCode};
use crate::helpers::{
    fire_id_from_ptr, handle_ffi_result_error, instance_from_ptr, str_from_ptr, with_fire_sim,
};
use crate::instance::SurvivalFireInstance;
use crate::inventory::{CallbackInventory, InventoryCallbacks};

/// Counts of cooking processes that ended during one update.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CookingSummary {
    pub completed: u32,
    pub ruined: u32,
    /// Fire was removed from the world while cooking
    pub abandoned: u32,
    pub in_progress: u32,
}

fn callbacks_ref<'a>(
    callbacks: *const InventoryCallbacks,
) -> Result<&'a InventoryCallbacks, DefaultSurvivalFireError> {
    // SAFETY: callers pass null or a valid pointer
    unsafe { callbacks.as_ref() }.ok_or_else(|| FireError::from(InvalidOperation::NoInventory).into())
}

/// Put one `raw_item` from the actor's inventory on a fire.
///
/// The fire must be burning steadily. On success the process id is written
/// to `out_process_id` when it is non-null.
///
/// # Safety
/// - `ptr` must come from `survival_fire_new`.
/// - `fire_id` and `raw_item` must be null-terminated strings.
/// - `callbacks` must point to valid `InventoryCallbacks`.
/// - `out_process_id` must be null or writable.
#[no_mangle]
pub unsafe extern "C" fn survival_fire_start_cooking(
    ptr: *const SurvivalFireInstance,
    actor: u32,
    fire_id: *const c_char,
    raw_item: *const c_char,
    callbacks: *const InventoryCallbacks,
    out_process_id: *mut u64,
) -> SurvivalFireErrorCode {
    handle_ffi_result_error(|| {
        let instance = instance_from_ptr(ptr)?;
        let id = fire_id_from_ptr(fire_id)?;
        let raw_item = str_from_ptr(raw_item, "raw_item")?;
        let callbacks = callbacks_ref(callbacks)?;
        let actor = ActorId(actor);
        let mut inventory = CallbackInventory::new(*callbacks, actor);

        let mut trackers = instance
            .cooking
            .lock()
            .map_err(|_| DefaultSurvivalFireError::lock_poisoned("Mutex"))?;
        let process = with_fire_sim(instance, |sim| {
            trackers
                .entry(actor)
                .or_insert_with(|| sim.cooking_tracker())
                .start_cooking(sim.fire(&id), raw_item, &mut inventory)
        })??;

        if !out_process_id.is_null() {
            // SAFETY: non-null and writable per the contract
            unsafe { *out_process_id = process.0 };
        }
        Ok(())
    })
}

/// Advance the actor's cooking by `dt` seconds.
///
/// Finished food goes into the actor's inventory; food on a fire that went
/// out or flared up is lost.
///
/// # Safety
/// - `ptr` must come from `survival_fire_new`.
/// - `callbacks` must point to valid `InventoryCallbacks`.
/// - `out_summary` must be null or writable.
#[no_mangle]
pub unsafe extern "C" fn survival_fire_update_cooking(
    ptr: *const SurvivalFireInstance,
    actor: u32,
    dt: f32,
    callbacks: *const InventoryCallbacks,
    out_summary: *mut CookingSummary,
) -> SurvivalFireErrorCode {
    handle_ffi_result_error(|| {
        let instance = instance_from_ptr(ptr)?;
        if !dt.is_finite() || dt < 0.0 {
            return Err(DefaultSurvivalFireError::invalid_parameter(format!(
                "dt must be finite and non-negative, got {dt}"
            )));
        }
        let callbacks = callbacks_ref(callbacks)?;
        let actor = ActorId(actor);
        let mut inventory = CallbackInventory::new(*callbacks, actor);

        let mut trackers = instance
            .cooking
            .lock()
            .map_err(|_| DefaultSurvivalFireError::lock_poisoned("Mutex"))?;
        let mut summary = CookingSummary::default();
        if let Some(tracker) = trackers.get_mut(&actor) {
            let outcomes = with_fire_sim(instance, |sim| tracker.update(dt, sim, &mut inventory))?;
            for outcome in outcomes {
                match outcome {
                    CookingOutcome::Completed { .. } => summary.completed += 1,
                    CookingOutcome::Ruined { .. } => summary.ruined += 1,
                    CookingOutcome::Abandoned { .. } => summary.abandoned += 1,
                }
            }
            summary.in_progress = tracker.len() as u32;
        }

        if !out_summary.is_null() {
            // SAFETY: non-null and writable per the contract
            unsafe { *out_summary = summary };
        }
        Ok(())
    })
}
