use std::os::raw::c_char;
use survival_fire_core::{FireError, FireInstance, FireSimulation, Vec3};

use crate::error::{DefaultSurvivalFireError, SurvivalFireErrorCode};
use crate::helpers::{
    fire_id_from_ptr, handle_ffi_result_error, instance_from_ptr, with_fire_sim, write_c_string,
};
use crate::instance::SurvivalFireInstance;

/// `FireStatus::extinguish_reason` of a fire that has not gone out.
pub const SURVIVAL_FIRE_NO_REASON: u8 = u8::MAX;

/// FFI-friendly snapshot of one fire.
/// Keep this layout stable for C/C++/C# consumers.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FireStatus {
    /// `FireState` as u8 (0 unlit, 1 igniting, 2 smoldering, 3 burning,
    /// 4 blazing, 5 dying, 6 extinguished).
    pub state: u8,
    /// `FireType` as u8.
    pub fire_type: u8,
    /// Celsius.
    pub temperature: f32,
    /// Remaining burn-seconds.
    pub fuel_amount: f32,
    pub max_fuel_capacity: f32,
    /// 0-100.
    pub fuel_percentage: f32,
    /// Seconds spent lit.
    pub burn_time_elapsed: f32,
    pub is_lit: bool,
    pub needs_fuel: bool,
    pub is_player_made: bool,
    /// `ExtinguishReason` as u8, or `SURVIVAL_FIRE_NO_REASON`.
    pub extinguish_reason: u8,
    pub position_x: f32,
    pub position_y: f32,
    pub position_z: f32,
}

impl FireStatus {
    fn new(fire: &FireInstance, sim: &FireSimulation) -> Self {
        let position = fire.position();
        Self {
            state: fire.state().as_u8(),
            fire_type: fire.fire_type().as_u8(),
            temperature: fire.temperature(),
            fuel_amount: fire.fuel_amount(),
            max_fuel_capacity: fire.max_fuel_capacity(),
            fuel_percentage: fire.fuel_percentage(),
            burn_time_elapsed: fire.burn_time_elapsed(),
            is_lit: fire.is_lit(),
            needs_fuel: fire.needs_fuel(&sim.config().thresholds),
            is_player_made: fire.is_player_made(),
            extinguish_reason: fire
                .extinguish_reason()
                .map_or(SURVIVAL_FIRE_NO_REASON, |reason| reason.as_u8()),
            position_x: position.x,
            position_y: position.y,
            position_z: position.z,
        }
    }
}

/// Fill `out_status` with the current state of a fire.
///
/// Thread-safe: takes a read lock.
///
/// # Safety
/// - `ptr` must come from `survival_fire_new`.
/// - `fire_id` must be a null-terminated string.
/// - `out_status` must point to a writable `FireStatus`.
#[no_mangle]
pub unsafe extern "C" fn survival_fire_get_fire_state(
    ptr: *const SurvivalFireInstance,
    fire_id: *const c_char,
    out_status: *mut FireStatus,
) -> SurvivalFireErrorCode {
    handle_ffi_result_error(|| {
        if out_status.is_null() {
            return Err(DefaultSurvivalFireError::null_pointer("out_status"));
        }
        let instance = instance_from_ptr(ptr)?;
        let id = fire_id_from_ptr(fire_id)?;

        let status = with_fire_sim(instance, |sim| {
            sim.fire(&id).map(|fire| FireStatus::new(fire, sim))
        })?
        .ok_or_else(|| FireError::UnknownFire(id))?;
        // SAFETY: checked non-null; writable per the contract
        unsafe { *out_status = status };
        Ok(())
    })
}

/// Number of fires currently in the world.
///
/// # Safety
/// - `ptr` must come from `survival_fire_new`.
/// - `out_count` must be writable.
#[no_mangle]
pub unsafe extern "C" fn survival_fire_fire_count(
    ptr: *const SurvivalFireInstance,
    out_count: *mut usize,
) -> SurvivalFireErrorCode {
    handle_ffi_result_error(|| {
        if out_count.is_null() {
            return Err(DefaultSurvivalFireError::null_pointer("out_count"));
        }
        let instance = instance_from_ptr(ptr)?;
        let count = with_fire_sim(instance, FireSimulation::fire_count)?;
        // SAFETY: checked non-null
        unsafe { *out_count = count };
        Ok(())
    })
}

/// Write the id of the fire at `index` (0..count) to `out_id`.
///
/// Indices are only stable until the next `survival_fire_update`.
///
/// # Safety
/// - `ptr` must come from `survival_fire_new`.
/// - `out_id` must point to `capacity` writable bytes.
#[no_mangle]
pub unsafe extern "C" fn survival_fire_get_fire_id(
    ptr: *const SurvivalFireInstance,
    index: usize,
    out_id: *mut c_char,
    capacity: usize,
) -> SurvivalFireErrorCode {
    handle_ffi_result_error(|| {
        let instance = instance_from_ptr(ptr)?;
        let id = with_fire_sim(instance, |sim| {
            sim.fires().get(index).map(|fire| fire.id().clone())
        })?
        .ok_or_else(|| {
            DefaultSurvivalFireError::invalid_parameter(format!("No fire at index {index}"))
        })?;
        write_c_string(id.as_str(), out_id, capacity)
    })
}

/// Total warmth felt at a point from every fire.
///
/// # Safety
/// - `ptr` must come from `survival_fire_new`.
/// - `out_warmth` must be writable.
#[no_mangle]
pub unsafe extern "C" fn survival_fire_warmth_at(
    ptr: *const SurvivalFireInstance,
    x: f32,
    y: f32,
    z: f32,
    out_warmth: *mut f32,
) -> SurvivalFireErrorCode {
    handle_ffi_result_error(|| {
        if out_warmth.is_null() {
            return Err(DefaultSurvivalFireError::null_pointer("out_warmth"));
        }
        let instance = instance_from_ptr(ptr)?;
        let warmth = with_fire_sim(instance, |sim| sim.warmth_at(&Vec3::new(x, y, z)))?;
        // SAFETY: checked non-null
        unsafe { *out_warmth = warmth };
        Ok(())
    })
}

/// Pop the oldest pending player notification.
///
/// Writes the message to `out_message` (truncated to `capacity`), its
/// `Severity` to `out_severity` and whether one was available to
/// `out_available`. With nothing pending, `out_available` is `false` and the
/// buffers are left untouched.
///
/// # Safety
/// - `ptr` must come from `survival_fire_new`.
/// - `out_message` must point to `capacity` writable bytes.
/// - `out_severity` and `out_available` must be writable.
#[no_mangle]
pub unsafe extern "C" fn survival_fire_poll_notification(
    ptr: *const SurvivalFireInstance,
    out_message: *mut c_char,
    capacity: usize,
    out_severity: *mut u8,
    out_available: *mut bool,
) -> SurvivalFireErrorCode {
    handle_ffi_result_error(|| {
        if out_severity.is_null() {
            return Err(DefaultSurvivalFireError::null_pointer("out_severity"));
        }
        if out_available.is_null() {
            return Err(DefaultSurvivalFireError::null_pointer("out_available"));
        }
        let instance = instance_from_ptr(ptr)?;

        let Some(notification) = instance.notifications.pop_front() else {
            // SAFETY: checked non-null
            unsafe { *out_available = false };
            return Ok(());
        };
        write_c_string(&notification.message, out_message, capacity)?;
        // SAFETY: checked non-null
        unsafe {
            *out_severity = notification.severity.as_u8();
            *out_available = true;
        }
        Ok(())
    })
}
