use std::os::raw::c_char;
use survival_fire_core::{ActorId, ExtinguishReason, FireType, Rotation, Vec3, Weather};

use crate::error::{DefaultSurvivalFireError, SurvivalFireErrorCode};
use crate::helpers::{
    fire_id_from_ptr, handle_ffi_result_error, instance_from_ptr, str_from_ptr, with_fire_sim_mut,
    write_c_string,
};
use crate::instance::SurvivalFireInstance;
use crate::inventory::{CallbackInventories, InventoryCallbacks};

/// Pass as `actor` to light a fire without checking anyone's inventory.
pub const SURVIVAL_FIRE_NO_ACTOR: u32 = u32::MAX;

fn finite(value: f32, name: &str) -> Result<f32, DefaultSurvivalFireError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(DefaultSurvivalFireError::invalid_parameter(format!(
            "{name} must be finite, got {value}"
        )))
    }
}

/// Advance every fire by `dt` seconds.
///
/// Queued commands run first, then burning and weather. Fires that went out
/// are removed at the end of the call.
///
/// # Safety
/// - `ptr` must come from `survival_fire_new`.
/// - `callbacks` must be null or point to valid `InventoryCallbacks`.
///
/// Returns `InvalidParameter` if `dt` is non-finite or negative.
#[no_mangle]
pub unsafe extern "C" fn survival_fire_update(
    ptr: *const SurvivalFireInstance,
    dt: f32,
    callbacks: *const InventoryCallbacks,
) -> SurvivalFireErrorCode {
    handle_ffi_result_error(|| {
        let instance = instance_from_ptr(ptr)?;
        let dt = finite(dt, "dt")?;
        if dt < 0.0 {
            return Err(DefaultSurvivalFireError::invalid_parameter(format!(
                "dt must not be negative, got {dt}"
            )));
        }
        // SAFETY: upheld by the caller
        let mut inventories = unsafe { CallbackInventories::from_ptr(callbacks) };
        with_fire_sim_mut(instance, |sim| {
            sim.tick(dt, &mut inventories);
        })
    })
}

/// Place a new, unlit fire and write its id to `out_id`.
///
/// `fire_type` follows `FireType` (0 campfire, 1 torch, 2 forge,
/// 3 signal fire, 4 cooking fire). `yaw` turns the fire about the vertical
/// (z) axis, in radians.
///
/// # Safety
/// - `ptr` must come from `survival_fire_new`.
/// - `out_id` must point to `capacity` writable bytes.
#[no_mangle]
pub unsafe extern "C" fn survival_fire_spawn(
    ptr: *const SurvivalFireInstance,
    fire_type: u8,
    x: f32,
    y: f32,
    z: f32,
    yaw: f32,
    is_player_made: bool,
    out_id: *mut c_char,
    capacity: usize,
) -> SurvivalFireErrorCode {
    handle_ffi_result_error(|| {
        let instance = instance_from_ptr(ptr)?;
        let fire_type = FireType::from_u8(fire_type).ok_or_else(|| {
            DefaultSurvivalFireError::invalid_parameter(format!("Unknown fire type {fire_type}"))
        })?;
        let position = Vec3::new(finite(x, "x")?, finite(y, "y")?, finite(z, "z")?);
        let rotation = Rotation::from_axis_angle(&Vec3::z_axis(), finite(yaw, "yaw")?);

        let id = with_fire_sim_mut(instance, |sim| {
            sim.spawn_fire(fire_type, position, rotation, is_player_made)
        })??;
        write_c_string(id.as_str(), out_id, capacity)
    })
}

/// Light a fire.
///
/// With an `actor`, one of the configured ignition sources must be in their
/// inventory. Pass `SURVIVAL_FIRE_NO_ACTOR` to skip the check.
///
/// # Safety
/// - `ptr` must come from `survival_fire_new`.
/// - `fire_id` must be a null-terminated string.
/// - `callbacks` must be null or point to valid `InventoryCallbacks`.
#[no_mangle]
pub unsafe extern "C" fn survival_fire_ignite(
    ptr: *const SurvivalFireInstance,
    fire_id: *const c_char,
    actor: u32,
    callbacks: *const InventoryCallbacks,
) -> SurvivalFireErrorCode {
    handle_ffi_result_error(|| {
        let instance = instance_from_ptr(ptr)?;
        let id = fire_id_from_ptr(fire_id)?;
        let actor = (actor != SURVIVAL_FIRE_NO_ACTOR).then_some(ActorId(actor));
        // SAFETY: upheld by the caller
        let mut inventories = unsafe { CallbackInventories::from_ptr(callbacks) };
        with_fire_sim_mut(instance, |sim| sim.ignite_fire(&id, actor, &mut inventories))??;
        Ok(())
    })
}

/// Move `quantity` of `item_id` from the actor's inventory onto a fire.
///
/// On success the fire's new fuel amount (burn-seconds) is written to
/// `out_fuel_amount` when it is non-null.
///
/// # Safety
/// - `ptr` must come from `survival_fire_new`.
/// - `fire_id` and `item_id` must be null-terminated strings.
/// - `callbacks` must be null or point to valid `InventoryCallbacks`.
/// - `out_fuel_amount` must be null or writable.
#[no_mangle]
pub unsafe extern "C" fn survival_fire_add_fuel(
    ptr: *const SurvivalFireInstance,
    fire_id: *const c_char,
    actor: u32,
    item_id: *const c_char,
    quantity: u32,
    callbacks: *const InventoryCallbacks,
    out_fuel_amount: *mut f32,
) -> SurvivalFireErrorCode {
    handle_ffi_result_error(|| {
        let instance = instance_from_ptr(ptr)?;
        let id = fire_id_from_ptr(fire_id)?;
        let item_id = str_from_ptr(item_id, "item_id")?;
        // SAFETY: upheld by the caller
        let mut inventories = unsafe { CallbackInventories::from_ptr(callbacks) };

        let added = with_fire_sim_mut(instance, |sim| {
            sim.add_fuel(&id, ActorId(actor), item_id, quantity, &mut inventories)
        })??;
        if !out_fuel_amount.is_null() {
            // SAFETY: non-null and writable per the contract
            unsafe { *out_fuel_amount = added.fuel_amount };
        }
        Ok(())
    })
}

/// Put a fire out. `reason` follows `ExtinguishReason` (1 put out, 2 rain, 3 wind).
///
/// Putting out a fire that is already out succeeds and writes `false` to
/// `out_changed` (when non-null).
///
/// # Safety
/// - `ptr` must come from `survival_fire_new`.
/// - `fire_id` must be a null-terminated string.
/// - `out_changed` must be null or writable.
#[no_mangle]
pub unsafe extern "C" fn survival_fire_extinguish(
    ptr: *const SurvivalFireInstance,
    fire_id: *const c_char,
    reason: u8,
    out_changed: *mut bool,
) -> SurvivalFireErrorCode {
    handle_ffi_result_error(|| {
        let instance = instance_from_ptr(ptr)?;
        let id = fire_id_from_ptr(fire_id)?;
        let reason = ExtinguishReason::from_u8(reason)
            .filter(|reason| *reason != ExtinguishReason::FuelExhausted)
            .ok_or_else(|| {
                DefaultSurvivalFireError::invalid_parameter(format!(
                    "Unknown extinguish reason {reason}"
                ))
            })?;

        let changed = with_fire_sim_mut(instance, |sim| sim.extinguish_fire(&id, reason))??;
        if !out_changed.is_null() {
            // SAFETY: non-null and writable per the contract
            unsafe { *out_changed = changed };
        }
        Ok(())
    })
}

/// Replace the current weather.
///
/// `rain` and `snow` are intensities in 0-1; wind is a velocity whose
/// magnitude is the wind strength.
///
/// # Safety
/// - `ptr` must come from `survival_fire_new`.
#[no_mangle]
pub unsafe extern "C" fn survival_fire_set_weather(
    ptr: *const SurvivalFireInstance,
    rain: f32,
    wind_x: f32,
    wind_y: f32,
    wind_z: f32,
    snow: f32,
    ambient_temperature: f32,
) -> SurvivalFireErrorCode {
    handle_ffi_result_error(|| {
        let instance = instance_from_ptr(ptr)?;
        let weather = Weather {
            rain_intensity: finite(rain, "rain")?.clamp(0.0, 1.0),
            wind: Vec3::new(
                finite(wind_x, "wind_x")?,
                finite(wind_y, "wind_y")?,
                finite(wind_z, "wind_z")?,
            ),
            snow_intensity: finite(snow, "snow")?.clamp(0.0, 1.0),
            ambient_temperature: finite(ambient_temperature, "ambient_temperature")?,
        };
        with_fire_sim_mut(instance, |sim| sim.set_weather(weather))
    })
}
