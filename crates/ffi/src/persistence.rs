use std::os::raw::c_char;

use crate::error::{DefaultSurvivalFireError, SurvivalFireErrorCode};
use crate::helpers::{
    handle_ffi_result_error, instance_from_ptr, str_from_ptr, with_fire_sim, with_fire_sim_mut,
};
use crate::instance::SurvivalFireInstance;

fn write_count(out_count: *mut u32, count: usize) {
    if !out_count.is_null() {
        // SAFETY: non-null and writable per the callers' contracts
        unsafe { *out_count = u32::try_from(count).unwrap_or(u32::MAX) };
    }
}

/// Write every live fire to `slot` of the save file at `path`.
///
/// Other slots in the file are kept. The file is replaced only once the new
/// contents are written.
///
/// # Safety
/// - `ptr` must come from `survival_fire_new`.
/// - `path` and `slot` must be null-terminated strings.
/// - `out_count` must be null or writable.
#[no_mangle]
pub unsafe extern "C" fn survival_fire_save_slot(
    ptr: *const SurvivalFireInstance,
    path: *const c_char,
    slot: *const c_char,
    out_count: *mut u32,
) -> SurvivalFireErrorCode {
    handle_ffi_result_error(|| {
        let instance = instance_from_ptr(ptr)?;
        let path = str_from_ptr(path, "path")?;
        let slot = str_from_ptr(slot, "slot")?;
        let saved = with_fire_sim(instance, |sim| sim.save_slot(path, slot))??;
        write_count(out_count, saved);
        Ok(())
    })
}

/// Replace every fire with the contents of `slot`.
///
/// A slot that was never written restores no fires. On error the current
/// fires are left as they were. Pending cooking is dropped.
///
/// # Safety
/// - `ptr` must come from `survival_fire_new`.
/// - `path` and `slot` must be null-terminated strings.
/// - `out_count` must be null or writable.
#[no_mangle]
pub unsafe extern "C" fn survival_fire_load_slot(
    ptr: *const SurvivalFireInstance,
    path: *const c_char,
    slot: *const c_char,
    out_count: *mut u32,
) -> SurvivalFireErrorCode {
    handle_ffi_result_error(|| {
        let instance = instance_from_ptr(ptr)?;
        let path = str_from_ptr(path, "path")?;
        let slot = str_from_ptr(slot, "slot")?;
        let restored = with_fire_sim_mut(instance, |sim| sim.load_slot(path, slot))??;
        instance
            .cooking
            .lock()
            .map_err(|_| DefaultSurvivalFireError::lock_poisoned("Mutex"))?
            .clear();
        write_count(out_count, restored);
        Ok(())
    })
}
