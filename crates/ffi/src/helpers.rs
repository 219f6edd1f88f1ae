use crate::error::{
    with_last_error_mut, DefaultSurvivalFireError, SurvivalFireError, SurvivalFireErrorCode,
};
use crate::instance::SurvivalFireInstance;
use std::ffi::{CStr, CString};
use std::os::raw::c_char;
use survival_fire_core::{FireId, FireSimulation};

/// Set the thread-local error message and code.
pub(crate) fn set_last_error(error: &impl SurvivalFireError) {
    with_last_error_mut(|(cstring, code)| {
        *cstring = CString::new(error.msg()).ok();
        *code = error.code();
    });
}

/// Track an error by setting it in thread-local storage and returning its code.
#[inline]
pub(crate) fn track_error(error: &impl SurvivalFireError) -> SurvivalFireErrorCode {
    tracing::debug!("FFI call failed ({:?}): {}", error.code(), error.msg());
    set_last_error(error);
    error.code()
}

/// Clear the thread-local error message and code.
/// Called on successful operations.
pub(crate) fn clear_last_error() {
    with_last_error_mut(|(cstring, code)| {
        *cstring = None;
        *code = SurvivalFireErrorCode::Ok;
    });
}

/// Record the outcome of an operation and convert it to an FFI code.
pub(crate) fn track_result<T, E>(result: Result<T, E>) -> Result<T, SurvivalFireErrorCode>
where
    E: Into<DefaultSurvivalFireError>,
{
    match result {
        Ok(value) => {
            clear_last_error();
            Ok(value)
        }
        Err(err) => Err(track_error(&err.into())),
    }
}

/// Run an FFI body and collapse its result into a single code.
pub(crate) fn handle_ffi_result_error<F>(body: F) -> SurvivalFireErrorCode
where
    F: FnOnce() -> Result<(), DefaultSurvivalFireError>,
{
    match track_result(body()) {
        Ok(()) => SurvivalFireErrorCode::Ok,
        Err(code) => code,
    }
}

/// Borrow the instance behind `ptr`.
pub(crate) fn instance_from_ptr<'a>(
    ptr: *const SurvivalFireInstance,
) -> Result<&'a SurvivalFireInstance, DefaultSurvivalFireError> {
    // SAFETY: callers pass pointers returned by `survival_fire_new`; null is rejected here.
    unsafe { ptr.as_ref() }.ok_or_else(|| DefaultSurvivalFireError::null_pointer("ptr"))
}

/// Read a caller string argument.
pub(crate) fn str_from_ptr<'a>(
    ptr: *const c_char,
    param_name: &str,
) -> Result<&'a str, DefaultSurvivalFireError> {
    if ptr.is_null() {
        return Err(DefaultSurvivalFireError::null_pointer(param_name));
    }
    // SAFETY: non-null, and the caller guarantees a null-terminated string
    // that outlives this call.
    unsafe { CStr::from_ptr(ptr) }
        .to_str()
        .map_err(|_| DefaultSurvivalFireError::invalid_string(param_name))
}

pub(crate) fn fire_id_from_ptr(ptr: *const c_char) -> Result<FireId, DefaultSurvivalFireError> {
    str_from_ptr(ptr, "fire_id").map(FireId::from)
}

/// Copy `text` into a caller buffer of `capacity` bytes as a null-terminated
/// string, truncating on a character boundary if needed.
pub(crate) fn write_c_string(
    text: &str,
    out: *mut c_char,
    capacity: usize,
) -> Result<(), DefaultSurvivalFireError> {
    if out.is_null() {
        return Err(DefaultSurvivalFireError::null_pointer("out_buffer"));
    }
    if capacity == 0 {
        return Err(DefaultSurvivalFireError::invalid_parameter(
            "Buffer capacity must be at least 1".to_string(),
        ));
    }
    let mut len = text.len().min(capacity - 1);
    while !text.is_char_boundary(len) {
        len -= 1;
    }
    // SAFETY: `out` is non-null and the caller guarantees `capacity` writable bytes;
    // `len + 1 <= capacity`.
    unsafe {
        std::ptr::copy_nonoverlapping(text.as_ptr().cast::<c_char>(), out, len);
        *out.add(len) = 0;
    }
    Ok(())
}

/// Run `func` with shared access to the simulation.
pub(crate) fn with_fire_sim<F, T>(
    instance: &SurvivalFireInstance,
    func: F,
) -> Result<T, DefaultSurvivalFireError>
where
    F: FnOnce(&FireSimulation) -> T,
{
    let sim = instance
        .sim
        .read()
        .map_err(|_| DefaultSurvivalFireError::lock_poisoned("RwLock"))?;
    Ok(func(&sim))
}

/// Run `func` with exclusive access to the simulation.
pub(crate) fn with_fire_sim_mut<F, T>(
    instance: &SurvivalFireInstance,
    func: F,
) -> Result<T, DefaultSurvivalFireError>
where
    F: FnOnce(&mut FireSimulation) -> T,
{
    let mut sim = instance
        .sim
        .write()
        .map_err(|_| DefaultSurvivalFireError::lock_poisoned("RwLock"))?;
    Ok(func(&mut sim))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_c_string_truncates_on_char_boundary() {
        let mut buffer = [1 as c_char; 4];
        write_c_string("aé!", buffer.as_mut_ptr(), buffer.len()).unwrap();
        // 'é' is two bytes and fits exactly
        assert_eq!(buffer[3], 0);

        let mut small = [1 as c_char; 3];
        write_c_string("aé!", small.as_mut_ptr(), small.len()).unwrap();
        assert_eq!(small[0], b'a' as c_char);
        assert_eq!(small[1], 0);
    }

    #[test]
    fn test_track_result_sets_and_clears_last_error() {
        let failed: Result<(), DefaultSurvivalFireError> =
            Err(DefaultSurvivalFireError::null_pointer("fire_id"));
        assert_eq!(
            track_result(failed).unwrap_err(),
            SurvivalFireErrorCode::NullPointer
        );
        assert_eq!(
            crate::error::survival_fire_get_last_error_code(),
            SurvivalFireErrorCode::NullPointer
        );

        track_result(Ok::<(), DefaultSurvivalFireError>(())).unwrap();
        assert_eq!(
            crate::error::survival_fire_get_last_error_code(),
            SurvivalFireErrorCode::Ok
        );
        assert!(crate::error::survival_fire_get_last_error().is_null());
    }
}
