use std::cell::RefCell;
use std::ffi::CString;
use std::os::raw::c_char;
use std::ptr;

use survival_fire_core::{FireError, PersistenceError};

/// Common interface for FFI error types.
///
/// - `code()` - the error code passed across the FFI boundary
/// - `msg()` - the message kept for `survival_fire_get_last_error`
///
/// # Example
/// ```ignore
/// let err = DefaultSurvivalFireError::null_pointer("ptr");
/// assert_eq!(err.code(), SurvivalFireErrorCode::NullPointer);
/// assert_eq!(err.msg(), "Parameter 'ptr' cannot be null");
/// ```
pub(crate) trait SurvivalFireError {
    fn code(&self) -> SurvivalFireErrorCode;

    fn msg(&self) -> &str;
}

/// Default implementation of `SurvivalFireError`.
///
/// Wraps a `SurvivalFireErrorCode` with a message, with one constructor per
/// failure the FFI layer reports.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct DefaultSurvivalFireError {
    code: SurvivalFireErrorCode,
    msg: String,
}

impl DefaultSurvivalFireError {
    /// Create error for null pointer passed where non-null required.
    ///
    /// # Arguments
    /// * `param_name` - The name of the parameter that was null (e.g., `"out_instance"`, `"fire_id"`)
    pub fn null_pointer(param_name: &str) -> Self {
        Self {
            code: SurvivalFireErrorCode::NullPointer,
            msg: format!("Parameter '{param_name}' cannot be null"),
        }
    }

    /// Create error for poisoned lock.
    ///
    /// # Arguments
    /// * `lock_name` - The name of the lock that was poisoned (e.g., `"RwLock"`, `"Mutex"`)
    pub fn lock_poisoned(lock_name: &str) -> Self {
        Self {
            code: SurvivalFireErrorCode::LockPoisoned,
            msg: format!("Lock '{lock_name}' was poisoned by a panic in another thread"),
        }
    }

    /// Create error for invalid parameter.
    pub fn invalid_parameter(message: String) -> Self {
        Self {
            code: SurvivalFireErrorCode::InvalidParameter,
            msg: message,
        }
    }

    /// Create error for a string argument that is not valid UTF-8.
    pub fn invalid_string(param_name: &str) -> Self {
        Self::invalid_parameter(format!("Parameter '{param_name}' is not valid UTF-8"))
    }
}

impl From<FireError> for DefaultSurvivalFireError {
    fn from(error: FireError) -> Self {
        let code = match &error {
            FireError::InvalidOperation(_) => SurvivalFireErrorCode::InvalidOperation,
            FireError::MissingConfiguration(_) => SurvivalFireErrorCode::MissingConfiguration,
            FireError::UnknownFire(_) => SurvivalFireErrorCode::UnknownFire,
        };
        Self {
            code,
            msg: error.to_string(),
        }
    }
}

impl From<PersistenceError> for DefaultSurvivalFireError {
    fn from(error: PersistenceError) -> Self {
        Self {
            code: SurvivalFireErrorCode::PersistenceFailed,
            msg: error.to_string(),
        }
    }
}

impl SurvivalFireError for DefaultSurvivalFireError {
    fn code(&self) -> SurvivalFireErrorCode {
        self.code
    }

    fn msg(&self) -> &str {
        &self.msg
    }
}

/// FFI error codes returned by survival fire functions.
/// Follows standard C convention: 0 = success, non-zero = error.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SurvivalFireErrorCode {
    /// Operation completed successfully.
    Ok = 0,

    /// Invalid pointer: null pointer passed where non-null required.
    NullPointer = 1,

    /// Lock poisoned: internal synchronization primitive was poisoned by a panic.
    LockPoisoned = 2,

    /// Invalid parameter passed to function.
    InvalidParameter = 3,

    /// No fire with the given id exists.
    UnknownFire = 4,

    /// The request is not valid for the fire's current state or the actor's inventory.
    InvalidOperation = 5,

    /// A fuel type, fire type, recipe or fuel item has no configuration.
    MissingConfiguration = 6,

    /// Reading, parsing or writing a save file or config failed.
    PersistenceFailed = 7,
}

impl From<DefaultSurvivalFireError> for SurvivalFireErrorCode {
    fn from(error: DefaultSurvivalFireError) -> Self {
        error.code
    }
}

thread_local! {
    /// Thread-local storage for the most recent FFI error (C string, error code).
    /// The CString is kept here so the pointer handed out stays valid.
    static LAST_ERROR: RefCell<(Option<CString>, SurvivalFireErrorCode)> =
        const { RefCell::new((None, SurvivalFireErrorCode::Ok)) };
}

pub(crate) fn with_last_error<F, R>(f: F) -> R
where
    F: FnOnce(&(Option<CString>, SurvivalFireErrorCode)) -> R,
{
    LAST_ERROR.with_borrow(f)
}

pub(crate) fn with_last_error_mut<F, R>(f: F) -> R
where
    F: FnOnce(&mut (Option<CString>, SurvivalFireErrorCode)) -> R,
{
    LAST_ERROR.with_borrow_mut(f)
}

/// Retrieve the most recent FFI error message as a null-terminated C string.
///
/// Returns:
/// - A borrowed pointer to the error message if an error occurred.
/// - `null` if no error has occurred.
///
/// # Thread Safety
/// Error messages are stored per-thread, so each thread sees only its own errors.
///
/// # Lifetime
/// The returned pointer is valid until the next FFI call on this thread that
/// sets or clears the error.
///
/// **DO NOT FREE THIS POINTER** - it is managed internally.
///
/// Example:
/// ```cpp
/// SurvivalFireErrorCode err = survival_fire_ignite(sim, "fire-0001", 1, &callbacks);
/// if (err != SurvivalFireErrorCode::Ok) {
///     const char* error = survival_fire_get_last_error();
///     if (error) {
///         printf("Could not light the fire: %s\n", error);
///     }
/// }
/// ```
#[no_mangle]
pub extern "C" fn survival_fire_get_last_error() -> *const c_char {
    with_last_error(|(cstring, _code)| cstring.as_ref().map_or(ptr::null(), |cs| cs.as_ptr()))
}

/// Retrieve the most recent FFI error code.
///
/// Returns `SurvivalFireErrorCode::Ok` (0) if the last call on this thread
/// succeeded or no call has failed yet.
#[no_mangle]
pub extern "C" fn survival_fire_get_last_error_code() -> SurvivalFireErrorCode {
    with_last_error(|(_cstring, code)| *code)
}

#[cfg(test)]
mod tests {
    use super::*;
    use survival_fire_core::{FireId, InvalidOperation};

    #[test]
    fn test_fire_errors_map_to_codes() {
        let err: DefaultSurvivalFireError =
            FireError::UnknownFire(FireId::new("fire-0009")).into();
        assert_eq!(err.code(), SurvivalFireErrorCode::UnknownFire);
        assert!(err.msg().contains("fire-0009"));

        let err: DefaultSurvivalFireError =
            FireError::InvalidOperation(InvalidOperation::AlreadyLit).into();
        assert_eq!(err.code(), SurvivalFireErrorCode::InvalidOperation);
    }

    #[test]
    fn test_null_pointer_message() {
        let err = DefaultSurvivalFireError::null_pointer("ptr");
        assert_eq!(err.code(), SurvivalFireErrorCode::NullPointer);
        assert_eq!(err.msg(), "Parameter 'ptr' cannot be null");
    }
}
