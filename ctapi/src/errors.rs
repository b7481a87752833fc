use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for binding construction and argument marshaling.
pub type CtResult<T> = Result<T, CtError>;

/// Boxed source error carried by load and resolve failures.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors raised by the binding itself.
///
/// Native call failures are never turned into a `CtError`: they surface as
/// `false` or a zero handle, and the detail is fetched separately through
/// [`last_platform_error`].
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum CtError {
    /// The running OS is not one the CtAPI DLLs exist for.
    #[error("CtAPI is only available on windows (running on {os})")]
    UnsupportedPlatform { os: String },

    /// One of the seven CtAPI libraries failed to load.
    #[error("Failed to load {library} from {}: {source}", .path.display())]
    LibraryLoad {
        library: &'static str,
        path: PathBuf,
        #[source]
        source: BoxError,
    },

    /// A CtAPI entry point could not be resolved in the loaded library.
    #[error("Entry point {symbol} not found: {source}")]
    MissingSymbol {
        symbol: &'static str,
        #[source]
        source: BoxError,
    },

    /// A text argument cannot cross the boundary as a single-byte C string.
    #[error("Cannot encode {argument} as an ASCII C string: {reason}")]
    Encoding {
        argument: &'static str,
        reason: String,
    },

    /// A caller buffer is larger than the native `DWORD` length argument allows.
    #[error("Buffer of {len} bytes exceeds the native length limit")]
    BufferTooLarge { len: usize },
}

/// Base offset the native library uses to map its own status codes into
/// the platform error-code space.
pub const ERROR_USER_DEFINED_BASE: u32 = 0x1000_0000;

/// Native boolean success value.
pub const CT_SUCCESS: bool = true;
/// Native boolean failure value.
pub const CT_ERROR: bool = false;

/// Lifts a library status code into the platform error-code space.
///
/// # Examples
/// ```
/// use ctapi::{to_library_error, to_platform_error};
///
/// assert_eq!(to_platform_error(424), 0x1000_01A8);
/// assert_eq!(to_library_error(to_platform_error(424)), 424);
/// ```
pub const fn to_platform_error(code: u32) -> u32 {
    code.wrapping_add(ERROR_USER_DEFINED_BASE)
}

/// Recovers a library status code from a platform error code.
pub const fn to_library_error(code: u32) -> u32 {
    code.wrapping_sub(ERROR_USER_DEFINED_BASE)
}

/// `true` when `code` lies strictly above [`ERROR_USER_DEFINED_BASE`].
pub const fn is_library_error(code: u32) -> bool {
    code > ERROR_USER_DEFINED_BASE
}

/// Common platform error codes seen from CtAPI calls, keyed by decimal code.
pub const COMMON_PLATFORM_ERRORS: [(&str, &str); 3] = [
    // Often a tag that does not exist
    ("21", "ERROR_INVALID_ACCESS"),
    // Result buffer not big enough
    ("111", "ERROR_BUFFER_OVERFLOW"),
    // Client not connected or not logged in
    ("233", "ERROR_PIPE_NOT_CONNECTED"),
];

/// Library-specific error codes, keyed by decimal code.
pub const LIBRARY_ERRORS: [(&str, &str); 1] = [("424", "Tag not found")];

fn lookup(table: &[(&'static str, &'static str)], code: u32) -> Option<&'static str> {
    let key = code.to_string();
    table
        .iter()
        .find(|(k, _)| *k == key)
        .map(|(_, label)| *label)
}

/// Maps a last-error value to a label from the diagnostic tables.
///
/// Codes in the library range are translated with [`to_library_error`]
/// first and looked up in [`LIBRARY_ERRORS`]; everything else goes to
/// [`COMMON_PLATFORM_ERRORS`].
///
/// # Examples
/// ```
/// use ctapi::{friendly_error_hint, to_platform_error};
///
/// assert_eq!(friendly_error_hint(233), Some("ERROR_PIPE_NOT_CONNECTED"));
/// assert_eq!(friendly_error_hint(to_platform_error(424)), Some("Tag not found"));
/// assert_eq!(friendly_error_hint(5), None);
/// ```
pub fn friendly_error_hint(code: u32) -> Option<&'static str> {
    if is_library_error(code) {
        lookup(&LIBRARY_ERRORS, to_library_error(code))
    } else {
        lookup(&COMMON_PLATFORM_ERRORS, code)
    }
}

/// Reads the calling thread's last platform error.
///
/// This is the OS-level value, not a library-specific status. It must be
/// read immediately after the failing call; any intervening call may
/// overwrite it.
#[cfg(windows)]
pub fn last_platform_error() -> u32 {
    // SAFETY: `GetLastError` only reads the calling thread's error slot.
    let err = unsafe { windows::Win32::Foundation::GetLastError() };
    err.0
}

/// Reads the calling thread's last platform error.
#[cfg(not(windows))]
#[allow(clippy::cast_sign_loss)]
pub fn last_platform_error() -> u32 {
    std::io::Error::last_os_error().raw_os_error().unwrap_or(0) as u32
}
