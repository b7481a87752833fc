use std::ffi::CString;

use crate::errors::{CtError, CtResult};

/// Encode caller text as a single-byte, NUL-terminated C string.
///
/// `argument` names the parameter in the resulting error.
///
/// # Examples
/// ```
/// use ctapi::to_ascii_cstring;
///
/// let c = to_ascii_cstring("tag", "PUMP_01.PV").unwrap();
/// assert_eq!(c.as_bytes_with_nul(), b"PUMP_01.PV\0");
/// assert!(to_ascii_cstring("tag", "Température").is_err());
/// ```
pub fn to_ascii_cstring(argument: &'static str, text: &str) -> CtResult<CString> {
    if let Some((idx, ch)) = text.char_indices().find(|(_, c)| !c.is_ascii()) {
        return Err(CtError::Encoding {
            argument,
            reason: format!("non-ASCII character {ch:?} at byte {idx}"),
        });
    }
    CString::new(text).map_err(|e| CtError::Encoding {
        argument,
        reason: format!("interior NUL at byte {}", e.nul_position()),
    })
}

/// Native `DWORD` length of a caller buffer.
pub fn buffer_capacity(buffer: &[u8]) -> CtResult<u32> {
    u32::try_from(buffer.len()).map_err(|_| CtError::BufferTooLarge { len: buffer.len() })
}

/// Decode a NUL-terminated result buffer for display.
///
/// Reads up to the first NUL (or the whole buffer if none) and replaces
/// invalid bytes. Display helper only; the binding never calls it.
pub fn c_buffer_to_string(buffer: &[u8]) -> String {
    let end = buffer.iter().position(|&b| b == 0).unwrap_or(buffer.len());
    String::from_utf8_lossy(&buffer[..end]).into_owned()
}
