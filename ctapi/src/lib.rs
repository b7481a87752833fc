//! # ctapi
//!
//! Thin binding over the CitectSCADA CtAPI client DLLs.
//!
//! [`CtApi::initialize`] loads the seven vendor libraries from a directory
//! and resolves the CtAPI entry points once. Every [`CtClient`] method is a
//! single pass-through call: text is sent as ASCII C strings, buffers are
//! passed with their exact capacity, and native results come back raw.
//! Windows only; initialization fails immediately anywhere else.
//!
//! ## Features
//! - `test-support`: Enables `MockCtClient` via `mockall`

mod binding;
mod client;
mod errors;
mod flags;
mod helpers;
mod loader;
mod native;
mod typedefs;

#[cfg(test)]
mod stub;

// Stable public API
pub use binding::CtApi;
pub use client::{CtClient, TagValue};
pub use errors::{
    BoxError, COMMON_PLATFORM_ERRORS, CT_ERROR, CT_SUCCESS, CtError, CtResult,
    ERROR_USER_DEFINED_BASE, LIBRARY_ERRORS, friendly_error_hint, is_library_error,
    last_platform_error, to_library_error, to_platform_error,
};
pub use flags::*;
pub use helpers::{buffer_capacity, c_buffer_to_string, to_ascii_cstring};
pub use loader::{
    CTAPI_LIBRARIES, DylibLoader, DylibModule, ENTRY_POINT_LIBRARY, LoadedModule, ModuleLoader,
    SUPPORTED_OS, ensure_supported_platform, library_path,
};
pub use native::{CTAPI_EXPORTS, CtApiFns, NativeBool};
pub use typedefs::{AsyncToken, ConnectionHandle, CtOverlapped, ListHandle, TagHandle};

// Test support re-export
#[cfg(feature = "test-support")]
pub use client::MockCtClient;
