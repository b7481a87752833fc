use std::ffi::c_void;
use std::fmt;
use std::path::Path;

use crate::client::{CtClient, TagValue};
use crate::errors::{CtResult, last_platform_error};
use crate::flags::ListDataKind;
use crate::helpers::{buffer_capacity, to_ascii_cstring};
use crate::loader::{
    DylibLoader, ENTRY_POINT_INDEX, ModuleLoader, abandon, ensure_supported_platform,
    load_libraries,
};
use crate::native::{CtApiFns, NativeBool};
use crate::typedefs::{AsyncToken, ConnectionHandle, ListHandle, TagHandle, overlapped_ptr};

/// The CtAPI binding.
///
/// Owns the seven loaded libraries and the resolved entry points. It holds
/// no other state: handles are never cached, checked or released on the
/// caller's behalf.
pub struct CtApi<L: ModuleLoader = DylibLoader> {
    fns: CtApiFns,
    modules: Vec<L::Module>,
}

impl<L: ModuleLoader> fmt::Debug for CtApi<L> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CtApi")
            .field("libraries", &self.modules.len())
            .finish_non_exhaustive()
    }
}

impl CtApi<DylibLoader> {
    /// Loads the CtAPI libraries from `library_dir` and resolves every entry
    /// point.
    ///
    /// Fails before touching the filesystem when not running on Windows.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use ctapi::{CtApi, CtClient};
    ///
    /// # fn main() -> Result<(), ctapi::CtError> {
    /// let api = CtApi::initialize(r"C:\Program Files (x86)\AVEVA Plant SCADA\Bin")?;
    /// let conn = api.open("10.0.0.5", "engineer", "secret")?;
    /// let mut value = [0u8; 256];
    /// if !api.tag_read(conn, "PUMP_01_PV", &mut value)? {
    ///     eprintln!("read failed: {}", api.last_error());
    /// }
    /// api.close(conn);
    /// # Ok(())
    /// # }
    /// ```
    pub fn initialize(library_dir: impl AsRef<Path>) -> CtResult<Self> {
        Self::initialize_with(std::env::consts::OS, library_dir.as_ref(), &DylibLoader)
    }
}

impl<L: ModuleLoader> CtApi<L> {
    /// Builds the binding for an explicit OS name and loader.
    pub fn initialize_with(os: &str, library_dir: &Path, loader: &L) -> CtResult<Self> {
        let span = tracing::info_span!("ctapi.initialize", dir = %library_dir.display());
        let _enter = span.enter();

        ensure_supported_platform(os).inspect_err(|e| {
            tracing::error!(error = %e, "Refusing to load CtAPI");
        })?;

        let modules = load_libraries(loader, library_dir)?;
        let fns = match CtApiFns::resolve(&modules[ENTRY_POINT_INDEX]) {
            Ok(fns) => fns,
            Err(e) => {
                tracing::error!(error = %e, "CtAPI entry point resolution failed");
                abandon(modules);
                return Err(e);
            }
        };

        tracing::info!(
            libraries = modules.len(),
            entry_points = crate::native::CTAPI_EXPORTS.len(),
            "CtAPI initialized"
        );
        Ok(Self { fns, modules })
    }
}

const fn succeeded(result: NativeBool) -> bool {
    result != 0
}

impl<L: ModuleLoader> CtClient for CtApi<L> {
    fn open_with_mode(
        &self,
        host: &str,
        user: &str,
        password: &str,
        mode: u32,
    ) -> CtResult<ConnectionHandle> {
        let host = to_ascii_cstring("host", host)?;
        let user = to_ascii_cstring("user", user)?;
        let password = to_ascii_cstring("password", password)?;
        // SAFETY: All three strings are NUL-terminated and outlive the call.
        Ok(unsafe { (self.fns.ct_open)(host.as_ptr(), user.as_ptr(), password.as_ptr(), mode) })
    }

    fn close(&self, conn: ConnectionHandle) -> bool {
        // SAFETY: Handles are passed through unexamined; validity is the
        // native library's contract with the caller.
        succeeded(unsafe { (self.fns.ct_close)(conn) })
    }

    fn run_script(
        &self,
        conn: ConnectionHandle,
        script: &str,
        result: &mut [u8],
        window: Option<u32>,
        token: Option<AsyncToken>,
    ) -> CtResult<bool> {
        let script = to_ascii_cstring("script", script)?;
        let length = buffer_capacity(result)?;
        // SAFETY: `script` is NUL-terminated; `result` is writable for
        // exactly `length` bytes; the token's validity is guaranteed by
        // `AsyncToken::new`.
        let ok = unsafe {
            (self.fns.ct_cicode)(
                conn,
                script.as_ptr(),
                window.unwrap_or(0),
                0,
                result.as_mut_ptr().cast(),
                length,
                overlapped_ptr(token),
            )
        };
        Ok(succeeded(ok))
    }

    fn tag_write(&self, conn: ConnectionHandle, tag: &str, value: &TagValue) -> CtResult<bool> {
        let tag = to_ascii_cstring("tag", tag)?;
        let value = to_ascii_cstring("value", &value.to_string())?;
        // SAFETY: Both strings are NUL-terminated and outlive the call.
        Ok(succeeded(unsafe {
            (self.fns.ct_tag_write)(conn, tag.as_ptr(), value.as_ptr())
        }))
    }

    fn tag_read(&self, conn: ConnectionHandle, tag: &str, result: &mut [u8]) -> CtResult<bool> {
        let tag = to_ascii_cstring("tag", tag)?;
        let length = buffer_capacity(result)?;
        // SAFETY: `tag` is NUL-terminated; `result` is writable for exactly
        // `length` bytes.
        Ok(succeeded(unsafe {
            (self.fns.ct_tag_read)(conn, tag.as_ptr(), result.as_mut_ptr().cast(), length)
        }))
    }

    fn list_new(&self, conn: ConnectionHandle, mode: u32) -> ListHandle {
        // SAFETY: Plain integer arguments.
        unsafe { (self.fns.ct_list_new)(conn, mode) }
    }

    fn list_free(&self, list: ListHandle) -> bool {
        // SAFETY: Plain integer argument.
        succeeded(unsafe { (self.fns.ct_list_free)(list) })
    }

    fn list_add(&self, list: ListHandle, tag: &str) -> CtResult<TagHandle> {
        let tag = to_ascii_cstring("tag", tag)?;
        // SAFETY: `tag` is NUL-terminated and outlives the call.
        Ok(unsafe { (self.fns.ct_list_add)(list, tag.as_ptr()) })
    }

    fn list_delete(&self, tag: TagHandle) -> bool {
        // SAFETY: Plain integer argument.
        succeeded(unsafe { (self.fns.ct_list_delete)(tag) })
    }

    fn list_read(&self, list: ListHandle, token: Option<AsyncToken>) -> bool {
        // SAFETY: The token's validity is guaranteed by `AsyncToken::new`.
        succeeded(unsafe { (self.fns.ct_list_read)(list, overlapped_ptr(token)) })
    }

    fn list_write(
        &self,
        tag: TagHandle,
        value: &TagValue,
        token: Option<AsyncToken>,
    ) -> CtResult<bool> {
        let value = to_ascii_cstring("value", &value.to_string())?;
        // SAFETY: `value` is NUL-terminated; the token's validity is
        // guaranteed by `AsyncToken::new`.
        Ok(succeeded(unsafe {
            (self.fns.ct_list_write)(tag, value.as_ptr(), overlapped_ptr(token))
        }))
    }

    fn list_data(&self, tag: TagHandle, result: &mut [u8]) -> CtResult<bool> {
        self.list_data_raw(tag, result, 0)
    }

    fn list_data_with_mode(
        &self,
        tag: TagHandle,
        result: &mut [u8],
        kind: ListDataKind,
    ) -> CtResult<bool> {
        self.list_data_raw(tag, result, kind.mode())
    }

    fn list_event(&self, conn: ConnectionHandle, mode: u32) -> ListHandle {
        // SAFETY: Plain integer arguments.
        unsafe { (self.fns.ct_list_event)(conn, mode) }
    }

    fn last_error(&self) -> u32 {
        last_platform_error()
    }
}

impl<L: ModuleLoader> CtApi<L> {
    fn list_data_raw(&self, tag: TagHandle, result: &mut [u8], mode: u32) -> CtResult<bool> {
        let length = buffer_capacity(result)?;
        // SAFETY: `result` is writable for exactly `length` bytes.
        Ok(succeeded(unsafe {
            (self.fns.ct_list_data)(tag, result.as_mut_ptr().cast::<c_void>(), length, mode)
        }))
    }
}
