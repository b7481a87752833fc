//! Platform gate and loading of the CtAPI library set.
//!
//! The load order is fixed: later libraries bind against symbols exported
//! by earlier ones.

use std::ffi::c_void;
use std::path::{Path, PathBuf};

use crate::errors::{CtError, CtResult};

/// The only OS the CtAPI DLLs are shipped for.
pub const SUPPORTED_OS: &str = "windows";

/// Libraries loaded at construction, in dependency order.
pub const CTAPI_LIBRARIES: [&str; 7] = [
    "CiDebugHelp",
    "CtUtil32",
    "Ct_ipc",
    "CtApi",
    "CtEng32",
    "CtRes32",
    "CtUtilManagedHelper",
];

/// The library every entry point is resolved from.
pub const ENTRY_POINT_LIBRARY: &str = "CtApi";

/// Position of [`ENTRY_POINT_LIBRARY`] in [`CTAPI_LIBRARIES`].
pub const ENTRY_POINT_INDEX: usize = 3;

/// Refuses to continue unless `os` is [`SUPPORTED_OS`].
///
/// # Examples
/// ```
/// use ctapi::ensure_supported_platform;
///
/// assert!(ensure_supported_platform("windows").is_ok());
/// assert!(ensure_supported_platform("linux").is_err());
/// ```
pub fn ensure_supported_platform(os: &str) -> CtResult<()> {
    if os == SUPPORTED_OS {
        Ok(())
    } else {
        Err(CtError::UnsupportedPlatform { os: os.to_string() })
    }
}

/// Full path of `library` inside `dir`, with the platform's library suffix.
pub fn library_path(dir: &Path, library: &str) -> PathBuf {
    dir.join(format!("{library}{}", std::env::consts::DLL_SUFFIX))
}

/// A loaded shared library that can hand out entry-point addresses.
///
/// The binding reinterprets every address returned here as the CtAPI
/// function of the same name and calls it.
///
/// # Safety
///
/// A non-null address returned by [`symbol`](Self::symbol) for `name` must
/// be a live export whose calling convention and prototype match the CtAPI
/// function `name`, and it must stay callable for as long as the module
/// value exists.
///
/// ```compile_fail,E0200
/// use std::ffi::c_void;
/// use ctapi::{CtResult, LoadedModule};
///
/// struct Bogus;
///
/// impl LoadedModule for Bogus {
///     fn symbol(&self, _name: &'static str) -> CtResult<*const c_void> {
///         Ok(0x10 as *const c_void)
///     }
/// }
/// ```
pub unsafe trait LoadedModule {
    /// Address of the exported function `name`.
    fn symbol(&self, name: &'static str) -> CtResult<*const c_void>;
}

/// Loads one shared library from an explicit path.
pub trait ModuleLoader {
    type Module: LoadedModule;

    fn load(&self, library: &'static str, path: &Path) -> CtResult<Self::Module>;
}

/// Default loader backed by `libloading`.
#[derive(Debug, Clone, Copy, Default)]
pub struct DylibLoader;

/// A library loaded by [`DylibLoader`]; unloaded on drop.
#[derive(Debug)]
pub struct DylibModule(libloading::Library);

impl ModuleLoader for DylibLoader {
    type Module = DylibModule;

    fn load(&self, library: &'static str, path: &Path) -> CtResult<Self::Module> {
        // SAFETY: Loading runs the library's initialisation routines. The
        // CtAPI DLLs are vendor client libraries with no loader-lock
        // requirements beyond being loaded in dependency order, which
        // `load_libraries` guarantees.
        let lib = unsafe { libloading::Library::new(path) }.map_err(|e| CtError::LibraryLoad {
            library,
            path: path.to_path_buf(),
            source: Box::new(e),
        })?;
        Ok(DylibModule(lib))
    }
}

// SAFETY: Addresses come straight from the export table of a library loaded
// from the CtAPI install directory, and the library stays mapped while the
// `DylibModule` is alive.
unsafe impl LoadedModule for DylibModule {
    fn symbol(&self, name: &'static str) -> CtResult<*const c_void> {
        // SAFETY: The symbol is read as an untyped function address only;
        // `native::CtApiFns::resolve` reinterprets it as the documented
        // CtAPI signature for `name`.
        let sym = unsafe { self.0.get::<unsafe extern "system" fn()>(name.as_bytes()) };
        let sym = sym.map_err(|e| CtError::MissingSymbol {
            symbol: name,
            source: Box::new(e),
        })?;
        Ok(*sym as *const c_void)
    }
}

/// Loads all of [`CTAPI_LIBRARIES`] from `dir`, in order.
///
/// Stops at the first failure. Libraries loaded before it are left mapped
/// in the process and no module list is returned.
pub fn load_libraries<L: ModuleLoader>(loader: &L, dir: &Path) -> CtResult<Vec<L::Module>> {
    let mut modules = Vec::with_capacity(CTAPI_LIBRARIES.len());
    for library in CTAPI_LIBRARIES {
        let path = library_path(dir, library);
        match loader.load(library, &path) {
            Ok(module) => {
                tracing::debug!(library, path = %path.display(), "Loaded CtAPI library");
                modules.push(module);
            }
            Err(e) => {
                tracing::error!(
                    library,
                    path = %path.display(),
                    error = %e,
                    "CtAPI library load failed"
                );
                abandon(modules);
                return Err(e);
            }
        }
    }
    Ok(modules)
}

/// Drops ownership of a partially loaded set without unloading it.
pub fn abandon<M>(modules: Vec<M>) {
    if !modules.is_empty() {
        tracing::warn!(
            loaded = modules.len(),
            "Abandoning partially loaded CtAPI libraries"
        );
    }
    std::mem::forget(modules);
}
