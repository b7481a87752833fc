//! In-process stand-in for the CtAPI DLLs.
//!
//! Each export records its decoded arguments in a thread-local call log so
//! tests can assert exactly what crossed the boundary.

use std::cell::RefCell;
use std::ffi::{CStr, c_char, c_void};
use std::path::{Path, PathBuf};

use crate::errors::{CtError, CtResult};
use crate::loader::{ENTRY_POINT_LIBRARY, LoadedModule, ModuleLoader};
use crate::native::NativeBool;
use crate::typedefs::{ConnectionHandle, CtOverlapped, ListHandle, TagHandle};

pub const STUB_CONNECTION: ConnectionHandle = ConnectionHandle(0x1001);
pub const STUB_LIST: ListHandle = ListHandle(0x2002);
pub const STUB_TAG: TagHandle = TagHandle(0x3003);

const TRUE: NativeBool = 1;
const FALSE: NativeBool = 0;

/// One recorded native call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NativeCall {
    Open {
        host: Vec<u8>,
        user: Vec<u8>,
        password: Vec<u8>,
        mode: u32,
    },
    Close {
        conn: ConnectionHandle,
    },
    Cicode {
        conn: ConnectionHandle,
        cmd: Vec<u8>,
        window: u32,
        mode: u32,
        length: u32,
        overlapped: usize,
    },
    TagWrite {
        conn: ConnectionHandle,
        tag: Vec<u8>,
        value: Vec<u8>,
    },
    TagRead {
        conn: ConnectionHandle,
        tag: Vec<u8>,
        length: u32,
    },
    ListNew {
        conn: ConnectionHandle,
        mode: u32,
    },
    ListFree {
        list: ListHandle,
    },
    ListAdd {
        list: ListHandle,
        tag: Vec<u8>,
    },
    ListDelete {
        tag: TagHandle,
    },
    ListRead {
        list: ListHandle,
        overlapped: usize,
    },
    ListWrite {
        tag: TagHandle,
        value: Vec<u8>,
        overlapped: usize,
    },
    ListData {
        tag: TagHandle,
        length: u32,
        mode: u32,
    },
    ListEvent {
        conn: ConnectionHandle,
        mode: u32,
    },
}

thread_local! {
    static CALLS: RefCell<Vec<NativeCall>> = const { RefCell::new(Vec::new()) };
}

fn record(call: NativeCall) {
    CALLS.with(|calls| calls.borrow_mut().push(call));
}

/// Drains the calls recorded on this thread.
pub fn take_calls() -> Vec<NativeCall> {
    CALLS.with(|calls| std::mem::take(&mut *calls.borrow_mut()))
}

/// # Safety
/// `ptr` must be a valid NUL-terminated string.
unsafe fn bytes(ptr: *const c_char) -> Vec<u8> {
    // SAFETY: Guaranteed by the caller.
    unsafe { CStr::from_ptr(ptr) }.to_bytes().to_vec()
}

/// Writes `reply` plus a NUL into the native-style buffer, truncated to fit.
///
/// # Safety
/// `buffer` must be writable for `length` bytes.
unsafe fn fill(buffer: *mut u8, length: u32, reply: &[u8]) {
    if length == 0 {
        return;
    }
    // SAFETY: Guaranteed by the caller.
    let out = unsafe { std::slice::from_raw_parts_mut(buffer, length as usize) };
    let n = reply.len().min(out.len() - 1);
    out[..n].copy_from_slice(&reply[..n]);
    out[n] = 0;
}

unsafe extern "system" fn stub_ct_open(
    computer: *const c_char,
    user: *const c_char,
    password: *const c_char,
    mode: u32,
) -> ConnectionHandle {
    // SAFETY: The binding always passes NUL-terminated strings.
    let host = unsafe { bytes(computer) };
    let offline = host == b"offline";
    record(NativeCall::Open {
        host,
        // SAFETY: As above.
        user: unsafe { bytes(user) },
        // SAFETY: As above.
        password: unsafe { bytes(password) },
        mode,
    });
    if offline {
        ConnectionHandle(0)
    } else {
        STUB_CONNECTION
    }
}

unsafe extern "system" fn stub_ct_close(conn: ConnectionHandle) -> NativeBool {
    record(NativeCall::Close { conn });
    if conn.is_null() { FALSE } else { TRUE }
}

unsafe extern "system" fn stub_ct_cicode(
    conn: ConnectionHandle,
    cmd: *const c_char,
    window: u32,
    mode: u32,
    result: *mut c_char,
    length: u32,
    overlapped: *mut CtOverlapped,
) -> NativeBool {
    record(NativeCall::Cicode {
        conn,
        // SAFETY: The binding always passes a NUL-terminated string.
        cmd: unsafe { bytes(cmd) },
        window,
        mode,
        length,
        overlapped: overlapped as usize,
    });
    // SAFETY: `result` is writable for `length` bytes.
    unsafe { fill(result.cast(), length, b"done") };
    TRUE
}

unsafe extern "system" fn stub_ct_tag_write(
    conn: ConnectionHandle,
    tag: *const c_char,
    value: *const c_char,
) -> NativeBool {
    record(NativeCall::TagWrite {
        conn,
        // SAFETY: The binding always passes NUL-terminated strings.
        tag: unsafe { bytes(tag) },
        // SAFETY: As above.
        value: unsafe { bytes(value) },
    });
    TRUE
}

unsafe extern "system" fn stub_ct_tag_read(
    conn: ConnectionHandle,
    tag: *const c_char,
    value: *mut c_char,
    length: u32,
) -> NativeBool {
    // SAFETY: The binding always passes a NUL-terminated string.
    let tag = unsafe { bytes(tag) };
    let missing = tag == b"MISSING";
    record(NativeCall::TagRead { conn, tag, length });
    if missing {
        return FALSE;
    }
    // SAFETY: `value` is writable for `length` bytes.
    unsafe { fill(value.cast(), length, b"42") };
    TRUE
}

unsafe extern "system" fn stub_ct_list_new(conn: ConnectionHandle, mode: u32) -> ListHandle {
    record(NativeCall::ListNew { conn, mode });
    STUB_LIST
}

unsafe extern "system" fn stub_ct_list_free(list: ListHandle) -> NativeBool {
    record(NativeCall::ListFree { list });
    TRUE
}

unsafe extern "system" fn stub_ct_list_add(list: ListHandle, tag: *const c_char) -> TagHandle {
    // SAFETY: The binding always passes a NUL-terminated string.
    let tag = unsafe { bytes(tag) };
    let missing = tag == b"MISSING";
    record(NativeCall::ListAdd { list, tag });
    if missing { TagHandle(0) } else { STUB_TAG }
}

unsafe extern "system" fn stub_ct_list_delete(tag: TagHandle) -> NativeBool {
    record(NativeCall::ListDelete { tag });
    TRUE
}

unsafe extern "system" fn stub_ct_list_read(
    list: ListHandle,
    overlapped: *mut CtOverlapped,
) -> NativeBool {
    record(NativeCall::ListRead {
        list,
        overlapped: overlapped as usize,
    });
    TRUE
}

unsafe extern "system" fn stub_ct_list_write(
    tag: TagHandle,
    value: *const c_char,
    overlapped: *mut CtOverlapped,
) -> NativeBool {
    record(NativeCall::ListWrite {
        tag,
        // SAFETY: The binding always passes a NUL-terminated string.
        value: unsafe { bytes(value) },
        overlapped: overlapped as usize,
    });
    TRUE
}

unsafe extern "system" fn stub_ct_list_data(
    tag: TagHandle,
    buffer: *mut c_void,
    length: u32,
    mode: u32,
) -> NativeBool {
    record(NativeCall::ListData { tag, length, mode });
    // SAFETY: `buffer` is writable for `length` bytes.
    unsafe { fill(buffer.cast(), length, b"12.5") };
    TRUE
}

unsafe extern "system" fn stub_ct_list_event(conn: ConnectionHandle, mode: u32) -> ListHandle {
    record(NativeCall::ListEvent { conn, mode });
    STUB_LIST
}

fn stub_address(name: &str) -> Option<*const c_void> {
    let addr = match name {
        "ctOpen" => stub_ct_open as *const c_void,
        "ctClose" => stub_ct_close as *const c_void,
        "ctCicode" => stub_ct_cicode as *const c_void,
        "ctTagWrite" => stub_ct_tag_write as *const c_void,
        "ctTagRead" => stub_ct_tag_read as *const c_void,
        "ctListNew" => stub_ct_list_new as *const c_void,
        "ctListFree" => stub_ct_list_free as *const c_void,
        "ctListAdd" => stub_ct_list_add as *const c_void,
        "ctListDelete" => stub_ct_list_delete as *const c_void,
        "ctListRead" => stub_ct_list_read as *const c_void,
        "ctListWrite" => stub_ct_list_write as *const c_void,
        "ctListData" => stub_ct_list_data as *const c_void,
        "ctListEvent" => stub_ct_list_event as *const c_void,
        _ => return None,
    };
    Some(addr)
}

/// A "loaded" stub library.
#[derive(Debug, Clone)]
pub struct StubModule {
    library: &'static str,
    omitted: Option<&'static str>,
    null: Option<&'static str>,
}

impl StubModule {
    /// The stub `CtApi` module exporting every entry point.
    pub fn entry_points() -> Self {
        Self {
            library: ENTRY_POINT_LIBRARY,
            omitted: None,
            null: None,
        }
    }

    /// Same module with `export` missing.
    pub fn without(mut self, export: &'static str) -> Self {
        self.omitted = Some(export);
        self
    }

    /// Same module with `export` resolving to address zero.
    pub fn with_null(mut self, export: &'static str) -> Self {
        self.null = Some(export);
        self
    }
}

// SAFETY: Every address handed out is one of the `stub_ct_*` functions above,
// each declared with the prototype of the export it stands in for.
unsafe impl LoadedModule for StubModule {
    fn symbol(&self, name: &'static str) -> CtResult<*const c_void> {
        if self.null == Some(name) {
            return Ok(std::ptr::null());
        }
        let found = if self.library == ENTRY_POINT_LIBRARY && self.omitted != Some(name) {
            stub_address(name)
        } else {
            None
        };
        found.ok_or_else(|| CtError::MissingSymbol {
            symbol: name,
            source: format!("{name} not exported by stub {}", self.library).into(),
        })
    }
}

/// Loader handing out [`StubModule`]s and recording every load attempt.
#[derive(Debug, Default)]
pub struct StubLoader {
    missing_library: Option<&'static str>,
    missing_symbol: Option<&'static str>,
    attempts: RefCell<Vec<(&'static str, PathBuf)>>,
}

impl StubLoader {
    /// A loader for which `library` is absent from disk.
    pub fn missing_library(library: &'static str) -> Self {
        Self {
            missing_library: Some(library),
            ..Self::default()
        }
    }

    /// A loader whose `CtApi` lacks the export `symbol`.
    pub fn missing_symbol(symbol: &'static str) -> Self {
        Self {
            missing_symbol: Some(symbol),
            ..Self::default()
        }
    }

    /// Library names passed to `load`, in call order.
    pub fn loaded_libraries(&self) -> Vec<&'static str> {
        self.attempts
            .borrow()
            .iter()
            .map(|(name, _)| *name)
            .collect()
    }

    /// Paths passed to `load`, in call order.
    pub fn loaded_paths(&self) -> Vec<PathBuf> {
        self.attempts
            .borrow()
            .iter()
            .map(|(_, path)| path.clone())
            .collect()
    }
}

impl ModuleLoader for StubLoader {
    type Module = StubModule;

    fn load(&self, library: &'static str, path: &Path) -> CtResult<Self::Module> {
        self.attempts
            .borrow_mut()
            .push((library, path.to_path_buf()));
        if self.missing_library == Some(library) {
            return Err(CtError::LibraryLoad {
                library,
                path: path.to_path_buf(),
                source: Box::new(std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    "The specified module could not be found.",
                )),
            });
        }
        Ok(StubModule {
            library,
            omitted: self.missing_symbol,
            null: None,
        })
    }
}
