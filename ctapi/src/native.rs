//! Typed CtAPI entry points.
//!
//! Every export uses the `stdcall` (`extern "system"`) convention. `BOOL`
//! results are nonzero on success; handle results are zero on failure.

use std::ffi::{c_char, c_void};

use crate::errors::{CtError, CtResult};
use crate::loader::LoadedModule;
use crate::typedefs::{ConnectionHandle, CtOverlapped, ListHandle, TagHandle};

/// Win32 `BOOL`.
pub type NativeBool = i32;

pub type CtOpenFn = unsafe extern "system" fn(
    computer: *const c_char,
    user: *const c_char,
    password: *const c_char,
    mode: u32,
) -> ConnectionHandle;
pub type CtCloseFn = unsafe extern "system" fn(conn: ConnectionHandle) -> NativeBool;
pub type CtCicodeFn = unsafe extern "system" fn(
    conn: ConnectionHandle,
    cmd: *const c_char,
    window: u32,
    mode: u32,
    result: *mut c_char,
    length: u32,
    overlapped: *mut CtOverlapped,
) -> NativeBool;
pub type CtTagWriteFn = unsafe extern "system" fn(
    conn: ConnectionHandle,
    tag: *const c_char,
    value: *const c_char,
) -> NativeBool;
pub type CtTagReadFn = unsafe extern "system" fn(
    conn: ConnectionHandle,
    tag: *const c_char,
    value: *mut c_char,
    length: u32,
) -> NativeBool;
pub type CtListNewFn = unsafe extern "system" fn(conn: ConnectionHandle, mode: u32) -> ListHandle;
pub type CtListFreeFn = unsafe extern "system" fn(list: ListHandle) -> NativeBool;
pub type CtListAddFn = unsafe extern "system" fn(list: ListHandle, tag: *const c_char) -> TagHandle;
pub type CtListDeleteFn = unsafe extern "system" fn(tag: TagHandle) -> NativeBool;
pub type CtListReadFn =
    unsafe extern "system" fn(list: ListHandle, overlapped: *mut CtOverlapped) -> NativeBool;
pub type CtListWriteFn = unsafe extern "system" fn(
    tag: TagHandle,
    value: *const c_char,
    overlapped: *mut CtOverlapped,
) -> NativeBool;
pub type CtListDataFn = unsafe extern "system" fn(
    tag: TagHandle,
    buffer: *mut c_void,
    length: u32,
    mode: u32,
) -> NativeBool;
pub type CtListEventFn = unsafe extern "system" fn(conn: ConnectionHandle, mode: u32) -> ListHandle;

/// Names of the CtAPI exports the binding resolves.
pub const CTAPI_EXPORTS: [&str; 13] = [
    "ctOpen",
    "ctClose",
    "ctCicode",
    "ctTagWrite",
    "ctTagRead",
    "ctListNew",
    "ctListFree",
    "ctListAdd",
    "ctListDelete",
    "ctListRead",
    "ctListWrite",
    "ctListData",
    "ctListEvent",
];

/// Entry points resolved from `CtApi`.
#[derive(Debug, Clone, Copy)]
pub struct CtApiFns {
    pub ct_open: CtOpenFn,
    pub ct_close: CtCloseFn,
    pub ct_cicode: CtCicodeFn,
    pub ct_tag_write: CtTagWriteFn,
    pub ct_tag_read: CtTagReadFn,
    pub ct_list_new: CtListNewFn,
    pub ct_list_free: CtListFreeFn,
    pub ct_list_add: CtListAddFn,
    pub ct_list_delete: CtListDeleteFn,
    pub ct_list_read: CtListReadFn,
    pub ct_list_write: CtListWriteFn,
    pub ct_list_data: CtListDataFn,
    pub ct_list_event: CtListEventFn,
}

fn address<M: LoadedModule>(module: &M, symbol: &'static str) -> CtResult<*const c_void> {
    let addr = module.symbol(symbol)?;
    if addr.is_null() {
        return Err(CtError::MissingSymbol {
            symbol,
            source: "export resolved to a null address".into(),
        });
    }
    Ok(addr)
}

macro_rules! resolve_fn {
    ($module:expr, $symbol:literal => $fn_ty:ty) => {{
        let addr = address($module, $symbol)?;
        // SAFETY: `addr` is non-null, and the `LoadedModule` contract makes
        // it a live export named `$symbol` whose prototype is `$fn_ty`.
        unsafe { std::mem::transmute::<*const c_void, $fn_ty>(addr) }
    }};
}

impl CtApiFns {
    /// Resolves every export in one pass. Any missing symbol is fatal.
    pub fn resolve<M: LoadedModule>(module: &M) -> CtResult<Self> {
        Ok(Self {
            ct_open: resolve_fn!(module, "ctOpen" => CtOpenFn),
            ct_close: resolve_fn!(module, "ctClose" => CtCloseFn),
            ct_cicode: resolve_fn!(module, "ctCicode" => CtCicodeFn),
            ct_tag_write: resolve_fn!(module, "ctTagWrite" => CtTagWriteFn),
            ct_tag_read: resolve_fn!(module, "ctTagRead" => CtTagReadFn),
            ct_list_new: resolve_fn!(module, "ctListNew" => CtListNewFn),
            ct_list_free: resolve_fn!(module, "ctListFree" => CtListFreeFn),
            ct_list_add: resolve_fn!(module, "ctListAdd" => CtListAddFn),
            ct_list_delete: resolve_fn!(module, "ctListDelete" => CtListDeleteFn),
            ct_list_read: resolve_fn!(module, "ctListRead" => CtListReadFn),
            ct_list_write: resolve_fn!(module, "ctListWrite" => CtListWriteFn),
            ct_list_data: resolve_fn!(module, "ctListData" => CtListDataFn),
            ct_list_event: resolve_fn!(module, "ctListEvent" => CtListEventFn),
        })
    }
}
