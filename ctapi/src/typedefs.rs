use std::ptr::NonNull;

/// Opaque handle for a CtAPI session, returned by `ctOpen`.
///
/// A plain copyable integer. Nothing is released on drop; the caller pairs
/// every successful open with a close.
///
/// # Examples
///
/// ```
/// use ctapi::ConnectionHandle;
/// let handle = ConnectionHandle(0x2A);
/// assert!(!handle.is_null());
/// assert!(ConnectionHandle::default().is_null());
/// ```
#[repr(transparent)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ConnectionHandle(pub isize);

/// Opaque handle for a native tag list, returned by `ctListNew` and
/// `ctListEvent`.
#[repr(transparent)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ListHandle(pub isize);

/// Opaque handle for one tag's membership in a list, returned by `ctListAdd`.
#[repr(transparent)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct TagHandle(pub isize);

macro_rules! impl_null_check {
    ($($handle:ty),+) => {
        $(
            impl $handle {
                /// `true` for the zero value the native library returns on failure.
                pub const fn is_null(self) -> bool {
                    self.0 == 0
                }
            }
        )+
    };
}

impl_null_check!(ConnectionHandle, ListHandle, TagHandle);

/// Native `CTOVERLAPPED` block used for overlapped completion.
///
/// The binding only forwards its address; it never reads or waits on it.
#[repr(C)]
#[derive(Debug, Default)]
pub struct CtOverlapped {
    pub internal: usize,
    pub internal_high: usize,
    pub offset: u32,
    pub offset_high: u32,
    pub h_event: isize,
    pub status: u32,
    pub length: u32,
}

/// Caller-owned overlapped token forwarded unexamined to the native library.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AsyncToken(NonNull<CtOverlapped>);

impl AsyncToken {
    /// Wraps a caller-owned `CtOverlapped`.
    ///
    /// # Safety
    ///
    /// The native library may keep writing through this pointer (and into any
    /// buffer passed with it) after the call returns. `overlapped` and those
    /// buffers must stay valid and otherwise untouched until the native
    /// operation completes.
    pub const unsafe fn new(overlapped: NonNull<CtOverlapped>) -> Self {
        Self(overlapped)
    }

    /// Raw pointer handed to the native call.
    pub const fn as_ptr(self) -> *mut CtOverlapped {
        self.0.as_ptr()
    }
}

/// Raw overlapped pointer for an optional token; null when absent.
pub fn overlapped_ptr(token: Option<AsyncToken>) -> *mut CtOverlapped {
    token.map_or(std::ptr::null_mut(), AsyncToken::as_ptr)
}
