use std::fmt;

use crate::errors::CtResult;
use crate::flags::{CT_OPEN_NO_OPTION, ListDataKind};
use crate::typedefs::{AsyncToken, ConnectionHandle, ListHandle, TagHandle};

#[cfg(feature = "test-support")]
use mockall::automock;

/// Value written to a tag.
///
/// Always sent as text; the variant only selects the textual form.
/// Booleans go out as `1`/`0` and whole floats without a fractional part
/// (`3.0` is sent as `3`), unlike Python's `str()`, which yields `True` and
/// `3.0`.
#[derive(Debug, Clone, PartialEq)]
pub enum TagValue {
    /// Decimal integer, e.g. `42`.
    Int(i64),
    /// Shortest round-trip decimal, e.g. `12.5`.
    Float(f64),
    /// `1` or `0`.
    Bool(bool),
    /// Sent verbatim.
    Text(String),
}

impl fmt::Display for TagValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(v) => write!(f, "{v}"),
            Self::Float(v) => write!(f, "{v}"),
            Self::Bool(v) => f.write_str(if *v { "1" } else { "0" }),
            Self::Text(v) => f.write_str(v),
        }
    }
}

impl From<i32> for TagValue {
    fn from(v: i32) -> Self {
        Self::Int(i64::from(v))
    }
}

impl From<i64> for TagValue {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<u32> for TagValue {
    fn from(v: u32) -> Self {
        Self::Int(i64::from(v))
    }
}

impl From<f64> for TagValue {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<bool> for TagValue {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<&str> for TagValue {
    fn from(v: &str) -> Self {
        Self::Text(v.to_string())
    }
}

impl From<String> for TagValue {
    fn from(v: String) -> Self {
        Self::Text(v)
    }
}

/// The CtAPI operation surface.
///
/// Every method is a single pass-through to one native export. `Err` only
/// means an argument could not be marshaled and no native call was made; a
/// native failure is `Ok(false)` or a null handle, with detail available
/// from [`CtClient::last_error`] immediately afterwards.
#[cfg_attr(feature = "test-support", automock)]
pub trait CtClient {
    /// `ctOpen` with no open options.
    fn open(&self, host: &str, user: &str, password: &str) -> CtResult<ConnectionHandle> {
        self.open_with_mode(host, user, password, CT_OPEN_NO_OPTION)
    }

    /// `ctOpen` with an explicit `CT_OPEN_*` bitmask.
    fn open_with_mode(
        &self,
        host: &str,
        user: &str,
        password: &str,
        mode: u32,
    ) -> CtResult<ConnectionHandle>;

    /// `ctClose`.
    fn close(&self, conn: ConnectionHandle) -> bool;

    /// `ctCicode`: runs a Cicode function, writing its result into `result`.
    fn run_script(
        &self,
        conn: ConnectionHandle,
        script: &str,
        result: &mut [u8],
        window: Option<u32>,
        token: Option<AsyncToken>,
    ) -> CtResult<bool>;

    /// `ctTagWrite`.
    fn tag_write(&self, conn: ConnectionHandle, tag: &str, value: &TagValue) -> CtResult<bool>;

    /// `ctTagRead`.
    fn tag_read(&self, conn: ConnectionHandle, tag: &str, result: &mut [u8]) -> CtResult<bool>;

    /// `ctListNew` with a `CT_LIST_*` mode bitmask.
    fn list_new(&self, conn: ConnectionHandle, mode: u32) -> ListHandle;

    /// `ctListFree`.
    fn list_free(&self, list: ListHandle) -> bool;

    /// `ctListAdd`.
    fn list_add(&self, list: ListHandle, tag: &str) -> CtResult<TagHandle>;

    /// `ctListDelete`.
    fn list_delete(&self, tag: TagHandle) -> bool;

    /// `ctListRead`: refreshes every tag in the list.
    fn list_read(&self, list: ListHandle, token: Option<AsyncToken>) -> bool;

    /// `ctListWrite`.
    fn list_write(
        &self,
        tag: TagHandle,
        value: &TagValue,
        token: Option<AsyncToken>,
    ) -> CtResult<bool>;

    /// `ctListData` with mode `0`: last-read value of one tag.
    fn list_data(&self, tag: TagHandle, result: &mut [u8]) -> CtResult<bool>;

    /// `ctListData` with an explicit data-kind selector.
    fn list_data_with_mode(
        &self,
        tag: TagHandle,
        result: &mut [u8],
        kind: ListDataKind,
    ) -> CtResult<bool>;

    /// `ctListEvent` with a `CT_LIST_EVENT_*` sub-mode.
    fn list_event(&self, conn: ConnectionHandle, mode: u32) -> ListHandle;

    /// The calling thread's last platform error.
    fn last_error(&self) -> u32;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tag_value_stringification() {
        assert_eq!(TagValue::from(42).to_string(), "42");
        assert_eq!(TagValue::from(-7i64).to_string(), "-7");
        assert_eq!(TagValue::from(12.5).to_string(), "12.5");
        assert_eq!(TagValue::from(3.0).to_string(), "3");
        assert_eq!(TagValue::from(true).to_string(), "1");
        assert_eq!(TagValue::from(false).to_string(), "0");
        assert_eq!(TagValue::from("OPEN").to_string(), "OPEN");
        assert_eq!(TagValue::from(String::from(" 1.50 ")).to_string(), " 1.50 ");
    }
}
