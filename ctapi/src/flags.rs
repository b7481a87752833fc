//! Flag and constant catalogue for CtAPI mode arguments.
//!
//! Bit flags combine with `|`; the scroll and list-data groups are
//! mutually exclusive selectors.

// Scaling flags
pub const CT_SCALE_RANGE_CHECK: u32 = 0x0000_0001;
pub const CT_SCALE_CLAMP_LIMIT: u32 = 0x0000_0002;
pub const CT_SCALE_NOISE_FACTOR: u32 = 0x0000_0004;

// Formatting flags
pub const CT_FMT_NO_SCALE: u32 = 0x0000_0001;
pub const CT_FMT_NO_FORMAT: u32 = 0x0000_0002;
pub const CT_FMT_LAST: u32 = 0x0000_0004;
pub const CT_FMT_RANGE_CHECK: u32 = 0x0000_0008;

// Find scroll directions
pub const CT_FIND_SCROLL_NEXT: u32 = 0x0000_0001;
pub const CT_FIND_SCROLL_PREV: u32 = 0x0000_0002;
pub const CT_FIND_SCROLL_FIRST: u32 = 0x0000_0003;
pub const CT_FIND_SCROLL_LAST: u32 = 0x0000_0004;
pub const CT_FIND_SCROLL_ABSOLUTE: u32 = 0x0000_0005;
pub const CT_FIND_SCROLL_RELATIVE: u32 = 0x0000_0006;

// `ctOpen` mode flags
pub const CT_OPEN_NO_OPTION: u32 = 0x0000_0000;
pub const CT_OPEN_CRYPT: u32 = 0x0000_0001;
pub const CT_OPEN_RECONNECT: u32 = 0x0000_0002;
pub const CT_OPEN_READ_ONLY: u32 = 0x0000_0004;
pub const CT_OPEN_BATCH: u32 = 0x0000_0008;

// `ctListNew` mode flags
pub const CT_LIST_EVENT: u32 = 0x0000_0001;
pub const CT_LIST_LIGHTWEIGHT_MODE: u32 = 0x0000_0002;

// `ctListEvent` sub-modes
pub const CT_LIST_EVENT_NEW: u32 = 0x0000_0001;
pub const CT_LIST_EVENT_STATUS: u32 = 0x0000_0002;

// `ctListData` data-kind selectors
pub const CT_LIST_VALUE: u32 = 0x0000_0001;
pub const CT_LIST_TIMESTAMP: u32 = 0x0000_0002;
pub const CT_LIST_VALUE_TIMESTAMP: u32 = 0x0000_0003;
pub const CT_LIST_QUALITY_TIMESTAMP: u32 = 0x0000_0004;
pub const CT_LIST_QUALITY_GENERAL: u32 = 0x0000_0005;
pub const CT_LIST_QUALITY_SUBSTATUS: u32 = 0x0000_0006;
pub const CT_LIST_QUALITY_LIMIT: u32 = 0x0000_0007;
pub const CT_LIST_QUALITY_EXTENDED_SUBSTATUS: u32 = 0x0000_0008;
pub const CT_LIST_QUALITY_DATASOURCE_ERROR: u32 = 0x0000_0009;
pub const CT_LIST_QUALITY_OVERRIDE: u32 = 0x0000_000A;
pub const CT_LIST_QUALITY_CONTROL_MODE: u32 = 0x0000_000B;

/// Maximum length of a property name.
pub const PROPERTY_NAME_LEN: usize = 256;

/// What a `ctListData` call returns for a tag.
///
/// Discriminants are the native `CT_LIST_*` selector values.
#[repr(u32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ListDataKind {
    Value = CT_LIST_VALUE,
    Timestamp = CT_LIST_TIMESTAMP,
    ValueTimestamp = CT_LIST_VALUE_TIMESTAMP,
    QualityTimestamp = CT_LIST_QUALITY_TIMESTAMP,
    QualityGeneral = CT_LIST_QUALITY_GENERAL,
    QualitySubstatus = CT_LIST_QUALITY_SUBSTATUS,
    QualityLimit = CT_LIST_QUALITY_LIMIT,
    QualityExtendedSubstatus = CT_LIST_QUALITY_EXTENDED_SUBSTATUS,
    QualityDatasourceError = CT_LIST_QUALITY_DATASOURCE_ERROR,
    QualityOverride = CT_LIST_QUALITY_OVERRIDE,
    QualityControlMode = CT_LIST_QUALITY_CONTROL_MODE,
}

impl ListDataKind {
    /// Every selector, in native order.
    pub const ALL: [Self; 11] = [
        Self::Value,
        Self::Timestamp,
        Self::ValueTimestamp,
        Self::QualityTimestamp,
        Self::QualityGeneral,
        Self::QualitySubstatus,
        Self::QualityLimit,
        Self::QualityExtendedSubstatus,
        Self::QualityDatasourceError,
        Self::QualityOverride,
        Self::QualityControlMode,
    ];

    /// The raw `dwMode` value passed to `ctListData`.
    pub const fn mode(self) -> u32 {
        self as u32
    }
}
