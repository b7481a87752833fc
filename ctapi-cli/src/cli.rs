use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use ctapi::{
    CT_LIST_LIGHTWEIGHT_MODE, CT_OPEN_BATCH, CT_OPEN_CRYPT, CT_OPEN_NO_OPTION, CT_OPEN_READ_ONLY,
    CT_OPEN_RECONNECT, ListDataKind, PROPERTY_NAME_LEN,
};

/// Read, write and poll CitectSCADA tags through CtAPI.
#[derive(Debug, Parser)]
#[command(name = "ctapi-cli", version, about)]
pub struct Cli {
    /// Directory holding the CtAPI DLLs.
    #[arg(long, env = "CTAPI_DLL_DIR", global = true)]
    pub dll_dir: Option<PathBuf>,

    /// SCADA server address.
    #[arg(long, env = "CTAPI_HOST", default_value = "127.0.0.1", global = true)]
    pub host: String,

    #[arg(long, env = "CTAPI_USER", default_value = "", global = true)]
    pub user: String,

    #[arg(
        long,
        env = "CTAPI_PASSWORD",
        default_value = "",
        hide_env_values = true,
        global = true
    )]
    pub password: String,

    /// Encrypt traffic to the server.
    #[arg(long, global = true)]
    pub encrypted: bool,

    /// Let the library reconnect after a dropped session.
    #[arg(long, global = true)]
    pub reconnect: bool,

    #[arg(long, global = true)]
    pub read_only: bool,

    #[arg(long, global = true)]
    pub batch: bool,

    /// Size in bytes of every result buffer.
    #[arg(long, default_value_t = PROPERTY_NAME_LEN, global = true)]
    pub buffer_size: usize,

    /// Directory for the rolling log file.
    #[arg(long, default_value = "logs", global = true)]
    pub log_dir: PathBuf,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, PartialEq, Eq, Subcommand)]
pub enum Command {
    /// Read one tag.
    Read { tag: String },
    /// Write one tag.
    Write { tag: String, value: String },
    /// Run a Cicode expression and print its result.
    Cicode { expression: String },
    /// Read several tags in one batched list refresh.
    Poll {
        /// What to fetch for each tag.
        #[arg(long, value_enum, default_value_t = DataKind::Value)]
        kind: DataKind,
        /// Create the list in lightweight mode.
        #[arg(long)]
        lightweight: bool,
        #[arg(required = true)]
        tags: Vec<String>,
    },
    /// Decode a last-error value without connecting.
    Explain {
        /// Decimal or `0x`-prefixed hexadecimal code.
        #[arg(value_parser = parse_code)]
        code: u32,
    },
}

/// Command-line spelling of [`ListDataKind`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum DataKind {
    Value,
    Timestamp,
    ValueTimestamp,
    QualityTimestamp,
    QualityGeneral,
    QualitySubstatus,
    QualityLimit,
    QualityExtendedSubstatus,
    QualityDatasourceError,
    QualityOverride,
    QualityControlMode,
}

impl From<DataKind> for ListDataKind {
    fn from(kind: DataKind) -> Self {
        match kind {
            DataKind::Value => Self::Value,
            DataKind::Timestamp => Self::Timestamp,
            DataKind::ValueTimestamp => Self::ValueTimestamp,
            DataKind::QualityTimestamp => Self::QualityTimestamp,
            DataKind::QualityGeneral => Self::QualityGeneral,
            DataKind::QualitySubstatus => Self::QualitySubstatus,
            DataKind::QualityLimit => Self::QualityLimit,
            DataKind::QualityExtendedSubstatus => Self::QualityExtendedSubstatus,
            DataKind::QualityDatasourceError => Self::QualityDatasourceError,
            DataKind::QualityOverride => Self::QualityOverride,
            DataKind::QualityControlMode => Self::QualityControlMode,
        }
    }
}

impl Cli {
    /// `ctOpen` mode built from the open switches.
    pub fn open_mode(&self) -> u32 {
        [
            (self.encrypted, CT_OPEN_CRYPT),
            (self.reconnect, CT_OPEN_RECONNECT),
            (self.read_only, CT_OPEN_READ_ONLY),
            (self.batch, CT_OPEN_BATCH),
        ]
        .into_iter()
        .filter(|(on, _)| *on)
        .fold(CT_OPEN_NO_OPTION, |mode, (_, flag)| mode | flag)
    }
}

impl Command {
    /// `ctListNew` mode for `poll`.
    pub fn list_mode(lightweight: bool) -> u32 {
        if lightweight {
            CT_LIST_LIGHTWEIGHT_MODE
        } else {
            0
        }
    }
}

fn parse_code(raw: &str) -> Result<u32, String> {
    let parsed = match raw.strip_prefix("0x").or_else(|| raw.strip_prefix("0X")) {
        Some(hex) => u32::from_str_radix(hex, 16),
        None => raw.parse::<u32>(),
    };
    parsed.map_err(|e| format!("invalid error code {raw:?}: {e}"))
}
