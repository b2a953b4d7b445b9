//! 错误类型：对齐 genmai 的错误分类（用法错误 / 解析错误 / 驱动错误 / 事务错误 / hook 错误）。

use crate::condition::ConditionError;
use crate::log::LogError;
use crate::scan::ScanError;
use crate::valuer::ValuerError;

/// 驱动、hook 返回的动态错误。
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("{0}")]
    Usage(String),
    #[error(transparent)]
    Condition(#[from] ConditionError),
    #[error("{op}: fields of struct doesn't have primary key: `pk` must be specified for {op}")]
    NoPrimaryKey { op: &'static str },
    #[error("`{column}` field isn't defined in {table} or embedded struct")]
    UnmappedColumn { column: String, table: &'static str },
    #[error("`{column}` is mapped by more than one field of {table}")]
    AmbiguousColumn { column: String, table: &'static str },
    #[error("From statement specified more than once")]
    DuplicateFrom,
    #[error("From statement must be given if any Function is given")]
    MissingFrom,
    #[error("{0} function must be specified to the first argument")]
    MisplacedFunction(String),
    #[error("argument of {0} type must be before the Condition arguments")]
    MisplacedProjection(&'static str),
    #[error("unsupported argument type: {0}")]
    UnsupportedArgument(&'static str),
    #[error(
        "float types have a rounding error problem.\n\
         Please use `Rat` if you want an exact value.\n\
         However, if you still want a float types, please use `Float32` and `Float64`."
    )]
    FloatType,
    #[error("invalid default value {value:?} for column `{column}`")]
    InvalidDefault { column: String, value: String },
    #[error("transaction hasn't been started or already committed or rolled back")]
    TxDone,
    #[error("transaction has already been started")]
    TxAlreadyStarted,
    #[error("hook failed: {0}")]
    Hook(#[source] BoxError),
    /// 语句已执行（`affected` 行受影响），但 after hook 失败；不会回滚。
    #[error("after hook failed ({affected} rows affected): {source}")]
    AfterHook {
        affected: u64,
        #[source]
        source: BoxError,
    },
    #[error("driver error: {0}")]
    Driver(#[from] BoxError),
    #[error(transparent)]
    Scan(#[from] ScanError),
    #[error(transparent)]
    Valuer(#[from] ValuerError),
    #[error(transparent)]
    Log(#[from] LogError),
}

impl Error {
    /// 是否为 “语句已执行但 after hook 失败” 的部分成功。
    pub fn is_partial_success(&self) -> bool {
        matches!(self, Self::AfterHook { .. })
    }
}
