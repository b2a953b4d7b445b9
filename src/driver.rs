//! 驱动抽象：[`Db`](crate::Db) 只通过这两个 trait 访问数据库。
//!
//! 语句文本已经按方言生成好，参数与占位符一一对应；驱动只负责执行与取回结果。
//! 错误以 [`BoxError`] 返回，由上层包装为 [`Error::Driver`](crate::Error::Driver)。

use crate::error::BoxError;
use crate::value::SqlValue;

/// 查询结果：列名与按列顺序排列的值。
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Rows {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<SqlValue>>,
}

impl Rows {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }
}

/// 非查询语句的执行结果。
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExecResult {
    pub rows_affected: u64,
    /// 与语句在同一连接、同一次加锁内取得的自增 ID；驱动无法提供时为 `None`，
    /// 由上层改用 [`Dialect::last_insert_id`](crate::Dialect::last_insert_id) 查询。
    pub last_insert_id: Option<i64>,
}

pub trait Driver: Send + Sync {
    /// 驱动名，通常与 [`Dialect::name`](crate::Dialect::name) 一致。
    fn name(&self) -> &str;

    /// 执行不返回行的语句。
    fn execute(&self, query: &str, args: &[SqlValue]) -> Result<ExecResult, BoxError>;

    fn query(&self, query: &str, args: &[SqlValue]) -> Result<Rows, BoxError>;

    fn begin(&self) -> Result<Box<dyn Transaction>, BoxError>;
}

/// 已开始的事务。`commit`/`rollback` 消耗自身；未结束即被丢弃时由实现负责回滚。
pub trait Transaction: Send {
    fn execute(&mut self, query: &str, args: &[SqlValue]) -> Result<ExecResult, BoxError>;

    fn query(&mut self, query: &str, args: &[SqlValue]) -> Result<Rows, BoxError>;

    fn commit(self: Box<Self>) -> Result<(), BoxError>;

    fn rollback(self: Box<Self>) -> Result<(), BoxError>;
}
