//! 基于 `rusqlite` 的 SQLite 驱动（`sqlite` feature）。
//!
//! 单连接，`Mutex` 保护；事务用 `BEGIN`/`COMMIT`/`ROLLBACK` 在同一连接上执行。

use std::path::Path;
use std::sync::{Arc, Mutex};

use rusqlite::types::{Value, ValueRef};
use rusqlite::{Connection, params_from_iter};

use crate::driver::{Driver, ExecResult, Rows, Transaction};
use crate::error::BoxError;
use crate::value::SqlValue;

#[derive(Debug, Clone)]
pub struct SqliteDriver {
    // rusqlite::Connection 不是 Sync
    conn: Arc<Mutex<Connection>>,
}

impl SqliteDriver {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, BoxError> {
        tracing::debug!(path = %path.as_ref().display(), "opening SQLite database");
        Ok(Self::from_connection(Connection::open(path)?))
    }

    pub fn open_in_memory() -> Result<Self, BoxError> {
        Ok(Self::from_connection(Connection::open_in_memory()?))
    }

    pub fn from_connection(conn: Connection) -> Self {
        Self {
            conn: Arc::new(Mutex::new(conn)),
        }
    }
}

impl Driver for SqliteDriver {
    fn name(&self) -> &str {
        "sqlite3"
    }

    fn execute(&self, query: &str, args: &[SqlValue]) -> Result<ExecResult, BoxError> {
        let conn = self.conn.lock().unwrap_or_else(|e| e.into_inner());
        execute(&conn, query, args)
    }

    fn query(&self, query: &str, args: &[SqlValue]) -> Result<Rows, BoxError> {
        let conn = self.conn.lock().unwrap_or_else(|e| e.into_inner());
        fetch(&conn, query, args)
    }

    fn begin(&self) -> Result<Box<dyn Transaction>, BoxError> {
        self.conn
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .execute_batch("BEGIN")?;
        Ok(Box::new(SqliteTransaction {
            conn: Arc::clone(&self.conn),
            done: false,
        }))
    }
}

/// 未提交也未回滚就被丢弃时自动回滚。
#[derive(Debug)]
pub struct SqliteTransaction {
    conn: Arc<Mutex<Connection>>,
    done: bool,
}

impl SqliteTransaction {
    fn finish(&mut self, stmt: &str) -> Result<(), BoxError> {
        self.done = true;
        let conn = self.conn.lock().unwrap_or_else(|e| e.into_inner());
        let Err(err) = conn.execute_batch(stmt) else {
            return Ok(());
        };
        // COMMIT 失败时连接仍在事务中（如延迟外键检查失败），必须回滚才能释放
        if !conn.is_autocommit() {
            if let Err(rollback_err) = conn.execute_batch("ROLLBACK") {
                tracing::warn!(stmt, error = %rollback_err, "failed to roll back after statement failed");
            }
        }
        Err(err.into())
    }
}

impl Transaction for SqliteTransaction {
    fn execute(&mut self, query: &str, args: &[SqlValue]) -> Result<ExecResult, BoxError> {
        let conn = self.conn.lock().unwrap_or_else(|e| e.into_inner());
        execute(&conn, query, args)
    }

    fn query(&mut self, query: &str, args: &[SqlValue]) -> Result<Rows, BoxError> {
        let conn = self.conn.lock().unwrap_or_else(|e| e.into_inner());
        fetch(&conn, query, args)
    }

    fn commit(mut self: Box<Self>) -> Result<(), BoxError> {
        self.finish("COMMIT")
    }

    fn rollback(mut self: Box<Self>) -> Result<(), BoxError> {
        self.finish("ROLLBACK")
    }
}

impl Drop for SqliteTransaction {
    fn drop(&mut self) {
        if self.done {
            return;
        }
        if let Err(err) = self.finish("ROLLBACK") {
            tracing::warn!(error = %err, "failed to roll back abandoned transaction");
        }
    }
}

// 调用方持有连接锁，rowid 与本条语句对应。
fn execute(conn: &Connection, query: &str, args: &[SqlValue]) -> Result<ExecResult, BoxError> {
    let params = to_params(args)?;
    let mut stmt = conn.prepare(query)?;
    let affected = stmt.execute(params_from_iter(params.iter()))?;
    Ok(ExecResult {
        rows_affected: affected as u64,
        last_insert_id: Some(conn.last_insert_rowid()),
    })
}

fn fetch(conn: &Connection, query: &str, args: &[SqlValue]) -> Result<Rows, BoxError> {
    let params = to_params(args)?;
    let mut stmt = conn.prepare(query)?;
    let columns: Vec<String> = stmt.column_names().iter().map(ToString::to_string).collect();

    let mut rows = stmt.query(params_from_iter(params.iter()))?;
    let mut out = Vec::new();
    while let Some(row) = rows.next()? {
        let mut values = Vec::with_capacity(columns.len());
        for i in 0..columns.len() {
            values.push(from_value_ref(row.get_ref(i)?)?);
        }
        out.push(values);
    }
    Ok(Rows { columns, rows: out })
}

fn to_params(args: &[SqlValue]) -> Result<Vec<Value>, BoxError> {
    args.iter().map(to_value).collect()
}

fn to_value(v: &SqlValue) -> Result<Value, BoxError> {
    Ok(match v {
        SqlValue::Null => Value::Null,
        SqlValue::Bool(b) => Value::Integer(i64::from(*b)),
        SqlValue::I64(i) => Value::Integer(*i),
        SqlValue::U64(u) => Value::Integer(i64::try_from(*u)?),
        SqlValue::F64(f) => Value::Real(*f),
        SqlValue::String(s) => Value::Text(s.to_string()),
        SqlValue::Bytes(b) => Value::Blob(b.clone()),
        SqlValue::DateTime(t) => {
            Value::Text(t.format(&time::format_description::well_known::Rfc3339)?)
        }
        SqlValue::Decimal(d) => Value::Text(d.to_string()),
    })
}

fn from_value_ref(v: ValueRef<'_>) -> Result<SqlValue, BoxError> {
    Ok(match v {
        ValueRef::Null => SqlValue::Null,
        ValueRef::Integer(i) => SqlValue::I64(i),
        ValueRef::Real(f) => SqlValue::F64(f),
        ValueRef::Text(t) => SqlValue::String(std::str::from_utf8(t)?.to_string().into()),
        ValueRef::Blob(b) => SqlValue::Bytes(b.to_vec()),
    })
}
