//! 数据库句柄：查询 / 插入 / 更新 / 删除、事务与查询日志。
//!
//! ```ignore
//! let db = Db::new(Dialect::SQLite3, SqliteDriver::open_in_memory()?);
//! db.create_table::<User>()?;
//! db.insert(&mut user)?;
//! let users: Vec<User> = db.select::<User>([db.where_(("name", "=", "alice")).into()])?;
//! ```
//!
//! 同一时刻一个句柄最多只有一个活动事务；活动期间所有语句都经由该事务执行。
//! 事务状态由互斥锁保护，`commit`/`rollback` 之后句柄被清空，重复调用返回 [`Error::TxDone`]。

use std::io::Write;
use std::sync::{Arc, Mutex};

use time::OffsetDateTime;

use crate::clock::{Clock, SystemClock};
use crate::condition::{self, Condition, JoinCondition, OrderTerm, Predicate};
use crate::dialect::Dialect;
use crate::driver::{Driver, ExecResult, Rows, Transaction};
use crate::error::{BoxError, Error, Result};
use crate::field_mapper::to_camel_case;
use crate::hooks::HookContext;
use crate::log::{NullLogger, QueryLogger, TemplateLogger};
use crate::query::{self, ColumnExpr, Distinct, FromTable, Function, QueryArg, Raw, classify};
use crate::scan::FromSqlValue;
use crate::structs::{Table, field_at, field_index_by_name, insertable_fields, primary_key_index};
use crate::value::SqlValue;

pub struct Db {
    dialect: Dialect,
    driver: Box<dyn Driver>,
    tx: Mutex<Option<Box<dyn Transaction>>>,
    logger: Mutex<Box<dyn QueryLogger>>,
    clock: Arc<dyn Clock>,
}

impl std::fmt::Debug for Db {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Db")
            .field("dialect", &self.dialect)
            .field("driver", &self.driver.name())
            .field("in_transaction", &self.in_transaction())
            .field("clock", &self.clock)
            .finish()
    }
}

impl Db {
    pub fn new(dialect: Dialect, driver: impl Driver + 'static) -> Self {
        Self {
            dialect,
            driver: Box::new(driver),
            tx: Mutex::new(None),
            logger: Mutex::new(Box::new(NullLogger)),
            clock: Arc::new(SystemClock),
        }
    }

    /// 替换时间源（日志与时间戳 hook 共用）。
    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Arc::new(clock);
        self
    }

    pub fn with_logger(self, logger: impl QueryLogger + 'static) -> Self {
        self.set_logger(logger);
        self
    }

    pub fn dialect(&self) -> Dialect {
        self.dialect
    }

    /// 为标识符（列名、表名）加引号；不是用于值的。
    pub fn quote(&self, name: &str) -> String {
        self.dialect.quote(name)
    }

    pub fn set_logger(&self, logger: impl QueryLogger + 'static) {
        *self.logger.lock().unwrap_or_else(|e| e.into_inner()) = Box::new(logger);
    }

    /// `Some(w)`：以默认模板写入 `w`；`None`：关闭日志。
    pub fn set_log_output<W: Write + Send + 'static>(&self, out: Option<W>) {
        match out {
            Some(w) => self.set_logger(TemplateLogger::new(w)),
            None => self.set_logger(NullLogger),
        }
    }

    /// 替换当前 logger 的模板，见 [`crate::log`]。
    pub fn set_log_format(&self, format: &str) -> Result<()> {
        self.logger
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .set_format(format)?;
        Ok(())
    }

    pub fn where_(&self, predicate: impl Into<Predicate>) -> Condition {
        condition::where_(predicate)
    }

    pub fn order_by(&self, term: impl Into<OrderTerm>) -> Condition {
        condition::order_by(term)
    }

    pub fn limit(&self, n: u64) -> Condition {
        condition::limit(n)
    }

    pub fn offset(&self, n: u64) -> Condition {
        condition::offset(n)
    }

    pub fn join<T: Table>(&self) -> JoinCondition {
        condition::join::<T>()
    }

    pub fn left_join<T: Table>(&self) -> JoinCondition {
        condition::left_join::<T>()
    }

    pub fn distinct<I, S>(&self, columns: I) -> Distinct
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        query::distinct(columns)
    }

    /// 不带参数为 `COUNT(*)`。
    pub fn count(&self, column: Option<ColumnExpr>) -> Function {
        match column {
            Some(c) => query::count_of(c),
            None => query::count(),
        }
    }

    pub fn from<T: Table>(&self) -> FromTable {
        query::from::<T>()
    }

    pub fn raw(&self, expr: impl Into<String>) -> Raw {
        Raw::new(expr)
    }

    /// 查询 `T` 的表，结果集每一列都必须能映射到 `T`（含嵌入字段）的某个字段。
    pub fn select<T: Table>(&self, args: impl IntoIterator<Item = QueryArg>) -> Result<Vec<T>> {
        let table = T::table_name();
        let plan = classify(self.dialect, Some(&table), args.into_iter().collect())?;
        let (sql, values) = plan.to_sql(self.dialect)?;
        let rows = self.query(&sql, &values)?;
        map_rows(rows)
    }

    /// 查询单个值（例如 `COUNT(*)`）。必须给出 `From`；没有返回行时得到 `V::default()`。
    pub fn select_value<V: FromSqlValue + Default>(
        &self,
        args: impl IntoIterator<Item = QueryArg>,
    ) -> Result<V> {
        let rows = self.select_scalar_rows(args)?;
        match rows.rows.into_iter().next().and_then(|r| r.into_iter().next()) {
            Some(v) => Ok(V::from_sql_value(v)?),
            None => Ok(V::default()),
        }
    }

    /// 查询单列的所有值。必须给出 `From`。
    pub fn select_values<V: FromSqlValue>(
        &self,
        args: impl IntoIterator<Item = QueryArg>,
    ) -> Result<Vec<V>> {
        let rows = self.select_scalar_rows(args)?;
        rows.rows
            .into_iter()
            .filter_map(|r| r.into_iter().next())
            .map(|v| V::from_sql_value(v).map_err(Error::from))
            .collect()
    }

    fn select_scalar_rows(&self, args: impl IntoIterator<Item = QueryArg>) -> Result<Rows> {
        let plan = classify(self.dialect, None, args.into_iter().collect())?;
        let (sql, values) = plan.to_sql(self.dialect)?;
        self.query(&sql, &values)
    }

    /// 插入一条记录。主键可自增时，生成的 ID 会写回 `obj`。
    pub fn insert<T: Table>(&self, obj: &mut T) -> Result<u64> {
        self.insert_all(std::slice::from_mut(obj))
    }

    /// 以一条多行 `INSERT ... VALUES (...), (...)` 插入全部记录；空切片不执行任何语句。
    pub fn insert_all<T: Table>(&self, objs: &mut [T]) -> Result<u64> {
        if objs.is_empty() {
            return Ok(0);
        }
        let ctx = HookContext::new(&*self.clock);
        for obj in objs.iter_mut() {
            if let Some(hook) = obj.as_before_insert() {
                hook.before_insert(&ctx).map_err(Error::Hook)?;
            }
        }

        let paths = insertable_fields(T::FIELDS);
        let columns = column_names::<T>(&paths);
        let mut values = Vec::with_capacity(objs.len() * paths.len());
        for obj in objs.iter() {
            for path in &paths {
                values.push(obj.value_at(path)?);
            }
        }
        let sql = insert_sql(self.dialect, &T::table_name(), &columns, objs.len());
        let result = self.execute(&sql, &values)?;
        let affected = result.rows_affected;

        if let [obj] = &mut *objs {
            if let Some(pk) = primary_key_index(T::FIELDS) {
                if field_at(T::FIELDS, &pk).is_some_and(|f| f.is_auto_increment()) {
                    let id = match result.last_insert_id {
                        Some(id) => id,
                        None => self.last_insert_id()?,
                    };
                    obj.set_at(&pk, SqlValue::I64(id))?;
                }
            }
        }

        for obj in objs.iter_mut() {
            if let Some(hook) = obj.as_after_insert() {
                hook.after_insert(&ctx)
                    .map_err(|source| after_hook_failed("insert", affected, source))?;
            }
        }
        Ok(affected)
    }

    /// 按主键更新一条记录的全部可更新列。
    pub fn update<T: Table>(&self, obj: &mut T) -> Result<u64> {
        let pk = primary_key_index(T::FIELDS).ok_or(Error::NoPrimaryKey { op: "Update" })?;
        let ctx = HookContext::new(&*self.clock);
        if let Some(hook) = obj.as_before_update() {
            hook.before_update(&ctx).map_err(Error::Hook)?;
        }

        let paths = insertable_fields(T::FIELDS);
        let columns = column_names::<T>(&paths);
        let mut values = Vec::with_capacity(paths.len() + 1);
        for path in &paths {
            values.push(obj.value_at(path)?);
        }
        values.push(obj.value_at(&pk)?);
        let pk_column = column_names::<T>(std::slice::from_ref(&pk)).concat();
        let sql = update_sql(self.dialect, &T::table_name(), &columns, &pk_column);
        let affected = self.execute(&sql, &values)?.rows_affected;

        if let Some(hook) = obj.as_after_update() {
            hook.after_update(&ctx)
                .map_err(|source| after_hook_failed("update", affected, source))?;
        }
        Ok(affected)
    }

    /// 按主键删除一条记录。
    pub fn delete<T: Table>(&self, obj: &mut T) -> Result<u64> {
        self.delete_all(std::slice::from_mut(obj))
    }

    /// 以一条 `DELETE ... WHERE pk IN (...)` 删除全部记录；空切片不执行任何语句。
    pub fn delete_all<T: Table>(&self, objs: &mut [T]) -> Result<u64> {
        let pk = primary_key_index(T::FIELDS).ok_or(Error::NoPrimaryKey { op: "Delete" })?;
        if objs.is_empty() {
            return Ok(0);
        }
        let ctx = HookContext::new(&*self.clock);
        for obj in objs.iter_mut() {
            if let Some(hook) = obj.as_before_delete() {
                hook.before_delete(&ctx).map_err(Error::Hook)?;
            }
        }

        let values = objs
            .iter()
            .map(|obj| obj.value_at(&pk))
            .collect::<Result<Vec<_>, _>>()?;
        let pk_column = column_names::<T>(std::slice::from_ref(&pk)).concat();
        let sql = delete_sql(self.dialect, &T::table_name(), &pk_column, values.len());
        let affected = self.execute(&sql, &values)?.rows_affected;

        for obj in objs.iter_mut() {
            if let Some(hook) = obj.as_after_delete() {
                hook.after_delete(&ctx)
                    .map_err(|source| after_hook_failed("delete", affected, source))?;
            }
        }
        Ok(affected)
    }

    pub fn begin(&self) -> Result<()> {
        let mut tx = self.tx.lock().unwrap_or_else(|e| e.into_inner());
        if tx.is_some() {
            return Err(Error::TxAlreadyStarted);
        }
        *tx = Some(self.driver.begin()?);
        tracing::debug!(driver = self.driver.name(), "transaction started");
        Ok(())
    }

    /// 未开始或已结束时返回 [`Error::TxDone`]。无论提交是否成功，事务句柄都会被清空。
    pub fn commit(&self) -> Result<()> {
        let tx = self
            .tx
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .take()
            .ok_or(Error::TxDone)?;
        tx.commit()?;
        tracing::debug!("transaction committed");
        Ok(())
    }

    pub fn rollback(&self) -> Result<()> {
        let tx = self
            .tx
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .take()
            .ok_or(Error::TxDone)?;
        tx.rollback()?;
        tracing::debug!("transaction rolled back");
        Ok(())
    }

    pub fn in_transaction(&self) -> bool {
        self.tx.lock().unwrap_or_else(|e| e.into_inner()).is_some()
    }

    /// 当前连接最近生成的自增 ID。
    pub fn last_insert_id(&self) -> Result<i64> {
        let rows = self.query(self.dialect.last_insert_id(), &[])?;
        match rows.rows.into_iter().next().and_then(|r| r.into_iter().next()) {
            Some(v) => Ok(i64::from_sql_value(v)?),
            None => Err(Error::Usage(format!(
                "{} returned no rows",
                self.dialect.last_insert_id()
            ))),
        }
    }

    pub(crate) fn execute(&self, query: &str, args: &[SqlValue]) -> Result<ExecResult> {
        let start = self.clock.now();
        let mut tx = self.tx.lock().unwrap_or_else(|e| e.into_inner());
        let result = if let Some(tx) = tx.as_mut() {
            tx.execute(query, args)
        } else {
            drop(tx);
            self.driver.execute(query, args)
        };
        self.log(start, query, args);
        result.map_err(|err| driver_failed(query, err))
    }

    pub(crate) fn query(&self, query: &str, args: &[SqlValue]) -> Result<Rows> {
        let start = self.clock.now();
        let mut tx = self.tx.lock().unwrap_or_else(|e| e.into_inner());
        let result = if let Some(tx) = tx.as_mut() {
            tx.query(query, args)
        } else {
            drop(tx);
            self.driver.query(query, args)
        };
        self.log(start, query, args);
        result.map_err(|err| driver_failed(query, err))
    }

    fn log(&self, start: OffsetDateTime, query: &str, args: &[SqlValue]) {
        let elapsed = self.clock.now() - start;
        let logger = self.logger.lock().unwrap_or_else(|e| e.into_inner());
        if let Err(err) = logger.print(start, elapsed, query, args) {
            tracing::warn!(error = %err, "failed to write query log");
        }
    }
}

fn driver_failed(query: &str, err: BoxError) -> Error {
    tracing::debug!(query, error = %err, "statement failed");
    Error::Driver(err)
}

fn after_hook_failed(op: &'static str, affected: u64, source: BoxError) -> Error {
    tracing::warn!(op, affected, error = %source, "after hook failed, statement already applied");
    Error::AfterHook { affected, source }
}

fn column_names<T: Table>(paths: &[Vec<usize>]) -> Vec<String> {
    paths
        .iter()
        .filter_map(|p| field_at(T::FIELDS, p))
        .map(|f| f.column_name())
        .collect()
}

/// 结果集到 `Vec<T>`：先把每个列名解析为 index-path，再逐行写入。
pub(crate) fn map_rows<T: Table>(rows: Rows) -> Result<Vec<T>> {
    let paths = rows
        .columns
        .iter()
        .map(|column| {
            field_index_by_name::<T>(column)?.ok_or_else(|| Error::UnmappedColumn {
                column: to_camel_case(column),
                table: T::TYPE_NAME,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    let mut out = Vec::with_capacity(rows.rows.len());
    for row in rows.rows {
        let mut item = T::default();
        for (path, value) in paths.iter().zip(row) {
            item.set_at(path, value)?;
        }
        out.push(item);
    }
    Ok(out)
}

/// `INSERT INTO "t" ("a", "b") VALUES (?, ?), (?, ?)`，占位符全局编号。
pub(crate) fn insert_sql(dialect: Dialect, table: &str, columns: &[String], rows: usize) -> String {
    let cols: Vec<String> = columns.iter().map(|c| dialect.quote(c)).collect();
    let mut counter = 0;
    let values: Vec<String> = (0..rows)
        .map(|_| {
            let holders: Vec<String> = (0..columns.len())
                .map(|_| {
                    let h = dialect.placeholder(counter);
                    counter += 1;
                    h
                })
                .collect();
            format!("({})", holders.join(", "))
        })
        .collect();
    format!(
        "INSERT INTO {} ({}) VALUES {}",
        dialect.quote(table),
        cols.join(", "),
        values.join(", ")
    )
}

/// `UPDATE "t" SET "a" = ?, "b" = ? WHERE "id" = ?`
pub(crate) fn update_sql(dialect: Dialect, table: &str, columns: &[String], pk: &str) -> String {
    let sets: Vec<String> = columns
        .iter()
        .enumerate()
        .map(|(i, c)| format!("{} = {}", dialect.quote(c), dialect.placeholder(i)))
        .collect();
    format!(
        "UPDATE {} SET {} WHERE {} = {}",
        dialect.quote(table),
        sets.join(", "),
        dialect.quote(pk),
        dialect.placeholder(columns.len())
    )
}

/// `DELETE FROM "t" WHERE "id" IN (?, ?)`
pub(crate) fn delete_sql(dialect: Dialect, table: &str, pk: &str, n: usize) -> String {
    let holders: Vec<String> = (0..n).map(|i| dialect.placeholder(i)).collect();
    format!(
        "DELETE FROM {} WHERE {} IN ({})",
        dialect.quote(table),
        dialect.quote(pk),
        holders.join(", ")
    )
}
