//! halo-orm：基于结构体映射的轻量 ORM。
//!
//! - [`Condition`]：链式条件构建，按子句优先级编译为带占位符的 SQL 片段
//! - [`sql_table!`]：为 struct 生成字段元数据、取值 / 写值与可选 hook
//! - [`Db`]：查询、插入、更新、删除、事务、DDL 与查询日志
//! - [`Dialect`]：SQLite / MySQL / PostgreSQL 的语法差异

pub mod clock;
pub mod condition;
pub mod create_table;
#[cfg(test)]
mod create_table_tests;
pub mod db;
#[cfg(test)]
mod db_sql_tests;
pub mod dialect;
#[cfg(test)]
mod dialect_tests;
pub mod driver;
pub mod error;
pub mod field_mapper;
pub mod hooks;
pub mod log;
pub mod macros;
#[cfg(test)]
mod macros_tests;
pub mod query;
#[cfg(test)]
mod query_tests;
pub mod scan;
#[cfg(feature = "sqlite")]
pub mod sqlite;
pub mod structs;
pub mod types;
pub mod value;
pub mod valuer;

pub use crate::clock::{Clock, FixedClock, SystemClock};
pub use crate::condition::{
    Clause, Column, Condition, ConditionError, JoinCondition, JoinOn, Order, OrderTerm, Predicate,
    TableRef, join, left_join, limit, offset, order_by, table, where_,
};
pub use crate::create_table::{
    column_definitions, create_index_sql, create_table_sql, drop_table_sql,
};
pub use crate::db::Db;
pub use crate::dialect::{Dialect, Placeholder};
pub use crate::driver::{Driver, ExecResult, Rows, Transaction};
pub use crate::error::{BoxError, Error, Result};
pub use crate::field_mapper::{to_camel_case, to_snake_case};
pub use crate::hooks::{
    AfterDelete, AfterInsert, AfterUpdate, BeforeDelete, BeforeInsert, BeforeUpdate, HookContext,
    TimeStamp,
};
pub use crate::log::{LogError, NullLogger, QueryLogger, TemplateLogger, TracingLogger};
pub use crate::query::{
    ColumnExpr, Distinct, FromTable, Function, QueryArg, QueryPlan, Raw, classify, count,
    count_of, distinct, from,
};
pub use crate::scan::{FromSqlValue, ScanError};
#[cfg(feature = "sqlite")]
pub use crate::sqlite::{SqliteDriver, SqliteTransaction};
pub use crate::structs::{FieldKind, FieldMeta, SqlStruct, Table};
pub use crate::types::{ColumnType, Float32, Float64, Rat, SqlType, TypeKind};
pub use crate::value::SqlValue;
pub use crate::valuer::{Arg, FlattenIntoArgs, SqlValuer, ValuerError, flatten};

/// 便捷命名空间：`use halo_orm::prelude::*;`。
pub mod prelude {
    pub use crate::*;
}
