//! SQL 方言：标识符引用、占位符、类型映射、布尔字面量、自增与取回自增 ID。
//!
//! 每个方法都是输入的纯函数。

use std::fmt;

use crate::error::{Error, Result};
use crate::types::{ColumnType, TypeKind};

const DECIMAL_PRECISION: u32 = 65;
const DECIMAL_SCALE: u32 = 30;

/// 约 64KB（VARCHAR/VARBINARY 的上限）。
const SIZE_64K: u64 = (1 << 16) - 1 - 2;
/// 16MB（MEDIUMTEXT/MEDIUMBLOB 的上限）。
const SIZE_16M: u64 = 1 << 24;

/// 支持的数据库方言。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dialect {
    SQLite3,
    MySQL,
    PostgreSQL,
}

/// 占位符风格。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placeholder {
    /// `?`（MySQL/SQLite）。
    QuestionMark,
    /// `$1, $2, ...`（PostgreSQL）。
    DollarNumbered,
}

impl Placeholder {
    pub(crate) fn write(self, index_0_based: usize, out: &mut String) {
        match self {
            Self::QuestionMark => out.push('?'),
            Self::DollarNumbered => {
                out.push('$');
                out.push_str(&(index_0_based + 1).to_string());
            }
        }
    }
}

impl Dialect {
    /// 驱动名。
    pub fn name(self) -> &'static str {
        match self {
            Self::SQLite3 => "sqlite3",
            Self::MySQL => "mysql",
            Self::PostgreSQL => "postgres",
        }
    }

    pub fn placeholder_style(self) -> Placeholder {
        match self {
            Self::SQLite3 | Self::MySQL => Placeholder::QuestionMark,
            Self::PostgreSQL => Placeholder::DollarNumbered,
        }
    }

    /// 第 `i` 个（从 0 开始）占位符。
    pub fn placeholder(self, i: usize) -> String {
        let mut s = String::new();
        self.placeholder_style().write(i, &mut s);
        s
    }

    fn quote_char(self) -> char {
        match self {
            Self::MySQL => '`',
            Self::SQLite3 | Self::PostgreSQL => '"',
        }
    }

    /// 为标识符加引号；内部的引号字符会被双写。
    pub fn quote(self, name: &str) -> String {
        let q = self.quote_char();
        let mut out = String::with_capacity(name.len() + 2);
        out.push(q);
        for c in name.chars() {
            if c == q {
                out.push(q);
            }
            out.push(c);
        }
        out.push(q);
        out
    }

    /// 列引用：`*` 不加引号；有表名时输出 `"t"."c"`。
    pub fn column_name(self, table: Option<&str>, column: &str) -> String {
        let column = if column == "*" {
            column.to_string()
        } else {
            self.quote(column)
        };
        match table {
            Some(t) if !t.is_empty() => format!("{}.{column}", self.quote(t)),
            _ => column,
        }
    }

    /// 列类型名，以及该类型是否允许 NULL。原生浮点返回 [`Error::FloatType`]。
    pub fn sql_type(self, ty: ColumnType, auto_increment: bool, size: u64) -> Result<(String, bool)> {
        use TypeKind::*;

        let name = match (self, ty.kind) {
            (_, NativeFloat) => return Err(Error::FloatType),
            (_, Bytes) => return Ok((self.bytes_type(size), true)),

            (Self::SQLite3, Bool) => "boolean".to_string(),
            (Self::SQLite3, TinyInt | SmallInt | Int | BigInt) => "integer".to_string(),
            (Self::SQLite3, Text) => "text".to_string(),
            (Self::SQLite3, Timestamp) => "datetime".to_string(),
            // numeric 亲和性会把文本转为 REAL
            (Self::SQLite3, Decimal) => "text".to_string(),
            (Self::SQLite3, Float) => "real".to_string(),

            (Self::MySQL, Bool) => "BOOLEAN".to_string(),
            (Self::MySQL, TinyInt | SmallInt) => "SMALLINT".to_string(),
            (Self::MySQL, Int) => "INT".to_string(),
            (Self::MySQL, BigInt) => "BIGINT".to_string(),
            (Self::MySQL, Text) => match size {
                0 => "VARCHAR(255)".to_string(),
                n if n < SIZE_64K => format!("VARCHAR({n})"),
                n if n < SIZE_16M => "MEDIUMTEXT".to_string(),
                _ => "LONGTEXT".to_string(),
            },
            (Self::MySQL, Timestamp) => "DATETIME".to_string(),
            (Self::MySQL, Decimal) => format!("DECIMAL({DECIMAL_PRECISION}, {DECIMAL_SCALE})"),
            (Self::MySQL, Float) => "DOUBLE".to_string(),

            (Self::PostgreSQL, Bool) => "boolean".to_string(),
            (Self::PostgreSQL, TinyInt | SmallInt) => {
                serial(auto_increment, "smallint", "smallserial")
            }
            (Self::PostgreSQL, Int) => serial(auto_increment, "integer", "serial"),
            (Self::PostgreSQL, BigInt) => serial(auto_increment, "bigint", "bigserial"),
            (Self::PostgreSQL, Text) => match size {
                0 => "varchar(255)".to_string(),
                n if n < SIZE_64K => format!("varchar({n})"),
                _ => "text".to_string(),
            },
            (Self::PostgreSQL, Timestamp) => "timestamp with time zone".to_string(),
            (Self::PostgreSQL, Decimal) => {
                format!("numeric({DECIMAL_PRECISION}, {DECIMAL_SCALE})")
            }
            (Self::PostgreSQL, Float) => "double precision".to_string(),
        };
        Ok((name, ty.nullable))
    }

    fn bytes_type(self, size: u64) -> String {
        match self {
            Self::SQLite3 => "blob".to_string(),
            Self::MySQL => match size {
                0 => "VARBINARY(255)".to_string(),
                n if n < SIZE_64K => format!("VARBINARY({n})"),
                n if n < SIZE_16M => "MEDIUMBLOB".to_string(),
                _ => "LONGBLOB".to_string(),
            },
            Self::PostgreSQL => "bytea".to_string(),
        }
    }

    /// 自增关键字；PostgreSQL 改用 serial 类型，因此为空。
    pub fn auto_increment(self) -> &'static str {
        match self {
            Self::SQLite3 => "AUTOINCREMENT",
            Self::MySQL => "AUTO_INCREMENT",
            Self::PostgreSQL => "",
        }
    }

    /// DDL 默认值里的布尔字面量。
    pub fn format_bool(self, b: bool) -> &'static str {
        match (self, b) {
            (Self::SQLite3, true) => "1",
            (Self::SQLite3, false) => "0",
            (_, true) => "TRUE",
            (_, false) => "FALSE",
        }
    }

    /// 取回当前连接最近生成的自增 ID 的语句。
    pub fn last_insert_id(self) -> &'static str {
        match self {
            Self::SQLite3 => "SELECT last_insert_rowid()",
            Self::MySQL => "SELECT LAST_INSERT_ID()",
            Self::PostgreSQL => "SELECT lastval()",
        }
    }
}

fn serial(auto_increment: bool, plain: &str, serial: &str) -> String {
    if auto_increment { serial } else { plain }.to_string()
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
