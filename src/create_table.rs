//! DDL：由字段元数据生成 CREATE TABLE / DROP TABLE / CREATE INDEX。
//!
//! 列定义格式：`"name" type [PRIMARY KEY [自增]] [UNIQUE] [NOT NULL] [DEFAULT v]`。

use crate::db::Db;
use crate::dialect::Dialect;
use crate::error::{Error, Result};
use crate::structs::{Table, columns};
use crate::types::TypeKind;

/// 每个列的定义行，按字段顺序（嵌入字段就地展开，`[skip]` 被忽略）。
pub fn column_definitions<T: Table>(dialect: Dialect) -> Result<Vec<String>> {
    let mut defs = Vec::new();
    for (_, meta) in columns(T::FIELDS) {
        let Some(ty) = meta.column_type() else {
            continue;
        };
        let column = meta.column_name();
        let mut line = vec![dialect.quote(&column)];
        let mut options = Vec::new();
        let auto_increment = meta.is_auto_increment();
        if meta.pk {
            options.push("PRIMARY KEY".to_string());
            if auto_increment && !dialect.auto_increment().is_empty() {
                options.push(dialect.auto_increment().to_string());
            }
        }
        if meta.unique {
            options.push("UNIQUE".to_string());
        }
        let (type_name, nullable) = dialect.sql_type(ty, auto_increment, meta.size)?;
        line.push(type_name);
        line.extend(options);
        if !nullable {
            line.push("NOT NULL".to_string());
        }
        if let Some(value) = meta.default {
            let literal = if ty.kind == TypeKind::Bool {
                let b = parse_bool(value).ok_or_else(|| Error::InvalidDefault {
                    column: column.clone(),
                    value: value.to_string(),
                })?;
                dialect.format_bool(b).to_string()
            } else {
                value.to_string()
            };
            line.push(format!("DEFAULT {literal}"));
        }
        defs.push(line.join(" "));
    }
    Ok(defs)
}

fn parse_bool(s: &str) -> Option<bool> {
    match s {
        "1" | "t" | "T" | "true" | "TRUE" | "True" => Some(true),
        "0" | "f" | "F" | "false" | "FALSE" | "False" => Some(false),
        _ => None,
    }
}

pub fn create_table_sql<T: Table>(dialect: Dialect, if_not_exists: bool) -> Result<String> {
    let verb = if if_not_exists {
        "CREATE TABLE IF NOT EXISTS"
    } else {
        "CREATE TABLE"
    };
    Ok(format!(
        "{verb} {} ({})",
        dialect.quote(&T::table_name()),
        column_definitions::<T>(dialect)?.join(", ")
    ))
}

pub fn drop_table_sql<T: Table>(dialect: Dialect) -> String {
    format!("DROP TABLE {}", dialect.quote(&T::table_name()))
}

/// 索引名为 `index_<table>_<col>...`。
pub fn create_index_sql<T: Table>(dialect: Dialect, unique: bool, columns: &[&str]) -> Result<String> {
    if columns.is_empty() {
        return Err(Error::Usage("create_index: at least one column must be given".into()));
    }
    let table = T::table_name();
    let name = std::iter::once("index")
        .chain(std::iter::once(table.as_str()))
        .chain(columns.iter().copied())
        .collect::<Vec<_>>()
        .join("_");
    let cols: Vec<String> = columns.iter().map(|c| dialect.quote(c)).collect();
    let verb = if unique { "CREATE UNIQUE INDEX" } else { "CREATE INDEX" };
    Ok(format!(
        "{verb} {} ON {} ({})",
        dialect.quote(&name),
        dialect.quote(&table),
        cols.join(", ")
    ))
}

impl Db {
    pub fn create_table<T: Table>(&self) -> Result<()> {
        let sql = create_table_sql::<T>(self.dialect(), false)?;
        self.execute(&sql, &[])?;
        Ok(())
    }

    pub fn create_table_if_not_exists<T: Table>(&self) -> Result<()> {
        let sql = create_table_sql::<T>(self.dialect(), true)?;
        self.execute(&sql, &[])?;
        Ok(())
    }

    pub fn drop_table<T: Table>(&self) -> Result<()> {
        self.execute(&drop_table_sql::<T>(self.dialect()), &[])?;
        Ok(())
    }

    pub fn create_index<T: Table>(&self, columns: &[&str]) -> Result<()> {
        let sql = create_index_sql::<T>(self.dialect(), false, columns)?;
        self.execute(&sql, &[])?;
        Ok(())
    }

    pub fn create_unique_index<T: Table>(&self, columns: &[&str]) -> Result<()> {
        let sql = create_index_sql::<T>(self.dialect(), true, columns)?;
        self.execute(&sql, &[])?;
        Ok(())
    }
}
