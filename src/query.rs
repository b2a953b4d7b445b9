//! 查询参数分类：把 `select` 的参数列表整理为 `(投影, FROM 表, 条件列表)`。
//!
//! 第一个参数（若不是条件）决定投影：列名、列名列表、`Distinct` 或聚合函数；
//! 其余参数只能是 `Condition` 或 `From`（最多一个）。违例以错误返回。

use crate::condition::Condition;
use crate::dialect::Dialect;
use crate::error::{Error, Result};
use crate::structs::Table;
use crate::value::SqlValue;

/// 原样输出、不加引号的列表达式。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Raw(pub String);

impl Raw {
    pub fn new(expr: impl Into<String>) -> Self {
        Self(expr.into())
    }
}

/// 投影里的一项。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColumnExpr {
    Name(String),
    Raw(String),
    Distinct(Distinct),
}

impl From<&str> for ColumnExpr {
    fn from(v: &str) -> Self {
        Self::Name(v.to_string())
    }
}

impl From<String> for ColumnExpr {
    fn from(v: String) -> Self {
        Self::Name(v)
    }
}

impl From<Raw> for ColumnExpr {
    fn from(v: Raw) -> Self {
        Self::Raw(v.0)
    }
}

impl From<Distinct> for ColumnExpr {
    fn from(v: Distinct) -> Self {
        Self::Distinct(v)
    }
}

/// `DISTINCT cols`。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Distinct {
    columns: Vec<String>,
}

pub fn distinct<I, S>(columns: I) -> Distinct
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    Distinct {
        columns: columns.into_iter().map(Into::into).collect(),
    }
}

/// SQL 函数，例如 `COUNT(*)`。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Function {
    pub name: String,
    pub args: Vec<ColumnExpr>,
}

/// `COUNT(*)`。
pub fn count() -> Function {
    Function {
        name: "COUNT".to_string(),
        args: Vec::new(),
    }
}

/// `COUNT(col)`，也可以传 `Distinct` 或 `Raw`。
pub fn count_of(column: impl Into<ColumnExpr>) -> Function {
    Function {
        name: "COUNT".to_string(),
        args: vec![column.into()],
    }
}

/// 覆盖 FROM 表。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FromTable {
    pub table_name: String,
}

pub fn from<T: Table>() -> FromTable {
    FromTable {
        table_name: T::table_name(),
    }
}

/// `select` 的参数。
#[derive(Debug, Clone)]
pub enum QueryArg {
    Column(String),
    Columns(Vec<ColumnExpr>),
    Distinct(Distinct),
    Function(Function),
    Condition(Condition),
    From(FromTable),
}

impl QueryArg {
    fn type_name(&self) -> &'static str {
        match self {
            Self::Column(_) => "string",
            Self::Columns(_) => "column list",
            Self::Distinct(_) => "Distinct",
            Self::Function(_) => "Function",
            Self::Condition(_) => "Condition",
            Self::From(_) => "From",
        }
    }
}

impl From<&str> for QueryArg {
    fn from(v: &str) -> Self {
        Self::Column(v.to_string())
    }
}

impl From<String> for QueryArg {
    fn from(v: String) -> Self {
        Self::Column(v)
    }
}

impl From<Vec<&str>> for QueryArg {
    fn from(v: Vec<&str>) -> Self {
        Self::Columns(v.into_iter().map(ColumnExpr::from).collect())
    }
}

impl<const N: usize> From<[&str; N]> for QueryArg {
    fn from(v: [&str; N]) -> Self {
        Self::Columns(v.into_iter().map(ColumnExpr::from).collect())
    }
}

impl From<Vec<ColumnExpr>> for QueryArg {
    fn from(v: Vec<ColumnExpr>) -> Self {
        Self::Columns(v)
    }
}

impl From<Raw> for QueryArg {
    fn from(v: Raw) -> Self {
        Self::Columns(vec![v.into()])
    }
}

impl From<Distinct> for QueryArg {
    fn from(v: Distinct) -> Self {
        Self::Distinct(v)
    }
}

impl From<Function> for QueryArg {
    fn from(v: Function) -> Self {
        Self::Function(v)
    }
}

impl From<Condition> for QueryArg {
    fn from(v: Condition) -> Self {
        Self::Condition(v)
    }
}

impl From<FromTable> for QueryArg {
    fn from(v: FromTable) -> Self {
        Self::From(v)
    }
}

/// 分类结果。
#[derive(Debug, Clone)]
pub struct QueryPlan {
    pub column: String,
    pub from: String,
    pub conditions: Vec<Condition>,
}

impl QueryPlan {
    /// `SELECT col FROM "t" cond...`；所有条件共享同一个占位符计数器。
    pub fn to_sql(&self, dialect: Dialect) -> Result<(String, Vec<SqlValue>)> {
        let mut sql = format!("SELECT {} FROM {}", self.column, dialect.quote(&self.from));
        let mut args = Vec::new();
        let mut counter = 0;
        for cond in &self.conditions {
            let (fragment, values) = cond.build(dialect, &mut counter)?;
            if !fragment.is_empty() {
                sql.push(' ');
                sql.push_str(&fragment);
            }
            args.extend(values);
        }
        Ok((sql, args))
    }
}

fn columns(dialect: Dialect, table: &str, columns: &[ColumnExpr]) -> String {
    if columns.is_empty() {
        return dialect.column_name(Some(table), "*");
    }
    columns
        .iter()
        .map(|c| match c {
            ColumnExpr::Name(name) => dialect.column_name(Some(table), name),
            ColumnExpr::Raw(raw) => raw.clone(),
            ColumnExpr::Distinct(d) => distinct_sql(dialect, table, d),
        })
        .collect::<Vec<_>>()
        .join(", ")
}

fn distinct_sql(dialect: Dialect, table: &str, d: &Distinct) -> String {
    let cols: Vec<ColumnExpr> = d.columns.iter().map(|c| ColumnExpr::Name(c.clone())).collect();
    format!("DISTINCT {}", columns(dialect, table, &cols))
}

/// 分类。`default_table` 为目标 struct 的表名；为 `None`（标量查询）时必须给出 `From`。
pub fn classify(
    dialect: Dialect,
    default_table: Option<&str>,
    args: Vec<QueryArg>,
) -> Result<QueryPlan> {
    let mut from = None;
    for arg in &args {
        if let QueryArg::From(f) = arg {
            if from.is_some() {
                return Err(Error::DuplicateFrom);
            }
            from = Some(f.table_name.clone());
        }
    }
    let table = match (from, default_table) {
        (Some(t), _) => t,
        (None, Some(t)) => t.to_string(),
        (None, None) => return Err(Error::MissingFrom),
    };

    let mut args = args.into_iter().peekable();
    let column = match args.peek() {
        Some(QueryArg::Column(_) | QueryArg::Columns(_) | QueryArg::Distinct(_) | QueryArg::Function(_)) => {
            match args.next() {
                Some(QueryArg::Column(c)) if !c.is_empty() => Some(dialect.column_name(Some(&table), &c)),
                Some(QueryArg::Columns(cs)) => Some(columns(dialect, &table, &cs)),
                Some(QueryArg::Distinct(d)) => Some(distinct_sql(dialect, &table, &d)),
                Some(QueryArg::Function(f)) => {
                    let inner = if f.args.is_empty() {
                        "*".to_string()
                    } else {
                        columns(dialect, &table, &f.args)
                    };
                    Some(format!("{}({inner})", f.name))
                }
                _ => None,
            }
        }
        _ => None,
    };

    let mut conditions = Vec::new();
    for arg in args {
        match arg {
            QueryArg::Condition(c) => conditions.push(c.with_table_name(table.clone())),
            QueryArg::From(_) => {}
            QueryArg::Column(_) | QueryArg::Columns(_) => {
                return Err(Error::MisplacedProjection(arg.type_name()));
            }
            QueryArg::Function(f) => return Err(Error::MisplacedFunction(f.name)),
            QueryArg::Distinct(_) => return Err(Error::UnsupportedArgument(arg.type_name())),
        }
    }

    let column = column.unwrap_or_else(|| dialect.column_name(Some(&table), "*"));
    Ok(QueryPlan {
        column,
        from: table,
        conditions,
    })
}
