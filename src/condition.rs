//! 条件构建器：链式累积 Where/And/Or/In/Like/Between/IsNull/OrderBy/Limit/Offset/Join 片段，
//! 按子句优先级稳定排序后编译为带占位符的 SQL 片段与参数列表。
//!
//! 输出顺序只由优先级决定，与调用顺序无关：JOIN 最先，然后 WHERE、AND/OR/IN/...、ORDER BY、
//! LIMIT、OFFSET。占位符计数器在整条语句内共享（嵌套条件、多个条件对象），
//! 因此 PostgreSQL 的 `$N` 全局连续，且 `args[i]` 总是绑定第 `i` 个占位符。

use std::fmt;

use crate::dialect::Dialect;
use crate::error::Result;
use crate::structs::Table;
use crate::value::SqlValue;
use crate::valuer::{Arg, FlattenIntoArgs, flatten};

/// 链式调用中的用法错误；记录第一个，在构建时返回。
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConditionError {
    #[error("unsupported operator: {0:?}")]
    UnsupportedOperator(String),
    #[error("{0} must follow a bare column reference, e.g. where_(\"name\")")]
    MissingColumn(Clause),
    #[error("WHERE specified more than once, use And/Or to add predicates")]
    DuplicateWhere,
}

/// 子句种类。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Clause {
    Where,
    And,
    Or,
    OrderBy,
    Limit,
    Offset,
    In,
    Like,
    Between,
    Join,
    LeftJoin,
    IsNull,
    IsNotNull,
}

impl Clause {
    pub fn keyword(self) -> &'static str {
        match self {
            Self::Where => "WHERE",
            Self::And => "AND",
            Self::Or => "OR",
            Self::OrderBy => "ORDER BY",
            Self::Limit => "LIMIT",
            Self::Offset => "OFFSET",
            Self::In => "IN",
            Self::Like => "LIKE",
            Self::Between => "BETWEEN",
            Self::Join => "JOIN",
            Self::LeftJoin => "LEFT JOIN",
            Self::IsNull => "IS NULL",
            Self::IsNotNull => "IS NOT NULL",
        }
    }

    /// 排序优先级，越小越靠前。
    pub fn priority(self) -> i32 {
        match self {
            Self::Join | Self::LeftJoin => -100,
            Self::Where => 0,
            Self::And
            | Self::Or
            | Self::In
            | Self::Like
            | Self::Between
            | Self::IsNull
            | Self::IsNotNull => 100,
            Self::OrderBy => 300,
            Self::Limit => 500,
            Self::Offset => 700,
        }
    }
}

impl fmt::Display for Clause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

/// 排序方向。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Order {
    #[default]
    Asc,
    Desc,
}

impl fmt::Display for Order {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        })
    }
}

const OPERATORS: &[&str] = &[
    "=", "!=", "<>", "<", ">", "<=", ">=", "LIKE", "NOT LIKE", "IS", "IS NOT",
];

fn normalize_operator(op: &str) -> Option<String> {
    let op = op.split_whitespace().collect::<Vec<_>>().join(" ").to_ascii_uppercase();
    OPERATORS.contains(&op.as_str()).then_some(op)
}

/// 表引用：用于限定列所属的表。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableRef(String);

impl TableRef {
    pub fn of<T: Table>() -> Self {
        Self(T::table_name())
    }

    pub fn named(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn name(&self) -> &str {
        &self.0
    }
}

/// `TableRef::of::<T>()` 的简写。
pub fn table<T: Table>() -> TableRef {
    TableRef::of::<T>()
}

/// 列引用：`(表名?, 列名)`。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Column {
    pub table: Option<String>,
    pub name: String,
}

impl Column {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            table: None,
            name: name.into(),
        }
    }

    pub fn qualified(table: &TableRef, name: impl Into<String>) -> Self {
        Self {
            table: Some(table.0.clone()),
            name: name.into(),
        }
    }

    fn render(&self, dialect: Dialect) -> String {
        dialect.column_name(self.table.as_deref(), &self.name)
    }
}

/// Where/And/Or 接受的参数形状。
///
/// - `"col"`：裸列，后续接 `in_`/`like`/`between`/`is_null`
/// - `("col", "=", v)`：二元表达式
/// - `(table::<T>(), "col")` / `(table::<T>(), "col", "=", v)`：带表名限定
/// - `Condition`：嵌套条件，输出时加括号
#[derive(Debug, Clone)]
pub enum Predicate {
    Column(Column),
    Binary {
        column: Column,
        op: String,
        value: Arg,
    },
    Nested(Box<Condition>),
}

impl From<&str> for Predicate {
    fn from(v: &str) -> Self {
        Self::Column(Column::new(v))
    }
}

impl From<String> for Predicate {
    fn from(v: String) -> Self {
        Self::Column(Column::new(v))
    }
}

impl<V: Into<Arg>> From<(&str, &str, V)> for Predicate {
    fn from((column, op, value): (&str, &str, V)) -> Self {
        Self::Binary {
            column: Column::new(column),
            op: op.to_string(),
            value: value.into(),
        }
    }
}

impl From<(TableRef, &str)> for Predicate {
    fn from((table, column): (TableRef, &str)) -> Self {
        Self::Column(Column::qualified(&table, column))
    }
}

impl<V: Into<Arg>> From<(TableRef, &str, &str, V)> for Predicate {
    fn from((table, column, op, value): (TableRef, &str, &str, V)) -> Self {
        Self::Binary {
            column: Column::qualified(&table, column),
            op: op.to_string(),
            value: value.into(),
        }
    }
}

impl From<Condition> for Predicate {
    fn from(v: Condition) -> Self {
        Self::Nested(Box::new(v))
    }
}

/// ORDER BY 的一项：`("col", Order::Desc)` 或 `(table::<T>(), "col", Order::Asc)`。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderTerm {
    pub column: Column,
    pub order: Order,
}

impl From<(&str, Order)> for OrderTerm {
    fn from((column, order): (&str, Order)) -> Self {
        Self {
            column: Column::new(column),
            order,
        }
    }
}

impl From<(TableRef, &str, Order)> for OrderTerm {
    fn from((table, column, order): (TableRef, &str, Order)) -> Self {
        Self {
            column: Column::qualified(&table, column),
            order,
        }
    }
}

#[derive(Debug, Clone)]
struct JoinSpec {
    table: String,
    left_table: Option<String>,
    left: String,
    op: String,
    right: String,
}

#[derive(Debug, Clone)]
enum Expr {
    Column(Column),
    Binary { column: Column, op: String, value: Arg },
    Values(Vec<Arg>),
    Range(Arg, Arg),
    Nested(Box<Condition>),
    Join(JoinSpec),
    Order(Vec<OrderTerm>),
    Scalar(Arg),
    None,
}

#[derive(Debug, Clone)]
struct Part {
    clause: Clause,
    expr: Expr,
    priority: i32,
}

/// 条件：有序的片段列表。`build` 不修改自身，可以在多条语句里复用。
#[derive(Debug, Clone, Default)]
pub struct Condition {
    parts: Vec<Part>,
    table_name: Option<String>,
    error: Option<ConditionError>,
}

impl Condition {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }

    /// JOIN 左表与嵌套条件默认使用的表名（由查询的 FROM 表设置）。
    pub fn table_name(&self) -> Option<&str> {
        self.table_name.as_deref()
    }

    pub fn with_table_name(mut self, name: impl Into<String>) -> Self {
        self.table_name = Some(name.into());
        self
    }

    /// 链式调用中记录的第一个用法错误。
    pub fn error(&self) -> Option<&ConditionError> {
        self.error.as_ref()
    }

    pub fn where_(self, predicate: impl Into<Predicate>) -> Self {
        if self.parts.iter().any(|p| p.clause == Clause::Where) {
            return self.fail(ConditionError::DuplicateWhere);
        }
        self.push_predicate(Clause::Where, predicate.into())
    }

    pub fn and(self, predicate: impl Into<Predicate>) -> Self {
        self.push_predicate(Clause::And, predicate.into())
    }

    pub fn or(self, predicate: impl Into<Predicate>) -> Self {
        self.push_predicate(Clause::Or, predicate.into())
    }

    /// `IN (?, ?, ...)`：参数展开一层，`in_([1, 2, 3])` 与 `in_(vec![1, 2, 3])` 等价。
    pub fn in_(self, values: impl FlattenIntoArgs) -> Self {
        self.push_after_column(Clause::In, Expr::Values(flatten(values)))
    }

    pub fn like(self, pattern: impl Into<String>) -> Self {
        self.push_after_column(Clause::Like, Expr::Scalar(Arg::from(pattern.into())))
    }

    /// `BETWEEN ? AND ?`，按 `from, to` 顺序绑定。
    pub fn between(self, from: impl Into<Arg>, to: impl Into<Arg>) -> Self {
        self.push_after_column(Clause::Between, Expr::Range(from.into(), to.into()))
    }

    pub fn is_null(self) -> Self {
        self.push_after_column(Clause::IsNull, Expr::None)
    }

    pub fn is_not_null(self) -> Self {
        self.push_after_column(Clause::IsNotNull, Expr::None)
    }

    /// 追加一个排序项；多次调用合并到同一个 ORDER BY，按调用顺序输出。
    pub fn order_by(mut self, term: impl Into<OrderTerm>) -> Self {
        let term = term.into();
        for part in &mut self.parts {
            if let Expr::Order(terms) = &mut part.expr {
                terms.push(term);
                return self;
            }
        }
        self.push(Clause::OrderBy, Expr::Order(vec![term]))
    }

    pub fn limit(self, n: u64) -> Self {
        self.push(Clause::Limit, Expr::Scalar(Arg::from(n)))
    }

    pub fn offset(self, n: u64) -> Self {
        self.push(Clause::Offset, Expr::Scalar(Arg::from(n)))
    }

    fn fail(mut self, err: ConditionError) -> Self {
        if self.error.is_none() {
            self.error = Some(err);
        }
        self
    }

    fn push(mut self, clause: Clause, expr: Expr) -> Self {
        self.parts.push(Part {
            clause,
            expr,
            priority: clause.priority(),
        });
        self
    }

    fn push_predicate(self, clause: Clause, predicate: Predicate) -> Self {
        let expr = match predicate {
            Predicate::Column(c) => Expr::Column(c),
            Predicate::Binary { column, op, value } => match normalize_operator(&op) {
                Some(op) => Expr::Binary { column, op, value },
                None => return self.fail(ConditionError::UnsupportedOperator(op)),
            },
            Predicate::Nested(c) => Expr::Nested(c),
        };
        self.push(clause, expr)
    }

    fn push_after_column(self, clause: Clause, expr: Expr) -> Self {
        let follows_column = matches!(
            self.parts.last(),
            Some(Part {
                clause: Clause::Where | Clause::And | Clause::Or,
                expr: Expr::Column(_),
                ..
            })
        );
        if !follows_column {
            return self.fail(ConditionError::MissingColumn(clause));
        }
        self.push(clause, expr)
    }

    /// 编译为 SQL 片段与参数；`counter` 是整条语句共享的占位符计数器。
    pub fn build(&self, dialect: Dialect, counter: &mut usize) -> Result<(String, Vec<SqlValue>)> {
        self.build_with(dialect, counter, false, None)
    }

    fn build_with(
        &self,
        dialect: Dialect,
        counter: &mut usize,
        inner: bool,
        outer_table: Option<&str>,
    ) -> Result<(String, Vec<SqlValue>)> {
        if let Some(err) = &self.error {
            return Err(err.clone().into());
        }
        let table_name = self.table_name.as_deref().or(outer_table);

        let mut parts: Vec<&Part> = self.parts.iter().collect();
        parts.sort_by_key(|p| p.priority);

        let mut tokens: Vec<String> = Vec::new();
        let mut binder = Binder {
            dialect,
            counter,
            args: Vec::new(),
        };
        for part in parts {
            if !(inner && part.clause == Clause::Where) {
                tokens.push(part.clause.keyword().to_string());
            }
            match &part.expr {
                Expr::Column(c) => tokens.push(c.render(dialect)),
                Expr::Binary { column, op, value } => {
                    tokens.push(column.render(dialect));
                    tokens.push(op.clone());
                    tokens.push(binder.bind(value)?);
                }
                Expr::Values(values) => {
                    let holders = if values.is_empty() {
                        vec![binder.bind_value(SqlValue::Null)]
                    } else {
                        values
                            .iter()
                            .map(|v| binder.bind(v))
                            .collect::<Result<Vec<_>>>()?
                    };
                    tokens.push(format!("({})", holders.join(", ")));
                }
                Expr::Range(from, to) => {
                    tokens.push(binder.bind(from)?);
                    tokens.push("AND".to_string());
                    tokens.push(binder.bind(to)?);
                }
                Expr::Nested(c) => {
                    let (sql, args) = c.build_with(dialect, binder.counter, true, table_name)?;
                    tokens.push(format!("({sql})"));
                    binder.args.extend(args);
                }
                Expr::Join(j) => {
                    tokens.push(dialect.quote(&j.table));
                    tokens.push("ON".to_string());
                    tokens.push(dialect.column_name(j.left_table.as_deref().or(table_name), &j.left));
                    tokens.push(j.op.clone());
                    tokens.push(dialect.column_name(Some(&j.table), &j.right));
                }
                Expr::Order(terms) => tokens.push(
                    terms
                        .iter()
                        .map(|t| format!("{} {}", t.column.render(dialect), t.order))
                        .collect::<Vec<_>>()
                        .join(", "),
                ),
                Expr::Scalar(v) => tokens.push(binder.bind(v)?),
                Expr::None => {}
            }
        }
        Ok((tokens.join(" "), binder.args))
    }
}

struct Binder<'a> {
    dialect: Dialect,
    counter: &'a mut usize,
    args: Vec<SqlValue>,
}

impl Binder<'_> {
    fn bind(&mut self, arg: &Arg) -> Result<String> {
        let value = arg.resolve()?;
        Ok(self.bind_value(value))
    }

    fn bind_value(&mut self, value: SqlValue) -> String {
        self.args.push(value);
        let holder = self.dialect.placeholder(*self.counter);
        *self.counter += 1;
        holder
    }
}

/// JOIN 的 ON 子句。
///
/// - `"id"`：两表同名列相等
/// - `("id", "=", "parent_id")`：左表列 op 被连接表列
/// - `(table::<T>(), "id")` / `(table::<T>(), "id", "=", "parent_id")`：显式指定左表
#[derive(Debug, Clone)]
pub struct JoinOn {
    left_table: Option<String>,
    left: String,
    op: String,
    right: String,
}

impl From<&str> for JoinOn {
    fn from(column: &str) -> Self {
        Self {
            left_table: None,
            left: column.to_string(),
            op: "=".to_string(),
            right: column.to_string(),
        }
    }
}

impl From<(&str, &str, &str)> for JoinOn {
    fn from((left, op, right): (&str, &str, &str)) -> Self {
        Self {
            left_table: None,
            left: left.to_string(),
            op: op.to_string(),
            right: right.to_string(),
        }
    }
}

impl From<(TableRef, &str)> for JoinOn {
    fn from((table, column): (TableRef, &str)) -> Self {
        Self {
            left_table: Some(table.0),
            ..Self::from(column)
        }
    }
}

impl From<(TableRef, &str, &str, &str)> for JoinOn {
    fn from((table, left, op, right): (TableRef, &str, &str, &str)) -> Self {
        Self {
            left_table: Some(table.0),
            ..Self::from((left, op, right))
        }
    }
}

/// `JOIN t` / `LEFT JOIN t`，调用 [`JoinCondition::on`] 后得到 [`Condition`]。
#[derive(Debug, Clone)]
pub struct JoinCondition {
    clause: Clause,
    table: String,
}

impl JoinCondition {
    pub fn inner(table: TableRef) -> Self {
        Self {
            clause: Clause::Join,
            table: table.0,
        }
    }

    pub fn left(table: TableRef) -> Self {
        Self {
            clause: Clause::LeftJoin,
            table: table.0,
        }
    }

    pub fn on(self, on: impl Into<JoinOn>) -> Condition {
        let on = on.into();
        let Some(op) = normalize_operator(&on.op) else {
            return Condition::new().fail(ConditionError::UnsupportedOperator(on.op));
        };
        Condition::new().push(
            self.clause,
            Expr::Join(JoinSpec {
                table: self.table,
                left_table: on.left_table,
                left: on.left,
                op,
                right: on.right,
            }),
        )
    }
}

/// `Condition::new().where_(...)` 的简写。
pub fn where_(predicate: impl Into<Predicate>) -> Condition {
    Condition::new().where_(predicate)
}

pub fn order_by(term: impl Into<OrderTerm>) -> Condition {
    Condition::new().order_by(term)
}

pub fn limit(n: u64) -> Condition {
    Condition::new().limit(n)
}

pub fn offset(n: u64) -> Condition {
    Condition::new().offset(n)
}

pub fn join<T: Table>() -> JoinCondition {
    JoinCondition::inner(TableRef::of::<T>())
}

pub fn left_join<T: Table>() -> JoinCondition {
    JoinCondition::left(TableRef::of::<T>())
}
