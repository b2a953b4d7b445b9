//! 宏集合：为 `select` 提供 Go 式的可变参数调用封装。
//!
//! `query_args![...]` 把异构参数（列名、`Distinct`、`Function`、`Condition`、`From`）
//! 统一转换为 `Vec<QueryArg>`，无需逐个调用 `.into()`。

/// ```ignore
/// let users: Vec<User> = db.select::<User>(query_args![
///     "name",
///     where_(("age", ">", 18)),
///     order_by(("id", Order::Desc)),
/// ])?;
/// ```
#[macro_export]
macro_rules! query_args {
    () => {
        ::std::vec::Vec::<$crate::query::QueryArg>::new()
    };
    ($($arg:expr),+ $(,)?) => {
        ::std::vec![$($crate::query::QueryArg::from($arg)),+]
    };
}
