//! 条件参数：具体值或在构建阶段才求值的 [`SqlValuer`]。
//!
//! `In` 的一层展开通过 [`FlattenIntoArgs`] 完成：标量、`Vec<T>`、`[T; N]` 都能直接传入。

use rust_decimal::Decimal;
use time::OffsetDateTime;

use crate::types::{Float32, Float64, Rat};
use crate::value::SqlValue;

/// Valuer 错误。
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("sql valuer error: {0}")]
pub struct ValuerError(pub String);

/// 可在构建阶段动态计算实际值的 trait。
pub trait SqlValuer: dyn_clone::DynClone + std::fmt::Debug + Send + Sync {
    fn value(&self) -> Result<SqlValue, ValuerError>;
}

dyn_clone::clone_trait_object!(SqlValuer);

/// 条件里绑定到一个占位符的参数。
#[derive(Debug, Clone)]
pub enum Arg {
    Value(SqlValue),
    Valuer(Box<dyn SqlValuer>),
}

impl Arg {
    /// 求出最终绑定值。
    pub fn resolve(&self) -> Result<SqlValue, ValuerError> {
        match self {
            Self::Value(v) => Ok(v.clone()),
            Self::Valuer(v) => v.value(),
        }
    }
}

impl PartialEq for Arg {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Value(a), Self::Value(b)) => a == b,
            _ => false,
        }
    }
}

impl From<SqlValue> for Arg {
    fn from(v: SqlValue) -> Self {
        Self::Value(v)
    }
}

impl From<Box<dyn SqlValuer>> for Arg {
    fn from(v: Box<dyn SqlValuer>) -> Self {
        Self::Valuer(v)
    }
}

macro_rules! arg_from {
    ($($t:ty),+ $(,)?) => {
        $(impl From<$t> for Arg {
            fn from(v: $t) -> Self {
                Self::Value(SqlValue::from(v))
            }
        })+
    };
}

// 不为 u8 实现：`Vec<u8>` 作为单个 BLOB 参数，而不是被展开。
arg_from!(
    bool,
    i8,
    i16,
    i32,
    i64,
    u16,
    u32,
    u64,
    f64,
    Float32,
    Float64,
    Rat,
    Decimal,
    String,
    &'static str,
    Vec<u8>,
    OffsetDateTime,
);

impl<T> From<Option<T>> for Arg
where
    T: Into<SqlValue>,
{
    fn from(v: Option<T>) -> Self {
        Self::Value(SqlValue::from_option(v))
    }
}

/// 用 trait 实现 “一层展开”：`in_(1)`、`in_([1, 2])`、`in_(vec![1, 2])`。
pub trait FlattenIntoArgs {
    fn flatten_into(self, out: &mut Vec<Arg>);
}

impl<T: Into<Arg>> FlattenIntoArgs for T {
    fn flatten_into(self, out: &mut Vec<Arg>) {
        out.push(self.into());
    }
}

impl<T: Into<Arg>> FlattenIntoArgs for Vec<T> {
    fn flatten_into(self, out: &mut Vec<Arg>) {
        out.extend(self.into_iter().map(Into::into));
    }
}

impl<T: Into<Arg>, const N: usize> FlattenIntoArgs for [T; N] {
    fn flatten_into(self, out: &mut Vec<Arg>) {
        out.extend(self.into_iter().map(Into::into));
    }
}

/// 展开为参数列表。
pub fn flatten<T: FlattenIntoArgs>(v: T) -> Vec<Arg> {
    let mut out = Vec::new();
    v.flatten_into(&mut out);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[derive(Debug, Clone)]
    struct Fixed(i64);

    impl SqlValuer for Fixed {
        fn value(&self) -> Result<SqlValue, ValuerError> {
            Ok(SqlValue::I64(self.0))
        }
    }

    #[test]
    fn flatten_vec_and_array_match() {
        assert_eq!(flatten(vec![1_i64, 2, 3]), flatten([1_i64, 2, 3]));
        assert_eq!(flatten(7_i64), vec![Arg::from(7_i64)]);
    }

    #[test]
    fn bytes_stay_a_single_arg() {
        assert_eq!(flatten(vec![1_u8, 2]).len(), 1);
    }

    #[test]
    fn valuer_is_resolved_lazily() {
        let arg = Arg::from(Box::new(Fixed(9)) as Box<dyn SqlValuer>);
        let cloned = arg.clone();
        assert_eq!(cloned.resolve(), Ok(SqlValue::I64(9)));
    }
}
