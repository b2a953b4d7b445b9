//! 列类型：字段类型到“语义种类”的映射，以及显式的浮点 / 精确小数包装类型。
//!
//! 原生 `f32`/`f64` 会在建表时被拒绝（舍入误差），需要浮点列请用 [`Float32`]/[`Float64`]，
//! 需要精确值请用 [`Rat`]。

use rust_decimal::Decimal;
use time::OffsetDateTime;

/// 显式声明“接受舍入误差”的 32 位浮点列。
#[derive(Debug, Clone, Copy, Default, PartialEq, PartialOrd)]
pub struct Float32(pub f32);

/// 显式声明“接受舍入误差”的 64 位浮点列。
#[derive(Debug, Clone, Copy, Default, PartialEq, PartialOrd)]
pub struct Float64(pub f64);

/// 精确小数列（MySQL `DECIMAL(65, 30)`，PostgreSQL `numeric(65, 30)`，SQLite 以文本保存）。
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Rat(pub Decimal);

impl Rat {
    /// `num / denom`，对应分数构造；`denom == 0` 时返回 `None`。
    pub fn new(num: i64, denom: i64) -> Option<Self> {
        Decimal::from(num)
            .checked_div(Decimal::from(denom))
            .map(Self)
    }
}

/// 字段的语义种类。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeKind {
    Bool,
    /// 8 位整数：不可自增。
    TinyInt,
    SmallInt,
    Int,
    BigInt,
    Text,
    Bytes,
    Timestamp,
    Decimal,
    Float,
    /// 原生浮点：建表时拒绝。
    NativeFloat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnType {
    pub kind: TypeKind,
    pub nullable: bool,
}

impl ColumnType {
    pub const fn new(kind: TypeKind) -> Self {
        Self {
            kind,
            nullable: false,
        }
    }

    pub const fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }

    /// 能否作为自增主键：16/32/64 位的非空整数。
    pub const fn auto_incrementable(&self) -> bool {
        !self.nullable && matches!(self.kind, TypeKind::SmallInt | TypeKind::Int | TypeKind::BigInt)
    }
}

/// 由字段类型报告其列类型。
pub trait SqlType {
    fn column_type() -> ColumnType;
}

macro_rules! sql_type {
    ($kind:ident => $($t:ty),+ $(,)?) => {
        $(impl SqlType for $t {
            fn column_type() -> ColumnType {
                ColumnType::new(TypeKind::$kind)
            }
        })+
    };
}

sql_type!(Bool => bool);
sql_type!(TinyInt => i8, u8);
sql_type!(SmallInt => i16, u16);
sql_type!(Int => i32, u32);
sql_type!(BigInt => i64, u64, isize, usize);
sql_type!(Text => String);
sql_type!(Timestamp => OffsetDateTime);
sql_type!(Decimal => Rat, Decimal);
sql_type!(Float => Float32, Float64);
sql_type!(NativeFloat => f32, f64);

impl SqlType for Vec<u8> {
    fn column_type() -> ColumnType {
        ColumnType::new(TypeKind::Bytes).nullable()
    }
}

impl<T: SqlType> SqlType for Option<T> {
    fn column_type() -> ColumnType {
        T::column_type().nullable()
    }
}
