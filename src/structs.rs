//! Struct：字段元数据树与基于它的列解析（主键、可插入字段、列名到 index-path）。
//!
//! Rust 无运行时反射；这里通过 `macro_rules!`（[`sql_struct!`](crate::sql_struct) /
//! [`sql_table!`](crate::sql_table)）为 struct 生成字段元数据，以及按 index-path 取值、写值的代码。
//! 嵌入字段（`[embed]`）在元数据里是一个子树，所有查找都是对这棵树的深度优先遍历。

use crate::error::{Error, Result};
use crate::field_mapper::to_snake_case;
use crate::hooks::{AfterDelete, AfterInsert, AfterUpdate, BeforeDelete, BeforeInsert, BeforeUpdate};
use crate::scan::ScanError;
use crate::types::ColumnType;
use crate::value::SqlValue;

/// 字段节点的种类。
#[derive(Debug, Clone, Copy)]
pub enum FieldKind {
    /// 映射到一列。
    Scalar(fn() -> ColumnType),
    /// 嵌入的 struct：其字段被展开到外层。
    Embedded(fn() -> &'static [FieldMeta]),
    /// `[skip]`：不参与任何数据库操作。
    Skipped,
}

#[derive(Debug, Clone, Copy)]
pub struct FieldMeta {
    /// Rust 字段名（用于生成取值代码）
    pub rust: &'static str,
    /// 推导列名用的“原始字段名”；默认等于 `rust`，可以用 `orig("UserID")` 显式指定。
    pub orig: &'static str,
    /// 显式列名；为空时取 `orig` 的 snake_case。
    pub column: Option<&'static str>,
    pub pk: bool,
    pub unique: bool,
    /// 声明的长度（0 表示使用方言默认值）
    pub size: u64,
    /// DDL 默认值字面量
    pub default: Option<&'static str>,
    pub kind: FieldKind,
}

impl FieldMeta {
    const fn base(rust: &'static str, kind: FieldKind) -> Self {
        Self {
            rust,
            orig: rust,
            column: None,
            pk: false,
            unique: false,
            size: 0,
            default: None,
            kind,
        }
    }

    pub const fn scalar(rust: &'static str, ty: fn() -> ColumnType) -> Self {
        Self::base(rust, FieldKind::Scalar(ty))
    }

    pub const fn embedded(rust: &'static str, fields: fn() -> &'static [FieldMeta]) -> Self {
        Self::base(rust, FieldKind::Embedded(fields))
    }

    pub const fn skipped(rust: &'static str) -> Self {
        Self::base(rust, FieldKind::Skipped)
    }

    pub const fn pk(mut self) -> Self {
        self.pk = true;
        self
    }

    pub const fn unique(mut self) -> Self {
        self.unique = true;
        self
    }

    pub const fn size(mut self, size: u64) -> Self {
        self.size = size;
        self
    }

    pub const fn column(mut self, name: &'static str) -> Self {
        self.column = Some(name);
        self
    }

    pub const fn default(mut self, literal: &'static str) -> Self {
        self.default = Some(literal);
        self
    }

    pub const fn orig(mut self, name: &'static str) -> Self {
        self.orig = name;
        self
    }

    /// 列名：显式列名优先，否则为字段名的 snake_case。
    pub fn column_name(&self) -> String {
        match self.column {
            Some(c) => c.to_string(),
            None => to_snake_case(self.orig),
        }
    }

    pub fn column_type(&self) -> Option<ColumnType> {
        match self.kind {
            FieldKind::Scalar(ty) => Some(ty()),
            _ => None,
        }
    }

    /// 主键且类型可自增（16/32/64 位非空整数）。
    pub fn is_auto_increment(&self) -> bool {
        self.pk && self.column_type().is_some_and(|ct| ct.auto_incrementable())
    }
}

/// 供 [`FieldKind::Embedded`] 引用嵌入类型的元数据。
pub fn fields_of<T: SqlStruct>() -> &'static [FieldMeta] {
    T::FIELDS
}

/// 由宏为业务 struct 实现的 trait：提供字段元数据与按 index-path 的取值/写值。
pub trait SqlStruct: Default {
    /// 类型名（用于错误信息）
    const TYPE_NAME: &'static str;
    const FIELDS: &'static [FieldMeta];

    fn value_at(&self, path: &[usize]) -> Result<SqlValue, ScanError>;

    fn set_at(&mut self, path: &[usize], value: SqlValue) -> Result<(), ScanError>;
}

/// 映射到一张表的 struct。hook 是可选能力：默认没有。
pub trait Table: SqlStruct + 'static {
    /// 表名：`as "name"` 显式指定，否则为类型名的 snake_case。
    fn table_name() -> String;

    fn as_before_insert(&mut self) -> Option<&mut dyn BeforeInsert> {
        None
    }

    fn as_after_insert(&mut self) -> Option<&mut dyn AfterInsert> {
        None
    }

    fn as_before_update(&mut self) -> Option<&mut dyn BeforeUpdate> {
        None
    }

    fn as_after_update(&mut self) -> Option<&mut dyn AfterUpdate> {
        None
    }

    fn as_before_delete(&mut self) -> Option<&mut dyn BeforeDelete> {
        None
    }

    fn as_after_delete(&mut self) -> Option<&mut dyn AfterDelete> {
        None
    }
}

/// 按 index-path 找到字段元数据。
pub fn field_at(fields: &'static [FieldMeta], path: &[usize]) -> Option<&'static FieldMeta> {
    let (last, parents) = path.split_last()?;
    let mut fields = fields;
    for &i in parents {
        match fields.get(i)?.kind {
            FieldKind::Embedded(sub) => fields = sub(),
            _ => return None,
        }
    }
    fields.get(*last)
}

fn walk(
    fields: &'static [FieldMeta],
    prefix: &mut Vec<usize>,
    visit: &mut dyn FnMut(&'static FieldMeta, &[usize]),
) {
    for (i, meta) in fields.iter().enumerate() {
        prefix.push(i);
        match meta.kind {
            FieldKind::Scalar(_) => visit(meta, prefix),
            FieldKind::Embedded(sub) => walk(sub(), prefix, visit),
            FieldKind::Skipped => {}
        }
        prefix.pop();
    }
}

/// 深度优先遍历所有列字段（跳过 `[skip]`，展开嵌入字段），按字段顺序返回 index-path。
pub fn columns(fields: &'static [FieldMeta]) -> Vec<(Vec<usize>, &'static FieldMeta)> {
    let mut out = Vec::new();
    walk(fields, &mut Vec::new(), &mut |meta, path| {
        out.push((path.to_vec(), meta))
    });
    out
}

/// 可插入 / 可更新的字段：排除 `[skip]` 与自增主键。
pub fn insertable_fields(fields: &'static [FieldMeta]) -> Vec<Vec<usize>> {
    columns(fields)
        .into_iter()
        .filter(|(_, meta)| !meta.is_auto_increment())
        .map(|(path, _)| path)
        .collect()
}

/// 第一个 `pk` 字段（含嵌入字段）。
pub fn primary_key_index(fields: &'static [FieldMeta]) -> Option<Vec<usize>> {
    columns(fields)
        .into_iter()
        .find(|(_, meta)| meta.pk)
        .map(|(path, _)| path)
}

/// 列名到 index-path。同名列被多个字段映射时返回 [`Error::AmbiguousColumn`]。
pub fn field_index_by_name<T: SqlStruct>(name: &str) -> Result<Option<Vec<usize>>> {
    let mut found = columns(T::FIELDS)
        .into_iter()
        .filter(|(_, meta)| meta.column_name() == name)
        .map(|(path, _)| path);
    let first = found.next();
    if first.is_some() && found.next().is_some() {
        return Err(Error::AmbiguousColumn {
            column: name.to_string(),
            table: T::TYPE_NAME,
        });
    }
    Ok(first)
}

/// 宏生成代码共用：无效 index-path。
#[doc(hidden)]
pub fn unknown_field(path: &[usize]) -> ScanError {
    ScanError::UnknownField(path.to_vec())
}

/// 为 struct 生成 [`SqlStruct`] 实现。
///
/// ```ignore
/// sql_struct! {
///     impl TimeStamp {
///         created_at: OffsetDateTime,
///         updated_at: OffsetDateTime,
///     }
/// }
/// ```
///
/// 字段选项写在类型后的方括号里：`pk`、`unique`、`size(n)`、`column("name")`、
/// `default("literal")`、`orig("FieldName")`；`[embed]` 表示嵌入 struct，`[skip]` 表示忽略。
#[macro_export]
macro_rules! sql_struct {
    (
        impl $ty:ident {
            $(
                $field:ident : $fty:ty $([ $($opt:tt)* ])?
            ),* $(,)?
        }
    ) => {
        impl $crate::structs::SqlStruct for $ty {
            const TYPE_NAME: &'static str = stringify!($ty);
            const FIELDS: &'static [$crate::structs::FieldMeta] = &[
                $(
                    $crate::__sql_field_meta!($field, $fty, [$($($opt)*)?])
                ),*
            ];

            fn value_at(
                &self,
                path: &[usize],
            ) -> ::std::result::Result<$crate::value::SqlValue, $crate::scan::ScanError> {
                let Some((&first, rest)) = path.split_first() else {
                    return Err($crate::structs::unknown_field(path));
                };
                let Some(meta) = Self::FIELDS.get(first) else {
                    return Err($crate::structs::unknown_field(path));
                };
                match meta.rust {
                    $(
                        stringify!($field) => {
                            $crate::__sql_field_get!(&self.$field, path, rest, [$($($opt)*)?])
                        }
                    )*
                    _ => Err($crate::structs::unknown_field(path)),
                }
            }

            fn set_at(
                &mut self,
                path: &[usize],
                value: $crate::value::SqlValue,
            ) -> ::std::result::Result<(), $crate::scan::ScanError> {
                let Some((&first, rest)) = path.split_first() else {
                    return Err($crate::structs::unknown_field(path));
                };
                let Some(meta) = Self::FIELDS.get(first) else {
                    return Err($crate::structs::unknown_field(path));
                };
                match meta.rust {
                    $(
                        stringify!($field) => {
                            $crate::__sql_field_set!(&mut self.$field, path, rest, value, [$($($opt)*)?])
                        }
                    )*
                    _ => Err($crate::structs::unknown_field(path)),
                }
            }
        }
    };
}

/// 为 struct 生成 [`SqlStruct`] 与 [`Table`] 实现。
///
/// ```ignore
/// sql_table! {
///     impl User as "users" hooks(before_insert = stamp, after_insert) {
///         id: i64 [pk],
///         name: String [size(64), unique],
///         stamp: TimeStamp [embed],
///         cache: Vec<String> [skip],
///     }
/// }
/// ```
///
/// `hooks(...)` 声明实现了哪些 hook；`before_insert = stamp` 表示委托给嵌入字段 `stamp`。
#[macro_export]
macro_rules! sql_table {
    (
        impl $ty:ident $(as $name:literal)? $(hooks ( $($hook:ident $(= $target:ident)?),* $(,)? ))? {
            $($body:tt)*
        }
    ) => {
        $crate::sql_struct! {
            impl $ty {
                $($body)*
            }
        }

        impl $crate::structs::Table for $ty {
            fn table_name() -> ::std::string::String {
                $crate::__sql_table_name!($ty $(, $name)?)
            }

            $($(
                $crate::__sql_table_hook!($hook $(, $target)?);
            )*)?
        }
    };
}

#[doc(hidden)]
#[macro_export]
macro_rules! __sql_field_meta {
    ($field:ident, $fty:ty, [embed]) => {
        $crate::structs::FieldMeta::embedded(stringify!($field), $crate::structs::fields_of::<$fty>)
    };
    ($field:ident, $fty:ty, [skip]) => {
        $crate::structs::FieldMeta::skipped(stringify!($field))
    };
    ($field:ident, $fty:ty, [$($opt:ident $(($arg:expr))?),* $(,)?]) => {
        $crate::structs::FieldMeta::scalar(
            stringify!($field),
            <$fty as $crate::types::SqlType>::column_type,
        )
        $(.$opt($($arg)?))*
    };
}

#[doc(hidden)]
#[macro_export]
macro_rules! __sql_field_get {
    ($value:expr, $path:ident, $rest:ident, [embed]) => {
        $crate::structs::SqlStruct::value_at($value, $rest)
    };
    ($value:expr, $path:ident, $rest:ident, [skip]) => {
        Err($crate::structs::unknown_field($path))
    };
    ($value:expr, $path:ident, $rest:ident, [$($opt:tt)*]) => {
        if $rest.is_empty() {
            Ok($crate::value::SqlValue::from(::std::clone::Clone::clone($value)))
        } else {
            Err($crate::structs::unknown_field($path))
        }
    };
}

#[doc(hidden)]
#[macro_export]
macro_rules! __sql_field_set {
    ($target:expr, $path:ident, $rest:ident, $value:ident, [embed]) => {
        $crate::structs::SqlStruct::set_at($target, $rest, $value)
    };
    ($target:expr, $path:ident, $rest:ident, $value:ident, [skip]) => {{
        let _ = $value;
        Err($crate::structs::unknown_field($path))
    }};
    ($target:expr, $path:ident, $rest:ident, $value:ident, [$($opt:tt)*]) => {
        if $rest.is_empty() {
            *$target = $crate::scan::FromSqlValue::from_sql_value($value)?;
            Ok(())
        } else {
            Err($crate::structs::unknown_field($path))
        }
    };
}

#[doc(hidden)]
#[macro_export]
macro_rules! __sql_table_name {
    ($ty:ident) => {
        $crate::field_mapper::to_snake_case(stringify!($ty))
    };
    ($ty:ident, $name:literal) => {
        ::std::string::String::from($name)
    };
}

#[doc(hidden)]
#[macro_export]
macro_rules! __sql_table_hook {
    (before_insert $(, $target:ident)?) => {
        fn as_before_insert(&mut self) -> Option<&mut dyn $crate::hooks::BeforeInsert> {
            Some(&mut (*self) $(.$target)?)
        }
    };
    (after_insert $(, $target:ident)?) => {
        fn as_after_insert(&mut self) -> Option<&mut dyn $crate::hooks::AfterInsert> {
            Some(&mut (*self) $(.$target)?)
        }
    };
    (before_update $(, $target:ident)?) => {
        fn as_before_update(&mut self) -> Option<&mut dyn $crate::hooks::BeforeUpdate> {
            Some(&mut (*self) $(.$target)?)
        }
    };
    (after_update $(, $target:ident)?) => {
        fn as_after_update(&mut self) -> Option<&mut dyn $crate::hooks::AfterUpdate> {
            Some(&mut (*self) $(.$target)?)
        }
    };
    (before_delete $(, $target:ident)?) => {
        fn as_before_delete(&mut self) -> Option<&mut dyn $crate::hooks::BeforeDelete> {
            Some(&mut (*self) $(.$target)?)
        }
    };
    (after_delete $(, $target:ident)?) => {
        fn as_after_delete(&mut self) -> Option<&mut dyn $crate::hooks::AfterDelete> {
            Some(&mut (*self) $(.$target)?)
        }
    };
}
