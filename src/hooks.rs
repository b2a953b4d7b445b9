//! 生命周期 hook：Before/After × Insert/Update/Delete。
//!
//! 实体通过 [`Table`](crate::structs::Table) 的 `as_*` 方法声明自己具备哪些 hook（`sql_table!` 的
//! `hooks(...)`），未声明即视为没有。before hook 出错时语句不会执行；after hook 出错时语句已经生效，
//! 错误以 [`Error::AfterHook`](crate::Error::AfterHook) 返回。

use time::OffsetDateTime;

use crate::clock::Clock;
use crate::error::BoxError;

/// 传给 hook 的上下文。
#[derive(Debug, Clone, Copy)]
pub struct HookContext<'a> {
    clock: &'a dyn Clock,
}

impl<'a> HookContext<'a> {
    pub fn new(clock: &'a dyn Clock) -> Self {
        Self { clock }
    }

    /// 当前时间（来自注入的时钟）。
    pub fn now(&self) -> OffsetDateTime {
        self.clock.now()
    }
}

pub trait BeforeInsert {
    fn before_insert(&mut self, ctx: &HookContext<'_>) -> Result<(), BoxError>;
}

pub trait AfterInsert {
    fn after_insert(&mut self, ctx: &HookContext<'_>) -> Result<(), BoxError>;
}

pub trait BeforeUpdate {
    fn before_update(&mut self, ctx: &HookContext<'_>) -> Result<(), BoxError>;
}

pub trait AfterUpdate {
    fn after_update(&mut self, ctx: &HookContext<'_>) -> Result<(), BoxError>;
}

pub trait BeforeDelete {
    fn before_delete(&mut self, ctx: &HookContext<'_>) -> Result<(), BoxError>;
}

pub trait AfterDelete {
    fn after_delete(&mut self, ctx: &HookContext<'_>) -> Result<(), BoxError>;
}

/// 可嵌入的创建 / 更新时间戳：插入时写入两者，更新时写入 `updated_at`。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeStamp {
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

impl Default for TimeStamp {
    fn default() -> Self {
        Self {
            created_at: OffsetDateTime::UNIX_EPOCH,
            updated_at: OffsetDateTime::UNIX_EPOCH,
        }
    }
}

crate::sql_struct! {
    impl TimeStamp {
        created_at: OffsetDateTime,
        updated_at: OffsetDateTime,
    }
}

impl BeforeInsert for TimeStamp {
    fn before_insert(&mut self, ctx: &HookContext<'_>) -> Result<(), BoxError> {
        let now = ctx.now();
        self.created_at = now;
        self.updated_at = now;
        Ok(())
    }
}

impl BeforeUpdate for TimeStamp {
    fn before_update(&mut self, ctx: &HookContext<'_>) -> Result<(), BoxError> {
        self.updated_at = ctx.now();
        Ok(())
    }
}
