//! 查询日志：每条语句执行后以 `(开始时间, 耗时, SQL, 参数)` 调用 [`QueryLogger`]。
//!
//! - [`NullLogger`]：默认，不输出
//! - [`TemplateLogger`]：按模板写到任意 `Write`
//! - [`TracingLogger`]：发出 `tracing` 事件
//!
//! 模板支持 `{time}`、`{time "<time 格式描述>"}`、`{duration}`（`%.2fms`）与 `{query}`，
//! `{{`/`}}` 输出字面量花括号。`{query}` 在有参数时追加 `; [a, b]`，否则追加 `;`。

use std::io::Write;
use std::sync::Mutex;

use time::format_description::OwnedFormatItem;
use time::{Duration, OffsetDateTime};

use crate::value::SqlValue;

pub const DEFAULT_TIME_FORMAT: &str = "[year]-[month]-[day] [hour]:[minute]:[second]";
pub const DEFAULT_FORMAT: &str =
    "[{time \"[year]-[month]-[day] [hour]:[minute]:[second]\"}] [{duration}] {query}";

#[derive(Debug, thiserror::Error)]
pub enum LogError {
    #[error("invalid log format at byte {pos}: {reason}")]
    Template { pos: usize, reason: &'static str },
    #[error("invalid time format in log template: {0}")]
    TimeFormat(#[from] time::error::InvalidFormatDescription),
    #[error("failed to format log time: {0}")]
    Format(#[from] time::error::Format),
    #[error("failed to write log: {0}")]
    Io(#[from] std::io::Error),
}

pub trait QueryLogger: Send + Sync {
    fn print(
        &self,
        start: OffsetDateTime,
        elapsed: Duration,
        query: &str,
        args: &[SqlValue],
    ) -> Result<(), LogError>;

    fn set_format(&self, format: &str) -> Result<(), LogError>;
}

/// `query; [arg, ...]` 或 `query;`。
pub fn format_query(query: &str, args: &[SqlValue]) -> String {
    if args.is_empty() {
        return format!("{query};");
    }
    let values: Vec<String> = args.iter().map(ToString::to_string).collect();
    format!("{query}; [{}]", values.join(", "))
}

/// 不输出任何内容。
#[derive(Debug, Clone, Copy, Default)]
pub struct NullLogger;

impl QueryLogger for NullLogger {
    fn print(&self, _: OffsetDateTime, _: Duration, _: &str, _: &[SqlValue]) -> Result<(), LogError> {
        Ok(())
    }

    fn set_format(&self, _format: &str) -> Result<(), LogError> {
        Ok(())
    }
}

/// 以 `tracing::debug!` 事件输出；格式由 subscriber 决定。
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingLogger;

impl QueryLogger for TracingLogger {
    fn print(
        &self,
        _start: OffsetDateTime,
        elapsed: Duration,
        query: &str,
        args: &[SqlValue],
    ) -> Result<(), LogError> {
        tracing::debug!(
            target: "halo_orm::query",
            query,
            args = ?args,
            elapsed_ms = elapsed.as_seconds_f64() * 1000.0,
            "query executed"
        );
        Ok(())
    }

    fn set_format(&self, _format: &str) -> Result<(), LogError> {
        Ok(())
    }
}

#[derive(Debug)]
enum Segment {
    Literal(String),
    Time(OwnedFormatItem),
    Duration,
    Query,
}

#[derive(Debug)]
struct Template(Vec<Segment>);

impl Template {
    fn parse(format: &str) -> Result<Self, LogError> {
        let mut segments = Vec::new();
        let mut literal = String::new();
        let mut rest = format;
        let mut pos = 0;
        while let Some(c) = rest.chars().next() {
            if rest.starts_with("{{") || rest.starts_with("}}") {
                literal.push(c);
                rest = &rest[2..];
                pos += 2;
                continue;
            }
            match c {
                '{' => {
                    let Some(end) = rest.find('}') else {
                        return Err(LogError::Template {
                            pos,
                            reason: "unclosed `{`",
                        });
                    };
                    if !literal.is_empty() {
                        segments.push(Segment::Literal(std::mem::take(&mut literal)));
                    }
                    segments.push(Self::placeholder(rest[1..end].trim(), pos)?);
                    rest = &rest[end + 1..];
                    pos += end + 1;
                }
                '}' => {
                    return Err(LogError::Template {
                        pos,
                        reason: "unmatched `}`",
                    });
                }
                _ => {
                    literal.push(c);
                    rest = &rest[c.len_utf8()..];
                    pos += c.len_utf8();
                }
            }
        }
        if !literal.is_empty() {
            segments.push(Segment::Literal(literal));
        }
        Ok(Self(segments))
    }

    fn placeholder(body: &str, pos: usize) -> Result<Segment, LogError> {
        match body {
            "query" => Ok(Segment::Query),
            "duration" => Ok(Segment::Duration),
            "time" => Ok(Segment::Time(time::format_description::parse_owned::<2>(
                DEFAULT_TIME_FORMAT,
            )?)),
            _ => {
                let Some(arg) = body.strip_prefix("time") else {
                    return Err(LogError::Template {
                        pos,
                        reason: "unknown placeholder",
                    });
                };
                let arg = arg.trim();
                let Some(fmt) = arg.strip_prefix('"').and_then(|a| a.strip_suffix('"')) else {
                    return Err(LogError::Template {
                        pos,
                        reason: "time format must be double-quoted",
                    });
                };
                Ok(Segment::Time(time::format_description::parse_owned::<2>(fmt)?))
            }
        }
    }

    fn render(
        &self,
        start: OffsetDateTime,
        elapsed: Duration,
        query: &str,
        args: &[SqlValue],
    ) -> Result<String, LogError> {
        let mut out = String::new();
        for seg in &self.0 {
            match seg {
                Segment::Literal(s) => out.push_str(s),
                Segment::Time(item) => out.push_str(&start.format(item)?),
                Segment::Duration => {
                    out.push_str(&format!("{:.2}ms", elapsed.as_seconds_f64() * 1000.0))
                }
                Segment::Query => out.push_str(&format_query(query, args)),
            }
        }
        Ok(out)
    }
}

/// 按模板把日志写入 `W`，每条一行。
#[derive(Debug)]
pub struct TemplateLogger<W> {
    inner: Mutex<TemplateState<W>>,
}

#[derive(Debug)]
struct TemplateState<W> {
    out: W,
    template: Template,
}

impl<W: Write + Send> TemplateLogger<W> {
    /// 使用 [`DEFAULT_FORMAT`]。
    pub fn new(out: W) -> Self {
        let template =
            Template::parse(DEFAULT_FORMAT).unwrap_or_else(|_| Template(vec![Segment::Query]));
        Self {
            inner: Mutex::new(TemplateState { out, template }),
        }
    }

    pub fn with_format(out: W, format: &str) -> Result<Self, LogError> {
        Ok(Self {
            inner: Mutex::new(TemplateState {
                out,
                template: Template::parse(format)?,
            }),
        })
    }

    /// 取回底层 writer。
    pub fn into_inner(self) -> W {
        self.inner.into_inner().unwrap_or_else(|e| e.into_inner()).out
    }
}

impl<W: Write + Send> QueryLogger for TemplateLogger<W> {
    fn print(
        &self,
        start: OffsetDateTime,
        elapsed: Duration,
        query: &str,
        args: &[SqlValue],
    ) -> Result<(), LogError> {
        let mut g = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        let line = g.template.render(start, elapsed, query, args)?;
        writeln!(g.out, "{}", line.trim_end_matches('\n'))?;
        Ok(())
    }

    fn set_format(&self, format: &str) -> Result<(), LogError> {
        let template = Template::parse(format)?;
        self.inner.lock().unwrap_or_else(|e| e.into_inner()).template = template;
        Ok(())
    }
}
