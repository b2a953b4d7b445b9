//! Field mapper：字段名 / 类型名与列名 / 表名之间的转换。
//!
//! 不识别缩写连写：`UserID` 映射为 `user_i_d`。

/// `UserName` -> `user_name`：首字符转小写，其后每个大写字母前插入 `_` 并转小写。
pub fn to_snake_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 8);
    let mut chars = s.chars();
    if let Some(first) = chars.next() {
        out.extend(first.to_lowercase());
    }
    for c in chars {
        if c.is_uppercase() {
            out.push('_');
            out.extend(c.to_lowercase());
        } else {
            out.push(c);
        }
    }
    out
}

/// `user_name` -> `UserName`：首字符与每个 `_` 之后的字符转大写，去掉 `_`。
pub fn to_camel_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut upper = true;
    for c in s.chars() {
        if c == '_' {
            upper = true;
            continue;
        }
        if upper {
            out.extend(c.to_uppercase());
            upper = false;
        } else {
            out.push(c);
        }
    }
    out
}
