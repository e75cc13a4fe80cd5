use crate::{ErrorKind, Result};
use std::{ffi::CString, fmt::Write};
use time::{Date, OffsetDateTime, PrimitiveDateTime, Time};

pub fn separated_by<T, F>(
    out: &mut String,
    values: impl IntoIterator<Item = T>,
    mut f: F,
    separator: &str,
) where
    F: FnMut(&mut String, T),
{
    let mut len = out.len();
    for v in values {
        if out.len() > len {
            out.push_str(separator);
        }
        len = out.len();
        f(out, v);
    }
}

pub fn as_c_string<S: Into<Vec<u8>>>(str: S) -> Result<CString> {
    CString::new(str.into())
        .map_err(|e| ErrorKind::Usage.wrap(e).context("Expected a string without NUL bytes"))
}

/// Take the value of `key` from the url parameters, falling back to the `env` variable.
pub fn take_param(params: &mut Vec<(String, String)>, key: &str, env: &str) -> Option<String> {
    if let Some(i) = params.iter().position(|(k, _)| k == key) {
        return Some(params.remove(i).1);
    }
    std::env::var(env).ok()
}

pub fn write_date(out: &mut String, value: &Date) {
    let _ = write!(
        out,
        "{:04}-{:02}-{:02}",
        value.year(),
        value.month() as u8,
        value.day()
    );
}

pub fn write_time(out: &mut String, value: &Time) {
    let _ = write!(
        out,
        "{:02}:{:02}:{:02}",
        value.hour(),
        value.minute(),
        value.second()
    );
    let nanos = value.nanosecond();
    if nanos != 0 {
        let fraction = format!("{:09}", nanos);
        let _ = write!(out, ".{}", fraction.trim_end_matches('0'));
    }
}

pub fn write_timestamp(out: &mut String, value: &PrimitiveDateTime) {
    write_date(out, &value.date());
    out.push('T');
    write_time(out, &value.time());
}

pub fn write_timestamptz(out: &mut String, value: &OffsetDateTime) {
    write_timestamp(out, &PrimitiveDateTime::new(value.date(), value.time()));
    let (h, m, _) = value.offset().as_hms();
    let _ = write!(
        out,
        "{}{:02}:{:02}",
        if value.offset().is_negative() { '-' } else { '+' },
        h.unsigned_abs(),
        m.unsigned_abs()
    );
}

#[macro_export]
macro_rules! possibly_parenthesized {
    ($buff:ident, $cond:expr, $v:expr) => {
        if $cond {
            $buff.push('(');
            $v;
            $buff.push(')');
        } else {
            $v;
        }
    };
}

/// Longest prefix of `value` within `max` bytes that ends on a char boundary.
pub fn truncate_at(value: &str, max: usize) -> &str {
    if value.len() <= max {
        return value;
    }
    let mut end = max;
    while !value.is_char_boundary(end) {
        end -= 1;
    }
    &value[..end]
}

#[macro_export]
macro_rules! truncate_long {
    ($query:expr) => {
        format_args!(
            "{}{}",
            $crate::truncate_at(&$query, 497).trim_end(),
            if $query.len() > 497 { "..." } else { "" },
        )
    };
}
