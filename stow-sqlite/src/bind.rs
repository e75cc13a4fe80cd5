use crate::error_message_from_ptr;
use libsqlite3_sys::*;
use std::ffi::{c_char, c_int, c_void};
use stow_core::{AsValue, ErrorKind, Result, Value};

fn bind_text(statement: *mut sqlite3_stmt, index: c_int, text: &str) -> c_int {
    unsafe {
        sqlite3_bind_text(
            statement,
            index,
            text.as_ptr() as *const c_char,
            text.len() as c_int,
            SQLITE_TRANSIENT(),
        )
    }
}

/// Bind `value` to the 1-based parameter `index`.
///
/// Integers and booleans go in as int64, floats as double, everything else
/// as its textual form (decimal affinity recovers the number).
pub(crate) fn bind_value(statement: *mut sqlite3_stmt, index: c_int, value: &Value) -> Result<()> {
    if value.is_null() {
        return check(statement, index, unsafe { sqlite3_bind_null(statement, index) });
    }
    let rc = match value {
        Value::Float32(Some(v)) => unsafe { sqlite3_bind_double(statement, index, *v as f64) },
        Value::Float64(Some(v)) => unsafe { sqlite3_bind_double(statement, index, *v) },
        Value::Varchar(Some(v)) => bind_text(statement, index, v),
        Value::Blob(Some(v)) => unsafe {
            sqlite3_bind_blob(
                statement,
                index,
                v.as_ptr() as *const c_void,
                v.len() as c_int,
                SQLITE_TRANSIENT(),
            )
        },
        Value::Decimal(..)
        | Value::Date(..)
        | Value::Time(..)
        | Value::Timestamp(..)
        | Value::TimestampWithTimezone(..)
        | Value::Uuid(..) => bind_text(statement, index, &String::try_from_value(value.clone())?),
        _ => {
            let Some(v) = value.as_i128() else {
                return Err(ErrorKind::Unsupported
                    .error(format!("Cannot bind a {} parameter", value.scalar_type())));
            };
            let Ok(v) = i64::try_from(v) else {
                return Err(ErrorKind::Configuration.error(format!(
                    "Value {} does not fit a sqlite integer",
                    v
                )));
            };
            unsafe { sqlite3_bind_int64(statement, index, v) }
        }
    };
    check(statement, index, rc)
}

fn check(statement: *mut sqlite3_stmt, index: c_int, rc: c_int) -> Result<()> {
    if rc == SQLITE_OK {
        return Ok(());
    }
    let message =
        unsafe { error_message_from_ptr(&sqlite3_errmsg(sqlite3_db_handle(statement))).to_string() };
    Err(ErrorKind::Backend
        .error(message)
        .context(format!("Cannot bind parameter {}", index)))
}
