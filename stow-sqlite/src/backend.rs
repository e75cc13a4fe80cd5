use crate::{CBox, SqliteConnection, error_message_from_ptr};
use libsqlite3_sys::*;
use std::{ffi::c_int, ptr};
use stow_core::{
    Backend, ConnectionDescriptor, ErrorKind, NativeConnection, Result, as_c_string,
    writer::Dialect,
};

/// Backend for `sqlite://` urls.
///
/// * `sqlite::memory:` opens a private in memory database per connection.
/// * `sqlite:///path/to/file.db` opens a file.
/// * `mode` parameter: `ro`, `rw` or `rwc` (default).
/// * `busy_timeout` parameter: milliseconds to wait on a locked database (default 5000).
#[derive(Default, Debug, Clone, Copy)]
pub struct SqliteBackend;

impl SqliteBackend {
    pub const fn new() -> Self {
        Self
    }
}

fn open_flags(mode: Option<&str>) -> Result<c_int> {
    let flags = match mode.unwrap_or("rwc") {
        "ro" => SQLITE_OPEN_READONLY,
        "rw" => SQLITE_OPEN_READWRITE,
        "rwc" => SQLITE_OPEN_READWRITE | SQLITE_OPEN_CREATE,
        other => {
            return Err(ErrorKind::Configuration
                .error(format!("Unknown sqlite mode `{}`, expected ro, rw or rwc", other)));
        }
    };
    Ok(flags | SQLITE_OPEN_NOMUTEX | SQLITE_OPEN_URI)
}

impl Backend for SqliteBackend {
    fn scheme(&self) -> &'static str {
        "sqlite"
    }

    fn dialect(&self) -> Dialect {
        Dialect::Sqlite
    }

    fn connect(&self, descriptor: &ConnectionDescriptor) -> Result<Box<dyn NativeConnection>> {
        let path = if descriptor.path.is_empty() {
            ":memory:"
        } else {
            descriptor.path.as_str()
        };
        let flags = open_flags(descriptor.param("mode"))?;
        let busy_timeout = match descriptor.param("busy_timeout") {
            Some(v) => v.parse::<c_int>().map_err(|e| {
                ErrorKind::Configuration
                    .wrap(e)
                    .context(format!("Invalid sqlite busy_timeout `{}`", v))
            })?,
            None => 5000,
        };
        let c_path = as_c_string(path)?;
        let mut connection = CBox::new(ptr::null_mut(), |p| unsafe {
            sqlite3_close(p);
        });
        unsafe {
            let rc = sqlite3_open_v2(c_path.as_ptr(), &mut *connection, flags, ptr::null());
            if rc != SQLITE_OK {
                let message = if connection.is_null() {
                    "Out of memory".to_string()
                } else {
                    error_message_from_ptr(&sqlite3_errmsg(*connection)).to_string()
                };
                let error = ErrorKind::Backend
                    .error(message)
                    .context(format!("Cannot open the sqlite database `{}`", path));
                log::error!("{:#}", error);
                return Err(error);
            }
            sqlite3_busy_timeout(*connection, busy_timeout);
        }
        log::debug!("Opened sqlite database `{}`", path);
        Ok(Box::new(SqliteConnection::new(connection)))
    }
}
