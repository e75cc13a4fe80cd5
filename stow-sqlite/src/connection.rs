use crate::{
    CBox,
    bind::bind_value,
    error_message_from_ptr,
    extract::{extract_name, extract_value},
};
use libsqlite3_sys::*;
use std::{
    collections::HashMap,
    ffi::{CStr, c_char, c_int},
    ptr,
};
use stow_core::{
    ErrorKind, FieldDescriptor, NativeConnection, Result, RowWriter, StatementHandle,
    StatementKind, Value, as_c_string, truncate_long,
};

struct SqliteStatement {
    kind: StatementKind,
    text: String,
    statement: Option<CBox<sqlite3_stmt>>,
    /// Column labels, resolved on the first fetched row.
    labels: Option<Vec<String>>,
    done: bool,
}

/// Single sqlite database handle with the statements opened on it.
pub struct SqliteConnection {
    connection: CBox<sqlite3>,
    statements: HashMap<u64, SqliteStatement>,
    next_handle: u64,
}

impl SqliteConnection {
    pub(crate) fn new(connection: CBox<sqlite3>) -> Self {
        Self {
            connection,
            statements: HashMap::new(),
            next_handle: 1,
        }
    }

    fn last_error(&self) -> String {
        unsafe { error_message_from_ptr(&sqlite3_errmsg(*self.connection)).to_string() }
    }

    fn entry(&mut self, handle: StatementHandle) -> Result<&mut SqliteStatement> {
        self.statements.get_mut(&handle.0).ok_or_else(|| {
            ErrorKind::Usage.error(format!("Unknown sqlite statement handle {}", handle.0))
        })
    }

    fn compiled(&mut self, handle: StatementHandle) -> Result<*mut sqlite3_stmt> {
        let entry = self.entry(handle)?;
        match &entry.statement {
            Some(v) => Ok(**v),
            None => Err(ErrorKind::Usage.error(format!(
                "The statement is not prepared:\n{}",
                truncate_long!(entry.text)
            ))),
        }
    }

    /// Step until `SQLITE_DONE`, ignoring produced rows.
    ///
    /// `SQLITE_BUSY` and `SQLITE_LOCKED` are errors, the busy timeout already waited.
    fn run_to_completion(&self, statement: *mut sqlite3_stmt) -> Result<()> {
        loop {
            match unsafe { sqlite3_step(statement) } {
                SQLITE_ROW => continue,
                SQLITE_DONE => return Ok(()),
                _ => {
                    let error = ErrorKind::Backend.error(self.last_error());
                    unsafe { sqlite3_reset(statement) };
                    return Err(error);
                }
            }
        }
    }
}

impl NativeConnection for SqliteConnection {
    fn create_statement(&mut self, kind: StatementKind, text: &str) -> Result<StatementHandle> {
        let handle = self.next_handle;
        self.next_handle += 1;
        self.statements.insert(
            handle,
            SqliteStatement {
                kind,
                text: text.to_string(),
                statement: None,
                labels: None,
                done: false,
            },
        );
        Ok(StatementHandle(handle))
    }

    fn prepare(&mut self, handle: StatementHandle, param_count: usize) -> Result<()> {
        let db = *self.connection;
        let text = as_c_string(self.entry(handle)?.text.as_bytes())?;
        let mut statement = CBox::new(ptr::null_mut(), |p| unsafe {
            sqlite3_finalize(p);
        });
        let mut tail: *const c_char = ptr::null();
        let rc = unsafe { sqlite3_prepare_v2(db, text.as_ptr(), -1, &mut *statement, &mut tail) };
        if rc != SQLITE_OK {
            return Err(ErrorKind::Backend.error(self.last_error()));
        }
        if statement.is_null() {
            return Err(ErrorKind::Usage.error("The statement text is empty"));
        }
        if !tail.is_null() && !unsafe { CStr::from_ptr(tail) }.to_bytes().trim_ascii().is_empty() {
            return Err(ErrorKind::Usage.error("Cannot prepare more than one statement at a time"));
        }
        let expected = unsafe { sqlite3_bind_parameter_count(*statement) } as usize;
        if expected != param_count {
            return Err(ErrorKind::Usage.error(format!(
                "The statement expects {} parameters but {} literals were collected",
                expected, param_count
            )));
        }
        let entry = self.entry(handle)?;
        entry.statement = Some(statement);
        entry.labels = None;
        entry.done = false;
        Ok(())
    }

    fn bind_values(&mut self, handle: StatementHandle, values: &[Value]) -> Result<()> {
        let statement = self.compiled(handle)?;
        unsafe {
            sqlite3_reset(statement);
            sqlite3_clear_bindings(statement);
        }
        for (i, value) in values.iter().enumerate() {
            bind_value(statement, i as c_int + 1, value)?;
        }
        Ok(())
    }

    fn exec_statement(&mut self, handle: StatementHandle) -> Result<u64> {
        let statement = self.compiled(handle)?;
        unsafe { sqlite3_reset(statement) };
        let entry = self.entry(handle)?;
        entry.done = false;
        if entry.kind == StatementKind::Select {
            return Ok(0);
        }
        self.run_to_completion(statement)?;
        let changes = unsafe {
            sqlite3_reset(statement);
            sqlite3_changes(*self.connection)
        };
        Ok(changes.max(0) as u64)
    }

    fn fetch_next(
        &mut self,
        handle: StatementHandle,
        writer: &mut dyn RowWriter,
    ) -> Result<bool> {
        let statement = self.compiled(handle)?;
        if self.entry(handle)?.done {
            return Ok(false);
        }
        match unsafe { sqlite3_step(statement) } {
            SQLITE_ROW => {}
            SQLITE_DONE => {
                self.entry(handle)?.done = true;
                return Ok(false);
            }
            _ => {
                let error = ErrorKind::Backend.error(self.last_error());
                unsafe { sqlite3_reset(statement) };
                self.entry(handle)?.done = true;
                return Err(error);
            }
        }
        let entry = self.entry(handle)?;
        if entry.labels.is_none() {
            let count = unsafe { sqlite3_column_count(statement) };
            entry.labels = Some(
                (0..count)
                    .map(|i| extract_name(statement, i))
                    .collect::<Result<_>>()?,
            );
        }
        let labels = entry.labels.as_deref().unwrap_or_default();
        for (i, label) in labels.iter().enumerate() {
            let Some((index, ty)) = writer.target(label) else {
                log::warn!("Column `{}` does not match any field, skipping it", label);
                continue;
            };
            let value = extract_value(statement, i as c_int)?.convert_to(ty)?;
            writer.write(index, value)?;
        }
        Ok(true)
    }

    fn size(&mut self, handle: StatementHandle) -> Result<Option<u64>> {
        self.entry(handle)?;
        Ok(None)
    }

    fn last_insert_id(
        &mut self,
        handle: StatementHandle,
        _field: &FieldDescriptor,
    ) -> Result<Value> {
        self.entry(handle)?;
        Ok(Value::Int64(Some(unsafe {
            sqlite3_last_insert_rowid(*self.connection)
        })))
    }

    fn close_statement(&mut self, handle: StatementHandle) -> Result<()> {
        self.statements.remove(&handle.0);
        Ok(())
    }

    fn execute_batch(&mut self, sql: &str) -> Result<()> {
        let sql = as_c_string(sql)?;
        let mut message: *mut c_char = ptr::null_mut();
        let rc = unsafe {
            sqlite3_exec(
                *self.connection,
                sql.as_ptr(),
                None,
                ptr::null_mut(),
                &mut message,
            )
        };
        if rc != SQLITE_OK {
            let text = if message.is_null() {
                self.last_error()
            } else {
                let text = error_message_from_ptr(&(message as *const c_char)).to_string();
                unsafe { sqlite3_free(message as *mut _) };
                text
            };
            return Err(ErrorKind::Backend.error(text));
        }
        Ok(())
    }
}

impl Drop for SqliteConnection {
    fn drop(&mut self) {
        // Statements must be finalized before the database handle is closed.
        self.statements.clear();
    }
}
