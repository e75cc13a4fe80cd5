use crate::{
    Connector, ErrorKind, FieldDescriptor, NativeConnection, Result, RowWriter, StatementHandle,
    StatementKind, TransactionPolicy, Value, truncate_long,
    writer::{Dialect, SqlWriter},
};
use std::{
    collections::BTreeMap,
    sync::{Mutex, MutexGuard},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransactionState {
    /// Connection acquired, nothing issued yet.
    Created,
    Started,
    Committed,
    RolledBack,
    Closed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StatementState {
    Unprepared,
    Prepared,
    Bound,
    Executed,
}

struct StatementEntry {
    handle: StatementHandle,
    text: String,
    literals: Vec<Value>,
    state: StatementState,
}

struct TransactionInner {
    connection: Option<Box<dyn NativeConnection>>,
    state: TransactionState,
    statements: BTreeMap<u64, StatementEntry>,
    next_id: u64,
}

impl TransactionInner {
    fn connection(&mut self) -> Result<&mut Box<dyn NativeConnection>> {
        self.connection
            .as_mut()
            .ok_or_else(|| ErrorKind::Usage.error("The transaction is already closed"))
    }

    fn split(&mut self, id: u64) -> Result<(&mut Box<dyn NativeConnection>, &mut StatementEntry)> {
        let connection = self
            .connection
            .as_mut()
            .ok_or_else(|| ErrorKind::Usage.error("The transaction is already closed"))?;
        let entry = self.statements.get_mut(&id).ok_or_else(|| {
            ErrorKind::Usage.error(format!("Statement {} is not open in this transaction", id))
        })?;
        Ok((connection, entry))
    }
}

/// Statement owned by a [`Transaction`], released with [`Transaction::close_statement`].
#[derive(Debug, PartialEq, Eq)]
pub struct PreparedStatement {
    id: u64,
    kind: StatementKind,
}

impl PreparedStatement {
    pub fn kind(&self) -> StatementKind {
        self.kind
    }
}

/// Unit of work bound to one pooled connection.
///
/// Methods take `&self`, the statement registry is guarded by a mutex so that
/// result sets and prepared inserts can share the transaction. It must not be
/// shared across threads.
pub struct Transaction<'c> {
    connector: &'c Connector,
    inner: Mutex<TransactionInner>,
}

impl<'c> Transaction<'c> {
    pub(crate) fn new(connector: &'c Connector, connection: Box<dyn NativeConnection>) -> Self {
        Self {
            connector,
            inner: Mutex::new(TransactionInner {
                connection: Some(connection),
                state: TransactionState::Created,
                statements: BTreeMap::new(),
                next_id: 0,
            }),
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, TransactionInner>> {
        self.inner
            .lock()
            .map_err(|_| ErrorKind::Backend.error("The transaction lock is poisoned"))
    }

    pub fn connector(&self) -> &'c Connector {
        self.connector
    }

    pub fn dialect(&self) -> Dialect {
        self.connector.dialect()
    }

    pub fn sql_writer(&self) -> &'static dyn SqlWriter {
        self.connector.sql_writer()
    }

    pub fn state(&self) -> Result<TransactionState> {
        Ok(self.lock()?.state)
    }

    pub fn open_statements(&self) -> Result<usize> {
        Ok(self.lock()?.statements.len())
    }

    pub fn begin(&self) -> Result<()> {
        let mut inner = self.lock()?;
        match inner.state {
            TransactionState::Started => {
                return Err(ErrorKind::Usage.error("The transaction is already started"));
            }
            TransactionState::Closed => {
                return Err(ErrorKind::Usage.error("The transaction is already closed"));
            }
            _ => {}
        }
        inner.connection()?.execute_batch("BEGIN")?;
        inner.state = TransactionState::Started;
        Ok(())
    }

    pub fn commit(&self) -> Result<()> {
        self.resolve("COMMIT", TransactionState::Committed)
    }

    pub fn rollback(&self) -> Result<()> {
        self.resolve("ROLLBACK", TransactionState::RolledBack)
    }

    fn resolve(&self, sql: &str, state: TransactionState) -> Result<()> {
        let mut inner = self.lock()?;
        if inner.state != TransactionState::Started {
            return Err(ErrorKind::Usage.error(format!(
                "Cannot {} a transaction that is not started",
                sql.to_lowercase()
            )));
        }
        inner.connection()?.execute_batch(sql)?;
        inner.state = state;
        Ok(())
    }

    /// Register a statement on the native connection, still unprepared.
    pub fn statement(
        &self,
        kind: StatementKind,
        text: impl Into<String>,
        literals: Vec<Value>,
    ) -> Result<PreparedStatement> {
        let text = text.into();
        let mut inner = self.lock()?;
        log::debug!("{}", truncate_long!(text));
        let handle = inner.connection()?.create_statement(kind, &text)?;
        let id = inner.next_id;
        inner.next_id += 1;
        inner.statements.insert(
            id,
            StatementEntry {
                handle,
                text,
                literals,
                state: StatementState::Unprepared,
            },
        );
        Ok(PreparedStatement { id, kind })
    }

    pub fn prepare(&self, statement: &PreparedStatement) -> Result<()> {
        let mut inner = self.lock()?;
        let (connection, entry) = inner.split(statement.id)?;
        if entry.state == StatementState::Unprepared {
            connection
                .prepare(entry.handle, entry.literals.len())
                .map_err(|e| with_query(e, &entry.text))?;
            entry.state = StatementState::Prepared;
        }
        Ok(())
    }

    /// Bind the literals captured when the statement was built.
    pub fn bind(&self, statement: &PreparedStatement) -> Result<()> {
        let mut inner = self.lock()?;
        let (connection, entry) = inner.split(statement.id)?;
        bind_entry(&mut **connection, entry)
    }

    /// Replace the literals and bind them.
    pub fn bind_values(&self, statement: &PreparedStatement, values: Vec<Value>) -> Result<()> {
        let mut inner = self.lock()?;
        let (connection, entry) = inner.split(statement.id)?;
        entry.literals = values;
        bind_entry(&mut **connection, entry)
    }

    /// Execute, binding the literals first if needed, returns the affected rows.
    pub fn execute(&self, statement: &PreparedStatement) -> Result<u64> {
        let mut inner = self.lock()?;
        let (connection, entry) = inner.split(statement.id)?;
        if entry.state == StatementState::Prepared {
            bind_entry(&mut **connection, entry)?;
        }
        check_prepared(entry)?;
        let rows = connection
            .exec_statement(entry.handle)
            .map_err(|e| with_query(e, &entry.text))?;
        entry.state = StatementState::Executed;
        Ok(rows)
    }

    pub fn fetch(&self, statement: &PreparedStatement, writer: &mut dyn RowWriter) -> Result<bool> {
        let mut inner = self.lock()?;
        let (connection, entry) = inner.split(statement.id)?;
        if entry.state != StatementState::Executed {
            return Err(ErrorKind::Usage.error("Cannot fetch from a statement not executed"));
        }
        connection
            .fetch_next(entry.handle, writer)
            .map_err(|e| with_query(e, &entry.text))
    }

    pub fn size(&self, statement: &PreparedStatement) -> Result<Option<u64>> {
        let mut inner = self.lock()?;
        let (connection, entry) = inner.split(statement.id)?;
        connection.size(entry.handle)
    }

    pub fn last_insert_id(
        &self,
        statement: &PreparedStatement,
        field: &FieldDescriptor,
    ) -> Result<Value> {
        let mut inner = self.lock()?;
        let (connection, entry) = inner.split(statement.id)?;
        if entry.state != StatementState::Executed {
            return Err(ErrorKind::Usage.error("The insert statement was not executed"));
        }
        connection
            .last_insert_id(entry.handle, field)?
            .convert_to(field.scalar_type)
    }

    pub fn close_statement(&self, statement: PreparedStatement) -> Result<()> {
        let mut inner = self.lock()?;
        let Some(entry) = inner.statements.remove(&statement.id) else {
            return Ok(());
        };
        inner.connection()?.close_statement(entry.handle)
    }

    /// Run parameterless SQL text, possibly more statements.
    pub fn execute_batch(&self, sql: &str) -> Result<()> {
        let mut inner = self.lock()?;
        log::debug!("{}", truncate_long!(sql));
        inner
            .connection()?
            .execute_batch(sql)
            .map_err(|e| with_query(e, sql))
    }

    /// Resolve per policy, release the statements and give back the connection.
    pub fn close(self) -> Result<()> {
        self.finish()
    }

    fn finish(&self) -> Result<()> {
        let mut inner = match self.inner.lock() {
            Ok(v) => v,
            Err(e) => e.into_inner(),
        };
        let Some(mut connection) = inner.connection.take() else {
            return Ok(());
        };
        if !inner.statements.is_empty() {
            log::warn!(
                "Transaction closed with {} open statements, closing them",
                inner.statements.len()
            );
        }
        for (_, entry) in std::mem::take(&mut inner.statements) {
            if let Err(e) = connection.close_statement(entry.handle) {
                log::error!("{:#}", e);
            }
        }
        let mut result = Ok(());
        if inner.state == TransactionState::Started {
            let policy = self.connector.config().transaction_policy;
            let (sql, state) = match policy {
                TransactionPolicy::Commit => ("COMMIT", TransactionState::Committed),
                TransactionPolicy::Rollback | TransactionPolicy::Manual => {
                    ("ROLLBACK", TransactionState::RolledBack)
                }
            };
            if policy == TransactionPolicy::Manual {
                result = Err(ErrorKind::Usage.error(
                    "Transaction closed while still started, it was rolled back",
                ));
            } else {
                log::warn!("Transaction closed while still started, issuing {}", sql);
            }
            if let Err(e) = connection.execute_batch(sql) {
                result = Err(e);
            }
            inner.state = state;
        }
        inner.state = TransactionState::Closed;
        drop(inner);
        self.connector.close_transaction(connection);
        result
    }
}

impl<'c> Drop for Transaction<'c> {
    fn drop(&mut self) {
        if let Err(e) = self.finish() {
            log::error!("{:#}", e);
        }
    }
}

fn check_prepared(entry: &StatementEntry) -> Result<()> {
    if entry.state == StatementState::Unprepared {
        return Err(ErrorKind::Usage.error(format!(
            "Statement used before being prepared: {}",
            truncate_long!(entry.text)
        )));
    }
    Ok(())
}

fn bind_entry(connection: &mut dyn NativeConnection, entry: &mut StatementEntry) -> Result<()> {
    check_prepared(entry)?;
    connection
        .bind_values(entry.handle, &entry.literals)
        .map_err(|e| with_query(e, &entry.text))?;
    entry.state = StatementState::Bound;
    Ok(())
}

fn with_query(error: crate::Error, query: &str) -> crate::Error {
    let error = error.context(format!("While executing: {}", truncate_long!(query)));
    log::error!("{:#}", error);
    error
}
