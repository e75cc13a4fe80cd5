use crate::{
    ValueHolder,
    util::{scalar_type_of, trim_statement},
};
use postgres::{Client, Row, Statement, types::ToSql};
use std::collections::{HashMap, VecDeque};
use stow_core::{
    ErrorKind, FieldDescriptor, NativeConnection, Result, RowWriter, StatementHandle,
    StatementKind, Value, truncate_long,
};

struct PgStatement {
    kind: StatementKind,
    text: String,
    statement: Option<Statement>,
    params: Vec<ValueHolder>,
    /// Rows of the last executed select, consumed by fetch.
    rows: VecDeque<Row>,
    size: Option<u64>,
}

/// Single postgres session with the statements opened on it.
pub struct PgConnection {
    client: Client,
    statements: HashMap<u64, PgStatement>,
    next_handle: u64,
}

impl PgConnection {
    pub(crate) fn new(client: Client) -> Self {
        Self {
            client,
            statements: HashMap::new(),
            next_handle: 1,
        }
    }

    fn entry(&mut self, handle: StatementHandle) -> Result<&mut PgStatement> {
        self.statements.get_mut(&handle.0).ok_or_else(|| {
            ErrorKind::Usage.error(format!("Unknown postgres statement handle {}", handle.0))
        })
    }
}

fn compiled(entry: &PgStatement) -> Result<&Statement> {
    entry.statement.as_ref().ok_or_else(|| {
        ErrorKind::Usage.error(format!(
            "The statement is not prepared:\n{}",
            truncate_long!(entry.text)
        ))
    })
}

fn params(values: &[ValueHolder]) -> Vec<&(dyn ToSql + Sync)> {
    values.iter().map(|v| v as &(dyn ToSql + Sync)).collect()
}

impl NativeConnection for PgConnection {
    fn create_statement(&mut self, kind: StatementKind, text: &str) -> Result<StatementHandle> {
        let handle = self.next_handle;
        self.next_handle += 1;
        self.statements.insert(
            handle,
            PgStatement {
                kind,
                text: trim_statement(text).to_string(),
                statement: None,
                params: Vec::new(),
                rows: VecDeque::new(),
                size: None,
            },
        );
        Ok(StatementHandle(handle))
    }

    fn prepare(&mut self, handle: StatementHandle, param_count: usize) -> Result<()> {
        let text = self.entry(handle)?.text.clone();
        let statement = self
            .client
            .prepare(&text)
            .map_err(|e| ErrorKind::Backend.wrap(e))?;
        if statement.params().len() != param_count {
            return Err(ErrorKind::Usage.error(format!(
                "The statement expects {} parameters but {} literals were collected",
                statement.params().len(),
                param_count
            )));
        }
        let entry = self.entry(handle)?;
        entry.statement = Some(statement);
        entry.params.clear();
        Ok(())
    }

    /// Each value is first converted into the type postgres inferred for its parameter.
    fn bind_values(&mut self, handle: StatementHandle, values: &[Value]) -> Result<()> {
        let entry = self.entry(handle)?;
        let types = compiled(entry)?.params().to_vec();
        if types.len() != values.len() {
            return Err(ErrorKind::Usage.error(format!(
                "Expected {} values to bind, got {}",
                types.len(),
                values.len()
            )));
        }
        entry.params = values
            .iter()
            .zip(types.iter())
            .enumerate()
            .map(|(i, (value, ty))| -> Result<ValueHolder> {
                let value = value.clone();
                let value = match scalar_type_of(ty) {
                    Some(target) => value.convert_to(target).map_err(|e| {
                        e.context(format!("Cannot bind parameter {} as {}", i + 1, ty))
                    })?,
                    None => value,
                };
                Ok(ValueHolder(value))
            })
            .collect::<Result<_>>()?;
        Ok(())
    }

    fn exec_statement(&mut self, handle: StatementHandle) -> Result<u64> {
        let entry = self
            .statements
            .get_mut(&handle.0)
            .ok_or_else(|| ErrorKind::Usage.error("Unknown postgres statement handle"))?;
        let statement = compiled(entry)?;
        let params = params(&entry.params);
        if entry.kind == StatementKind::Select {
            let rows = self
                .client
                .query(statement, &params)
                .map_err(|e| ErrorKind::Backend.wrap(e))?;
            entry.size = Some(rows.len() as u64);
            entry.rows = rows.into();
            return Ok(0);
        }
        let affected = self
            .client
            .execute(statement, &params)
            .map_err(|e| ErrorKind::Backend.wrap(e))?;
        Ok(affected)
    }

    fn fetch_next(
        &mut self,
        handle: StatementHandle,
        writer: &mut dyn RowWriter,
    ) -> Result<bool> {
        let Some(row) = self.entry(handle)?.rows.pop_front() else {
            return Ok(false);
        };
        for (i, column) in row.columns().iter().enumerate() {
            let Some((index, ty)) = writer.target(column.name()) else {
                log::warn!(
                    "Column `{}` does not match any field, skipping it",
                    column.name()
                );
                continue;
            };
            let value = row
                .try_get::<_, ValueHolder>(i)
                .map_err(|e| {
                    ErrorKind::Backend.wrap(e).context(format!(
                        "Could not decode column {} `{}` of type {}",
                        i,
                        column.name(),
                        column.type_()
                    ))
                })?
                .0
                .convert_to(ty)?;
            writer.write(index, value)?;
        }
        Ok(true)
    }

    fn size(&mut self, handle: StatementHandle) -> Result<Option<u64>> {
        Ok(self.entry(handle)?.size)
    }

    fn last_insert_id(
        &mut self,
        handle: StatementHandle,
        field: &FieldDescriptor,
    ) -> Result<Value> {
        self.entry(handle)?;
        let table = format!("\"{}\"", field.table.replace('"', "\"\""));
        let row = self
            .client
            .query_one(
                "SELECT currval(pg_get_serial_sequence($1, $2))",
                &[&table, &field.name],
            )
            .map_err(|e| {
                ErrorKind::Backend
                    .wrap(e)
                    .context(format!("Cannot read the key generated for `{}`", field.name))
            })?;
        let id: i64 = row.try_get(0).map_err(|e| ErrorKind::Backend.wrap(e))?;
        Ok(Value::Int64(Some(id)))
    }

    fn close_statement(&mut self, handle: StatementHandle) -> Result<()> {
        self.statements.remove(&handle.0);
        Ok(())
    }

    fn execute_batch(&mut self, sql: &str) -> Result<()> {
        self.client
            .batch_execute(sql)
            .map_err(|e| ErrorKind::Backend.wrap(e))
    }
}
