use crate::{
    ErrorKind, PreparedStatement, Query, Record, Result, StatementKind, Table, Transaction,
    Value, check_fields, separated_by, writer::SqlWriter,
};
use std::ptr;

/// Inserts every field except the auto incremented primary key.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Insert {
    table: &'static Table,
    primary_key: Option<usize>,
}

impl Insert {
    pub fn new(table: &'static Table, primary_key: Option<usize>) -> Self {
        Self { table, primary_key }
    }

    /// Offsets of the inserted fields, in catalog order.
    pub fn columns(&self) -> impl Iterator<Item = usize> + '_ {
        (0..self.table.len()).filter(move |i| Some(*i) != self.primary_key)
    }

    /// One placeholder per column, the literals are typed nulls until a record is bound.
    pub fn build(&self, writer: &dyn SqlWriter) -> Result<Query> {
        check_fields(self.table)?;
        let mut out = String::with_capacity(64 + self.table.len() * 16);
        out.push_str("INSERT INTO ");
        writer.write_identifier_quoted(&mut out, self.table.name);
        let count = self.columns().count();
        if count == 0 {
            writer.write_insert_default_values(&mut out);
        } else {
            out.push_str(" (");
            separated_by(
                &mut out,
                self.columns(),
                |out, i| writer.write_identifier_quoted(out, self.table.fields()[i].name),
                ", ",
            );
            out.push_str(")\nVALUES (");
            separated_by(
                &mut out,
                1..=count,
                |out, i| writer.write_placeholder(out, i),
                ", ",
            );
            out.push(')');
        }
        Ok(Query {
            kind: StatementKind::Insert,
            text: out,
            literals: self
                .columns()
                .map(|i| self.table.fields()[i].scalar_type.null())
                .collect(),
        })
    }

    /// Values bound for `record`, one per placeholder.
    pub fn values<R: Record>(&self, record: &R) -> Vec<Value> {
        self.columns().map(|i| record.get(i)).collect()
    }

    /// Prepare once, then call [`PreparedInsert::step`] for each record.
    pub fn prepare<'t>(&self, transaction: &'t Transaction<'t>) -> Result<PreparedInsert<'t>> {
        let query = self.build(transaction.sql_writer())?;
        let statement = transaction.statement(query.kind, query.text, query.literals)?;
        if let Err(e) = transaction.prepare(&statement) {
            let _ = transaction.close_statement(statement);
            return Err(e);
        }
        Ok(PreparedInsert {
            insert: *self,
            transaction,
            statement: Some(statement),
        })
    }

    /// Insert a single record, writing back the generated primary key.
    pub fn exec<R: Record>(&self, transaction: &Transaction<'_>, record: &mut R) -> Result<()> {
        let mut prepared = self.prepare(transaction)?;
        prepared.step(record)?;
        prepared.close()
    }
}

/// Insert statement prepared on a transaction, reusable across records of one table.
pub struct PreparedInsert<'t> {
    insert: Insert,
    transaction: &'t Transaction<'t>,
    statement: Option<PreparedStatement>,
}

impl<'t> PreparedInsert<'t> {
    pub fn step<R: Record>(&mut self, record: &mut R) -> Result<()> {
        if !ptr::eq(R::table(), self.insert.table) {
            return Err(ErrorKind::Usage.error(format!(
                "Cannot insert a `{}` record into `{}`",
                R::table().name,
                self.insert.table.name
            )));
        }
        let Some(statement) = &self.statement else {
            return Err(ErrorKind::Usage.error("The insert statement was already closed"));
        };
        self.transaction
            .bind_values(statement, self.insert.values(record))?;
        self.transaction.execute(statement)?;
        if let Some(pk) = self.insert.primary_key {
            let field = &self.insert.table.fields()[pk];
            let id = self.transaction.last_insert_id(statement, field)?;
            record.set(pk, id)?;
        }
        Ok(())
    }

    pub fn close(mut self) -> Result<()> {
        match self.statement.take() {
            Some(statement) => self.transaction.close_statement(statement),
            None => Ok(()),
        }
    }
}

impl<'t> Drop for PreparedInsert<'t> {
    fn drop(&mut self) {
        if let Some(statement) = self.statement.take() {
            if let Err(e) = self.transaction.close_statement(statement) {
                log::error!("{:#}", e);
            }
        }
    }
}
