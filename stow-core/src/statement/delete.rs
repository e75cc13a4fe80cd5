use crate::{
    Clauses, ColumnRef, ErrorKind, Filtered, Query, Record, Result, StatementKind, Table,
    Transaction, check_fields,
    writer::{Context, SqlWriter},
};

#[derive(Debug, Clone, PartialEq)]
pub struct Delete {
    table: &'static Table,
    primary_key: Option<usize>,
    clauses: Clauses,
}

impl Delete {
    pub fn new(table: &'static Table, primary_key: Option<usize>) -> Self {
        Self {
            table,
            primary_key,
            clauses: Default::default(),
        }
    }

    pub fn build(&self, writer: &dyn SqlWriter) -> Result<Query> {
        check_fields(self.table)?;
        let mut context = Context::new(true);
        let mut out = String::with_capacity(64);
        let ast = &self.clauses.ast;
        if let Some((join_type, filter)) = self.clauses.joined()? {
            writer.write_delete_join(
                &mut context,
                &mut out,
                ast,
                self.table,
                join_type,
                &self.clauses.joins,
                filter,
            )?;
        } else {
            self.write_head(writer, &mut out);
            if let Some(filter) = self.clauses.filter {
                out.push_str("\nWHERE ");
                writer.write_condition(&mut context, &mut out, ast, filter);
            }
        }
        Ok(Query {
            kind: StatementKind::Delete,
            text: out,
            literals: context.literals,
        })
    }

    /// Delete the row having the primary key of `record`.
    pub fn build_row<R: Record>(&self, writer: &dyn SqlWriter, record: &R) -> Result<Query> {
        let Some(pk) = self.primary_key else {
            return Err(ErrorKind::Configuration.error(format!(
                "Cannot delete a `{}` record without a primary key",
                self.table.name
            )));
        };
        let mut context = Context::new(true);
        let mut out = String::with_capacity(64);
        self.write_head(writer, &mut out);
        out.push_str("\nWHERE ");
        writer.write_column_ref(
            &mut context,
            &mut out,
            &ColumnRef::from(&self.table.fields()[pk]),
        );
        out.push_str(" = ");
        writer.write_literal(&mut context, &mut out, &record.get(pk));
        Ok(Query {
            kind: StatementKind::Delete,
            text: out,
            literals: context.literals,
        })
    }

    pub fn exec(&self, transaction: &Transaction<'_>) -> Result<u64> {
        self.build(transaction.sql_writer())?.execute(transaction)
    }

    pub fn exec_row<R: Record>(&self, transaction: &Transaction<'_>, record: &R) -> Result<u64> {
        self.build_row(transaction.sql_writer(), record)?
            .execute(transaction)
    }

    fn write_head(&self, writer: &dyn SqlWriter, out: &mut String) {
        out.push_str("DELETE FROM ");
        writer.write_identifier_quoted(out, self.table.name);
    }
}

impl Filtered for Delete {
    fn clauses(&mut self) -> &mut Clauses {
        &mut self.clauses
    }
}
