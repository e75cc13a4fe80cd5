mod custom;
mod delete;
mod insert;
mod select;
mod update;

pub use custom::*;
pub use delete::*;
pub use insert::*;
pub use select::*;
pub use update::*;

use crate::{Ast, CondId, ErrorKind, FieldDescriptor, Result, Table, Transaction, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatementKind {
    Select,
    Insert,
    Update,
    Delete,
    Custom,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinType {
    Inner,
    Outer,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Order {
    Ascending,
    Descending,
}

/// Frozen statement text with its positional literals.
#[derive(Debug, Clone, PartialEq)]
pub struct Query {
    pub kind: StatementKind,
    pub text: String,
    pub literals: Vec<Value>,
}

impl Query {
    /// Prepare, bind, execute and close, returning the affected rows.
    pub fn execute(&self, transaction: &Transaction<'_>) -> Result<u64> {
        let statement =
            transaction.statement(self.kind, self.text.clone(), self.literals.clone())?;
        let result = transaction
            .prepare(&statement)
            .and_then(|_| transaction.execute(&statement));
        let closed = transaction.close_statement(statement);
        let rows = result?;
        closed?;
        Ok(rows)
    }
}

/// Filter and joins shared by select, update and delete.
#[derive(Default, Debug, Clone, PartialEq)]
pub struct Clauses {
    pub ast: Ast,
    pub filter: Option<CondId>,
    pub join_type: Option<JoinType>,
    pub joins: Vec<&'static Table>,
}

impl Clauses {
    /// Successive filters are combined with AND.
    pub fn add_filter(&mut self, condition: CondId) {
        self.filter = Some(match self.filter {
            Some(current) => self.ast.and(current, condition),
            None => condition,
        });
    }

    pub fn add_join(&mut self, join_type: JoinType, table: &'static Table) -> Result<()> {
        match self.join_type {
            Some(current) if current != join_type => Err(ErrorKind::Usage.error(format!(
                "Cannot join `{}` with {:?}, the statement already uses {:?} joins",
                table.name, join_type, current
            ))),
            _ => {
                self.join_type = Some(join_type);
                self.joins.push(table);
                Ok(())
            }
        }
    }

    /// Join kind and filter, a join without a filter is a usage error.
    pub(crate) fn joined(&self) -> Result<Option<(JoinType, CondId)>> {
        let Some(join_type) = self.join_type else {
            return Ok(None);
        };
        match self.filter {
            Some(filter) => Ok(Some((join_type, filter))),
            None => Err(ErrorKind::Usage
                .error("Joined tables require a filter used as the join condition")),
        }
    }
}

/// Builder methods over the filter and join clauses.
pub trait Filtered {
    fn clauses(&mut self) -> &mut Clauses;

    /// Arena where the filter expressions are built.
    fn ast(&mut self) -> &mut Ast {
        &mut self.clauses().ast
    }

    /// Add a condition built in [`Filtered::ast`], AND-ed with the previous ones.
    fn filter(&mut self, condition: CondId) -> Result<&mut Self>
    where
        Self: Sized,
    {
        self.ast().check_cond(condition)?;
        self.clauses().add_filter(condition);
        Ok(self)
    }

    /// Build the condition in place and add it as a filter.
    fn filter_with<F>(&mut self, f: F) -> Result<&mut Self>
    where
        Self: Sized,
        F: FnOnce(&mut Ast) -> Result<CondId>,
    {
        let condition = f(self.ast())?;
        self.filter(condition)
    }

    fn join(&mut self, join_type: JoinType, table: &'static Table) -> Result<&mut Self>
    where
        Self: Sized,
    {
        self.clauses().add_join(join_type, table)?;
        Ok(self)
    }
}

/// Fails unless `field` is a column of `table`.
pub(crate) fn check_owner(table: &Table, field: &FieldDescriptor) -> Result<()> {
    if field.table != table.name || table.position(field.name).is_none() {
        return Err(ErrorKind::Configuration.error(format!(
            "Field `{}.{}` does not belong to table `{}`",
            field.table, field.name, table.name
        )));
    }
    Ok(())
}

/// Zero field tables cannot produce any statement.
pub(crate) fn check_fields(table: &Table) -> Result<()> {
    if table.is_empty() {
        return Err(ErrorKind::Configuration
            .error(format!("Table `{}` does not have any field", table.name)));
    }
    Ok(())
}
