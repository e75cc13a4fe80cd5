use crate::{
    Clauses, CodeGenerator, ColumnRef, ErrorKind, ExprId, FieldDescriptor, Filtered, Query,
    Record, Result, StatementKind, Table, Transaction, Value, check_fields, check_owner,
    writer::{Context, SqlWriter},
};

/// Update either from an explicit SET list or from a whole record.
#[derive(Debug, Clone, PartialEq)]
pub struct Update {
    table: &'static Table,
    primary_key: Option<usize>,
    clauses: Clauses,
    assignments: Vec<(usize, ExprId)>,
}

impl Update {
    pub fn new(table: &'static Table, primary_key: Option<usize>) -> Self {
        Self {
            table,
            primary_key,
            clauses: Default::default(),
            assignments: Vec::new(),
        }
    }

    /// `SET field = value`, with `value` built in [`Filtered::ast`].
    pub fn set(&mut self, field: &FieldDescriptor, value: ExprId) -> Result<&mut Self> {
        check_owner(self.table, field)?;
        self.clauses.ast.check_expr(value)?;
        let ty = self.clauses.ast.expr(value).value_type();
        if ty.family() != field.scalar_type.family() {
            return Err(ErrorKind::Configuration.error(format!(
                "Cannot assign a {} value to `{}` of type {}",
                ty, field.name, field.scalar_type
            )));
        }
        let index = self.table.position(field.name).unwrap_or_default();
        self.assignments.push((index, value));
        Ok(self)
    }

    /// Statement using the SET list.
    pub fn build(&self, writer: &dyn SqlWriter) -> Result<Query> {
        check_fields(self.table)?;
        if self.assignments.is_empty() {
            return Err(ErrorKind::Usage.error(format!(
                "Update of `{}` without any assignment",
                self.table.name
            )));
        }
        let mut out = self.write_head(writer);
        let mut literals = Vec::new();
        for (i, (field, value)) in self.assignments.iter().enumerate() {
            if i > 0 {
                out.push_str(", ");
            }
            writer.write_identifier_quoted(&mut out, self.table.fields()[*field].name);
            out.push_str(" = ");
            let generated = CodeGenerator::new(writer, true)
                .starting_at(literals.len())
                .expression(&self.clauses.ast, *value)?;
            out.push_str(&generated.text);
            literals.extend(generated.literals);
        }
        let mut context = Context::starting_at(true, literals.len());
        self.write_tail(writer, &mut context, &mut out, None)?;
        literals.append(&mut context.literals);
        Ok(Query {
            kind: StatementKind::Update,
            text: out,
            literals,
        })
    }

    /// Statement assigning every non primary key field of `record`.
    ///
    /// Without a filter the row is matched by primary key.
    pub fn build_row<R: Record>(&self, writer: &dyn SqlWriter, record: &R) -> Result<Query> {
        check_fields(self.table)?;
        if self.clauses.filter.is_none() && self.primary_key.is_none() {
            return Err(ErrorKind::Configuration.error(format!(
                "Cannot update a `{}` record without a filter or a primary key",
                self.table.name
            )));
        }
        let mut out = self.write_head(writer);
        let mut context = Context::new(true);
        let mut first = true;
        for (i, field) in self.table.fields().iter().enumerate() {
            if Some(i) == self.primary_key {
                continue;
            }
            if !first {
                out.push_str(", ");
            }
            first = false;
            writer.write_column_ref(
                &mut context.switch_qualified(false).context,
                &mut out,
                &ColumnRef::from(field),
            );
            out.push_str(" = ");
            writer.write_literal(&mut context, &mut out, &record.get(i));
        }
        if first {
            return Err(ErrorKind::Usage.error(format!(
                "Table `{}` has no field to update besides the primary key",
                self.table.name
            )));
        }
        let key = self.primary_key.map(|i| (i, record.get(i)));
        self.write_tail(writer, &mut context, &mut out, key)?;
        Ok(Query {
            kind: StatementKind::Update,
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

    fn write_head(&self, writer: &dyn SqlWriter) -> String {
        let mut out = String::with_capacity(64 + self.table.len() * 24);
        out.push_str("UPDATE ");
        writer.write_identifier_quoted(&mut out, self.table.name);
        out.push_str("\nSET ");
        out
    }

    fn write_tail(
        &self,
        writer: &dyn SqlWriter,
        context: &mut Context,
        out: &mut String,
        key: Option<(usize, Value)>,
    ) -> Result<()> {
        let ast = &self.clauses.ast;
        if let Some((join_type, filter)) = self.clauses.joined()? {
            writer.write_update_join(context, out, ast, join_type, &self.clauses.joins, filter)?;
        } else if let Some(filter) = self.clauses.filter {
            out.push_str("\nWHERE ");
            writer.write_condition(context, out, ast, filter);
        } else if let Some((index, value)) = key {
            out.push_str("\nWHERE ");
            writer.write_column_ref(context, out, &ColumnRef::from(&self.table.fields()[index]));
            out.push_str(" = ");
            writer.write_literal(context, out, &value);
        }
        Ok(())
    }
}

impl Filtered for Update {
    fn clauses(&mut self) -> &mut Clauses {
        &mut self.clauses
    }
}
