use crate::{
    Clauses, ColumnRef, ErrorKind, ExprId, FieldDescriptor, Filtered, Order, Query, Record,
    Result, ResultSet, StatementKind, Table, Transaction, check_fields, separated_by,
    writer::{Context, SqlWriter},
};
use std::ptr;

/// Projects every field of the table, optionally joined, filtered, ordered and paginated.
#[derive(Debug, Clone, PartialEq)]
pub struct Select {
    table: &'static Table,
    clauses: Clauses,
    order: Vec<ExprId>,
    direction: Option<Order>,
    limit: Option<u64>,
    offset: Option<u64>,
}

impl Select {
    pub fn new(table: &'static Table) -> Self {
        Self {
            table,
            clauses: Default::default(),
            order: Vec::new(),
            direction: None,
            limit: None,
            offset: None,
        }
    }

    pub fn table(&self) -> &'static Table {
        self.table
    }

    /// Add an ORDER BY expression, every expression must share the same direction.
    pub fn order_by(&mut self, expr: ExprId, order: Order) -> Result<&mut Self> {
        self.clauses.ast.check_expr(expr)?;
        match self.direction {
            Some(current) if current != order => {
                return Err(ErrorKind::Usage.error(format!(
                    "Cannot order by {:?} after {:?}, mixed directions are not supported",
                    order, current
                )));
            }
            _ => {}
        }
        self.direction = Some(order);
        self.order.push(expr);
        Ok(self)
    }

    pub fn order_by_field(&mut self, field: &FieldDescriptor, order: Order) -> Result<&mut Self> {
        let expr = self.clauses.ast.column(field);
        self.order_by(expr, order)
    }

    pub fn limit(&mut self, limit: u64) -> &mut Self {
        self.limit = Some(limit);
        self
    }

    pub fn offset(&mut self, offset: u64) -> &mut Self {
        self.offset = Some(offset);
        self
    }

    pub fn build(&self, writer: &dyn SqlWriter) -> Result<Query> {
        check_fields(self.table)?;
        let mut context = Context::new(true);
        let mut out = String::with_capacity(64 + self.table.len() * 32);
        out.push_str("SELECT ");
        separated_by(
            &mut out,
            self.table.fields(),
            |out, v| writer.write_column_ref(&mut context, out, &ColumnRef::from(v)),
            ", ",
        );
        out.push_str("\nFROM ");
        writer.write_identifier_quoted(&mut out, self.table.name);
        let ast = &self.clauses.ast;
        if let Some((join_type, on)) = self.clauses.joined()? {
            out.push('\n');
            writer.write_join(
                &mut context,
                &mut out,
                ast,
                join_type,
                &self.clauses.joins,
                on,
            );
        } else if let Some(filter) = self.clauses.filter {
            out.push_str("\nWHERE ");
            writer.write_condition(&mut context, &mut out, ast, filter);
        }
        if let Some(direction) = self.direction {
            out.push_str("\nORDER BY ");
            separated_by(
                &mut out,
                &self.order,
                |out, v| {
                    writer.write_expression(&mut context, out, ast, *v);
                    out.push_str(match direction {
                        Order::Ascending => " ASC",
                        Order::Descending => " DESC",
                    });
                },
                ", ",
            );
        }
        writer.write_limit_offset(&mut out, self.limit, self.offset);
        Ok(Query {
            kind: StatementKind::Select,
            text: out,
            literals: context.literals,
        })
    }

    /// Execute and return a cursor writing each fetched row into `record`.
    pub fn exec<'t, R: Record>(
        &self,
        transaction: &'t Transaction<'t>,
        record: &'t mut R,
    ) -> Result<ResultSet<'t, R>> {
        if !ptr::eq(R::table(), self.table) {
            return Err(ErrorKind::Usage.error(format!(
                "Cannot fetch rows of `{}` into a `{}` record",
                self.table.name,
                R::table().name
            )));
        }
        let query = self.build(transaction.sql_writer())?;
        ResultSet::new(transaction, query, record)
    }
}

impl Filtered for Select {
    fn clauses(&mut self) -> &mut Clauses {
        &mut self.clauses
    }
}

