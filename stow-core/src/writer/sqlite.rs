use crate::{
    Ast, CondId, ErrorKind, FieldDescriptor, JoinType, Result, ScalarType, Table,
    writer::{Context, Dialect, SqlWriter},
};

#[derive(Default, Debug, Clone, Copy)]
pub struct SqliteSqlWriter {}

impl SqliteSqlWriter {
    pub const fn new() -> Self {
        Self {}
    }
}

impl SqlWriter for SqliteSqlWriter {
    fn as_dyn(&self) -> &dyn SqlWriter {
        self
    }

    fn dialect(&self) -> Dialect {
        Dialect::Sqlite
    }

    fn write_value_bool(&self, out: &mut String, value: bool) {
        out.push(['0', '1'][value as usize]);
    }

    fn write_limit_offset(&self, out: &mut String, limit: Option<u64>, offset: Option<u64>) {
        match limit {
            Some(limit) => {
                out.push_str("\nLIMIT ");
                out.push_str(itoa::Buffer::new().format(limit));
            }
            None if offset.is_some() => out.push_str("\nLIMIT -1"),
            None => {}
        }
        if let Some(offset) = offset {
            out.push_str("\nOFFSET ");
            out.push_str(itoa::Buffer::new().format(offset));
        }
    }

    fn write_update_join(
        &self,
        context: &mut Context,
        out: &mut String,
        ast: &Ast,
        _join_type: JoinType,
        tables: &[&Table],
        filter: CondId,
    ) -> Result<()> {
        self.write_where_exists(context, out, ast, tables, filter);
        Ok(())
    }

    fn write_delete_join(
        &self,
        context: &mut Context,
        out: &mut String,
        ast: &Ast,
        table: &Table,
        _join_type: JoinType,
        tables: &[&Table],
        filter: CondId,
    ) -> Result<()> {
        out.push_str("DELETE FROM ");
        self.write_identifier_quoted(out, table.name);
        self.write_where_exists(context, out, ast, tables, filter);
        Ok(())
    }

    fn write_column_type(&self, out: &mut String, value: ScalarType) {
        out.push_str(match value {
            v if v.is_integral() => "INTEGER",
            ScalarType::Float32 | ScalarType::Float64 | ScalarType::Decimal => "REAL",
            ScalarType::Blob => "BLOB",
            _ => "TEXT",
        });
    }

    fn write_primary_key_column(&self, out: &mut String, field: &FieldDescriptor) -> Result<()> {
        if !field.scalar_type.is_integral() {
            return Err(ErrorKind::Configuration.error(format!(
                "Primary key `{}` must be integral to auto increment, found {}",
                field.name, field.scalar_type
            )));
        }
        self.write_identifier_quoted(out, field.name);
        out.push_str(" INTEGER PRIMARY KEY AUTOINCREMENT");
        Ok(())
    }
}
