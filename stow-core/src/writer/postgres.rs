use crate::{
    Ast, CondId, ErrorKind, FieldDescriptor, JoinType, Result, ScalarType, Table, separated_by,
    writer::{Context, Dialect, SqlWriter},
};

#[derive(Default, Debug, Clone, Copy)]
pub struct PostgresSqlWriter {}

impl PostgresSqlWriter {
    pub const fn new() -> Self {
        Self {}
    }
}

impl SqlWriter for PostgresSqlWriter {
    fn as_dyn(&self) -> &dyn SqlWriter {
        self
    }

    fn dialect(&self) -> Dialect {
        Dialect::Postgres
    }

    fn write_placeholder(&self, out: &mut String, index: usize) {
        out.push('$');
        out.push_str(itoa::Buffer::new().format(index));
    }

    fn write_value_bool(&self, out: &mut String, value: bool) {
        out.push(['0', '1'][value as usize]);
    }

    fn write_value_blob(&self, out: &mut String, value: &[u8]) {
        out.push_str("'\\x");
        out.push_str(&hex::encode(value));
        out.push('\'');
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
        out.push_str("\nFROM ");
        separated_by(
            out,
            tables,
            |out, v| self.write_identifier_quoted(out, v.name),
            ", ",
        );
        out.push_str("\nWHERE ");
        self.write_condition(context, out, ast, filter);
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
        out.push_str("\nUSING ");
        separated_by(
            out,
            tables,
            |out, v| self.write_identifier_quoted(out, v.name),
            ", ",
        );
        out.push_str("\nWHERE ");
        self.write_condition(context, out, ast, filter);
        Ok(())
    }

    fn write_column_type(&self, out: &mut String, value: ScalarType) {
        out.push_str(match value {
            ScalarType::Boolean | ScalarType::Int8 | ScalarType::Int16 | ScalarType::UInt8 => {
                "SMALLINT"
            }
            ScalarType::Int32 | ScalarType::UInt16 => "INTEGER",
            ScalarType::Int64 | ScalarType::UInt32 => "BIGINT",
            ScalarType::UInt64 => "NUMERIC(20)",
            ScalarType::Float32 => "REAL",
            ScalarType::Float64 => "DOUBLE PRECISION",
            ScalarType::Decimal => "NUMERIC",
            ScalarType::Varchar => "TEXT",
            ScalarType::Blob => "BYTEA",
            ScalarType::Date => "DATE",
            ScalarType::Time => "TIME",
            ScalarType::Timestamp => "TIMESTAMP",
            ScalarType::TimestampWithTimezone => "TIMESTAMP WITH TIME ZONE",
            ScalarType::Uuid => "UUID",
        });
    }

    fn write_primary_key_column(&self, out: &mut String, field: &FieldDescriptor) -> Result<()> {
        let serial = match field.scalar_type {
            ScalarType::Int64 | ScalarType::UInt32 | ScalarType::UInt64 => "BIGSERIAL",
            v if v.is_integral() => "SERIAL",
            v => {
                return Err(ErrorKind::Configuration.error(format!(
                    "Primary key `{}` must be integral to auto increment, found {}",
                    field.name, v
                )));
            }
        };
        self.write_identifier_quoted(out, field.name);
        out.push(' ');
        out.push_str(serial);
        out.push_str(" PRIMARY KEY");
        Ok(())
    }

    fn write_create_index(
        &self,
        out: &mut String,
        table: &Table,
        name: &str,
        fields: &[&FieldDescriptor],
        unique: bool,
    ) {
        out.push_str("DO $$\nBEGIN\nIF NOT EXISTS (SELECT 1 FROM pg_class c WHERE c.relname = ");
        self.write_value_string(out, name);
        out.push_str(" AND c.relkind = 'i') THEN\nCREATE ");
        if unique {
            out.push_str("UNIQUE ");
        }
        out.push_str("INDEX ");
        self.write_identifier_quoted(out, name);
        out.push_str(" ON ");
        self.write_identifier_quoted(out, table.name);
        self.write_index_columns(out, fields);
        out.push_str(";\nEND IF;\nEND\n$$");
    }
}
