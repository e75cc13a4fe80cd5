use crate::{
    Ast, BinaryOpType, CondId, ErrorKind, ExprId, FieldDescriptor, JoinType, Result, ScalarType,
    Table,
    writer::{Context, Dialect, SqlWriter, sql_writer::infix_symbol},
};

#[derive(Default, Debug, Clone, Copy)]
pub struct MySqlSqlWriter {}

impl MySqlSqlWriter {
    pub const fn new() -> Self {
        Self {}
    }
}

impl SqlWriter for MySqlSqlWriter {
    fn as_dyn(&self) -> &dyn SqlWriter {
        self
    }

    fn dialect(&self) -> Dialect {
        Dialect::MySql
    }

    fn write_identifier_quoted(&self, out: &mut String, value: &str) {
        out.push('`');
        self.write_escaped(out, value, '`', "``");
        out.push('`');
    }

    fn write_value_bool(&self, out: &mut String, value: bool) {
        out.push(['0', '1'][value as usize]);
    }

    fn write_bitwise_not(
        &self,
        context: &mut Context,
        out: &mut String,
        ast: &Ast,
        arg: ExprId,
        ty: ScalarType,
    ) {
        // The result of ~ is an unsigned 64 bit value
        let cast = ty.is_integral();
        if cast {
            out.push_str("CAST(");
        }
        out.push('~');
        self.write_operand(context, out, ast, arg);
        if cast {
            out.push_str(" AS INTEGER)");
        }
    }

    fn write_binary_op_symbol(&self, out: &mut String, op: BinaryOpType, ty: ScalarType) {
        match op {
            BinaryOpType::Division if ty.is_integral() => out.push_str(" DIV "),
            _ => out.push_str(infix_symbol(op)),
        }
    }

    fn write_concat(
        &self,
        context: &mut Context,
        out: &mut String,
        ast: &Ast,
        lhs: ExprId,
        rhs: ExprId,
    ) {
        out.push_str("CONCAT(");
        self.write_expression(context, out, ast, lhs);
        out.push_str(", ");
        self.write_expression(context, out, ast, rhs);
        out.push(')');
    }

    fn write_limit_offset(&self, out: &mut String, limit: Option<u64>, offset: Option<u64>) {
        match limit {
            Some(limit) => {
                out.push_str("\nLIMIT ");
                out.push_str(itoa::Buffer::new().format(limit));
            }
            None if offset.is_some() => out.push_str("\nLIMIT 18446744073709551615"),
            None => {}
        }
        if let Some(offset) = offset {
            out.push_str("\nOFFSET ");
            out.push_str(itoa::Buffer::new().format(offset));
        }
    }

    fn write_insert_default_values(&self, out: &mut String) {
        out.push_str(" () VALUES ()");
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
        join_type: JoinType,
        tables: &[&Table],
        filter: CondId,
    ) -> Result<()> {
        out.push_str("DELETE ");
        self.write_identifier_quoted(out, table.name);
        out.push_str(" FROM ");
        self.write_identifier_quoted(out, table.name);
        out.push(' ');
        self.write_join(context, out, ast, join_type, tables, filter);
        Ok(())
    }

    fn write_column_type(&self, out: &mut String, value: ScalarType) {
        out.push_str(match value {
            ScalarType::Boolean | ScalarType::Int8 => "TINYINT",
            ScalarType::Int16 => "SMALLINT",
            ScalarType::Int32 => "INT",
            ScalarType::Int64 => "BIGINT",
            ScalarType::UInt8 => "TINYINT UNSIGNED",
            ScalarType::UInt16 => "SMALLINT UNSIGNED",
            ScalarType::UInt32 => "INT UNSIGNED",
            ScalarType::UInt64 => "BIGINT UNSIGNED",
            ScalarType::Float32 => "FLOAT",
            ScalarType::Float64 => "DOUBLE",
            ScalarType::Decimal => "DECIMAL(38, 10)",
            ScalarType::Varchar => "VARCHAR(255)",
            ScalarType::Blob => "BLOB",
            ScalarType::Date => "DATE",
            ScalarType::Time => "TIME",
            ScalarType::Timestamp | ScalarType::TimestampWithTimezone => "DATETIME",
            ScalarType::Uuid => "CHAR(36)",
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
        out.push(' ');
        self.write_column_type(out, field.scalar_type);
        out.push_str(" PRIMARY KEY AUTO_INCREMENT");
        Ok(())
    }

    fn create_table_if_not_exists(&self) -> bool {
        false
    }

    fn write_create_index(
        &self,
        out: &mut String,
        table: &Table,
        name: &str,
        fields: &[&FieldDescriptor],
        unique: bool,
    ) {
        out.push_str("ALTER TABLE ");
        self.write_identifier_quoted(out, table.name);
        out.push_str(if unique { " ADD UNIQUE " } else { " ADD INDEX " });
        self.write_identifier_quoted(out, name);
        self.write_index_columns(out, fields);
    }
}
