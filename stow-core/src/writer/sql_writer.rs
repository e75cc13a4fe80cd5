use crate::{
    Ast, BinaryOpType, ColumnRef, ConditionalOp, ErrorKind, ExprId, ExprNode, FieldDescriptor,
    JoinType, Result, ScalarType, Table, UnaryOpType, Value, CondId, RelationalOp, WhereNode,
    possibly_parenthesized, separated_by, write_date, write_time, write_timestamp,
    write_timestamptz,
    writer::{Context, Dialect},
};

macro_rules! write_integer {
    ($out:ident, $value:expr) => {{
        let mut buffer = itoa::Buffer::new();
        $out.push_str(buffer.format($value));
    }};
}
macro_rules! write_float {
    ($this:ident, $out:ident, $value:expr) => {{
        if $value.is_finite() {
            let mut buffer = ryu::Buffer::new();
            $out.push_str(buffer.format($value));
        } else {
            $this.write_value_non_finite($out, $value as f64);
        }
    }};
}

/// Dialect printer turning AST nodes and statement parts into SQL text.
///
/// Every method has a default producing the most common syntax, dialects
/// override only what differs.
pub trait SqlWriter: Send + Sync {
    fn as_dyn(&self) -> &dyn SqlWriter;

    fn dialect(&self) -> Dialect;

    /// Escape occurrences of `search` char with `replace` while copying into buffer.
    fn write_escaped(&self, out: &mut String, value: &str, search: char, replace: &str) {
        let mut position = 0;
        for (i, c) in value.char_indices() {
            if c == search {
                out.push_str(&value[position..i]);
                out.push_str(replace);
                position = i + c.len_utf8();
            }
        }
        out.push_str(&value[position..]);
    }

    /// Quote identifiers ("name") doubling inner quotes.
    fn write_identifier_quoted(&self, out: &mut String, value: &str) {
        out.push('"');
        self.write_escaped(out, value, '"', "\"\"");
        out.push('"');
    }

    fn write_column_ref(&self, context: &mut Context, out: &mut String, value: &ColumnRef) {
        if context.qualified && !value.table.is_empty() {
            self.write_identifier_quoted(out, value.table);
            out.push('.');
        }
        self.write_identifier_quoted(out, value.name);
    }

    /// Positional placeholder, `index` is one based.
    fn write_placeholder(&self, out: &mut String, _index: usize) {
        out.push('?');
    }

    /// Bind or inline a literal depending on the context.
    fn write_literal(&self, context: &mut Context, out: &mut String, value: &Value) {
        if context.qualified {
            self.write_placeholder(out, context.next_placeholder());
            context.literals.push(value.clone());
        } else {
            self.write_value(out, value);
        }
    }

    /// Render a concrete value (including proper quoting / escaping).
    fn write_value(&self, out: &mut String, value: &Value) {
        match value {
            v if v.is_null() => self.write_value_none(out),
            Value::Boolean(Some(v)) => self.write_value_bool(out, *v),
            Value::Int8(Some(v)) => write_integer!(out, *v),
            Value::Int16(Some(v)) => write_integer!(out, *v),
            Value::Int32(Some(v)) => write_integer!(out, *v),
            Value::Int64(Some(v)) => write_integer!(out, *v),
            Value::UInt8(Some(v)) => write_integer!(out, *v),
            Value::UInt16(Some(v)) => write_integer!(out, *v),
            Value::UInt32(Some(v)) => write_integer!(out, *v),
            Value::UInt64(Some(v)) => write_integer!(out, *v),
            Value::Float32(Some(v)) => write_float!(self, out, *v),
            Value::Float64(Some(v)) => write_float!(self, out, *v),
            Value::Decimal(Some(v)) => out.push_str(&v.to_string()),
            Value::Varchar(Some(v)) => self.write_value_string(out, v),
            Value::Blob(Some(v)) => self.write_value_blob(out, v),
            Value::Date(Some(v)) => {
                out.push('\'');
                write_date(out, v);
                out.push('\'');
            }
            Value::Time(Some(v)) => {
                out.push('\'');
                write_time(out, v);
                out.push('\'');
            }
            Value::Timestamp(Some(v)) => {
                out.push('\'');
                write_timestamp(out, v);
                out.push('\'');
            }
            Value::TimestampWithTimezone(Some(v)) => {
                out.push('\'');
                write_timestamptz(out, v);
                out.push('\'');
            }
            Value::Uuid(Some(v)) => self.write_value_string(out, &v.to_string()),
            _ => self.write_value_none(out),
        }
    }

    fn write_value_none(&self, out: &mut String) {
        out.push_str("NULL");
    }

    fn write_value_bool(&self, out: &mut String, value: bool) {
        out.push_str(["FALSE", "TRUE"][value as usize]);
    }

    fn write_value_non_finite(&self, out: &mut String, value: f64) {
        out.push_str(if value.is_nan() {
            "'NaN'"
        } else if value.is_sign_negative() {
            "'-Infinity'"
        } else {
            "'Infinity'"
        });
    }

    /// Single quoted, inner quotes doubled.
    fn write_value_string(&self, out: &mut String, value: &str) {
        out.push('\'');
        self.write_escaped(out, value, '\'', "''");
        out.push('\'');
    }

    fn write_value_blob(&self, out: &mut String, value: &[u8]) {
        out.push_str("X'");
        out.push_str(&hex::encode_upper(value));
        out.push('\'');
    }

    fn write_expression(&self, context: &mut Context, out: &mut String, ast: &Ast, id: ExprId) {
        match ast.expr(id) {
            ExprNode::Column(v) => self.write_column_ref(context, out, v),
            ExprNode::Literal(v) => self.write_literal(context, out, v),
            ExprNode::Null(..) => self.write_value_none(out),
            ExprNode::UnaryOp { op, arg, ty } => {
                self.write_unary_op(context, out, ast, *op, *arg, *ty)
            }
            ExprNode::BinaryOp { op, lhs, rhs, ty } => {
                self.write_binary_op(context, out, ast, *op, *lhs, *rhs, *ty)
            }
            ExprNode::FunctionCall { name, args, .. } => {
                self.write_function_call(context, out, ast, name, args)
            }
        }
    }

    /// Expression used as an operand, parenthesized unless it is a leaf.
    fn write_operand(&self, context: &mut Context, out: &mut String, ast: &Ast, id: ExprId) {
        possibly_parenthesized!(
            out,
            !ast.expr(id).is_leaf(),
            self.write_expression(context, out, ast, id)
        );
    }

    fn write_unary_op(
        &self,
        context: &mut Context,
        out: &mut String,
        ast: &Ast,
        op: UnaryOpType,
        arg: ExprId,
        ty: ScalarType,
    ) {
        match op {
            UnaryOpType::Plus => self.write_expression(context, out, ast, arg),
            UnaryOpType::Negative => {
                out.push('-');
                self.write_operand(context, out, ast, arg);
            }
            UnaryOpType::BitwiseNot => self.write_bitwise_not(context, out, ast, arg, ty),
        }
    }

    fn write_bitwise_not(
        &self,
        context: &mut Context,
        out: &mut String,
        ast: &Ast,
        arg: ExprId,
        _ty: ScalarType,
    ) {
        out.push('~');
        self.write_operand(context, out, ast, arg);
    }

    fn write_binary_op(
        &self,
        context: &mut Context,
        out: &mut String,
        ast: &Ast,
        op: BinaryOpType,
        lhs: ExprId,
        rhs: ExprId,
        ty: ScalarType,
    ) {
        match op {
            BinaryOpType::Concat => self.write_concat(context, out, ast, lhs, rhs),
            BinaryOpType::BitwiseXor => {
                // (l & ~r) | (~l & r)
                out.push('(');
                self.write_operand(context, out, ast, lhs);
                out.push_str(" & ");
                self.write_bitwise_not(context, out, ast, rhs, ty);
                out.push_str(") | (");
                self.write_bitwise_not(context, out, ast, lhs, ty);
                out.push_str(" & ");
                self.write_operand(context, out, ast, rhs);
                out.push(')');
            }
            _ => {
                self.write_operand(context, out, ast, lhs);
                self.write_binary_op_symbol(out, op, ty);
                self.write_operand(context, out, ast, rhs);
            }
        }
    }

    /// Operator with its surrounding spaces.
    fn write_binary_op_symbol(&self, out: &mut String, op: BinaryOpType, _ty: ScalarType) {
        out.push_str(infix_symbol(op));
    }

    fn write_concat(
        &self,
        context: &mut Context,
        out: &mut String,
        ast: &Ast,
        lhs: ExprId,
        rhs: ExprId,
    ) {
        self.write_operand(context, out, ast, lhs);
        out.push_str(" || ");
        self.write_operand(context, out, ast, rhs);
    }

    fn write_function_call(
        &self,
        context: &mut Context,
        out: &mut String,
        ast: &Ast,
        name: &str,
        args: &[ExprId],
    ) {
        out.push_str(name);
        out.push('(');
        separated_by(
            out,
            args,
            |out, v| self.write_expression(context, out, ast, *v),
            ", ",
        );
        out.push(')');
    }

    fn write_condition(&self, context: &mut Context, out: &mut String, ast: &Ast, id: CondId) {
        match ast.cond(id) {
            WhereNode::Relational { op, lhs, rhs } => {
                self.write_operand(context, out, ast, *lhs);
                match op {
                    RelationalOp::IsNull => out.push_str(" IS NULL"),
                    RelationalOp::IsNotNull => out.push_str(" IS NOT NULL"),
                    _ => {
                        self.write_relational_op(out, *op);
                        self.write_operand(context, out, ast, *rhs);
                    }
                }
            }
            WhereNode::LogicalNot(inner) => {
                out.push_str("NOT ");
                self.write_condition_operand(context, out, ast, *inner);
            }
            WhereNode::Conditional { op, lhs, rhs } => {
                self.write_condition_operand(context, out, ast, *lhs);
                out.push_str(match op {
                    ConditionalOp::And => " AND ",
                    ConditionalOp::Or => " OR ",
                });
                self.write_condition_operand(context, out, ast, *rhs);
            }
        }
    }

    /// Condition nested under AND, OR or NOT.
    fn write_condition_operand(
        &self,
        context: &mut Context,
        out: &mut String,
        ast: &Ast,
        id: CondId,
    ) {
        possibly_parenthesized!(
            out,
            ast.cond(id).complex(),
            self.write_condition(context, out, ast, id)
        );
    }

    fn write_relational_op(&self, out: &mut String, op: RelationalOp) {
        out.push_str(match op {
            RelationalOp::Equal => " = ",
            RelationalOp::NotEqual => " <> ",
            RelationalOp::Less => " < ",
            RelationalOp::LessEqual => " <= ",
            RelationalOp::Greater => " > ",
            RelationalOp::GreaterEqual => " >= ",
            RelationalOp::Like => " LIKE ",
            RelationalOp::IsNull => " IS NULL",
            RelationalOp::IsNotNull => " IS NOT NULL",
        });
    }

    fn write_join_type(&self, out: &mut String, join_type: JoinType) {
        out.push_str(match join_type {
            JoinType::Inner => "INNER JOIN ",
            JoinType::Outer => "LEFT OUTER JOIN ",
        });
    }

    /// Joined tables as one table expression, grouped when more than one.
    fn write_join_tables(&self, out: &mut String, tables: &[&Table]) {
        possibly_parenthesized!(
            out,
            tables.len() > 1,
            separated_by(
                out,
                tables,
                |out, v| self.write_identifier_quoted(out, v.name),
                " CROSS JOIN ",
            )
        );
    }

    /// `KIND JOIN tables ON condition`
    fn write_join(
        &self,
        context: &mut Context,
        out: &mut String,
        ast: &Ast,
        join_type: JoinType,
        tables: &[&Table],
        on: CondId,
    ) {
        self.write_join_type(out, join_type);
        self.write_join_tables(out, tables);
        out.push_str(" ON ");
        self.write_condition(context, out, ast, on);
    }

    fn write_limit_offset(&self, out: &mut String, limit: Option<u64>, offset: Option<u64>) {
        if let Some(limit) = limit {
            out.push_str("\nLIMIT ");
            write_integer!(out, limit);
        }
        if let Some(offset) = offset {
            out.push_str("\nOFFSET ");
            write_integer!(out, offset);
        }
    }

    /// Insert of a row without any explicit column.
    fn write_insert_default_values(&self, out: &mut String) {
        out.push_str(" DEFAULT VALUES");
    }

    /// Tail of an `UPDATE ... SET ...` restricted by joined tables.
    fn write_update_join(
        &self,
        _context: &mut Context,
        _out: &mut String,
        _ast: &Ast,
        _join_type: JoinType,
        _tables: &[&Table],
        _filter: CondId,
    ) -> Result<()> {
        Err(ErrorKind::Unsupported.error(format!(
            "Update with joined tables is not supported by {:?}",
            self.dialect()
        )))
    }

    /// Whole `DELETE` statement restricted by joined tables.
    fn write_delete_join(
        &self,
        _context: &mut Context,
        _out: &mut String,
        _ast: &Ast,
        _table: &Table,
        _join_type: JoinType,
        _tables: &[&Table],
        _filter: CondId,
    ) -> Result<()> {
        Err(ErrorKind::Unsupported.error(format!(
            "Delete with joined tables is not supported by {:?}",
            self.dialect()
        )))
    }

    /// `WHERE EXISTS(SELECT 1 FROM tables WHERE condition)`
    fn write_where_exists(
        &self,
        context: &mut Context,
        out: &mut String,
        ast: &Ast,
        tables: &[&Table],
        filter: CondId,
    ) {
        out.push_str("\nWHERE EXISTS(SELECT 1 FROM ");
        separated_by(
            out,
            tables,
            |out, v| self.write_identifier_quoted(out, v.name),
            ", ",
        );
        out.push_str(" WHERE ");
        self.write_condition(context, out, ast, filter);
        out.push(')');
    }

    /// Render the SQL type of a column.
    fn write_column_type(&self, out: &mut String, value: ScalarType) {
        out.push_str(match value {
            ScalarType::Boolean => "BOOLEAN",
            ScalarType::Int8 => "TINYINT",
            ScalarType::Int16 => "SMALLINT",
            ScalarType::Int32 => "INTEGER",
            ScalarType::Int64 => "BIGINT",
            ScalarType::UInt8 => "UTINYINT",
            ScalarType::UInt16 => "USMALLINT",
            ScalarType::UInt32 => "UINTEGER",
            ScalarType::UInt64 => "UBIGINT",
            ScalarType::Float32 => "FLOAT",
            ScalarType::Float64 => "DOUBLE",
            ScalarType::Decimal => "DECIMAL",
            ScalarType::Varchar => "VARCHAR",
            ScalarType::Blob => "BLOB",
            ScalarType::Date => "DATE",
            ScalarType::Time => "TIME",
            ScalarType::Timestamp => "TIMESTAMP",
            ScalarType::TimestampWithTimezone => "TIMESTAMPTZ",
            ScalarType::Uuid => "UUID",
        });
    }

    /// Auto incremented primary key column definition.
    fn write_primary_key_column(&self, _out: &mut String, field: &FieldDescriptor) -> Result<()> {
        Err(ErrorKind::Unsupported.error(format!(
            "Auto increment primary key `{}` is not supported by {:?}",
            field.name,
            self.dialect()
        )))
    }

    /// Whether `CREATE TABLE IF NOT EXISTS` is available.
    fn create_table_if_not_exists(&self) -> bool {
        true
    }

    /// Idempotent index creation statement.
    fn write_create_index(
        &self,
        out: &mut String,
        table: &Table,
        name: &str,
        fields: &[&FieldDescriptor],
        unique: bool,
    ) {
        out.push_str("CREATE ");
        if unique {
            out.push_str("UNIQUE ");
        }
        out.push_str("INDEX IF NOT EXISTS ");
        self.write_identifier_quoted(out, name);
        out.push_str(" ON ");
        self.write_identifier_quoted(out, table.name);
        self.write_index_columns(out, fields);
    }

    /// ` ("a", "b")`
    fn write_index_columns(&self, out: &mut String, fields: &[&FieldDescriptor]) {
        out.push_str(" (");
        separated_by(
            out,
            fields,
            |out, v| self.write_identifier_quoted(out, v.name),
            ", ",
        );
        out.push(')');
    }

    fn write_drop_table(&self, out: &mut String, table: &Table, if_exists: bool) {
        out.push_str("DROP TABLE ");
        if if_exists {
            out.push_str("IF EXISTS ");
        }
        self.write_identifier_quoted(out, table.name);
    }
}

/// Infix form of `op`. XOR and concatenation have none, they are rendered
/// whole by [`SqlWriter::write_binary_op`].
pub(crate) fn infix_symbol(op: BinaryOpType) -> &'static str {
    match op {
        BinaryOpType::Addition => " + ",
        BinaryOpType::Subtraction => " - ",
        BinaryOpType::Multiplication => " * ",
        BinaryOpType::Division => " / ",
        BinaryOpType::Remainder => " % ",
        BinaryOpType::BitwiseAnd => " & ",
        BinaryOpType::BitwiseOr => " | ",
        BinaryOpType::ShiftLeft => " << ",
        BinaryOpType::ShiftRight => " >> ",
        BinaryOpType::BitwiseXor | BinaryOpType::Concat => "",
    }
}
