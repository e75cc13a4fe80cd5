mod context;
mod generic;
mod mysql;
mod postgres;
mod sql_writer;
mod sqlite;

pub use context::*;
pub use generic::*;
pub use mysql::*;
pub use postgres::*;
pub use sql_writer::*;
pub use sqlite::*;

use crate::{Ast, CondId, ExprId, Result, Value};

/// SQL syntax variant targeted by the generated text.
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dialect {
    Sqlite,
    Postgres,
    MySql,
    MsSql,
    Firebird,
    Oracle,
    #[default]
    Unknown,
}

static SQLITE: SqliteSqlWriter = SqliteSqlWriter::new();
static POSTGRES: PostgresSqlWriter = PostgresSqlWriter::new();
static MYSQL: MySqlSqlWriter = MySqlSqlWriter::new();
static MSSQL: GenericSqlWriter = GenericSqlWriter::new(Dialect::MsSql);
static FIREBIRD: GenericSqlWriter = GenericSqlWriter::new(Dialect::Firebird);
static ORACLE: GenericSqlWriter = GenericSqlWriter::new(Dialect::Oracle);
static UNKNOWN: GenericSqlWriter = GenericSqlWriter::new(Dialect::Unknown);

impl Dialect {
    pub fn sql_writer(self) -> &'static dyn SqlWriter {
        match self {
            Dialect::Sqlite => &SQLITE,
            Dialect::Postgres => &POSTGRES,
            Dialect::MySql => &MYSQL,
            Dialect::MsSql => &MSSQL,
            Dialect::Firebird => &FIREBIRD,
            Dialect::Oracle => &ORACLE,
            Dialect::Unknown => &UNKNOWN,
        }
    }
}

/// Text and bound literals produced for one AST fragment.
#[derive(Default, Debug, Clone, PartialEq)]
pub struct Generated {
    pub text: String,
    pub literals: Vec<Value>,
}

/// Generates SQL for single expressions or conditions.
///
/// `start_literal_index` offsets the placeholder numbering so that the
/// output can be spliced after other bound fragments of the same statement.
#[derive(Clone, Copy)]
pub struct CodeGenerator<'w> {
    writer: &'w dyn SqlWriter,
    qualified: bool,
    start_literal_index: usize,
}

impl<'w> CodeGenerator<'w> {
    pub fn new(writer: &'w dyn SqlWriter, qualified: bool) -> Self {
        Self {
            writer,
            qualified,
            start_literal_index: 0,
        }
    }

    pub fn starting_at(mut self, start_literal_index: usize) -> Self {
        self.start_literal_index = start_literal_index;
        self
    }

    /// Usage error when `id` was created by another arena.
    pub fn expression(&self, ast: &Ast, id: ExprId) -> Result<Generated> {
        ast.check_expr(id)?;
        let mut context = Context::starting_at(self.qualified, self.start_literal_index);
        let mut text = String::new();
        self.writer.write_expression(&mut context, &mut text, ast, id);
        Ok(Generated {
            text,
            literals: context.literals,
        })
    }

    pub fn condition(&self, ast: &Ast, id: CondId) -> Result<Generated> {
        ast.check_cond(id)?;
        let mut context = Context::starting_at(self.qualified, self.start_literal_index);
        let mut text = String::new();
        self.writer.write_condition(&mut context, &mut text, ast, id);
        Ok(Generated {
            text,
            literals: context.literals,
        })
    }
}
