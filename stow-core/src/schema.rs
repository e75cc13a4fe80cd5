use crate::{
    Ast, CondId, ErrorKind, FieldDescriptor, Mandatoriness, Result, Table,
    writer::{Context, SqlWriter},
};
use std::collections::BTreeSet;

/// Table constraint, validated against its owning table by [`Constraint::validate`].
#[derive(Debug, Clone, PartialEq)]
pub enum Constraint {
    /// Auto incremented integral key.
    PrimaryKey(&'static FieldDescriptor),
    ForeignKey {
        field: &'static FieldDescriptor,
        references: &'static FieldDescriptor,
    },
    Index {
        fields: Vec<&'static FieldDescriptor>,
        unique: bool,
    },
    Check {
        ast: Ast,
        condition: CondId,
    },
}

impl Constraint {
    pub fn primary_key(field: &'static FieldDescriptor) -> Self {
        Constraint::PrimaryKey(field)
    }

    pub fn foreign_key(
        field: &'static FieldDescriptor,
        references: &'static FieldDescriptor,
    ) -> Self {
        Constraint::ForeignKey { field, references }
    }

    pub fn index(fields: impl IntoIterator<Item = &'static FieldDescriptor>) -> Self {
        Constraint::Index {
            fields: fields.into_iter().collect(),
            unique: false,
        }
    }

    pub fn unique(fields: impl IntoIterator<Item = &'static FieldDescriptor>) -> Self {
        Constraint::Index {
            fields: fields.into_iter().collect(),
            unique: true,
        }
    }

    /// Build the checked condition in its own arena.
    pub fn check(f: impl FnOnce(&mut Ast) -> Result<CondId>) -> Result<Self> {
        let mut ast = Ast::new();
        let condition = f(&mut ast)?;
        ast.check_cond(condition)?;
        Ok(Constraint::Check { ast, condition })
    }

    /// Tables whose columns the constraint is declared on.
    pub fn tables(&self) -> BTreeSet<&'static str> {
        match self {
            Constraint::PrimaryKey(field) | Constraint::ForeignKey { field, .. } => {
                BTreeSet::from([field.table])
            }
            Constraint::Index { fields, .. } => fields.iter().map(|v| v.table).collect(),
            Constraint::Check { ast, condition } => ast.referenced_tables(*condition),
        }
    }

    /// Fails unless every column belongs to `table`.
    pub fn validate(&self, table: &Table) -> Result<()> {
        if let Constraint::Index { fields, .. } = self {
            if fields.is_empty() {
                return Err(ErrorKind::Configuration
                    .error(format!("Index on `{}` without any field", table.name)));
            }
        }
        let foreign = self
            .tables()
            .into_iter()
            .find(|v| *v != table.name);
        if let Some(foreign) = foreign {
            return Err(ErrorKind::Configuration.error(format!(
                "Constraint {:?} of table `{}` references the foreign table `{}`",
                self.kind(),
                table.name,
                foreign
            )));
        }
        let fields: Vec<&FieldDescriptor> = match self {
            Constraint::PrimaryKey(field) | Constraint::ForeignKey { field, .. } => vec![*field],
            Constraint::Index { fields, .. } => fields.clone(),
            Constraint::Check { .. } => Vec::new(),
        };
        for field in fields {
            if table.position(field.name).is_none() {
                return Err(ErrorKind::Configuration.error(format!(
                    "Table `{}` has no field `{}`",
                    table.name, field.name
                )));
            }
        }
        Ok(())
    }

    fn kind(&self) -> &'static str {
        match self {
            Constraint::PrimaryKey(..) => "PrimaryKey",
            Constraint::ForeignKey { .. } => "ForeignKey",
            Constraint::Index { .. } => "Index",
            Constraint::Check { .. } => "Check",
        }
    }
}

/// DDL text for one table and its constraints.
pub struct SchemaGenerator<'a> {
    writer: &'a dyn SqlWriter,
    table: &'a Table,
    constraints: &'a [Constraint],
}

impl<'a> SchemaGenerator<'a> {
    pub fn new(writer: &'a dyn SqlWriter, table: &'a Table, constraints: &'a [Constraint]) -> Self {
        Self {
            writer,
            table,
            constraints,
        }
    }

    fn primary_key(&self) -> Option<&'static FieldDescriptor> {
        self.constraints.iter().find_map(|v| match v {
            Constraint::PrimaryKey(field) => Some(*field),
            _ => None,
        })
    }

    pub fn create_table(&self) -> Result<String> {
        if self.table.is_empty() {
            return Err(ErrorKind::Configuration
                .error(format!("Table `{}` does not have any field", self.table.name)));
        }
        let writer = self.writer;
        let mut context = Context::new(false);
        let mut out = String::with_capacity(128 + self.table.len() * 48);
        out.push_str("CREATE TABLE ");
        if writer.create_table_if_not_exists() {
            out.push_str("IF NOT EXISTS ");
        }
        writer.write_identifier_quoted(&mut out, self.table.name);
        out.push_str(" (\n");
        let primary_key = self.primary_key();
        for (i, field) in self.table.fields().iter().enumerate() {
            if i > 0 {
                out.push_str(",\n");
            }
            if primary_key.is_some_and(|v| v.name == field.name) {
                writer.write_primary_key_column(&mut out, field)?;
                continue;
            }
            writer.write_identifier_quoted(&mut out, field.name);
            out.push(' ');
            writer.write_column_type(&mut out, field.scalar_type);
            if !field.nullable {
                out.push_str(" NOT NULL");
            }
            if field.mandatoriness == Mandatoriness::Defaultable {
                if let Some(default) = &field.default {
                    out.push_str(" DEFAULT ");
                    writer.write_literal(&mut context, &mut out, default);
                }
            }
            for constraint in self.constraints {
                if let Constraint::ForeignKey {
                    field: owner,
                    references,
                } = constraint
                {
                    if owner.name == field.name {
                        out.push_str(" REFERENCES ");
                        writer.write_identifier_quoted(&mut out, references.table);
                        out.push('(');
                        writer.write_identifier_quoted(&mut out, references.name);
                        out.push(')');
                    }
                }
            }
        }
        for constraint in self.constraints {
            if let Constraint::Check { ast, condition } = constraint {
                out.push_str(",\nCHECK (");
                writer.write_condition(&mut context, &mut out, ast, *condition);
                out.push(')');
            }
        }
        out.push_str("\n)");
        Ok(out)
    }

    /// One statement per index, each idempotent.
    pub fn create_indexes(&self) -> Vec<String> {
        self.constraints
            .iter()
            .filter_map(|v| match v {
                Constraint::Index { fields, unique } => {
                    let mut out = String::with_capacity(128);
                    self.writer.write_create_index(
                        &mut out,
                        self.table,
                        &index_name(self.table, fields),
                        fields,
                        *unique,
                    );
                    Some(out)
                }
                _ => None,
            })
            .collect()
    }

    pub fn drop_table(&self, if_exists: bool) -> String {
        let mut out = String::with_capacity(64);
        self.writer.write_drop_table(&mut out, self.table, if_exists);
        out
    }
}

/// `<table>_<field>[_<field>]_idx`
pub fn index_name(table: &Table, fields: &[&FieldDescriptor]) -> String {
    let mut result = String::from(table.name);
    for field in fields {
        result.push('_');
        result.push_str(field.name);
    }
    result.push_str("_idx");
    result
}
