use crate::{
    Constraint, Delete, ErrorKind, FieldDescriptor, Filtered, Insert, Record, Result,
    SchemaGenerator, Select, Table, Transaction, Update, Value, error_kind, writer::Dialect,
};
use std::marker::PhantomData;

/// A record type bound to its constraints, entry point of every statement.
pub struct Storable<R: Record> {
    constraints: Vec<Constraint>,
    primary_key: Option<usize>,
    _record: PhantomData<fn() -> R>,
}

impl<R: Record> Storable<R> {
    /// Validate the constraints against the record table.
    pub fn new(constraints: Vec<Constraint>) -> Result<Self> {
        let table = R::table();
        if table.is_empty() {
            return Err(ErrorKind::Configuration
                .error(format!("Table `{}` does not have any field", table.name)));
        }
        let mut primary_key = None;
        for constraint in &constraints {
            constraint.validate(table)?;
            if let Constraint::PrimaryKey(field) = constraint {
                if primary_key.is_some() {
                    return Err(ErrorKind::Configuration.error(format!(
                        "Table `{}` declares more than one primary key",
                        table.name
                    )));
                }
                primary_key = table.position(field.name);
            }
        }
        Ok(Self {
            constraints,
            primary_key,
            _record: PhantomData,
        })
    }

    pub fn table(&self) -> &'static Table {
        R::table()
    }

    pub fn constraints(&self) -> &[Constraint] {
        &self.constraints
    }

    pub fn primary_key(&self) -> Option<&'static FieldDescriptor> {
        self.primary_key.and_then(|i| R::table().at(i))
    }

    pub fn select(&self) -> Select {
        Select::new(R::table())
    }

    pub fn insert(&self) -> Insert {
        Insert::new(R::table(), self.primary_key)
    }

    pub fn update(&self) -> Update {
        Update::new(R::table(), self.primary_key)
    }

    pub fn delete(&self) -> Delete {
        Delete::new(R::table(), self.primary_key)
    }

    pub fn schema<'a>(&'a self, dialect: Dialect) -> SchemaGenerator<'a> {
        SchemaGenerator::new(dialect.sql_writer(), R::table(), &self.constraints)
    }

    /// Load the row with primary key `key` into `record`, false if missing.
    pub fn find(
        &self,
        transaction: &Transaction<'_>,
        key: impl Into<Value>,
        record: &mut R,
    ) -> Result<bool> {
        let Some(pk) = self.primary_key() else {
            return Err(ErrorKind::Configuration.error(format!(
                "Cannot find a `{}` record without a primary key",
                R::table().name
            )));
        };
        let key: Value = key.into();
        let key = key.convert_to(pk.scalar_type)?;
        let mut select = self.select();
        select.filter_with(|ast| ast.column_eq(pk, key))?;
        let mut rows = select.exec(transaction, record)?;
        let found = rows.next_row()?;
        rows.close()?;
        Ok(found)
    }

    pub fn insert_record(&self, transaction: &Transaction<'_>, record: &mut R) -> Result<()> {
        self.insert().exec(transaction, record)
    }

    pub fn update_record(&self, transaction: &Transaction<'_>, record: &R) -> Result<u64> {
        self.update().exec_row(transaction, record)
    }

    pub fn delete_record(&self, transaction: &Transaction<'_>, record: &R) -> Result<u64> {
        self.delete().exec_row(transaction, record)
    }

    /// Create the table if missing, then its indexes.
    ///
    /// MySQL has no `CREATE TABLE IF NOT EXISTS` for this flow: a failure
    /// reporting an existing table skips the index creation instead.
    pub fn create_table(&self, transaction: &Transaction<'_>) -> Result<()> {
        let schema = self.schema(transaction.dialect());
        let sql = schema.create_table()?;
        if let Err(e) = transaction.execute_batch(&sql) {
            if transaction.dialect() == Dialect::MySql && already_exists(&e) {
                log::debug!("Table `{}` already exists, skipping indexes", R::table().name);
                return Ok(());
            }
            return Err(e);
        }
        for index in schema.create_indexes() {
            transaction.execute_batch(&index)?;
        }
        Ok(())
    }

    pub fn drop_table(&self, transaction: &Transaction<'_>) -> Result<()> {
        let sql = self.schema(transaction.dialect()).drop_table(true);
        transaction.execute_batch(&sql)
    }
}

/// MySQL error 1050, "Table already exists", reported by the backend itself.
fn already_exists(error: &crate::Error) -> bool {
    if error_kind(error) != Some(ErrorKind::Backend) {
        return false;
    }
    // Statement text attached by the transaction is not part of the server message.
    error
        .chain()
        .map(|e| e.to_string())
        .filter(|m| !m.starts_with("While executing: "))
        .any(|m| {
            // The server code is the first number of its message.
            m.split(|c: char| !c.is_ascii_alphanumeric())
                .find(|token| !token.is_empty() && token.bytes().all(|b| b.is_ascii_digit()))
                == Some("1050")
        })
}
