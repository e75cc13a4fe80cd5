use crate::{ErrorKind, Result, ScalarType, Value};

/// Whether a column must be provided on insert.
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mandatoriness {
    #[default]
    Required,
    Optional,
    /// The database fills it with the declared default.
    Defaultable,
}

/// Column descriptor supplied by the record catalog.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldDescriptor {
    /// Owning table, filled by [`Table::new`].
    pub table: &'static str,
    pub name: &'static str,
    pub scalar_type: ScalarType,
    pub nullable: bool,
    pub mandatoriness: Mandatoriness,
    pub default: Option<Value>,
}

impl FieldDescriptor {
    pub fn new(name: &'static str, scalar_type: ScalarType) -> Self {
        Self {
            table: "",
            name,
            scalar_type,
            nullable: false,
            mandatoriness: Mandatoriness::Required,
            default: None,
        }
    }
    pub fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }
    pub fn optional(mut self) -> Self {
        self.mandatoriness = Mandatoriness::Optional;
        self
    }
    pub fn defaultable(mut self, value: impl Into<Value>) -> Self {
        self.mandatoriness = Mandatoriness::Defaultable;
        self.default = Some(value.into());
        self
    }
}

/// Ordered set of fields belonging to one table.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    pub name: &'static str,
    fields: Vec<FieldDescriptor>,
}

impl Table {
    pub fn new(name: &'static str, fields: impl IntoIterator<Item = FieldDescriptor>) -> Self {
        Self {
            name,
            fields: fields
                .into_iter()
                .map(|mut v| {
                    v.table = name;
                    v
                })
                .collect(),
        }
    }
    pub fn fields(&self) -> &[FieldDescriptor] {
        &self.fields
    }
    pub fn len(&self) -> usize {
        self.fields.len()
    }
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
    pub fn position(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|v| v.name == name)
    }
    pub fn at(&self, offset: usize) -> Option<&FieldDescriptor> {
        self.fields.get(offset)
    }
    /// Lookup by name, a missing field is a configuration error.
    pub fn field(&self, name: &str) -> Result<&FieldDescriptor> {
        self.fields.iter().find(|v| v.name == name).ok_or_else(|| {
            ErrorKind::Configuration.error(format!(
                "Table `{}` has no field named `{}`",
                self.name, name
            ))
        })
    }
}

/// Accessor over a record instance, indexed by field offset in its [`Table`].
pub trait Record {
    fn table() -> &'static Table
    where
        Self: Sized;
    fn get(&self, index: usize) -> Value;
    fn set(&mut self, index: usize, value: Value) -> Result<()>;
}

/// Destination of the cells fetched by a backend.
pub trait RowWriter {
    /// Offset and type of the field receiving the column `name`, if any.
    fn target(&self, name: &str) -> Option<(usize, ScalarType)>;
    /// Store a value already converted into the target type.
    fn write(&mut self, index: usize, value: Value) -> Result<()>;
}

/// [`RowWriter`] storing into a record.
pub struct RecordWriter<'a, R: Record> {
    record: &'a mut R,
}

impl<'a, R: Record> RecordWriter<'a, R> {
    pub fn new(record: &'a mut R) -> Self {
        Self { record }
    }
}

impl<'a, R: Record> RowWriter for RecordWriter<'a, R> {
    fn target(&self, name: &str) -> Option<(usize, ScalarType)> {
        let table = R::table();
        table
            .position(name)
            .map(|i| (i, table.fields()[i].scalar_type))
    }
    fn write(&mut self, index: usize, value: Value) -> Result<()> {
        self.record.set(index, value)
    }
}
