use std::sync::LazyLock;
use stow::{
    AsValue, Constraint, ErrorKind, FieldDescriptor, Record, Result, ScalarType, Storable, Table,
    Value,
};

#[derive(Default, Debug, Clone, PartialEq)]
pub struct City {
    pub id: i32,
    pub name: String,
}

static CITY: LazyLock<Table> = LazyLock::new(|| {
    Table::new(
        "City",
        [
            FieldDescriptor::new("id", ScalarType::Int32),
            FieldDescriptor::new("name", ScalarType::Varchar),
        ],
    )
});

impl City {
    pub fn new(name: &str) -> Self {
        Self {
            id: 0,
            name: name.into(),
        }
    }

    pub fn storable() -> Result<Storable<City>> {
        let table = City::table();
        Storable::new(vec![
            Constraint::primary_key(table.field("id")?),
            Constraint::unique([table.field("name")?]),
        ])
    }
}

impl Record for City {
    fn table() -> &'static Table {
        &CITY
    }
    fn get(&self, index: usize) -> Value {
        match index {
            0 => self.id.as_value(),
            1 => self.name.clone().as_value(),
            _ => Value::Varchar(None),
        }
    }
    fn set(&mut self, index: usize, value: Value) -> Result<()> {
        match index {
            0 => self.id = AsValue::try_from_value(value)?,
            1 => self.name = AsValue::try_from_value(value)?,
            _ => return Err(out_of_range("City", index)),
        }
        Ok(())
    }
}

#[derive(Default, Debug, Clone, PartialEq)]
pub struct Person {
    pub id: i32,
    pub name: String,
    pub age: Option<i32>,
    pub city_id: i32,
}

static PERSON: LazyLock<Table> = LazyLock::new(|| {
    Table::new(
        "Person",
        [
            FieldDescriptor::new("id", ScalarType::Int32),
            FieldDescriptor::new("name", ScalarType::Varchar),
            FieldDescriptor::new("age", ScalarType::Int32)
                .nullable()
                .optional(),
            FieldDescriptor::new("cityId", ScalarType::Int32),
        ],
    )
});

impl Person {
    pub fn new(name: &str, age: Option<i32>, city: &City) -> Self {
        Self {
            id: 0,
            name: name.into(),
            age,
            city_id: city.id,
        }
    }

    pub fn storable() -> Result<Storable<Person>> {
        let table = Person::table();
        Storable::new(vec![
            Constraint::primary_key(table.field("id")?),
            Constraint::foreign_key(table.field("cityId")?, City::table().field("id")?),
            Constraint::index([table.field("name")?]),
            Constraint::check(|ast| {
                let age = ast.column(table.field("age")?);
                let zero = ast.literal(0);
                let positive = ast.ge(age, zero)?;
                let missing = ast.is_null(age);
                Ok(ast.or(missing, positive))
            })?,
        ])
    }

    pub fn field(name: &str) -> &'static FieldDescriptor {
        Person::table()
            .field(name)
            .expect("Person has no such field")
    }
}

impl Record for Person {
    fn table() -> &'static Table {
        &PERSON
    }
    fn get(&self, index: usize) -> Value {
        match index {
            0 => self.id.as_value(),
            1 => self.name.clone().as_value(),
            2 => self.age.as_value(),
            3 => self.city_id.as_value(),
            _ => Value::Varchar(None),
        }
    }
    fn set(&mut self, index: usize, value: Value) -> Result<()> {
        match index {
            0 => self.id = AsValue::try_from_value(value)?,
            1 => self.name = AsValue::try_from_value(value)?,
            2 => self.age = AsValue::try_from_value(value)?,
            3 => self.city_id = AsValue::try_from_value(value)?,
            _ => return Err(out_of_range("Person", index)),
        }
        Ok(())
    }
}

/// Single column table used by the connector level tests.
#[derive(Default, Debug, Clone, PartialEq)]
pub struct Note {
    pub id: i64,
    pub text: String,
}

static NOTE: LazyLock<Table> = LazyLock::new(|| {
    Table::new(
        "Note",
        [
            FieldDescriptor::new("id", ScalarType::Int64),
            FieldDescriptor::new("text", ScalarType::Varchar),
        ],
    )
});

impl Note {
    pub fn storable() -> Result<Storable<Note>> {
        Storable::new(vec![Constraint::primary_key(Note::table().field("id")?)])
    }
}

impl Record for Note {
    fn table() -> &'static Table {
        &NOTE
    }
    fn get(&self, index: usize) -> Value {
        match index {
            0 => self.id.as_value(),
            1 => self.text.clone().as_value(),
            _ => Value::Varchar(None),
        }
    }
    fn set(&mut self, index: usize, value: Value) -> Result<()> {
        match index {
            0 => self.id = AsValue::try_from_value(value)?,
            1 => self.text = AsValue::try_from_value(value)?,
            _ => return Err(out_of_range("Note", index)),
        }
        Ok(())
    }
}

fn out_of_range(table: &str, index: usize) -> stow::Error {
    ErrorKind::Configuration.error(format!("`{}` has no field at offset {}", table, index))
}
