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

impl Record for City {
    fn table() -> &'static Table {
        &CITY
    }
    fn get(&self, index: usize) -> Value {
        match index {
            0 => self.id.as_value(),
            _ => self.name.clone().as_value(),
        }
    }
    fn set(&mut self, index: usize, value: Value) -> Result<()> {
        match index {
            0 => self.id = AsValue::try_from_value(value)?,
            1 => self.name = AsValue::try_from_value(value)?,
            _ => return Err(ErrorKind::Configuration.error("City has two fields")),
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

impl Record for Person {
    fn table() -> &'static Table {
        &PERSON
    }
    fn get(&self, index: usize) -> Value {
        match index {
            0 => self.id.as_value(),
            1 => self.name.clone().as_value(),
            2 => self.age.as_value(),
            _ => self.city_id.as_value(),
        }
    }
    fn set(&mut self, index: usize, value: Value) -> Result<()> {
        match index {
            0 => self.id = AsValue::try_from_value(value)?,
            1 => self.name = AsValue::try_from_value(value)?,
            2 => self.age = AsValue::try_from_value(value)?,
            3 => self.city_id = AsValue::try_from_value(value)?,
            _ => return Err(ErrorKind::Configuration.error("Person has four fields")),
        }
        Ok(())
    }
}

pub fn person(name: &str) -> &'static FieldDescriptor {
    Person::table().field(name).unwrap()
}

pub fn city(name: &str) -> &'static FieldDescriptor {
    City::table().field(name).unwrap()
}

pub fn persons() -> Storable<Person> {
    Storable::new(vec![
        Constraint::primary_key(person("id")),
        Constraint::foreign_key(person("cityId"), city("id")),
    ])
    .unwrap()
}

pub fn cities() -> Storable<City> {
    Storable::new(vec![
        Constraint::primary_key(city("id")),
        Constraint::unique([city("name")]),
    ])
    .unwrap()
}
