use crate::{City, Person};
use stow::{Connector, ErrorKind, Filtered, JoinType, Order, Record, Transaction, error_kind};

fn populate(transaction: &Transaction<'_>) {
    let cities = City::storable().expect("Invalid City constraints");
    let persons = Person::storable().expect("Invalid Person constraints");
    persons
        .delete()
        .exec(transaction)
        .expect("Failed to clear Person");
    cities
        .delete()
        .exec(transaction)
        .expect("Failed to clear City");
    let mut rome = City::new("Rome");
    let mut paris = City::new("Paris");
    cities
        .insert_record(transaction, &mut rome)
        .expect("Failed to insert Rome");
    cities
        .insert_record(transaction, &mut paris)
        .expect("Failed to insert Paris");
    for (name, age, city) in [
        ("George", Some(31), &rome),
        ("Jack", Some(45), &rome),
        ("Georgia", None, &paris),
        ("Anna", Some(28), &paris),
    ] {
        persons
            .insert_record(transaction, &mut Person::new(name, age, city))
            .expect("Failed to insert a Person");
    }
}

fn city_field(name: &str) -> &'static stow::FieldDescriptor {
    City::table().field(name).expect("City has no such field")
}

/// `"Person"."cityId" = "City"."id" AND "City"."name" = <city>`
fn lives_in(ast: &mut stow::Ast, city: &str) -> stow::Result<stow::CondId> {
    let person_city = ast.column(Person::field("cityId"));
    let city_id = ast.column(city_field("id"));
    let on = ast.eq(person_city, city_id)?;
    let city_name = ast.column(city_field("name"));
    let value = ast.literal(city);
    let named = ast.eq(city_name, value)?;
    Ok(ast.and(on, named))
}

pub fn joins(connector: &Connector) {
    let persons = Person::storable().expect("Invalid Person constraints");
    let transaction = connector
        .create_transaction()
        .expect("Could not create a transaction");
    transaction.begin().expect("Could not begin the transaction");
    populate(&transaction);
    let mut person = Person::default();

    // Inner join select
    let mut select = persons.select();
    select
        .join(JoinType::Inner, City::table())
        .expect("Invalid join")
        .filter_with(|ast| lives_in(ast, "Rome"))
        .expect("Invalid filter")
        .order_by_field(Person::field("name"), Order::Ascending)
        .expect("Invalid order");
    let names: Vec<_> = select
        .exec(&transaction, &mut person)
        .expect("Failed to select the joined rows")
        .collect_rows()
        .expect("Failed to fetch the joined rows")
        .into_iter()
        .map(|v| v.name)
        .collect();
    assert_eq!(names, ["George", "Jack"]);

    // Outer join keeps every person
    let mut select = persons.select();
    select
        .join(JoinType::Outer, City::table())
        .expect("Invalid join")
        .filter_with(|ast| {
            let person_city = ast.column(Person::field("cityId"));
            let city_id = ast.column(city_field("id"));
            ast.eq(person_city, city_id)
        })
        .expect("Invalid filter");
    let rows = select
        .exec(&transaction, &mut person)
        .expect("Failed to select the outer joined rows")
        .collect_rows()
        .expect("Failed to fetch the outer joined rows");
    assert_eq!(rows.len(), 4);

    // A join needs its condition
    let mut select = persons.select();
    select
        .join(JoinType::Inner, City::table())
        .expect("Invalid join");
    let error = select
        .exec(&transaction, &mut person)
        .err()
        .expect("A join without filter must fail");
    assert_eq!(error_kind(&error), Some(ErrorKind::Usage));

    // Joined update
    let mut update = persons.update();
    let age = update.ast().literal(50);
    update
        .set(Person::field("age"), age)
        .expect("Invalid assignment")
        .join(JoinType::Inner, City::table())
        .expect("Invalid join")
        .filter_with(|ast| lives_in(ast, "Paris"))
        .expect("Invalid filter");
    assert_eq!(
        update
            .exec(&transaction)
            .expect("Failed to update the Paris residents"),
        2
    );
    let mut select = persons.select();
    select
        .filter_with(|ast| {
            let age = ast.column(Person::field("age"));
            let value = ast.literal(50);
            ast.eq(age, value)
        })
        .expect("Invalid filter")
        .order_by_field(Person::field("name"), Order::Ascending)
        .expect("Invalid order");
    let names: Vec<_> = select
        .exec(&transaction, &mut person)
        .expect("Failed to select the updated rows")
        .collect_rows()
        .expect("Failed to fetch the updated rows")
        .into_iter()
        .map(|v| v.name)
        .collect();
    assert_eq!(names, ["Anna", "Georgia"]);

    // Joined delete
    let mut delete = persons.delete();
    delete
        .join(JoinType::Inner, City::table())
        .expect("Invalid join")
        .filter_with(|ast| lives_in(ast, "Rome"))
        .expect("Invalid filter");
    assert_eq!(
        delete
            .exec(&transaction)
            .expect("Failed to delete the Rome residents"),
        2
    );
    let rows = persons
        .select()
        .exec(&transaction, &mut person)
        .expect("Failed to select")
        .collect_rows()
        .expect("Failed to fetch the rows");
    assert_eq!(rows.len(), 2);

    transaction.commit().expect("Failed to commit");
    transaction.close().expect("Failed to close the transaction");
}
