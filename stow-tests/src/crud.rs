use crate::{City, Person};
use stow::{AsValue, Connector, Filtered, Order};

pub fn crud(connector: &Connector) {
    let cities = City::storable().expect("Invalid City constraints");
    let persons = Person::storable().expect("Invalid Person constraints");

    let transaction = connector
        .create_transaction()
        .expect("Could not create a transaction");
    transaction.begin().expect("Could not begin the transaction");

    // Cleanup
    persons
        .delete()
        .exec(&transaction)
        .expect("Failed to clear Person");
    cities
        .delete()
        .exec(&transaction)
        .expect("Failed to clear City");

    // Generated keys
    let mut rome = City::new("Rome");
    cities
        .insert_record(&transaction, &mut rome)
        .expect("Failed to insert Rome");
    let mut paris = City::new("Paris");
    cities
        .insert_record(&transaction, &mut paris)
        .expect("Failed to insert Paris");
    assert!(rome.id > 0);
    assert!(paris.id > rome.id);

    // One prepared insert for many records
    let mut people = vec![
        Person::new("George", Some(31), &rome),
        Person::new("Georgia", None, &paris),
        Person::new("Jack", Some(45), &rome),
        Person::new("Anna", Some(28), &paris),
    ];
    let insert = persons.insert();
    let mut prepared = insert
        .prepare(&transaction)
        .expect("Failed to prepare the Person insert");
    for person in people.iter_mut() {
        prepared
            .step(person)
            .expect("Failed to insert a Person");
    }
    prepared.close().expect("Failed to close the insert");
    assert!(people.windows(2).all(|v| v[0].id < v[1].id));

    // Find
    let mut found = Person::default();
    assert!(
        persons
            .find(&transaction, people[0].id, &mut found)
            .expect("Failed to find George")
    );
    assert_eq!(found, people[0]);
    assert!(
        !persons
            .find(&transaction, people[3].id + 1000, &mut found)
            .expect("Failed to look for a missing Person")
    );

    // Whole record update
    people[1].age = Some(22);
    assert_eq!(
        persons
            .update_record(&transaction, &people[1])
            .expect("Failed to update Georgia"),
        1
    );
    persons
        .find(&transaction, people[1].id, &mut found)
        .expect("Failed to find Georgia");
    assert_eq!(found.age, Some(22));

    // Computed update
    let mut update = persons.update();
    let age = update.ast().column(Person::field("age"));
    let one = update.ast().literal(1);
    let older = update.ast().add(age, one).expect("Invalid addition");
    update
        .set(Person::field("age"), older)
        .expect("Invalid assignment");
    update
        .filter_with(|ast| ast.column_eq(Person::field("id"), people[0].id.as_value()))
        .expect("Invalid filter");
    assert_eq!(update.exec(&transaction).expect("Failed to age George"), 1);
    persons
        .find(&transaction, people[0].id, &mut found)
        .expect("Failed to find George");
    assert_eq!(found.age, Some(32));

    // Filtered and ordered select
    let mut select = persons.select();
    select
        .filter_with(|ast| {
            let name = ast.column(Person::field("name"));
            let pattern = ast.literal("Geo%");
            ast.like(name, pattern)
        })
        .expect("Invalid filter")
        .order_by_field(Person::field("name"), Order::Ascending)
        .expect("Invalid order");
    let mut person = Person::default();
    let names: Vec<_> = select
        .exec(&transaction, &mut person)
        .expect("Failed to select")
        .collect_rows()
        .expect("Failed to fetch the rows")
        .into_iter()
        .map(|v| v.name)
        .collect();
    assert_eq!(names, ["George", "Georgia"]);

    // Pagination
    let mut select = persons.select();
    select
        .order_by_field(Person::field("name"), Order::Descending)
        .expect("Invalid order")
        .limit(2)
        .offset(1);
    let names: Vec<_> = select
        .exec(&transaction, &mut person)
        .expect("Failed to select a page")
        .collect_rows()
        .expect("Failed to fetch the page")
        .into_iter()
        .map(|v| v.name)
        .collect();
    assert_eq!(names, ["Georgia", "George"]);

    // Deletes
    assert_eq!(
        persons
            .delete_record(&transaction, &people[3])
            .expect("Failed to delete Anna"),
        1
    );
    assert!(
        !persons
            .find(&transaction, people[3].id, &mut found)
            .expect("Failed to look for Anna")
    );
    let mut delete = persons.delete();
    delete
        .filter_with(|ast| {
            let age = ast.column(Person::field("age"));
            let limit = ast.literal(40);
            ast.gt(age, limit)
        })
        .expect("Invalid filter");
    assert_eq!(delete.exec(&transaction).expect("Failed to delete Jack"), 1);

    let rows = persons
        .select()
        .exec(&transaction, &mut person)
        .expect("Failed to select")
        .collect_rows()
        .expect("Failed to fetch the rows");
    assert_eq!(rows.len(), 2);
    assert!(rows.iter().all(|v| v.name != "Jack"));

    transaction.commit().expect("Failed to commit");
    transaction.close().expect("Failed to close the transaction");
}
