use crate::{City, Note, Person};
use stow::Connector;

pub fn schema(connector: &Connector) {
    let cities = City::storable().expect("Invalid City constraints");
    let persons = Person::storable().expect("Invalid Person constraints");
    let notes = Note::storable().expect("Invalid Note constraints");

    let transaction = connector
        .create_transaction()
        .expect("Could not create a transaction");
    transaction.begin().expect("Could not begin the transaction");

    // Referencing tables go first
    persons
        .drop_table(&transaction)
        .expect("Failed to drop the Person table");
    cities
        .drop_table(&transaction)
        .expect("Failed to drop the City table");
    notes
        .drop_table(&transaction)
        .expect("Failed to drop the Note table");

    cities
        .create_table(&transaction)
        .expect("Failed to create the City table");
    cities
        .create_table(&transaction)
        .expect("Creating City again, unique index included, must succeed");
    persons
        .create_table(&transaction)
        .expect("Failed to create the Person table");
    notes
        .create_table(&transaction)
        .expect("Failed to create the Note table");

    transaction
        .commit()
        .expect("Failed to commit the schema transaction");
    transaction.close().expect("Failed to close the transaction");
}
