use crate::Note;
use stow::{
    Connector, Custom, ErrorKind, Record, StatementKind, TransactionState, error_kind,
};

fn insert_note(connector: &Connector, text: &str) -> Note {
    let mut note = Note {
        id: 0,
        text: text.into(),
    };
    let notes = Note::storable().expect("Invalid Note constraints");
    let transaction = connector
        .create_transaction()
        .expect("Could not create a transaction");
    transaction.begin().expect("Could not begin the transaction");
    notes
        .insert_record(&transaction, &mut note)
        .expect("Failed to insert a Note");
    transaction.commit().expect("Failed to commit");
    transaction.close().expect("Failed to close the transaction");
    note
}

pub(crate) fn exists(connector: &Connector, id: i64) -> bool {
    let notes = Note::storable().expect("Invalid Note constraints");
    let transaction = connector
        .create_transaction()
        .expect("Could not create a transaction");
    let mut note = Note::default();
    let found = notes
        .find(&transaction, id, &mut note)
        .expect("Failed to find the Note");
    transaction.close().expect("Failed to close the transaction");
    found
}

pub fn transactions(connector: &Connector) {
    let notes = Note::storable().expect("Invalid Note constraints");

    // State machine
    let transaction = connector
        .create_transaction()
        .expect("Could not create a transaction");
    assert_eq!(transaction.state().unwrap(), TransactionState::Created);
    let error = transaction
        .commit()
        .expect_err("Commit requires a started transaction");
    assert_eq!(error_kind(&error), Some(ErrorKind::Usage));
    transaction.begin().expect("Could not begin the transaction");
    let error = transaction
        .begin()
        .expect_err("A transaction cannot begin twice");
    assert_eq!(error_kind(&error), Some(ErrorKind::Usage));
    transaction.commit().expect("Failed to commit");
    assert_eq!(transaction.state().unwrap(), TransactionState::Committed);
    let error = transaction
        .rollback()
        .expect_err("Rollback requires a started transaction");
    assert_eq!(error_kind(&error), Some(ErrorKind::Usage));

    // Statements must be prepared before running
    let statement = transaction
        .statement(StatementKind::Custom, "SELECT 1", Vec::new())
        .expect("Failed to create the statement");
    let error = transaction
        .execute(&statement)
        .expect_err("An unprepared statement cannot run");
    assert_eq!(error_kind(&error), Some(ErrorKind::Usage));
    transaction
        .close_statement(statement)
        .expect("Failed to close the statement");
    transaction.close().expect("Failed to close the transaction");

    // Rollback discards
    let mut note = Note {
        id: 0,
        text: "discarded".into(),
    };
    let transaction = connector
        .create_transaction()
        .expect("Could not create a transaction");
    transaction.begin().expect("Could not begin the transaction");
    notes
        .insert_record(&transaction, &mut note)
        .expect("Failed to insert a Note");
    transaction.rollback().expect("Failed to rollback");
    transaction.close().expect("Failed to close the transaction");
    assert!(!exists(connector, note.id));

    // Closing a started transaction applies the default policy, rollback
    let transaction = connector
        .create_transaction()
        .expect("Could not create a transaction");
    transaction.begin().expect("Could not begin the transaction");
    notes
        .insert_record(&transaction, &mut note)
        .expect("Failed to insert a Note");
    transaction.close().expect("Failed to close the transaction");
    assert!(!exists(connector, note.id));

    // Commit persists
    let note = insert_note(connector, "kept");
    assert!(exists(connector, note.id));

    // Pass through statement
    let transaction = connector
        .create_transaction()
        .expect("Could not create a transaction");
    transaction.begin().expect("Could not begin the transaction");
    let writer = transaction.sql_writer();
    let mut sql = String::from("DELETE FROM ");
    writer.write_identifier_quoted(&mut sql, Note::table().name);
    sql.push_str(" WHERE ");
    writer.write_identifier_quoted(&mut sql, "id");
    sql.push_str(" = ");
    writer.write_placeholder(&mut sql, 1);
    assert_eq!(
        Custom::new(sql)
            .bind(note.id)
            .exec(&transaction)
            .expect("Failed to run the custom delete"),
        1
    );
    transaction.commit().expect("Failed to commit");
    transaction.close().expect("Failed to close the transaction");
    assert!(!exists(connector, note.id));
}
