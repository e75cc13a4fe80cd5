use crate::Note;
use stow::{Connector, ErrorKind, Filtered, Order, Record, error_kind};

pub fn result_sets(connector: &Connector) {
    let notes = Note::storable().expect("Invalid Note constraints");
    let id = Note::table().field("id").expect("Note has no id");
    let transaction = connector
        .create_transaction()
        .expect("Could not create a transaction");
    transaction.begin().expect("Could not begin the transaction");
    notes
        .delete()
        .exec(&transaction)
        .expect("Failed to clear Note");
    let mut note = Note::default();

    // Empty
    {
        let mut select = notes.select();
        select
            .filter_with(|ast| ast.column_eq(id, (-1i64).into()))
            .expect("Invalid filter");
        let mut rows = select
            .exec(&transaction, &mut note)
            .expect("Failed to select");
        let begin = rows.begin().expect("Failed to begin the result set");
        assert_eq!(begin, rows.end());
        let error = rows.begin().expect_err("A result set begins only once");
        assert_eq!(error_kind(&error), Some(ErrorKind::Usage));
    }

    let insert = notes.insert();
    let mut prepared = insert
        .prepare(&transaction)
        .expect("Failed to prepare the Note insert");
    for text in ["alpha", "bravo", "charlie"] {
        prepared
            .step(&mut Note {
                id: 0,
                text: text.into(),
            })
            .expect("Failed to insert a Note");
    }
    prepared.close().expect("Failed to close the insert");

    // Iteration
    {
        let mut select = notes.select();
        select
            .order_by_field(id, Order::Ascending)
            .expect("Invalid order");
        let mut rows = select
            .exec(&transaction, &mut note)
            .expect("Failed to select");
        #[cfg(not(feature = "disable-size"))]
        assert_eq!(rows.size().expect("Failed to get the size"), Some(3));
        let end = rows.end();
        let mut it = rows.begin().expect("Failed to begin the result set");
        let first = it;
        let mut texts = Vec::new();
        while it != end {
            texts.push(rows.record().text.clone());
            rows.increment(&mut it).expect("Failed to fetch the next row");
        }
        assert_eq!(texts, ["alpha", "bravo", "charlie"]);
        assert_eq!(first.row(), Some(0));
        assert!(it.is_end());

        // Past the end stays at the end
        rows.increment(&mut it).expect("Incrementing the end must succeed");
        assert!(it.is_end());

        let mut stale = first;
        let error = rows
            .increment(&mut stale)
            .expect_err("A stale iterator cannot move");
        assert_eq!(error_kind(&error), Some(ErrorKind::Usage));
        rows.close().expect("Failed to close the result set");
    }
    assert_eq!(transaction.open_statements().expect("Closed"), 0);

    transaction.commit().expect("Failed to commit");
    transaction.close().expect("Failed to close the transaction");
}
