use crate::{Note, transactions::exists, with_params};
use std::{
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
    thread,
    time::Duration,
};
use stow::{Backend, Connector, ErrorKind, error_kind};

/// With every connection taken, the next transaction waits for one to be closed.
pub fn pool_blocking(backend: Arc<dyn Backend>, url: &str) {
    let connector = Connector::new("pool", backend, &with_params(url, "pool_size=2"))
        .expect("Could not create the connector");
    let error = connector
        .create_transaction()
        .err()
        .expect("A transaction requires a connected connector");
    assert_eq!(error_kind(&error), Some(ErrorKind::Usage));
    connector.connect().expect("Could not connect");
    assert_eq!(connector.pool_size().unwrap(), 2);

    let first = connector
        .create_transaction()
        .expect("Could not create the first transaction");
    let second = connector
        .create_transaction()
        .expect("Could not create the second transaction");
    let acquired = AtomicBool::new(false);
    thread::scope(|s| {
        let waiter = s.spawn(|| {
            let third = connector
                .create_transaction()
                .expect("The third transaction must get the freed connection");
            acquired.store(true, Ordering::SeqCst);
            third.close().expect("Failed to close the third transaction");
        });
        thread::sleep(Duration::from_millis(200));
        assert!(!acquired.load(Ordering::SeqCst));
        first.close().expect("Failed to close the first transaction");
        waiter.join().expect("The waiting thread panicked");
        assert!(acquired.load(Ordering::SeqCst));
    });
    second.close().expect("Failed to close the second transaction");
    connector.disconnect().expect("Could not disconnect");
}

/// Waiting longer than the pool timeout fails.
pub fn pool_exhausted(backend: Arc<dyn Backend>, url: &str) {
    let connector = Connector::new(
        "exhausted",
        backend,
        &with_params(url, "pool_size=1&pool_timeout_ms=100"),
    )
    .expect("Could not create the connector");
    connector.connect().expect("Could not connect");
    let first = connector
        .create_transaction()
        .expect("Could not create the first transaction");
    let error = connector
        .create_transaction()
        .err()
        .expect("The pool has a single connection");
    assert_eq!(error_kind(&error), Some(ErrorKind::PoolExhausted));
    let error = connector
        .disconnect()
        .expect_err("Cannot disconnect with open transactions");
    assert_eq!(error_kind(&error), Some(ErrorKind::Usage));
    first.close().expect("Failed to close the transaction");
    connector
        .create_transaction()
        .expect("The connection is free again")
        .close()
        .expect("Failed to close the transaction");
}

/// Resolution of transactions closed while still started.
pub fn transaction_policies(backend: Arc<dyn Backend>, url: &str) {
    let notes = Note::storable().expect("Invalid Note constraints");

    let connector = Connector::new(
        "commit",
        backend.clone(),
        &with_params(url, "transaction_policy=commit"),
    )
    .expect("Could not create the connector");
    connector.connect().expect("Could not connect");
    let mut note = Note {
        id: 0,
        text: "committed on close".into(),
    };
    let transaction = connector
        .create_transaction()
        .expect("Could not create a transaction");
    transaction.begin().expect("Could not begin the transaction");
    notes
        .insert_record(&transaction, &mut note)
        .expect("Failed to insert a Note");
    transaction.close().expect("Failed to close the transaction");
    assert!(exists(&connector, note.id));
    connector.disconnect().expect("Could not disconnect");

    let connector = Connector::new(
        "manual",
        backend,
        &with_params(url, "transaction_policy=manual"),
    )
    .expect("Could not create the connector");
    connector.connect().expect("Could not connect");
    let mut note = Note {
        id: 0,
        text: "left open".into(),
    };
    let transaction = connector
        .create_transaction()
        .expect("Could not create a transaction");
    transaction.begin().expect("Could not begin the transaction");
    notes
        .insert_record(&transaction, &mut note)
        .expect("Failed to insert a Note");
    let error = transaction
        .close()
        .expect_err("A manual transaction must be resolved explicitly");
    assert_eq!(error_kind(&error), Some(ErrorKind::Usage));
    assert!(!exists(&connector, note.id));
    connector.disconnect().expect("Could not disconnect");
}
