#[cfg(test)]
mod tests {
    use std::{env, fs, sync::Arc, sync::Mutex};
    use stow_core::{Backend, Connector, ErrorKind, Registry, error_kind, writer::Dialect};
    use stow_sqlite::SqliteBackend;
    use stow_tests::{Note, init_logs, silent_logs};

    static MUTEX: Mutex<()> = Mutex::new(());

    fn open(url: &str) -> stow_core::Result<()> {
        let connector = Connector::new("test", Arc::new(SqliteBackend::new()), url)?;
        connector.connect()
    }

    #[test]
    fn create_database() {
        init_logs();
        let _guard = MUTEX.lock().unwrap();
        let path = env::temp_dir().join("stow_creation.sqlite");
        if path.exists() {
            fs::remove_file(&path).expect("Failed to remove the test database file");
        }
        open(&format!("sqlite://{}?mode=rwc", path.display()))
            .expect("Could not create the database");
        assert!(path.exists(), "The database file must be created");
        open(&format!("sqlite://{}?mode=ro", path.display()))
            .expect("Could not open the database read only");
        fs::remove_file(&path).expect("Failed to remove the test database file");
        silent_logs! {
            let error = open(&format!("sqlite://{}?mode=ro", path.display()))
                .expect_err("A missing database cannot be opened read only");
            assert_eq!(error_kind(&error), Some(ErrorKind::Backend));
        }
    }

    #[test]
    fn competing_writers() {
        init_logs();
        let _guard = MUTEX.lock().unwrap();
        let path = env::temp_dir().join("stow_writers.sqlite");
        if path.exists() {
            fs::remove_file(&path).expect("Failed to remove the test database file");
        }
        let url = format!(
            "sqlite://{}?mode=rwc&pool_size=2&busy_timeout=200",
            path.display()
        );
        let connector = Connector::new("writers", Arc::new(SqliteBackend::new()), &url)
            .expect("Could not create the connector");
        connector.connect().expect("Could not open the database");
        let notes = Note::storable().expect("Invalid Note constraints");
        let setup = connector.create_transaction().unwrap();
        setup.begin().unwrap();
        notes.drop_table(&setup).expect("Failed to drop the table");
        notes.create_table(&setup).expect("Failed to create the table");
        setup.commit().unwrap();
        setup.close().unwrap();

        // Both read, then both try to write
        let first = connector.create_transaction().unwrap();
        let second = connector.create_transaction().unwrap();
        first.begin().unwrap();
        second.begin().unwrap();
        assert!(!notes.find(&first, 1, &mut Note::default()).unwrap());
        assert!(!notes.find(&second, 1, &mut Note::default()).unwrap());
        let mut note = Note {
            id: 0,
            text: "first".into(),
        };
        notes
            .insert_record(&first, &mut note)
            .expect("The first writer takes the lock");
        let mut note = Note {
            id: 0,
            text: "second".into(),
        };
        silent_logs! {
            let error = notes
                .insert_record(&second, &mut note)
                .expect_err("The second writer cannot wait forever");
            assert_eq!(error_kind(&error), Some(ErrorKind::Backend));
        }
        second.rollback().unwrap();
        second.close().unwrap();
        first.commit().expect("The first writer commits once the other is gone");
        first.close().unwrap();
        connector.disconnect().unwrap();
        fs::remove_file(&path).expect("Failed to remove the test database file");
    }

    #[test]
    fn wrong_url() {
        let mut registry = Registry::new();
        registry.register_backend(SqliteBackend::new());
        let error = registry
            .connect("db", "duckdb://some_value")
            .err()
            .expect("Unknown schemes are rejected");
        assert_eq!(error_kind(&error), Some(ErrorKind::NotFound));

        let error = Connector::new(
            "db",
            Arc::new(SqliteBackend::new()),
            "postgres://localhost/db",
        )
        .err()
        .expect("The backend only accepts its own scheme");
        assert_eq!(error_kind(&error), Some(ErrorKind::Configuration));

        silent_logs! {
            let error = open("sqlite::memory:?mode=fast")
                .expect_err("Unknown modes are rejected");
            assert_eq!(error_kind(&error), Some(ErrorKind::Configuration));
        }
    }

    #[test]
    fn registry_default() {
        let mut registry = Registry::new();
        registry.register_backend(SqliteBackend::new());
        assert_eq!(
            error_kind(&registry.default_connector().err().unwrap()),
            Some(ErrorKind::NotFound)
        );
        registry
            .connect("first", "sqlite::memory:")
            .expect("Could not connect");
        registry
            .connect("second", "sqlite::memory:?pool_size=3")
            .expect("Could not connect");
        assert_eq!(registry.default_connector().unwrap().name(), "first");
        registry.set_default("second").unwrap();
        let second = registry.default_connector().unwrap();
        assert_eq!(second.name(), "second");
        assert_eq!(second.pool_size().unwrap(), 3);
        assert_eq!(second.dialect(), Dialect::Sqlite);
        assert_eq!(SqliteBackend::new().scheme(), "sqlite");
        assert!(registry.set_default("third").is_err());
    }
}
