mod resource {
    pub mod catalog;
}

#[cfg(test)]
mod tests {
    use crate::resource::catalog::{Person, cities, city, person, persons};
    use indoc::indoc;
    use std::sync::LazyLock;
    use stow::{
        Constraint, ErrorKind, FieldDescriptor, ScalarType, SchemaGenerator, Storable, Table,
        error_kind, index_name, writer::Dialect,
    };

    static SETTING: LazyLock<Table> = LazyLock::new(|| {
        Table::new(
            "Setting",
            [
                FieldDescriptor::new("id", ScalarType::Int64),
                FieldDescriptor::new("name", ScalarType::Varchar).defaultable("none"),
                FieldDescriptor::new("enabled", ScalarType::Boolean).defaultable(true),
                FieldDescriptor::new("ratio", ScalarType::Float64).nullable(),
            ],
        )
    });

    fn checked_persons() -> Storable<Person> {
        Storable::new(vec![
            Constraint::primary_key(person("id")),
            Constraint::index([person("name")]),
            Constraint::index([person("name"), person("age")]),
            Constraint::check(|ast| {
                let age = ast.column(person("age"));
                let missing = ast.is_null(age);
                let zero = ast.literal(0);
                let positive = ast.ge(age, zero)?;
                Ok(ast.or(missing, positive))
            })
            .unwrap(),
        ])
        .unwrap()
    }

    #[test]
    fn create_table() {
        let persons = persons();
        assert_eq!(
            persons.schema(Dialect::Sqlite).create_table().unwrap(),
            indoc! {r#"
                CREATE TABLE IF NOT EXISTS "Person" (
                "id" INTEGER PRIMARY KEY AUTOINCREMENT,
                "name" TEXT NOT NULL,
                "age" INTEGER,
                "cityId" INTEGER NOT NULL REFERENCES "City"("id")
                )"#}
        );
        assert_eq!(
            persons.schema(Dialect::Postgres).create_table().unwrap(),
            indoc! {r#"
                CREATE TABLE IF NOT EXISTS "Person" (
                "id" SERIAL PRIMARY KEY,
                "name" TEXT NOT NULL,
                "age" INTEGER,
                "cityId" INTEGER NOT NULL REFERENCES "City"("id")
                )"#}
        );
        assert_eq!(
            persons.schema(Dialect::MySql).create_table().unwrap(),
            indoc! {"
                CREATE TABLE `Person` (
                `id` INT PRIMARY KEY AUTO_INCREMENT,
                `name` VARCHAR(255) NOT NULL,
                `age` INT,
                `cityId` INT NOT NULL REFERENCES `City`(`id`)
                )"}
        );
        let error = persons
            .schema(Dialect::Unknown)
            .create_table()
            .unwrap_err();
        assert_eq!(error_kind(&error), Some(ErrorKind::Unsupported));
    }

    #[test]
    fn create_table_with_check() {
        let persons = checked_persons();
        assert_eq!(
            persons.schema(Dialect::Sqlite).create_table().unwrap(),
            indoc! {r#"
                CREATE TABLE IF NOT EXISTS "Person" (
                "id" INTEGER PRIMARY KEY AUTOINCREMENT,
                "name" TEXT NOT NULL,
                "age" INTEGER,
                "cityId" INTEGER NOT NULL,
                CHECK ("age" IS NULL OR "age" >= 0)
                )"#}
        );
    }

    #[test]
    fn create_table_defaults() {
        let sqlite = SchemaGenerator::new(Dialect::Sqlite.sql_writer(), &SETTING, &[]);
        assert_eq!(
            sqlite.create_table().unwrap(),
            indoc! {r#"
                CREATE TABLE IF NOT EXISTS "Setting" (
                "id" INTEGER NOT NULL,
                "name" TEXT NOT NULL DEFAULT 'none',
                "enabled" INTEGER NOT NULL DEFAULT 1,
                "ratio" REAL
                )"#}
        );
        let postgres = SchemaGenerator::new(Dialect::Postgres.sql_writer(), &SETTING, &[]);
        assert_eq!(
            postgres.create_table().unwrap(),
            indoc! {r#"
                CREATE TABLE IF NOT EXISTS "Setting" (
                "id" BIGINT NOT NULL,
                "name" TEXT NOT NULL DEFAULT 'none',
                "enabled" SMALLINT NOT NULL DEFAULT 1,
                "ratio" DOUBLE PRECISION
                )"#}
        );
    }

    #[test]
    fn primary_key_types() {
        let constraints = [Constraint::primary_key(
            SETTING.field("name").unwrap(),
        )];
        for dialect in [Dialect::Sqlite, Dialect::Postgres, Dialect::MySql] {
            let generator = SchemaGenerator::new(dialect.sql_writer(), &SETTING, &constraints);
            let error = generator.create_table().unwrap_err();
            assert_eq!(error_kind(&error), Some(ErrorKind::Configuration), "{:?}", dialect);
        }
        let constraints = [Constraint::primary_key(SETTING.field("id").unwrap())];
        let generator = SchemaGenerator::new(Dialect::Postgres.sql_writer(), &SETTING, &constraints);
        assert!(
            generator
                .create_table()
                .unwrap()
                .contains("\"id\" BIGSERIAL PRIMARY KEY,\n")
        );
    }

    #[test]
    fn create_indexes() {
        let persons = checked_persons();
        assert_eq!(
            persons.schema(Dialect::Sqlite).create_indexes(),
            [
                r#"CREATE INDEX IF NOT EXISTS "Person_name_idx" ON "Person" ("name")"#,
                r#"CREATE INDEX IF NOT EXISTS "Person_name_age_idx" ON "Person" ("name", "age")"#,
            ]
        );
        let cities = cities();
        assert_eq!(
            cities.schema(Dialect::Sqlite).create_indexes(),
            [r#"CREATE UNIQUE INDEX IF NOT EXISTS "City_name_idx" ON "City" ("name")"#]
        );
        assert_eq!(
            cities.schema(Dialect::MySql).create_indexes(),
            ["ALTER TABLE `City` ADD UNIQUE `City_name_idx` (`name`)"]
        );
        assert_eq!(
            cities.schema(Dialect::Postgres).create_indexes(),
            [indoc! {r#"
                DO $$
                BEGIN
                IF NOT EXISTS (SELECT 1 FROM pg_class c WHERE c.relname = 'City_name_idx' AND c.relkind = 'i') THEN
                CREATE UNIQUE INDEX "City_name_idx" ON "City" ("name");
                END IF;
                END
                $$"#}]
        );
        assert_eq!(
            index_name(&SETTING, &[SETTING.field("name").unwrap()]),
            "Setting_name_idx"
        );
    }

    #[test]
    fn drop_table() {
        let persons = persons();
        assert_eq!(
            persons.schema(Dialect::Sqlite).drop_table(true),
            r#"DROP TABLE IF EXISTS "Person""#
        );
        assert_eq!(
            persons.schema(Dialect::MySql).drop_table(false),
            "DROP TABLE `Person`"
        );
    }

    #[test]
    fn invalid_constraints() {
        let cases: Vec<Vec<Constraint>> = vec![
            vec![Constraint::index([city("name")])],
            vec![Constraint::index([])],
            vec![
                Constraint::primary_key(person("id")),
                Constraint::primary_key(person("cityId")),
            ],
            vec![Constraint::foreign_key(city("id"), person("id"))],
            vec![
                Constraint::check(|ast| {
                    let name = ast.column(city("name"));
                    let rome = ast.literal("Rome");
                    ast.eq(name, rome)
                })
                .unwrap(),
            ],
        ];
        for constraints in cases {
            let Err(error) = Storable::<Person>::new(constraints) else {
                panic!("Constraints should have been rejected");
            };
            assert_eq!(error_kind(&error), Some(ErrorKind::Configuration));
        }
    }
}
