mod resource {
    pub mod catalog;
}

#[cfg(test)]
mod tests {
    use crate::resource::catalog::{city, person};
    use stow::{
        Ast, CodeGenerator, CondId, ErrorKind, ScalarType, Value, error_kind, writer::Dialect,
    };

    /// `age IS NULL OR (NOT (name LIKE 'George%' OR name = 'Jack') AND cityId = City.id)`
    fn sample_condition(ast: &mut Ast) -> CondId {
        let age = ast.column(person("age"));
        let missing_age = ast.is_null(age);
        let name = ast.column(person("name"));
        let pattern = ast.literal("George%");
        let like = ast.like(name, pattern).unwrap();
        let jack = ast.literal("Jack");
        let is_jack = ast.eq(name, jack).unwrap();
        let either = ast.or(like, is_jack);
        let neither = ast.not(either);
        let person_city = ast.column(person("cityId"));
        let city_id = ast.column(city("id"));
        let same_city = ast.eq(person_city, city_id).unwrap();
        let both = ast.and(neither, same_city);
        ast.or(missing_age, both)
    }

    #[test]
    fn qualified_condition() {
        let mut ast = Ast::new();
        let root = sample_condition(&mut ast);
        let generated = CodeGenerator::new(Dialect::Sqlite.sql_writer(), true).condition(&ast, root).unwrap();
        assert_eq!(
            generated.text,
            r#""Person"."age" IS NULL OR (NOT ("Person"."name" LIKE ? OR "Person"."name" = ?) AND "Person"."cityId" = "City"."id")"#
        );
        assert_eq!(
            generated.literals,
            [
                Value::Varchar(Some("George%".into())),
                Value::Varchar(Some("Jack".into()))
            ]
        );

        let generated =
            CodeGenerator::new(Dialect::Postgres.sql_writer(), true).condition(&ast, root).unwrap();
        assert_eq!(
            generated.text,
            r#""Person"."age" IS NULL OR (NOT ("Person"."name" LIKE $1 OR "Person"."name" = $2) AND "Person"."cityId" = "City"."id")"#
        );
    }

    #[test]
    fn unqualified_condition() {
        let mut ast = Ast::new();
        let root = sample_condition(&mut ast);
        let generated = CodeGenerator::new(Dialect::Sqlite.sql_writer(), false).condition(&ast, root).unwrap();
        assert_eq!(
            generated.text,
            r#""age" IS NULL OR (NOT ("name" LIKE 'George%' OR "name" = 'Jack') AND "cityId" = "id")"#
        );
        assert!(generated.literals.is_empty());

        let generated = CodeGenerator::new(Dialect::MySql.sql_writer(), false).condition(&ast, root).unwrap();
        assert_eq!(
            generated.text,
            "`age` IS NULL OR (NOT (`name` LIKE 'George%' OR `name` = 'Jack') AND `cityId` = `id`)"
        );
    }

    #[test]
    fn placeholders_per_dialect() {
        let mut ast = Ast::new();
        let age = ast.column(person("age"));
        let one = ast.literal(1);
        let two = ast.literal(2);
        let sum = ast.add(age, one).unwrap();
        let expr = ast.mul(sum, two).unwrap();
        for (dialect, expected) in [
            (Dialect::Sqlite, r#"("Person"."age" + ?) * ?"#),
            (Dialect::Postgres, r#"("Person"."age" + $4) * $5"#),
            (Dialect::MySql, "(`Person`.`age` + ?) * ?"),
            (Dialect::MsSql, r#"("Person"."age" + @p4) * @p5"#),
            (Dialect::Oracle, r#"("Person"."age" + :4) * :5"#),
            (Dialect::Unknown, r#"("Person"."age" + ?) * ?"#),
        ] {
            let generated = CodeGenerator::new(dialect.sql_writer(), true)
                .starting_at(3)
                .expression(&ast, expr).unwrap();
            assert_eq!(generated.text, expected, "{:?}", dialect);
            assert_eq!(
                generated.literals,
                [Value::Int32(Some(1)), Value::Int32(Some(2))]
            );
        }
    }

    const DIALECTS: [Dialect; 7] = [
        Dialect::Sqlite,
        Dialect::Postgres,
        Dialect::MySql,
        Dialect::MsSql,
        Dialect::Firebird,
        Dialect::Oracle,
        Dialect::Unknown,
    ];

    fn placeholder_count(dialect: Dialect, text: &str) -> usize {
        let marker = match dialect {
            Dialect::Postgres => "$",
            Dialect::MsSql => "@p",
            Dialect::Oracle => ":",
            _ => "?",
        };
        text.matches(marker).count()
    }

    #[test]
    fn stable_generation() {
        let mut ast = Ast::new();
        let root = sample_condition(&mut ast);
        let age = ast.column(person("age"));
        let one = ast.literal(1);
        let three = ast.literal(3);
        let older = ast.add(age, one).unwrap();
        let mixed = ast.bit_xor(older, three).unwrap();
        let name = ast.column(person("name"));
        let suffix = ast.literal(" Jr.");
        let full = ast.concat(name, suffix).unwrap();
        for dialect in DIALECTS {
            for qualified in [true, false] {
                let generator = CodeGenerator::new(dialect.sql_writer(), qualified);
                let first = generator.condition(&ast, root).unwrap();
                assert_eq!(first, generator.condition(&ast, root).unwrap(), "{:?}", dialect);
                assert_eq!(
                    first.literals.len(),
                    placeholder_count(dialect, &first.text),
                    "{:?} {}",
                    dialect,
                    first.text
                );
                for expr in [mixed, full] {
                    let generated = generator.expression(&ast, expr).unwrap();
                    assert_eq!(
                        generated,
                        generator.expression(&ast, expr).unwrap(),
                        "{:?}",
                        dialect
                    );
                    assert_eq!(
                        generated.literals.len(),
                        placeholder_count(dialect, &generated.text),
                        "{:?} {}",
                        dialect,
                        generated.text
                    );
                }
                if qualified {
                    assert_eq!(first.literals.len(), 2);
                } else {
                    assert!(first.literals.is_empty());
                }
            }
        }
    }

    #[test]
    fn bitwise_not() {
        let mut ast = Ast::new();
        let age = ast.column(person("age"));
        let inverted = ast.bit_not(age).unwrap();
        let mysql = CodeGenerator::new(Dialect::MySql.sql_writer(), false);
        assert_eq!(mysql.expression(&ast, inverted).unwrap().text, "CAST(~`age` AS INTEGER)");
        let sqlite = CodeGenerator::new(Dialect::Sqlite.sql_writer(), false);
        assert_eq!(sqlite.expression(&ast, inverted).unwrap().text, r#"~"age""#);

        let three = ast.literal(3);
        let xor = ast.bit_xor(age, three).unwrap();
        assert_eq!(
            sqlite.expression(&ast, xor).unwrap().text,
            r#"("age" & ~3) | (~"age" & 3)"#
        );
        assert_eq!(
            mysql.expression(&ast, xor).unwrap().text,
            "(`age` & CAST(~3 AS INTEGER)) | (CAST(~`age` AS INTEGER) & 3)"
        );
    }

    #[test]
    fn division_and_concat() {
        let mut ast = Ast::new();
        let age = ast.column(person("age"));
        let two = ast.literal(2);
        let half = ast.literal(2.5);
        let integral = ast.div(age, two).unwrap();
        let floating = ast.div(age, half).unwrap();
        assert_eq!(ast.expr(integral).value_type(), ScalarType::Int32);
        assert_eq!(ast.expr(floating).value_type(), ScalarType::Float64);

        let mysql = CodeGenerator::new(Dialect::MySql.sql_writer(), false);
        let postgres = CodeGenerator::new(Dialect::Postgres.sql_writer(), false);
        assert_eq!(mysql.expression(&ast, integral).unwrap().text, "`age` DIV 2");
        assert_eq!(mysql.expression(&ast, floating).unwrap().text, "`age` / 2.5");
        assert_eq!(postgres.expression(&ast, integral).unwrap().text, r#""age" / 2"#);

        let name = ast.column(person("name"));
        let suffix = ast.literal(" Jr.");
        let full = ast.concat(name, suffix).unwrap();
        assert_eq!(ast.expr(full).value_type(), ScalarType::Varchar);
        assert_eq!(mysql.expression(&ast, full).unwrap().text, "CONCAT(`name`, ' Jr.')");
        assert_eq!(postgres.expression(&ast, full).unwrap().text, r#""name" || ' Jr.'"#);
    }

    #[test]
    fn nesting() {
        let mut ast = Ast::new();
        let age = ast.column(person("age"));
        let one = ast.literal(1);
        let older = ast.add(age, one).unwrap();
        let negated = ast.neg(older).unwrap();
        let name = ast.column(person("name"));
        let lower = ast.function_call_as("LOWER", vec![name], ScalarType::Varchar);
        let generator = CodeGenerator::new(Dialect::Sqlite.sql_writer(), false);
        assert_eq!(generator.expression(&ast, negated).unwrap().text, r#"-("age" + 1)"#);
        assert_eq!(generator.expression(&ast, lower).unwrap().text, r#"LOWER("name")"#);

        let not_null = ast.is_not_null(age);
        let adult = ast.literal(18);
        let is_adult = ast.ge(age, adult).unwrap();
        let both = ast.and(not_null, is_adult);
        let negated = ast.not(both);
        assert_eq!(
            generator.condition(&ast, negated).unwrap().text,
            r#"NOT ("age" IS NOT NULL AND "age" >= 18)"#
        );
    }

    #[test]
    fn operand_types() {
        let mut ast = Ast::new();
        let age = ast.column(person("age"));
        let name = ast.column(person("name"));
        let fraction = ast.literal(1.5);
        let one = ast.literal(1);

        let error = ast.add(name, age).unwrap_err();
        assert_eq!(error_kind(&error), Some(ErrorKind::Configuration));
        let error = ast.like(age, one).unwrap_err();
        assert_eq!(error_kind(&error), Some(ErrorKind::Configuration));
        let error = Ast::eq(&mut ast, age, name).unwrap_err();
        assert_eq!(error_kind(&error), Some(ErrorKind::Configuration));
        let error = ast.bit_not(fraction).unwrap_err();
        assert_eq!(error_kind(&error), Some(ErrorKind::Configuration));
        let error = ast.shl(age, fraction).unwrap_err();
        assert_eq!(error_kind(&error), Some(ErrorKind::Configuration));
        let error = ast.neg(name).unwrap_err();
        assert_eq!(error_kind(&error), Some(ErrorKind::Configuration));

        // Comparisons only need the same family
        assert!(ast.lt(age, fraction).is_ok());
        let shifted = ast.shl(one, age).unwrap();
        assert_eq!(ast.expr(shifted).value_type(), ScalarType::Int32);
    }
}
