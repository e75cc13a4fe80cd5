use postgres_types::Type;
use stow_core::ScalarType;

/// Catalog type matching a postgres parameter or column type, if any.
pub(crate) fn scalar_type_of(ty: &Type) -> Option<ScalarType> {
    Some(match *ty {
        Type::BOOL => ScalarType::Boolean,
        Type::CHAR => ScalarType::Int8,
        Type::INT2 => ScalarType::Int16,
        Type::INT4 => ScalarType::Int32,
        Type::INT8 => ScalarType::Int64,
        Type::OID => ScalarType::UInt32,
        Type::FLOAT4 => ScalarType::Float32,
        Type::FLOAT8 => ScalarType::Float64,
        Type::NUMERIC => ScalarType::Decimal,
        Type::VARCHAR | Type::TEXT | Type::NAME | Type::BPCHAR => ScalarType::Varchar,
        Type::BYTEA => ScalarType::Blob,
        Type::DATE => ScalarType::Date,
        Type::TIME => ScalarType::Time,
        Type::TIMESTAMP => ScalarType::Timestamp,
        Type::TIMESTAMPTZ => ScalarType::TimestampWithTimezone,
        Type::UUID => ScalarType::Uuid,
        _ => return None,
    })
}

/// Drop the trailing semicolons postgres refuses in prepared statements.
pub(crate) fn trim_statement(sql: &str) -> &str {
    sql.trim_end().trim_end_matches(';').trim_end()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_parameter_types() {
        assert_eq!(scalar_type_of(&Type::INT4), Some(ScalarType::Int32));
        assert_eq!(scalar_type_of(&Type::TEXT), Some(ScalarType::Varchar));
        assert_eq!(
            scalar_type_of(&Type::TIMESTAMPTZ),
            Some(ScalarType::TimestampWithTimezone)
        );
        assert_eq!(scalar_type_of(&Type::JSON), None);
    }

    #[test]
    fn trims_semicolons() {
        assert_eq!(trim_statement("SELECT 1;\n"), "SELECT 1");
        assert_eq!(trim_statement("SELECT 1"), "SELECT 1");
    }
}
