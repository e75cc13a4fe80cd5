#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;
    use std::str::FromStr;
    use stow_core::{AsValue, ErrorKind, ScalarType, Value, error_kind, truncate_at};
    use time::{Date, Month, OffsetDateTime, PrimitiveDateTime, Time, UtcOffset};
    use uuid::Uuid;

    #[test]
    fn value_null() {
        assert!(Value::Int32(None).is_null());
        assert!(!Value::Int32(Some(0)).is_null());
        assert_eq!(Value::Varchar(None).scalar_type(), ScalarType::Varchar);
        assert_ne!(Value::Int32(None), Value::Int64(None));
        assert_eq!(Option::<i16>::None.as_value(), Value::Int16(None));
        assert_eq!(ScalarType::Uuid.null(), Value::Uuid(None));
    }

    #[test]
    fn value_bool() {
        let val: Value = true.into();
        assert_eq!(val, Value::Boolean(Some(true)));
        assert_eq!(bool::try_from_value(val).unwrap(), true);
        assert_eq!(bool::try_from_value(Value::Int8(Some(1))).unwrap(), true);
        assert_eq!(bool::try_from_value(Value::UInt64(Some(0))).unwrap(), false);
        assert_eq!(bool::try_from_value(Value::Int32(Some(8))).unwrap(), true);
        assert_eq!(bool::try_from_value("TRUE".into()).unwrap(), true);
        assert_eq!(bool::try_from_value(" f ".into()).unwrap(), false);
        assert!(bool::try_from_value("yes".into()).is_err());
        assert!(bool::try_from_value(Value::Float32(Some(0.5))).is_err());
    }

    #[test]
    fn value_integers() {
        assert_eq!(i8::try_from_value(Value::Int64(Some(127))).unwrap(), 127);
        assert!(i8::try_from_value(Value::Int64(Some(128))).is_err());
        assert!(u16::try_from_value(Value::Int32(Some(-1))).is_err());
        assert_eq!(u64::try_from_value(Value::UInt64(Some(u64::MAX))).unwrap(), u64::MAX);
        assert!(i64::try_from_value(Value::UInt64(Some(u64::MAX))).is_err());
        assert_eq!(i32::try_from_value(Value::Boolean(Some(true))).unwrap(), 1);
        assert_eq!(i32::try_from_value(Value::Float64(Some(42.0))).unwrap(), 42);
        assert!(i32::try_from_value(Value::Float64(Some(42.5))).is_err());
        assert_eq!(i16::try_from_value(Value::Float32(Some(-3.0))).unwrap(), -3);
        assert_eq!(
            i64::try_from_value(Value::Decimal(Some(Decimal::from(9_000_000_000i64)))).unwrap(),
            9_000_000_000
        );
        assert!(
            i64::try_from_value(Value::Decimal(Some(Decimal::from_str("1.25").unwrap())))
                .is_err()
        );
        assert_eq!(u32::try_from_value(" 77 ".into()).unwrap(), 77);
        assert!(u32::try_from_value("seven".into()).is_err());
        assert!(i32::try_from_value(Value::Blob(Some(vec![1]))).is_err());
        assert!(i64::try_from_value(Value::Float64(Some(9_223_372_036_854_775_808.0))).is_err());
        assert_eq!(
            i64::try_from_value(Value::Float64(Some(-9_223_372_036_854_775_808.0))).unwrap(),
            i64::MIN
        );
        assert!(u64::try_from_value(Value::Float64(Some(18_446_744_073_709_551_616.0))).is_err());
        assert_eq!(u8::try_from_value(Value::Float64(Some(255.0))).unwrap(), 255);
        assert!(u8::try_from_value(Value::Float64(Some(256.0))).is_err());
        assert_eq!(Value::UInt32(Some(5)).as_i128(), Some(5));
        assert_eq!(Value::Float32(Some(5.0)).as_i128(), None);
    }

    #[test]
    fn value_floats_and_decimal() {
        assert_eq!(f64::try_from_value(Value::Int32(Some(3))).unwrap(), 3.0);
        assert_eq!(f32::try_from_value(Value::Float64(Some(0.5))).unwrap(), 0.5);
        assert_eq!(
            f64::try_from_value(Value::Decimal(Some(Decimal::from_str("2.25").unwrap()))).unwrap(),
            2.25
        );
        assert_eq!(f64::try_from_value("1e3".into()).unwrap(), 1000.0);
        assert_eq!(
            Decimal::try_from_value("12.50".into()).unwrap(),
            Decimal::from_str("12.50").unwrap()
        );
        assert_eq!(
            Decimal::try_from_value("1.5e2".into()).unwrap(),
            Decimal::from(150)
        );
        assert_eq!(
            Decimal::try_from_value(Value::Int64(Some(-4))).unwrap(),
            Decimal::from(-4)
        );
    }

    #[test]
    fn value_text_and_blob() {
        assert_eq!(String::try_from_value(Value::Int16(Some(-12))).unwrap(), "-12");
        assert_eq!(String::try_from_value(Value::Float64(Some(1.5))).unwrap(), "1.5");
        assert_eq!(
            String::try_from_value(Value::Blob(Some(b"abc".to_vec()))).unwrap(),
            "abc"
        );
        assert!(String::try_from_value(Value::Blob(Some(vec![0xff, 0xfe]))).is_err());
        assert_eq!(
            Vec::<u8>::try_from_value("hi".into()).unwrap(),
            b"hi".to_vec()
        );
        let uuid = Uuid::from_str("67e55044-10b1-426f-9247-bb680e5fe0c8").unwrap();
        assert_eq!(
            Uuid::try_from_value(Value::Blob(Some(uuid.as_bytes().to_vec()))).unwrap(),
            uuid
        );
        assert_eq!(
            Uuid::try_from_value(" 67e55044-10b1-426f-9247-bb680e5fe0c8 ".into()).unwrap(),
            uuid
        );
        assert_eq!(
            String::try_from_value(uuid.as_value()).unwrap(),
            "67e55044-10b1-426f-9247-bb680e5fe0c8"
        );
    }

    #[test]
    fn value_temporal() {
        let date = Date::from_calendar_date(2025, Month::March, 9).unwrap();
        assert_eq!(Date::try_from_value("2025-03-09".into()).unwrap(), date);
        assert_eq!(String::try_from_value(date.as_value()).unwrap(), "2025-03-09");

        let time = Time::from_hms_milli(7, 5, 30, 250).unwrap();
        assert_eq!(Time::try_from_value("07:05:30.25".into()).unwrap(), time);
        assert_eq!(String::try_from_value(time.as_value()).unwrap(), "07:05:30.25");
        assert_eq!(
            Time::try_from_value("07:05".into()).unwrap(),
            Time::from_hms(7, 5, 0).unwrap()
        );

        let timestamp = PrimitiveDateTime::new(date, time);
        assert_eq!(
            PrimitiveDateTime::try_from_value("2025-03-09 07:05:30.25".into()).unwrap(),
            timestamp
        );
        assert_eq!(
            PrimitiveDateTime::try_from_value("2025-03-09T07:05:30.25".into()).unwrap(),
            timestamp
        );
        assert_eq!(
            String::try_from_value(timestamp.as_value()).unwrap(),
            "2025-03-09T07:05:30.25"
        );
        assert_eq!(
            PrimitiveDateTime::try_from_value(date.as_value()).unwrap(),
            date.midnight()
        );

        let offset = UtcOffset::from_hms(2, 0, 0).unwrap();
        let zoned = timestamp.assume_offset(offset);
        assert_eq!(
            OffsetDateTime::try_from_value("2025-03-09T07:05:30.25+02:00".into()).unwrap(),
            zoned
        );
        assert_eq!(
            OffsetDateTime::try_from_value("2025-03-09 07:05:30.25+02".into()).unwrap(),
            zoned
        );
        assert_eq!(
            String::try_from_value(zoned.as_value()).unwrap(),
            "2025-03-09T07:05:30.25+02:00"
        );
        assert_eq!(
            PrimitiveDateTime::try_from_value(zoned.as_value()).unwrap(),
            PrimitiveDateTime::new(date, Time::from_hms_milli(5, 5, 30, 250).unwrap())
        );
        assert!(Date::try_from_value("09/03/2025".into()).is_err());
    }

    #[test]
    fn convert_to() {
        assert_eq!(
            Value::Int64(Some(12)).convert_to(ScalarType::Int32).unwrap(),
            Value::Int32(Some(12))
        );
        assert_eq!(
            Value::Int64(None).convert_to(ScalarType::Varchar).unwrap(),
            Value::Varchar(None)
        );
        assert_eq!(
            Value::Varchar(Some("3.5".into()))
                .convert_to(ScalarType::Float64)
                .unwrap(),
            Value::Float64(Some(3.5))
        );
        assert_eq!(
            Value::Int64(Some(1)).convert_to(ScalarType::Boolean).unwrap(),
            Value::Boolean(Some(true))
        );
        let error = Value::Int64(Some(300))
            .convert_to(ScalarType::UInt8)
            .unwrap_err();
        assert_eq!(error_kind(&error), Some(ErrorKind::Configuration));
        let error = Value::Blob(Some(vec![1, 2]))
            .convert_to(ScalarType::Date)
            .unwrap_err();
        assert_eq!(error_kind(&error), Some(ErrorKind::Configuration));
    }

    #[test]
    fn long_text_in_errors() {
        let long = "é".repeat(300);
        let error = i32::try_from_value(Value::Varchar(Some(long.clone()))).unwrap_err();
        let message = format!("{:#}", error);
        assert!(message.contains("..."));
        assert!(message.len() < long.len());
        assert_eq!(truncate_at(&long, 497).len(), 496);
        assert_eq!(truncate_at("short", 497), "short");
    }

    #[test]
    fn promotion_every_pair() {
        use ScalarType as T;
        let all = [
            T::Boolean,
            T::Int8,
            T::Int16,
            T::Int32,
            T::Int64,
            T::UInt8,
            T::UInt16,
            T::UInt32,
            T::UInt64,
            T::Float32,
            T::Float64,
            T::Decimal,
            T::Varchar,
            T::Blob,
            T::Date,
            T::Time,
            T::Timestamp,
            T::TimestampWithTimezone,
            T::Uuid,
        ];
        for a in all {
            for b in all {
                let promoted = a.promote(b);
                assert_eq!(promoted, a.promote(b), "{} {}", a, b);
                assert_eq!(promoted, b.promote(a), "{} {}", a, b);
                assert_eq!(promoted, T::promote_all([a, b]), "{} {}", a, b);
                if a.rank() >= 1000 && b.rank() >= 1000 {
                    assert_eq!(promoted, T::Int32, "{} {}", a, b);
                } else {
                    assert_eq!(promoted.rank(), a.rank().min(b.rank()), "{} {}", a, b);
                }
            }
        }
    }

    #[test]
    fn promotion() {
        use ScalarType as T;
        assert_eq!(T::Int32.promote(T::Int32), T::Int32);
        assert_eq!(T::Int32.promote(T::Int64), T::Int64);
        assert_eq!(T::Int64.promote(T::UInt64), T::UInt64);
        assert_eq!(T::UInt32.promote(T::Int32), T::UInt32);
        assert_eq!(T::UInt64.promote(T::Float32), T::Float32);
        assert_eq!(T::Float32.promote(T::Float64), T::Float64);
        assert_eq!(T::Float64.promote(T::Decimal), T::Decimal);
        // Narrow integers widen to Int32
        assert_eq!(T::Int8.promote(T::UInt16), T::Int32);
        assert_eq!(T::Boolean.promote(T::Int8), T::Int32);
        assert_eq!(T::Int16.promote(T::Float32), T::Float32);
        assert_eq!(T::promote_all([T::Int8, T::UInt32, T::Int64]), T::Int64);
        assert_eq!(T::promote_all([]), T::Int32);
        assert!(T::Boolean.is_integral());
        assert!(!T::Float32.is_integral());
        assert!(T::Decimal.is_numeric());
        assert!(!T::Varchar.is_numeric());
        assert_eq!(T::Timestamp.family(), T::Date.family());
        assert_ne!(T::Uuid.family(), T::Varchar.family());
    }
}
