use crate::{Error, Result, Value, truncate_long, write_date, write_time, write_timestamp, write_timestamptz};
use rust_decimal::{
    Decimal,
    prelude::{FromPrimitive, ToPrimitive},
};
use std::{any, str::FromStr};
use time::{
    Date, OffsetDateTime, PrimitiveDateTime, Time, UtcOffset,
    format_description::well_known::Rfc3339, macros::format_description,
};
use uuid::Uuid;

/// Conversion between native Rust types and the dynamically typed [`Value`].
///
/// Records implement their accessors on top of it and backends rely on
/// `try_from_value` to marshal native cells into the catalog types.
///
/// # Conversion rules
/// - The canonical variant is always accepted.
/// - Integers accept any other integral variant (booleans included) after a
///   range check, and floating or decimal values without a fractional part.
/// - Every type accepts `Value::Varchar` and parses it with [`AsValue::parse`].
/// - Temporal parsing tries several formats, ISO 8601 with either a `T` or a
///   space separator.
///
/// # Examples
/// ```rust
/// use stow_core::{AsValue, Value};
/// let v = 42i32.as_value();
/// assert!(matches!(v, Value::Int32(Some(42))));
/// let n: i64 = AsValue::try_from_value(v).unwrap();
/// assert_eq!(n, 42);
/// ```
pub trait AsValue {
    /// Typed NULL for this type.
    fn as_empty_value() -> Value;
    fn as_value(self) -> Value;
    fn try_from_value(value: Value) -> Result<Self>
    where
        Self: Sized;
    /// Parse the whole input as `Self`.
    fn parse(input: impl AsRef<str>) -> Result<Self>
    where
        Self: Sized,
    {
        Err(Error::msg(format!(
            "Cannot parse `{}` as {}",
            truncate_long!(input.as_ref()),
            any::type_name::<Self>()
        )))
    }
}

impl<T: AsValue> From<T> for Value {
    fn from(value: T) -> Self {
        value.as_value()
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Varchar(Some(value.into()))
    }
}

fn mismatch<T>(value: &Value) -> Error {
    Error::msg(format!(
        "Cannot convert {:?} into {}",
        value,
        any::type_name::<T>()
    ))
}

fn parse_failure<T>(input: &str, error: impl std::fmt::Display) -> Error {
    Error::msg(format!(
        "Cannot parse `{}` as {}: {}",
        truncate_long!(input),
        any::type_name::<T>(),
        error
    ))
}

macro_rules! impl_as_value_integer {
    ($source:ty, $destination:path) => {
        impl AsValue for $source {
            fn as_empty_value() -> Value {
                $destination(None)
            }
            fn as_value(self) -> Value {
                $destination(Some(self))
            }
            fn try_from_value(value: Value) -> Result<Self> {
                if let $destination(Some(v)) = value {
                    return Ok(v);
                }
                if let Some(v) = value.as_i128() {
                    return <$source>::try_from(v).map_err(|_| {
                        Error::msg(format!(
                            "Value {v} is out of range for {}",
                            any::type_name::<Self>(),
                        ))
                    });
                }
                match value {
                    Value::Float32(Some(v)) if v.fract() == 0.0 => {
                        Self::try_from_value(Value::Float64(Some(v as f64)))
                    }
                    // MIN is exact, MAX + 1 is the power of two ending the range.
                    Value::Float64(Some(v))
                        if v.fract() == 0.0
                            && v >= <$source>::MIN as f64
                            && v < <$source>::MAX as f64 + 1.0 =>
                    {
                        Ok(v as $source)
                    }
                    Value::Decimal(Some(v)) if v.fract().is_zero() => v
                        .to_i128()
                        .and_then(|v| <$source>::try_from(v).ok())
                        .ok_or_else(|| {
                            Error::msg(format!(
                                "Value {v} is out of range for {}",
                                any::type_name::<Self>(),
                            ))
                        }),
                    Value::Varchar(Some(v)) => Self::parse(v),
                    v => Err(mismatch::<Self>(&v)),
                }
            }
            fn parse(input: impl AsRef<str>) -> Result<Self> {
                let input = input.as_ref();
                input
                    .trim()
                    .parse::<$source>()
                    .map_err(|e| parse_failure::<Self>(input, e))
            }
        }
    };
}
impl_as_value_integer!(i8, Value::Int8);
impl_as_value_integer!(i16, Value::Int16);
impl_as_value_integer!(i32, Value::Int32);
impl_as_value_integer!(i64, Value::Int64);
impl_as_value_integer!(u8, Value::UInt8);
impl_as_value_integer!(u16, Value::UInt16);
impl_as_value_integer!(u32, Value::UInt32);
impl_as_value_integer!(u64, Value::UInt64);

macro_rules! impl_as_value_float {
    ($source:ty, $destination:path, $to_decimal:ident) => {
        impl AsValue for $source {
            fn as_empty_value() -> Value {
                $destination(None)
            }
            fn as_value(self) -> Value {
                $destination(Some(self))
            }
            fn try_from_value(value: Value) -> Result<Self> {
                if let Some(v) = value.as_i128() {
                    return Ok(v as $source);
                }
                match value {
                    Value::Float32(Some(v)) => Ok(v as $source),
                    Value::Float64(Some(v)) => Ok(v as $source),
                    Value::Decimal(Some(v)) => v.$to_decimal().ok_or_else(|| {
                        Error::msg(format!(
                            "Value {v} does not fit {}",
                            any::type_name::<Self>()
                        ))
                    }),
                    Value::Varchar(Some(v)) => Self::parse(v),
                    v => Err(mismatch::<Self>(&v)),
                }
            }
            fn parse(input: impl AsRef<str>) -> Result<Self> {
                let input = input.as_ref();
                input
                    .trim()
                    .parse::<$source>()
                    .map_err(|e| parse_failure::<Self>(input, e))
            }
        }
    };
}
impl_as_value_float!(f32, Value::Float32, to_f32);
impl_as_value_float!(f64, Value::Float64, to_f64);

impl AsValue for bool {
    fn as_empty_value() -> Value {
        Value::Boolean(None)
    }
    fn as_value(self) -> Value {
        Value::Boolean(Some(self))
    }
    fn try_from_value(value: Value) -> Result<Self> {
        if let Some(v) = value.as_i128() {
            return Ok(v != 0);
        }
        match value {
            Value::Varchar(Some(v)) => Self::parse(v),
            v => Err(mismatch::<Self>(&v)),
        }
    }
    fn parse(input: impl AsRef<str>) -> Result<Self> {
        let input = input.as_ref();
        match input.trim().to_ascii_lowercase().as_str() {
            "true" | "t" | "1" => Ok(true),
            "false" | "f" | "0" => Ok(false),
            _ => Err(parse_failure::<Self>(input, "expected a boolean")),
        }
    }
}

impl AsValue for Decimal {
    fn as_empty_value() -> Value {
        Value::Decimal(None)
    }
    fn as_value(self) -> Value {
        Value::Decimal(Some(self))
    }
    fn try_from_value(value: Value) -> Result<Self> {
        if let Some(v) = value.as_i128() {
            return Decimal::from_i128(v)
                .ok_or_else(|| Error::msg(format!("Value {v} does not fit a Decimal")));
        }
        match value {
            Value::Decimal(Some(v)) => Ok(v),
            Value::Float32(Some(v)) => Decimal::from_f32(v)
                .ok_or_else(|| Error::msg(format!("Value {v} does not fit a Decimal"))),
            Value::Float64(Some(v)) => Decimal::from_f64(v)
                .ok_or_else(|| Error::msg(format!("Value {v} does not fit a Decimal"))),
            Value::Varchar(Some(v)) => Self::parse(v),
            v => Err(mismatch::<Self>(&v)),
        }
    }
    fn parse(input: impl AsRef<str>) -> Result<Self> {
        let input = input.as_ref();
        Decimal::from_str(input.trim())
            .or_else(|_| Decimal::from_scientific(input.trim()))
            .map_err(|e| parse_failure::<Self>(input, e))
    }
}

impl AsValue for String {
    fn as_empty_value() -> Value {
        Value::Varchar(None)
    }
    fn as_value(self) -> Value {
        Value::Varchar(Some(self))
    }
    fn try_from_value(value: Value) -> Result<Self> {
        if let Some(v) = value.as_i128() {
            return Ok(v.to_string());
        }
        let mut out = String::new();
        match value {
            Value::Varchar(Some(v)) => return Ok(v),
            Value::Float32(Some(v)) => out.push_str(ryu::Buffer::new().format(v)),
            Value::Float64(Some(v)) => out.push_str(ryu::Buffer::new().format(v)),
            Value::Decimal(Some(v)) => out = v.to_string(),
            Value::Uuid(Some(v)) => out = v.to_string(),
            Value::Date(Some(v)) => write_date(&mut out, &v),
            Value::Time(Some(v)) => write_time(&mut out, &v),
            Value::Timestamp(Some(v)) => write_timestamp(&mut out, &v),
            Value::TimestampWithTimezone(Some(v)) => write_timestamptz(&mut out, &v),
            Value::Blob(Some(v)) => {
                out = String::from_utf8(v).map_err(|e| mismatch::<Self>(&Value::Blob(Some(e.into_bytes()))))?
            }
            v => return Err(mismatch::<Self>(&v)),
        }
        Ok(out)
    }
    fn parse(input: impl AsRef<str>) -> Result<Self> {
        Ok(input.as_ref().into())
    }
}

impl AsValue for Vec<u8> {
    fn as_empty_value() -> Value {
        Value::Blob(None)
    }
    fn as_value(self) -> Value {
        Value::Blob(Some(self))
    }
    fn try_from_value(value: Value) -> Result<Self> {
        match value {
            Value::Blob(Some(v)) => Ok(v),
            Value::Varchar(Some(v)) => Ok(v.into_bytes()),
            Value::Uuid(Some(v)) => Ok(v.as_bytes().to_vec()),
            v => Err(mismatch::<Self>(&v)),
        }
    }
}

impl AsValue for Date {
    fn as_empty_value() -> Value {
        Value::Date(None)
    }
    fn as_value(self) -> Value {
        Value::Date(Some(self))
    }
    fn try_from_value(value: Value) -> Result<Self> {
        match value {
            Value::Date(Some(v)) => Ok(v),
            Value::Timestamp(Some(v)) => Ok(v.date()),
            Value::TimestampWithTimezone(Some(v)) => Ok(v.date()),
            Value::Varchar(Some(v)) => <Self as AsValue>::parse(v),
            v => Err(mismatch::<Self>(&v)),
        }
    }
    fn parse(input: impl AsRef<str>) -> Result<Self> {
        let input = input.as_ref();
        Date::parse(input.trim(), format_description!("[year]-[month]-[day]"))
            .map_err(|e| parse_failure::<Self>(input, e))
    }
}

impl AsValue for Time {
    fn as_empty_value() -> Value {
        Value::Time(None)
    }
    fn as_value(self) -> Value {
        Value::Time(Some(self))
    }
    fn try_from_value(value: Value) -> Result<Self> {
        match value {
            Value::Time(Some(v)) => Ok(v),
            Value::Timestamp(Some(v)) => Ok(v.time()),
            Value::Varchar(Some(v)) => <Self as AsValue>::parse(v),
            v => Err(mismatch::<Self>(&v)),
        }
    }
    fn parse(input: impl AsRef<str>) -> Result<Self> {
        let input = input.as_ref();
        let trimmed = input.trim();
        for format in [
            format_description!("[hour]:[minute]:[second].[subsecond]"),
            format_description!("[hour]:[minute]:[second]"),
            format_description!("[hour]:[minute]"),
        ] {
            if let Ok(v) = Time::parse(trimmed, format) {
                return Ok(v);
            }
        }
        Err(parse_failure::<Self>(input, "no time format matched"))
    }
}

impl AsValue for PrimitiveDateTime {
    fn as_empty_value() -> Value {
        Value::Timestamp(None)
    }
    fn as_value(self) -> Value {
        Value::Timestamp(Some(self))
    }
    fn try_from_value(value: Value) -> Result<Self> {
        match value {
            Value::Timestamp(Some(v)) => Ok(v),
            Value::TimestampWithTimezone(Some(v)) => {
                let v = v.to_offset(UtcOffset::UTC);
                Ok(PrimitiveDateTime::new(v.date(), v.time()))
            }
            Value::Date(Some(v)) => Ok(v.midnight()),
            Value::Varchar(Some(v)) => <Self as AsValue>::parse(v),
            v => Err(mismatch::<Self>(&v)),
        }
    }
    fn parse(input: impl AsRef<str>) -> Result<Self> {
        let input = input.as_ref();
        let normalized = input.trim().replacen(' ', "T", 1);
        for format in [
            format_description!("[year]-[month]-[day]T[hour]:[minute]:[second].[subsecond]"),
            format_description!("[year]-[month]-[day]T[hour]:[minute]:[second]"),
            format_description!("[year]-[month]-[day]T[hour]:[minute]"),
        ] {
            if let Ok(v) = PrimitiveDateTime::parse(&normalized, format) {
                return Ok(v);
            }
        }
        Err(parse_failure::<Self>(input, "no timestamp format matched"))
    }
}

impl AsValue for OffsetDateTime {
    fn as_empty_value() -> Value {
        Value::TimestampWithTimezone(None)
    }
    fn as_value(self) -> Value {
        Value::TimestampWithTimezone(Some(self))
    }
    fn try_from_value(value: Value) -> Result<Self> {
        match value {
            Value::TimestampWithTimezone(Some(v)) => Ok(v),
            Value::Timestamp(Some(v)) => Ok(v.assume_utc()),
            Value::Varchar(Some(v)) => <Self as AsValue>::parse(v),
            v => Err(mismatch::<Self>(&v)),
        }
    }
    fn parse(input: impl AsRef<str>) -> Result<Self> {
        let input = input.as_ref();
        let normalized = input.trim().replacen(' ', "T", 1);
        if let Ok(v) = OffsetDateTime::parse(&normalized, &Rfc3339) {
            return Ok(v);
        }
        for format in [
            format_description!(
                "[year]-[month]-[day]T[hour]:[minute]:[second].[subsecond][offset_hour sign:mandatory]:[offset_minute]"
            ),
            format_description!(
                "[year]-[month]-[day]T[hour]:[minute]:[second][offset_hour sign:mandatory]:[offset_minute]"
            ),
            format_description!(
                "[year]-[month]-[day]T[hour]:[minute]:[second].[subsecond][offset_hour sign:mandatory]"
            ),
            format_description!(
                "[year]-[month]-[day]T[hour]:[minute]:[second][offset_hour sign:mandatory]"
            ),
        ] {
            if let Ok(v) = OffsetDateTime::parse(&normalized, format) {
                return Ok(v);
            }
        }
        <PrimitiveDateTime as AsValue>::parse(&normalized)
            .map(PrimitiveDateTime::assume_utc)
            .map_err(|_| parse_failure::<Self>(input, "no timestamp format matched"))
    }
}

impl AsValue for Uuid {
    fn as_empty_value() -> Value {
        Value::Uuid(None)
    }
    fn as_value(self) -> Value {
        Value::Uuid(Some(self))
    }
    fn try_from_value(value: Value) -> Result<Self> {
        match value {
            Value::Uuid(Some(v)) => Ok(v),
            Value::Blob(Some(v)) => {
                Uuid::from_slice(&v).map_err(|e| Error::new(e).context("Cannot read a Uuid"))
            }
            Value::Varchar(Some(v)) => Self::parse(v),
            v => Err(mismatch::<Self>(&v)),
        }
    }
    fn parse(input: impl AsRef<str>) -> Result<Self> {
        let input = input.as_ref();
        Uuid::parse_str(input.trim()).map_err(|e| parse_failure::<Self>(input, e))
    }
}

impl<T: AsValue> AsValue for Option<T> {
    fn as_empty_value() -> Value {
        T::as_empty_value()
    }
    fn as_value(self) -> Value {
        match self {
            Some(v) => v.as_value(),
            None => T::as_empty_value(),
        }
    }
    fn try_from_value(value: Value) -> Result<Self> {
        if value.is_null() {
            return Ok(None);
        }
        T::try_from_value(value).map(Some)
    }
    fn parse(input: impl AsRef<str>) -> Result<Self> {
        T::parse(input).map(Some)
    }
}
