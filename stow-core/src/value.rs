use crate::{AsValue, ErrorKind, Result};
use rust_decimal::Decimal;
use std::fmt::{self, Display};
use time::{Date, OffsetDateTime, PrimitiveDateTime, Time};
use uuid::Uuid;

/// Type tag of a column, a literal or a computed expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScalarType {
    Boolean,
    Int8,
    Int16,
    Int32,
    Int64,
    UInt8,
    UInt16,
    UInt32,
    UInt64,
    Float32,
    Float64,
    Decimal,
    Varchar,
    Blob,
    Date,
    Time,
    Timestamp,
    TimestampWithTimezone,
    Uuid,
}

/// Groups of types that can be compared with each other.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeFamily {
    Numeric,
    Text,
    Blob,
    Temporal,
    Uuid,
}

impl ScalarType {
    /// Position in the promotion table, smaller is wider.
    ///
    /// Types outside the arithmetic ladder rank 1000. Slots 5 and 6 belong to
    /// the platform `long` types which have no distinct representation here.
    pub fn rank(self) -> u32 {
        match self {
            ScalarType::Decimal => 0,
            ScalarType::Float64 => 1,
            ScalarType::Float32 => 2,
            ScalarType::UInt64 => 3,
            ScalarType::Int64 => 4,
            ScalarType::UInt32 => 7,
            ScalarType::Int32 => 8,
            _ => 1000,
        }
    }

    /// Result type of an arithmetic operation between `self` and `other`.
    pub fn promote(self, other: ScalarType) -> ScalarType {
        let (l, r) = (self.rank(), other.rank());
        if l >= 1000 && r >= 1000 {
            ScalarType::Int32
        } else if r < l {
            other
        } else {
            self
        }
    }

    /// Fold [`ScalarType::promote`] left to right, `Int32` when empty.
    pub fn promote_all(types: impl IntoIterator<Item = ScalarType>) -> ScalarType {
        let mut it = types.into_iter();
        match it.next() {
            Some(first) => it.fold(first, ScalarType::promote),
            None => ScalarType::Int32,
        }
    }

    pub fn family(self) -> TypeFamily {
        match self {
            ScalarType::Varchar => TypeFamily::Text,
            ScalarType::Blob => TypeFamily::Blob,
            ScalarType::Date
            | ScalarType::Time
            | ScalarType::Timestamp
            | ScalarType::TimestampWithTimezone => TypeFamily::Temporal,
            ScalarType::Uuid => TypeFamily::Uuid,
            _ => TypeFamily::Numeric,
        }
    }

    pub fn is_numeric(self) -> bool {
        self.family() == TypeFamily::Numeric
    }

    /// Booleans count as integral, like in bitwise arithmetic.
    pub fn is_integral(self) -> bool {
        matches!(
            self,
            ScalarType::Boolean
                | ScalarType::Int8
                | ScalarType::Int16
                | ScalarType::Int32
                | ScalarType::Int64
                | ScalarType::UInt8
                | ScalarType::UInt16
                | ScalarType::UInt32
                | ScalarType::UInt64
        )
    }

    pub fn is_text(self) -> bool {
        self == ScalarType::Varchar
    }

    /// Typed NULL of this type.
    pub fn null(self) -> Value {
        match self {
            ScalarType::Boolean => Value::Boolean(None),
            ScalarType::Int8 => Value::Int8(None),
            ScalarType::Int16 => Value::Int16(None),
            ScalarType::Int32 => Value::Int32(None),
            ScalarType::Int64 => Value::Int64(None),
            ScalarType::UInt8 => Value::UInt8(None),
            ScalarType::UInt16 => Value::UInt16(None),
            ScalarType::UInt32 => Value::UInt32(None),
            ScalarType::UInt64 => Value::UInt64(None),
            ScalarType::Float32 => Value::Float32(None),
            ScalarType::Float64 => Value::Float64(None),
            ScalarType::Decimal => Value::Decimal(None),
            ScalarType::Varchar => Value::Varchar(None),
            ScalarType::Blob => Value::Blob(None),
            ScalarType::Date => Value::Date(None),
            ScalarType::Time => Value::Time(None),
            ScalarType::Timestamp => Value::Timestamp(None),
            ScalarType::TimestampWithTimezone => Value::TimestampWithTimezone(None),
            ScalarType::Uuid => Value::Uuid(None),
        }
    }
}

impl Display for ScalarType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Dynamically typed cell, `None` payload is a NULL of that type.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Boolean(Option<bool>),
    Int8(Option<i8>),
    Int16(Option<i16>),
    Int32(Option<i32>),
    Int64(Option<i64>),
    UInt8(Option<u8>),
    UInt16(Option<u16>),
    UInt32(Option<u32>),
    UInt64(Option<u64>),
    Float32(Option<f32>),
    Float64(Option<f64>),
    Decimal(Option<Decimal>),
    Varchar(Option<String>),
    Blob(Option<Vec<u8>>),
    Date(Option<Date>),
    Time(Option<Time>),
    Timestamp(Option<PrimitiveDateTime>),
    TimestampWithTimezone(Option<OffsetDateTime>),
    Uuid(Option<Uuid>),
}

impl Value {
    pub fn scalar_type(&self) -> ScalarType {
        match self {
            Value::Boolean(..) => ScalarType::Boolean,
            Value::Int8(..) => ScalarType::Int8,
            Value::Int16(..) => ScalarType::Int16,
            Value::Int32(..) => ScalarType::Int32,
            Value::Int64(..) => ScalarType::Int64,
            Value::UInt8(..) => ScalarType::UInt8,
            Value::UInt16(..) => ScalarType::UInt16,
            Value::UInt32(..) => ScalarType::UInt32,
            Value::UInt64(..) => ScalarType::UInt64,
            Value::Float32(..) => ScalarType::Float32,
            Value::Float64(..) => ScalarType::Float64,
            Value::Decimal(..) => ScalarType::Decimal,
            Value::Varchar(..) => ScalarType::Varchar,
            Value::Blob(..) => ScalarType::Blob,
            Value::Date(..) => ScalarType::Date,
            Value::Time(..) => ScalarType::Time,
            Value::Timestamp(..) => ScalarType::Timestamp,
            Value::TimestampWithTimezone(..) => ScalarType::TimestampWithTimezone,
            Value::Uuid(..) => ScalarType::Uuid,
        }
    }

    pub fn is_null(&self) -> bool {
        match self {
            Value::Boolean(v) => v.is_none(),
            Value::Int8(v) => v.is_none(),
            Value::Int16(v) => v.is_none(),
            Value::Int32(v) => v.is_none(),
            Value::Int64(v) => v.is_none(),
            Value::UInt8(v) => v.is_none(),
            Value::UInt16(v) => v.is_none(),
            Value::UInt32(v) => v.is_none(),
            Value::UInt64(v) => v.is_none(),
            Value::Float32(v) => v.is_none(),
            Value::Float64(v) => v.is_none(),
            Value::Decimal(v) => v.is_none(),
            Value::Varchar(v) => v.is_none(),
            Value::Blob(v) => v.is_none(),
            Value::Date(v) => v.is_none(),
            Value::Time(v) => v.is_none(),
            Value::Timestamp(v) => v.is_none(),
            Value::TimestampWithTimezone(v) => v.is_none(),
            Value::Uuid(v) => v.is_none(),
        }
    }

    /// Integral payload widened to `i128`, booleans included.
    pub fn as_i128(&self) -> Option<i128> {
        Some(match self {
            Value::Boolean(Some(v)) => *v as i128,
            Value::Int8(Some(v)) => *v as i128,
            Value::Int16(Some(v)) => *v as i128,
            Value::Int32(Some(v)) => *v as i128,
            Value::Int64(Some(v)) => *v as i128,
            Value::UInt8(Some(v)) => *v as i128,
            Value::UInt16(Some(v)) => *v as i128,
            Value::UInt32(Some(v)) => *v as i128,
            Value::UInt64(Some(v)) => *v as i128,
            _ => return None,
        })
    }

    /// Marshal the value into `target`, checking ranges and parsing text when needed.
    pub fn convert_to(self, target: ScalarType) -> Result<Value> {
        if self.scalar_type() == target {
            return Ok(self);
        }
        if self.is_null() {
            return Ok(target.null());
        }
        let source = self.scalar_type();
        let result = match target {
            ScalarType::Boolean => bool::try_from_value(self).map(AsValue::as_value),
            ScalarType::Int8 => i8::try_from_value(self).map(AsValue::as_value),
            ScalarType::Int16 => i16::try_from_value(self).map(AsValue::as_value),
            ScalarType::Int32 => i32::try_from_value(self).map(AsValue::as_value),
            ScalarType::Int64 => i64::try_from_value(self).map(AsValue::as_value),
            ScalarType::UInt8 => u8::try_from_value(self).map(AsValue::as_value),
            ScalarType::UInt16 => u16::try_from_value(self).map(AsValue::as_value),
            ScalarType::UInt32 => u32::try_from_value(self).map(AsValue::as_value),
            ScalarType::UInt64 => u64::try_from_value(self).map(AsValue::as_value),
            ScalarType::Float32 => f32::try_from_value(self).map(AsValue::as_value),
            ScalarType::Float64 => f64::try_from_value(self).map(AsValue::as_value),
            ScalarType::Decimal => Decimal::try_from_value(self).map(AsValue::as_value),
            ScalarType::Varchar => String::try_from_value(self).map(AsValue::as_value),
            ScalarType::Blob => Vec::<u8>::try_from_value(self).map(AsValue::as_value),
            ScalarType::Date => Date::try_from_value(self).map(AsValue::as_value),
            ScalarType::Time => Time::try_from_value(self).map(AsValue::as_value),
            ScalarType::Timestamp => PrimitiveDateTime::try_from_value(self).map(AsValue::as_value),
            ScalarType::TimestampWithTimezone => {
                OffsetDateTime::try_from_value(self).map(AsValue::as_value)
            }
            ScalarType::Uuid => Uuid::try_from_value(self).map(AsValue::as_value),
        };
        result.map_err(|e| {
            ErrorKind::Configuration
                .wrap(e)
                .context(format!("Cannot convert a {source} value into {target}"))
        })
    }
}
