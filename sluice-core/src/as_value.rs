use crate::{Error, Result, Value, truncate_long};
use atoi::{FromRadix10Checked, FromRadix10SignedChecked};
use rust_decimal::{Decimal, prelude::FromPrimitive, prelude::ToPrimitive};
use std::{any, borrow::Cow, str::FromStr};
use time::{
    Date, OffsetDateTime, PrimitiveDateTime, Time, format_description::BorrowedFormatItem,
    format_description::well_known::Rfc3339, macros::format_description,
};
use uuid::Uuid;

/// Conversion between native Rust types and the dynamically typed [`Value`].
///
/// `as_value` is used when binding arguments, `try_from_value` when decoding columns. Numeric
/// conversions accept narrower widths and check the range of wider ones; textual values
/// (`Varchar`, `Unknown`) are parsed with [`AsValue::parse`], which is what drivers returning
/// everything as text rely on.
///
/// ```rust
/// use sluice_core::{AsValue, Value};
/// let v = 42i32.as_value();
/// assert!(matches!(v, Value::Int32(Some(42))));
/// let n: i64 = AsValue::try_from_value(v).unwrap();
/// assert_eq!(n, 42);
/// ```
pub trait AsValue {
    /// The NULL value of the variant this type maps to.
    fn as_empty_value() -> Value;
    fn as_value(self) -> Value;
    fn try_from_value(value: Value) -> Result<Self>
    where
        Self: Sized;
    /// Parse the textual representation, the whole input must be consumed.
    fn parse(input: &str) -> Result<Self>
    where
        Self: Sized,
    {
        Err(Error::msg(format!(
            "Cannot parse `{}` as {}",
            truncate_long!(input),
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
        "Cannot convert {value:?} to {}",
        any::type_name::<T>(),
    ))
}

macro_rules! impl_as_value_integer {
    ($source:ty, $destination:path, $checked:ident $(, $variant:path)* $(,)?) => {
        impl AsValue for $source {
            fn as_empty_value() -> Value {
                $destination(None)
            }
            fn as_value(self) -> Value {
                $destination(Some(self))
            }
            fn try_from_value(value: Value) -> Result<Self> {
                match value {
                    $destination(Some(v)) => Ok(v),
                    $($variant(Some(v)) => <$source>::try_from(v).map_err(|_| {
                        Error::msg(format!(
                            "Value {v} is out of range for {}",
                            any::type_name::<Self>(),
                        ))
                    }),)*
                    Value::Boolean(Some(v)) => Ok(v as _),
                    Value::Decimal(Some(v)) => {
                        let error = Error::msg(format!(
                            "Value {v}: Decimal does not fit into {}",
                            any::type_name::<Self>(),
                        ));
                        if !v.is_integer() {
                            return Err(error.context("The value is not a integer"));
                        }
                        v.to_i128()
                            .and_then(|v| <$source>::try_from(v).ok())
                            .ok_or(error)
                    }
                    Value::Varchar(Some(ref v)) | Value::Unknown(Some(ref v)) => {
                        <Self as AsValue>::parse(v)
                    }
                    _ => Err(mismatch::<Self>(&value)),
                }
            }
            fn parse(input: &str) -> Result<Self> {
                let trimmed = input.trim();
                match <$source>::$checked(trimmed.as_bytes()) {
                    (Some(v), used) if used == trimmed.len() && used > 0 => Ok(v),
                    (None, used) if used > 0 => Err(Error::msg(format!(
                        "Value `{}` is out of range for {}",
                        truncate_long!(input),
                        any::type_name::<Self>(),
                    ))),
                    _ => Err(Error::msg(format!(
                        "Cannot parse `{}` as {}",
                        truncate_long!(input),
                        any::type_name::<Self>(),
                    ))),
                }
            }
        }
    };
}

impl_as_value_integer!(
    i8,
    Value::Int8,
    from_radix_10_signed_checked,
    Value::Int16,
    Value::Int32,
    Value::Int64,
    Value::UInt8,
    Value::UInt16,
    Value::UInt32,
    Value::UInt64,
);
impl_as_value_integer!(
    i16,
    Value::Int16,
    from_radix_10_signed_checked,
    Value::Int8,
    Value::Int32,
    Value::Int64,
    Value::UInt8,
    Value::UInt16,
    Value::UInt32,
    Value::UInt64,
);
impl_as_value_integer!(
    i32,
    Value::Int32,
    from_radix_10_signed_checked,
    Value::Int8,
    Value::Int16,
    Value::Int64,
    Value::UInt8,
    Value::UInt16,
    Value::UInt32,
    Value::UInt64,
);
impl_as_value_integer!(
    i64,
    Value::Int64,
    from_radix_10_signed_checked,
    Value::Int8,
    Value::Int16,
    Value::Int32,
    Value::UInt8,
    Value::UInt16,
    Value::UInt32,
    Value::UInt64,
);
impl_as_value_integer!(
    u8,
    Value::UInt8,
    from_radix_10_checked,
    Value::Int8,
    Value::Int16,
    Value::Int32,
    Value::Int64,
    Value::UInt16,
    Value::UInt32,
    Value::UInt64,
);
impl_as_value_integer!(
    u16,
    Value::UInt16,
    from_radix_10_checked,
    Value::Int8,
    Value::Int16,
    Value::Int32,
    Value::Int64,
    Value::UInt8,
    Value::UInt32,
    Value::UInt64,
);
impl_as_value_integer!(
    u32,
    Value::UInt32,
    from_radix_10_checked,
    Value::Int8,
    Value::Int16,
    Value::Int32,
    Value::Int64,
    Value::UInt8,
    Value::UInt16,
    Value::UInt64,
);
impl_as_value_integer!(
    u64,
    Value::UInt64,
    from_radix_10_checked,
    Value::Int8,
    Value::Int16,
    Value::Int32,
    Value::Int64,
    Value::UInt8,
    Value::UInt16,
    Value::UInt32,
);

macro_rules! impl_as_value_float {
    ($source:ty, $destination:path) => {
        impl AsValue for $source {
            fn as_empty_value() -> Value {
                $destination(None)
            }
            fn as_value(self) -> Value {
                $destination(Some(self))
            }
            fn try_from_value(value: Value) -> Result<Self> {
                match value {
                    $destination(Some(v)) => Ok(v),
                    #[allow(unreachable_patterns)]
                    Value::Float32(Some(v)) => Ok(v as _),
                    #[allow(unreachable_patterns)]
                    Value::Float64(Some(v)) => Ok(v as _),
                    Value::Int8(Some(v)) => Ok(v as _),
                    Value::Int16(Some(v)) => Ok(v as _),
                    Value::Int32(Some(v)) => Ok(v as _),
                    Value::Int64(Some(v)) => Ok(v as _),
                    Value::UInt8(Some(v)) => Ok(v as _),
                    Value::UInt16(Some(v)) => Ok(v as _),
                    Value::UInt32(Some(v)) => Ok(v as _),
                    Value::UInt64(Some(v)) => Ok(v as _),
                    Value::Decimal(Some(v)) => v.to_f64().map(|v| v as _).ok_or_else(|| {
                        Error::msg(format!(
                            "Value {v}: Decimal does not fit into {}",
                            any::type_name::<Self>(),
                        ))
                    }),
                    Value::Varchar(Some(ref v)) | Value::Unknown(Some(ref v)) => {
                        <Self as AsValue>::parse(v)
                    }
                    _ => Err(mismatch::<Self>(&value)),
                }
            }
            fn parse(input: &str) -> Result<Self> {
                fast_float::parse::<$source, _>(input.trim()).map_err(|_| {
                    Error::msg(format!(
                        "Cannot parse `{}` as {}",
                        truncate_long!(input),
                        any::type_name::<Self>(),
                    ))
                })
            }
        }
    };
}
impl_as_value_float!(f32, Value::Float32);
impl_as_value_float!(f64, Value::Float64);

impl AsValue for bool {
    fn as_empty_value() -> Value {
        Value::Boolean(None)
    }
    fn as_value(self) -> Value {
        Value::Boolean(Some(self))
    }
    fn try_from_value(value: Value) -> Result<Self> {
        match value {
            Value::Boolean(Some(v)) => Ok(v),
            Value::Int8(Some(v)) => Ok(v != 0),
            Value::Int16(Some(v)) => Ok(v != 0),
            Value::Int32(Some(v)) => Ok(v != 0),
            Value::Int64(Some(v)) => Ok(v != 0),
            Value::UInt8(Some(v)) => Ok(v != 0),
            Value::UInt16(Some(v)) => Ok(v != 0),
            Value::UInt32(Some(v)) => Ok(v != 0),
            Value::UInt64(Some(v)) => Ok(v != 0),
            Value::Varchar(Some(ref v)) | Value::Unknown(Some(ref v)) => {
                <Self as AsValue>::parse(v)
            }
            _ => Err(mismatch::<Self>(&value)),
        }
    }
    fn parse(input: &str) -> Result<Self> {
        match input.trim().to_ascii_lowercase().as_str() {
            "1" | "t" | "true" | "y" | "yes" | "on" => Ok(true),
            "0" | "f" | "false" | "n" | "no" | "off" | "" => Ok(false),
            _ => Err(Error::msg(format!(
                "Cannot parse `{}` as bool",
                truncate_long!(input)
            ))),
        }
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
        match value {
            Value::Varchar(Some(v)) | Value::Unknown(Some(v)) => Ok(v),
            Value::Blob(Some(v)) => String::from_utf8(v.into_vec())
                .map_err(|e| Error::new(e).context("Blob value is not valid UTF-8")),
            ref v if v.is_null() => Err(mismatch::<Self>(v)),
            v => Ok(v.to_string()),
        }
    }
    fn parse(input: &str) -> Result<Self> {
        Ok(input.to_owned())
    }
}

impl AsValue for Cow<'static, str> {
    fn as_empty_value() -> Value {
        Value::Varchar(None)
    }
    fn as_value(self) -> Value {
        Value::Varchar(Some(self.into_owned()))
    }
    fn try_from_value(value: Value) -> Result<Self> {
        String::try_from_value(value).map(Into::into)
    }
}

impl AsValue for Box<[u8]> {
    fn as_empty_value() -> Value {
        Value::Blob(None)
    }
    fn as_value(self) -> Value {
        Value::Blob(Some(self))
    }
    fn try_from_value(value: Value) -> Result<Self> {
        match value {
            Value::Blob(Some(v)) => Ok(v),
            Value::Varchar(Some(v)) | Value::Unknown(Some(v)) => Ok(v.into_bytes().into()),
            _ => Err(mismatch::<Self>(&value)),
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
        let error = || mismatch::<Self>(&value);
        match value {
            Value::Decimal(Some(v)) => Ok(v),
            Value::Int8(Some(v)) => Ok(v.into()),
            Value::Int16(Some(v)) => Ok(v.into()),
            Value::Int32(Some(v)) => Ok(v.into()),
            Value::Int64(Some(v)) => Ok(v.into()),
            Value::UInt8(Some(v)) => Ok(v.into()),
            Value::UInt16(Some(v)) => Ok(v.into()),
            Value::UInt32(Some(v)) => Ok(v.into()),
            Value::UInt64(Some(v)) => Ok(v.into()),
            Value::Float32(Some(v)) => Decimal::from_f32(v).ok_or_else(error),
            Value::Float64(Some(v)) => Decimal::from_f64(v).ok_or_else(error),
            Value::Varchar(Some(ref v)) | Value::Unknown(Some(ref v)) => {
                <Self as AsValue>::parse(v)
            }
            _ => Err(error()),
        }
    }
    fn parse(input: &str) -> Result<Self> {
        let trimmed = input.trim();
        Decimal::from_str(trimmed)
            .or_else(|_| Decimal::from_scientific(trimmed))
            .map_err(|e| {
                Error::new(e).context(format!(
                    "Cannot parse `{}` as Decimal",
                    truncate_long!(input)
                ))
            })
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
            Value::Blob(Some(ref v)) if v.len() == 16 => {
                Uuid::from_slice(v).map_err(|e| Error::new(e).context("Invalid uuid bytes"))
            }
            Value::Varchar(Some(ref v)) | Value::Unknown(Some(ref v)) => {
                <Self as AsValue>::parse(v)
            }
            _ => Err(mismatch::<Self>(&value)),
        }
    }
    fn parse(input: &str) -> Result<Self> {
        Uuid::parse_str(input.trim()).map_err(|e| {
            Error::new(e).context(format!("Cannot parse `{}` as Uuid", truncate_long!(input)))
        })
    }
}

const DATE_FORMATS: &[&[BorrowedFormatItem<'static>]] =
    &[format_description!("[year]-[month]-[day]")];
const TIME_FORMATS: &[&[BorrowedFormatItem<'static>]] = &[
    format_description!("[hour]:[minute]:[second].[subsecond]"),
    format_description!("[hour]:[minute]:[second]"),
    format_description!("[hour]:[minute]"),
];
const TIMESTAMP_FORMATS: &[&[BorrowedFormatItem<'static>]] = &[
    format_description!("[year]-[month]-[day] [hour]:[minute]:[second].[subsecond]"),
    format_description!("[year]-[month]-[day] [hour]:[minute]:[second]"),
    format_description!("[year]-[month]-[day]T[hour]:[minute]:[second].[subsecond]"),
    format_description!("[year]-[month]-[day]T[hour]:[minute]:[second]"),
];
const TIMESTAMPTZ_FORMATS: &[&[BorrowedFormatItem<'static>]] = &[
    format_description!(
        "[year]-[month]-[day] [hour]:[minute]:[second].[subsecond][offset_hour sign:mandatory]:[offset_minute]"
    ),
    format_description!(
        "[year]-[month]-[day] [hour]:[minute]:[second][offset_hour sign:mandatory]:[offset_minute]"
    ),
    format_description!(
        "[year]-[month]-[day] [hour]:[minute]:[second].[subsecond][offset_hour sign:mandatory]"
    ),
    format_description!("[year]-[month]-[day] [hour]:[minute]:[second][offset_hour sign:mandatory]"),
];

macro_rules! impl_as_value_temporal {
    ($source:ty, $destination:path, $formats:expr $(, $fallback:expr)?) => {
        impl AsValue for $source {
            fn as_empty_value() -> Value {
                $destination(None)
            }
            fn as_value(self) -> Value {
                $destination(Some(self))
            }
            fn try_from_value(value: Value) -> Result<Self> {
                match value {
                    $destination(Some(v)) => Ok(v),
                    Value::Varchar(Some(ref v)) | Value::Unknown(Some(ref v)) => {
                        <Self as AsValue>::parse(v)
                    }
                    _ => Err(mismatch::<Self>(&value)),
                }
            }
            fn parse(input: &str) -> Result<Self> {
                let trimmed = input.trim();
                $(if let Ok(v) = <$source>::parse(trimmed, &$fallback) {
                    return Ok(v);
                })?
                $formats
                    .iter()
                    .find_map(|format| <$source>::parse(trimmed, format).ok())
                    .ok_or_else(|| {
                        Error::msg(format!(
                            "Cannot parse `{}` as {}",
                            truncate_long!(input),
                            any::type_name::<Self>(),
                        ))
                    })
            }
        }
    };
}
impl_as_value_temporal!(Date, Value::Date, DATE_FORMATS);
impl_as_value_temporal!(Time, Value::Time, TIME_FORMATS);
impl_as_value_temporal!(PrimitiveDateTime, Value::Timestamp, TIMESTAMP_FORMATS);
impl_as_value_temporal!(
    OffsetDateTime,
    Value::TimestampWithTimezone,
    TIMESTAMPTZ_FORMATS,
    Rfc3339
);

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
            Ok(None)
        } else {
            T::try_from_value(value).map(Some)
        }
    }
    fn parse(input: &str) -> Result<Self> {
        T::parse(input).map(Some)
    }
}

impl<T: AsValue> AsValue for Vec<T> {
    fn as_empty_value() -> Value {
        Value::List(None, Box::new(T::as_empty_value()))
    }
    fn as_value(self) -> Value {
        Value::List(
            Some(self.into_iter().map(AsValue::as_value).collect()),
            Box::new(T::as_empty_value()),
        )
    }
    fn try_from_value(value: Value) -> Result<Self> {
        match value {
            Value::List(Some(v), ..) => v.into_iter().map(T::try_from_value).collect(),
            _ => Err(mismatch::<Self>(&value)),
        }
    }
}
