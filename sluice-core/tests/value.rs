#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;
    use sluice_core::{AsValue, Value};
    use std::str::FromStr;
    use time::{Month, macros::datetime};
    use uuid::Uuid;

    #[test]
    fn value_none() {
        assert_eq!(Value::Null, Value::Null);
        assert_ne!(Value::Float32(Some(1.0)), Value::Null);
        assert!(Value::Int32(None).is_null());
        assert!(Value::List(None, Box::new(Value::Int32(None))).is_null());
        assert!(!Value::Varchar(Some("".into())).is_null());
    }

    #[test]
    fn value_bool() {
        let val: Value = true.into();
        assert_eq!(val, Value::Boolean(Some(true)));
        assert_ne!(val, Value::Boolean(None));
        assert_ne!(val, Value::Varchar(Some("true".into())));
        assert!(bool::try_from_value(val).unwrap());
        assert!(bool::try_from_value((1 as i8).into()).unwrap());
        assert!(!bool::try_from_value((0 as u64).into()).unwrap());
        assert!(bool::try_from_value(Value::Varchar(Some("yes".into()))).unwrap());
        assert!(!bool::try_from_value(Value::Unknown(Some("0".into()))).unwrap());
        assert!(bool::try_from_value(Value::Varchar(Some("maybe".into()))).is_err());
    }

    #[test]
    fn value_integers() {
        assert_eq!(i8::try_from_value((99 as u8).into()).unwrap(), 99);
        assert!(i8::try_from_value((300 as i32).into()).is_err());
        assert!(i8::try_from_value((0.1 as f64).into()).is_err());
        assert_eq!(i16::try_from_value((-31 as i8).into()).unwrap(), -31);
        assert_eq!(i32::try_from_value((1001 as u32).into()).unwrap(), 1001);
        assert_eq!(
            i64::try_from_value((12345678901234 as u64).into()).unwrap(),
            12345678901234
        );
        assert!(u32::try_from_value((-1 as i64).into()).is_err());
        assert_eq!(u64::try_from_value(true.into()).unwrap(), 1);
        assert_eq!(
            i64::try_from_value(Decimal::from_str("42").unwrap().into()).unwrap(),
            42
        );
        assert!(i64::try_from_value(Decimal::from_str("4.2").unwrap().into()).is_err());
    }

    #[test]
    fn value_integers_from_text() {
        assert_eq!(
            i64::try_from_value(Value::Varchar(Some(" -9223372036854775808 ".into()))).unwrap(),
            i64::MIN
        );
        assert_eq!(
            u16::try_from_value(Value::Unknown(Some("65535".into()))).unwrap(),
            u16::MAX
        );
        assert!(u16::try_from_value(Value::Unknown(Some("65536".into()))).is_err());
        assert!(i32::try_from_value(Value::Varchar(Some("12a".into()))).is_err());
        assert!(i32::try_from_value(Value::Varchar(Some("".into()))).is_err());
    }

    #[test]
    fn value_floats() {
        let val: Value = 1.5f64.into();
        assert_eq!(val, Value::Float64(Some(1.5)));
        assert_eq!(f32::try_from_value((7 as i16).into()).unwrap(), 7.0);
        assert_eq!(
            f64::try_from_value(Value::Varchar(Some("2.5e3".into()))).unwrap(),
            2500.0
        );
        assert_eq!(
            f64::try_from_value(Decimal::from_str("0.25").unwrap().into()).unwrap(),
            0.25
        );
    }

    #[test]
    fn value_string() {
        let val: Value = "hello".into();
        assert_eq!(val, Value::Varchar(Some("hello".into())));
        assert_eq!(String::try_from_value(val).unwrap(), "hello");
        assert_eq!(String::try_from_value((12 as i32).into()).unwrap(), "12");
        assert_eq!(
            String::try_from_value(Value::Blob(Some(b"bytes".to_vec().into()))).unwrap(),
            "bytes"
        );
        assert!(String::try_from_value(Value::Varchar(None)).is_err());
        assert_eq!(
            Option::<String>::try_from_value(Value::Varchar(None)).unwrap(),
            None
        );
    }

    #[test]
    fn value_decimal_uuid() {
        let decimal = Decimal::from_str("123.456").unwrap();
        assert_eq!(
            Decimal::try_from_value(Value::Varchar(Some("123.456".into()))).unwrap(),
            decimal
        );
        assert_eq!(
            Decimal::try_from_value(Value::Unknown(Some("1.5e2".into()))).unwrap(),
            Decimal::from(150)
        );
        let uuid = Uuid::parse_str("67e55044-10b1-426f-9247-bb680e5fe0c8").unwrap();
        assert_eq!(
            Uuid::try_from_value(Value::Varchar(Some(uuid.to_string()))).unwrap(),
            uuid
        );
        assert_eq!(
            Uuid::try_from_value(Value::Blob(Some(uuid.as_bytes().to_vec().into()))).unwrap(),
            uuid
        );
    }

    #[test]
    fn value_temporal() {
        let date = time::Date::try_from_value(Value::Varchar(Some("2025-03-14".into()))).unwrap();
        assert_eq!(date.year(), 2025);
        assert_eq!(date.month(), Month::March);
        assert_eq!(date.day(), 14);
        let timestamp = time::PrimitiveDateTime::try_from_value(Value::Varchar(Some(
            "2025-03-14 15:09:26.5".into(),
        )))
        .unwrap();
        assert_eq!(timestamp, datetime!(2025-03-14 15:09:26.5));
        let with_zone = time::OffsetDateTime::try_from_value(Value::Unknown(Some(
            "2025-03-14T15:09:26+02:00".into(),
        )))
        .unwrap();
        assert_eq!(with_zone, datetime!(2025-03-14 15:09:26 +2));
        let time = time::Time::try_from_value(Value::Varchar(Some("07:30".into()))).unwrap();
        assert_eq!((time.hour(), time.minute(), time.second()), (7, 30, 0));
    }

    #[test]
    fn value_list() {
        let val = vec![1i64, 2, 3].as_value();
        assert!(matches!(&val, Value::List(Some(v), ..) if v.len() == 3));
        assert_eq!(val.to_string(), "1,2,3");
        assert_eq!(Vec::<i64>::try_from_value(val).unwrap(), [1, 2, 3]);
        assert_ne!(
            vec![1i64].as_value(),
            vec![1i32].as_value(),
            "Lists of different element types differ"
        );
    }

    #[test]
    fn value_display() {
        assert_eq!(Value::Null.to_string(), "");
        assert_eq!(Value::Int32(None).to_string(), "");
        assert_eq!(Value::UInt8(Some(7)).to_string(), "7");
        assert_eq!(Value::Varchar(Some("count=count+1".into())).to_string(), "count=count+1");
    }
}
