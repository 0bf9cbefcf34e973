#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;
    use sluice_core::{
        DataRow, FromRecord, Record, Result, TypedValue, Value, convert_value,
    };
    use std::{str::FromStr, sync::Arc};
    use time::macros::{date, datetime};

    fn typed(raw: Option<&str>, ty: &str) -> TypedValue {
        TypedValue::new(raw.map(|v| v.as_bytes().into()), ty.into())
    }

    fn record(values: &[(&str, Option<&str>, &str)]) -> Record {
        Record::new(
            values.iter().map(|(n, ..)| n.to_string()).collect(),
            values.iter().map(|(_, v, t)| typed(*v, t)).collect(),
        )
    }

    #[test]
    fn convert_by_type_name() {
        assert_eq!(convert_value(b"-12", "INT").unwrap(), Value::Int64(Some(-12)));
        assert_eq!(convert_value(b"12", "bigint").unwrap(), Value::Int64(Some(12)));
        assert_eq!(
            convert_value(b"18446744073709551615", "BIGINT UNSIGNED").unwrap(),
            Value::UInt64(Some(u64::MAX))
        );
        assert_eq!(convert_value(b"7", "int4").unwrap(), Value::Int64(Some(7)));
        assert_eq!(convert_value(b"0.5", "DOUBLE").unwrap(), Value::Float64(Some(0.5)));
        assert_eq!(
            convert_value(b"10.25", "DECIMAL(10,2)").unwrap(),
            Value::Decimal(Some(Decimal::from_str("10.25").unwrap()))
        );
        assert_eq!(convert_value(&[1], "BIT").unwrap(), Value::Boolean(Some(true)));
        assert_eq!(convert_value(b"f", "bool").unwrap(), Value::Boolean(Some(false)));
        assert_eq!(
            convert_value(b"2023-10-01", "DATE").unwrap(),
            Value::Date(Some(date!(2023 - 10 - 01)))
        );
        assert_eq!(
            convert_value(b"2023-10-01 12:00:01", "DATETIME").unwrap(),
            Value::Timestamp(Some(datetime!(2023-10-01 12:00:01)))
        );
        assert_eq!(
            convert_value(b"2023-10-01 12:00:01+00", "timestamptz").unwrap(),
            Value::TimestampWithTimezone(Some(datetime!(2023-10-01 12:00:01 UTC)))
        );
        assert_eq!(
            convert_value(b"2023-10-01 12:00:01+00", "TIMESTAMP WITH TIME ZONE").unwrap(),
            Value::TimestampWithTimezone(Some(datetime!(2023-10-01 12:00:01 UTC)))
        );
        assert_eq!(
            convert_value(&[0, 159, 146, 150], "BLOB").unwrap(),
            Value::Blob(Some(vec![0, 159, 146, 150].into()))
        );
        assert_eq!(
            convert_value(b"hello", "VARCHAR(20)").unwrap(),
            Value::Varchar(Some("hello".into()))
        );
        assert_eq!(
            convert_value(b"{1,2}", "_int4").unwrap(),
            Value::Unknown(Some("{1,2}".into()))
        );
        assert_eq!(
            convert_value(&[0xFF, 0xFE], "").unwrap(),
            Value::Blob(Some(vec![0xFF, 0xFE].into()))
        );
        assert!(convert_value(b"abc", "INT").is_err());
        assert!(convert_value(&[0xFF], "TEXT").is_err());
    }

    #[test]
    fn typed_value() {
        let value = typed(Some("42"), "INT");
        assert!(!value.is_null());
        assert_eq!(value.as_str(), Some("42"));
        assert_eq!(value.as_bytes(), Some(&b"42"[..]));
        assert_eq!(value.get::<i64>().unwrap(), 42);
        assert_eq!(value.get::<u8>().unwrap(), 42);
        assert_eq!(value.get::<String>().unwrap(), "42");
        assert_eq!(value.to_string(), "42");
        assert_eq!(value.database_type(), "INT");

        let null = typed(None, "VARCHAR");
        assert!(null.is_null());
        assert_eq!(null.as_str(), None);
        assert_eq!(null.to_value().unwrap(), Value::Null);
        assert_eq!(null.get::<Option<String>>().unwrap(), None);
        assert!(null.get::<String>().is_err());
        assert_eq!(null.to_string(), "");

        let empty = typed(Some(""), "VARCHAR");
        assert!(!empty.is_null());
        assert_eq!(empty.get::<Option<String>>().unwrap(), Some(String::new()));

        let broken = typed(Some("n/a"), "INT");
        assert!(broken.get::<i64>().is_err());
        assert_eq!(broken.to_value_lossy(), Value::Unknown(Some("n/a".into())));
    }

    #[test]
    fn record_access() {
        let record = record(&[
            ("id", Some("1"), "BIGINT"),
            ("name", Some("john"), "VARCHAR"),
            ("score", None, "DOUBLE"),
        ]);
        assert_eq!(record.len(), 3);
        assert_eq!(record.names(), ["id", "name", "score"]);
        assert_eq!(record.get_as::<i64>("id").unwrap(), 1);
        assert_eq!(record.get_as::<String>("name").unwrap(), "john");
        assert_eq!(record.get_as::<Option<f64>>("score").unwrap(), None);
        assert!(record.get("missing").is_none());
        let error = record.get_as::<i64>("missing").unwrap_err();
        assert!(error.to_string().contains("missing"));
        let error = record.get_as::<i64>("name").unwrap_err();
        assert!(format!("{:#}", error).contains("name"));
        assert_eq!(
            record.iter().map(|(k, _)| k).collect::<Vec<_>>(),
            ["id", "name", "score"]
        );
    }

    #[test]
    fn record_to_row() {
        let record = record(&[("id", Some("1"), "BIGINT"), ("note", None, "TEXT")]);
        let row = record.to_row();
        assert_eq!(
            row,
            DataRow::new()
                .set("id", Value::Int64(Some(1)))
                .set("note", Value::Null)
        );
        assert_eq!(DataRow::from_record(&record).unwrap(), row);
    }

    #[test]
    fn shared_labels() {
        let labels: Arc<[String]> = ["a".to_string()].into();
        let first = Record::new(labels.clone(), vec![typed(Some("1"), "INT")].into());
        let second = Record::new(labels.clone(), vec![typed(Some("2"), "INT")].into());
        assert!(Arc::ptr_eq(&first.labels, &second.labels));
    }

    #[derive(Debug, PartialEq)]
    struct User {
        id: i64,
        name: String,
        nickname: Option<String>,
    }

    impl FromRecord for User {
        fn from_record(record: &Record) -> Result<Self> {
            Ok(User {
                id: record.get_as("id")?,
                name: record.get_as("name")?,
                nickname: record.get_as("nickname")?,
            })
        }
    }

    #[test]
    fn decode_struct() {
        let record = record(&[
            ("id", Some("10000"), "INT"),
            ("name", Some("john"), "VARCHAR"),
            ("nickname", None, "VARCHAR"),
        ]);
        assert_eq!(
            User::from_record(&record).unwrap(),
            User {
                id: 10000,
                name: "john".into(),
                nickname: None,
            }
        );
    }
}
