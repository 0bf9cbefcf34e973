#[cfg(test)]
mod tests {
    use sluice::{
        Config, Db, DbError, Record, StaticRouter, Value, args, db_error, is_no_rows,
        record_stream, rows_to_records,
        stream::{StreamExt, TryStreamExt},
    };
    use sluice_tests::{MockCursor, MockError, MockLink, MockRows, init_logs};

    fn setup() -> (Db<StaticRouter<MockLink>>, MockLink) {
        init_logs();
        let slave = MockLink::new("slave");
        let router = StaticRouter::new(MockLink::new("master")).with_slaves([slave.clone()]);
        (Db::new(router, Config::default()), slave)
    }

    fn names() -> MockRows {
        MockRows::new([("id", "INT"), ("name", "VARCHAR")])
            .row([Some("1"), Some("a much longer first name")])
            .row([Some("2"), Some("bo")])
            .row([Some("3"), Some("carl")])
    }

    #[tokio::test]
    async fn rows_are_copied_out() {
        let records = rows_to_records(MockCursor::new(names())).await.unwrap();
        assert_eq!(
            records
                .iter()
                .map(|r| r.get_as::<String>("name").unwrap())
                .collect::<Vec<_>>(),
            ["a much longer first name", "bo", "carl"]
        );
        assert_eq!(
            records
                .iter()
                .map(|r| r.get_as::<i32>("id").unwrap())
                .collect::<Vec<_>>(),
            [1, 2, 3]
        );
        assert!(records.windows(2).all(|w| w[0].labels == w[1].labels));
    }

    #[tokio::test]
    async fn null_and_empty() {
        let rows = MockRows::new([("a", "VARCHAR"), ("b", "VARCHAR")]).row([None, Some("")]);
        let records = rows_to_records(MockCursor::new(rows)).await.unwrap();
        let record = &records[0];
        assert!(record.get("a").unwrap().is_null());
        assert_eq!(record.get("a").unwrap().to_value().unwrap(), Value::Null);
        assert!(!record.get("b").unwrap().is_null());
        assert_eq!(
            record.get("b").unwrap().to_value().unwrap(),
            Value::Varchar(Some("".into()))
        );
    }

    #[tokio::test]
    async fn binary_values() {
        let rows = MockRows::new([("payload", "BLOB")])
            .row_bytes([Some(vec![0, 255, 10])])
            .row_bytes([None]);
        let records = rows_to_records(MockCursor::new(rows)).await.unwrap();
        assert_eq!(records[0].values[0].as_bytes(), Some(&[0, 255, 10][..]));
        assert_eq!(records[0].values[0].as_str(), None);
        assert_eq!(
            records[0].values[0].to_value().unwrap(),
            Value::Blob(Some(vec![0, 255, 10].into()))
        );
        assert!(records[1].values[0].is_null());
    }

    #[tokio::test]
    async fn zero_rows() {
        let (db, _) = setup();
        let records = rows_to_records(MockCursor::new(MockRows::new([("id", "INT")])))
            .await
            .unwrap();
        assert!(records.is_empty());
        let records = db.get_all("SELECT id FROM t", args![]).await.unwrap();
        assert!(records.is_empty());
        assert!(db.get_one("SELECT id FROM t", args![]).await.unwrap().is_none());
        let error = db
            .get_struct::<Record>("SELECT id FROM t", args![])
            .await
            .unwrap_err();
        assert!(is_no_rows(&error));
        let error = db
            .get_structs::<Record>("SELECT id FROM t", args![])
            .await
            .unwrap_err();
        assert!(is_no_rows(&error));
    }

    #[tokio::test]
    async fn scan_failure_keeps_rows() {
        let (db, slave) = setup();
        slave.push_rows(names().fail_scan_at(2));
        let error = db.get_all("SELECT * FROM t", args![]).await.unwrap_err();
        match db_error(&error) {
            Some(DbError::Scan { rows, .. }) => {
                assert_eq!(rows.len(), 2);
                assert_eq!(rows[1].get_as::<String>("name").unwrap(), "bo");
            }
            other => panic!("Unexpected error: {:?}", other),
        }
        assert!(
            error
                .chain()
                .any(|e| e.downcast_ref::<MockError>().is_some())
        );
        assert_eq!(error.to_string(), "row scan failed after 2 rows");
    }

    #[tokio::test]
    async fn column_count_mismatch() {
        let rows = MockRows::new([("a", "INT"), ("b", "INT")])
            .row([Some("1"), Some("2")])
            .row([Some("3")]);
        let error = rows_to_records(MockCursor::new(rows)).await.unwrap_err();
        match db_error(&error) {
            Some(DbError::Scan { rows, .. }) => assert_eq!(rows.len(), 1),
            other => panic!("Unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn streamed() {
        let records = record_stream(MockCursor::new(names()))
            .try_collect::<Vec<_>>()
            .await
            .unwrap();
        assert_eq!(records.len(), 3);
        assert_eq!(records[2].get_as::<i64>("id").unwrap(), 3);

        let first = record_stream(MockCursor::new(names()))
            .boxed()
            .next()
            .await
            .unwrap()
            .unwrap();
        assert_eq!(first.get_as::<String>("name").unwrap(), "a much longer first name");
    }

    #[tokio::test]
    async fn typed_columns() {
        let (db, slave) = setup();
        slave.push_rows(
            MockRows::new([
                ("id", "BIGINT UNSIGNED"),
                ("price", "DECIMAL(10,2)"),
                ("active", "TINYINT(1)"),
                ("created", "DATETIME"),
            ])
            .row([
                Some("7"),
                Some("19.90"),
                Some("1"),
                Some("2024-05-01 10:00:00"),
            ]),
        );
        let record = db
            .get_one("SELECT * FROM products", args![])
            .await
            .unwrap()
            .unwrap();
        let row = record.to_row();
        assert_eq!(row.get("id"), Some(&Value::UInt64(Some(7))));
        assert!(matches!(row.get("price"), Some(Value::Decimal(Some(..)))));
        assert_eq!(row.get("active"), Some(&Value::Int64(Some(1))));
        assert!(matches!(row.get("created"), Some(Value::Timestamp(Some(..)))));
        assert!(record.get_as::<bool>("active").unwrap());
    }
}
