#[cfg(test)]
mod tests {
    use sluice::{
        BatchResult, Config, DataRow, Db, DbError, Dialect, RowsAffected, StaticRouter, Value,
        args, db_error,
    };
    use sluice_tests::{Call, MockError, MockLink, init_logs, silent_logs};

    fn setup(config: Config) -> (Db<StaticRouter<MockLink>>, MockLink) {
        init_logs();
        let master = MockLink::new("master");
        let router = StaticRouter::new(master.clone()).with_slaves([MockLink::new("slave")]);
        (Db::new(router, config), master)
    }

    fn users(count: i64) -> Vec<DataRow> {
        (1..=count)
            .map(|i| DataRow::new().set("id", i).set("name", format!("user{}", i)))
            .collect()
    }

    #[tokio::test]
    async fn chunks_and_totals() {
        let (db, master) = setup(Config::default());
        master
            .push_affected(10, Some(10))
            .push_affected(10, Some(20))
            .push_affected(5, Some(25));
        let result = db.batch_insert("user", users(25), Some(10)).await.unwrap();
        assert_eq!(
            result,
            BatchResult {
                rows_affected: 25,
                last_result: Some(RowsAffected {
                    rows_affected: 5,
                    last_insert_id: Some(25),
                }),
                chunks: 3,
            }
        );
        assert_eq!(result.last_insert_id(), Some(25));
        let executed = master.executed();
        assert_eq!(executed.len(), 3);
        assert_eq!(
            executed.iter().map(|v| v.args().len()).collect::<Vec<_>>(),
            [20, 20, 10]
        );
        assert_eq!(
            executed[2].sql(),
            Some(r#"INSERT INTO "user"("id","name") VALUES(?,?),(?,?),(?,?),(?,?),(?,?)"#)
        );
        assert_eq!(executed[2].args()[0], Value::Int64(Some(21)));
    }

    #[tokio::test]
    async fn configured_size() {
        let (db, master) = setup(Config::default().with_batch_size(4));
        master
            .push_affected(4, None)
            .push_affected(4, None)
            .push_affected(1, Some(9));
        let result = db.insert("user", users(9)).await.unwrap();
        assert_eq!(
            result,
            RowsAffected {
                rows_affected: 9,
                last_insert_id: Some(9),
            }
        );
        assert_eq!(master.executed().len(), 3);

        let (db, master) = setup(Config::default());
        db.batch_replace("user", users(25), Some(0)).await.unwrap();
        assert_eq!(master.executed().len(), 3);
        let (db, master) = setup(Config::default());
        db.batch_insert_ignore("user", users(25), None).await.unwrap();
        assert_eq!(master.executed().len(), 3);
        assert!(
            master.executed()[0]
                .sql()
                .unwrap()
                .starts_with(r#"INSERT IGNORE INTO "user"("id","name") VALUES"#)
        );
    }

    #[tokio::test]
    async fn every_size() {
        for rows in [1, 2, 9, 10, 11, 30] {
            for size in [1, 3, 10, 50] {
                let (db, master) = setup(Config::default());
                let result = db
                    .batch_insert("t", users(rows), Some(size))
                    .await
                    .unwrap();
                let expected = (rows as usize).div_ceil(size);
                assert_eq!(master.executed().len(), expected);
                assert_eq!(result.chunks, expected);
                let bound: usize = master.executed().iter().map(|v| v.args().len()).sum();
                assert_eq!(bound, rows as usize * 2);
                for call in master.executed() {
                    assert_eq!(
                        call.sql().unwrap().matches('?').count(),
                        call.args().len()
                    );
                }
            }
        }
    }

    #[tokio::test]
    async fn interrupted() {
        let (db, master) = setup(Config::default());
        master.fail_exec_at(2);
        silent_logs! {
            let error = db.batch_insert("user", users(50), Some(10)).await.unwrap_err();
            match db_error(&error) {
                Some(DbError::BatchInterrupted { applied, .. }) => {
                    assert_eq!(applied.chunks, 2);
                    assert_eq!(applied.rows_affected, 2);
                }
                other => panic!("Unexpected error: {:?}", other),
            }
            assert!(
                error
                    .chain()
                    .any(|e| e.downcast_ref::<MockError>().is_some())
            );
        }
        assert_eq!(master.executed().len(), 3);
    }

    #[tokio::test]
    async fn different_columns() {
        let (db, master) = setup(Config::default());
        let rows = vec![
            DataRow::new().set("id", 1).set("name", "a"),
            DataRow::new().set("id", 2),
            DataRow::new().set("id", 3).set("name", "c").set("extra", true),
        ];
        db.batch_insert("t", rows, None).await.unwrap();
        assert_eq!(
            master.executed(),
            [Call::Exec {
                sql: r#"INSERT INTO "t"("id","name") VALUES(?,?),(?,?),(?,?)"#.into(),
                args: args![1, "a", 2, Value::Null, 3, "c"],
            }]
        );
    }

    #[tokio::test]
    async fn empty_and_rejected() {
        let (db, master) = setup(Config::default());
        let error = db
            .batch_insert("t", Vec::<DataRow>::new(), None)
            .await
            .unwrap_err();
        assert!(matches!(db_error(&error), Some(DbError::DataEmpty)));
        let error = db.insert("t", Vec::<DataRow>::new()).await.unwrap_err();
        assert!(matches!(db_error(&error), Some(DbError::DataEmpty)));
        let error = db
            .batch_save("t", vec![DataRow::new()], None)
            .await
            .unwrap_err();
        assert!(matches!(db_error(&error), Some(DbError::DataEmpty)));
        let error = db.batch_insert("t", "a=1", None).await.unwrap_err();
        assert!(matches!(
            db_error(&error),
            Some(DbError::UnsupportedInputType("scalar"))
        ));
        assert!(master.calls().is_empty());
    }

    #[tokio::test]
    async fn single_record() {
        let (db, master) = setup(Config::default());
        let result = db
            .batch_insert("t", DataRow::new().set("id", 1), Some(5))
            .await
            .unwrap();
        assert_eq!(result.chunks, 1);
        assert_eq!(
            master.executed()[0].sql(),
            Some(r#"INSERT INTO "t"("id") VALUES(?)"#)
        );
    }

    #[tokio::test]
    async fn save_mysql() {
        let (db, master) = setup(Config::default().with_dialect(Dialect::MySql));
        db.batch_save("t", users(3), Some(2)).await.unwrap();
        let sql = master
            .executed()
            .iter()
            .filter_map(|v| v.sql().map(ToOwned::to_owned))
            .collect::<Vec<_>>();
        assert_eq!(
            sql,
            [
                "INSERT INTO `t`(`id`,`name`) VALUES(?,?),(?,?) ON DUPLICATE KEY UPDATE `id`=VALUES(`id`),`name`=VALUES(`name`)",
                "INSERT INTO `t`(`id`,`name`) VALUES(?,?) ON DUPLICATE KEY UPDATE `id`=VALUES(`id`),`name`=VALUES(`name`)",
            ]
        );
    }

    #[tokio::test]
    async fn postgres_numbering() {
        let (db, master) = setup(Config::default().with_dialect(Dialect::Postgres));
        db.batch_insert("t", users(3), Some(2)).await.unwrap();
        assert_eq!(
            master.executed()[0].sql(),
            Some(r#"INSERT INTO "t"("id","name") VALUES($1,$2),($3,$4)"#)
        );
        assert_eq!(
            master.executed()[1].sql(),
            Some(r#"INSERT INTO "t"("id","name") VALUES($1,$2)"#)
        );
    }
}
