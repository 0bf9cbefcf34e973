#[cfg(test)]
mod tests {
    use sluice_core::{AsValue, Condition, DataRow, Dialect, GenericSqlWriter, Value};

    const WRITER: GenericSqlWriter = GenericSqlWriter;

    #[test]
    fn raw() {
        let (sql, args) = Condition::from("money>? AND name LIKE ?")
            .format(&WRITER, vec![99999.into(), "vip_%".into()]);
        assert_eq!(sql, "money>? AND name LIKE ?");
        assert_eq!(args.len(), 2);
        let (sql, args) = Condition::from("uid=10000").format(&WRITER, vec![]);
        assert_eq!(sql, "uid=10000");
        assert!(args.is_empty());
        let (sql, _) = Condition::default().format(&WRITER, vec![]);
        assert_eq!(sql, "");
    }

    #[test]
    fn single_word() {
        let (sql, args) = Condition::from("uid").format(&WRITER, vec![10000.into()]);
        assert_eq!(sql, r#""uid"=?"#);
        assert_eq!(args, [Value::Int32(Some(10000))]);
        let (sql, _) =
            Condition::from("uid").format(Dialect::MySql.sql_writer(), vec![10000.into()]);
        assert_eq!(sql, "`uid`=?");
        let (sql, _) = Condition::from("uid").format(&WRITER, vec![]);
        assert_eq!(sql, "uid");
    }

    #[test]
    fn record() {
        let condition = DataRow::new()
            .set("uid", 1)
            .set("age>", 18)
            .set("score <=", 2.5)
            .set("status", vec![1, 2].as_value());
        let (sql, args) = Condition::from(condition).format(&WRITER, vec!["extra".into()]);
        assert_eq!(
            sql,
            r#""uid"=? AND age>? AND score <=? AND "status" IN(?)"#
        );
        assert_eq!(args.len(), 5);
        assert_eq!(args[0], Value::Int32(Some(1)));
        assert!(matches!(args[3], Value::List(..)));
        assert_eq!(args[4], Value::Varchar(Some("extra".into())));
    }
}
