#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use crate::db::{Db, delete_sql, insert_sql, update_sql};
    use crate::dialect::Dialect;
    use crate::driver::{Driver, ExecResult, Rows, Transaction};
    use crate::error::BoxError;
    use crate::value::SqlValue;
    use pretty_assertions::assert_eq;

    type Statements = Arc<Mutex<Vec<(String, Vec<SqlValue>)>>>;

    /// 只记录语句的驱动；不报告自增 ID，查询一律返回 `7`。
    #[derive(Default)]
    struct Recording(Statements);

    impl Driver for Recording {
        fn name(&self) -> &str {
            "recording"
        }

        fn execute(&self, query: &str, args: &[SqlValue]) -> Result<ExecResult, BoxError> {
            self.0.lock().unwrap().push((query.to_string(), args.to_vec()));
            Ok(ExecResult {
                rows_affected: 1,
                last_insert_id: None,
            })
        }

        fn query(&self, query: &str, args: &[SqlValue]) -> Result<Rows, BoxError> {
            self.0.lock().unwrap().push((query.to_string(), args.to_vec()));
            Ok(Rows {
                columns: vec!["id".to_string()],
                rows: vec![vec![SqlValue::I64(7)]],
            })
        }

        fn begin(&self) -> Result<Box<dyn Transaction>, BoxError> {
            Err("transactions are not recorded".into())
        }
    }

    #[derive(Debug, Default, Clone, PartialEq)]
    struct Note {
        id: i64,
        title: String,
        body: String,
    }

    crate::sql_table! {
        impl Note {
            id: i64 [pk],
            title: String,
            body: String,
        }
    }

    fn note(title: &str) -> Note {
        Note {
            id: 0,
            title: title.to_string(),
            body: format!("{title}!"),
        }
    }

    fn cols(names: &[&str]) -> Vec<String> {
        names.iter().map(|n| n.to_string()).collect()
    }

    #[test]
    fn insert_numbers_placeholders_across_rows() {
        let cases = [
            (Dialect::PostgreSQL, 1, r#"INSERT INTO "t" ("a", "b") VALUES ($1, $2)"#),
            (
                Dialect::PostgreSQL,
                3,
                r#"INSERT INTO "t" ("a", "b") VALUES ($1, $2), ($3, $4), ($5, $6)"#,
            ),
            (Dialect::SQLite3, 2, r#"INSERT INTO "t" ("a", "b") VALUES (?, ?), (?, ?)"#),
            (Dialect::MySQL, 2, "INSERT INTO `t` (`a`, `b`) VALUES (?, ?), (?, ?)"),
        ];
        for (dialect, rows, expected) in cases {
            assert_eq!(insert_sql(dialect, "t", &cols(&["a", "b"]), rows), expected);
        }
    }

    #[test]
    fn update_binds_primary_key_after_columns() {
        let cases = [
            (Dialect::PostgreSQL, vec!["a"], r#"UPDATE "t" SET "a" = $1 WHERE "id" = $2"#),
            (
                Dialect::PostgreSQL,
                vec!["a", "b", "c"],
                r#"UPDATE "t" SET "a" = $1, "b" = $2, "c" = $3 WHERE "id" = $4"#,
            ),
            (
                Dialect::SQLite3,
                vec!["a", "b"],
                r#"UPDATE "t" SET "a" = ?, "b" = ? WHERE "id" = ?"#,
            ),
            (Dialect::MySQL, vec!["a"], "UPDATE `t` SET `a` = ? WHERE `id` = ?"),
        ];
        for (dialect, columns, expected) in cases {
            assert_eq!(update_sql(dialect, "t", &cols(&columns), "id"), expected);
        }
    }

    #[test]
    fn delete_lists_every_key() {
        let cases = [
            (Dialect::PostgreSQL, 1, r#"DELETE FROM "t" WHERE "id" IN ($1)"#),
            (Dialect::PostgreSQL, 3, r#"DELETE FROM "t" WHERE "id" IN ($1, $2, $3)"#),
            (Dialect::SQLite3, 2, r#"DELETE FROM "t" WHERE "id" IN (?, ?)"#),
            (Dialect::MySQL, 2, "DELETE FROM `t` WHERE `id` IN (?, ?)"),
        ];
        for (dialect, n, expected) in cases {
            assert_eq!(delete_sql(dialect, "t", "id", n), expected);
        }
    }

    #[test]
    fn postgres_writes_share_one_counter() {
        let statements = Statements::default();
        let db = Db::new(Dialect::PostgreSQL, Recording(Arc::clone(&statements)));

        let mut one = note("a");
        db.insert(&mut one).unwrap();
        assert_eq!(one.id, 7);

        let mut many = vec![note("b"), note("c")];
        db.insert_all(&mut many).unwrap();
        db.update(&mut one).unwrap();
        db.delete_all(&mut many).unwrap();

        let sql: Vec<String> = statements.lock().unwrap().iter().map(|(q, _)| q.clone()).collect();
        assert_eq!(
            sql,
            vec![
                r#"INSERT INTO "note" ("title", "body") VALUES ($1, $2)"#,
                "SELECT lastval()",
                r#"INSERT INTO "note" ("title", "body") VALUES ($1, $2), ($3, $4)"#,
                r#"UPDATE "note" SET "title" = $1, "body" = $2 WHERE "id" = $3"#,
                r#"DELETE FROM "note" WHERE "id" IN ($1, $2)"#,
            ]
        );
        assert_eq!(
            statements.lock().unwrap()[3].1,
            vec![SqlValue::from("a"), SqlValue::from("a!"), SqlValue::I64(7)]
        );
    }
}
