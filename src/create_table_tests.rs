#[cfg(test)]
mod tests {
    use crate::create_table::{
        column_definitions, create_index_sql, create_table_sql, drop_table_sql,
    };
    use crate::dialect::Dialect;
    use crate::error::Error;
    use crate::hooks::TimeStamp;
    use crate::types::{Float64, Rat};
    use pretty_assertions::assert_eq;

    #[derive(Debug, Default)]
    struct Account {
        id: i64,
        email: String,
        active: bool,
        balance: Rat,
        note: Option<String>,
        avatar: Vec<u8>,
        stamp: TimeStamp,
        #[allow(dead_code)]
        temp: String,
    }

    crate::sql_table! {
        impl Account {
            id: i64 [pk],
            email: String [unique, size(128)],
            active: bool [default("true")],
            balance: Rat,
            note: Option<String>,
            avatar: Vec<u8>,
            stamp: TimeStamp [embed],
            temp: String [skip],
        }
    }

    #[derive(Debug, Default)]
    struct BadFlag {
        flag: bool,
    }

    crate::sql_table! {
        impl BadFlag {
            flag: bool [default("yes")],
        }
    }

    #[derive(Debug, Default)]
    struct Measure {
        value: f64,
    }

    crate::sql_table! {
        impl Measure {
            value: f64,
        }
    }

    #[derive(Debug, Default)]
    struct Sample {
        id: i8,
        value: Float64,
        label: String,
    }

    crate::sql_table! {
        impl Sample as "samples" {
            id: i8 [pk],
            value: Float64,
            label: String [default("'none'")],
        }
    }

    #[test]
    fn sqlite_column_definitions() {
        assert_eq!(
            column_definitions::<Account>(Dialect::SQLite3).unwrap(),
            vec![
                r#""id" integer PRIMARY KEY AUTOINCREMENT NOT NULL"#,
                r#""email" text UNIQUE NOT NULL"#,
                r#""active" boolean NOT NULL DEFAULT 1"#,
                r#""balance" text NOT NULL"#,
                r#""note" text"#,
                r#""avatar" blob"#,
                r#""created_at" datetime NOT NULL"#,
                r#""updated_at" datetime NOT NULL"#,
            ]
        );
    }

    #[test]
    fn mysql_column_definitions() {
        assert_eq!(
            column_definitions::<Account>(Dialect::MySQL).unwrap(),
            vec![
                "`id` BIGINT PRIMARY KEY AUTO_INCREMENT NOT NULL",
                "`email` VARCHAR(128) UNIQUE NOT NULL",
                "`active` BOOLEAN NOT NULL DEFAULT TRUE",
                "`balance` DECIMAL(65, 30) NOT NULL",
                "`note` VARCHAR(255)",
                "`avatar` VARBINARY(255)",
                "`created_at` DATETIME NOT NULL",
                "`updated_at` DATETIME NOT NULL",
            ]
        );
    }

    #[test]
    fn postgres_omits_empty_auto_increment() {
        let defs = column_definitions::<Account>(Dialect::PostgreSQL).unwrap();
        assert_eq!(defs[0], r#""id" bigserial PRIMARY KEY NOT NULL"#);
        assert_eq!(defs[2], r#""active" boolean NOT NULL DEFAULT TRUE"#);
        assert_eq!(defs[6], r#""created_at" timestamp with time zone NOT NULL"#);
    }

    #[test]
    fn non_auto_increment_pk_and_plain_default() {
        assert_eq!(
            create_table_sql::<Sample>(Dialect::SQLite3, false).unwrap(),
            r#"CREATE TABLE "samples" ("id" integer PRIMARY KEY NOT NULL, "value" real NOT NULL, "label" text NOT NULL DEFAULT 'none')"#
        );
        assert_eq!(
            create_table_sql::<Sample>(Dialect::PostgreSQL, true).unwrap(),
            r#"CREATE TABLE IF NOT EXISTS "samples" ("id" smallint PRIMARY KEY NOT NULL, "value" double precision NOT NULL, "label" varchar(255) NOT NULL DEFAULT 'none')"#
        );
    }

    #[test]
    fn invalid_bool_default_and_native_float_are_errors() {
        let err = column_definitions::<BadFlag>(Dialect::SQLite3).unwrap_err();
        assert!(matches!(
            err,
            Error::InvalidDefault { ref column, ref value } if column == "flag" && value == "yes"
        ));

        let err = create_table_sql::<Measure>(Dialect::MySQL, false).unwrap_err();
        assert!(matches!(err, Error::FloatType));
    }

    #[test]
    fn drop_and_index_statements() {
        assert_eq!(drop_table_sql::<Account>(Dialect::SQLite3), r#"DROP TABLE "account""#);
        assert_eq!(drop_table_sql::<Sample>(Dialect::MySQL), "DROP TABLE `samples`");

        assert_eq!(
            create_index_sql::<Account>(Dialect::SQLite3, false, &["email", "active"]).unwrap(),
            r#"CREATE INDEX "index_account_email_active" ON "account" ("email", "active")"#
        );
        assert_eq!(
            create_index_sql::<Account>(Dialect::MySQL, true, &["email"]).unwrap(),
            "CREATE UNIQUE INDEX `index_account_email` ON `account` (`email`)"
        );
        assert!(matches!(
            create_index_sql::<Account>(Dialect::SQLite3, false, &[]),
            Err(Error::Usage(_))
        ));
    }
}
