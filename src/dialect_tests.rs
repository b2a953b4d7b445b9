#[cfg(test)]
mod tests {
    use crate::dialect::{Dialect, Placeholder};
    use crate::error::Error;
    use crate::types::{ColumnType, Float64, Rat, SqlType, TypeKind};
    use pretty_assertions::assert_eq;
    use time::OffsetDateTime;

    #[test]
    fn dialect_names_like_go_drivers() {
        let cases = vec![
            (Dialect::SQLite3, "sqlite3"),
            (Dialect::MySQL, "mysql"),
            (Dialect::PostgreSQL, "postgres"),
        ];
        for (d, expected) in cases {
            assert_eq!(d.name(), expected);
            assert_eq!(d.to_string(), expected);
        }
    }

    #[test]
    fn quote_doubles_embedded_quote_char() {
        assert_eq!(Dialect::SQLite3.quote("user"), r#""user""#);
        assert_eq!(Dialect::SQLite3.quote(r#"te"st"#), r#""te""st""#);
        assert_eq!(Dialect::PostgreSQL.quote(""), r#""""#);
        assert_eq!(Dialect::MySQL.quote("user"), "`user`");
        assert_eq!(Dialect::MySQL.quote("te`st"), "`te``st`");
        assert_eq!(Dialect::MySQL.quote(""), "``");
    }

    #[test]
    fn placeholders() {
        assert_eq!(Dialect::SQLite3.placeholder_style(), Placeholder::QuestionMark);
        assert_eq!(Dialect::MySQL.placeholder(7), "?");
        assert_eq!(Dialect::PostgreSQL.placeholder_style(), Placeholder::DollarNumbered);
        assert_eq!(Dialect::PostgreSQL.placeholder(0), "$1");
        assert_eq!(Dialect::PostgreSQL.placeholder(9), "$10");
    }

    #[test]
    fn column_name_qualifies_and_keeps_star() {
        let d = Dialect::SQLite3;
        assert_eq!(d.column_name(None, "id"), r#""id""#);
        assert_eq!(d.column_name(Some("user"), "id"), r#""user"."id""#);
        assert_eq!(d.column_name(Some("user"), "*"), r#""user".*"#);
        assert_eq!(d.column_name(Some(""), "id"), r#""id""#);
        assert_eq!(Dialect::MySQL.column_name(Some("t"), "c"), "`t`.`c`");
    }

    fn ty<T: SqlType>() -> ColumnType {
        T::column_type()
    }

    #[test]
    fn sqlite_types() {
        let d = Dialect::SQLite3;
        let cases = vec![
            (ty::<bool>(), "boolean", false),
            (ty::<i8>(), "integer", false),
            (ty::<i64>(), "integer", false),
            (ty::<String>(), "text", false),
            (ty::<Option<String>>(), "text", true),
            (ty::<Vec<u8>>(), "blob", true),
            (ty::<OffsetDateTime>(), "datetime", false),
            (ty::<Rat>(), "text", false),
            (ty::<Float64>(), "real", false),
        ];
        for (ct, name, nullable) in cases {
            assert_eq!(d.sql_type(ct, false, 0).unwrap(), (name.to_string(), nullable));
        }
    }

    #[test]
    fn mysql_size_tiers() {
        let d = Dialect::MySQL;
        let text = ty::<String>();
        assert_eq!(d.sql_type(text, false, 0).unwrap().0, "VARCHAR(255)");
        assert_eq!(d.sql_type(text, false, 64).unwrap().0, "VARCHAR(64)");
        assert_eq!(d.sql_type(text, false, 65532).unwrap().0, "VARCHAR(65532)");
        assert_eq!(d.sql_type(text, false, 65533).unwrap().0, "MEDIUMTEXT");
        assert_eq!(d.sql_type(text, false, 1 << 24).unwrap().0, "LONGTEXT");

        let bytes = ty::<Vec<u8>>();
        assert_eq!(d.sql_type(bytes, false, 0).unwrap(), ("VARBINARY(255)".to_string(), true));
        assert_eq!(d.sql_type(bytes, false, 70000).unwrap().0, "MEDIUMBLOB");
        assert_eq!(d.sql_type(bytes, false, 1 << 24).unwrap().0, "LONGBLOB");

        assert_eq!(d.sql_type(ty::<i16>(), false, 0).unwrap().0, "SMALLINT");
        assert_eq!(d.sql_type(ty::<i32>(), false, 0).unwrap().0, "INT");
        assert_eq!(d.sql_type(ty::<u64>(), false, 0).unwrap().0, "BIGINT");
        assert_eq!(d.sql_type(ty::<Rat>(), false, 0).unwrap().0, "DECIMAL(65, 30)");
        assert_eq!(d.sql_type(ty::<Float64>(), false, 0).unwrap().0, "DOUBLE");
    }

    #[test]
    fn postgres_serial_types() {
        let d = Dialect::PostgreSQL;
        assert_eq!(d.sql_type(ty::<i16>(), true, 0).unwrap().0, "smallserial");
        assert_eq!(d.sql_type(ty::<i32>(), true, 0).unwrap().0, "serial");
        assert_eq!(d.sql_type(ty::<i64>(), true, 0).unwrap().0, "bigserial");
        assert_eq!(d.sql_type(ty::<i64>(), false, 0).unwrap().0, "bigint");
        assert_eq!(d.sql_type(ty::<String>(), false, 100_000).unwrap().0, "text");
        assert_eq!(
            d.sql_type(ty::<OffsetDateTime>(), false, 0).unwrap().0,
            "timestamp with time zone"
        );
        assert_eq!(d.sql_type(ty::<Vec<u8>>(), false, 0).unwrap().0, "bytea");
    }

    #[test]
    fn native_floats_are_rejected() {
        for d in [Dialect::SQLite3, Dialect::MySQL, Dialect::PostgreSQL] {
            let err = d.sql_type(ty::<f64>(), false, 0).unwrap_err();
            assert!(matches!(err, Error::FloatType));
            assert!(err.to_string().contains("Rat"));
            assert!(d.sql_type(ColumnType::new(TypeKind::NativeFloat), false, 0).is_err());
        }
    }

    #[test]
    fn bool_literals_and_auto_increment() {
        assert_eq!(Dialect::SQLite3.format_bool(true), "1");
        assert_eq!(Dialect::SQLite3.format_bool(false), "0");
        assert_eq!(Dialect::MySQL.format_bool(true), "TRUE");
        assert_eq!(Dialect::PostgreSQL.format_bool(false), "FALSE");

        assert_eq!(Dialect::SQLite3.auto_increment(), "AUTOINCREMENT");
        assert_eq!(Dialect::MySQL.auto_increment(), "AUTO_INCREMENT");
        assert_eq!(Dialect::PostgreSQL.auto_increment(), "");

        assert_eq!(Dialect::SQLite3.last_insert_id(), "SELECT last_insert_rowid()");
        assert_eq!(Dialect::MySQL.last_insert_id(), "SELECT LAST_INSERT_ID()");
        assert_eq!(Dialect::PostgreSQL.last_insert_id(), "SELECT lastval()");
    }
}
