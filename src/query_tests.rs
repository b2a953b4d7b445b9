#[cfg(test)]
mod tests {
    use crate::condition::{join, limit, where_};
    use crate::dialect::Dialect;
    use crate::error::Error;
    use crate::query::{QueryArg, Raw, classify, count, count_of, distinct, from};
    use crate::value::SqlValue;
    use pretty_assertions::assert_eq;

    #[derive(Debug, Default)]
    struct Child {
        id: i64,
        parent_id: i64,
    }

    crate::sql_table! {
        impl Child {
            id: i64 [pk],
            parent_id: i64,
        }
    }

    fn sql(args: Vec<QueryArg>) -> String {
        let plan = classify(Dialect::SQLite3, Some("user"), args).unwrap();
        plan.to_sql(Dialect::SQLite3).unwrap().0
    }

    #[test]
    fn default_projection_is_table_star() {
        assert_eq!(sql(vec![]), r#"SELECT "user".* FROM "user""#);
        assert_eq!(sql(crate::query_args![""]), r#"SELECT "user".* FROM "user""#);
    }

    #[test]
    fn projections() {
        let cases = vec![
            (crate::query_args!["name"], r#"SELECT "user"."name" FROM "user""#),
            (
                crate::query_args![["id", "name"]],
                r#"SELECT "user"."id", "user"."name" FROM "user""#,
            ),
            (
                crate::query_args![distinct(["name", "age"])],
                r#"SELECT DISTINCT "user"."name", "user"."age" FROM "user""#,
            ),
            (crate::query_args![count()], r#"SELECT COUNT(*) FROM "user""#),
            (
                crate::query_args![count_of("id")],
                r#"SELECT COUNT("user"."id") FROM "user""#,
            ),
            (
                crate::query_args![count_of(distinct(["name"]))],
                r#"SELECT COUNT(DISTINCT "user"."name") FROM "user""#,
            ),
            (
                crate::query_args![Raw::new("MAX(id) AS m")],
                r#"SELECT MAX(id) AS m FROM "user""#,
            ),
        ];
        for (args, expected) in cases {
            assert_eq!(sql(args), expected);
        }
    }

    #[test]
    fn from_overrides_table() {
        assert_eq!(
            sql(crate::query_args![from::<Child>()]),
            r#"SELECT "child".* FROM "child""#
        );
        assert_eq!(
            sql(crate::query_args![count(), from::<Child>()]),
            r#"SELECT COUNT(*) FROM "child""#
        );

        let plan = classify(Dialect::SQLite3, None, crate::query_args![count(), from::<Child>()])
            .unwrap();
        assert_eq!(plan.from, "child");
    }

    #[test]
    fn conditions_are_tagged_with_table_and_share_placeholders() {
        let args = crate::query_args![
            join::<Child>().on(("id", "=", "parent_id")),
            where_(("name", "=", "a")),
            limit(5),
        ];
        let plan = classify(Dialect::PostgreSQL, Some("parent"), args).unwrap();
        assert_eq!(plan.conditions.len(), 3);
        assert!(plan.conditions.iter().all(|c| c.table_name() == Some("parent")));

        let (sql, args) = plan.to_sql(Dialect::PostgreSQL).unwrap();
        assert_eq!(
            sql,
            r#"SELECT "parent".* FROM "parent" JOIN "child" ON "parent"."id" = "child"."parent_id" WHERE "name" = $1 LIMIT $2"#
        );
        assert_eq!(args, vec![SqlValue::from("a"), SqlValue::U64(5)]);
    }

    #[test]
    fn classification_errors() {
        let err = classify(
            Dialect::SQLite3,
            Some("user"),
            crate::query_args![from::<Child>(), from::<Child>()],
        )
        .unwrap_err();
        assert!(matches!(err, Error::DuplicateFrom));

        let err = classify(Dialect::SQLite3, None, crate::query_args![count()]).unwrap_err();
        assert!(matches!(err, Error::MissingFrom));

        let err = classify(
            Dialect::SQLite3,
            Some("user"),
            crate::query_args![where_(("a", "=", 1)), count()],
        )
        .unwrap_err();
        assert!(matches!(err, Error::MisplacedFunction(ref f) if f == "COUNT"));

        let err = classify(
            Dialect::SQLite3,
            Some("user"),
            crate::query_args![limit(1), "name"],
        )
        .unwrap_err();
        assert!(matches!(err, Error::MisplacedProjection("string")));

        let err = classify(
            Dialect::SQLite3,
            Some("user"),
            crate::query_args!["id", distinct(["name"])],
        )
        .unwrap_err();
        assert!(matches!(err, Error::UnsupportedArgument("Distinct")));
    }

    #[test]
    fn condition_errors_surface_from_to_sql() {
        let plan = classify(
            Dialect::SQLite3,
            Some("user"),
            crate::query_args![where_(("a", "===", 1))],
        )
        .unwrap();
        assert!(matches!(plan.to_sql(Dialect::SQLite3), Err(Error::Condition(_))));
    }
}
