#[cfg(test)]
mod tests {
    use crate::condition::{Order, order_by, where_};
    use crate::query::{QueryArg, count};

    #[test]
    fn query_args_converts_each_argument() {
        let args = crate::query_args![
            count(),
            where_(("age", ">", 18)),
            order_by(("id", Order::Desc)),
        ];
        assert_eq!(args.len(), 3);
        assert!(matches!(args[0], QueryArg::Function(_)));
        assert!(matches!(args[1], QueryArg::Condition(_)));
        assert!(matches!(args[2], QueryArg::Condition(_)));

        let empty: Vec<QueryArg> = crate::query_args![];
        assert!(empty.is_empty());

        let cols = crate::query_args![vec!["id", "name"]];
        assert!(matches!(&cols[0], QueryArg::Columns(c) if c.len() == 2));
    }
}
