#[cfg(test)]
mod tests {
    use indoc::indoc;
    use quill_core::{
        AsValue, BinaryOp, CompileOptions, Entity, EntityMapper, EntityParts, Expr,
        GenericSqlWriter, Lambda, LambdaParam, MemberMapper, Parameter, QueryBuilder, QuillError,
        Result, SqliteSqlWriter, Value,
    };
    use rust_decimal::Decimal;
    use std::sync::LazyLock;

    #[derive(Debug, Clone, PartialEq)]
    struct Product {
        id: i64,
        name: String,
        price: Decimal,
        stock: Option<i32>,
    }

    impl Entity for Product {
        fn mapper() -> &'static EntityMapper {
            static MAPPER: LazyLock<EntityMapper> = LazyLock::new(|| {
                EntityMapper::new::<Product>(
                    "products",
                    "",
                    "",
                    vec![
                        MemberMapper::column::<i64>("id")
                            .primary_key()
                            .auto_increment(),
                        MemberMapper::column::<String>("name"),
                        MemberMapper::column::<Decimal>("price"),
                        MemberMapper::column::<Option<i32>>("stock"),
                    ],
                )
            });
            &MAPPER
        }

        fn assemble(parts: &mut EntityParts) -> Result<Self> {
            Ok(Self {
                id: parts.take(0)?,
                name: parts.take(1)?,
                price: parts.take(2)?,
                stock: parts.take(3)?,
            })
        }

        fn values(&self) -> Vec<Value> {
            vec![
                self.id.as_value(),
                self.name.clone().as_value(),
                self.price.as_value(),
                self.stock.as_value(),
            ]
        }
    }

    fn lambda(body: Expr) -> Lambda {
        Lambda::new(vec![LambdaParam::of::<Product>("p")], body)
    }

    fn member(name: &'static str) -> Expr {
        Expr::param(0).member(name)
    }

    fn compare(op: BinaryOp, name: &'static str, value: impl Into<Value>) -> Expr {
        Expr::binary(op, member(name), Expr::constant(value))
    }

    fn compile(query: QueryBuilder<Product>) -> (String, Vec<Parameter>) {
        let compiled = query
            .compile(&GenericSqlWriter::new())
            .expect("The query should compile");
        (compiled.sql, compiled.params)
    }

    #[test]
    fn filter_order_and_limit() {
        let (sql, params) = compile(
            Product::query()
                .filter(lambda(
                    compare(BinaryOp::Greater, "price", 10).and(
                        Expr::binary(BinaryOp::Equal, member("stock"), Expr::null()).not(),
                    ),
                ))
                .order_by(lambda(member("name")))
                .take(5),
        );
        assert_eq!(
            sql,
            indoc! {r#"
                SELECT a."id", a."name", a."price", a."stock"
                FROM "products" a
                WHERE (a."price" > @p0) AND (a."stock" IS NOT NULL)
                ORDER BY a."name" ASC
                LIMIT 5;"#}
        );
        // Coerced to the column type
        assert_eq!(
            params,
            [Parameter::new("p0", Value::Decimal(Some(Decimal::from(10))))]
        );
    }

    #[test]
    fn negation_is_pushed_down() {
        let (sql, params) = compile(Product::query().filter(lambda(
            compare(BinaryOp::Greater, "price", 10)
                .or(compare(BinaryOp::Equal, "name", "x"))
                .not(),
        )));
        assert_eq!(
            sql,
            indoc! {r#"
                SELECT a."id", a."name", a."price", a."stock"
                FROM "products" a
                WHERE (a."price" <= @p0) AND (a."name" <> @p1);"#}
        );
        assert_eq!(params.len(), 2);
        assert_eq!(params[1].value, Value::Varchar(Some("x".into())));

        let (sql, _) = compile(
            Product::query().filter(lambda(compare(BinaryOp::Less, "id", 3).not().not())),
        );
        assert!(sql.ends_with("WHERE a.\"id\" < @p0;"), "{}", sql);
    }

    #[test]
    fn constant_predicates_fold() {
        let always = Expr::binary(BinaryOp::Less, Expr::constant(1), Expr::constant(2));
        let (sql, params) = compile(Product::query().filter(lambda(
            always.clone().or(compare(BinaryOp::Equal, "id", 1)),
        )));
        assert_eq!(
            sql,
            indoc! {r#"
                SELECT a."id", a."name", a."price", a."stock"
                FROM "products" a;"#}
        );
        assert!(params.is_empty());

        let (sql, params) = compile(
            Product::query()
                .filter(lambda(compare(BinaryOp::Equal, "name", "kept")))
                .filter(lambda(always.not().and(compare(BinaryOp::Equal, "id", 1)))),
        );
        assert!(sql.ends_with("WHERE 1 = 0;"), "{}", sql);
        assert!(params.is_empty());
    }

    #[test]
    fn membership() {
        let ids = Expr::constant(Value::List(
            Some(vec![Value::Int32(Some(1)), Value::Int32(Some(2))]),
            Box::new(Value::Int32(None)),
        ));
        let (sql, params) = compile(
            Product::query().filter(lambda(ids.clone().call("contains", vec![member("id")]))),
        );
        assert!(sql.ends_with("WHERE a.\"id\" IN (@p0, @p1);"), "{}", sql);
        assert_eq!(
            params.iter().map(|v| v.value.clone()).collect::<Vec<_>>(),
            [Value::Int64(Some(1)), Value::Int64(Some(2))]
        );
        let (sql, _) = compile(
            Product::query().filter(lambda(ids.call("contains", vec![member("id")]).not())),
        );
        assert!(sql.ends_with("WHERE a.\"id\" NOT IN (@p0, @p1);"), "{}", sql);
    }

    #[test]
    fn inline_constants() {
        let compiled = Product::query()
            .filter(lambda(member("name").call("starts_with", vec![Expr::constant("50%")])))
            .skip(20)
            .compile_with(
                &SqliteSqlWriter::new(),
                &CompileOptions::default().inline_constants(true),
            )
            .expect("The query should compile");
        assert_eq!(
            compiled.sql,
            indoc! {r#"
                SELECT a."id", a."name", a."price", a."stock"
                FROM "products" a
                WHERE a."name" LIKE '50\%%' ESCAPE '\'
                LIMIT -1 OFFSET 20;"#}
        );
        assert!(compiled.params.is_empty());
    }

    #[test]
    fn count_ignores_paging() {
        let compiled = Product::query()
            .filter(lambda(compare(BinaryOp::GreaterEqual, "stock", 1)))
            .order_by(lambda(member("id")))
            .page(3, 10)
            .compile_count(&GenericSqlWriter::new())
            .expect("The count should compile");
        assert_eq!(
            compiled.sql,
            indoc! {r#"
                SELECT COUNT(*)
                FROM "products" a
                WHERE a."stock" >= @p0;"#}
        );
        assert_eq!(compiled.params[0].value, Value::Int32(Some(1)));
    }

    #[test]
    fn unknown_member() {
        let error = Product::query()
            .filter(lambda(compare(BinaryOp::Equal, "weight", 3)))
            .compile(&GenericSqlWriter::new())
            .expect_err("`weight` is not a member");
        assert!(matches!(
            error.downcast_ref::<QuillError>(),
            Some(QuillError::Unsupported { .. })
        ));
    }

    #[test]
    fn constant_of_the_wrong_type() {
        let error = Product::query()
            .filter(lambda(compare(BinaryOp::Equal, "id", "abc")))
            .compile(&GenericSqlWriter::new())
            .expect_err("`abc` is not an integer");
        assert!(
            matches!(
                error.downcast_ref::<QuillError>(),
                Some(QuillError::Conversion { .. })
            ),
            "Unexpected error: {:#}",
            error
        );
        assert!(format!("{:#}", error).contains("Product::id"), "{:#}", error);
    }
}
