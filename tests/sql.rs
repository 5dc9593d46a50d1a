#[cfg(test)]
mod tests {
    use indoc::indoc;
    use quill::{
        CompileOptions, Entity, FromRow, GenericSqlWriter, QuillError, Shape, Value,
        create_table_command, delete_command, delete_where_command, drop_table_command, expr,
        insert_command, insert_commands, update_command,
    };
    use rust_decimal::Decimal;

    #[derive(Debug, Clone, PartialEq, Entity)]
    #[quill(table = "customers")]
    struct Customer {
        #[quill(primary_key)]
        id: i32,
        name: String,
        email: Option<String>,
    }

    #[derive(Debug, Clone, PartialEq, Entity)]
    #[quill(table = "orders", schema = "shop")]
    struct Order {
        #[quill(primary_key, auto_increment)]
        id: i64,
        customer_id: i32,
        total: Decimal,
        #[quill(name = "notes")]
        note: Option<String>,
        #[quill(include = "customer_id")]
        customer: Option<Customer>,
        #[quill(ignore)]
        selected: bool,
    }

    #[derive(Debug, Clone, PartialEq, Entity)]
    #[quill(table = "audit", prefix = "au_")]
    struct Audit {
        #[quill(primary_key)]
        id: i32,
        action: String,
    }

    fn order(customer_id: i32, total: i64) -> Order {
        Order {
            id: 0,
            customer_id,
            total: Decimal::from(total),
            note: None,
            customer: None,
            selected: false,
        }
    }

    fn names(params: &[quill::Parameter]) -> Vec<&str> {
        params.iter().map(|v| v.name.as_str()).collect()
    }

    #[test]
    fn select_filter_order_take() {
        let limit = Decimal::new(100, 0);
        let compiled = Order::query()
            .filter(expr!(|o: Order| o.customer_id == 7 && o.total > limit))
            .order_by_desc(expr!(|o: Order| o.total))
            .take(10)
            .compile(&GenericSqlWriter::new())
            .expect("The query should compile");
        assert_eq!(
            compiled.sql,
            indoc! {r#"
                SELECT a."id", a."customer_id", a."total", a."notes"
                FROM "shop"."orders" a
                WHERE (a."customer_id" = @p0) AND (a."total" > @p1)
                ORDER BY a."total" DESC
                LIMIT 10;
            "#}
            .trim()
        );
        assert_eq!(names(&compiled.params), ["p0", "p1"]);
        assert_eq!(compiled.params[0].value, Value::Int32(Some(7)));
        assert_eq!(compiled.params[1].value, Value::Decimal(Some(limit)));
    }

    #[test]
    fn count_keeps_only_the_filter() {
        let compiled = Customer::query()
            .filter(expr!(|c: Customer| c.email != None))
            .order_by(expr!(|c: Customer| c.name))
            .page(3, 20)
            .compile_count(&GenericSqlWriter::new())
            .expect("The count should compile");
        assert_eq!(
            compiled.sql,
            indoc! {r#"
                SELECT COUNT(*)
                FROM "customers" a
                WHERE a."email" IS NOT NULL;
            "#}
            .trim()
        );
        assert!(compiled.params.is_empty());
    }

    #[test]
    fn prefixed_columns() {
        let compiled = Audit::query()
            .filter(expr!(|a: Audit| a.action == "login"))
            .compile(&GenericSqlWriter::new())
            .expect("The query should compile");
        assert_eq!(
            compiled.sql,
            indoc! {r#"
                SELECT a."au_id", a."au_action"
                FROM "audit" a
                WHERE a."au_action" = @p0;
            "#}
            .trim()
        );
    }

    #[test]
    fn include_adds_left_join() {
        let compiled = Order::query()
            .include("customer")
            .compile(&GenericSqlWriter::new())
            .expect("The query should compile");
        assert_eq!(
            compiled.sql,
            indoc! {r#"
                SELECT a."id", a."customer_id", a."total", a."notes", b."id", b."name", b."email"
                FROM "shop"."orders" a
                LEFT JOIN "customers" b ON b."id" = a."customer_id";
            "#}
            .trim()
        );
    }

    #[test]
    fn include_of_a_column_fails() {
        let error = Order::query()
            .include("total")
            .compile(&GenericSqlWriter::new())
            .expect_err("A column cannot be included");
        assert!(matches!(
            error.downcast_ref::<QuillError>(),
            Some(QuillError::Unsupported { .. })
        ));
    }

    #[test]
    fn explicit_join_with_projection() {
        let compiled = Customer::query()
            .inner_join::<Order>(expr!(|c: Customer, o: Order| c.id == o.customer_id))
            .filter(expr!(|_c: Customer, o: Order| o.total > 100))
            .select::<(String, Decimal)>(expr!(|c: Customer, o: Order| (c.name, o.total)))
            .compile(&GenericSqlWriter::new())
            .expect("The query should compile");
        assert_eq!(
            compiled.sql,
            indoc! {r#"
                SELECT a."name", b."total"
                FROM "customers" a
                INNER JOIN "shop"."orders" b ON a."id" = b."customer_id"
                WHERE b."total" > @p0;
            "#}
            .trim()
        );
        assert_eq!(compiled.params.len(), 1);
    }

    #[test]
    fn optional_entities_decode_as_entities() {
        assert!(matches!(
            <Option<Customer> as FromRow>::shape(),
            Shape::Entity(mapper) if std::ptr::eq(mapper(), Customer::mapper())
        ));
        let Shape::Tuple(items) = <(Order, Option<Customer>) as FromRow>::shape() else {
            panic!("A tuple decodes item by item");
        };
        assert!(matches!(
            items.as_slice(),
            [Shape::Entity(..), Shape::Entity(mapper)] if std::ptr::eq(mapper(), Customer::mapper())
        ));
    }

    #[test]
    fn insert_skips_the_identity() {
        let writer = GenericSqlWriter::new();
        let command = insert_command(&writer, &CompileOptions::default(), &order(7, 50), true)
            .expect("The insert should compile");
        assert_eq!(
            command.sql,
            r#"INSERT INTO "shop"."orders" ("customer_id", "total", "notes") VALUES (@customer_id, @total, @note) RETURNING "id";"#
        );
        assert_eq!(names(&command.params), ["customer_id", "total", "note"]);
        assert_eq!(command.param("total"), Some(&Value::Decimal(Some(Decimal::from(50)))));

        let command = insert_command(&writer, &CompileOptions::default(), &order(7, 50), false)
            .expect("The insert should compile");
        assert!(!command.sql.contains("RETURNING"));
    }

    #[test]
    fn update_and_delete_by_key() {
        let writer = GenericSqlWriter::new();
        let mut value = order(3, 20);
        value.id = 42;
        let command = update_command(&writer, &CompileOptions::default(), &value)
            .expect("The update should compile");
        assert_eq!(
            command.sql,
            indoc! {r#"
                UPDATE "shop"."orders" SET "customer_id" = @customer_id, "total" = @total, "notes" = @note
                WHERE "id" = @id;
            "#}
            .trim()
        );
        assert_eq!(command.param("id"), Some(&Value::Int64(Some(42))));

        let command = delete_command(&writer, &CompileOptions::default(), &value)
            .expect("The delete should compile");
        assert_eq!(
            command.sql,
            indoc! {r#"
                DELETE FROM "shop"."orders"
                WHERE "id" = @id;
            "#}
            .trim()
        );
        assert_eq!(names(&command.params), ["id"]);
    }

    #[test]
    fn delete_where_is_unqualified() {
        let command = delete_where_command::<Order>(
            &GenericSqlWriter::new(),
            &CompileOptions::default(),
            &expr!(|o: Order| o.total < 10 || o.note == None),
        )
        .expect("The delete should compile");
        assert_eq!(
            command.sql,
            indoc! {r#"
                DELETE FROM "shop"."orders"
                WHERE ("total" < @p0) OR ("notes" IS NULL);
            "#}
            .trim()
        );
        assert_eq!(names(&command.params), ["p0"]);
    }

    #[test]
    fn batches_respect_the_parameter_limit() {
        let orders = [order(1, 10), order(2, 20), order(3, 30)];
        let commands = insert_commands(
            &GenericSqlWriter::new(),
            &CompileOptions::default().max_parameters(6),
            &orders,
        )
        .expect("The inserts should compile");
        assert_eq!(commands.len(), 2);
        assert_eq!(
            commands[0].sql,
            indoc! {r#"
                INSERT INTO "shop"."orders" ("customer_id", "total", "notes") VALUES (@customer_id_0, @total_0, @note_0);
                INSERT INTO "shop"."orders" ("customer_id", "total", "notes") VALUES (@customer_id_1, @total_1, @note_1);
            "#}
            .trim()
        );
        assert_eq!(commands[0].params.len(), 6);
        assert_eq!(commands[0].param("customer_id_1"), Some(&Value::Int32(Some(2))));
        assert_eq!(
            commands[1].sql,
            r#"INSERT INTO "shop"."orders" ("customer_id", "total", "notes") VALUES (@customer_id_0, @total_0, @note_0);"#
        );
        assert_eq!(commands[1].param("total_0"), Some(&Value::Decimal(Some(Decimal::from(30)))));
    }

    #[test]
    fn table_definition() {
        let writer = GenericSqlWriter::new();
        let command =
            create_table_command::<Order>(&writer, true).expect("The table should be defined");
        assert_eq!(
            command.sql,
            indoc! {r#"
                CREATE TABLE IF NOT EXISTS "shop"."orders" (
                "id" BIGINT GENERATED BY DEFAULT AS IDENTITY PRIMARY KEY,
                "customer_id" INTEGER NOT NULL,
                "total" DECIMAL(38,10) NOT NULL,
                "notes" VARCHAR(4000)
                );
            "#}
            .trim()
        );
        assert_eq!(
            drop_table_command::<Order>(&writer, true).sql,
            r#"DROP TABLE IF EXISTS "shop"."orders";"#
        );
    }
}
