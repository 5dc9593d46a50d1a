#[cfg(test)]
mod tests {
    use indoc::indoc;
    use quill::{
        CompileOptions, Entity, MySqlSqlWriter, OracleSqlWriter, PostgresSqlWriter, QuillError,
        SqlServerSqlWriter, SqliteSqlWriter, Value, create_table_command, drop_table_command,
        expr, insert_command, update_commands,
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
    #[quill(table = "orders")]
    struct Order {
        #[quill(primary_key, auto_increment)]
        id: i64,
        customer_id: i32,
        total: Decimal,
    }

    fn order() -> Order {
        Order {
            id: 0,
            customer_id: 7,
            total: Decimal::new(1505, 1),
        }
    }

    fn customer(id: i32, name: &str) -> Customer {
        Customer {
            id,
            name: name.into(),
            email: None,
        }
    }

    #[test]
    fn sqlite_paging_and_definition() {
        let writer = SqliteSqlWriter::new();
        let compiled = Customer::query()
            .order_by(expr!(|c: Customer| c.name))
            .skip(20)
            .take(10)
            .compile(&writer)
            .expect("The query should compile");
        assert_eq!(
            compiled.sql,
            indoc! {r#"
                SELECT a."id", a."name", a."email"
                FROM "customers" a
                ORDER BY a."name" ASC
                LIMIT 10 OFFSET 20;
            "#}
            .trim()
        );
        let command =
            create_table_command::<Order>(&writer, true).expect("The table should be defined");
        assert_eq!(
            command.sql,
            indoc! {r#"
                CREATE TABLE IF NOT EXISTS "orders" (
                "id" INTEGER PRIMARY KEY AUTOINCREMENT,
                "customer_id" INTEGER NOT NULL,
                "total" REAL NOT NULL
                );
            "#}
            .trim()
        );
    }

    #[test]
    fn postgres_binds_lists() {
        let writer = PostgresSqlWriter::new();
        let ids = vec![1, 2, 3];
        let compiled = Customer::query()
            .filter(expr!(|c: Customer| ids.contains(&c.id)))
            .compile(&writer)
            .expect("The query should compile");
        assert!(compiled.sql.ends_with("\nWHERE a.\"id\" = ANY(@p0);"));
        assert_eq!(compiled.params.len(), 1);
        assert!(matches!(
            &compiled.params[0].value,
            Value::List(Some(items), ..) if items.len() == 3
        ));

        let compiled = Customer::query()
            .filter(expr!(|c: Customer| !ids.contains(&c.id)))
            .compile(&writer)
            .expect("The query should compile");
        assert!(compiled.sql.ends_with("\nWHERE a.\"id\" <> ALL(@p0);"));

        let compiled = Customer::query()
            .filter(expr!(|c: Customer| ids.contains(&c.id)))
            .compile_with(&writer, &CompileOptions::default().inline_constants(true))
            .expect("The query should compile");
        assert!(compiled.sql.ends_with("\nWHERE a.\"id\" IN (1, 2, 3);"));
        assert!(compiled.params.is_empty());
    }

    #[test]
    fn mysql_quoting_and_limit() {
        let writer = MySqlSqlWriter::new();
        let compiled = Customer::query()
            .filter(expr!(|c: Customer| c.name.starts_with("A_")))
            .order_by(expr!(|c: Customer| c.id))
            .page(3, 10)
            .compile(&writer)
            .expect("The query should compile");
        assert_eq!(
            compiled.sql,
            indoc! {r#"
                SELECT a.`id`, a.`name`, a.`email`
                FROM `customers` a
                WHERE a.`name` LIKE @p0
                ORDER BY a.`id` ASC
                LIMIT 20, 10;
            "#}
            .trim()
        );
        assert_eq!(
            compiled.params[0].value,
            Value::Varchar(Some("A\\_%".into()))
        );
        let command = insert_command(&writer, &CompileOptions::default(), &order(), true)
            .expect("The insert should compile");
        assert_eq!(
            command.sql,
            "INSERT INTO `orders` (`customer_id`, `total`) VALUES (@customer_id, @total);\nSELECT LAST_INSERT_ID();"
        );
    }

    #[test]
    fn sqlserver_top_and_offset() {
        let writer = SqlServerSqlWriter::new();
        let compiled = Customer::query()
            .order_by(expr!(|c: Customer| c.name))
            .take(5)
            .compile(&writer)
            .expect("The query should compile");
        assert_eq!(
            compiled.sql,
            indoc! {r#"
                SELECT TOP (5) a."id", a."name", a."email"
                FROM "customers" a
                ORDER BY a."name" ASC;
            "#}
            .trim()
        );
        let compiled = Customer::query()
            .order_by(expr!(|c: Customer| c.name))
            .page(3, 5)
            .compile(&writer)
            .expect("The query should compile");
        assert_eq!(
            compiled.sql,
            indoc! {r#"
                SELECT a."id", a."name", a."email"
                FROM "customers" a
                ORDER BY a."name" ASC
                OFFSET 10 ROWS FETCH NEXT 5 ROWS ONLY;
            "#}
            .trim()
        );
        let error = Customer::query()
            .skip(10)
            .compile(&writer)
            .expect_err("OFFSET without ORDER BY must fail");
        assert!(matches!(
            error.downcast_ref::<QuillError>(),
            Some(QuillError::Paging {
                dialect: "sqlserver",
                ..
            })
        ));
        let command = insert_command(&writer, &CompileOptions::default(), &order(), true)
            .expect("The insert should compile");
        assert_eq!(
            command.sql,
            "INSERT INTO \"orders\" (\"customer_id\", \"total\") VALUES (@customer_id, @total);\nSELECT @@IDENTITY;"
        );
        let command =
            create_table_command::<Order>(&writer, true).expect("The table should be defined");
        assert!(command.sql.starts_with(
            "CREATE TABLE \"orders\" (\n\"id\" BIGINT IDENTITY(1,1) PRIMARY KEY,\n"
        ));
    }

    #[test]
    fn oracle_row_number_paging() {
        let writer = OracleSqlWriter::new();
        let compiled = Customer::query()
            .filter(expr!(|c: Customer| c.id > 3))
            .order_by(expr!(|c: Customer| c.name))
            .page(2, 10)
            .compile(&writer)
            .expect("The query should compile");
        assert_eq!(
            compiled.sql,
            indoc! {r#"
                SELECT "c0", "c1", "c2" FROM (
                SELECT a."id" AS "c0", a."name" AS "c1", a."email" AS "c2", ROW_NUMBER() OVER (ORDER BY a."name" ASC) AS "rn__"
                FROM "customers" a
                WHERE a."id" > :p0
                ) q
                WHERE "rn__" > 10 AND "rn__" <= 20
                ORDER BY "rn__";
            "#}
            .trim()
        );
        let error = Customer::query()
            .take(10)
            .compile(&writer)
            .expect_err("Paging without ORDER BY must fail");
        assert!(matches!(
            error.downcast_ref::<QuillError>(),
            Some(QuillError::Paging { dialect: "oracle", .. })
        ));
    }

    #[test]
    fn oracle_distinct_paging() {
        let writer = OracleSqlWriter::new();
        let compiled = Customer::query()
            .distinct()
            .select::<String>(expr!(|c: Customer| c.name))
            .order_by(expr!(|c: Customer| c.name))
            .page(2, 10)
            .compile(&writer)
            .expect("The query should compile");
        assert_eq!(
            compiled.sql,
            indoc! {r#"
                SELECT "c0" FROM (
                SELECT "c0", ROW_NUMBER() OVER (ORDER BY "c0" ASC) AS "rn__" FROM (
                SELECT DISTINCT a."name" AS "c0"
                FROM "customers" a
                ) d
                ) q
                WHERE "rn__" > 10 AND "rn__" <= 20
                ORDER BY "rn__";
            "#}
            .trim()
        );
        let error = Customer::query()
            .distinct()
            .select::<String>(expr!(|c: Customer| c.name))
            .order_by(expr!(|c: Customer| c.id))
            .take(5)
            .compile(&writer)
            .expect_err("The ordering column is not selected");
        assert!(matches!(
            error.downcast_ref::<QuillError>(),
            Some(QuillError::Paging { dialect: "oracle", .. })
        ));
    }

    #[test]
    fn paging_saturates() {
        let compiled = Customer::query()
            .order_by(expr!(|c: Customer| c.id))
            .skip(u64::MAX)
            .take(5)
            .compile(&OracleSqlWriter::new())
            .expect("The query should compile");
        assert!(
            compiled.sql.ends_with(
                "WHERE \"rn__\" > 18446744073709551615 AND \"rn__\" <= 18446744073709551615\nORDER BY \"rn__\";"
            ),
            "{}",
            compiled.sql
        );
        let compiled = Customer::query()
            .order_by(expr!(|c: Customer| c.id))
            .page(u64::MAX, 10)
            .compile(&MySqlSqlWriter::new())
            .expect("The query should compile");
        assert!(
            compiled.sql.ends_with("\nLIMIT 18446744073709551615, 10;"),
            "{}",
            compiled.sql
        );
        let compiled = Customer::query()
            .order_by(expr!(|c: Customer| c.id))
            .page(3, u64::MAX)
            .compile(&SqlServerSqlWriter::new())
            .expect("The query should compile");
        assert!(
            compiled.sql.ends_with(
                "\nOFFSET 18446744073709551615 ROWS FETCH NEXT 18446744073709551615 ROWS ONLY;"
            ),
            "{}",
            compiled.sql
        );
    }

    #[test]
    fn oracle_statements() {
        let writer = OracleSqlWriter::new();
        let error = insert_command(&writer, &CompileOptions::default(), &order(), true)
            .expect_err("The identity cannot be returned without an output bind");
        assert!(matches!(
            error.downcast_ref::<QuillError>(),
            Some(QuillError::Unsupported { .. })
        ));
        let command = insert_command(&writer, &CompileOptions::default(), &order(), false)
            .expect("The insert should compile");
        assert_eq!(
            command.sql,
            r#"INSERT INTO "orders" ("customer_id", "total") VALUES (:customer_id, :total);"#
        );
        let customers = [customer(1, "Alice"), customer(2, "Bob")];
        let commands = update_commands(&writer, &CompileOptions::default(), &customers)
            .expect("The updates should compile");
        assert_eq!(commands.len(), 1);
        assert_eq!(
            commands[0].sql,
            indoc! {r#"
                BEGIN
                UPDATE "customers" SET "name" = :name_0, "email" = :email_0
                WHERE "id" = :id_0;
                UPDATE "customers" SET "name" = :name_1, "email" = :email_1
                WHERE "id" = :id_1;
                END;
            "#}
            .trim()
        );
        assert_eq!(
            commands[0].param("name_1"),
            Some(&Value::Varchar(Some("Bob".into())))
        );
        assert_eq!(
            drop_table_command::<Customer>(&writer, true).sql,
            r#"DROP TABLE "customers";"#
        );
    }

    #[test]
    fn prefix_override() {
        let compiled = Customer::query()
            .filter(expr!(|c: Customer| c.id == 1))
            .compile_with(
                &PostgresSqlWriter::new(),
                &CompileOptions::default().parameter_prefix("$"),
            )
            .expect("The query should compile");
        assert!(compiled.sql.ends_with("\nWHERE a.\"id\" = $p0;"));
    }
}
