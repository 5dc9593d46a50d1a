use crate::{Order, seed_orders, silent_logs};
use quill::{AsValue, Command, Entity, Executor, Parameter, QuillError, expr, stream::TryStreamExt};
use rust_decimal::Decimal;

pub async fn raw_queries<E: Executor>(executor: &mut E) {
    seed_orders(executor).await;

    // Columns are matched by name, in any order
    let orders = executor
        .query_raw::<Order>(Command::from(
            r#"SELECT "total", "customer_id", "id" FROM "orders" ORDER BY "id";"#,
        ))
        .try_collect::<Vec<_>>()
        .await
        .expect("Failed to run the raw query");
    assert_eq!(orders.len(), 10);
    assert_eq!(orders[1].id, 2);
    assert_eq!(orders[1].customer_id, 7);
    assert_eq!(orders[1].total, Decimal::new(1505, 1));

    let pairs = executor
        .query_raw::<(i32, Decimal)>(Command::new(
            r#"SELECT "id", "total" FROM "orders" WHERE "customer_id" = @customer ORDER BY "id";"#,
            vec![Parameter::new("customer", 7.as_value())],
        ))
        .try_collect::<Vec<_>>()
        .await
        .expect("Failed to run the raw query with parameters");
    assert_eq!(
        pairs.iter().map(|v| v.0).collect::<Vec<_>>(),
        [1, 2, 4, 6, 8]
    );

    silent_logs! {
        let extra = executor
            .query_raw::<Order>(Command::from(
                r#"SELECT *, 1 AS "unexpected" FROM "orders" WHERE "id" = 3;"#,
            ))
            .try_collect::<Vec<_>>()
            .await
            .expect("Failed to run the raw query with an extra column");
        assert_eq!(extra.len(), 1);
        assert_eq!(extra[0].total, Decimal::from(300));
    }

    // The same shape decodes through the same compiled plan as a builder query
    let built = executor
        .query_all(&Order::query().filter(expr!(|o: Order| o.id == 3)))
        .await
        .expect("Failed to query the order");
    assert_eq!(built, extra_order());

    silent_logs! {
        let error = executor
            .query_raw::<(i32, i32)>(Command::from(r#"SELECT "id" FROM "orders";"#))
            .try_collect::<Vec<_>>()
            .await
            .expect_err("A single column cannot fill a pair");
        assert!(matches!(
            error.downcast_ref::<QuillError>(),
            Some(QuillError::SchemaMismatch { .. })
        ));
    }
}

fn extra_order() -> Vec<Order> {
    vec![Order {
        id: 3,
        customer_id: 3,
        total: Decimal::from(300),
    }]
}

#[derive(Debug, Clone, PartialEq, Entity)]
#[quill(table = "profiles")]
struct Profile {
    #[quill(primary_key)]
    id: i32,
    name: String,
    nickname: Option<String>,
}

pub async fn schema_change<E: Executor>(executor: &mut E) {
    executor
        .drop_table::<Profile>(true)
        .await
        .expect("Failed to drop the profiles table");
    executor
        .execute(Command::from(
            r#"CREATE TABLE "profiles" ("id" INTEGER PRIMARY KEY, "name" TEXT NOT NULL);
INSERT INTO "profiles" ("id", "name") VALUES (1, 'Jo'), (2, 'Sam');"#,
        ))
        .await
        .expect("Failed to create the first version of the profiles table");

    let select = r#"SELECT * FROM "profiles" ORDER BY "id";"#;
    let before = executor
        .query_raw::<Profile>(Command::from(select))
        .try_collect::<Vec<_>>()
        .await
        .expect("Failed to query the first version of the profiles");
    assert_eq!(
        before,
        [
            Profile {
                id: 1,
                name: "Jo".into(),
                nickname: None,
            },
            Profile {
                id: 2,
                name: "Sam".into(),
                nickname: None,
            },
        ]
    );

    executor
        .execute(Command::from(
            r#"ALTER TABLE "profiles" ADD COLUMN "nickname" TEXT;
UPDATE "profiles" SET "nickname" = 'Jojo' WHERE "id" = 1;"#,
        ))
        .await
        .expect("Failed to add the nickname column");
    let after = executor
        .query_raw::<Profile>(Command::from(select))
        .try_collect::<Vec<_>>()
        .await
        .expect("Failed to query the second version of the profiles");
    assert_eq!(after[0].nickname.as_deref(), Some("Jojo"));
    assert_eq!(after[1].nickname, None);

    let built = executor
        .query_all(&Profile::query().filter(expr!(|p: Profile| p.nickname != None)))
        .await
        .expect("Failed to query the profiles with a nickname");
    assert_eq!(built.len(), 1);
    assert_eq!(built[0].name, "Jo");
}
