use crate::{Order, seed_orders};
use quill::{Driver, Entity, Executor, Value, expr};
use rust_decimal::Decimal;

pub async fn orders<E: Executor>(executor: &mut E) {
    seed_orders(executor).await;

    let customer = 7;
    let query = Order::query()
        .filter(expr!(|o: Order| o.customer_id == customer && o.total > Decimal::from(100)))
        .order_by(expr!(|o: Order| o.id));

    // Bindings
    let writer = executor.driver().sql_writer();
    let compiled = query
        .compile(&writer)
        .expect("Failed to compile the orders query");
    assert_eq!(compiled.params.len(), 2);
    assert_eq!(compiled.params[0].name, "p0");
    assert_eq!(compiled.params[0].value, Value::Int32(Some(7)));
    assert_eq!(compiled.params[1].name, "p1");
    assert_eq!(compiled.params[1].value, Value::Decimal(Some(Decimal::from(100))));
    let again = query
        .compile(&writer)
        .expect("Failed to compile the orders query again");
    assert_eq!(compiled.sql, again.sql);
    assert_eq!(compiled.params, again.params);

    // Execution
    let found = executor
        .query_all(&query)
        .await
        .expect("Failed to query the orders");
    assert_eq!(
        found,
        [
            Order {
                id: 2,
                customer_id: 7,
                total: Decimal::new(1505, 1),
            },
            Order {
                id: 4,
                customer_id: 7,
                total: Decimal::from(120),
            },
            Order {
                id: 8,
                customer_id: 7,
                total: Decimal::new(25025, 2),
            },
        ]
    );

    let first = executor
        .query_first(&Order::query().filter(expr!(|o: Order| o.id == 5)))
        .await
        .expect("Failed to query the first order");
    assert_eq!(
        first,
        Some(Order {
            id: 5,
            customer_id: 4,
            total: Decimal::from(99),
        })
    );
    let missing = executor
        .query_first(&Order::query().filter(expr!(|o: Order| o.id > 100)))
        .await
        .expect("Failed to query a missing order");
    assert_eq!(missing, None);

    // Constant predicates do not reach the database
    let everything = executor
        .query_all(&Order::query().filter(expr!(|o: Order| 1 + 1 == 2 || o.id == 3)))
        .await
        .expect("Failed to query with a constant predicate");
    assert_eq!(everything.len(), 10);
    let nothing = executor
        .query_all(&Order::query().filter(expr!(|o: Order| 2 + 3 == 6 && o.id == 3)))
        .await
        .expect("Failed to query with a false predicate");
    assert!(nothing.is_empty());
}

pub async fn projections<E: Executor>(executor: &mut E) {
    seed_orders(executor).await;

    let totals = executor
        .query_all(
            &Order::query()
                .filter(expr!(|o: Order| o.customer_id == 7))
                .order_by_desc(expr!(|o: Order| o.total))
                .select::<(i32, Decimal)>(expr!(|o: Order| (o.id, o.total))),
        )
        .await
        .expect("Failed to query the projected totals");
    assert_eq!(
        totals,
        [
            (8, Decimal::new(25025, 2)),
            (2, Decimal::new(1505, 1)),
            (4, Decimal::from(120)),
            (6, Decimal::from(100)),
            (1, Decimal::from(50)),
        ]
    );

    let discounted = executor
        .query_all(
            &Order::query()
                .filter(expr!(|o: Order| o.id <= 2))
                .order_by(expr!(|o: Order| o.id))
                .select::<i32>(expr!(|o: Order| o.id * 10 + 1)),
        )
        .await
        .expect("Failed to query an arithmetic projection");
    assert_eq!(discounted, [11, 21]);

    let per_customer = executor
        .query_all(
            &Order::query()
                .group_by(expr!(|o: Order| o.customer_id))
                .order_by(expr!(|o: Order| o.customer_id))
                .select::<(i32, i64)>(expr!(|o: Order| (o.customer_id, Sql::count(o.id)))),
        )
        .await
        .expect("Failed to query the orders per customer");
    assert_eq!(per_customer.len(), 6);
    assert_eq!(per_customer[0], (2, 1));
    assert_eq!(per_customer[5], (7, 5));

    let biggest = executor
        .query_first(
            &Order::query()
                .filter(expr!(|o: Order| o.customer_id != 7))
                .select::<Option<Decimal>>(expr!(|o: Order| Sql::max(o.total))),
        )
        .await
        .expect("Failed to query the maximum total")
        .flatten();
    assert_eq!(biggest, Some(Decimal::from(500)));
}
