use crate::{Customer, seed_customers};
use quill::{Entity, Executor, QueryBuilder, expr};

async fn ids<E: Executor>(executor: &mut E, query: QueryBuilder<Customer>) -> Vec<i32> {
    executor
        .query_all(
            &query
                .order_by(expr!(|c: Customer| c.id))
                .select::<i32>(expr!(|c: Customer| c.id)),
        )
        .await
        .expect("Failed to query the customers")
}

pub async fn functions<E: Executor>(executor: &mut E) {
    seed_customers(executor).await;

    // Literal pieces, a column and a captured value
    let tag = "vip";
    let formatted = ids(
        executor,
        Customer::query()
            .filter(expr!(|c: Customer| Str::format("{} #{}", c.name, tag) == "Anna #vip")),
    )
    .await;
    assert_eq!(formatted, [3]);

    let greetings = executor
        .query_all(
            &Customer::query()
                .filter(expr!(|c: Customer| c.id <= 2))
                .order_by(expr!(|c: Customer| c.id))
                .select::<String>(expr!(|c: Customer| Str::concat("Dear ", c.name, "!"))),
        )
        .await
        .expect("Failed to query the greetings");
    assert_eq!(greetings, ["Dear Alice!", "Dear Bob!"]);

    let wanted = vec![2, 4, 6];
    let found = ids(
        executor,
        Customer::query().filter(expr!(|c: Customer| Seq::contains(wanted, c.id))),
    )
    .await;
    assert_eq!(found, [2, 4]);
    let others = ids(
        executor,
        Customer::query().filter(expr!(|c: Customer| !Seq::contains(wanted, c.id))),
    )
    .await;
    assert_eq!(others, [1, 3, 5]);

    // Every argument known on the host, the filter is folded away
    let all = ids(
        executor,
        Customer::query().filter(expr!(|_c: Customer| Seq::contains(wanted, 4))),
    )
    .await;
    assert_eq!(all, [1, 2, 3, 4, 5]);
}
