use crate::{Customer, Order, seed_customers, seed_orders};
use quill::{Entity, Executor, QueryBuilder, expr};
use rust_decimal::Decimal;
use std::collections::BTreeSet;

async fn ids<E: Executor>(executor: &mut E, query: QueryBuilder<Order>) -> BTreeSet<i32> {
    executor
        .query_all(&query)
        .await
        .expect("Failed to query the orders")
        .into_iter()
        .map(|v| v.id)
        .collect()
}

async fn names<E: Executor>(executor: &mut E, query: QueryBuilder<Customer>) -> BTreeSet<String> {
    executor
        .query_all(&query)
        .await
        .expect("Failed to query the customers")
        .into_iter()
        .map(|v| v.name)
        .collect()
}

pub async fn negation<E: Executor>(executor: &mut E) {
    seed_orders(executor).await;
    seed_customers(executor).await;

    let all = ids(executor, Order::query()).await;
    assert_eq!(all.len(), 10);

    // NOT over a comparison is the flipped comparison
    let negated = ids(
        executor,
        Order::query().filter(expr!(|o: Order| !(o.total > Decimal::from(100)))),
    )
    .await;
    let flipped = ids(
        executor,
        Order::query().filter(expr!(|o: Order| o.total <= Decimal::from(100))),
    )
    .await;
    assert_eq!(negated, flipped);
    assert_eq!(negated, BTreeSet::from([1, 5, 6, 9]));

    // De Morgan
    let negated = ids(
        executor,
        Order::query().filter(expr!(
            |o: Order| !(o.customer_id == 7 && o.total > Decimal::from(100))
        )),
    )
    .await;
    let expanded = ids(
        executor,
        Order::query().filter(expr!(
            |o: Order| o.customer_id != 7 || o.total <= Decimal::from(100)
        )),
    )
    .await;
    assert_eq!(negated, expanded);
    assert_eq!(negated.len(), 7);

    // Double negation cancels out
    let twice = ids(
        executor,
        Order::query().filter(expr!(|o: Order| !!(o.customer_id == 7))),
    )
    .await;
    assert_eq!(twice, BTreeSet::from([1, 2, 4, 6, 8]));

    // Membership
    let selected = vec![2, 3, 5];
    let inside = ids(
        executor,
        Order::query().filter(expr!(|o: Order| selected.contains(&o.id))),
    )
    .await;
    let outside = ids(
        executor,
        Order::query().filter(expr!(|o: Order| !selected.contains(&o.id))),
    )
    .await;
    assert_eq!(inside, BTreeSet::from([2, 3, 5]));
    assert!(inside.is_disjoint(&outside));
    assert_eq!(inside.union(&outside).count(), all.len());

    // Pattern matching
    let everyone = names(executor, Customer::query()).await;
    let starting = names(
        executor,
        Customer::query().filter(expr!(|c: Customer| c.name.starts_with("A"))),
    )
    .await;
    let not_starting = names(
        executor,
        Customer::query().filter(expr!(|c: Customer| !c.name.starts_with("A"))),
    )
    .await;
    assert_eq!(starting, BTreeSet::from(["Alice".into(), "Anna".into()]));
    assert_eq!(
        not_starting,
        everyone.difference(&starting).cloned().collect::<BTreeSet<_>>()
    );
    let containing = names(
        executor,
        Customer::query().filter(expr!(|c: Customer| !c.name.contains("n"))),
    )
    .await;
    assert_eq!(
        containing,
        BTreeSet::from(["Alice".into(), "Bob".into(), "Carl".into()])
    );

    // Null comparisons
    let without_email = names(
        executor,
        Customer::query().filter(expr!(|c: Customer| c.email == None)),
    )
    .await;
    let with_email = names(
        executor,
        Customer::query().filter(expr!(|c: Customer| !(c.email == None))),
    )
    .await;
    assert_eq!(without_email, BTreeSet::from(["Bob".into(), "Carl".into()]));
    assert_eq!(
        with_email,
        everyone.difference(&without_email).cloned().collect::<BTreeSet<_>>()
    );
}

pub async fn empty_contains<E: Executor>(executor: &mut E) {
    seed_orders(executor).await;

    let none: Vec<i32> = Vec::new();
    let found = ids(
        executor,
        Order::query().filter(expr!(|o: Order| none.contains(&o.id))),
    )
    .await;
    assert!(found.is_empty());
    let found = ids(
        executor,
        Order::query().filter(expr!(|o: Order| !none.contains(&o.id))),
    )
    .await;
    assert_eq!(found.len(), 10);
    let found = ids(
        executor,
        Order::query().filter(expr!(|o: Order| none.contains(&o.id) || o.id == 4)),
    )
    .await;
    assert_eq!(found, BTreeSet::from([4]));
}
