use quill::{Entity, Executor};
use rust_decimal::Decimal;

#[derive(Debug, Clone, PartialEq, Entity)]
#[quill(table = "orders")]
pub struct Order {
    #[quill(primary_key)]
    pub id: i32,
    pub customer_id: i32,
    pub total: Decimal,
}

#[derive(Debug, Clone, PartialEq, Entity)]
#[quill(table = "customers")]
pub struct Customer {
    #[quill(primary_key)]
    pub id: i32,
    pub name: String,
    pub email: Option<String>,
}

/// Ten orders, three of them from customer 7 with a total above 100.
pub fn sample_orders() -> Vec<Order> {
    [
        (1, 7, Decimal::new(50, 0)),
        (2, 7, Decimal::new(1505, 1)),
        (3, 3, Decimal::new(300, 0)),
        (4, 7, Decimal::new(120, 0)),
        (5, 4, Decimal::new(99, 0)),
        (6, 7, Decimal::new(100, 0)),
        (7, 5, Decimal::new(500, 0)),
        (8, 7, Decimal::new(25025, 2)),
        (9, 2, Decimal::new(10, 0)),
        (10, 6, Decimal::new(101, 0)),
    ]
    .into_iter()
    .map(|(id, customer_id, total)| Order {
        id,
        customer_id,
        total,
    })
    .collect()
}

pub fn sample_customers() -> Vec<Customer> {
    [
        (1, "Alice", Some("alice@example.com")),
        (2, "Bob", None),
        (3, "Anna", Some("anna@example.com")),
        (4, "Carl", None),
        (5, "Diana", Some("diana@example.com")),
    ]
    .into_iter()
    .map(|(id, name, email)| Customer {
        id,
        name: name.into(),
        email: email.map(Into::into),
    })
    .collect()
}

/// Drop and create the table of `T`.
pub async fn recreate_table<T: Entity, E: Executor>(executor: &mut E) {
    executor
        .drop_table::<T>(true)
        .await
        .expect("Failed to drop the table");
    executor
        .create_table::<T>(false)
        .await
        .expect("Failed to create the table");
}

pub async fn seed_orders<E: Executor>(executor: &mut E) {
    recreate_table::<Order, _>(executor).await;
    let result = executor
        .insert_many(&sample_orders())
        .await
        .expect("Failed to insert the orders");
    assert_eq!(result.rows_affected, 10);
}

pub async fn seed_customers<E: Executor>(executor: &mut E) {
    recreate_table::<Customer, _>(executor).await;
    executor
        .insert_many(&sample_customers())
        .await
        .expect("Failed to insert the customers");
}
