use crate::{Customer, recreate_table, seed_customers};
use quill::{Entity, Executor, expr};
use rust_decimal::Decimal;

#[derive(Debug, Clone, PartialEq, Entity)]
#[quill(table = "invoices")]
struct Invoice {
    #[quill(primary_key)]
    id: i32,
    customer_id: i32,
    amount: Decimal,
    #[quill(include = "customer_id")]
    customer: Option<Customer>,
}

impl Invoice {
    fn new(id: i32, customer_id: i32, amount: i64) -> Self {
        Self {
            id,
            customer_id,
            amount: Decimal::from(amount),
            customer: None,
        }
    }
}

pub async fn includes<E: Executor>(executor: &mut E) {
    seed_customers(executor).await;
    recreate_table::<Invoice, _>(executor).await;
    let invoices = [
        Invoice::new(1, 1, 10),
        Invoice::new(2, 1, 20),
        Invoice::new(3, 2, 30),
        Invoice::new(4, 99, 40),
    ];
    executor
        .insert_many(&invoices)
        .await
        .expect("Failed to insert the invoices");

    // Without include the navigation stays empty
    let plain = executor
        .query_all(&Invoice::query().order_by(expr!(|i: Invoice| i.id)))
        .await
        .expect("Failed to query the invoices");
    assert_eq!(plain, invoices);

    let loaded = executor
        .query_all(
            &Invoice::query()
                .include("customer")
                .order_by(expr!(|i: Invoice| i.id)),
        )
        .await
        .expect("Failed to query the invoices with their customer");
    assert_eq!(loaded.len(), 4);
    let alice = Customer {
        id: 1,
        name: "Alice".into(),
        email: Some("alice@example.com".into()),
    };
    // Two invoices share the same customer row, each one gets its own copy
    assert_eq!(loaded[0].customer.as_ref(), Some(&alice));
    assert_eq!(loaded[1].customer.as_ref(), Some(&alice));
    assert_eq!(loaded[1].amount, Decimal::from(20));
    assert_eq!(
        loaded[2].customer,
        Some(Customer {
            id: 2,
            name: "Bob".into(),
            email: None,
        })
    );
    assert_eq!(loaded[2].id, 3);
    // Dangling key
    assert_eq!(loaded[3].customer, None);
    assert_eq!(loaded[3].customer_id, 99);

    // Explicit join
    let joined = executor
        .query_all(
            &Invoice::query()
                .inner_join::<Customer>(expr!(|i: Invoice, c: Customer| i.customer_id == c.id))
                .filter(expr!(|_i: Invoice, c: Customer| c.name == "Alice"))
                .order_by(expr!(|i: Invoice| i.id))
                .select::<(i32, String, Decimal)>(expr!(
                    |i: Invoice, c: Customer| (i.id, c.name.to_uppercase(), i.amount)
                )),
        )
        .await
        .expect("Failed to query the joined invoices");
    assert_eq!(
        joined,
        [
            (1, "ALICE".to_string(), Decimal::from(10)),
            (2, "ALICE".to_string(), Decimal::from(20)),
        ]
    );

    let without_invoice = executor
        .query_all(
            &Customer::query()
                .left_join::<Invoice>(expr!(|c: Customer, i: Invoice| c.id == i.customer_id))
                .filter(expr!(|_c: Customer, i: Invoice| i.id == None))
                .order_by(expr!(|c: Customer| c.id))
                .select::<i32>(expr!(|c: Customer| c.id)),
        )
        .await
        .expect("Failed to query the customers without invoices");
    assert_eq!(without_invoice, [3, 4, 5]);
}
