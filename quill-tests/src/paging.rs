use crate::recreate_table;
use quill::{Entity, Executor, expr};

#[derive(Debug, Clone, PartialEq, Entity)]
#[quill(table = "paged_rows", prefix = "row_")]
struct PagedRow {
    #[quill(primary_key)]
    id: i32,
    label: String,
}

pub async fn paging<E: Executor>(executor: &mut E) {
    recreate_table::<PagedRow, _>(executor).await;
    let rows = (1..=25)
        .rev()
        .map(|id| PagedRow {
            id,
            label: format!("row {:02}", id),
        })
        .collect::<Vec<_>>();
    executor
        .insert_many(&rows)
        .await
        .expect("Failed to insert the paged rows");

    let ordered = PagedRow::query().order_by(expr!(|r: PagedRow| r.id));

    let second = executor
        .query_all(&ordered.clone().page(2, 10))
        .await
        .expect("Failed to query the second page");
    assert_eq!(
        second.iter().map(|v| v.id).collect::<Vec<_>>(),
        (11..=20).collect::<Vec<_>>()
    );
    assert_eq!(second[0].label, "row 11");

    let page = executor
        .query_page(&ordered, 3, 10)
        .await
        .expect("Failed to query the third page");
    assert_eq!(page.total, 25);
    assert_eq!(page.page_index, 3);
    assert_eq!(page.page_count(), 3);
    assert_eq!(
        page.items.iter().map(|v| v.id).collect::<Vec<_>>(),
        (21..=25).collect::<Vec<_>>()
    );

    let skipped = executor
        .query_all(&ordered.clone().skip(22))
        .await
        .expect("Failed to query with skip only");
    assert_eq!(
        skipped.iter().map(|v| v.id).collect::<Vec<_>>(),
        [23, 24, 25]
    );

    let taken = executor
        .query_all(
            &PagedRow::query()
                .filter(expr!(|r: PagedRow| r.label.ends_with("5")))
                .order_by_desc(expr!(|r: PagedRow| r.id))
                .take(2),
        )
        .await
        .expect("Failed to query with take only");
    assert_eq!(taken.iter().map(|v| v.id).collect::<Vec<_>>(), [25, 15]);

    let filtered = executor
        .query_page(
            &PagedRow::query()
                .filter(expr!(|r: PagedRow| r.id % 2 == 0))
                .order_by(expr!(|r: PagedRow| r.id)),
            1,
            5,
        )
        .await
        .expect("Failed to query a filtered page");
    assert_eq!(filtered.total, 12);
    assert_eq!(
        filtered.items.iter().map(|v| v.id).collect::<Vec<_>>(),
        [2, 4, 6, 8, 10]
    );
}
