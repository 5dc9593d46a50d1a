#[cfg(test)]
mod tests {
    use quill::{Connection, Entity, Executor, QueryBuilder, SqliteSqlWriter, Value, expr};
    use quill_sqlite::SqliteConnection;
    use quill_tests::init_logs;
    use time::{
        Date, PrimitiveDateTime,
        macros::{date, datetime},
    };

    #[derive(Debug, Clone, PartialEq, Entity)]
    #[quill(table = "events")]
    struct Event {
        #[quill(primary_key)]
        id: i32,
        at: PrimitiveDateTime,
        day: Date,
    }

    fn events() -> Vec<Event> {
        vec![
            Event {
                id: 1,
                at: datetime!(2024-01-01 10:00:00),
                day: date!(2024-01-01),
            },
            Event {
                id: 2,
                at: datetime!(2024-01-01 12:30:00.25),
                day: date!(2024-03-01),
            },
            Event {
                id: 3,
                at: datetime!(2024-01-03 00:00:00),
                day: date!(2024-02-28),
            },
        ]
    }

    async fn ids<E: Executor>(executor: &mut E, query: &QueryBuilder<Event>) -> Vec<i32> {
        executor
            .query_all(&query.clone().order_by(expr!(|e: Event| e.id)))
            .await
            .expect("Failed to query the events")
            .into_iter()
            .map(|v| v.id)
            .collect()
    }

    #[tokio::test]
    async fn interval_arithmetic() {
        init_logs();
        let mut connection = SqliteConnection::connect("sqlite://:memory:")
            .await
            .expect("Could not open the in memory database");
        connection
            .create_table::<Event>(false)
            .await
            .expect("Failed to create the table");
        connection
            .insert_many(&events())
            .await
            .expect("Failed to insert the events");

        let next_day = Event::query()
            .filter(expr!(|e: Event| e.at + Interval::days(1) == datetime!(2024-01-02 10:00:00)));
        let compiled = next_day
            .compile(&SqliteSqlWriter::new())
            .expect("The query should compile");
        assert!(
            compiled.sql.ends_with(
                "WHERE RTRIM(RTRIM(strftime('%Y-%m-%d %H:%M:%f', a.\"at\", (((@p0) / 1000000.0) || ' seconds')), '0'), '.') = @p1;"
            ),
            "{}",
            compiled.sql
        );
        assert_eq!(ids(&mut connection, &next_day).await, [1]);

        let until = Event::query()
            .filter(expr!(|e: Event| e.at + Interval::days(1) <= datetime!(2024-01-02 10:00:00)));
        assert_eq!(ids(&mut connection, &until).await, [1]);

        // Fractional seconds compare equal to the stored text
        let earlier = Event::query().filter(expr!(
            |e: Event| e.at - Interval::hours(2) >= datetime!(2024-01-01 10:30:00.25)
        ));
        assert_eq!(ids(&mut connection, &earlier).await, [2, 3]);

        let leap = Event::query()
            .filter(expr!(|e: Event| e.day + Interval::days(1) == date!(2024-02-29)));
        assert_eq!(ids(&mut connection, &leap).await, [3]);

        // Constant side folded before binding
        let folded = Event::query()
            .filter(expr!(|e: Event| e.at == datetime!(2024-01-02 10:00:00) - Interval::days(1)));
        let compiled = folded
            .compile(&SqliteSqlWriter::new())
            .expect("The query should compile");
        assert!(compiled.sql.ends_with("WHERE a.\"at\" = @p0;"), "{}", compiled.sql);
        assert_eq!(
            compiled.params[0].value,
            Value::Timestamp(Some(datetime!(2024-01-01 10:00:00)))
        );
        assert_eq!(ids(&mut connection, &folded).await, [1]);
    }
}
