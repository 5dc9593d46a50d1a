#[cfg(test)]
mod tests {
    use quill_core::{
        Command, Connection, Executor, QueryResult, QuillError, Value,
        stream::{StreamExt, TryStreamExt},
    };
    use quill_sqlite::SqliteConnection;
    use quill_tests::{init_logs, silent_logs};
    use std::{path::Path, sync::Mutex};
    use tokio::fs;

    static MUTEX: Mutex<()> = Mutex::new(());

    #[tokio::test]
    async fn create_database() {
        init_logs();
        const DB_PATH: &str = "../target/debug/creation.sqlite";
        let _guard = MUTEX.lock().unwrap();
        if Path::new(DB_PATH).exists() {
            fs::remove_file(DB_PATH)
                .await
                .expect("Failed to remove the test database file");
        }
        SqliteConnection::connect(&format!("sqlite://{}", DB_PATH))
            .await
            .expect("Could not open the database");
        assert!(
            Path::new(DB_PATH).exists(),
            "Database file should be created after connection"
        );
        SqliteConnection::connect(&format!("sqlite://file:{}?mode=ro", DB_PATH))
            .await
            .expect("Could not open the database in read only mode");
        fs::remove_file(DB_PATH)
            .await
            .expect("Failed to remove the test database file");
        silent_logs! {
            assert!(
                SqliteConnection::connect(&format!("sqlite://file:{}?mode=ro", DB_PATH))
                    .await
                    .is_err(),
                "A missing database cannot be opened in read only mode"
            );
        }
    }

    #[tokio::test]
    async fn wrong_url() {
        silent_logs! {
            let error = SqliteConnection::connect("postgres://localhost/db")
                .await
                .err()
                .expect("The scheme must be rejected");
            assert!(matches!(
                error.downcast_ref::<QuillError>(),
                Some(QuillError::Configuration(..))
            ));
        }
    }

    #[tokio::test]
    async fn multiple_statements() {
        init_logs();
        let mut connection = SqliteConnection::connect("sqlite://:memory:")
            .await
            .expect("Could not open the in memory database");
        let results = connection
            .run(Command::from(
                "CREATE TABLE t (a INTEGER, b TEXT);
                -- seed
                INSERT INTO t VALUES (1, 'one'), (2, 'two');
                SELECT a, b FROM t ORDER BY a;
                DELETE FROM t WHERE a = 1;",
            ))
            .try_collect::<Vec<_>>()
            .await
            .expect("Failed to run the statements");
        let mut results = results.into_iter();
        assert!(matches!(
            results.next(),
            Some(QueryResult::Affected(v)) if v.rows_affected == 0
        ));
        assert!(matches!(
            results.next(),
            Some(QueryResult::Affected(v)) if v.rows_affected == 2 && v.last_affected_id == Some(2)
        ));
        let Some(QueryResult::Row(row)) = results.next() else {
            panic!("Expected the first row");
        };
        assert_eq!(*row.labels, ["a".to_string(), "b".to_string()]);
        assert_eq!(
            *row.values,
            [Value::Int64(Some(1)), Value::Varchar(Some("one".into()))]
        );
        assert!(matches!(results.next(), Some(QueryResult::Row(..))));
        assert!(matches!(
            results.next(),
            Some(QueryResult::Affected(v)) if v.rows_affected == 1
        ));
        assert!(results.next().is_none());
    }

    #[tokio::test]
    async fn named_parameters() {
        init_logs();
        let mut connection = SqliteConnection::connect("sqlite://:memory:")
            .await
            .expect("Could not open the in memory database");
        let rows = connection
            .fetch(Command::new(
                "SELECT @a + 1 AS x, :b AS y, $c AS z;",
                vec![
                    quill_core::Parameter::new("a", Value::Int32(Some(41))),
                    quill_core::Parameter::new("b", Value::Boolean(Some(true))),
                    quill_core::Parameter::new("c", Value::Null),
                    quill_core::Parameter::new("unused", Value::Float64(Some(1.5))),
                ],
            ))
            .try_collect::<Vec<_>>()
            .await
            .expect("Failed to bind the parameters");
        assert_eq!(rows.len(), 1);
        assert_eq!(
            *rows[0].values,
            [Value::Int64(Some(42)), Value::Int64(Some(1)), Value::Null]
        );
    }

    #[tokio::test]
    async fn bad_query() {
        init_logs();
        let mut connection = SqliteConnection::connect("sqlite://:memory:")
            .await
            .expect("Could not open the in memory database");
        silent_logs! {
            let result = connection
                .execute(Command::from("SELEC 1;"))
                .await;
            assert!(result.is_err());
        }
        // The connection keeps working
        let rows = connection
            .run(Command::from("SELECT 1;"))
            .collect::<Vec<_>>()
            .await;
        assert_eq!(rows.len(), 1);
    }
}
