#[cfg(test)]
mod tests {
    use quill_core::Connection;
    use quill_sqlite::SqliteConnection;
    use quill_tests::{execute_tests, init_logs};

    #[tokio::test]
    async fn sqlite() {
        init_logs();
        let connection = SqliteConnection::connect("sqlite://:memory:")
            .await
            .expect("Could not open the in memory database");
        execute_tests(connection).await;
    }
}
