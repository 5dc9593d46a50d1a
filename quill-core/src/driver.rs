use crate::{Connection, SqlWriter};

pub trait Driver: Send + Sync {
    type Connection: Connection;
    type SqlWriter: SqlWriter;

    /// Scheme of the URLs accepted by [`Connection::connect`].
    const NAME: &'static str;

    fn sql_writer(&self) -> Self::SqlWriter;
}
