use crate::{
    CBox, SqliteDriver,
    bind::bind_parameters,
    error_message_from_ptr,
    extract::{extract_name, extract_value},
};
use async_stream::stream;
use libsqlite3_sys::{
    SQLITE_BUSY, SQLITE_DONE, SQLITE_OK, SQLITE_OPEN_CREATE, SQLITE_OPEN_READWRITE,
    SQLITE_OPEN_URI, SQLITE_ROW, sqlite3, sqlite3_changes, sqlite3_close, sqlite3_column_count,
    sqlite3_errmsg, sqlite3_finalize, sqlite3_last_insert_rowid, sqlite3_open_v2,
    sqlite3_prepare_v2, sqlite3_step, sqlite3_stmt,
};
use quill_core::{
    Command, Connection, Error, ErrorContext, Executor, QueryResult, Result, RowLabeled,
    RowsAffected, stream::Stream, truncate_long,
};
use std::{
    ffi::{CStr, CString, c_char},
    ptr,
    sync::{
        Arc,
        atomic::{AtomicPtr, Ordering},
    },
};
use tokio::{
    sync::mpsc::{UnboundedSender, unbounded_channel},
    task::spawn_blocking,
};

pub struct SqliteConnection {
    pub(crate) connection: CBox<sqlite3>,
}

fn last_error(connection: *mut sqlite3) -> Error {
    Error::msg(unsafe { error_message_from_ptr(&sqlite3_errmsg(connection)).to_string() })
}

/// First keyword of a statement after any leading comment, uppercase.
fn statement_kind(sql: &[u8]) -> String {
    let sql = String::from_utf8_lossy(sql);
    let mut rest = sql.trim_start();
    loop {
        if let Some(comment) = rest.strip_prefix("--") {
            rest = comment.split_once('\n').map(|v| v.1).unwrap_or_default();
        } else if let Some(comment) = rest.strip_prefix("/*") {
            rest = comment.split_once("*/").map(|v| v.1).unwrap_or_default();
        } else {
            break;
        }
        rest = rest.trim_start();
    }
    rest.split(|c: char| !c.is_ascii_alphabetic())
        .next()
        .unwrap_or_default()
        .to_ascii_uppercase()
}

/// Step through one prepared statement sending the rows, then the affected count for statements
/// that modify rows. Returns false once the receiver is gone.
fn step(
    connection: *mut sqlite3,
    statement: *mut sqlite3_stmt,
    kind: &str,
    tx: &UnboundedSender<Result<QueryResult>>,
) -> Result<bool> {
    let count = unsafe { sqlite3_column_count(statement) };
    let labels = (0..count)
        .map(|i| extract_name(statement, i))
        .collect::<Result<Arc<[_]>>>()?;
    loop {
        match unsafe { sqlite3_step(statement) } {
            SQLITE_BUSY => continue,
            SQLITE_DONE => break,
            SQLITE_ROW => {
                let values = (0..count)
                    .map(|i| extract_value(statement, i))
                    .collect::<Result<Box<[_]>>>()?;
                let row = RowLabeled::new(labels.clone(), values);
                if tx.send(Ok(QueryResult::Row(row))).is_err() {
                    return Ok(false);
                }
            }
            _ => return Err(last_error(connection)),
        }
    }
    let affected = match kind {
        "INSERT" | "REPLACE" => RowsAffected {
            rows_affected: unsafe { sqlite3_changes(connection) } as u64,
            last_affected_id: Some(unsafe { sqlite3_last_insert_rowid(connection) }),
        },
        "UPDATE" | "DELETE" => RowsAffected {
            rows_affected: unsafe { sqlite3_changes(connection) } as u64,
            last_affected_id: None,
        },
        _ if count == 0 => RowsAffected::default(),
        _ => return Ok(true),
    };
    Ok(tx.send(Ok(QueryResult::Affected(affected))).is_ok())
}

/// Prepare and run every statement of the command text in order.
fn execute(
    connection: *mut sqlite3,
    command: &Command,
    tx: &UnboundedSender<Result<QueryResult>>,
) -> Result<()> {
    let sql = CString::new(command.sql.as_bytes())
        .context("Could not create a CString from the query String")?;
    let mut tail: *const c_char = sql.as_ptr();
    loop {
        let remaining = unsafe { CStr::from_ptr(tail) }.to_bytes();
        if remaining.iter().all(u8::is_ascii_whitespace) {
            return Ok(());
        }
        let mut statement = CBox::new(ptr::null_mut::<sqlite3_stmt>(), |p| unsafe {
            sqlite3_finalize(p);
        });
        let mut next: *const c_char = ptr::null();
        let rc = unsafe {
            sqlite3_prepare_v2(connection, tail, -1, &mut *statement, &mut next)
        };
        if rc != SQLITE_OK {
            return Err(last_error(connection));
        }
        let consumed = (next as usize).saturating_sub(tail as usize);
        let kind = statement_kind(&remaining[..consumed.min(remaining.len())]);
        tail = next;
        // Comment or lone separator
        if statement.is_null() {
            continue;
        }
        bind_parameters(connection, *statement, &command.params)?;
        if !step(connection, *statement, &kind, tx)? {
            return Ok(());
        }
    }
}

impl Executor for SqliteConnection {
    type Driver = SqliteDriver;

    fn driver(&self) -> &Self::Driver {
        &SqliteDriver {}
    }

    fn run(&mut self, command: Command) -> impl Stream<Item = Result<QueryResult>> + Send {
        let connection = AtomicPtr::new(*self.connection);
        stream! {
            let (tx, mut rx) = unbounded_channel();
            let task = spawn_blocking(move || {
                let connection = connection.load(Ordering::Relaxed);
                if let Err(e) = execute(connection, &command, &tx) {
                    let e = e.context(format!(
                        "While executing the query:\n{}",
                        truncate_long!(command.sql)
                    ));
                    log::error!("{:#}", e);
                    let _ = tx.send(Err(e));
                }
            });
            while let Some(item) = rx.recv().await {
                yield item;
            }
            if let Err(e) = task.await {
                yield Err(Error::new(e).context("The sqlite worker stopped unexpectedly"));
            }
        }
    }
}

impl Connection for SqliteConnection {
    async fn connect(url: &str) -> Result<SqliteConnection> {
        let path = Self::strip_scheme(url)?;
        let context = || format!("Error while decoding connection URL: `{}`", url);
        let path = CString::new(path).with_context(context)?;
        let mut connection = CBox::new(ptr::null_mut::<sqlite3>(), |p| unsafe {
            sqlite3_close(p);
        });
        let rc = unsafe {
            sqlite3_open_v2(
                path.as_ptr(),
                &mut *connection,
                SQLITE_OPEN_READWRITE | SQLITE_OPEN_CREATE | SQLITE_OPEN_URI,
                ptr::null(),
            )
        };
        if rc != SQLITE_OK {
            let error = last_error(*connection).context(context());
            log::error!("{:#}", error);
            return Err(error);
        }
        log::debug!("Connected to sqlite database `{}`", url);
        Ok(Self { connection })
    }
}

#[cfg(test)]
mod tests {
    use super::statement_kind;

    #[test]
    fn statement_kind_skips_comments() {
        assert_eq!(statement_kind(b"  insert into t values (1)"), "INSERT");
        assert_eq!(statement_kind(b"-- seed\n  UPDATE t SET a = 1"), "UPDATE");
        assert_eq!(statement_kind(b"/* a */ /* b */DELETE FROM t"), "DELETE");
        assert_eq!(statement_kind(b"-- only a comment"), "");
    }
}
