use crate::{Parameter, Value, truncate_long};
use std::{
    fmt::{self, Display},
    sync::Arc,
};

/// SQL text with its bound parameters, ready to be executed by an [`crate::Executor`].
///
/// The text may hold several statements separated by the dialect separator, drivers run them in
/// order and report the affected rows of each one.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Command {
    pub sql: String,
    pub params: Vec<Parameter>,
}

impl Command {
    pub fn new(sql: impl Into<String>, params: Vec<Parameter>) -> Self {
        Self {
            sql: sql.into(),
            params,
        }
    }

    /// Value bound to the parameter `name`, the dialect prefix excluded.
    pub fn param(&self, name: &str) -> Option<&Value> {
        self.params.iter().find(|v| v.name == name).map(|v| &v.value)
    }
}

impl From<&str> for Command {
    fn from(value: &str) -> Self {
        Command::new(value, Vec::new())
    }
}

impl From<String> for Command {
    fn from(value: String) -> Self {
        Command::new(value, Vec::new())
    }
}

impl Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", truncate_long!(self.sql))
    }
}

/// Outcome of a statement that modifies rows.
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowsAffected {
    pub rows_affected: u64,
    /// Generated identity of the last inserted row, when the driver reports one.
    pub last_affected_id: Option<i64>,
}

impl Extend<RowsAffected> for RowsAffected {
    fn extend<T: IntoIterator<Item = RowsAffected>>(&mut self, iter: T) {
        for item in iter {
            self.rows_affected += item.rows_affected;
            self.last_affected_id = item.last_affected_id.or(self.last_affected_id);
        }
    }
}

/// Result column labels, shared by every row of the same result set.
pub type RowNames = Arc<[String]>;

/// One result row, `values[i]` belongs to the column `labels[i]`.
#[derive(Debug, Clone)]
pub struct RowLabeled {
    pub labels: RowNames,
    pub values: Box<[Value]>,
}

impl RowLabeled {
    pub fn new(labels: RowNames, values: Box<[Value]>) -> Self {
        Self { labels, values }
    }
}

/// Item of the stream returned by `Executor::run`: a row or the outcome of a statement.
#[derive(Debug)]
pub enum QueryResult {
    Row(RowLabeled),
    Affected(RowsAffected),
}
