mod as_value;
mod cache;
mod command;
mod connection;
mod convert;
mod db_type;
mod dialect;
mod driver;
mod entity;
mod error;
mod eval;
mod executor;
mod expr;
mod formatter;
mod materialize;
mod modify;
mod options;
mod plan;
mod query;
mod segment;
mod statement;
mod table;
mod util;
mod value;
mod visitor;

pub use ::anyhow::Context as ErrorContext;
pub use as_value::*;
pub use cache::*;
pub use command::*;
pub use connection::*;
pub use convert::*;
pub use db_type::*;
pub use dialect::*;
pub use driver::*;
pub use entity::*;
pub use error::*;
pub use eval::*;
pub use executor::*;
pub use expr::*;
pub use formatter::*;
pub use materialize::*;
pub use modify::*;
pub use options::*;
pub use plan::*;
pub use query::*;
pub use segment::*;
pub use statement::*;
pub use table::*;
pub use util::*;
pub use value::*;
pub use visitor::*;
pub mod stream {
    pub use ::futures::stream::*;
}
pub use ::futures::future;

pub type Result<T> = anyhow::Result<T>;
pub type Error = anyhow::Error;
