mod fixtures;
mod functions;
mod includes;
mod modify;
mod negation;
mod orders;
mod paging;
mod raw;

pub use fixtures::*;
use functions::functions;
use includes::includes;
use log::LevelFilter;
use modify::{batches, modify};
use negation::{empty_contains, negation};
use orders::{orders, projections};
use paging::paging;
use quill::Connection;
use raw::{raw_queries, schema_change};
use std::env;

pub fn init_logs() {
    let mut logger = env_logger::builder();
    logger
        .is_test(true)
        .format_file(true)
        .format_line_number(true);
    if env::var("RUST_LOG").is_err() {
        logger.filter_level(LevelFilter::Warn);
    }
    let _ = logger.try_init();
}

pub async fn execute_tests<C: Connection>(mut connection: C) {
    orders(&mut connection).await;
    projections(&mut connection).await;
    negation(&mut connection).await;
    empty_contains(&mut connection).await;
    functions(&mut connection).await;
    paging(&mut connection).await;
    includes(&mut connection).await;
    modify(&mut connection).await;
    batches(&mut connection).await;
    raw_queries(&mut connection).await;
    schema_change(&mut connection).await;
}

#[macro_export]
macro_rules! silent_logs {
    ($($code:tt)+) => {{
        let level = log::max_level();
        log::set_max_level(log::LevelFilter::Off);
        $($code)+
        log::set_max_level(level);
    }};
}
