//! Typed query expressions compiled to dialect specific SQL, with cached row materialization.
//!
//! Entities are plain structs deriving [`Entity`], predicates and projections are written as
//! closures inside [`expr!`] and compiled by a [`QueryBuilder`] against the dialect of the
//! connected driver.
pub use quill_core::*;
pub use quill_macros::*;
