//! Core data structures for the tomlark TOML decoder.
//!
//! Three layers, all free of pipeline logic:
//! - `span` - byte ranges into the decoded input, with line/column lookup
//! - `tree` - the arena-backed syntax tree the parser emits and the binder walks
//! - `datetime` - TOML date/time value types with their RFC 3339 text surface

pub mod datetime;
pub mod span;
pub mod tree;

#[cfg(test)]
mod datetime_tests;
#[cfg(test)]
mod tree_tests;

pub use datetime::{Date, Datetime, DatetimeParseError, Offset, Time};
pub use span::Span;
pub use tree::{Children, Node, NodeId, NodeKind, Tree, NIL};
