//! Recursive-descent parser for TOML documents.
//!
//! # Architecture
//!
//! The parser consumes a complete byte buffer and emits nodes into the
//! arena [`Tree`](tomlark_core::tree::Tree):
//!
//! - Zero-copy: node payloads are byte spans, text is sliced on demand
//! - One pass: each top-level expression is handed to the tracker for
//!   structural validation before it is appended to the root chain
//! - Fail-fast: the first error aborts the parse; there is no recovery
//!
//! The low-level state machine lives in `core`; grammar productions are
//! `impl Parser` extensions spread across the `grammar` submodules.

mod core;
mod grammar;

#[cfg(test)]
mod tests;

pub(crate) use self::core::parse_document;
pub(in crate::parser) use self::core::Parser;
