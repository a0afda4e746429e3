mod containers_tests;
mod datetimes_tests;

use tomlark_core::tree::Tree;

use crate::parser::parse_document;

fn parse(source: &str) -> Tree {
    match parse_document(source.as_bytes(), true) {
        Ok(tree) => tree,
        Err(e) => panic!("parse failed: {}", e.locate(source.as_bytes())),
    }
}

fn dump(source: &str) -> String {
    parse(source).dump(source)
}

fn parse_err(source: &str) -> String {
    let err = parse_document(source.as_bytes(), true)
        .expect_err("parse unexpectedly succeeded")
        .locate(source.as_bytes());
    err.to_string()
}
