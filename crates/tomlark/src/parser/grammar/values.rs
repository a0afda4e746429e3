//! Value dispatch, arrays, and inline tables.

use tomlark_core::span::Span;
use tomlark_core::tree::{NodeId, NodeKind, NIL};

use crate::error::{Error, ErrorKind};
use crate::parser::Parser;
use crate::scan::{
    scan_basic_string, scan_comment, scan_follows, scan_literal_string, scan_ml_basic_string,
    scan_ml_literal_string,
};

impl<'a> Parser<'a> {
    /// Dispatch on the first non-whitespace byte of a value.
    pub(in crate::parser) fn parse_value(&mut self) -> Result<NodeId, Error> {
        match self.peek() {
            Some(b'"') => {
                let scanned = if scan_follows(self.rest(), b"\"\"\"") {
                    scan_ml_basic_string(self.rest())
                } else {
                    scan_basic_string(self.rest())
                };
                let span = self.take(scanned)?;
                Ok(self.tree.push(NodeKind::String, span))
            }
            Some(b'\'') => {
                let scanned = if scan_follows(self.rest(), b"'''") {
                    scan_ml_literal_string(self.rest())
                } else {
                    scan_literal_string(self.rest())
                };
                let span = self.take(scanned)?;
                Ok(self.tree.push(NodeKind::String, span))
            }
            Some(b't') => self.parse_keyword(b"true"),
            Some(b'f') => self.parse_keyword(b"false"),
            Some(b'[') => self.parse_array(),
            Some(b'{') => self.parse_inline_table(),
            Some(b'+' | b'-' | b'0'..=b'9' | b'i' | b'n') => self.parse_number_or_date(),
            _ => Err(self.error_here(ErrorKind::ExpectedValue)),
        }
    }

    fn parse_keyword(&mut self, keyword: &'static [u8]) -> Result<NodeId, Error> {
        if !scan_follows(self.rest(), keyword) {
            return Err(self.error_here(ErrorKind::ExpectedValue));
        }
        let start = self.offset();
        self.bump(keyword.len());
        Ok(self.tree.push(NodeKind::Bool, self.span_from(start)))
    }

    /// `[ value, value, ... ]`. Whitespace, newlines, and comments are free
    /// inside; a trailing comma is allowed, a leading one is not.
    fn parse_array(&mut self) -> Result<NodeId, Error> {
        let start = self.offset();
        self.bump(1);
        let array = self.tree.push(NodeKind::Array, Span::empty(start as u32));
        let mut last = NIL;

        loop {
            self.skip_array_trivia()?;
            match self.peek() {
                None => return Err(self.error_here(ErrorKind::Expected("`]`"))),
                Some(b']') => {
                    self.bump(1);
                    break;
                }
                _ => {}
            }

            let value = self.parse_value()?;
            self.tree.append_child(array, value, &mut last);

            self.skip_array_trivia()?;
            match self.peek() {
                Some(b',') => self.bump(1),
                Some(b']') => {
                    self.bump(1);
                    break;
                }
                None => return Err(self.error_here(ErrorKind::Expected("`]`"))),
                Some(_) => return Err(self.error_here(ErrorKind::Expected("`,` or `]`"))),
            }
        }

        self.tree.set_span(array, self.span_from(start));
        Ok(array)
    }

    /// Whitespace, newlines, and comments between array elements.
    /// Comments here are consumed, not kept: array children are elements.
    fn skip_array_trivia(&mut self) -> Result<(), Error> {
        loop {
            self.skip_ws();
            match self.peek() {
                Some(b'\n' | b'\r') => self.eat_newline()?,
                Some(b'#') => {
                    self.take(scan_comment(self.rest()))?;
                }
                _ => return Ok(()),
            }
        }
    }

    /// `{ key = value, ... }` on a single line. Children are `KeyValue`
    /// nodes in declaration order. No trailing comma, no newlines.
    fn parse_inline_table(&mut self) -> Result<NodeId, Error> {
        let start = self.offset();
        self.bump(1);
        let table = self
            .tree
            .push(NodeKind::InlineTable, Span::empty(start as u32));
        let mut last = NIL;

        self.skip_ws();
        if self.at(b'}') {
            self.bump(1);
            self.tree.set_span(table, self.span_from(start));
            return Ok(table);
        }

        loop {
            self.skip_ws();
            if matches!(self.peek(), Some(b'\n' | b'\r')) {
                return Err(self.error_here(ErrorKind::NewlineInInlineTable));
            }

            let keyval = self.parse_keyval()?;
            self.tree.append_child(table, keyval, &mut last);

            self.skip_ws();
            match self.peek() {
                Some(b',') => self.bump(1),
                Some(b'}') => {
                    self.bump(1);
                    break;
                }
                Some(b'\n' | b'\r') => {
                    return Err(self.error_here(ErrorKind::NewlineInInlineTable));
                }
                None => return Err(self.error_here(ErrorKind::Expected("`}`"))),
                Some(_) => return Err(self.error_here(ErrorKind::Expected("`,` or `}`"))),
            }
        }

        self.tree.set_span(table, self.span_from(start));
        Ok(table)
    }
}
