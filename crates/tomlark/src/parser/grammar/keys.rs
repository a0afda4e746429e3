//! Keys and key/value expressions.

use tomlark_core::tree::{NodeId, NodeKind};

use crate::error::{Error, ErrorKind};
use crate::parser::Parser;
use crate::scan::{scan_basic_string, scan_follows, scan_literal_string, scan_unquoted_key};

impl<'a> Parser<'a> {
    /// `key = value`. The emitted node's first child is the value; the key
    /// parts follow as the value's siblings, in order.
    pub(in crate::parser) fn parse_keyval(&mut self) -> Result<NodeId, Error> {
        let start = self.offset();
        let mut children = self.parse_key()?;
        if !self.at(b'=') {
            return Err(self.error_here(ErrorKind::ExpectedEquals));
        }
        self.bump(1);
        self.skip_ws();
        let value = self.parse_value()?;
        children.insert(0, value);

        let keyval = self.tree.push(NodeKind::KeyValue, self.span_from(start));
        self.tree.link_children(keyval, &children);
        Ok(keyval)
    }

    /// One or more simple keys separated by `.`, with surrounding
    /// whitespace. Emits one `Key` node per part.
    pub(in crate::parser) fn parse_key(&mut self) -> Result<Vec<NodeId>, Error> {
        let mut parts = Vec::new();
        loop {
            self.skip_ws();
            parts.push(self.parse_simple_key()?);
            self.skip_ws();
            if self.at(b'.') {
                self.bump(1);
            } else {
                break;
            }
        }
        Ok(parts)
    }

    /// A literal string, a basic string, or a bare key.
    fn parse_simple_key(&mut self) -> Result<NodeId, Error> {
        // multi-line strings are never keys
        if scan_follows(self.rest(), b"\"\"\"") || scan_follows(self.rest(), b"'''") {
            return Err(self.error_here(ErrorKind::ExpectedKey));
        }
        let span = match self.peek() {
            Some(b'"') => self.take(scan_basic_string(self.rest()))?,
            Some(b'\'') => self.take(scan_literal_string(self.rest()))?,
            _ => {
                let (matched, _) = scan_unquoted_key(self.rest());
                if matched.is_empty() {
                    return Err(self.error_here(ErrorKind::ExpectedKey));
                }
                let start = self.offset();
                self.bump(matched.len());
                self.span_from(start)
            }
        };
        Ok(self.tree.push(NodeKind::Key, span))
    }
}
