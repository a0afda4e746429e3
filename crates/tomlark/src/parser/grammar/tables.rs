//! Table and array-of-tables headers.

use tomlark_core::tree::{NodeId, NodeKind};

use crate::error::{Error, ErrorKind};
use crate::parser::Parser;
use crate::scan::scan_follows;

impl<'a> Parser<'a> {
    /// `[ key ]` or `[[ key ]]`. Children are the key parts in order.
    pub(in crate::parser) fn parse_header(&mut self) -> Result<NodeId, Error> {
        let start = self.offset();
        let array = scan_follows(self.rest(), b"[[");
        self.bump(if array { 2 } else { 1 });

        let keys = self.parse_key()?;

        if !self.at(b']') {
            return Err(self.error_here(ErrorKind::Expected("`]`")));
        }
        self.bump(1);
        if array {
            // the closing brackets of `]]` must be adjacent
            if !self.at(b']') {
                return Err(self.error_here(ErrorKind::Expected("`]]`")));
            }
            self.bump(1);
        }

        let kind = if array {
            NodeKind::ArrayTable
        } else {
            NodeKind::Table
        };
        let header = self.tree.push(kind, self.span_from(start));
        self.tree.link_children(header, &keys);
        Ok(header)
    }
}
