//! Parser state machine and low-level operations.

use tomlark_core::span::Span;
use tomlark_core::tree::{NodeId, NodeKind, Tree};

use crate::error::{Error, ErrorKind};
use crate::scan::{scan_comment, scan_crlf, scan_whitespace, Scanned};
use crate::tracker::Tracker;

/// Parse a complete document into an arena tree.
///
/// With `strict` set, every top-level expression passes through the
/// tracker before it is accepted; without it the structural rules of
/// TOML 1.0 are not enforced and later definitions win during binding.
pub(crate) fn parse_document(buf: &[u8], strict: bool) -> Result<Tree, Error> {
    Parser::new(buf, strict).parse()
}

pub(crate) struct Parser<'a> {
    buf: &'a [u8],
    pos: usize,
    pub(super) tree: Tree,
    tracker: Tracker,
    strict: bool,
}

impl<'a> Parser<'a> {
    fn new(buf: &'a [u8], strict: bool) -> Self {
        Self {
            buf,
            pos: 0,
            tree: Tree::new(),
            tracker: Tracker::new(),
            strict,
        }
    }

    fn parse(mut self) -> Result<Tree, Error> {
        loop {
            self.skip_ws();
            match self.peek() {
                None => break,
                Some(b'\n' | b'\r') => self.eat_newline()?,
                Some(b'#') => {
                    let comment = self.parse_comment()?;
                    self.tree.push_root(comment);
                    self.end_expression_line()?;
                }
                Some(b'[') => {
                    let header = self.parse_header()?;
                    self.check(header)?;
                    self.tree.push_root(header);
                    self.end_expression()?;
                }
                Some(_) => {
                    let keyval = self.parse_keyval()?;
                    self.check(keyval)?;
                    self.tree.push_root(keyval);
                    self.end_expression()?;
                }
            }
        }
        Ok(self.tree)
    }

    fn check(&mut self, node: NodeId) -> Result<(), Error> {
        if self.strict {
            self.tracker.check_expression(&self.tree, self.buf, node)
        } else {
            Ok(())
        }
    }

    /// Trailing whitespace, optional trailing comment, then newline or EOF.
    fn end_expression(&mut self) -> Result<(), Error> {
        self.skip_ws();
        if self.at(b'#') {
            let comment = self.parse_comment()?;
            self.tree.push_root(comment);
        }
        self.end_expression_line()
    }

    fn end_expression_line(&mut self) -> Result<(), Error> {
        match self.peek() {
            None => Ok(()),
            Some(b'\n' | b'\r') => self.eat_newline(),
            Some(_) => Err(self.error_here(ErrorKind::ExpectedNewline)),
        }
    }

    pub(super) fn parse_comment(&mut self) -> Result<NodeId, Error> {
        let span = self.take(scan_comment(self.rest()))?;
        Ok(self.tree.push(NodeKind::Comment, span))
    }

    // ---- byte-level primitives ----

    /// Unconsumed input. Scanners run over this slice.
    #[inline]
    pub(super) fn rest(&self) -> &'a [u8] {
        &self.buf[self.pos..]
    }

    #[inline]
    pub(super) fn peek(&self) -> Option<u8> {
        self.buf.get(self.pos).copied()
    }

    #[inline]
    pub(super) fn byte_at(&self, offset: usize) -> Option<u8> {
        self.buf.get(offset).copied()
    }

    #[inline]
    pub(super) fn at(&self, b: u8) -> bool {
        self.peek() == Some(b)
    }

    #[inline]
    pub(super) fn bump(&mut self, n: usize) {
        self.pos += n;
    }

    pub(super) fn skip_ws(&mut self) {
        let (matched, _) = scan_whitespace(self.rest());
        self.pos += matched.len();
    }

    /// Consume a scanner result: advance past the match and return its
    /// absolute span, or translate the relative error to input positions.
    pub(super) fn take(&mut self, scanned: Scanned<'a>) -> Result<Span, Error> {
        match scanned {
            Ok((matched, _)) => {
                let span = Span::new(self.pos as u32, (self.pos + matched.len()) as u32);
                self.pos += matched.len();
                Ok(span)
            }
            Err(e) => Err(Error::new(e.kind, e.span.offset(self.pos as u32))),
        }
    }

    pub(super) fn eat_newline(&mut self) -> Result<(), Error> {
        match self.peek() {
            Some(b'\n') => {
                self.pos += 1;
                Ok(())
            }
            Some(b'\r') => {
                self.take(scan_crlf(self.rest()))?;
                Ok(())
            }
            _ => Err(self.error_here(ErrorKind::ExpectedNewline)),
        }
    }

    pub(super) fn span_from(&self, start: usize) -> Span {
        Span::new(start as u32, self.pos as u32)
    }

    #[inline]
    pub(super) fn offset(&self) -> usize {
        self.pos
    }

    /// Error anchored at the current position.
    pub(super) fn error_here(&self, kind: ErrorKind) -> Error {
        let end = match self.peek() {
            Some(_) => self.pos + 1,
            None => self.pos,
        };
        Error::new(kind, Span::new(self.pos as u32, end as u32))
    }
}
