//! Integers, floats, and the numeric/temporal disambiguation.

use tomlark_core::tree::{NodeId, NodeKind};

use crate::error::{Error, ErrorKind};
use crate::parser::Parser;
use crate::scan::scan_follows;

impl<'a> Parser<'a> {
    /// First byte was `+`, `-`, a digit, `i`, or `n`. Peek past the
    /// optional sign: `:` at position 2 means a local time, `-` at
    /// position 4 means a date; otherwise it is an integer or a float.
    pub(in crate::parser) fn parse_number_or_date(&mut self) -> Result<NodeId, Error> {
        let rest = self.rest();
        let signed = matches!(rest.first(), Some(b'+' | b'-'));
        let body = if signed { &rest[1..] } else { rest };

        if scan_follows(body, b"inf") || scan_follows(body, b"nan") {
            let start = self.offset();
            self.bump(if signed { 4 } else { 3 });
            return Ok(self.tree.push(NodeKind::Float, self.span_from(start)));
        }

        if !signed {
            if body.len() >= 3 && body[2] == b':' {
                return self.parse_local_time();
            }
            if body.len() >= 5 && body[4] == b'-' {
                return self.parse_date_or_datetime();
            }
        }

        self.parse_number(signed)
    }

    fn parse_number(&mut self, signed: bool) -> Result<NodeId, Error> {
        let start = self.offset();
        if signed {
            self.bump(1);
        }

        // radix prefixes are never signed
        if !signed {
            match self.rest() {
                [b'0', b'x', ..] => {
                    self.bump(2);
                    self.scan_digit_run(start, |b| b.is_ascii_hexdigit())?;
                    return Ok(self.tree.push(NodeKind::Integer, self.span_from(start)));
                }
                [b'0', b'o', ..] => {
                    self.bump(2);
                    self.scan_digit_run(start, |b| (b'0'..=b'7').contains(&b))?;
                    return Ok(self.tree.push(NodeKind::Integer, self.span_from(start)));
                }
                [b'0', b'b', ..] => {
                    self.bump(2);
                    self.scan_digit_run(start, |b| b == b'0' || b == b'1')?;
                    return Ok(self.tree.push(NodeKind::Integer, self.span_from(start)));
                }
                _ => {}
            }
        }

        // decimal integer part; no leading zero unless it is exactly zero
        let int_start = self.offset();
        self.scan_digit_run(start, |b| b.is_ascii_digit())?;
        if self.byte_at(int_start) == Some(b'0') && self.offset() - int_start > 1 {
            return Err(Error::new(ErrorKind::MalformedNumber, self.span_from(start)));
        }

        let mut float = false;

        if self.at(b'.') {
            float = true;
            self.bump(1);
            self.scan_digit_run(start, |b| b.is_ascii_digit())?;
        }

        if matches!(self.peek(), Some(b'e' | b'E')) {
            float = true;
            self.bump(1);
            if matches!(self.peek(), Some(b'+' | b'-')) {
                self.bump(1);
            }
            // exponents may carry leading zeros
            self.scan_digit_run(start, |b| b.is_ascii_digit())?;
        }

        let kind = if float {
            NodeKind::Float
        } else {
            NodeKind::Integer
        };
        Ok(self.tree.push(kind, self.span_from(start)))
    }

    /// One or more digits of the given class, with underscores permitted
    /// only between two digits of that class. `lexeme_start` anchors the
    /// error span at the beginning of the number.
    fn scan_digit_run(
        &mut self,
        lexeme_start: usize,
        is_digit: impl Fn(u8) -> bool,
    ) -> Result<(), Error> {
        let mut prev_digit = false;
        let mut any = false;
        loop {
            match self.peek() {
                Some(b) if is_digit(b) => {
                    self.bump(1);
                    prev_digit = true;
                    any = true;
                }
                Some(b'_') => {
                    let next_is_digit = self
                        .rest()
                        .get(1)
                        .is_some_and(|&b| is_digit(b));
                    if !prev_digit || !next_is_digit {
                        self.bump(1);
                        return Err(Error::new(
                            ErrorKind::MalformedNumber,
                            self.span_from(lexeme_start),
                        ));
                    }
                    self.bump(1);
                    prev_digit = false;
                }
                _ => break,
            }
        }
        if !any {
            return Err(Error::new(
                ErrorKind::MalformedNumber,
                self.span_from(lexeme_start),
            ));
        }
        Ok(())
    }
}
