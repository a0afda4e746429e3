//! Structural recognition of date and time lexemes.
//!
//! The parser only classifies: digit counts, separators, and the presence
//! of a time or zone decide the node kind. Calendar validation (month and
//! day ranges, leap years, offset bounds) happens when the binder hands
//! the lexeme to `Datetime::from_str`.

use tomlark_core::tree::{NodeId, NodeKind};

use crate::error::{Error, ErrorKind};
use crate::parser::Parser;

impl<'a> Parser<'a> {
    /// `HH:MM:SS[.frac]` with no date in front.
    pub(in crate::parser) fn parse_local_time(&mut self) -> Result<NodeId, Error> {
        let start = self.offset();
        self.scan_time(start)?;
        Ok(self.tree.push(NodeKind::LocalTime, self.span_from(start)))
    }

    /// `YYYY-MM-DD`, optionally followed by a time and optionally a zone.
    pub(in crate::parser) fn parse_date_or_datetime(&mut self) -> Result<NodeId, Error> {
        let start = self.offset();
        self.scan_date_digits(start, 4)?;
        self.expect_datetime_byte(start, b'-')?;
        self.scan_date_digits(start, 2)?;
        self.expect_datetime_byte(start, b'-')?;
        self.scan_date_digits(start, 2)?;

        // `T`, `t`, or a space followed by a digit continues into a time
        let has_time = match self.peek() {
            Some(b'T' | b't') => true,
            Some(b' ') => self.byte_at(self.offset() + 1).is_some_and(|b| b.is_ascii_digit()),
            _ => false,
        };
        if !has_time {
            return Ok(self.tree.push(NodeKind::LocalDate, self.span_from(start)));
        }
        self.bump(1);
        self.scan_time(start)?;

        let kind = match self.peek() {
            Some(b'Z' | b'z') => {
                self.bump(1);
                NodeKind::OffsetDateTime
            }
            Some(b'+' | b'-') => {
                self.bump(1);
                self.scan_date_digits(start, 2)?;
                self.expect_datetime_byte(start, b':')?;
                self.scan_date_digits(start, 2)?;
                NodeKind::OffsetDateTime
            }
            _ => NodeKind::LocalDateTime,
        };
        Ok(self.tree.push(kind, self.span_from(start)))
    }

    /// `HH:MM:SS` plus an optional fraction with at least one digit.
    fn scan_time(&mut self, lexeme_start: usize) -> Result<(), Error> {
        self.scan_date_digits(lexeme_start, 2)?;
        self.expect_datetime_byte(lexeme_start, b':')?;
        self.scan_date_digits(lexeme_start, 2)?;
        self.expect_datetime_byte(lexeme_start, b':')?;
        self.scan_date_digits(lexeme_start, 2)?;

        if self.at(b'.') {
            self.bump(1);
            let mut digits = 0;
            while self.peek().is_some_and(|b| b.is_ascii_digit()) {
                self.bump(1);
                digits += 1;
            }
            if digits == 0 {
                return Err(Error::new(
                    ErrorKind::MalformedDatetime,
                    self.span_from(lexeme_start),
                ));
            }
        }
        Ok(())
    }

    fn scan_date_digits(&mut self, lexeme_start: usize, count: usize) -> Result<(), Error> {
        for _ in 0..count {
            if !self.peek().is_some_and(|b| b.is_ascii_digit()) {
                return Err(Error::new(
                    ErrorKind::MalformedDatetime,
                    self.span_from(lexeme_start),
                ));
            }
            self.bump(1);
        }
        Ok(())
    }

    fn expect_datetime_byte(&mut self, lexeme_start: usize, byte: u8) -> Result<(), Error> {
        if !self.at(byte) {
            return Err(Error::new(
                ErrorKind::MalformedDatetime,
                self.span_from(lexeme_start),
            ));
        }
        self.bump(1);
        Ok(())
    }
}
