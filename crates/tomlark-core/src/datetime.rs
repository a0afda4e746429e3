//! TOML date/time value types.
//!
//! TOML distinguishes four temporal shapes: offset date-time, local
//! date-time, local date, and local time. All four are carried by the
//! composite [`Datetime`]; which fields are populated encodes the shape.
//!
//! The text surface is RFC 3339 with TOML's relaxations: the date/time
//! separator may be `T`, `t`, or a single space, and fractional seconds
//! are truncated after nine digits. [`FromStr`] performs full calendar
//! validation (month/day ranges, leap years, time component ranges,
//! offset ranges); the decoder's parser only classifies lexemes and
//! defers validation here.
//!
//! `Datetime` also speaks a private serde struct protocol (a sentinel
//! struct/field name) so it can be produced by any `Deserializer` that
//! cooperates, without a dedicated data-model type.

use std::fmt;
use std::str::FromStr;

use serde::de;
use serde::ser;

/// Sentinel struct name for the serde protocol.
#[doc(hidden)]
pub const NAME: &str = "$__tomlark_private_Datetime";

/// Sentinel field name for the serde protocol.
#[doc(hidden)]
pub const FIELD: &str = "$__tomlark_private_datetime";

/// A calendar date in the proleptic Gregorian calendar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Date {
    pub year: u16,
    pub month: u8,
    pub day: u8,
}

/// A wall-clock time with nanosecond precision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Time {
    pub hour: u8,
    pub minute: u8,
    pub second: u8,
    pub nanosecond: u32,
}

/// A fixed offset from UTC.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Offset {
    /// `Z` in the text form.
    Z,
    /// `+HH:MM` / `-HH:MM`, stored as signed minutes east of UTC.
    Custom { minutes: i16 },
}

/// Any of the four TOML temporal shapes.
///
/// Populated fields encode the shape: date only, time only, date+time
/// (local date-time), or date+time+offset (offset date-time). An offset
/// without date and time never occurs in valid input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Datetime {
    pub date: Option<Date>,
    pub time: Option<Time>,
    pub offset: Option<Offset>,
}

impl From<Date> for Datetime {
    fn from(date: Date) -> Self {
        Datetime {
            date: Some(date),
            time: None,
            offset: None,
        }
    }
}

impl From<Time> for Datetime {
    fn from(time: Time) -> Self {
        Datetime {
            date: None,
            time: Some(time),
            offset: None,
        }
    }
}

impl Date {
    /// Days in `month` of `year`, accounting for leap years.
    fn days_in_month(year: u16, month: u8) -> u8 {
        match month {
            1 | 3 | 5 | 7 | 8 | 10 | 12 => 31,
            4 | 6 | 9 | 11 => 30,
            2 => {
                let leap = year % 4 == 0 && (year % 100 != 0 || year % 400 == 0);
                if leap { 29 } else { 28 }
            }
            _ => 0,
        }
    }
}

impl fmt::Display for Date {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}-{:02}", self.year, self.month, self.day)
    }
}

impl fmt::Display for Time {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}:{:02}", self.hour, self.minute, self.second)?;
        if self.nanosecond != 0 {
            let frac = format!("{:09}", self.nanosecond);
            write!(f, ".{}", frac.trim_end_matches('0'))?;
        }
        Ok(())
    }
}

impl fmt::Display for Offset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Offset::Z => f.write_str("Z"),
            Offset::Custom { minutes } => {
                let sign = if minutes < 0 { '-' } else { '+' };
                let abs = minutes.unsigned_abs();
                write!(f, "{}{:02}:{:02}", sign, abs / 60, abs % 60)
            }
        }
    }
}

impl fmt::Display for Datetime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(date) = self.date {
            write!(f, "{date}")?;
            if self.time.is_some() {
                f.write_str("T")?;
            }
        }
        if let Some(time) = self.time {
            write!(f, "{time}")?;
        }
        if let Some(offset) = self.offset {
            write!(f, "{offset}")?;
        }
        Ok(())
    }
}

/// Error produced when a date-time lexeme fails to parse or validate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatetimeParseError {
    message: String,
}

impl DatetimeParseError {
    fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl fmt::Display for DatetimeParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for DatetimeParseError {}

/// Cursor over the bytes of a date-time lexeme.
struct DatetimeScanner<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> DatetimeScanner<'a> {
    fn new(s: &'a str) -> Self {
        Self {
            bytes: s.as_bytes(),
            pos: 0,
        }
    }

    fn peek(&self) -> Option<u8> {
        self.bytes.get(self.pos).copied()
    }

    fn bump(&mut self) -> Option<u8> {
        let b = self.peek()?;
        self.pos += 1;
        Some(b)
    }

    fn done(&self) -> bool {
        self.pos >= self.bytes.len()
    }

    /// Exactly `n` ASCII digits as a number.
    fn digits(&mut self, n: usize, what: &str) -> Result<u32, DatetimeParseError> {
        let mut value: u32 = 0;
        for _ in 0..n {
            match self.bump() {
                Some(b @ b'0'..=b'9') => value = value * 10 + u32::from(b - b'0'),
                _ => {
                    return Err(DatetimeParseError::new(format!(
                        "expected {n} digits for the {what}"
                    )));
                }
            }
        }
        Ok(value)
    }

    fn expect(&mut self, b: u8, what: &str) -> Result<(), DatetimeParseError> {
        if self.bump() == Some(b) {
            Ok(())
        } else {
            Err(DatetimeParseError::new(format!("expected `{what}`")))
        }
    }

    fn date(&mut self) -> Result<Date, DatetimeParseError> {
        let year = self.digits(4, "year")? as u16;
        self.expect(b'-', "-")?;
        let month = self.digits(2, "month")? as u8;
        self.expect(b'-', "-")?;
        let day = self.digits(2, "day")? as u8;

        if !(1..=12).contains(&month) {
            return Err(DatetimeParseError::new(format!(
                "month {month} is out of range"
            )));
        }
        let max_day = Date::days_in_month(year, month);
        if day < 1 || day > max_day {
            return Err(DatetimeParseError::new(format!(
                "day {day} is out of range for {year:04}-{month:02}"
            )));
        }
        Ok(Date { year, month, day })
    }

    fn time(&mut self) -> Result<Time, DatetimeParseError> {
        let hour = self.digits(2, "hour")? as u8;
        self.expect(b':', ":")?;
        let minute = self.digits(2, "minute")? as u8;
        self.expect(b':', ":")?;
        let second = self.digits(2, "second")? as u8;

        if hour > 23 {
            return Err(DatetimeParseError::new(format!(
                "hour {hour} is out of range"
            )));
        }
        if minute > 59 {
            return Err(DatetimeParseError::new(format!(
                "minute {minute} is out of range"
            )));
        }
        // 60 admits leap seconds, as RFC 3339 does
        if second > 60 {
            return Err(DatetimeParseError::new(format!(
                "second {second} is out of range"
            )));
        }

        let mut nanosecond = 0u32;
        if self.peek() == Some(b'.') {
            self.pos += 1;
            let mut digits = 0u32;
            while let Some(b @ b'0'..=b'9') = self.peek() {
                self.pos += 1;
                // fractional seconds are truncated after nine digits
                if digits < 9 {
                    nanosecond = nanosecond * 10 + u32::from(b - b'0');
                    digits += 1;
                }
            }
            if digits == 0 {
                return Err(DatetimeParseError::new(
                    "expected digits after the fractional-second dot",
                ));
            }
            while digits < 9 {
                nanosecond *= 10;
                digits += 1;
            }
        }

        Ok(Time {
            hour,
            minute,
            second,
            nanosecond,
        })
    }

    fn offset(&mut self) -> Result<Option<Offset>, DatetimeParseError> {
        match self.peek() {
            Some(b'Z' | b'z') => {
                self.pos += 1;
                Ok(Some(Offset::Z))
            }
            Some(sign @ (b'+' | b'-')) => {
                self.pos += 1;
                let hours = self.digits(2, "offset hours")?;
                self.expect(b':', ":")?;
                let minutes = self.digits(2, "offset minutes")?;
                if hours > 23 {
                    return Err(DatetimeParseError::new(format!(
                        "offset hour {hours} is out of range"
                    )));
                }
                if minutes > 59 {
                    return Err(DatetimeParseError::new(format!(
                        "offset minute {minutes} is out of range"
                    )));
                }
                let mut total = (hours * 60 + minutes) as i16;
                if sign == b'-' {
                    total = -total;
                }
                Ok(Some(Offset::Custom { minutes: total }))
            }
            _ => Ok(None),
        }
    }
}

impl FromStr for Datetime {
    type Err = DatetimeParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut scanner = DatetimeScanner::new(s);

        // `HH:` at the front means a bare local time
        if s.len() >= 3 && s.as_bytes()[2] == b':' {
            let time = scanner.time()?;
            if !scanner.done() {
                return Err(DatetimeParseError::new("trailing characters after time"));
            }
            return Ok(time.into());
        }

        let date = scanner.date()?;
        if scanner.done() {
            return Ok(date.into());
        }

        match scanner.bump() {
            Some(b'T' | b't' | b' ') => {}
            _ => {
                return Err(DatetimeParseError::new(
                    "expected `T` or a space between date and time",
                ));
            }
        }
        let time = scanner.time()?;
        let offset = scanner.offset()?;
        if !scanner.done() {
            return Err(DatetimeParseError::new(
                "trailing characters after date-time",
            ));
        }

        Ok(Datetime {
            date: Some(date),
            time: Some(time),
            offset,
        })
    }
}

impl ser::Serialize for Datetime {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: ser::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> de::Deserialize<'de> for Datetime {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: de::Deserializer<'de>,
    {
        struct DatetimeVisitor;

        impl<'de> de::Visitor<'de> for DatetimeVisitor {
            type Value = Datetime;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a TOML date-time")
            }

            fn visit_map<V>(self, mut visitor: V) -> Result<Datetime, V::Error>
            where
                V: de::MapAccess<'de>,
            {
                let value = visitor.next_key::<DatetimeKey>()?;
                if value.is_none() {
                    return Err(de::Error::custom("date-time key not found"));
                }
                let v: DatetimeFromString = visitor.next_value()?;
                Ok(v.value)
            }
        }

        deserializer.deserialize_struct(NAME, &[FIELD], DatetimeVisitor)
    }
}

/// Accepts only the sentinel field name.
struct DatetimeKey;

impl<'de> de::Deserialize<'de> for DatetimeKey {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: de::Deserializer<'de>,
    {
        struct FieldVisitor;

        impl de::Visitor<'_> for FieldVisitor {
            type Value = ();

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a valid date-time field")
            }

            fn visit_str<E>(self, s: &str) -> Result<(), E>
            where
                E: de::Error,
            {
                if s == FIELD {
                    Ok(())
                } else {
                    Err(de::Error::custom("expected the date-time field"))
                }
            }
        }

        deserializer.deserialize_identifier(FieldVisitor)?;
        Ok(DatetimeKey)
    }
}

/// Parses the protocol's string payload back into a [`Datetime`].
#[doc(hidden)]
pub struct DatetimeFromString {
    pub value: Datetime,
}

impl<'de> de::Deserialize<'de> for DatetimeFromString {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: de::Deserializer<'de>,
    {
        struct Visitor;

        impl de::Visitor<'_> for Visitor {
            type Value = DatetimeFromString;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a date-time string")
            }

            fn visit_str<E>(self, s: &str) -> Result<DatetimeFromString, E>
            where
                E: de::Error,
            {
                match s.parse() {
                    Ok(value) => Ok(DatetimeFromString { value }),
                    Err(e) => Err(de::Error::custom(e)),
                }
            }
        }

        deserializer.deserialize_str(Visitor)
    }
}
