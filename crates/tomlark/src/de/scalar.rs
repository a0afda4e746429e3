//! Scalar coercion: raw lexemes into typed values.
//!
//! The parser guarantees lexical shape; this module finishes the job:
//! underscore stripping, radix decoding, the 64-bit fit check, signed
//! `inf`/`nan`, and date-time validation through `Datetime::from_str`.

use std::borrow::Cow;

use tomlark_core::datetime::Datetime;
use tomlark_core::span::Span;

use crate::error::{Error, ErrorKind};

fn strip_underscores(lexeme: &str) -> Cow<'_, str> {
    if lexeme.contains('_') {
        Cow::Owned(lexeme.replace('_', ""))
    } else {
        Cow::Borrowed(lexeme)
    }
}

/// Decode an integer lexeme by its radix prefix. TOML integers are
/// 64-bit signed; anything wider is an error, not a wrap.
pub(crate) fn integer(lexeme: &str, span: Span) -> Result<i64, Error> {
    let clean = strip_underscores(lexeme);
    let result = if let Some(hex) = clean.strip_prefix("0x") {
        i64::from_str_radix(hex, 16)
    } else if let Some(octal) = clean.strip_prefix("0o") {
        i64::from_str_radix(octal, 8)
    } else if let Some(binary) = clean.strip_prefix("0b") {
        i64::from_str_radix(binary, 2)
    } else {
        clean.parse()
    };
    result.map_err(|_| Error::new(ErrorKind::IntegerOutOfRange(lexeme.to_owned()), span))
}

/// Decode a float lexeme, including the signed `inf`/`nan` keywords.
/// The sign bit of a NaN is not preserved.
pub(crate) fn float(lexeme: &str, span: Span) -> Result<f64, Error> {
    let clean = strip_underscores(lexeme);
    match &*clean {
        "inf" | "+inf" => Ok(f64::INFINITY),
        "-inf" => Ok(f64::NEG_INFINITY),
        "nan" | "+nan" | "-nan" => Ok(f64::NAN),
        other => other.parse().map_err(|_| {
            Error::new(
                ErrorKind::Internal("parser-accepted float failed to decode"),
                span,
            )
        }),
    }
}

/// `true` or `false`; the parser only emits these two lexemes.
pub(crate) fn boolean(lexeme: &str) -> bool {
    lexeme.starts_with('t')
}

/// Parse and validate a date-time lexeme of any of the four shapes.
pub(crate) fn datetime(lexeme: &str, span: Span) -> Result<Datetime, Error> {
    lexeme
        .parse()
        .map_err(|e: tomlark_core::datetime::DatetimeParseError| {
            Error::new(ErrorKind::InvalidDatetime(e.to_string()), span)
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn span() -> Span {
        Span::new(0, 0)
    }

    #[test]
    fn integer_bases() {
        assert_eq!(integer("0xDEAD_BEEF", span()).unwrap(), 3_735_928_559);
        assert_eq!(integer("0o755", span()).unwrap(), 493);
        assert_eq!(integer("0b1010", span()).unwrap(), 10);
        assert_eq!(integer("1_000", span()).unwrap(), 1000);
        assert_eq!(integer("-17", span()).unwrap(), -17);
        assert_eq!(integer("+0", span()).unwrap(), 0);
    }

    #[test]
    fn integer_limits() {
        assert_eq!(
            integer("9223372036854775807", span()).unwrap(),
            i64::MAX
        );
        assert_eq!(
            integer("-9223372036854775808", span()).unwrap(),
            i64::MIN
        );
        assert!(integer("9223372036854775808", span()).is_err());
        assert!(integer("0x8000000000000000", span()).is_err());
    }

    #[test]
    fn float_forms() {
        assert_eq!(float("3.14", span()).unwrap(), 3.14);
        assert_eq!(float("1e6", span()).unwrap(), 1e6);
        assert_eq!(float("-2E-2", span()).unwrap(), -0.02);
        assert_eq!(float("6.626e-34", span()).unwrap(), 6.626e-34);
        assert_eq!(float("9_224_617.445_991", span()).unwrap(), 9_224_617.445_991);
    }

    #[test]
    fn float_keywords() {
        assert_eq!(float("inf", span()).unwrap(), f64::INFINITY);
        assert_eq!(float("-inf", span()).unwrap(), f64::NEG_INFINITY);
        assert!(float("nan", span()).unwrap().is_nan());
        assert!(float("+nan", span()).unwrap().is_nan());
        assert!(float("-nan", span()).unwrap().is_nan());
    }

    #[test]
    fn datetime_validation_happens_here() {
        assert!(datetime("1979-05-27T07:32:00Z", span()).is_ok());
        let err = datetime("2021-02-30", span()).unwrap_err();
        assert!(matches!(err.kind(), ErrorKind::InvalidDatetime(_)));
    }
}
