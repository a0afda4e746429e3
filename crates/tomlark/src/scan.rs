//! Byte-level scanners for TOML lexical forms.
//!
//! Each function recognises one production from the TOML ABNF over a byte
//! slice and returns the matched prefix plus the remainder, without copying
//! or allocating. Error ranges are relative to the scanned slice; the
//! parser translates them to absolute input positions.
//!
//! Escape sequences in basic strings are consumed but not validated here;
//! the value decoder validates them when it materialises the string.

use tomlark_core::span::Span;

use crate::error::ErrorKind;

/// A scan failure: error kind plus the offending range, relative to the
/// start of the scanned slice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ScanError {
    pub kind: ErrorKind,
    pub span: Span,
}

impl ScanError {
    fn at(kind: ErrorKind, start: usize, end: usize) -> Self {
        Self {
            kind,
            span: Span::new(start as u32, end as u32),
        }
    }
}

pub(crate) type Scanned<'a> = Result<(&'a [u8], &'a [u8]), ScanError>;

/// Control characters are rejected everywhere except where TOML calls them
/// out: tab is always fine, newlines only in multi-line strings.
#[inline]
pub(crate) fn is_control(b: u8) -> bool {
    (b < 0x20 && b != b'\t') || b == 0x7F
}

#[inline]
fn split(input: &[u8], len: usize) -> (&[u8], &[u8]) {
    input.split_at(len)
}

/// Spaces and horizontal tabs.
pub(crate) fn scan_whitespace(input: &[u8]) -> (&[u8], &[u8]) {
    let len = input
        .iter()
        .take_while(|&&b| b == b' ' || b == b'\t')
        .count();
    split(input, len)
}

/// Longest prefix of `[A-Za-z0-9_-]`. An empty match is not an error; the
/// caller decides whether a key was required.
pub(crate) fn scan_unquoted_key(input: &[u8]) -> (&[u8], &[u8]) {
    let len = input
        .iter()
        .take_while(|&&b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_')
        .count();
    split(input, len)
}

/// Tests a literal byte prefix. Used for `true`, `false`, `inf`, `nan`,
/// and the triple-quote delimiters.
#[inline]
pub(crate) fn scan_follows(input: &[u8], pattern: &[u8]) -> bool {
    input.starts_with(pattern)
}

/// `#` through end of line, newline excluded.
pub(crate) fn scan_comment(input: &[u8]) -> Scanned<'_> {
    debug_assert_eq!(input.first(), Some(&b'#'));
    let mut i = 1;
    while i < input.len() {
        let b = input[i];
        if b == b'\n' {
            break;
        }
        if b == b'\r' {
            if input.get(i + 1) == Some(&b'\n') {
                break;
            }
            return Err(ScanError::at(ErrorKind::BareCarriageReturn, i, i + 1));
        }
        if is_control(b) {
            return Err(ScanError::at(
                ErrorKind::ControlCharacter(b as u32),
                i,
                i + 1,
            ));
        }
        i += 1;
    }
    Ok(split(input, i))
}

/// After `\r`, the next byte must be `\n`.
pub(crate) fn scan_crlf(input: &[u8]) -> Scanned<'_> {
    debug_assert_eq!(input.first(), Some(&b'\r'));
    if input.get(1) == Some(&b'\n') {
        Ok(split(input, 2))
    } else {
        Err(ScanError::at(ErrorKind::BareCarriageReturn, 0, 1))
    }
}

/// `'...'`; no escapes, no newlines.
pub(crate) fn scan_literal_string(input: &[u8]) -> Scanned<'_> {
    debug_assert_eq!(input.first(), Some(&b'\''));
    let mut i = 1;
    while i < input.len() {
        let b = input[i];
        match b {
            b'\'' => return Ok(split(input, i + 1)),
            b'\n' | b'\r' => return Err(ScanError::at(ErrorKind::NewlineInString, i, i + 1)),
            _ if is_control(b) => {
                return Err(ScanError::at(
                    ErrorKind::ControlCharacter(b as u32),
                    i,
                    i + 1,
                ));
            }
            _ => i += 1,
        }
    }
    Err(ScanError::at(ErrorKind::UnterminatedString, 0, input.len()))
}

/// `'''...'''`; no escapes, newlines permitted. Up to two consecutive
/// quotes may appear in the content, including right before the closer.
pub(crate) fn scan_ml_literal_string(input: &[u8]) -> Scanned<'_> {
    debug_assert!(scan_follows(input, b"'''"));
    let mut i = 3;
    while i < input.len() {
        let b = input[i];
        match b {
            b'\'' => {
                let run = input[i..].iter().take_while(|&&q| q == b'\'').count();
                if run >= 3 {
                    if run > 5 {
                        return Err(ScanError::at(ErrorKind::UnexpectedCharacter('\''), i, i + run));
                    }
                    return Ok(split(input, i + run));
                }
                i += run;
            }
            b'\n' => i += 1,
            b'\r' => {
                if input.get(i + 1) != Some(&b'\n') {
                    return Err(ScanError::at(ErrorKind::BareCarriageReturn, i, i + 1));
                }
                i += 2;
            }
            _ if is_control(b) => {
                return Err(ScanError::at(
                    ErrorKind::ControlCharacter(b as u32),
                    i,
                    i + 1,
                ));
            }
            _ => i += 1,
        }
    }
    Err(ScanError::at(
        ErrorKind::UnterminatedMultilineString,
        0,
        input.len(),
    ))
}

/// `"..."`; after `\` exactly one byte is consumed as part of the escape,
/// validation deferred to the value decoder.
pub(crate) fn scan_basic_string(input: &[u8]) -> Scanned<'_> {
    debug_assert_eq!(input.first(), Some(&b'"'));
    let mut i = 1;
    while i < input.len() {
        let b = input[i];
        match b {
            b'"' => return Ok(split(input, i + 1)),
            b'\\' => {
                let Some(&escaped) = input.get(i + 1) else {
                    break;
                };
                if escaped == b'\n' || escaped == b'\r' {
                    return Err(ScanError::at(ErrorKind::NewlineInString, i + 1, i + 2));
                }
                i += 2;
            }
            b'\n' | b'\r' => return Err(ScanError::at(ErrorKind::NewlineInString, i, i + 1)),
            _ if is_control(b) => {
                return Err(ScanError::at(
                    ErrorKind::ControlCharacter(b as u32),
                    i,
                    i + 1,
                ));
            }
            _ => i += 1,
        }
    }
    Err(ScanError::at(ErrorKind::UnterminatedString, 0, input.len()))
}

/// `"""..."""`; permits escapes (including the line-continuation
/// backslash) and newlines. Up to two consecutive quotes may appear in
/// the content.
pub(crate) fn scan_ml_basic_string(input: &[u8]) -> Scanned<'_> {
    debug_assert!(scan_follows(input, b"\"\"\""));
    let mut i = 3;
    while i < input.len() {
        let b = input[i];
        match b {
            b'"' => {
                let run = input[i..].iter().take_while(|&&q| q == b'"').count();
                if run >= 3 {
                    if run > 5 {
                        return Err(ScanError::at(ErrorKind::UnexpectedCharacter('"'), i, i + run));
                    }
                    return Ok(split(input, i + run));
                }
                i += run;
            }
            b'\\' => {
                if i + 1 >= input.len() {
                    break;
                }
                // the escaped byte may itself be a newline (line continuation)
                i += 2;
            }
            b'\n' => i += 1,
            b'\r' => {
                if input.get(i + 1) != Some(&b'\n') {
                    return Err(ScanError::at(ErrorKind::BareCarriageReturn, i, i + 1));
                }
                i += 2;
            }
            _ if is_control(b) => {
                return Err(ScanError::at(
                    ErrorKind::ControlCharacter(b as u32),
                    i,
                    i + 1,
                ));
            }
            _ => i += 1,
        }
    }
    Err(ScanError::at(
        ErrorKind::UnterminatedMultilineString,
        0,
        input.len(),
    ))
}
