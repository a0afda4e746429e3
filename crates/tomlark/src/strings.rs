//! Quote stripping and escape decoding, shared by key parsing and the
//! binder.
//!
//! The scanner only brackets string lexemes; turning a lexeme into text
//! happens here. Literal strings borrow from the input; escape processing
//! builds a fresh owned string. Multi-line forms drop the single newline
//! immediately after the opening delimiter, and multi-line basic strings
//! honour the line-continuation backslash.

use std::borrow::Cow;

use tomlark_core::span::Span;
use tomlark_core::tree::{NodeId, Tree};

use crate::error::{Error, ErrorKind};

/// Slice of validated input; failure means a decoder bug, not bad input.
pub(crate) fn as_utf8(bytes: &[u8], span: Span) -> Result<&str, Error> {
    std::str::from_utf8(bytes)
        .map_err(|_| Error::new(ErrorKind::Internal("non-UTF-8 slice of validated input"), span))
}

/// Decode a `Key` node into its key text: quotes stripped, escapes
/// processed for basic-string keys. Bare and literal keys borrow.
pub(crate) fn decode_key<'s>(
    buf: &'s [u8],
    tree: &Tree,
    key: NodeId,
) -> Result<Cow<'s, str>, Error> {
    let span = tree.span(key);
    let lexeme = tree.text(key, buf);
    match lexeme.first() {
        Some(b'"') => {
            let content = as_utf8(&lexeme[1..lexeme.len() - 1], span)?;
            Ok(Cow::Owned(unescape(content, span.start + 1, false)?))
        }
        Some(b'\'') => {
            let content = as_utf8(&lexeme[1..lexeme.len() - 1], span)?;
            Ok(Cow::Borrowed(content))
        }
        _ => Ok(Cow::Borrowed(as_utf8(lexeme, span)?)),
    }
}

/// Decode a `String` node lexeme (delimiters included) into its text.
pub(crate) fn decode_string<'s>(buf: &'s [u8], span: Span) -> Result<Cow<'s, str>, Error> {
    let lexeme = &buf[span.as_range()];
    if lexeme.starts_with(b"\"\"\"") {
        let content = &lexeme[3..lexeme.len() - 3];
        let (content, skipped) = trim_leading_newline(content);
        let content = as_utf8(content, span)?;
        Ok(Cow::Owned(unescape(
            content,
            span.start + 3 + skipped,
            true,
        )?))
    } else if lexeme.starts_with(b"\"") {
        let content = as_utf8(&lexeme[1..lexeme.len() - 1], span)?;
        if content.contains('\\') {
            Ok(Cow::Owned(unescape(content, span.start + 1, false)?))
        } else {
            Ok(Cow::Borrowed(content))
        }
    } else if lexeme.starts_with(b"'''") {
        let content = &lexeme[3..lexeme.len() - 3];
        let (content, _) = trim_leading_newline(content);
        Ok(Cow::Borrowed(as_utf8(content, span)?))
    } else {
        let content = as_utf8(&lexeme[1..lexeme.len() - 1], span)?;
        Ok(Cow::Borrowed(content))
    }
}

/// The newline right after an opening multi-line delimiter is trimmed.
fn trim_leading_newline(content: &[u8]) -> (&[u8], u32) {
    if content.starts_with(b"\r\n") {
        (&content[2..], 2)
    } else if content.starts_with(b"\n") {
        (&content[1..], 1)
    } else {
        (content, 0)
    }
}

/// Process escape sequences in basic-string content. `base` is the
/// absolute input offset of `content`, used for error spans.
pub(crate) fn unescape(content: &str, base: u32, multiline: bool) -> Result<String, Error> {
    let bytes = content.as_bytes();
    let mut out = String::with_capacity(content.len());
    let mut i = 0;

    while i < bytes.len() {
        let Some(rel) = bytes[i..].iter().position(|&b| b == b'\\') else {
            out.push_str(&content[i..]);
            break;
        };
        let bs = i + rel;
        out.push_str(&content[i..bs]);

        let span = |len: usize| Span::new(base + bs as u32, base + (bs + len) as u32);
        let Some(&esc) = bytes.get(bs + 1) else {
            return Err(Error::new(ErrorKind::UnterminatedString, span(1)));
        };
        match esc {
            b'b' => {
                out.push('\u{0008}');
                i = bs + 2;
            }
            b't' => {
                out.push('\t');
                i = bs + 2;
            }
            b'n' => {
                out.push('\n');
                i = bs + 2;
            }
            b'f' => {
                out.push('\u{000C}');
                i = bs + 2;
            }
            b'r' => {
                out.push('\r');
                i = bs + 2;
            }
            b'"' => {
                out.push('"');
                i = bs + 2;
            }
            b'\\' => {
                out.push('\\');
                i = bs + 2;
            }
            b'u' => {
                out.push(unicode_escape(bytes, bs, 4, span(6))?);
                i = bs + 6;
            }
            b'U' => {
                out.push(unicode_escape(bytes, bs, 8, span(10))?);
                i = bs + 10;
            }
            b' ' | b'\t' | b'\r' | b'\n' if multiline => {
                // line continuation: the backslash must be the last
                // non-whitespace character on its line
                let mut j = bs + 1;
                let mut saw_newline = false;
                while j < bytes.len() {
                    match bytes[j] {
                        b' ' | b'\t' => j += 1,
                        b'\n' => {
                            saw_newline = true;
                            j += 1;
                        }
                        b'\r' if bytes.get(j + 1) == Some(&b'\n') => {
                            saw_newline = true;
                            j += 2;
                        }
                        _ => break,
                    }
                }
                if !saw_newline {
                    return Err(Error::new(ErrorKind::InvalidEscape(esc as char), span(2)));
                }
                i = j;
            }
            _ => {
                let shown = content[bs + 1..].chars().next().unwrap_or('\\');
                return Err(Error::new(ErrorKind::InvalidEscape(shown), span(2)));
            }
        }
    }

    Ok(out)
}

/// `\uXXXX` / `\UXXXXXXXX`: `digits` hex digits naming a Unicode scalar
/// value. Surrogates and out-of-range values are rejected.
fn unicode_escape(bytes: &[u8], bs: usize, digits: usize, span: Span) -> Result<char, Error> {
    let start = bs + 2;
    if start + digits > bytes.len() {
        return Err(Error::new(ErrorKind::InvalidUnicodeEscape, span));
    }
    let mut value: u32 = 0;
    for &b in &bytes[start..start + digits] {
        let digit = match b {
            b'0'..=b'9' => u32::from(b - b'0'),
            b'a'..=b'f' => u32::from(b - b'a') + 10,
            b'A'..=b'F' => u32::from(b - b'A') + 10,
            _ => return Err(Error::new(ErrorKind::InvalidUnicodeEscape, span)),
        };
        value = value * 16 + digit;
    }
    char::from_u32(value).ok_or_else(|| Error::new(ErrorKind::InvalidUnicodeEscape, span))
}
