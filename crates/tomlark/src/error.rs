//! Decode errors and their rendering.
//!
//! The decoder is fail-fast: the first error aborts the call, so the error
//! surface is a single [`Error`] rather than a diagnostics collection. An
//! error carries a kind, the offending byte span when one is known, and the
//! 1-based line/column resolved against the input at the decode boundary.

use std::fmt;

use annotate_snippets::{AnnotationKind, Group, Level, Renderer, Snippet};
use tomlark_core::span::{line_col, Span};

/// A failure to decode a TOML document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Error {
    kind: ErrorKind,
    span: Option<Span>,
    line: u32,
    column: u32,
}

/// Every way a decode can fail.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum ErrorKind {
    // Lexical
    #[error("unterminated string")]
    UnterminatedString,
    #[error("unterminated multi-line string")]
    UnterminatedMultilineString,
    #[error("newline is not allowed in a single-line string")]
    NewlineInString,
    #[error("control character \\u{{{0:04X}}} is not allowed here")]
    ControlCharacter(u32),
    #[error("invalid escape sequence `\\{0}`")]
    InvalidEscape(char),
    #[error("invalid unicode escape")]
    InvalidUnicodeEscape,
    #[error("carriage return must be followed by a line feed")]
    BareCarriageReturn,
    #[error("unexpected character `{0}`")]
    UnexpectedCharacter(char),

    // Syntactic
    #[error("expected a key")]
    ExpectedKey,
    #[error("expected `=` after the key")]
    ExpectedEquals,
    #[error("expected a value")]
    ExpectedValue,
    #[error("expected {0}")]
    Expected(&'static str),
    #[error("expected a newline or end of input after the expression")]
    ExpectedNewline,
    #[error("newline is not allowed inside an inline table")]
    NewlineInInlineTable,
    #[error("malformed number")]
    MalformedNumber,
    #[error("malformed date-time")]
    MalformedDatetime,
    #[error("input is not valid UTF-8")]
    InvalidUtf8,

    // Structural (raised by the tracker)
    #[error("duplicate key `{0}`")]
    DuplicateKey(String),
    #[error("key `{0}` is already defined as {1}")]
    KeyRedefined(String, &'static str),
    #[error("table `{0}` has already been explicitly defined")]
    TableRedeclared(String),
    #[error("inline table `{0}` cannot be extended")]
    InlineTableExtended(String),

    // Binding
    #[error("integer `{0}` does not fit in 64 bits")]
    IntegerOutOfRange(String),
    #[error("invalid date-time: {0}")]
    InvalidDatetime(String),
    #[error("{0}")]
    Message(String),

    // Internal invariant violations; always a decoder bug
    #[error("internal decoder invariant violated: {0}")]
    Internal(&'static str),
}

impl Error {
    pub(crate) fn new(kind: ErrorKind, span: Span) -> Self {
        Self {
            kind,
            span: Some(span),
            line: 0,
            column: 0,
        }
    }

    pub(crate) fn unpositioned(kind: ErrorKind) -> Self {
        Self {
            kind,
            span: None,
            line: 0,
            column: 0,
        }
    }

    /// Attach a span if none is present yet. Outer layers use this to give
    /// serde-originated errors the location of the value being bound.
    pub(crate) fn with_span(mut self, span: Span) -> Self {
        if self.span.is_none() {
            self.span = Some(span);
        }
        self
    }

    /// Resolve line/column against `source`. Called once at the decode
    /// boundary before the error is handed to the caller.
    pub(crate) fn locate(mut self, source: &[u8]) -> Self {
        if let Some(span) = self.span {
            let (line, column) = line_col(source, span.start);
            self.line = line;
            self.column = column;
        }
        self
    }

    pub fn kind(&self) -> &ErrorKind {
        &self.kind
    }

    /// Offending byte range, when one is known.
    pub fn span(&self) -> Option<Span> {
        self.span
    }

    /// 1-based line of the error, or `None` when the error has no position.
    pub fn line(&self) -> Option<u32> {
        (self.line != 0).then_some(self.line)
    }

    /// 1-based column of the error, or `None` when the error has no position.
    pub fn column(&self) -> Option<u32> {
        (self.column != 0).then_some(self.column)
    }

    /// Builder-pattern renderer for this error against its source text.
    pub fn printer(&self) -> ErrorPrinter<'_, '_> {
        ErrorPrinter::new(self)
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.kind)?;
        if self.line != 0 {
            write!(f, " at line {} column {}", self.line, self.column)?;
        }
        Ok(())
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.kind)
    }
}

impl serde::de::Error for Error {
    fn custom<T: fmt::Display>(msg: T) -> Self {
        Error::unpositioned(ErrorKind::Message(msg.to_string()))
    }
}

/// Builder for rendering an [`Error`] with various options.
///
/// Without a source, rendering falls back to the plain `Display` form.
pub struct ErrorPrinter<'e, 's> {
    error: &'e Error,
    source: Option<&'s str>,
    path: Option<&'s str>,
    colored: bool,
}

impl<'e, 's> ErrorPrinter<'e, 's> {
    pub fn new(error: &'e Error) -> Self {
        Self {
            error,
            source: None,
            path: None,
            colored: false,
        }
    }

    pub fn source(mut self, source: &'s str) -> Self {
        self.source = Some(source);
        self
    }

    pub fn path(mut self, path: &'s str) -> Self {
        self.path = Some(path);
        self
    }

    pub fn colored(mut self, value: bool) -> Self {
        self.colored = value;
        self
    }

    pub fn render(&self) -> String {
        let (Some(source), Some(span)) = (self.source, self.error.span) else {
            return self.error.to_string();
        };

        let renderer = if self.colored {
            Renderer::styled()
        } else {
            Renderer::plain()
        };

        let message = self.error.kind.to_string();
        let mut snippet = Snippet::source(source)
            .line_start(1)
            .annotation(AnnotationKind::Primary.span(adjust_range(span, source.len())));
        if let Some(p) = self.path {
            snippet = snippet.path(p);
        }

        let report: Vec<Group> = vec![Level::ERROR.primary_title(&message).element(snippet)];
        format!("{}", renderer.render(&report))
    }
}

/// Widen empty spans to one byte so the caret is visible.
fn adjust_range(span: Span, limit: usize) -> std::ops::Range<usize> {
    let start = span.start as usize;
    let end = span.end as usize;
    if start == end {
        return start..(start + 1).min(limit);
    }
    start..end
}
