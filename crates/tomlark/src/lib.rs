//! TOML 1.0 decoder.
//!
//! The decode pipeline has four stages, each feeding the next:
//! - `scan` - byte-level recognition of TOML lexical forms
//! - `parser` - recursive descent emitting a compact arena tree
//! - `tracker` - cross-expression structural rules (duplicate keys,
//!   shape conflicts, sealed inline tables, array-table re-entry)
//! - `de` - the binder: a serde `Deserializer` over the parsed tree
//!
//! # Decoding
//!
//! ```
//! #[derive(serde::Deserialize)]
//! struct Config {
//!     title: String,
//!     port: u16,
//! }
//!
//! let config: Config = tomlark::from_str(r#"
//! title = "example"
//! port = 8080
//! "#).unwrap();
//! assert_eq!(config.port, 8080);
//! ```
//!
//! Decoding without a schema goes through [`Value`]:
//!
//! ```
//! let doc: tomlark::Value = tomlark::from_str("a.b = 1").unwrap();
//! assert_eq!(doc["a"]["b"].as_integer(), Some(1));
//! ```
//!
//! Each decode call is independent and synchronous; nothing is shared
//! between calls.

mod de;
mod error;
mod parser;
mod scan;
mod strings;
mod tracker;
mod value;


use serde::de::DeserializeOwned;

pub use de::NumberMode;
pub use error::{Error, ErrorKind, ErrorPrinter};
pub use tomlark_core::datetime::{Date, Datetime, Offset, Time};
pub use tomlark_core::span::Span;
pub use value::{Table, Value};

/// Decode a TOML document into any `Deserialize` destination.
pub fn from_str<T>(source: &str) -> Result<T, Error>
where
    T: DeserializeOwned,
{
    Decoder::new().decode(source)
}

/// Decode a TOML document from bytes. TOML documents are UTF-8 by
/// definition; invalid UTF-8 is a decode error, not a panic.
pub fn from_slice<T>(bytes: &[u8]) -> Result<T, Error>
where
    T: DeserializeOwned,
{
    Decoder::new().decode_slice(bytes)
}

/// A configured decoder. Every option is an explicit per-decoder choice;
/// there are no globals.
#[derive(Debug, Clone)]
pub struct Decoder {
    strict_tables: bool,
    numbers: NumberMode,
}

impl Default for Decoder {
    fn default() -> Self {
        Self::new()
    }
}

impl Decoder {
    pub fn new() -> Self {
        Self {
            strict_tables: true,
            numbers: NumberMode::Exact,
        }
    }

    /// TOML 1.0 structural rules (default on). Turning this off skips the
    /// tracker entirely: re-declared tables merge and later values
    /// overwrite earlier ones.
    pub fn strict_tables(mut self, on: bool) -> Self {
        self.strict_tables = on;
        self
    }

    /// How ambiguous numeric leaves bind in dynamic mode; see
    /// [`NumberMode`].
    pub fn number_mode(mut self, mode: NumberMode) -> Self {
        self.numbers = mode;
        self
    }

    pub fn decode<T>(&self, source: &str) -> Result<T, Error>
    where
        T: DeserializeOwned,
    {
        let buf = source.as_bytes();
        self.decode_buf(buf).map_err(|e| e.locate(buf))
    }

    pub fn decode_slice<T>(&self, bytes: &[u8]) -> Result<T, Error>
    where
        T: DeserializeOwned,
    {
        match std::str::from_utf8(bytes) {
            Ok(source) => self.decode(source),
            Err(e) => {
                let at = e.valid_up_to() as u32;
                Err(Error::new(ErrorKind::InvalidUtf8, Span::empty(at)).locate(bytes))
            }
        }
    }

    fn decode_buf<T>(&self, buf: &[u8]) -> Result<T, Error>
    where
        T: DeserializeOwned,
    {
        let tree = parser::parse_document(buf, self.strict_tables)?;
        de::bind(&tree, buf, self.strict_tables, self.numbers)
    }
}
