//! The binder: a serde `Deserializer` over the shaped document.
//!
//! The schema-descriptor surface the decoder binds through is
//! `serde::de::Deserialize`: the caller's destination describes itself,
//! and this module walks the shaped document against that description,
//! coercing scalars at the leaves. Two special protocols ride on top of
//! plain serde: [`Datetime`](tomlark_core::datetime::Datetime)
//! destinations are recognised by a sentinel struct name, and enums
//! accept either a bare string (unit variant) or a single-key table
//! (data-carrying variant).
//!
//! Every error leaving this module carries the span of the innermost
//! value being bound when one is known.

pub(crate) mod doc;
mod scalar;

#[cfg(test)]
mod tests;

use std::borrow::Cow;

use serde::de;
use serde::de::Deserializer as _;
use serde::forward_to_deserialize_any;
use tomlark_core::datetime;
use tomlark_core::span::Span;
use tomlark_core::tree::{NodeId, NodeKind, Tree};

use crate::error::{Error, ErrorKind};
use crate::strings;
use doc::{DocTable, DocValue, Payload};

/// How ambiguous numeric leaves bind in dynamic (`deserialize_any`) mode.
///
/// Typed integer and float destinations always decode exactly; this only
/// matters when the destination asks for "anything".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NumberMode {
    /// Integers stay integers.
    #[default]
    Exact,
    /// Integer leaves are promoted to floats.
    PromoteToFloat,
}

/// Bind a validated tree into `T`.
pub(crate) fn bind<T>(
    tree: &Tree,
    buf: &[u8],
    strict: bool,
    numbers: NumberMode,
) -> Result<T, Error>
where
    T: de::DeserializeOwned,
{
    let document = doc::build(tree, buf, strict)?;
    let binder = Binder { tree, buf, numbers };
    T::deserialize(ValueDe {
        binder: &binder,
        value: &document,
    })
}

/// Shared read-only context for every value deserializer in one bind.
struct Binder<'a> {
    tree: &'a Tree,
    buf: &'a [u8],
    numbers: NumberMode,
}

/// Deserializer for one document value.
struct ValueDe<'a> {
    binder: &'a Binder<'a>,
    value: &'a DocValue,
}

impl<'a> ValueDe<'a> {
    fn span(&self) -> Span {
        self.value.span
    }

    fn lexeme(&self, node: NodeId) -> Result<&'a str, Error> {
        strings::as_utf8(
            self.binder.tree.text(node, self.binder.buf),
            self.binder.tree.span(node),
        )
    }

    /// Integer destinations decode exactly regardless of the number mode.
    fn visit_integer<'de, V>(self, visitor: V) -> Result<V::Value, Error>
    where
        V: de::Visitor<'de>,
    {
        if let Payload::Scalar(node) = &self.value.payload {
            let node = *node;
            if self.binder.tree.kind(node) == NodeKind::Integer {
                let span = self.span();
                let value = scalar::integer(self.lexeme(node)?, span)?;
                return visitor
                    .visit_i64(value)
                    .map_err(|e: Error| e.with_span(span));
            }
        }
        self.deserialize_any(visitor)
    }

    /// Float destinations also accept integer leaves.
    fn visit_float<'de, V>(self, visitor: V) -> Result<V::Value, Error>
    where
        V: de::Visitor<'de>,
    {
        if let Payload::Scalar(node) = &self.value.payload {
            let node = *node;
            let span = self.span();
            match self.binder.tree.kind(node) {
                NodeKind::Float => {
                    let value = scalar::float(self.lexeme(node)?, span)?;
                    return visitor
                        .visit_f64(value)
                        .map_err(|e: Error| e.with_span(span));
                }
                NodeKind::Integer => {
                    let value = scalar::integer(self.lexeme(node)?, span)?;
                    return visitor
                        .visit_f64(value as f64)
                        .map_err(|e: Error| e.with_span(span));
                }
                _ => {}
            }
        }
        self.deserialize_any(visitor)
    }
}

impl<'de> de::Deserializer<'de> for ValueDe<'_> {
    type Error = Error;

    fn deserialize_any<V>(self, visitor: V) -> Result<V::Value, Error>
    where
        V: de::Visitor<'de>,
    {
        let span = self.span();
        let result = match &self.value.payload {
            Payload::Table(table) => visitor.visit_map(MapDe::new(self.binder, table)),
            Payload::Array(items) => visitor.visit_seq(SeqDe::new(self.binder, items)),
            Payload::Scalar(node) => {
                let node = *node;
                match self.binder.tree.kind(node) {
                    NodeKind::String => match strings::decode_string(self.binder.buf, span)? {
                        Cow::Borrowed(text) => visitor.visit_str(text),
                        Cow::Owned(text) => visitor.visit_string(text),
                    },
                    NodeKind::Integer => {
                        let value = scalar::integer(self.lexeme(node)?, span)?;
                        match self.binder.numbers {
                            NumberMode::Exact => visitor.visit_i64(value),
                            NumberMode::PromoteToFloat => visitor.visit_f64(value as f64),
                        }
                    }
                    NodeKind::Float => {
                        visitor.visit_f64(scalar::float(self.lexeme(node)?, span)?)
                    }
                    NodeKind::Bool => visitor.visit_bool(scalar::boolean(self.lexeme(node)?)),
                    kind if kind.is_datetime() => {
                        let text = self.lexeme(node)?;
                        // validate eagerly so range errors carry this span
                        scalar::datetime(text, span)?;
                        visitor.visit_map(DatetimeDe::new(text))
                    }
                    _ => Err(Error::new(
                        ErrorKind::Internal("non-scalar node in scalar slot"),
                        span,
                    )),
                }
            }
        };
        result.map_err(|e| e.with_span(span))
    }

    fn deserialize_i8<V: de::Visitor<'de>>(self, visitor: V) -> Result<V::Value, Error> {
        self.visit_integer(visitor)
    }

    fn deserialize_i16<V: de::Visitor<'de>>(self, visitor: V) -> Result<V::Value, Error> {
        self.visit_integer(visitor)
    }

    fn deserialize_i32<V: de::Visitor<'de>>(self, visitor: V) -> Result<V::Value, Error> {
        self.visit_integer(visitor)
    }

    fn deserialize_i64<V: de::Visitor<'de>>(self, visitor: V) -> Result<V::Value, Error> {
        self.visit_integer(visitor)
    }

    fn deserialize_u8<V: de::Visitor<'de>>(self, visitor: V) -> Result<V::Value, Error> {
        self.visit_integer(visitor)
    }

    fn deserialize_u16<V: de::Visitor<'de>>(self, visitor: V) -> Result<V::Value, Error> {
        self.visit_integer(visitor)
    }

    fn deserialize_u32<V: de::Visitor<'de>>(self, visitor: V) -> Result<V::Value, Error> {
        self.visit_integer(visitor)
    }

    fn deserialize_u64<V: de::Visitor<'de>>(self, visitor: V) -> Result<V::Value, Error> {
        self.visit_integer(visitor)
    }

    fn deserialize_f32<V: de::Visitor<'de>>(self, visitor: V) -> Result<V::Value, Error> {
        self.visit_float(visitor)
    }

    fn deserialize_f64<V: de::Visitor<'de>>(self, visitor: V) -> Result<V::Value, Error> {
        self.visit_float(visitor)
    }

    /// TOML has no null; a present value always binds as `Some`.
    fn deserialize_option<V: de::Visitor<'de>>(self, visitor: V) -> Result<V::Value, Error> {
        visitor.visit_some(self)
    }

    fn deserialize_newtype_struct<V: de::Visitor<'de>>(
        self,
        _name: &'static str,
        visitor: V,
    ) -> Result<V::Value, Error> {
        visitor.visit_newtype_struct(self)
    }

    fn deserialize_struct<V: de::Visitor<'de>>(
        self,
        name: &'static str,
        _fields: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value, Error> {
        if name == datetime::NAME {
            let span = self.span();
            if let Payload::Scalar(node) = &self.value.payload {
                let node = *node;
                if self.binder.tree.kind(node).is_datetime() {
                    let text = self.lexeme(node)?;
                    scalar::datetime(text, span)?;
                    return visitor
                        .visit_map(DatetimeDe::new(text))
                        .map_err(|e| e.with_span(span));
                }
            }
            return Err(Error::new(
                ErrorKind::Message("expected a date-time".to_owned()),
                span,
            ));
        }
        self.deserialize_any(visitor)
    }

    /// A unit variant binds from a string; a data-carrying variant binds
    /// from a table with exactly one key naming the variant.
    fn deserialize_enum<V: de::Visitor<'de>>(
        self,
        _name: &'static str,
        _variants: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value, Error> {
        let span = self.span();
        let result = match &self.value.payload {
            Payload::Scalar(node) if self.binder.tree.kind(*node) == NodeKind::String => {
                let variant = strings::decode_string(self.binder.buf, span)?;
                visitor.visit_enum(EnumDe {
                    binder: self.binder,
                    variant,
                    value: None,
                })
            }
            Payload::Table(table) if table.len() == 1 => {
                let (variant, value) = table
                    .iter()
                    .next()
                    .expect("table with length 1 has an entry");
                visitor.visit_enum(EnumDe {
                    binder: self.binder,
                    variant: Cow::Borrowed(variant.as_str()),
                    value: Some(value),
                })
            }
            _ => Err(Error::new(
                ErrorKind::Message(
                    "expected a string or a table with exactly one key".to_owned(),
                ),
                span,
            )),
        };
        result.map_err(|e| e.with_span(span))
    }

    forward_to_deserialize_any! {
        bool i128 u128 char str string bytes byte_buf unit unit_struct seq
        tuple tuple_struct map identifier ignored_any
    }
}

/// Map access over an assembled table.
struct MapDe<'a> {
    binder: &'a Binder<'a>,
    iter: indexmap::map::Iter<'a, String, DocValue>,
    pending: Option<&'a DocValue>,
}

impl<'a> MapDe<'a> {
    fn new(binder: &'a Binder<'a>, table: &'a DocTable) -> Self {
        Self {
            binder,
            iter: table.iter(),
            pending: None,
        }
    }
}

impl<'de, 'a> de::MapAccess<'de> for MapDe<'a> {
    type Error = Error;

    fn next_key_seed<K>(&mut self, seed: K) -> Result<Option<K::Value>, Error>
    where
        K: de::DeserializeSeed<'de>,
    {
        match self.iter.next() {
            Some((key, value)) => {
                self.pending = Some(value);
                seed.deserialize(StrDe { text: key }).map(Some)
            }
            None => Ok(None),
        }
    }

    fn next_value_seed<V>(&mut self, seed: V) -> Result<V::Value, Error>
    where
        V: de::DeserializeSeed<'de>,
    {
        let value = self.pending.take().ok_or_else(|| {
            Error::unpositioned(ErrorKind::Internal("value requested before key"))
        })?;
        seed.deserialize(ValueDe {
            binder: self.binder,
            value,
        })
    }

    fn size_hint(&self) -> Option<usize> {
        Some(self.iter.len())
    }
}

/// Sequence access over an assembled array.
struct SeqDe<'a> {
    binder: &'a Binder<'a>,
    iter: std::slice::Iter<'a, DocValue>,
}

impl<'a> SeqDe<'a> {
    fn new(binder: &'a Binder<'a>, items: &'a [DocValue]) -> Self {
        Self {
            binder,
            iter: items.iter(),
        }
    }
}

impl<'de, 'a> de::SeqAccess<'de> for SeqDe<'a> {
    type Error = Error;

    fn next_element_seed<T>(&mut self, seed: T) -> Result<Option<T::Value>, Error>
    where
        T: de::DeserializeSeed<'de>,
    {
        match self.iter.next() {
            Some(value) => seed
                .deserialize(ValueDe {
                    binder: self.binder,
                    value,
                })
                .map(Some),
            None => Ok(None),
        }
    }

    fn size_hint(&self) -> Option<usize> {
        Some(self.iter.len())
    }
}

/// Deserializer that yields one string: map keys, enum variant names, and
/// the date-time protocol payload.
struct StrDe<'a> {
    text: &'a str,
}

impl<'de> de::Deserializer<'de> for StrDe<'_> {
    type Error = Error;

    fn deserialize_any<V: de::Visitor<'de>>(self, visitor: V) -> Result<V::Value, Error> {
        visitor.visit_str(self.text)
    }

    forward_to_deserialize_any! {
        bool i8 i16 i32 i64 i128 u8 u16 u32 u64 u128 f32 f64 char str string
        bytes byte_buf option unit unit_struct newtype_struct seq tuple
        tuple_struct map struct enum identifier ignored_any
    }
}

/// The sentinel map a `Datetime` destination unwraps: one entry, keyed by
/// the protocol field, holding the raw lexeme.
struct DatetimeDe<'a> {
    text: &'a str,
    visited: bool,
}

impl<'a> DatetimeDe<'a> {
    fn new(text: &'a str) -> Self {
        Self {
            text,
            visited: false,
        }
    }
}

impl<'de> de::MapAccess<'de> for DatetimeDe<'_> {
    type Error = Error;

    fn next_key_seed<K>(&mut self, seed: K) -> Result<Option<K::Value>, Error>
    where
        K: de::DeserializeSeed<'de>,
    {
        if self.visited {
            return Ok(None);
        }
        self.visited = true;
        seed.deserialize(StrDe {
            text: datetime::FIELD,
        })
        .map(Some)
    }

    fn next_value_seed<V>(&mut self, seed: V) -> Result<V::Value, Error>
    where
        V: de::DeserializeSeed<'de>,
    {
        seed.deserialize(StrDe { text: self.text })
    }
}

/// Enum access: variant name plus optional payload.
struct EnumDe<'a> {
    binder: &'a Binder<'a>,
    variant: Cow<'a, str>,
    value: Option<&'a DocValue>,
}

impl<'de, 'a> de::EnumAccess<'de> for EnumDe<'a> {
    type Error = Error;
    type Variant = VariantDe<'a>;

    fn variant_seed<V>(self, seed: V) -> Result<(V::Value, Self::Variant), Error>
    where
        V: de::DeserializeSeed<'de>,
    {
        let variant = seed.deserialize(StrDe {
            text: &self.variant,
        })?;
        Ok((
            variant,
            VariantDe {
                binder: self.binder,
                value: self.value,
            },
        ))
    }
}

struct VariantDe<'a> {
    binder: &'a Binder<'a>,
    value: Option<&'a DocValue>,
}

impl<'de> de::VariantAccess<'de> for VariantDe<'_> {
    type Error = Error;

    fn unit_variant(self) -> Result<(), Error> {
        match self.value {
            None => Ok(()),
            Some(value) => Err(Error::new(
                ErrorKind::Message("unexpected value for a unit variant".to_owned()),
                value.span,
            )),
        }
    }

    fn newtype_variant_seed<T>(self, seed: T) -> Result<T::Value, Error>
    where
        T: de::DeserializeSeed<'de>,
    {
        match self.value {
            Some(value) => seed.deserialize(ValueDe {
                binder: self.binder,
                value,
            }),
            None => Err(Error::unpositioned(ErrorKind::Message(
                "expected a value for a newtype variant".to_owned(),
            ))),
        }
    }

    fn tuple_variant<V>(self, _len: usize, visitor: V) -> Result<V::Value, Error>
    where
        V: de::Visitor<'de>,
    {
        match self.value {
            Some(value) => ValueDe {
                binder: self.binder,
                value,
            }
            .deserialize_any(visitor),
            None => Err(Error::unpositioned(ErrorKind::Message(
                "expected a value for a tuple variant".to_owned(),
            ))),
        }
    }

    fn struct_variant<V>(
        self,
        _fields: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value, Error>
    where
        V: de::Visitor<'de>,
    {
        match self.value {
            Some(value) => ValueDe {
                binder: self.binder,
                value,
            }
            .deserialize_any(visitor),
            None => Err(Error::unpositioned(ErrorKind::Message(
                "expected a value for a struct variant".to_owned(),
            ))),
        }
    }
}
