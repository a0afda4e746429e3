//! Shape assembly: resolving document topology before binding.
//!
//! serde visits every map key exactly once, so the scattered surface of a
//! TOML document - headers opening scopes, dotted keys descending, array
//! tables appending elements - must be folded into one logical tree
//! first. This pass walks the validated arena tree and produces that
//! tree: tables become ordered maps keyed by decoded key text, arrays
//! become vectors, and scalars stay as borrowed node references until the
//! binder coerces them.
//!
//! In strict mode the tracker has already rejected every structural
//! conflict, so a collision here is an internal error. In lenient mode
//! later definitions win: tables merge and values overwrite.

use indexmap::IndexMap;
use tomlark_core::span::Span;
use tomlark_core::tree::{NodeId, NodeKind, Tree};

use crate::error::{Error, ErrorKind};
use crate::strings::decode_key;
use crate::tracker::split_keyval;

/// A value in the assembled document.
#[derive(Debug)]
pub(crate) struct DocValue {
    pub span: Span,
    pub payload: Payload,
}

#[derive(Debug)]
pub(crate) enum Payload {
    /// A scalar leaf; the node holds the raw lexeme.
    Scalar(NodeId),
    Array(Vec<DocValue>),
    Table(DocTable),
}

pub(crate) type DocTable = IndexMap<String, DocValue>;

impl DocValue {
    fn table(span: Span) -> Self {
        DocValue {
            span,
            payload: Payload::Table(DocTable::new()),
        }
    }
}

/// Fold the top-level expression chain into one document table.
pub(crate) fn build(tree: &Tree, buf: &[u8], strict: bool) -> Result<DocValue, Error> {
    let mut root = DocTable::new();
    let mut scope: Vec<String> = Vec::new();

    for node in tree.roots() {
        match tree.kind(node) {
            NodeKind::Comment => {}
            NodeKind::Table => {
                let parts = header_keys(tree, buf, node)?;
                open_table(&mut root, &parts, strict)?;
                scope = parts.into_iter().map(|(name, _)| name).collect();
            }
            NodeKind::ArrayTable => {
                let parts = header_keys(tree, buf, node)?;
                append_element(&mut root, &parts, strict)?;
                scope = parts.into_iter().map(|(name, _)| name).collect();
            }
            NodeKind::KeyValue => {
                let table = descend_scope(&mut root, &scope, tree.span(node))?;
                insert_keyval(table, tree, buf, node, strict)?;
            }
            _ => {
                return Err(Error::new(
                    ErrorKind::Internal("unexpected top-level node kind"),
                    tree.span(node),
                ));
            }
        }
    }

    Ok(DocValue {
        span: Span::new(0, buf.len() as u32),
        payload: Payload::Table(root),
    })
}

fn header_keys(tree: &Tree, buf: &[u8], node: NodeId) -> Result<Vec<(String, Span)>, Error> {
    tree.children(node)
        .map(|part| Ok((decode_key(buf, tree, part)?.into_owned(), tree.span(part))))
        .collect()
}

/// `[a.b.c]`: make sure the path exists as tables, descending through the
/// last element of any array-of-tables on the way.
fn open_table(
    root: &mut DocTable,
    parts: &[(String, Span)],
    strict: bool,
) -> Result<(), Error> {
    let mut cur = root;
    for (name, span) in parts {
        let slot = cur
            .entry(name.clone())
            .or_insert_with(|| DocValue::table(*span));
        cur = step_into(slot, *span, strict)?;
    }
    Ok(())
}

/// `[[a.b]]`: descend to the parent, then append a fresh table element to
/// the named array, creating the array on first sight.
fn append_element(
    root: &mut DocTable,
    parts: &[(String, Span)],
    strict: bool,
) -> Result<(), Error> {
    let Some(((last, last_span), init)) = parts.split_last() else {
        return Err(Error::unpositioned(ErrorKind::Internal(
            "array-table header without key parts",
        )));
    };

    let mut cur = root;
    for (name, span) in init {
        let slot = cur
            .entry(name.clone())
            .or_insert_with(|| DocValue::table(*span));
        cur = step_into(slot, *span, strict)?;
    }

    let slot = cur.entry(last.clone()).or_insert_with(|| DocValue {
        span: *last_span,
        payload: Payload::Array(Vec::new()),
    });
    if !matches!(slot.payload, Payload::Array(_)) {
        if strict {
            return Err(Error::new(
                ErrorKind::Internal("array-table conflict survived tracking"),
                *last_span,
            ));
        }
        *slot = DocValue {
            span: *last_span,
            payload: Payload::Array(Vec::new()),
        };
    }
    let Payload::Array(items) = &mut slot.payload else {
        return Err(Error::new(
            ErrorKind::Internal("array-table slot is not an array"),
            *last_span,
        ));
    };
    items.push(DocValue::table(*last_span));
    Ok(())
}

/// Resolve a slot to its table for descent, entering the last element of
/// an array-of-tables. In lenient mode a conflicting slot is replaced.
fn step_into(slot: &mut DocValue, span: Span, strict: bool) -> Result<&mut DocTable, Error> {
    let compatible = match &slot.payload {
        Payload::Table(_) => true,
        Payload::Array(items) => matches!(
            items.last(),
            Some(DocValue {
                payload: Payload::Table(_),
                ..
            })
        ),
        Payload::Scalar(_) => false,
    };
    if !compatible {
        if strict {
            return Err(Error::new(
                ErrorKind::Internal("shape conflict survived tracking"),
                span,
            ));
        }
        *slot = DocValue::table(span);
    }
    match &mut slot.payload {
        Payload::Table(table) => Ok(table),
        Payload::Array(items) => match items.last_mut() {
            Some(DocValue {
                payload: Payload::Table(table),
                ..
            }) => Ok(table),
            _ => Err(Error::new(
                ErrorKind::Internal("array-of-tables element is not a table"),
                span,
            )),
        },
        Payload::Scalar(_) => Err(Error::new(
            ErrorKind::Internal("scalar slot after replacement"),
            span,
        )),
    }
}

/// Re-descend from the root along the current header scope. The headers
/// created this path, so failure to resolve it is an internal error.
fn descend_scope<'t>(
    root: &'t mut DocTable,
    scope: &[String],
    span: Span,
) -> Result<&'t mut DocTable, Error> {
    let mut cur = root;
    for name in scope {
        let slot = cur.get_mut(name).ok_or_else(|| {
            Error::new(
                ErrorKind::Internal("header scope vanished from the document"),
                span,
            )
        })?;
        cur = match &mut slot.payload {
            Payload::Table(table) => table,
            Payload::Array(items) => match items.last_mut() {
                Some(DocValue {
                    payload: Payload::Table(table),
                    ..
                }) => table,
                _ => {
                    return Err(Error::new(
                        ErrorKind::Internal("array-of-tables element is not a table"),
                        span,
                    ));
                }
            },
            Payload::Scalar(_) => {
                return Err(Error::new(
                    ErrorKind::Internal("header scope resolved to a scalar"),
                    span,
                ));
            }
        };
    }
    Ok(cur)
}

/// Insert one `key = value` into `table`, descending through dotted key
/// parts. Also used for the interior of inline tables.
fn insert_keyval(
    table: &mut DocTable,
    tree: &Tree,
    buf: &[u8],
    node: NodeId,
    strict: bool,
) -> Result<(), Error> {
    let (value, parts) = split_keyval(tree, node)?;

    let mut cur = table;
    for (i, &part) in parts.iter().enumerate() {
        let name = decode_key(buf, tree, part)?.into_owned();
        let span = tree.span(part);
        if i + 1 == parts.len() {
            let converted = convert_value(tree, buf, value, strict)?;
            match cur.entry(name) {
                indexmap::map::Entry::Vacant(entry) => {
                    entry.insert(converted);
                }
                indexmap::map::Entry::Occupied(mut entry) => {
                    if strict {
                        return Err(Error::new(
                            ErrorKind::Internal("duplicate key survived tracking"),
                            span,
                        ));
                    }
                    entry.insert(converted);
                }
            }
        } else {
            let slot = cur
                .entry(name)
                .or_insert_with(|| DocValue::table(span));
            if !matches!(slot.payload, Payload::Table(_)) {
                if strict {
                    return Err(Error::new(
                        ErrorKind::Internal("dotted-key conflict survived tracking"),
                        span,
                    ));
                }
                *slot = DocValue::table(span);
            }
            let Payload::Table(next) = &mut slot.payload else {
                return Err(Error::new(
                    ErrorKind::Internal("table slot is not a table"),
                    span,
                ));
            };
            cur = next;
        }
    }
    Ok(())
}

/// Convert a parsed value node: arrays and inline tables recurse, scalars
/// stay as node references.
fn convert_value(tree: &Tree, buf: &[u8], node: NodeId, strict: bool) -> Result<DocValue, Error> {
    let span = tree.span(node);
    match tree.kind(node) {
        NodeKind::Array => {
            let mut items = Vec::new();
            for element in tree.children(node) {
                items.push(convert_value(tree, buf, element, strict)?);
            }
            Ok(DocValue {
                span,
                payload: Payload::Array(items),
            })
        }
        NodeKind::InlineTable => {
            let mut table = DocTable::new();
            for keyval in tree.children(node) {
                insert_keyval(&mut table, tree, buf, keyval, strict)?;
            }
            Ok(DocValue {
                span,
                payload: Payload::Table(table),
            })
        }
        kind if kind.is_scalar() => Ok(DocValue {
            span,
            payload: Payload::Scalar(node),
        }),
        _ => Err(Error::new(
            ErrorKind::Internal("unexpected value node kind"),
            span,
        )),
    }
}
