//! Structural validation across expressions.
//!
//! The grammar alone cannot express TOML's cross-expression rules: keys
//! are defined at most once, a key keeps one shape for the whole
//! document, explicitly headed tables are not re-declared, inline tables
//! are sealed, and each `[[array]]` header opens a fresh element whose
//! keys start over.
//!
//! The tracker maintains a shadow tree of every key observed so far, as a
//! flat vector of parent-indexed entries. Descendants are always stored
//! after their ancestors, so `find` scans forward from the parent and
//! `clear` invalidates a subtree in place. A failed check rolls the
//! vector back to its pre-check length, leaving the tracker state
//! observably unchanged.

use tomlark_core::tree::{NodeId, NodeKind, Tree};

use crate::error::{Error, ErrorKind};
use crate::strings::decode_key;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EntryKind {
    /// Cleared by an array-table re-entry; skipped by `find`.
    Invalid,
    Value,
    Table,
    ArrayTable,
    /// Sealed: nothing may extend it after it is parsed.
    InlineTable,
}

impl EntryKind {
    fn describe(self) -> &'static str {
        match self {
            EntryKind::Invalid => "a cleared key",
            EntryKind::Value => "a value",
            EntryKind::Table => "a table",
            EntryKind::ArrayTable => "an array of tables",
            EntryKind::InlineTable => "an inline table",
        }
    }
}

#[derive(Debug)]
struct Entry {
    parent: u32,
    name: String,
    kind: EntryKind,
    explicit: bool,
    /// Created or traversed by a dotted key. Only these are sealed when
    /// their scope closes; implicit tables from header paths stay open.
    dotted: bool,
}

/// One shadow tree: the document's, or a sealed inline-table scope.
#[derive(Debug, Default)]
struct Shadow {
    entries: Vec<Entry>,
}

/// Index of the root entry in every shadow.
const ROOT: u32 = 0;

impl Shadow {
    fn reset(&mut self) {
        self.entries.clear();
        self.entries.push(Entry {
            parent: ROOT,
            name: String::new(),
            kind: EntryKind::Table,
            explicit: false,
            dotted: false,
        });
    }

    /// Find a live child of `parent` named `name`. Descendants follow
    /// their ancestors in the vector, so the scan starts past the parent.
    fn find(&self, parent: u32, name: &str) -> Option<u32> {
        self.entries
            .iter()
            .enumerate()
            .skip(parent as usize + 1)
            .find(|(_, e)| e.parent == parent && e.kind != EntryKind::Invalid && e.name == name)
            .map(|(i, _)| i as u32)
    }

    fn create(&mut self, parent: u32, name: &str, kind: EntryKind, explicit: bool) -> u32 {
        self.create_dotted(parent, name, kind, explicit, false)
    }

    fn create_dotted(
        &mut self,
        parent: u32,
        name: &str,
        kind: EntryKind,
        explicit: bool,
        dotted: bool,
    ) -> u32 {
        let idx = self.entries.len() as u32;
        self.entries.push(Entry {
            parent,
            name: name.to_owned(),
            kind,
            explicit,
            dotted,
        });
        idx
    }

    fn kind(&self, idx: u32) -> EntryKind {
        self.entries[idx as usize].kind
    }

    fn is_descendant(&self, mut node: u32, ancestor: u32) -> bool {
        while node > ancestor {
            node = self.entries[node as usize].parent;
        }
        node == ancestor
    }

    /// Invalidate every transitive descendant of `idx`, preserving the
    /// order of surviving entries. Parent links stay intact so later
    /// descendants still resolve their chains.
    fn clear(&mut self, idx: u32) {
        for i in (idx as usize + 1)..self.entries.len() {
            if self.is_descendant(i as u32, idx) {
                self.entries[i].kind = EntryKind::Invalid;
            }
        }
    }

    /// Seal the tables dotted keys created under `scope`: once the scope
    /// closes, a later header may not re-declare them. Implicit tables
    /// that only ever appeared inside header paths stay open.
    fn propagate_explicit(&mut self, scope: u32) {
        for i in (scope as usize + 1)..self.entries.len() {
            let entry = &self.entries[i];
            if entry.kind == EntryKind::Table
                && entry.dotted
                && !entry.explicit
                && self.is_descendant(i as u32, scope)
            {
                self.entries[i].explicit = true;
            }
        }
    }
}

pub(crate) struct Tracker {
    doc: Shadow,
    /// Entry the current table header points at; key/value expressions
    /// resolve their keys from here.
    scope: u32,
    /// Pooled shadows for inline-table scopes, one per nesting depth.
    pool: Vec<Shadow>,
}

impl Tracker {
    pub(crate) fn new() -> Self {
        let mut doc = Shadow::default();
        doc.reset();
        Self {
            doc,
            scope: ROOT,
            pool: Vec::new(),
        }
    }

    /// Validate one top-level expression. On error the entry vector is
    /// rolled back, so the observable state equals the state before the
    /// call.
    pub(crate) fn check_expression(
        &mut self,
        tree: &Tree,
        buf: &[u8],
        node: NodeId,
    ) -> Result<(), Error> {
        let mark = self.doc.entries.len();
        let result = match tree.kind(node) {
            NodeKind::KeyValue => self.check_keyval(tree, buf, node),
            NodeKind::Table => self.check_table(tree, buf, node),
            NodeKind::ArrayTable => self.check_array_table(tree, buf, node),
            _ => Err(Error::new(
                ErrorKind::Internal("unexpected top-level node kind"),
                tree.span(node),
            )),
        };
        if result.is_err() {
            self.doc.entries.truncate(mark);
        }
        result
    }

    fn check_keyval(&mut self, tree: &Tree, buf: &[u8], node: NodeId) -> Result<(), Error> {
        let (value, parts) = split_keyval(tree, node)?;
        let mut cur = self.scope;
        for (i, &part) in parts.iter().enumerate() {
            let name = decode_key(buf, tree, part)?;
            let span = tree.span(part);
            if i + 1 == parts.len() {
                if self.doc.find(cur, &name).is_some() {
                    return Err(Error::new(ErrorKind::DuplicateKey(name.into_owned()), span));
                }
                self.doc.create(cur, &name, entry_kind_for_value(tree.kind(value)), true);
                self.track_value(tree, buf, value, 0)?;
            } else {
                cur = match self.doc.find(cur, &name) {
                    None => self.doc.create_dotted(cur, &name, EntryKind::Table, false, true),
                    Some(found) => match self.doc.kind(found) {
                        EntryKind::Table => {
                            // a dotted key may not re-open a table that a
                            // header already defined
                            if self.doc.entries[found as usize].explicit {
                                return Err(Error::new(
                                    ErrorKind::TableRedeclared(name.into_owned()),
                                    span,
                                ));
                            }
                            self.doc.entries[found as usize].dotted = true;
                            found
                        }
                        EntryKind::InlineTable => {
                            return Err(Error::new(
                                ErrorKind::InlineTableExtended(name.into_owned()),
                                span,
                            ));
                        }
                        other => {
                            return Err(Error::new(
                                ErrorKind::KeyRedefined(name.into_owned(), other.describe()),
                                span,
                            ));
                        }
                    },
                };
            }
        }
        Ok(())
    }

    fn check_table(&mut self, tree: &Tree, buf: &[u8], node: NodeId) -> Result<(), Error> {
        self.doc.propagate_explicit(self.scope);

        let parts: Vec<NodeId> = tree.children(node).collect();
        let mut cur = ROOT;
        for (i, &part) in parts.iter().enumerate() {
            let name = decode_key(buf, tree, part)?;
            let span = tree.span(part);
            if i + 1 == parts.len() {
                cur = match self.doc.find(cur, &name) {
                    None => self.doc.create(cur, &name, EntryKind::Table, true),
                    Some(found) => match self.doc.kind(found) {
                        EntryKind::Table => {
                            if self.doc.entries[found as usize].explicit {
                                return Err(Error::new(
                                    ErrorKind::TableRedeclared(name.into_owned()),
                                    span,
                                ));
                            }
                            self.doc.entries[found as usize].explicit = true;
                            found
                        }
                        EntryKind::InlineTable => {
                            return Err(Error::new(
                                ErrorKind::InlineTableExtended(name.into_owned()),
                                span,
                            ));
                        }
                        other => {
                            return Err(Error::new(
                                ErrorKind::KeyRedefined(name.into_owned(), other.describe()),
                                span,
                            ));
                        }
                    },
                };
            } else {
                cur = self.walk_intermediate(cur, &name, span)?;
            }
        }
        self.scope = cur;
        Ok(())
    }

    fn check_array_table(&mut self, tree: &Tree, buf: &[u8], node: NodeId) -> Result<(), Error> {
        self.doc.propagate_explicit(self.scope);

        let parts: Vec<NodeId> = tree.children(node).collect();
        let mut cur = ROOT;
        for (i, &part) in parts.iter().enumerate() {
            let name = decode_key(buf, tree, part)?;
            let span = tree.span(part);
            if i + 1 == parts.len() {
                cur = match self.doc.find(cur, &name) {
                    None => self.doc.create(cur, &name, EntryKind::ArrayTable, true),
                    Some(found) => match self.doc.kind(found) {
                        EntryKind::ArrayTable => {
                            // fresh element: every key observed under this
                            // path may be defined again
                            self.doc.clear(found);
                            found
                        }
                        EntryKind::InlineTable => {
                            return Err(Error::new(
                                ErrorKind::InlineTableExtended(name.into_owned()),
                                span,
                            ));
                        }
                        other => {
                            return Err(Error::new(
                                ErrorKind::KeyRedefined(name.into_owned(), other.describe()),
                                span,
                            ));
                        }
                    },
                };
            } else {
                cur = self.walk_intermediate(cur, &name, span)?;
            }
        }
        self.scope = cur;
        Ok(())
    }

    /// Non-terminal header part: an implicitly created table, or a match
    /// against an existing table or array-of-tables.
    fn walk_intermediate(
        &mut self,
        cur: u32,
        name: &str,
        span: tomlark_core::span::Span,
    ) -> Result<u32, Error> {
        match self.doc.find(cur, name) {
            None => Ok(self.doc.create(cur, name, EntryKind::Table, false)),
            Some(found) => match self.doc.kind(found) {
                EntryKind::Table | EntryKind::ArrayTable => Ok(found),
                EntryKind::InlineTable => Err(Error::new(
                    ErrorKind::InlineTableExtended(name.to_owned()),
                    span,
                )),
                other => Err(Error::new(
                    ErrorKind::KeyRedefined(name.to_owned(), other.describe()),
                    span,
                )),
            },
        }
    }

    /// Recurse into inline tables and arrays so their interior keys are
    /// checked. Inline-table scopes are sealed: they get their own shadow
    /// (pooled per nesting depth) which is discarded afterwards.
    fn track_value(
        &mut self,
        tree: &Tree,
        buf: &[u8],
        value: NodeId,
        depth: usize,
    ) -> Result<(), Error> {
        match tree.kind(value) {
            NodeKind::InlineTable => {
                let mut shadow = if depth < self.pool.len() {
                    std::mem::take(&mut self.pool[depth])
                } else {
                    Shadow::default()
                };
                shadow.reset();
                let result = self.track_inline_table(&mut shadow, tree, buf, value, depth);
                if depth < self.pool.len() {
                    self.pool[depth] = shadow;
                } else {
                    self.pool.push(shadow);
                }
                result
            }
            NodeKind::Array => {
                for element in tree.children(value) {
                    self.track_value(tree, buf, element, depth)?;
                }
                Ok(())
            }
            _ => Ok(()),
        }
    }

    fn track_inline_table(
        &mut self,
        shadow: &mut Shadow,
        tree: &Tree,
        buf: &[u8],
        table: NodeId,
        depth: usize,
    ) -> Result<(), Error> {
        for keyval in tree.children(table) {
            let (value, parts) = split_keyval(tree, keyval)?;
            let mut cur = ROOT;
            for (i, &part) in parts.iter().enumerate() {
                let name = decode_key(buf, tree, part)?;
                let span = tree.span(part);
                if i + 1 == parts.len() {
                    if shadow.find(cur, &name).is_some() {
                        return Err(Error::new(ErrorKind::DuplicateKey(name.into_owned()), span));
                    }
                    shadow.create(cur, &name, entry_kind_for_value(tree.kind(value)), true);
                    self.track_value(tree, buf, value, depth + 1)?;
                } else {
                    cur = match shadow.find(cur, &name) {
                        None => shadow.create(cur, &name, EntryKind::Table, false),
                        Some(found) => match shadow.kind(found) {
                            EntryKind::Table => found,
                            EntryKind::InlineTable => {
                                return Err(Error::new(
                                    ErrorKind::InlineTableExtended(name.into_owned()),
                                    span,
                                ));
                            }
                            other => {
                                return Err(Error::new(
                                    ErrorKind::KeyRedefined(name.into_owned(), other.describe()),
                                    span,
                                ));
                            }
                        },
                    };
                }
            }
        }
        Ok(())
    }
}

/// First child is the value; the key parts follow as its siblings.
pub(crate) fn split_keyval(tree: &Tree, node: NodeId) -> Result<(NodeId, Vec<NodeId>), Error> {
    let mut children = tree.children(node);
    let Some(value) = children.next() else {
        return Err(Error::new(
            ErrorKind::Internal("key/value node without children"),
            tree.span(node),
        ));
    };
    let parts: Vec<NodeId> = children.collect();
    if parts.is_empty() {
        return Err(Error::new(
            ErrorKind::Internal("key/value node without key parts"),
            tree.span(node),
        ));
    }
    Ok((value, parts))
}

fn entry_kind_for_value(kind: NodeKind) -> EntryKind {
    match kind {
        NodeKind::InlineTable => EntryKind::InlineTable,
        _ => EntryKind::Value,
    }
}
