//! Arena-backed syntax tree for parsed TOML documents.
//!
//! All nodes live in one flat vector and reference each other by index:
//! `next` points at the right sibling, `first_child` at the first child,
//! and index 0 is reserved as the null link ([`NIL`]). Node payloads are
//! byte spans into the original input; no text is copied into the tree.
//!
//! The tree is write-once: the parser appends and links nodes, then the
//! binder walks it read-only.

use crate::span::Span;

/// Index of a node in the arena. 0 ([`NIL`]) means "no node".
pub type NodeId = u32;

/// The null link. Slot 0 of every arena is a reserved sentinel so that
/// `next == NIL` and `first_child == NIL` are unambiguous.
pub const NIL: NodeId = 0;

/// Kind of a syntax tree node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum NodeKind {
    /// Sentinel; only the reserved slot 0 carries it.
    Invalid,
    Comment,
    Key,
    Table,
    ArrayTable,
    KeyValue,
    Array,
    InlineTable,
    String,
    Bool,
    Float,
    Integer,
    LocalDate,
    LocalDateTime,
    OffsetDateTime,
    LocalTime,
}

impl NodeKind {
    /// Scalar kinds are leaves whose span is the raw lexeme, delimiters
    /// included.
    pub fn is_scalar(self) -> bool {
        matches!(
            self,
            NodeKind::String
                | NodeKind::Bool
                | NodeKind::Float
                | NodeKind::Integer
                | NodeKind::LocalDate
                | NodeKind::LocalDateTime
                | NodeKind::OffsetDateTime
                | NodeKind::LocalTime
        )
    }

    pub fn is_datetime(self) -> bool {
        matches!(
            self,
            NodeKind::LocalDate
                | NodeKind::LocalDateTime
                | NodeKind::OffsetDateTime
                | NodeKind::LocalTime
        )
    }

    /// Human-readable kind name used in error messages.
    pub fn describe(self) -> &'static str {
        match self {
            NodeKind::Invalid => "invalid",
            NodeKind::Comment => "comment",
            NodeKind::Key => "key",
            NodeKind::Table => "table",
            NodeKind::ArrayTable => "array of tables",
            NodeKind::KeyValue => "key/value pair",
            NodeKind::Array => "array",
            NodeKind::InlineTable => "inline table",
            NodeKind::String => "string",
            NodeKind::Bool => "boolean",
            NodeKind::Float => "float",
            NodeKind::Integer => "integer",
            NodeKind::LocalDate => "local date",
            NodeKind::LocalDateTime => "local date-time",
            NodeKind::OffsetDateTime => "offset date-time",
            NodeKind::LocalTime => "local time",
        }
    }
}

/// One arena node: kind, payload span, and two index links.
///
/// Kept small so a document's worth of nodes stays cache-friendly.
#[derive(Debug, Clone, Copy)]
pub struct Node {
    pub kind: NodeKind,
    pub span: Span,
    next: NodeId,
    first_child: NodeId,
}

impl Node {
    #[inline]
    pub fn next(&self) -> NodeId {
        self.next
    }

    #[inline]
    pub fn first_child(&self) -> NodeId {
        self.first_child
    }
}

/// The arena plus the index of the first top-level node.
#[derive(Debug)]
pub struct Tree {
    nodes: Vec<Node>,
    root: NodeId,
    last_root: NodeId,
}

impl Default for Tree {
    fn default() -> Self {
        Self::new()
    }
}

impl Tree {
    pub fn new() -> Self {
        Self {
            nodes: vec![Node {
                kind: NodeKind::Invalid,
                span: Span::empty(0),
                next: NIL,
                first_child: NIL,
            }],
            root: NIL,
            last_root: NIL,
        }
    }

    /// Append an unlinked node and return its index.
    pub fn push(&mut self, kind: NodeKind, span: Span) -> NodeId {
        let id = self.nodes.len() as NodeId;
        self.nodes.push(Node {
            kind,
            span,
            next: NIL,
            first_child: NIL,
        });
        id
    }

    /// Number of nodes, excluding the reserved sentinel.
    pub fn len(&self) -> usize {
        self.nodes.len() - 1
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[inline]
    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id as usize]
    }

    #[inline]
    pub fn kind(&self, id: NodeId) -> NodeKind {
        self.nodes[id as usize].kind
    }

    #[inline]
    pub fn span(&self, id: NodeId) -> Span {
        self.nodes[id as usize].span
    }

    #[inline]
    pub fn next(&self, id: NodeId) -> NodeId {
        self.nodes[id as usize].next
    }

    #[inline]
    pub fn first_child(&self, id: NodeId) -> NodeId {
        self.nodes[id as usize].first_child
    }

    /// Widen a container node's span once its extent is known.
    pub fn set_span(&mut self, id: NodeId, span: Span) {
        self.nodes[id as usize].span = span;
    }

    pub fn set_next(&mut self, id: NodeId, next: NodeId) {
        self.nodes[id as usize].next = next;
    }

    pub fn set_first_child(&mut self, id: NodeId, child: NodeId) {
        self.nodes[id as usize].first_child = child;
    }

    /// Link `children` under `parent` in order, replacing any existing list.
    pub fn link_children(&mut self, parent: NodeId, children: &[NodeId]) {
        let mut prev = NIL;
        for &child in children {
            if prev == NIL {
                self.set_first_child(parent, child);
            } else {
                self.set_next(prev, child);
            }
            prev = child;
        }
    }

    /// Append `child` at the end of `parent`'s child list. `last` caches the
    /// current tail so appending stays O(1); pass [`NIL`] for the first child.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId, last: &mut NodeId) {
        if *last == NIL {
            self.set_first_child(parent, child);
        } else {
            self.set_next(*last, child);
        }
        *last = child;
    }

    /// Append a node to the top-level expression chain.
    pub fn push_root(&mut self, id: NodeId) {
        if self.root == NIL {
            self.root = id;
        } else {
            self.set_next(self.last_root, id);
        }
        self.last_root = id;
    }

    /// First top-level node, or [`NIL`] for an empty document.
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Iterate the top-level expression chain.
    pub fn roots(&self) -> Children<'_> {
        Children {
            tree: self,
            cur: self.root,
        }
    }

    /// Iterate the children of `id` in order.
    pub fn children(&self, id: NodeId) -> Children<'_> {
        Children {
            tree: self,
            cur: self.first_child(id),
        }
    }

    /// Raw lexeme bytes of `id` within `source`.
    pub fn text<'s>(&self, id: NodeId, source: &'s [u8]) -> &'s [u8] {
        &source[self.span(id).as_range()]
    }

    /// Indented kind-and-lexeme dump, used by parser snapshot tests.
    pub fn dump(&self, source: &str) -> String {
        let mut out = String::new();
        for root in self.roots() {
            self.dump_node(root, source, 0, &mut out);
        }
        out
    }

    fn dump_node(&self, id: NodeId, source: &str, depth: usize, out: &mut String) {
        use std::fmt::Write;

        let node = self.node(id);
        for _ in 0..depth {
            out.push_str("  ");
        }
        let show_text = node.kind.is_scalar()
            || matches!(node.kind, NodeKind::Key | NodeKind::Comment);
        if show_text {
            let text = &source[node.span.as_range()];
            writeln!(out, "{:?} {:?}", node.kind, text).expect("String write never fails");
        } else {
            writeln!(out, "{:?}", node.kind).expect("String write never fails");
        }
        for child in self.children(id) {
            self.dump_node(child, source, depth + 1, out);
        }
    }
}

/// Sibling cursor over a child list.
#[derive(Clone)]
pub struct Children<'t> {
    tree: &'t Tree,
    cur: NodeId,
}

impl Children<'_> {
    /// Next node without advancing.
    pub fn peek(&self) -> Option<NodeId> {
        (self.cur != NIL).then_some(self.cur)
    }
}

impl Iterator for Children<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        if self.cur == NIL {
            return None;
        }
        let id = self.cur;
        self.cur = self.tree.next(id);
        Some(id)
    }
}
