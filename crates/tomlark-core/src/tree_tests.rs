use crate::span::Span;
use crate::tree::{NodeKind, Tree, NIL};

#[test]
fn nodes_stay_cache_friendly() {
    assert!(std::mem::size_of::<crate::tree::Node>() <= 64);
}

#[test]
fn empty_tree_has_no_roots() {
    let tree = Tree::new();
    assert_eq!(tree.root(), NIL);
    assert_eq!(tree.roots().count(), 0);
    assert!(tree.is_empty());
}

#[test]
fn sibling_links_preserve_order() {
    let mut tree = Tree::new();
    let a = tree.push(NodeKind::Integer, Span::new(0, 1));
    let b = tree.push(NodeKind::Integer, Span::new(2, 3));
    let c = tree.push(NodeKind::Integer, Span::new(4, 5));
    tree.push_root(a);
    tree.push_root(b);
    tree.push_root(c);

    let roots: Vec<_> = tree.roots().collect();
    assert_eq!(roots, vec![a, b, c]);
    assert_eq!(tree.next(a), b);
    assert_eq!(tree.next(c), NIL);
}

#[test]
fn child_links_and_iteration() {
    let mut tree = Tree::new();
    let array = tree.push(NodeKind::Array, Span::new(0, 9));
    let x = tree.push(NodeKind::Integer, Span::new(1, 2));
    let y = tree.push(NodeKind::Integer, Span::new(4, 5));
    let z = tree.push(NodeKind::Integer, Span::new(7, 8));
    tree.link_children(array, &[x, y, z]);

    assert_eq!(tree.first_child(array), x);
    let children: Vec<_> = tree.children(array).collect();
    assert_eq!(children, vec![x, y, z]);
    // leaves have no children
    assert_eq!(tree.children(x).count(), 0);
}

#[test]
fn append_child_tracks_tail() {
    let mut tree = Tree::new();
    let array = tree.push(NodeKind::Array, Span::new(0, 9));
    let mut last = NIL;
    let mut pushed = Vec::new();
    for i in 0..4u32 {
        let id = tree.push(NodeKind::Bool, Span::new(i, i + 1));
        tree.append_child(array, id, &mut last);
        pushed.push(id);
    }
    assert_eq!(tree.children(array).collect::<Vec<_>>(), pushed);
}

#[test]
fn peek_does_not_advance() {
    let mut tree = Tree::new();
    let a = tree.push(NodeKind::String, Span::new(0, 2));
    tree.push_root(a);

    let mut iter = tree.roots();
    assert_eq!(iter.peek(), Some(a));
    assert_eq!(iter.peek(), Some(a));
    assert_eq!(iter.next(), Some(a));
    assert_eq!(iter.peek(), None);
}

#[test]
fn text_slices_the_source() {
    let source = b"x = 42";
    let mut tree = Tree::new();
    let n = tree.push(NodeKind::Integer, Span::new(4, 6));
    assert_eq!(tree.text(n, source), b"42");
}

#[test]
fn dump_shows_kinds_and_lexemes() {
    let source = "x = 42";
    let mut tree = Tree::new();
    let kv = tree.push(NodeKind::KeyValue, Span::new(0, 6));
    let value = tree.push(NodeKind::Integer, Span::new(4, 6));
    let key = tree.push(NodeKind::Key, Span::new(0, 1));
    tree.link_children(kv, &[value, key]);
    tree.push_root(kv);

    insta::assert_snapshot!(tree.dump(source), @r#"
    KeyValue
      Integer "42"
      Key "x"
    "#);
}
