//! Edge case tests for trellis-a11y
//!
//! Boundary behavior of roving indices, key parsing, dispatch tables and
//! attribute synchronization against a real tree.

use trellis_a11y::{
    AriaRole, AttributeSet, Key, KeyDispatch, NavigationPolicy, Politeness, RovingIndex, TabIndex,
    synchronize, synchronize_relative,
};
use trellis_dom::{DomTree, KeyboardInput, NodeId, UiEvent};

// ============================================================================
// ROVING INDEX
// ============================================================================

#[test]
fn test_empty_list_never_moves() {
    for policy in [NavigationPolicy::Wrap, NavigationPolicy::Clamp, NavigationPolicy::None] {
        let index = RovingIndex::new(None, 0, policy);
        assert_eq!(index.next(), None);
        assert_eq!(index.prev(), None);
        assert_eq!(index.first(), None);
        assert_eq!(index.last(), None);
    }
}

#[test]
fn test_single_item_boundaries() {
    let wrap = RovingIndex::new(Some(0), 1, NavigationPolicy::Wrap);
    assert_eq!(wrap.next(), Some(0));
    assert!(wrap.is_first() && wrap.is_last());

    let none = RovingIndex::new(Some(0), 1, NavigationPolicy::None);
    assert_eq!(none.next(), None);
    assert_eq!(none.prev(), None);
}

#[test]
fn test_stale_current_is_dropped() {
    let index = RovingIndex::new(Some(7), 3, NavigationPolicy::Clamp);
    assert_eq!(index.current, None);
    assert_eq!(index.next(), Some(0));
    assert_eq!(index.prev(), Some(2));
}

#[test]
fn test_locate_missing_item() {
    let items = ["a", "b", "c"];
    let index = RovingIndex::locate(&items, Some(&"z"), NavigationPolicy::Wrap);
    assert_eq!(index.current, None);
    let index = RovingIndex::locate(&items, Some(&"c"), NavigationPolicy::Wrap);
    assert_eq!(index.next(), Some(0));
}

#[test]
fn test_tabindex_parse() {
    assert_eq!(TabIndex::parse(" 0 "), TabIndex::Sequential(0));
    assert_eq!(TabIndex::parse("-1"), TabIndex::NotFocusable);
    assert!(!TabIndex::parse("auto").is_focusable());
}

// ============================================================================
// KEYS
// ============================================================================

#[test]
fn test_key_parse_edges() {
    assert_eq!(Key::parse("Esc"), Some(Key::Escape));
    assert_eq!(Key::parse("Spacebar"), Some(Key::Space));
    assert_eq!(Key::parse("é"), Some(Key::Char('é')));
    assert_eq!(Key::parse("F5"), None);
    assert_eq!(Key::parse(""), None);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Nav {
    Forward,
    Backward,
    Search,
}

fn table() -> KeyDispatch<Nav> {
    KeyDispatch::new()
        .on(Key::Tab, Nav::Forward)
        .on_shift(Key::Tab, Nav::Backward)
        .typeahead(Nav::Search)
}

#[test]
fn test_shift_selects_separate_entry() {
    let table = table();
    assert_eq!(table.resolve(&KeyboardInput::new("Tab")), Some(Nav::Forward));
    assert_eq!(table.resolve(&KeyboardInput::new("Tab").with_shift()), Some(Nav::Backward));
    assert_eq!(table.len(), 2);
}

#[test]
fn test_space_is_not_typeahead() {
    let table = table();
    assert_eq!(table.resolve(&KeyboardInput::new("q")), Some(Nav::Search));
    assert_eq!(table.resolve(&KeyboardInput::new(" ")), None);
    let alt = KeyboardInput {
        alt: true,
        ..KeyboardInput::new("q")
    };
    assert_eq!(table.resolve(&alt), None);
}

#[test]
fn test_unmatched_key_passes_through() {
    let mut event = UiEvent::key_down(NodeId::ROOT, KeyboardInput::new("ArrowUp"));
    assert_eq!(table().dispatch(&mut event), None);
    assert!(!event.is_default_prevented());
    assert!(!event.is_propagation_stopped());

    let mut event = UiEvent::key_down(NodeId::ROOT, KeyboardInput::new("Tab"));
    assert_eq!(table().dispatch(&mut event), Some(Nav::Forward));
    assert!(event.is_default_prevented());
    assert!(event.is_propagation_stopped());
}

// ============================================================================
// SYNCHRONIZATION
// ============================================================================

fn tree_with(tag: &str) -> (DomTree, NodeId) {
    let mut tree = DomTree::new();
    let node = tree.create_element(tag);
    tree.append_child(tree.root(), node).unwrap();
    (tree, node)
}

#[test]
fn test_sync_is_idempotent() {
    let (mut tree, node) = tree_with("trellis-carousel-slides");
    let attributes = AttributeSet::new()
        .set("aria-atomic", "false")
        .live(Politeness::Off)
        .role(AriaRole::Group);
    assert_eq!(synchronize(&mut tree, node, &attributes), 3);
    let generation = tree.generation();
    assert_eq!(synchronize(&mut tree, node, &attributes), 0);
    assert_eq!(tree.generation(), generation);
}

#[test]
fn test_removal_entries() {
    let (mut tree, node) = tree_with("trellis-tooltip-content");
    tree.set_attribute(node, "hidden", "").unwrap();
    let shown = AttributeSet::new().flag("hidden", false).set_opt("aria-label", None::<String>);
    assert_eq!(synchronize(&mut tree, node, &shown), 1);
    assert!(!tree.has_attribute(node, "hidden"));
    assert_eq!(synchronize(&mut tree, node, &shown), 0);
}

#[test]
fn test_sync_on_text_node_is_skipped() {
    let mut tree = DomTree::new();
    let text = tree.create_text("slide");
    let attributes = AttributeSet::new().role(AriaRole::Tab);
    assert_eq!(synchronize(&mut tree, text, &attributes), 0);
    assert_eq!(synchronize_relative(&mut tree, None, "tab", &attributes), 0);
}
