//! Dialog
//!
//! Modal dialog with a focus trap. Opening remembers the element that had
//! focus and moves focus inside; closing hands it back.

use trellis_a11y::{AriaRole, AttributeSet, Key, KeyDispatch, NavigationPolicy, RovingIndex, TabIndex};
use trellis_dom::{Binding, NodeId, UiEvent};

use crate::Context;
use crate::notify::NotificationKind;

const ROOT: Binding = Binding::closest("dialog", "trellis-dialog");
const LABEL: Binding = Binding::one("label", "trellis-dialog-label");
const DESCRIPTION: Binding = Binding::one("description", "trellis-dialog-description");

/// Elements focusable without a tabindex
const NATIVE_FOCUSABLE: &[&str] = &["a", "button", "input", "select", "textarea"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Action {
    Next,
    Previous,
    Close,
}

fn keys() -> KeyDispatch<Action> {
    KeyDispatch::new()
        .on(Key::Tab, Action::Next)
        .on_shift(Key::Tab, Action::Previous)
        .on(Key::Escape, Action::Close)
}

pub fn is_open(ctx: &Context, root: NodeId) -> bool {
    ctx.flag(root, "visible")
}

/// Focusable descendants in tree order
pub fn focusable(ctx: &Context, root: NodeId) -> Vec<NodeId> {
    ctx.dom
        .descendants(root)
        .into_iter()
        .filter(|&n| {
            if ctx.flag(n, "disabled") || ctx.flag(n, "hidden") {
                return false;
            }
            match ctx.get_attribute(n, "tabindex") {
                Some(value) => TabIndex::parse(value).is_focusable(),
                None => ctx
                    .dom
                    .tag_name(n)
                    .is_some_and(|tag| NATIVE_FOCUSABLE.contains(&tag)),
            }
        })
        .collect()
}

pub(crate) fn sync_from(ctx: &mut Context, node: NodeId) {
    if let Some(root) = ctx.query_one(node, &ROOT) {
        sync(ctx, root);
    }
}

fn sync(ctx: &mut Context, root: NodeId) {
    let role = if ctx.flag(root, "alert") {
        AriaRole::AlertDialog
    } else {
        AriaRole::Dialog
    };
    let visible = ctx.flag(root, "visible");
    let labelled_by = ctx.query_one(root, &LABEL).and_then(|l| ctx.id_of(l));
    let described_by = ctx.query_one(root, &DESCRIPTION).and_then(|d| ctx.id_of(d));
    ctx.sync_attrs(
        root,
        &AttributeSet::new()
            .role(role)
            .set("aria-modal", "true")
            .set_opt("aria-labelledby", labelled_by)
            .set_opt("aria-describedby", described_by)
            .flag("hidden", !visible),
    );
}

pub fn open(ctx: &mut Context, root: NodeId) {
    if ctx.flag(root, "visible") {
        return;
    }
    ctx.set_flag(root, "visible", true);
    opened(ctx, root);
}

pub fn close(ctx: &mut Context, root: NodeId) {
    if !ctx.flag(root, "visible") {
        return;
    }
    ctx.set_flag(root, "visible", false);
    closed(ctx, root);
}

fn opened(ctx: &mut Context, root: NodeId) {
    let outside = ctx.active_element.filter(|&a| !ctx.dom.contains(root, a));
    if let Some(previous) = outside {
        ctx.state.focus_return.insert(root, previous);
    }
    sync(ctx, root);
    let first = focusable(ctx, root).first().copied().unwrap_or(root);
    ctx.focus(first);
    ctx.emit(root, NotificationKind::DialogOpen);
}

fn closed(ctx: &mut Context, root: NodeId) {
    sync(ctx, root);
    ctx.emit(root, NotificationKind::DialogClose);
    let previous = ctx.state.focus_return.remove(&root);
    match previous.filter(|&p| ctx.dom.is_connected(p)) {
        Some(previous) => ctx.focus(previous),
        None => {
            if ctx.active_element.is_some_and(|a| ctx.dom.contains(root, a)) {
                ctx.blur();
            }
        }
    }
}

pub(crate) fn attribute_changed(ctx: &mut Context, root: NodeId, name: &str) {
    match name {
        "visible" if ctx.flag(root, "visible") => opened(ctx, root),
        "visible" => closed(ctx, root),
        _ => sync(ctx, root),
    }
}

pub(crate) fn handle_root_event(ctx: &mut Context, root: NodeId, event: &mut UiEvent) {
    if !ctx.flag(root, "visible") {
        return;
    }
    let Some(action) = keys().dispatch(event) else {
        return;
    };
    if action == Action::Close {
        close(ctx, root);
        return;
    }
    let items = focusable(ctx, root);
    let current = ctx.active_element;
    let index = RovingIndex::locate(&items, current.as_ref(), NavigationPolicy::Wrap);
    let target = if action == Action::Next { index.next() } else { index.prev() };
    if let Some(i) = target {
        ctx.focus(items[i]);
    }
}
