//! Menu and Menubar
//!
//! A `trellis-menu` is a button that opens a submenu; a `trellis-menubar`
//! lays its items out horizontally. Items are the direct item children of
//! their container, and an item owning a nested submenu opens it instead
//! of activating. DOM focus moves between items.

use trellis_a11y::{AriaRole, AttributeSet, Key, KeyDispatch, NavigationPolicy, RovingIndex, TabIndex, synchronize_relative};
use trellis_dom::{Binding, NodeId, UiEvent, UiEventKind};

use super::WidgetKind;
use crate::Context;
use crate::notify::NotificationKind;

const ROOT: Binding = Binding::closest("menu", "trellis-menu, trellis-menubar");
const BUTTON: Binding = Binding::one("button", "trellis-menu-button");
const SUBMENUS: Binding = Binding::all("submenus", "trellis-menu-submenu");
const ITEMS: Binding = Binding::all("items", "trellis-menu-item");

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Action {
    Down,
    Up,
    Right,
    Left,
    First,
    Last,
    Activate,
    Escape,
    Typeahead,
}

fn keys() -> KeyDispatch<Action> {
    KeyDispatch::new()
        .on(Key::ArrowDown, Action::Down)
        .on(Key::ArrowUp, Action::Up)
        .on(Key::ArrowRight, Action::Right)
        .on(Key::ArrowLeft, Action::Left)
        .on(Key::Home, Action::First)
        .on(Key::End, Action::Last)
        .on(Key::Enter, Action::Activate)
        .on(Key::Space, Action::Activate)
        .on(Key::Escape, Action::Escape)
        .typeahead(Action::Typeahead)
}

fn is_menubar(ctx: &Context, root: NodeId) -> bool {
    ctx.kind(root) == Some(WidgetKind::Menubar)
}

fn children_of_kind(ctx: &Context, node: NodeId, kind: WidgetKind) -> Vec<NodeId> {
    ctx.dom
        .element_children(node)
        .filter(|&c| ctx.kind(c) == Some(kind))
        .collect()
}

/// Items directly inside a submenu or menubar
pub fn items(ctx: &Context, container: NodeId) -> Vec<NodeId> {
    children_of_kind(ctx, container, WidgetKind::MenuItem)
}

/// Nested submenu owned by `item`
pub fn submenu_of(ctx: &Context, item: NodeId) -> Option<NodeId> {
    children_of_kind(ctx, item, WidgetKind::MenuSubmenu).into_iter().next()
}

/// The submenu a menu button opens
fn top_submenu(ctx: &Context, root: NodeId) -> Option<NodeId> {
    children_of_kind(ctx, root, WidgetKind::MenuSubmenu).into_iter().next()
}

pub fn is_open(ctx: &Context, submenu: NodeId) -> bool {
    ctx.flag(submenu, "expanded")
}

/// Element labelling `submenu`: its parent item, else the menu button
fn owner_of(ctx: &Context, root: NodeId, submenu: NodeId) -> Option<NodeId> {
    ctx.dom
        .parent(submenu)
        .filter(|&p| ctx.kind(p) == Some(WidgetKind::MenuItem))
        .or_else(|| ctx.query_one(root, &BUTTON))
}

/// Top-level menubar item containing `node`
fn bar_item_of(ctx: &Context, root: NodeId, node: NodeId) -> Option<NodeId> {
    std::iter::once(node)
        .chain(ctx.dom.ancestors(node))
        .find(|&n| ctx.dom.parent(n) == Some(root) && ctx.kind(n) == Some(WidgetKind::MenuItem))
}

pub(crate) fn sync_from(ctx: &mut Context, node: NodeId) {
    match ctx.query_one(node, &ROOT) {
        Some(root) => sync(ctx, root),
        None => tracing::debug!("Menu part {:?} has no menu", node),
    }
}

fn sync(ctx: &mut Context, root: NodeId) {
    let menubar = is_menubar(ctx, root);
    if menubar {
        ctx.sync_attrs(root, &AttributeSet::new().role(AriaRole::MenuBar));
    } else {
        let button = ctx.query_one(root, &BUTTON);
        let top = top_submenu(ctx, root);
        let expanded = top.is_some_and(|t| ctx.flag(t, "expanded"));
        let controls = top.and_then(|t| ctx.id_of(t));
        synchronize_relative(
            &mut ctx.dom,
            button,
            BUTTON.name,
            &AttributeSet::new()
                .role(AriaRole::Button)
                .set("aria-haspopup", "menu")
                .set_bool("aria-expanded", expanded)
                .set_opt("aria-controls", controls),
        );
    }

    for submenu in ctx.query_all(root, &SUBMENUS) {
        let expanded = ctx.flag(submenu, "expanded");
        let labelled_by = owner_of(ctx, root, submenu).and_then(|o| ctx.id_of(o));
        ctx.sync_attrs(
            submenu,
            &AttributeSet::new()
                .role(AriaRole::Menu)
                .set_opt("aria-labelledby", labelled_by)
                .flag("hidden", !expanded),
        );
    }

    let bar_items = if menubar { items(ctx, root) } else { Vec::new() };
    let focused_bar = bar_items.iter().position(|&i| Some(i) == ctx.active_element);
    for item in ctx.query_all(root, &ITEMS) {
        let submenu = submenu_of(ctx, item);
        let expanded = submenu.map(|s| if ctx.flag(s, "expanded") { "true" } else { "false" });
        let tabbable = match bar_items.iter().position(|&i| i == item) {
            Some(i) => focused_bar.map_or(i == 0, |f| f == i),
            None => false,
        };
        ctx.sync_attrs(
            item,
            &AttributeSet::new()
                .role(AriaRole::MenuItem)
                .tabindex(TabIndex::roving(tabbable))
                .set_opt("aria-haspopup", submenu.map(|_| "menu"))
                .set_opt("aria-expanded", expanded),
        );
    }
}

// ----------------------------------------------------------------------
// Transitions
// ----------------------------------------------------------------------

fn focus_item(ctx: &mut Context, root: NodeId, item: NodeId) {
    ctx.focus(item);
    sync(ctx, root);
}

pub fn open(ctx: &mut Context, root: NodeId, submenu: NodeId) {
    if ctx.flag(submenu, "expanded") {
        return;
    }
    if top_submenu(ctx, root) == Some(submenu) {
        if let Some(active) = ctx.active_element {
            ctx.state.focus_return.insert(root, active);
        }
    }
    ctx.set_flag(submenu, "expanded", true);
    sync(ctx, root);
    ctx.emit(submenu, NotificationKind::MenuOpen);
}

/// Close `submenu` and every submenu nested in it
pub fn close(ctx: &mut Context, root: NodeId, submenu: NodeId) {
    if !ctx.flag(submenu, "expanded") {
        return;
    }
    for nested in ctx.query_all(submenu, &SUBMENUS).into_iter().rev() {
        close(ctx, root, nested);
    }
    ctx.set_flag(submenu, "expanded", false);
    sync(ctx, root);
    ctx.emit(submenu, NotificationKind::MenuClose);
}

fn close_all(ctx: &mut Context, root: NodeId) {
    for submenu in ctx.query_all(root, &SUBMENUS).into_iter().rev() {
        close(ctx, root, submenu);
    }
}

fn open_and_focus(ctx: &mut Context, root: NodeId, submenu: NodeId, last: bool) {
    open(ctx, root, submenu);
    let items = items(ctx, submenu);
    let target = if last { items.last() } else { items.first() };
    if let Some(&item) = target {
        focus_item(ctx, root, item);
    }
}

/// Open the item's submenu, or announce the item and close the menus
pub fn activate(ctx: &mut Context, root: NodeId, item: NodeId) {
    if let Some(submenu) = submenu_of(ctx, item) {
        open_and_focus(ctx, root, submenu, false);
        return;
    }
    ctx.emit(item, NotificationKind::MenuItemClick);
    let bar_item = bar_item_of(ctx, root, item);
    close_all(ctx, root);
    let restore = if is_menubar(ctx, root) {
        bar_item
    } else {
        ctx.state
            .focus_return
            .remove(&root)
            .or_else(|| ctx.query_one(root, &BUTTON))
    };
    if let Some(target) = restore {
        focus_item(ctx, root, target);
    }
}

/// Close the submenu holding `item` and focus its owner
fn dismiss(ctx: &mut Context, root: NodeId, container: NodeId) {
    if ctx.kind(container) != Some(WidgetKind::MenuSubmenu) {
        return;
    }
    let owner = owner_of(ctx, root, container);
    close(ctx, root, container);
    let restore = if top_submenu(ctx, root) == Some(container) {
        ctx.state.focus_return.remove(&root).or(owner)
    } else {
        owner
    };
    if let Some(target) = restore {
        focus_item(ctx, root, target);
    }
}

/// Move to the neighbouring menubar item, reopening its submenu if one was open
fn step_bar(ctx: &mut Context, root: NodeId, from: NodeId, backward: bool) {
    let bar = items(ctx, root);
    let Some(current) = bar_item_of(ctx, root, from) else {
        return;
    };
    let reopen = submenu_of(ctx, current).is_some_and(|s| ctx.flag(s, "expanded"));
    let index = RovingIndex::locate(&bar, Some(&current), NavigationPolicy::Wrap);
    let Some(next) = (if backward { index.prev() } else { index.next() }) else {
        return;
    };
    close_all(ctx, root);
    match submenu_of(ctx, bar[next]).filter(|_| reopen) {
        Some(submenu) => {
            focus_item(ctx, root, bar[next]);
            open_and_focus(ctx, root, submenu, false);
        }
        None => focus_item(ctx, root, bar[next]),
    }
}

// ----------------------------------------------------------------------
// Events
// ----------------------------------------------------------------------

pub(crate) fn handle_root_event(ctx: &mut Context, root: NodeId, event: &mut UiEvent) {
    let focused = ctx
        .active_element
        .filter(|&f| ctx.kind(f) == Some(WidgetKind::MenuItem) && ctx.dom.contains(root, f));
    let Some(item) = focused else {
        return;
    };
    let Some(container) = ctx.dom.parent(item) else {
        return;
    };
    let Some(action) = keys().dispatch(event) else {
        return;
    };
    let in_bar = container == root && is_menubar(ctx, root);
    let siblings = items(ctx, container);
    let index = RovingIndex::locate(&siblings, Some(&item), NavigationPolicy::Wrap);

    let target = match action {
        Action::Down | Action::Up if in_bar => {
            if let Some(submenu) = submenu_of(ctx, item) {
                open_and_focus(ctx, root, submenu, action == Action::Up);
            }
            None
        }
        Action::Right | Action::Left if in_bar => index_for(&index, action == Action::Right),
        Action::Down => index.next(),
        Action::Up => index.prev(),
        Action::First => index.first(),
        Action::Last => index.last(),
        Action::Right => {
            match submenu_of(ctx, item) {
                Some(submenu) => open_and_focus(ctx, root, submenu, false),
                None if is_menubar(ctx, root) => step_bar(ctx, root, item, false),
                None => {}
            }
            None
        }
        Action::Left => {
            let owner_in_bar = ctx
                .dom
                .parent(container)
                .is_some_and(|o| ctx.dom.parent(o) == Some(root) && is_menubar(ctx, root));
            if owner_in_bar {
                step_bar(ctx, root, item, true);
            } else if ctx.dom.parent(container).is_some_and(|o| ctx.kind(o) == Some(WidgetKind::MenuItem)) {
                dismiss(ctx, root, container);
            }
            None
        }
        Action::Activate => {
            activate(ctx, root, item);
            None
        }
        Action::Escape => {
            dismiss(ctx, root, container);
            None
        }
        Action::Typeahead => {
            let c = event.key().and_then(|k| k.key.chars().next());
            c.and_then(|c| super::typeahead(ctx, container, &siblings, index.current, c))
        }
    };
    if let Some(i) = target {
        focus_item(ctx, root, siblings[i]);
    }
}

fn index_for(index: &RovingIndex, forward: bool) -> Option<usize> {
    if forward { index.next() } else { index.prev() }
}

pub(crate) fn handle_button_event(ctx: &mut Context, button: NodeId, event: &mut UiEvent) {
    let Some(root) = ctx.query_one(button, &ROOT) else {
        return;
    };
    let Some(submenu) = top_submenu(ctx, root) else {
        tracing::warn!("Menu {:?} has no submenu", root);
        return;
    };
    if matches!(event.kind, UiEventKind::Click) {
        if ctx.flag(submenu, "expanded") {
            close(ctx, root, submenu);
            ctx.state.focus_return.remove(&root);
        } else {
            open_and_focus(ctx, root, submenu, false);
        }
        return;
    }
    let key = event.key().and_then(|k| Key::parse(&k.key));
    if let Some(key @ (Key::ArrowDown | Key::ArrowUp)) = key {
        event.consume();
        open_and_focus(ctx, root, submenu, key == Key::ArrowUp);
    }
}

pub(crate) fn handle_item_event(ctx: &mut Context, item: NodeId, event: &mut UiEvent) {
    if !matches!(event.kind, UiEventKind::Click) {
        return;
    }
    event.stop_propagation();
    if let Some(root) = ctx.query_one(item, &ROOT) {
        activate(ctx, root, item);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(ctx: &mut Context, parent: NodeId, label: &str) -> NodeId {
        let item = ctx.create_element("trellis-menu-item");
        let text = ctx.create_text(label);
        ctx.append_child(item, text).unwrap();
        ctx.append_child(parent, item).unwrap();
        item
    }

    fn submenu(ctx: &mut Context, parent: NodeId) -> NodeId {
        let submenu = ctx.create_element("trellis-menu-submenu");
        ctx.append_child(parent, submenu).unwrap();
        submenu
    }

    #[test]
    fn test_menu_button_opens_and_restores_focus() {
        let mut ctx = Context::new();
        let root = ctx.create_element("trellis-menu");
        let button = ctx.create_element("trellis-menu-button");
        ctx.append_child(root, button).unwrap();
        let list = submenu(&mut ctx, root);
        let cut = item(&mut ctx, list, "Cut");
        let copy = item(&mut ctx, list, "Copy");
        ctx.append_child(ctx.document(), root).unwrap();

        ctx.focus(button);
        ctx.press("Enter");
        assert!(is_open(&ctx, list));
        assert_eq!(ctx.active_element(), Some(cut));
        assert_eq!(ctx.get_attribute(button, "aria-expanded"), Some("true"));

        ctx.press("ArrowUp");
        assert_eq!(ctx.active_element(), Some(copy));
        ctx.press("c");
        assert_eq!(ctx.active_element(), Some(cut));

        ctx.press("Escape");
        assert!(!is_open(&ctx, list));
        assert_eq!(ctx.active_element(), Some(button));
        assert!(ctx.has_attribute(list, "hidden"));
    }

    #[test]
    fn test_item_activation_closes_menu() {
        let mut ctx = Context::new();
        let root = ctx.create_element("trellis-menu");
        let button = ctx.create_element("trellis-menu-button");
        ctx.append_child(root, button).unwrap();
        let list = submenu(&mut ctx, root);
        let cut = item(&mut ctx, list, "Cut");
        ctx.append_child(ctx.document(), root).unwrap();

        ctx.focus(button);
        ctx.key_down(button, "ArrowDown");
        ctx.click(cut);
        assert!(!is_open(&ctx, list));
        assert_eq!(ctx.notifications().count("menu-item-click"), 1);
        assert_eq!(ctx.active_element(), Some(button));
    }

    #[test]
    fn test_menubar_navigation() {
        let mut ctx = Context::new();
        let bar = ctx.create_element("trellis-menubar");
        let file = item(&mut ctx, bar, "File");
        let file_menu = submenu(&mut ctx, file);
        let new = item(&mut ctx, file_menu, "New");
        let recent = item(&mut ctx, file_menu, "Recent");
        let recent_menu = submenu(&mut ctx, recent);
        let last = item(&mut ctx, recent_menu, "notes.txt");
        let edit = item(&mut ctx, bar, "Edit");
        let edit_menu = submenu(&mut ctx, edit);
        let undo = item(&mut ctx, edit_menu, "Undo");
        let help = item(&mut ctx, bar, "Help");
        ctx.append_child(ctx.document(), bar).unwrap();

        assert_eq!(ctx.get_attribute(bar, "role"), Some("menubar"));
        assert_eq!(ctx.get_attribute(file, "tabindex"), Some("0"));
        assert_eq!(ctx.get_attribute(edit, "tabindex"), Some("-1"));
        assert_eq!(ctx.get_attribute(file, "aria-haspopup"), Some("menu"));
        assert_eq!(ctx.get_attribute(help, "aria-haspopup"), None);
        assert_eq!(ctx.label_of(file), "File");

        ctx.focus(file);
        ctx.press("ArrowLeft");
        assert_eq!(ctx.active_element(), Some(help));
        assert_eq!(ctx.get_attribute(help, "tabindex"), Some("0"));
        ctx.press("ArrowRight");
        assert_eq!(ctx.active_element(), Some(file));

        ctx.press("ArrowDown");
        assert!(is_open(&ctx, file_menu));
        assert_eq!(ctx.active_element(), Some(new));
        ctx.press("ArrowDown");
        ctx.press("ArrowRight");
        assert!(is_open(&ctx, recent_menu));
        assert_eq!(ctx.active_element(), Some(last));

        ctx.press("ArrowLeft");
        assert!(!is_open(&ctx, recent_menu));
        assert_eq!(ctx.active_element(), Some(recent));

        ctx.press("ArrowUp");
        assert_eq!(ctx.active_element(), Some(new));
        ctx.press("ArrowRight");
        assert!(!is_open(&ctx, file_menu));
        assert!(is_open(&ctx, edit_menu));
        assert_eq!(ctx.active_element(), Some(undo));

        ctx.press("Enter");
        assert!(!is_open(&ctx, edit_menu));
        assert_eq!(ctx.active_element(), Some(edit));
    }
}
