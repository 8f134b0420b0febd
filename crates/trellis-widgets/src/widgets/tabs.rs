//! Tabs
//!
//! Tab `i` pairs with panel `i`. In automatic-activation mode moving focus
//! to a tab selects it; otherwise selection needs a click, Enter or Space.

use trellis_a11y::{AriaRole, AttributeSet, Key, KeyDispatch, NavigationPolicy, RovingIndex, TabIndex};
use trellis_dom::{Binding, NodeId, UiEvent, UiEventKind};

use crate::Context;
use crate::notify::NotificationKind;

const ROOT: Binding = Binding::closest("tabs", "trellis-tabs");
const TABS: Binding = Binding::all("tabs", "trellis-tabs-tab");
const PANELS: Binding = Binding::all("panels", "trellis-tabs-panel");

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Action {
    Next,
    Previous,
    First,
    Last,
}

fn keys() -> KeyDispatch<Action> {
    KeyDispatch::new()
        .on(Key::ArrowRight, Action::Next)
        .on(Key::ArrowLeft, Action::Previous)
        .on(Key::Home, Action::First)
        .on(Key::End, Action::Last)
}

pub fn tabs(ctx: &Context, root: NodeId) -> Vec<NodeId> {
    ctx.query_all(root, &TABS)
}

pub fn selected_tab(ctx: &Context, root: NodeId) -> Option<NodeId> {
    tabs(ctx, root).into_iter().find(|&t| ctx.flag(t, "selected"))
}

pub(crate) fn sync_from(ctx: &mut Context, node: NodeId) {
    match ctx.query_one(node, &ROOT) {
        Some(root) => sync(ctx, root),
        None => tracing::debug!("Tabs part {:?} has no tabs root", node),
    }
}

fn sync(ctx: &mut Context, root: NodeId) {
    let tabs = tabs(ctx, root);
    let panels = ctx.query_all(root, &PANELS);
    let any_selected = tabs.iter().any(|&t| ctx.flag(t, "selected"));

    for (i, &tab) in tabs.iter().enumerate() {
        let selected = ctx.flag(tab, "selected");
        let controls = panels.get(i).and_then(|&p| ctx.id_of(p));
        ctx.sync_attrs(
            tab,
            &AttributeSet::new()
                .role(AriaRole::Tab)
                .set_bool("aria-selected", selected)
                .set_opt("aria-controls", controls)
                .tabindex(TabIndex::roving(selected || (!any_selected && i == 0))),
        );
    }
    for (i, &panel) in panels.iter().enumerate() {
        let tab = tabs.get(i).copied();
        let selected = tab.is_some_and(|t| ctx.flag(t, "selected"));
        let labelled_by = tab.and_then(|t| ctx.id_of(t));
        ctx.sync_attrs(
            panel,
            &AttributeSet::new()
                .role(AriaRole::TabPanel)
                .set_opt("aria-labelledby", labelled_by)
                .tabindex(0)
                .flag("hidden", !selected),
        );
    }
}

/// Select `tab`, unselecting the previous one
pub fn select(ctx: &mut Context, tab: NodeId) {
    let Some(root) = ctx.query_one(tab, &ROOT) else {
        return;
    };
    if ctx.flag(tab, "selected") {
        tracing::debug!("Tab {:?} already selected", tab);
        return;
    }
    let previous: Vec<_> = tabs(ctx, root)
        .into_iter()
        .filter(|&t| ctx.flag(t, "selected"))
        .collect();
    for &other in &previous {
        ctx.set_flag(other, "selected", false);
    }
    ctx.set_flag(tab, "selected", true);
    sync(ctx, root);
    for other in previous {
        ctx.emit(other, NotificationKind::TabUnselect);
    }
    ctx.emit(tab, NotificationKind::TabSelect);
}

pub(crate) fn handle_tab_event(ctx: &mut Context, tab: NodeId, event: &mut UiEvent) {
    match event.kind {
        UiEventKind::Click => select(ctx, tab),
        UiEventKind::FocusIn => {
            let automatic = ctx
                .query_one(tab, &ROOT)
                .is_some_and(|r| ctx.flag(r, "automatic-activation"));
            if automatic {
                select(ctx, tab);
            }
        }
        _ => {}
    }
}

pub(crate) fn handle_root_event(ctx: &mut Context, root: NodeId, event: &mut UiEvent) {
    let tabs = tabs(ctx, root);
    let focused = ctx.active_element.filter(|f| tabs.contains(f));
    let Some(focused) = focused else {
        return;
    };
    let Some(action) = keys().dispatch(event) else {
        return;
    };
    let index = RovingIndex::locate(&tabs, Some(&focused), NavigationPolicy::Wrap);
    let target = match action {
        Action::Next => index.next(),
        Action::Previous => index.prev(),
        Action::First => index.first(),
        Action::Last => index.last(),
    };
    if let Some(i) = target {
        ctx.focus(tabs[i]);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tabs_widget(count: usize, automatic: bool) -> (Context, NodeId, Vec<NodeId>, Vec<NodeId>) {
        let mut ctx = Context::new();
        let root = ctx.create_element("trellis-tabs");
        if automatic {
            ctx.set_attribute(root, "automatic-activation", "").unwrap();
        }
        let mut tabs = Vec::new();
        for _ in 0..count {
            let tab = ctx.create_element("trellis-tabs-tab");
            ctx.append_child(root, tab).unwrap();
            tabs.push(tab);
        }
        let mut panels = Vec::new();
        for _ in 0..count {
            let panel = ctx.create_element("trellis-tabs-panel");
            ctx.append_child(root, panel).unwrap();
            panels.push(panel);
        }
        ctx.append_child(ctx.document(), root).unwrap();
        (ctx, root, tabs, panels)
    }

    #[test]
    fn test_manual_selection() {
        let (mut ctx, root, tabs, panels) = tabs_widget(3, false);
        ctx.focus(tabs[0]);
        ctx.press("ArrowRight");
        assert_eq!(ctx.active_element(), Some(tabs[1]));
        assert_eq!(selected_tab(&ctx, root), None);

        ctx.press("Enter");
        assert_eq!(selected_tab(&ctx, root), Some(tabs[1]));
        assert!(!ctx.has_attribute(panels[1], "hidden"));
        assert!(ctx.has_attribute(panels[0], "hidden"));
        assert_eq!(ctx.get_attribute(tabs[1], "tabindex"), Some("0"));
    }

    #[test]
    fn test_automatic_selection_follows_focus() {
        let (mut ctx, root, tabs, _) = tabs_widget(3, true);
        ctx.focus(tabs[0]);
        ctx.press("ArrowLeft");
        assert_eq!(selected_tab(&ctx, root), Some(tabs[2]));
        assert_eq!(ctx.notifications().names(), vec!["tab-select", "tab-unselect", "tab-select"]);
    }

    #[test]
    fn test_panel_labelled_by_tab() {
        let (ctx, _, tabs, panels) = tabs_widget(2, false);
        let tab_id = ctx.get_attribute(tabs[1], "id").unwrap();
        assert_eq!(ctx.get_attribute(panels[1], "aria-labelledby"), Some(tab_id));
        assert_eq!(ctx.get_attribute(panels[1], "role"), Some("tabpanel"));
    }
}
