//! Accordion
//!
//! Collapsible sections, each with a heading button and a panel. With
//! `allow-only-one-expanded-section` at most one section stays open.

use trellis_a11y::{AriaRole, AttributeSet, Key, KeyDispatch, NavigationPolicy, RovingIndex, synchronize_relative};
use trellis_dom::{Binding, NodeId, UiEvent, UiEventKind};

use crate::Context;
use crate::notify::NotificationKind;

const ROOT: Binding = Binding::closest("accordion", "trellis-accordion");
const SECTION: Binding = Binding::closest("section", "trellis-accordion-section");
const SECTIONS: Binding = Binding::all("sections", "trellis-accordion-section");
const BUTTONS: Binding = Binding::all("buttons", "trellis-accordion-button");
const HEADER: Binding = Binding::one("header", "trellis-accordion-header");
const BUTTON: Binding = Binding::one("button", "trellis-accordion-button");
const PANEL: Binding = Binding::one("panel", "trellis-accordion-panel");

const DEFAULT_LEVEL: &str = "3";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Action {
    Next,
    Previous,
    First,
    Last,
}

fn keys() -> KeyDispatch<Action> {
    KeyDispatch::new()
        .on(Key::ArrowDown, Action::Next)
        .on(Key::ArrowUp, Action::Previous)
        .on(Key::Home, Action::First)
        .on(Key::End, Action::Last)
}

pub fn sections(ctx: &Context, accordion: NodeId) -> Vec<NodeId> {
    ctx.query_all(accordion, &SECTIONS)
}

pub fn is_expanded(ctx: &Context, section: NodeId) -> bool {
    ctx.flag(section, "expanded")
}

pub(crate) fn sync_from(ctx: &mut Context, node: NodeId) {
    if let Some(root) = ctx.query_one(node, &ROOT) {
        for section in sections(ctx, root) {
            sync_section(ctx, section);
        }
    } else if let Some(section) = ctx.query_one(node, &SECTION) {
        sync_section(ctx, section);
    }
}

fn sync_section(ctx: &mut Context, section: NodeId) {
    let expanded = ctx.flag(section, "expanded");
    let noncollapsible = ctx.flag(section, "noncollapsible");
    let header = ctx.query_one(section, &HEADER);
    let button = ctx.query_one(section, &BUTTON);
    let panel = ctx.query_one(section, &PANEL);

    let level = header
        .and_then(|h| ctx.get_attribute(h, "level"))
        .unwrap_or(DEFAULT_LEVEL)
        .to_string();
    synchronize_relative(
        &mut ctx.dom,
        header,
        HEADER.name,
        &AttributeSet::new().role(AriaRole::Heading).set("aria-level", level),
    );

    let panel_id = panel.and_then(|p| ctx.id_of(p));
    let button_id = button.and_then(|b| ctx.id_of(b));
    let disabled = (expanded && noncollapsible).then_some("true");
    synchronize_relative(
        &mut ctx.dom,
        button,
        BUTTON.name,
        &AttributeSet::new()
            .role(AriaRole::Button)
            .tabindex(0)
            .set_opt("aria-controls", panel_id)
            .set_bool("aria-expanded", expanded)
            .set_opt("aria-disabled", disabled),
    );
    synchronize_relative(
        &mut ctx.dom,
        panel,
        PANEL.name,
        &AttributeSet::new()
            .role(AriaRole::Region)
            .set_opt("aria-labelledby", button_id)
            .flag("hidden", !expanded),
    );
}

fn set_expanded(ctx: &mut Context, section: NodeId, expanded: bool) {
    ctx.set_flag(section, "expanded", expanded);
    sync_section(ctx, section);
    let kind = if expanded {
        NotificationKind::SectionExpand
    } else {
        NotificationKind::SectionCollapse
    };
    ctx.emit(section, kind);
}

/// Button activation for `section`
pub fn toggle(ctx: &mut Context, section: NodeId) {
    let expanded = ctx.flag(section, "expanded");
    if expanded && ctx.flag(section, "noncollapsible") {
        tracing::debug!("Accordion section {:?} is noncollapsible", section);
        return;
    }

    let root = ctx.query_one(section, &ROOT);
    if let Some(root) = root.filter(|&r| ctx.flag(r, "allow-only-one-expanded-section")) {
        let open: Vec<_> = sections(ctx, root)
            .into_iter()
            .filter(|&s| ctx.flag(s, "expanded"))
            .collect();
        if !open.is_empty() {
            for &other in &open {
                set_expanded(ctx, other, false);
            }
            if open.contains(&section) {
                return;
            }
        }
    }
    set_expanded(ctx, section, !expanded);
}

pub(crate) fn handle_button_event(ctx: &mut Context, button: NodeId, event: &mut UiEvent) {
    if !matches!(event.kind, UiEventKind::Click) {
        return;
    }
    match ctx.query_one(button, &SECTION) {
        Some(section) => toggle(ctx, section),
        None => tracing::warn!("Accordion button {:?} has no section", button),
    }
}

pub(crate) fn handle_root_event(ctx: &mut Context, root: NodeId, event: &mut UiEvent) {
    let buttons = ctx.query_all(root, &BUTTONS);
    let focused = ctx.active_element;
    if !focused.is_some_and(|f| buttons.contains(&f)) {
        return;
    }
    let Some(action) = keys().dispatch(event) else {
        return;
    };
    let index = RovingIndex::locate(&buttons, focused.as_ref(), NavigationPolicy::Wrap);
    let target = match action {
        Action::Next => index.next(),
        Action::Previous => index.prev(),
        Action::First => index.first(),
        Action::Last => index.last(),
    };
    if let Some(i) = target {
        ctx.focus(buttons[i]);
    }
}
