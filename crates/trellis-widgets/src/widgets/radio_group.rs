//! Radio Group
//!
//! At most one checked button; the group's form value is that button's
//! `value`. Arrow keys move focus and check together, wrapping at the
//! ends. A disabled or readonly group ignores every transition.

use serde_json::Value;
use trellis_a11y::{AriaRole, AttributeSet, Key, KeyDispatch, NavigationPolicy, RovingIndex, TabIndex};
use trellis_dom::{Binding, NodeId, UiEvent, UiEventKind};

use crate::Context;
use crate::notify::NotificationKind;

const GROUP: Binding = Binding::closest("radio-group", "trellis-radio-group");
const BUTTONS: Binding = Binding::all("buttons", "trellis-radio-button");

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Action {
    Next,
    Previous,
    Check,
}

fn keys() -> KeyDispatch<Action> {
    KeyDispatch::new()
        .on(Key::ArrowDown, Action::Next)
        .on(Key::ArrowRight, Action::Next)
        .on(Key::ArrowUp, Action::Previous)
        .on(Key::ArrowLeft, Action::Previous)
        .on(Key::Space, Action::Check)
}

pub fn buttons(ctx: &Context, group: NodeId) -> Vec<NodeId> {
    ctx.query_all(group, &BUTTONS)
}

pub fn checked_button(ctx: &Context, group: NodeId) -> Option<NodeId> {
    buttons(ctx, group).into_iter().find(|&b| ctx.flag(b, "checked"))
}

fn button_value(ctx: &Context, button: NodeId) -> Value {
    ctx.get_attribute(button, "value")
        .map_or(Value::Null, |v| Value::String(v.to_string()))
}

fn is_locked(ctx: &Context, group: NodeId) -> bool {
    ctx.flag(group, "disabled") || ctx.flag(group, "readonly")
}

pub(crate) fn sync_from(ctx: &mut Context, node: NodeId) {
    match ctx.query_one(node, &GROUP) {
        Some(group) => sync(ctx, group),
        None => tracing::debug!("Radio button {:?} has no group", node),
    }
}

fn sync(ctx: &mut Context, group: NodeId) {
    let invalid = ctx.invalid_attr(group);
    let disabled = ctx.flag(group, "disabled");
    let readonly = ctx.flag(group, "readonly");
    ctx.sync_attrs(
        group,
        &AttributeSet::new()
            .role(AriaRole::RadioGroup)
            .set_bool("aria-disabled", disabled)
            .set_bool("aria-readonly", readonly)
            .set_opt("aria-invalid", invalid),
    );

    let buttons = buttons(ctx, group);
    let any_checked = buttons.iter().any(|&b| ctx.flag(b, "checked"));
    for (i, &button) in buttons.iter().enumerate() {
        let checked = ctx.flag(button, "checked");
        ctx.sync_attrs(
            button,
            &AttributeSet::new()
                .role(AriaRole::Radio)
                .set_bool("aria-checked", checked)
                .tabindex(TabIndex::roving(checked || (!any_checked && i == 0))),
        );
    }
}

/// Check `button`, unchecking whichever button was checked before
pub fn check(ctx: &mut Context, button: NodeId) {
    let Some(group) = ctx.query_one(button, &GROUP) else {
        tracing::warn!("Radio button {:?} has no group", button);
        return;
    };
    if is_locked(ctx, group) {
        tracing::debug!("Radio group {:?} is disabled or readonly", group);
        return;
    }
    if ctx.flag(button, "checked") {
        return;
    }
    let previous: Vec<_> = buttons(ctx, group)
        .into_iter()
        .filter(|&b| ctx.flag(b, "checked"))
        .collect();
    for &other in &previous {
        ctx.set_flag(other, "checked", false);
    }
    ctx.set_flag(button, "checked", true);
    let value = button_value(ctx, button);
    ctx.write_control(group, value);
    for other in previous {
        ctx.emit(other, NotificationKind::Uncheck);
    }
    ctx.emit(button, NotificationKind::Check);
}

pub(crate) fn apply_value(ctx: &mut Context, group: NodeId, value: Value) {
    let buttons = buttons(ctx, group);
    let wanted = value.as_str().map(str::to_string);
    let mut matched = false;
    for button in buttons {
        let on = wanted.is_some() && ctx.get_attribute(button, "value") == wanted.as_deref();
        matched |= on;
        ctx.set_flag(button, "checked", on);
    }
    if !matched && !value.is_null() {
        tracing::warn!("Radio group {:?} has no button with value {}", group, value);
    }
    ctx.write_control(group, value);
}

pub(crate) fn button_attribute_changed(ctx: &mut Context, button: NodeId, name: &str) {
    let Some(group) = ctx.query_one(button, &GROUP) else {
        return;
    };
    if name == "checked" && ctx.flag(button, "checked") {
        for other in buttons(ctx, group) {
            if other != button {
                ctx.set_flag(other, "checked", false);
            }
        }
    }
    let value = checked_button(ctx, group).map_or(Value::Null, |b| button_value(ctx, b));
    if ctx.value(group).as_ref() != Some(&value) {
        ctx.write_control(group, value);
    } else {
        sync(ctx, group);
    }
}

pub(crate) fn handle_button_event(ctx: &mut Context, button: NodeId, event: &mut UiEvent) {
    if matches!(event.kind, UiEventKind::Click) {
        check(ctx, button);
    }
}

pub(crate) fn handle_root_event(ctx: &mut Context, group: NodeId, event: &mut UiEvent) {
    let buttons = buttons(ctx, group);
    let Some(focused) = ctx.active_element.filter(|f| buttons.contains(f)) else {
        return;
    };
    let keys = keys();
    let Some(action) = event.key().and_then(|k| keys.resolve(k)) else {
        return;
    };
    if is_locked(ctx, group) {
        tracing::debug!("Radio group {:?} is disabled or readonly", group);
        return;
    }
    event.consume();
    let index = RovingIndex::locate(&buttons, Some(&focused), NavigationPolicy::Wrap);
    let target = match action {
        Action::Next => index.next(),
        Action::Previous => index.prev(),
        Action::Check => index.current,
    };
    if let Some(i) = target {
        ctx.focus(buttons[i]);
        check(ctx, buttons[i]);
    }
}
