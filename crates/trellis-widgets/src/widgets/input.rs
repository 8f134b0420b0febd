//! Text Input
//!
//! Single-line text form control. Typed text replaces the value; leaving
//! the field touches it so a validation error becomes visible.

use serde_json::Value;
use trellis_a11y::{AriaRole, AttributeSet};
use trellis_dom::{NodeId, UiEvent, UiEventKind};

use crate::Context;

/// Current text, empty when the value is unset
pub fn text(ctx: &Context, node: NodeId) -> String {
    match ctx.value(node) {
        Some(Value::String(s)) => s,
        Some(Value::Null) | None => String::new(),
        Some(other) => other.to_string(),
    }
}

pub(crate) fn connected(ctx: &mut Context, node: NodeId) {
    let initial = ctx
        .get_attribute(node, "value")
        .map_or(Value::Null, |v| Value::String(v.to_string()));
    ctx.seed_control(node, initial);
    sync(ctx, node);
}

pub(crate) fn sync(ctx: &mut Context, node: NodeId) {
    let disabled = ctx.flag(node, "disabled");
    let readonly = ctx.flag(node, "readonly");
    let invalid = ctx.invalid_attr(node);
    ctx.sync_attrs(
        node,
        &AttributeSet::new()
            .role(AriaRole::TextBox)
            .tabindex(if disabled { -1 } else { 0 })
            .set_bool("aria-disabled", disabled)
            .set_bool("aria-readonly", readonly)
            .set_opt("aria-invalid", invalid),
    );
}

pub(crate) fn attribute_changed(ctx: &mut Context, node: NodeId, name: &str) {
    if name != "value" {
        sync(ctx, node);
        return;
    }
    let wanted = ctx
        .get_attribute(node, "value")
        .map_or(Value::Null, |v| Value::String(v.to_string()));
    if ctx.value(node).as_ref() != Some(&wanted) {
        ctx.write_control(node, wanted);
    } else {
        sync(ctx, node);
    }
}

pub(crate) fn handle_event(ctx: &mut Context, node: NodeId, event: &mut UiEvent) {
    match &event.kind {
        UiEventKind::Input(typed) => {
            if ctx.flag(node, "disabled") || ctx.flag(node, "readonly") {
                tracing::debug!("Input {:?} is disabled or readonly", node);
                return;
            }
            let typed = Value::String(typed.clone());
            ctx.write_control(node, typed);
        }
        UiEventKind::FocusOut if event.target == node => {
            if let Err(e) = ctx.touch(node) {
                tracing::warn!("Could not touch {:?}: {}", node, e);
            }
        }
        _ => {}
    }
}
