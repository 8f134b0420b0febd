//! Checkbox
//!
//! Boolean form control. `native` means the element stands in for a
//! platform checkbox, so it carries no ARIA role or state of its own.

use serde_json::Value;
use trellis_a11y::{AriaRole, AttributeSet};
use trellis_dom::{NodeId, UiEvent, UiEventKind};

use crate::Context;
use crate::notify::NotificationKind;

pub fn is_checked(ctx: &Context, node: NodeId) -> bool {
    ctx.flag(node, "checked")
}

pub(crate) fn connected(ctx: &mut Context, node: NodeId) {
    let checked = ctx.flag(node, "checked");
    ctx.seed_control(node, Value::Bool(checked));
    sync(ctx, node);
}

pub(crate) fn sync(ctx: &mut Context, node: NodeId) {
    let checked = ctx.flag(node, "checked");
    let attributes = if ctx.flag(node, "native") {
        AttributeSet::new().remove("role").remove("aria-checked")
    } else {
        AttributeSet::new()
            .role(AriaRole::Checkbox)
            .set_bool("aria-checked", checked)
    };
    let invalid = ctx.invalid_attr(node);
    let attributes = attributes
        .tabindex(0)
        .set_bool("aria-disabled", ctx.flag(node, "disabled"))
        .set_bool("aria-readonly", ctx.flag(node, "readonly"))
        .set_opt("aria-invalid", invalid);
    ctx.sync_attrs(node, &attributes);
}

/// Flip the checked state unless disabled or readonly
pub fn toggle(ctx: &mut Context, node: NodeId) {
    if ctx.flag(node, "disabled") || ctx.flag(node, "readonly") {
        tracing::debug!("Checkbox {:?} is disabled or readonly", node);
        return;
    }
    let checked = !ctx.flag(node, "checked");
    ctx.set_flag(node, "checked", checked);
    ctx.write_control(node, Value::Bool(checked));
    let kind = if checked {
        NotificationKind::Check
    } else {
        NotificationKind::Uncheck
    };
    ctx.emit(node, kind);
}

pub(crate) fn attribute_changed(ctx: &mut Context, node: NodeId, name: &str) {
    let checked = Value::Bool(ctx.flag(node, "checked"));
    if name == "checked" && ctx.value(node).as_ref() != Some(&checked) {
        ctx.write_control(node, checked);
    } else {
        sync(ctx, node);
    }
}

pub(crate) fn apply_value(ctx: &mut Context, node: NodeId, value: Value) {
    let checked = match &value {
        Value::Bool(b) => *b,
        Value::Null => false,
        other => {
            tracing::warn!("Checkbox {:?} given non-boolean value {}", node, other);
            false
        }
    };
    ctx.set_flag(node, "checked", checked);
    ctx.write_control(node, Value::Bool(checked));
}

pub(crate) fn handle_event(ctx: &mut Context, node: NodeId, event: &mut UiEvent) {
    let space = event
        .key()
        .is_some_and(|k| k.key == " " && !k.has_command_modifier());
    if space {
        event.consume();
        toggle(ctx, node);
    } else if matches!(event.kind, UiEventKind::Click) {
        toggle(ctx, node);
    }
}
