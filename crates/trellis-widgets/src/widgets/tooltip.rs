//! Tooltip
//!
//! Shown while its trigger is hovered or focused, hidden on leave, blur or
//! Escape. With `touch-trigger` a click on the trigger toggles it.

use trellis_a11y::{AriaRole, AttributeSet, synchronize_relative};
use trellis_dom::{Binding, NodeId, UiEvent, UiEventKind};

use crate::Context;
use crate::notify::NotificationKind;

const ROOT: Binding = Binding::closest("tooltip", "trellis-tooltip");
const TRIGGER: Binding = Binding::one("trigger", "trellis-tooltip-trigger");
const CONTENT: Binding = Binding::one("content", "trellis-tooltip-content");

pub fn is_visible(ctx: &Context, root: NodeId) -> bool {
    ctx.flag(root, "visible")
}

pub(crate) fn sync_from(ctx: &mut Context, node: NodeId) {
    if let Some(root) = ctx.query_one(node, &ROOT) {
        sync(ctx, root);
    }
}

fn sync(ctx: &mut Context, root: NodeId) {
    let visible = ctx.flag(root, "visible");
    let trigger = ctx.query_one(root, &TRIGGER);
    let content = ctx.query_one(root, &CONTENT);
    let described_by = content.and_then(|c| ctx.id_of(c));
    synchronize_relative(
        &mut ctx.dom,
        trigger,
        TRIGGER.name,
        &AttributeSet::new().set_opt("aria-describedby", described_by),
    );
    synchronize_relative(
        &mut ctx.dom,
        content,
        CONTENT.name,
        &AttributeSet::new().role(AriaRole::ToolTip).flag("hidden", !visible),
    );
}

pub fn show(ctx: &mut Context, root: NodeId) {
    set_visible(ctx, root, true);
}

pub fn hide(ctx: &mut Context, root: NodeId) {
    set_visible(ctx, root, false);
}

fn set_visible(ctx: &mut Context, root: NodeId, visible: bool) {
    if ctx.flag(root, "visible") == visible {
        return;
    }
    ctx.set_flag(root, "visible", visible);
    sync(ctx, root);
    let kind = if visible {
        NotificationKind::TooltipShow
    } else {
        NotificationKind::TooltipHide
    };
    ctx.emit(root, kind);
}

pub(crate) fn handle_trigger_event(ctx: &mut Context, trigger: NodeId, event: &mut UiEvent) {
    let Some(root) = ctx.query_one(trigger, &ROOT) else {
        return;
    };
    match event.kind {
        UiEventKind::PointerEnter | UiEventKind::FocusIn => show(ctx, root),
        UiEventKind::PointerLeave | UiEventKind::FocusOut => hide(ctx, root),
        UiEventKind::Click if ctx.flag(root, "touch-trigger") => {
            let visible = ctx.flag(root, "visible");
            set_visible(ctx, root, !visible);
        }
        _ => {}
    }
}

pub(crate) fn handle_root_event(ctx: &mut Context, root: NodeId, event: &mut UiEvent) {
    let escape = event.key().is_some_and(|k| k.key == "Escape" || k.key == "Esc");
    if escape && ctx.flag(root, "visible") {
        event.consume();
        hide(ctx, root);
    }
}
