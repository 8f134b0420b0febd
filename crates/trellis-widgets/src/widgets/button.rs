//! Button
//!
//! Plain or toggle button. An async press keeps the button busy and
//! disabled until its handler resolves.

use std::future::Future;

use trellis_a11y::{AriaRole, AttributeSet};
use trellis_dom::{NodeId, UiEvent, UiEventKind};

use crate::notify::NotificationKind;
use crate::{Context, WidgetError};

pub fn is_busy(ctx: &Context, node: NodeId) -> bool {
    ctx.state.pressing.contains(&node)
}

pub(crate) fn sync(ctx: &mut Context, node: NodeId) {
    let pressed = ctx
        .get_attribute(node, "pressed")
        .map(|v| if v == "false" { "false" } else { "true" });
    let busy = is_busy(ctx, node);
    let disabled = busy || ctx.flag(node, "disabled");
    ctx.sync_attrs(
        node,
        &AttributeSet::new()
            .role(AriaRole::Button)
            .tabindex(0)
            .set_opt("aria-pressed", pressed)
            .set_bool("aria-disabled", disabled)
            .set_opt("aria-busy", busy.then_some("true")),
    );
}

pub(crate) fn handle_event(ctx: &mut Context, node: NodeId, event: &mut UiEvent) {
    if !matches!(event.kind, UiEventKind::Click) {
        return;
    }
    if ctx.flag(node, "disabled") || is_busy(ctx, node) {
        tracing::debug!("Button {:?} is disabled or busy", node);
        event.consume();
        return;
    }
    ctx.emit(node, NotificationKind::ButtonClick);
}

/// Enter the busy state of an async press
pub fn begin_press(ctx: &mut Context, node: NodeId) -> Result<(), WidgetError> {
    if ctx.kind(node) != Some(super::WidgetKind::Button) {
        return Err(WidgetError::UnknownWidget(node));
    }
    if ctx.flag(node, "disabled") {
        return Err(WidgetError::Disabled);
    }
    if !ctx.state.pressing.insert(node) {
        return Err(WidgetError::Busy);
    }
    sync(ctx, node);
    ctx.emit(node, NotificationKind::ButtonClick);
    Ok(())
}

/// Leave the busy state
pub fn end_press(ctx: &mut Context, node: NodeId) {
    if ctx.state.pressing.remove(&node) {
        sync(ctx, node);
    }
}

/// Press the button and await `handler`; the button is busy meanwhile
pub async fn press_async<F, Fut>(ctx: &mut Context, node: NodeId, handler: F) -> Result<(), WidgetError>
where
    F: FnOnce() -> Fut,
    Fut: Future<Output = anyhow::Result<()>>,
{
    begin_press(ctx, node)?;
    let result = handler().await;
    end_press(ctx, node);
    result.map_err(WidgetError::Handler)
}
