//! Slider
//!
//! Numeric form control. Every value is clamped to `[min, max]` and snapped
//! to the nearest multiple of `step` counted from `min`.

use serde_json::Value;
use trellis_a11y::{AriaRole, AttributeSet, Key, KeyDispatch, synchronize_relative};
use trellis_dom::{Binding, NodeId, UiEvent};

use crate::Context;
use crate::notify::NotificationKind;

const ROOT: Binding = Binding::closest("slider", "trellis-slider");
const THUMB: Binding = Binding::one("thumb", "trellis-slider-thumb");

const DEFAULT_MIN: f64 = 0.0;
const DEFAULT_MAX: f64 = 100.0;
const DEFAULT_STEP: f64 = 1.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Action {
    Increment,
    Decrement,
    PageIncrement,
    PageDecrement,
    Min,
    Max,
}

fn keys() -> KeyDispatch<Action> {
    KeyDispatch::new()
        .on(Key::ArrowRight, Action::Increment)
        .on(Key::ArrowUp, Action::Increment)
        .on(Key::ArrowLeft, Action::Decrement)
        .on(Key::ArrowDown, Action::Decrement)
        .on(Key::PageUp, Action::PageIncrement)
        .on(Key::PageDown, Action::PageDecrement)
        .on(Key::Home, Action::Min)
        .on(Key::End, Action::Max)
}

/// Range read from the slider's attributes
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Range {
    pub min: f64,
    pub max: f64,
    pub step: f64,
}

impl Range {
    pub fn of(ctx: &Context, root: NodeId) -> Self {
        let number = |name: &str, default: f64| {
            ctx.get_attribute(root, name)
                .and_then(|v| v.trim().parse::<f64>().ok())
                .filter(|v| v.is_finite())
                .unwrap_or(default)
        };
        let min = number("min", DEFAULT_MIN);
        let max = number("max", DEFAULT_MAX).max(min);
        let step = number("step", DEFAULT_STEP);
        let step = if step > 0.0 { step } else { DEFAULT_STEP };
        Self { min, max, step }
    }

    /// Clamp into range and snap to the step grid
    pub fn snap(&self, value: f64) -> f64 {
        let steps = ((value - self.min) / self.step).round();
        let snapped = self.min + steps * self.step;
        let snapped = (snapped * 1e9).round() / 1e9;
        snapped.clamp(self.min, self.max)
    }
}

fn to_json(value: f64) -> Value {
    if value.fract() == 0.0 && value.abs() < 9_007_199_254_740_992.0 {
        Value::from(value as i64)
    } else {
        Value::from(value)
    }
}

pub fn value(ctx: &Context, root: NodeId) -> f64 {
    ctx.value(root)
        .and_then(|v| v.as_f64())
        .unwrap_or_else(|| Range::of(ctx, root).min)
}

pub(crate) fn connected(ctx: &mut Context, root: NodeId) {
    let range = Range::of(ctx, root);
    let initial = ctx
        .get_attribute(root, "value")
        .and_then(|v| v.trim().parse::<f64>().ok())
        .unwrap_or(range.min);
    ctx.seed_control(root, to_json(range.snap(initial)));
    sync(ctx, root);
}

pub(crate) fn sync_from(ctx: &mut Context, node: NodeId) {
    match ctx.query_one(node, &ROOT) {
        Some(root) => sync(ctx, root),
        None => tracing::debug!("Slider thumb {:?} has no slider", node),
    }
}

fn sync(ctx: &mut Context, root: NodeId) {
    let range = Range::of(ctx, root);
    let now = value(ctx, root);
    let orientation = match ctx.get_attribute(root, "orientation") {
        Some("vertical") => "vertical",
        _ => "horizontal",
    };
    let disabled = ctx.flag(root, "disabled");
    let readonly = ctx.flag(root, "readonly");
    let invalid = ctx.invalid_attr(root);
    let thumb = ctx.query_one(root, &THUMB);
    synchronize_relative(
        &mut ctx.dom,
        thumb,
        THUMB.name,
        &AttributeSet::new()
            .role(AriaRole::Slider)
            .tabindex(if disabled { -1 } else { 0 })
            .set("aria-valuemin", range.min.to_string())
            .set("aria-valuemax", range.max.to_string())
            .set("aria-valuenow", now.to_string())
            .set("aria-orientation", orientation)
            .set_bool("aria-disabled", disabled)
            .set_bool("aria-readonly", readonly)
            .set_opt("aria-invalid", invalid),
    );
}

/// Move to `target` (clamped and snapped) and announce the change
pub fn set(ctx: &mut Context, root: NodeId, target: f64) {
    if ctx.flag(root, "disabled") || ctx.flag(root, "readonly") {
        tracing::debug!("Slider {:?} is disabled or readonly", root);
        return;
    }
    let snapped = Range::of(ctx, root).snap(target);
    if snapped == value(ctx, root) && ctx.value(root).is_some_and(|v| !v.is_null()) {
        return;
    }
    ctx.write_control(root, to_json(snapped));
    ctx.emit(root, NotificationKind::SliderChange { value: snapped });
}

pub(crate) fn attribute_changed(ctx: &mut Context, root: NodeId, name: &str) {
    let range = Range::of(ctx, root);
    let wanted = match name {
        "value" => ctx
            .get_attribute(root, "value")
            .and_then(|v| v.trim().parse::<f64>().ok()),
        "min" | "max" | "step" => Some(value(ctx, root)),
        _ => None,
    };
    match wanted.map(|v| range.snap(v)) {
        Some(v) if ctx.value(root).and_then(|c| c.as_f64()) != Some(v) => ctx.write_control(root, to_json(v)),
        _ => sync(ctx, root),
    }
}

pub(crate) fn apply_value(ctx: &mut Context, root: NodeId, value: Value) {
    match value.as_f64() {
        Some(v) => {
            let snapped = Range::of(ctx, root).snap(v);
            ctx.write_control(root, to_json(snapped));
        }
        None if value.is_null() => ctx.write_control(root, Value::Null),
        None => tracing::warn!("Slider {:?} given non-numeric value {}", root, value),
    }
}

pub(crate) fn handle_root_event(ctx: &mut Context, root: NodeId, event: &mut UiEvent) {
    let keys = keys();
    let Some(action) = event.key().and_then(|k| keys.resolve(k)) else {
        return;
    };
    if ctx.flag(root, "disabled") || ctx.flag(root, "readonly") {
        tracing::debug!("Slider {:?} is disabled or readonly", root);
        return;
    }
    event.consume();
    let range = Range::of(ctx, root);
    let page = range.step * f64::from(ctx.config.slider_page_steps);
    let current = value(ctx, root);
    let target = match action {
        Action::Increment => current + range.step,
        Action::Decrement => current - range.step,
        Action::PageIncrement => current + page,
        Action::PageDecrement => current - page,
        Action::Min => range.min,
        Action::Max => range.max,
    };
    set(ctx, root, target);
}
