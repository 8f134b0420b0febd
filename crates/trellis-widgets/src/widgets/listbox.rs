//! Listbox
//!
//! The listbox keeps DOM focus and points at its focused option through
//! `aria-activedescendant`. Movement clamps at both ends. In single mode
//! the value is the selected option's value; with `multiple` it is an
//! array of every selected value.

use serde_json::Value;
use trellis_a11y::{AriaRole, AttributeSet, Key, KeyDispatch, NavigationPolicy, RovingIndex};
use trellis_dom::{Binding, NodeId, UiEvent, UiEventKind};

use super::WidgetKind;
use crate::Context;
use crate::notify::NotificationKind;

const ROOT: Binding = Binding::closest("listbox", "trellis-listbox");
const OPTIONS: Binding = Binding::all("options", "trellis-listbox-option");

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Action {
    Next,
    Previous,
    First,
    Last,
    Select,
    Typeahead,
}

fn keys() -> KeyDispatch<Action> {
    KeyDispatch::new()
        .on(Key::ArrowDown, Action::Next)
        .on(Key::ArrowUp, Action::Previous)
        .on(Key::Home, Action::First)
        .on(Key::End, Action::Last)
        .on(Key::Space, Action::Select)
        .on(Key::Enter, Action::Select)
        .typeahead(Action::Typeahead)
}

pub fn options(ctx: &Context, listbox: NodeId) -> Vec<NodeId> {
    ctx.query_all(listbox, &OPTIONS)
}

pub fn focused_option(ctx: &Context, listbox: NodeId) -> Option<NodeId> {
    options(ctx, listbox).into_iter().find(|&o| ctx.flag(o, "focused"))
}

pub fn selected_options(ctx: &Context, listbox: NodeId) -> Vec<NodeId> {
    options(ctx, listbox)
        .into_iter()
        .filter(|&o| ctx.flag(o, "selected"))
        .collect()
}

// ----------------------------------------------------------------------
// Option values, shared with the combobox
// ----------------------------------------------------------------------

/// `value` attribute, else the visible label
pub(crate) fn option_value(ctx: &Context, option: NodeId) -> Value {
    match ctx.get_attribute(option, "value") {
        Some(value) => Value::String(value.to_string()),
        None => Value::String(ctx.label_of(option)),
    }
}

pub(crate) fn selection_value(ctx: &Context, options: &[NodeId], multiple: bool) -> Value {
    let mut selected = options
        .iter()
        .filter(|&&o| ctx.flag(o, "selected"))
        .map(|&o| option_value(ctx, o));
    if multiple {
        Value::Array(selected.collect())
    } else {
        selected.next().unwrap_or(Value::Null)
    }
}

/// Mark the options matching `value` selected
pub(crate) fn apply_selection(ctx: &mut Context, options: &[NodeId], value: &Value) {
    let wanted: Vec<Value> = match value {
        Value::Array(values) => values.clone(),
        Value::Null => Vec::new(),
        other => vec![other.clone()],
    };
    for &option in options {
        let on = wanted.contains(&option_value(ctx, option));
        ctx.set_flag(option, "selected", on);
    }
}

/// Select (or in multiple mode toggle) `option` among `options`, returning
/// the notifications to emit once the owner has synced
pub(crate) fn choose(
    ctx: &mut Context,
    options: &[NodeId],
    option: NodeId,
    multiple: bool,
) -> Vec<(NodeId, NotificationKind)> {
    let mut announced = Vec::new();
    if multiple {
        let on = !ctx.flag(option, "selected");
        ctx.set_flag(option, "selected", on);
        let kind = if on {
            NotificationKind::OptionSelect
        } else {
            NotificationKind::OptionUnselect
        };
        announced.push((option, kind));
        return announced;
    }
    if ctx.flag(option, "selected") {
        return announced;
    }
    for &other in options {
        if other != option && ctx.flag(other, "selected") {
            ctx.set_flag(other, "selected", false);
            announced.push((other, NotificationKind::OptionUnselect));
        }
    }
    ctx.set_flag(option, "selected", true);
    announced.push((option, NotificationKind::OptionSelect));
    announced
}

// ----------------------------------------------------------------------
// Attributes
// ----------------------------------------------------------------------

pub(crate) fn sync_from(ctx: &mut Context, node: NodeId) {
    match ctx.query_one(node, &ROOT) {
        Some(root) => sync(ctx, root),
        None => tracing::debug!("Listbox option {:?} has no listbox", node),
    }
}

fn sync(ctx: &mut Context, root: NodeId) {
    let options = options(ctx, root);
    let active = options
        .iter()
        .find(|&&o| ctx.flag(o, "focused"))
        .and_then(|&o| ctx.id_of(o));
    let multiple = ctx.flag(root, "multiple").then_some("true");
    let invalid = ctx.invalid_attr(root);
    ctx.sync_attrs(
        root,
        &AttributeSet::new()
            .role(AriaRole::Listbox)
            .tabindex(0)
            .set_opt("aria-multiselectable", multiple)
            .set_opt("aria-activedescendant", active)
            .set_opt("aria-invalid", invalid),
    );
    for option in options {
        let selected = ctx.flag(option, "selected");
        ctx.sync_attrs(
            option,
            &AttributeSet::new()
                .role(AriaRole::Option)
                .set_bool("aria-selected", selected),
        );
    }
}

pub(crate) fn attribute_changed(ctx: &mut Context, node: NodeId, kind: WidgetKind, name: &str) {
    let Some(root) = ctx.query_one(node, &ROOT) else {
        return;
    };
    if kind == WidgetKind::ListboxOption && matches!(name, "selected" | "value" | "label") {
        refresh_value(ctx, root);
    } else {
        sync(ctx, root);
    }
}

fn refresh_value(ctx: &mut Context, root: NodeId) {
    let options = options(ctx, root);
    let value = selection_value(ctx, &options, ctx.flag(root, "multiple"));
    if ctx.value(root).as_ref() != Some(&value) {
        ctx.write_control(root, value);
    } else {
        sync(ctx, root);
    }
}

pub(crate) fn apply_value(ctx: &mut Context, root: NodeId, value: Value) {
    let options = options(ctx, root);
    apply_selection(ctx, &options, &value);
    ctx.write_control(root, value);
}

// ----------------------------------------------------------------------
// Transitions
// ----------------------------------------------------------------------

/// Move the active descendant to `option`
pub fn focus_option(ctx: &mut Context, root: NodeId, option: NodeId) {
    let options = options(ctx, root);
    for &other in &options {
        ctx.set_flag(other, "focused", other == option);
    }
    let follows = ctx.flag(root, "selection-follows-focus") && !ctx.flag(root, "multiple");
    if follows {
        select(ctx, root, option);
    } else {
        sync(ctx, root);
    }
}

/// Select `option`; toggles in multiple mode
pub fn select(ctx: &mut Context, root: NodeId, option: NodeId) {
    let options = options(ctx, root);
    let multiple = ctx.flag(root, "multiple");
    let announced = choose(ctx, &options, option, multiple);
    if announced.is_empty() {
        sync(ctx, root);
        return;
    }
    let value = selection_value(ctx, &options, multiple);
    ctx.write_control(root, value);
    for (target, kind) in announced {
        ctx.emit(target, kind);
    }
}

pub(crate) fn handle_root_event(ctx: &mut Context, root: NodeId, event: &mut UiEvent) {
    let Some(action) = keys().dispatch(event) else {
        return;
    };
    let options = options(ctx, root);
    let current = options.iter().position(|&o| ctx.flag(o, "focused"));
    let index = RovingIndex::new(current, options.len(), NavigationPolicy::Clamp);
    let target = match action {
        Action::Next => index.next(),
        Action::Previous => index.prev(),
        Action::First => index.first(),
        Action::Last => index.last(),
        Action::Select => {
            if let Some(i) = current {
                select(ctx, root, options[i]);
            }
            return;
        }
        Action::Typeahead => {
            let c = event.key().and_then(|k| k.key.chars().next());
            c.and_then(|c| super::typeahead(ctx, root, &options, current, c))
        }
    };
    if let Some(i) = target {
        focus_option(ctx, root, options[i]);
    }
}

pub(crate) fn handle_option_event(ctx: &mut Context, option: NodeId, event: &mut UiEvent) {
    if !matches!(event.kind, UiEventKind::Click) {
        return;
    }
    let Some(root) = ctx.query_one(option, &ROOT) else {
        return;
    };
    focus_option(ctx, root, option);
    select(ctx, root, option);
}
