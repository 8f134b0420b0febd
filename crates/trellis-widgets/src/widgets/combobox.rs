//! Combobox
//!
//! Text input with a popup listbox. Typing filters the options through the
//! instance's match predicate; non-matching options are hidden. The input
//! keeps DOM focus and tracks the focused option with
//! `aria-activedescendant` while the popup is open.

use serde_json::Value;
use trellis_a11y::{AriaRole, AttributeSet, Key, KeyDispatch, NavigationPolicy, RovingIndex, synchronize_relative};
use trellis_dom::{Binding, NodeId, UiEvent, UiEventKind};

use super::WidgetKind;
use super::listbox::{apply_selection, choose, selection_value};
use crate::Context;
use crate::notify::NotificationKind;

const ROOT: Binding = Binding::closest("combobox", "trellis-combobox");
const INPUT: Binding = Binding::one("input", "trellis-combobox-input");
const BUTTON: Binding = Binding::one("button", "trellis-combobox-button");
const LISTBOX: Binding = Binding::one("listbox", "trellis-combobox-listbox");
const OPTIONS: Binding = Binding::all("options", "trellis-combobox-option");

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Action {
    Down,
    Up,
    Select,
    Escape,
}

fn keys() -> KeyDispatch<Action> {
    KeyDispatch::new()
        .on(Key::ArrowDown, Action::Down)
        .on(Key::ArrowUp, Action::Up)
        .on(Key::Enter, Action::Select)
        .on(Key::Escape, Action::Escape)
}

pub fn options(ctx: &Context, root: NodeId) -> Vec<NodeId> {
    ctx.query_all(root, &OPTIONS)
}

/// Options passing the current filter
pub fn visible_options(ctx: &Context, root: NodeId) -> Vec<NodeId> {
    options(ctx, root)
        .into_iter()
        .filter(|&o| !ctx.flag(o, "hidden"))
        .collect()
}

pub fn is_expanded(ctx: &Context, root: NodeId) -> bool {
    ctx.flag(root, "expanded")
}

pub fn query(ctx: &Context, root: NodeId) -> &str {
    ctx.state.queries.get(&root).map_or("", String::as_str)
}

fn focused_option(ctx: &Context, root: NodeId) -> Option<NodeId> {
    options(ctx, root).into_iter().find(|&o| ctx.flag(o, "focused"))
}

pub(crate) fn sync_from(ctx: &mut Context, node: NodeId) {
    match ctx.query_one(node, &ROOT) {
        Some(root) => sync(ctx, root),
        None => tracing::debug!("Combobox part {:?} has no combobox", node),
    }
}

fn sync(ctx: &mut Context, root: NodeId) {
    let expanded = ctx.flag(root, "expanded");
    let multiple = ctx.flag(root, "multiple").then_some("true");
    let input = ctx.query_one(root, &INPUT);
    let button = ctx.query_one(root, &BUTTON);
    let listbox = ctx.query_one(root, &LISTBOX);
    let listbox_id = listbox.and_then(|l| ctx.id_of(l));
    let active = focused_option(ctx, root)
        .filter(|_| expanded)
        .and_then(|o| ctx.id_of(o));
    let invalid = ctx.invalid_attr(root);

    synchronize_relative(
        &mut ctx.dom,
        input,
        INPUT.name,
        &AttributeSet::new()
            .role(AriaRole::Combobox)
            .tabindex(0)
            .set_bool("aria-expanded", expanded)
            .set_opt("aria-controls", listbox_id.clone())
            .set_opt("aria-activedescendant", active)
            .set("aria-autocomplete", "list")
            .set_opt("aria-invalid", invalid),
    );
    synchronize_relative(
        &mut ctx.dom,
        button,
        BUTTON.name,
        &AttributeSet::new()
            .role(AriaRole::Button)
            .tabindex(-1)
            .set_bool("aria-expanded", expanded)
            .set_opt("aria-controls", listbox_id),
    );
    synchronize_relative(
        &mut ctx.dom,
        listbox,
        LISTBOX.name,
        &AttributeSet::new()
            .role(AriaRole::Listbox)
            .set_opt("aria-multiselectable", multiple)
            .flag("hidden", !expanded),
    );

    let predicate = ctx.predicate(root);
    let query = query(ctx, root).to_string();
    for option in options(ctx, root) {
        let matches = query.is_empty() || predicate(&ctx.label_of(option), &query);
        let selected = ctx.flag(option, "selected");
        ctx.sync_attrs(
            option,
            &AttributeSet::new()
                .role(AriaRole::Option)
                .set_bool("aria-selected", selected)
                .flag("hidden", !matches),
        );
    }
}

pub(crate) fn attribute_changed(ctx: &mut Context, node: NodeId, kind: WidgetKind, name: &str) {
    let Some(root) = ctx.query_one(node, &ROOT) else {
        return;
    };
    if kind == WidgetKind::ComboboxOption && matches!(name, "selected" | "value" | "label") {
        let options = options(ctx, root);
        let value = selection_value(ctx, &options, ctx.flag(root, "multiple"));
        if ctx.value(root).as_ref() != Some(&value) {
            ctx.write_control(root, value);
            return;
        }
    }
    sync(ctx, root);
}

pub(crate) fn apply_value(ctx: &mut Context, root: NodeId, value: Value) {
    let options = options(ctx, root);
    apply_selection(ctx, &options, &value);
    reflect_selection(ctx, root);
    ctx.write_control(root, value);
}

/// In single mode the input shows the selected option's label
fn reflect_selection(ctx: &mut Context, root: NodeId) {
    if ctx.flag(root, "multiple") {
        return;
    }
    let label = options(ctx, root)
        .into_iter()
        .find(|&o| ctx.flag(o, "selected"))
        .map(|o| ctx.label_of(o))
        .unwrap_or_default();
    if let Some(input) = ctx.query_one(root, &INPUT) {
        ctx.write_attribute(input, "value", &label);
    }
    ctx.state.queries.remove(&root);
}

// ----------------------------------------------------------------------
// Transitions
// ----------------------------------------------------------------------

pub fn expand(ctx: &mut Context, root: NodeId) {
    set_expanded(ctx, root, true);
}

pub fn collapse(ctx: &mut Context, root: NodeId) {
    set_expanded(ctx, root, false);
}

fn set_expanded(ctx: &mut Context, root: NodeId, expanded: bool) {
    if ctx.flag(root, "expanded") == expanded {
        return;
    }
    ctx.set_flag(root, "expanded", expanded);
    sync(ctx, root);
    let kind = if expanded {
        NotificationKind::ComboboxExpand
    } else {
        NotificationKind::ComboboxCollapse
    };
    ctx.emit(root, kind);
}

/// Replace the filter text
pub fn filter(ctx: &mut Context, root: NodeId, text: &str) {
    ctx.state.queries.insert(root, text.to_string());
    for option in options(ctx, root) {
        ctx.set_flag(option, "focused", false);
    }
    if let Some(input) = ctx.query_one(root, &INPUT) {
        ctx.write_attribute(input, "value", text);
    }
    sync(ctx, root);
    expand(ctx, root);
}

fn move_focus(ctx: &mut Context, root: NodeId, backward: bool) {
    let visible = visible_options(ctx, root);
    let current = visible.iter().position(|&o| ctx.flag(o, "focused"));
    let index = RovingIndex::new(current, visible.len(), NavigationPolicy::Clamp);
    let target = if backward { index.prev() } else { index.next() };
    let Some(i) = target else {
        return;
    };
    for option in options(ctx, root) {
        ctx.set_flag(option, "focused", option == visible[i]);
    }
    sync(ctx, root);
}

/// Select `option`; a single-select combobox then collapses
pub fn select(ctx: &mut Context, root: NodeId, option: NodeId) {
    let options = options(ctx, root);
    let multiple = ctx.flag(root, "multiple");
    let announced = choose(ctx, &options, option, multiple);
    reflect_selection(ctx, root);
    if !announced.is_empty() {
        let value = selection_value(ctx, &options, multiple);
        ctx.write_control(root, value);
        for (target, kind) in announced {
            ctx.emit(target, kind);
        }
    }
    if !multiple {
        collapse(ctx, root);
    }
    sync(ctx, root);
}

fn clear_selection(ctx: &mut Context, root: NodeId) {
    let options = options(ctx, root);
    let selected: Vec<_> = options.iter().copied().filter(|&o| ctx.flag(o, "selected")).collect();
    apply_selection(ctx, &options, &Value::Null);
    reflect_selection(ctx, root);
    let value = selection_value(ctx, &options, ctx.flag(root, "multiple"));
    ctx.write_control(root, value);
    for option in selected {
        ctx.emit(option, NotificationKind::OptionUnselect);
    }
}

// ----------------------------------------------------------------------
// Events
// ----------------------------------------------------------------------

pub(crate) fn handle_input_event(ctx: &mut Context, input: NodeId, event: &mut UiEvent) {
    let Some(root) = ctx.query_one(input, &ROOT) else {
        return;
    };
    if let UiEventKind::Input(text) = &event.kind {
        let text = text.clone();
        filter(ctx, root, &text);
        return;
    }
    let Some(action) = keys().dispatch(event) else {
        return;
    };
    let expanded = ctx.flag(root, "expanded");
    match action {
        Action::Down if !expanded => expand(ctx, root),
        Action::Down => move_focus(ctx, root, false),
        Action::Up => {
            expand(ctx, root);
            move_focus(ctx, root, true);
        }
        Action::Select => {
            let focused = focused_option(ctx, root).filter(|_| expanded);
            if let Some(option) = focused {
                select(ctx, root, option);
            }
        }
        Action::Escape if expanded => collapse(ctx, root),
        Action::Escape => clear_selection(ctx, root),
    }
}

pub(crate) fn handle_button_event(ctx: &mut Context, button: NodeId, event: &mut UiEvent) {
    if !matches!(event.kind, UiEventKind::Click) {
        return;
    }
    if let Some(root) = ctx.query_one(button, &ROOT) {
        let expanded = ctx.flag(root, "expanded");
        set_expanded(ctx, root, !expanded);
    }
}

pub(crate) fn handle_option_event(ctx: &mut Context, option: NodeId, event: &mut UiEvent) {
    if !matches!(event.kind, UiEventKind::Click) {
        return;
    }
    if let Some(root) = ctx.query_one(option, &ROOT) {
        select(ctx, root, option);
    }
}

pub(crate) fn handle_root_event(ctx: &mut Context, root: NodeId, event: &mut UiEvent) {
    let leaving = matches!(event.kind, UiEventKind::FocusOut)
        && !event.related_target.is_some_and(|r| ctx.dom.contains(root, r));
    if leaving {
        collapse(ctx, root);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    struct Fixture {
        ctx: Context,
        root: NodeId,
        input: NodeId,
        button: NodeId,
        options: Vec<NodeId>,
    }

    fn combobox(labels: &[&str], multiple: bool) -> Fixture {
        let mut ctx = Context::new();
        let root = ctx.create_element("trellis-combobox");
        if multiple {
            ctx.set_attribute(root, "multiple", "").unwrap();
        }
        let input = ctx.create_element("trellis-combobox-input");
        let button = ctx.create_element("trellis-combobox-button");
        let listbox = ctx.create_element("trellis-combobox-listbox");
        ctx.append_child(root, input).unwrap();
        ctx.append_child(root, button).unwrap();
        ctx.append_child(root, listbox).unwrap();
        let mut options = Vec::new();
        for label in labels {
            let option = ctx.create_element("trellis-combobox-option");
            ctx.set_attribute(option, "label", label).unwrap();
            ctx.append_child(listbox, option).unwrap();
            options.push(option);
        }
        ctx.append_child(ctx.document(), root).unwrap();
        ctx.focus(input);
        Fixture { ctx, root, input, button, options }
    }

    #[test]
    fn test_typing_filters_and_expands() {
        let mut f = combobox(&["Red", "Green", "Grey"], false);
        f.ctx.input(f.input, "gr");
        assert!(is_expanded(&f.ctx, f.root));
        assert_eq!(visible_options(&f.ctx, f.root), vec![f.options[1], f.options[2]]);
        assert!(f.ctx.has_attribute(f.options[0], "hidden"));
        assert_eq!(f.ctx.get_attribute(f.input, "aria-expanded"), Some("true"));
    }

    #[test]
    fn test_keyboard_select() {
        let mut f = combobox(&["Red", "Green", "Blue"], false);
        f.ctx.press("ArrowDown");
        assert!(is_expanded(&f.ctx, f.root));
        f.ctx.press("ArrowDown");
        f.ctx.press("ArrowDown");
        let id = f.ctx.get_attribute(f.options[1], "id").unwrap().to_string();
        assert_eq!(f.ctx.get_attribute(f.input, "aria-activedescendant"), Some(id.as_str()));
        f.ctx.press("Enter");
        assert_eq!(f.ctx.value(f.root), Some(json!("Green")));
        assert!(!is_expanded(&f.ctx, f.root));
        assert_eq!(f.ctx.get_attribute(f.input, "value"), Some("Green"));
        assert_eq!(f.ctx.get_attribute(f.input, "aria-activedescendant"), None);
    }

    #[test]
    fn test_escape_collapses_then_clears() {
        let mut f = combobox(&["Red", "Green"], false);
        f.ctx.click(f.button);
        f.ctx.click(f.options[0]);
        assert_eq!(f.ctx.value(f.root), Some(json!("Red")));
        f.ctx.click(f.button);
        f.ctx.press("Escape");
        assert!(!is_expanded(&f.ctx, f.root));
        assert_eq!(f.ctx.value(f.root), Some(json!("Red")));
        f.ctx.press("Escape");
        assert_eq!(f.ctx.value(f.root), Some(Value::Null));
    }

    #[test]
    fn test_multiple_stays_open() {
        let mut f = combobox(&["A", "B"], true);
        f.ctx.click(f.button);
        f.ctx.click(f.options[0]);
        f.ctx.click(f.options[1]);
        assert!(is_expanded(&f.ctx, f.root));
        assert_eq!(f.ctx.value(f.root), Some(json!(["A", "B"])));
    }

    #[test]
    fn test_focus_leaving_collapses() {
        let mut f = combobox(&["A"], false);
        f.ctx.click(f.button);
        let outside = f.ctx.create_element("div");
        f.ctx.append_child(f.ctx.document(), outside).unwrap();
        f.ctx.focus(outside);
        assert!(!is_expanded(&f.ctx, f.root));
    }
}
