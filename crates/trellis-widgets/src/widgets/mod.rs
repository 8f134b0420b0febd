//! Widgets
//!
//! One module per ARIA pattern. Every module has the same shape: element
//! definitions, a `sync` deriving attributes for the root and its relatives,
//! a keyboard table, and transitions that mutate state, sync, then notify.

use std::collections::{HashMap, HashSet};
use std::rc::Rc;

use trellis_dom::{ElementDefinition, NodeId, UiEvent};
use trellis_forms::{Form as FormState, FormControl};

use crate::Context;

pub mod accordion;
pub mod button;
pub mod carousel;
pub mod checkbox;
pub mod combobox;
pub mod dialog;
pub mod form;
pub mod icon;
pub mod input;
pub mod listbox;
pub mod menu;
pub mod radio_group;
pub mod slider;
pub mod tabs;
pub mod tooltip;

/// Every element the context upgrades
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WidgetKind {
    Accordion,
    AccordionSection,
    AccordionHeader,
    AccordionButton,
    AccordionPanel,

    Carousel,
    CarouselSlides,
    CarouselSlide,
    CarouselTabs,
    CarouselTab,
    CarouselRotationControl,
    CarouselNextSlideControl,
    CarouselPreviousSlideControl,

    Tabs,
    Tab,
    TabPanel,

    RadioGroup,
    RadioButton,
    Checkbox,
    Button,

    Listbox,
    ListboxOption,

    Combobox,
    ComboboxInput,
    ComboboxButton,
    ComboboxListbox,
    ComboboxOption,

    Menu,
    Menubar,
    MenuButton,
    MenuSubmenu,
    MenuItem,

    Slider,
    SliderThumb,

    Tooltip,
    TooltipTrigger,
    TooltipContent,

    Dialog,
    DialogLabel,
    DialogDescription,

    Input,
    Form,
    FormSubmit,
    Icon,
}

impl WidgetKind {
    /// Enter and Space act as a click
    pub fn is_button_like(self) -> bool {
        matches!(
            self,
            Self::Button
                | Self::AccordionButton
                | Self::CarouselRotationControl
                | Self::CarouselNextSlideControl
                | Self::CarouselPreviousSlideControl
                | Self::CarouselTab
                | Self::Tab
                | Self::ComboboxButton
                | Self::MenuButton
                | Self::FormSubmit
        )
    }
}

const fn define(
    name: &'static str,
    kind: WidgetKind,
    observed_attributes: &'static [&'static str],
) -> ElementDefinition<WidgetKind> {
    ElementDefinition {
        name,
        kind,
        observed_attributes,
        form_associated: false,
    }
}

const fn define_control(
    name: &'static str,
    kind: WidgetKind,
    observed_attributes: &'static [&'static str],
) -> ElementDefinition<WidgetKind> {
    ElementDefinition {
        name,
        kind,
        observed_attributes,
        form_associated: true,
    }
}

/// Built-in element definitions
pub const DEFINITIONS: &[ElementDefinition<WidgetKind>] = &[
    define("trellis-accordion", WidgetKind::Accordion, &["allow-only-one-expanded-section"]),
    define("trellis-accordion-section", WidgetKind::AccordionSection, &["expanded", "noncollapsible"]),
    define("trellis-accordion-header", WidgetKind::AccordionHeader, &["level"]),
    define("trellis-accordion-button", WidgetKind::AccordionButton, &[]),
    define("trellis-accordion-panel", WidgetKind::AccordionPanel, &[]),
    define(
        "trellis-carousel",
        WidgetKind::Carousel,
        &[
            "automatic-rotation",
            "automatic-rotation-interval-time",
            "infinite-rotation",
            "reverse-rotation",
        ],
    ),
    define("trellis-carousel-slides", WidgetKind::CarouselSlides, &[]),
    define("trellis-carousel-slide", WidgetKind::CarouselSlide, &["active"]),
    define("trellis-carousel-tabs", WidgetKind::CarouselTabs, &[]),
    define("trellis-carousel-tab", WidgetKind::CarouselTab, &["active"]),
    define("trellis-carousel-rotation-control", WidgetKind::CarouselRotationControl, &[]),
    define("trellis-carousel-next-slide-control", WidgetKind::CarouselNextSlideControl, &[]),
    define("trellis-carousel-previous-slide-control", WidgetKind::CarouselPreviousSlideControl, &[]),
    define("trellis-tabs", WidgetKind::Tabs, &["automatic-activation"]),
    define("trellis-tabs-tab", WidgetKind::Tab, &["selected"]),
    define("trellis-tabs-panel", WidgetKind::TabPanel, &[]),
    define_control("trellis-radio-group", WidgetKind::RadioGroup, &["disabled", "readonly"]),
    define("trellis-radio-button", WidgetKind::RadioButton, &["checked", "value"]),
    define_control("trellis-checkbox", WidgetKind::Checkbox, &["checked", "disabled", "readonly", "native"]),
    define("trellis-button", WidgetKind::Button, &["pressed", "disabled"]),
    define_control("trellis-listbox", WidgetKind::Listbox, &["multiple", "selection-follows-focus"]),
    define("trellis-listbox-option", WidgetKind::ListboxOption, &["selected", "value", "label"]),
    define_control("trellis-combobox", WidgetKind::Combobox, &["expanded", "multiple"]),
    define("trellis-combobox-input", WidgetKind::ComboboxInput, &[]),
    define("trellis-combobox-button", WidgetKind::ComboboxButton, &[]),
    define("trellis-combobox-listbox", WidgetKind::ComboboxListbox, &[]),
    define("trellis-combobox-option", WidgetKind::ComboboxOption, &["selected", "value", "label"]),
    define("trellis-menu", WidgetKind::Menu, &[]),
    define("trellis-menubar", WidgetKind::Menubar, &[]),
    define("trellis-menu-button", WidgetKind::MenuButton, &[]),
    define("trellis-menu-submenu", WidgetKind::MenuSubmenu, &["expanded"]),
    define("trellis-menu-item", WidgetKind::MenuItem, &[]),
    define_control(
        "trellis-slider",
        WidgetKind::Slider,
        &["min", "max", "step", "orientation", "disabled", "readonly", "value"],
    ),
    define("trellis-slider-thumb", WidgetKind::SliderThumb, &[]),
    define("trellis-tooltip", WidgetKind::Tooltip, &["visible", "touch-trigger"]),
    define("trellis-tooltip-trigger", WidgetKind::TooltipTrigger, &[]),
    define("trellis-tooltip-content", WidgetKind::TooltipContent, &[]),
    define("trellis-dialog", WidgetKind::Dialog, &["visible", "alert"]),
    define("trellis-dialog-label", WidgetKind::DialogLabel, &[]),
    define("trellis-dialog-description", WidgetKind::DialogDescription, &[]),
    define_control("trellis-input", WidgetKind::Input, &["value", "disabled", "readonly"]),
    define("trellis-form", WidgetKind::Form, &["disabled", "async"]),
    define("trellis-form-submit", WidgetKind::FormSubmit, &[]),
    define("trellis-icon", WidgetKind::Icon, &["src", "label"]),
];

/// Swappable text matcher: `(candidate label, typed query) -> matches`
pub type MatchPredicate = Rc<dyn Fn(&str, &str) -> bool>;

/// Case-insensitive substring match
pub fn default_predicate() -> MatchPredicate {
    Rc::new(|label: &str, query: &str| label.to_lowercase().contains(&query.to_lowercase()))
}

/// Rolling typeahead buffer
#[derive(Debug, Clone, Default)]
pub struct Typeahead {
    buffer: String,
    last_at: u64,
}

impl Typeahead {
    /// Append `c` typed at `now`, restarting after `timeout` ms of silence
    pub fn push(&mut self, c: char, now: u64, timeout: u64) -> &str {
        if now.saturating_sub(self.last_at) > timeout {
            self.buffer.clear();
        }
        self.buffer.push(c);
        self.last_at = now;
        &self.buffer
    }
}

/// Feed `c` into the typeahead buffer of `owner` and find the item whose
/// label matches. A fresh single character searches after `current`.
pub(crate) fn typeahead(
    ctx: &mut Context,
    owner: NodeId,
    items: &[NodeId],
    current: Option<usize>,
    c: char,
) -> Option<usize> {
    let now = ctx.now();
    let timeout = ctx.config.typeahead_timeout_ms;
    let query = ctx
        .state
        .typeahead
        .entry(owner)
        .or_default()
        .push(c, now, timeout)
        .to_string();
    let predicate = ctx.predicate(owner);
    let start = match current {
        Some(i) if query.chars().count() == 1 => i + 1,
        Some(i) => i,
        None => 0,
    };
    let len = items.len();
    (0..len)
        .map(|k| (start + k) % len)
        .find(|&i| predicate(&ctx.label_of(items[i]), &query))
}

/// Behavior objects attached to widget elements
#[derive(Default)]
pub(crate) struct WidgetState {
    pub rotations: HashMap<NodeId, carousel::Rotation>,
    pub controls: HashMap<NodeId, FormControl>,
    pub forms: HashMap<NodeId, FormState>,
    pub typeahead: HashMap<NodeId, Typeahead>,
    pub predicates: HashMap<NodeId, MatchPredicate>,
    /// Combobox filter text, by combobox root
    pub queries: HashMap<NodeId, String>,
    /// Element to refocus when a dialog or menu closes
    pub focus_return: HashMap<NodeId, NodeId>,
    /// Buttons with an async press in flight
    pub pressing: HashSet<NodeId>,
}

pub(crate) fn connected(ctx: &mut Context, node: NodeId, kind: WidgetKind) {
    use WidgetKind::*;
    match kind {
        Carousel => carousel::connected(ctx, node),
        Form => form::connected(ctx, node),
        Slider => slider::connected(ctx, node),
        Input => input::connected(ctx, node),
        Checkbox => checkbox::connected(ctx, node),
        Icon => icon::connected(ctx, node),
        _ => sync(ctx, node, kind),
    }
}

pub(crate) fn disconnected(ctx: &mut Context, node: NodeId, kind: WidgetKind) {
    match kind {
        WidgetKind::Carousel => carousel::disconnected(ctx, node),
        WidgetKind::Dialog | WidgetKind::Menu | WidgetKind::Menubar => {
            ctx.state.focus_return.remove(&node);
        }
        WidgetKind::Button => {
            ctx.state.pressing.remove(&node);
        }
        _ => {}
    }
}

pub(crate) fn attribute_changed(ctx: &mut Context, node: NodeId, kind: WidgetKind, name: &str) {
    use WidgetKind::*;
    match kind {
        Carousel => carousel::attribute_changed(ctx, node, name),
        Checkbox => checkbox::attribute_changed(ctx, node, name),
        RadioButton => radio_group::button_attribute_changed(ctx, node, name),
        Slider => slider::attribute_changed(ctx, node, name),
        Input => input::attribute_changed(ctx, node, name),
        Dialog => dialog::attribute_changed(ctx, node, name),
        Form => form::attribute_changed(ctx, node, name),
        Icon => icon::attribute_changed(ctx, node, name),
        Listbox | ListboxOption => listbox::attribute_changed(ctx, node, kind, name),
        Combobox | ComboboxOption => combobox::attribute_changed(ctx, node, kind, name),
        _ => sync(ctx, node, kind),
    }
}

/// Re-derive attributes for the widget `node` belongs to
pub(crate) fn sync(ctx: &mut Context, node: NodeId, kind: WidgetKind) {
    use WidgetKind::*;
    match kind {
        Accordion | AccordionSection | AccordionHeader | AccordionButton | AccordionPanel => {
            accordion::sync_from(ctx, node)
        }
        Carousel | CarouselSlides | CarouselSlide | CarouselTabs | CarouselTab | CarouselRotationControl
        | CarouselNextSlideControl | CarouselPreviousSlideControl => carousel::sync_from(ctx, node),
        Tabs | Tab | TabPanel => tabs::sync_from(ctx, node),
        RadioGroup | RadioButton => radio_group::sync_from(ctx, node),
        Checkbox => checkbox::sync(ctx, node),
        Button => button::sync(ctx, node),
        Listbox | ListboxOption => listbox::sync_from(ctx, node),
        Combobox | ComboboxInput | ComboboxButton | ComboboxListbox | ComboboxOption => {
            combobox::sync_from(ctx, node)
        }
        Menu | Menubar | MenuButton | MenuSubmenu | MenuItem => menu::sync_from(ctx, node),
        Slider | SliderThumb => slider::sync_from(ctx, node),
        Tooltip | TooltipTrigger | TooltipContent => tooltip::sync_from(ctx, node),
        Dialog | DialogLabel | DialogDescription => dialog::sync_from(ctx, node),
        Input => input::sync(ctx, node),
        Form | FormSubmit => form::sync_from(ctx, node),
        Icon => icon::sync(ctx, node),
    }
}

/// Give the widget at `node` a chance to handle an event on its path
pub(crate) fn handle_event(ctx: &mut Context, node: NodeId, kind: WidgetKind, event: &mut UiEvent) {
    use WidgetKind::*;
    match kind {
        Accordion => accordion::handle_root_event(ctx, node, event),
        AccordionButton => accordion::handle_button_event(ctx, node, event),
        Carousel => carousel::handle_root_event(ctx, node, event),
        CarouselTabs => carousel::handle_tabs_event(ctx, node, event),
        CarouselTab => carousel::handle_tab_event(ctx, node, event),
        CarouselRotationControl => carousel::handle_rotation_control_event(ctx, node, event),
        CarouselNextSlideControl | CarouselPreviousSlideControl => {
            carousel::handle_step_control_event(ctx, node, kind, event)
        }
        Tabs => tabs::handle_root_event(ctx, node, event),
        Tab => tabs::handle_tab_event(ctx, node, event),
        RadioGroup => radio_group::handle_root_event(ctx, node, event),
        RadioButton => radio_group::handle_button_event(ctx, node, event),
        Checkbox => checkbox::handle_event(ctx, node, event),
        Button => button::handle_event(ctx, node, event),
        Listbox => listbox::handle_root_event(ctx, node, event),
        ListboxOption => listbox::handle_option_event(ctx, node, event),
        Combobox => combobox::handle_root_event(ctx, node, event),
        ComboboxInput => combobox::handle_input_event(ctx, node, event),
        ComboboxButton => combobox::handle_button_event(ctx, node, event),
        ComboboxOption => combobox::handle_option_event(ctx, node, event),
        Menu | Menubar => menu::handle_root_event(ctx, node, event),
        MenuButton => menu::handle_button_event(ctx, node, event),
        MenuItem => menu::handle_item_event(ctx, node, event),
        Slider => slider::handle_root_event(ctx, node, event),
        Tooltip => tooltip::handle_root_event(ctx, node, event),
        TooltipTrigger => tooltip::handle_trigger_event(ctx, node, event),
        Dialog => dialog::handle_root_event(ctx, node, event),
        Input => input::handle_event(ctx, node, event),
        FormSubmit => form::handle_submit_event(ctx, node, event),
        _ => {}
    }
}

/// Apply a programmatic value to a form-associated widget
pub(crate) fn apply_value(ctx: &mut Context, node: NodeId, kind: WidgetKind, value: serde_json::Value) {
    match kind {
        WidgetKind::Checkbox => checkbox::apply_value(ctx, node, value),
        WidgetKind::RadioGroup => radio_group::apply_value(ctx, node, value),
        WidgetKind::Slider => slider::apply_value(ctx, node, value),
        WidgetKind::Listbox => listbox::apply_value(ctx, node, value),
        WidgetKind::Combobox => combobox::apply_value(ctx, node, value),
        _ => ctx.write_control(node, value),
    }
}
