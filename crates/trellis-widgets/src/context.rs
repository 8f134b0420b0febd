//! Widget Context
//!
//! The headless host runtime: one per application root. It owns the node
//! arena, upgrades `trellis-*` elements into widgets, runs their lifecycle
//! callbacks, routes input events, drives the virtual clock and holds the
//! context-scoped collectors.

use std::collections::HashMap;
use std::rc::Rc;

use serde_json::Value;
use trellis_a11y::{AttributeSet, synchronize};
use trellis_dom::{
    Binding, DefinitionRegistry, DomTree, KeyboardInput, MutationRecord, NodeId, Uid, UidGenerator,
    UiEvent, UiEventKind,
};
use trellis_forms::{Collector, FormControl, FormControlCollector, Schema, Target};

use crate::config::Config;
use crate::notify::{Notification, NotificationBus, NotificationKind};
use crate::scheduler::Scheduler;
use crate::widgets::{self, DEFINITIONS, MatchPredicate, WidgetKind, WidgetState};
use crate::WidgetError;

/// Upgraded element
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Component {
    pub kind: WidgetKind,
    pub uid: Uid,
    pub connected: bool,
}

/// Headless widget host
pub struct Context {
    pub(crate) dom: DomTree,
    pub(crate) config: Config,
    definitions: DefinitionRegistry<WidgetKind>,
    components: HashMap<NodeId, Component>,
    uids: UidGenerator,
    pub(crate) scheduler: Scheduler,
    pub(crate) bus: NotificationBus,
    elements: Collector<NodeId>,
    form_controls: FormControlCollector<NodeId>,
    pub(crate) active_element: Option<NodeId>,
    pub(crate) state: WidgetState,
}

impl Default for Context {
    fn default() -> Self {
        Self::new()
    }
}

impl Context {
    pub fn new() -> Self {
        Self::with_config(Config::default())
    }

    pub fn with_config(config: Config) -> Self {
        let mut definitions = DefinitionRegistry::new();
        for definition in DEFINITIONS {
            if let Err(e) = definitions.define(definition.clone()) {
                tracing::error!("Built-in definition rejected: {}", e);
            }
        }
        Self {
            dom: DomTree::new(),
            config,
            definitions,
            components: HashMap::new(),
            uids: UidGenerator::new(),
            scheduler: Scheduler::new(),
            bus: NotificationBus::new(),
            elements: Collector::new(),
            form_controls: FormControlCollector::new(),
            active_element: None,
            state: WidgetState::default(),
        }
    }

    pub fn dom(&self) -> &DomTree {
        &self.dom
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Document node
    pub fn document(&self) -> NodeId {
        self.dom.root()
    }

    // ------------------------------------------------------------------
    // Elements and lifecycle
    // ------------------------------------------------------------------

    /// Create a detached element, upgrading it when the tag is a widget
    pub fn create_element(&mut self, tag: &str) -> NodeId {
        let node = self.dom.create_element(tag);
        let tag = tag.to_ascii_lowercase();
        if let Some(definition) = self.definitions.get(&tag) {
            let component = Component {
                kind: definition.kind,
                uid: self.uids.next(),
                connected: false,
            };
            if definition.form_associated {
                self.state.controls.insert(node, FormControl::new());
            }
            tracing::trace!("Upgraded <{}> {:?} as {}", tag, node, component.uid);
            self.components.insert(node, component);
        }
        node
    }

    pub fn create_text(&mut self, text: &str) -> NodeId {
        self.dom.create_text(text)
    }

    /// Attach a shadow root; its children are connected with their host
    pub fn attach_shadow(&mut self, host: NodeId) -> Result<NodeId, WidgetError> {
        Ok(self.dom.attach_shadow(host)?)
    }

    pub fn component(&self, node: NodeId) -> Option<Component> {
        self.components.get(&node).copied()
    }

    pub fn kind(&self, node: NodeId) -> Option<WidgetKind> {
        self.components.get(&node).map(|c| c.kind)
    }

    pub fn uid(&self, node: NodeId) -> Option<Uid> {
        self.components.get(&node).map(|c| c.uid)
    }

    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), WidgetError> {
        self.insert_before(parent, child, None)
    }

    pub fn insert_before(
        &mut self,
        parent: NodeId,
        child: NodeId,
        reference: Option<NodeId>,
    ) -> Result<(), WidgetError> {
        let was_connected = self.dom.is_connected(child);
        self.dom.insert_before(parent, child, reference)?;
        if was_connected {
            self.run_disconnected(child);
        }
        if self.dom.is_connected(child) {
            self.run_connected(child);
        }
        Ok(())
    }

    pub fn remove(&mut self, node: NodeId) -> Result<(), WidgetError> {
        let was_connected = self.dom.is_connected(node);
        self.dom.remove(node)?;
        if was_connected {
            self.run_disconnected(node);
        }
        Ok(())
    }

    /// `node` and everything below it, shadow trees included, in tree order
    fn subtree(&self, node: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack = vec![node];
        while let Some(current) = stack.pop() {
            out.push(current);
            let mark = stack.len();
            stack.extend(self.dom.children(current));
            if let Some(shadow) = self.dom.shadow_root(current) {
                stack.extend(self.dom.children(shadow));
            }
            stack[mark..].reverse();
        }
        out
    }

    fn run_connected(&mut self, root: NodeId) {
        for node in self.subtree(root) {
            let Some(component) = self.components.get_mut(&node) else {
                continue;
            };
            if component.connected {
                continue;
            }
            component.connected = true;
            let component = *component;
            if !self.dom.has_attribute(node, "id") {
                let tag = self.dom.tag_name(node).unwrap_or_default().to_string();
                let id = format!("{}-{}", tag, component.uid);
                if let Err(e) = self.dom.set_attribute(node, "id", &id) {
                    tracing::warn!("Could not assign id to {:?}: {}", node, e);
                }
            }
            self.register(node, component);
            tracing::trace!("Connected {:?} ({:?})", node, component.kind);
            widgets::connected(self, node, component.kind);
        }
    }

    fn run_disconnected(&mut self, root: NodeId) {
        for node in self.subtree(root) {
            if self.active_element == Some(node) {
                self.active_element = None;
            }
            let Some(component) = self.components.get_mut(&node) else {
                continue;
            };
            if !component.connected {
                continue;
            }
            component.connected = false;
            let component = *component;
            self.elements.delete(component.uid);
            self.form_controls.delete(component.uid);
            tracing::trace!("Disconnected {:?} ({:?})", node, component.kind);
            widgets::disconnected(self, node, component.kind);
        }
    }

    fn register(&mut self, node: NodeId, component: Component) {
        let id = self.dom.get_attribute(node, "id").map(str::to_string);
        self.elements.set(component.uid, id.as_deref(), node);
        if let Some(control) = self.state.controls.get(&node) {
            let binding = control.target().zip(control.path());
            self.form_controls.set(component.uid, id.as_deref(), binding, node);
        }
    }

    // ------------------------------------------------------------------
    // Attributes
    // ------------------------------------------------------------------

    pub fn get_attribute(&self, node: NodeId, name: &str) -> Option<&str> {
        self.dom.get_attribute(node, name)
    }

    pub fn has_attribute(&self, node: NodeId, name: &str) -> bool {
        self.dom.has_attribute(node, name)
    }

    /// Write a reflected attribute; observed changes reach the widget
    pub fn set_attribute(&mut self, node: NodeId, name: &str, value: &str) -> Result<(), WidgetError> {
        let old = self.dom.set_attribute(node, name, value)?;
        if old.as_deref() != Some(value) {
            self.attribute_changed(node, name);
        }
        Ok(())
    }

    pub fn remove_attribute(&mut self, node: NodeId, name: &str) -> Result<(), WidgetError> {
        if self.dom.remove_attribute(node, name)?.is_some() {
            self.attribute_changed(node, name);
        }
        Ok(())
    }

    /// Set or remove a boolean attribute through the reflection path
    pub fn toggle_attribute(&mut self, node: NodeId, name: &str, on: bool) -> Result<(), WidgetError> {
        if on {
            self.set_attribute(node, name, "")
        } else {
            self.remove_attribute(node, name)
        }
    }

    fn attribute_changed(&mut self, node: NodeId, name: &str) {
        let Some(component) = self.component(node).filter(|c| c.connected) else {
            return;
        };
        if name == "id" {
            self.register(node, component);
        }
        let observes = self
            .definitions
            .get(self.dom.tag_name(node).unwrap_or_default())
            .is_some_and(|d| d.observes(name));
        if observes {
            widgets::attribute_changed(self, node, component.kind, name);
        }
    }

    /// Internal state write that bypasses `attribute_changed`
    pub(crate) fn set_flag(&mut self, node: NodeId, name: &str, on: bool) {
        let result = match (on, self.dom.has_attribute(node, name)) {
            (true, false) => self.dom.set_attribute(node, name, "").map(|_| ()),
            (false, true) => self.dom.remove_attribute(node, name).map(|_| ()),
            _ => Ok(()),
        };
        if let Err(e) = result {
            tracing::warn!("Could not write {} on {:?}: {}", name, node, e);
        }
    }

    /// Internal string write that bypasses `attribute_changed`
    pub(crate) fn write_attribute(&mut self, node: NodeId, name: &str, value: &str) {
        if self.dom.get_attribute(node, name) == Some(value) {
            return;
        }
        if let Err(e) = self.dom.set_attribute(node, name, value) {
            tracing::warn!("Could not write {} on {:?}: {}", name, node, e);
        }
    }

    pub(crate) fn flag(&self, node: NodeId, name: &str) -> bool {
        self.dom.has_attribute(node, name)
    }

    pub(crate) fn id_of(&self, node: NodeId) -> Option<String> {
        self.dom.get_attribute(node, "id").map(str::to_string)
    }

    pub(crate) fn sync_attrs(&mut self, node: NodeId, attributes: &AttributeSet) {
        synchronize(&mut self.dom, node, attributes);
    }

    pub(crate) fn query_one(&self, node: NodeId, binding: &Binding) -> Option<NodeId> {
        let found = self.dom.query_one(node, binding);
        if found.is_none() {
            tracing::trace!("Binding {} resolved absent from {:?}", binding.name, node);
        }
        found
    }

    pub(crate) fn query_all(&self, node: NodeId, binding: &Binding) -> Vec<NodeId> {
        self.dom.query_all(node, binding)
    }

    /// Visible text of an item: its `label` attribute, else its text
    /// content minus nested widgets (a submenu's items, for one)
    pub(crate) fn label_of(&self, node: NodeId) -> String {
        if let Some(label) = self.dom.get_attribute(node, "label") {
            return label.to_string();
        }
        let mut text = String::new();
        for child in self.dom.children(node) {
            if !self.components.contains_key(&child) {
                text.push_str(&self.dom.text_content(child));
            }
        }
        text.trim().to_string()
    }

    // ------------------------------------------------------------------
    // Notifications
    // ------------------------------------------------------------------

    pub(crate) fn emit(&mut self, target: NodeId, kind: NotificationKind) {
        self.bus.emit(&self.dom, Notification { kind, target });
    }

    pub fn notifications(&self) -> &NotificationBus {
        &self.bus
    }

    pub fn take_notifications(&mut self) -> Vec<Notification> {
        self.bus.take()
    }

    /// Drain the tree's mutation log; long-running hosts call this
    /// periodically alongside `take_notifications`
    pub fn take_mutations(&mut self) -> Vec<MutationRecord> {
        self.dom.take_mutations()
    }

    pub fn subscribe(&mut self, listener: impl FnMut(&Notification, &DomTree) + 'static) {
        self.bus.subscribe(listener);
    }

    // ------------------------------------------------------------------
    // Input events
    // ------------------------------------------------------------------

    /// Route an event from its target through its composed ancestors
    pub fn dispatch(&mut self, mut event: UiEvent) -> UiEvent {
        let target = event.target;
        let mut path = vec![target];
        let mut current = target;
        while let Some(parent) = self.dom.composed_parent(current) {
            path.push(parent);
            current = parent;
        }

        for node in path {
            if node != target && !event.bubbles {
                break;
            }
            event.current_target = Some(node);
            if let Some(component) = self.component(node).filter(|c| c.connected) {
                if node == target && component.kind.is_button_like() {
                    self.click_equivalence(node, &mut event);
                }
                if !event.is_propagation_stopped() {
                    widgets::handle_event(self, node, component.kind, &mut event);
                }
            }
            if event.is_propagation_stopped() {
                break;
            }
        }
        event
    }

    fn click_equivalence(&mut self, node: NodeId, event: &mut UiEvent) {
        let activation = event
            .key()
            .filter(|k| !k.has_command_modifier())
            .is_some_and(|k| k.key == "Enter" || k.key == " ");
        if activation {
            event.consume();
            self.click(node);
        }
    }

    pub fn click(&mut self, node: NodeId) -> UiEvent {
        self.dispatch(UiEvent::click(node))
    }

    pub fn key_down(&mut self, node: NodeId, key: &str) -> UiEvent {
        self.dispatch(UiEvent::key_down(node, KeyboardInput::new(key)))
    }

    pub fn key_down_with(&mut self, node: NodeId, input: KeyboardInput) -> UiEvent {
        self.dispatch(UiEvent::key_down(node, input))
    }

    /// Key press on the focused element (or the document)
    pub fn press(&mut self, key: &str) -> UiEvent {
        let target = self.active_element.unwrap_or(NodeId::ROOT);
        self.key_down(target, key)
    }

    pub fn pointer_enter(&mut self, node: NodeId) -> UiEvent {
        self.dispatch(UiEvent::new(UiEventKind::PointerEnter, node))
    }

    pub fn pointer_leave(&mut self, node: NodeId) -> UiEvent {
        self.dispatch(UiEvent::new(UiEventKind::PointerLeave, node))
    }

    /// Text typed into an editable element
    pub fn input(&mut self, node: NodeId, text: &str) -> UiEvent {
        self.dispatch(UiEvent::new(UiEventKind::Input(text.to_string()), node))
    }

    pub fn active_element(&self) -> Option<NodeId> {
        self.active_element
    }

    /// Move focus, firing focusout on the old element then focusin on the new
    pub fn focus(&mut self, node: NodeId) {
        if self.active_element == Some(node) || !self.dom.is_element(node) {
            return;
        }
        let previous = self.active_element.replace(node);
        if let Some(previous) = previous {
            self.dispatch(UiEvent::focus_out(previous, Some(node)));
        }
        self.dispatch(UiEvent::focus_in(node, previous));
    }

    pub fn blur(&mut self) {
        if let Some(previous) = self.active_element.take() {
            self.dispatch(UiEvent::focus_out(previous, None));
        }
    }

    // ------------------------------------------------------------------
    // Time
    // ------------------------------------------------------------------

    pub fn now(&self) -> u64 {
        self.scheduler.now()
    }

    /// Advance the virtual clock, firing due intervals in order
    pub fn advance(&mut self, ms: u64) {
        let until = self.scheduler.now() + ms;
        while let Some(fired) = self.scheduler.pop_due(until) {
            match self.kind(fired.owner) {
                Some(WidgetKind::Carousel) => widgets::carousel::tick(self, fired.owner),
                other => tracing::warn!("Interval fired for {:?} ({:?})", fired.owner, other),
            }
        }
        self.scheduler.set_now(until);
    }

    /// Running intervals owned by `node`
    pub fn active_timers(&self, node: NodeId) -> usize {
        self.scheduler.active_timers(node)
    }

    // ------------------------------------------------------------------
    // Collectors
    // ------------------------------------------------------------------

    pub fn element_by_id(&self, id: &str) -> Option<NodeId> {
        self.elements.get_by_id(id).copied()
    }

    pub fn element_by_uid(&self, uid: Uid) -> Option<NodeId> {
        self.elements.get_by_uid(uid).copied()
    }

    pub fn form_control_by_id(&self, id: &str) -> Option<NodeId> {
        self.form_controls.get_by_id(id).copied()
    }

    pub fn form_control_by_uid(&self, uid: Uid) -> Option<NodeId> {
        self.form_controls.get_by_uid(uid).copied()
    }

    pub fn form_control_by_target(&self, target: &Target, path: &str) -> Option<NodeId> {
        self.form_controls.get_by_target(target, path).copied()
    }

    // ------------------------------------------------------------------
    // Form controls
    // ------------------------------------------------------------------

    pub fn control(&self, node: NodeId) -> Option<&FormControl> {
        self.state.controls.get(&node)
    }

    fn control_mut(&mut self, node: NodeId) -> Result<&mut FormControl, WidgetError> {
        self.state
            .controls
            .get_mut(&node)
            .ok_or(WidgetError::NotAFormControl(node))
    }

    pub fn value(&self, node: NodeId) -> Option<Value> {
        self.control(node).map(FormControl::value)
    }

    /// Programmatic value write; widget state follows the value
    pub fn set_value(&mut self, node: NodeId, value: Value) -> Result<(), WidgetError> {
        self.control_mut(node)?;
        let kind = self.kind(node).ok_or(WidgetError::UnknownWidget(node))?;
        widgets::apply_value(self, node, kind, value);
        Ok(())
    }

    pub fn touch(&mut self, node: NodeId) -> Result<(), WidgetError> {
        self.control_mut(node)?.touch();
        self.after_control_change(node);
        Ok(())
    }

    pub fn clear(&mut self, node: NodeId) -> Result<(), WidgetError> {
        self.set_value(node, Value::Null)
    }

    pub fn validate(&mut self, node: NodeId) -> Result<bool, WidgetError> {
        let valid = self.control_mut(node)?.validate().is_valid();
        self.after_control_change(node);
        Ok(valid)
    }

    pub fn set_schema(&mut self, node: NodeId, schema: impl Schema + 'static) -> Result<(), WidgetError> {
        self.control_mut(node)?.set_schema(Some(Rc::new(schema)));
        self.after_control_change(node);
        Ok(())
    }

    pub fn set_control_name(&mut self, node: NodeId, name: &str) -> Result<(), WidgetError> {
        self.control_mut(node)?.set_name(Some(name));
        Ok(())
    }

    /// Reflect the control's value into `target` at `path`
    pub fn bind_control(&mut self, node: NodeId, target: Target, path: &str) -> Result<(), WidgetError> {
        self.control_mut(node)?.bind(target, path);
        if let Some(component) = self.component(node).filter(|c| c.connected) {
            self.register(node, component);
        }
        self.after_control_change(node);
        Ok(())
    }

    /// Store a value produced by a widget transition
    pub(crate) fn write_control(&mut self, node: NodeId, value: Value) {
        self.adopt_name(node);
        let Some(control) = self.state.controls.get_mut(&node) else {
            return;
        };
        control.set_value(value);
        self.after_control_change(node);
    }

    /// A control without an explicit name takes its `name` attribute; its
    /// id always follows the element's
    pub(crate) fn adopt_name(&mut self, node: NodeId) {
        let Some(control) = self.state.controls.get_mut(&node) else {
            return;
        };
        if control.name().is_none() {
            if let Some(name) = self.dom.get_attribute(node, "name") {
                control.set_name(Some(name));
            }
        }
        control.set_id(self.dom.get_attribute(node, "id"));
    }

    /// Initial value taken from markup on connect; announces nothing
    pub(crate) fn seed_control(&mut self, node: NodeId, value: Value) {
        if let Some(control) = self.state.controls.get_mut(&node) {
            control.set_value(value);
            control.drain_events();
        }
    }

    /// Forward control events as notifications and refresh `aria-invalid`
    pub(crate) fn after_control_change(&mut self, node: NodeId) {
        let events = match self.state.controls.get_mut(&node) {
            Some(control) => control.drain_events(),
            None => return,
        };
        if let Some(kind) = self.kind(node) {
            widgets::sync(self, node, kind);
        }
        for event in events {
            let kind = match event {
                trellis_forms::ControlEvent::StateChanged => NotificationKind::StateChange,
                trellis_forms::ControlEvent::ControlChanged => NotificationKind::FormControlChange,
            };
            self.emit(node, kind);
        }
    }

    /// `aria-invalid` for a form-associated element
    pub(crate) fn invalid_attr(&self, node: NodeId) -> Option<&'static str> {
        self.control(node)
            .map(|c| if c.is_error_visible() { "true" } else { "false" })
    }

    // ------------------------------------------------------------------
    // Predicates
    // ------------------------------------------------------------------

    /// Replace the typeahead/filter matcher of one widget instance
    pub fn set_match_predicate(&mut self, node: NodeId, predicate: impl Fn(&str, &str) -> bool + 'static) {
        self.state.predicates.insert(node, Rc::new(predicate));
    }

    pub(crate) fn predicate(&self, node: NodeId) -> MatchPredicate {
        self.state
            .predicates
            .get(&node)
            .cloned()
            .unwrap_or_else(widgets::default_predicate)
    }
}
