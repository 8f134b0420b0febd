//! UI Events
//!
//! Input events routed from a target through its ancestors.

use crate::NodeId;

/// Modifier-aware keyboard input
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeyboardInput {
    /// DOM `key` value (`"ArrowLeft"`, `" "`, `"a"`)
    pub key: String,
    pub shift: bool,
    pub alt: bool,
    pub ctrl: bool,
    pub meta: bool,
}

impl KeyboardInput {
    pub fn new(key: &str) -> Self {
        Self {
            key: key.to_string(),
            ..Default::default()
        }
    }

    pub fn with_shift(mut self) -> Self {
        self.shift = true;
        self
    }

    /// Whether any of ctrl/alt/meta is held
    pub fn has_command_modifier(&self) -> bool {
        self.ctrl || self.alt || self.meta
    }
}

/// UI event kinds
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UiEventKind {
    Click,
    KeyDown(KeyboardInput),
    PointerEnter,
    PointerLeave,
    FocusIn,
    FocusOut,
    /// Text typed into an editable element
    Input(String),
}

impl UiEventKind {
    /// DOM event type name
    pub fn name(&self) -> &'static str {
        match self {
            Self::Click => "click",
            Self::KeyDown(_) => "keydown",
            Self::PointerEnter => "pointerenter",
            Self::PointerLeave => "pointerleave",
            Self::FocusIn => "focusin",
            Self::FocusOut => "focusout",
            Self::Input(_) => "input",
        }
    }

    pub fn bubbles(&self) -> bool {
        !matches!(self, Self::PointerEnter | Self::PointerLeave)
    }
}

/// UI event
#[derive(Debug, Clone)]
pub struct UiEvent {
    pub kind: UiEventKind,
    pub target: NodeId,
    pub current_target: Option<NodeId>,
    /// Focus/pointer counterpart (where focus went to or came from)
    pub related_target: Option<NodeId>,
    pub bubbles: bool,
    pub cancelable: bool,
    default_prevented: bool,
    propagation_stopped: bool,
}

impl UiEvent {
    pub fn new(kind: UiEventKind, target: NodeId) -> Self {
        let bubbles = kind.bubbles();
        let cancelable = matches!(kind, UiEventKind::Click | UiEventKind::KeyDown(_));
        Self {
            kind,
            target,
            current_target: None,
            related_target: None,
            bubbles,
            cancelable,
            default_prevented: false,
            propagation_stopped: false,
        }
    }

    pub fn click(target: NodeId) -> Self {
        Self::new(UiEventKind::Click, target)
    }

    pub fn key_down(target: NodeId, input: KeyboardInput) -> Self {
        Self::new(UiEventKind::KeyDown(input), target)
    }

    pub fn focus_in(target: NodeId, related: Option<NodeId>) -> Self {
        let mut event = Self::new(UiEventKind::FocusIn, target);
        event.related_target = related;
        event
    }

    pub fn focus_out(target: NodeId, related: Option<NodeId>) -> Self {
        let mut event = Self::new(UiEventKind::FocusOut, target);
        event.related_target = related;
        event
    }

    pub fn event_type(&self) -> &'static str {
        self.kind.name()
    }

    /// Keyboard payload, if this is a keydown
    pub fn key(&self) -> Option<&KeyboardInput> {
        match &self.kind {
            UiEventKind::KeyDown(input) => Some(input),
            _ => None,
        }
    }

    /// Prevent default action
    pub fn prevent_default(&mut self) {
        if self.cancelable {
            self.default_prevented = true;
        }
    }

    /// Stop propagation
    pub fn stop_propagation(&mut self) {
        self.propagation_stopped = true;
    }

    /// Prevent default and stop propagation
    pub fn consume(&mut self) {
        self.prevent_default();
        self.stop_propagation();
    }

    pub fn is_default_prevented(&self) -> bool {
        self.default_prevented
    }

    pub fn is_propagation_stopped(&self) -> bool {
        self.propagation_stopped
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pointer_events_do_not_bubble() {
        let event = UiEvent::new(UiEventKind::PointerEnter, NodeId(1));
        assert!(!event.bubbles);
        assert!(UiEvent::click(NodeId(1)).bubbles);
    }

    #[test]
    fn test_consume() {
        let mut event = UiEvent::key_down(NodeId(1), KeyboardInput::new("Enter"));
        event.consume();
        assert!(event.is_default_prevented());
        assert!(event.is_propagation_stopped());
        assert_eq!(event.event_type(), "keydown");
    }

    #[test]
    fn test_focus_not_cancelable() {
        let mut event = UiEvent::focus_in(NodeId(1), None);
        event.prevent_default();
        assert!(!event.is_default_prevented());
    }
}
