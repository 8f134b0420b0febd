//! Notifications
//!
//! Every state transition announces itself with a typed, named
//! notification. Attribute synchronization for the transition has already
//! completed when listeners run, so they observe the updated tree.

use std::collections::BTreeMap;
use std::fmt;

use trellis_dom::{DomTree, NodeId};

/// Notification payloads
#[derive(Debug, Clone, PartialEq)]
pub enum NotificationKind {
    // Carousel
    SlideActivate { previous: Option<NodeId> },
    SlideDeactivate,
    TabActivate { previous: Option<NodeId> },
    TabDeactivate,
    RotationStart,
    RotationStop,
    RotationPause,
    RotationResume,

    // Accordion
    SectionExpand,
    SectionCollapse,

    // Selection
    Check,
    Uncheck,
    TabSelect,
    TabUnselect,
    OptionSelect,
    OptionUnselect,

    // Form controls
    StateChange,
    FormControlChange,
    FormSubmit { errors: BTreeMap<String, String> },

    // Buttons and menus
    ButtonClick,
    MenuItemClick,
    MenuOpen,
    MenuClose,

    // Popups
    ComboboxExpand,
    ComboboxCollapse,
    TooltipShow,
    TooltipHide,
    DialogOpen,
    DialogClose,

    SliderChange { value: f64 },
    IconLoad,
}

impl NotificationKind {
    /// Event name as announced to listeners
    pub fn name(&self) -> &'static str {
        match self {
            Self::SlideActivate { .. } => "slide-activate",
            Self::SlideDeactivate => "slide-deactivate",
            Self::TabActivate { .. } => "tab-activate",
            Self::TabDeactivate => "tab-deactivate",
            Self::RotationStart => "rotation-start",
            Self::RotationStop => "rotation-stop",
            Self::RotationPause => "rotation-pause",
            Self::RotationResume => "rotation-resume",
            Self::SectionExpand => "section-expand",
            Self::SectionCollapse => "section-collapse",
            Self::Check => "check",
            Self::Uncheck => "uncheck",
            Self::TabSelect => "tab-select",
            Self::TabUnselect => "tab-unselect",
            Self::OptionSelect => "option-select",
            Self::OptionUnselect => "option-unselect",
            Self::StateChange => "state-change",
            Self::FormControlChange => "form-control-change",
            Self::FormSubmit { .. } => "form-submit",
            Self::ButtonClick => "button-click",
            Self::MenuItemClick => "menu-item-click",
            Self::MenuOpen => "menu-open",
            Self::MenuClose => "menu-close",
            Self::ComboboxExpand => "combobox-expand",
            Self::ComboboxCollapse => "combobox-collapse",
            Self::TooltipShow => "tooltip-show",
            Self::TooltipHide => "tooltip-hide",
            Self::DialogOpen => "dialog-open",
            Self::DialogClose => "dialog-close",
            Self::SliderChange { .. } => "slider-change",
            Self::IconLoad => "icon-load",
        }
    }
}

/// A notification raised on a widget element
#[derive(Debug, Clone, PartialEq)]
pub struct Notification {
    pub kind: NotificationKind,
    pub target: NodeId,
}

impl Notification {
    pub fn name(&self) -> &'static str {
        self.kind.name()
    }
}

type Listener = Box<dyn FnMut(&Notification, &DomTree)>;

/// Ordered notification log plus listeners
#[derive(Default)]
pub struct NotificationBus {
    log: Vec<Notification>,
    listeners: Vec<Listener>,
}

impl fmt::Debug for NotificationBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NotificationBus")
            .field("log", &self.log)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

impl NotificationBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Listeners see each notification with read access to the tree
    pub fn subscribe(&mut self, listener: impl FnMut(&Notification, &DomTree) + 'static) {
        self.listeners.push(Box::new(listener));
    }

    pub fn emit(&mut self, tree: &DomTree, notification: Notification) {
        tracing::trace!("{} on {:?}", notification.name(), notification.target);
        for listener in &mut self.listeners {
            listener(&notification, tree);
        }
        self.log.push(notification);
    }

    pub fn log(&self) -> &[Notification] {
        &self.log
    }

    pub fn take(&mut self) -> Vec<Notification> {
        std::mem::take(&mut self.log)
    }

    /// Names of the logged notifications, in order
    pub fn names(&self) -> Vec<&'static str> {
        self.log.iter().map(Notification::name).collect()
    }

    pub fn count(&self, name: &str) -> usize {
        self.log.iter().filter(|n| n.name() == name).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn test_listeners_and_log() {
        let tree = DomTree::new();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let mut bus = NotificationBus::new();
        let sink = seen.clone();
        bus.subscribe(move |n, _| sink.borrow_mut().push(n.name()));

        bus.emit(&tree, Notification { kind: NotificationKind::Check, target: NodeId::ROOT });
        bus.emit(
            &tree,
            Notification { kind: NotificationKind::SliderChange { value: 3.0 }, target: NodeId::ROOT },
        );

        assert_eq!(*seen.borrow(), vec!["check", "slider-change"]);
        assert_eq!(bus.names(), vec!["check", "slider-change"]);
        assert_eq!(bus.count("check"), 1);
        assert_eq!(bus.take().len(), 2);
        assert!(bus.log().is_empty());
    }
}
