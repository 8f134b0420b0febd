//! Trellis Widgets
//!
//! ARIA interaction-state engine. Each widget is a small state machine
//! attached to a headless element; transitions re-derive the ARIA
//! attributes of the widget and its relatives, then announce themselves on
//! the notification bus.
//!
//! Features:
//! - Host context with lifecycle callbacks and event routing
//! - Virtual-time interval scheduler for carousel rotation
//! - Carousel, accordion, tabs, radio group, checkbox, button
//! - Listbox, combobox, menu and menubar with swappable typeahead
//! - Slider, tooltip, dialog, text input, form and icon

pub mod config;
pub mod context;
pub mod notify;
pub mod scheduler;
pub mod widgets;

pub use config::{Config, ConfigError};
pub use context::{Component, Context};
pub use notify::{Notification, NotificationBus, NotificationKind};
pub use scheduler::{Fired, Scheduler, TimerHandle};
pub use widgets::icon::{IconCache, IconFetcher, IconSource};
pub use widgets::{MatchPredicate, WidgetKind, default_predicate};

use trellis_dom::NodeId;

/// Widget error
#[derive(Debug, thiserror::Error)]
pub enum WidgetError {
    #[error("Node {0:?} is not a widget")]
    UnknownWidget(NodeId),

    #[error("Node {0:?} is not a form control")]
    NotAFormControl(NodeId),

    #[error("DOM error: {0}")]
    Dom(#[from] trellis_dom::DomError),

    #[error("Form error: {0}")]
    Form(#[from] trellis_forms::FormError),

    #[error("Definition error: {0}")]
    Definition(#[from] trellis_dom::CustomElementError),

    #[error("Button press already in progress")]
    Busy,

    #[error("Widget is disabled")]
    Disabled,

    #[error("Handler failed: {0}")]
    Handler(#[source] anyhow::Error),
}
