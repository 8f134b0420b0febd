//! Trellis
//!
//! Headless ARIA widget state engine. Widgets are small state machines
//! attached to elements of an in-memory tree; every transition re-derives
//! the ARIA attributes of the widget and its relatives before announcing
//! itself.
//!
//! # Example
//! ```rust,ignore
//! use trellis::prelude::*;
//!
//! let mut ctx = Context::new();
//! let carousel = ctx.create_element("trellis-carousel");
//! ctx.set_attribute(carousel, "automatic-rotation", "")?;
//! ctx.append_child(ctx.document(), carousel)?;
//! ctx.advance(5000);
//! ```

// Re-export sub-crates for advanced usage
pub use trellis_a11y as a11y;
pub use trellis_dom as dom;
pub use trellis_forms as forms;
pub use trellis_widgets as widgets;

pub use trellis_dom::{NodeId, Uid};
pub use trellis_forms::{Constraints, FnSchema, Schema, SubmitReport, Validation};
pub use trellis_widgets::{
    Config, ConfigError, Context, IconCache, IconFetcher, IconSource, Notification, NotificationKind,
    WidgetError, WidgetKind,
};

/// Common imports for embedding applications
pub mod prelude {
    pub use trellis_dom::NodeId;
    pub use trellis_forms::{Constraints, Schema};
    pub use trellis_widgets::widgets::{
        accordion, button, carousel, checkbox, combobox, dialog, form, icon, input, listbox, menu,
        radio_group, slider, tabs, tooltip,
    };
    pub use trellis_widgets::{Config, Context, Notification, NotificationKind, WidgetError, WidgetKind};
}

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
