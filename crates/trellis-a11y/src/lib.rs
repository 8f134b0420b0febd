//! Trellis Accessibility
//!
//! The ARIA layer shared by every Trellis widget.
//!
//! Features:
//! - ARIA roles and live-region politeness
//! - Idempotent attribute synchronization
//! - Roving index navigation (wrap, clamp, none)
//! - Key parsing and keyboard dispatch tables

pub mod aria;
pub mod focus;
pub mod keyboard;
pub mod sync;

pub use aria::{AriaRole, Politeness};
pub use focus::{NavigationPolicy, RovingIndex, TabIndex};
pub use keyboard::{Key, KeyDispatch};
pub use sync::{AttributeSet, synchronize, synchronize_relative};

/// Accessibility error
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum A11yError {
    #[error("Invalid ARIA role: {0}")]
    InvalidRole(String),

    #[error("Invalid politeness level: {0}")]
    InvalidPoliteness(String),
}
