//! Trellis Forms
//!
//! The value/validation contract shared by every input-like widget.
//!
//! Features:
//! - Pluggable schemas returning `[error, value]`
//! - Form controls with slot or external-target storage
//! - Id/uid and (target, path) keyed collectors
//! - Sync and async form submission

pub mod collector;
pub mod control;
pub mod form;
pub mod path;
pub mod schema;

pub use collector::{Collector, FormControlCollector, TargetKey};
pub use control::{ControlEvent, FormControl, Target};
pub use form::{Form, SubmitReport};
pub use schema::{Constraints, FnSchema, Schema, Validation};

/// Form values are JSON values; "undefined" is `Value::Null`
pub use serde_json::Value;

/// Form error
#[derive(Debug, thiserror::Error)]
pub enum FormError {
    #[error("Form is disabled")]
    Disabled,

    #[error("Form submission already in progress")]
    Busy,

    #[error("Submit handler failed: {0}")]
    Handler(#[source] anyhow::Error),
}
