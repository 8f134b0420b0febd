//! Form Controls
//!
//! Value storage, touched tracking and schema validation for input-like
//! widgets. A control reads and writes either its own slot or, when bound,
//! a path inside an external target object; the external target wins.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use serde_json::Value;

use crate::path;
use crate::schema::{Schema, Validation};

/// Shared external object a control reflects its value into
pub type Target = Rc<RefCell<Value>>;

/// Notifications a control raises for its owner to forward
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlEvent {
    /// Generic state change (re-render)
    StateChanged,
    /// The value changed; owning forms aggregate on this
    ControlChanged,
}

/// Form control value/validation behavior
#[derive(Default)]
pub struct FormControl {
    name: Option<String>,
    id: Option<String>,
    slot: Value,
    target: Option<Target>,
    path: Option<String>,
    touched: bool,
    schema: Option<Rc<dyn Schema>>,
    validation: Validation,
    events: Vec<ControlEvent>,
}

impl fmt::Debug for FormControl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FormControl")
            .field("name", &self.name)
            .field("id", &self.id)
            .field("value", &self.value())
            .field("path", &self.path)
            .field("touched", &self.touched)
            .field("has_schema", &self.schema.is_some())
            .field("validation", &self.validation)
            .finish()
    }
}

impl FormControl {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_name(mut self, name: &str) -> Self {
        self.name = Some(name.to_string());
        self
    }

    pub fn with_schema(mut self, schema: impl Schema + 'static) -> Self {
        self.set_schema(Some(Rc::new(schema)));
        self
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn set_name(&mut self, name: Option<&str>) {
        self.name = name.map(str::to_string);
    }

    pub fn with_id(mut self, id: &str) -> Self {
        self.id = Some(id.to_string());
        self
    }

    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    pub fn set_id(&mut self, id: Option<&str>) {
        self.id = id.map(str::to_string);
    }

    /// Key in submit reports: the name, else the id
    pub fn key(&self) -> Option<&str> {
        self.name().filter(|n| !n.is_empty()).or(self.id())
    }

    /// Replace the schema and re-validate against it
    pub fn set_schema(&mut self, schema: Option<Rc<dyn Schema>>) {
        self.schema = schema;
        self.validate();
    }

    /// Reflect the value into `target` at `path`
    pub fn bind(&mut self, target: Target, path: &str) {
        self.target = Some(target);
        self.path = Some(path.to_string());
        self.validate();
    }

    pub fn unbind(&mut self) {
        self.target = None;
        self.path = None;
        self.validate();
    }

    pub fn target(&self) -> Option<&Target> {
        self.target.as_ref()
    }

    pub fn path(&self) -> Option<&str> {
        self.path.as_deref()
    }

    fn external(&self) -> Option<(&Target, &str)> {
        Some((self.target.as_ref()?, self.path.as_deref()?))
    }

    /// Current value; `Value::Null` when unset
    pub fn value(&self) -> Value {
        match self.external() {
            Some((target, path)) => path::get(&target.borrow(), path).cloned().unwrap_or(Value::Null),
            None => self.slot.clone(),
        }
    }

    /// Write the value, validate, and raise both change events
    pub fn set_value(&mut self, value: Value) {
        match self.external() {
            Some((target, path)) => path::set(&mut target.borrow_mut(), path, value),
            None => self.slot = value,
        }
        self.validate();
        self.events.push(ControlEvent::StateChanged);
        self.events.push(ControlEvent::ControlChanged);
    }

    /// Reset to undefined and re-validate
    pub fn clear(&mut self) {
        self.set_value(Value::Null);
    }

    pub fn touched(&self) -> bool {
        self.touched
    }

    /// Mark touched and re-validate
    pub fn touch(&mut self) {
        self.touched = true;
        self.validate();
        self.events.push(ControlEvent::StateChanged);
    }

    pub fn untouch(&mut self) {
        self.touched = false;
    }

    /// Run the schema against the current value and store `[error, value]`
    pub fn validate(&mut self) -> &Validation {
        let value = self.value();
        self.validation = match &self.schema {
            Some(schema) => schema.validate(&value),
            None => Validation::ok(value),
        };
        if let Some(error) = &self.validation.error {
            tracing::trace!("Control {:?} invalid: {}", self.name, error);
        }
        &self.validation
    }

    pub fn validation(&self) -> &Validation {
        &self.validation
    }

    pub fn error(&self) -> Option<&str> {
        self.validation.error.as_deref()
    }

    /// Error present and the user has interacted with the control
    pub fn is_error_visible(&self) -> bool {
        self.touched && self.validation.error.is_some()
    }

    pub fn is_valid(&self) -> bool {
        self.validation.error.is_none()
    }

    /// Take the events raised since the last drain
    pub fn drain_events(&mut self) -> Vec<ControlEvent> {
        std::mem::take(&mut self.events)
    }
}
