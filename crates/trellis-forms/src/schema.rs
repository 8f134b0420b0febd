//! Schema Validation
//!
//! Anything exposing `validate(value) -> [error, value]` can back a form
//! control. The returned value is what the control stores as validated.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// `[error, value]` pair produced by a schema
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Validation {
    pub error: Option<String>,
    pub value: Value,
}

impl Validation {
    pub fn ok(value: Value) -> Self {
        Self { error: None, value }
    }

    pub fn fail(error: impl Into<String>, value: Value) -> Self {
        Self {
            error: Some(error.into()),
            value,
        }
    }

    pub fn is_valid(&self) -> bool {
        self.error.is_none()
    }
}

/// Schema validation collaborator
pub trait Schema {
    fn validate(&self, value: &Value) -> Validation;
}

/// Whether a value counts as missing for `required`
fn is_missing(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::String(s) => s.is_empty(),
        Value::Array(a) => a.is_empty(),
        _ => false,
    }
}

/// Declarative constraints
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct Constraints {
    pub required: bool,
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub min_length: Option<usize>,
    pub max_length: Option<usize>,
    pub step: Option<f64>,
}

impl Constraints {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn length(mut self, min: Option<usize>, max: Option<usize>) -> Self {
        self.min_length = min;
        self.max_length = max;
        self
    }

    pub fn range(mut self, min: Option<f64>, max: Option<f64>) -> Self {
        self.min = min;
        self.max = max;
        self
    }

    pub fn step(mut self, step: f64) -> Self {
        self.step = Some(step);
        self
    }

    fn check(&self, value: &Value) -> Option<String> {
        if is_missing(value) {
            return self.required.then(|| "This field is required".to_string());
        }

        let length = match value {
            Value::String(s) => Some(s.chars().count()),
            Value::Array(a) => Some(a.len()),
            _ => None,
        };
        if let Some(len) = length {
            if let Some(min) = self.min_length.filter(|&m| len < m) {
                return Some(format!("Must be at least {min} characters"));
            }
            if let Some(max) = self.max_length.filter(|&m| len > m) {
                return Some(format!("Must be at most {max} characters"));
            }
        }

        if let Some(n) = value.as_f64() {
            if let Some(min) = self.min.filter(|&m| n < m) {
                return Some(format!("Must be greater than or equal to {min}"));
            }
            if let Some(max) = self.max.filter(|&m| n > m) {
                return Some(format!("Must be less than or equal to {max}"));
            }
            if let Some(step) = self.step.filter(|&s| s > 0.0) {
                let base = self.min.unwrap_or(0.0);
                let steps = (n - base) / step;
                if (steps - steps.round()).abs() > 1e-9 {
                    return Some(format!("Must be a multiple of {step}"));
                }
            }
        }
        None
    }
}

impl Schema for Constraints {
    fn validate(&self, value: &Value) -> Validation {
        match self.check(value) {
            Some(error) => Validation::fail(error, value.clone()),
            None => Validation::ok(value.clone()),
        }
    }
}

/// Closure-backed schema
pub struct FnSchema<F>(pub F);

impl<F> Schema for FnSchema<F>
where
    F: Fn(&Value) -> Validation,
{
    fn validate(&self, value: &Value) -> Validation {
        (self.0)(value)
    }
}

impl<F> fmt::Debug for FnSchema<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("FnSchema")
    }
}
