//! Form Submission
//!
//! Submitting touches and validates every control, then aggregates errors
//! by control name. Async submission keeps the form disabled while the
//! handler runs.

use std::collections::BTreeMap;
use std::future::Future;

use serde::Serialize;
use serde_json::{Map, Value};

use crate::FormError;
use crate::control::FormControl;

/// Outcome of a submit
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SubmitReport {
    /// Control name (else id, else `#position`) -> error message; empty
    /// when every control is valid
    pub errors: BTreeMap<String, String>,
    /// Control name -> value for named controls
    pub values: Map<String, Value>,
}

impl SubmitReport {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Form state
#[derive(Debug, Default)]
pub struct Form {
    disabled: bool,
    busy: bool,
}

impl Form {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_disabled(&self) -> bool {
        self.disabled || self.busy
    }

    pub fn set_disabled(&mut self, disabled: bool) {
        self.disabled = disabled;
    }

    /// An async submission is in flight
    pub fn is_busy(&self) -> bool {
        self.busy
    }

    /// Touch, validate and aggregate every control
    pub fn collect<'a, I>(controls: I) -> SubmitReport
    where
        I: IntoIterator<Item = &'a mut FormControl>,
    {
        let mut report = SubmitReport::default();
        for (position, control) in controls.into_iter().enumerate() {
            control.touch();
            if let Some(error) = control.error() {
                let key = control.key().map_or_else(|| format!("#{position}"), str::to_string);
                report.errors.insert(key, error.to_string());
            }
            if let Some(name) = control.name().filter(|n| !n.is_empty()) {
                report.values.insert(name.to_string(), control.value());
            }
        }
        report
    }

    /// Synchronous submit. `None` when the form is disabled: nothing escapes.
    pub fn submit<'a, I>(&self, controls: I) -> Option<SubmitReport>
    where
        I: IntoIterator<Item = &'a mut FormControl>,
    {
        if self.is_disabled() {
            tracing::debug!("Submit ignored: form disabled");
            return None;
        }
        Some(Self::collect(controls))
    }

    /// First half of an async submit: aggregate, and go busy when valid
    pub fn begin<'a, I>(&mut self, controls: I) -> Result<SubmitReport, FormError>
    where
        I: IntoIterator<Item = &'a mut FormControl>,
    {
        if self.busy {
            return Err(FormError::Busy);
        }
        if self.disabled {
            return Err(FormError::Disabled);
        }
        let report = Self::collect(controls);
        self.busy = report.is_valid();
        Ok(report)
    }

    /// Second half of an async submit: re-enable the form
    pub fn finish(&mut self) {
        self.busy = false;
    }

    /// Submit and, when valid, await `handler` with the collected values.
    /// The form stays busy until the handler resolves, success or not.
    pub async fn submit_with<'a, I, F, Fut>(&mut self, controls: I, handler: F) -> Result<SubmitReport, FormError>
    where
        I: IntoIterator<Item = &'a mut FormControl>,
        F: FnOnce(Map<String, Value>) -> Fut,
        Fut: Future<Output = anyhow::Result<()>>,
    {
        let report = self.begin(controls)?;
        if !report.is_valid() {
            return Ok(report);
        }
        let result = handler(report.values.clone()).await;
        self.finish();
        result.map_err(FormError::Handler)?;
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::Constraints;
    use serde_json::json;

    fn controls() -> Vec<FormControl> {
        vec![
            FormControl::new().with_name("email").with_schema(Constraints::new().required()),
            FormControl::new().with_name("age").with_schema(Constraints::new().range(Some(18.0), None)),
        ]
    }

    #[test]
    fn test_submit_aggregates_errors() {
        let mut controls = controls();
        let report = Form::new().submit(controls.iter_mut()).unwrap();
        assert_eq!(report.errors.keys().collect::<Vec<_>>(), vec!["email"]);
        assert!(controls.iter().all(FormControl::touched));
    }

    #[test]
    fn test_unnamed_errors_do_not_collide() {
        let required = || Constraints::new().required();
        let mut controls = vec![
            FormControl::new().with_schema(required()),
            FormControl::new().with_id("phone").with_schema(required()),
            FormControl::new().with_schema(required()),
        ];
        let report = Form::new().submit(controls.iter_mut()).unwrap();
        assert_eq!(report.errors.keys().collect::<Vec<_>>(), vec!["#0", "#2", "phone"]);
        assert!(report.values.is_empty());
    }

    #[test]
    fn test_submit_valid() {
        let mut controls = controls();
        controls[0].set_value(json!("a@b.c"));
        controls[1].set_value(json!(30));
        let report = Form::new().submit(controls.iter_mut()).unwrap();
        assert!(report.is_valid());
        assert_eq!(report.values["age"], json!(30));
    }

    #[test]
    fn test_disabled_form_emits_nothing() {
        let mut controls = controls();
        let mut form = Form::new();
        form.set_disabled(true);
        assert!(form.submit(controls.iter_mut()).is_none());
        assert!(!controls[0].touched());
    }

    #[test]
    fn test_async_submit_runs_handler_only_when_valid() {
        let mut controls = controls();
        let mut form = Form::new();
        let mut called = false;
        let report = smol::block_on(form.submit_with(controls.iter_mut(), |_| {
            called = true;
            async { anyhow::Ok(()) }
        }))
        .unwrap();
        assert!(!report.is_valid());
        assert!(!called);
        assert!(!form.is_busy());
    }

    #[test]
    fn test_async_submit_handler_error() {
        let mut controls = controls();
        controls[0].set_value(json!("x"));
        controls[1].set_value(json!(20));
        let mut form = Form::new();
        let result = smol::block_on(form.submit_with(controls.iter_mut(), |values| async move {
            assert_eq!(values["email"], json!("x"));
            Err::<(), _>(anyhow::anyhow!("server rejected"))
        }));
        assert!(matches!(result, Err(FormError::Handler(_))));
        assert!(!form.is_disabled());
    }

    #[test]
    fn test_begin_and_finish() {
        let mut controls = controls();
        controls[0].set_value(json!("x"));
        let mut form = Form::new();
        assert!(form.begin(controls.iter_mut()).unwrap().is_valid());
        assert!(form.is_disabled());
        assert!(matches!(form.begin(controls.iter_mut()), Err(FormError::Busy)));
        form.finish();
        assert!(!form.is_disabled());
    }
}
