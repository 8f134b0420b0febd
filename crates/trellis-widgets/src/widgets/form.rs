//! Form
//!
//! Owns every form-associated widget below it. Submitting touches and
//! validates each control and announces `form-submit` with the error map.
//! In async mode the form stays busy until `finish_submit` is called.

use std::collections::HashSet;
use std::future::Future;

use serde_json::{Map, Value};
use trellis_a11y::{AriaRole, AttributeSet};
use trellis_dom::{Binding, NodeId, UiEvent, UiEventKind};
use trellis_forms::{Form as FormState, FormControl, SubmitReport};

use crate::notify::NotificationKind;
use crate::{Context, WidgetError};

const ROOT: Binding = Binding::closest("form", "trellis-form");
const SUBMITS: Binding = Binding::all("submits", "trellis-form-submit");

/// Connected form controls below `form`, in tree order
pub fn controls(ctx: &Context, form: NodeId) -> Vec<NodeId> {
    ctx.dom
        .descendants(form)
        .into_iter()
        .filter(|n| ctx.state.controls.contains_key(n))
        .filter(|&n| ctx.component(n).is_some_and(|c| c.connected))
        .collect()
}

pub fn is_busy(ctx: &Context, form: NodeId) -> bool {
    ctx.state.forms.get(&form).is_some_and(FormState::is_busy)
}

pub fn is_disabled(ctx: &Context, form: NodeId) -> bool {
    ctx.state.forms.get(&form).is_some_and(FormState::is_disabled)
}

pub(crate) fn connected(ctx: &mut Context, form: NodeId) {
    let disabled = ctx.flag(form, "disabled");
    ctx.state.forms.entry(form).or_default().set_disabled(disabled);
    sync(ctx, form);
}

pub(crate) fn sync_from(ctx: &mut Context, node: NodeId) {
    match ctx.query_one(node, &ROOT) {
        Some(form) => sync(ctx, form),
        None => tracing::debug!("Submit control {:?} is outside a form", node),
    }
}

fn sync(ctx: &mut Context, form: NodeId) {
    let busy = is_busy(ctx, form);
    let disabled = is_disabled(ctx, form);
    ctx.sync_attrs(
        form,
        &AttributeSet::new()
            .set_bool("aria-disabled", disabled)
            .set_opt("aria-busy", busy.then_some("true")),
    );
    let buttons = AttributeSet::new()
        .role(AriaRole::Button)
        .tabindex(if disabled { -1 } else { 0 })
        .set_bool("aria-disabled", disabled);
    for button in ctx.query_all(form, &SUBMITS) {
        ctx.sync_attrs(button, &buttons);
    }
}

pub(crate) fn attribute_changed(ctx: &mut Context, form: NodeId, name: &str) {
    if name == "disabled" {
        let disabled = ctx.flag(form, "disabled");
        if let Some(state) = ctx.state.forms.get_mut(&form) {
            state.set_disabled(disabled);
        }
    }
    sync(ctx, form);
}

/// Run `f` over the form state and its controls, then flush control events
fn with_controls<R>(
    ctx: &mut Context,
    form: NodeId,
    f: impl FnOnce(&mut FormState, Vec<&mut FormControl>) -> R,
) -> Option<R> {
    let nodes = controls(ctx, form);
    for &node in &nodes {
        ctx.adopt_name(node);
    }
    let owned: HashSet<NodeId> = nodes.iter().copied().collect();
    let state = &mut ctx.state;
    let result = state.forms.get_mut(&form).map(|form_state| {
        let selected = state
            .controls
            .iter_mut()
            .filter(|(node, _)| owned.contains(node))
            .map(|(_, control)| control)
            .collect();
        f(form_state, selected)
    });
    for node in nodes {
        ctx.after_control_change(node);
    }
    result
}

/// Synchronous submit. `None` when the form is disabled or busy.
pub fn submit(ctx: &mut Context, form: NodeId) -> Option<SubmitReport> {
    let report = with_controls(ctx, form, |state, controls| state.submit(controls)).flatten()?;
    ctx.emit(
        form,
        NotificationKind::FormSubmit {
            errors: report.errors.clone(),
        },
    );
    Some(report)
}

/// Start an async submit; a valid form goes busy until `finish_submit`
pub fn begin_submit(ctx: &mut Context, form: NodeId) -> Result<SubmitReport, WidgetError> {
    let report = with_controls(ctx, form, |state, controls| state.begin(controls))
        .ok_or(WidgetError::UnknownWidget(form))??;
    sync(ctx, form);
    ctx.emit(
        form,
        NotificationKind::FormSubmit {
            errors: report.errors.clone(),
        },
    );
    Ok(report)
}

/// Re-enable a form after an async submit
pub fn finish_submit(ctx: &mut Context, form: NodeId) {
    let Some(state) = ctx.state.forms.get_mut(&form) else {
        return;
    };
    if state.is_busy() {
        state.finish();
        sync(ctx, form);
    }
}

/// Submit and, when every control is valid, await `handler` with the
/// collected values. The form is busy until the handler resolves.
pub async fn submit_async<F, Fut>(ctx: &mut Context, form: NodeId, handler: F) -> Result<SubmitReport, WidgetError>
where
    F: FnOnce(Map<String, Value>) -> Fut,
    Fut: Future<Output = anyhow::Result<()>>,
{
    let report = begin_submit(ctx, form)?;
    if !report.is_valid() {
        return Ok(report);
    }
    let result = handler(report.values.clone()).await;
    finish_submit(ctx, form);
    result.map_err(WidgetError::Handler)?;
    Ok(report)
}

pub(crate) fn handle_submit_event(ctx: &mut Context, button: NodeId, event: &mut UiEvent) {
    if !matches!(event.kind, UiEventKind::Click) {
        return;
    }
    let Some(form) = ctx.query_one(button, &ROOT) else {
        tracing::debug!("Submit control {:?} is outside a form", button);
        return;
    };
    if ctx.flag(form, "async") {
        if let Err(e) = begin_submit(ctx, form) {
            tracing::debug!("Submit of {:?} ignored: {}", form, e);
        }
    } else {
        submit(ctx, form);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::collections::BTreeMap;
    use trellis_forms::Constraints;

    struct Fixture {
        ctx: Context,
        form: NodeId,
        email: NodeId,
        agree: NodeId,
        button: NodeId,
    }

    fn fixture(attrs: &[(&str, &str)]) -> Fixture {
        let mut ctx = Context::new();
        let form = ctx.create_element("trellis-form");
        for (name, value) in attrs {
            ctx.set_attribute(form, name, value).unwrap();
        }
        let email = ctx.create_element("trellis-input");
        ctx.set_attribute(email, "name", "email").unwrap();
        let agree = ctx.create_element("trellis-checkbox");
        ctx.set_attribute(agree, "name", "agree").unwrap();
        let button = ctx.create_element("trellis-form-submit");
        ctx.append_child(form, email).unwrap();
        ctx.append_child(form, agree).unwrap();
        ctx.append_child(form, button).unwrap();
        ctx.append_child(ctx.document(), form).unwrap();
        ctx.set_schema(email, Constraints::new().required()).unwrap();
        Fixture {
            ctx,
            form,
            email,
            agree,
            button,
        }
    }

    fn submits(ctx: &Context) -> Vec<BTreeMap<String, String>> {
        ctx.notifications()
            .log()
            .iter()
            .filter_map(|n| match &n.kind {
                NotificationKind::FormSubmit { errors } => Some(errors.clone()),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_invalid_submit_reports_errors() {
        let Fixture {
            mut ctx, form, email, ..
        } = fixture(&[]);
        let report = submit(&mut ctx, form).unwrap();
        assert!(!report.is_valid());
        assert!(report.errors.contains_key("email"));
        assert!(ctx.control(email).unwrap().touched());
        assert_eq!(ctx.get_attribute(email, "aria-invalid"), Some("true"));
        assert_eq!(submits(&ctx).len(), 1);
        assert!(!submits(&ctx)[0].is_empty());
    }

    #[test]
    fn test_valid_submit_collects_values() {
        let Fixture {
            mut ctx,
            form,
            email,
            agree,
            ..
        } = fixture(&[]);
        ctx.input(email, "a@b.c");
        ctx.click(agree);
        let report = submit(&mut ctx, form).unwrap();
        assert!(report.is_valid());
        assert_eq!(report.values.get("email"), Some(&json!("a@b.c")));
        assert_eq!(report.values.get("agree"), Some(&json!(true)));
        assert!(submits(&ctx)[0].is_empty());
    }

    #[test]
    fn test_disabled_form_emits_nothing() {
        let Fixture {
            mut ctx, form, button, ..
        } = fixture(&[("disabled", "")]);
        assert_eq!(ctx.get_attribute(form, "aria-disabled"), Some("true"));
        assert_eq!(ctx.get_attribute(button, "aria-disabled"), Some("true"));
        assert_eq!(submit(&mut ctx, form), None);
        ctx.click(button);
        assert!(submits(&ctx).is_empty());

        ctx.remove_attribute(form, "disabled").unwrap();
        ctx.click(button);
        assert_eq!(submits(&ctx).len(), 1);
    }

    #[test]
    fn test_async_mode_stays_busy_until_finished() {
        let Fixture {
            mut ctx,
            form,
            email,
            button,
            ..
        } = fixture(&[("async", "")]);
        ctx.input(email, "a@b.c");
        ctx.click(button);
        assert!(is_busy(&ctx, form));
        assert_eq!(ctx.get_attribute(form, "aria-busy"), Some("true"));

        ctx.click(button);
        assert_eq!(submits(&ctx).len(), 1);
        assert!(matches!(
            begin_submit(&mut ctx, form),
            Err(WidgetError::Form(trellis_forms::FormError::Busy))
        ));

        finish_submit(&mut ctx, form);
        assert!(!is_busy(&ctx, form));
        assert_eq!(ctx.get_attribute(form, "aria-busy"), None);
    }

    #[test]
    fn test_submit_async_runs_handler_when_valid() {
        let Fixture {
            mut ctx, form, email, ..
        } = fixture(&[]);

        let mut calls = 0;
        let report = smol::block_on(submit_async(&mut ctx, form, |_| {
            calls += 1;
            async { anyhow::Ok(()) }
        }))
        .unwrap();
        assert!(!report.is_valid());
        assert_eq!(calls, 0);

        ctx.input(email, "a@b.c");
        let report = smol::block_on(submit_async(&mut ctx, form, |values| async move {
            assert_eq!(values.get("email"), Some(&json!("a@b.c")));
            anyhow::Ok(())
        }))
        .unwrap();
        assert!(report.is_valid());
        assert!(!is_busy(&ctx, form));
    }

    #[test]
    fn test_submit_async_handler_error_releases_form() {
        let Fixture {
            mut ctx, form, email, ..
        } = fixture(&[]);
        ctx.input(email, "a@b.c");
        let result = smol::block_on(submit_async(&mut ctx, form, |_| async {
            Err::<(), _>(anyhow::anyhow!("server down"))
        }));
        assert!(matches!(result, Err(WidgetError::Handler(_))));
        assert!(!is_busy(&ctx, form));
    }
}
