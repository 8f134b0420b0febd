//! Integration tests - widget behavior through the public API
//!
//! Rotation timing, wraparound, pause/resume, accordion expansion rules,
//! form submission, validation round-trips and collector lookups.

use std::cell::RefCell;
use std::rc::Rc;

use serde_json::{Value, json};
use trellis::dom::UidGenerator;
use trellis::forms::{Collector, FormControlCollector, Target};
use trellis::prelude::*;

// ============================================================================
// FIXTURES
// ============================================================================

struct Carousel {
    ctx: Context,
    root: NodeId,
    slides: Vec<NodeId>,
    control: NodeId,
}

fn build_carousel(count: usize, attrs: &[(&str, &str)]) -> Carousel {
    let mut ctx = Context::new();
    let root = ctx.create_element("trellis-carousel");
    for (name, value) in attrs {
        ctx.set_attribute(root, name, value).unwrap();
    }
    let control = ctx.create_element("trellis-carousel-rotation-control");
    ctx.append_child(root, control).unwrap();
    let container = ctx.create_element("trellis-carousel-slides");
    let mut slides = Vec::new();
    for i in 0..count {
        let slide = ctx.create_element("trellis-carousel-slide");
        if i == 0 {
            ctx.set_attribute(slide, "active", "").unwrap();
        }
        ctx.append_child(container, slide).unwrap();
        slides.push(slide);
    }
    ctx.append_child(root, container).unwrap();
    ctx.append_child(ctx.document(), root).unwrap();
    Carousel {
        ctx,
        root,
        slides,
        control,
    }
}

fn activations(ctx: &Context) -> usize {
    ctx.notifications().count("slide-activate")
}

struct Accordion {
    ctx: Context,
    sections: Vec<NodeId>,
    buttons: Vec<NodeId>,
}

fn build_accordion(count: usize, only_one: bool) -> Accordion {
    let mut ctx = Context::new();
    let root = ctx.create_element("trellis-accordion");
    if only_one {
        ctx.set_attribute(root, "allow-only-one-expanded-section", "").unwrap();
    }
    let mut sections = Vec::new();
    let mut buttons = Vec::new();
    for _ in 0..count {
        let section = ctx.create_element("trellis-accordion-section");
        let header = ctx.create_element("trellis-accordion-header");
        let button = ctx.create_element("trellis-accordion-button");
        let panel = ctx.create_element("trellis-accordion-panel");
        ctx.append_child(header, button).unwrap();
        ctx.append_child(section, header).unwrap();
        ctx.append_child(section, panel).unwrap();
        ctx.append_child(root, section).unwrap();
        sections.push(section);
        buttons.push(button);
    }
    ctx.append_child(ctx.document(), root).unwrap();
    Accordion {
        ctx,
        sections,
        buttons,
    }
}

// ============================================================================
// CAROUSEL BOUNDARIES
// ============================================================================

#[test]
fn test_bounded_carousel_stops_at_both_ends() {
    for count in 1..=4 {
        let Carousel {
            mut ctx, root, slides, ..
        } = build_carousel(count, &[]);

        carousel::activate_previous(&mut ctx, root);
        assert_eq!(carousel::active_slide(&ctx, root), Some(slides[0]));

        carousel::activate_index(&mut ctx, root, count - 1);
        let before = activations(&ctx);
        carousel::activate_next(&mut ctx, root);
        assert_eq!(carousel::active_slide(&ctx, root), Some(slides[count - 1]));
        assert_eq!(activations(&ctx), before);
    }
}

#[test]
fn test_infinite_carousel_wraps_both_ways() {
    for count in 2..=4 {
        let Carousel {
            mut ctx, root, slides, ..
        } = build_carousel(count, &[("infinite-rotation", "")]);

        carousel::activate_previous(&mut ctx, root);
        assert_eq!(carousel::active_slide(&ctx, root), Some(slides[count - 1]));
        carousel::activate_next(&mut ctx, root);
        assert_eq!(carousel::active_slide(&ctx, root), Some(slides[0]));
    }
}

// ============================================================================
// AUTOMATIC ROTATION
// ============================================================================

#[test]
fn test_rotation_advances_once_per_interval() {
    let Carousel { mut ctx, root, .. } = build_carousel(
        5,
        &[("automatic-rotation", ""), ("automatic-rotation-interval-time", "250")],
    );
    assert_eq!(ctx.active_timers(root), 1);

    ctx.advance(251);
    assert_eq!(activations(&ctx), 1);
    ctx.advance(250);
    assert_eq!(activations(&ctx), 2);
    assert_eq!(carousel::active_index(&ctx, root), Some(2));
}

#[test]
fn test_default_interval_from_config() {
    let config = Config::from_json(r#"{"default-rotation-interval-ms": 40}"#).unwrap();
    let mut ctx = Context::with_config(config);
    let root = ctx.create_element("trellis-carousel");
    ctx.set_attribute(root, "automatic-rotation", "").unwrap();
    ctx.set_attribute(root, "automatic-rotation-interval-time", "soon").unwrap();
    let container = ctx.create_element("trellis-carousel-slides");
    for _ in 0..3 {
        let slide = ctx.create_element("trellis-carousel-slide");
        ctx.append_child(container, slide).unwrap();
    }
    ctx.append_child(root, container).unwrap();
    ctx.append_child(ctx.document(), root).unwrap();

    ctx.advance(41);
    assert_eq!(carousel::active_index(&ctx, root), Some(0));
}

#[test]
fn test_hover_and_focus_pause_rotation() {
    let Carousel {
        mut ctx, root, slides, ..
    } = build_carousel(
        3,
        &[("automatic-rotation", ""), ("automatic-rotation-interval-time", "100")],
    );

    ctx.pointer_enter(root);
    assert!(carousel::is_paused(&ctx, root));
    ctx.advance(500);
    assert_eq!(activations(&ctx), 0);
    ctx.pointer_leave(root);
    ctx.advance(101);
    assert_eq!(activations(&ctx), 1);

    ctx.focus(slides[1]);
    ctx.advance(500);
    assert_eq!(activations(&ctx), 1);
    ctx.blur();
    ctx.advance(101);
    assert_eq!(activations(&ctx), 2);
}

#[test]
fn test_forced_rotation_ignores_hover() {
    let Carousel {
        mut ctx, root, control, ..
    } = build_carousel(3, &[("automatic-rotation-interval-time", "100")]);

    ctx.click(control);
    assert!(carousel::is_forced(&ctx, root));
    assert!(carousel::is_rotating(&ctx, root));

    ctx.pointer_enter(root);
    assert!(!carousel::is_paused(&ctx, root));
    ctx.advance(101);
    assert_eq!(activations(&ctx), 1);
    ctx.pointer_leave(root);
    assert_eq!(ctx.notifications().count("rotation-pause"), 0);
    assert_eq!(ctx.notifications().count("rotation-resume"), 0);
}

#[test]
fn test_two_slide_scenario() {
    let Carousel {
        mut ctx,
        root,
        slides,
        control,
    } = build_carousel(
        2,
        &[
            ("automatic-rotation", ""),
            ("automatic-rotation-interval-time", "100"),
            ("infinite-rotation", ""),
        ],
    );

    ctx.advance(100);
    assert!(ctx.has_attribute(slides[1], "active"));
    assert!(!ctx.has_attribute(slides[0], "active"));

    ctx.advance(100);
    assert!(ctx.has_attribute(slides[0], "active"));
    assert!(!ctx.has_attribute(slides[1], "active"));

    ctx.click(control);
    assert!(!ctx.has_attribute(root, "automatic-rotation"));
    assert_eq!(ctx.active_timers(root), 0);
    ctx.advance(100);
    assert!(ctx.has_attribute(slides[0], "active"));
    assert_eq!(activations(&ctx), 2);
}

#[test]
fn test_reenabling_rotation_restores_live_off() {
    let Carousel {
        mut ctx, root, slides, ..
    } = build_carousel(
        2,
        &[("automatic-rotation", ""), ("automatic-rotation-interval-time", "100")],
    );
    let container = ctx.dom().parent(slides[0]).unwrap();
    assert_eq!(ctx.get_attribute(container, "aria-live"), Some("off"));

    ctx.pointer_enter(root);
    assert_eq!(ctx.get_attribute(container, "aria-live"), Some("polite"));
    ctx.remove_attribute(root, "automatic-rotation").unwrap();
    ctx.set_attribute(root, "automatic-rotation", "").unwrap();

    assert!(!carousel::is_paused(&ctx, root));
    assert_eq!(ctx.active_timers(root), 1);
    assert_eq!(ctx.get_attribute(container, "aria-live"), Some("off"));
    ctx.pointer_leave(root);
    assert_eq!(ctx.get_attribute(container, "aria-live"), Some("off"));
    ctx.advance(100);
    assert_eq!(activations(&ctx), 1);
}

#[test]
fn test_long_rotation_mutation_log_stays_bounded() {
    let Carousel { mut ctx, root, .. } = build_carousel(
        2,
        &[
            ("automatic-rotation", ""),
            ("automatic-rotation-interval-time", "10"),
            ("infinite-rotation", ""),
        ],
    );
    ctx.take_mutations();
    ctx.advance(10);
    let per_tick = ctx.dom().mutations().len();
    assert!(per_tick > 0);
    ctx.take_mutations();

    for tick in 1..=1000 {
        ctx.advance(10);
        if tick % 100 == 0 {
            assert!(!ctx.take_mutations().is_empty());
            ctx.take_notifications();
        }
        assert!(ctx.dom().mutations().len() <= per_tick * 100);
    }
    assert!(ctx.dom().mutations().is_empty());
    assert_eq!(ctx.active_timers(root), 1);
}

#[test]
fn test_removal_clears_rotation_timer() {
    let Carousel { mut ctx, root, .. } = build_carousel(2, &[("automatic-rotation", "")]);
    assert_eq!(ctx.active_timers(root), 1);
    ctx.remove(root).unwrap();
    assert_eq!(ctx.active_timers(root), 0);
    ctx.advance(60_000);
    assert_eq!(activations(&ctx), 0);
}

#[test]
fn test_listeners_observe_synced_attributes() {
    let Carousel {
        mut ctx, root, slides, ..
    } = build_carousel(3, &[]);
    let seen = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&seen);
    let second = slides[1];
    ctx.subscribe(move |notification, tree| {
        if notification.name() == "slide-activate" {
            sink.borrow_mut()
                .push(tree.has_attribute(second, "active"));
        }
    });
    carousel::activate_next(&mut ctx, root);
    assert_eq!(*seen.borrow(), vec![true]);
}

// ============================================================================
// ACCORDION
// ============================================================================

#[test]
fn test_only_one_expanded_section() {
    let Accordion {
        mut ctx,
        sections,
        buttons,
    } = build_accordion(3, true);

    ctx.click(buttons[0]);
    ctx.click(buttons[1]);
    assert!(!accordion::is_expanded(&ctx, sections[0]));
    assert!(accordion::is_expanded(&ctx, sections[1]));
    ctx.click(buttons[2]);
    let open = sections.iter().filter(|&&s| accordion::is_expanded(&ctx, s)).count();
    assert_eq!(open, 1);
}

#[test]
fn test_independent_sections() {
    let Accordion {
        mut ctx,
        sections,
        buttons,
    } = build_accordion(2, false);

    ctx.click(buttons[0]);
    ctx.click(buttons[1]);
    assert!(accordion::is_expanded(&ctx, sections[0]));
    assert!(accordion::is_expanded(&ctx, sections[1]));
    ctx.click(buttons[0]);
    assert!(!accordion::is_expanded(&ctx, sections[0]));
    assert!(accordion::is_expanded(&ctx, sections[1]));
}

#[test]
fn test_noncollapsible_guards_only_own_toggle() {
    let Accordion {
        mut ctx,
        sections,
        buttons,
    } = build_accordion(2, true);
    ctx.set_attribute(sections[0], "noncollapsible", "").unwrap();

    ctx.click(buttons[0]);
    ctx.click(buttons[0]);
    assert!(accordion::is_expanded(&ctx, sections[0]));
    assert_eq!(ctx.get_attribute(buttons[0], "aria-disabled"), Some("true"));

    ctx.click(buttons[1]);
    assert!(!accordion::is_expanded(&ctx, sections[0]));
    assert!(accordion::is_expanded(&ctx, sections[1]));
}

// ============================================================================
// FORMS
// ============================================================================

fn build_form(disabled: bool) -> (Context, NodeId, NodeId, NodeId) {
    let mut ctx = Context::new();
    let form_node = ctx.create_element("trellis-form");
    if disabled {
        ctx.set_attribute(form_node, "disabled", "").unwrap();
    }
    let name = ctx.create_element("trellis-input");
    ctx.set_attribute(name, "name", "name").unwrap();
    let volume = ctx.create_element("trellis-slider");
    ctx.set_attribute(volume, "name", "volume").unwrap();
    ctx.append_child(form_node, name).unwrap();
    ctx.append_child(form_node, volume).unwrap();
    ctx.append_child(ctx.document(), form_node).unwrap();
    ctx.set_schema(name, Constraints::new().required()).unwrap();
    ctx.set_schema(volume, Constraints::new().range(Some(10.0), None)).unwrap();
    (ctx, form_node, name, volume)
}

fn submitted_errors(ctx: &Context) -> Vec<usize> {
    ctx.notifications()
        .log()
        .iter()
        .filter_map(|n| match &n.kind {
            NotificationKind::FormSubmit { errors } => Some(errors.len()),
            _ => None,
        })
        .collect()
}

#[test]
fn test_form_submit_aggregates_by_name() {
    let (mut ctx, form_node, name, volume) = build_form(false);

    let report = form::submit(&mut ctx, form_node).unwrap();
    assert_eq!(report.errors.keys().collect::<Vec<_>>(), vec!["name", "volume"]);
    assert!(ctx.control(name).unwrap().touched());
    assert!(ctx.control(volume).unwrap().touched());

    ctx.input(name, "Ada");
    slider::set(&mut ctx, volume, 30.0);
    let report = form::submit(&mut ctx, form_node).unwrap();
    assert!(report.is_valid());
    assert_eq!(report.values.get("volume"), Some(&json!(30)));
    assert_eq!(submitted_errors(&ctx), vec![2, 0]);
}

#[test]
fn test_disabled_form_never_submits() {
    let (mut ctx, form_node, name, _) = build_form(true);
    ctx.input(name, "Ada");
    assert!(form::submit(&mut ctx, form_node).is_none());
    assert!(submitted_errors(&ctx).is_empty());
    assert!(!ctx.control(name).unwrap().touched());
}

#[test]
fn test_async_submit_through_handler() {
    let (mut ctx, form_node, name, volume) = build_form(false);
    ctx.input(name, "Ada");
    ctx.set_value(volume, json!(50)).unwrap();

    let received = smol::block_on(async {
        let mut received = None;
        form::submit_async(&mut ctx, form_node, |values| {
            received = Some(values);
            async { anyhow::Ok(()) }
        })
        .await
        .unwrap();
        received
    });
    let values = received.unwrap();
    assert_eq!(values.get("name"), Some(&json!("Ada")));
    assert!(!form::is_busy(&ctx, form_node));
}

#[test]
fn test_clear_then_validate_round_trip() {
    let (mut ctx, _, name, _) = build_form(false);
    ctx.input(name, "Ada");
    assert_eq!(ctx.control(name).unwrap().error(), None);

    ctx.clear(name).unwrap();
    assert_eq!(ctx.value(name), Some(Value::Null));
    assert!(!ctx.validate(name).unwrap());
    assert!(ctx.control(name).unwrap().error().is_some());

    ctx.set_value(name, json!("Grace")).unwrap();
    assert!(ctx.validate(name).unwrap());
    assert_eq!(ctx.control(name).unwrap().error(), None);
}

// ============================================================================
// COLLECTORS
// ============================================================================

#[test]
fn test_collector_round_trip() {
    let mut uids = UidGenerator::new();
    let uid = uids.next();
    let mut collector = Collector::new();
    collector.set(uid, Some("hero"), "carousel");
    assert_eq!(collector.get_by_id("hero"), Some(&"carousel"));
    assert_eq!(collector.get_by_uid(uid), Some(&"carousel"));
    collector.delete(uid);
    assert_eq!(collector.get_by_id("hero"), None);
    assert_eq!(collector.get_by_uid(uid), None);
}

#[test]
fn test_form_control_collector_round_trip() {
    let mut uids = UidGenerator::new();
    let uid = uids.next();
    let target: Target = Rc::new(RefCell::new(json!({})));
    let mut collector = FormControlCollector::new();

    collector.set(uid, Some("email"), Some((&target, "user.email")), 7);
    assert_eq!(collector.get_by_target(&target, "user.email"), Some(&7));
    collector.set(uid, Some("email"), Some((&target, "user.mail")), 7);
    assert_eq!(collector.get_by_target(&target, "user.email"), None);
    assert_eq!(collector.get_by_target(&target, "user.mail"), Some(&7));

    collector.delete(uid);
    assert_eq!(collector.get_by_id("email"), None);
    assert_eq!(collector.get_by_target(&target, "user.mail"), None);
}

#[test]
fn test_context_collectors_follow_lifecycle() {
    let mut ctx = Context::new();
    let input_node = ctx.create_element("trellis-input");
    ctx.set_attribute(input_node, "id", "email").unwrap();
    ctx.append_child(ctx.document(), input_node).unwrap();

    let target: Target = Rc::new(RefCell::new(json!({"user": {}})));
    ctx.bind_control(input_node, Rc::clone(&target), "user.email").unwrap();
    assert_eq!(ctx.form_control_by_id("email"), Some(input_node));
    assert_eq!(ctx.form_control_by_target(&target, "user.email"), Some(input_node));

    ctx.input(input_node, "a@b.c");
    assert_eq!(target.borrow()["user"]["email"], json!("a@b.c"));

    ctx.remove(input_node).unwrap();
    assert_eq!(ctx.element_by_id("email"), None);
    assert_eq!(ctx.form_control_by_target(&target, "user.email"), None);
}
