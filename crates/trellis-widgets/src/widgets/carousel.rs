//! Carousel
//!
//! Slide set with an optional tab list, previous/next controls and an
//! automatic rotation driven by an interval timer.
//!
//! Rotation rules:
//! - The timer runs iff `automatic-rotation` is set and the carousel is not
//!   paused by pointer or focus, unless the rotation control forced it.
//! - Without `infinite-rotation`, moving past either end is a no-op.
//! - While paused the slides container announces politely.

use trellis_a11y::{
    AriaRole, AttributeSet, Key, KeyDispatch, NavigationPolicy, Politeness, RovingIndex, TabIndex,
    synchronize_relative,
};
use trellis_dom::{Binding, NodeId, UiEvent, UiEventKind};

use super::WidgetKind;
use crate::Context;
use crate::notify::NotificationKind;
use crate::scheduler::TimerHandle;

const ROOT: Binding = Binding::closest("carousel", "trellis-carousel");
const SLIDES_CONTAINER: Binding = Binding::one("slides-container", "trellis-carousel-slides");
const SLIDES: Binding = Binding::all("slides", "trellis-carousel-slide");
const TABS_LIST: Binding = Binding::one("tabs-list", "trellis-carousel-tabs");
const TABS: Binding = Binding::all("tabs", "trellis-carousel-tab");
const ROTATION_CONTROL: Binding = Binding::one("rotation-control", "trellis-carousel-rotation-control");
const NEXT_CONTROL: Binding = Binding::one("next-slide-control", "trellis-carousel-next-slide-control");
const PREVIOUS_CONTROL: Binding =
    Binding::one("previous-slide-control", "trellis-carousel-previous-slide-control");

/// Rotation behavior attached to a carousel root
#[derive(Debug, Default)]
pub struct Rotation {
    timer: Option<TimerHandle>,
    /// Set by the rotation control; pointer and focus no longer pause
    force: bool,
    temporary_live: Option<Politeness>,
    paused: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TabsAction {
    Previous,
    Next,
    First,
    Last,
}

fn tabs_keys() -> KeyDispatch<TabsAction> {
    KeyDispatch::new()
        .on(Key::ArrowLeft, TabsAction::Previous)
        .on(Key::ArrowRight, TabsAction::Next)
        .on(Key::Home, TabsAction::First)
        .on(Key::End, TabsAction::Last)
}

fn root_of(ctx: &Context, node: NodeId) -> Option<NodeId> {
    ctx.query_one(node, &ROOT)
}

// ----------------------------------------------------------------------
// Queries
// ----------------------------------------------------------------------

pub fn slides(ctx: &Context, carousel: NodeId) -> Vec<NodeId> {
    ctx.query_all(carousel, &SLIDES)
}

pub fn tabs(ctx: &Context, carousel: NodeId) -> Vec<NodeId> {
    ctx.query_all(carousel, &TABS)
}

/// Index of the active slide
pub fn active_index(ctx: &Context, carousel: NodeId) -> Option<usize> {
    slides(ctx, carousel).iter().position(|&s| ctx.flag(s, "active"))
}

pub fn active_slide(ctx: &Context, carousel: NodeId) -> Option<NodeId> {
    slides(ctx, carousel).into_iter().find(|&s| ctx.flag(s, "active"))
}

pub fn is_rotating(ctx: &Context, carousel: NodeId) -> bool {
    ctx.state
        .rotations
        .get(&carousel)
        .is_some_and(|r| r.timer.is_some())
}

pub fn is_paused(ctx: &Context, carousel: NodeId) -> bool {
    ctx.state.rotations.get(&carousel).is_some_and(|r| r.paused)
}

pub fn is_forced(ctx: &Context, carousel: NodeId) -> bool {
    ctx.state.rotations.get(&carousel).is_some_and(|r| r.force)
}

// ----------------------------------------------------------------------
// Attributes
// ----------------------------------------------------------------------

pub(crate) fn sync_from(ctx: &mut Context, node: NodeId) {
    match root_of(ctx, node) {
        Some(root) => sync(ctx, root),
        None => tracing::debug!("Carousel part {:?} has no carousel", node),
    }
}

pub(crate) fn sync(ctx: &mut Context, root: NodeId) {
    let automatic = ctx.flag(root, "automatic-rotation");
    let temporary = ctx.state.rotations.get(&root).and_then(|r| r.temporary_live);

    ctx.sync_attrs(
        root,
        &AttributeSet::new()
            .set("aria-roledescription", "carousel")
            .role(AriaRole::Region),
    );

    let container = ctx.query_one(root, &SLIDES_CONTAINER);
    let live = temporary.unwrap_or(if automatic { Politeness::Off } else { Politeness::Polite });
    synchronize_relative(
        &mut ctx.dom,
        container,
        SLIDES_CONTAINER.name,
        &AttributeSet::new().set("aria-atomic", "false").live(live),
    );

    let slides = slides(ctx, root);
    let tabs = tabs(ctx, root);
    let count = slides.len();
    let role = if tabs.is_empty() { AriaRole::Group } else { AriaRole::TabPanel };
    for (i, &slide) in slides.iter().enumerate() {
        ctx.sync_attrs(
            slide,
            &AttributeSet::new()
                .set("aria-roledescription", "slide")
                .role(role)
                .set("aria-label", format!("{} of {}", i + 1, count)),
        );
    }

    let tabs_list = ctx.query_one(root, &TABS_LIST);
    synchronize_relative(
        &mut ctx.dom,
        tabs_list,
        TABS_LIST.name,
        &AttributeSet::new().role(AriaRole::TabList),
    );
    let any_active = tabs.iter().any(|&t| ctx.flag(t, "active"));
    for (i, &tab) in tabs.iter().enumerate() {
        let active = ctx.flag(tab, "active");
        let controls = slides.get(i).and_then(|&s| ctx.id_of(s));
        ctx.sync_attrs(
            tab,
            &AttributeSet::new()
                .role(AriaRole::Tab)
                .set_bool("aria-selected", active)
                .set_opt("aria-controls", controls)
                .tabindex(TabIndex::roving(active || (!any_active && i == 0))),
        );
    }

    let label = if automatic {
        "Stop automatic slide show"
    } else {
        "Start automatic slide show"
    };
    let rotation_control = ctx.query_one(root, &ROTATION_CONTROL);
    synchronize_relative(
        &mut ctx.dom,
        rotation_control,
        ROTATION_CONTROL.name,
        &AttributeSet::new().role(AriaRole::Button).set("aria-label", label),
    );

    let container_id = container.and_then(|c| ctx.id_of(c));
    for (binding, label) in [(NEXT_CONTROL, "Next slide"), (PREVIOUS_CONTROL, "Previous slide")] {
        let control = ctx.query_one(root, &binding);
        synchronize_relative(
            &mut ctx.dom,
            control,
            binding.name,
            &AttributeSet::new()
                .role(AriaRole::Button)
                .set_opt("aria-controls", container_id.clone())
                .set("aria-label", label),
        );
    }
}

// ----------------------------------------------------------------------
// Lifecycle
// ----------------------------------------------------------------------

pub(crate) fn connected(ctx: &mut Context, root: NodeId) {
    ctx.state.rotations.entry(root).or_default();
    if ctx.flag(root, "automatic-rotation") {
        start_timer(ctx, root);
    }
    sync(ctx, root);
}

pub(crate) fn disconnected(ctx: &mut Context, root: NodeId) {
    stop_timer(ctx, root);
    ctx.state.rotations.remove(&root);
}

pub(crate) fn attribute_changed(ctx: &mut Context, root: NodeId, name: &str) {
    match name {
        "automatic-rotation" => {
            stop_timer(ctx, root);
            if let Some(rotation) = ctx.state.rotations.get_mut(&root) {
                rotation.paused = false;
                rotation.temporary_live = None;
            }
            if ctx.flag(root, "automatic-rotation") {
                start_timer(ctx, root);
            }
        }
        "automatic-rotation-interval-time" => {
            if is_rotating(ctx, root) {
                start_timer(ctx, root);
            }
        }
        _ => {}
    }
    sync(ctx, root);
}

fn interval(ctx: &Context, root: NodeId) -> u64 {
    ctx.get_attribute(root, "automatic-rotation-interval-time")
        .and_then(|v| v.trim().parse::<u64>().ok())
        .unwrap_or(ctx.config.default_rotation_interval_ms)
}

/// Start (or restart) the rotation timer; never leaves two running
fn start_timer(ctx: &mut Context, root: NodeId) {
    stop_timer(ctx, root);
    let period = interval(ctx, root);
    let handle = ctx.scheduler.start_interval(root, period);
    ctx.state.rotations.entry(root).or_default().timer = Some(handle);
}

fn stop_timer(ctx: &mut Context, root: NodeId) {
    let handle = ctx.state.rotations.get_mut(&root).and_then(|r| r.timer.take());
    if let Some(handle) = handle {
        ctx.scheduler.clear(handle);
    }
}

/// Interval callback
pub(crate) fn tick(ctx: &mut Context, root: NodeId) {
    if ctx.flag(root, "reverse-rotation") {
        activate_previous(ctx, root);
    } else {
        activate_next(ctx, root);
    }
}

// ----------------------------------------------------------------------
// Transitions
// ----------------------------------------------------------------------

pub fn activate_next(ctx: &mut Context, root: NodeId) {
    step(ctx, root, false);
}

pub fn activate_previous(ctx: &mut Context, root: NodeId) {
    step(ctx, root, true);
}

fn step(ctx: &mut Context, root: NodeId, backward: bool) {
    let slides = slides(ctx, root);
    let infinite = ctx.flag(root, "infinite-rotation");
    let policy = if infinite { NavigationPolicy::Wrap } else { NavigationPolicy::None };
    let current = slides.iter().position(|&s| ctx.flag(s, "active"));
    let index = RovingIndex::new(current, slides.len(), policy);

    let target = match (backward, current) {
        (true, None) if !infinite => None,
        (true, _) => index.prev(),
        (false, _) => index.next(),
    };
    match target {
        Some(to) if Some(to) != current => transition(ctx, root, current, to),
        _ => tracing::debug!(
            "Carousel {:?}: no {} slide from {:?} of {}",
            root,
            if backward { "previous" } else { "next" },
            current,
            slides.len()
        ),
    }
}

/// Jump straight to `to`, bypassing the wrap rules
pub fn activate_index(ctx: &mut Context, root: NodeId, to: usize) {
    let current = active_index(ctx, root);
    if Some(to) == current || to >= slides(ctx, root).len() {
        tracing::debug!("Carousel {:?}: slide {} is not a new target", root, to);
        return;
    }
    transition(ctx, root, current, to);
}

fn transition(ctx: &mut Context, root: NodeId, from: Option<usize>, to: usize) {
    let slides = slides(ctx, root);
    let tabs = tabs(ctx, root);
    let previous_slide = from.and_then(|i| slides.get(i).copied());
    let previous_tab = from.and_then(|i| tabs.get(i).copied());

    for (i, &slide) in slides.iter().enumerate() {
        ctx.set_flag(slide, "active", i == to);
    }
    for (i, &tab) in tabs.iter().enumerate() {
        ctx.set_flag(tab, "active", i == to);
    }
    sync(ctx, root);

    if let Some(slide) = previous_slide {
        ctx.emit(slide, NotificationKind::SlideDeactivate);
    }
    if let Some(tab) = previous_tab {
        ctx.emit(tab, NotificationKind::TabDeactivate);
    }
    ctx.emit(
        slides[to],
        NotificationKind::SlideActivate {
            previous: previous_slide,
        },
    );
    if let Some(&tab) = tabs.get(to) {
        ctx.emit(
            tab,
            NotificationKind::TabActivate {
                previous: previous_tab,
            },
        );
    }
}

fn pause(ctx: &mut Context, root: NodeId) {
    let automatic = ctx.flag(root, "automatic-rotation");
    let Some(rotation) = ctx.state.rotations.get_mut(&root) else {
        return;
    };
    if rotation.force || !automatic || rotation.paused {
        tracing::debug!("Carousel {:?}: pause ignored", root);
        return;
    }
    rotation.paused = true;
    rotation.temporary_live = Some(Politeness::Polite);
    stop_timer(ctx, root);
    sync(ctx, root);
    ctx.emit(root, NotificationKind::RotationPause);
}

fn resume(ctx: &mut Context, root: NodeId) {
    let automatic = ctx.flag(root, "automatic-rotation");
    let Some(rotation) = ctx.state.rotations.get_mut(&root) else {
        return;
    };
    if rotation.force || !automatic || !rotation.paused {
        tracing::debug!("Carousel {:?}: resume ignored", root);
        return;
    }
    rotation.paused = false;
    rotation.temporary_live = None;
    start_timer(ctx, root);
    sync(ctx, root);
    ctx.emit(root, NotificationKind::RotationResume);
}

/// Rotation control: take over rotation and toggle it
pub fn toggle_rotation(ctx: &mut Context, root: NodeId) {
    if let Some(rotation) = ctx.state.rotations.get_mut(&root) {
        rotation.force = true;
        rotation.temporary_live = None;
    }
    let enable = !ctx.flag(root, "automatic-rotation");
    if let Err(e) = ctx.toggle_attribute(root, "automatic-rotation", enable) {
        tracing::warn!("Carousel {:?}: could not toggle rotation: {}", root, e);
        return;
    }
    let kind = if enable {
        NotificationKind::RotationStart
    } else {
        NotificationKind::RotationStop
    };
    ctx.emit(root, kind);
}

// ----------------------------------------------------------------------
// Events
// ----------------------------------------------------------------------

pub(crate) fn handle_root_event(ctx: &mut Context, root: NodeId, event: &mut UiEvent) {
    let inside = event.related_target.is_some_and(|r| ctx.dom.contains(root, r));
    match event.kind {
        UiEventKind::PointerEnter => pause(ctx, root),
        UiEventKind::PointerLeave => resume(ctx, root),
        UiEventKind::FocusIn if !inside => pause(ctx, root),
        UiEventKind::FocusOut if !inside => resume(ctx, root),
        _ => {}
    }
}

pub(crate) fn handle_tabs_event(ctx: &mut Context, tabs_list: NodeId, event: &mut UiEvent) {
    let Some(root) = root_of(ctx, tabs_list) else {
        return;
    };
    let Some(action) = tabs_keys().dispatch(event) else {
        return;
    };
    match action {
        TabsAction::Previous => activate_previous(ctx, root),
        TabsAction::Next => activate_next(ctx, root),
        TabsAction::First => activate_index(ctx, root, 0),
        TabsAction::Last => {
            let last = slides(ctx, root).len().saturating_sub(1);
            activate_index(ctx, root, last);
        }
    }
    let active_tab = tabs(ctx, root).into_iter().find(|&t| ctx.flag(t, "active"));
    if let Some(tab) = active_tab {
        ctx.focus(tab);
    }
}

pub(crate) fn handle_tab_event(ctx: &mut Context, tab: NodeId, event: &mut UiEvent) {
    if !matches!(event.kind, UiEventKind::Click) {
        return;
    }
    let Some(root) = root_of(ctx, tab) else {
        return;
    };
    if let Some(index) = tabs(ctx, root).iter().position(|&t| t == tab) {
        activate_index(ctx, root, index);
    }
}

pub(crate) fn handle_rotation_control_event(ctx: &mut Context, control: NodeId, event: &mut UiEvent) {
    if !matches!(event.kind, UiEventKind::Click) {
        return;
    }
    if let Some(root) = root_of(ctx, control) {
        toggle_rotation(ctx, root);
    }
}

pub(crate) fn handle_step_control_event(
    ctx: &mut Context,
    control: NodeId,
    kind: WidgetKind,
    event: &mut UiEvent,
) {
    if !matches!(event.kind, UiEventKind::Click) {
        return;
    }
    let Some(root) = root_of(ctx, control) else {
        return;
    };
    if kind == WidgetKind::CarouselPreviousSlideControl {
        activate_previous(ctx, root);
    } else {
        activate_next(ctx, root);
    }
}
