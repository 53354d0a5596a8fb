use std::time::{Duration, Instant};

use folio::animation::{TimingFunction, Transition};
use folio::observer::TriggerState;
use folio::split::{join_units, split_to_units};
use folio::{
    create_element, element_style, element_text, element_value, now, open_scope, pointer_enter,
    pointer_leave, register_hover, resize, run_transition, scroll_to, split_heading, tick,
    trigger_count, with_stage, ArmMode, HoverEffect, HoverKey, Property, Rect, Reveal,
    VisualState,
};

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn hidden() -> VisualState {
    VisualState::new().opacity(0.0).y(30.0)
}

fn shown() -> VisualState {
    VisualState::new().opacity(1.0).y(0.0)
}

fn at(start: Instant, ms: u64) -> Instant {
    start + Duration::from_millis(ms)
}

/// An element well below the fold of the default 1280x800 viewport.
fn below_fold() -> folio::ElementId {
    create_element(Rect::new(0.0, 1600.0, 600.0, 200.0))
}

#[test]
fn test_trigger_in_view_fires_without_scrolling() {
    let heading = create_element(Rect::new(0.0, 0.0, 600.0, 48.0));
    let handle = Reveal::from_to([heading], hidden(), shown())
        .duration(800.0)
        .scroll_trigger(heading)
        .play();

    let registration = handle.registration.unwrap();
    assert!(registration.has_fired());
    assert_eq!(handle.tweens.len(), 1);
    assert!(handle.tweens[0].is_active());

    let start = now();
    tick(start);
    tick(at(start, 1000));
    assert_eq!(element_style(heading), Some(shown()));
}

#[test]
fn test_reveal_at_mount_starts_with_first_frame() {
    let heading = create_element(Rect::new(0.0, 0.0, 600.0, 48.0));
    Reveal::from_to([heading], hidden(), shown())
        .duration(1000.0)
        .timing(TimingFunction::Linear)
        .scroll_trigger(heading)
        .play();

    // The host renders its first frame three seconds after mounting
    let first_frame = at(now(), 3000);
    tick(first_frame);
    assert_eq!(element_style(heading), Some(hidden()));

    tick(at(first_frame, 250));
    let opacity = element_value(heading, Property::Opacity).unwrap();
    assert!((opacity - 0.25).abs() < 0.01, "opacity = {}", opacity);
}

#[test]
fn test_transition_after_idle_time_animates() {
    let box_ = create_element(Rect::default());
    let start = now();
    tick(start);

    // Nothing happens for five seconds, then a transition starts
    run_transition(
        box_,
        Some(VisualState::new().x(0.0)),
        VisualState::new().x(100.0),
        Transition::new(1000.0, TimingFunction::Linear),
    );
    tick(at(start, 5000));
    assert_eq!(element_value(box_, Property::X), Some(0.0));

    tick(at(start, 5100));
    let x = element_value(box_, Property::X).unwrap();
    assert!((x - 10.0).abs() < 0.01, "x = {}", x);
}

#[test]
fn test_content_above_line_fires_immediately() {
    // Top edge at 500 sits above the 640px activation line
    let card = create_element(Rect::new(0.0, 500.0, 300.0, 400.0));
    let handle = Reveal::from_to([card], hidden(), shown())
        .scroll_trigger(card)
        .play();
    assert!(handle.registration.unwrap().has_fired());
}

#[test]
fn test_once_trigger_fires_once() {
    init_logging();
    let card = below_fold();
    let handle = Reveal::from_to([card], hidden(), shown())
        .duration(500.0)
        .scroll_trigger(card)
        .play();
    assert!(!handle.registration.unwrap().has_fired());
    assert_eq!(element_style(card), Some(hidden()));

    let start = now();
    scroll_to(1000.0, start);
    assert!(tick(at(start, 100)));
    tick(at(start, 600));
    let settled = element_style(card);
    assert_eq!(settled, Some(shown()));

    for (i, y) in [0.0, 1200.0, 300.0, 2000.0, 1000.0].into_iter().enumerate() {
        let t = at(start, 700 + i as u64 * 100);
        scroll_to(y, t);
        assert!(!tick(t));
        assert_eq!(element_style(card), settled);
    }
    assert_eq!(
        handle.registration.unwrap().state(),
        Some(TriggerState::Fired)
    );
}

#[test]
fn test_dispose_removes_every_listener() {
    init_logging();
    let pending = below_fold();
    let running = create_element(Rect::new(0.0, 0.0, 600.0, 48.0));

    let scope = open_scope(running);
    scope.run(|| {
        Reveal::from_to([pending], hidden(), shown())
            .scroll_trigger(pending)
            .play();
        Reveal::from_to([running], hidden(), shown())
            .duration(1000.0)
            .timing(TimingFunction::Linear)
            .scroll_trigger(running)
            .play();
    });
    assert_eq!(trigger_count(), 2);

    let start = now();
    tick(start);
    tick(at(start, 500));
    let frozen = element_style(running);
    assert_ne!(frozen, Some(hidden()));
    assert_ne!(frozen, Some(shown()));

    scope.dispose();
    assert_eq!(trigger_count(), 0);

    scroll_to(1200.0, at(start, 600));
    resize(1024.0, 1400.0, at(start, 700));
    assert!(!tick(at(start, 5000)));
    assert_eq!(element_style(pending), Some(hidden()));
    assert_eq!(element_style(running), frozen);
}

#[test]
fn test_split_preserves_text() {
    for text in ["About Me", "a", "  spaced  out ", "héllo wörld", "Tech Stack!"] {
        let units = split_to_units(text);
        assert_eq!(units.len(), text.chars().count());
        assert_eq!(join_units(&units), text);
    }
}

#[test]
fn test_cancel_freezes_values() {
    let box_ = create_element(Rect::default());
    let start = now();
    let token = run_transition(
        box_,
        Some(VisualState::new().x(0.0)),
        VisualState::new().x(100.0),
        Transition::new(1000.0, TimingFunction::Linear),
    );

    tick(start);
    tick(at(start, 400));
    let x = element_value(box_, Property::X).unwrap();
    assert!(x > 30.0 && x < 50.0, "x = {}", x);

    assert!(token.cancel());
    assert!(!token.is_active());
    tick(at(start, 2000));
    assert_eq!(element_value(box_, Property::X), Some(x));
    assert!(!token.cancel());
}

#[test]
fn test_about_heading_stagger() {
    let heading = create_element(Rect::new(0.0, 1600.0, 600.0, 48.0));
    let units = split_heading(heading, "About Me");
    assert_eq!(units.len(), 8);
    let text: String = units.iter().filter_map(|&u| element_text(u)).collect();
    assert_eq!(text, "About Me");
    assert_eq!(element_text(units[5]).as_deref(), Some(" "));

    Reveal::from_to(
        units.iter().copied(),
        VisualState::new().opacity(0.0).y(20.0),
        VisualState::new().opacity(1.0).y(0.0),
    )
    .duration(500.0)
    .stagger(30.0)
    .scroll_trigger(heading)
    .play();

    // 1600 - 1000 = 600, above the 640px line
    let start = now();
    scroll_to(1000.0, start);

    tick(at(start, 100));
    let first = element_value(units[0], Property::Opacity).unwrap();
    assert!(first > 0.0 && first < 1.0);
    // Unit 4 starts at 120ms
    assert_eq!(element_value(units[4], Property::Opacity), Some(0.0));
    assert_eq!(element_value(units[4], Property::Y), Some(20.0));

    tick(at(start, 400));
    let early = element_value(units[0], Property::Opacity).unwrap();
    let late = element_value(units[7], Property::Opacity).unwrap();
    assert!(early > late);

    // Last unit: 7 * 30ms delay + 500ms
    tick(at(start, 800));
    for &unit in &units {
        assert_eq!(element_value(unit, Property::Opacity), Some(1.0));
        assert_eq!(element_value(unit, Property::Y), Some(0.0));
    }
}

#[test]
fn test_resize_after_firing_never_refires() {
    let card = below_fold();
    let handle = Reveal::from_to([card], hidden(), shown())
        .duration(500.0)
        .scroll_trigger(card)
        .play();
    let registration = handle.registration.unwrap();

    let start = now();
    scroll_to(1000.0, start);
    assert!(registration.has_fired());
    tick(at(start, 1000));

    // A taller viewport would satisfy the line again at any scroll offset
    resize(1280.0, 2400.0, at(start, 1100));
    scroll_to(0.0, at(start, 1200));
    resize(1280.0, 800.0, at(start, 1300));
    assert!(!with_stage(|stage| stage.is_animating()));
    assert_eq!(registration.state(), Some(TriggerState::Fired));
    assert_eq!(element_style(card), Some(shown()));
}

#[test]
fn test_repeat_trigger_reverses_and_replays() {
    init_logging();
    let card = below_fold();
    let handle = Reveal::from_to([card], hidden(), shown())
        .duration(500.0)
        .scroll_trigger(card)
        .arm(ArmMode::Repeat)
        .play();
    let registration = handle.registration.unwrap();
    assert_eq!(registration.state(), Some(TriggerState::Hidden));

    let start = now();
    scroll_to(1000.0, start);
    tick(at(start, 600));
    assert_eq!(element_style(card), Some(shown()));

    scroll_to(0.0, at(start, 700));
    assert_eq!(registration.state(), Some(TriggerState::Hidden));
    tick(at(start, 1300));
    assert_eq!(element_style(card), Some(hidden()));

    scroll_to(1000.0, at(start, 1400));
    tick(at(start, 1450));
    // Replays from where the reverse left off, no snap back
    let opacity = element_value(card, Property::Opacity).unwrap();
    assert!(opacity > 0.0 && opacity < 1.0);
    tick(at(start, 2000));
    assert_eq!(element_style(card), Some(shown()));
}

#[test]
fn test_hover_registry_routes_by_key() {
    let item = create_element(Rect::default());
    let scope = open_scope(item);
    scope.run(|| {
        register_hover(
            "tech/Rust",
            vec![HoverEffect::new(
                item,
                VisualState::new().y(-10.0).scale(1.05),
                VisualState::new().y(0.0).scale(1.0),
                Transition::new(300.0, TimingFunction::Linear),
            )],
        );
    });

    let start = now();
    tick(start);
    let key: HoverKey = "tech/Rust".into();
    // The pointer arrives after two idle seconds
    let enter = at(start, 2000);
    assert_eq!(pointer_enter(&key, enter).len(), 1);
    // Entering twice does not restart the effect
    assert!(pointer_enter(&key, enter).is_empty());
    assert!(pointer_enter(&"tech/Go".into(), enter).is_empty());

    tick(at(enter, 150));
    let y = element_value(item, Property::Y).unwrap();
    assert!((y + 5.0).abs() < 0.01, "y = {}", y);
    tick(at(enter, 400));
    assert_eq!(element_value(item, Property::Y), Some(-10.0));

    scope.dispose();
    assert!(pointer_leave(&key, at(enter, 500)).is_empty());
    tick(at(enter, 1000));
    assert_eq!(element_value(item, Property::Y), Some(-10.0));
}

#[test]
fn test_hover_key_reregistered_by_another_scope_survives() {
    let item = create_element(Rect::default());
    let effect = || {
        vec![HoverEffect::new(
            item,
            VisualState::new().y(-10.0),
            VisualState::new().y(0.0),
            Transition::new(300.0, TimingFunction::Linear),
        )]
    };
    let first = open_scope(item);
    first.run(|| register_hover("tech/Git", effect()));
    let second = open_scope(item);
    second.run(|| register_hover("tech/Git", effect()));

    first.dispose();
    let start = now();
    assert_eq!(pointer_enter(&"tech/Git".into(), start).len(), 1);

    second.dispose();
    assert!(pointer_leave(&"tech/Git".into(), start).is_empty());
}
