use std::time::Duration;

use eframe::egui::{Vec2, vec2};
use pharma_flow::catalog::{Catalog, Focus, Selection};
use pharma_flow::config::{BubbleSettings, FlowSettings};
use pharma_flow::engine::{
    Bubble, BubbleField, BubbleSource, BubbleView, ConsumptionStatus, FIELD_EXTENT, FlowPreset,
    FlowView, Lifecycle, RandomWalk, Scheduler, StockPolicy, StockStatus, ViewSession,
};

fn focus(id: &str) -> Focus {
    Catalog::builtin()
        .resolve(&Selection::Product(id.to_owned()))
        .expect("builtin product")
}

fn still_bubble(id: usize, position: Vec2) -> Bubble {
    Bubble {
        id,
        label: format!("M{id}"),
        status: ConsumptionStatus::Normal,
        consumption: 1_000.0,
        size: 12.0,
        position,
        velocity: Vec2::ZERO,
    }
}

#[test]
fn bubbles_never_escape_the_field() {
    let focus = focus("par-iv");
    let labels = (0..24).map(|i| format!("W{i}")).collect::<Vec<_>>();
    let mut source = RandomWalk::seeded(42);
    let mut field = BubbleField::spawn(&labels, &focus, &mut source);

    for _ in 0..5_000 {
        field.step();
        for bubble in field.bubbles() {
            let radius = bubble.radius();
            assert!(bubble.position.x >= radius && bubble.position.x <= FIELD_EXTENT - radius);
            assert!(bubble.position.y >= radius && bubble.position.y <= FIELD_EXTENT - radius);
        }
    }
}

#[test]
fn bounce_flips_velocity_sign_exactly_once() {
    let focus = focus("amx-500");
    let labels = (0..12).map(|i| format!("D{i}")).collect::<Vec<_>>();
    let mut source = RandomWalk::seeded(7);
    let mut field = BubbleField::spawn(&labels, &focus, &mut source);

    let mut saw_bounce = false;
    for _ in 0..2_000 {
        let before = field.bubbles().to_vec();
        let bounces = field.step();
        for ((old, new), bounce) in before.iter().zip(field.bubbles()).zip(&bounces) {
            if bounce.x {
                assert_eq!(new.velocity.x, -old.velocity.x);
                saw_bounce = true;
            } else {
                assert_eq!(new.velocity.x, old.velocity.x);
            }
            if bounce.y {
                assert_eq!(new.velocity.y, -old.velocity.y);
            } else {
                assert_eq!(new.velocity.y, old.velocity.y);
            }
        }
    }
    assert!(saw_bounce);
}

#[test]
fn zero_velocity_bubbles_stay_put() {
    let seeded = [
        vec2(10.0, 10.0),
        vec2(30.0, 70.0),
        vec2(50.0, 50.0),
        vec2(6.0, 94.0),
        vec2(80.0, 20.0),
        vec2(94.0, 60.0),
    ];
    let bubbles = seeded
        .iter()
        .enumerate()
        .map(|(id, &position)| still_bubble(id, position))
        .collect();

    let mut scheduler = Scheduler::new();
    let mut session = ViewSession::new();
    session.mount(
        BubbleView::with_field(
            focus("hep-5k"),
            BubbleField::new(FIELD_EXTENT, bubbles),
            Duration::from_millis(50),
        ),
        &mut scheduler,
    );

    for _ in 0..10 {
        let fired = scheduler.advance(Duration::from_millis(50));
        session.dispatch(&fired, scheduler.now());
    }

    let view = session.view().expect("running view");
    assert_eq!(view.ticks(), 10);
    let positions = view
        .field()
        .bubbles()
        .iter()
        .map(|bubble| bubble.position)
        .collect::<Vec<_>>();
    assert_eq!(positions, seeded.to_vec());
}

#[test]
fn stock_reading_classification_example() {
    let policy = StockPolicy::from_settings(&FlowSettings::live());
    assert_eq!(policy.classify(100, 300), StockStatus::Low);
    assert_ne!(policy.classify(100, 300), StockStatus::Critical);
}

#[test]
fn stock_stays_non_negative_under_random_walk() {
    let settings = FlowSettings {
        max_delta: 500,
        ..FlowSettings::live()
    };
    let source = RandomWalk::seeded(99).with_max_delta(settings.max_delta);

    let mut scheduler = Scheduler::new();
    let mut session = ViewSession::new();
    session.mount(
        FlowView::new(FlowPreset::Live, focus("mor-10"), &settings, Box::new(source)),
        &mut scheduler,
    );

    let mut hit_floor = false;
    for _ in 0..400 {
        let fired = scheduler.advance(settings.stock_period());
        session.dispatch(&fired, scheduler.now());

        let view = session.view().expect("running view");
        for node in view.layout().nodes() {
            let reading = view.stock().get(&node.id).expect("gauge per node");
            hit_floor |= reading.current == 0;
            assert!(reading.rate >= -(settings.max_delta as i32));
        }
    }
    assert!(hit_floor, "a large walk should touch the zero floor at least once");
}

#[test]
fn immediate_teardown_leaves_nothing_running() {
    let mut scheduler = Scheduler::new();
    let mut session = ViewSession::new();
    session.mount(
        FlowView::new(
            FlowPreset::Enhanced,
            focus("ins-gla"),
            &FlowSettings::enhanced(),
            Box::new(RandomWalk::seeded(1)),
        ),
        &mut scheduler,
    );
    session.teardown();

    assert_eq!(session.lifecycle(), Lifecycle::TornDown);
    assert_eq!(scheduler.active_timers(), 0);

    let fired = scheduler.advance(Duration::from_secs(60));
    assert!(fired.is_empty());
    assert!(!session.dispatch(&fired, scheduler.now()));
    assert!(session.view().is_none());
}

#[test]
fn selection_change_rebuilds_the_view() {
    let settings = BubbleSettings::default();
    let mut scheduler = Scheduler::new();
    let mut session = ViewSession::new();

    let mut source = RandomWalk::seeded(5);
    session.mount(BubbleView::new(focus("amx-500"), &settings, &mut source), &mut scheduler);
    let fired = scheduler.advance(Duration::from_millis(200));
    session.dispatch(&fired, scheduler.now());
    assert_eq!(session.view().map(BubbleView::ticks), Some(4));

    session.mount(BubbleView::new(focus("vnc-1g"), &settings, &mut source), &mut scheduler);
    assert_eq!(scheduler.active_timers(), 1);

    let view = session.view().expect("rebuilt view");
    assert_eq!(view.ticks(), 0);
    assert_eq!(view.focus().name, "Vancomycin 1 g");
}

struct FixedSource;

impl BubbleSource for FixedSource {
    fn spawn_bubble(&mut self, index: usize, label: &str, focus: &Focus, _extent: f32) -> Bubble {
        Bubble {
            label: label.to_owned(),
            consumption: focus.consumption,
            ..still_bubble(index, vec2(20.0 + index as f32 * 10.0, 50.0))
        }
    }
}

#[test]
fn bubble_source_is_pluggable() {
    let labels = ["Q1", "Q2", "Q3"].map(str::to_owned);
    let field = BubbleField::spawn(&labels, &focus("ome-40"), &mut FixedSource);

    let summary = field
        .bubbles()
        .iter()
        .map(|bubble| (bubble.label.as_str(), bubble.position.x))
        .collect::<Vec<_>>();
    assert_eq!(summary, vec![("Q1", 20.0), ("Q2", 30.0), ("Q3", 40.0)]);
}
