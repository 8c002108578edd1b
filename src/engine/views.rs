use std::time::Duration;

use eframe::egui::{Pos2, Vec2};

use crate::catalog::Focus;
use crate::config::{BubbleSettings, FlowSettings};

use super::bubbles::{Bubble, BubbleField};
use super::flow::{FlowLayout, FlowNode, FlowPreset, StockBoard, StockPolicy, StockStatus, Tier};
use super::particles::{Marker, ParticleAnimator};
use super::path::FlowPath;
use super::session::View;
use super::source::{BubbleSource, StockSource};
use super::timer::{Scheduler, TimerGuard, TimerId};

#[derive(Clone, Debug, PartialEq)]
pub enum EntityClick {
    Bubble(Bubble),
    Source(Focus),
}

pub struct BubbleView {
    focus: Focus,
    field: BubbleField,
    period: Duration,
    tick: Option<TimerGuard>,
    ticks: u64,
}

impl BubbleView {
    pub fn new(focus: Focus, settings: &BubbleSettings, source: &mut dyn BubbleSource) -> Self {
        let field = BubbleField::spawn(&settings.labels, &focus, source);
        Self::with_field(focus, field, settings.tick())
    }

    pub fn with_field(focus: Focus, field: BubbleField, period: Duration) -> Self {
        Self {
            focus,
            field,
            period,
            tick: None,
            ticks: 0,
        }
    }

    pub fn focus(&self) -> &Focus {
        &self.focus
    }

    pub fn field(&self) -> &BubbleField {
        &self.field
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn click(&self, point: Vec2) -> Option<EntityClick> {
        self.field
            .hit_test(point)
            .map(|bubble| EntityClick::Bubble(bubble.clone()))
    }
}

impl View for BubbleView {
    fn name(&self) -> &str {
        "bubbles"
    }

    fn start(&mut self, scheduler: &mut Scheduler) {
        self.tick = Some(scheduler.every(self.period));
    }

    fn on_timer(&mut self, timer: TimerId, _now: Duration) -> bool {
        if !self.tick.as_ref().is_some_and(|tick| tick.matches(timer)) {
            return false;
        }

        self.field.step();
        self.ticks += 1;
        true
    }
}

struct FlowGeometry {
    viewport: Vec2,
    positions: Vec<Pos2>,
    paths: Vec<FlowPath>,
}

impl FlowGeometry {
    fn build(layout: &FlowLayout, viewport: Vec2) -> Self {
        let positions = layout.place(viewport);
        let paths = layout
            .edges()
            .iter()
            .map(|edge| FlowPath::curve(positions[edge.from], positions[edge.to]))
            .collect();

        Self {
            viewport,
            positions,
            paths,
        }
    }
}

pub struct FlowView {
    preset: FlowPreset,
    focus: Focus,
    layout: FlowLayout,
    policy: StockPolicy,
    stock: StockBoard,
    source: Box<dyn StockSource>,
    stock_period: Duration,
    particles_per_path: usize,
    particle_duration: Duration,
    stock_tick: Option<TimerGuard>,
    animator: ParticleAnimator,
    geometry: Option<FlowGeometry>,
}

impl FlowView {
    pub fn new(
        preset: FlowPreset,
        focus: Focus,
        settings: &FlowSettings,
        mut source: Box<dyn StockSource>,
    ) -> Self {
        let layout = FlowLayout::preset(preset);
        let policy = StockPolicy::from_settings(settings);
        let stock = StockBoard::randomized(layout.nodes(), &policy, source.as_mut());

        Self {
            preset,
            focus,
            layout,
            policy,
            stock,
            source,
            stock_period: settings.stock_period(),
            particles_per_path: settings.particles_per_path,
            particle_duration: settings.particle_duration(),
            stock_tick: None,
            animator: ParticleAnimator::new(),
            geometry: None,
        }
    }

    pub fn preset(&self) -> FlowPreset {
        self.preset
    }

    pub fn focus(&self) -> &Focus {
        &self.focus
    }

    pub fn layout(&self) -> &FlowLayout {
        &self.layout
    }

    pub fn policy(&self) -> &StockPolicy {
        &self.policy
    }

    pub fn stock(&self) -> &StockBoard {
        &self.stock
    }

    pub fn animator(&self) -> &ParticleAnimator {
        &self.animator
    }

    pub fn status_of(&self, node: &FlowNode) -> Option<StockStatus> {
        self.stock
            .get(&node.id)
            .map(|reading| self.policy.classify_node(node, reading))
    }

    pub fn ensure_geometry(&mut self, viewport: Vec2) {
        let stale = self
            .geometry
            .as_ref()
            .is_none_or(|geometry| geometry.viewport != viewport);
        if stale {
            self.geometry = Some(FlowGeometry::build(&self.layout, viewport));
        }
    }

    pub fn positions(&self) -> &[Pos2] {
        self.geometry
            .as_ref()
            .map(|geometry| geometry.positions.as_slice())
            .unwrap_or_default()
    }

    pub fn paths(&self) -> &[FlowPath] {
        self.geometry
            .as_ref()
            .map(|geometry| geometry.paths.as_slice())
            .unwrap_or_default()
    }

    pub fn particle_positions(&self, now: Duration) -> Vec<(usize, Pos2)> {
        let paths = self.paths();
        self.animator
            .markers(now)
            .into_iter()
            .filter_map(|Marker { path, progress }| {
                paths
                    .get(path)
                    .map(|geometry| (path, geometry.point_at(progress)))
            })
            .collect()
    }

    pub fn click(&self, point: Pos2, viewport: Vec2, radius: f32) -> Option<EntityClick> {
        let node = self.layout.hit_test(point, viewport, radius)?;
        (node.tier == Tier::Source).then(|| EntityClick::Source(self.focus.clone()))
    }
}

impl View for FlowView {
    fn name(&self) -> &str {
        self.preset.label()
    }

    fn start(&mut self, scheduler: &mut Scheduler) {
        self.stock_tick = Some(scheduler.every(self.stock_period));
        self.animator.start(
            scheduler,
            self.layout.edges().len(),
            self.particles_per_path,
            self.particle_duration,
        );
    }

    fn on_timer(&mut self, timer: TimerId, _now: Duration) -> bool {
        if self.stock_tick.as_ref().is_some_and(|tick| tick.matches(timer)) {
            self.stock.perturb(self.layout.nodes(), self.source.as_mut());
            return true;
        }

        self.animator.owns_timer(timer)
    }
}

#[cfg(test)]
mod tests {
    use eframe::egui::vec2;

    use super::*;
    use crate::catalog::{Catalog, Selection};
    use crate::engine::flow::StockReading;
    use crate::engine::session::{Lifecycle, ViewSession};
    use crate::engine::source::RandomWalk;

    /// Always drains as hard as it can.
    struct Drain;

    impl StockSource for Drain {
        fn initial_reading(&mut self, _node: &FlowNode, _threshold: u32) -> StockReading {
            StockReading {
                current: 25,
                rate: 0,
            }
        }

        fn next_delta(&mut self, _node: &FlowNode, _current: StockReading) -> i64 {
            -1_000
        }
    }

    fn focus() -> Focus {
        Catalog::builtin()
            .resolve(&Selection::Product("cro-1g".to_owned()))
            .expect("builtin product")
    }

    #[test]
    fn stock_never_goes_negative() {
        let mut scheduler = Scheduler::new();
        let mut session = ViewSession::new();
        session.mount(
            FlowView::new(FlowPreset::Live, focus(), &FlowSettings::live(), Box::new(Drain)),
            &mut scheduler,
        );

        for _ in 0..5 {
            let fired = scheduler.advance(Duration::from_secs(2));
            assert!(session.dispatch(&fired, scheduler.now()));
        }

        let view = session.view().expect("running view");
        for node in view.layout().nodes() {
            let reading = view.stock().get(&node.id).expect("every node has a gauge");
            assert_eq!(reading.current, 0);
            assert_eq!(view.status_of(node), Some(StockStatus::Critical));
        }
    }

    #[test]
    fn only_source_node_reports_clicks() {
        let view = FlowView::new(
            FlowPreset::Live,
            focus(),
            &FlowSettings::live(),
            Box::new(RandomWalk::seeded(1)),
        );
        let viewport = vec2(1_000.0, 500.0);

        let on_source = view.click(Pos2::new(80.0, 250.0), viewport, 20.0);
        assert_eq!(on_source, Some(EntityClick::Source(focus())));

        let on_ward = view.click(Pos2::new(900.0, 70.0), viewport, 20.0);
        assert_eq!(on_ward, None);
    }

    #[test]
    fn unmount_stops_particles_and_stock_updates() {
        let mut scheduler = Scheduler::new();
        let mut session = ViewSession::new();
        session.mount(
            FlowView::new(
                FlowPreset::Enhanced,
                focus(),
                &FlowSettings::enhanced(),
                Box::new(RandomWalk::seeded(9)),
            ),
            &mut scheduler,
        );
        assert_eq!(scheduler.active_timers(), 2);

        if let Some(view) = session.view_mut() {
            view.ensure_geometry(vec2(800.0, 600.0));
            assert_eq!(view.paths().len(), view.layout().edges().len());
            assert!(!view.particle_positions(Duration::from_secs(5)).is_empty());
        }

        session.teardown();
        assert_eq!(session.lifecycle(), Lifecycle::TornDown);
        assert_eq!(scheduler.active_timers(), 0);
        assert!(scheduler.advance(Duration::from_secs(10)).is_empty());
    }

    #[test]
    fn geometry_follows_viewport() {
        let mut view = FlowView::new(
            FlowPreset::Live,
            focus(),
            &FlowSettings::live(),
            Box::new(RandomWalk::seeded(2)),
        );
        assert!(view.positions().is_empty());

        view.ensure_geometry(vec2(100.0, 100.0));
        let small = view.positions()[0];
        view.ensure_geometry(vec2(200.0, 100.0));
        let wide = view.positions()[0];
        assert_eq!(wide.x, small.x * 2.0);
        assert_eq!(wide.y, small.y);
    }

    #[test]
    fn bubble_view_ticks_on_its_cadence() {
        let mut scheduler = Scheduler::new();
        let settings = BubbleSettings::default();
        let mut source = RandomWalk::seeded(4);
        let mut session = ViewSession::new();
        session.mount(BubbleView::new(focus(), &settings, &mut source), &mut scheduler);

        let fired = scheduler.advance(Duration::from_millis(150));
        assert!(session.dispatch(&fired, scheduler.now()));

        let view = session.view().expect("running view");
        assert_eq!(view.ticks(), 3);
        assert_eq!(view.field().len(), settings.labels.len());

        let first = &view.field().bubbles()[0];
        let clicked = view.click(first.position);
        assert!(matches!(clicked, Some(EntityClick::Bubble(_))));
    }
}
