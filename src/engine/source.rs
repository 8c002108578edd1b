use eframe::egui::vec2;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::catalog::Focus;

use super::bubbles::{Bubble, ConsumptionPolicy};
use super::flow::{FlowNode, StockReading};

pub trait BubbleSource {
    fn spawn_bubble(&mut self, index: usize, label: &str, focus: &Focus, extent: f32) -> Bubble;
}

pub trait StockSource {
    fn initial_reading(&mut self, node: &FlowNode, threshold: u32) -> StockReading;
    fn next_delta(&mut self, node: &FlowNode, current: StockReading) -> i64;
}

const MIN_SPEED: f32 = 0.15;
const MAX_SPEED: f32 = 0.6;
const SIZE_BASE: f32 = 10.0;
const SIZE_SPREAD: f32 = 8.0;
const CONSUMPTION_SWING: f64 = 0.4;

pub struct RandomWalk<R = StdRng> {
    rng: R,
    max_delta: u32,
    policy: ConsumptionPolicy,
}

impl RandomWalk<StdRng> {
    pub fn seeded(seed: u64) -> Self {
        Self::new(StdRng::seed_from_u64(seed))
    }
}

impl<R: Rng> RandomWalk<R> {
    pub fn new(rng: R) -> Self {
        Self {
            rng,
            max_delta: 40,
            policy: ConsumptionPolicy::default(),
        }
    }

    pub fn with_max_delta(mut self, max_delta: u32) -> Self {
        self.max_delta = max_delta;
        self
    }

    pub fn with_policy(mut self, policy: ConsumptionPolicy) -> Self {
        self.policy = policy;
        self
    }

    fn signed_speed(&mut self) -> f32 {
        let speed = self.rng.gen_range(MIN_SPEED..=MAX_SPEED);
        if self.rng.gen_bool(0.5) { speed } else { -speed }
    }
}

impl<R: Rng> BubbleSource for RandomWalk<R> {
    fn spawn_bubble(&mut self, index: usize, label: &str, focus: &Focus, extent: f32) -> Bubble {
        let factor = self
            .rng
            .gen_range((1.0 - CONSUMPTION_SWING)..=(1.0 + CONSUMPTION_SWING));
        let consumption = focus.consumption * factor;
        let status = self.policy.classify(consumption, focus.consumption);

        let spread = ((factor - (1.0 - CONSUMPTION_SWING)) / (2.0 * CONSUMPTION_SWING)) as f32;
        let size = (SIZE_BASE + spread * SIZE_SPREAD).min(extent);
        let radius = size * 0.5;
        let position = vec2(
            self.rng.gen_range(radius..=(extent - radius)),
            self.rng.gen_range(radius..=(extent - radius)),
        );
        let velocity = vec2(self.signed_speed(), self.signed_speed());

        Bubble {
            id: index,
            label: label.to_owned(),
            status,
            consumption,
            size,
            position,
            velocity,
        }
    }
}

impl<R: Rng> StockSource for RandomWalk<R> {
    fn initial_reading(&mut self, _node: &FlowNode, threshold: u32) -> StockReading {
        let threshold = threshold.max(1);
        StockReading {
            current: self.rng.gen_range(threshold / 5..=threshold.saturating_mul(3) / 2),
            rate: 0,
        }
    }

    fn next_delta(&mut self, _node: &FlowNode, _current: StockReading) -> i64 {
        let max_delta = i64::from(self.max_delta);
        self.rng.gen_range(-max_delta..=max_delta)
    }
}
