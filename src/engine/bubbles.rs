use eframe::egui::{Vec2, vec2};

use crate::catalog::Focus;
use crate::config::BubbleSettings;

use super::source::BubbleSource;

pub const FIELD_EXTENT: f32 = 100.0;
pub const MIN_BUBBLE_SIZE: f32 = 2.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ConsumptionStatus {
    Over,
    Under,
    Normal,
}

impl ConsumptionStatus {
    pub fn label(self) -> &'static str {
        match self {
            Self::Over => "over",
            Self::Under => "under",
            Self::Normal => "normal",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ConsumptionPolicy {
    pub over_ratio: f64,
    pub under_ratio: f64,
}

impl Default for ConsumptionPolicy {
    fn default() -> Self {
        Self {
            over_ratio: 1.2,
            under_ratio: 0.8,
        }
    }
}

impl ConsumptionPolicy {
    pub fn from_settings(settings: &BubbleSettings) -> Self {
        Self {
            over_ratio: settings.over_ratio,
            under_ratio: settings.under_ratio,
        }
    }

    pub fn classify(self, value: f64, baseline: f64) -> ConsumptionStatus {
        if value > baseline * self.over_ratio {
            ConsumptionStatus::Over
        } else if value < baseline * self.under_ratio {
            ConsumptionStatus::Under
        } else {
            ConsumptionStatus::Normal
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Bubble {
    pub id: usize,
    pub label: String,
    pub status: ConsumptionStatus,
    pub consumption: f64,
    pub size: f32,
    pub position: Vec2,
    pub velocity: Vec2,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Bounce {
    pub x: bool,
    pub y: bool,
}

impl Bubble {
    pub fn radius(&self) -> f32 {
        self.size * 0.5
    }

    fn advance(&mut self, extent: f32) -> Bounce {
        let radius = self.radius();
        let (x, flip_x) = reflect_axis(self.position.x + self.velocity.x, radius, extent);
        let (y, flip_y) = reflect_axis(self.position.y + self.velocity.y, radius, extent);

        self.position = vec2(x, y);
        if flip_x {
            self.velocity.x = -self.velocity.x;
        }
        if flip_y {
            self.velocity.y = -self.velocity.y;
        }

        Bounce {
            x: flip_x,
            y: flip_y,
        }
    }
}

/// Touching the wall counts as contact, so a bubble resting exactly on the
/// boundary still flips.
fn reflect_axis(next: f32, radius: f32, extent: f32) -> (f32, bool) {
    if next - radius <= 0.0 || next + radius >= extent {
        (next.clamp(radius, extent - radius), true)
    } else {
        (next, false)
    }
}

#[derive(Clone, Debug)]
pub struct BubbleField {
    extent: f32,
    bubbles: Vec<Bubble>,
}

impl BubbleField {
    pub fn new(extent: f32, bubbles: Vec<Bubble>) -> Self {
        let extent = extent.max(MIN_BUBBLE_SIZE);
        let bubbles = bubbles
            .into_iter()
            .map(|mut bubble| {
                bubble.size = bubble.size.clamp(MIN_BUBBLE_SIZE, extent);
                let radius = bubble.radius();
                bubble.position = vec2(
                    bubble.position.x.clamp(radius, extent - radius),
                    bubble.position.y.clamp(radius, extent - radius),
                );
                bubble
            })
            .collect();

        Self { extent, bubbles }
    }

    pub fn spawn(labels: &[String], focus: &Focus, source: &mut dyn BubbleSource) -> Self {
        let bubbles = labels
            .iter()
            .enumerate()
            .map(|(index, label)| source.spawn_bubble(index, label, focus, FIELD_EXTENT))
            .collect();

        Self::new(FIELD_EXTENT, bubbles)
    }

    pub fn extent(&self) -> f32 {
        self.extent
    }

    pub fn bubbles(&self) -> &[Bubble] {
        &self.bubbles
    }

    pub fn len(&self) -> usize {
        self.bubbles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bubbles.is_empty()
    }

    pub fn step(&mut self) -> Vec<Bounce> {
        let extent = self.extent;
        self.bubbles
            .iter_mut()
            .map(|bubble| bubble.advance(extent))
            .collect()
    }

    pub fn hit_test(&self, point: Vec2) -> Option<&Bubble> {
        self.bubbles
            .iter()
            .rev()
            .find(|bubble| (bubble.position - point).length() <= bubble.radius())
    }
}
