use std::collections::HashMap;

use super::{FlowNode, Tier};
use crate::config::{FlowSettings, TierThresholds};
use crate::engine::source::StockSource;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct StockReading {
    pub current: u32,
    pub rate: i32,
}

impl StockReading {
    /// Applies `delta`, clamping at zero. `rate` records the change actually applied.
    pub fn perturbed(self, delta: i64) -> Self {
        let next = (i64::from(self.current) + delta).clamp(0, i64::from(u32::MAX));
        let next = next as u32;
        Self {
            current: next,
            rate: (i64::from(next) - i64::from(self.current)).clamp(
                i64::from(i32::MIN),
                i64::from(i32::MAX),
            ) as i32,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum StockStatus {
    Critical,
    Low,
    Normal,
}

impl StockStatus {
    pub fn label(self) -> &'static str {
        match self {
            Self::Critical => "critical",
            Self::Low => "low",
            Self::Normal => "normal",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StockPolicy {
    pub critical_ratio: f64,
    pub low_ratio: f64,
    pub thresholds: TierThresholds,
}

impl StockPolicy {
    pub fn from_settings(settings: &FlowSettings) -> Self {
        Self {
            critical_ratio: settings.critical_ratio,
            low_ratio: settings.low_ratio,
            thresholds: settings.thresholds,
        }
    }

    pub fn threshold(&self, tier: Tier) -> u32 {
        match tier {
            Tier::Source => self.thresholds.source,
            Tier::Distribution => self.thresholds.distribution,
            Tier::Consumption => self.thresholds.consumption,
        }
    }

    pub fn classify(&self, current: u32, threshold: u32) -> StockStatus {
        let current = f64::from(current);
        let threshold = f64::from(threshold);
        if current < self.critical_ratio * threshold {
            StockStatus::Critical
        } else if current < self.low_ratio * threshold {
            StockStatus::Low
        } else {
            StockStatus::Normal
        }
    }

    pub fn classify_node(&self, node: &FlowNode, reading: StockReading) -> StockStatus {
        self.classify(reading.current, self.threshold(node.tier))
    }
}

#[derive(Clone, Debug, Default)]
pub struct StockBoard {
    readings: HashMap<String, StockReading>,
}

impl StockBoard {
    pub fn randomized(
        nodes: &[FlowNode],
        policy: &StockPolicy,
        source: &mut dyn StockSource,
    ) -> Self {
        let readings = nodes
            .iter()
            .map(|node| {
                let reading = source.initial_reading(node, policy.threshold(node.tier));
                (node.id.clone(), reading)
            })
            .collect();

        Self { readings }
    }

    pub fn get(&self, node_id: &str) -> Option<StockReading> {
        self.readings.get(node_id).copied()
    }

    pub fn len(&self) -> usize {
        self.readings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.readings.is_empty()
    }

    pub fn perturb(&mut self, nodes: &[FlowNode], source: &mut dyn StockSource) {
        for node in nodes {
            if let Some(reading) = self.readings.get_mut(&node.id) {
                *reading = reading.perturbed(source.next_delta(node, *reading));
            }
        }
    }
}
