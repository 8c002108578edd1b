use std::fs;
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result, ensure};
use serde::Deserialize;

/// Dashboard tuning loaded from JSON. Every field is optional.
///
/// The two flow views start from different presets, so their JSON sections
/// are overrides applied on top of [`FlowSettings::live`] and
/// [`FlowSettings::enhanced`] respectively.
#[derive(Clone, Debug, PartialEq)]
pub struct DashboardConfig {
    pub seed: Option<u64>,
    pub bubbles: BubbleSettings,
    pub live_flow: FlowSettings,
    pub enhanced_flow: FlowSettings,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BubbleSettings {
    pub tick_ms: u64,
    pub labels: Vec<String>,
    pub over_ratio: f64,
    pub under_ratio: f64,
}

#[derive(Clone, Debug, PartialEq)]
pub struct FlowSettings {
    pub stock_period_ms: u64,
    pub max_delta: u32,
    pub critical_ratio: f64,
    pub low_ratio: f64,
    pub thresholds: TierThresholds,
    pub particles_per_path: usize,
    pub particle_duration_ms: u64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TierThresholds {
    pub source: u32,
    pub distribution: u32,
    pub consumption: u32,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct RawConfig {
    seed: Option<u64>,
    bubbles: BubbleSettings,
    live_flow: FlowOverrides,
    enhanced_flow: FlowOverrides,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct FlowOverrides {
    stock_period_ms: Option<u64>,
    max_delta: Option<u32>,
    critical_ratio: Option<f64>,
    low_ratio: Option<f64>,
    thresholds: ThresholdOverrides,
    particles_per_path: Option<usize>,
    particle_duration_ms: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct ThresholdOverrides {
    source: Option<u32>,
    distribution: Option<u32>,
    consumption: Option<u32>,
}

impl FlowOverrides {
    fn apply(self, mut base: FlowSettings) -> FlowSettings {
        if let Some(value) = self.stock_period_ms {
            base.stock_period_ms = value;
        }
        if let Some(value) = self.max_delta {
            base.max_delta = value;
        }
        if let Some(value) = self.critical_ratio {
            base.critical_ratio = value;
        }
        if let Some(value) = self.low_ratio {
            base.low_ratio = value;
        }
        if let Some(value) = self.thresholds.source {
            base.thresholds.source = value;
        }
        if let Some(value) = self.thresholds.distribution {
            base.thresholds.distribution = value;
        }
        if let Some(value) = self.thresholds.consumption {
            base.thresholds.consumption = value;
        }
        if let Some(value) = self.particles_per_path {
            base.particles_per_path = value;
        }
        if let Some(value) = self.particle_duration_ms {
            base.particle_duration_ms = value;
        }
        base
    }
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            seed: None,
            bubbles: BubbleSettings::default(),
            live_flow: FlowSettings::live(),
            enhanced_flow: FlowSettings::enhanced(),
        }
    }
}

impl Default for BubbleSettings {
    fn default() -> Self {
        Self {
            tick_ms: 50,
            labels: ["Jan", "Feb", "Mar", "Apr", "May", "Jun"]
                .into_iter()
                .map(str::to_owned)
                .collect(),
            over_ratio: 1.2,
            under_ratio: 0.8,
        }
    }
}

impl FlowSettings {
    pub fn live() -> Self {
        Self {
            stock_period_ms: 2_000,
            max_delta: 40,
            critical_ratio: 0.3,
            low_ratio: 0.6,
            thresholds: TierThresholds {
                source: 1_200,
                distribution: 600,
                consumption: 300,
            },
            particles_per_path: 2,
            particle_duration_ms: 2_400,
        }
    }

    pub fn enhanced() -> Self {
        Self {
            stock_period_ms: 3_000,
            max_delta: 60,
            critical_ratio: 0.25,
            low_ratio: 0.5,
            thresholds: TierThresholds {
                source: 1_500,
                distribution: 800,
                consumption: 250,
            },
            particles_per_path: 3,
            particle_duration_ms: 3_000,
        }
    }

    pub fn stock_period(&self) -> Duration {
        Duration::from_millis(self.stock_period_ms)
    }

    pub fn particle_duration(&self) -> Duration {
        Duration::from_millis(self.particle_duration_ms)
    }

    fn validate(&self, name: &str) -> Result<()> {
        ensure!(self.stock_period_ms > 0, "{name}.stock_period_ms must be positive");
        ensure!(
            self.particle_duration_ms > 0,
            "{name}.particle_duration_ms must be positive"
        );
        ensure!(
            0.0 < self.critical_ratio && self.critical_ratio < self.low_ratio,
            "{name}: expected 0 < critical_ratio < low_ratio, got {} and {}",
            self.critical_ratio,
            self.low_ratio
        );
        ensure!(
            self.particles_per_path <= 16,
            "{name}.particles_per_path must be at most 16"
        );
        Ok(())
    }
}

impl BubbleSettings {
    pub fn tick(&self) -> Duration {
        Duration::from_millis(self.tick_ms)
    }

    fn validate(&self) -> Result<()> {
        ensure!(self.tick_ms > 0, "bubbles.tick_ms must be positive");
        ensure!(!self.labels.is_empty(), "bubbles.labels must not be empty");
        ensure!(
            0.0 < self.under_ratio && self.under_ratio < 1.0 && self.over_ratio > 1.0,
            "bubbles: expected 0 < under_ratio < 1 < over_ratio, got {} and {}",
            self.under_ratio,
            self.over_ratio
        );
        Ok(())
    }
}

impl DashboardConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        let config = Self::from_json(&raw)
            .with_context(|| format!("invalid config file {}", path.display()))?;
        tracing::info!(path = %path.display(), "loaded dashboard config");
        Ok(config)
    }

    pub fn from_json(raw: &str) -> Result<Self> {
        let raw: RawConfig = serde_json::from_str(raw).context("invalid JSON in config")?;
        let config = Self {
            seed: raw.seed,
            bubbles: raw.bubbles,
            live_flow: raw.live_flow.apply(FlowSettings::live()),
            enhanced_flow: raw.enhanced_flow.apply(FlowSettings::enhanced()),
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        self.bubbles.validate()?;
        self.live_flow.validate("live_flow")?;
        self.enhanced_flow.validate("enhanced_flow")?;
        Ok(())
    }
}
