mod stock;

use std::collections::HashSet;

use anyhow::{Result, anyhow, ensure};
use eframe::egui::{Pos2, Vec2, pos2};

pub use stock::{StockBoard, StockPolicy, StockReading, StockStatus};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Tier {
    Source,
    Distribution,
    Consumption,
}

impl Tier {
    pub fn label(self) -> &'static str {
        match self {
            Self::Source => "source",
            Self::Distribution => "distribution",
            Self::Consumption => "consumption",
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct FlowNode {
    pub id: String,
    pub name: String,
    pub normalized: Pos2,
    pub tier: Tier,
}

impl FlowNode {
    pub fn new(id: &str, name: &str, x: f32, y: f32, tier: Tier) -> Self {
        Self {
            id: id.to_owned(),
            name: name.to_owned(),
            normalized: pos2(x.clamp(0.0, 1.0), y.clamp(0.0, 1.0)),
            tier,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct FlowEdge {
    pub from: usize,
    pub to: usize,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FlowPreset {
    Live,
    Enhanced,
}

impl FlowPreset {
    pub fn label(self) -> &'static str {
        match self {
            Self::Live => "Live flow",
            Self::Enhanced => "Enhanced flow",
        }
    }
}

const LIVE_LINKS: &[(&str, &str)] = &[
    ("supplier", "warehouse"),
    ("warehouse", "pharmacy"),
    ("warehouse", "satellite"),
    ("pharmacy", "icu"),
    ("pharmacy", "emergency"),
    ("satellite", "surgery"),
    ("satellite", "oncology"),
];

const ENHANCED_LINKS: &[(&str, &str)] = &[
    ("manufacturer", "central"),
    ("wholesaler", "central"),
    ("wholesaler", "unit-dose"),
    ("central", "cabinets"),
    ("central", "icu"),
    ("unit-dose", "cabinets"),
    ("cabinets", "emergency"),
    ("cabinets", "surgery"),
    ("cabinets", "internal"),
    ("unit-dose", "pediatrics"),
];

#[derive(Clone, Debug)]
pub struct FlowLayout {
    nodes: Vec<FlowNode>,
    edges: Vec<FlowEdge>,
}

impl FlowLayout {
    pub fn new(nodes: Vec<FlowNode>, edges: Vec<FlowEdge>) -> Result<Self> {
        let mut seen = HashSet::with_capacity(nodes.len());
        for node in &nodes {
            if !seen.insert(node.id.as_str()) {
                return Err(anyhow!("duplicate flow node id `{}`", node.id));
            }
        }

        for edge in &edges {
            ensure!(
                edge.from < nodes.len() && edge.to < nodes.len(),
                "flow edge {} -> {} references a missing node",
                edge.from,
                edge.to
            );
            ensure!(edge.from != edge.to, "flow edge {} loops onto itself", edge.from);
        }

        Ok(Self { nodes, edges })
    }

    pub fn preset(preset: FlowPreset) -> Self {
        let (nodes, links) = match preset {
            FlowPreset::Live => (
                vec![
                    FlowNode::new("supplier", "Supplier", 0.08, 0.5, Tier::Source),
                    FlowNode::new("warehouse", "Central Warehouse", 0.34, 0.5, Tier::Distribution),
                    FlowNode::new("pharmacy", "Main Pharmacy", 0.6, 0.3, Tier::Distribution),
                    FlowNode::new("satellite", "Satellite Pharmacy", 0.6, 0.7, Tier::Distribution),
                    FlowNode::new("icu", "ICU", 0.9, 0.14, Tier::Consumption),
                    FlowNode::new("emergency", "Emergency", 0.9, 0.38, Tier::Consumption),
                    FlowNode::new("surgery", "Surgery", 0.9, 0.62, Tier::Consumption),
                    FlowNode::new("oncology", "Oncology", 0.9, 0.86, Tier::Consumption),
                ],
                LIVE_LINKS,
            ),
            FlowPreset::Enhanced => (
                vec![
                    FlowNode::new("manufacturer", "Manufacturer", 0.07, 0.3, Tier::Source),
                    FlowNode::new("wholesaler", "Wholesaler", 0.07, 0.7, Tier::Source),
                    FlowNode::new("central", "Central Pharmacy", 0.38, 0.4, Tier::Distribution),
                    FlowNode::new("unit-dose", "Unit-Dose Station", 0.38, 0.78, Tier::Distribution),
                    FlowNode::new("cabinets", "Dispensing Cabinets", 0.64, 0.55, Tier::Distribution),
                    FlowNode::new("icu", "ICU", 0.92, 0.12, Tier::Consumption),
                    FlowNode::new("emergency", "Emergency", 0.92, 0.31, Tier::Consumption),
                    FlowNode::new("surgery", "Surgery", 0.92, 0.5, Tier::Consumption),
                    FlowNode::new("internal", "Internal Medicine", 0.92, 0.69, Tier::Consumption),
                    FlowNode::new("pediatrics", "Pediatrics", 0.92, 0.88, Tier::Consumption),
                ],
                ENHANCED_LINKS,
            ),
        };

        let index_of = |id: &str| nodes.iter().position(|node| node.id == id);
        let edges = links
            .iter()
            .filter_map(|&(from, to)| {
                Some(FlowEdge {
                    from: index_of(from)?,
                    to: index_of(to)?,
                })
            })
            .collect();

        Self { nodes, edges }
    }

    pub fn nodes(&self) -> &[FlowNode] {
        &self.nodes
    }

    pub fn edges(&self) -> &[FlowEdge] {
        &self.edges
    }

    pub fn place(&self, viewport: Vec2) -> Vec<Pos2> {
        self.nodes
            .iter()
            .map(|node| pos2(node.normalized.x * viewport.x, node.normalized.y * viewport.y))
            .collect()
    }

    pub fn hit_test(&self, point: Pos2, viewport: Vec2, radius: f32) -> Option<&FlowNode> {
        self.place(viewport)
            .into_iter()
            .zip(&self.nodes)
            .map(|(position, node)| (position.distance(point), node))
            .filter(|(distance, _)| *distance <= radius)
            .min_by(|a, b| a.0.total_cmp(&b.0))
            .map(|(_, node)| node)
    }
}
