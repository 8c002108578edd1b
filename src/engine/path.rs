use eframe::egui::{Pos2, pos2, vec2};

const CURVE_SEGMENTS: usize = 32;

#[derive(Clone, Debug, PartialEq)]
pub struct FlowPath {
    points: Vec<Pos2>,
    cumulative: Vec<f32>,
}

impl FlowPath {
    pub fn from_points(points: Vec<Pos2>) -> Option<Self> {
        if points.is_empty() {
            return None;
        }

        let mut cumulative = Vec::with_capacity(points.len());
        let mut total = 0.0;
        cumulative.push(0.0);
        for pair in points.windows(2) {
            total += pair[0].distance(pair[1]);
            cumulative.push(total);
        }

        Some(Self { points, cumulative })
    }

    pub fn curve(start: Pos2, end: Pos2) -> Self {
        let bend = (end.x - start.x) * 0.5;
        let control_a = start + vec2(bend, 0.0);
        let control_b = end - vec2(bend, 0.0);

        let points = (0..=CURVE_SEGMENTS)
            .map(|step| {
                let t = step as f32 / CURVE_SEGMENTS as f32;
                cubic_bezier(start, control_a, control_b, end, t)
            })
            .collect();

        Self::from_points(points).unwrap_or_else(|| Self {
            points: vec![start],
            cumulative: vec![0.0],
        })
    }

    pub fn points(&self) -> &[Pos2] {
        &self.points
    }

    pub fn length(&self) -> f32 {
        self.cumulative.last().copied().unwrap_or(0.0)
    }

    /// Point at fraction `t` of the arc length, `t` clamped to `[0, 1]`.
    pub fn point_at(&self, t: f32) -> Pos2 {
        let total = self.length();
        if total <= f32::EPSILON || self.points.len() == 1 {
            return self.points[0];
        }

        let target = t.clamp(0.0, 1.0) * total;
        let segment = self
            .cumulative
            .partition_point(|&distance| distance < target)
            .clamp(1, self.points.len() - 1);

        let from = self.cumulative[segment - 1];
        let span = self.cumulative[segment] - from;
        let local = if span > f32::EPSILON {
            (target - from) / span
        } else {
            0.0
        };

        self.points[segment - 1].lerp(self.points[segment], local)
    }
}

fn cubic_bezier(p0: Pos2, p1: Pos2, p2: Pos2, p3: Pos2, t: f32) -> Pos2 {
    let u = 1.0 - t;
    let a = u * u * u;
    let b = 3.0 * u * u * t;
    let c = 3.0 * u * t * t;
    let d = t * t * t;
    pos2(
        a * p0.x + b * p1.x + c * p2.x + d * p3.x,
        a * p0.y + b * p1.y + c * p2.y + d * p3.y,
    )
}
