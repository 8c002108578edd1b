use eframe::egui::{Color32, Painter, Pos2, Rect, Stroke, Vec2, pos2, vec2};

use pharma_flow::engine::{ConsumptionStatus, StockStatus};

const GRID_STEP: f32 = 56.0;

pub(super) fn blend_color(base: Color32, overlay: Color32, amount: f32) -> Color32 {
    let amount = amount.clamp(0.0, 1.0);
    let inverse = 1.0 - amount;

    Color32::from_rgba_unmultiplied(
        ((base.r() as f32 * inverse) + (overlay.r() as f32 * amount)) as u8,
        ((base.g() as f32 * inverse) + (overlay.g() as f32 * amount)) as u8,
        ((base.b() as f32 * inverse) + (overlay.b() as f32 * amount)) as u8,
        ((base.a() as f32 * inverse) + (overlay.a() as f32 * amount)) as u8,
    )
}

pub(super) fn draw_background(painter: &Painter, rect: Rect) {
    painter.rect_filled(rect, 0.0, Color32::from_rgb(19, 23, 29));
    let stroke = Stroke::new(1.0, Color32::from_rgba_unmultiplied(60, 70, 80, 70));

    let mut x = rect.left() + GRID_STEP;
    while x < rect.right() {
        painter.line_segment([pos2(x, rect.top()), pos2(x, rect.bottom())], stroke);
        x += GRID_STEP;
    }

    let mut y = rect.top() + GRID_STEP;
    while y < rect.bottom() {
        painter.line_segment([pos2(rect.left(), y), pos2(rect.right(), y)], stroke);
        y += GRID_STEP;
    }
}

pub(super) fn consumption_color(status: ConsumptionStatus) -> Color32 {
    match status {
        ConsumptionStatus::Over => Color32::from_rgb(232, 98, 86),
        ConsumptionStatus::Under => Color32::from_rgb(103, 166, 232),
        ConsumptionStatus::Normal => Color32::from_rgb(96, 196, 128),
    }
}

pub(super) fn stock_color(status: StockStatus) -> Color32 {
    match status {
        StockStatus::Critical => Color32::from_rgb(232, 78, 70),
        StockStatus::Low => Color32::from_rgb(240, 178, 72),
        StockStatus::Normal => Color32::from_rgb(96, 196, 128),
    }
}

#[derive(Clone, Copy, Debug)]
pub(super) struct FieldTransform {
    origin: Pos2,
    scale: f32,
}

impl FieldTransform {
    pub(super) fn fit(rect: Rect, extent: f32, margin: f32) -> Self {
        let side = (rect.width().min(rect.height()) - 2.0 * margin).max(1.0);
        let scale = side / extent.max(f32::EPSILON);
        let origin = rect.center() - vec2(side, side) * 0.5;
        Self { origin, scale }
    }

    pub(super) fn to_screen(self, field: Vec2) -> Pos2 {
        self.origin + field * self.scale
    }

    pub(super) fn to_field(self, screen: Pos2) -> Vec2 {
        (screen - self.origin) / self.scale
    }

    pub(super) fn scale(self) -> f32 {
        self.scale
    }
}
