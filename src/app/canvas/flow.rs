use eframe::egui::{
    Align2, Color32, CursorIcon, FontId, Rect, Sense, Shape, Stroke, Ui, pos2, vec2,
};

use pharma_flow::engine::Tier;
use pharma_flow::util::short_label;

use super::super::render_utils::{blend_color, draw_background, stock_color};
use super::super::ViewModel;

const NODE_RADIUS: f32 = 22.0;
const PARTICLE_RADIUS: f32 = 3.5;
const GAUGE_WIDTH: f32 = 64.0;
const GAUGE_HEIGHT: f32 = 6.0;
const GAUGE_SPAN: f32 = 1.5;
const LABEL_CHARS: usize = 18;

impl ViewModel {
    pub(in crate::app) fn draw_flow(&mut self, ui: &mut Ui) {
        let (response, painter) = ui.allocate_painter(ui.available_size(), Sense::click());
        let rect = response.rect;
        draw_background(&painter, rect);

        let now = self.scheduler.now();
        let Some(view) = self.flow.view_mut() else {
            return;
        };
        let inner = rect.shrink(NODE_RADIUS * 2.0);
        view.ensure_geometry(inner.size());
        let view = &*view;
        let offset = inner.min.to_vec2();

        for path in view.paths() {
            let points = path.points().iter().map(|point| *point + offset).collect();
            painter.add(Shape::line(
                points,
                Stroke::new(2.0, Color32::from_rgba_unmultiplied(120, 132, 148, 150)),
            ));
        }

        for (_, position) in view.particle_positions(now) {
            painter.circle_filled(position + offset, PARTICLE_RADIUS, Color32::from_rgb(246, 206, 104));
        }

        let pointer = response.hover_pos().map(|pointer| pointer - offset);
        let hovered = pointer
            .and_then(|pointer| view.layout().hit_test(pointer, inner.size(), NODE_RADIUS))
            .map(|node| node.id.clone());

        for (node, position) in view.layout().nodes().iter().zip(view.positions()) {
            let center = *position + offset;
            let reading = view.stock().get(&node.id).unwrap_or_default();
            let status = view.policy().classify_node(node, reading);
            let base = stock_color(status);
            let is_hovered = hovered.as_deref() == Some(node.id.as_str());
            let fill = if is_hovered {
                blend_color(base, Color32::WHITE, 0.3)
            } else {
                base
            };

            painter.circle_filled(center, NODE_RADIUS, fill);
            let ring = if node.tier == Tier::Source {
                Stroke::new(2.5, Color32::from_rgb(245, 206, 93))
            } else {
                Stroke::new(1.0, Color32::from_rgba_unmultiplied(15, 15, 15, 190))
            };
            painter.circle_stroke(center, NODE_RADIUS, ring);
            painter.text(
                center,
                Align2::CENTER_CENTER,
                reading.current.to_string(),
                FontId::monospace(11.0),
                Color32::from_gray(20),
            );

            let threshold = view.policy().threshold(node.tier).max(1) as f32;
            let fraction = (reading.current as f32 / (threshold * GAUGE_SPAN)).clamp(0.0, 1.0);
            let gauge = Rect::from_min_size(
                center + vec2(-GAUGE_WIDTH * 0.5, NODE_RADIUS + 4.0),
                vec2(GAUGE_WIDTH, GAUGE_HEIGHT),
            );
            painter.rect_filled(gauge, 2.0, Color32::from_gray(50));
            painter.rect_filled(
                Rect::from_min_size(gauge.min, vec2(GAUGE_WIDTH * fraction, GAUGE_HEIGHT)),
                2.0,
                base,
            );
            painter.text(
                pos2(center.x, gauge.bottom() + 3.0),
                Align2::CENTER_TOP,
                short_label(&node.name, LABEL_CHARS),
                FontId::proportional(12.0),
                Color32::from_gray(238),
            );
        }

        let hovered_source = pointer.is_some_and(|pointer| {
            view.click(pointer, inner.size(), NODE_RADIUS).is_some()
        });
        if hovered_source {
            ui.ctx().set_cursor_icon(CursorIcon::PointingHand);
        }

        let click = response
            .interact_pointer_pos()
            .filter(|_| response.clicked())
            .and_then(|pointer| view.click(pointer - offset, inner.size(), NODE_RADIUS));
        if let Some(click) = click {
            tracing::debug!(?click, "source node clicked");
            self.last_click = Some(click);
        }
    }
}
