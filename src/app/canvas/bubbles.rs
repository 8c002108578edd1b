use eframe::egui::{Align2, Color32, FontId, Rect, Sense, Stroke, StrokeKind, Ui, vec2};

use pharma_flow::util::format_quantity;

use super::super::render_utils::{FieldTransform, blend_color, consumption_color, draw_background};
use super::super::ViewModel;

const FIELD_MARGIN: f32 = 16.0;

impl ViewModel {
    pub(in crate::app) fn draw_bubbles(&mut self, ui: &mut Ui) {
        let (response, painter) = ui.allocate_painter(ui.available_size(), Sense::click());
        let rect = response.rect;
        draw_background(&painter, rect);

        let Some(view) = self.bubbles.view() else {
            return;
        };

        let field = view.field();
        let transform = FieldTransform::fit(rect, field.extent(), FIELD_MARGIN);
        painter.rect_stroke(
            Rect::from_min_max(
                transform.to_screen(vec2(0.0, 0.0)),
                transform.to_screen(vec2(field.extent(), field.extent())),
            ),
            4.0,
            Stroke::new(1.0, Color32::from_gray(90)),
            StrokeKind::Inside,
        );

        let hovered = response
            .hover_pos()
            .and_then(|pointer| field.hit_test(transform.to_field(pointer)))
            .map(|bubble| bubble.id);

        for bubble in field.bubbles() {
            let center = transform.to_screen(bubble.position);
            let radius = bubble.radius() * transform.scale();
            let base = consumption_color(bubble.status);
            let fill = if hovered == Some(bubble.id) {
                blend_color(base, Color32::WHITE, 0.35)
            } else {
                base.gamma_multiply(0.85)
            };

            painter.circle_filled(center, radius, fill);
            painter.circle_stroke(
                center,
                radius,
                Stroke::new(1.0, Color32::from_rgba_unmultiplied(15, 15, 15, 190)),
            );
            painter.text(
                center,
                Align2::CENTER_CENTER,
                &bubble.label,
                FontId::proportional((radius * 0.5).clamp(10.0, 16.0)),
                Color32::from_gray(245),
            );
        }

        if let Some(bubble) = hovered.and_then(|id| field.bubbles().iter().find(|bubble| bubble.id == id)) {
            painter.text(
                rect.left_top() + vec2(10.0, 10.0),
                Align2::LEFT_TOP,
                format!(
                    "{}  |  {}  |  {}",
                    bubble.label,
                    format_quantity(bubble.consumption, &view.focus().unit),
                    bubble.status.label()
                ),
                FontId::proportional(13.0),
                Color32::from_gray(240),
            );
        }

        if response.clicked()
            && let Some(pointer) = response.interact_pointer_pos()
            && let Some(click) = view.click(transform.to_field(pointer))
        {
            tracing::debug!(?click, "bubble clicked");
            self.last_click = Some(click);
        }
    }
}
