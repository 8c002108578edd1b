use eframe::egui::{self, RichText, Ui};

use pharma_flow::engine::{EntityClick, Lifecycle};
use pharma_flow::util::format_quantity;

use super::super::render_utils::{consumption_color, stock_color};
use super::super::{ActiveView, ViewModel};

impl ViewModel {
    pub(in crate::app) fn draw_details(&mut self, ui: &mut Ui) {
        ui.heading("Details");
        ui.separator();

        let focus = match self.active {
            ActiveView::Bubbles => self.bubbles.view().map(|view| view.focus()),
            ActiveView::LiveFlow | ActiveView::EnhancedFlow => {
                self.flow.view().map(|view| view.focus())
            }
        };
        let Some(focus) = focus else {
            ui.label("No view mounted. Pick a product or category on the left.");
            return;
        };

        ui.label(RichText::new(&focus.name).strong());
        if let Some(category) = &focus.category {
            ui.small(format!("Category: {category}"));
        }
        ui.label(format!(
            "Average monthly consumption: {}",
            format_quantity(focus.consumption, &focus.unit)
        ));

        let lifecycle = match self.active {
            ActiveView::Bubbles => self.bubbles.lifecycle(),
            ActiveView::LiveFlow | ActiveView::EnhancedFlow => self.flow.lifecycle(),
        };
        let state = if lifecycle == Lifecycle::Running && self.paused {
            "paused".to_owned()
        } else {
            format!("{lifecycle:?}").to_lowercase()
        };
        ui.small(format!("{}: {state}", self.active.label()));

        ui.separator();
        match self.active {
            ActiveView::Bubbles => self.draw_bubble_details(ui),
            ActiveView::LiveFlow | ActiveView::EnhancedFlow => self.draw_stock_details(ui),
        }

        ui.separator();
        ui.label(RichText::new("Last click").strong());
        match &self.last_click {
            None => {
                ui.label("Click a bubble or the supply source node.");
            }
            Some(EntityClick::Bubble(bubble)) => {
                let unit = self
                    .bubbles
                    .view()
                    .map_or("", |view| view.focus().unit.as_str());
                ui.label(format!("Timeframe {}", bubble.label));
                ui.colored_label(
                    consumption_color(bubble.status),
                    format!(
                        "{} ({})",
                        format_quantity(bubble.consumption, unit),
                        bubble.status.label()
                    ),
                );
            }
            Some(EntityClick::Source(source_focus)) => {
                ui.label(format!("Supply source for {}", source_focus.name));
                ui.small(format!(
                    "Monthly demand {}",
                    format_quantity(source_focus.consumption, &source_focus.unit)
                ));
            }
        }
    }

    fn draw_bubble_details(&self, ui: &mut Ui) {
        let Some(view) = self.bubbles.view() else {
            return;
        };

        ui.label(RichText::new("Timeframes").strong());
        egui::Grid::new("bubble_details_grid")
            .num_columns(3)
            .striped(true)
            .show(ui, |ui| {
                for bubble in view.field().bubbles() {
                    ui.label(&bubble.label);
                    ui.label(format_quantity(bubble.consumption, &view.focus().unit));
                    ui.colored_label(consumption_color(bubble.status), bubble.status.label());
                    ui.end_row();
                }
            });
        ui.small(format!("{} physics ticks", view.ticks()));
    }

    fn draw_stock_details(&self, ui: &mut Ui) {
        let Some(view) = self.flow.view() else {
            return;
        };

        ui.label(RichText::new("Stock levels").strong());
        egui::Grid::new("stock_details_grid")
            .num_columns(5)
            .striped(true)
            .show(ui, |ui| {
                for node in view.layout().nodes() {
                    let Some(reading) = view.stock().get(&node.id) else {
                        continue;
                    };
                    let status = view.policy().classify_node(node, reading);
                    ui.label(&node.name);
                    ui.small(node.tier.label());
                    ui.label(reading.current.to_string());
                    ui.label(format!("{:+}", reading.rate));
                    ui.colored_label(stock_color(status), status.label());
                    ui.end_row();
                }
            });
        ui.small(format!(
            "{} particles in flight",
            view.animator().particles().len()
        ));
    }
}
