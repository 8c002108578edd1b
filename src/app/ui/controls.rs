use eframe::egui::{self, Align, Layout, Ui};

use pharma_flow::catalog::{DEFAULT_UNIT, Selection};
use pharma_flow::util::{format_quantity, short_label};

use super::super::ViewModel;

const ROW_HEIGHT: f32 = 22.0;
const NAME_CHARS: usize = 28;

impl ViewModel {
    pub(in crate::app) fn draw_controls(&mut self, ui: &mut Ui) {
        ui.heading("Catalog");
        ui.separator();
        ui.add_space(4.0);

        ui.label("Search (product name or SKU)")
            .on_hover_text("Fuzzy-filter the product list below.");
        ui.text_edit_singleline(&mut self.search);
        ui.add_space(4.0);

        let mut picked = None;

        let rows = self
            .catalog
            .search(&self.search)
            .into_iter()
            .map(|product| {
                (
                    Selection::Product(product.id.clone()),
                    short_label(&product.name, NAME_CHARS),
                    format_quantity(product.consumption, &product.unit),
                )
            })
            .collect::<Vec<_>>();

        ui.label(format!("Products ({})", rows.len()));
        egui::ScrollArea::vertical()
            .id_salt("product_list_scroll")
            .max_height(280.0)
            .auto_shrink([false, false])
            .show_rows(ui, ROW_HEIGHT, rows.len(), |ui, row_range| {
                for (selection, name, quantity) in &rows[row_range] {
                    let is_selected = self.selection.as_ref() == Some(selection);
                    let clicked = ui
                        .horizontal(|ui| {
                            let clicked = ui.selectable_label(is_selected, name).clicked();
                            ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
                                ui.small(quantity);
                            });
                            clicked
                        })
                        .inner;
                    if clicked {
                        picked = Some(selection.clone());
                    }
                }
            });

        ui.separator();
        ui.label("Categories");
        for summary in self.catalog.categories() {
            let selection = Selection::Category(summary.name.clone());
            let is_selected = self.selection.as_ref() == Some(&selection);
            let label = format!("{} ({})", summary.name, summary.product_count);
            if ui
                .selectable_label(is_selected, label)
                .on_hover_text(format!(
                    "Aggregate monthly consumption: {}",
                    format_quantity(summary.consumption, DEFAULT_UNIT)
                ))
                .clicked()
            {
                picked = Some(selection);
            }
        }

        if let Some(selection) = picked {
            self.select(selection);
        }

        ui.separator();
        ui.checkbox(&mut self.show_fps_bar, "Show FPS in top bar");

        ui.collapsing("Active tuning", |ui| {
            let bubbles = &self.config.bubbles;
            ui.label(format!(
                "Bubbles: tick {} ms, over > {:.2}, under < {:.2}",
                bubbles.tick_ms, bubbles.over_ratio, bubbles.under_ratio
            ));
            for (name, flow) in [
                ("Live", &self.config.live_flow),
                ("Enhanced", &self.config.enhanced_flow),
            ] {
                ui.label(format!(
                    "{name}: stock every {} ms, critical < {:.2}, low < {:.2}, {} particles/path",
                    flow.stock_period_ms, flow.critical_ratio, flow.low_ratio, flow.particles_per_path
                ));
            }
            ui.label(format!("Seed: {}", self.base_seed));
        });
    }
}
