use std::collections::VecDeque;
use std::time::Duration;

use eframe::egui::{self, Align, Context, Layout};

use pharma_flow::catalog::{Catalog, Selection};
use pharma_flow::config::DashboardConfig;
use pharma_flow::engine::{
    BubbleView, ConsumptionPolicy, FlowPreset, FlowView, RandomWalk, Scheduler, ViewSession,
};
use pharma_flow::util::stable_seed;

use super::super::{ActiveView, ViewModel};

/// Longest clock step taken in one frame; a stalled window does not replay
/// seconds of ticks at once.
const MAX_FRAME_STEP_SECS: f32 = 0.25;

fn initial_selection(catalog: &Catalog, previous: Option<Selection>) -> Option<Selection> {
    previous
        .filter(|selection| catalog.resolve(selection).is_some())
        .or_else(|| {
            catalog
                .products()
                .first()
                .map(|product| Selection::Product(product.id.clone()))
        })
}

impl ViewModel {
    pub(in crate::app) fn new(
        catalog: Catalog,
        config: DashboardConfig,
        active: ActiveView,
        previous: Option<(Selection, u64)>,
    ) -> Self {
        let base_seed = config.seed.unwrap_or_else(rand::random);
        tracing::info!(seed = base_seed, "synthetic data seed");

        let (previous_selection, reshuffles) = match previous {
            Some((selection, reshuffles)) => (Some(selection), reshuffles),
            None => (None, 0),
        };
        let selection = initial_selection(&catalog, previous_selection);

        let mut model = Self {
            catalog,
            config,
            base_seed,
            reshuffles,
            search: String::new(),
            selection,
            active,
            paused: false,
            scheduler: Scheduler::new(),
            bubbles: ViewSession::new(),
            flow: ViewSession::new(),
            last_click: None,
            show_fps_bar: true,
            fps_current: 0.0,
            fps_samples: VecDeque::new(),
        };
        model.rebuild_view();
        model
    }

    pub(in crate::app) fn select(&mut self, selection: Selection) {
        if self.selection.as_ref() == Some(&selection) {
            return;
        }
        self.selection = Some(selection);
        self.rebuild_view();
    }

    pub(in crate::app) fn activate(&mut self, view: ActiveView) {
        if self.active == view {
            return;
        }
        self.active = view;
        self.rebuild_view();
    }

    fn view_seed(&self, selection: &Selection) -> u64 {
        let key = format!("{}/{}", self.active.label(), selection.key());
        stable_seed(self.base_seed.wrapping_add(self.reshuffles), &key)
    }

    pub(in crate::app) fn rebuild_view(&mut self) {
        self.bubbles.teardown();
        self.flow.teardown();
        self.last_click = None;

        let Some(focus) = self
            .selection
            .as_ref()
            .and_then(|selection| self.catalog.resolve(selection))
        else {
            tracing::warn!("nothing selected, no view mounted");
            return;
        };

        let seed = self.view_seed(&focus.selection);
        tracing::info!(view = self.active.label(), focus = %focus.name, seed, "mounting view");

        match self.active.preset() {
            None => {
                let settings = &self.config.bubbles;
                let mut source = RandomWalk::seeded(seed)
                    .with_policy(ConsumptionPolicy::from_settings(settings));
                self.bubbles.mount(
                    BubbleView::new(focus, settings, &mut source),
                    &mut self.scheduler,
                );
            }
            Some(preset) => {
                let settings = match preset {
                    FlowPreset::Live => &self.config.live_flow,
                    FlowPreset::Enhanced => &self.config.enhanced_flow,
                };
                let source = RandomWalk::seeded(seed).with_max_delta(settings.max_delta);
                self.flow.mount(
                    FlowView::new(preset, focus, settings, Box::new(source)),
                    &mut self.scheduler,
                );
            }
        }
    }

    fn advance_clock(&mut self, ctx: &Context) {
        if self.paused {
            return;
        }

        let dt = ctx
            .input(|input| input.stable_dt)
            .clamp(0.0, MAX_FRAME_STEP_SECS);
        let fired = self.scheduler.advance(Duration::from_secs_f32(dt));
        if fired.is_empty() {
            return;
        }

        let now = self.scheduler.now();
        self.bubbles.dispatch(&fired, now);
        self.flow.dispatch(&fired, now);
    }

    pub(in crate::app) fn show(
        &mut self,
        ctx: &Context,
        catalog_label: &str,
        reload_requested: &mut bool,
        is_loading: bool,
    ) {
        self.update_fps_counter(ctx);
        self.advance_clock(ctx);

        egui::TopBottomPanel::top("top_bar")
            .resizable(false)
            .show(ctx, |ui| {
                ui.horizontal(|ui| {
                    ui.heading("pharma-flow");
                    ui.separator();
                    ui.label(format!("catalog: {catalog_label}"));
                    ui.label(format!("products: {}", self.catalog.products().len()));
                    ui.separator();

                    let mut requested_view = self.active;
                    for view in ActiveView::ALL {
                        ui.selectable_value(&mut requested_view, view, view.label());
                    }
                    self.activate(requested_view);
                    ui.separator();

                    ui.checkbox(&mut self.paused, "Pause")
                        .on_hover_text("Freeze every timer of the mounted view.");
                    if ui
                        .button("Reshuffle")
                        .on_hover_text("Rebuild the view with a new synthetic series.")
                        .clicked()
                    {
                        self.reshuffles += 1;
                        self.rebuild_view();
                    }
                    let reload_button =
                        ui.add_enabled(!is_loading, egui::Button::new("Reload catalog"));
                    if reload_button.clicked() {
                        *reload_requested = true;
                    }

                    ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
                        if let Some(fps_text) = self.fps_display_text() {
                            ui.label(fps_text);
                        }
                        ui.label(format!("timers: {}", self.scheduler.active_timers()));
                    });
                });
            });

        egui::SidePanel::left("controls")
            .resizable(true)
            .default_width(320.0)
            .show(ctx, |ui| self.draw_controls(ui));

        egui::SidePanel::right("details")
            .resizable(true)
            .default_width(340.0)
            .show(ctx, |ui| self.draw_details(ui));

        egui::CentralPanel::default().show(ctx, |ui| match self.active {
            ActiveView::Bubbles => self.draw_bubbles(ui),
            ActiveView::LiveFlow | ActiveView::EnhancedFlow => self.draw_flow(ui),
        });

        if !self.paused
            && let Some(wait) = self.scheduler.next_due_in()
        {
            ctx.request_repaint_after(wait);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reload_keeps_a_selection_that_still_resolves() {
        let catalog = Catalog::builtin();

        let kept = initial_selection(&catalog, Some(Selection::Product("mor-10".to_owned())));
        assert_eq!(kept, Some(Selection::Product("mor-10".to_owned())));

        let category = initial_selection(&catalog, Some(Selection::Category("Fluids".to_owned())));
        assert_eq!(category, Some(Selection::Category("Fluids".to_owned())));
    }

    #[test]
    fn reload_falls_back_when_the_selection_is_gone() {
        let catalog = Catalog::builtin();

        let fallback = initial_selection(&catalog, Some(Selection::Product("gone".to_owned())));
        assert_eq!(fallback, Some(Selection::Product("amx-500".to_owned())));
        assert_eq!(
            initial_selection(&catalog, None),
            Some(Selection::Product("amx-500".to_owned()))
        );
    }
}
