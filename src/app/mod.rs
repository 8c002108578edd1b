use std::collections::VecDeque;
use std::path::PathBuf;
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::thread;

use eframe::egui::{self, Context};

use pharma_flow::catalog::{Catalog, Selection};
use pharma_flow::config::DashboardConfig;
use pharma_flow::engine::{BubbleView, EntityClick, FlowPreset, FlowView, Scheduler, ViewSession};

mod canvas;
mod render_utils;
mod ui;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum ActiveView {
    #[default]
    Bubbles,
    LiveFlow,
    EnhancedFlow,
}

impl ActiveView {
    const ALL: [Self; 3] = [Self::Bubbles, Self::LiveFlow, Self::EnhancedFlow];

    fn label(self) -> &'static str {
        match self {
            Self::Bubbles => "Consumption bubbles",
            Self::LiveFlow => FlowPreset::Live.label(),
            Self::EnhancedFlow => FlowPreset::Enhanced.label(),
        }
    }

    fn preset(self) -> Option<FlowPreset> {
        match self {
            Self::Bubbles => None,
            Self::LiveFlow => Some(FlowPreset::Live),
            Self::EnhancedFlow => Some(FlowPreset::Enhanced),
        }
    }
}

pub struct DashboardApp {
    catalog_path: Option<PathBuf>,
    config: DashboardConfig,
    initial_view: ActiveView,
    state: AppState,
    reload_rx: Option<Receiver<Result<Catalog, String>>>,
}

enum AppState {
    Loading {
        rx: Receiver<Result<Catalog, String>>,
    },
    Ready(Box<ViewModel>),
    Error(String),
}

struct ViewModel {
    catalog: Catalog,
    config: DashboardConfig,
    base_seed: u64,
    reshuffles: u64,
    search: String,
    selection: Option<Selection>,
    active: ActiveView,
    paused: bool,
    scheduler: Scheduler,
    bubbles: ViewSession<BubbleView>,
    flow: ViewSession<FlowView>,
    last_click: Option<EntityClick>,
    show_fps_bar: bool,
    fps_current: f32,
    fps_samples: VecDeque<f32>,
}

impl DashboardApp {
    pub fn new(
        _cc: &eframe::CreationContext<'_>,
        catalog_path: Option<PathBuf>,
        config: DashboardConfig,
        initial_view: ActiveView,
    ) -> Self {
        let state = Self::start_load(catalog_path.clone());
        Self {
            catalog_path,
            config,
            initial_view,
            state,
            reload_rx: None,
        }
    }

    fn spawn_load(catalog_path: Option<PathBuf>) -> Receiver<Result<Catalog, String>> {
        let (tx, rx) = mpsc::channel();

        thread::spawn(move || {
            let result = match catalog_path {
                Some(path) => Catalog::load(&path).map_err(|error| format!("{error:#}")),
                None => Ok(Catalog::builtin()),
            };
            let _ = tx.send(result);
        });

        rx
    }

    fn start_load(catalog_path: Option<PathBuf>) -> AppState {
        AppState::Loading {
            rx: Self::spawn_load(catalog_path),
        }
    }

    fn ready_state(
        &self,
        catalog: Catalog,
        view: ActiveView,
        previous: Option<(Selection, u64)>,
    ) -> AppState {
        AppState::Ready(Box::new(ViewModel::new(
            catalog,
            self.config.clone(),
            view,
            previous,
        )))
    }

    fn catalog_label(&self) -> String {
        self.catalog_path
            .as_ref()
            .map_or_else(|| "built-in demo".to_owned(), |path| path.display().to_string())
    }
}

impl eframe::App for DashboardApp {
    fn update(&mut self, ctx: &Context, _frame: &mut eframe::Frame) {
        let mut transition = None;
        let mut retry = false;
        let catalog_label = self.catalog_label();

        match &mut self.state {
            AppState::Loading { rx } => {
                match rx.try_recv() {
                    Ok(result) => transition = Some(result),
                    Err(TryRecvError::Empty) => ctx.request_repaint(),
                    Err(TryRecvError::Disconnected) => {
                        transition = Some(Err("Catalog loader disconnected".to_owned()));
                    }
                }

                egui::CentralPanel::default().show(ctx, |ui| {
                    ui.vertical_centered(|ui| {
                        ui.add_space(120.0);
                        ui.heading("Loading product catalog...");
                        ui.add_space(8.0);
                        ui.spinner();
                    });
                });
            }
            AppState::Error(error) => {
                egui::CentralPanel::default().show(ctx, |ui| {
                    ui.heading("Failed to load the product catalog");
                    ui.add_space(6.0);
                    ui.label(error.as_str());
                    ui.add_space(10.0);
                    retry = ui.button("Retry").clicked();
                });
            }
            AppState::Ready(model) => {
                let mut reload_requested = false;
                let is_reloading = self.reload_rx.is_some();
                model.show(ctx, &catalog_label, &mut reload_requested, is_reloading);

                if reload_requested && self.reload_rx.is_none() {
                    self.reload_rx = Some(Self::spawn_load(self.catalog_path.clone()));
                }

                if let Some(rx) = self.reload_rx.take() {
                    match rx.try_recv() {
                        Ok(result) => transition = Some(result),
                        Err(TryRecvError::Empty) => {
                            ctx.request_repaint();
                            self.reload_rx = Some(rx);
                        }
                        Err(TryRecvError::Disconnected) => {
                            transition = Some(Err("Catalog loader disconnected".to_owned()));
                        }
                    }
                }
            }
        }

        if retry {
            self.state = Self::start_load(self.catalog_path.clone());
            return;
        }

        let Some(result) = transition else {
            return;
        };

        self.reload_rx = None;
        let (view, previous) = match &self.state {
            AppState::Ready(model) => (
                model.active,
                model
                    .selection
                    .clone()
                    .map(|selection| (selection, model.reshuffles)),
            ),
            AppState::Loading { .. } | AppState::Error(_) => (self.initial_view, None),
        };
        self.state = match result {
            Ok(catalog) => self.ready_state(catalog, view, previous),
            Err(error) => {
                tracing::error!(%error, "catalog load failed");
                AppState::Error(error)
            }
        };
    }
}
