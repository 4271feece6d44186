use std::path::PathBuf;
use std::time::{Duration, Instant};

use crate::components::{
    detail_panel::DetailPanel, graph_canvas::GraphCanvas, notifications::NotificationManager,
    sidebar::Sidebar, tooltip::TooltipManager,
};
use crate::settings::{AppSettings, ThemeMode};
use crate::theme::{self, error_box, spacing};
use callscope_core::{FunctionRef, load_call_graph};
use callscope_events::{AppState, Event, EventBus, EventListener};
use callscope_graph::{ColorAssigner, GraphModel, LayoutEngine, clamp_link_distance};
use eframe::egui;

const SETTINGS_SAVE_INTERVAL: Duration = Duration::from_secs(1);

pub struct CallscopeApp {
    state: AppState,
    event_bus: EventBus,

    // Live layout for the current selection
    layout: LayoutEngine,
    colors: ColorAssigner,
    graph_version: u64,
    shown_selection: Option<(u64, FunctionRef)>,

    // Settings
    settings: AppSettings,
    settings_dirty: bool,
    last_settings_save: Instant,
    applied_theme: Option<ThemeMode>,

    // Components
    sidebar: Sidebar,
    detail_panel: DetailPanel,
    canvas: GraphCanvas,
    tooltip_manager: TooltipManager,
    notification_manager: NotificationManager,
}

impl CallscopeApp {
    pub fn new(
        cc: &eframe::CreationContext<'_>,
        settings: AppSettings,
        initial_file: Option<PathBuf>,
    ) -> Self {
        theme::apply(&cc.egui_ctx, settings.theme);
        let link_distance = clamp_link_distance(settings.layout.link_distance);

        let mut app = Self {
            state: AppState::with_link_distance(link_distance),
            event_bus: EventBus::new(),
            layout: LayoutEngine::new(settings.layout.clone().with_link_distance(link_distance)),
            colors: ColorAssigner::default(),
            graph_version: 0,
            shown_selection: None,
            applied_theme: Some(settings.theme),
            settings_dirty: false,
            last_settings_save: Instant::now(),
            sidebar: Sidebar::new(),
            detail_panel: DetailPanel::new(),
            canvas: GraphCanvas::new(link_distance),
            tooltip_manager: TooltipManager::new(),
            notification_manager: NotificationManager::new(),
            settings,
        };

        let candidate = initial_file.or_else(|| {
            app.settings
                .last_opened_file
                .clone()
                .filter(|path| app.settings.auto_open_last_file && path.exists())
        });
        if let Some(path) = candidate {
            app.open_file(path);
        }
        app
    }

    /// Load a call graph from disk. Failures keep the current graph.
    fn open_file(&mut self, path: PathBuf) {
        match load_call_graph(&path) {
            Ok(graph) => {
                self.settings.last_opened_file = Some(path.clone());
                self.settings_dirty = true;
                self.event_bus.publish(Event::CallGraphLoaded {
                    source: path.display().to_string(),
                    graph,
                });
            }
            Err(err) => {
                tracing::error!("Failed to load {:?}: {}", path, err);
                self.event_bus.publish(Event::UpstreamFailed {
                    message: err.notice(),
                });
            }
        }
    }

    fn pick_file(&mut self) {
        let picked = rfd::FileDialog::new()
            .set_title("Open Call Graph")
            .add_filter("JSON", &["json"])
            .pick_file();
        if let Some(path) = picked {
            self.open_file(path);
        }
    }

    /// Rebuild the layout when the selection (or the graph under it) changed
    /// and restart it when the link distance moved.
    fn sync_layout(&mut self) {
        let wanted = self
            .state
            .selected_function
            .clone()
            .map(|function| (self.graph_version, function));

        if wanted != self.shown_selection {
            self.layout.clear();
            if let Some((_, function)) = &wanted {
                match GraphModel::for_selection(&self.state.graph, &function.file, &function.function)
                {
                    Ok(model) => {
                        self.colors = ColorAssigner::from_nodes(model.nodes());
                        self.fit_layout_to_canvas();
                        let generation = self.layout.load(model);
                        tracing::debug!(
                            "Layout generation {} for {}::{}",
                            generation,
                            function.file,
                            function.function
                        );
                    }
                    Err(err) => {
                        tracing::warn!("Cannot build graph for {:?}: {}", function, err);
                        self.notification_manager.error(err.notice());
                    }
                }
            }
            self.shown_selection = wanted;
        }

        let distance = clamp_link_distance(self.state.link_distance);
        if (self.layout.config().link_distance - distance).abs() > f32::EPSILON {
            self.layout.set_link_distance(distance);
        }
    }

    fn fit_layout_to_canvas(&mut self) {
        let Some(size) = self.canvas.canvas_size() else {
            return;
        };
        if size.x <= 0.0 || size.y <= 0.0 {
            return;
        }
        let mut config = self.layout.config().clone();
        config.width = size.x;
        config.height = size.y;
        self.layout.set_config(config);
    }

    fn flush_settings(&mut self) {
        if self.settings_dirty && self.last_settings_save.elapsed() >= SETTINGS_SAVE_INTERVAL {
            self.settings.save();
            self.settings_dirty = false;
            self.last_settings_save = Instant::now();
        }
    }

    fn menu_bar(&mut self, ctx: &egui::Context) {
        let mut open_requested = false;
        let mut reload_requested = false;

        egui::TopBottomPanel::top("menu_bar").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.menu_button("File", |ui| {
                    if ui.button("Open Call Graph...").clicked() {
                        open_requested = true;
                        ui.close();
                    }
                    let can_reload = self.settings.last_opened_file.is_some();
                    if ui.add_enabled(can_reload, egui::Button::new("Reload")).clicked() {
                        reload_requested = true;
                        ui.close();
                    }
                    ui.separator();
                    if ui.button("Exit").clicked() {
                        ctx.send_viewport_cmd(egui::ViewportCommand::Close);
                    }
                });
                ui.menu_button("View", |ui| {
                    let mut theme = self.settings.theme;
                    ui.radio_value(&mut theme, ThemeMode::Light, "Light");
                    ui.radio_value(&mut theme, ThemeMode::Dark, "Dark");
                    if theme != self.settings.theme {
                        self.settings.theme = theme;
                        self.settings_dirty = true;
                    }
                    ui.separator();
                    if ui
                        .checkbox(&mut self.settings.show_tooltips, "Show tooltips")
                        .changed()
                    {
                        self.settings_dirty = true;
                    }
                });
            });
        });

        if open_requested {
            self.pick_file();
        }
        if reload_requested && let Some(path) = self.settings.last_opened_file.clone() {
            self.open_file(path);
        }
    }

    fn error_banner(&mut self, ctx: &egui::Context) {
        let Some(message) = self.state.last_error.clone() else {
            return;
        };
        egui::TopBottomPanel::top("error_banner").show(ctx, |ui| {
            ui.add_space(spacing::ITEM_SPACING / 2.0);
            ui.horizontal(|ui| {
                error_box(ui, &message);
                if ui.button("Dismiss").clicked() {
                    self.event_bus.publish(Event::NoticeDismissed);
                }
            });
            ui.add_space(spacing::ITEM_SPACING / 2.0);
        });
    }

    fn status_bar(&self, ctx: &egui::Context) {
        egui::TopBottomPanel::bottom("status_bar").show(ctx, |ui| {
            ui.horizontal(|ui| {
                match &self.state.source {
                    Some(source) => {
                        ui.label(format!("{} ({} files)", source, self.state.graph.len()));
                    }
                    None => {
                        ui.weak("No call graph loaded");
                    }
                }
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    if let Some(simulation) = self.layout.simulation() {
                        let status = if simulation.is_running() {
                            format!("Simulating (alpha {:.3})", simulation.alpha())
                        } else {
                            "Settled".to_string()
                        };
                        ui.weak(format!(
                            "{} nodes · {} edges · {}",
                            simulation.model().node_count(),
                            simulation.model().edge_count(),
                            status
                        ));
                    }
                });
            });
        });
    }
}

impl eframe::App for CallscopeApp {
    fn on_exit(&mut self, _gl: Option<&eframe::glow::Context>) {
        self.settings.save();
    }

    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        if self.applied_theme != Some(self.settings.theme) {
            tracing::info!("Applying theme {:?}", self.settings.theme);
            theme::apply(ctx, self.settings.theme);
            self.applied_theme = Some(self.settings.theme);
        }

        // Events published last frame advance the state before anything draws.
        let bus = self.event_bus.clone();
        bus.dispatch_to(self);

        self.sidebar.sync(&self.state, self.graph_version);
        self.canvas.set_link_distance(self.state.link_distance);
        self.sync_layout();

        if let Some(rect) = ctx.input(|i| i.viewport().inner_rect) {
            self.settings.window_width = rect.width();
            self.settings.window_height = rect.height();
        }
        self.flush_settings();

        self.menu_bar(ctx);
        self.error_banner(ctx);
        self.status_bar(ctx);

        egui::SidePanel::left("sidebar")
            .resizable(true)
            .default_width(280.0)
            .show(ctx, |ui| {
                self.sidebar.ui(ui, &self.state, &self.event_bus);
            });

        egui::SidePanel::right("details")
            .resizable(true)
            .default_width(320.0)
            .show(ctx, |ui| {
                self.detail_panel
                    .ui(ui, &self.state, self.layout.simulation(), &self.event_bus);
            });

        let output = egui::CentralPanel::default()
            .show(ctx, |ui| {
                self.canvas.toolbar(ui, &self.event_bus);
                ui.separator();
                self.canvas
                    .show(ui, &mut self.layout, &self.colors, &self.event_bus)
            })
            .inner;

        match output.hover {
            Some((info, pos)) if self.settings.show_tooltips => self.tooltip_manager.show(info, pos),
            _ => self.tooltip_manager.hide(),
        }
        self.tooltip_manager.ui(ctx);
        self.notification_manager.render(ctx);

        if self.layout.tick() || self.layout.is_running() {
            ctx.request_repaint();
        }
    }
}

impl EventListener for CallscopeApp {
    fn handle_event(&mut self, event: &Event) {
        let state = std::mem::take(&mut self.state);
        self.state = state.apply(event);

        match event {
            Event::CallGraphLoaded { source, graph } => {
                self.graph_version += 1;
                self.notification_manager
                    .info(format!("Loaded {} files from {}", graph.len(), source));
            }
            Event::UpstreamFailed { message } => {
                self.notification_manager.error(message.clone());
            }
            Event::LinkDistanceChanged { distance } => {
                self.settings.layout.link_distance = clamp_link_distance(*distance);
                self.settings_dirty = true;
            }
            _ => {}
        }
    }
}
