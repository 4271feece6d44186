use crate::theme::{badge, card, empty_state, info_box, labeled_separator, spacing};
use callscope_core::{CallRef, FileStatus, FunctionInfo, FunctionRef, lookup};
use callscope_events::{AppState, Event, EventBus};
use callscope_graph::{EdgeSummary, ForceSimulation, NodeInspection, file_name};
use eframe::egui;

/// Right-hand panel: details for the selected function, an overview of the
/// selected file, and the node last clicked in the graph.
#[derive(Default)]
pub struct DetailPanel;

impl DetailPanel {
    pub fn new() -> Self {
        Self
    }

    pub fn ui(
        &mut self,
        ui: &mut egui::Ui,
        state: &AppState,
        simulation: Option<&ForceSimulation>,
        bus: &EventBus,
    ) {
        egui::ScrollArea::vertical()
            .id_salt("detail_panel")
            .auto_shrink([false, false])
            .show(ui, |ui| {
                if let Some(inspection) = inspected(state, simulation) {
                    inspection_ui(ui, &inspection, bus);
                    ui.add_space(spacing::SECTION_SPACING);
                }

                match (&state.selected_function, &state.selected_file) {
                    (Some(function), _) => function_ui(ui, state, function),
                    (None, Some(path)) => file_ui(ui, state, path, bus),
                    (None, None) => {
                        empty_state(ui, "Nothing selected", "Pick a function in the sidebar");
                    }
                }
            });
    }
}

fn inspected(state: &AppState, simulation: Option<&ForceSimulation>) -> Option<NodeInspection> {
    let name = state.inspected.as_deref()?;
    let simulation = simulation?;
    let idx = simulation.model().index_of(name)?;
    simulation.inspect(idx)
}

fn inspection_ui(ui: &mut egui::Ui, inspection: &NodeInspection, bus: &EventBus) {
    card(ui, |ui| {
        ui.horizontal(|ui| {
            ui.heading(inspection.function.as_str());
            if inspection.is_fixture {
                let fill = ui.visuals().warn_fg_color.gamma_multiply(0.3);
                badge(ui, "fixture", fill);
            }
            if ui.small_button("Close").clicked() {
                bus.publish(Event::NodeInspected { function: None });
            }
        });
        ui.label(format!("File: {}", inspection.file));
        ui.label(format!("Line: {}", line_text(inspection.line)));
        match selectable_ref(inspection) {
            Some(function) => {
                if ui.link("Select in sidebar").clicked() {
                    bus.publish(Event::FunctionSelected { function });
                }
            }
            None => {
                ui.weak("Not defined in the analyzed files");
            }
        }

        labeled_separator(ui, "Calls");
        summaries_ui(ui, &inspection.calls);
        labeled_separator(ui, "Called by");
        summaries_ui(ui, &inspection.called_by);
    });
}

/// Functions defined somewhere in the graph can become the selection;
/// external callees cannot.
fn selectable_ref(inspection: &NodeInspection) -> Option<FunctionRef> {
    (!inspection.external).then(|| FunctionRef::new(&inspection.file, &inspection.function))
}

fn summaries_ui(ui: &mut egui::Ui, summaries: &[EdgeSummary]) {
    if summaries.is_empty() {
        ui.weak("(none)");
    }
    for summary in summaries {
        ui.label(summary_text(summary));
    }
}

fn summary_text(summary: &EdgeSummary) -> String {
    let lines: Vec<String> = summary.lines.iter().map(u32::to_string).collect();
    if lines.is_empty() {
        format!("{} ×{}", summary.function, summary.count)
    } else {
        format!("{} ×{} (line {})", summary.function, summary.count, lines.join(", "))
    }
}

fn line_text(line: Option<u32>) -> String {
    line.map_or_else(|| "unknown".to_string(), |l| l.to_string())
}

fn function_ui(ui: &mut egui::Ui, state: &AppState, function: &FunctionRef) {
    let info = match lookup(&state.graph, &function.file, &function.function) {
        Ok(info) => info,
        Err(err) => {
            info_box(ui, &err.notice());
            return;
        }
    };

    ui.heading(function.function.as_str());
    ui.label(format!("File: {}", function.file));
    ui.label(format!("Line: {}", line_text(info.line)));
    if info.is_fixture {
        ui.label("Fixture");
    }
    ui.add_space(spacing::ITEM_SPACING);
    ui.label(docstring(info));

    labeled_separator(ui, "Calls");
    refs_ui(ui, &info.calls);
    labeled_separator(ui, "Called by");
    refs_ui(ui, &info.called_by);
}

fn docstring(info: &FunctionInfo) -> egui::RichText {
    match info.docstring.as_deref().filter(|doc| !doc.trim().is_empty()) {
        Some(doc) => egui::RichText::new(doc).monospace(),
        None => egui::RichText::new("No docstring available").italics(),
    }
}

fn refs_ui(ui: &mut egui::Ui, refs: &[CallRef]) {
    if refs.is_empty() {
        ui.weak("(none)");
    }
    for call in refs {
        match call.line {
            Some(line) => ui.label(format!("{} (line {line})", call.function)),
            None => ui.label(call.function.as_str()),
        };
    }
}

fn file_ui(ui: &mut egui::Ui, state: &AppState, path: &str, bus: &EventBus) {
    ui.heading(file_name(path));
    ui.label(path);
    let Some(file) = state.graph.get(path) else {
        info_box(ui, "This file is not in the call graph");
        return;
    };
    if let FileStatus::Disabled { badge: text } = FileStatus::of(path, file) {
        ui.horizontal(|ui| {
            ui.label("Not analyzable");
            let fill = ui.visuals().faint_bg_color;
            badge(ui, &text, fill);
        });
        return;
    }

    let Some(functions) = file.functions() else {
        return;
    };
    ui.label(format!("{} functions", functions.len()));
    ui.add_space(spacing::ITEM_SPACING);
    for (name, info) in functions {
        ui.horizontal(|ui| {
            if ui.link(name.as_str()).clicked() {
                bus.publish(Event::FunctionSelected {
                    function: FunctionRef::new(path, name),
                });
            }
            ui.weak(format!(
                "line {} · {} calls · {} callers",
                line_text(info.line),
                info.calls.len(),
                info.called_by.len()
            ));
        });
    }
}
